//! Structured statements of the solver's input language.
//!
//! Builders accumulate [`Statement`]s in a [`Program`] and hand it back to the caller, which may merge several
//! programs with [`Program::extend`] before rendering the whole thing once through [`Display`].

use std::fmt::{Display, Formatter};

use itertools::Itertools;
use strum::{EnumString, VariantArray};

use crate::error::{Error, Result};

/// A term in an atom argument list.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Term {
    /// An integer constant.
    Int(i64),
    /// A variable, constant or arithmetic expression, written verbatim.
    Sym(String),
    /// A string constant; rendered with quotes.
    Str(String),
}

impl Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Int(value) => write!(f, "{value}"),
            Term::Sym(sym) => write!(f, "{sym}"),
            Term::Str(text) => write!(f, "\"{text}\""),
        }
    }
}

impl From<i64> for Term {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Term {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<usize> for Term {
    fn from(value: usize) -> Self {
        // indices handed to the solver are tiny
        Self::Int(value as i64)
    }
}

impl From<&str> for Term {
    fn from(value: &str) -> Self {
        Self::Sym(value.to_owned())
    }
}

impl From<String> for Term {
    fn from(value: String) -> Self {
        Self::Sym(value)
    }
}

/// `base + delta`, collapsing to a plain integer when `base` is one.
pub(crate) fn shifted(base: &Term, delta: i32) -> Term {
    match (base, delta) {
        (_, 0) => base.clone(),
        (Term::Int(value), _) => Term::Int(value + i64::from(delta)),
        (_, d) if d > 0 => Term::Sym(format!("{base} + {d}")),
        (_, d) => Term::Sym(format!("{base} - {}", -d)),
    }
}

/// `name(args...)`, or a bare `name` when there are no arguments.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Atom {
    /// Predicate name.
    pub name: String,
    /// Arguments, possibly none.
    pub args: Vec<Term>,
}

impl Atom {
    /// `name(args...)`.
    pub fn new<T: Into<Term>>(name: impl Into<String>, args: impl IntoIterator<Item = T>) -> Self {
        Self { name: name.into(), args: args.into_iter().map(Into::into).collect() }
    }

    /// The common `name(R, C)` shape over cell coordinates.
    pub fn cell(name: impl Into<String>, r: impl Into<Term>, c: impl Into<Term>) -> Self {
        Self { name: name.into(), args: vec![r.into(), c.into()] }
    }

    /// Append one more argument.
    pub fn with(mut self, arg: impl Into<Term>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl Display for Atom {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}({})", self.name, self.args.iter().join(", "))
        }
    }
}

/// A body literal.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Literal {
    /// `atom`
    Pos(Atom),
    /// `not atom`
    Neg(Atom),
    /// A comparison, assignment or aggregate, written verbatim.
    Expr(String),
}

impl Literal {
    /// A verbatim [`Literal::Expr`].
    pub fn expr(text: impl Into<String>) -> Self {
        Self::Expr(text.into())
    }
}

impl From<Atom> for Literal {
    fn from(value: Atom) -> Self {
        Self::Pos(value)
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Pos(atom) => write!(f, "{atom}"),
            Literal::Neg(atom) => write!(f, "not {atom}"),
            Literal::Expr(text) => write!(f, "{text}"),
        }
    }
}

/// One element of a choice rule, `atom: condition`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChoiceElement {
    /// The atom that may be chosen.
    pub atom: Atom,
    /// Literals restricting the choice; empty for none.
    pub condition: Vec<Literal>,
}

impl From<Atom> for ChoiceElement {
    fn from(atom: Atom) -> Self {
        Self { atom, condition: Vec::new() }
    }
}

impl Display for ChoiceElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.condition.is_empty() {
            write!(f, "{}", self.atom)
        } else {
            write!(f, "{}: {}", self.atom, self.condition.iter().join(", "))
        }
    }
}

/// One statement of a [`Program`], rendered with its trailing period.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Statement {
    /// `atom.`
    Fact(Atom),
    /// `head :- body.`
    Rule {
        /// The derived atom.
        head: Atom,
        /// Conditions, all of which must hold.
        body: Vec<Literal>,
    },
    /// An integrity constraint; forbids every binding satisfying the body.
    Constraint(Vec<Literal>),
    /// `{ elements } op n :- body.`
    Choice {
        /// Alternatives, separated by `;`.
        elements: Vec<ChoiceElement>,
        /// How many elements to choose, if bounded.
        bound: Option<(Comparator, i64)>,
        /// Conditions under which the choice applies.
        body: Vec<Literal>,
    },
    /// A directive such as `#show black/2`, without the trailing period.
    Directive(String),
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Statement::Fact(atom) => write!(f, "{atom}."),
            Statement::Rule { head, body } => write!(f, "{head} :- {}.", body.iter().join(", ")),
            Statement::Constraint(body) => write!(f, ":- {}.", body.iter().join(", ")),
            Statement::Choice { elements, bound, body } => {
                write!(f, "{{ {} }}", elements.iter().join("; "))?;
                if let Some((op, value)) = bound {
                    write!(f, " {} {value}", op.symbol())?;
                }
                if !body.is_empty() {
                    write!(f, " :- {}", body.iter().join(", "))?;
                }
                write!(f, ".")
            }
            Statement::Directive(text) => write!(f, "{text}."),
        }
    }
}

/// An ordered, append-only list of statements.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Program {
    statements: Vec<Statement>,
}

impl Program {
    /// An empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `atom.`
    pub fn fact(&mut self, atom: Atom) -> &mut Self {
        self.statements.push(Statement::Fact(atom));
        self
    }

    /// Append `head :- body.`
    pub fn rule(&mut self, head: Atom, body: impl IntoIterator<Item = Literal>) -> &mut Self {
        self.statements.push(Statement::Rule { head, body: body.into_iter().collect() });
        self
    }

    /// Append `:- body.`
    pub fn constraint(&mut self, body: impl IntoIterator<Item = Literal>) -> &mut Self {
        self.statements.push(Statement::Constraint(body.into_iter().collect()));
        self
    }

    /// Append a choice rule, bounded by `bound` if given.
    pub fn choice(
        &mut self,
        elements: impl IntoIterator<Item = ChoiceElement>,
        bound: Option<(Comparator, i64)>,
        body: impl IntoIterator<Item = Literal>,
    ) -> &mut Self {
        self.statements.push(Statement::Choice {
            elements: elements.into_iter().collect(),
            bound,
            body: body.into_iter().collect(),
        });
        self
    }

    /// Append a directive; the period is added when rendering.
    pub fn directive(&mut self, text: impl Into<String>) -> &mut Self {
        self.statements.push(Statement::Directive(text.into()));
        self
    }

    /// Append every statement of `other`, in order.
    pub fn extend(&mut self, other: Program) -> &mut Self {
        self.statements.extend(other.statements);
        self
    }

    /// The statements so far, in order.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Number of statements.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Whether no statement was added.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Whether any statement renders to exactly `line`.
    pub fn contains_line(&self, line: &str) -> bool {
        self.statements.iter().any(|statement| statement.to_string() == line)
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{statement}")?;
        }

        Ok(())
    }
}

impl FromIterator<Statement> for Program {
    fn from_iter<I: IntoIterator<Item = Statement>>(iter: I) -> Self {
        Self { statements: iter.into_iter().collect() }
    }
}

/// Comparison operators, named the way puzzle modules spell their targets.
#[derive(Copy, Clone, Debug, EnumString, Eq, Hash, PartialEq, VariantArray)]
#[strum(serialize_all = "lowercase")]
pub enum Comparator {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl Comparator {
    /// The operator as written in solver input.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    /// The comparator holding exactly when `self` does not.
    pub fn negate(&self) -> Self {
        match self {
            Self::Eq => Self::Ne,
            Self::Ne => Self::Eq,
            Self::Lt => Self::Ge,
            Self::Le => Self::Gt,
            Self::Gt => Self::Le,
            Self::Ge => Self::Lt,
        }
    }

    /// Parse one of `eq, ge, gt, le, lt, ne`.
    pub fn parse(name: &str) -> Result<Self> {
        name.parse().map_err(|_| Error::UnsupportedComparator(name.to_owned()))
    }

    /// Evaluate `lhs op rhs`.
    pub fn holds(&self, lhs: i64, rhs: i64) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
        }
    }
}

/// What a count must satisfy.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Target {
    /// The count must be exactly this number.
    Exactly(i64),
    /// The count must compare to the number this way.
    Compare(Comparator, i64),
}

impl Target {
    /// The comparator to write into an integrity constraint, i.e. the one that must *not* hold, with its operand.
    pub fn encode(&self) -> (Comparator, i64) {
        match *self {
            Target::Exactly(value) => (Comparator::Ne, value),
            Target::Compare(op, value) => (op.negate(), value),
        }
    }

    /// Whether `count` is allowed by this target.
    pub fn accepts(&self, count: i64) -> bool {
        let (forbidden, value) = self.encode();
        !forbidden.holds(count, value)
    }
}

impl From<i64> for Target {
    fn from(value: i64) -> Self {
        Self::Exactly(value)
    }
}
