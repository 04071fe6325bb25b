//! Cell colors, positive or negated.

use std::fmt::{Display, Formatter};

use crate::error::{Error, Result};
use crate::program::{Atom, Literal, Term};

const NEGATION_PREFIX: &str = "not_";

/// A boolean cell property such as `black`, or its negation.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Predicate {
    /// Holds where `name(r, c)` holds.
    Positive(String),
    /// Holds where `name(r, c)` does not.
    Negated(String),
}

fn validate(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(|first| first.is_ascii_lowercase())
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
    if !valid {
        return Err(Error::InvalidName(name.to_owned()));
    }
    if name.starts_with(NEGATION_PREFIX) {
        return Err(Error::ReservedPrefix(name.to_owned()));
    }

    Ok(())
}

impl Predicate {
    /// A positive predicate. Names must be solver identifiers and may not start with `not_`.
    pub fn positive(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate(&name)?;
        Ok(Self::Positive(name))
    }

    /// The negation of the predicate called `name`.
    pub fn negated(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate(&name)?;
        Ok(Self::Negated(name))
    }

    /// The underlying predicate name, without any `not_`.
    pub fn name(&self) -> &str {
        match self {
            Self::Positive(name) | Self::Negated(name) => name,
        }
    }

    /// Whether this is [`Predicate::Negated`].
    pub fn is_negated(&self) -> bool {
        matches!(self, Self::Negated(_))
    }

    /// The opposite predicate.
    pub fn negate(&self) -> Self {
        match self {
            Self::Positive(name) => Self::Negated(name.clone()),
            Self::Negated(name) => Self::Positive(name.clone()),
        }
    }

    /// The token this predicate contributes to a tag.
    pub fn token(&self) -> String {
        match self {
            Self::Positive(name) => name.clone(),
            Self::Negated(name) => format!("{NEGATION_PREFIX}{name}"),
        }
    }

    /// The name to use where the predicate is derived or chosen, failing for negated predicates.
    pub fn require_positive(&self) -> Result<&str> {
        match self {
            Self::Positive(name) => Ok(name),
            Self::Negated(name) => Err(Error::NegatedPredicate(name.clone())),
        }
    }

    /// The literal stating this property holds at `(r, c)`.
    pub fn at(&self, r: impl Into<Term>, c: impl Into<Term>) -> Literal {
        match self {
            Self::Positive(name) => Literal::Pos(Atom::cell(name.as_str(), r, c)),
            Self::Negated(name) => Literal::Neg(Atom::cell(name.as_str(), r, c)),
        }
    }

    /// The literal stating this property does not hold at `(r, c)`.
    pub fn not_at(&self, r: impl Into<Term>, c: impl Into<Term>) -> Literal {
        self.negate().at(r, c)
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positive(name) => write!(f, "{name}"),
            Self::Negated(name) => write!(f, "not {name}"),
        }
    }
}

/// Shorthand for a known-good positive predicate, used by tests and fixed templates.
#[cfg(test)]
pub(crate) fn black() -> Predicate {
    Predicate::Positive("black".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals() {
        let black = Predicate::positive("black").unwrap();
        assert_eq!(black.at("R", "C").to_string(), "black(R, C)");
        assert_eq!(black.not_at("R", "C").to_string(), "not black(R, C)");
        assert_eq!(black.negate().at(1, 2).to_string(), "not black(1, 2)");
        assert_eq!(black.negate().negate(), black);
    }

    #[test]
    fn tokens_do_not_collide() {
        assert_eq!(Predicate::negated("black").unwrap().token(), "not_black");
        assert_eq!(Predicate::positive("not_black"), Err(Error::ReservedPrefix("not_black".into())));
    }

    #[test]
    fn rejects_bad_names() {
        assert_eq!(Predicate::positive("Black"), Err(Error::InvalidName("Black".into())));
        assert_eq!(Predicate::positive("not black"), Err(Error::InvalidName("not black".into())));
        assert_eq!(Predicate::positive(""), Err(Error::InvalidName("".into())));
    }

    #[test]
    fn negated_is_not_positive() {
        let white = Predicate::negated("black").unwrap();
        assert_eq!(white.require_positive(), Err(Error::NegatedPredicate("black".into())));
        assert_eq!(white.negate().require_positive(), Ok("black"));
    }
}
