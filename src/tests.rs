#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashMap};
    use std::num::NonZero;

    use crate::adjacency::{build_adjacency, AdjacencyKind};
    use crate::check::{self, Board, BoardBuilder, Rect};
    use crate::common::{self, Container};
    use crate::context::Context;
    use crate::direction::Direction;
    use crate::location::Location;
    use crate::placement::{all_shapes, count_shape, general_shape};
    use crate::predicate::Predicate;
    use crate::program::{Atom, Literal, Program, Statement, Target, Term};
    use crate::reachable::{clue_bit, grid_bit_color_connected, grid_src_color_connected, num_binary_range};
    use crate::rect::{all_rect, avoid_rect};
    use crate::shape::Symmetry;

    fn black() -> Predicate {
        Predicate::positive("black").unwrap()
    }

    fn board(rows: &[&str]) -> Board {
        BoardBuilder::from_rows(rows).build().unwrap()
    }

    fn inverted(rows: &[&str]) -> Board {
        let flipped = rows
            .iter()
            .map(|row| row.chars().map(|ch| if ch == '#' { '.' } else { '#' }).collect::<String>())
            .collect::<Vec<_>>();
        board(&flipped.iter().map(String::as_str).collect::<Vec<_>>())
    }

    /// An argument pattern: a constant, a variable plus an offset, or `_`.
    enum Pattern<'a> {
        Value(i64),
        Var(&'a str, i64),
        Any,
    }

    fn pattern(term: &Term) -> Pattern<'_> {
        match term {
            Term::Int(value) => Pattern::Value(*value),
            Term::Sym(sym) if sym == "_" => Pattern::Any,
            Term::Sym(sym) => match sym.split(' ').collect::<Vec<_>>()[..] {
                [var] => Pattern::Var(var, 0),
                [var, "+", offset] => Pattern::Var(var, offset.parse().unwrap()),
                [var, "-", offset] => Pattern::Var(var, -offset.parse::<i64>().unwrap()),
                _ => panic!("cannot ground term {sym}"),
            },
            Term::Str(text) => panic!("cannot ground string {text}"),
        }
    }

    type Binding<'a> = HashMap<&'a str, i64>;

    fn unify<'a>(atom: &'a Atom, args: &[i64], binding: &Binding<'a>) -> Option<Binding<'a>> {
        if atom.args.len() != args.len() {
            return None;
        }

        let mut binding = binding.clone();
        for (term, &value) in atom.args.iter().zip(args) {
            match pattern(term) {
                Pattern::Any => {}
                Pattern::Value(expected) if expected == value => {}
                Pattern::Value(_) => return None,
                Pattern::Var(var, offset) => match binding.get(var) {
                    Some(&bound) if bound + offset == value => {}
                    Some(_) => return None,
                    None => {
                        binding.insert(var, value - offset);
                    }
                },
            }
        }

        Some(binding)
    }

    /// The least model of a program's facts and rules over integer atoms, plus the constraints it violates.
    ///
    /// Rules may only negate atoms that no rule derives, which holds for the templates exercised here: they negate the
    /// shading, the grid and walls. Aggregates and comparisons are not evaluated.
    #[derive(Default)]
    struct Model {
        facts: BTreeSet<(String, Vec<i64>)>,
    }

    impl Model {
        /// `grid` over the board, `color` on shaded cells, and `edge_left`/`edge_top` for walls between cells.
        fn from_board(board: &Board, color: &str) -> Self {
            let mut model = Self::default();
            for location @ Location(r, c) in board.locations() {
                model.insert("grid", [r, c]);
                if board.is_shaded(location) {
                    model.insert(color, [r, c]);
                }
                if board.is_walled(Direction::Left.attempt_from(location), location) {
                    model.insert(common::EDGE_LEFT, [r, c]);
                }
                if board.is_walled(Direction::Up.attempt_from(location), location) {
                    model.insert(common::EDGE_TOP, [r, c]);
                }
            }

            model
        }

        fn insert<const N: usize>(&mut self, name: &str, args: [i32; N]) {
            self.facts.insert((name.to_owned(), args.iter().map(|&arg| i64::from(arg)).collect()));
        }

        /// Geometric `adj_<kind>` facts, standing in for the distance rules of [`build_adjacency`].
        fn with_geometry(mut self, board: &Board, kind: AdjacencyKind) -> Self {
            for a in board.locations() {
                for b in board.locations().filter(|b| kind.geometric(a, *b)) {
                    self.insert(&kind.predicate(), [a.0, a.1, b.0, b.1]);
                }
            }

            self
        }

        fn bindings<'a>(&self, body: &'a [Literal]) -> Vec<Binding<'a>> {
            let mut found = vec![Binding::new()];
            for atom in body.iter().filter_map(|literal| match literal {
                Literal::Pos(atom) => Some(atom),
                Literal::Neg(_) => None,
                Literal::Expr(text) => panic!("cannot ground {text}"),
            }) {
                found = found
                    .iter()
                    .flat_map(|binding| {
                        self.facts
                            .iter()
                            .filter(|(name, _)| *name == atom.name)
                            .filter_map(move |(_, args)| unify(atom, args, binding))
                    })
                    .collect();
            }

            for atom in body.iter().filter_map(|literal| match literal {
                Literal::Neg(atom) => Some(atom),
                _ => None,
            }) {
                found.retain(|binding| {
                    !self.facts.iter().any(|(name, args)| *name == atom.name && unify(atom, args, binding).is_some())
                });
            }

            found
        }

        fn ground(atom: &Atom, binding: &Binding) -> (String, Vec<i64>) {
            let args = atom
                .args
                .iter()
                .map(|term| match pattern(term) {
                    Pattern::Value(value) => value,
                    Pattern::Var(var, offset) => binding[var] + offset,
                    Pattern::Any => panic!("wildcard in head {atom}"),
                })
                .collect();
            (atom.name.clone(), args)
        }

        /// Apply the facts and rules of `program` until nothing new is derived.
        fn solve(mut self, program: &Program) -> Self {
            loop {
                let mut derived = Vec::new();
                for statement in program.statements() {
                    match statement {
                        Statement::Fact(atom) => derived.push(Self::ground(atom, &Binding::new())),
                        Statement::Rule { head, body } => {
                            derived.extend(self.bindings(body).iter().map(|binding| Self::ground(head, binding)));
                        }
                        Statement::Constraint(_) => {}
                        other => panic!("cannot ground {other}"),
                    }
                }

                let before = self.facts.len();
                self.facts.extend(derived);
                if self.facts.len() == before {
                    return self;
                }
            }
        }

        /// Whether some constraint of `program` has a satisfied body.
        fn violates(&self, program: &Program) -> bool {
            program.statements().iter().any(|statement| match statement {
                Statement::Constraint(body) => !self.bindings(body).is_empty(),
                _ => false,
            })
        }

        /// Cells `(r, c)` for which `name(prefix..., r, c)` holds.
        fn cells(&self, name: &str, prefix: &[i64]) -> BTreeSet<Location> {
            self.facts
                .iter()
                .filter(|(fact, args)| fact == name && args.len() == prefix.len() + 2 && args.starts_with(prefix))
                .map(|(_, args)| Location(args[prefix.len()] as i32, args[prefix.len() + 1] as i32))
                .collect()
        }
    }

    const RECTANGLE_BOARDS: [&[&str]; 10] = [
        &["###", "###", "###"],
        &["##.", "##.", "..#"],
        &["##.", "#..", "..."],
        &["###", "#.#", "###"],
        &[".#.", "###", ".#."],
        &["#.#", "#.#", "###"],
        &["##", "##", "#."],
        &[".#", "##"],
        &["##.#", "##.#", "...#"],
        &["..", ".."],
    ];

    #[test]
    fn tag_names() {
        assert_eq!(crate::tag!("reachable", "grid", "src", "adj", 4, "black"), "reachable_grid_src_adj_4_black");
        assert_eq!(crate::tag!("reachable", "grid", "adj", AdjacencyKind::EdgeGated, &black().negate()), "reachable_grid_adj_edge_not_black");
    }

    #[test]
    fn isolated_cell_is_upleft_only() {
        let board = board(&["...", ".#.", "..."]);
        let model = Model::from_board(&board, "black").solve(&all_rect(&black(), false));
        assert_eq!(model.cells("upleft_black", &[]), BTreeSet::from([Location(1, 1)]));
        for role in ["left_black", "up_black", "remain_black"] {
            assert!(model.cells(role, &[]).is_empty(), "{role}");
        }
        assert!(!model.violates(&all_rect(&black(), false)));
    }

    #[test]
    fn rectangle_rules_agree_with_bounding_boxes() {
        let program = all_rect(&black(), false);
        for rows in RECTANGLE_BOARDS {
            let board = board(rows);
            let model = Model::from_board(&board, "black").solve(&program);
            assert_eq!(!model.violates(&program), check::all_rect(&board, false).unwrap(), "{board}");
        }
    }

    #[test]
    fn negated_rectangle_rules_look_at_unshaded_cells() {
        let program = all_rect(&black().negate(), false);
        for rows in RECTANGLE_BOARDS {
            let model = Model::from_board(&board(rows), "black").solve(&program);
            let unshaded = inverted(rows);
            assert_eq!(!model.violates(&program), check::all_rect(&unshaded, false).unwrap(), "{unshaded}");
        }
    }

    #[test]
    fn full_square_is_one_rectangle() {
        let board = board(&["###", "###", "###"]);
        assert_eq!(
            check::rectangles(&board).unwrap(),
            Some(vec![Rect { top_left: Location(0, 0), height: 3, width: 3 }])
        );
        assert!(check::all_rect(&board, true).unwrap());

        let program = all_rect(&black(), false);
        let model = Model::from_board(&board, "black").solve(&program);
        assert!(!model.violates(&program));
        assert_eq!(model.cells("upleft_black", &[]), BTreeSet::from([Location(0, 0)]));
        assert_eq!(model.cells("up_black", &[]), BTreeSet::from([Location(0, 1), Location(0, 2)]));
        assert_eq!(model.cells("left_black", &[]), BTreeSet::from([Location(1, 0), Location(2, 0)]));
        assert_eq!(model.cells("remain_black", &[]).len(), 4);

        // the whole block is the one occurrence of a 3x3 shape
        let ctx = Context::new();
        let block = (0..3).flat_map(|r| (0..3).map(move |c| Location(r, c))).collect::<Vec<_>>();
        let shape = crate::shape::canonicalize(&block).unwrap();
        let occurrences =
            check::occurrences(&board, &ctx.variants(&shape, Symmetry::FULL), AdjacencyKind::Orthogonal4, false).unwrap();
        assert_eq!(occurrences, vec![(Location(0, 0), 0)]);

        let detector =
            general_shape(&ctx, "block", 0, &block, &black(), Container::Grid, AdjacencyKind::Orthogonal4, false).unwrap();
        assert_eq!(ctx.cached(), 1);
        assert!(detector.to_string().starts_with("touch_shape_block_4_black(R, C, R1, C1) :- "));
        assert!(count_shape(Target::Exactly(1), "block", None, &black(), Container::Grid)
            .contains_line(":- #count { R, C, I, V: shape_grid_block_black(R, C, I, V) } != 1."));
        assert!(all_shapes("block", &black(), Container::Grid)
            .contains_line(":- grid(R, C), black(R, C), not belong_to_shape_grid_block_black(R, C, _, _)."));
    }

    #[test]
    fn avoid_rect_rejects_blob_with_block() {
        let board = board(&["##.", "###", ".#."]);
        assert!(!check::all_rect(&board, false).unwrap());
        assert!(check::contains_block(&board, 2, 2));

        let model = Model::from_board(&board, "black");
        let anywhere = avoid_rect(2, 2, &black(), None).unwrap();
        assert_eq!(anywhere.to_string(), ":- black(R, C), black(R, C + 1), black(R + 1, C), black(R + 1, C + 1).\n");
        assert!(model.violates(&anywhere));
        assert!(model.violates(&avoid_rect(2, 2, &black(), Some(Location(0, 0))).unwrap()));
        assert!(!model.violates(&avoid_rect(2, 2, &black(), Some(Location(1, 1))).unwrap()));

        let rules = all_rect(&black(), false);
        assert!(Model::from_board(&board, "black").solve(&rules).violates(&rules));
    }

    #[test]
    fn block_constraints_agree_with_evaluator() {
        for rows in RECTANGLE_BOARDS {
            let model = Model::from_board(&board(rows), "black");
            for (height, width) in [(1, 1), (2, 2), (1, 3), (3, 1), (2, 3)] {
                let positive = avoid_rect(height, width, &black(), None).unwrap();
                assert_eq!(model.violates(&positive), check::contains_block(&board(rows), height, width), "{rows:?}");

                let negated = avoid_rect(height, width, &black().negate(), None).unwrap();
                assert_eq!(model.violates(&negated), check::contains_block(&inverted(rows), height, width), "{rows:?}");
            }
        }
    }

    #[test]
    fn source_reaches_along_row() {
        let board = board(&["###", "#..", "..#"]);
        let src = Location(0, 0);
        let expected = check::reachable(&board, src, AdjacencyKind::Orthogonal4).unwrap();
        assert_eq!(expected, BTreeSet::from([Location(0, 0), Location(0, 1), Location(0, 2), Location(1, 0)]));

        let program = grid_src_color_connected(src, &[], &[], Some(&black()), AdjacencyKind::Orthogonal4);
        let model = Model::from_board(&board, "black").with_geometry(&board, AdjacencyKind::Orthogonal4).solve(&program);
        assert_eq!(model.cells("reachable_grid_src_adj_4_black", &[0, 0]), expected);
        assert!(!model.violates(&program));

        let must_reach = |cell: Location| grid_src_color_connected(src, &[cell], &[], Some(&black()), AdjacencyKind::Orthogonal4);
        let must_avoid = |cell: Location| grid_src_color_connected(src, &[], &[cell], Some(&black()), AdjacencyKind::Orthogonal4);
        assert!(!model.violates(&must_reach(Location(0, 2))));
        assert!(model.violates(&must_reach(Location(2, 2))));
        assert!(model.violates(&must_avoid(Location(1, 0))));
        assert!(!model.violates(&must_avoid(Location(2, 2))));
    }

    #[test]
    fn walled_board_splits_reachability() {
        let mut builder = BoardBuilder::with_dims((NonZero::new(2).unwrap(), NonZero::new(3).unwrap()));
        builder
            .shade_all((0..2).flat_map(|r| (0..3).map(move |c| Location(r, c))))
            .wall_around(Location(0, 1), &[Direction::Right, Direction::Down])
            .wall_around(Location(1, 1), &[Direction::Right]);
        let board = builder.build().unwrap();

        let left = check::reachable(&board, Location(0, 0), AdjacencyKind::EdgeGated).unwrap();
        assert_eq!(left.len(), 4);
        assert!(!left.contains(&Location(0, 2)));
        assert_eq!(check::components(&board, AdjacencyKind::EdgeGated).unwrap().len(), 2);
        assert!(check::is_connected(&board, AdjacencyKind::Orthogonal4).unwrap());

        let mut program = build_adjacency(AdjacencyKind::EdgeGated, false);
        program.extend(grid_src_color_connected(Location(0, 0), &[], &[], None, AdjacencyKind::EdgeGated));
        let model = Model::from_board(&board, "black").solve(&program);
        assert_eq!(model.cells("reachable_grid_src_adj_edge", &[0, 0]), left);
        // the wall under (0, 1) has the same region on both sides
        assert!(model.violates(&program));

        let right = check::reachable(&board, Location(0, 2), AdjacencyKind::EdgeGated).unwrap();
        let mut program = build_adjacency(AdjacencyKind::EdgeGated, false);
        program.extend(grid_src_color_connected(Location(0, 2), &[], &[], None, AdjacencyKind::EdgeGated));
        let model = Model::from_board(&board, "black").solve(&program);
        assert_eq!(model.cells("reachable_grid_src_adj_edge", &[0, 2]), right);
        assert!(!model.violates(&program));
    }

    #[test]
    fn bit_labels_agree_with_components() {
        let board = board(&["##.#", "...#", "##.#"]);
        let components = check::components(&board, AdjacencyKind::Orthogonal4).unwrap();
        assert_eq!(components.len(), 3);

        let connectivity = grid_bit_color_connected(&black(), AdjacencyKind::Orthogonal4);
        let bits = num_binary_range(3);
        let violates = |sources: &[(Location, u64)]| {
            let mut program = Program::new();
            for &(src, id) in sources {
                program.extend(clue_bit(src, id, bits.clone()));
            }
            program.extend(connectivity.clone());
            Model::from_board(&board, "black").with_geometry(&board, AdjacencyKind::Orthogonal4).solve(&program).violates(&program)
        };
        // whether every component holds sources of exactly one id
        let labelled = |sources: &[(Location, u64)]| {
            components.iter().all(|component| {
                let ids = sources.iter().filter(|(src, _)| component.contains(src)).map(|(_, id)| *id).collect::<BTreeSet<_>>();
                ids.len() == 1
            })
        };

        for sources in [
            &[(Location(0, 0), 0), (Location(0, 3), 1), (Location(2, 0), 2)][..],
            &[(Location(0, 0), 1), (Location(0, 1), 1), (Location(0, 3), 2), (Location(2, 1), 3)],
            &[(Location(0, 0), 0), (Location(0, 1), 1), (Location(0, 3), 2), (Location(2, 0), 3)],
            &[(Location(0, 0), 0), (Location(0, 3), 1)],
            &[(Location(0, 0), 1), (Location(0, 3), 1), (Location(2, 3), 2), (Location(2, 0), 3)],
        ] {
            assert_eq!(violates(sources), !labelled(sources), "{sources:?}");
        }
    }

    #[test]
    fn compose_a_program() {
        let mut program = Program::new();
        program
            .extend(common::grid(2, 2).unwrap())
            .extend(common::shade_c(&black(), Container::Grid).unwrap())
            .extend(build_adjacency(AdjacencyKind::Orthogonal4, false))
            .extend(crate::reachable::grid_color_connected(&black(), AdjacencyKind::Orthogonal4, None))
            .extend(common::count(Target::Exactly(3), &black(), Container::Grid, None))
            .extend(common::display("black", 2));

        let text = program.to_string();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.first(), Some(&"grid(0..1, 0..1)."));
        assert_eq!(lines.last(), Some(&"#show black/2."));
        assert_eq!(lines.len(), program.len());
        assert!(lines.contains(&":- #count { R, C: grid(R, C), black(R, C) } != 3."));
    }
}
