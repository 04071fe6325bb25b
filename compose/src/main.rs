use gridlogic::adjacency::{build_adjacency, AdjacencyKind};
use gridlogic::common::{self, Container};
use gridlogic::placement::{all_shapes, general_shape};
use gridlogic::{rect, reachable, Context, Location, Predicate, Program, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

// a connected wall without 2x2 blocks, covered by tetromino placements, that keeps clear of the clue cells
const ROWS: i32 = 5;
const COLS: i32 = 5;
const CLUES: [Location; 3] = [Location(0, 0), Location(2, 2), Location(4, 3)];

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();

    let ctx = Context::new();
    let black = Predicate::positive("black")?;

    let mut program = Program::new();
    program
        .extend(common::grid(ROWS, COLS)?)
        .extend(common::shade_c(&black, Container::Grid)?)
        .extend(build_adjacency(AdjacencyKind::Orthogonal4, false))
        .extend(reachable::grid_color_connected(&black, AdjacencyKind::Orthogonal4, Some((ROWS, COLS))))
        .extend(rect::avoid_rect(2, 2, &black, None)?);

    for (id, (name, shape)) in ctx.ominoes(4).into_iter().enumerate() {
        info!(shape = name, id, "registering tetromino");
        let cells = shape.cells().to_vec();
        let detector =
            general_shape(&ctx, "tetromino", id as i64, &cells, &black, Container::Grid, AdjacencyKind::Orthogonal4, true)?;
        program.extend(detector);
    }
    program.extend(all_shapes("tetromino", &black, Container::Grid));

    for Location(r, c) in CLUES {
        program.extend(rect::avoid_rect(1, 1, &black, Some(Location(r, c)))?);
    }
    program.extend(common::display("black", 2));

    info!(statements = program.len(), variants = ctx.cached(), "composed program");
    print!("{program}");
    Ok(())
}
