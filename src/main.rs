//! Solve
//!
//! ```text
//! maximise   9 x1 + 17 x2
//! subject to 3 x1 + 2 x2 <= 11
//!                   3 x2 <= 11
//!            x1          <= 1
//!            x1, x2      >= 0
//! ```
//!
//! and print `x1 x2 objective` on one line.
use std::error::Error;

use small_lp::{
    constraint, default_solver, logging, variable, Report, Session, SessionConfig, SolverModel,
};

fn main() -> Result<(), Box<dyn Error>> {
    logging::init_from_env()?;

    let mut session = Session::open(SessionConfig::from_env());
    let mut vars = session.problem();
    let x1 = vars.add(variable().min(0.0).name("x1"));
    let x2 = vars.add(variable().min(0.0).name("x2"));

    let model = vars
        .maximise(9 * x1 + 17 * x2)
        .using(default_solver)
        .with(constraint!(3 * x1 + 2 * x2 <= 11))
        .with(constraint!(3 * x2 <= 11))
        .with(constraint!(x1 <= 1));

    let solution = session.solve(model)?;
    println!("{}", Report::from_solution(&solution, x1, x2));

    session.close();
    Ok(())
}
