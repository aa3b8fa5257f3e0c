//! Model a small linear program, solve it with an external LP solver and
//! read back the optimal point.
//!
//! ```rust
//! use small_lp::{constraint, default_solver, variable, variables, Report, SolvedProblem, SolverModel};
//!
//! let mut vars = variables!();
//! let x1 = vars.add(variable().min(0));
//! let x2 = vars.add(variable().min(0));
//! let solution = vars
//!     .maximise(9 * x1 + 17 * x2)
//!     .using(default_solver)
//!     .with(constraint!(3 * x1 + 2 * x2 <= 11))
//!     .with(constraint!(3 * x2 <= 11))
//!     .with(constraint!(x1 <= 1))
//!     .solve()?;
//!
//! let report = Report::from_solution(&solution, x1, x2);
//! assert!((report.objective - 214. / 3.).abs() < 1e-6);
//! println!("{}", report);
//! # use small_lp::ResolutionError;
//! # Ok::<_, ResolutionError>(())
//! ```
#![warn(missing_docs)]

pub use constraint::{Constraint, Relation};
pub use expression::{Expression, IntoAffineExpression};
pub use program::{Entry, LinearProgram, Report, Row, SolvedProgram};
pub use session::{Session, SessionConfig, SessionStats};
pub use solvers::{
    ObjectiveDirection, ResolutionError, Solution, SolvedProblem, Solver, SolverModel,
};
pub use variable::{variable, ProblemVariables, Variable, VariableDefinition};

#[cfg(feature = "microlp")]
pub use solvers::microlp::microlp;
/// When the "microlp" cargo feature is present, microlp is used as the default solver
#[cfg(feature = "microlp")]
pub use solvers::microlp::microlp as default_solver;

#[cfg(feature = "highs")]
pub use solvers::highs::highs;
/// When "microlp" is disabled and "highs" is enabled, HiGHS is the default solver
#[cfg(all(feature = "highs", not(feature = "microlp")))]
pub use solvers::highs::highs as default_solver;

#[cfg(not(any(feature = "microlp", feature = "highs")))]
compile_error!("No solver available. Enable the \"microlp\" or \"highs\" feature.");

pub mod constraint;
mod expression;
pub mod logging;
pub mod program;
pub mod session;
pub mod solvers;
pub mod variable;
mod variables_macro;
