//! The seam between models and LP backends.
//!
//! A backend is a function turning an [UnsolvedProblem] into a
//! [SolverModel]. Constraints are added to the model, then
//! [SolverModel::solve] runs the backend and returns a [SolvedProblem].
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::hash::BuildHasher;

use crate::constraint::{Constraint, ConstraintReference};
use crate::expression::{Expression, IntoAffineExpression};
use crate::program::Entry;
use crate::variable::{UnsolvedProblem, Variable};

#[cfg(feature = "microlp")]
pub mod microlp;

#[cfg(feature = "highs")]
pub mod highs;

/// Direction of the objective
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum ObjectiveDirection {
    /// Highest value
    Maximisation,
    /// Lowest value
    Minimisation,
}

/// Why no solution was returned
#[derive(Debug, PartialEq, Clone)]
pub enum ResolutionError {
    /// The objective can be improved without limit
    Unbounded,
    /// No point satisfies every constraint
    Infeasible,
    /// The backend failed with a fixed message
    Other(&'static str),
    /// The backend failed with its own message
    Str(String),
    /// A variable declared by another model was used in this one
    ForeignVariable {
        /// The offending variable
        variable: Variable,
        /// Id of the model it was used in
        model: usize,
    },
    /// Coefficient table input whose sizes do not line up
    Dimension {
        /// Number of variables
        expected: usize,
        /// Length that was given
        found: usize,
    },
    /// Coefficient table input holding NaN or an infinity where only
    /// finite numbers are allowed
    InvalidValue {
        /// Where the value was found
        entry: Entry,
        /// The value itself
        value: f64,
    },
}

impl Display for ResolutionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionError::Unbounded => write!(f, "the problem is unbounded"),
            ResolutionError::Infeasible => write!(f, "the problem is infeasible"),
            ResolutionError::Other(message) => write!(f, "solver error: {}", message),
            ResolutionError::Str(message) => write!(f, "solver error: {}", message),
            ResolutionError::ForeignVariable { variable, model } => write!(
                f,
                "variable {} of model {} used in model {}",
                variable.index(),
                variable.model_id(),
                model
            ),
            ResolutionError::Dimension { expected, found } => write!(
                f,
                "expected at most {} values, found {}",
                expected, found
            ),
            ResolutionError::InvalidValue { entry, value } => {
                write!(f, "invalid value {} in {}", value, entry)
            }
        }
    }
}

impl std::error::Error for ResolutionError {}

/// Something that turns an [UnsolvedProblem] into a backend model.
///
/// Implemented by every `FnMut(UnsolvedProblem) -> impl SolverModel`, which is
/// how backends such as [microlp](crate::microlp) are written.
pub trait Solver {
    /// The model type of the backend
    type Model: SolverModel;

    /// Load `problem` into the backend
    fn create_model(&mut self, problem: UnsolvedProblem) -> Self::Model;
}

impl<F, M> Solver for F
where
    F: FnMut(UnsolvedProblem) -> M,
    M: SolverModel,
{
    type Model = M;

    fn create_model(&mut self, problem: UnsolvedProblem) -> M {
        self(problem)
    }
}

/// A model loaded into a backend
pub trait SolverModel {
    /// What a successful solve returns
    type Solution: SolvedProblem;

    /// Add a constraint, builder style
    fn with(mut self, constraint: Constraint) -> Self
    where
        Self: Sized,
    {
        self.add_constraint(constraint);
        self
    }

    /// Add a constraint
    fn add_constraint(&mut self, constraint: Constraint) -> ConstraintReference;

    /// Let the backend print its own progress output. Off by default.
    fn set_verbose(&mut self, _verbose: bool) {}

    /// Run the backend. Blocks until it returns.
    fn solve(self) -> Result<Self::Solution, ResolutionError>;

    /// Backend name, for logs
    fn name() -> &'static str;
}

/// Variable values
pub trait Solution {
    /// The value of `variable`, `None` if it is not part of this solution
    fn try_value(&self, variable: Variable) -> Option<f64>;

    /// The value of `variable`.
    ///
    /// Panics when `variable` is not part of this solution.
    fn value(&self, variable: Variable) -> f64 {
        match self.try_value(variable) {
            Some(value) => value,
            None => panic!("{:?} has no value in this solution", variable),
        }
    }

    /// The value of `expression` at this solution
    ///
    /// ```
    /// use small_lp::{constraint, default_solver, variable, variables, Solution, SolverModel};
    /// let mut vars = variables!();
    /// let a = vars.add(variable().clamp(0, 1));
    /// let b = vars.add(variable().clamp(0, 4));
    /// let objective = a + b;
    /// let solution = vars
    ///     .maximise(&objective)
    ///     .using(default_solver)
    ///     .with(constraint!(a + b <= 10))
    ///     .solve()?;
    /// assert_eq!(solution.eval(&objective), 5.);
    /// # Ok::<_, small_lp::ResolutionError>(())
    /// ```
    fn eval<E: IntoAffineExpression>(&self, expression: E) -> f64
    where
        Self: Sized,
    {
        expression.eval_with(self)
    }
}

/// The optimal solution returned by [SolverModel::solve]
pub trait SolvedProblem: Solution {
    /// The objective that was optimised
    fn objective(&self) -> &Expression;

    /// The optimal objective value
    fn objective_value(&self) -> f64
    where
        Self: Sized,
    {
        self.objective().evaluate(self)
    }
}

impl<N, S> Solution for HashMap<Variable, N, S>
where
    N: Into<f64> + Copy,
    S: BuildHasher,
{
    fn try_value(&self, variable: Variable) -> Option<f64> {
        self.get(&variable).map(|&value| value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables;

    #[test]
    fn map_solution_accessors() {
        let mut vars = variables!();
        let x1 = vars.add_variable();
        let x2 = vars.add_variable();
        let values: HashMap<_, _> = vec![(x1, 1.)].into_iter().collect();
        assert_eq!(values.try_value(x1), Some(1.));
        assert_eq!(values.try_value(x2), None);
        assert_eq!(values.eval(3 * x1 + 1), 4.);
    }

    #[test]
    #[should_panic]
    fn missing_value_panics() {
        let mut vars = variables!();
        let x1 = vars.add_variable();
        let values: HashMap<Variable, f64> = HashMap::new();
        values.value(x1);
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ResolutionError::Infeasible.to_string(),
            "the problem is infeasible"
        );
        let err = ResolutionError::Dimension {
            expected: 2,
            found: 3,
        };
        assert_eq!(err.to_string(), "expected at most 2 values, found 3");
        let err = ResolutionError::InvalidValue {
            entry: Entry::Rhs(0),
            value: f64::NAN,
        };
        assert_eq!(err.to_string(), "invalid value NaN in right hand side of row 0");
    }
}
