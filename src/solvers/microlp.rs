//! Default backend, the pure Rust [microlp](https://docs.rs/microlp) simplex solver.

use crate::constraint::{Constraint, ConstraintReference, Relation};
use crate::expression::Expression;
use crate::solvers::{
    ObjectiveDirection, ResolutionError, SolvedProblem, Solution, SolverModel,
};
use crate::variable::{UnsolvedProblem, Variable};

/// Load a problem into microlp. Pass it to [UnsolvedProblem::using].
pub fn microlp(to_solve: UnsolvedProblem) -> MicroLpProblem {
    let error = to_solve.check_objective().err();
    let UnsolvedProblem {
        objective,
        direction,
        variables,
    } = to_solve;
    let mut problem = microlp::Problem::new(match direction {
        ObjectiveDirection::Maximisation => microlp::OptimizationDirection::Maximize,
        ObjectiveDirection::Minimisation => microlp::OptimizationDirection::Minimize,
    });
    let columns: Vec<microlp::Variable> = variables
        .iter_variables_with_def()
        .map(|(var, definition)| {
            problem.add_var(
                objective.coefficient(var),
                (definition.lower_bound(), definition.upper_bound()),
            )
        })
        .collect();
    MicroLpProblem {
        problem,
        columns,
        model: variables.model_id(),
        objective,
        n_constraints: 0,
        error,
    }
}

/// A microlp model
pub struct MicroLpProblem {
    problem: microlp::Problem,
    columns: Vec<microlp::Variable>,
    model: usize,
    objective: Expression,
    n_constraints: usize,
    /// First modelling error, reported by [SolverModel::solve]
    error: Option<ResolutionError>,
}

impl SolverModel for MicroLpProblem {
    type Solution = MicroLpSolution;

    fn solve(self) -> Result<Self::Solution, ResolutionError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let solution = self.problem.solve()?;
        tracing::debug!(
            component = "solver",
            operation = "solve",
            backend = Self::name(),
            status = "success",
            model = self.model,
            num_constraints = self.n_constraints,
            "microlp found an optimal solution"
        );
        Ok(MicroLpSolution {
            solution,
            columns: self.columns,
            model: self.model,
            objective: self.objective,
        })
    }

    fn add_constraint(&mut self, constraint: Constraint) -> ConstraintReference {
        let index = self.n_constraints;
        self.n_constraints += 1;
        if let Some((variable, _)) = constraint
            .expression
            .terms()
            .find(|(var, _)| var.model_id() != self.model)
        {
            tracing::warn!(
                component = "solver",
                operation = "add_constraint",
                backend = Self::name(),
                status = "error",
                model = self.model,
                constraint = index,
                "constraint uses a variable of model {}",
                variable.model_id()
            );
            self.error.get_or_insert(ResolutionError::ForeignVariable {
                variable,
                model: self.model,
            });
            return ConstraintReference { index };
        }
        tracing::trace!(
            component = "solver",
            operation = "add_constraint",
            backend = Self::name(),
            constraint = index,
            "{:?}",
            constraint
        );
        let op = match constraint.relation() {
            Relation::Equal => microlp::ComparisonOp::Eq,
            Relation::LessOrEqual => microlp::ComparisonOp::Le,
        };
        let rhs = constraint.rhs();
        let mut row = microlp::LinearExpr::empty();
        for (var, coefficient) in constraint.expression.terms() {
            row.add(self.columns[var.index()], coefficient);
        }
        self.problem.add_constraint(row, op, rhs);
        ConstraintReference { index }
    }

    fn name() -> &'static str {
        "Microlp"
    }
}

impl From<microlp::Error> for ResolutionError {
    fn from(error: microlp::Error) -> Self {
        match error {
            microlp::Error::Infeasible => ResolutionError::Infeasible,
            microlp::Error::Unbounded => ResolutionError::Unbounded,
            microlp::Error::InternalError(message) => ResolutionError::Str(message),
        }
    }
}

/// An optimal microlp solution
pub struct MicroLpSolution {
    solution: microlp::Solution,
    columns: Vec<microlp::Variable>,
    model: usize,
    objective: Expression,
}

impl Solution for MicroLpSolution {
    fn try_value(&self, variable: Variable) -> Option<f64> {
        if variable.model_id() != self.model {
            return None;
        }
        self.columns
            .get(variable.index())
            .map(|&column| self.solution[column])
    }
}

impl SolvedProblem for MicroLpSolution {
    fn objective(&self) -> &Expression {
        &self.objective
    }
}

#[cfg(test)]
mod tests {
    use float_eq::assert_float_eq;

    use crate::solvers::{ResolutionError, SolvedProblem};
    use crate::{constraint, variable, variables, Solution, SolverModel};

    use super::microlp;

    #[test]
    fn bounded_variables() {
        let mut vars = variables!();
        let x = vars.add(variable().clamp(0, 2));
        let y = vars.add(variable().clamp(1, 3));
        let solution = vars
            .maximise(x + 2 * y)
            .using(microlp)
            .with(constraint!(x + y <= 4))
            .solve()
            .unwrap();
        assert_float_eq!(solution.value(x), 1., abs <= 1e-9);
        assert_float_eq!(solution.value(y), 3., abs <= 1e-9);
    }

    #[test]
    fn solves_the_two_variable_program() {
        let mut vars = variables!();
        let x1 = vars.add(variable().min(0));
        let x2 = vars.add(variable().min(0));
        let solution = vars
            .maximise(9 * x1 + 17 * x2)
            .using(microlp)
            .with(constraint!(3 * x1 + 2 * x2 <= 11))
            .with(constraint!(3 * x2 <= 11))
            .with(constraint!(x1 <= 1))
            .solve()
            .unwrap();
        assert_float_eq!(solution.value(x1), 1., abs <= 1e-6);
        assert_float_eq!(solution.value(x2), 11. / 3., abs <= 1e-6);
        assert_float_eq!(solution.objective_value(), 214. / 3., abs <= 1e-6);
    }

    #[test]
    fn infeasible_lower_bound() {
        let mut vars = variables!();
        let x1 = vars.add(variable().min(100));
        let x2 = vars.add(variable().min(0));
        let result = vars
            .maximise(9 * x1 + 17 * x2)
            .using(microlp)
            .with(constraint!(3 * x1 + 2 * x2 <= 11))
            .solve();
        assert_eq!(result.err(), Some(ResolutionError::Infeasible));
    }

    #[test]
    fn unbounded() {
        let mut vars = variables!();
        let x = vars.add(variable().min(0));
        let result = vars
            .maximise(x)
            .using(microlp)
            .with(constraint!(x >= 1))
            .solve();
        assert_eq!(result.err(), Some(ResolutionError::Unbounded));
    }

    #[test]
    fn foreign_variable_in_constraint() {
        let mut vars = variables!();
        let mut other = variables!();
        let x = vars.add(variable().clamp(0, 1));
        let stranger = other.add_variable();
        let model_id = vars.model_id();
        let result = vars
            .maximise(x)
            .using(microlp)
            .with(constraint!(x + stranger <= 1))
            .solve();
        assert_eq!(
            result.err(),
            Some(ResolutionError::ForeignVariable {
                variable: stranger,
                model: model_id,
            })
        );
    }

    #[test]
    fn try_value_rejects_other_models() {
        let mut vars = variables!();
        let mut other = variables!();
        let x = vars.add(variable().clamp(0, 1));
        let stranger = other.add_variable();
        let solution = vars
            .maximise(x)
            .using(microlp)
            .with(constraint!(2 * x <= 3))
            .solve()
            .unwrap();
        assert_eq!(solution.try_value(x), Some(1.));
        assert_eq!(solution.try_value(stranger), None);
    }
}
