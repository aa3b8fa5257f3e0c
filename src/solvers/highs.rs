//! Optional backend, the [HiGHS](https://docs.rs/highs) C++ solver.

use highs::HighsModelStatus;

use crate::constraint::{Constraint, ConstraintReference, Relation};
use crate::expression::Expression;
use crate::solvers::{ObjectiveDirection, ResolutionError, SolvedProblem, Solution, SolverModel};
use crate::variable::{UnsolvedProblem, Variable};

/// Load a problem into HiGHS. Pass it to [UnsolvedProblem::using].
pub fn highs(to_solve: UnsolvedProblem) -> HighsProblem {
    let error = to_solve.check_objective().err();
    let mut rows = highs::RowProblem::default();
    let sense = match to_solve.direction {
        ObjectiveDirection::Maximisation => highs::Sense::Maximise,
        ObjectiveDirection::Minimisation => highs::Sense::Minimise,
    };
    let columns = to_solve
        .variables
        .iter_variables_with_def()
        .map(|(var, definition)| {
            rows.add_column(
                to_solve.objective.coefficient(var),
                definition.lower_bound()..definition.upper_bound(),
            )
        })
        .collect();
    HighsProblem {
        sense,
        rows,
        columns,
        model: to_solve.variables.model_id(),
        objective: to_solve.objective,
        verbose: false,
        error,
    }
}

/// A HiGHS model
pub struct HighsProblem {
    sense: highs::Sense,
    rows: highs::RowProblem,
    columns: Vec<highs::Col>,
    model: usize,
    objective: Expression,
    verbose: bool,
    /// First modelling error, reported by [SolverModel::solve]
    error: Option<ResolutionError>,
}

impl SolverModel for HighsProblem {
    type Solution = HighsSolution;

    fn solve(self) -> Result<Self::Solution, ResolutionError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let mut model = self.rows.optimise(self.sense);
        model.set_option(&b"output_flag"[..], self.verbose);
        if self.verbose {
            model.set_option(&b"log_to_console"[..], true);
        }

        let solved = model.solve();
        match solved.status() {
            HighsModelStatus::Optimal => {}
            HighsModelStatus::Infeasible | HighsModelStatus::UnboundedOrInfeasible => {
                return Err(ResolutionError::Infeasible)
            }
            HighsModelStatus::Unbounded => return Err(ResolutionError::Unbounded),
            other => return Err(ResolutionError::Str(format!("HiGHS stopped with {:?}", other))),
        }
        tracing::debug!(
            component = "solver",
            operation = "solve",
            backend = Self::name(),
            status = "success",
            model = self.model,
            "HiGHS found an optimal solution"
        );
        Ok(HighsSolution {
            solution: solved.get_solution(),
            model: self.model,
            objective: self.objective,
        })
    }

    fn add_constraint(&mut self, constraint: Constraint) -> ConstraintReference {
        let index = self.rows.num_rows();
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
        let rhs = constraint.rhs();
        let columns = &self.columns;
        let factors = constraint
            .expression
            .terms()
            .map(|(var, factor)| (columns[var.index()], factor));
        match constraint.relation() {
            Relation::Equal => {
                self.rows.add_row(rhs..=rhs, factors);
            }
            Relation::LessOrEqual => {
                self.rows.add_row(..=rhs, factors);
            }
        }
        ConstraintReference { index }
    }

    fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    fn name() -> &'static str {
        "Highs"
    }
}

/// An optimal HiGHS solution
pub struct HighsSolution {
    solution: highs::Solution,
    model: usize,
    objective: Expression,
}

impl Solution for HighsSolution {
    fn try_value(&self, variable: Variable) -> Option<f64> {
        if variable.model_id() != self.model {
            return None;
        }
        self.solution.columns().get(variable.index()).copied()
    }
}

impl SolvedProblem for HighsSolution {
    fn objective(&self) -> &Expression {
        &self.objective
    }
}

#[cfg(test)]
mod tests {
    use float_eq::assert_float_eq;

    use crate::solvers::{ResolutionError, SolvedProblem};
    use crate::{constraint, variable, variables, Solution, SolverModel};

    use super::highs;

    #[test]
    fn solves_the_two_variable_program() {
        let mut vars = variables!();
        let x1 = vars.add(variable().min(0));
        let x2 = vars.add(variable().min(0));
        let solution = vars
            .maximise(9 * x1 + 17 * x2)
            .using(highs)
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
    fn verbose_output_does_not_change_the_result() {
        let mut vars = variables!();
        let x = vars.add(variable().min(0));
        let mut model = vars.maximise(x).using(highs).with(constraint!(2 * x <= 3));
        model.set_verbose(true);
        let solution = model.solve().unwrap();
        assert_float_eq!(solution.value(x), 1.5, abs <= 1e-9);
    }

    #[test]
    fn infeasible_lower_bound() {
        let mut vars = variables!();
        let x1 = vars.add(variable().min(100));
        let x2 = vars.add(variable().min(0));
        let result = vars
            .maximise(9 * x1 + 17 * x2)
            .using(highs)
            .with(constraint!(3 * x1 + 2 * x2 <= 11))
            .solve();
        assert_eq!(result.err(), Some(ResolutionError::Infeasible));
    }
}
