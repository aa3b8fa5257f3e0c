//! Linear programs given as plain coefficient tables.
//!
//! A [LinearProgram] is the structured form of a model whose constraints are
//! all `row · x <= rhs`. Building it twice gives two independent models with
//! identical coefficients.
use std::fmt::{Display, Formatter};

use crate::session::Session;
use crate::solvers::{ObjectiveDirection, ResolutionError, SolvedProblem, Solver, SolverModel};
use crate::variable::variable;
use crate::{Expression, Solution, Variable};

/// One `coefficients · x <= rhs` constraint
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// One coefficient per variable, missing trailing ones count as zero
    pub coefficients: Vec<f64>,
    /// Right hand side
    pub rhs: f64,
}

impl Row {
    /// Create a row
    pub fn new<C: Into<Vec<f64>>>(coefficients: C, rhs: f64) -> Self {
        Row {
            coefficients: coefficients.into(),
            rhs,
        }
    }
}

/// A place in a [LinearProgram] that holds a number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    /// Lower bound of a variable
    LowerBound(usize),
    /// Objective coefficient of a variable
    Objective(usize),
    /// Coefficient of a variable in a row
    Coefficient {
        /// Row index
        row: usize,
        /// Variable index
        column: usize,
    },
    /// Right hand side of a row
    Rhs(usize),
}

impl Display for Entry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Entry::LowerBound(column) => write!(f, "lower bound of x{}", column + 1),
            Entry::Objective(column) => write!(f, "objective coefficient of x{}", column + 1),
            Entry::Coefficient { row, column } => {
                write!(f, "coefficient of x{} in row {}", column + 1, row)
            }
            Entry::Rhs(row) => write!(f, "right hand side of row {}", row),
        }
    }
}

/// A linear program over continuous variables with `<=` rows
#[derive(Debug, Clone, PartialEq)]
pub struct LinearProgram {
    /// Lower bound of each variable. Its length is the number of variables.
    pub lower_bounds: Vec<f64>,
    /// Objective coefficient of each variable
    pub objective: Vec<f64>,
    /// Maximise or minimise
    pub direction: ObjectiveDirection,
    /// The constraints
    pub rows: Vec<Row>,
}

impl LinearProgram {
    /// maximise 9 x1 + 17 x2
    /// subject to 3 x1 + 2 x2 <= 11, 3 x2 <= 11, x1 <= 1, x1 >= 0, x2 >= 0
    pub fn reference() -> Self {
        LinearProgram {
            lower_bounds: vec![0., 0.],
            objective: vec![9., 17.],
            direction: ObjectiveDirection::Maximisation,
            rows: vec![
                Row::new([3., 2.], 11.),
                Row::new([0., 3.], 11.),
                Row::new([1., 0.], 1.),
            ],
        }
    }

    /// The number of variables
    pub fn num_variables(&self) -> usize {
        self.lower_bounds.len()
    }

    /// A copy of this program without row `index`, `None` if there is no such row
    pub fn without_row(&self, index: usize) -> Option<Self> {
        if index >= self.rows.len() {
            return None;
        }
        let mut program = self.clone();
        program.rows.remove(index);
        Some(program)
    }

    /// A copy of this program where variable `index` has the lower bound `bound`,
    /// `None` if there is no such variable
    pub fn with_lower_bound(&self, index: usize, bound: f64) -> Option<Self> {
        let mut program = self.clone();
        *program.lower_bounds.get_mut(index)? = bound;
        Some(program)
    }

    /// Rejects rows or an objective longer than the variable list, NaN
    /// anywhere, and infinities everywhere except `-inf` lower bounds.
    pub fn validate(&self) -> Result<(), ResolutionError> {
        let expected = self.num_variables();
        let longest = std::iter::once(self.objective.len())
            .chain(self.rows.iter().map(|row| row.coefficients.len()))
            .max()
            .unwrap_or(0);
        if longest > expected {
            return Err(ResolutionError::Dimension {
                expected,
                found: longest,
            });
        }

        let lower_bounds = self
            .lower_bounds
            .iter()
            .enumerate()
            .map(|(column, &value)| (Entry::LowerBound(column), value))
            .filter(|&(_, value)| value.is_nan() || value == f64::INFINITY);
        let objective = self
            .objective
            .iter()
            .enumerate()
            .map(|(column, &value)| (Entry::Objective(column), value));
        let rows = self.rows.iter().enumerate().flat_map(|(row, r)| {
            r.coefficients
                .iter()
                .enumerate()
                .map(move |(column, &value)| (Entry::Coefficient { row, column }, value))
                .chain(std::iter::once((Entry::Rhs(row), r.rhs)))
        });
        let invalid = lower_bounds
            .chain(objective.chain(rows).filter(|&(_, value)| !value.is_finite()))
            .next();
        match invalid {
            Some((entry, value)) => Err(ResolutionError::InvalidValue { entry, value }),
            None => Ok(()),
        }
    }

    /// Declare the variables and rows in a fresh model of `session`,
    /// ready to be solved with `solver`
    pub fn build<S: Solver>(
        &self,
        session: &mut Session,
        solver: S,
    ) -> Result<(S::Model, Vec<Variable>), ResolutionError> {
        self.validate()?;
        let mut vars = session.problem();
        let variables: Vec<Variable> = self
            .lower_bounds
            .iter()
            .enumerate()
            .map(|(i, &lb)| vars.add(variable().min(lb).name(format!("x{}", i + 1))))
            .collect();
        let objective = linear_combination(&variables, &self.objective);
        let mut model = vars.optimise(self.direction, objective).using(solver);
        for row in &self.rows {
            model.add_constraint(linear_combination(&variables, &row.coefficients).leq(row.rhs));
        }
        Ok((model, variables))
    }

    /// Build and solve, reading every variable value and the objective value
    pub fn solve_with<S: Solver>(
        &self,
        session: &mut Session,
        solver: S,
    ) -> Result<SolvedProgram, ResolutionError> {
        let (model, variables) = self.build(session, solver)?;
        let solution = session.solve(model)?;
        Ok(SolvedProgram {
            values: variables.iter().map(|&v| solution.value(v)).collect(),
            objective: solution.objective_value(),
        })
    }
}

fn linear_combination(variables: &[Variable], coefficients: &[f64]) -> Expression {
    variables
        .iter()
        .zip(coefficients)
        .filter(|(_, c)| **c != 0.)
        .map(|(&v, &c)| v * c)
        .sum()
}

/// Variable values and objective value of a solved [LinearProgram]
#[derive(Debug, Clone, PartialEq)]
pub struct SolvedProgram {
    /// Value of each variable, in declaration order
    pub values: Vec<f64>,
    /// Value of the objective function
    pub objective: f64,
}

/// The `x1 x2 objective` line printed for a two variable program
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Report {
    /// Value of the first variable
    pub x1: f64,
    /// Value of the second variable
    pub x2: f64,
    /// Value of the objective function
    pub objective: f64,
}

impl Report {
    /// Create a report
    pub fn new(x1: f64, x2: f64, objective: f64) -> Self {
        Report { x1, x2, objective }
    }

    /// Read the two variables and the objective from a solution
    pub fn from_solution<S: SolvedProblem>(solution: &S, x1: Variable, x2: Variable) -> Self {
        Report::new(
            solution.value(x1),
            solution.value(x2),
            solution.objective_value(),
        )
    }
}

impl TryFrom<&SolvedProgram> for Report {
    type Error = ResolutionError;

    fn try_from(solved: &SolvedProgram) -> Result<Self, Self::Error> {
        match solved.values[..] {
            [x1, x2] => Ok(Report::new(x1, x2, solved.objective)),
            _ => Err(ResolutionError::Dimension {
                expected: 2,
                found: solved.values.len(),
            }),
        }
    }
}

/// Shortest representation that reads back to the same float, `1.0` rather than `1`
impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} {:?} {:?}", self.x1, self.x2, self.objective)
    }
}
