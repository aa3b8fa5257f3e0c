//! Decision variables, their bounds, and the per-model set they belong to.
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::expression::{Expression, IntoAffineExpression};
use crate::solvers::{ObjectiveDirection, ResolutionError, Solver};

static NEXT_MODEL_ID: AtomicUsize = AtomicUsize::new(0);

/// Handle on one variable of one model.
///
/// Handles are `Copy`. Two handles are equal only if they were returned by
/// the same [ProblemVariables::add] call, bounds play no part.
///
/// ```
/// # use small_lp::{variable, variables};
/// let mut vars = variables!();
/// let a = vars.add(variable().clamp(1, 8));
/// let b = vars.add(variable().clamp(1, 8));
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Variable {
    model: usize,
    index: usize,
}

impl Variable {
    /// Column of the variable in its model
    pub(crate) fn index(self) -> usize {
        self.index
    }

    /// Id of the [ProblemVariables] that created this variable
    pub fn model_id(self) -> usize {
        self.model
    }
}

/// Bounds and name of a variable, see [variable]
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDefinition {
    pub(crate) lower: f64,
    pub(crate) upper: f64,
    pub(crate) name: Option<String>,
}

impl Default for VariableDefinition {
    fn default() -> Self {
        VariableDefinition {
            lower: f64::NEG_INFINITY,
            upper: f64::INFINITY,
            name: None,
        }
    }
}

impl VariableDefinition {
    /// Set the lower bound
    pub fn min<N: Into<f64>>(mut self, lower: N) -> Self {
        self.lower = lower.into();
        self
    }

    /// Set the upper bound
    pub fn max<N: Into<f64>>(mut self, upper: N) -> Self {
        self.upper = upper.into();
        self
    }

    /// Set both bounds
    pub fn clamp<L: Into<f64>, U: Into<f64>>(self, lower: L, upper: U) -> Self {
        self.min(lower).max(upper)
    }

    /// Name the variable. Names only appear in logs.
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The lower bound, `-inf` if unset
    pub fn lower_bound(&self) -> f64 {
        self.lower
    }

    /// The upper bound, `inf` if unset
    pub fn upper_bound(&self) -> f64 {
        self.upper
    }

    /// The name, if one was given
    pub fn label(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// A free continuous variable, to be narrowed with the builder methods
/// of [VariableDefinition]
pub fn variable() -> VariableDefinition {
    VariableDefinition::default()
}

/// The variables of one model.
///
/// Every instance draws a fresh model id. Variables carry that id, so a
/// variable of another model is recognised when it shows up in an objective,
/// a constraint or a solution lookup.
#[derive(Debug)]
pub struct ProblemVariables {
    model: usize,
    definitions: Vec<VariableDefinition>,
}

impl Default for ProblemVariables {
    fn default() -> Self {
        ProblemVariables::new()
    }
}

impl ProblemVariables {
    /// A model without variables
    pub fn new() -> Self {
        ProblemVariables {
            model: NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed),
            definitions: Vec::new(),
        }
    }

    /// The id carried by the variables of this model
    pub fn model_id(&self) -> usize {
        self.model
    }

    /// Declare a variable
    pub fn add(&mut self, definition: VariableDefinition) -> Variable {
        let index = self.definitions.len();
        tracing::trace!(
            component = "model",
            operation = "add_variable",
            model = self.model,
            index,
            name = definition.label().unwrap_or(""),
            lower = definition.lower,
            upper = definition.upper,
            "declared variable"
        );
        self.definitions.push(definition);
        Variable {
            model: self.model,
            index,
        }
    }

    /// Declare a free variable
    pub fn add_variable(&mut self) -> Variable {
        self.add(variable())
    }

    /// Declare `count` variables sharing one definition
    ///
    /// ```
    /// use small_lp::*;
    /// let mut vars = variables!();
    /// let y = vars.add_vector(variable().min(0), 10);
    /// let total: Expression = y.iter().sum();
    /// let solution = vars
    ///     .minimise(total)
    ///     .using(default_solver)
    ///     .with(constraint!(y[3] >= 2))
    ///     .solve()?;
    /// assert_eq!(solution.value(y[3]), 2.);
    /// # Ok::<_, ResolutionError>(())
    /// ```
    pub fn add_vector(&mut self, definition: VariableDefinition, count: usize) -> Vec<Variable> {
        (0..count).map(|_| self.add(definition.clone())).collect()
    }

    /// Number of declared variables
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether no variable was declared yet
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Whether `variable` was declared here
    pub fn owns(&self, variable: Variable) -> bool {
        variable.model == self.model && variable.index < self.definitions.len()
    }

    /// Bounds and name of one of our variables
    pub fn definition(&self, variable: Variable) -> Option<&VariableDefinition> {
        if variable.model == self.model {
            self.definitions.get(variable.index)
        } else {
            None
        }
    }

    /// All variables in declaration order, with their definitions
    pub fn iter_variables_with_def(&self) -> impl Iterator<Item = (Variable, &VariableDefinition)> {
        let model = self.model;
        self.definitions
            .iter()
            .enumerate()
            .map(move |(index, definition)| (Variable { model, index }, definition))
    }

    /// Attach an objective. Constraints are added once a backend is chosen
    /// with [UnsolvedProblem::using].
    ///
    /// ```
    /// use small_lp::{constraint, default_solver, variable, variables, ObjectiveDirection, Solution, SolverModel};
    /// let run = |direction| {
    ///     let mut vars = variables!();
    ///     let x = vars.add(variable().clamp(2, 3));
    ///     let solution = vars
    ///         .optimise(direction, x)
    ///         .using(default_solver)
    ///         .with(constraint!(x <= 5))
    ///         .solve()
    ///         .unwrap();
    ///     solution.value(x)
    /// };
    /// assert_eq!(run(ObjectiveDirection::Minimisation), 2.);
    /// assert_eq!(run(ObjectiveDirection::Maximisation), 3.);
    /// ```
    pub fn optimise<E: IntoAffineExpression>(
        self,
        direction: ObjectiveDirection,
        objective: E,
    ) -> UnsolvedProblem {
        UnsolvedProblem {
            objective: objective.into_expression(),
            direction,
            variables: self,
        }
    }

    /// [optimise](Self::optimise) towards the highest value
    pub fn maximise<E: IntoAffineExpression>(self, objective: E) -> UnsolvedProblem {
        self.optimise(ObjectiveDirection::Maximisation, objective)
    }

    /// [optimise](Self::optimise) towards the lowest value
    pub fn minimise<E: IntoAffineExpression>(self, objective: E) -> UnsolvedProblem {
        self.optimise(ObjectiveDirection::Minimisation, objective)
    }

    /// The first variable of `expression` that was not declared here
    pub(crate) fn first_foreign(&self, expression: &Expression) -> Option<Variable> {
        expression
            .terms()
            .map(|(var, _)| var)
            .find(|&var| !self.owns(var))
    }
}

/// Variables and objective, waiting for a backend
#[derive(Debug)]
pub struct UnsolvedProblem {
    pub(crate) objective: Expression,
    pub(crate) direction: ObjectiveDirection,
    pub(crate) variables: ProblemVariables,
}

impl UnsolvedProblem {
    /// Hand the problem to `solver`, which returns a model to add constraints to
    pub fn using<S: Solver>(self, mut solver: S) -> S::Model {
        solver.create_model(self)
    }

    /// Replace the objective
    pub fn with_objective<E: IntoAffineExpression>(
        self,
        direction: ObjectiveDirection,
        objective: E,
    ) -> Self {
        self.variables.optimise(direction, objective)
    }

    /// The objective function
    pub fn objective(&self) -> &Expression {
        &self.objective
    }

    /// Maximise or minimise
    pub fn direction(&self) -> ObjectiveDirection {
        self.direction
    }

    /// The variables of the model
    pub fn variables(&self) -> &ProblemVariables {
        &self.variables
    }

    /// Fails if the objective uses a variable of another model
    pub(crate) fn check_objective(&self) -> Result<(), ResolutionError> {
        match self.variables.first_foreign(&self.objective) {
            Some(variable) => Err(ResolutionError::ForeignVariable {
                variable,
                model: self.variables.model,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables;

    #[test]
    fn models_do_not_share_variables() {
        let mut first = variables!();
        let mut second = variables!();
        let a = first.add_variable();
        let b = second.add_variable();
        assert_ne!(first.model_id(), second.model_id());
        assert_ne!(a, b);
        assert!(first.owns(a));
        assert!(!first.owns(b));
        assert!(first.definition(b).is_none());
    }

    #[test]
    fn definition_lookup() {
        let mut vars = variables!();
        let x = vars.add(variable().min(0).name("x1"));
        let def = vars.definition(x).unwrap();
        assert_eq!(def.lower_bound(), 0.);
        assert_eq!(def.upper_bound(), f64::INFINITY);
        assert_eq!(def.label(), Some("x1"));
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn foreign_variable_in_objective() {
        let mut vars = variables!();
        let mut other = variables!();
        let x = vars.add_variable();
        let stranger = other.add_variable();
        let problem = vars.maximise(x + stranger);
        assert_eq!(
            problem.check_objective(),
            Err(ResolutionError::ForeignVariable {
                variable: stranger,
                model: problem.variables().model_id(),
            })
        );
    }

    #[test]
    fn objective_can_be_replaced() {
        let mut vars = variables!();
        let x = vars.add_variable();
        let problem = vars
            .maximise(x)
            .with_objective(ObjectiveDirection::Minimisation, 2 * x);
        assert_eq!(problem.direction(), ObjectiveDirection::Minimisation);
        assert_eq!(problem.objective(), &(2 * x));
        assert!(problem.check_objective().is_ok());
    }
}
