//! Constraints are stored as `expression <= 0` or `expression == 0`.
use std::fmt::{self, Debug, Formatter};

use crate::expression::{Expression, IntoAffineExpression};
use crate::variable::Variable;

/// How the constrained expression compares to zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// `expression <= 0`
    LessOrEqual,
    /// `expression == 0`
    Equal,
}

/// A linear constraint, built with [leq], [geq], [eq] or [constraint!](crate::constraint!)
#[derive(Clone, PartialEq)]
pub struct Constraint {
    /// Left hand side minus right hand side
    pub(crate) expression: Expression,
    pub(crate) relation: Relation,
}

impl Constraint {
    /// The relation to zero
    pub fn relation(&self) -> Relation {
        self.relation
    }

    /// Whether this is an equality
    pub fn is_equality(&self) -> bool {
        self.relation == Relation::Equal
    }

    /// The coefficient of `var` once every variable is on the left hand side
    pub fn coefficient(&self, var: Variable) -> f64 {
        self.expression.coefficient(var)
    }

    /// The constant once it is moved to the right hand side
    pub fn rhs(&self) -> f64 {
        -self.expression.constant
    }
}

impl Debug for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.expression.write_terms(f)?;
        let symbol = match self.relation {
            Relation::LessOrEqual => "<=",
            Relation::Equal => "=",
        };
        write!(f, " {} {}", symbol, self.rhs())
    }
}

fn difference<L: IntoAffineExpression, R: IntoAffineExpression>(lhs: L, rhs: R) -> Expression {
    let mut expression = lhs.into_expression();
    rhs.add_scaled_to(&mut expression, -1.);
    expression
}

/// `lhs <= rhs`
pub fn leq<L: IntoAffineExpression, R: IntoAffineExpression>(lhs: L, rhs: R) -> Constraint {
    Constraint {
        expression: difference(lhs, rhs),
        relation: Relation::LessOrEqual,
    }
}

/// `lhs >= rhs`
pub fn geq<L: IntoAffineExpression, R: IntoAffineExpression>(lhs: L, rhs: R) -> Constraint {
    leq(rhs, lhs)
}

/// `lhs == rhs`
pub fn eq<L: IntoAffineExpression, R: IntoAffineExpression>(lhs: L, rhs: R) -> Constraint {
    Constraint {
        expression: difference(lhs, rhs),
        relation: Relation::Equal,
    }
}

/// Write a constraint with `<=`, `>=` or `==` between two expressions.
///
/// ```
/// use small_lp::{constraint, variable, variables};
///
/// let mut vars = variables!();
/// let x1 = vars.add(variable().min(0));
/// let x2 = vars.add(variable().min(0));
/// let row = constraint!(3 * x1 + 2 * x2 <= 11);
/// assert_eq!(format!("{:?}", row), "3 v0 + 2 v1 <= 11");
/// ```
#[macro_export]
macro_rules! constraint {
    (@lhs [$($lhs:tt)+] <= $($rhs:tt)+) => {
        $crate::constraint::leq($($lhs)+, $($rhs)+)
    };
    (@lhs [$($lhs:tt)+] >= $($rhs:tt)+) => {
        $crate::constraint::geq($($lhs)+, $($rhs)+)
    };
    (@lhs [$($lhs:tt)+] == $($rhs:tt)+) => {
        $crate::constraint::eq($($lhs)+, $($rhs)+)
    };
    (@lhs [$($lhs:tt)*]) => {
        compile_error!("a constraint needs one of `<=`, `>=` or `==`")
    };
    (@lhs [$($lhs:tt)*] $next:tt $($rest:tt)*) => {
        $crate::constraint!(@lhs [$($lhs)* $next] $($rest)*)
    };
    ($($tokens:tt)+) => {
        $crate::constraint!(@lhs [] $($tokens)+)
    };
}

/// Position of a constraint in the order constraints were added to a model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstraintReference {
    pub(crate) index: usize,
}

impl ConstraintReference {
    /// Zero-based position
    pub fn index(&self) -> usize {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables;

    #[test]
    fn macro_builds_leq_with_rhs() {
        let mut vars = variables!();
        let x1 = vars.add_variable();
        let x2 = vars.add_variable();
        let c = constraint!(3 * x1 + 2 * x2 <= 11);
        assert_eq!(c.relation(), Relation::LessOrEqual);
        assert_eq!(c.rhs(), 11.);
        assert_eq!(c.coefficient(x1), 3.);
        assert_eq!(c.coefficient(x2), 2.);
    }

    #[test]
    fn geq_swaps_sides() {
        let mut vars = variables!();
        let x = vars.add_variable();
        let c = constraint!(x >= 4);
        assert_eq!(c.rhs(), -4.);
        assert_eq!(format!("{:?}", c), "-1 v0 <= -4");
    }

    #[test]
    fn variables_on_both_sides() {
        let mut vars = variables!();
        let x = vars.add_variable();
        let y = vars.add_variable();
        let c = constraint!(2 * x + 1 == y - 3);
        assert!(c.is_equality());
        assert_eq!(format!("{:?}", c), "2 v0 + -1 v1 = -4");
        assert_eq!(c, eq(2 * x + 1, y - 3));
    }

    #[test]
    fn comparison_inside_parentheses_is_not_split() {
        let mut vars = variables!();
        let x = vars.add_variable();
        let c = constraint!((x + 1) * 2 <= 6);
        assert_eq!(c.coefficient(x), 2.);
        assert_eq!(c.rhs(), 4.);
    }
}
