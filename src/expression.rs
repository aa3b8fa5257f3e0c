//! Linear expressions `c0 + c1·x1 + ... + cn·xn` and the operators that build them.
//!
//! Numbers can only appear on the left of an operator as `f64` or `i32`
//! literals, which keeps `9 * x1` and `1. + x` unambiguous for type inference.
use std::fmt::{self, Debug, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use fnv::FnvHashMap;

use crate::constraint::{self, Constraint};
use crate::solvers::Solution;
use crate::variable::Variable;

/// Anything that can be used where a linear expression is expected:
/// a [Variable], a number, or an [Expression].
pub trait IntoAffineExpression {
    /// Add `factor` times `self` to `target`
    fn add_scaled_to(self, target: &mut Expression, factor: f64);

    /// Convert into an owned [Expression]
    fn into_expression(self) -> Expression
    where
        Self: Sized,
    {
        let mut expression = Expression::default();
        self.add_scaled_to(&mut expression, 1.);
        expression
    }

    /// The value taken when every variable is replaced by its value in `values`
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use small_lp::{variables, IntoAffineExpression};
    /// let mut vars = variables!();
    /// let x1 = vars.add_variable();
    /// let x2 = vars.add_variable();
    /// let values: HashMap<_, _> = vec![(x1, 1), (x2, 3)].into_iter().collect();
    /// assert_eq!((9 * x1 + 17 * x2).eval_with(&values), 60.);
    /// ```
    fn eval_with<S: Solution>(self, values: &S) -> f64
    where
        Self: Sized,
    {
        self.into_expression().evaluate(values)
    }
}

/// A linear combination of variables plus a constant.
///
/// Terms with a zero coefficient are never stored.
#[derive(Clone, Default, PartialEq)]
pub struct Expression {
    pub(crate) terms: FnvHashMap<Variable, f64>,
    pub(crate) constant: f64,
}

impl Expression {
    /// The constant expression `value`
    pub fn from_constant(value: f64) -> Self {
        Expression {
            terms: FnvHashMap::default(),
            constant: value,
        }
    }

    /// An empty expression with room for `capacity` terms
    pub fn with_capacity(capacity: usize) -> Self {
        Expression {
            terms: FnvHashMap::with_capacity_and_hasher(capacity, Default::default()),
            constant: 0.,
        }
    }

    /// Add `coefficient · var`
    pub fn add_term(&mut self, var: Variable, coefficient: f64) {
        let sum = self.terms.get(&var).copied().unwrap_or(0.) + coefficient;
        if sum == 0. {
            self.terms.remove(&var);
        } else {
            self.terms.insert(var, sum);
        }
    }

    /// Add `value` to the constant
    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    /// The coefficient of `var`, zero when it does not appear
    pub fn coefficient(&self, var: Variable) -> f64 {
        self.terms.get(&var).copied().unwrap_or(0.)
    }

    /// The constant part
    pub fn constant_term(&self) -> f64 {
        self.constant
    }

    /// Variables with a non-zero coefficient, in no particular order
    pub fn terms(&self) -> impl Iterator<Item = (Variable, f64)> + '_ {
        self.terms.iter().map(|(&var, &coefficient)| (var, coefficient))
    }

    /// Evaluate with the variable values in `values`.
    ///
    /// Panics if a variable has no value, see [Solution::value].
    pub fn evaluate<S: Solution>(&self, values: &S) -> f64 {
        self.terms()
            .map(|(var, coefficient)| coefficient * values.value(var))
            .sum::<f64>()
            + self.constant
    }

    /// `self <= rhs`
    pub fn leq<R: IntoAffineExpression>(self, rhs: R) -> Constraint {
        constraint::leq(self, rhs)
    }

    /// `self >= rhs`
    pub fn geq<R: IntoAffineExpression>(self, rhs: R) -> Constraint {
        constraint::geq(self, rhs)
    }

    /// `self == rhs`
    pub fn eq<R: IntoAffineExpression>(self, rhs: R) -> Constraint {
        constraint::eq(self, rhs)
    }

    fn scale(&mut self, factor: f64) {
        if factor == 0. {
            self.terms.clear();
        } else {
            self.terms.values_mut().for_each(|c| *c *= factor);
        }
        self.constant *= factor;
    }

    /// Writes the linear part as `3 v0 + v1`, by increasing variable index
    pub(crate) fn write_terms(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut terms: Vec<(Variable, f64)> = self.terms().collect();
        if terms.is_empty() {
            return f.write_str("0");
        }
        terms.sort_by_key(|(var, _)| var.index());
        for (position, (var, coefficient)) in terms.into_iter().enumerate() {
            if position > 0 {
                f.write_str(" + ")?;
            }
            if coefficient != 1. {
                write!(f, "{} ", coefficient)?;
            }
            write!(f, "v{}", var.index())?;
        }
        Ok(())
    }
}

impl Debug for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "{}", self.constant);
        }
        self.write_terms(f)?;
        if self.constant != 0. {
            write!(f, " + {}", self.constant)?;
        }
        Ok(())
    }
}

impl IntoAffineExpression for Expression {
    fn add_scaled_to(self, target: &mut Expression, factor: f64) {
        for (var, coefficient) in self.terms {
            target.add_term(var, factor * coefficient);
        }
        target.constant += factor * self.constant;
    }

    fn into_expression(self) -> Expression {
        self
    }
}

impl IntoAffineExpression for &Expression {
    fn add_scaled_to(self, target: &mut Expression, factor: f64) {
        for (var, coefficient) in self.terms() {
            target.add_term(var, factor * coefficient);
        }
        target.constant += factor * self.constant;
    }
}

impl IntoAffineExpression for Variable {
    fn add_scaled_to(self, target: &mut Expression, factor: f64) {
        target.add_term(self, factor);
    }
}

impl IntoAffineExpression for &Variable {
    fn add_scaled_to(self, target: &mut Expression, factor: f64) {
        target.add_term(*self, factor);
    }
}

macro_rules! constant_expressions {
    ($($num:ty),*) => {$(
        impl IntoAffineExpression for $num {
            fn add_scaled_to(self, target: &mut Expression, factor: f64) {
                target.constant += factor * f64::from(self);
            }
        }
    )*};
}

constant_expressions!(f64, f32, i32, u32, i16, u16, i8, u8);

impl<R: IntoAffineExpression> AddAssign<R> for Expression {
    fn add_assign(&mut self, rhs: R) {
        rhs.add_scaled_to(self, 1.);
    }
}

impl<R: IntoAffineExpression> SubAssign<R> for Expression {
    fn sub_assign(&mut self, rhs: R) {
        rhs.add_scaled_to(self, -1.);
    }
}

impl<N: Into<f64>> MulAssign<N> for Expression {
    fn mul_assign(&mut self, rhs: N) {
        self.scale(rhs.into());
    }
}

impl<R: IntoAffineExpression> Add<R> for Expression {
    type Output = Expression;

    fn add(mut self, rhs: R) -> Expression {
        self += rhs;
        self
    }
}

impl<R: IntoAffineExpression> Sub<R> for Expression {
    type Output = Expression;

    fn sub(mut self, rhs: R) -> Expression {
        self -= rhs;
        self
    }
}

impl<N: Into<f64>> Mul<N> for Expression {
    type Output = Expression;

    fn mul(mut self, rhs: N) -> Expression {
        self.scale(rhs.into());
        self
    }
}

impl<N: Into<f64>> Div<N> for Expression {
    type Output = Expression;

    fn div(mut self, rhs: N) -> Expression {
        self.scale(1. / rhs.into());
        self
    }
}

impl Neg for Expression {
    type Output = Expression;

    fn neg(mut self) -> Expression {
        self.scale(-1.);
        self
    }
}

impl<R: IntoAffineExpression> Add<R> for Variable {
    type Output = Expression;

    fn add(self, rhs: R) -> Expression {
        self.into_expression() + rhs
    }
}

impl<R: IntoAffineExpression> Sub<R> for Variable {
    type Output = Expression;

    fn sub(self, rhs: R) -> Expression {
        self.into_expression() - rhs
    }
}

impl<N: Into<f64>> Mul<N> for Variable {
    type Output = Expression;

    fn mul(self, rhs: N) -> Expression {
        let mut expression = Expression::with_capacity(1);
        expression.add_term(self, rhs.into());
        expression
    }
}

impl<N: Into<f64>> Div<N> for Variable {
    type Output = Expression;

    fn div(self, rhs: N) -> Expression {
        self * (1. / rhs.into())
    }
}

impl Neg for Variable {
    type Output = Expression;

    fn neg(self) -> Expression {
        self * -1.
    }
}

macro_rules! number_on_the_left {
    ($($num:ty),*) => {$(
        impl Add<Variable> for $num {
            type Output = Expression;
            fn add(self, rhs: Variable) -> Expression { rhs + self }
        }

        impl Add<Expression> for $num {
            type Output = Expression;
            fn add(self, rhs: Expression) -> Expression { rhs + self }
        }

        impl Sub<Variable> for $num {
            type Output = Expression;
            fn sub(self, rhs: Variable) -> Expression { -rhs + self }
        }

        impl Sub<Expression> for $num {
            type Output = Expression;
            fn sub(self, rhs: Expression) -> Expression { -rhs + self }
        }

        impl Mul<Variable> for $num {
            type Output = Expression;
            fn mul(self, rhs: Variable) -> Expression { rhs * self }
        }

        impl Mul<Expression> for $num {
            type Output = Expression;
            fn mul(self, rhs: Expression) -> Expression { rhs * self }
        }
    )*};
}

number_on_the_left!(f64, i32);

impl<R: IntoAffineExpression> Sum<R> for Expression {
    fn sum<I: Iterator<Item = R>>(iter: I) -> Self {
        let mut total = Expression::default();
        for item in iter {
            total += item;
        }
        total
    }
}
