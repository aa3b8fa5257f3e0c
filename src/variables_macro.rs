/// Create an empty set of problem variables, see [ProblemVariables](crate::variable::ProblemVariables).
///
/// ```
/// use small_lp::{variable, variables};
/// let mut vars = variables!();
/// let x1 = vars.add(variable().min(0));
/// assert_eq!(vars.len(), 1);
/// ```
#[macro_export]
macro_rules! variables {
    () => {
        $crate::variable::ProblemVariables::new()
    };
}
