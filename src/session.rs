//! An explicitly opened handle on the solver capability.
//!
//! A [Session] is acquired with [Session::open] and released either with
//! [Session::close] or, on any other exit path, when it is dropped. Models are
//! created and solved through it so that every solve is logged and counted.
//!
//! ```
//! use small_lp::{constraint, default_solver, variable, Session, SessionConfig, Solution, SolverModel};
//!
//! let mut session = Session::open(SessionConfig::default());
//! let mut vars = session.problem();
//! let x = vars.add(variable().min(0));
//! let model = vars
//!     .maximise(x)
//!     .using(default_solver)
//!     .with(constraint!(x <= 4));
//! let solution = session.solve(model)?;
//! assert_eq!(solution.value(x), 4.);
//! let stats = session.close();
//! assert_eq!(stats.solves, 1);
//! # Ok::<_, small_lp::ResolutionError>(())
//! ```
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use crate::solvers::{ResolutionError, SolverModel};
use crate::variable::ProblemVariables;

static NEXT_SESSION_ID: AtomicUsize = AtomicUsize::new(1);

/// Environment variable that turns on backend progress output and logs
/// every solve at `info` instead of `debug`
pub const VERBOSE_ENV: &str = "SMALL_LP_VERBOSE";

/// Settings of a [Session]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Label attached to every log line of the session
    pub label: String,
    /// Let the backend print its progress, and log each solve at `info`
    pub verbose: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            label: "small_lp".to_string(),
            verbose: false,
        }
    }
}

impl SessionConfig {
    /// The default configuration, with `verbose` read from [VERBOSE_ENV]
    pub fn from_env() -> Self {
        let verbose = env::var(VERBOSE_ENV)
            .map(|value| parse_flag(&value))
            .unwrap_or(false);
        SessionConfig {
            verbose,
            ..SessionConfig::default()
        }
    }

    /// Set the label
    pub fn label<S: Into<String>>(mut self, label: S) -> Self {
        self.label = label.into();
        self
    }

    /// Set verbosity
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// What a session did during its lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Models created with [Session::problem]
    pub models: usize,
    /// Calls to [Session::solve]
    pub solves: usize,
    /// Solves that returned an error
    pub failures: usize,
}

/// A scoped solver session. See the [module documentation](self).
#[derive(Debug)]
pub struct Session {
    id: usize,
    config: SessionConfig,
    stats: SessionStats,
    released: bool,
}

impl Session {
    /// Acquire a session
    pub fn open(config: SessionConfig) -> Self {
        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        tracing::info!(
            component = "session",
            operation = "open",
            session = id,
            label = %config.label,
            "solver session opened"
        );
        Session {
            id,
            config,
            stats: SessionStats::default(),
            released: false,
        }
    }

    /// The session id, unique within the process
    pub fn id(&self) -> usize {
        self.id
    }

    /// The configuration the session was opened with
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Counters so far
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Start a new, empty model
    pub fn problem(&mut self) -> ProblemVariables {
        self.stats.models += 1;
        let variables = ProblemVariables::new();
        tracing::debug!(
            component = "session",
            operation = "problem",
            session = self.id,
            model = variables.model_id(),
            "model created"
        );
        variables
    }

    /// Solve `model`, blocking until the backend returns
    pub fn solve<M: SolverModel>(
        &mut self,
        mut model: M,
    ) -> Result<M::Solution, ResolutionError> {
        self.stats.solves += 1;
        model.set_verbose(self.config.verbose);
        let start = Instant::now();
        let result = model.solve();
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        match &result {
            Ok(_) if self.config.verbose => tracing::info!(
                component = "session",
                operation = "solve",
                status = "success",
                session = self.id,
                backend = M::name(),
                elapsed_ms,
                "solve finished"
            ),
            Ok(_) => tracing::debug!(
                component = "session",
                operation = "solve",
                status = "success",
                session = self.id,
                backend = M::name(),
                elapsed_ms,
                "solve finished"
            ),
            Err(err) => {
                self.stats.failures += 1;
                tracing::warn!(
                    component = "session",
                    operation = "solve",
                    status = "error",
                    session = self.id,
                    backend = M::name(),
                    elapsed_ms,
                    "solve failed: {}",
                    err
                );
            }
        }
        result
    }

    /// Release the session and return its counters
    pub fn close(mut self) -> SessionStats {
        self.release("close");
        self.stats
    }

    fn release(&mut self, via: &'static str) {
        if self.released {
            return;
        }
        self.released = true;
        tracing::info!(
            component = "session",
            operation = via,
            session = self.id,
            models = self.stats.models,
            solves = self.stats.solves,
            failures = self.stats.failures,
            "solver session released"
        );
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.release("drop");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{Constraint, ConstraintReference};
    use crate::solvers::{Solution, SolvedProblem};
    use crate::{constraint, default_solver, variable, Expression, Variable};

    /// Succeeds only when the session switched backend output on
    struct NeedsVerbose {
        verbose: bool,
    }

    struct NoValues(Expression);

    impl Solution for NoValues {
        fn try_value(&self, _variable: Variable) -> Option<f64> {
            None
        }
    }

    impl SolvedProblem for NoValues {
        fn objective(&self) -> &Expression {
            &self.0
        }
    }

    impl SolverModel for NeedsVerbose {
        type Solution = NoValues;

        fn add_constraint(&mut self, _constraint: Constraint) -> ConstraintReference {
            ConstraintReference { index: 0 }
        }

        fn set_verbose(&mut self, verbose: bool) {
            self.verbose = verbose;
        }

        fn solve(self) -> Result<NoValues, ResolutionError> {
            if self.verbose {
                Ok(NoValues(Expression::default()))
            } else {
                Err(ResolutionError::Other("backend output was off"))
            }
        }

        fn name() -> &'static str {
            "needs_verbose"
        }
    }

    #[test]
    fn verbosity_reaches_the_backend() {
        let mut quiet = Session::open(SessionConfig::default());
        assert!(quiet.solve(NeedsVerbose { verbose: true }).is_err());
        let mut verbose = Session::open(SessionConfig::default().verbose(true));
        assert!(verbose.solve(NeedsVerbose { verbose: false }).is_ok());
        assert_eq!(quiet.stats().failures, 1);
        assert_eq!(verbose.stats().failures, 0);
    }

    #[test]
    fn flags() {
        assert!(parse_flag("1"));
        assert!(parse_flag(" TRUE "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn counts_models_solves_and_failures() {
        let mut session = Session::open(SessionConfig::default().label("counting"));
        let mut vars = session.problem();
        let x = vars.add(variable().min(5));
        let infeasible = vars
            .maximise(x)
            .using(default_solver)
            .with(constraint!(x <= 1));
        assert_eq!(
            session.solve(infeasible).err(),
            Some(ResolutionError::Infeasible)
        );

        let mut vars = session.problem();
        let y = vars.add(variable().min(0));
        let feasible = vars
            .maximise(y)
            .using(default_solver)
            .with(constraint!(y <= 1));
        assert!(session.solve(feasible).is_ok());

        assert_eq!(
            session.close(),
            SessionStats {
                models: 2,
                solves: 2,
                failures: 1,
            }
        );
    }

    #[test]
    fn sessions_get_distinct_ids() {
        let a = Session::open(SessionConfig::default());
        let b = Session::open(SessionConfig::default());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn released_on_drop() {
        let mut session = Session::open(SessionConfig::default().verbose(true));
        session.release("test");
        assert!(session.released);
        // dropping after an explicit release must not release twice
        drop(session);
    }
}
