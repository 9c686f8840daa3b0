//! Property runner: random trials followed by per-argument shrinking.

use crate::error::{CheckError, Failure, Result};
use crate::gen::GenTuple;
use crate::random::Random;
use crate::shrinker::ShrinkableTuple;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info, warn};

/// Environment variable overriding `Config::num_runs`.
pub const RUNS_ENV: &str = "ROSECHECK_RUNS";
/// Environment variable overriding `Config::seed`.
pub const SEED_ENV: &str = "ROSECHECK_SEED";
/// Environment variable overriding `Config::shrink_limit`.
pub const SHRINK_LIMIT_ENV: &str = "ROSECHECK_SHRINK_LIMIT";

/// Configuration for a property run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Number of trials to run.
    pub num_runs: usize,

    /// Seed for the random source. Empty picks a fresh one per run.
    pub seed: String,

    /// Maximum number of shrink candidates to evaluate.
    pub shrink_limit: usize,

    /// Consecutive generation errors tolerated before giving up.
    pub discard_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            num_runs: 100,
            seed: String::new(),
            shrink_limit: 10_000,
            discard_limit: 100,
        }
    }
}

impl Config {
    /// The default configuration with environment overrides applied.
    pub fn from_env() -> Result<Self> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up by environment variable name.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(runs) = lookup(RUNS_ENV) {
            self.num_runs = parse_count(RUNS_ENV, &runs)?;
        }
        if let Some(seed) = lookup(SEED_ENV) {
            self.seed = seed;
        }
        if let Some(limit) = lookup(SHRINK_LIMIT_ENV) {
            self.shrink_limit = parse_count(SHRINK_LIMIT_ENV, &limit)?;
        }
        Ok(self)
    }

    /// Set the number of trials.
    pub fn with_runs(mut self, runs: usize) -> Self {
        self.num_runs = runs;
        self
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = seed.into();
        self
    }

    /// Set the shrink limit.
    pub fn with_shrink_limit(mut self, limit: usize) -> Self {
        self.shrink_limit = limit;
        self
    }

    /// Set the discard limit.
    pub fn with_discard_limit(mut self, limit: usize) -> Self {
        self.discard_limit = limit;
        self
    }
}

fn parse_count(key: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse()
        .map_err(|_| CheckError::config(format!("{key} must be a non-negative integer, got {raw:?}")))
}

/// Result of evaluating a predicate once.
pub type Outcome = std::result::Result<(), Failure>;

/// Predicate return types.
///
/// `false` is a falsification; an `Err` is a raised failure carrying its
/// message.
pub trait IntoOutcome {
    fn into_outcome(self) -> Outcome;
}

impl IntoOutcome for bool {
    fn into_outcome(self) -> Outcome {
        if self {
            Ok(())
        } else {
            Err(Failure::Falsified)
        }
    }
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Outcome {
        Ok(())
    }
}

impl<E: fmt::Display> IntoOutcome for std::result::Result<(), E> {
    fn into_outcome(self) -> Outcome {
        self.map_err(|err| Failure::Raised {
            message: err.to_string(),
        })
    }
}

/// Run `f`, turning a panic into a raised failure.
pub(crate) fn guarded<R, F>(f: F) -> Outcome
where
    R: IntoOutcome,
    F: FnOnce() -> R,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result.into_outcome(),
        Err(payload) => Err(Failure::Raised {
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panicked with a non-string payload".to_string()
    }
}

/// Call a function with its arguments packed in a tuple.
pub trait Apply<Args> {
    type Output;

    fn apply(&self, args: Args) -> Self::Output;
}

macro_rules! impl_apply {
    ($($name:ident),+) => {
        impl<Func, Out, $($name),+> Apply<($($name,)+)> for Func
        where
            Func: Fn($($name),+) -> Out,
        {
            type Output = Out;

            #[allow(non_snake_case)]
            fn apply(&self, ($($name,)+): ($($name,)+)) -> Out {
                self($($name),+)
            }
        }
    };
}

impl_apply!(A);
impl_apply!(A, B);
impl_apply!(A, B, C);
impl_apply!(A, B, C, D);
impl_apply!(A, B, C, D, E);
impl_apply!(A, B, C, D, E, F);

/// JSON-like rendering of an argument tuple, e.g. `[3, "ab"]`.
pub trait RenderArgs {
    fn render_args(&self) -> String;
}

macro_rules! impl_render_args {
    ($($name:ident : $index:tt),+) => {
        impl<$($name: fmt::Debug),+> RenderArgs for ($($name,)+) {
            fn render_args(&self) -> String {
                let parts = [$(format!("{:?}", self.$index)),+];
                format!("[{}]", parts.join(", "))
            }
        }
    };
}

impl_render_args!(A: 0);
impl_render_args!(A: 0, B: 1);
impl_render_args!(A: 0, B: 1, C: 2);
impl_render_args!(A: 0, B: 1, C: 2, D: 3);
impl_render_args!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_render_args!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);

type Hook = Box<dyn Fn()>;

/// A predicate over generated arguments.
///
/// Created with [`for_all`]; run with [`Property::go`].
pub struct Property<S: ShrinkableTuple> {
    generate: Box<dyn Fn(&mut Random) -> Result<S>>,
    predicate: Box<dyn Fn(S::Value) -> Outcome>,
    config: Config,
    startup: Option<Hook>,
    cleanup: Option<Hook>,
}

/// Check `predicate` against arguments drawn from `gens`.
///
/// The predicate takes one argument per generator and may return `bool`,
/// `()` or `Result<(), E>`; panics count as raised failures.
pub fn for_all<G, F>(predicate: F, gens: G) -> Property<G::Slots>
where
    G: GenTuple,
    F: Apply<<G::Slots as ShrinkableTuple>::Value> + 'static,
    F::Output: IntoOutcome,
{
    Property {
        generate: Box::new(move |rand: &mut Random| gens.generate_slots(rand)),
        predicate: Box::new(move |args| guarded(|| predicate.apply(args))),
        config: Config::default(),
        startup: None,
        cleanup: None,
    }
}

/// Where a run stopped.
struct Counterexample<S> {
    slots: S,
    failure: Failure,
    shrinks: usize,
}

impl<S> Property<S>
where
    S: ShrinkableTuple,
    S::Value: RenderArgs,
{
    /// Replace the whole configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn set_num_runs(mut self, runs: usize) -> Self {
        self.config.num_runs = runs;
        self
    }

    pub fn set_seed(mut self, seed: impl Into<String>) -> Self {
        self.config.seed = seed.into();
        self
    }

    pub fn set_shrink_limit(mut self, limit: usize) -> Self {
        self.config.shrink_limit = limit;
        self
    }

    /// Run `hook` before every trial, ahead of argument generation.
    pub fn on_startup<F: Fn() + 'static>(mut self, hook: F) -> Self {
        self.startup = Some(Box::new(hook));
        self
    }

    /// Run `hook` after every trial whose predicate returned, whether it
    /// passed or returned `false`. Skipped when the predicate raised.
    pub fn on_cleanup<F: Fn() + 'static>(mut self, hook: F) -> Self {
        self.cleanup = Some(Box::new(hook));
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the predicate once on fixed arguments. Any failure is `false`.
    pub fn example(&self, args: S::Value) -> bool {
        self.startup();
        self.evaluate(args).is_ok()
    }

    /// Run all trials.
    ///
    /// Returns `Ok(())` when every trial passes. A failing trial is shrunk
    /// and reported as `CheckError::PropertyFailed`.
    pub fn go(&self) -> Result<()> {
        let mut rand = Random::new(&self.config.seed);
        let seed = rand.seed().to_string();
        let mut discards = 0;
        let mut tests_run = 0;

        while tests_run < self.config.num_runs {
            self.startup();
            let slots = match (self.generate)(&mut rand) {
                Ok(slots) => slots,
                Err(err) if err.is_generation() => {
                    self.cleanup();
                    discards += 1;
                    warn!(seed = %seed, discards, error = %err, "discarding trial");
                    if discards > self.config.discard_limit {
                        return Err(CheckError::TooManyDiscards {
                            limit: self.config.discard_limit,
                        });
                    }
                    continue;
                }
                Err(err) => return Err(err),
            };
            discards = 0;
            tests_run += 1;

            let args = slots.value();
            debug!(trial = tests_run, args = %args.render_args(), "running trial");
            if let Err(failure) = self.evaluate(args) {
                info!(seed = %seed, trial = tests_run, cause = %failure, "property failed, shrinking");
                return Err(self.report(slots, failure, &seed, tests_run));
            }
        }

        info!(seed = %seed, tests_run, "property passed");
        Ok(())
    }

    fn startup(&self) {
        if let Some(hook) = &self.startup {
            hook();
        }
    }

    fn cleanup(&self) {
        if let Some(hook) = &self.cleanup {
            hook();
        }
    }

    /// Run the predicate; startup has already happened.
    fn evaluate(&self, args: S::Value) -> Outcome {
        let outcome = (self.predicate)(args);
        if !matches!(outcome, Err(Failure::Raised { .. })) {
            self.cleanup();
        }
        outcome
    }

    fn report(&self, slots: S, failure: Failure, seed: &str, tests_run: usize) -> CheckError {
        let original_args = slots.value().render_args();
        let minimal = self.shrink(slots, failure.clone());
        let args = minimal.slots.value().render_args();
        info!(
            shrinks = minimal.shrinks,
            args = %args,
            cause = %minimal.failure,
            "shrinking finished"
        );
        CheckError::PropertyFailed {
            args,
            original_args,
            shrunk: minimal.shrinks > 0,
            cause: failure.to_string(),
            seed: seed.to_string(),
            tests_run,
            shrinks_performed: minimal.shrinks,
        }
    }

    /// Shrink one argument position at a time, left to right.
    ///
    /// At each position the first candidate that fails the same way is
    /// adopted and its own shrinks are searched next. A position is left
    /// for good once none of the current candidates fails.
    fn shrink(&self, slots: S, failure: Failure) -> Counterexample<S> {
        let mut current = Counterexample {
            slots,
            failure,
            shrinks: 0,
        };
        let mut evaluated = 0;

        'positions: for position in 0..S::ARITY {
            loop {
                let mut adopted = None;
                for candidate in current.slots.shrinks_at(position).iter() {
                    if evaluated == self.config.shrink_limit {
                        debug!(limit = self.config.shrink_limit, "shrink limit reached");
                        break 'positions;
                    }
                    evaluated += 1;
                    self.startup();
                    if let Err(found) = self.evaluate(candidate.value()) {
                        if found.same_kind(&current.failure) {
                            adopted = Some((candidate, found));
                            break;
                        }
                    }
                }
                match adopted {
                    Some((candidate, found)) => {
                        current.slots = candidate;
                        current.failure = found;
                        current.shrinks += 1;
                        debug!(
                            position,
                            args = %current.slots.value().render_args(),
                            "adopted shrink"
                        );
                    }
                    None => break,
                }
            }
        }
        current
    }
}

impl<S: ShrinkableTuple> fmt::Debug for Property<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("config", &self.config)
            .field("arity", &S::ARITY)
            .finish_non_exhaustive()
    }
}
