//! Model-based testing of stateful systems.
//!
//! A trial generates an initial object and a model, then repeatedly asks an
//! action factory for the next action given the current object and model,
//! applying each action as soon as it is generated. The random source used
//! for every step is recorded. Failing trials are shrunk by replaying
//! shorter lists of recorded sources from the same initial state, so every
//! smaller case is produced by the same factory from a reachable state.

use crate::error::{CheckError, Failure, Result};
use crate::gen::Gen;
use crate::property::{guarded, IntoOutcome, Outcome};
use crate::random::Random;
use crate::shrinkable::Shrinkable;
use crate::shrinker;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, info, trace, warn};

/// A named operation on the system under test and its model.
pub struct Action<Obj, Model> {
    name: String,
    run: Rc<dyn Fn(&mut Obj, &mut Model) -> Outcome>,
}

/// An action for tests without a model.
pub type SimpleAction<Obj> = Action<Obj, ()>;

impl<Obj, Model> Clone for Action<Obj, Model> {
    fn clone(&self) -> Self {
        Action {
            name: self.name.clone(),
            run: self.run.clone(),
        }
    }
}

impl<Obj, Model> fmt::Debug for Action<Obj, Model> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Action").field(&self.name).finish()
    }
}

impl<Obj, Model> fmt::Display for Action<Obj, Model> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl<Obj: 'static, Model: 'static> Action<Obj, Model> {
    /// Create an action. `f` may return `bool`, `()` or `Result<(), E>`;
    /// a panic counts as a raised failure.
    pub fn new<F, R>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Obj, &mut Model) -> R + 'static,
        R: IntoOutcome,
    {
        Action {
            name: name.into(),
            run: Rc::new(move |obj: &mut Obj, model: &mut Model| guarded(|| f(obj, model))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply the action.
    pub fn run(&self, obj: &mut Obj, model: &mut Model) -> Outcome {
        (self.run)(obj, model)
    }
}

impl<Obj: 'static> Action<Obj, ()> {
    /// Create an action that only touches the object.
    pub fn simple<F, R>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Obj) -> R + 'static,
        R: IntoOutcome,
    {
        Action::new(name, move |obj: &mut Obj, _: &mut ()| f(obj))
    }
}

type ModelFactory<Obj, Model> = Box<dyn Fn(&Obj) -> Model>;
type ActionFactory<Obj, Model> = Box<dyn Fn(&Obj, &Model) -> Gen<Action<Obj, Model>>>;
type PostCheck<Obj, Model> = Box<dyn Fn(&Obj, &Model) -> Outcome>;
type Hook = Box<dyn Fn()>;

/// A failing trial, replayable from `initial` and `steps`.
#[derive(Clone)]
struct Counterexample {
    initial: Random,
    steps: Vec<Random>,
    actions: Vec<String>,
    failure: Failure,
}

enum Replay {
    Passed,
    Discarded,
    Failed(Counterexample),
}

/// A model-based property.
///
/// Built with [`stateful_property`] or [`simple_stateful_property`] and
/// run with [`StatefulProperty::go`].
pub struct StatefulProperty<Obj, Model> {
    initial: Gen<Obj>,
    model: ModelFactory<Obj, Model>,
    actions: ActionFactory<Obj, Model>,
    seed: String,
    num_runs: usize,
    min_actions: usize,
    max_actions: usize,
    max_consecutive_generation_failures: usize,
    shrink_limit: usize,
    verbose: bool,
    post_check: Option<PostCheck<Obj, Model>>,
    startup: Option<Hook>,
    cleanup: Option<Hook>,
}

/// A stateful property with a model built from the initial object.
///
/// `actions` is called before every step with the current object and model
/// and returns the generator for the next action.
pub fn stateful_property<Obj, Model, M, A>(initial: Gen<Obj>, model: M, actions: A) -> StatefulProperty<Obj, Model>
where
    Obj: Clone + 'static,
    Model: 'static,
    M: Fn(&Obj) -> Model + 'static,
    A: Fn(&Obj, &Model) -> Gen<Action<Obj, Model>> + 'static,
{
    StatefulProperty {
        initial,
        model: Box::new(model),
        actions: Box::new(actions),
        seed: String::new(),
        num_runs: 100,
        min_actions: 1,
        max_actions: 100,
        max_consecutive_generation_failures: 100,
        shrink_limit: 10_000,
        verbose: false,
        post_check: None,
        startup: None,
        cleanup: None,
    }
}

/// A stateful property without a model.
pub fn simple_stateful_property<Obj, A>(initial: Gen<Obj>, actions: A) -> StatefulProperty<Obj, ()>
where
    Obj: Clone + 'static,
    A: Fn(&Obj) -> Gen<SimpleAction<Obj>> + 'static,
{
    stateful_property(initial, |_: &Obj| (), move |obj: &Obj, _: &()| actions(obj))
}

impl<Obj, Model> StatefulProperty<Obj, Model>
where
    Obj: Clone + 'static,
    Model: 'static,
{
    pub fn set_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = seed.into();
        self
    }

    pub fn set_num_runs(mut self, runs: usize) -> Self {
        self.num_runs = runs;
        self
    }

    pub fn set_min_actions(mut self, min: usize) -> Self {
        self.min_actions = min;
        self
    }

    pub fn set_max_actions(mut self, max: usize) -> Self {
        self.max_actions = max;
        self
    }

    /// Stop generating actions for a trial after this many generation
    /// errors in a row.
    ///
    /// The trial is truncated rather than aborted: the actions applied so
    /// far stand, and the post-check and cleanup still run on the state
    /// they left behind.
    pub fn set_max_consecutive_generation_failures(mut self, limit: usize) -> Self {
        self.max_consecutive_generation_failures = limit;
        self
    }

    /// Maximum number of replays spent on shrinking.
    pub fn set_shrink_limit(mut self, limit: usize) -> Self {
        self.shrink_limit = limit;
        self
    }

    /// Log every applied action at `info` instead of `trace`.
    pub fn set_verbosity(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Check the object against the model after the last action.
    pub fn set_post_check<F, R>(mut self, check: F) -> Self
    where
        F: Fn(&Obj, &Model) -> R + 'static,
        R: IntoOutcome,
    {
        self.post_check = Some(Box::new(move |obj: &Obj, model: &Model| {
            guarded(|| check(obj, model))
        }));
        self
    }

    /// Run `hook` before each trial or replay, ahead of generation.
    pub fn set_on_startup<F: Fn() + 'static>(mut self, hook: F) -> Self {
        self.startup = Some(Box::new(hook));
        self
    }

    /// Run `hook` after each trial or replay that did not raise.
    pub fn set_on_cleanup<F: Fn() + 'static>(mut self, hook: F) -> Self {
        self.cleanup = Some(Box::new(hook));
        self
    }

    /// Run all trials, shrinking and reporting the first failure.
    pub fn go(&self) -> Result<()> {
        if self.min_actions > self.max_actions {
            return Err(CheckError::config(format!(
                "min actions {} is greater than max actions {}",
                self.min_actions, self.max_actions
            )));
        }

        let mut rand = Random::new(&self.seed);
        let seed = rand.seed().to_string();
        for trial in 1..=self.num_runs {
            debug!(trial, "running stateful trial");
            if let Some(found) = self.trial(&mut rand)? {
                info!(
                    seed = %seed,
                    trial,
                    actions = found.actions.len(),
                    cause = %found.failure,
                    "stateful property failed, shrinking"
                );
                return Err(self.report(found, &seed, trial));
            }
        }

        info!(seed = %seed, tests_run = self.num_runs, "stateful property passed");
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

    /// Close a failed run; cleanup is skipped after a raised failure.
    fn fail(&self, found: Counterexample) -> Counterexample {
        if !matches!(found.failure, Failure::Raised { .. }) {
            self.cleanup();
        }
        found
    }

    fn check_after(&self, obj: &Obj, model: &Model) -> Outcome {
        match &self.post_check {
            Some(check) => check(obj, model),
            None => Ok(()),
        }
    }

    /// Generate and apply one action.
    fn step(&self, obj: &mut Obj, model: &mut Model, rand: &mut Random) -> Result<(String, Outcome)> {
        let action = (self.actions)(obj, model).generate(rand)?.value;
        if self.verbose {
            info!(action = action.name(), "applying action");
        } else {
            trace!(action = action.name(), "applying action");
        }
        let outcome = action.run(obj, model);
        Ok((action.name().to_string(), outcome))
    }

    fn trial(&self, rand: &mut Random) -> Result<Option<Counterexample>> {
        let initial = rand.clone();
        self.startup();
        let mut obj = match self.initial.generate(rand) {
            Ok(tree) => tree.value,
            Err(err) if err.is_generation() => {
                warn!(error = %err, "initial state generation failed, skipping trial");
                self.cleanup();
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        let mut model = (self.model)(&obj);
        let len = rand.interval(self.min_actions as i64, self.max_actions as i64)? as usize;

        let mut steps = Vec::with_capacity(len);
        let mut actions = Vec::with_capacity(len);
        let mut consecutive_failures = 0;
        while steps.len() < len {
            let step_rand = rand.clone();
            match self.step(&mut obj, &mut model, rand) {
                Ok((name, outcome)) => {
                    consecutive_failures = 0;
                    steps.push(step_rand);
                    actions.push(name);
                    if let Err(failure) = outcome {
                        return Ok(Some(self.fail(Counterexample {
                            initial,
                            steps,
                            actions,
                            failure,
                        })));
                    }
                }
                Err(err) if err.is_generation() => {
                    consecutive_failures += 1;
                    if consecutive_failures > self.max_consecutive_generation_failures {
                        warn!(
                            applied = steps.len(),
                            failures = consecutive_failures,
                            "too many action generation failures, ending trial early"
                        );
                        break;
                    }
                }
                Err(err) => return Err(err),
            }
        }

        if let Err(failure) = self.check_after(&obj, &model) {
            return Ok(Some(self.fail(Counterexample {
                initial,
                steps,
                actions,
                failure,
            })));
        }
        self.cleanup();
        Ok(None)
    }

    /// Rerun a trial from `initial`, regenerating one action per step.
    fn replay(&self, initial: &Random, steps: &[Random]) -> Replay {
        self.startup();
        let mut rand = initial.clone();
        let Ok(tree) = self.initial.generate(&mut rand) else {
            self.cleanup();
            return Replay::Discarded;
        };
        let mut obj = tree.value;
        let mut model = (self.model)(&obj);

        let mut actions = Vec::with_capacity(steps.len());
        for (index, step) in steps.iter().enumerate() {
            let mut rand = step.clone();
            match self.step(&mut obj, &mut model, &mut rand) {
                Ok((name, outcome)) => {
                    actions.push(name);
                    if let Err(failure) = outcome {
                        return Replay::Failed(self.fail(Counterexample {
                            initial: initial.clone(),
                            steps: steps[..=index].to_vec(),
                            actions,
                            failure,
                        }));
                    }
                }
                Err(_) => {
                    self.cleanup();
                    return Replay::Discarded;
                }
            }
        }

        if let Err(failure) = self.check_after(&obj, &model) {
            return Replay::Failed(self.fail(Counterexample {
                initial: initial.clone(),
                steps: steps.to_vec(),
                actions,
                failure,
            }));
        }
        self.cleanup();
        Replay::Passed
    }

    fn report(&self, found: Counterexample, seed: &str, tests_run: usize) -> CheckError {
        let cause = found.failure.to_string();
        let (minimal, shrinks) = self.shrink(found);
        info!(shrinks, actions = ?minimal.actions, "stateful shrinking finished");
        CheckError::StatefulFailed {
            actions: minimal.actions,
            shrunk: shrinks > 0,
            cause,
            seed: seed.to_string(),
            tests_run,
            shrinks_performed: shrinks,
        }
    }

    /// Shrink the recorded steps to a fixed point.
    ///
    /// Shorter prefixes are searched first through the length shrink tree.
    /// When no prefix fails, single steps are removed one at a time; any
    /// success restarts the search.
    fn shrink(&self, found: Counterexample) -> (Counterexample, usize) {
        let mut best = found;
        let mut shrinks = 0;
        let mut replays = 0;

        'fixpoint: loop {
            let mut node = prefix_tree(&best.steps);
            loop {
                let mut adopted = None;
                for candidate in node.shrinks().iter() {
                    if replays == self.shrink_limit {
                        break 'fixpoint;
                    }
                    replays += 1;
                    if let Replay::Failed(smaller) = self.replay(&best.initial, &candidate.value) {
                        adopted = Some((candidate, smaller));
                        break;
                    }
                }
                let Some((candidate, smaller)) = adopted else {
                    break;
                };
                shrinks += 1;
                debug!(steps = smaller.steps.len(), "adopted shorter prefix");
                node = if smaller.steps.len() == candidate.value.len() {
                    candidate
                } else {
                    prefix_tree(&smaller.steps)
                };
                best = smaller;
            }

            for index in 0..best.steps.len() {
                if replays == self.shrink_limit {
                    break 'fixpoint;
                }
                replays += 1;
                let mut steps = best.steps.clone();
                steps.remove(index);
                if let Replay::Failed(smaller) = self.replay(&best.initial, &steps) {
                    shrinks += 1;
                    debug!(removed = index, steps = smaller.steps.len(), "adopted step removal");
                    best = smaller;
                    continue 'fixpoint;
                }
            }
            break;
        }
        (best, shrinks)
    }
}

fn prefix_tree(steps: &[Random]) -> Shrinkable<Vec<Random>> {
    let elements = steps.iter().cloned().map(Shrinkable::new).collect();
    shrinker::shrink_elements(elements, 0, None)
}
