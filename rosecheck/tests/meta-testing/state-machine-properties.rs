//! State machine testing properties
//!
//! These properties drive the stateful runner with small systems under test:
//! a correct counter that must always agree with its model, and a stack with
//! a capacity bug whose failures must replay and shrink deterministically.

use crate::arbitrary_seed;
use rosecheck::*;

#[derive(Debug, Clone, Default)]
struct Counter {
    value: i64,
}

fn counter_actions(_: &Counter, _: &i64) -> Gen<Action<Counter, i64>> {
    let add = Gen::<i64>::interval(1, 5).map(|&n| {
        Action::new(format!("add {n}"), move |counter: &mut Counter, model: &mut i64| {
            counter.value += n;
            *model += n;
        })
    });
    let reset = Action::new("reset", |counter: &mut Counter, model: &mut i64| {
        counter.value = 0;
        *model = 0;
    });
    let decrement = Action::new("decrement", |counter: &mut Counter, model: &mut i64| {
        counter.value -= 1;
        *model -= 1;
        counter.value == *model
    });
    one_of(vec![
        weighted_gen(add, 0.5),
        weighted_gen(just(decrement), 0.4),
        just(reset).into(),
    ])
    .unwrap_or_else(|err| panic!("{err}"))
}

/// A stack whose push fails once it holds more than `capacity` items.
fn capped_stack(capacity: usize) -> StatefulProperty<Vec<u8>, ()> {
    simple_stateful_property(just(Vec::new()), move |_| {
        let push = Action::simple("push", move |stack: &mut Vec<u8>| {
            stack.push(1);
            stack.len() <= capacity
        });
        let peek = Action::simple("peek", |stack: &mut Vec<u8>| stack.last().map_or(true, |top| *top == 1));
        element_of(vec![push.into(), peek.into()]).unwrap_or_else(|err| panic!("{err}"))
    })
    .set_min_actions(10)
    .set_max_actions(40)
}

/// Property: A correct counter always agrees with its model
pub fn test_counter_model() {
    let prop = for_all(
        |seed: String| {
            stateful_property(just(Counter::default()), |counter: &Counter| counter.value, counter_actions)
                .set_seed(seed)
                .set_num_runs(20)
                .set_post_check(|counter: &Counter, model: &i64| counter.value == *model)
                .go()
                .is_ok()
        },
        (arbitrary_seed(),),
    )
    .set_num_runs(10);

    match prop.go() {
        Ok(()) => println!("✓ Counter model property passed"),
        Err(err) => panic!("Counter model property failed: {err}"),
    }
}

/// Property: The same seed reproduces the same stateful failure report
pub fn test_replay_is_deterministic() {
    let prop = for_all(
        |seed: String| {
            let first = capped_stack(2).set_seed(seed.clone()).go();
            let second = capped_stack(2).set_seed(seed).go();
            first.is_err() && first == second
        },
        (arbitrary_seed(),),
    )
    .set_num_runs(10);

    match prop.go() {
        Ok(()) => println!("✓ Replay determinism property passed"),
        Err(err) => panic!("Replay determinism property failed: {err}"),
    }
}

/// Property: Shrinking removes every action not needed to overflow the stack
pub fn test_replay_shrinks_to_cause() {
    let prop = for_all(
        |seed: String, capacity: usize| match capped_stack(capacity).set_seed(seed).go() {
            Err(CheckError::StatefulFailed { actions, cause, .. }) => {
                actions.len() == capacity + 1
                    && actions.iter().all(|name| name == "push")
                    && cause == "property returned false"
            }
            _ => false,
        },
        (arbitrary_seed(), Gen::<usize>::interval(1, 4)),
    )
    .set_num_runs(10);

    match prop.go() {
        Ok(()) => println!("✓ Replay shrinking property passed"),
        Err(err) => panic!("Replay shrinking property failed: {err}"),
    }
}
