//! Shrinking properties
//!
//! These properties check the shape of the primitive shrink trees: what is
//! tried first, and where a greedy descent ends up.

use crate::arbitrary_seed;
use rosecheck::*;

/// Follow the first child satisfying `keep` until none does.
fn descend<T: Clone + 'static>(tree: Shrinkable<T>, keep: impl Fn(&T) -> bool) -> T {
    let mut current = tree;
    loop {
        match current.shrinks().iter().find(|child| keep(&child.value)) {
            Some(child) => current = child,
            None => return current.value,
        }
    }
}

/// Property: Zero is the first shrink of every non-zero integer
pub fn test_zero_is_first_shrink() {
    let prop = for_all(
        |value: i64| {
            let tree = shrinker::binary_search_shrinkable(value);
            match tree.shrinks().head() {
                Some(first) => value != 0 && first.value == 0,
                None => value == 0,
            }
        },
        (Gen::<i64>::integers(),),
    )
    .set_num_runs(200);

    match prop.go() {
        Ok(()) => println!("✓ Zero first shrink property passed"),
        Err(err) => panic!("Zero first shrink property failed: {err}"),
    }
}

/// Property: A greedy descent under `v >= k` stops exactly at `k`
pub fn test_integer_shrinks_converge() {
    let prop = for_all(
        |seed: String, threshold: i64| {
            let mut rand = Random::new(&seed);
            let tree = match shrinker::generate_integer(&mut rand, 0, 10_000) {
                Ok(tree) => tree,
                Err(_) => return false,
            };
            tree.value < threshold || descend(tree, |v| *v >= threshold) == threshold
        },
        (arbitrary_seed(), Gen::<i64>::interval(0, 5000)),
    )
    .set_num_runs(50);

    match prop.go() {
        Ok(()) => println!("✓ Integer shrink convergence property passed"),
        Err(err) => panic!("Integer shrink convergence property failed: {err}"),
    }
}

/// Property: Finite non-zero floats try 0.0 first and only shrink to finite values
pub fn test_float_first_shrink_is_zero() {
    let prop = for_all(
        |value: f64| {
            if value == 0.0 || !value.is_finite() {
                return true;
            }
            let tree = shrinker::shrink_float(value);
            let children: Vec<f64> = tree.shrinks().iter().take(20).map(|c| c.value).collect();
            children.first() == Some(&0.0) && children.iter().all(|c| c.is_finite())
        },
        (Gen::<f64>::floats(),),
    )
    .set_num_runs(200);

    match prop.go() {
        Ok(()) => println!("✓ Float first shrink property passed"),
        Err(err) => panic!("Float first shrink property failed: {err}"),
    }
}
