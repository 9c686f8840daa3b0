//! Generator invariant properties
//!
//! These properties ensure generators respect their bounds, both for the
//! generated value and for every value reachable by shrinking.

use crate::{arbitrary_seed, tree_nodes};
use rosecheck::*;

/// Property: Interval generators stay within their bounds
pub fn test_interval_bounds() {
    let prop = for_all(
        |seed: String, min: i64, width: i64| {
            let max = min + width;
            let mut rand = Random::new(&seed);
            let gen = Gen::<i64>::interval(min, max);
            (0..20).all(|_| {
                let value = gen.generate(&mut rand).map(|tree| tree.value);
                matches!(value, Ok(v) if (min..=max).contains(&v))
            })
        },
        (
            arbitrary_seed(),
            Gen::<i64>::interval(-1000, 1000),
            Gen::<i64>::interval(0, 500),
        ),
    )
    .set_num_runs(30);

    match prop.go() {
        Ok(()) => println!("✓ Interval bounds property passed"),
        Err(err) => panic!("Interval bounds property failed: {err}"),
    }
}

/// Property: Every shrink of an integer stays within the generator's range
pub fn test_shrink_tree_bounds() {
    let prop = for_all(
        |seed: String, min: i64, width: i64| {
            let max = min + width;
            let mut rand = Random::new(&seed);
            let tree = match shrinker::generate_integer(&mut rand, min, max) {
                Ok(tree) => tree,
                Err(_) => return false,
            };
            tree_nodes(&tree, 3).iter().all(|v| (min..=max).contains(v))
        },
        (
            arbitrary_seed(),
            Gen::<i64>::interval(-500, 500),
            Gen::<i64>::interval(0, 300),
        ),
    )
    .set_num_runs(30);

    match prop.go() {
        Ok(()) => println!("✓ Shrink tree bounds property passed"),
        Err(err) => panic!("Shrink tree bounds property failed: {err}"),
    }
}

/// Property: just(x) always yields x and nothing to shrink
pub fn test_just_is_idempotent() {
    let prop = for_all(
        |seed: String, x: i32| {
            let mut rand = Random::new(&seed);
            match just(x).generate(&mut rand) {
                Ok(tree) => tree.value == x && !tree.has_shrinks(),
                Err(_) => false,
            }
        },
        (arbitrary_seed(), Gen::<i32>::integers()),
    );

    match prop.go() {
        Ok(()) => println!("✓ Just idempotence property passed"),
        Err(err) => panic!("Just idempotence property failed: {err}"),
    }
}

/// Property: Equal seeds and a clone mid-stream yield identical draws
pub fn test_random_determinism() {
    let prop = for_all(
        |seed: String, skip: usize| {
            let mut first = Random::new(&seed);
            let mut second = Random::new(&seed);
            for _ in 0..skip {
                if first.interval(0, 100).ok() != second.interval(0, 100).ok() {
                    return false;
                }
            }
            let mut clone = first.clone();
            (0..10).all(|_| {
                first.next_long(-50, 50).ok() == clone.next_long(-50, 50).ok()
                    && first.next_boolean(0.3) == clone.next_boolean(0.3)
            })
        },
        (arbitrary_seed(), Gen::<usize>::interval(0, 20)),
    )
    .set_num_runs(40);

    match prop.go() {
        Ok(()) => println!("✓ Random determinism property passed"),
        Err(err) => panic!("Random determinism property failed: {err}"),
    }
}
