//! Combinator properties
//!
//! These properties verify the laws the combinators must obey, on the
//! generated value and on its shrink tree.

use crate::{arbitrary_seed, tree_nodes};
use rosecheck::*;

/// Property: map(f).map(g) draws the same tree as map(g . f)
pub fn test_map_composition() {
    let prop = for_all(
        |seed: String| {
            let base = Gen::<i64>::interval(-1000, 1000);
            let chained = base.map(|x| x * 3).map(|x| x + 7);
            let fused = base.map(|x| x * 3 + 7);

            let left = chained.generate(&mut Random::new(&seed));
            let right = fused.generate(&mut Random::new(&seed));
            match (left, right) {
                (Ok(left), Ok(right)) => tree_nodes(&left, 2) == tree_nodes(&right, 2),
                _ => false,
            }
        },
        (arbitrary_seed(),),
    )
    .set_num_runs(50);

    match prop.go() {
        Ok(()) => println!("✓ Map composition property passed"),
        Err(err) => panic!("Map composition property failed: {err}"),
    }
}

/// Property: Every value reachable from a filtered tree satisfies the filter
pub fn test_filter_holds_through_tree() {
    let prop = for_all(
        |seed: String, modulus: i64| {
            let gen = Gen::<i64>::interval(-500, 500).filter(move |x| x % modulus == 0);
            match gen.generate(&mut Random::new(&seed)) {
                Ok(tree) => tree_nodes(&tree, 3).iter().all(|x| x % modulus == 0),
                Err(_) => false,
            }
        },
        (arbitrary_seed(), Gen::<i64>::interval(1, 5)),
    )
    .set_num_runs(50);

    match prop.go() {
        Ok(()) => println!("✓ Filter invariant property passed"),
        Err(err) => panic!("Filter invariant property failed: {err}"),
    }
}

/// Property: chain keeps the inner value consistent with the outer one,
/// through shrinking, and equal seeds give equal draws
pub fn test_flat_map_determinism() {
    let prop = for_all(
        |seed: String| {
            let gen = Gen::<usize>::interval(0, 8).chain(|n| match vec_of(Gen::<u8>::integers(), 0, *n) {
                Ok(sized) => sized.to_gen(),
                Err(err) => Gen::new(move |_| Err(err.clone())),
            });

            let first = gen.generate(&mut Random::new(&seed));
            let second = gen.generate(&mut Random::new(&seed));
            match (first, second) {
                (Ok(first), Ok(second)) => {
                    let nodes = tree_nodes(&first, 2);
                    first.value == second.value && nodes.iter().all(|(n, items)| items.len() <= *n)
                }
                _ => false,
            }
        },
        (arbitrary_seed(),),
    )
    .set_num_runs(50);

    match prop.go() {
        Ok(()) => println!("✓ Chain consistency property passed"),
        Err(err) => panic!("Chain consistency property failed: {err}"),
    }
}
