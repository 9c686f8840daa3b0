//! Container generator properties
//!
//! These properties check that arrays, sets, dictionaries and strings keep
//! their size bounds and element constraints everywhere in the shrink tree.

use crate::{arbitrary_seed, tree_nodes};
use rosecheck::*;

/// Property: Every array in the tree has a length within the bounds
pub fn test_vec_size_bounds() {
    let prop = for_all(
        |seed: String, min: usize, extra: usize| {
            let max = min + extra;
            let gen = match vec_of(Gen::<i32>::interval(0, 100), min, max) {
                Ok(gen) => gen,
                Err(_) => return false,
            };
            match gen.generate(&mut Random::new(&seed)) {
                Ok(tree) => tree_nodes(&tree, 2)
                    .iter()
                    .all(|items| (min..=max).contains(&items.len())),
                Err(_) => false,
            }
        },
        (
            arbitrary_seed(),
            Gen::<usize>::interval(0, 5),
            Gen::<usize>::interval(0, 10),
        ),
    )
    .set_num_runs(40);

    match prop.go() {
        Ok(()) => println!("✓ Array size bounds property passed"),
        Err(err) => panic!("Array size bounds property failed: {err}"),
    }
}

/// Property: Set shrinks never collapse below the minimum size
pub fn test_set_uniqueness() {
    let prop = for_all(
        |seed: String, min: usize| {
            let gen = match set_of(Gen::<i32>::interval(0, 50), min, 10) {
                Ok(gen) => gen,
                Err(_) => return false,
            };
            match gen.generate(&mut Random::new(&seed)) {
                Ok(tree) => tree_nodes(&tree, 2)
                    .iter()
                    .all(|set| (min..=10).contains(&set.len())),
                Err(_) => false,
            }
        },
        (arbitrary_seed(), Gen::<usize>::interval(0, 10)),
    )
    .set_num_runs(40);

    match prop.go() {
        Ok(()) => println!("✓ Set uniqueness property passed"),
        Err(err) => panic!("Set uniqueness property failed: {err}"),
    }
}

/// Property: Dictionary shrinks keep distinct keys and the minimum size
pub fn test_dictionary_keys() {
    let prop = for_all(
        |seed: String| {
            let gen = match dictionary(Gen::<u8>::interval(0, 20), Gen::bool(), 2, 8) {
                Ok(gen) => gen,
                Err(_) => return false,
            };
            match gen.generate(&mut Random::new(&seed)) {
                Ok(tree) => tree_nodes(&tree, 2).iter().all(|map| {
                    (2..=8).contains(&map.len()) && map.keys().all(|key| *key <= 20)
                }),
                Err(_) => false,
            }
        },
        (arbitrary_seed(),),
    )
    .set_num_runs(40);

    match prop.go() {
        Ok(()) => println!("✓ Dictionary keys property passed"),
        Err(err) => panic!("Dictionary keys property failed: {err}"),
    }
}

/// Property: String generators only use characters from their alphabet
pub fn test_string_alphabets() {
    let prop = for_all(
        |seed: String| {
            let (printable, unicode) = match (printable_ascii_string(0, 20), unicode_string(0, 20)) {
                (Ok(printable), Ok(unicode)) => (printable, unicode),
                _ => return false,
            };
            let mut rand = Random::new(&seed);
            let printable_ok = match printable.generate(&mut rand) {
                Ok(tree) => tree_nodes(&tree, 2)
                    .iter()
                    .all(|s| s.chars().all(|c| (' '..='~').contains(&c))),
                Err(_) => false,
            };
            let unicode_ok = match unicode.generate(&mut rand) {
                Ok(tree) => tree_nodes(&tree, 2)
                    .iter()
                    .all(|s| s.chars().count() <= 20 && !s.contains('\0')),
                Err(_) => false,
            };
            printable_ok && unicode_ok
        },
        (arbitrary_seed(),),
    )
    .set_num_runs(40);

    match prop.go() {
        Ok(()) => println!("✓ String alphabet property passed"),
        Err(err) => panic!("String alphabet property failed: {err}"),
    }
}
