//! Distribution validation properties
//!
//! These properties sample choice generators many times per seed and check
//! that the observed frequencies follow the requested weights.

use crate::arbitrary_seed;
use rosecheck::*;

const SAMPLES: usize = 1000;

fn frequency<T: Clone + 'static>(gen: &Gen<T>, seed: &str, hit: impl Fn(&T) -> bool) -> Option<f64> {
    let mut rand = Random::new(seed);
    let mut hits = 0usize;
    for _ in 0..SAMPLES {
        if hit(&gen.generate(&mut rand).ok()?.value) {
            hits += 1;
        }
    }
    Some(hits as f64 / SAMPLES as f64)
}

/// Property: A value weighted 0.8 is chosen roughly 80% of the time, with
/// the unweighted value taking the remainder
pub fn test_weighted_value_frequency() {
    let prop = for_all(
        |seed: String| {
            let gen = match element_of(vec![
                weighted_value(1, 0.8),
                weighted_value(2, 0.15),
                3.into(),
            ]) {
                Ok(gen) => gen,
                Err(_) => return false,
            };
            matches!(frequency(&gen, &seed, |v| *v == 1), Some(f) if (0.7..=0.9).contains(&f))
        },
        (arbitrary_seed(),),
    )
    .set_num_runs(10);

    match prop.go() {
        Ok(()) => println!("✓ Weighted value frequency property passed"),
        Err(err) => panic!("Weighted value frequency property failed: {err}"),
    }
}

/// Property: one_of only yields values of its member generators, and uses all of them
pub fn test_one_of_union() {
    let prop = for_all(
        |seed: String| {
            let gen = match one_of(vec![
                Gen::<i32>::interval(0, 10).into(),
                Gen::<i32>::interval(100, 110).into(),
            ]) {
                Ok(gen) => gen,
                Err(_) => return false,
            };
            let in_union = frequency(&gen, &seed, |v| (0..=10).contains(v) || (100..=110).contains(v));
            let low = frequency(&gen, &seed, |v| *v <= 10);
            in_union == Some(1.0) && matches!(low, Some(f) if (0.35..=0.65).contains(&f))
        },
        (arbitrary_seed(),),
    )
    .set_num_runs(10);

    match prop.go() {
        Ok(()) => println!("✓ One-of union property passed"),
        Err(err) => panic!("One-of union property failed: {err}"),
    }
}

/// Property: boolean(p) yields true with frequency close to p
pub fn test_boolean_probability() {
    let prop = for_all(
        |seed: String, percent: u32| {
            let p = percent as f64 / 100.0;
            let observed = frequency(&Gen::boolean(p), &seed, |v| *v);
            matches!(observed, Some(f) if (f - p).abs() <= 0.1)
        },
        (arbitrary_seed(), Gen::<u32>::interval(0, 100)),
    )
    .set_num_runs(20);

    match prop.go() {
        Ok(()) => println!("✓ Boolean probability property passed"),
        Err(err) => panic!("Boolean probability property failed: {err}"),
    }
}
