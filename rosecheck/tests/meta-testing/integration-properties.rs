//! Integration properties
//!
//! These properties run complete inner properties under arbitrary seeds and
//! check the failure reports they produce.

use crate::arbitrary_seed;
use rosecheck::*;

/// Property: A two-argument counterexample always minimizes to the same pair
pub fn test_minimized_pair() {
    let prop = for_all(
        |seed: String| {
            let inner = for_all(
                |a: i64, b: i64| a > 80 || b < 40,
                (Gen::<i64>::interval(0, 1000), Gen::<i64>::interval(0, 1000)),
            )
            .set_seed(seed)
            .set_num_runs(1000);

            matches!(inner.go(), Err(CheckError::PropertyFailed { args, .. }) if args == "[0, 40]")
        },
        (arbitrary_seed(),),
    )
    .set_num_runs(20);

    match prop.go() {
        Ok(()) => println!("✓ Minimized pair property passed"),
        Err(err) => panic!("Minimized pair property failed: {err}"),
    }
}

/// Property: Reports carry the seed, the original case and the minimal case
pub fn test_report_mentions_original() {
    let prop = for_all(
        |seed: String| {
            let inner = for_all(|v: i64| v < 100, (Gen::<i64>::interval(0, 1000),))
                .set_seed(seed.clone())
                .set_num_runs(1000);

            match inner.go() {
                Err(CheckError::PropertyFailed {
                    args,
                    original_args,
                    seed: reported,
                    tests_run,
                    cause,
                    ..
                }) => {
                    let original: Option<i64> = original_args
                        .trim_matches(|c| c == '[' || c == ']')
                        .parse()
                        .ok();
                    args == "[100]"
                        && matches!(original, Some(v) if v >= 100)
                        && reported == seed
                        && tests_run >= 1
                        && cause == "property returned false"
                }
                _ => false,
            }
        },
        (arbitrary_seed(),),
    )
    .set_num_runs(20);

    match prop.go() {
        Ok(()) => println!("✓ Report contents property passed"),
        Err(err) => panic!("Report contents property failed: {err}"),
    }
}

/// Property: A failing case with nothing to shrink is reported as such
pub fn test_no_shrink_found() {
    let prop = for_all(
        |seed: String| {
            let inner = for_all(|v: i64| v != 7, (just(7i64),)).set_seed(seed);
            match inner.go() {
                Err(err @ CheckError::PropertyFailed { .. }) => {
                    let message = err.to_string();
                    match err {
                        CheckError::PropertyFailed {
                            args,
                            original_args,
                            shrunk,
                            ..
                        } => {
                            !shrunk
                                && args == "[7]"
                                && original_args == args
                                && message.contains("no shrink found")
                        }
                        _ => false,
                    }
                }
                _ => false,
            }
        },
        (arbitrary_seed(),),
    )
    .set_num_runs(10);

    match prop.go() {
        Ok(()) => println!("✓ No shrink found property passed"),
        Err(err) => panic!("No shrink found property failed: {err}"),
    }
}
