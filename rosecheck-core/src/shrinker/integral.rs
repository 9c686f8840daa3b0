//! Integer shrinking by bisection.
//!
//! The trees are built over `i128` so every primitive integer type,
//! including `u64` past `i64::MAX`, shares one implementation.

use crate::error::{CheckError, Result};
use crate::random::Random;
use crate::shrinkable::Shrinkable;
use crate::stream::Stream;

/// Shrink tree for `value` converging on zero.
///
/// Zero is always the first shrink (unless `value` is zero, which has
/// none). After it come the midpoints of the interval between zero and
/// `value`, each carrying a subtree that covers its own half.
pub fn binary_search_shrinkable(value: i64) -> Shrinkable<i64> {
    binary_search_wide(value.into()).map(|v| *v as i64)
}

/// `binary_search_shrinkable` over `i128`.
pub fn binary_search_wide(value: i128) -> Shrinkable<i128> {
    if value == 0 {
        Shrinkable::new(0)
    } else if value > 0 {
        Shrinkable::new(value).with(move || {
            Stream::one(Shrinkable::new(0)).concat_lazy(move || towards_zero_from_above(0, value))
        })
    } else {
        Shrinkable::new(value).with(move || {
            Stream::one(Shrinkable::new(0)).concat_lazy(move || towards_zero_from_below(value, 0))
        })
    }
}

/// Values strictly inside `(lo, hi)` with `0 <= lo < hi`.
fn towards_zero_from_above(lo: i128, hi: i128) -> Stream<Shrinkable<i128>> {
    if lo + 1 >= hi {
        return Stream::empty();
    }
    let mid = lo + (hi - lo) / 2;
    let node = Shrinkable::new(mid).with(move || towards_zero_from_above(lo, mid));
    Stream::cons(node, move || towards_zero_from_above(mid, hi))
}

/// Values strictly inside `(lo, hi)` with `lo < hi <= 0`.
fn towards_zero_from_below(lo: i128, hi: i128) -> Stream<Shrinkable<i128>> {
    if lo + 1 >= hi {
        return Stream::empty();
    }
    // Rounds the midpoint toward zero.
    let mid = hi - (hi - lo) / 2;
    let node = Shrinkable::new(mid).with(move || towards_zero_from_below(mid, hi));
    Stream::cons(node, move || towards_zero_from_below(lo, mid))
}

/// Shrink tree for `value` that stays inside `[min, max]`.
///
/// Ranges containing zero shrink toward zero, non-negative ranges toward
/// `min`, non-positive ranges toward `max`.
pub fn shrink_integer(value: i64, min: i64, max: i64) -> Shrinkable<i64> {
    shrink_integer_wide(value.into(), min.into(), max.into()).map(|v| *v as i64)
}

/// `shrink_integer` over `i128`.
pub fn shrink_integer_wide(value: i128, min: i128, max: i128) -> Shrinkable<i128> {
    if min <= 0 && max >= 0 {
        binary_search_wide(value)
    } else if min > 0 {
        binary_search_wide(value - min).map(move |offset| offset + min)
    } else {
        binary_search_wide(value - max).map(move |offset| offset + max)
    }
}

/// Draw an integer in `[min, max]` together with its shrink tree.
pub fn generate_integer(rand: &mut Random, min: i64, max: i64) -> Result<Shrinkable<i64>> {
    Ok(generate_integer_wide(rand, min.into(), max.into())?.map(|v| *v as i64))
}

/// `generate_integer` over `i128`.
pub fn generate_integer_wide(rand: &mut Random, min: i128, max: i128) -> Result<Shrinkable<i128>> {
    let value = rand.interval_wide(min, max)?;
    if value < min || value > max {
        return Err(CheckError::generation(format!(
            "drawn value {value} is outside [{min}, {max}]"
        )));
    }
    Ok(shrink_integer_wide(value, min, max))
}
