//! Floating point shrinking.

use super::integral::binary_search_shrinkable;
use crate::shrinkable::Shrinkable;
use crate::stream::Stream;

/// Split `value` into a fraction in `[0.5, 1)` (signed) and an exponent.
pub fn decompose(value: f64) -> (f64, i32) {
    if value == 0.0 || !value.is_finite() {
        return (value, 0);
    }
    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    if biased == 0 {
        // Subnormal: scale into the normal range first.
        let (fraction, exponent) = decompose(value * 2f64.powi(64));
        return (fraction, exponent - 64);
    }
    let exponent = biased - 1022;
    let fraction = f64::from_bits((bits & !(0x7ffu64 << 52)) | (1022u64 << 52));
    (fraction, exponent)
}

/// `fraction * 2^exponent`, without overflowing the intermediate power.
pub fn compose(fraction: f64, exponent: i32) -> f64 {
    let half = exponent / 2;
    fraction * 2f64.powi(half) * 2f64.powi(exponent - half)
}

/// Shrink tree for a float.
///
/// `0.0` comes first, then the value with its exponent shrunk toward zero.
/// Every leaf additionally offers its halved magnitude and its truncation
/// toward zero, when those are strictly smaller in magnitude and non-zero.
pub fn shrink_float(value: f64) -> Shrinkable<f64> {
    if value == 0.0 {
        return Shrinkable::new(value);
    }
    if value.is_nan() {
        return Shrinkable::new(value).with(|| Stream::one(Shrinkable::new(0.0)));
    }
    if value.is_infinite() {
        let largest = f64::MAX.copysign(value);
        return Shrinkable::new(value).with(move || {
            Stream::from_vec(vec![Shrinkable::new(0.0), shrink_float(largest)])
        });
    }

    let (fraction, exponent) = decompose(value);
    let by_exponent = binary_search_shrinkable(exponent as i64)
        .map(move |exp| compose(fraction, *exp as i32))
        .and_then(|leaf| single_steps(leaf.value));
    let rest = by_exponent.clone();
    by_exponent.with(move || Stream::one(Shrinkable::new(0.0)).concat(rest.shrinks()))
}

/// Halving and truncation chains below `value`.
fn single_steps(value: f64) -> Stream<Shrinkable<f64>> {
    if value == 0.0 || !value.is_finite() {
        return Stream::empty();
    }
    let mut candidates = Vec::new();
    for candidate in [value / 2.0, value.trunc()] {
        let smaller = candidate.abs() < value.abs();
        if smaller && candidate != 0.0 && !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    Stream::from_vec(
        candidates
            .into_iter()
            .map(|candidate| Shrinkable::new(candidate).with(move || single_steps(candidate)))
            .collect(),
    )
}
