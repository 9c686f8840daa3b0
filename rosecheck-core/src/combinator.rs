//! Generator combinators: constants, choices and construction.

use crate::error::{CheckError, Result};
use crate::gen::{Gen, GenTuple};
use crate::property::Apply;
use crate::random::Random;
use crate::shrinkable::Shrinkable;
use crate::shrinker::{self, ShrinkableTuple};
use std::rc::Rc;

/// Always generate `value`. Nothing to shrink.
pub fn just<T: Clone + 'static>(value: T) -> Gen<T> {
    Gen::new(move |_| Ok(Shrinkable::new(value.clone())))
}

/// Generate the result of calling `f`, once per draw. Nothing to shrink.
pub fn lazy<T, F>(f: F) -> Gen<T>
where
    T: Clone + 'static,
    F: Fn() -> T + 'static,
{
    Gen::new(move |_| Ok(Shrinkable::new(f())))
}

/// A choice with an optional explicit weight.
///
/// Unweighted choices share whatever probability the weighted ones leave.
#[derive(Debug, Clone, PartialEq)]
pub struct Weighted<T> {
    pub item: T,
    pub weight: Option<f64>,
}

impl<T> From<T> for Weighted<T> {
    fn from(item: T) -> Self {
        Weighted { item, weight: None }
    }
}

/// A generator chosen with probability `weight`.
pub fn weighted_gen<T>(gen: Gen<T>, weight: f64) -> Weighted<Gen<T>> {
    Weighted {
        item: gen,
        weight: Some(weight),
    }
}

/// A value chosen with probability `weight`.
pub fn weighted_value<T>(value: T, weight: f64) -> Weighted<T> {
    Weighted {
        item: value,
        weight: Some(weight),
    }
}

/// Resolve the probability of every choice.
///
/// Explicit weights must be non-negative and sum to less than 1. The rest
/// is split evenly among unweighted choices; when every choice is weighted
/// the total must be positive and the weights act as relative odds.
fn resolve_weights(weights: &[Option<f64>]) -> Result<Vec<f64>> {
    let invalid = |message: String| CheckError::InvalidWeights { message };
    if weights.is_empty() {
        return Err(invalid("at least one choice is required".to_string()));
    }

    let mut total = 0.0;
    let mut unweighted = 0usize;
    for weight in weights {
        match weight {
            Some(w) if !w.is_finite() || *w < 0.0 => {
                return Err(invalid(format!("weight {w} is not a probability")));
            }
            Some(w) => total += w,
            None => unweighted += 1,
        }
    }

    if total >= 1.0 {
        return Err(invalid(format!("weights must sum to less than 1, got {total}")));
    }
    if unweighted > 0 {
        let share = (1.0 - total) / unweighted as f64;
        Ok(weights.iter().map(|w| w.unwrap_or(share)).collect())
    } else if total <= 0.0 {
        Err(invalid(format!("weights must sum to a positive value, got {total}")))
    } else {
        Ok(weights.iter().map(|w| w.unwrap_or(0.0)).collect())
    }
}

/// Rejection sampling: pick a uniform index, keep it with its probability.
fn pick(rand: &mut Random, probabilities: &[f64]) -> Result<usize> {
    let last = probabilities.len() as i64 - 1;
    loop {
        let index = rand.interval(0, last)? as usize;
        if rand.next_boolean(probabilities[index]) {
            return Ok(index);
        }
    }
}

/// Choose among generators, honouring their weights.
///
/// The result shrinks within the chosen generator only.
pub fn one_of<T: Clone + 'static>(choices: Vec<Weighted<Gen<T>>>) -> Result<Gen<T>> {
    let probabilities = resolve_weights(&choices.iter().map(|c| c.weight).collect::<Vec<_>>())?;
    let gens: Vec<Gen<T>> = choices.into_iter().map(|c| c.item).collect();
    Ok(Gen::new(move |rand| {
        let index = pick(rand, &probabilities)?;
        gens[index].generate(rand)
    }))
}

/// Choose among values, honouring their weights.
///
/// The choice shrinks toward earlier values that can be chosen at all.
pub fn element_of<T: Clone + 'static>(choices: Vec<Weighted<T>>) -> Result<Gen<T>> {
    let probabilities = Rc::new(resolve_weights(
        &choices.iter().map(|c| c.weight).collect::<Vec<_>>(),
    )?);
    let values: Rc<Vec<T>> = Rc::new(choices.into_iter().map(|c| c.item).collect());
    Ok(Gen::new(move |rand| {
        let index = pick(rand, &probabilities)?;
        let (probabilities, values) = (probabilities.clone(), values.clone());
        Ok(shrinker::binary_search_shrinkable(index as i64)
            .filter(move |i| probabilities[*i as usize] > 0.0)
            .map(move |i| values[*i as usize].clone()))
    }))
}

/// Build values by applying `constructor` to generated arguments.
///
/// The arguments shrink slot by slot, left to right.
pub fn construct<G, F>(constructor: F, args: G) -> Gen<F::Output>
where
    G: GenTuple,
    F: Apply<<G::Slots as ShrinkableTuple>::Value> + 'static,
    F::Output: Clone + 'static,
{
    Gen::tuple(args).map(move |values| constructor.apply(values.clone()))
}

/// Tuples that can be extended by one more element.
pub trait TupleAppend<U> {
    type Output: Clone + 'static;

    fn append(self, last: U) -> Self::Output;
}

macro_rules! impl_tuple_append {
    ($($name:ident : $index:tt),+) => {
        impl<$($name,)+ U> TupleAppend<U> for ($($name,)+)
        where
            $($name: Clone + 'static,)+
            U: Clone + 'static,
        {
            type Output = ($($name,)+ U);

            fn append(self, last: U) -> Self::Output {
                ($(self.$index,)+ last)
            }
        }
    };
}

impl_tuple_append!(A: 0);
impl_tuple_append!(A: 0, B: 1);
impl_tuple_append!(A: 0, B: 1, C: 2);
impl_tuple_append!(A: 0, B: 1, C: 2, D: 3);
impl_tuple_append!(A: 0, B: 1, C: 2, D: 3, E: 4);

/// Extend generated tuples with a value generated from them.
///
/// Shrinking follows `Gen::chain`: the new last element first, then the
/// tuple itself with a fresh last element.
pub fn chain_tuple<T, U, F>(gen: &Gen<T>, f: F) -> Gen<T::Output>
where
    T: TupleAppend<U> + Clone + 'static,
    U: Clone + 'static,
    F: Fn(&T) -> Gen<U> + 'static,
{
    gen.chain(f).map(|(tuple, last)| tuple.clone().append(last.clone()))
}
