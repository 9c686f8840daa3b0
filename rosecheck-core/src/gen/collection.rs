//! Sized generators for strings, arrays, sets and dictionaries.
//!
//! Every container draws its length uniformly from `min_size..=max_size`
//! and shrinks through [`shrinker::shrink_elements`]: shorter prefixes
//! first, then element by element. Sets and dictionaries re-check
//! uniqueness for every elementwise candidate.

use super::{draw_size, Gen, Generator, SizedGen};
use crate::error::{CheckError, Result};
use crate::random::Random;
use crate::shrinkable::Shrinkable;
use crate::shrinker::{self, Validator};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

/// Draws allowed per requested element before a unique container gives up.
const UNIQUE_RETRY_FACTOR: usize = 100;

/// Generate a `Vec` of `min_size..=max_size` elements.
pub fn vec_of<G>(element: G, min_size: usize, max_size: usize) -> Result<SizedGen<Vec<G::Output>>>
where
    G: Generator,
{
    SizedGen::new(min_size, max_size, move |rand, min, max| {
        let len = draw_size(rand, min, max)?;
        let elements = (0..len)
            .map(|_| element.generate(rand))
            .collect::<Result<Vec<_>>>()?;
        Ok(shrinker::shrink_elements(elements, min, None))
    })
}

/// Generate a string of `min_size..=max_size` characters from `chars`.
pub fn string_of(chars: Gen<char>, min_size: usize, max_size: usize) -> Result<SizedGen<String>> {
    Ok(vec_of(chars, min_size, max_size)?.map(|chars| chars.iter().collect::<String>()))
}

/// Strings of ASCII characters `0x01..=0x7f`.
pub fn ascii_string(min_size: usize, max_size: usize) -> Result<SizedGen<String>> {
    string_of(Gen::ascii_char(), min_size, max_size)
}

/// Strings of printable ASCII characters.
pub fn printable_ascii_string(min_size: usize, max_size: usize) -> Result<SizedGen<String>> {
    string_of(Gen::printable_ascii_char(), min_size, max_size)
}

/// Strings of arbitrary Unicode scalar values (no NUL, no surrogates).
pub fn unicode_string(min_size: usize, max_size: usize) -> Result<SizedGen<String>> {
    string_of(Gen::unicode_char(), min_size, max_size)
}

/// Generate a set of `min_size..=max_size` distinct elements.
///
/// Duplicate draws are discarded. If the element generator cannot produce
/// enough distinct values the draw fails with a generation error.
pub fn set_of<G>(element: G, min_size: usize, max_size: usize) -> Result<SizedGen<BTreeSet<G::Output>>>
where
    G: Generator,
    G::Output: Ord,
{
    SizedGen::new(min_size, max_size, move |rand, min, max| {
        let len = draw_size(rand, min, max)?;
        let elements = draw_unique(rand, len, |rand| element.generate(rand), |value| value.clone())?;
        let unique: Validator<G::Output> = Rc::new(|values: &[G::Output]| all_distinct(values.iter()));
        Ok(shrinker::shrink_elements(elements, min, Some(unique))
            .map(|values| values.iter().cloned().collect::<BTreeSet<_>>()))
    })
}

/// Generate a map with `min_size..=max_size` entries and distinct keys.
///
/// Each entry shrinks like a pair: key first, then value.
pub fn dictionary<K, V>(
    keys: K,
    values: V,
    min_size: usize,
    max_size: usize,
) -> Result<SizedGen<BTreeMap<K::Output, V::Output>>>
where
    K: Generator,
    V: Generator,
    K::Output: Ord,
{
    SizedGen::new(min_size, max_size, move |rand, min, max| {
        let len = draw_size(rand, min, max)?;
        let entries = draw_unique(
            rand,
            len,
            |rand| {
                let key = keys.generate(rand)?;
                let value = values.generate(rand)?;
                Ok(shrinker::shrinkable_tuple((key, value)))
            },
            |(key, _)| key.clone(),
        )?;
        let unique_keys: Validator<(K::Output, V::Output)> =
            Rc::new(|entries: &[(K::Output, V::Output)]| all_distinct(entries.iter().map(|(key, _)| key)));
        Ok(shrinker::shrink_elements(entries, min, Some(unique_keys))
            .map(|entries| entries.iter().cloned().collect::<BTreeMap<_, _>>()))
    })
}

fn draw_unique<T, K, D, F>(rand: &mut Random, len: usize, mut draw: D, key_of: F) -> Result<Vec<Shrinkable<T>>>
where
    T: Clone + 'static,
    K: Ord,
    D: FnMut(&mut Random) -> Result<Shrinkable<T>>,
    F: Fn(&T) -> K,
{
    let mut seen = BTreeSet::new();
    let mut elements = Vec::with_capacity(len);
    let budget = UNIQUE_RETRY_FACTOR * len.max(1);
    let mut attempts = 0;
    while elements.len() < len {
        if attempts == budget {
            return Err(CheckError::generation(format!(
                "found only {} distinct elements of {len} after {budget} draws",
                elements.len()
            )));
        }
        attempts += 1;
        let candidate = draw(rand)?;
        if seen.insert(key_of(&candidate.value)) {
            elements.push(candidate);
        }
    }
    Ok(elements)
}

fn all_distinct<'a, T: Ord + 'a>(mut items: impl Iterator<Item = &'a T>) -> bool {
    let mut seen = BTreeSet::new();
    items.all(|item| seen.insert(item))
}
