//! Shrinking for arrays, strings, sets and dictionaries.
//!
//! Containers shrink their length first, keeping prefixes, and then shrink
//! their elements one position at a time. The same procedure serves every
//! container kind; sets and dictionaries pass a validator so that element
//! substitutions breaking uniqueness are skipped.

use super::integral::binary_search_shrinkable;
use crate::shrinkable::Shrinkable;
use crate::stream::Stream;
use std::rc::Rc;

/// Predicate over the element values of a candidate container.
pub type Validator<T> = Rc<dyn Fn(&[T]) -> bool>;

type Elements<T> = Vec<Shrinkable<T>>;

/// Shrink tree over a container's elements.
///
/// Lengths shrink toward `min_size` through the integer bisection tree.
/// After the length candidates of a node come its elementwise candidates:
/// each position in turn is replaced by the children of its own shrink tree
/// while all other positions stay fixed.
/// Candidates rejected by `valid` are skipped, and later siblings are still
/// tried.
pub fn shrink_container<T>(
    elements: Elements<T>,
    min_size: usize,
    valid: Option<Validator<T>>,
) -> Shrinkable<Elements<T>>
where
    T: Clone + 'static,
{
    let len = elements.len();
    debug_assert!(len >= min_size);
    let elements = Rc::new(elements);
    let prefixes = elements.clone();
    binary_search_shrinkable((len - min_size) as i64)
        .map(move |extra| prefixes[..min_size + *extra as usize].to_vec())
        .concat(move |parent| elementwise(Rc::new(parent.value.clone()), 0, valid.clone()))
}

/// Shrink tree over a container, yielding plain values.
pub fn shrink_elements<T>(
    elements: Elements<T>,
    min_size: usize,
    valid: Option<Validator<T>>,
) -> Shrinkable<Vec<T>>
where
    T: Clone + 'static,
{
    shrink_container(elements, min_size, valid).map(|elements| values_of(elements))
}

/// The plain values of a list of shrinkables.
pub fn values_of<T: Clone>(elements: &[Shrinkable<T>]) -> Vec<T> {
    elements.iter().map(|element| element.value.clone()).collect()
}

fn elementwise<T>(
    elements: Rc<Elements<T>>,
    position: usize,
    valid: Option<Validator<T>>,
) -> Stream<Shrinkable<Elements<T>>>
where
    T: Clone + 'static,
{
    let Some(current) = elements.get(position) else {
        return Stream::empty();
    };

    let base = elements.clone();
    let check = valid.clone();
    let here = current.shrinks().filter_map(move |child| {
        let mut candidate = (*base).clone();
        candidate[position] = child.clone();
        if let Some(valid) = &check {
            if !valid(&values_of(&candidate)) {
                return None;
            }
        }
        Some(elementwise_node(Rc::new(candidate), position, check.clone()))
    });

    here.concat_lazy(move || elementwise(elements.clone(), position + 1, valid.clone()))
}

fn elementwise_node<T>(
    elements: Rc<Elements<T>>,
    position: usize,
    valid: Option<Validator<T>>,
) -> Shrinkable<Elements<T>>
where
    T: Clone + 'static,
{
    let source = elements.clone();
    Shrinkable::new((*elements).clone())
        .with(move || elementwise(source.clone(), position, valid.clone()))
}
