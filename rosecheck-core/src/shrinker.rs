//! Primitive shrinkers.
//!
//! Each shrinker builds a [`Shrinkable`] whose tree encodes the legal
//! reduction order for one kind of value.

use crate::shrinkable::Shrinkable;
use crate::stream::Stream;

pub mod container;
pub mod floating;
pub mod integral;
pub mod tuple;

pub use container::*;
pub use floating::*;
pub use integral::*;
pub use tuple::*;

/// `true` shrinks to `false`; `false` is minimal.
pub fn shrink_bool(value: bool) -> Shrinkable<bool> {
    if value {
        Shrinkable::new(true).with(|| Stream::one(Shrinkable::new(false)))
    } else {
        Shrinkable::new(false)
    }
}
