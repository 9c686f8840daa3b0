//! Slot-by-slot shrinking of heterogeneous tuples.

use crate::shrinkable::Shrinkable;
use crate::stream::Stream;

/// A tuple of shrinkables, e.g. `(Shrinkable<A>, Shrinkable<B>)`.
pub trait ShrinkableTuple: Clone + 'static {
    /// The tuple of plain values, e.g. `(A, B)`.
    type Value: Clone + 'static;

    /// Number of slots.
    const ARITY: usize;

    /// Current plain values.
    fn value(&self) -> Self::Value;

    /// Copies of `self` where slot `index` is replaced by each immediate
    /// shrink of that slot, in order. Empty for an out-of-range index.
    fn shrinks_at(&self, index: usize) -> Stream<Self>;
}

/// Shrink tree of a tuple.
///
/// Slots are shrunk left to right while the others are held fixed. A
/// candidate replacing slot `i` keeps shrinking from slot `i` (its own
/// subtree first) before moving on to later slots.
pub fn shrinkable_tuple<S: ShrinkableTuple>(slots: S) -> Shrinkable<S::Value> {
    tuple_node(slots, 0)
}

fn tuple_node<S: ShrinkableTuple>(slots: S, from: usize) -> Shrinkable<S::Value> {
    let value = slots.value();
    Shrinkable::new(value).with(move || slot_candidates(slots.clone(), from))
}

fn slot_candidates<S: ShrinkableTuple>(slots: S, index: usize) -> Stream<Shrinkable<S::Value>> {
    if index >= S::ARITY {
        return Stream::empty();
    }
    slots
        .shrinks_at(index)
        .transform(move |candidate| tuple_node(candidate.clone(), index))
        .concat_lazy(move || slot_candidates(slots.clone(), index + 1))
}

macro_rules! impl_shrinkable_tuple {
    ($arity:expr; $($name:ident : $index:tt),+) => {
        impl<$($name),+> ShrinkableTuple for ($(Shrinkable<$name>,)+)
        where
            $($name: Clone + 'static),+
        {
            type Value = ($($name,)+);

            const ARITY: usize = $arity;

            fn value(&self) -> Self::Value {
                ($(self.$index.value.clone(),)+)
            }

            fn shrinks_at(&self, index: usize) -> Stream<Self> {
                match index {
                    $(
                        $index => {
                            let base = self.clone();
                            self.$index.shrinks().transform(move |child| {
                                let mut next = base.clone();
                                next.$index = child.clone();
                                next
                            })
                        }
                    )+
                    _ => Stream::empty(),
                }
            }
        }
    };
}

impl_shrinkable_tuple!(1; A: 0);
impl_shrinkable_tuple!(2; A: 0, B: 1);
impl_shrinkable_tuple!(3; A: 0, B: 1, C: 2);
impl_shrinkable_tuple!(4; A: 0, B: 1, C: 2, D: 3);
impl_shrinkable_tuple!(5; A: 0, B: 1, C: 2, D: 3, E: 4);
impl_shrinkable_tuple!(6; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
