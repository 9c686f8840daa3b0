//! Lazy shrink trees.

use crate::stream::Stream;
use std::fmt;
use std::rc::Rc;

type ShrinkFn<T> = Rc<dyn Fn() -> Stream<Shrinkable<T>>>;

/// A generated value together with its lazily computed shrinks.
///
/// Every value reachable through [`Shrinkable::shrinks`] is a legal value
/// under the same constraints as `value`. The tree is rebuilt from the thunk
/// each time `shrinks` is called; nothing is cached at this level.
pub struct Shrinkable<T> {
    pub value: T,
    shrinks: ShrinkFn<T>,
}

impl<T: Clone> Clone for Shrinkable<T> {
    fn clone(&self) -> Self {
        Shrinkable {
            value: self.value.clone(),
            shrinks: self.shrinks.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Shrinkable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shrinkable")
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + 'static> From<T> for Shrinkable<T> {
    fn from(value: T) -> Self {
        Shrinkable::new(value)
    }
}

impl<T: Clone + 'static> Shrinkable<T> {
    /// A value with no shrinks.
    pub fn new(value: T) -> Self {
        Shrinkable {
            value,
            shrinks: Rc::new(Stream::empty),
        }
    }

    /// Replace the shrink thunk.
    pub fn with<F>(&self, shrinks: F) -> Self
    where
        F: Fn() -> Stream<Shrinkable<T>> + 'static,
    {
        Shrinkable {
            value: self.value.clone(),
            shrinks: Rc::new(shrinks),
        }
    }

    /// Replace the shrink stream with a fixed one.
    pub fn with_stream(&self, shrinks: Stream<Shrinkable<T>>) -> Self {
        self.with(move || shrinks.clone())
    }

    /// The immediate shrinks of this value.
    pub fn shrinks(&self) -> Stream<Shrinkable<T>> {
        (self.shrinks)()
    }

    /// Check if the tree has any children.
    pub fn has_shrinks(&self) -> bool {
        !self.shrinks().is_empty()
    }

    /// Map a function over the value and every node of the tree.
    pub fn map<U, F>(&self, f: F) -> Shrinkable<U>
    where
        U: Clone + 'static,
        F: Fn(&T) -> U + 'static,
    {
        map_rc(self, Rc::new(f))
    }

    /// Drop every node of the tree failing `predicate`, with its subtree.
    ///
    /// Siblings after a rejected node are still searched. The root is kept
    /// as-is; callers must ensure it satisfies the predicate.
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + 'static,
    {
        filter_rc(self, Rc::new(predicate))
    }

    /// Append `then(node)` to the shrinks of every node in the tree.
    pub fn concat<F>(&self, then: F) -> Self
    where
        F: Fn(&Shrinkable<T>) -> Stream<Shrinkable<T>> + 'static,
    {
        concat_rc(self, Rc::new(then))
    }

    /// Append `then()` to the shrinks of every node, ignoring the node.
    pub fn concat_static<F>(&self, then: F) -> Self
    where
        F: Fn() -> Stream<Shrinkable<T>> + 'static,
    {
        self.concat(move |_| then())
    }

    /// Give every leaf of the tree the shrinks `then(leaf)`.
    pub fn and_then<F>(&self, then: F) -> Self
    where
        F: Fn(&Shrinkable<T>) -> Stream<Shrinkable<T>> + 'static,
    {
        and_then_rc(self, Rc::new(then))
    }

    /// Give every leaf of the tree the shrinks `then()`, ignoring the leaf.
    pub fn and_then_static<F>(&self, then: F) -> Self
    where
        F: Fn() -> Stream<Shrinkable<T>> + 'static,
    {
        self.and_then(move |_| then())
    }

    /// Keep only the first `n` shrinks at every level.
    pub fn take(&self, n: usize) -> Self {
        let this = self.clone();
        self.with(move || this.shrinks().take(n).transform(move |child| child.take(n)))
    }

    /// The `n`th immediate shrink, if there is one.
    pub fn nth_child(&self, n: usize) -> Option<Shrinkable<T>> {
        self.shrinks().iter().nth(n)
    }

    /// Follow a path of child indices from this node.
    pub fn retrieve(&self, path: &[usize]) -> Option<Shrinkable<T>> {
        path.iter()
            .try_fold(self.clone(), |node, &index| node.nth_child(index))
    }
}

fn map_rc<T, U>(node: &Shrinkable<T>, f: Rc<dyn Fn(&T) -> U>) -> Shrinkable<U>
where
    T: Clone + 'static,
    U: Clone + 'static,
{
    let source = node.clone();
    let g = f.clone();
    Shrinkable {
        value: f(&node.value),
        shrinks: Rc::new(move || {
            let g = g.clone();
            source.shrinks().transform(move |child| map_rc(child, g.clone()))
        }),
    }
}

fn filter_rc<T>(node: &Shrinkable<T>, predicate: Rc<dyn Fn(&T) -> bool>) -> Shrinkable<T>
where
    T: Clone + 'static,
{
    let source = node.clone();
    node.with(move || {
        let keep = predicate.clone();
        let descend = predicate.clone();
        source
            .shrinks()
            .filter(move |child| keep(&child.value))
            .transform(move |child| filter_rc(child, descend.clone()))
    })
}

type ThenFn<T> = Rc<dyn Fn(&Shrinkable<T>) -> Stream<Shrinkable<T>>>;

fn concat_rc<T>(node: &Shrinkable<T>, then: ThenFn<T>) -> Shrinkable<T>
where
    T: Clone + 'static,
{
    let source = node.clone();
    node.with(move || {
        let descend = then.clone();
        let tail_then = then.clone();
        let parent = source.clone();
        source
            .shrinks()
            .transform(move |child| concat_rc(child, descend.clone()))
            .concat_lazy(move || tail_then(&parent))
    })
}

fn and_then_rc<T>(node: &Shrinkable<T>, then: ThenFn<T>) -> Shrinkable<T>
where
    T: Clone + 'static,
{
    let source = node.clone();
    node.with(move || {
        let children = source.shrinks();
        if children.is_empty() {
            then(&source)
        } else {
            let descend = then.clone();
            children.transform(move |child| and_then_rc(child, descend.clone()))
        }
    })
}
