//! Lazy, possibly infinite, singly linked sequences.
//!
//! A [`Stream`] is either empty or a head value plus a deferred computation
//! producing the rest. Streams are the backbone of shrink trees: a node's
//! children are produced on demand, so trees of arbitrary size cost nothing
//! until they are explored.

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

type Thunk<T> = Rc<dyn Fn() -> Stream<T>>;

struct Node<T> {
    head: T,
    rest: Thunk<T>,
    forced: OnceCell<Stream<T>>,
}

/// A lazily produced sequence.
///
/// Cloning a stream is cheap and shares the underlying nodes. Forcing a tail
/// caches it, so a stream walked twice computes each tail once.
pub struct Stream<T> {
    node: Option<Rc<Node<T>>>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Stream {
            node: self.node.clone(),
        }
    }
}

impl<T> Default for Stream<T> {
    fn default() -> Self {
        Stream::empty()
    }
}

impl<T> Stream<T> {
    /// The empty stream.
    pub fn empty() -> Self {
        Stream { node: None }
    }

    /// A stream with `head` followed by whatever `rest` produces.
    pub fn cons<F>(head: T, rest: F) -> Self
    where
        F: Fn() -> Stream<T> + 'static,
    {
        Self::cons_rc(head, Rc::new(rest))
    }

    fn cons_rc(head: T, rest: Thunk<T>) -> Self {
        Stream {
            node: Some(Rc::new(Node {
                head,
                rest,
                forced: OnceCell::new(),
            })),
        }
    }

    /// A single-element stream.
    pub fn one(value: T) -> Self
    where
        T: 'static,
    {
        Stream::cons(value, Stream::empty)
    }

    /// Check whether the stream has no elements.
    pub fn is_empty(&self) -> bool {
        self.node.is_none()
    }

    /// The first element, if any.
    pub fn head(&self) -> Option<&T> {
        self.node.as_ref().map(|node| &node.head)
    }

    /// Everything after the head. The tail of an empty stream is empty.
    pub fn tail(&self) -> Stream<T> {
        match &self.node {
            None => Stream::empty(),
            Some(node) => node.forced.get_or_init(|| (node.rest)()).clone(),
        }
    }

    /// Iterate over clones of the elements. The stream itself is untouched.
    pub fn iter(&self) -> StreamIter<T> {
        StreamIter {
            cursor: self.clone(),
        }
    }
}

impl<T: Clone + 'static> Stream<T> {
    /// Build a finite stream from a vector.
    pub fn from_vec(values: Vec<T>) -> Self {
        let values: Rc<[T]> = values.into();
        Self::from_slice_at(values, 0)
    }

    fn from_slice_at(values: Rc<[T]>, index: usize) -> Self {
        match values.get(index) {
            None => Stream::empty(),
            Some(head) => {
                let head = head.clone();
                Stream::cons(head, move || Self::from_slice_at(values.clone(), index + 1))
            }
        }
    }

    /// Lazily map every element.
    pub fn transform<U, F>(&self, f: F) -> Stream<U>
    where
        U: 'static,
        F: Fn(&T) -> U + 'static,
    {
        transform_rc(self.clone(), Rc::new(f))
    }

    /// Lazily keep the elements satisfying `predicate`.
    ///
    /// Scans forward past rejected elements until a match is found, so
    /// the result may be empty even if the input is not.
    pub fn filter<F>(&self, predicate: F) -> Stream<T>
    where
        F: Fn(&T) -> bool + 'static,
    {
        filter_rc(self.clone(), Rc::new(predicate))
    }

    /// Lazily map and filter in one pass.
    pub fn filter_map<U, F>(&self, f: F) -> Stream<U>
    where
        U: 'static,
        F: Fn(&T) -> Option<U> + 'static,
    {
        filter_map_rc(self.clone(), Rc::new(f))
    }

    /// Append `other`. `other` is not touched until `self` is exhausted.
    pub fn concat(&self, other: Stream<T>) -> Stream<T> {
        self.concat_lazy(move || other.clone())
    }

    /// Append the stream produced by `other`, calling it only once `self`
    /// is exhausted.
    pub fn concat_lazy<F>(&self, other: F) -> Stream<T>
    where
        F: Fn() -> Stream<T> + 'static,
    {
        concat_rc(self.clone(), Rc::new(other))
    }

    /// The first `n` elements.
    pub fn take(&self, n: usize) -> Stream<T> {
        match &self.node {
            Some(node) if n > 0 => {
                let rest = self.clone();
                Stream::cons(node.head.clone(), move || rest.tail().take(n - 1))
            }
            _ => Stream::empty(),
        }
    }
}

fn transform_rc<T, U>(stream: Stream<T>, f: Rc<dyn Fn(&T) -> U>) -> Stream<U>
where
    T: Clone + 'static,
    U: 'static,
{
    match stream.head() {
        None => Stream::empty(),
        Some(head) => {
            let head = f(head);
            Stream::cons(head, move || transform_rc(stream.tail(), f.clone()))
        }
    }
}

fn filter_rc<T>(stream: Stream<T>, predicate: Rc<dyn Fn(&T) -> bool>) -> Stream<T>
where
    T: Clone + 'static,
{
    let mut cursor = stream;
    while let Some(head) = cursor.head() {
        if predicate(head) {
            let head = head.clone();
            let rest = cursor.clone();
            return Stream::cons(head, move || filter_rc(rest.tail(), predicate.clone()));
        }
        cursor = cursor.tail();
    }
    Stream::empty()
}

fn filter_map_rc<T, U>(stream: Stream<T>, f: Rc<dyn Fn(&T) -> Option<U>>) -> Stream<U>
where
    T: Clone + 'static,
    U: 'static,
{
    let mut cursor = stream;
    while let Some(head) = cursor.head() {
        if let Some(mapped) = f(head) {
            let rest = cursor.clone();
            return Stream::cons(mapped, move || filter_map_rc(rest.tail(), f.clone()));
        }
        cursor = cursor.tail();
    }
    Stream::empty()
}

fn concat_rc<T>(stream: Stream<T>, other: Thunk<T>) -> Stream<T>
where
    T: Clone + 'static,
{
    match stream.head() {
        None => other(),
        Some(head) => {
            let head = head.clone();
            Stream::cons(head, move || concat_rc(stream.tail(), other.clone()))
        }
    }
}

/// Iterator over a [`Stream`]. Only the cursor moves.
pub struct StreamIter<T> {
    cursor: Stream<T>,
}

impl<T: Clone> Iterator for StreamIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let head = self.cursor.head()?.clone();
        self.cursor = self.cursor.tail();
        Some(head)
    }
}

impl<T: Clone> IntoIterator for &Stream<T> {
    type Item = T;
    type IntoIter = StreamIter<T>;

    fn into_iter(self) -> StreamIter<T> {
        self.iter()
    }
}

impl<T: fmt::Debug + Clone> fmt::Debug for Stream<T> {
    /// Shows at most the first ten elements.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        let mut iter = self.iter();
        for value in iter.by_ref().take(10) {
            list.entry(&value);
        }
        if iter.next().is_some() {
            list.entry(&format_args!(".."));
        }
        list.finish()
    }
}
