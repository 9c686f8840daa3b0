//! Generator combinators for property-based testing.

use crate::error::{CheckError, Result};
use crate::random::Random;
use crate::shrinkable::Shrinkable;
use crate::shrinker::{self, ShrinkableTuple};
use crate::stream::Stream;
use std::fmt;
use std::rc::Rc;

pub mod collection;

pub use collection::*;

/// How many draws `filter` makes before giving up with a generation error.
pub const FILTER_RETRY_LIMIT: usize = 1000;

type GenFn<T> = Rc<dyn Fn(&mut Random) -> Result<Shrinkable<T>>>;
type SizedGenFn<T> = Rc<dyn Fn(&mut Random, usize, usize) -> Result<Shrinkable<T>>>;

/// Anything that turns a random source into a shrinkable value.
pub trait Generator: 'static {
    type Output: Clone + 'static;

    fn generate(&self, rand: &mut Random) -> Result<Shrinkable<Self::Output>>;
}

/// A generator for test data of type `T`.
///
/// Generators are explicit, first-class values composed with combinator
/// methods. Cloning is cheap; the generating function is shared.
pub struct Gen<T> {
    generator: GenFn<T>,
}

impl<T> Clone for Gen<T> {
    fn clone(&self) -> Self {
        Gen {
            generator: self.generator.clone(),
        }
    }
}

impl<T> fmt::Debug for Gen<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Gen")
    }
}

impl<T: Clone + 'static> Generator for Gen<T> {
    type Output = T;

    fn generate(&self, rand: &mut Random) -> Result<Shrinkable<T>> {
        (self.generator)(rand)
    }
}

impl<T: Clone + 'static> Gen<T> {
    /// Create a new generator from a function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Random) -> Result<Shrinkable<T>> + 'static,
    {
        Gen {
            generator: Rc::new(f),
        }
    }

    /// Generate a value using the given random source.
    pub fn generate(&self, rand: &mut Random) -> Result<Shrinkable<T>> {
        (self.generator)(rand)
    }

    /// Map a function over the generated value and its shrink tree.
    pub fn map<U, F>(&self, f: F) -> Gen<U>
    where
        U: Clone + 'static,
        F: Fn(&T) -> U + 'static,
    {
        let source = self.clone();
        let f = Rc::new(f);
        Gen::new(move |rand| {
            let f = f.clone();
            Ok(source.generate(rand)?.map(move |value| f(value)))
        })
    }

    /// Keep only values satisfying `predicate`.
    ///
    /// Generation re-draws until the predicate holds, up to
    /// [`FILTER_RETRY_LIMIT`] times. Shrinks failing the predicate are
    /// pruned from the tree.
    pub fn filter<F>(&self, predicate: F) -> Gen<T>
    where
        F: Fn(&T) -> bool + 'static,
    {
        let source = self.clone();
        let predicate = Rc::new(predicate);
        Gen::new(move |rand| {
            for _ in 0..FILTER_RETRY_LIMIT {
                let candidate = source.generate(rand)?;
                if predicate(&candidate.value) {
                    let predicate = predicate.clone();
                    return Ok(candidate.filter(move |value| predicate(value)));
                }
            }
            Err(CheckError::generation(format!(
                "filter rejected {FILTER_RETRY_LIMIT} values in a row"
            )))
        })
    }

    /// Dependent generation: the generator for the result depends on a
    /// value drawn from `self`.
    ///
    /// Shrinking tries the inner value first. Once the inner value is
    /// minimal, the outer value shrinks and a fresh inner value is generated
    /// for every outer candidate.
    pub fn flat_map<U, F>(&self, f: F) -> Gen<U>
    where
        U: Clone + 'static,
        F: Fn(&T) -> Gen<U> + 'static,
    {
        self.chain(f).map(|(_, inner)| inner.clone())
    }

    /// Like `flat_map`, keeping the outer value alongside the inner one.
    pub fn chain<U, F>(&self, f: F) -> Gen<(T, U)>
    where
        U: Clone + 'static,
        F: Fn(&T) -> Gen<U> + 'static,
    {
        let outer_gen = self.clone();
        let f: Rc<dyn Fn(&T) -> Gen<U>> = Rc::new(f);
        Gen::new(move |rand| {
            let outer = outer_gen.generate(rand)?;
            let saved = rand.clone();
            let inner = f(&outer.value).generate(rand)?;
            Ok(chain_node(outer, inner, f.clone(), saved))
        })
    }

    /// Generate a sequence of `min_size..=max_size` values, each produced
    /// by `f` from the previous one, starting with a value from `self`.
    ///
    /// Shrinking drops trailing elements first, then shrinks the last
    /// remaining element. Earlier elements never change, so later ones stay
    /// consistent with what produced them.
    pub fn accumulate<F>(&self, f: F, min_size: usize, max_size: usize) -> Result<SizedGen<Vec<T>>>
    where
        F: Fn(&T) -> Gen<T> + 'static,
    {
        let chain = self.accumulate_chain(f, min_size, max_size)?;
        Ok(chain.map(|elements| shrinker::values_of(elements)))
    }

    /// Like `accumulate`, keeping only the final value.
    pub fn aggregate<F>(&self, f: F, min_size: usize, max_size: usize) -> Result<SizedGen<T>>
    where
        F: Fn(&T) -> Gen<T> + 'static,
    {
        let chain = self.accumulate_chain(f, min_size, max_size)?;
        Ok(chain.map(|elements| elements[elements.len() - 1].value.clone()))
    }

    fn accumulate_chain<F>(
        &self,
        f: F,
        min_size: usize,
        max_size: usize,
    ) -> Result<SizedGen<Vec<Shrinkable<T>>>>
    where
        F: Fn(&T) -> Gen<T> + 'static,
    {
        if min_size == 0 {
            return Err(CheckError::config(
                "accumulated sequences need a minimum size of at least 1",
            ));
        }
        let first = self.clone();
        SizedGen::new(min_size, max_size, move |rand, min, max| {
            let len = draw_size(rand, min, max)?;
            let mut elements = vec![first.generate(rand)?];
            while elements.len() < len {
                let last = &elements[elements.len() - 1].value;
                let next = f(last).generate(rand)?;
                elements.push(next);
            }
            Ok(accumulate_tree(elements, min))
        })
    }

    /// Build the generator on every draw, e.g. for recursive structures.
    pub fn defer<F>(f: F) -> Self
    where
        F: Fn() -> Gen<T> + 'static,
    {
        Gen::new(move |rand| f().generate(rand))
    }

    /// Combine a tuple of generators into a generator of tuples.
    ///
    /// The tuple shrinks one slot at a time, left to right.
    pub fn tuple<G>(gens: G) -> Self
    where
        G: GenTuple,
        G::Slots: ShrinkableTuple<Value = T>,
    {
        Gen::new(move |rand| Ok(shrinker::shrinkable_tuple(gens.generate_slots(rand)?)))
    }
}

fn chain_node<T, U>(
    outer: Shrinkable<T>,
    inner: Shrinkable<U>,
    f: Rc<dyn Fn(&T) -> Gen<U>>,
    saved: Random,
) -> Shrinkable<(T, U)>
where
    T: Clone + 'static,
    U: Clone + 'static,
{
    let value = (outer.value.clone(), inner.value.clone());
    Shrinkable::new(value).with(move || {
        let (outer_for_inner, f_for_inner, saved_for_inner) =
            (outer.clone(), f.clone(), saved.clone());
        let inner_shrinks = inner.shrinks().transform(move |candidate| {
            chain_node(
                outer_for_inner.clone(),
                candidate.clone(),
                f_for_inner.clone(),
                saved_for_inner.clone(),
            )
        });

        let (outer, f, saved) = (outer.clone(), f.clone(), saved.clone());
        inner_shrinks.concat_lazy(move || {
            let (f, saved) = (f.clone(), saved.clone());
            outer.shrinks().filter_map(move |candidate| {
                let mut rand = saved.clone();
                let fresh = f(&candidate.value).generate(&mut rand).ok()?;
                Some(chain_node(candidate.clone(), fresh, f.clone(), saved.clone()))
            })
        })
    })
}

fn accumulate_tree<T>(elements: Vec<Shrinkable<T>>, min_size: usize) -> Shrinkable<Vec<Shrinkable<T>>>
where
    T: Clone + 'static,
{
    let len = elements.len();
    let elements = Rc::new(elements);
    shrinker::binary_search_shrinkable((len - min_size) as i64)
        .map(move |extra| elements[..min_size + *extra as usize].to_vec())
        .concat(|parent| shrink_last(Rc::new(parent.value.clone())))
}

fn shrink_last<T>(elements: Rc<Vec<Shrinkable<T>>>) -> Stream<Shrinkable<Vec<Shrinkable<T>>>>
where
    T: Clone + 'static,
{
    let Some(last) = elements.last() else {
        return Stream::empty();
    };
    let base = elements.clone();
    last.shrinks().transform(move |candidate| {
        let mut next = (*base).clone();
        if let Some(slot) = next.last_mut() {
            *slot = candidate.clone();
        }
        let next = Rc::new(next);
        let source = next.clone();
        Shrinkable::new((*next).clone()).with(move || shrink_last(source.clone()))
    })
}

/// Draw a container size in `[min, max]`.
pub(crate) fn draw_size(rand: &mut Random, min: usize, max: usize) -> Result<usize> {
    Ok(rand.interval(min as i64, max as i64)? as usize)
}

/// A generator whose output size is bounded by `min_size..=max_size`.
///
/// Container generators (arrays, strings, sets, dictionaries, accumulated
/// sequences) are sized; the bounds can be changed with `set_size`.
pub struct SizedGen<T> {
    min_size: usize,
    max_size: usize,
    generator: SizedGenFn<T>,
}

impl<T> Clone for SizedGen<T> {
    fn clone(&self) -> Self {
        SizedGen {
            min_size: self.min_size,
            max_size: self.max_size,
            generator: self.generator.clone(),
        }
    }
}

impl<T> fmt::Debug for SizedGen<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SizedGen")
            .field("min_size", &self.min_size)
            .field("max_size", &self.max_size)
            .finish()
    }
}

impl<T: Clone + 'static> Generator for SizedGen<T> {
    type Output = T;

    fn generate(&self, rand: &mut Random) -> Result<Shrinkable<T>> {
        (self.generator)(rand, self.min_size, self.max_size)
    }
}

impl<T: Clone + 'static> SizedGen<T> {
    /// Create a sized generator. `f` receives the current bounds.
    pub fn new<F>(min_size: usize, max_size: usize, f: F) -> Result<Self>
    where
        F: Fn(&mut Random, usize, usize) -> Result<Shrinkable<T>> + 'static,
    {
        check_size(min_size, max_size)?;
        Ok(SizedGen {
            min_size,
            max_size,
            generator: Rc::new(f),
        })
    }

    /// Generate a value using the given random source.
    pub fn generate(&self, rand: &mut Random) -> Result<Shrinkable<T>> {
        (self.generator)(rand, self.min_size, self.max_size)
    }

    /// The same generator with new size bounds.
    pub fn set_size(&self, min_size: usize, max_size: usize) -> Result<Self> {
        check_size(min_size, max_size)?;
        Ok(SizedGen {
            min_size,
            max_size,
            generator: self.generator.clone(),
        })
    }

    pub fn min_size(&self) -> usize {
        self.min_size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Map a function over the generated values, keeping the bounds.
    pub fn map<U, F>(&self, f: F) -> SizedGen<U>
    where
        U: Clone + 'static,
        F: Fn(&T) -> U + 'static,
    {
        let generator = self.generator.clone();
        let f = Rc::new(f);
        SizedGen {
            min_size: self.min_size,
            max_size: self.max_size,
            generator: Rc::new(move |rand: &mut Random, min: usize, max: usize| {
                let f = f.clone();
                Ok(generator(rand, min, max)?.map(move |value| f(value)))
            }),
        }
    }

    /// Freeze the current bounds into a plain generator.
    pub fn to_gen(&self) -> Gen<T> {
        let sized = self.clone();
        Gen::new(move |rand| sized.generate(rand))
    }
}

impl<T: Clone + 'static> From<SizedGen<T>> for Gen<T> {
    fn from(sized: SizedGen<T>) -> Self {
        sized.to_gen()
    }
}

fn check_size(min_size: usize, max_size: usize) -> Result<()> {
    if min_size > max_size {
        return Err(CheckError::config(format!(
            "min size {min_size} is greater than max size {max_size}"
        )));
    }
    if max_size > i64::MAX as usize {
        return Err(CheckError::config(format!("max size {max_size} is too large")));
    }
    Ok(())
}

/// A tuple of generators, e.g. `(Gen<A>, SizedGen<B>)`.
pub trait GenTuple: 'static {
    type Slots: ShrinkableTuple;

    /// Generate every slot, left to right.
    fn generate_slots(&self, rand: &mut Random) -> Result<Self::Slots>;
}

macro_rules! impl_gen_tuple {
    ($($name:ident : $index:tt),+) => {
        impl<$($name),+> GenTuple for ($($name,)+)
        where
            $($name: Generator),+
        {
            type Slots = ($(Shrinkable<$name::Output>,)+);

            fn generate_slots(&self, rand: &mut Random) -> Result<Self::Slots> {
                Ok(($(self.$index.generate(rand)?,)+))
            }
        }
    };
}

impl_gen_tuple!(A: 0);
impl_gen_tuple!(A: 0, B: 1);
impl_gen_tuple!(A: 0, B: 1, C: 2);
impl_gen_tuple!(A: 0, B: 1, C: 2, D: 3);
impl_gen_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_gen_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);

/// Primitive generators.
impl Gen<bool> {
    /// Generate a fair boolean.
    pub fn bool() -> Self {
        Self::boolean(0.5)
    }

    /// Generate `true` with probability `true_prob`.
    pub fn boolean(true_prob: f64) -> Self {
        Gen::new(move |rand| Ok(shrinker::shrink_bool(rand.next_boolean(true_prob))))
    }
}

/// Integer types that can be generated through the `i128` shrinkers.
pub trait Integral: Copy + fmt::Debug + 'static {
    /// Smallest value, as `i128`.
    const MIN_I128: i128;
    /// Largest value, as `i128`.
    const MAX_I128: i128;

    fn from_i128(value: i128) -> Self;

    fn to_i128(self) -> i128;
}

macro_rules! impl_integral {
    ($($ty:ty),+) => {
        $(
            impl Integral for $ty {
                const MIN_I128: i128 = <$ty>::MIN as i128;
                const MAX_I128: i128 = <$ty>::MAX as i128;

                fn from_i128(value: i128) -> Self {
                    value as $ty
                }

                fn to_i128(self) -> i128 {
                    self as i128
                }
            }
        )+
    };
}

impl_integral!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<T: Integral> Gen<T> {
    /// Generate an integer in `[min, max]`.
    ///
    /// Shrinks toward zero when the range contains it, otherwise toward
    /// the bound closest to zero. An inverted range fails on first use with
    /// `CheckError::InvalidRange`.
    pub fn interval(min: T, max: T) -> Self {
        let (min, max) = (min.to_i128(), max.to_i128());
        Gen::new(move |rand| {
            Ok(shrinker::generate_integer_wide(rand, min, max)?.map(|v| T::from_i128(*v)))
        })
    }

    /// Generate an integer in `[from, to)`.
    pub fn in_range(from: T, to: T) -> Self {
        let (from, to) = (from.to_i128(), to.to_i128());
        Gen::new(move |rand| {
            if from >= to {
                return Err(CheckError::InvalidRange { min: from, max: to });
            }
            Ok(shrinker::generate_integer_wide(rand, from, to - 1)?.map(|v| T::from_i128(*v)))
        })
    }

    /// Generate over the whole type, biased toward zero and the extremes.
    pub fn integers() -> Self {
        Gen::new(|rand| {
            let value = rand.next_wide(T::MIN_I128, T::MAX_I128)?;
            Ok(shrinker::shrink_integer_wide(value, T::MIN_I128, T::MAX_I128)
                .map(|v| T::from_i128(*v)))
        })
    }
}

impl Gen<f64> {
    /// Generate any `f64` bit pattern, including NaN and infinities.
    pub fn floats() -> Self {
        Gen::new(|rand| Ok(shrinker::shrink_float(rand.next_f64())))
    }

    /// Generate a float in `[min, max]`. Shrinks stay inside the range.
    pub fn float_interval(min: f64, max: f64) -> Self {
        Gen::new(move |rand| {
            if !(min <= max) || !min.is_finite() || !max.is_finite() {
                return Err(CheckError::config(format!(
                    "invalid float interval [{min}, {max}]"
                )));
            }
            let p = rand.next_prob();
            // Scaling each bound first keeps `[-f64::MAX, f64::MAX]` finite.
            let value = (min + p * max - p * min).clamp(min, max);
            let tree = if min > 0.0 {
                shrinker::shrink_float(value - min).map(move |offset| offset + min)
            } else if max < 0.0 {
                shrinker::shrink_float(value - max).map(move |offset| offset + max)
            } else {
                shrinker::shrink_float(value)
            };
            Ok(tree.filter(move |v| (min..=max).contains(v)))
        })
    }
}

/// Size of the gap the surrogate range leaves in the code point space.
const SURROGATE_GAP: u32 = 0x800;

impl Gen<char> {
    /// ASCII characters `0x01..=0x7f`, shrinking toward `0x01`.
    pub fn ascii_char() -> Self {
        Self::code_points(0x01, 0x7f)
    }

    /// Printable ASCII `' '..='~'`, shrinking toward `' '`.
    pub fn printable_ascii_char() -> Self {
        Self::code_points(0x20, 0x7e)
    }

    /// Any Unicode scalar value except NUL, skipping surrogates.
    pub fn unicode_char() -> Self {
        Gen::<u32>::interval(0x01, 0x10ffff - SURROGATE_GAP).map(|&code| {
            let code = if code >= 0xd800 { code + SURROGATE_GAP } else { code };
            char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
        })
    }

    fn code_points(min: u32, max: u32) -> Self {
        Gen::<u32>::interval(min, max)
            .map(|&code| char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
    }
}
