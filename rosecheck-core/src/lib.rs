//! Core functionality for rosecheck property-based testing.
//!
//! This crate provides the building blocks: lazy streams and shrink trees,
//! a replayable random source, primitive shrinkers, generators and their
//! combinators, the property runner and the stateful (model-based) runner.

pub mod combinator;
pub mod error;
pub mod gen;
pub mod property;
pub mod random;
pub mod shrinkable;
pub mod shrinker;
pub mod stateful;
pub mod stream;

// Re-export the main types
pub use combinator::*;
pub use error::*;
pub use gen::*;
pub use property::*;
pub use random::*;
pub use shrinkable::*;
pub use stateful::*;
pub use stream::*;
