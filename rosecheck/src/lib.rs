//! rosecheck property-based testing library.
//!
//! This is the main entry point for rosecheck, re-exporting the engine from
//! `rosecheck-core`: generators with lazily shrinking values, the property
//! runner, and model-based stateful testing with replay shrinking.
//!
//! ```
//! use rosecheck::*;
//!
//! let prop = for_all(
//!     |a: i64, b: i64| a + b == b + a,
//!     (Gen::<i64>::interval(-100, 100), Gen::<i64>::interval(-100, 100)),
//! );
//! assert!(prop.go().is_ok());
//! ```

pub use rosecheck_core::*;
