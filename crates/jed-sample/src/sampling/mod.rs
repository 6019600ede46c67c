//! Random sampling primitives shared by the generators.
//!
//! - [`bias`]: percentage draws and integers shaped by a [`Bias`] curve
//! - [`choice`]: independent weighted inclusion with a default
//! - [`date`]: uniform instants between two bounds
//! - [`pick`]: distinct picks from a finite pool

pub mod bias;
pub mod choice;
pub mod date;
pub mod pick;

pub use bias::{Bias, DEFAULT_ATTEMPTS, biased_accept, biased_int, biased_int_with_attempts};
pub use choice::select;
pub use date::{DateBound, DateError, between, between_instants};
pub use pick::pick_distinct;
