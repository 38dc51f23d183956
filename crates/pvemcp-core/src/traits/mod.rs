//! Core traits.

mod executor;

pub use executor::Executor;
