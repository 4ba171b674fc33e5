//! Sampling and ranking engine. Free of logging and terminal concerns.

pub mod collector;
pub mod cpu;
pub mod error;
pub mod memory;
pub mod numeric;
pub mod process;
pub mod snapshot;
pub mod source;

#[cfg(test)]
pub(crate) mod testing;
