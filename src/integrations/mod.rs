//! Implementations of external crates' traits for this crate's types.

#[doc(hidden)]
pub mod serde;
