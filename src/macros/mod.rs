//! Declarative helper macros.

#[macro_use]
pub(crate) mod tracing;
