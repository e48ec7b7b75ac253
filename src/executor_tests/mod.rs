mod context;
mod execution;
pub(crate) mod fixtures;
mod variables;
