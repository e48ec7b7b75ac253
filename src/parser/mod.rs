//! Query document translation and source location utilities

mod document;
mod utils;

pub use self::{
    document::{ParseError, parse_document_source},
    utils::{SourcePosition, Spanning},
};
