//! GraphQL query execution engine.
//!
//! Given a [`Schema`] whose types went through two-phase binding and a
//! validated query [`Document`], this crate walks the requested selection
//! tree, invokes user-supplied field resolvers, assembles an ordered result
//! tree, and collects per-field errors without aborting unrelated work.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use juniper_exec::{
//!     OperationRequest, Resolved, Schema, Variables, graphql_value,
//!     ast::Type,
//!     schema::{Field, ObjectMeta},
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let schema = Schema::builder()
//!     .register(ObjectMeta::new(
//!         "Query",
//!         vec![
//!             Field::new("hello", Type::non_null_named("String"))
//!                 .resolve_with(|_| async { Ok(Resolved::value("world")) }),
//!         ],
//!     ))
//!     .query_type("Query")
//!     .build()
//!     .expect("valid schema");
//!
//! let output = juniper_exec::execute(
//!     "{ hello }",
//!     None,
//!     &Arc::new(schema),
//!     Variables::new(),
//!     OperationRequest::new(),
//! )
//! .await
//! .expect("executable operation");
//!
//! assert_eq!(output.data, graphql_value!({"hello": "world"}));
//! assert!(output.errors.is_empty());
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

#[doc(hidden)]
#[macro_use]
mod macros;
pub mod ast;
pub mod executor;
pub mod integrations;
pub mod parser;
pub mod schema;
pub mod types;
pub mod util;
mod value;

#[cfg(test)]
mod executor_tests;

#[cfg(feature = "tracing")]
#[doc(hidden)]
pub use tracing;

use std::sync::Arc;

use derive_more::with_trait::{Display, Error, From};
use static_assertions as sa;

pub use crate::{
    ast::{Document, InputValue, OperationType},
    executor::{
        Cancellation, ExecutionContext, ExecutionError, ExecutionOutput, FieldError,
        FieldResult, OperationRequest, Resolved, ResolverContext, ServiceCollection,
        ServiceProvider, Session, Variables,
    },
    parser::{ParseError, SourcePosition, Spanning, parse_document_source},
    schema::{Schema, SchemaBuilder, SchemaError},
    value::{Object, ScalarValue, Value},
};

sa::assert_impl_all!(Schema: Send, Sync);
sa::assert_impl_all!(ExecutionContext: Send, Sync);
sa::assert_impl_all!(ResolverContext: Send, Sync);
sa::assert_impl_all!(OperationRequest: Send, Sync);

/// An error that prevented an operation from executing.
///
/// None of these is ever reported in the field error list: each one aborts
/// the whole operation before, or instead of, producing any data.
#[derive(Clone, Debug, Display, Eq, Error, From, PartialEq)]
pub enum GraphQLError {
    /// The query source could not be parsed.
    #[display("{_0}")]
    #[from]
    ParseError(ParseError),

    /// No schema was given to the execution context.
    #[display("No schema provided")]
    NoSchemaProvided,

    /// No query document was given to the execution context.
    #[display("No document provided")]
    NoDocumentProvided,

    /// No request descriptor was given to the execution context.
    #[display("No request provided")]
    NoRequestProvided,

    /// No variables were given to the execution context.
    #[display("No variables provided")]
    NoVariablesProvided,

    /// The document contains no operation.
    #[display("No operation provided")]
    NoOperationProvided,

    /// The document contains several operations and no name was given.
    #[display("Multiple operations provided")]
    MultipleOperationsProvided,

    /// No operation of the document has the given name.
    #[display("Unknown operation name")]
    UnknownOperationName,

    /// Subscriptions are not executed by this engine.
    #[display("Operation is a subscription")]
    IsSubscription,

    /// The schema has no root type for the selected operation kind.
    #[display("Schema has no root type for {_0} operations")]
    MissingRootType(#[error(not(source))] OperationType),

    /// The request's cancellation signal fired.
    #[display("Operation was cancelled")]
    Cancelled,
}

/// Parses `document_source`, selects the operation to run and executes it
/// against `schema`.
///
/// The document is assumed to be valid against the schema: validation is
/// not part of this crate.
///
/// # Errors
///
/// Any [`GraphQLError`] raised while parsing, building the
/// [`ExecutionContext`] or executing.
pub async fn execute(
    document_source: &str,
    operation_name: Option<&str>,
    schema: &Arc<Schema>,
    variables: Variables,
    request: OperationRequest,
) -> Result<ExecutionOutput, GraphQLError> {
    let document = parse_document_source(document_source)?;

    let context = ExecutionContext::builder()
        .schema(Arc::clone(schema))
        .document(Arc::new(document))
        .operation_name(operation_name)
        .request(request)
        .variables(variables)
        .build()?;

    executor::execute(&context).await
}
