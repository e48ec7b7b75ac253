//! Resolve the document to values

use std::{
    cmp::Ordering,
    collections::HashMap,
    fmt::{self, Display},
    sync::{Arc, Mutex, PoisonError, RwLock},
};

use crate::{
    GraphQLError,
    ast::{Document, InputValue, Operation, OperationType, Selection},
    parser::{SourcePosition, Spanning},
    schema::{Schema, TypeHandle},
    value::Value,
};

mod cancellation;
mod execute;
mod field_collector;
mod fragments;
mod path;
mod request;
mod resolver;
mod resolver_task;

pub use self::{
    cancellation::{Cancellation, Cancelled},
    execute::{ExecutionOutput, execute},
    field_collector::{FieldCollector, FieldSelection},
    fragments::FragmentCollection,
    path::{Path, PathSegment},
    request::{
        CustomContexts, DataLoaders, OperationRequest, ServiceCollection, ServiceProvider,
        Session,
    },
    resolver::{FieldArguments, FieldResolver, Resolved, ResolverContext, SourceValue},
    resolver_task::{OrderedResult, ResolverTask},
};

/// Variable values of an operation, keyed by name without the `$`.
pub type Variables = HashMap<String, InputValue>;

/// Error type for errors that occur during field resolution
///
/// Field errors are represented by a human-readable error message and an
/// optional `Value` structure containing additional information.
///
/// They can be converted to from any type that implements `std::fmt::Display`,
/// which makes error chaining with the `?` operator a breeze:
///
/// ```rust
/// # use juniper_exec::FieldError;
/// fn get_string(data: Vec<u8>) -> Result<String, FieldError> {
///     let s = String::from_utf8(data)?;
///     Ok(s)
/// }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FieldError {
    message: String,
    extensions: Value,
}

impl<T: Display> From<T> for FieldError {
    fn from(e: T) -> Self {
        Self {
            message: e.to_string(),
            extensions: Value::null(),
        }
    }
}

impl FieldError {
    /// Construct a new error with additional data
    ///
    /// You can use the `graphql_value!` macro to construct an error:
    ///
    /// ```rust
    /// use juniper_exec::{graphql_value, FieldError};
    ///
    /// # let _: FieldError =
    /// FieldError::new(
    ///     "Could not open connection to the database",
    ///     graphql_value!({"internal_error": "Connection refused"}),
    /// );
    /// ```
    ///
    /// The `extensions` parameter will be added to the `"extensions"` field of
    /// the error object in the JSON response.
    ///
    /// If the argument is `Value::null()`, no extra data will be included.
    pub fn new(message: impl Display, extensions: Value) -> Self {
        Self {
            message: message.to_string(),
            extensions,
        }
    }

    /// The `"message"` field of this [`FieldError`].
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The `"extensions"` field of this [`FieldError`].
    ///
    /// If there is no `"extensions"`, then [`Value::Null`] will be returned.
    pub fn extensions(&self) -> &Value {
        &self.extensions
    }
}

/// The result of resolving the value of a field of type `T`
pub type FieldResult<T> = Result<T, FieldError>;

/// Error type for errors that occur during query execution
///
/// All execution errors contain the source position in the query of the field
/// that failed to resolve. It also contains the field stack.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionError {
    location: SourcePosition,
    path: Vec<PathSegment>,
    error: FieldError,
}

impl Eq for ExecutionError {}

impl PartialOrd for ExecutionError {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExecutionError {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.location, &self.path, &self.error.message).cmp(&(
            &other.location,
            &other.path,
            &other.error.message,
        ))
    }
}

impl ExecutionError {
    /// Construct a new execution error occurring at the beginning of the query
    pub fn at_origin(error: FieldError) -> Self {
        Self {
            location: SourcePosition::new_origin(),
            path: vec![],
            error,
        }
    }

    /// Construct a new execution error at the given location and path.
    pub fn new(location: SourcePosition, path: &Path, error: FieldError) -> Self {
        Self {
            location,
            path: path.to_vec(),
            error,
        }
    }

    /// The error message
    pub fn error(&self) -> &FieldError {
        &self.error
    }

    /// The source location _in the query_ of the field that failed to resolve
    pub fn location(&self) -> &SourcePosition {
        &self.location
    }

    /// The path of fields leading to the field that generated this error
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. At {}", self.error.message, self.location)
    }
}

/// Append-only, thread-safe list of [`ExecutionError`]s of one operation.
#[derive(Debug, Default)]
pub struct ErrorSink {
    errors: RwLock<Vec<ExecutionError>>,
}

impl ErrorSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an error.
    pub fn push(&self, error: ExecutionError) {
        __trace_debug!("field error at {}: {}", error.location, error.error.message);

        self.errors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(error);
    }

    /// Errors reported so far, in reporting order.
    pub fn snapshot(&self) -> Vec<ExecutionError> {
        self.errors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of errors reported so far.
    pub fn len(&self) -> usize {
        self.errors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no error was reported.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How the root value of an operation was obtained.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RootValueOrigin {
    /// The root type has no native representation and no value was supplied.
    Absent,
    /// Supplied by the caller, who keeps ownership of it.
    Caller,
    /// Provided by the request's [`ServiceProvider`], which keeps ownership
    /// of it.
    Services,
    /// Constructed by the engine through the schema's factory, and disposed
    /// of by the [`ExecutionContext`].
    Constructed,
}

/// Per-operation execution state.
///
/// Owns the root value, the variables, the fragment index and the field
/// collector of one operation, and serves as the error sink of every
/// [`ResolverTask`] spawned while executing it.
pub struct ExecutionContext {
    schema: Arc<Schema>,
    document: Arc<Document>,
    operation: Arc<Spanning<Operation>>,
    root_type: TypeHandle,
    variables: Arc<Variables>,
    fragments: Arc<FragmentCollection>,
    field_collector: FieldCollector,
    services: Arc<dyn ServiceProvider>,
    session: Arc<Session>,
    cancellation: Cancellation,
    root_value: Mutex<Option<SourceValue>>,
    root_origin: RootValueOrigin,
    errors: ErrorSink,
}

impl ExecutionContext {
    /// Starts configuring a new [`ExecutionContext`].
    pub fn builder() -> ExecutionContextBuilder {
        ExecutionContextBuilder::default()
    }

    /// The schema the operation executes against.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// The document the operation was selected from.
    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    /// The executed operation.
    pub fn operation(&self) -> &Arc<Spanning<Operation>> {
        &self.operation
    }

    /// Kind of the executed operation.
    pub fn operation_type(&self) -> OperationType {
        self.operation.item.operation_type
    }

    /// The object type serving as root of the operation.
    pub fn root_type(&self) -> TypeHandle {
        self.root_type
    }

    /// Variables of the operation, defaults included.
    pub fn variables(&self) -> &Arc<Variables> {
        &self.variables
    }

    /// Fragment definitions of the document.
    pub fn fragments(&self) -> &Arc<FragmentCollection> {
        &self.fragments
    }

    /// The collector bound to this operation's schema, variables and
    /// fragments.
    pub fn field_collector(&self) -> &FieldCollector {
        &self.field_collector
    }

    /// The request's dependency-resolution service.
    pub fn services(&self) -> &Arc<dyn ServiceProvider> {
        &self.services
    }

    /// The session the operation runs in.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// The operation's cancellation signal.
    pub fn cancellation(&self) -> &Cancellation {
        &self.cancellation
    }

    /// The root value, unless absent or already disposed.
    ///
    /// The returned handle shares ownership: a constructed root value lives
    /// until the context disposed of it and every handle was dropped,
    /// including the ones held by source stacks of running resolvers.
    pub fn root_value(&self) -> Option<SourceValue> {
        self.root_value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// How the root value was obtained.
    pub fn root_value_origin(&self) -> RootValueOrigin {
        self.root_origin
    }

    /// Collects the fields to execute for `object_type`, reporting
    /// problems into this context.
    pub fn collect_fields(
        &self,
        object_type: TypeHandle,
        selection_set: &[Selection],
        path: &Path,
    ) -> Vec<FieldSelection> {
        self.field_collector
            .collect_fields(object_type, selection_set, path, &self.errors)
    }

    /// Collects the sub-fields of every occurrence merged into `field`.
    pub fn collect_merged_fields(
        &self,
        object_type: TypeHandle,
        field: &FieldSelection,
        path: &Path,
    ) -> Vec<FieldSelection> {
        self.field_collector
            .collect_merged_fields(object_type, field, path, &self.errors)
    }

    /// Adds an error to the execution errors.
    pub fn report_error(&self, error: ExecutionError) {
        self.errors.push(error);
    }

    /// Errors reported so far.
    ///
    /// Complete only once execution finished.
    pub fn errors(&self) -> Vec<ExecutionError> {
        self.errors.snapshot()
    }

    /// Releases the context's reference to the root value if this context
    /// constructed it.
    ///
    /// The value itself is dropped once outstanding [`root_value`] handles
    /// are gone. Calling it more than once has no further effect.
    ///
    /// [`root_value`]: ExecutionContext::root_value
    pub fn dispose(&self) {
        if self.root_origin != RootValueOrigin::Constructed {
            return;
        }
        let released = self
            .root_value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if released.is_some() {
            __trace!("disposed constructed root value");
        }
    }
}

impl Drop for ExecutionContext {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("operation_type", &self.operation_type())
            .field("operation_name", &self.operation.item.name)
            .field("root_origin", &self.root_origin)
            .field("errors", &self.errors.len())
            .finish_non_exhaustive()
    }
}

/// Configuration of an [`ExecutionContext`].
#[derive(Debug, Default)]
pub struct ExecutionContextBuilder {
    schema: Option<Arc<Schema>>,
    document: Option<Arc<Document>>,
    operation: Option<Arc<Spanning<Operation>>>,
    operation_name: Option<String>,
    request: Option<OperationRequest>,
    variables: Option<Variables>,
}

impl ExecutionContextBuilder {
    /// Sets the schema.
    #[must_use]
    pub fn schema(mut self, schema: Arc<Schema>) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Sets the validated query document.
    #[must_use]
    pub fn document(mut self, document: Arc<Document>) -> Self {
        self.document = Some(document);
        self
    }

    /// Sets the operation to execute explicitly.
    ///
    /// Otherwise it is selected from the document with the operation name.
    #[must_use]
    pub fn operation(mut self, operation: Arc<Spanning<Operation>>) -> Self {
        self.operation = Some(operation);
        self
    }

    /// Sets the name of the operation to select from the document.
    #[must_use]
    pub fn operation_name(mut self, name: Option<&str>) -> Self {
        self.operation_name = name.map(Into::into);
        self
    }

    /// Sets the request descriptor.
    #[must_use]
    pub fn request(mut self, request: OperationRequest) -> Self {
        self.request = Some(request);
        self
    }

    /// Sets the coerced variable values.
    #[must_use]
    pub fn variables(mut self, variables: Variables) -> Self {
        self.variables = Some(variables);
        self
    }

    /// Validates the configuration and resolves the root value.
    ///
    /// Fails without producing any partial context when an input is missing
    /// or the schema has no root type for the selected operation.
    pub fn build(self) -> Result<Arc<ExecutionContext>, GraphQLError> {
        let schema = self.schema.ok_or(GraphQLError::NoSchemaProvided)?;
        let document = self.document.ok_or(GraphQLError::NoDocumentProvided)?;
        let operation = match self.operation {
            Some(op) => op,
            None => Arc::clone(get_operation(&document, self.operation_name.as_deref())?),
        };
        let request = self.request.ok_or(GraphQLError::NoRequestProvided)?;
        let mut variables = self.variables.ok_or(GraphQLError::NoVariablesProvided)?;

        let operation_type = operation.item.operation_type;
        let root_type = schema
            .root_type(operation_type)
            .ok_or(GraphQLError::MissingRootType(operation_type))?;

        for def in &operation.item.variable_definitions {
            if let Some(default) = &def.item.default_value {
                variables
                    .entry(def.item.name.to_string())
                    .or_insert_with(|| default.clone());
            }
        }

        let (services, session, initial_value, cancellation) = request.into_parts();

        let root_name = schema.meta_type(root_type).name();
        let (root_value, root_origin) = match initial_value {
            Some(value) => (Some(value), RootValueOrigin::Caller),
            None => match schema.native_type(root_name) {
                Some(native) => match services.get_service(native.rust_type()) {
                    Some(value) => (Some(value), RootValueOrigin::Services),
                    None => (Some(native.create(&*services)), RootValueOrigin::Constructed),
                },
                None => (None, RootValueOrigin::Absent),
            },
        };

        __trace!(
            "{operation_type} `{}` on root `{root_name}`, root value {root_origin:?}",
            operation.item.name.as_deref().unwrap_or(""),
        );

        let variables = Arc::new(variables);
        let fragments = Arc::new(FragmentCollection::new(&document));
        let field_collector = FieldCollector::new(
            Arc::clone(&schema),
            Arc::clone(&variables),
            Arc::clone(&fragments),
        );

        Ok(Arc::new(ExecutionContext {
            schema,
            document,
            operation,
            root_type,
            variables,
            fragments,
            field_collector,
            services,
            session,
            cancellation,
            root_value: Mutex::new(root_value),
            root_origin,
            errors: ErrorSink::new(),
        }))
    }
}

/// Selects the operation to execute from a document.
///
/// Without a name the document must contain exactly one operation.
pub fn get_operation<'d>(
    document: &'d Document,
    operation_name: Option<&str>,
) -> Result<&'d Arc<Spanning<Operation>>, GraphQLError> {
    let mut operation = None;
    for op in document.operations() {
        if operation_name.is_none() && operation.is_some() {
            return Err(GraphQLError::MultipleOperationsProvided);
        }

        let move_op =
            operation_name.is_none() || op.item.name.as_deref() == operation_name;

        if move_op {
            operation = Some(op);
        }
    }

    match operation {
        Some(op) => Ok(op),
        None if operation_name.is_some() => Err(GraphQLError::UnknownOperationName),
        None => Err(GraphQLError::NoOperationProvided),
    }
}
