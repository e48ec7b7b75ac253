use std::sync::{Arc, Mutex, PoisonError};

use arcstr::ArcStr;
use indexmap::IndexMap;

use crate::{
    executor::{
        ExecutionContext, ExecutionError, FieldArguments, FieldError, FieldSelection, Path,
        ResolverContext, SourceValue,
    },
    schema::{Field, ResolvedType, Schema, TypeHandle},
    util::ImmutableStack,
    value::{Object, Value},
};

/// Insertion-ordered result of one object's selection set.
///
/// Keys are reserved up front in collection order, so the order of the
/// produced [`Object`] never depends on which sibling finishes first.
#[derive(Debug, Default)]
pub struct OrderedResult {
    entries: Mutex<IndexMap<ArcStr, Option<Value>>>,
}

impl OrderedResult {
    /// Creates a result with the given keys reserved, in order.
    pub fn with_keys<'k>(keys: impl IntoIterator<Item = &'k ArcStr>) -> Self {
        Self {
            entries: Mutex::new(keys.into_iter().map(|k| (k.clone(), None)).collect()),
        }
    }

    /// Writes the value of `key`, replacing any earlier write.
    ///
    /// Keys that were not reserved are appended.
    pub fn insert(&self, key: &ArcStr, value: Value) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get_mut(key) {
            Some(slot) => *slot = Some(value),
            None => {
                entries.insert(key.clone(), Some(value));
            }
        }
    }

    /// Value written for `key`, if any.
    pub fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned().flatten()
    }

    /// Moves the written values out into an [`Object`], leaving this result
    /// empty.
    ///
    /// Reserved keys that were never written are left out.
    pub fn take_object(&self) -> Object {
        let entries = std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner));
        entries
            .into_iter()
            .filter_map(|(k, v)| Some((k.to_string(), v?)))
            .collect()
    }
}

/// Unit of work resolving one field occurrence.
///
/// Carries the chain of ancestor source values, the field being resolved,
/// its declared type, its response path and the result it writes into.
#[derive(Debug)]
pub struct ResolverTask {
    sources: ImmutableStack<SourceValue>,
    object_type: TypeHandle,
    field_selection: Arc<FieldSelection>,
    field_type: ResolvedType,
    path: Path,
    result: Arc<OrderedResult>,
}

impl ResolverTask {
    /// Creates the task resolving `field_selection` below `parent_path`.
    ///
    /// # Panics
    ///
    /// If the field has not completed its type binding.
    pub fn new(
        schema: &Schema,
        sources: ImmutableStack<SourceValue>,
        field_selection: FieldSelection,
        parent_path: &Path,
        result: Arc<OrderedResult>,
    ) -> Self {
        let field_type = field_selection.field(schema).resolved_type().clone();
        Self {
            sources,
            object_type: field_selection.object_type(),
            path: parent_path.field(field_selection.response_name()),
            field_selection: Arc::new(field_selection),
            field_type,
            result,
        }
    }

    /// Ancestor source values, the parent first.
    pub fn sources(&self) -> &ImmutableStack<SourceValue> {
        &self.sources
    }

    /// The object type declaring the field.
    pub fn object_type(&self) -> TypeHandle {
        self.object_type
    }

    /// The merged field occurrence being resolved.
    pub fn field_selection(&self) -> &Arc<FieldSelection> {
        &self.field_selection
    }

    /// Schema definition of the field.
    pub fn field<'s>(&self, schema: &'s Schema) -> &'s Field {
        self.field_selection.field(schema)
    }

    /// Declared type of the field.
    pub fn field_type(&self) -> &ResolvedType {
        &self.field_type
    }

    /// Path of the field in the response.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Response key the task writes to.
    pub fn response_name(&self) -> &ArcStr {
        self.field_selection.response_name()
    }

    /// Writes the completed value of the field into the shared result.
    pub fn integrate_result(&self, value: Value) {
        self.result.insert(self.field_selection.response_name(), value);
    }

    /// Creates an error located at this field.
    ///
    /// # Panics
    ///
    /// If `message` is empty.
    pub fn create_error(&self, message: impl Into<String>) -> ExecutionError {
        let message = message.into();
        assert!(
            !message.is_empty(),
            "Field errors require a message, none given for `{}`",
            self.path,
        );
        self.field_error(FieldError::from(message))
    }

    /// Locates a resolver-reported error at this field.
    pub fn field_error(&self, error: FieldError) -> ExecutionError {
        self.field_error_at(&self.path, error)
    }

    /// Locates an error at this field's syntax node under a deeper `path`,
    /// e.g. a list item.
    pub fn field_error_at(&self, path: &Path, error: FieldError) -> ExecutionError {
        ExecutionError::new(self.field_selection.location(), path, error)
    }

    /// Prepares the context handed to the field's resolver.
    ///
    /// Fails when the field's arguments can't be coerced.
    pub fn resolver_context(
        &self,
        context: &Arc<ExecutionContext>,
    ) -> Result<ResolverContext, FieldError> {
        let arguments = FieldArguments::coerce(
            context.schema(),
            self.field(context.schema()),
            self.field_selection.arguments(),
            context.variables(),
        )?;
        Ok(ResolverContext::new(
            Arc::clone(context),
            self.sources.clone(),
            Arc::clone(&self.field_selection),
            arguments,
            self.path.clone(),
        ))
    }
}
