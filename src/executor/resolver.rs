use std::{any::Any, fmt, future::Future, sync::Arc};

use arcstr::ArcStr;
use futures::future::{BoxFuture, FutureExt as _};
use indexmap::IndexMap;

use crate::{
    ast::{self, InputValue},
    executor::{
        ExecutionContext, FieldError, FieldResult, FieldSelection, Path, ServiceProvider,
        Session, Variables,
    },
    schema::{Argument, Field, MetaType, ResolvedType, Schema},
    util::ImmutableStack,
    value::Value,
};

/// Type-erased source value handed to resolvers.
pub type SourceValue = Arc<dyn Any + Send + Sync>;

/// User-supplied logic producing the value of a field.
///
/// Implemented for every `Fn(ResolverContext) -> impl Future` closure.
pub trait FieldResolver: Send + Sync {
    /// Resolves the field described by `ctx`.
    fn resolve(&self, ctx: ResolverContext) -> BoxFuture<'static, FieldResult<Resolved>>;
}

impl<F, Fut> FieldResolver for F
where
    F: Fn(ResolverContext) -> Fut + Send + Sync,
    Fut: Future<Output = FieldResult<Resolved>> + Send + 'static,
{
    fn resolve(&self, ctx: ResolverContext) -> BoxFuture<'static, FieldResult<Resolved>> {
        self(ctx).boxed()
    }
}

/// Raw output of a resolver, completed by the executor according to the
/// field's type.
#[derive(Clone)]
pub enum Resolved {
    /// No value.
    Null,

    /// A leaf value, serialized through the field's scalar or enum type.
    Value(Value),

    /// An object value, becoming the source of the nested selection.
    Object {
        /// Name of the runtime object type.
        ///
        /// Required when the field's type is abstract.
        type_name: Option<ArcStr>,
        /// The object itself.
        source: SourceValue,
    },

    /// A list of values, completed item by item.
    List(Vec<Resolved>),
}

impl Resolved {
    /// No value.
    pub fn null() -> Self {
        Self::Null
    }

    /// A leaf value.
    ///
    /// [`Value::Null`] becomes [`Resolved::Null`].
    pub fn value(v: impl Into<Value>) -> Self {
        Self::from(v.into())
    }

    /// An object of a concrete type.
    pub fn object<T: Any + Send + Sync>(source: T) -> Self {
        Self::Object {
            type_name: None,
            source: Arc::new(source),
        }
    }

    /// An object of the named runtime type, for abstract fields.
    pub fn typed_object<T: Any + Send + Sync>(type_name: impl Into<ArcStr>, source: T) -> Self {
        Self::Object {
            type_name: Some(type_name.into()),
            source: Arc::new(source),
        }
    }

    /// An already shared object.
    pub fn shared_object(type_name: Option<ArcStr>, source: SourceValue) -> Self {
        Self::Object { type_name, source }
    }

    /// A list of values.
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Self>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Whether this is [`Resolved::Null`] or a null leaf value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null | Self::Value(Value::Null))
    }
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Object { type_name, .. } => f
                .debug_struct("Object")
                .field("type_name", type_name)
                .finish_non_exhaustive(),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
        }
    }
}

impl From<Value> for Resolved {
    fn from(v: Value) -> Self {
        if v.is_null() { Self::Null } else { Self::Value(v) }
    }
}

impl<T: Into<Resolved>> From<Option<T>> for Resolved {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Coerced argument values of a field.
///
/// Variables are substituted and schema defaults applied; arguments
/// neither provided nor defaulted are absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldArguments {
    values: IndexMap<ArcStr, InputValue>,
}

impl FieldArguments {
    /// Looks up an argument by name.
    pub fn get(&self, name: &str) -> Option<&InputValue> {
        self.values.get(name)
    }

    /// Iterates over the arguments in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&ArcStr, &InputValue)> {
        self.values.iter()
    }

    /// Number of present arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no argument is present.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn coerce(
        schema: &Schema,
        field: &Field,
        provided: &ast::Arguments,
        variables: &Variables,
    ) -> FieldResult<Self> {
        let mut values = IndexMap::with_capacity(field.arguments.len());
        for arg in &field.arguments {
            let value = match provided.get(&arg.name) {
                Some(InputValue::Variable(var)) => variables.get(var).cloned(),
                Some(v) => Some(v.clone().into_const(variables)),
                None => None,
            };

            let value = match (value, &arg.default_value) {
                (Some(v), _) => v,
                (None, Some(default)) => default.clone(),
                (None, None) if arg.resolved_type().is_non_null() => {
                    return Err(FieldError::from(format!(
                        "Argument \"{}\" of type \"{}\" is required but not provided",
                        arg.name,
                        schema.type_literal(arg.resolved_type()),
                    )));
                }
                (None, None) => continue,
            };

            check_input(schema, arg, arg.resolved_type(), &value)?;
            values.insert(arg.name.clone(), value);
        }
        Ok(Self { values })
    }
}

fn check_input(
    schema: &Schema,
    arg: &Argument,
    ty: &ResolvedType,
    value: &InputValue,
) -> FieldResult<()> {
    let invalid = |reason: String| {
        FieldError::from(format!(
            "Invalid value for argument \"{}\", expected type \"{}\": {reason}",
            arg.name,
            schema.type_literal(arg.resolved_type()),
        ))
    };

    match (ty, value) {
        (ResolvedType::NonNull(_), InputValue::Null) => Err(invalid("found null".into())),
        (ResolvedType::NonNull(inner), v) => check_input(schema, arg, inner, v),
        (_, InputValue::Null) => Ok(()),
        (ResolvedType::List(inner), InputValue::List(items)) => items
            .iter()
            .try_for_each(|item| check_input(schema, arg, inner, item)),
        (ResolvedType::List(inner), v) => check_input(schema, arg, inner, v),
        (ResolvedType::Named(h), v) => match schema.meta_type(*h) {
            MetaType::Scalar(s) => s.parse_literal(v).map(drop).map_err(|e| invalid(e.to_string())),
            MetaType::Enum(e) => {
                let name = v.as_enum_value().or_else(|| v.as_string_value());
                match name {
                    Some(n) if e.has_value(n) => Ok(()),
                    _ => Err(invalid(format!("found {v}"))),
                }
            }
            MetaType::Object(_) | MetaType::Interface(_) | MetaType::Union(_) => Ok(()),
        },
    }
}

/// Everything a resolver may need about the field it resolves.
#[derive(Clone)]
pub struct ResolverContext {
    context: Arc<ExecutionContext>,
    sources: ImmutableStack<SourceValue>,
    field_selection: Arc<FieldSelection>,
    arguments: FieldArguments,
    path: Path,
}

impl ResolverContext {
    pub(crate) fn new(
        context: Arc<ExecutionContext>,
        sources: ImmutableStack<SourceValue>,
        field_selection: Arc<FieldSelection>,
        arguments: FieldArguments,
        path: Path,
    ) -> Self {
        Self {
            context,
            sources,
            field_selection,
            arguments,
            path,
        }
    }

    /// The immediate parent value, if it is a `T`.
    pub fn parent<T: Any>(&self) -> Option<&T> {
        self.sources.peek()?.downcast_ref::<T>()
    }

    /// The nearest ancestor value that is a `T`, the parent included.
    pub fn ancestor<T: Any>(&self) -> Option<&T> {
        self.sources.iter().find_map(|s| s.downcast_ref::<T>())
    }

    /// Every ancestor value, the parent first.
    pub fn sources(&self) -> &ImmutableStack<SourceValue> {
        &self.sources
    }

    /// A coerced argument value by name.
    pub fn argument(&self, name: &str) -> Option<&InputValue> {
        self.arguments.get(name)
    }

    /// All coerced argument values.
    pub fn arguments(&self) -> &FieldArguments {
        &self.arguments
    }

    /// Path of the field in the response.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The merged field selection being resolved.
    pub fn field_selection(&self) -> &FieldSelection {
        &self.field_selection
    }

    /// The schema the operation executes against.
    pub fn schema(&self) -> &Schema {
        self.context.schema()
    }

    /// Variables of the operation.
    pub fn variables(&self) -> &Variables {
        self.context.variables()
    }

    /// The request's dependency-resolution service.
    pub fn services(&self) -> &dyn ServiceProvider {
        &**self.context.services()
    }

    /// The session the operation runs in.
    pub fn session(&self) -> &Session {
        self.context.session()
    }

    /// The context of the whole operation.
    pub fn execution_context(&self) -> &Arc<ExecutionContext> {
        &self.context
    }
}

impl fmt::Debug for ResolverContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverContext")
            .field("field", self.field_selection.response_name())
            .field("path", &self.path)
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}
