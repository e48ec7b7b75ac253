//! The bound schema arena and its builder

use std::{
    any::{Any, TypeId},
    fmt,
    sync::Arc,
};

use arcstr::ArcStr;
use derive_more::with_trait::{Display, Error, From};
use fnv::FnvHashMap;

use crate::{
    ast::OperationType,
    executor::{ServiceProvider, SourceValue},
    schema::{
        binding::{BindingError, TypeInitializer},
        meta::{DirectiveType, MetaType, ObjectMeta, ScalarMeta, TypeKind},
    },
    types::{BooleanType, FloatType, IdType, IntType, StringType},
};

/// Stable index of a type in the [`Schema`] arena.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TypeHandle(usize);

impl TypeHandle {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the type in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A declared type literal with every name bound to its arena handle.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ResolvedType {
    /// A nullable named type.
    Named(TypeHandle),
    /// A nullable list of the inner type.
    List(Box<ResolvedType>),
    /// A non-null wrapper around the inner type.
    NonNull(Box<ResolvedType>),
}

impl ResolvedType {
    /// Wraps a type into a list.
    pub fn list(of: Self) -> Self {
        Self::List(Box::new(of))
    }

    /// Wraps a type into a non-null marker.
    pub fn non_null(of: Self) -> Self {
        Self::NonNull(Box::new(of))
    }

    /// Handle of the named type at the core of this type.
    pub fn innermost_handle(&self) -> TypeHandle {
        match self {
            Self::Named(h) => *h,
            Self::List(of) | Self::NonNull(of) => of.innermost_handle(),
        }
    }

    /// Whether this type is wrapped in a non-null marker.
    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }
}

/// Error of [`SchemaBuilder::build`].
#[derive(Clone, Debug, Display, Error, From, PartialEq)]
pub enum SchemaError {
    /// Two types were registered under the same name.
    #[display("Type `{name}` is defined more than once")]
    DuplicateType {
        /// The conflicting name.
        name: ArcStr,
    },

    /// No query root type name was provided.
    #[display("Schema has no query type")]
    MissingQueryType,

    /// A root type name does not exist in the schema.
    #[display("Root {operation} type `{name}` is not defined")]
    UnknownRootType {
        /// Operation the root serves.
        operation: OperationType,
        /// The missing type name.
        name: ArcStr,
    },

    /// A root type is not an object type.
    #[display("Root {operation} type `{name}` must be an object type")]
    InvalidRootType {
        /// Operation the root serves.
        operation: OperationType,
        /// The offending type name.
        name: ArcStr,
    },

    /// A native representation was bound to a type that does not exist.
    #[display("Native representation bound to unknown type `{name}`")]
    UnknownNativeType {
        /// The missing type name.
        name: ArcStr,
    },

    /// The two-phase type binding failed.
    #[display("{_0}")]
    #[from]
    Binding(BindingError),
}

/// Factory creating a root value from the services of a request.
pub type NativeFactory = Arc<dyn Fn(&dyn ServiceProvider) -> SourceValue + Send + Sync>;

/// Native (Rust) representation of a schema type.
///
/// Root values of operations without a caller-supplied initial value are
/// first looked up in the request's [`ServiceProvider`] by [`NativeType::rust_type`],
/// then constructed through the registered factory.
#[derive(Clone)]
pub struct NativeType {
    type_name: ArcStr,
    rust_type: TypeId,
    rust_type_name: &'static str,
    factory: NativeFactory,
}

impl NativeType {
    /// Name of the schema type represented.
    pub fn type_name(&self) -> &ArcStr {
        &self.type_name
    }

    /// [`TypeId`] of the Rust representation.
    pub fn rust_type(&self) -> TypeId {
        self.rust_type
    }

    /// Name of the Rust representation, for diagnostics.
    pub fn rust_type_name(&self) -> &'static str {
        self.rust_type_name
    }

    /// Constructs a fresh instance.
    pub fn create(&self, services: &dyn ServiceProvider) -> SourceValue {
        (self.factory)(services)
    }
}

impl fmt::Debug for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeType")
            .field("type_name", &self.type_name)
            .field("rust_type", &self.rust_type_name)
            .finish_non_exhaustive()
    }
}

/// Immutable, fully bound schema shared by every operation.
#[derive(Debug)]
pub struct Schema {
    types: Vec<MetaType>,
    names: FnvHashMap<ArcStr, TypeHandle>,
    query_type: TypeHandle,
    mutation_type: Option<TypeHandle>,
    subscription_type: Option<TypeHandle>,
    directives: FnvHashMap<ArcStr, DirectiveType>,
    native_types: FnvHashMap<ArcStr, NativeType>,
}

impl Schema {
    /// Starts building a schema with the built-in scalars and directives.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Iterates over all types and their handles.
    pub fn types(&self) -> impl Iterator<Item = (TypeHandle, &MetaType)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, t)| (TypeHandle::new(i), t))
    }

    /// Looks up a type by its name.
    pub fn type_by_name(&self, name: &str) -> Option<&MetaType> {
        self.handle_by_name(name).map(|h| self.meta_type(h))
    }

    /// Looks up the handle of a type by its name.
    pub fn handle_by_name(&self, name: &str) -> Option<TypeHandle> {
        self.names.get(name).copied()
    }

    /// The type behind a handle.
    ///
    /// # Panics
    ///
    /// If the handle was not issued by this schema.
    pub fn meta_type(&self, handle: TypeHandle) -> &MetaType {
        &self.types[handle.index()]
    }

    /// The query root type.
    pub fn query_type(&self) -> TypeHandle {
        self.query_type
    }

    /// The root type serving operations of the given kind, if any.
    pub fn root_type(&self, operation: OperationType) -> Option<TypeHandle> {
        match operation {
            OperationType::Query => Some(self.query_type),
            OperationType::Mutation => self.mutation_type,
            OperationType::Subscription => self.subscription_type,
        }
    }

    /// Native representation bound to the named type, if any.
    pub fn native_type(&self, name: &str) -> Option<&NativeType> {
        self.native_types.get(name)
    }

    /// Looks up a directive by its name.
    pub fn directive_by_name(&self, name: &str) -> Option<&DirectiveType> {
        self.directives.get(name)
    }

    /// Object types an abstract type may resolve to.
    ///
    /// # Panics
    ///
    /// If `abstract_type` is neither an interface nor a union.
    pub fn possible_types(&self, abstract_type: TypeHandle) -> Vec<TypeHandle> {
        match self.meta_type(abstract_type) {
            MetaType::Union(u) => u.possible_type_handles().to_vec(),
            MetaType::Interface(_) => self
                .types()
                .filter(|(_, t)| match t {
                    MetaType::Object(o) => o.interface_handles().contains(&abstract_type),
                    _ => false,
                })
                .map(|(h, _)| h)
                .collect(),
            t => panic!(
                "Can't retrieve possible types from non-abstract meta type `{}`",
                t.name(),
            ),
        }
    }

    /// Whether `object_type` is a member of `abstract_type`.
    pub fn is_possible_type(&self, abstract_type: TypeHandle, object_type: TypeHandle) -> bool {
        match self.meta_type(abstract_type) {
            MetaType::Union(u) => u.possible_type_handles().contains(&object_type),
            MetaType::Interface(_) => match self.meta_type(object_type) {
                MetaType::Object(o) => o.interface_handles().contains(&abstract_type),
                _ => false,
            },
            _ => false,
        }
    }

    /// Renders a resolved type the way it is written in a query.
    pub fn type_literal(&self, ty: &ResolvedType) -> String {
        match ty {
            ResolvedType::Named(h) => self.meta_type(*h).name().to_string(),
            ResolvedType::List(of) => format!("[{}]", self.type_literal(of)),
            ResolvedType::NonNull(of) => format!("{}!", self.type_literal(of)),
        }
    }
}

/// Builder collecting the types of a [`Schema`].
///
/// ```rust
/// # use juniper_exec::{ast::Type, schema::{Field, ObjectMeta, Schema}, executor::Resolved};
/// let schema = Schema::builder()
///     .register(ObjectMeta::new(
///         "Query",
///         vec![Field::new("hello", Type::non_null_named("String"))
///             .resolve_with(|_| async { Ok(Resolved::value("world")) })],
///     ))
///     .query_type("Query")
///     .build()
///     .expect("valid schema");
///
/// assert!(schema.type_by_name("Query").is_some());
/// ```
pub struct SchemaBuilder {
    types: Vec<MetaType>,
    directives: Vec<DirectiveType>,
    query_type: Option<ArcStr>,
    mutation_type: Option<ArcStr>,
    subscription_type: Option<ArcStr>,
    native_types: Vec<NativeType>,
}

impl SchemaBuilder {
    /// Creates a builder holding the built-in scalars and the `@skip` and
    /// `@include` directives.
    pub fn new() -> Self {
        Self {
            types: vec![
                ScalarMeta::new::<BooleanType>().into(),
                ScalarMeta::new::<IntType>().into(),
                ScalarMeta::new::<FloatType>().into(),
                ScalarMeta::new::<StringType>().into(),
                ScalarMeta::new::<IdType>().into(),
            ],
            directives: vec![DirectiveType::new_skip(), DirectiveType::new_include()],
            query_type: None,
            mutation_type: None,
            subscription_type: None,
            native_types: vec![],
        }
    }

    /// Adds a type to the schema.
    #[must_use]
    pub fn register(mut self, ty: impl Into<MetaType>) -> Self {
        self.types.push(ty.into());
        self
    }

    /// Adds a directive to the schema.
    #[must_use]
    pub fn directive(mut self, directive: DirectiveType) -> Self {
        self.directives.push(directive);
        self
    }

    /// Names the query root type.
    #[must_use]
    pub fn query_type(mut self, name: impl Into<ArcStr>) -> Self {
        self.query_type = Some(name.into());
        self
    }

    /// Names the mutation root type.
    #[must_use]
    pub fn mutation_type(mut self, name: impl Into<ArcStr>) -> Self {
        self.mutation_type = Some(name.into());
        self
    }

    /// Names the subscription root type.
    #[must_use]
    pub fn subscription_type(mut self, name: impl Into<ArcStr>) -> Self {
        self.subscription_type = Some(name.into());
        self
    }

    /// Binds the Rust representation `T` to the named type, constructed by
    /// `factory` whenever a request's services don't provide one.
    #[must_use]
    pub fn bind_native<T, F>(mut self, type_name: impl Into<ArcStr>, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&dyn ServiceProvider) -> T + Send + Sync + 'static,
    {
        self.native_types.push(NativeType {
            type_name: type_name.into(),
            rust_type: TypeId::of::<T>(),
            rust_type_name: std::any::type_name::<T>(),
            factory: Arc::new(move |services: &dyn ServiceProvider| {
                Arc::new(factory(services)) as SourceValue
            }),
        });
        self
    }

    /// Runs the two-phase type binding and produces the [`Schema`].
    pub fn build(self) -> Result<Schema, SchemaError> {
        let Self {
            mut types,
            directives,
            query_type,
            mutation_type,
            subscription_type,
            native_types,
        } = self;

        for ty in &mut types {
            ty.ensure_typename_field();
        }

        let mut init = TypeInitializer::new(types, directives)
            .map_err(|name| SchemaError::DuplicateType { name })?;

        let root = |operation, name: Option<ArcStr>| -> Result<Option<TypeHandle>, SchemaError> {
            let Some(name) = name else {
                return Ok(None);
            };
            init.handle_by_name(&name)
                .map(Some)
                .ok_or(SchemaError::UnknownRootType { operation, name })
        };
        let query = root(OperationType::Query, query_type)?.ok_or(SchemaError::MissingQueryType)?;
        let mutation = root(OperationType::Mutation, mutation_type)?;
        let subscription = root(OperationType::Subscription, subscription_type)?;

        init.register_dependencies()?;
        init.complete_types()?;

        let (types, names, directives) = init.into_parts();

        for (operation, handle) in [
            (OperationType::Query, Some(query)),
            (OperationType::Mutation, mutation),
            (OperationType::Subscription, subscription),
        ] {
            if let Some(handle) = handle {
                let ty = &types[handle.index()];
                if ty.type_kind() != TypeKind::Object {
                    return Err(SchemaError::InvalidRootType {
                        operation,
                        name: ty.name().clone(),
                    });
                }
            }
        }

        let native_types = native_types
            .into_iter()
            .map(|n| {
                if names.contains_key(&n.type_name) {
                    Ok((n.type_name.clone(), n))
                } else {
                    Err(SchemaError::UnknownNativeType { name: n.type_name })
                }
            })
            .collect::<Result<_, _>>()?;

        __trace!("schema built with {} types", types.len());

        Ok(Schema {
            types,
            names,
            query_type: query,
            mutation_type: mutation,
            subscription_type: subscription,
            directives: directives
                .into_iter()
                .map(|d| (d.name.clone(), d))
                .collect(),
            native_types,
        })
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ObjectMeta> for SchemaBuilder {
    fn from(query: ObjectMeta) -> Self {
        let name = query.name.clone();
        Self::new().register(query).query_type(name)
    }
}
