//! Types used to describe a `GraphQL` schema

use std::{fmt, future::Future, sync::Arc};

use arcstr::ArcStr;
use derive_more::with_trait::{Display, From};

use crate::{
    ast::{InputValue, Type},
    executor::{FieldResolver, FieldResult, Resolved, ResolverContext},
    schema::{
        binding::{BindingError, BindingState, CompleteContext, RegisterContext, TypeSystemNode},
        model::{ResolvedType, TypeHandle},
    },
    types::{ScalarError, ScalarType},
    value::{ScalarValue, Value},
};

/// Whether an item is deprecated, with context.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum DeprecationStatus {
    /// The field/variant is not deprecated.
    #[default]
    Current,
    /// The field/variant is deprecated, with an optional reason
    Deprecated(Option<ArcStr>),
}

impl DeprecationStatus {
    /// If this deprecation status indicates the item is deprecated.
    pub fn is_deprecated(&self) -> bool {
        match self {
            Self::Current => false,
            Self::Deprecated(_) => true,
        }
    }

    /// An optional reason for the deprecation, or none if `Current`.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Current => None,
            Self::Deprecated(rsn) => rsn.as_deref(),
        }
    }
}

/// The GraphQL specification defines a number of type kinds - the meta type
/// of a type.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum TypeKind {
    /// ## Scalar types
    ///
    /// Scalar types appear as the leaf nodes of GraphQL queries.
    #[display("SCALAR")]
    Scalar,

    /// ## Object types
    ///
    /// Objects have fields and can implement interfaces.
    #[display("OBJECT")]
    Object,

    /// ## Interface types
    ///
    /// Interface types are used to represent overlapping fields between
    /// multiple types, and can be queried for their concrete type.
    #[display("INTERFACE")]
    Interface,

    /// ## Union types
    ///
    /// Unions are similar to interfaces but can not contain any fields on
    /// their own.
    #[display("UNION")]
    Union,

    /// ## Enum types
    ///
    /// Like scalars, enum types appear as the leaf nodes of GraphQL queries.
    #[display("ENUM")]
    Enum,
}

/// Shortcut for a literal parsing function.
pub type ParseLiteralFn = fn(&InputValue) -> Result<Option<ScalarValue>, ScalarError>;

/// Shortcut for an output serialization function.
pub type SerializeFn = fn(&Value) -> Result<Value, ScalarError>;

/// Scalar type metadata
pub struct ScalarMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    pub(crate) parse_literal_fn: ParseLiteralFn,
    pub(crate) serialize_fn: SerializeFn,
}

impl ScalarMeta {
    /// Builds a new [`ScalarMeta`] backed by the provided [`ScalarType`].
    pub fn new<T: ScalarType>() -> Self {
        Self {
            name: ArcStr::from(T::NAME),
            description: None,
            parse_literal_fn: T::parse_literal,
            serialize_fn: T::serialize,
        }
    }

    /// Sets the `description` of this [`ScalarMeta`] type.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Coerces an input literal of this scalar, `None` meaning `null`.
    pub fn parse_literal(&self, literal: &InputValue) -> Result<Option<ScalarValue>, ScalarError> {
        (self.parse_literal_fn)(literal)
    }

    /// Serializes a resolved value of this scalar into the response.
    pub fn serialize(&self, value: &Value) -> Result<Value, ScalarError> {
        (self.serialize_fn)(value)
    }
}

impl fmt::Debug for ScalarMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarMeta")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Metadata for a single value in an enum
#[derive(Clone, Debug)]
pub struct EnumValue {
    /// The name of the enum value
    ///
    /// This is the string literal representation of the enum in responses.
    pub name: ArcStr,
    /// The optional description of the enum value.
    pub description: Option<ArcStr>,
    /// Whether the value is deprecated or not, with an optional reason.
    pub deprecation_status: DeprecationStatus,
}

impl EnumValue {
    /// Constructs a new [`EnumValue`] with the provided `name`.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            description: None,
            deprecation_status: DeprecationStatus::Current,
        }
    }
}

/// Enum type metadata
#[derive(Debug)]
pub struct EnumMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub values: Vec<EnumValue>,
}

impl EnumMeta {
    /// Builds a new [`EnumMeta`] type with the specified `name` and possible
    /// `values`.
    pub fn new(name: impl Into<ArcStr>, values: Vec<EnumValue>) -> Self {
        Self {
            name: name.into(),
            description: None,
            values,
        }
    }

    /// Sets the `description` of this [`EnumMeta`] type.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether `name` is one of the values of this enum.
    pub fn has_value(&self, name: &str) -> bool {
        self.values.iter().any(|v| v.name == name)
    }
}

/// Object type metadata
#[derive(Debug)]
pub struct ObjectMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub fields: Vec<Field>,
    #[doc(hidden)]
    pub interface_names: Vec<ArcStr>,
    pub(crate) interfaces: BindingState<Vec<TypeHandle>>,
}

impl ObjectMeta {
    /// Builds a new [`ObjectMeta`] type with the specified `name` and `fields`.
    pub fn new(name: impl Into<ArcStr>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields,
            interface_names: vec![],
            interfaces: BindingState::Unregistered,
        }
    }

    /// Sets the `description` of this [`ObjectMeta`] type.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the `interfaces` this [`ObjectMeta`] type implements.
    ///
    /// Overwrites any previously set list of interfaces.
    #[must_use]
    pub fn interfaces(mut self, interfaces: &[&str]) -> Self {
        self.interface_names = interfaces.iter().map(|n| ArcStr::from(*n)).collect();
        self
    }

    /// Handles of the implemented interfaces, once bound.
    pub fn interface_handles(&self) -> &[TypeHandle] {
        self.interfaces.get().map_or(&[], Vec::as_slice)
    }
}

/// Interface type metadata
#[derive(Debug)]
pub struct InterfaceMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub fields: Vec<Field>,
}

impl InterfaceMeta {
    /// Builds a new [`InterfaceMeta`] type with the specified `name` and
    /// `fields`.
    pub fn new(name: impl Into<ArcStr>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields,
        }
    }

    /// Sets the `description` of this [`InterfaceMeta`] type.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Union type metadata
#[derive(Debug)]
pub struct UnionMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub of_type_names: Vec<ArcStr>,
    pub(crate) possible_types: BindingState<Vec<TypeHandle>>,
}

impl UnionMeta {
    /// Builds a new [`UnionMeta`] type with the specified `name` and possible
    /// member type names.
    pub fn new(name: impl Into<ArcStr>, of_types: &[&str]) -> Self {
        Self {
            name: name.into(),
            description: None,
            of_type_names: of_types.iter().map(|n| ArcStr::from(*n)).collect(),
            possible_types: BindingState::Unregistered,
        }
    }

    /// Sets the `description` of this [`UnionMeta`] type.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Handles of the member types, once bound.
    pub fn possible_type_handles(&self) -> &[TypeHandle] {
        self.possible_types.get().map_or(&[], Vec::as_slice)
    }
}

/// Generic type metadata
#[derive(Debug, From)]
pub enum MetaType {
    #[doc(hidden)]
    Scalar(ScalarMeta),
    #[doc(hidden)]
    Enum(EnumMeta),
    #[doc(hidden)]
    Object(ObjectMeta),
    #[doc(hidden)]
    Interface(InterfaceMeta),
    #[doc(hidden)]
    Union(UnionMeta),
}

impl MetaType {
    /// Access the name of the type
    pub fn name(&self) -> &ArcStr {
        match self {
            Self::Scalar(ScalarMeta { name, .. })
            | Self::Enum(EnumMeta { name, .. })
            | Self::Object(ObjectMeta { name, .. })
            | Self::Interface(InterfaceMeta { name, .. })
            | Self::Union(UnionMeta { name, .. }) => name,
        }
    }

    /// Access the description of the type, if applicable
    pub fn description(&self) -> Option<&ArcStr> {
        match self {
            Self::Scalar(ScalarMeta { description, .. })
            | Self::Enum(EnumMeta { description, .. })
            | Self::Object(ObjectMeta { description, .. })
            | Self::Interface(InterfaceMeta { description, .. })
            | Self::Union(UnionMeta { description, .. }) => description.as_ref(),
        }
    }

    /// Construct a [`TypeKind`] for a given type
    pub fn type_kind(&self) -> TypeKind {
        match self {
            Self::Scalar(_) => TypeKind::Scalar,
            Self::Enum(_) => TypeKind::Enum,
            Self::Object(_) => TypeKind::Object,
            Self::Interface(_) => TypeKind::Interface,
            Self::Union(_) => TypeKind::Union,
        }
    }

    /// Access the fields of the type, if applicable
    ///
    /// Only objects and interfaces have fields.
    pub fn fields(&self) -> Option<&[Field]> {
        match self {
            Self::Object(ObjectMeta { fields, .. })
            | Self::Interface(InterfaceMeta { fields, .. }) => Some(fields),
            Self::Scalar(_) | Self::Enum(_) | Self::Union(_) => None,
        }
    }

    fn fields_mut(&mut self) -> Option<&mut Vec<Field>> {
        match self {
            Self::Object(ObjectMeta { fields, .. })
            | Self::Interface(InterfaceMeta { fields, .. }) => Some(fields),
            Self::Scalar(_) | Self::Enum(_) | Self::Union(_) => None,
        }
    }

    /// Access a field's meta data given its name
    ///
    /// Only objects and interfaces have fields.
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields()?.iter().find(|f| f.name == name)
    }

    /// Position of a field in [`MetaType::fields`], given its name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields()?.iter().position(|f| f.name == name)
    }

    /// Returns true if the type can occur in leaf positions in queries
    ///
    /// Only enums and scalars are leaf types.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Enum(_) | Self::Scalar(_))
    }

    /// Returns true if the type is abstract
    ///
    /// Only interfaces and unions are abstract types.
    pub fn is_abstract(&self) -> bool {
        matches!(self, Self::Interface(_) | Self::Union(_))
    }

    /// Returns true if the type is built-in to GraphQL.
    pub fn is_builtin(&self) -> bool {
        self.name().starts_with("__")
    }

    pub(crate) fn ensure_typename_field(&mut self) {
        if let Some(fields) = self.fields_mut() {
            if !fields.iter().any(|f| f.name == TYPENAME_FIELD) {
                fields.push(Field::new(TYPENAME_FIELD, Type::non_null_named("String")));
            }
        }
    }
}

/// Name of the implicit field every object and interface carries.
pub const TYPENAME_FIELD: &str = "__typename";

impl TypeSystemNode for MetaType {
    fn register_dependencies(&mut self, ctx: &mut RegisterContext<'_>) -> Result<(), BindingError> {
        match self {
            Self::Scalar(_) | Self::Enum(_) => Ok(()),
            Self::Object(o) => {
                for name in &o.interface_names {
                    ctx.register_name(name);
                }
                o.interfaces.register(&o.name)?;
                o.fields
                    .iter_mut()
                    .try_for_each(|f| f.register_dependencies(ctx))
            }
            Self::Interface(i) => i
                .fields
                .iter_mut()
                .try_for_each(|f| f.register_dependencies(ctx)),
            Self::Union(u) => {
                for name in &u.of_type_names {
                    ctx.register_name(name);
                }
                u.possible_types.register(&u.name)
            }
        }
    }

    fn complete_type(&mut self, ctx: &CompleteContext<'_>) -> Result<(), BindingError> {
        match self {
            Self::Scalar(_) | Self::Enum(_) => Ok(()),
            Self::Object(o) => {
                let interfaces = o
                    .interface_names
                    .iter()
                    .map(|n| ctx.resolve_kind(n, &o.name, TypeKind::Interface))
                    .collect::<Result<_, _>>()?;
                o.interfaces.complete(&o.name, interfaces)?;
                o.fields.iter_mut().try_for_each(|f| f.complete_type(ctx))
            }
            Self::Interface(i) => i.fields.iter_mut().try_for_each(|f| f.complete_type(ctx)),
            Self::Union(u) => {
                let members = u
                    .of_type_names
                    .iter()
                    .map(|n| ctx.resolve_kind(n, &u.name, TypeKind::Object))
                    .collect::<Result<_, _>>()?;
                u.possible_types.complete(&u.name, members)
            }
        }
    }
}

/// Types bound to a [`Field`] once its declaring type completed.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldBinding {
    /// The object or interface type declaring the field.
    pub declaring_type: TypeHandle,
    /// The field's output type.
    pub resolved_type: ResolvedType,
}

/// Metadata for a field
#[derive(Clone)]
pub struct Field {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub arguments: Vec<Argument>,
    #[doc(hidden)]
    pub field_type: Type,
    #[doc(hidden)]
    pub deprecation_status: DeprecationStatus,
    pub(crate) resolver: Option<Arc<dyn FieldResolver>>,
    pub(crate) binding: BindingState<FieldBinding>,
}

impl Field {
    /// Builds a new [`Field`] with the given `name` and declared output type.
    pub fn new(name: impl Into<ArcStr>, field_type: Type) -> Self {
        Self {
            name: name.into(),
            description: None,
            arguments: vec![],
            field_type,
            deprecation_status: DeprecationStatus::Current,
            resolver: None,
            binding: BindingState::Unregistered,
        }
    }

    /// Sets the `description` of this [`Field`].
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds an `argument` to this [`Field`].
    ///
    /// Arguments are unordered and can't contain duplicates by name.
    #[must_use]
    pub fn argument(mut self, argument: Argument) -> Self {
        self.arguments.retain(|a| a.name != argument.name);
        self.arguments.push(argument);
        self
    }

    /// Sets this [`Field`] as deprecated with an optional `reason`.
    #[must_use]
    pub fn deprecated(mut self, reason: Option<&str>) -> Self {
        self.deprecation_status = DeprecationStatus::Deprecated(reason.map(ArcStr::from));
        self
    }

    /// Sets the resolver invoked to produce this [`Field`]'s value.
    #[must_use]
    pub fn resolve_with<F, Fut>(self, resolver: F) -> Self
    where
        F: Fn(ResolverContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FieldResult<Resolved>> + Send + 'static,
    {
        self.resolver(resolver)
    }

    /// Sets an already built [`FieldResolver`] for this [`Field`].
    #[must_use]
    pub fn resolver(mut self, resolver: impl FieldResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Resolver of this field, if one was attached.
    pub fn field_resolver(&self) -> Option<&Arc<dyn FieldResolver>> {
        self.resolver.as_ref()
    }

    /// Looks up an argument definition by its name.
    pub fn argument_by_name(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|a| a.name == name)
    }

    /// Returns true if the field is built-in to GraphQL.
    pub fn is_builtin(&self) -> bool {
        self.name.starts_with("__")
    }

    /// Whether both binding phases have run for this field.
    pub fn is_bound(&self) -> bool {
        self.binding.is_completed()
    }

    /// Bound types of this field, if completed.
    pub fn binding(&self) -> Option<&FieldBinding> {
        self.binding.get()
    }

    /// The object or interface type declaring this field.
    ///
    /// # Panics
    ///
    /// If the field has not completed its type binding yet.
    pub fn declaring_type(&self) -> TypeHandle {
        self.expect_binding().declaring_type
    }

    /// The output type of this field.
    ///
    /// # Panics
    ///
    /// If the field has not completed its type binding yet.
    pub fn resolved_type(&self) -> &ResolvedType {
        &self.expect_binding().resolved_type
    }

    fn expect_binding(&self) -> &FieldBinding {
        self.binding.get().unwrap_or_else(|| {
            panic!(
                "Field `{}` was accessed before its type was completed",
                self.name,
            )
        })
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("arguments", &self.arguments)
            .field("field_type", &self.field_type)
            .field("deprecation_status", &self.deprecation_status)
            .field("resolver", &self.resolver.is_some())
            .field("binding", &self.binding)
            .finish()
    }
}

impl TypeSystemNode for Field {
    fn register_dependencies(&mut self, ctx: &mut RegisterContext<'_>) -> Result<(), BindingError> {
        if ctx.declaring_type().is_none() {
            return Err(BindingError::MissingTypeContext {
                node: self.name.clone(),
            });
        }
        ctx.register_type(&self.field_type);
        self.arguments
            .iter_mut()
            .try_for_each(|a| a.register_dependencies(ctx))?;
        self.binding.register(&self.name)
    }

    fn complete_type(&mut self, ctx: &CompleteContext<'_>) -> Result<(), BindingError> {
        let Some(declaring_type) = ctx.declaring_type() else {
            return Err(BindingError::MissingTypeContext {
                node: self.name.clone(),
            });
        };
        self.binding.ensure_registered(&self.name)?;
        let resolved_type = ctx.resolve_type(&self.field_type, &self.name)?;
        self.arguments
            .iter_mut()
            .try_for_each(|a| a.complete_type(ctx))?;
        self.binding.complete(
            &self.name,
            FieldBinding {
                declaring_type,
                resolved_type,
            },
        )
    }
}

/// Metadata for an argument to a field
#[derive(Clone, Debug)]
pub struct Argument {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub arg_type: Type,
    #[doc(hidden)]
    pub default_value: Option<InputValue>,
    pub(crate) binding: BindingState<ResolvedType>,
}

impl Argument {
    /// Builds a new [`Argument`] of the given [`Type`] with the given `name`.
    pub fn new(name: impl Into<ArcStr>, arg_type: Type) -> Self {
        Self {
            name: name.into(),
            description: None,
            arg_type,
            default_value: None,
            binding: BindingState::Unregistered,
        }
    }

    /// Sets the `description` of this [`Argument`].
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the default value of this [`Argument`].
    #[must_use]
    pub fn default_value(mut self, val: impl Into<InputValue>) -> Self {
        self.default_value = Some(val.into());
        self
    }

    /// The input type of this argument.
    ///
    /// # Panics
    ///
    /// If the argument has not completed its type binding yet.
    pub fn resolved_type(&self) -> &ResolvedType {
        self.binding.get().unwrap_or_else(|| {
            panic!(
                "Argument `{}` was accessed before its type was completed",
                self.name,
            )
        })
    }
}

impl TypeSystemNode for Argument {
    fn register_dependencies(&mut self, ctx: &mut RegisterContext<'_>) -> Result<(), BindingError> {
        if ctx.declaring_type().is_none() && !ctx.is_directive() {
            return Err(BindingError::MissingTypeContext {
                node: self.name.clone(),
            });
        }
        ctx.register_type(&self.arg_type);
        self.binding.register(&self.name)
    }

    fn complete_type(&mut self, ctx: &CompleteContext<'_>) -> Result<(), BindingError> {
        self.binding.ensure_registered(&self.name)?;
        let resolved = ctx.resolve_type(&self.arg_type, &self.name)?;
        self.binding.complete(&self.name, resolved)
    }
}

/// Location in a query document a directive may appear at.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum DirectiveLocation {
    #[display("FIELD")]
    Field,
    #[display("FRAGMENT_SPREAD")]
    FragmentSpread,
    #[display("INLINE_FRAGMENT")]
    InlineFragment,
}

/// Directive metadata
#[derive(Clone, Debug)]
pub struct DirectiveType {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub locations: Vec<DirectiveLocation>,
    #[doc(hidden)]
    pub arguments: Vec<Argument>,
}

impl DirectiveType {
    /// Builds a new [`DirectiveType`].
    pub fn new(
        name: impl Into<ArcStr>,
        locations: &[DirectiveLocation],
        arguments: Vec<Argument>,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            locations: locations.to_vec(),
            arguments,
        }
    }

    /// The built-in `@skip(if: Boolean!)` directive.
    pub fn new_skip() -> Self {
        Self::new(
            "skip",
            &[
                DirectiveLocation::Field,
                DirectiveLocation::FragmentSpread,
                DirectiveLocation::InlineFragment,
            ],
            vec![Argument::new("if", Type::non_null_named("Boolean"))],
        )
        .description("Directs the executor to skip this field or fragment when the `if` argument is true.")
    }

    /// The built-in `@include(if: Boolean!)` directive.
    pub fn new_include() -> Self {
        Self::new(
            "include",
            &[
                DirectiveLocation::Field,
                DirectiveLocation::FragmentSpread,
                DirectiveLocation::InlineFragment,
            ],
            vec![Argument::new("if", Type::non_null_named("Boolean"))],
        )
        .description("Directs the executor to include this field or fragment only when the `if` argument is true.")
    }

    /// Sets the `description` of this [`DirectiveType`].
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl TypeSystemNode for DirectiveType {
    fn register_dependencies(&mut self, ctx: &mut RegisterContext<'_>) -> Result<(), BindingError> {
        self.arguments
            .iter_mut()
            .try_for_each(|a| a.register_dependencies(ctx))
    }

    fn complete_type(&mut self, ctx: &CompleteContext<'_>) -> Result<(), BindingError> {
        self.arguments
            .iter_mut()
            .try_for_each(|a| a.complete_type(ctx))
    }
}
