//! Schema description and two-phase type binding

pub mod binding;
pub mod meta;
pub mod model;

pub use self::{
    binding::{BindingError, BindingState, TypeSystemNode},
    meta::{
        Argument, DeprecationStatus, DirectiveLocation, DirectiveType, EnumMeta, EnumValue,
        Field, FieldBinding, InterfaceMeta, MetaType, ObjectMeta, ScalarMeta, TYPENAME_FIELD,
        TypeKind, UnionMeta,
    },
    model::{NativeType, ResolvedType, Schema, SchemaBuilder, SchemaError, TypeHandle},
};
