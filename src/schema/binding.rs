//! Two-phase binding of declared type references.
//!
//! Types routinely reference each other before any of them exists in full,
//! so every type-system node goes through two passes driven by a
//! [`TypeInitializer`]:
//!
//! 1. [`TypeSystemNode::register_dependencies`] announces the names of every
//!    type the node refers to, without looking any of them up.
//! 2. [`TypeSystemNode::complete_type`] runs once every announced name has an
//!    arena slot, and lets the node bind its resolved types and its declaring
//!    type back-reference.
//!
//! Bound types are stored in a [`BindingState`], which moves from
//! `Unregistered` to `Registered` to `Completed` and never back.

use arcstr::ArcStr;
use derive_more::with_trait::{Display, Error};
use fnv::FnvHashMap;
use indexmap::IndexSet;

use crate::{
    ast::Type,
    schema::{
        meta::{DirectiveType, MetaType, TypeKind},
        model::{ResolvedType, TypeHandle},
    },
};

/// Failure of the binding protocol.
///
/// Every variant describes a schema construction bug rather than bad input
/// data, and aborts schema building.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
pub enum BindingError {
    /// A node that needs an enclosing type was registered outside of one.
    #[display("`{node}` can only be registered within a declaring type")]
    MissingTypeContext {
        /// Name of the offending node.
        node: ArcStr,
    },

    /// A node was completed before its dependencies were registered.
    #[display("`{node}` must register its dependencies before completing its type")]
    NotRegistered {
        /// Name of the offending node.
        node: ArcStr,
    },

    /// A node was asked to register or complete once it already completed.
    #[display("`{node}` has already completed its type")]
    AlreadyCompleted {
        /// Name of the offending node.
        node: ArcStr,
    },

    /// A referenced type name has no definition in the schema.
    #[display("Unknown type `{name}` referenced by `{node}`")]
    UnknownType {
        /// Name of the missing type.
        name: ArcStr,
        /// Name of the referencing node.
        node: ArcStr,
    },

    /// A referenced type exists but is of the wrong kind.
    #[display("Type `{name}` must be of kind {expected}")]
    UnexpectedKind {
        /// Name of the referenced type.
        name: ArcStr,
        /// Kind the reference requires.
        expected: TypeKind,
    },
}

/// Binding slot of a type-system node.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum BindingState<T> {
    /// No dependencies were registered yet.
    #[default]
    Unregistered,

    /// Dependencies are registered, the bound value is not available yet.
    Registered,

    /// The bound value, set exactly once.
    Completed(T),
}

impl<T> BindingState<T> {
    /// Marks the dependencies of `node` as registered.
    ///
    /// Registering twice is harmless, registering after completion is not.
    pub fn register(&mut self, node: &ArcStr) -> Result<(), BindingError> {
        match self {
            Self::Unregistered | Self::Registered => {
                *self = Self::Registered;
                Ok(())
            }
            Self::Completed(_) => Err(BindingError::AlreadyCompleted { node: node.clone() }),
        }
    }

    /// Stores the bound value of `node`.
    pub fn complete(&mut self, node: &ArcStr, value: T) -> Result<(), BindingError> {
        self.ensure_registered(node)?;
        *self = Self::Completed(value);
        Ok(())
    }

    /// Checks that `node` is ready to complete.
    pub fn ensure_registered(&self, node: &ArcStr) -> Result<(), BindingError> {
        match self {
            Self::Unregistered => Err(BindingError::NotRegistered { node: node.clone() }),
            Self::Registered => Ok(()),
            Self::Completed(_) => Err(BindingError::AlreadyCompleted { node: node.clone() }),
        }
    }

    /// The bound value, if completed.
    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Completed(v) => Some(v),
            Self::Unregistered | Self::Registered => None,
        }
    }

    /// Whether the bound value is available.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// Context of the registration phase.
pub struct RegisterContext<'r> {
    declaring_type: Option<TypeHandle>,
    is_directive: bool,
    dependencies: &'r mut IndexSet<ArcStr>,
}

impl<'r> RegisterContext<'r> {
    pub(crate) fn new(
        declaring_type: Option<TypeHandle>,
        is_directive: bool,
        dependencies: &'r mut IndexSet<ArcStr>,
    ) -> Self {
        Self {
            declaring_type,
            is_directive,
            dependencies,
        }
    }

    /// Type whose members are currently being registered.
    pub fn declaring_type(&self) -> Option<TypeHandle> {
        self.declaring_type
    }

    /// Whether the nodes being registered belong to a directive.
    pub fn is_directive(&self) -> bool {
        self.is_directive
    }

    /// Announces the named type inside a type literal.
    pub fn register_type(&mut self, ty: &Type) {
        self.register_name(ty.innermost_name());
    }

    /// Announces a type by its name.
    pub fn register_name(&mut self, name: &ArcStr) {
        self.dependencies.insert(name.clone());
    }
}

/// Context of the completion phase.
pub struct CompleteContext<'c> {
    declaring_type: Option<TypeHandle>,
    is_directive: bool,
    names: &'c FnvHashMap<ArcStr, TypeHandle>,
    kinds: &'c [TypeKind],
}

impl<'c> CompleteContext<'c> {
    pub(crate) fn new(
        declaring_type: Option<TypeHandle>,
        is_directive: bool,
        names: &'c FnvHashMap<ArcStr, TypeHandle>,
        kinds: &'c [TypeKind],
    ) -> Self {
        Self {
            declaring_type,
            is_directive,
            names,
            kinds,
        }
    }

    /// Type whose members are currently being completed.
    pub fn declaring_type(&self) -> Option<TypeHandle> {
        self.declaring_type
    }

    /// Whether the nodes being completed belong to a directive.
    pub fn is_directive(&self) -> bool {
        self.is_directive
    }

    /// Resolves a type name announced by `node` into its arena handle.
    pub fn resolve_named(&self, name: &ArcStr, node: &ArcStr) -> Result<TypeHandle, BindingError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| BindingError::UnknownType {
                name: name.clone(),
                node: node.clone(),
            })
    }

    /// Resolves a type literal announced by `node`.
    pub fn resolve_type(&self, ty: &Type, node: &ArcStr) -> Result<ResolvedType, BindingError> {
        Ok(match ty {
            Type::Named(n) => ResolvedType::Named(self.resolve_named(n, node)?),
            Type::NonNullNamed(n) => {
                ResolvedType::non_null(ResolvedType::Named(self.resolve_named(n, node)?))
            }
            Type::List(of) => ResolvedType::list(self.resolve_type(of, node)?),
            Type::NonNullList(of) => {
                ResolvedType::non_null(ResolvedType::list(self.resolve_type(of, node)?))
            }
        })
    }

    /// Resolves a type name and checks its kind.
    pub fn resolve_kind(
        &self,
        name: &ArcStr,
        node: &ArcStr,
        expected: TypeKind,
    ) -> Result<TypeHandle, BindingError> {
        let handle = self.resolve_named(name, node)?;
        if self.kinds[handle.index()] != expected {
            return Err(BindingError::UnexpectedKind {
                name: name.clone(),
                expected,
            });
        }
        Ok(handle)
    }
}

/// A node taking part in the two-phase binding protocol.
pub trait TypeSystemNode {
    /// Announces every type this node refers to.
    fn register_dependencies(&mut self, ctx: &mut RegisterContext<'_>) -> Result<(), BindingError>;

    /// Binds the resolved types announced during registration.
    fn complete_type(&mut self, ctx: &CompleteContext<'_>) -> Result<(), BindingError>;
}

/// Coordinator running both binding phases over a set of types and
/// directives.
pub(crate) struct TypeInitializer {
    types: Vec<MetaType>,
    names: FnvHashMap<ArcStr, TypeHandle>,
    directives: Vec<DirectiveType>,
    dependencies: IndexSet<ArcStr>,
}

impl TypeInitializer {
    /// Places the types into an arena, rejecting duplicate names.
    pub(crate) fn new(
        types: Vec<MetaType>,
        directives: Vec<DirectiveType>,
    ) -> Result<Self, ArcStr> {
        let mut names = FnvHashMap::default();
        for (idx, ty) in types.iter().enumerate() {
            if names.insert(ty.name().clone(), TypeHandle::new(idx)).is_some() {
                return Err(ty.name().clone());
            }
        }
        Ok(Self {
            types,
            names,
            directives,
            dependencies: IndexSet::new(),
        })
    }

    pub(crate) fn handle_by_name(&self, name: &str) -> Option<TypeHandle> {
        self.names.get(name).copied()
    }

    pub(crate) fn register_dependencies(&mut self) -> Result<(), BindingError> {
        __span_trace!("register_dependencies");

        for (idx, ty) in self.types.iter_mut().enumerate() {
            let mut ctx =
                RegisterContext::new(Some(TypeHandle::new(idx)), false, &mut self.dependencies);
            ty.register_dependencies(&mut ctx)?;
        }
        for directive in &mut self.directives {
            let mut ctx = RegisterContext::new(None, true, &mut self.dependencies);
            directive.register_dependencies(&mut ctx)?;
        }

        __trace!("registered {} type dependencies", self.dependencies.len());
        Ok(())
    }

    pub(crate) fn complete_types(&mut self) -> Result<(), BindingError> {
        __span_trace!("complete_types");

        let kinds = self.types.iter().map(MetaType::type_kind).collect::<Vec<_>>();
        for (idx, ty) in self.types.iter_mut().enumerate() {
            let ctx = CompleteContext::new(Some(TypeHandle::new(idx)), false, &self.names, &kinds);
            ty.complete_type(&ctx)?;
        }
        for directive in &mut self.directives {
            let ctx = CompleteContext::new(None, true, &self.names, &kinds);
            directive.complete_type(&ctx)?;
        }
        Ok(())
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        Vec<MetaType>,
        FnvHashMap<ArcStr, TypeHandle>,
        Vec<DirectiveType>,
    ) {
        (self.types, self.names, self.directives)
    }
}
