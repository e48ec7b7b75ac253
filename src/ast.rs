//! Owned syntax tree of query documents

use std::{fmt, sync::Arc};

use arcstr::ArcStr;
use indexmap::IndexMap;

use crate::{executor::Variables, parser::Spanning, value::ScalarValue};

/// A type literal in the syntax tree
///
/// This enum carries no semantic information and might refer to types that do
/// not exist. It is also the form in which schema fields declare their types
/// before the binder resolves them.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Type {
    /// A nullable named type, e.g. `String`
    Named(ArcStr),
    /// A nullable list type, e.g. `[String]`
    ///
    /// The list itself is what's nullable, the containing type might be non-null.
    List(Box<Type>),
    /// A non-null named type, e.g. `String!`
    NonNullNamed(ArcStr),
    /// A non-null list type, e.g. `[String]!`.
    ///
    /// The list itself is what's non-null, the containing type might be null.
    NonNullList(Box<Type>),
}

impl Type {
    /// Shorthand for [`Type::Named`].
    pub fn named(name: impl Into<ArcStr>) -> Self {
        Self::Named(name.into())
    }

    /// Shorthand for [`Type::NonNullNamed`].
    pub fn non_null_named(name: impl Into<ArcStr>) -> Self {
        Self::NonNullNamed(name.into())
    }

    /// Shorthand for [`Type::List`].
    pub fn list(of: Type) -> Self {
        Self::List(Box::new(of))
    }

    /// Shorthand for [`Type::NonNullList`].
    pub fn non_null_list(of: Type) -> Self {
        Self::NonNullList(Box::new(of))
    }

    /// Get the name of a named type.
    ///
    /// Only applies to named types; lists will return `None`.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(n) | Self::NonNullNamed(n) => Some(n),
            Self::List(..) | Self::NonNullList(..) => None,
        }
    }

    /// Get the innermost name by unpacking lists
    ///
    /// All type literals contain exactly one named type.
    pub fn innermost_name(&self) -> &ArcStr {
        match self {
            Self::Named(n) | Self::NonNullNamed(n) => n,
            Self::List(l) | Self::NonNullList(l) => l.innermost_name(),
        }
    }

    /// Determines if a type only can represent non-null values.
    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNullNamed(..) | Self::NonNullList(..))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(n) => write!(f, "{n}"),
            Self::NonNullNamed(n) => write!(f, "{n}!"),
            Self::List(t) => write!(f, "[{t}]"),
            Self::NonNullList(t) => write!(f, "[{t}]!"),
        }
    }
}

/// A JSON-like value that can be passed into the query execution, either
/// out-of-band, or in-band as default variable values. These are _not_ constant
/// and might contain variables.
#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum InputValue {
    Null,
    Scalar(ScalarValue),
    Enum(String),
    Variable(String),
    List(Vec<InputValue>),
    Object(IndexMap<String, InputValue>),
}

impl InputValue {
    /// Construct a `null` value.
    pub fn null() -> Self {
        Self::Null
    }

    /// Construct a scalar value.
    pub fn scalar(v: impl Into<ScalarValue>) -> Self {
        Self::Scalar(v.into())
    }

    /// Construct an enum value.
    pub fn enum_value(s: impl AsRef<str>) -> Self {
        Self::Enum(s.as_ref().into())
    }

    /// Construct a variable value.
    pub fn variable(v: impl AsRef<str>) -> Self {
        Self::Variable(v.as_ref().into())
    }

    /// Construct a list value.
    pub fn list(l: Vec<Self>) -> Self {
        Self::List(l)
    }

    /// Construct an object value.
    pub fn object<K: Into<String>>(o: impl IntoIterator<Item = (K, Self)>) -> Self {
        Self::Object(o.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Resolves all variables of this [`InputValue`] to their actual values.
    ///
    /// Variables missing from `vars` resolve to `null`.
    #[must_use]
    pub fn into_const(self, vars: &Variables) -> Self {
        match self {
            Self::Variable(name) => vars.get(&name).cloned().unwrap_or(Self::Null),
            Self::List(l) => Self::List(l.into_iter().map(|v| v.into_const(vars)).collect()),
            Self::Object(o) => Self::Object(
                o.into_iter()
                    .map(|(k, v)| (k, v.into_const(vars)))
                    .collect(),
            ),
            v => v,
        }
    }

    /// Does the value represent a `null`?
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Does the value represent a variable?
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(..))
    }

    /// View the underlying enum value, if present.
    pub fn as_enum_value(&self) -> Option<&str> {
        match self {
            Self::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// View the underlying boolean value, if present.
    pub fn as_bool_value(&self) -> Option<bool> {
        match self {
            Self::Scalar(ScalarValue::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    /// View the underlying int value, if present.
    pub fn as_int_value(&self) -> Option<i32> {
        match self {
            Self::Scalar(ScalarValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// View the underlying float value, if present.
    ///
    /// Int literals are widened.
    pub fn as_float_value(&self) -> Option<f64> {
        match self {
            Self::Scalar(ScalarValue::Float(f)) => Some(*f),
            Self::Scalar(ScalarValue::Int(i)) => Some(f64::from(*i)),
            _ => None,
        }
    }

    /// View the underlying string value, if present.
    pub fn as_string_value(&self) -> Option<&str> {
        match self {
            Self::Scalar(ScalarValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// View the underlying list, if present.
    pub fn as_list_value(&self) -> Option<&[InputValue]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// View the underlying object, if present.
    pub fn as_object_value(&self) -> Option<&IndexMap<String, InputValue>> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Scalar(s) => match s {
                ScalarValue::String(s) => write!(f, "\"{s}\""),
                s => write!(f, "{s}"),
            },
            Self::Enum(v) => write!(f, "{v}"),
            Self::Variable(v) => write!(f, "${v}"),
            Self::List(v) => {
                write!(f, "[")?;
                for (i, item) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Object(o) => {
                write!(f, "{{")?;
                for (i, (k, v)) in o.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<ScalarValue> for InputValue {
    fn from(v: ScalarValue) -> Self {
        Self::Scalar(v)
    }
}

impl From<&str> for InputValue {
    fn from(s: &str) -> Self {
        Self::scalar(s)
    }
}

impl From<String> for InputValue {
    fn from(s: String) -> Self {
        Self::scalar(s)
    }
}

impl From<i32> for InputValue {
    fn from(i: i32) -> Self {
        Self::scalar(i)
    }
}

impl From<f64> for InputValue {
    fn from(f: f64) -> Self {
        Self::scalar(f)
    }
}

impl From<bool> for InputValue {
    fn from(b: bool) -> Self {
        Self::scalar(b)
    }
}

/// Named arguments of a field or directive, in document order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arguments {
    #[expect(missing_docs, reason = "self-explanatory")]
    pub items: Vec<(ArcStr, InputValue)>,
}

impl Arguments {
    /// Looks up an argument value by its name.
    pub fn get(&self, name: &str) -> Option<&InputValue> {
        self.items
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v)
    }

    /// Iterates over the argument names and values.
    pub fn iter(&self) -> impl Iterator<Item = (&ArcStr, &InputValue)> {
        self.items.iter().map(|(k, v)| (k, v))
    }

    /// Whether there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct VariableDefinition {
    pub name: ArcStr,
    pub var_type: Type,
    pub default_value: Option<InputValue>,
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct Directive {
    pub name: ArcStr,
    pub arguments: Arguments,
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct Field {
    pub alias: Option<ArcStr>,
    pub name: ArcStr,
    pub arguments: Arguments,
    pub directives: Vec<Spanning<Directive>>,
    pub selection_set: Option<Vec<Selection>>,
}

impl Field {
    /// Output key of this field: its alias if given, its name otherwise.
    pub fn response_name(&self) -> &ArcStr {
        self.alias.as_ref().unwrap_or(&self.name)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct FragmentSpread {
    pub name: ArcStr,
    pub directives: Vec<Spanning<Directive>>,
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct InlineFragment {
    pub type_condition: Option<ArcStr>,
    pub directives: Vec<Spanning<Directive>>,
    pub selection_set: Vec<Selection>,
}

/// Entry in a GraphQL selection set
///
/// This enum represents one of the three variants of a selection that exists
/// in GraphQL: a field, a fragment spread, or an inline fragment. Each of the
/// variants references their location in the query source.
///
/// Field nodes are reference counted: the executor keeps them alive inside
/// collected field selections long after the walk over the document ended.
///
/// ```text
/// {
///   field(withArg: 123) { subField }
///   ...fragmentSpread
///   ...on User {
///     inlineFragmentField
///   }
/// }
/// ```
#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum Selection {
    Field(Arc<Spanning<Field>>),
    FragmentSpread(Spanning<FragmentSpread>),
    InlineFragment(Spanning<InlineFragment>),
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct Operation {
    pub operation_type: OperationType,
    pub name: Option<ArcStr>,
    pub variable_definitions: Vec<Spanning<VariableDefinition>>,
    pub directives: Vec<Spanning<Directive>>,
    pub selection_set: Vec<Selection>,
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct Fragment {
    pub name: ArcStr,
    pub type_condition: ArcStr,
    pub directives: Vec<Spanning<Directive>>,
    pub selection_set: Vec<Selection>,
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum Definition {
    Operation(Arc<Spanning<Operation>>),
    Fragment(Arc<Spanning<Fragment>>),
}

/// A parsed and validated query document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    /// Operation and fragment definitions, in document order.
    pub definitions: Vec<Definition>,
}

impl Document {
    /// Iterates over the operation definitions of this document.
    pub fn operations(&self) -> impl Iterator<Item = &Arc<Spanning<Operation>>> {
        self.definitions.iter().filter_map(|d| match d {
            Definition::Operation(op) => Some(op),
            Definition::Fragment(_) => None,
        })
    }

    /// Iterates over the fragment definitions of this document.
    pub fn fragments(&self) -> impl Iterator<Item = &Arc<Spanning<Fragment>>> {
        self.definitions.iter().filter_map(|d| match d {
            Definition::Fragment(f) => Some(f),
            Definition::Operation(_) => None,
        })
    }
}
