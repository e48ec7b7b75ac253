use std::sync::Arc;

use arcstr::ArcStr;
use derive_more::with_trait::{Display, Error};
use graphql_parser::{Pos, query as gql};

use crate::{
    ast::{
        Arguments, Definition, Directive, Document, Field, Fragment, FragmentSpread,
        InlineFragment, InputValue, Operation, OperationType, Selection, Type,
        VariableDefinition,
    },
    parser::{SourcePosition, Spanning},
};

/// Error raised while turning query source text into a [`Document`].
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
pub enum ParseError {
    /// The source text is not a syntactically valid GraphQL document.
    #[display("{message}")]
    Syntax {
        /// Description reported by the underlying parser.
        message: String,
    },

    /// An integer literal does not fit a 32-bit signed integer.
    #[display("Integer literal at {position} is out of range")]
    IntOutOfRange {
        /// Position of the offending literal.
        position: SourcePosition,
    },
}

/// Parses a query document from its source text.
///
/// Syntax is handled by the `graphql-parser` crate; this only translates its
/// borrowed tree into the owned, reference-counted AST the executor shares
/// between tasks.
pub fn parse_document_source(source: &str) -> Result<Document, ParseError> {
    let doc = gql::parse_query::<String>(source).map_err(|e| ParseError::Syntax {
        message: e.to_string(),
    })?;

    let definitions = doc
        .definitions
        .into_iter()
        .map(|def| {
            Ok(match def {
                gql::Definition::Operation(op) => {
                    Definition::Operation(Arc::new(translate_operation(op)?))
                }
                gql::Definition::Fragment(frag) => {
                    Definition::Fragment(Arc::new(translate_fragment(frag)?))
                }
            })
        })
        .collect::<Result<_, ParseError>>()?;

    Ok(Document { definitions })
}

fn position(pos: Pos) -> SourcePosition {
    SourcePosition::new(pos.line.max(1), pos.column.max(1))
}

fn translate_operation(
    op: gql::OperationDefinition<'_, String>,
) -> Result<Spanning<Operation>, ParseError> {
    let (operation_type, pos, name, vars, directives, selection_set) = match op {
        gql::OperationDefinition::SelectionSet(set) => {
            let pos = set.span.0;
            (OperationType::Query, pos, None, vec![], vec![], set)
        }
        gql::OperationDefinition::Query(q) => (
            OperationType::Query,
            q.position,
            q.name,
            q.variable_definitions,
            q.directives,
            q.selection_set,
        ),
        gql::OperationDefinition::Mutation(m) => (
            OperationType::Mutation,
            m.position,
            m.name,
            m.variable_definitions,
            m.directives,
            m.selection_set,
        ),
        gql::OperationDefinition::Subscription(s) => (
            OperationType::Subscription,
            s.position,
            s.name,
            s.variable_definitions,
            s.directives,
            s.selection_set,
        ),
    };

    Ok(Spanning::new(
        position(pos),
        Operation {
            operation_type,
            name: name.map(ArcStr::from),
            variable_definitions: vars
                .into_iter()
                .map(translate_variable_definition)
                .collect::<Result<_, _>>()?,
            directives: translate_directives(directives)?,
            selection_set: translate_selection_set(selection_set)?,
        },
    ))
}

fn translate_fragment(
    frag: gql::FragmentDefinition<'_, String>,
) -> Result<Spanning<Fragment>, ParseError> {
    let gql::TypeCondition::On(type_condition) = frag.type_condition;
    Ok(Spanning::new(
        position(frag.position),
        Fragment {
            name: frag.name.into(),
            type_condition: type_condition.into(),
            directives: translate_directives(frag.directives)?,
            selection_set: translate_selection_set(frag.selection_set)?,
        },
    ))
}

fn translate_variable_definition(
    def: gql::VariableDefinition<'_, String>,
) -> Result<Spanning<VariableDefinition>, ParseError> {
    let pos = position(def.position);
    Ok(Spanning::new(
        pos,
        VariableDefinition {
            name: def.name.into(),
            var_type: translate_type(def.var_type),
            default_value: def
                .default_value
                .map(|v| translate_value(v, pos))
                .transpose()?,
        },
    ))
}

fn translate_type(ty: gql::Type<'_, String>) -> Type {
    match ty {
        gql::Type::NamedType(n) => Type::named(n),
        gql::Type::ListType(inner) => Type::list(translate_type(*inner)),
        gql::Type::NonNullType(inner) => match translate_type(*inner) {
            Type::Named(n) | Type::NonNullNamed(n) => Type::NonNullNamed(n),
            Type::List(of) | Type::NonNullList(of) => Type::NonNullList(of),
        },
    }
}

fn translate_selection_set(
    set: gql::SelectionSet<'_, String>,
) -> Result<Vec<Selection>, ParseError> {
    set.items.into_iter().map(translate_selection).collect()
}

fn translate_selection(sel: gql::Selection<'_, String>) -> Result<Selection, ParseError> {
    Ok(match sel {
        gql::Selection::Field(f) => {
            let pos = position(f.position);
            let selection_set =
                (!f.selection_set.items.is_empty()).then_some(f.selection_set);
            Selection::Field(Arc::new(Spanning::new(
                pos,
                Field {
                    alias: f.alias.map(ArcStr::from),
                    name: f.name.into(),
                    arguments: translate_arguments(f.arguments, pos)?,
                    directives: translate_directives(f.directives)?,
                    selection_set: selection_set.map(translate_selection_set).transpose()?,
                },
            )))
        }
        gql::Selection::FragmentSpread(s) => Selection::FragmentSpread(Spanning::new(
            position(s.position),
            FragmentSpread {
                name: s.fragment_name.into(),
                directives: translate_directives(s.directives)?,
            },
        )),
        gql::Selection::InlineFragment(i) => Selection::InlineFragment(Spanning::new(
            position(i.position),
            InlineFragment {
                type_condition: i.type_condition.map(|gql::TypeCondition::On(n)| n.into()),
                directives: translate_directives(i.directives)?,
                selection_set: translate_selection_set(i.selection_set)?,
            },
        )),
    })
}

fn translate_directives(
    directives: Vec<gql::Directive<'_, String>>,
) -> Result<Vec<Spanning<Directive>>, ParseError> {
    directives
        .into_iter()
        .map(|d| {
            let pos = position(d.position);
            Ok(Spanning::new(
                pos,
                Directive {
                    name: d.name.into(),
                    arguments: translate_arguments(d.arguments, pos)?,
                },
            ))
        })
        .collect()
}

fn translate_arguments(
    args: Vec<(String, gql::Value<'_, String>)>,
    pos: SourcePosition,
) -> Result<Arguments, ParseError> {
    let items = args
        .into_iter()
        .map(|(k, v)| Ok((ArcStr::from(k), translate_value(v, pos)?)))
        .collect::<Result<_, ParseError>>()?;
    Ok(Arguments { items })
}

fn translate_value(
    value: gql::Value<'_, String>,
    pos: SourcePosition,
) -> Result<InputValue, ParseError> {
    Ok(match value {
        gql::Value::Variable(name) => InputValue::variable(name),
        gql::Value::Int(n) => {
            let int = n
                .as_i64()
                .and_then(|i| i32::try_from(i).ok())
                .ok_or(ParseError::IntOutOfRange { position: pos })?;
            InputValue::scalar(int)
        }
        gql::Value::Float(f) => InputValue::scalar(f),
        gql::Value::String(s) => InputValue::scalar(s),
        gql::Value::Boolean(b) => InputValue::scalar(b),
        gql::Value::Null => InputValue::null(),
        gql::Value::Enum(e) => InputValue::enum_value(e),
        gql::Value::List(items) => InputValue::list(
            items
                .into_iter()
                .map(|v| translate_value(v, pos))
                .collect::<Result<_, _>>()?,
        ),
        gql::Value::Object(fields) => InputValue::object(
            fields
                .into_iter()
                .map(|(k, v)| Ok((k, translate_value(v, pos)?)))
                .collect::<Result<Vec<_>, ParseError>>()?,
        ),
    })
}
