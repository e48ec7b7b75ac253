use std::sync::Arc;

use arcstr::ArcStr;
use fnv::FnvHashSet;
use indexmap::IndexMap;

use crate::{
    ast::{self, Directive, Selection},
    executor::{ErrorSink, ExecutionError, FieldError, FragmentCollection, Path, Variables},
    parser::{SourcePosition, Spanning},
    schema::{Field, MetaType, Schema, TypeHandle},
    types::{BooleanType, ScalarType as _},
};

/// A single field to execute, merged from every same-key occurrence in the
/// selection set.
#[derive(Clone, Debug)]
pub struct FieldSelection {
    response_name: ArcStr,
    object_type: TypeHandle,
    field_index: usize,
    nodes: Vec<Arc<Spanning<ast::Field>>>,
}

impl FieldSelection {
    /// The response key: the alias if given, the field name otherwise.
    pub fn response_name(&self) -> &ArcStr {
        &self.response_name
    }

    /// The object type the field is selected on.
    pub fn object_type(&self) -> TypeHandle {
        self.object_type
    }

    /// The schema definition of the field.
    pub fn field<'s>(&self, schema: &'s Schema) -> &'s Field {
        let fields = schema
            .meta_type(self.object_type)
            .fields()
            .unwrap_or_else(|| unreachable!("field selections are collected on object types"));
        &fields[self.field_index]
    }

    /// The first occurrence of the field in the document.
    pub fn node(&self) -> &Arc<Spanning<ast::Field>> {
        &self.nodes[0]
    }

    /// Every merged occurrence of the field, in document order.
    pub fn nodes(&self) -> &[Arc<Spanning<ast::Field>>] {
        &self.nodes
    }

    /// Source location of the first occurrence.
    pub fn location(&self) -> SourcePosition {
        self.node().start
    }

    /// Arguments of the first occurrence.
    pub fn arguments(&self) -> &ast::Arguments {
        &self.node().item.arguments
    }

    /// Sub-selection sets of every merged occurrence.
    pub fn selection_sets(&self) -> impl Iterator<Item = &[Selection]> {
        self.nodes
            .iter()
            .filter_map(|n| n.item.selection_set.as_deref())
    }
}

/// Turns selection sets into the ordered, deduplicated list of fields to
/// execute on an object type.
///
/// Fragments spreads and inline fragments are expanded in place when their
/// type condition applies, `@skip` and `@include` are evaluated against the
/// operation's variables, and same-key occurrences are merged.
#[derive(Clone, Debug)]
pub struct FieldCollector {
    schema: Arc<Schema>,
    variables: Arc<Variables>,
    fragments: Arc<FragmentCollection>,
}

struct Collection<'a> {
    object_type: TypeHandle,
    path: &'a Path,
    errors: &'a ErrorSink,
    fields: IndexMap<ArcStr, FieldSelection>,
    visited_fragments: FnvHashSet<ArcStr>,
}

impl FieldCollector {
    /// Creates a collector bound to a schema, variables and fragments.
    pub fn new(
        schema: Arc<Schema>,
        variables: Arc<Variables>,
        fragments: Arc<FragmentCollection>,
    ) -> Self {
        Self {
            schema,
            variables,
            fragments,
        }
    }

    /// Collects the fields of one selection set.
    ///
    /// Problems with the selection (unknown fields, malformed `if` arguments)
    /// are reported into `errors` with the given parent `path`, and the
    /// offending selection is dropped.
    ///
    /// # Panics
    ///
    /// If `object_type` is not an object type, or a spread fragment is not
    /// defined in the document.
    pub fn collect_fields(
        &self,
        object_type: TypeHandle,
        selection_set: &[Selection],
        path: &Path,
        errors: &ErrorSink,
    ) -> Vec<FieldSelection> {
        self.collect([selection_set], object_type, path, errors)
    }

    /// Collects the sub-fields of every occurrence merged into `field` as
    /// one selection.
    pub fn collect_merged_fields(
        &self,
        object_type: TypeHandle,
        field: &FieldSelection,
        path: &Path,
        errors: &ErrorSink,
    ) -> Vec<FieldSelection> {
        self.collect(field.selection_sets(), object_type, path, errors)
    }

    fn collect<'s>(
        &self,
        selection_sets: impl IntoIterator<Item = &'s [Selection]>,
        object_type: TypeHandle,
        path: &Path,
        errors: &ErrorSink,
    ) -> Vec<FieldSelection> {
        let meta = self.schema.meta_type(object_type);
        assert!(
            matches!(meta, MetaType::Object(_)),
            "Fields can only be collected on object types, `{}` is not one",
            meta.name(),
        );

        let mut collection = Collection {
            object_type,
            path,
            errors,
            fields: IndexMap::new(),
            visited_fragments: FnvHashSet::default(),
        };
        for set in selection_sets {
            self.collect_into(set, &mut collection);
        }
        collection.fields.into_values().collect()
    }

    fn collect_into(&self, selection_set: &[Selection], collection: &mut Collection<'_>) {
        let meta = self.schema.meta_type(collection.object_type);

        for selection in selection_set {
            match selection {
                Selection::Field(field) => {
                    if self.is_excluded(&field.item.directives, collection) {
                        continue;
                    }

                    let Some(field_index) = meta.field_index(&field.item.name) else {
                        __trace_debug!(
                            "unknown field `{}` on `{}`",
                            field.item.name,
                            meta.name(),
                        );
                        collection.errors.push(ExecutionError::new(
                            field.start,
                            collection.path,
                            FieldError::from(format!(
                                "Unknown field \"{}\" on type \"{}\"",
                                field.item.name,
                                meta.name(),
                            )),
                        ));
                        continue;
                    };

                    let response_name = field.item.response_name();
                    match collection.fields.get_mut(response_name) {
                        Some(existing) => existing.nodes.push(Arc::clone(field)),
                        None => {
                            collection.fields.insert(
                                response_name.clone(),
                                FieldSelection {
                                    response_name: response_name.clone(),
                                    object_type: collection.object_type,
                                    field_index,
                                    nodes: vec![Arc::clone(field)],
                                },
                            );
                        }
                    }
                }
                Selection::FragmentSpread(Spanning { item: spread, .. }) => {
                    if self.is_excluded(&spread.directives, collection)
                        || !collection.visited_fragments.insert(spread.name.clone())
                    {
                        continue;
                    }

                    let fragment = self.fragments.get(&spread.name).unwrap_or_else(|| {
                        panic!("Fragment `{}` is not defined in the document", spread.name)
                    });
                    if self.does_type_condition_apply(&fragment.item.type_condition, collection) {
                        self.collect_into(&fragment.item.selection_set, collection);
                    }
                }
                Selection::InlineFragment(Spanning { item: fragment, .. }) => {
                    if self.is_excluded(&fragment.directives, collection) {
                        continue;
                    }

                    let applies = fragment
                        .type_condition
                        .as_ref()
                        .is_none_or(|cond| self.does_type_condition_apply(cond, collection));
                    if applies {
                        self.collect_into(&fragment.selection_set, collection);
                    }
                }
            }
        }
    }

    fn does_type_condition_apply(&self, condition: &str, collection: &Collection<'_>) -> bool {
        let Some(condition_type) = self.schema.handle_by_name(condition) else {
            return false;
        };
        condition_type == collection.object_type
            || (self.schema.meta_type(condition_type).is_abstract()
                && self
                    .schema
                    .is_possible_type(condition_type, collection.object_type))
    }

    fn is_excluded(&self, directives: &[Spanning<Directive>], collection: &Collection<'_>) -> bool {
        for directive in directives {
            let name = directive.item.name.as_str();
            if name != "skip" && name != "include" {
                continue;
            }

            let condition = directive
                .item
                .arguments
                .get("if")
                .map(|v| v.clone().into_const(&self.variables));
            let condition = match condition.as_ref().map(BooleanType::parse_literal) {
                Some(Ok(Some(b))) => b.as_bool(),
                _ => None,
            };

            match (name, condition) {
                ("skip", Some(true)) | ("include", Some(false)) => return true,
                (_, Some(_)) => {}
                (_, None) => {
                    collection.errors.push(ExecutionError::new(
                        directive.start,
                        collection.path,
                        FieldError::from(format!(
                            "Argument \"if\" of directive \"@{name}\" must be a non-null Boolean",
                        )),
                    ));
                    return true;
                }
            }
        }
        false
    }
}
