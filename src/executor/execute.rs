use std::sync::Arc;

use futures::future::{self, BoxFuture, Either, FutureExt as _};
use itertools::Itertools as _;

use crate::{
    GraphQLError,
    ast::OperationType,
    executor::{
        ExecutionContext, ExecutionError, FieldError, FieldSelection, OrderedResult, Path,
        Resolved, ResolverTask, SourceValue,
    },
    schema::{MetaType, ResolvedType, TYPENAME_FIELD, TypeHandle},
    util::ImmutableStack,
    value::{Object, Value},
};

/// Result of executing an operation: the data tree and the field errors
/// reported while building it.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionOutput {
    /// The ordered result tree of the root selection set.
    pub data: Value,
    /// Field errors, sorted by location and path.
    pub errors: Vec<ExecutionError>,
}

impl ExecutionOutput {
    /// Whether no field error was reported.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Executes the operation of `context`.
///
/// Sibling fields run concurrently, except for the root fields of a
/// mutation, which run one after another. Field failures end up in
/// [`ExecutionOutput::errors`] with a `null` in place of the value.
///
/// # Errors
///
/// [`GraphQLError::IsSubscription`] for subscription operations and
/// [`GraphQLError::Cancelled`] once the request's cancellation signal fired.
pub async fn execute(context: &Arc<ExecutionContext>) -> Result<ExecutionOutput, GraphQLError> {
    let operation_type = context.operation_type();
    if operation_type == OperationType::Subscription {
        return Err(GraphQLError::IsSubscription);
    }
    if context.cancellation().is_cancelled() {
        return Err(GraphQLError::Cancelled);
    }

    let sources = match context.root_value() {
        Some(root) => ImmutableStack::new().push(root),
        None => ImmutableStack::new(),
    };
    let path = Path::root();
    let fields = context.collect_fields(
        context.root_type(),
        &context.operation().item.selection_set,
        &path,
    );

    let serial = operation_type == OperationType::Mutation;
    let data = resolve_fields(context, fields, sources, path, serial).await;

    if context.cancellation().is_cancelled() {
        __trace_warn!("{operation_type} cancelled, discarding partial result");
        return Err(GraphQLError::Cancelled);
    }

    let mut errors = context.errors();
    errors.sort();

    Ok(ExecutionOutput {
        data: Value::object(data),
        errors,
    })
}

fn resolve_fields<'a>(
    context: &'a Arc<ExecutionContext>,
    fields: Vec<FieldSelection>,
    sources: ImmutableStack<SourceValue>,
    path: Path,
    serial: bool,
) -> BoxFuture<'a, Object> {
    async move {
        let result = Arc::new(OrderedResult::with_keys(
            fields.iter().map(FieldSelection::response_name),
        ));
        let tasks = fields.into_iter().map(|field| {
            ResolverTask::new(
                context.schema(),
                sources.clone(),
                field,
                &path,
                Arc::clone(&result),
            )
        });

        if serial {
            for task in tasks {
                run_task(context, task).await;
            }
        } else {
            future::join_all(tasks.map(|task| run_task(context, task))).await;
        }

        result.take_object()
    }
    .boxed()
}

async fn run_task(context: &Arc<ExecutionContext>, task: ResolverTask) {
    let schema = context.schema();
    let field = task.field(schema);

    if field.name.as_str() == TYPENAME_FIELD {
        let type_name = schema.meta_type(task.object_type()).name();
        task.integrate_result(Value::scalar(type_name.as_str()));
        return;
    }

    let Some(resolver) = field.field_resolver() else {
        context.report_error(task.create_error(format!(
            "No resolver for field \"{}.{}\"",
            schema.meta_type(task.object_type()).name(),
            field.name,
        )));
        task.integrate_result(Value::null());
        return;
    };

    let resolver_context = match task.resolver_context(context) {
        Ok(ctx) => ctx,
        Err(e) => {
            context.report_error(task.field_error(e));
            task.integrate_result(Value::null());
            return;
        }
    };

    let resolved = match future::select(
        resolver.resolve(resolver_context),
        context.cancellation().cancelled(),
    )
    .await
    {
        Either::Left((resolved, _)) => resolved,
        Either::Right(((), _)) => {
            __trace_warn!("resolver of `{}` cancelled", task.path());
            return;
        }
    };

    let value = match resolved {
        Ok(resolved) => {
            complete_value(context, &task, task.field_type(), task.path().clone(), resolved).await
        }
        Err(e) => {
            context.report_error(task.field_error(e));
            Value::null()
        }
    };
    task.integrate_result(value);
}

fn complete_value<'a>(
    context: &'a Arc<ExecutionContext>,
    task: &'a ResolverTask,
    ty: &'a ResolvedType,
    path: Path,
    resolved: Resolved,
) -> BoxFuture<'a, Value> {
    async move {
        match (ty, resolved) {
            (ResolvedType::NonNull(_), resolved) if resolved.is_null() => {
                let schema = context.schema();
                report(
                    context,
                    task,
                    &path,
                    format!(
                        "Cannot return null for non-nullable field {}.{}",
                        schema.meta_type(task.object_type()).name(),
                        task.field(schema).name,
                    ),
                )
            }
            (ResolvedType::NonNull(inner), resolved) => {
                complete_value(context, task, inner, path, resolved).await
            }
            (_, Resolved::Null) => Value::null(),
            (ResolvedType::List(inner), Resolved::List(items)) => {
                let items = items
                    .into_iter()
                    .enumerate()
                    .map(|(idx, item)| complete_value(context, task, inner, path.index(idx), item));
                Value::list(future::join_all(items).await)
            }
            (ResolvedType::List(_), other) => report(
                context,
                task,
                &path,
                format!("Expected a list, found {other:?}"),
            ),
            (ResolvedType::Named(handle), resolved) => {
                complete_named(context, task, *handle, path, resolved).await
            }
        }
    }
    .boxed()
}

async fn complete_named(
    context: &Arc<ExecutionContext>,
    task: &ResolverTask,
    handle: TypeHandle,
    path: Path,
    resolved: Resolved,
) -> Value {
    let schema = context.schema();
    let meta = schema.meta_type(handle);

    match (meta, resolved) {
        (MetaType::Scalar(scalar), Resolved::Value(v)) => match scalar.serialize(&v) {
            Ok(v) => v,
            Err(e) => report(context, task, &path, e.message()),
        },
        (MetaType::Enum(enum_meta), Resolved::Value(v)) => match v.as_string_value() {
            Some(name) if enum_meta.has_value(name) => v,
            _ => report(
                context,
                task,
                &path,
                format!("Enum \"{}\" cannot represent value: {v}", meta.name()),
            ),
        },
        (MetaType::Object(_), Resolved::Object { source, .. }) => {
            complete_object(context, task, handle, path, source).await
        }
        (MetaType::Interface(_) | MetaType::Union(_), Resolved::Object { type_name, source }) => {
            let Some(type_name) = type_name else {
                return report(
                    context,
                    task,
                    &path,
                    format!(
                        "Abstract type \"{}\" requires the resolved value to name its \
                         runtime object type",
                        meta.name(),
                    ),
                );
            };
            let runtime_type = schema
                .handle_by_name(&type_name)
                .filter(|&h| schema.is_possible_type(handle, h));
            match runtime_type {
                Some(runtime_type) => {
                    complete_object(context, task, runtime_type, path, source).await
                }
                None => report(
                    context,
                    task,
                    &path,
                    format!(
                        "Runtime object type \"{type_name}\" is not a possible type for \
                         \"{}\", expected one of: {}",
                        meta.name(),
                        schema
                            .possible_types(handle)
                            .into_iter()
                            .map(|h| schema.meta_type(h).name())
                            .join(", "),
                    ),
                ),
            }
        }
        (meta, other) => report(
            context,
            task,
            &path,
            format!("Expected a value of type \"{}\", found {other:?}", meta.name()),
        ),
    }
}

async fn complete_object(
    context: &Arc<ExecutionContext>,
    task: &ResolverTask,
    object_type: TypeHandle,
    path: Path,
    source: SourceValue,
) -> Value {
    let fields = context.collect_merged_fields(object_type, task.field_selection(), &path);
    let sources = task.sources().push(source);
    Value::object(resolve_fields(context, fields, sources, path, false).await)
}

fn report(
    context: &ExecutionContext,
    task: &ResolverTask,
    path: &Path,
    message: impl Into<String>,
) -> Value {
    context.report_error(task.field_error_at(path, FieldError::from(message.into())));
    Value::null()
}
