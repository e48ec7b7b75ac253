use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use pretty_assertions::assert_eq;

use crate::{
    GraphQLError, InputValue, OperationRequest, Resolved, ServiceCollection,
    ast::{Document, OperationType, Type},
    executor::{ExecutionContext, RootValueOrigin, Variables},
    executor_tests::fixtures::{getter, schema_with_query},
    parser::parse_document_source,
    schema::{Field, ObjectMeta, Schema},
};

fn document(source: &str) -> Arc<Document> {
    Arc::new(parse_document_source(source).expect("valid document"))
}

/// Root value counting how many times it was dropped.
struct CountedRoot(Arc<AtomicUsize>);

impl Drop for CountedRoot {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn counted_schema(drops: &Arc<AtomicUsize>) -> Arc<Schema> {
    let drops = Arc::clone(drops);
    Arc::new(
        Schema::builder()
            .register(ObjectMeta::new(
                "Query",
                vec![getter("ok", Type::named("Boolean"), |_: &CountedRoot| {
                    Resolved::value(true)
                })],
            ))
            .query_type("Query")
            .bind_native::<CountedRoot, _>("Query", move |_| CountedRoot(Arc::clone(&drops)))
            .build()
            .expect("valid schema"),
    )
}

fn simple_schema() -> Arc<Schema> {
    schema_with_query(vec![Field::new("ok", Type::named("Boolean"))])
}

#[test]
fn reports_missing_inputs_in_order() {
    assert_eq!(
        ExecutionContext::builder().build().unwrap_err(),
        GraphQLError::NoSchemaProvided,
    );
    assert_eq!(
        ExecutionContext::builder()
            .schema(simple_schema())
            .build()
            .unwrap_err(),
        GraphQLError::NoDocumentProvided,
    );
    assert_eq!(
        ExecutionContext::builder()
            .schema(simple_schema())
            .document(document("{ ok }"))
            .build()
            .unwrap_err(),
        GraphQLError::NoRequestProvided,
    );
    assert_eq!(
        ExecutionContext::builder()
            .schema(simple_schema())
            .document(document("{ ok }"))
            .request(OperationRequest::new())
            .build()
            .unwrap_err(),
        GraphQLError::NoVariablesProvided,
    );
}

#[test]
fn selects_the_operation() {
    let build = |source: &str, name: Option<&str>| {
        ExecutionContext::builder()
            .schema(simple_schema())
            .document(document(source))
            .operation_name(name)
            .request(OperationRequest::new())
            .variables(Variables::new())
            .build()
    };

    assert_eq!(
        build("fragment F on Query { ok }", None).unwrap_err(),
        GraphQLError::NoOperationProvided,
    );
    assert_eq!(
        build("query a { ok } query b { ok }", None).unwrap_err(),
        GraphQLError::MultipleOperationsProvided,
    );
    assert_eq!(
        build("query a { ok }", Some("c")).unwrap_err(),
        GraphQLError::UnknownOperationName,
    );

    let context = build("query a { ok } query b { ok }", Some("b")).expect("valid operation");
    assert_eq!(context.operation().item.name.as_deref(), Some("b"));
    assert_eq!(context.operation_type(), OperationType::Query);
}

#[test]
fn requires_a_root_type_for_the_operation() {
    let result = ExecutionContext::builder()
        .schema(simple_schema())
        .document(document("mutation { ok }"))
        .request(OperationRequest::new())
        .variables(Variables::new())
        .build();

    assert_eq!(
        result.unwrap_err(),
        GraphQLError::MissingRootType(OperationType::Mutation),
    );
}

#[tokio::test]
async fn refuses_subscriptions() {
    let schema = Arc::new(
        Schema::builder()
            .register(ObjectMeta::new(
                "Query",
                vec![Field::new("ok", Type::named("Boolean"))],
            ))
            .register(ObjectMeta::new(
                "Subscription",
                vec![Field::new("ticks", Type::named("Int"))],
            ))
            .query_type("Query")
            .subscription_type("Subscription")
            .build()
            .expect("valid schema"),
    );

    let result = crate::execute(
        "subscription { ticks }",
        None,
        &schema,
        Variables::new(),
        OperationRequest::new(),
    )
    .await;

    assert_eq!(result.unwrap_err(), GraphQLError::IsSubscription);
}

#[test]
fn merges_variable_defaults() {
    let context = ExecutionContext::builder()
        .schema(simple_schema())
        .document(document(
            "query q($a: Int = 1, $b: Int = 2, $c: Int) { ok }",
        ))
        .request(OperationRequest::new())
        .variables([("b".to_owned(), InputValue::scalar(20))].into_iter().collect())
        .build()
        .expect("valid context");

    let variables = context.variables();
    assert_eq!(variables.get("a"), Some(&InputValue::scalar(1)));
    assert_eq!(variables.get("b"), Some(&InputValue::scalar(20)));
    assert_eq!(variables.get("c"), None);
}

#[test]
fn disposes_a_constructed_root_once() {
    let drops = Arc::new(AtomicUsize::new(0));

    let context = ExecutionContext::builder()
        .schema(counted_schema(&drops))
        .document(document("{ ok }"))
        .request(OperationRequest::new())
        .variables(Variables::new())
        .build()
        .expect("valid context");

    assert_eq!(context.root_value_origin(), RootValueOrigin::Constructed);
    assert!(context.root_value().is_some());

    context.dispose();
    assert_eq!(drops.load(Ordering::SeqCst), 1);
    assert!(context.root_value().is_none());

    context.dispose();
    drop(context);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn outstanding_root_handles_outlive_disposal() {
    let drops = Arc::new(AtomicUsize::new(0));

    let context = ExecutionContext::builder()
        .schema(counted_schema(&drops))
        .document(document("{ ok }"))
        .request(OperationRequest::new())
        .variables(Variables::new())
        .build()
        .expect("valid context");

    let handle = context.root_value().expect("constructed root");
    context.dispose();
    drop(context);
    assert_eq!(drops.load(Ordering::SeqCst), 0);
    assert!(handle.downcast_ref::<CountedRoot>().is_some());

    drop(handle);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn drop_disposes_a_constructed_root() {
    let drops = Arc::new(AtomicUsize::new(0));

    let context = ExecutionContext::builder()
        .schema(counted_schema(&drops))
        .document(document("{ ok }"))
        .request(OperationRequest::new())
        .variables(Variables::new())
        .build()
        .expect("valid context");
    drop(context);

    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn never_disposes_a_root_from_services() {
    let drops = Arc::new(AtomicUsize::new(0));
    let root = Arc::new(CountedRoot(Arc::clone(&drops)));

    let mut services = ServiceCollection::new();
    services.add_shared(Arc::clone(&root));

    let context = ExecutionContext::builder()
        .schema(counted_schema(&drops))
        .document(document("{ ok }"))
        .request(OperationRequest::new().services(services))
        .variables(Variables::new())
        .build()
        .expect("valid context");

    assert_eq!(context.root_value_origin(), RootValueOrigin::Services);

    context.dispose();
    assert!(context.root_value().is_some());
    drop(context);

    assert_eq!(drops.load(Ordering::SeqCst), 0);
    assert_eq!(Arc::strong_count(&root), 1);
}

#[test]
fn caller_roots_take_precedence() {
    let drops = Arc::new(AtomicUsize::new(0));

    let context = ExecutionContext::builder()
        .schema(counted_schema(&drops))
        .document(document("{ ok }"))
        .request(OperationRequest::new().initial_value(CountedRoot(Arc::clone(&drops))))
        .variables(Variables::new())
        .build()
        .expect("valid context");

    assert_eq!(context.root_value_origin(), RootValueOrigin::Caller);

    context.dispose();
    assert!(context.root_value().is_some());
}

#[test]
fn roots_without_native_binding_are_absent() {
    let context = ExecutionContext::builder()
        .schema(simple_schema())
        .document(document("{ ok }"))
        .request(OperationRequest::new())
        .variables(Variables::new())
        .build()
        .expect("valid context");

    assert_eq!(context.root_value_origin(), RootValueOrigin::Absent);
    assert!(context.root_value().is_none());
}

#[tokio::test]
async fn constructed_roots_reach_top_level_resolvers() {
    let drops = Arc::new(AtomicUsize::new(0));

    let output = crate::execute(
        "{ ok }",
        None,
        &counted_schema(&drops),
        Variables::new(),
        OperationRequest::new(),
    )
    .await
    .expect("Execution failed");

    assert_eq!(output.errors, []);
    assert_eq!(output.data, crate::graphql_value!({"ok": true}));
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}
