use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use pretty_assertions::assert_eq;

use crate::{
    ExecutionContext, GraphQLError, OperationRequest, Resolved, ResolverContext, Schema,
    ast::Type,
    executor::{FieldError, PathSegment, SourceValue, Variables},
    executor_tests::fixtures::{getter, schema_with_query, starwars_schema},
    graphql_value,
    parser::{SourcePosition, parse_document_source},
    schema::{Field, ObjectMeta},
    value::Value,
};

async fn run_starwars(query: &str) -> crate::ExecutionOutput {
    let schema = Arc::new(starwars_schema());
    crate::execute(query, None, &schema, Variables::new(), OperationRequest::new())
        .await
        .expect("Execution failed")
}

#[tokio::test]
async fn resolves_nested_objects_and_lists() {
    let output = run_starwars(
        r"
        query HeroNameAndFriends {
          hero {
            id
            name
            friends { name }
          }
        }",
    )
    .await;

    assert_eq!(output.errors, []);
    assert_eq!(
        output.data,
        graphql_value!({
            "hero": {
                "id": "2001",
                "name": "R2-D2",
                "friends": [
                    {"name": "Luke Skywalker"},
                    {"name": "Han Solo"},
                    {"name": "Leia Organa"},
                ],
            },
        }),
    );
}

#[tokio::test]
async fn completes_abstract_types_by_runtime_type() {
    let output = run_starwars(
        r#"
        {
          humans: search(text: "Han") { ...result }
          droids: search(text: "-") { ...result }
        }
        fragment result on SearchResult {
          __typename
          ... on Human { name homePlanet }
          ... on Droid { name primaryFunction }
        }"#,
    )
    .await;

    assert_eq!(output.errors, []);
    assert_eq!(
        output.data,
        graphql_value!({
            "humans": [
                {"__typename": "Human", "name": "Han Solo", "homePlanet": null},
            ],
            "droids": [
                {"__typename": "Droid", "name": "C-3PO", "primaryFunction": "Protocol"},
                {"__typename": "Droid", "name": "R2-D2", "primaryFunction": "Astromech"},
            ],
        }),
    );
}

#[tokio::test]
async fn merges_same_key_selections() {
    let output = run_starwars(
        r#"
        {
          hero(episode: EMPIRE) { name }
          hero(episode: EMPIRE) { id }
          ...more
        }
        fragment more on Query { hero(episode: EMPIRE) { name appearsIn } }"#,
    )
    .await;

    assert_eq!(output.errors, []);
    assert_eq!(
        output.data,
        graphql_value!({
            "hero": {
                "name": "Luke Skywalker",
                "id": "1000",
                "appearsIn": ["NEW_HOPE", "EMPIRE", "JEDI"],
            },
        }),
    );
}

#[tokio::test]
async fn resolves_typename_on_the_root() {
    let output = run_starwars("{ __typename }").await;

    assert_eq!(output.data, graphql_value!({"__typename": "Query"}));
}

#[tokio::test]
async fn output_order_ignores_completion_order() {
    let completed = Arc::new(Mutex::new(vec![]));
    let delayed = |name: &'static str, delay_ms: u64| {
        let completed = Arc::clone(&completed);
        Field::new(name, Type::named("String")).resolve_with(move |_| {
            let completed = Arc::clone(&completed);
            async move {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                completed.lock().expect("not poisoned").push(name);
                Ok(Resolved::value(name))
            }
        })
    };
    let schema = schema_with_query(vec![delayed("a", 50), delayed("b", 100), delayed("c", 0)]);

    let output = crate::execute(
        "{ a b c }",
        None,
        &schema,
        Variables::new(),
        OperationRequest::new(),
    )
    .await
    .expect("Execution failed");

    assert_eq!(*completed.lock().expect("not poisoned"), ["c", "a", "b"]);
    assert_eq!(output.data, graphql_value!({"a": "a", "b": "b", "c": "c"}));
    let keys = output
        .data
        .as_object_value()
        .expect("object")
        .keys()
        .collect::<Vec<_>>();
    assert_eq!(keys, ["a", "b", "c"]);
}

#[tokio::test]
async fn runs_mutation_fields_serially() {
    let completed = Arc::new(Mutex::new(vec![]));
    let delayed = |name: &'static str, delay_ms: u64| {
        let completed = Arc::clone(&completed);
        Field::new(name, Type::named("String")).resolve_with(move |_| {
            let completed = Arc::clone(&completed);
            async move {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                completed.lock().expect("not poisoned").push(name);
                Ok(Resolved::value(name))
            }
        })
    };
    let schema = Arc::new(
        Schema::builder()
            .register(ObjectMeta::new("Query", vec![delayed("noop", 0)]))
            .register(ObjectMeta::new(
                "Mutation",
                vec![delayed("slow", 50), delayed("fast", 0)],
            ))
            .query_type("Query")
            .mutation_type("Mutation")
            .build()
            .expect("valid schema"),
    );

    let output = crate::execute(
        "mutation { slow fast }",
        None,
        &schema,
        Variables::new(),
        OperationRequest::new(),
    )
    .await
    .expect("Execution failed");

    assert_eq!(*completed.lock().expect("not poisoned"), ["slow", "fast"]);
    assert_eq!(output.data, graphql_value!({"slow": "slow", "fast": "fast"}));
}

#[tokio::test]
async fn field_errors_do_not_abort_siblings() {
    let schema = schema_with_query(vec![
        Field::new("before", Type::named("String"))
            .resolve_with(|_| async { Ok(Resolved::value("before")) }),
        Field::new("boom", Type::named("String"))
            .resolve_with(|_| async { Err(FieldError::from("Boom")) }),
        Field::new("after", Type::named("String"))
            .resolve_with(|_| async { Ok(Resolved::value("after")) }),
    ]);

    let output = crate::execute(
        "{\n  before\n  boom\n  after\n}",
        None,
        &schema,
        Variables::new(),
        OperationRequest::new(),
    )
    .await
    .expect("Execution failed");

    assert_eq!(
        output.data,
        graphql_value!({"before": "before", "boom": null, "after": "after"}),
    );
    assert_eq!(output.errors.len(), 1);
    assert_eq!(output.errors[0].error().message(), "Boom");
    assert_eq!(output.errors[0].location(), &SourcePosition::new(3, 3));
    assert_eq!(output.errors[0].path(), &[PathSegment::Field("boom".into())]);
}

#[tokio::test]
async fn error_extensions_are_kept() {
    let schema = schema_with_query(vec![Field::new("boom", Type::named("String")).resolve_with(
        |_| async {
            Err(FieldError::new(
                "Could not open connection to the database",
                graphql_value!({"internal_error": "Connection refused"}),
            ))
        },
    )]);

    let output = crate::execute(
        "{ boom }",
        None,
        &schema,
        Variables::new(),
        OperationRequest::new(),
    )
    .await
    .expect("Execution failed");

    assert_eq!(
        output.errors[0].error().extensions(),
        &graphql_value!({"internal_error": "Connection refused"}),
    );
}

#[tokio::test]
async fn null_for_non_null_list_items_is_reported_per_item() {
    let schema = schema_with_query(vec![
        Field::new("items", Type::list(Type::non_null_named("String"))).resolve_with(|_| async {
            Ok(Resolved::list([
                Resolved::value("a"),
                Resolved::null(),
                Resolved::value("c"),
            ]))
        }),
    ]);

    let output = crate::execute(
        "{ items }",
        None,
        &schema,
        Variables::new(),
        OperationRequest::new(),
    )
    .await
    .expect("Execution failed");

    assert_eq!(output.data, graphql_value!({"items": ["a", null, "c"]}));
    assert_eq!(output.errors.len(), 1);
    assert_eq!(
        output.errors[0].error().message(),
        "Cannot return null for non-nullable field Query.items",
    );
    assert_eq!(
        output.errors[0].path(),
        &[PathSegment::Field("items".into()), PathSegment::Index(1)],
    );
}

#[tokio::test]
async fn leaf_values_go_through_scalar_serialization() {
    let schema = schema_with_query(vec![
        Field::new("count", Type::named("Int")).resolve_with(|_| async { Ok(Resolved::value(3)) }),
        Field::new("ratio", Type::named("Float"))
            .resolve_with(|_| async { Ok(Resolved::value(3)) }),
        Field::new("id", Type::named("ID")).resolve_with(|_| async { Ok(Resolved::value(7)) }),
        Field::new("bad", Type::named("Int"))
            .resolve_with(|_| async { Ok(Resolved::value("three")) }),
    ]);

    let output = crate::execute(
        "{ count ratio id bad }",
        None,
        &schema,
        Variables::new(),
        OperationRequest::new(),
    )
    .await
    .expect("Execution failed");

    assert_eq!(
        output.data,
        graphql_value!({"count": 3, "ratio": 3.0, "id": "7", "bad": null}),
    );
    assert_eq!(output.errors.len(), 1);
    assert_eq!(output.errors[0].path(), &[PathSegment::Field("bad".into())]);
}

#[tokio::test]
async fn reports_missing_resolvers_and_unknown_fields() {
    let schema = schema_with_query(vec![
        Field::new("ok", Type::named("String"))
            .resolve_with(|_| async { Ok(Resolved::value("ok")) }),
        Field::new("unresolved", Type::named("String")),
    ]);

    let output = crate::execute(
        "{ ok unresolved nope }",
        None,
        &schema,
        Variables::new(),
        OperationRequest::new(),
    )
    .await
    .expect("Execution failed");

    assert_eq!(output.data, graphql_value!({"ok": "ok", "unresolved": null}));

    let messages = output
        .errors
        .iter()
        .map(|e| e.error().message())
        .collect::<Vec<_>>();
    assert_eq!(
        messages,
        [
            r#"No resolver for field "Query.unresolved""#,
            r#"Unknown field "nope" on type "Query""#,
        ],
    );
}

struct Root {
    tag: &'static str,
}

struct Outer;

struct Inner;

#[tokio::test]
async fn resolvers_see_every_ancestor() {
    let schema = Arc::new(
        Schema::builder()
            .register(ObjectMeta::new(
                "Inner",
                vec![
                    Field::new("depth", Type::non_null_named("Int")).resolve_with(
                        |ctx: ResolverContext| {
                            let depth = ctx.sources().len() as i32;
                            async move { Ok(Resolved::value(depth)) }
                        },
                    ),
                    Field::new("rootTag", Type::named("String")).resolve_with(
                        |ctx: ResolverContext| {
                            let tag = ctx.ancestor::<Root>().map(|r| r.tag);
                            let has_outer = ctx.ancestor::<Outer>().is_some();
                            let parent_is_inner = ctx.parent::<Inner>().is_some();
                            async move {
                                assert!(has_outer && parent_is_inner);
                                Ok(Resolved::value(tag))
                            }
                        },
                    ),
                    Field::new("path", Type::non_null_named("String")).resolve_with(
                        |ctx: ResolverContext| {
                            let path = ctx.path().to_string();
                            async move { Ok(Resolved::value(path)) }
                        },
                    ),
                ],
            ))
            .register(ObjectMeta::new(
                "Outer",
                vec![
                    Field::new("inner", Type::named("Inner"))
                        .resolve_with(|_| async { Ok(Resolved::object(Inner)) }),
                ],
            ))
            .register(ObjectMeta::new(
                "Query",
                vec![getter("outer", Type::named("Outer"), |_: &Root| {
                    Resolved::object(Outer)
                })],
            ))
            .query_type("Query")
            .build()
            .expect("valid schema"),
    );

    let output = crate::execute(
        "{ outer { inner { depth rootTag path } } }",
        None,
        &schema,
        Variables::new(),
        OperationRequest::new().initial_value(Root { tag: "root" }),
    )
    .await
    .expect("Execution failed");

    assert_eq!(output.errors, []);
    assert_eq!(
        output.data,
        graphql_value!({
            "outer": {"inner": {"depth": 3, "rootTag": "root", "path": "outer.inner.path"}},
        }),
    );
}

#[tokio::test]
async fn abstract_values_must_name_a_possible_type() {
    let output = {
        let schema = Arc::new(
            Schema::builder()
                .register(crate::schema::UnionMeta::new("Either", &["Left"]))
                .register(ObjectMeta::new(
                    "Left",
                    vec![Field::new("v", Type::named("Int"))
                        .resolve_with(|_| async { Ok(Resolved::value(1)) })],
                ))
                .register(ObjectMeta::new("Right", vec![]))
                .register(ObjectMeta::new(
                    "Query",
                    vec![
                        Field::new("untagged", Type::named("Either"))
                            .resolve_with(|_| async { Ok(Resolved::object(())) }),
                        Field::new("wrong", Type::named("Either"))
                            .resolve_with(|_| async { Ok(Resolved::typed_object("Right", ())) }),
                        Field::new("right", Type::named("Either"))
                            .resolve_with(|_| async { Ok(Resolved::typed_object("Left", ())) }),
                    ],
                ))
                .query_type("Query")
                .build()
                .expect("valid schema"),
        );
        crate::execute(
            "{ untagged { __typename } wrong { __typename } right { ... on Left { v } } }",
            None,
            &schema,
            Variables::new(),
            OperationRequest::new(),
        )
        .await
        .expect("Execution failed")
    };

    assert_eq!(
        output.data,
        graphql_value!({"untagged": null, "wrong": null, "right": {"v": 1}}),
    );
    assert_eq!(output.errors.len(), 2);
    assert_eq!(
        output.errors[1].error().message(),
        r#"Runtime object type "Right" is not a possible type for "Either", expected one of: Left"#,
    );
}

#[tokio::test]
async fn cancellation_discards_the_result() {
    let schema = schema_with_query(vec![
        Field::new("quick", Type::named("String"))
            .resolve_with(|_| async { Ok(Resolved::value("quick")) }),
        Field::new("stuck", Type::named("String")).resolve_with(|ctx: ResolverContext| {
            let cancellation = ctx.execution_context().cancellation().clone();
            async move {
                cancellation.cancel();
                futures::future::pending::<()>().await;
                Ok(Resolved::value("never"))
            }
        }),
    ]);
    let document = parse_document_source("{ quick stuck }").expect("valid document");
    let context = ExecutionContext::builder()
        .schema(schema)
        .document(Arc::new(document))
        .request(OperationRequest::new())
        .variables(Variables::new())
        .build()
        .expect("valid context");

    let result = crate::executor::execute(&context).await;

    assert_eq!(result, Err(GraphQLError::Cancelled));
    assert!(context.errors().is_empty());
}

#[tokio::test]
async fn cancelled_before_start_runs_nothing() {
    let schema = schema_with_query(vec![Field::new("never", Type::named("String")).resolve_with(
        |_| async { panic!("resolver must not run") },
    )]);
    let request = OperationRequest::new();
    let cancellation = crate::Cancellation::new();
    cancellation.cancel();

    let result = crate::execute(
        "{ never }",
        None,
        &schema,
        Variables::new(),
        request.cancellation(cancellation),
    )
    .await;

    assert_eq!(result, Err(GraphQLError::Cancelled));
}

#[tokio::test]
async fn shared_cancellation_keeps_no_waiters() {
    let fields = (0..200)
        .map(|i| {
            Field::new(format!("f{i}"), Type::named("Int"))
                .resolve_with(move |_| async move { Ok(Resolved::value(i)) })
        })
        .collect();
    let schema = schema_with_query(fields);
    let query = format!(
        "{{ {} }}",
        (0..200).map(|i| format!("f{i}")).collect::<Vec<_>>().join(" "),
    );
    let cancellation = crate::Cancellation::new();

    for _ in 0..3 {
        let output = crate::execute(
            &query,
            None,
            &schema,
            Variables::new(),
            OperationRequest::new().cancellation(cancellation.clone()),
        )
        .await
        .expect("Execution failed");

        assert_eq!(output.errors, []);
        assert_eq!(cancellation.waiters(), 0);
    }
    assert!(!cancellation.is_cancelled());
}

#[tokio::test]
async fn shared_objects_become_sources() {
    struct Config {
        name: &'static str,
    }

    let shared: SourceValue = Arc::new(Config { name: "prod" });
    let schema = Arc::new(
        Schema::builder()
            .register(ObjectMeta::new(
                "Config",
                vec![getter("name", Type::named("String"), |c: &Config| {
                    Resolved::value(c.name)
                })],
            ))
            .register(ObjectMeta::new(
                "Query",
                vec![
                    Field::new("config", Type::named("Config")).resolve_with(move |_| {
                        let source = Arc::clone(&shared);
                        async move { Ok(Resolved::shared_object(None, source)) }
                    }),
                ],
            ))
            .query_type("Query")
            .build()
            .expect("valid schema"),
    );

    let output = crate::execute(
        "{ config { name } }",
        None,
        &schema,
        Variables::new(),
        OperationRequest::new(),
    )
    .await
    .expect("Execution failed");

    assert_eq!(output.errors, []);
    assert_eq!(output.data, graphql_value!({"config": {"name": "prod"}}));
}

#[tokio::test]
async fn null_root_fields_stay_null() {
    let schema = schema_with_query(vec![
        Field::new("nothing", Type::named("String"))
            .resolve_with(|_| async { Ok(Resolved::value(Value::null())) }),
    ]);

    let output = crate::execute(
        "{ nothing }",
        None,
        &schema,
        Variables::new(),
        OperationRequest::new(),
    )
    .await
    .expect("Execution failed");

    assert_eq!(output.data, graphql_value!({"nothing": null}));
    assert!(output.is_ok());
}
