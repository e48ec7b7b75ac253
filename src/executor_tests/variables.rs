use std::sync::Arc;

use pretty_assertions::assert_eq;

use crate::{
    InputValue, OperationRequest, Resolved, ResolverContext,
    ast::Type,
    executor::{ExecutionOutput, Variables},
    executor_tests::fixtures::{schema_with_query, starwars_schema},
    graphql_value,
    schema::{Argument, Field},
};

fn echo_schema() -> Arc<crate::Schema> {
    let echo = |ctx: ResolverContext| {
        let rendered = ctx
            .arguments()
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect::<Vec<_>>()
            .join(", ");
        async move { Ok(Resolved::value(rendered)) }
    };

    schema_with_query(vec![
        Field::new("echo", Type::named("String"))
            .argument(Argument::new("text", Type::named("String")))
            .argument(Argument::new("times", Type::named("Int")).default_value(1))
            .argument(Argument::new("tags", Type::list(Type::non_null_named("String"))))
            .resolve_with(echo),
        Field::new("required", Type::named("String"))
            .argument(Argument::new("id", Type::non_null_named("ID")))
            .resolve_with(echo),
    ])
}

async fn run(query: &str, vars: Variables) -> ExecutionOutput {
    crate::execute(query, None, &echo_schema(), vars, OperationRequest::new())
        .await
        .expect("Execution failed")
}

fn vars<const N: usize>(items: [(&str, InputValue); N]) -> Variables {
    items.into_iter().map(|(k, v)| (k.to_owned(), v)).collect()
}

#[tokio::test]
async fn applies_argument_defaults() {
    let output = run(r#"{ echo(text: "hi") }"#, Variables::new()).await;

    assert_eq!(output.errors, []);
    assert_eq!(output.data, graphql_value!({"echo": "text: \"hi\", times: 1"}));
}

#[tokio::test]
async fn substitutes_variables() {
    let output = run(
        r#"query q($text: String, $times: Int) { echo(text: $text, times: $times) }"#,
        vars([
            ("text", InputValue::scalar("from var")),
            ("times", InputValue::scalar(3)),
        ]),
    )
    .await;

    assert_eq!(output.errors, []);
    assert_eq!(
        output.data,
        graphql_value!({"echo": "text: \"from var\", times: 3"}),
    );
}

#[tokio::test]
async fn substitutes_variables_nested_in_lists() {
    let output = run(
        r#"query q($tag: String!) { echo(tags: ["a", $tag]) }"#,
        vars([("tag", InputValue::scalar("b"))]),
    )
    .await;

    assert_eq!(output.errors, []);
    assert_eq!(
        output.data,
        graphql_value!({"echo": "times: 1, tags: [\"a\", \"b\"]"}),
    );
}

#[tokio::test]
async fn unset_variables_fall_back_to_argument_defaults() {
    let output = run(
        r#"query q($times: Int) { echo(times: $times) }"#,
        Variables::new(),
    )
    .await;

    assert_eq!(output.errors, []);
    assert_eq!(output.data, graphql_value!({"echo": "times: 1"}));
}

#[tokio::test]
async fn uses_variable_definition_defaults() {
    let output = run(
        r#"query q($times: Int = 5) { echo(times: $times) }"#,
        Variables::new(),
    )
    .await;

    assert_eq!(output.errors, []);
    assert_eq!(output.data, graphql_value!({"echo": "times: 5"}));
}

#[tokio::test]
async fn caller_variables_win_over_definition_defaults() {
    let output = run(
        r#"query q($times: Int = 5) { echo(times: $times) }"#,
        vars([("times", InputValue::scalar(2))]),
    )
    .await;

    assert_eq!(output.data, graphql_value!({"echo": "times: 2"}));
}

#[tokio::test]
async fn missing_required_argument_is_a_field_error() {
    let output = run("{ required echo }", Variables::new()).await;

    assert_eq!(
        output.data,
        graphql_value!({"required": null, "echo": "times: 1"}),
    );
    assert_eq!(output.errors.len(), 1);
    assert_eq!(
        output.errors[0].error().message(),
        r#"Argument "id" of type "ID!" is required but not provided"#,
    );
}

#[tokio::test]
async fn null_for_non_null_argument_is_a_field_error() {
    let output = run(
        r#"query q($id: ID) { required(id: $id) }"#,
        vars([("id", InputValue::null())]),
    )
    .await;

    assert_eq!(output.data, graphql_value!({"required": null}));
    assert_eq!(
        output.errors[0].error().message(),
        r#"Invalid value for argument "id", expected type "ID!": found null"#,
    );
}

#[tokio::test]
async fn mistyped_argument_is_a_field_error() {
    let output = run(r#"{ echo(times: "many") }"#, Variables::new()).await;

    assert_eq!(output.data, graphql_value!({"echo": null}));
    assert_eq!(output.errors.len(), 1);
    assert!(
        output.errors[0]
            .error()
            .message()
            .starts_with(r#"Invalid value for argument "times", expected type "Int""#),
    );
}

#[tokio::test]
async fn enum_arguments_from_variables() {
    let schema = Arc::new(starwars_schema());

    let output = crate::execute(
        r#"query q($episode: Episode) { hero(episode: $episode) { name } }"#,
        None,
        &schema,
        vars([("episode", InputValue::scalar("EMPIRE"))]),
        OperationRequest::new(),
    )
    .await
    .expect("Execution failed");

    assert_eq!(output.errors, []);
    assert_eq!(
        output.data,
        graphql_value!({"hero": {"name": "Luke Skywalker"}}),
    );
}
