/// Construct JSON-like [`Value`]s by using JSON syntax.
///
/// [`Value`] objects are used mostly when asserting on execution results or
/// attaching extensions to field errors.
///
/// ```rust
/// # use juniper_exec::{graphql_value, Value};
/// let _: Value = graphql_value!(null);
/// let _: Value = graphql_value!(1234);
/// let _: Value = graphql_value!([1234, "test", true]);
/// let _: Value = graphql_value!({"key": "value", "foo": {"bar": null}});
/// ```
///
/// [`Value`]: crate::Value
#[macro_export]
macro_rules! graphql_value {
    (null) => {
        $crate::Value::null()
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::list(vec![ $( $crate::graphql_value!($elem) ),* ])
    };

    ({}) => {
        $crate::Value::object($crate::Object::with_capacity(0))
    };

    ({ $($key:literal : $value:tt),+ $(,)? }) => {
        $crate::Value::object(
            [ $( ($key, $crate::graphql_value!($value)) ),+ ]
                .into_iter()
                .collect::<$crate::Object>(),
        )
    };

    ($e:expr) => {
        $crate::Value::from($e)
    };
}
