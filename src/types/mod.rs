//! Built-in scalar types

mod scalars;

pub use self::scalars::{BooleanType, FloatType, IdType, IntType, ScalarError, ScalarType, StringType};
