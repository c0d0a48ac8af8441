/// Builds a [`Value`](crate::Value) from a JSON-like literal.
///
/// ```rust
/// use toon_codec::toon;
///
/// let data = toon!({
///     "name": "Alice",
///     "age": 30,
///     "tags": ["rust", "toon"]
/// });
/// assert!(data.is_object());
/// ```
#[macro_export]
macro_rules! toon {
    // Handle null
    (null) => {
        $crate::Value::Null
    };

    // Handle true
    (true) => {
        $crate::Value::Bool(true)
    };

    // Handle false
    (false) => {
        $crate::Value::Bool(false)
    };

    // Handle empty array
    ([]) => {
        $crate::Value::Array(vec![])
    };

    // Handle non-empty array
    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::toon!($elem)),*])
    };

    // Handle empty object
    ({}) => {
        $crate::Value::Object($crate::Map::new())
    };

    // Handle non-empty object
    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::Map::new();
        $(
            object.insert($key.to_string(), $crate::toon!($value));
        )*
        $crate::Value::Object(object)
    }};

    // Fallback: any serializable expression
    ($other:expr) => {{
        $crate::to_value(&$other).unwrap_or($crate::Value::Null)
    }};
}
