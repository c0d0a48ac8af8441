use toon_codec::{encode, toon, Map, Number, Value};

#[test]
fn test_toon_macro_null() {
    let value = toon!(null);
    assert_eq!(value, Value::Null);
}

#[test]
fn test_toon_macro_booleans() {
    assert_eq!(toon!(true), Value::Bool(true));
    assert_eq!(toon!(false), Value::Bool(false));
}

#[test]
fn test_toon_macro_numbers() {
    assert_eq!(toon!(42), Value::Number(Number::Integer(42)));
    assert_eq!(toon!(3.5), Value::Number(Number::Float(3.5)));
    assert_eq!(toon!(-123), Value::Number(Number::Integer(-123)));
}

#[test]
fn test_toon_macro_strings() {
    assert_eq!(toon!("hello world"), Value::String("hello world".to_string()));
    assert_eq!(toon!(""), Value::String(String::new()));
}

#[test]
fn test_toon_macro_arrays() {
    assert_eq!(toon!([]), Value::Array(vec![]));

    let mixed = toon!([1, "hello", true, null]);
    assert_eq!(
        mixed,
        Value::Array(vec![
            Value::Number(Number::Integer(1)),
            Value::String("hello".to_string()),
            Value::Bool(true),
            Value::Null,
        ])
    );
}

#[test]
fn test_toon_macro_objects() {
    assert_eq!(toon!({}), Value::Object(Map::new()));

    let obj = toon!({
        "name": "Alice",
        "age": 30,
        "active": true
    });
    let map = obj.as_object().unwrap();
    assert_eq!(map.len(), 3);
    assert_eq!(map.get("name").and_then(Value::as_str), Some("Alice"));
    assert_eq!(map.get("age").and_then(Value::as_i64), Some(30));
    assert_eq!(map.get("active").and_then(Value::as_bool), Some(true));
}

#[test]
fn test_toon_macro_preserves_insertion_order() {
    let obj = toon!({"z": 1, "a": 2, "m": 3});
    let keys: Vec<_> = obj.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}

#[test]
fn test_toon_macro_nested() {
    let value = toon!({
        "users": [
            {"id": 1, "name": "Alice"},
            {"id": 2, "name": "Bob"}
        ],
        "meta": {"count": 2}
    });

    let obj = value.as_object().unwrap();
    let users = obj.get("users").unwrap().as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(
        users[1].as_object().unwrap().get("name").and_then(Value::as_str),
        Some("Bob")
    );
    assert_eq!(
        obj.get("meta")
            .and_then(Value::as_object)
            .and_then(|m| m.get("count"))
            .and_then(Value::as_i64),
        Some(2)
    );
}

#[test]
fn test_toon_macro_output_encodes() {
    let value = toon!({
        "users": [
            {"id": 1, "name": "Alice"},
            {"id": 2, "name": "Bob"}
        ]
    });
    assert_eq!(
        encode(&value).unwrap(),
        "users[2]{id,name}:\n  1,Alice\n  2,Bob"
    );
}

#[test]
fn test_toon_macro_expression_fallback() {
    let name = String::from("dynamic");
    assert_eq!(toon!(name), Value::String("dynamic".to_string()));

    let xs = vec![1u8, 2, 3];
    assert_eq!(
        toon!(xs),
        Value::Array(vec![
            Value::Number(Number::Integer(1)),
            Value::Number(Number::Integer(2)),
            Value::Number(Number::Integer(3)),
        ])
    );
}
