//! Format-level tests: literal TOON in, literal TOON out.
//!
//! Every test here pins down an exact piece of the wire format (array form
//! selection, quoting, depth discipline, strict/lenient validation) with
//! byte-for-byte assertions.

use toon_codec::{
    decode, decode_with_options, encode, encode_with_options, toon, DecodeOptions, Decoder,
    Delimiter, EncodeOptions, Error, KeyFolding, Limits, PathExpansion, Value,
};

/// Asserts that `value` encodes to exactly `expected` and decodes back.
fn assert_encodes(value: &Value, expected: &str) {
    let text = encode(value).unwrap();
    assert_eq!(
        text, expected,
        "encode mismatch:\n  got:      {text:?}\n  expected: {expected:?}"
    );
    let back = decode(&text).unwrap();
    assert_eq!(
        &back, value,
        "reparse mismatch:\n  text: {text:?}\n  got back: {back:?}"
    );
}

/// Asserts strict `decode(encode(value)) == value` without pinning the text.
fn assert_roundtrip(value: &Value) {
    let text = encode(value).unwrap();
    let back = decode(&text).unwrap();
    assert_eq!(&back, value, "roundtrip failed via {text:?}");
}

// ============================================================================
// Concrete end-to-end scenarios
// ============================================================================

#[test]
fn scenario_flat_object() {
    let value = toon!({"name": "Alice", "age": 30});
    assert_encodes(&value, "name: Alice\nage: 30");
}

#[test]
fn scenario_tabular_array() {
    let value = toon!({
        "users": [
            {"id": 1, "name": "Alice"},
            {"id": 2, "name": "Bob"}
        ]
    });
    assert_encodes(&value, "users[2]{id,name}:\n  1,Alice\n  2,Bob");
}

#[test]
fn scenario_inline_array() {
    let value = toon!({"tags": ["a", "b", "c"]});
    assert_encodes(&value, "tags[3]: a,b,c");
}

#[test]
fn scenario_list_form_with_nested_objects() {
    let value = toon!([
        {"id": 1, "meta": {"created": "2025"}},
        {"id": 2, "meta": {"created": "2024"}}
    ]);
    let expected = "\
[2]:
  - id: 1
    meta:
      created: \"2025\"
  - id: 2
    meta:
      created: \"2024\"";
    assert_encodes(&value, expected);

    // meta must come back as an object, not a string
    let back = decode(expected).unwrap();
    let first = &back.as_array().unwrap()[0];
    assert!(first.as_object().unwrap().get("meta").unwrap().is_object());
}

#[test]
fn scenario_strict_length_violation() {
    let err = decode("xs[3]: 1,2").unwrap_err();
    match err {
        Error::LengthMismatch {
            line,
            declared,
            actual,
        } => {
            assert_eq!((line, declared, actual), (1, 3, 2));
        }
        other => panic!("expected LengthMismatch, got {other:?}"),
    }

    let mut decoder = Decoder::new("xs[3]: 1,2", DecodeOptions::new().with_strict(false));
    let value = decoder.decode().unwrap();
    assert_eq!(
        value.as_object().unwrap().get("xs").unwrap(),
        &toon!([1, 2])
    );
    assert_eq!(decoder.warnings().len(), 1);
}

#[test]
fn scenario_key_folding() {
    let value = toon!({"a": {"b": {"c": 42}}});
    let options = EncodeOptions::new().with_key_folding(KeyFolding::Safe);
    let text = encode_with_options(&value, &options).unwrap();
    assert_eq!(text, "a.b.c: 42");

    let decode_options = DecodeOptions::new().with_expand_paths(PathExpansion::Safe);
    let back = decode_with_options(&text, &decode_options).unwrap();
    assert_eq!(back, value);
}

// ============================================================================
// Boundary cases
// ============================================================================

#[test]
fn empty_document_decodes_to_empty_object() {
    assert_eq!(decode("").unwrap(), toon!({}));
    assert_eq!(decode("\n\n  \n").unwrap(), toon!({}));
}

#[test]
fn empty_array() {
    assert_encodes(&toon!([]), "[0]:");
    assert_encodes(&toon!({"xs": []}), "xs[0]:");
}

#[test]
fn single_element_uniform_array_is_tabular() {
    // One flat object still satisfies the uniformity rule
    assert_encodes(&toon!([{"id": 1}]), "[1]{id}:\n  1");
}

#[test]
fn single_element_nested_object_uses_list_form() {
    assert_encodes(
        &toon!([{"id": 1, "meta": {"a": 1}}]),
        "[1]:\n  - id: 1\n    meta:\n      a: 1",
    );
}

#[test]
fn negative_zero_normalizes() {
    assert_eq!(encode(&Value::from(-0.0f64)).unwrap(), "0");
}

#[test]
fn list_marker_lookalike_string_is_quoted() {
    assert_encodes(&toon!("- hi"), "\"- hi\"");
}

#[test]
fn numeric_string_is_quoted() {
    assert_encodes(&toon!({"id": "42"}), "id: \"42\"");
}

#[test]
fn non_finite_floats_encode_as_null() {
    assert_eq!(encode(&Value::from(f64::NAN)).unwrap(), "null");
    assert_eq!(encode(&Value::from(f64::NEG_INFINITY)).unwrap(), "null");
}

#[test]
fn root_primitives() {
    assert_encodes(&toon!(42), "42");
    assert_encodes(&toon!(true), "true");
    assert_encodes(&toon!(null), "null");
    assert_encodes(&toon!("hello world"), "hello world");
    assert_encodes(&toon!(""), "\"\"");
}

#[test]
fn empty_object_field() {
    assert_encodes(&toon!({"meta": {}}), "meta:");
    assert_encodes(&toon!({"meta": {}, "x": 1}), "meta:\nx: 1");
}

#[test]
fn empty_object_list_item_is_bare_hyphen() {
    assert_encodes(&toon!([{}, {}]), "[2]:\n  -\n  -");
}

// ============================================================================
// Array forms and delimiters
// ============================================================================

#[test]
fn nested_object_fields() {
    let value = toon!({
        "user": {
            "name": "Alice",
            "prefs": {"theme": "dark"}
        },
        "ok": true
    });
    assert_encodes(
        &value,
        "user:\n  name: Alice\n  prefs:\n    theme: dark\nok: true",
    );
}

#[test]
fn mixed_array_uses_list_form() {
    let value = toon!({"xs": [1, [2, 3], "s"]});
    assert_encodes(&value, "xs[3]:\n  - 1\n  - [2]: 2,3\n  - s");
}

#[test]
fn nested_list_arrays() {
    let value = toon!([[1, [2]]]);
    assert_encodes(&value, "[1]:\n  - [2]:\n    - 1\n    - [1]: 2");
}

#[test]
fn pipe_delimiter_records_override_in_brackets() {
    let value = toon!({"tags": ["a", "b"]});
    let options = EncodeOptions::new().with_delimiter(Delimiter::Pipe);
    let text = encode_with_options(&value, &options).unwrap();
    assert_eq!(text, "tags[2|]: a|b");
    // Strict decode with default options recovers the delimiter per array
    assert_eq!(decode(&text).unwrap(), value);
}

#[test]
fn tab_delimiter_records_override_in_brackets() {
    let value = toon!({
        "rows": [
            {"sku": "A1", "qty": 2},
            {"sku": "B2", "qty": 1}
        ]
    });
    let options = EncodeOptions::new().with_delimiter(Delimiter::Tab);
    let text = encode_with_options(&value, &options).unwrap();
    assert_eq!(text, "rows[2\t]{sku\tqty}:\n  A1\t2\n  B2\t1");
    assert_eq!(decode(&text).unwrap(), value);
}

#[test]
fn inactive_delimiters_stay_unquoted() {
    let value = toon!({"v": "a,b"});
    let options = EncodeOptions::new().with_delimiter(Delimiter::Pipe);
    let text = encode_with_options(&value, &options).unwrap();
    assert_eq!(text, "v: a,b");

    // and comma mode quotes it
    assert_encodes(&value, "v: \"a,b\"");
}

#[test]
fn cells_containing_the_delimiter_are_quoted() {
    let value = toon!({"xs": ["a,b", "c"]});
    assert_encodes(&value, "xs[2]: \"a,b\",c");
}

#[test]
fn decoder_accepts_missing_space_after_colon() {
    assert_eq!(
        decode("xs[2]:1,2").unwrap(),
        toon!({"xs": [1, 2]})
    );
    assert_eq!(decode("a:1").unwrap(), toon!({"a": 1}));
}

#[test]
fn sort_keys_orders_objects() {
    let value = toon!({"b": 1, "a": {"d": 2, "c": 3}});
    let options = EncodeOptions::new().with_sort_keys(true);
    let text = encode_with_options(&value, &options).unwrap();
    assert_eq!(text, "a:\n  c: 3\n  d: 2\nb: 1");
}

#[test]
fn ensure_ascii_escapes_and_roundtrips() {
    let value = toon!({"name": "café"});
    let options = EncodeOptions::new().with_ensure_ascii(true);
    let text = encode_with_options(&value, &options).unwrap();
    assert_eq!(text, "name: \"caf\\u00e9\"");
    assert!(text.is_ascii());
    assert_eq!(decode(&text).unwrap(), value);
}

// ============================================================================
// Quoting and keys
// ============================================================================

#[test]
fn quoting_rules() {
    assert_encodes(&toon!({"s": " padded "}), "s: \" padded \"");
    assert_encodes(&toon!({"s": "true"}), "s: \"true\"");
    assert_encodes(&toon!({"s": ""}), "s: \"\"");
    assert_encodes(&toon!({"s": "a:b"}), "s: \"a:b\"");
    assert_encodes(&toon!({"s": "line\nbreak"}), "s: \"line\\nbreak\"");
    assert_encodes(&toon!({"s": "[3] wide"}), "s: \"[3] wide\"");
    assert_encodes(&toon!({"s": "{brace"}), "s: \"{brace\"");
    // Exponent forms decode as strings, so they stay bare
    assert_encodes(&toon!({"s": "1e6"}), "s: 1e6");
}

#[test]
fn non_identifier_keys_are_quoted() {
    assert_encodes(&toon!({"my key": 1}), "\"my key\": 1");
    assert_encodes(&toon!({"2nd": 1}), "\"2nd\": 1");
    assert_encodes(&toon!({"a:b": 1}), "\"a:b\": 1");
    assert_encodes(&toon!({"": 1}), "\"\": 1");
}

#[test]
fn unicode_strings_stay_bare_by_default() {
    assert_encodes(&toon!({"greeting": "👋 hello"}), "greeting: 👋 hello");
}

// ============================================================================
// List-item depth discipline
// ============================================================================

#[test]
fn list_item_first_field_nested_object_keeps_siblings_separate() {
    let value = toon!([{"meta": {"a": 1}, "x": 2}]);
    assert_encodes(&value, "[1]:\n  - meta:\n      a: 1\n    x: 2");
}

#[test]
fn list_item_first_field_inline_array() {
    let value = toon!([{"tags": [1, 2], "x": 5}]);
    assert_encodes(&value, "[1]:\n  - tags[2]: 1,2\n    x: 5");
}

#[test]
fn list_item_first_field_tabular_array() {
    let value = toon!([{"rows": [{"a": 1}, {"a": 2}], "x": 5}]);
    assert_encodes(&value, "[1]:\n  - rows[2]{a}:\n    1\n    2\n    x: 5");
}

#[test]
fn list_item_sibling_field_nested_array() {
    let value = toon!([{"id": 7, "tags": ["x", "y"]}, {"id": 8, "tags": []}]);
    // tags is an array with a nested-empty mix, forcing list form overall
    let text = encode(&value).unwrap();
    assert_eq!(
        text,
        "[2]:\n  - id: 7\n    tags[2]: x,y\n  - id: 8\n    tags[0]:"
    );
    assert_eq!(decode(&text).unwrap(), value);
}

#[test]
fn consecutive_items_do_not_merge() {
    let value = toon!([{"a": 1}, {"a": 2, "b": 3}]);
    let text = encode(&value).unwrap();
    assert_eq!(text, "[2]:\n  - a: 1\n  - a: 2\n    b: 3");
    assert_eq!(decode(&text).unwrap(), value);
}

#[test]
fn item_strings_that_look_like_fields_roundtrip() {
    // An unquoted string item may not mimic "key: value"; the encoder quotes
    let value = toon!([{"a": 1}, "b: 2"]);
    let text = encode(&value).unwrap();
    assert_eq!(text, "[2]:\n  - a: 1\n  - \"b: 2\"");
    assert_eq!(decode(&text).unwrap(), value);
}

// ============================================================================
// Strict-mode validation
// ============================================================================

#[test]
fn strict_rejects_tabs_in_indentation() {
    assert!(matches!(
        decode("a:\n\tb: 1"),
        Err(Error::Indentation { line: 2, .. })
    ));
}

#[test]
fn strict_rejects_off_grid_indentation() {
    assert!(matches!(
        decode("a:\n   b: 1"),
        Err(Error::Indentation { line: 2, .. })
    ));
}

#[test]
fn strict_rejects_duplicate_keys() {
    let err = decode("a: 1\na: 2").unwrap_err();
    assert!(matches!(err, Error::DuplicateKey { line: 2, .. }));
}

#[test]
fn strict_rejects_row_field_mismatch() {
    let err = decode("users[1]{id,name}:\n  1").unwrap_err();
    match err {
        Error::FieldMismatch {
            line,
            declared,
            actual,
        } => assert_eq!((line, declared, actual), (2, 2, 1)),
        other => panic!("expected FieldMismatch, got {other:?}"),
    }
}

#[test]
fn strict_rejects_surplus_list_items() {
    let err = decode("xs[1]:\n  - 1\n  - 2").unwrap_err();
    assert!(matches!(
        err,
        Error::LengthMismatch {
            declared: 1,
            actual: 2,
            ..
        }
    ));
}

#[test]
fn strict_reports_truncated_arrays() {
    let err = decode("xs[3]:\n  - 1").unwrap_err();
    assert!(matches!(err, Error::UnexpectedEnd { .. }));
}

#[test]
fn strict_rejects_indented_root_header() {
    assert!(matches!(
        decode("  [2]: 1,2"),
        Err(Error::Indentation { line: 1, .. })
    ));
}

#[test]
fn strict_rejects_illegal_escapes() {
    let err = decode("s: \"a\\qb\"").unwrap_err();
    assert!(matches!(err, Error::Syntax { line: 1, .. }));
}

#[test]
fn strict_rejects_missing_colon() {
    assert!(matches!(
        decode("a: 1\nbroken line"),
        Err(Error::Syntax { line: 2, .. })
    ));
}

#[test]
fn strict_rejects_trailing_content_after_root_array() {
    assert!(decode("[1]:\n  - 1\nextra: 2").is_err());
}

#[test]
fn strict_rejects_delimiter_mismatch_in_field_list() {
    // Brackets declare pipe, but the field list is comma-joined
    let err = decode("xs[1|]{a,b}:\n  1|2").unwrap_err();
    assert!(matches!(err, Error::DelimiterMismatch { line: 1, .. }));
}

#[test]
fn strict_rejects_delimiter_mismatch_in_rows() {
    let err = decode("xs[1|]{a|b}:\n  1,2").unwrap_err();
    assert!(matches!(err, Error::DelimiterMismatch { line: 2, .. }));
}

#[test]
fn strict_rejects_delimiter_mismatch_inline() {
    let err = decode("xs[3|]: 1,2,3").unwrap_err();
    assert!(matches!(err, Error::DelimiterMismatch { line: 1, .. }));
}

// ============================================================================
// Lenient-mode recovery
// ============================================================================

#[test]
fn lenient_recovers_duplicate_keys_last_wins() {
    let mut decoder = Decoder::new("a: 1\na: 2", DecodeOptions::new().with_strict(false));
    let value = decoder.decode().unwrap();
    assert_eq!(value, toon!({"a": 2}));
    assert_eq!(decoder.warnings().len(), 1);
}

#[test]
fn lenient_pads_short_rows() {
    let mut decoder = Decoder::new(
        "users[1]{id,name}:\n  1",
        DecodeOptions::new().with_strict(false),
    );
    let value = decoder.decode().unwrap();
    assert_eq!(
        value,
        toon!({"users": [{"id": 1, "name": null}]})
    );
    assert!(!decoder.warnings().is_empty());
}

#[test]
fn lenient_auto_detects_delimiter() {
    let mut decoder = Decoder::new("xs[3]: 1|2|3", DecodeOptions::new().with_strict(false));
    let value = decoder.decode().unwrap();
    assert_eq!(value, toon!({"xs": [1, 2, 3]}));
    assert_eq!(decoder.warnings().len(), 1);
}

#[test]
fn lenient_recovers_field_list_delimiter_mismatch() {
    let mut decoder = Decoder::new(
        "xs[1|]{a,b}:\n  1,2",
        DecodeOptions::new().with_strict(false),
    );
    let value = decoder.decode().unwrap();
    // The adopted delimiter applies to this array's rows as well
    assert_eq!(value, toon!({"xs": [{"a": 1, "b": 2}]}));
    assert_eq!(decoder.warnings().len(), 1);
}

#[test]
fn lenient_keeps_syntax_errors_fatal() {
    let options = DecodeOptions::new().with_strict(false);
    assert!(decode_with_options("a: \"unterminated", &options).is_err());
    assert!(decode_with_options("a:\n\tb: 1", &options).is_err());
}

// ============================================================================
// Key folding and path expansion
// ============================================================================

#[test]
fn folding_stops_at_multi_entry_objects() {
    let value = toon!({"a": {"b": {"x": 1, "y": 2}}});
    let options = EncodeOptions::new().with_key_folding(KeyFolding::Safe);
    let text = encode_with_options(&value, &options).unwrap();
    assert_eq!(text, "a.b:\n  x: 1\n  y: 2");
}

#[test]
fn folding_respects_flatten_depth() {
    let value = toon!({"a": {"b": {"c": 1}}});
    let options = EncodeOptions::new()
        .with_key_folding(KeyFolding::Safe)
        .with_flatten_depth(2);
    let text = encode_with_options(&value, &options).unwrap();
    assert_eq!(text, "a.b:\n  c: 1");
}

#[test]
fn folding_skips_unsafe_keys() {
    let value = toon!({"a": {"odd key": {"c": 1}}});
    let options = EncodeOptions::new().with_key_folding(KeyFolding::Safe);
    let text = encode_with_options(&value, &options).unwrap();
    assert_eq!(text, "a:\n  \"odd key\":\n    c: 1");
}

#[test]
fn dotted_keys_stay_literal_without_expansion() {
    let value = decode("a.b.c: 42").unwrap();
    assert_eq!(value, toon!({"a.b.c": 42}));
}

#[test]
fn expansion_conflict_is_strict_error() {
    let options = DecodeOptions::new().with_expand_paths(PathExpansion::Safe);
    let err = decode_with_options("a: 1\na.b: 2", &options).unwrap_err();
    assert!(matches!(err, Error::PathConflict { .. }));
}

// ============================================================================
// Resource limits
// ============================================================================

#[test]
fn decode_enforces_array_length_limit() {
    let options = DecodeOptions::new().with_limits(Limits {
        max_array_length: 3,
        ..Limits::default()
    });
    let err = decode_with_options("xs[4]: 1,2,3,4", &options).unwrap_err();
    assert!(matches!(err, Error::LimitExceeded { .. }));
}

#[test]
fn decode_enforces_nesting_limit() {
    let options = DecodeOptions::new().with_limits(Limits {
        max_nesting_depth: 2,
        ..Limits::default()
    });
    let err = decode_with_options("a:\n  b:\n    c: 1", &options).unwrap_err();
    assert!(matches!(err, Error::LimitExceeded { .. }));
}

#[test]
fn encode_enforces_nesting_limit() {
    let mut value = toon!(1);
    for _ in 0..5 {
        value = toon!({ "inner": value });
    }
    let options = EncodeOptions::new().with_limits(Limits {
        max_nesting_depth: 3,
        ..Limits::default()
    });
    assert!(matches!(
        encode_with_options(&value, &options),
        Err(Error::LimitExceeded { .. })
    ));
}

// ============================================================================
// Idempotence spot checks
// ============================================================================

#[test]
fn reencoding_is_byte_stable() {
    for value in [
        toon!({"users": [{"id": 1, "name": "Alice"}, {"id": 2, "name": "Bob"}]}),
        toon!([{"id": 1, "meta": {"created": "2025"}}]),
        toon!({"tags": ["a", "b", "c"], "n": 3.5}),
    ] {
        let first = encode(&value).unwrap();
        let second = encode(&decode(&first).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn integer_valued_floats_flatten_to_integers() {
    // Documented lossy normalization: 2.0 emits as 2 and reparses integral
    let text = encode(&Value::from(2.0f64)).unwrap();
    assert_eq!(text, "2");
    assert_eq!(decode(&text).unwrap(), toon!(2));
}

#[test]
fn blank_lines_are_recorded_not_parsed() {
    let mut decoder = Decoder::new("a: 1\n\n\nb: 2\n", DecodeOptions::default());
    let value = decoder.decode().unwrap();
    assert_eq!(value, toon!({"a": 1, "b": 2}));
    assert_eq!(decoder.blank_lines(), &[2, 3, 5]);
}

#[test]
fn crlf_input_is_accepted() {
    assert_eq!(decode("a: 1\r\nb: 2\r\n").unwrap(), toon!({"a": 1, "b": 2}));
}

#[test]
fn deep_structures_roundtrip() {
    let value = toon!({
        "svc": {
            "endpoints": [
                {"host": "a.example", "port": 80},
                {"host": "b.example", "port": 443}
            ],
            "retry": {"max": 3, "backoff": 1.5},
            "labels": ["prod", "edge"]
        },
        "note": "rollout at 09:00"
    });
    assert_roundtrip(&value);
}
