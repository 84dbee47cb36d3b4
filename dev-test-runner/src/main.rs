//! End-to-end smoke run of the public json-vet API against embedded
//! schema/value pairs. Exits nonzero on any unexpected outcome, so this can
//! gate local changes without the full test suite.

use serde_json::{json, Value};

struct Case {
    name: &'static str,
    schema: Value,
    value: Value,
    expect_valid: bool,
}

fn cases() -> Vec<Case> {
    vec![
        Case {
            name: "bounded multiple-of integer, in range",
            schema: json!({"type": "integer", "minimum": 0, "maximum": 100, "multipleOf": 5}),
            value: json!(25),
            expect_valid: true,
        },
        Case {
            name: "bounded multiple-of integer, off-grid",
            schema: json!({"type": "integer", "minimum": 0, "maximum": 100, "multipleOf": 5}),
            value: json!(23),
            expect_valid: false,
        },
        Case {
            name: "exclusive maximum rejects the bound",
            schema: json!({"type": "integer", "exclusiveMaximum": 10}),
            value: json!(10),
            expect_valid: false,
        },
        Case {
            name: "string length and pattern",
            schema: json!({"type": "string", "minLength": 2, "pattern": "^[a-z]+$"}),
            value: json!("abc"),
            expect_valid: true,
        },
        Case {
            name: "array of unique bounded integers",
            schema: json!({
                "type": "array",
                "items": {"type": "integer", "minimum": 0},
                "uniqueItems": true
            }),
            value: json!([1, 2, 2]),
            expect_valid: false,
        },
        Case {
            name: "object with required and closed properties",
            schema: json!({
                "type": "object",
                "properties": {"id": {"type": "string"}, "n": {"type": "integer"}},
                "required": ["id"],
                "additionalProperties": false
            }),
            value: json!({"id": "a", "n": 3}),
            expect_valid: true,
        },
        Case {
            name: "oneOf with overlapping branches",
            schema: json!({"oneOf": [
                {"type": "integer", "minimum": 0},
                {"type": "integer", "maximum": 10}
            ]}),
            value: json!(5),
            expect_valid: false,
        },
        Case {
            name: "recursive tree via $ref",
            schema: json!({
                "$ref": "#/definitions/node",
                "definitions": {
                    "node": {
                        "type": "object",
                        "properties": {
                            "value": {"type": "integer"},
                            "next": {"$ref": "#/definitions/node"}
                        },
                        "required": ["value"]
                    }
                }
            }),
            value: json!({"value": 1, "next": {"value": 2, "next": {"value": 3}}}),
            expect_valid: true,
        },
        Case {
            name: "null input reports its own failure",
            schema: json!({"type": "integer"}),
            value: json!(null),
            expect_valid: false,
        },
    ]
}

fn main() {
    let mut failures = 0usize;

    for case in cases() {
        let schema = match json_vet::compile(&case.schema) {
            Ok(s) => s,
            Err(error) => {
                eprintln!("❌ {}: schema failed to compile: {error}", case.name);
                failures += 1;
                continue;
            }
        };

        let result = schema.validate(&case.value);
        if result.is_success() == case.expect_valid {
            eprintln!("✅ {}", case.name);
        } else {
            eprintln!(
                "❌ {}: expected valid={}, got: {result}",
                case.name, case.expect_valid
            );
            failures += 1;
        }

        // every compiled schema must survive re-emission
        let round = match json_vet::compile(&schema.to_document()) {
            Ok(s) => s,
            Err(error) => {
                eprintln!("❌ {}: re-emitted document failed to compile: {error}", case.name);
                failures += 1;
                continue;
            }
        };
        if round.validate(&case.value).is_success() != case.expect_valid {
            eprintln!("❌ {}: re-emitted schema changed the verdict", case.name);
            failures += 1;
        }
    }

    if failures > 0 {
        eprintln!("{failures} case(s) failed");
        std::process::exit(1);
    }
    eprintln!("all cases passed");
}
