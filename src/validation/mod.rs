use serde_json::{Map, Value};

/// Check that `body` is an object carrying every required field.
///
/// Presence is key-presence: `0`, `false`, `""`, and `null` all count as
/// present. Anything other than a JSON object fails.
pub fn validate_against_schema(body: &Value, required_fields: &[&str]) -> bool {
    match body.as_object() {
        Some(map) => required_fields.iter().all(|field| map.contains_key(*field)),
        None => false,
    }
}

/// Reduce `body` to the recognized field set, dropping everything else
/// (including any client-supplied id).
pub fn extract_valid_fields(body: &Value, required_fields: &[&str]) -> Map<String, Value> {
    let mut fields = Map::new();
    if let Some(map) = body.as_object() {
        for field in required_fields {
            if let Some(value) = map.get(*field) {
                fields.insert((*field).to_string(), value.clone());
            }
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SCHEMA: &[&str] = &["x", "y", "z"];

    #[test]
    fn accepts_complete_body() {
        assert!(validate_against_schema(&json!({"x": 1, "y": 2, "z": 3}), SCHEMA));
    }

    #[test]
    fn accepts_falsy_values_as_present() {
        assert!(validate_against_schema(
            &json!({"x": 0, "y": false, "z": null}),
            SCHEMA
        ));
    }

    #[test]
    fn rejects_missing_field() {
        assert!(!validate_against_schema(&json!({"x": 1, "y": 2}), SCHEMA));
    }

    #[test]
    fn rejects_non_object_body() {
        assert!(!validate_against_schema(&json!([1, 2, 3]), SCHEMA));
        assert!(!validate_against_schema(&json!("x"), SCHEMA));
    }

    #[test]
    fn strips_unrecognized_fields() {
        let body = json!({"x": 1, "y": 2, "z": 3, "id": 99, "bogus": "dropped"});
        let fields = extract_valid_fields(&body, SCHEMA);
        assert_eq!(fields.len(), 3);
        assert!(!fields.contains_key("id"));
        assert!(!fields.contains_key("bogus"));
        assert_eq!(fields["x"], json!(1));
    }

    #[test]
    fn extra_fields_do_not_satisfy_missing_ones() {
        let body = json!({"x": 1, "bogus": 2, "other": 3});
        assert!(!validate_against_schema(&body, SCHEMA));
        let fields = extract_valid_fields(&body, SCHEMA);
        assert_eq!(fields.len(), 1);
    }
}
