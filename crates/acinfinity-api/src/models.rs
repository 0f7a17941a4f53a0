// Cloud response envelope and loose JSON helpers
//
// The AC Infinity API has no published schema and its payloads change
// between firmware generations, so device data stays as `serde_json`
// objects. Only the envelope is typed.

use serde::Deserialize;
use serde_json::Value;

/// A JSON object as returned by the cloud.
pub type JsonObject = serde_json::Map<String, Value>;

/// The `{ code, msg, data }` envelope wrapping every response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub code: i64,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.code == 200
    }
}

/// Render an id field as a string, whether the cloud sent it as a JSON
/// string or a number.
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read an integer out of a loosely typed field.
///
/// Numbers, numeric strings and booleans are accepted; floats are
/// truncated toward zero. `null` and anything else yields `None`.
pub fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
            n.as_f64().map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

/// Read a float out of a loosely typed field.
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Normalise an id for an update call.
///
/// Fetch calls return ids as strings while update calls expect integers.
/// Device ids overflow `i64`, so values that do not fit stay as their
/// canonical digit string, which encodes identically on the wire.
pub(crate) fn integer_id(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(value.clone()),
        Value::Number(n) => {
            #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
            n.as_f64().map(|f| Value::from(f.trunc() as i64))
        }
        Value::String(s) => {
            let parsed: i128 = s.trim().parse().ok()?;
            Some(i64::try_from(parsed).map_or_else(|_| Value::String(parsed.to_string()), Value::from))
        }
        _ => None,
    }
}

/// Render a payload value for `application/x-www-form-urlencoded`.
pub(crate) fn form_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Encode a payload object as a form body.
pub(crate) fn encode_form(payload: &JsonObject) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in payload {
        serializer.append_pair(key, &form_value(value));
    }
    serializer.finish()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_string_accepts_strings_and_numbers() {
        assert_eq!(id_string(&json!("1424979258063355749")).as_deref(), Some("1424979258063355749"));
        assert_eq!(id_string(&json!(42)).as_deref(), Some("42"));
        assert_eq!(id_string(&json!(null)), None);
        assert_eq!(id_string(&json!("  ")), None);
    }

    #[test]
    fn as_i64_is_lenient() {
        assert_eq!(as_i64(&json!(5)), Some(5));
        assert_eq!(as_i64(&json!("7")), Some(7));
        assert_eq!(as_i64(&json!(true)), Some(1));
        assert_eq!(as_i64(&json!(2.9)), Some(2));
        assert_eq!(as_i64(&json!(null)), None);
    }

    #[test]
    fn integer_id_keeps_oversized_ids_exact() {
        assert_eq!(integer_id(&json!("0012")).unwrap(), json!(12));
        assert_eq!(
            integer_id(&json!("54929097239553773072")).unwrap(),
            json!("54929097239553773072")
        );
        assert!(integer_id(&json!("abc")).is_none());
    }

    #[test]
    fn encode_form_renders_scalars() {
        let mut payload = JsonObject::new();
        payload.insert("devId".into(), json!(12));
        payload.insert("devName".into(), json!("Grow Tent"));
        payload.insert("flag".into(), json!(false));
        let body = encode_form(&payload);
        assert_eq!(body, "devId=12&devName=Grow+Tent&flag=false");
    }
}
