//! Input validation for the user resource.
//!
//! Request bodies arrive as untyped JSON. Everything here is pure: a body
//! either becomes a typed, trimmed [`NewUser`] / [`UserPatch`] or is rejected
//! before the store is touched.

use crate::error::ApiError;
use crate::model::{NewUser, UserPatch};
use serde_json::{Map, Value};

const NAME_REQUIRED: &str = "Name is required and must be a non-empty string";
const NAME_NON_EMPTY: &str = "Name must be a non-empty string";
const EMAIL_STRING: &str = "Email must be a string";
const BODY_OBJECT: &str = "Request body must be a JSON object";

/// Parse a path segment as a user id
pub fn validate_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim().parse::<i64>().map_err(|_| ApiError::InvalidId)
}

/// Validate a create body
pub fn validate_create(input: &Value) -> Result<NewUser, ApiError> {
    let fields = as_object(input)?;

    let name = match fields.get("name") {
        Some(Value::String(s)) => non_empty(s).ok_or_else(|| invalid(NAME_REQUIRED))?,
        _ => return Err(invalid(NAME_REQUIRED)),
    };

    let email = match fields.get("email") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => normalize_email(s),
        Some(_) => return Err(invalid(EMAIL_STRING)),
    };

    Ok(NewUser { name, email })
}

/// Validate an update body. Only supplied fields end up in the patch.
pub fn validate_update(input: &Value) -> Result<UserPatch, ApiError> {
    let fields = as_object(input)?;
    let mut patch = UserPatch::default();

    match fields.get("name") {
        None => {}
        Some(Value::String(s)) => {
            patch.name = Some(non_empty(s).ok_or_else(|| invalid(NAME_NON_EMPTY))?);
        }
        Some(_) => return Err(invalid(NAME_NON_EMPTY)),
    }

    match fields.get("email") {
        None => {}
        Some(Value::Null) => patch.email = Some(None),
        Some(Value::String(s)) => patch.email = Some(normalize_email(s)),
        Some(_) => return Err(invalid(EMAIL_STRING)),
    }

    Ok(patch)
}

/// Parse raw request bytes into JSON. An empty body counts as `{}`.
pub fn parse_body(bytes: &[u8]) -> Result<Value, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(bytes).map_err(|_| invalid(BODY_OBJECT))
}

fn as_object(input: &Value) -> Result<&Map<String, Value>, ApiError> {
    input.as_object().ok_or_else(|| invalid(BODY_OBJECT))
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// Only a literally empty string means "not set"; anything else is stored
// trimmed, so "   " becomes "" and takes part in uniqueness.
fn normalize_email(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.trim().to_string())
}

fn invalid(msg: &str) -> ApiError {
    ApiError::InvalidField(msg.to_string())
}
