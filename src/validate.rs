// Field validators shared by the user and project controllers.
//
// All checks are pure: no store access, no panics. Request bodies arrive as
// loose JSON, so each validator takes the raw field (possibly absent or of
// the wrong type) and returns the normalized value or a client-facing
// message. Controllers short-circuit on the first failing field.

use serde_json::Value;

/// Column width shared by names, emails and titles.
pub const MAX_STRING_LEN: usize = 255;
/// Column width for project descriptions.
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// The value must be a JSON string that is non-empty after trimming and at
/// most `max` characters, so overlong input fails here instead of at the
/// column.
pub fn valid_string(value: Option<&Value>, field: &str, max: usize) -> Result<String, String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => {
            if s.chars().count() > max {
                return Err(format!("{} must be between 1 and {} characters.", field, max));
            }
            Ok(s.clone())
        }
        _ => Err(format!("{} must be a non-empty string.", field)),
    }
}

/// The value must be a string of the shape `local@domain.tld` with no
/// whitespace and exactly one `@` (the `^[^\s@]+@[^\s@]+\.[^\s@]+$` rule).
pub fn valid_email(value: Option<&Value>, field: &str) -> Result<String, String> {
    let fail = || Err(format!("{} must be a valid email.", field));

    let s = match value {
        Some(Value::String(s)) => s,
        _ => return fail(),
    };
    if s.chars().any(char::is_whitespace) {
        return fail();
    }
    if s.chars().count() > MAX_STRING_LEN {
        return Err(format!(
            "{} must be between 1 and {} characters.",
            field, MAX_STRING_LEN
        ));
    }
    let (local, domain) = match s.split_once('@') {
        Some(parts) => parts,
        None => return fail(),
    };
    if local.is_empty() || domain.contains('@') {
        return fail();
    }
    // The domain needs at least one dot with something on both sides.
    match domain.rsplit_once('.') {
        Some((head, tld)) if !head.is_empty() && !tld.is_empty() => Ok(s.clone()),
        _ => fail(),
    }
}

/// The value must convert to a whole number greater than zero. JSON numbers
/// and numeric strings are accepted; arrays, objects, booleans, null and
/// blank strings are not.
pub fn valid_number(value: Option<&Value>, field: &str) -> Result<i64, String> {
    let invalid = || Err(format!("{} must be a valid number.", field));

    let n = match value {
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => i,
            None => return invalid(),
        },
        Some(Value::String(s)) if !s.trim().is_empty() => match s.trim().parse::<i64>() {
            Ok(i) => i,
            Err(_) => return invalid(),
        },
        _ => return invalid(),
    };

    if n <= 0 {
        return Err(format!("{} must be greater than 0.", field));
    }
    Ok(n)
}
