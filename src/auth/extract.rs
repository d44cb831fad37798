//! Ordered extraction rules for the auth API's variable response shapes.
//!
//! The login and refresh endpoints answer with opaque JSON whose fields
//! move around between server versions: the access token may sit at
//! `token`, `accessToken`, or `access_token`, either top-level or nested
//! under `data`. Rather than model this with types, each field has a fixed
//! priority-ordered list of JSON paths and the first match wins.

use serde_json::Value;

/// Paths checked for the access token, in priority order.
const ACCESS_TOKEN_PATHS: &[&[&str]] = &[
    &["token"],
    &["accessToken"],
    &["access_token"],
    &["data", "token"],
    &["data", "accessToken"],
    &["data", "access_token"],
];

/// Paths checked for the refresh token, in priority order.
const REFRESH_TOKEN_PATHS: &[&[&str]] = &[
    &["refreshToken"],
    &["refresh_token"],
    &["data", "refreshToken"],
    &["data", "refresh_token"],
];

/// Paths checked for the access-token lifetime hint, in priority order.
const EXPIRES_IN_PATHS: &[&[&str]] = &[
    &["expires_in"],
    &["expiresIn"],
    &["data", "expires_in"],
    &["data", "expiresIn"],
];

/// Paths checked for the refresh-token lifetime hint. Logged only; the
/// session keeps a single expiry.
const REFRESH_EXPIRES_IN_PATHS: &[&[&str]] = &[
    &["refresh_expires_in"],
    &["refreshExpiresIn"],
    &["data", "refresh_expires_in"],
    &["data", "refreshExpiresIn"],
];

/// Paths checked for the user photo URL, in priority order.
const USER_PHOTO_PATHS: &[&[&str]] = &[
    &["user", "photo"],
    &["user", "avatar"],
    &["user", "foto"],
    &["data", "user", "photo"],
    &["data", "user", "avatar"],
    &["data", "user", "foto"],
];

/// Paths checked for a user-facing message in error bodies.
const ERROR_MESSAGE_PATHS: &[&[&str]] = &[&["message"], &["error"]];

fn lookup<'a>(body: &'a Value, paths: &[&[&str]]) -> Option<&'a Value> {
    paths.iter().find_map(|path| {
        path.iter()
            .try_fold(body, |value, key| value.get(key))
    })
}

fn first_string(body: &Value, paths: &[&[&str]]) -> Option<String> {
    lookup(body, paths)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Seconds, accepting both numeric and numeric-string encodings.
fn first_seconds(body: &Value, paths: &[&[&str]]) -> Option<i64> {
    match lookup(body, paths)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

pub fn access_token(body: &Value) -> Option<String> {
    first_string(body, ACCESS_TOKEN_PATHS)
}

pub fn refresh_token(body: &Value) -> Option<String> {
    first_string(body, REFRESH_TOKEN_PATHS)
}

pub fn expires_in(body: &Value) -> Option<i64> {
    first_seconds(body, EXPIRES_IN_PATHS)
}

pub fn refresh_expires_in(body: &Value) -> Option<i64> {
    first_seconds(body, REFRESH_EXPIRES_IN_PATHS)
}

pub fn user_photo(body: &Value) -> Option<String> {
    first_string(body, USER_PHOTO_PATHS)
}

/// User-facing message from an error body: `message` first, then `error`.
pub fn error_message(body: &Value) -> Option<String> {
    first_string(body, ERROR_MESSAGE_PATHS)
}
