//! Sensitive field masking for exported resource files
//!
//! Exported files must be safe to commit. The server emits
//! `oauthConsumerSecret: null` as a placeholder; that value is replaced with
//! [`SENSITIVE_FIELD_MASK`] so an import can tell "keep the server's secret"
//! apart from "clear the secret".

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

/// The marker written in place of a sensitive value
pub const SENSITIVE_FIELD_MASK: &str = "'********'";

/// `oauthConsumerSecret: null` on a line of its own. Only spaces and tabs are
/// matched around the value so neighbouring lines are never consumed.
static CONSUMER_SECRET_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]*oauthConsumerSecret:[ \t]*)null([ \t]*\r?)$")
        .expect("Invalid masking pattern")
});

/// Mask placeholder consumer secrets in a serialized resource.
///
/// Populated secrets are left as they are. Input that is not valid UTF-8 is
/// returned unchanged.
pub fn mask(raw: &[u8]) -> Vec<u8> {
    match std::str::from_utf8(raw) {
        Ok(text) => mask_str(text).into_owned().into_bytes(),
        Err(_) => raw.to_vec(),
    }
}

/// String form of [`mask`]; borrows when nothing matched.
pub fn mask_str(text: &str) -> Cow<'_, str> {
    CONSUMER_SECRET_PLACEHOLDER.replace_all(text, |caps: &Captures| {
        format!("{}{}{}", &caps[1], SENSITIVE_FIELD_MASK, &caps[2])
    })
}

/// Whether a value read back from a file is the masking marker.
pub fn is_masked(value: &str) -> bool {
    value == SENSITIVE_FIELD_MASK.trim_matches('\'')
}
