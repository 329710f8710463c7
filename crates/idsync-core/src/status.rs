//! Status code classification.
//!
//! Turns an opaque transport status into the message shown to the user, so
//! every remote call reports failures from the same table.

/// Fallback message for status codes outside [`STATUS_MESSAGES`].
pub const UNRECOGNIZED_STATUS: &str = "Unrecognized status code";

/// Failure codes the identity server is known to return.
pub const STATUS_MESSAGES: &[(u16, &str)] = &[
    (400, "Bad Request"),
    (401, "Unauthorized"),
    (403, "Forbidden"),
    (404, "Not Found"),
    (405, "Method Not Allowed"),
    (409, "Conflict"),
    (415, "Unsupported Media Type"),
    (429, "Too Many Requests"),
    (500, "Internal Server Error"),
    (501, "Not Implemented"),
    (502, "Bad Gateway"),
    (503, "Service Unavailable"),
    (504, "Gateway Timeout"),
];

/// Look up the message for a recognized failure code.
#[must_use]
pub fn classify(status: u16) -> Option<&'static str> {
    STATUS_MESSAGES
        .iter()
        .find(|(code, _)| *code == status)
        .map(|(_, message)| *message)
}

/// Message for any status code, falling back to [`UNRECOGNIZED_STATUS`].
#[must_use]
pub fn describe(status: u16) -> &'static str {
    classify(status).unwrap_or(UNRECOGNIZED_STATUS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_code_maps_to_its_message() {
        for (code, message) in STATUS_MESSAGES {
            assert_eq!(classify(*code), Some(*message));
            assert_eq!(describe(*code), *message);
        }
    }

    #[test]
    fn test_success_codes_are_unrecognized() {
        assert_eq!(classify(200), None);
        assert_eq!(describe(204), UNRECOGNIZED_STATUS);
    }

    #[test]
    fn test_total_over_all_codes() {
        for code in 0..=u16::MAX {
            let message = describe(code);
            if classify(code).is_none() {
                assert_eq!(message, UNRECOGNIZED_STATUS);
            }
        }
    }
}
