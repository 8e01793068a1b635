use base64::prelude::*;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const BASIC_SCHEME: &str = "Basic";
// Only used to bring both sides of a comparison to a fixed-length tag.
const COMPARISON_KEY: &[u8] = b"oli-proxy credential comparison";

#[derive(Clone, PartialEq, Eq)]
pub(crate) struct Credential {
    pub(crate) username: String,
    pub(crate) password: String,
}

impl Credential {
    /// Parses a `Basic` authorization header value.
    ///
    /// The payload is decoded as ISO-8859-1, one byte per character, and
    /// split at the first colon only, so passwords may contain colons.
    /// Returns `None` for any other scheme or a malformed payload.
    pub(crate) fn from_header(auth_header_value: &str) -> Option<Self> {
        let encoded = auth_header_value
            .strip_prefix(BASIC_SCHEME)
            .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))?
            .trim();
        let decoded = BASE64_STANDARD.decode(encoded).ok()?;
        let username_password: String = decoded.into_iter().map(char::from).collect();

        let (username, password) = username_password.split_once(':')?;
        Some(Credential {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

/// True only when `auth_header_value` carries exactly the `expected`
/// credential. Both fields are always compared so timing doesn't reveal
/// which one was wrong.
pub(crate) fn validate(auth_header_value: Option<&str>, expected: &Credential) -> bool {
    let Some(credential) = auth_header_value.and_then(Credential::from_header) else {
        return false;
    };
    let username_matches = constant_time_eq(&credential.username, &expected.username);
    let password_matches = constant_time_eq(&credential.password, &expected.password);
    username_matches & password_matches
}

fn constant_time_eq(provided: &str, expected: &str) -> bool {
    let expected_tag = tag(expected);
    let Ok(mut mac) = HmacSha256::new_from_slice(COMPARISON_KEY) else {
        return false;
    };
    mac.update(provided.as_bytes());
    mac.verify_slice(&expected_tag).is_ok()
}

fn tag(value: &str) -> Vec<u8> {
    match HmacSha256::new_from_slice(COMPARISON_KEY) {
        Ok(mut mac) => {
            mac.update(value.as_bytes());
            mac.finalize().into_bytes().to_vec()
        }
        Err(_) => Vec::new(),
    }
}
