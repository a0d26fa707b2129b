//! `otpauth://` provisioning URI serialization.
//!
//! Authenticator apps are picky about this format, so the serialization is
//! pinned here instead of delegated: query parameters are emitted in
//! lexicographic key order and every label/value byte outside the RFC 3986
//! unreserved set is percent-encoded (space as `%20`, `@` as `%40`, `:` as
//! `%3A`).

use std::collections::BTreeMap;

/// Render a `otpauth://totp/` URI for an encoded label and parameter map.
///
/// The `BTreeMap` keeps the query parameters in lexicographic key order,
/// which is the stable order golden tests pin.
pub(crate) fn totp_provisioning_uri(label: &str, parameters: &BTreeMap<String, String>) -> String {
    let query = parameters
        .iter()
        .map(|(key, value)| format!("{}={}", percent_encode(key), percent_encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("otpauth://totp/{}?{query}", percent_encode(label))
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
pub(crate) fn percent_encode(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len());
    for byte in input.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::{percent_encode, totp_provisioning_uri};
    use std::collections::BTreeMap;

    #[test]
    fn encodes_reserved_characters_uppercase() {
        assert_eq!(percent_encode("User Name"), "User%20Name");
        assert_eq!(percent_encode("a@b:c"), "a%40b%3Ac");
        assert_eq!(percent_encode("logo.png"), "logo.png");
        assert_eq!(percent_encode("A-b_c~0"), "A-b_c~0");
    }

    #[test]
    fn non_ascii_is_encoded_per_utf8_byte() {
        assert_eq!(percent_encode("ü"), "%C3%BC");
    }

    #[test]
    fn parameters_render_in_lexicographic_order() {
        let mut parameters = BTreeMap::new();
        parameters.insert("period".to_string(), "30".to_string());
        parameters.insert("algorithm".to_string(), "sha1".to_string());
        parameters.insert("digits".to_string(), "6".to_string());
        parameters.insert("secret".to_string(), "ABC".to_string());
        assert_eq!(
            totp_provisioning_uri("User", &parameters),
            "otpauth://totp/User?algorithm=sha1&digits=6&period=30&secret=ABC"
        );
    }
}
