//! Filename encoding for object names and label values.
//!
//! Object names and label values in the backing store only tolerate a
//! restricted alphabet, so raw filenames are run through a base-32
//! encoding with a lowercase-only alphabet and `x` padding. The encoding
//! is deterministic: the same filename always yields the same token, on
//! every host, which is what lets sector names and label selectors be
//! derived from the filename alone.

use std::sync::LazyLock;

use data_encoding::{Encoding, Specification};

use crate::constants::{NAME_ALPHABET, NAME_PADDING};
use crate::error::CodecError;

static NAME_ENCODING: LazyLock<Encoding> = LazyLock::new(|| {
    let mut spec = Specification::new();
    spec.symbols.push_str(NAME_ALPHABET);
    spec.padding = Some(NAME_PADDING);
    // The alphabet is 32 distinct symbols and the pad is outside it, so
    // this cannot fail for any input.
    spec.encoding().expect("base-32 name encoding specification")
});

/// Encode a raw filename into its object-name-safe token.
///
/// # Arguments
/// * `name` - Raw filename as handed to the VFS by the engine
///
/// # Returns
/// Token containing only characters from the custom alphabet plus padding.
pub fn encode_name(name: &str) -> String {
    NAME_ENCODING.encode(name.as_bytes())
}

/// Decode an encoded token back to the raw filename.
///
/// Nothing on the hot path needs this; it exists so object names seen in
/// the store can be mapped back to filenames when debugging.
///
/// # Arguments
/// * `token` - Encoded token as produced by [`encode_name`]
pub fn decode_name(token: &str) -> Result<String, CodecError> {
    let bytes = NAME_ENCODING
        .decode(token.as_bytes())
        .map_err(|e| CodecError::InvalidToken {
            token: token.to_string(),
            message: e.to_string(),
        })?;
    String::from_utf8(bytes).map_err(|e| CodecError::InvalidUtf8 {
        token: token.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for name in ["file0.db", "a.db", "some/path/to.db", "", "ütf8 name"] {
            let token: String = encode_name(name);
            assert_eq!(decode_name(&token).unwrap(), name);
        }
    }

    #[test]
    fn test_alphabet_membership() {
        let token: String = encode_name("file0.db-journal");
        for c in token.chars() {
            assert!(
                NAME_ALPHABET.contains(c) || c == NAME_PADDING,
                "unexpected character {:?} in token {}",
                c,
                token
            );
        }
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(encode_name("file0.db"), encode_name("file0.db"));
    }

    #[test]
    fn test_distinct_names_distinct_tokens() {
        assert_ne!(encode_name("file0.db"), encode_name("file1.db"));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        // Uppercase is outside the alphabet.
        assert!(decode_name("NOTATOKEN").is_err());
    }
}
