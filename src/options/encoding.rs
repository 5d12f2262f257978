//! Response body charset.

use encoding_rs::Encoding;
use std::borrow::Cow;
use std::fmt;

/// Text encoding applied to scrape responses.
///
/// When configured, the exposition text is transcoded before it is written
/// and the response media type declares the charset.
///
/// Encodings that cannot be produced on output (UTF-16, `replacement`)
/// resolve to their output encoding, UTF-8, so the declared charset always
/// matches the bytes sent.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ResponseEncoding(&'static Encoding);

impl ResponseEncoding {
    /// UTF-8, the native encoding of the exposition format.
    pub fn utf8() -> Self {
        Self(encoding_rs::UTF_8)
    }

    /// Looks up an encoding by its WHATWG label (`"utf-8"`, `"latin1"`, `"windows-1251"`, ...).
    pub fn for_label(label: &str) -> Option<Self> {
        Encoding::for_label(label.trim().as_bytes()).map(Self::from)
    }

    /// Charset name as it appears in the `Content-Type` header.
    pub fn name(&self) -> String {
        self.0.name().to_ascii_lowercase()
    }

    /// Transcodes UTF-8 exposition text into this encoding.
    ///
    /// Characters the encoding cannot represent are replaced with HTML
    /// numeric character references.
    pub fn encode<'a>(&self, text: &'a str) -> Cow<'a, [u8]> {
        let (bytes, _, had_unmappable) = self.0.encode(text);
        if had_unmappable {
            tracing::debug!(
                encoding = self.0.name(),
                "Exposition text contains characters not representable in response encoding"
            );
        }
        bytes
    }
}

impl From<&'static Encoding> for ResponseEncoding {
    fn from(encoding: &'static Encoding) -> Self {
        Self(encoding.output_encoding())
    }
}

impl fmt::Debug for ResponseEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResponseEncoding").field(&self.0.name()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_name() {
        assert_eq!(ResponseEncoding::utf8().name(), "utf-8");
    }

    #[test]
    fn test_for_label() {
        let enc = ResponseEncoding::for_label(" UTF8 ").unwrap();
        assert_eq!(enc, ResponseEncoding::utf8());
        assert_eq!(
            ResponseEncoding::for_label("cp1251").unwrap().name(),
            "windows-1251"
        );
        assert!(ResponseEncoding::for_label("klingon").is_none());
    }

    #[test]
    fn test_input_only_encodings_resolve_to_utf8() {
        for label in ["utf-16le", "utf-16be", "iso-2022-kr"] {
            let enc = ResponseEncoding::for_label(label).unwrap();
            assert_eq!(enc.name(), "utf-8", "{}", label);
            assert_eq!(&*enc.encode("русский"), "русский".as_bytes());
        }
        assert_eq!(ResponseEncoding::from(encoding_rs::UTF_16LE), ResponseEncoding::utf8());
    }

    #[test]
    fn test_encode_cyrillic() {
        let text = "русский";
        let utf8 = ResponseEncoding::utf8().encode(text);
        assert_eq!(&*utf8, text.as_bytes());

        let cp1251 = ResponseEncoding::for_label("windows-1251").unwrap().encode(text);
        assert_eq!(cp1251.len(), text.chars().count());
    }
}
