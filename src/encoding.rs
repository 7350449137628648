//! Binary primitives shared by the header codecs
//!
//! All multi-byte ZIP fields are little-endian. Names and comments use the
//! modified UTF-8 form: NUL becomes the two-byte sequence `C0 80`, and
//! supplementary characters are written as a UTF-16 surrogate pair with each
//! surrogate encoded as its own three-byte sequence.

/// Append a little-endian `u16` field
#[inline]
pub(crate) fn put_u16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Append a little-endian `u32` field
#[inline]
pub(crate) fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Encode `text` as modified UTF-8
pub fn modified_utf8(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut units = [0u16; 2];
    for ch in text.chars() {
        for &unit in ch.encode_utf16(&mut units).iter() {
            put_utf16_unit(&mut out, unit);
        }
    }
    out
}

fn put_utf16_unit(out: &mut Vec<u8>, unit: u16) {
    match unit {
        0x0001..=0x007F => out.push(unit as u8),
        0x0000..=0x07FF => {
            out.push(0xC0 | (unit >> 6) as u8);
            out.push(0x80 | (unit & 0x3F) as u8);
        }
        _ => {
            out.push(0xE0 | (unit >> 12) as u8);
            out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
            out.push(0x80 | (unit & 0x3F) as u8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_fields() {
        let mut buf = Vec::new();
        put_u16(&mut buf, 0x1234);
        put_u32(&mut buf, 0x04034B50);
        assert_eq!(buf, [0x34, 0x12, 0x50, 0x4B, 0x03, 0x04]);
    }

    #[test]
    fn test_ascii_is_unchanged() {
        assert_eq!(modified_utf8("META-INF/MANIFEST.MF"), b"META-INF/MANIFEST.MF");
        assert!(modified_utf8("").is_empty());
    }

    #[test]
    fn test_nul_uses_two_bytes() {
        assert_eq!(modified_utf8("a\0b"), [b'a', 0xC0, 0x80, b'b']);
    }

    #[test]
    fn test_bmp_matches_standard_utf8() {
        for text in ["é", "ß", "€", "日本語", "\u{FFFF}"] {
            assert_eq!(modified_utf8(text), text.as_bytes(), "{:?}", text);
        }
    }

    #[test]
    fn test_supplementary_uses_surrogate_pairs() {
        // U+1F600 is the surrogate pair D83D DE00
        assert_eq!(
            modified_utf8("\u{1F600}"),
            [0xED, 0xA0, 0xBD, 0xED, 0xB8, 0x80]
        );
        assert_eq!(modified_utf8("x\u{10000}").len(), 7);
    }
}
