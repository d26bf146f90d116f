//! Byte-order-mark detection and text decoding for vendor INF files.
//!
//! Vendor driver packages ship INFs in a mix of UTF-16, BOM-prefixed UTF-8
//! and plain Windows-1252. The detector looks at the first four bytes only;
//! anything without a recognised BOM is treated as Windows-1252, matching
//! what Windows setup tools assume.

use std::fs;
use std::path::Path;

use crate::domain::{FwcabError, Result};

/// Character encoding of an INF file, as determined from its BOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8Sig,
    Utf16Le,
    Utf16Be,
    Utf32Le,
    Utf32Be,
    /// Fallback legacy code page when no BOM is present.
    Windows1252,
}

impl TextEncoding {
    /// Detect the encoding from the first bytes of a file.
    ///
    /// BOM families are checked in order: UTF-8, UTF-32, UTF-16. UTF-32 must
    /// come before UTF-16 since the UTF-32 LE marker starts with the UTF-16
    /// LE one.
    pub fn detect(head: &[u8]) -> TextEncoding {
        if head.starts_with(&[0xEF, 0xBB, 0xBF]) {
            TextEncoding::Utf8Sig
        } else if head.starts_with(&[0xFF, 0xFE, 0x00, 0x00]) {
            TextEncoding::Utf32Le
        } else if head.starts_with(&[0x00, 0x00, 0xFE, 0xFF]) {
            TextEncoding::Utf32Be
        } else if head.starts_with(&[0xFF, 0xFE]) {
            TextEncoding::Utf16Le
        } else if head.starts_with(&[0xFE, 0xFF]) {
            TextEncoding::Utf16Be
        } else {
            TextEncoding::Windows1252
        }
    }

    fn bom_len(&self) -> usize {
        match self {
            TextEncoding::Utf8Sig => 3,
            TextEncoding::Utf16Le | TextEncoding::Utf16Be => 2,
            TextEncoding::Utf32Le | TextEncoding::Utf32Be => 4,
            TextEncoding::Windows1252 => 0,
        }
    }
}

/// Detect a file's encoding from its first 4 bytes only.
pub fn detect_file(path: &Path) -> Result<TextEncoding> {
    use std::io::Read;
    let mut head = [0u8; 4];
    let mut file = fs::File::open(path)?;
    let mut filled = 0;
    while filled < head.len() {
        let n = file.read(&mut head[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(TextEncoding::detect(&head[..filled]))
}

/// Read a whole file, detect its encoding and decode it to a `String`
/// with the BOM stripped.
pub fn read_to_string(path: &Path) -> Result<String> {
    let raw = fs::read(path)?;
    let encoding = TextEncoding::detect(&raw);
    decode(&raw, encoding, path)
}

fn decode(raw: &[u8], encoding: TextEncoding, path: &Path) -> Result<String> {
    let body = &raw[encoding.bom_len().min(raw.len())..];
    match encoding {
        TextEncoding::Utf8Sig => {
            let (text, _, _) = encoding_rs::UTF_8.decode(body);
            Ok(text.into_owned())
        }
        TextEncoding::Utf16Le => {
            let (text, _) = encoding_rs::UTF_16LE.decode_without_bom_handling(body);
            Ok(text.into_owned())
        }
        TextEncoding::Utf16Be => {
            let (text, _) = encoding_rs::UTF_16BE.decode_without_bom_handling(body);
            Ok(text.into_owned())
        }
        // encoding_rs does not ship UTF-32; decode the fixed-width code
        // points directly. Practically unseen in the wild, but the BOM
        // table recognises it so the decode path must exist.
        TextEncoding::Utf32Le | TextEncoding::Utf32Be => {
            decode_utf32(body, encoding == TextEncoding::Utf32Be, path)
        }
        TextEncoding::Windows1252 => {
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(body);
            Ok(text.into_owned())
        }
    }
}

fn decode_utf32(body: &[u8], big_endian: bool, path: &Path) -> Result<String> {
    if body.len() % 4 != 0 {
        return Err(FwcabError::InvalidUtf32 {
            path: path.to_path_buf(),
        });
    }
    let mut out = String::with_capacity(body.len() / 4);
    for unit in body.chunks_exact(4) {
        let bytes: [u8; 4] = unit.try_into().expect("chunks_exact yields 4 bytes");
        let value = if big_endian {
            u32::from_be_bytes(bytes)
        } else {
            u32::from_le_bytes(bytes)
        };
        let ch = char::from_u32(value).ok_or_else(|| FwcabError::InvalidUtf32 {
            path: path.to_path_buf(),
        })?;
        out.push(ch);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_bom_detected() {
        assert_eq!(
            TextEncoding::detect(&[0xEF, 0xBB, 0xBF, b'['] ),
            TextEncoding::Utf8Sig
        );
    }

    #[test]
    fn utf16_boms_detected() {
        assert_eq!(
            TextEncoding::detect(&[0xFF, 0xFE, b'[', 0x00]),
            TextEncoding::Utf16Le
        );
        assert_eq!(
            TextEncoding::detect(&[0xFE, 0xFF, 0x00, b'[']),
            TextEncoding::Utf16Be
        );
    }

    #[test]
    fn utf32_le_wins_over_utf16_le() {
        // The UTF-32 LE BOM begins with the UTF-16 LE BOM; order matters.
        assert_eq!(
            TextEncoding::detect(&[0xFF, 0xFE, 0x00, 0x00]),
            TextEncoding::Utf32Le
        );
    }

    #[test]
    fn no_bom_falls_back_to_windows_1252() {
        assert_eq!(
            TextEncoding::detect(b"[Ver"),
            TextEncoding::Windows1252
        );
        assert_eq!(TextEncoding::detect(b""), TextEncoding::Windows1252);
    }

    #[test]
    fn detect_file_reads_only_the_head() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.inf");
        std::fs::write(&path, b"\xEF\xBB\xBF[Version]").unwrap();
        assert_eq!(detect_file(&path).unwrap(), TextEncoding::Utf8Sig);

        let short = dir.path().join("b.inf");
        std::fs::write(&short, b"[V").unwrap();
        assert_eq!(detect_file(&short).unwrap(), TextEncoding::Windows1252);
    }

    #[test]
    fn read_utf8_sig_strips_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.inf");
        std::fs::write(&path, b"\xEF\xBB\xBF[Version]\r\n").unwrap();
        let text = read_to_string(&path).unwrap();
        assert!(text.starts_with("[Version]"));
    }

    #[test]
    fn read_utf16_le_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.inf");
        let mut raw = vec![0xFF, 0xFE];
        for unit in "[Version]".encode_utf16() {
            raw.extend_from_slice(&unit.to_le_bytes());
        }
        std::fs::write(&path, raw).unwrap();
        assert_eq!(read_to_string(&path).unwrap(), "[Version]");
    }

    #[test]
    fn read_windows_1252_high_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.inf");
        // 0xE9 is e-acute in CP1252, invalid as a lone UTF-8 byte.
        std::fs::write(&path, b"caf\xE9").unwrap();
        assert_eq!(read_to_string(&path).unwrap(), "caf\u{e9}");
    }

    #[test]
    fn utf32_le_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.inf");
        let mut raw = vec![0xFF, 0xFE, 0x00, 0x00];
        for ch in "[V]".chars() {
            raw.extend_from_slice(&(ch as u32).to_le_bytes());
        }
        std::fs::write(&path, raw).unwrap();
        assert_eq!(read_to_string(&path).unwrap(), "[V]");
    }
}
