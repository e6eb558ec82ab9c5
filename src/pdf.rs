//! PDF metadata title
//!
//! Only the document information dictionary is read; page content is never
//! parsed. A PDF that fails to load simply has no title.

use lopdf::{Document, Object};

/// Title from the PDF `Info` dictionary, if present and non-empty
pub fn metadata_title(bytes: &[u8]) -> Option<String> {
    let doc = match Document::load_mem(bytes) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::debug!(error = %e, "unreadable PDF");
            return None;
        }
    };

    let info = doc.trailer.get(b"Info").ok()?;
    let (_, info) = doc.dereference(info).ok()?;
    let title = info.as_dict().ok()?.get(b"Title").ok()?;
    let (_, title) = doc.dereference(title).ok()?;

    let raw = match title {
        Object::String(bytes, _) => bytes.as_slice(),
        _ => return None,
    };

    let text = decode_text_string(raw);
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// PDF text strings: UTF-16BE or UTF-8 with a byte order mark, otherwise
/// PDFDocEncoding (treated as Latin-1, which matches it for printable text)
fn decode_text_string(raw: &[u8]) -> String {
    if let Some(utf16) = raw.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else if let Some(utf8) = raw.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        String::from_utf8_lossy(utf8).into_owned()
    } else {
        raw.iter().map(|&b| b as char).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Object, StringFormat};

    fn build_pdf(info: Option<lopdf::Dictionary>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => Object::Array(vec![]),
            "Count" => 0,
        });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        if let Some(info) = info {
            let info_id = doc.add_object(info);
            doc.trailer.set("Info", info_id);
        }
        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_title_from_info() {
        let bytes = build_pdf(Some(dictionary! {
            "Title" => Object::String(b"Annual Report 2024".to_vec(), StringFormat::Literal),
        }));
        assert_eq!(metadata_title(&bytes), Some("Annual Report 2024".to_string()));
    }

    #[test]
    fn test_no_info_dictionary() {
        let bytes = build_pdf(None);
        assert_eq!(metadata_title(&bytes), None);
    }

    #[test]
    fn test_blank_title_is_none() {
        let bytes = build_pdf(Some(dictionary! {
            "Title" => Object::String(b"   ".to_vec(), StringFormat::Literal),
        }));
        assert_eq!(metadata_title(&bytes), None);
    }

    #[test]
    fn test_garbage_is_none() {
        assert_eq!(metadata_title(b"%PDF-1.4 not really a pdf"), None);
        assert_eq!(metadata_title(b""), None);
    }

    #[test]
    fn test_decode_utf16() {
        let raw = [0xFE, 0xFF, 0x00, 0x48, 0x00, 0xE9];
        assert_eq!(decode_text_string(&raw), "Hé");
    }

    #[test]
    fn test_decode_latin1() {
        assert_eq!(decode_text_string(b"caf\xe9"), "café");
    }
}
