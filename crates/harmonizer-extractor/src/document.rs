//! Turn uploaded documents into rule candidates
//!
//! PDF decoding is delegated to `pdf-extract`; everything else is read as
//! UTF-8 with invalid bytes dropped. A document contributes at most
//! `max_document_candidates` non-empty lines.

use crate::types::DocumentUpload;
use tracing::{debug, warn};

/// Extract the plain text of an upload
///
/// Decode failures yield empty text rather than an error.
pub async fn extract_document_text(upload: &DocumentUpload) -> String {
    if !upload.is_pdf() {
        return decode_lossy(&upload.bytes);
    }

    let bytes = upload.bytes.clone();
    let filename = upload.filename.clone();
    match tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes)).await {
        Ok(Ok(text)) => {
            debug!("Extracted {} chars from PDF '{}'", text.len(), filename);
            text
        }
        Ok(Err(e)) => {
            warn!("Could not read PDF '{}': {}", filename, e);
            String::new()
        }
        Err(e) => {
            warn!("PDF extraction task for '{}' failed: {}", filename, e);
            String::new()
        }
    }
}

/// Decode UTF-8, skipping invalid byte sequences
fn decode_lossy(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    let mut dropped = false;
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
        dropped |= !chunk.invalid().is_empty();
    }
    if dropped {
        warn!("Dropped invalid UTF-8 bytes from upload");
    }
    text
}

/// Split text into at most `limit` trimmed, non-empty lines
pub fn split_candidates(text: &str, limit: usize) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(limit)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_skips_blank_lines() {
        let text = "\n  Use meaningful names  \n\n\t\nAvoid SELECT *\n";
        assert_eq!(
            split_candidates(text, 5),
            vec!["Use meaningful names", "Avoid SELECT *"]
        );
    }

    #[test]
    fn test_split_respects_limit() {
        let text = (1..=20).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n");
        let lines = split_candidates(&text, 5);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[4], "line 5");
    }

    #[test]
    fn test_split_handles_crlf() {
        assert_eq!(split_candidates("a\r\nb\r\n", 5), vec!["a", "b"]);
    }

    #[test]
    fn test_split_empty() {
        assert!(split_candidates("", 5).is_empty());
        assert!(split_candidates("  \n \n", 5).is_empty());
    }

    #[test]
    fn test_decode_drops_invalid_bytes() {
        let bytes = b"Use \xff\xfeprefixes\n";
        assert_eq!(decode_lossy(bytes), "Use prefixes\n");
    }

    #[tokio::test]
    async fn test_text_upload() {
        let upload = DocumentUpload::new("rules.txt", "Naming: prefix lv_\n".as_bytes());
        assert_eq!(extract_document_text(&upload).await, "Naming: prefix lv_\n");
    }

    #[tokio::test]
    async fn test_unreadable_pdf_is_empty() {
        let upload = DocumentUpload::new("broken.pdf", b"not really a pdf".to_vec());
        assert_eq!(extract_document_text(&upload).await, "");
    }
}
