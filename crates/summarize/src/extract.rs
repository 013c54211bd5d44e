//! Text extraction from uploaded files.

use crate::SummarizeError;
use tracing::debug;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// File kinds we know how to (or know we cannot) read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    PlainText,
    Pdf,
    Docx,
    Unknown,
}

impl ContentKind {
    /// Detect from a declared MIME type, falling back to the file extension.
    /// `application/octet-stream` counts as undeclared.
    pub fn detect(file_name: &str, mime: Option<&str>) -> Self {
        let declared = mime
            .map(|m| m.trim().to_lowercase())
            .filter(|m| !m.is_empty() && m != "application/octet-stream");

        if let Some(m) = declared {
            let kind = Self::from_mime(&m);
            if kind != ContentKind::Unknown {
                return kind;
            }
        }

        mime_guess::from_path(file_name)
            .first()
            .map(|m| Self::from_mime(m.essence_str()))
            .unwrap_or(ContentKind::Unknown)
    }

    fn from_mime(mime: &str) -> Self {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        if essence.starts_with("text/") {
            ContentKind::PlainText
        } else if essence == "application/pdf" {
            ContentKind::Pdf
        } else if essence == DOCX_MIME {
            ContentKind::Docx
        } else {
            ContentKind::Unknown
        }
    }
}

/// Extract trimmed text from `bytes`.
///
/// Plain text is decoded as UTF-8, falling back to Latin-1. PDFs need the
/// `pdf` feature and Word documents the `docx` feature. Everything else is
/// [`SummarizeError::UnsupportedType`].
pub fn extract_text(
    bytes: &[u8],
    file_name: &str,
    mime: Option<&str>,
) -> Result<String, SummarizeError> {
    if bytes.is_empty() {
        return Err(SummarizeError::EmptyText);
    }

    let kind = ContentKind::detect(file_name, mime);
    debug!(file_name, ?kind, len = bytes.len(), "extracting text");

    let text = match kind {
        ContentKind::PlainText => decode_plain_text(bytes),
        ContentKind::Pdf => extract_pdf(bytes)?,
        ContentKind::Docx => extract_docx(bytes)?,
        ContentKind::Unknown => {
            return Err(SummarizeError::UnsupportedType(
                mime.filter(|m| !m.is_empty())
                    .unwrap_or(file_name)
                    .to_string(),
            ))
        }
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(SummarizeError::EmptyText);
    }
    Ok(text.to_string())
}

fn decode_plain_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        // Latin-1 maps each byte to the code point of the same value.
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(feature = "pdf")]
fn extract_pdf(bytes: &[u8]) -> Result<String, SummarizeError> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| SummarizeError::Extraction(format!("PDF extraction failed: {e}")))
}

#[cfg(not(feature = "pdf"))]
fn extract_pdf(_bytes: &[u8]) -> Result<String, SummarizeError> {
    Err(SummarizeError::UnsupportedType(
        "pdf (built without the `pdf` feature)".to_string(),
    ))
}

#[cfg(feature = "docx")]
const DOCX_BODY: &str = "word/document.xml";

/// Text runs (`w:t`) of the main document part, one line per paragraph
/// (`w:p`). Tabs and explicit breaks inside a paragraph are kept.
#[cfg(feature = "docx")]
fn extract_docx(bytes: &[u8]) -> Result<String, SummarizeError> {
    use quick_xml::events::Event;
    use std::io::Read;

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).map_err(docx_failed)?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(docx_failed)?
        .read_to_string(&mut xml)
        .map_err(docx_failed)?;

    let mut reader = quick_xml::Reader::from_str(&xml);
    let mut text = String::new();
    let mut in_run = false;
    loop {
        match reader.read_event().map_err(docx_failed)? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_run = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_run = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_run => text.push_str(&t.unescape().map_err(docx_failed)?),
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(text)
}

#[cfg(feature = "docx")]
fn docx_failed(e: impl std::fmt::Display) -> SummarizeError {
    SummarizeError::Extraction(format!("DOCX extraction failed: {e}"))
}

#[cfg(not(feature = "docx"))]
fn extract_docx(_bytes: &[u8]) -> Result<String, SummarizeError> {
    Err(SummarizeError::UnsupportedType(
        "docx (built without the `docx` feature)".to_string(),
    ))
}
