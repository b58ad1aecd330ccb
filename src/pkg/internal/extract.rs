use std::io::Cursor;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOC: &str = "application/msword";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub const SUPPORTED_MIME_TYPES: [&str; 3] = [MIME_PDF, MIME_DOC, MIME_DOCX];

/// Documents with fewer extracted words than this are rejected as empty.
pub const MIN_WORD_COUNT: usize = 20;

#[derive(Debug, Default, Clone)]
pub struct ExtractionResult {
    pub text: String,
    pub word_count: usize,
    pub page_count: Option<usize>,
    pub error: Option<String>,
}

impl ExtractionResult {
    fn failed(reason: String) -> Self {
        ExtractionResult {
            error: Some(reason),
            ..Default::default()
        }
    }
}

/// Extracts plain text from an uploaded document. Failures are carried in
/// the result's `error` field so the caller can decide how to surface them;
/// this function itself never errors.
pub fn extract_document(data: &[u8], mime_type: &str) -> ExtractionResult {
    let result = match mime_type {
        MIME_PDF => extract_pdf(data),
        MIME_DOCX | MIME_DOC => extract_docx(data),
        _ => {
            return ExtractionResult::failed(format!(
                "Unsupported file type: {}. Only PDF and Word documents are supported.",
                mime_type
            ));
        }
    };
    if result.error.is_some() {
        return result;
    }
    if result.word_count < MIN_WORD_COUNT {
        return ExtractionResult {
            error: Some(
                "Document appears to be empty or contains very little text. \
                 Please upload a complete resume."
                    .into(),
            ),
            ..result
        };
    }
    result
}

fn extract_pdf(data: &[u8]) -> ExtractionResult {
    use lopdf::Document;
    let cursor = Cursor::new(data);
    let doc = match Document::load_from(cursor) {
        Ok(doc) => doc,
        Err(e) => return ExtractionResult::failed(format!("Failed to parse PDF: {}", e)),
    };

    let pages = doc.get_pages();
    let page_count = pages.len();
    let mut text = String::new();

    for page_num in pages.keys() {
        match doc.extract_text(&[*page_num]) {
            Ok(page_text) => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Err(e) => {
                tracing::warn!("failed to extract text from page {}: {}", page_num, e);
            }
        }
    }

    finish(text, Some(page_count))
}

fn extract_docx(data: &[u8]) -> ExtractionResult {
    use docx_rs::read_docx;
    let docx = match read_docx(data) {
        Ok(docx) => docx,
        Err(e) => return ExtractionResult::failed(format!("Failed to parse DOCX: {:?}", e)),
    };
    let mut text = String::new();
    for paragraph in docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(p) = paragraph {
            for child in p.children {
                if let docx_rs::ParagraphChild::Run(run) = child {
                    for run_child in run.children {
                        if let docx_rs::RunChild::Text(t) = run_child {
                            text.push_str(&t.text);
                            text.push(' ');
                        }
                    }
                }
            }
            text.push('\n');
        }
    }
    finish(text, None)
}

fn finish(raw: String, page_count: Option<usize>) -> ExtractionResult {
    let text = normalize_whitespace(&raw);
    let word_count = text.split_whitespace().count();
    ExtractionResult {
        text,
        word_count,
        page_count,
        error: None,
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    pub fn pdf_with_text(text: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![50.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content stream"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut buf = Vec::new();
        doc.save_to(&mut buf).expect("serialize pdf");
        buf
    }

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("word{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_unsupported_mime_type() {
        let result = extract_document(b"irrelevant", "image/png");
        assert_eq!(result.word_count, 0);
        let reason = result.error.expect("expected an error");
        assert!(reason.contains("image/png"));
    }

    #[test]
    fn test_corrupt_pdf() {
        let result = extract_document(b"not a pdf at all", MIME_PDF);
        assert!(result.text.is_empty());
        let reason = result.error.expect("expected an error");
        assert!(reason.contains("Failed to parse PDF"));
    }

    #[test]
    fn test_corrupt_docx() {
        let result = extract_document(b"not a zip archive", MIME_DOCX);
        let reason = result.error.expect("expected an error");
        assert!(reason.contains("Failed to parse DOCX"));
    }

    #[test]
    fn test_low_content_pdf_rejected() {
        let data = pdf_with_text("too short");
        let result = extract_document(&data, MIME_PDF);
        assert_eq!(result.word_count, 2);
        let reason = result.error.expect("expected low content rejection");
        assert!(reason.contains("very little text"));
    }

    #[test]
    fn test_full_pdf_extracts() {
        let data = pdf_with_text(&words(40));
        let result = extract_document(&data, MIME_PDF);
        assert!(result.error.is_none(), "unexpected error: {:?}", result.error);
        assert_eq!(result.word_count, 40);
        assert_eq!(result.page_count, Some(1));
        assert!(result.text.contains("word0"));
        assert!(result.text.contains("word39"));
    }

    #[test]
    fn test_whitespace_normalized() {
        assert_eq!(
            normalize_whitespace("a  b\n\n\nc\t d "),
            "a b c d".to_string()
        );
    }
}
