//! Resume files: text extraction and the desired position / salary hints
//! pulled out of the text.

pub mod position;

use std::path::Path;

use crate::errors::AppError;

pub use position::{extract_position, extract_salary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeFormat {
    Pdf,
    Docx,
    Txt,
}

impl ResumeFormat {
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "pdf" => Some(ResumeFormat::Pdf),
            "docx" => Some(ResumeFormat::Docx),
            "txt" => Some(ResumeFormat::Txt),
            _ => None,
        }
    }

    pub fn is_upload(&self) -> bool {
        matches!(self, ResumeFormat::Pdf | ResumeFormat::Docx)
    }
}

pub fn extract_text(format: ResumeFormat, data: &[u8]) -> Result<String, AppError> {
    let text = match format {
        ResumeFormat::Txt => String::from_utf8(data.to_vec())
            .map_err(|e| AppError::Extraction(format!("resume is not UTF-8: {e}")))?,
        ResumeFormat::Pdf => pdf_extract::extract_text_from_mem(data)
            .map_err(|e| AppError::Extraction(format!("PDF: {e}")))?,
        ResumeFormat::Docx => extract_docx(data)?,
    };

    if text.trim().is_empty() {
        return Err(AppError::Extraction("no text found in the file".to_string()));
    }
    Ok(text)
}

/// Paragraph text, one paragraph per line.
fn extract_docx(data: &[u8]) -> Result<String, AppError> {
    let docx =
        docx_rs::read_docx(data).map_err(|e| AppError::Extraction(format!("DOCX: {e:?}")))?;
    let mut text = String::new();
    for child in docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(p) = child {
            for child in p.children {
                if let docx_rs::ParagraphChild::Run(run) = child {
                    for run_child in run.children {
                        if let docx_rs::RunChild::Text(t) = run_child {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            text.push('\n');
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_file_name() {
        assert_eq!(ResumeFormat::from_file_name("CV.PDF"), Some(ResumeFormat::Pdf));
        assert_eq!(ResumeFormat::from_file_name("cv.docx"), Some(ResumeFormat::Docx));
        assert_eq!(ResumeFormat::from_file_name("cv.txt"), Some(ResumeFormat::Txt));
        assert_eq!(ResumeFormat::from_file_name("cv.doc"), None);
        assert_eq!(ResumeFormat::from_file_name("cv"), None);
        assert!(!ResumeFormat::Txt.is_upload());
    }

    #[test]
    fn test_plain_text() {
        let text = extract_text(ResumeFormat::Txt, "Product Manager".as_bytes()).unwrap();
        assert_eq!(text, "Product Manager");
        assert!(extract_text(ResumeFormat::Txt, b"  \n").is_err());
        assert!(extract_text(ResumeFormat::Txt, &[0xff, 0xfe]).is_err());
    }

    #[test]
    fn test_docx_paragraphs() {
        use docx_rs::{Docx, Paragraph, Run};

        let mut buf = std::io::Cursor::new(Vec::new());
        Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Иван Петров")))
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Product Manager")))
            .build()
            .pack(&mut buf)
            .unwrap();

        let text = extract_text(ResumeFormat::Docx, buf.get_ref()).unwrap();
        assert_eq!(text, "Иван Петров\nProduct Manager\n");
    }

    #[test]
    fn test_garbage_pdf_is_an_error() {
        assert!(extract_text(ResumeFormat::Pdf, b"not a pdf").is_err());
    }
}
