//! DOCX text extraction: `word/document.xml` text runs, one line per paragraph.

use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;

use super::DocumentResult;
use crate::error::DocumentError;

const DOCUMENT_XML: &str = "word/document.xml";

/// Extract the visible text of a DOCX file.
pub fn extract_docx_text(bytes: &[u8]) -> DocumentResult<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| DocumentError::Docx(format!("not a DOCX archive: {}", e)))?;

    let mut content = String::new();
    archive
        .by_name(DOCUMENT_XML)
        .map_err(|e| DocumentError::Docx(format!("missing {}: {}", DOCUMENT_XML, e)))?
        .read_to_string(&mut content)
        .map_err(|e| DocumentError::Docx(format!("failed to read {}: {}", DOCUMENT_XML, e)))?;

    paragraphs_to_text(&content)
}

fn paragraphs_to_text(xml: &str) -> DocumentResult<String> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text_run => {
                let run = e
                    .unescape()
                    .map_err(|e| DocumentError::Docx(e.to_string()))?;
                text.push_str(&run);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DocumentError::Docx(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn build_docx(document_xml: &str) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        writer.start_file(DOCUMENT_XML, options).unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_paragraphs_become_lines() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>EUR/USD </w:t></w:r><w:r><w:t>Long</w:t></w:r></w:p>
    <w:p><w:r><w:t>riesgo 1% &amp; r:r 2</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

        let text = extract_docx_text(&build_docx(xml)).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["EUR/USD Long", "riesgo 1% & r:r 2"]);
    }

    #[test]
    fn test_rejects_non_zip_bytes() {
        assert!(matches!(
            extract_docx_text(b"plain text"),
            Err(DocumentError::Docx(_))
        ));
    }
}
