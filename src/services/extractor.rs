// src/services/extractor.rs

//! Record field extractor.
//!
//! Reads an OAI-PMH record carrying `oai_dc` metadata:
//!
//! ```xml
//! <record>
//!   <header><identifier>oai:repo:123</identifier></header>
//!   <metadata>
//!     <oai_dc:dc xmlns:oai_dc="..." xmlns:dc="http://purl.org/dc/elements/1.1/">
//!       <dc:title>Foo</dc:title>
//!       <dc:creator>A</dc:creator>
//!     </oai_dc:dc>
//!   </metadata>
//! </record>
//! ```
//!
//! Elements are matched by local name, so namespace prefixes do not matter.

use roxmltree::{Document, Node, ParsingOptions};

use crate::error::{AppError, Result};
use crate::models::{DcField, ExtractedRecord, FieldEntry};

/// Element holding the record identifier.
const IDENTIFIER_ELEMENT: &str = "identifier";

/// Element holding the descriptive metadata.
const METADATA_ELEMENT: &str = "dc";

/// Extract the identifier and metadata fields of a record.
pub fn extract(bytes: &[u8]) -> Result<ExtractedRecord> {
    let text = std::str::from_utf8(bytes)?;
    let doc = parse(text)?;

    let identifier = identifier_of(&doc)?;
    let container = first_element(&doc, METADATA_ELEMENT).ok_or(AppError::MissingMetadata)?;

    let mut fields = Vec::new();
    for child in container.children() {
        // Whitespace, comments and processing instructions carry no field
        if !child.is_element() {
            continue;
        }
        let name = child.tag_name().name();
        let field = DcField::from_name(name).ok_or_else(|| AppError::unrecognized_field(name))?;
        fields.push(FieldEntry::new(field, text_content(child)));
    }

    Ok(ExtractedRecord { identifier, fields })
}

/// Extract only the identifier.
///
/// Deleted records may carry a header without metadata, so this does not
/// require the metadata container.
pub fn extract_identifier(bytes: &[u8]) -> Result<String> {
    let text = std::str::from_utf8(bytes)?;
    let doc = parse(text)?;
    identifier_of(&doc)
}

fn parse(text: &str) -> Result<Document<'_>> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Ok(Document::parse_with_options(text, options)?)
}

fn identifier_of(doc: &Document<'_>) -> Result<String> {
    let identifier = first_element(doc, IDENTIFIER_ELEMENT)
        .map(text_content)
        .ok_or(AppError::MissingIdentifier)?;
    if identifier.is_empty() {
        return Err(AppError::MissingIdentifier);
    }
    Ok(identifier)
}

/// First element with the given local name, in document order.
fn first_element<'a, 'input>(doc: &'a Document<'input>, name: &str) -> Option<Node<'a, 'input>> {
    doc.descendants()
        .find(|node| node.is_element() && node.tag_name().name() == name)
}

/// Concatenated text of all descendant text nodes, untrimmed.
fn text_content(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}
