//! JSON document loader.
//!
//! The JSON form is the serde model of [`crate::Document`]; see
//! [`crate::document`] for its shape.
//!
//! Loading is one synchronous step: the whole document is parsed before any
//! network construction starts.

use std::io::{BufReader, Read};
use std::path::Path;

use crate::{Document, LoadResult};

/// Parse a JSON document from a file.
pub fn load_document_json(path: &Path) -> LoadResult<Document> {
    let file = std::fs::File::open(path)?;
    load_document_reader(BufReader::new(file))
}

/// Like [`load_document_json`] but accepts any `Read` source.
pub fn load_document_reader<R: Read>(reader: R) -> LoadResult<Document> {
    let document: Document = serde_json::from_reader(reader)?;
    log::debug!(
        "parsed document: {} roads, {} junctions",
        document.roads.len(),
        document.junctions.len()
    );
    Ok(document)
}

/// Parse a JSON document held in memory.
pub fn parse_document_json(text: &str) -> LoadResult<Document> {
    load_document_reader(text.as_bytes())
}
