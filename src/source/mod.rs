//! Document source abstraction for Slidecast.
//!
//! A source yields documents that are already split into sections by the
//! section tokenizer.

mod markdown;

pub use markdown::{parse_front_matter, FrontMatter, MarkdownDirSource};

use crate::error::Result;
use crate::text::Section;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Metadata describing a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: String,
    pub url: String,
    /// Publication date as `YYYY-MM-DD` (empty when unknown).
    pub date: String,
}

/// A document split into heading-delimited sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub metadata: DocumentMetadata,
    pub sections: Vec<Section>,
}

impl Document {
    /// Build a document by tokenizing a raw body.
    pub fn from_body(metadata: DocumentMetadata, body: &str) -> Self {
        Self {
            metadata,
            sections: crate::text::tokenize_sections(body),
        }
    }
}

/// Trait for document providers.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Fetch up to `limit` documents, most recent first.
    async fn fetch_documents(&self, limit: usize) -> Result<Vec<Document>>;
}
