//! Serialization of rendered documents.
//!
//! The renderer only shapes data; this module turns a [`RenderedDocument`]
//! into the bytes written to the artifact.

pub mod html;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::RenderedDocument;

/// Artifact format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Standalone HTML page
    #[default]
    Html,

    /// Pretty-printed JSON of the document model
    Json,
}

impl OutputFormat {
    /// File extension for default output paths
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Json => "json",
        }
    }
}

/// Serialize a document in the given format
pub fn serialize(document: &RenderedDocument, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Html => Ok(html::to_html(document)),
        OutputFormat::Json => serde_json::to_string_pretty(document),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MediaKind, Section};

    fn empty_document() -> RenderedDocument {
        RenderedDocument {
            title: "Latest".to_string(),
            refresh_seconds: 30,
            sections: MediaKind::ALL
                .iter()
                .map(|k| Section {
                    kind: *k,
                    heading: k.heading().to_string(),
                    cards: Vec::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_json_output_parses_back() {
        let doc = empty_document();
        let json = serialize(&doc, OutputFormat::Json).unwrap();
        let parsed: RenderedDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_format_from_yaml() {
        let format: OutputFormat = serde_yaml::from_str("json").unwrap();
        assert_eq!(format, OutputFormat::Json);
        assert_eq!(format.extension(), "json");
    }
}
