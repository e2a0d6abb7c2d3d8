//! Platform-neutral rendered documents
//!
//! Renderers are pure: they turn snapshots and settings into a
//! [`RenderableDocument`] without touching the network. The chat adapter
//! converts a document into whatever the platform displays (an embed on
//! Discord).

pub mod replies;
pub mod status;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use status::{split_columns, StatusRenderer};

/// Colour accent of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accent {
    /// Server online with players
    Green,
    /// Server online but empty
    Yellow,
    /// Server offline or not found
    Red,
    /// Informational replies
    Blurple,
}

impl Accent {
    /// RGB value of the accent
    pub fn rgb(&self) -> u32 {
        match self {
            Self::Green => 0x00ff00,
            Self::Yellow => 0xffaa00,
            Self::Red => 0xff0000,
            Self::Blurple => 0x7289da,
        }
    }
}

/// A titled field of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl DocumentField {
    pub fn new(name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline,
        }
    }
}

/// A rendered message body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderableDocument {
    pub title: String,
    pub description: Option<String>,
    pub accent: Accent,
    pub fields: Vec<DocumentField>,
    pub footer: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl RenderableDocument {
    pub fn new(title: impl Into<String>, accent: Accent) -> Self {
        Self {
            title: title.into(),
            description: None,
            accent,
            fields: Vec::new(),
            footer: None,
            timestamp: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(DocumentField::new(name, value, inline));
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Whether two documents show the same content
    ///
    /// The timestamp only records when the observation was made and is not
    /// part of the content.
    pub fn same_content(&self, other: &Self) -> bool {
        self.title == other.title
            && self.description == other.description
            && self.accent == other.accent
            && self.fields == other.fields
            && self.footer == other.footer
    }

    /// Look up a field by name
    pub fn find_field(&self, name: &str) -> Option<&DocumentField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// All visible text of the document, for searching
    pub fn text(&self) -> String {
        let mut text = self.title.clone();
        if let Some(description) = &self.description {
            text.push('\n');
            text.push_str(description);
        }
        for field in &self.fields {
            text.push('\n');
            text.push_str(&field.name);
            text.push('\n');
            text.push_str(&field.value);
        }
        if let Some(footer) = &self.footer {
            text.push('\n');
            text.push_str(footer);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_content_ignores_timestamp() {
        let a = RenderableDocument::new("Status", Accent::Green)
            .field("Map", "Oasis", true)
            .timestamp(Utc::now());
        let mut b = a.clone();
        b.timestamp = None;

        assert!(a.same_content(&b));
        assert_ne!(a, b);

        let c = b.clone().field("Mode", "Rush", true);
        assert!(!a.same_content(&c));
    }

    #[test]
    fn test_document_text() {
        let doc = RenderableDocument::new("Title", Accent::Blurple)
            .description("desc")
            .field("name", "value", false)
            .footer("foot");
        let text = doc.text();
        assert!(text.contains("Title"));
        assert!(text.contains("value"));
        assert!(text.contains("foot"));
        assert_eq!(doc.find_field("name").map(|f| f.inline), Some(false));
    }
}
