use serde::{Deserialize, Serialize};

/// Message content as the client sends it.
/// Either a plain string or a structured list of content items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),

    Items(Vec<ContentItem>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    Text {
        text: String,
    },

    ImageUrl {
        url: String,
    },

    /// Reference to an uploaded attachment by key.
    File {
        key: String,
        name: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
}

impl MessageContent {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Concatenate every textual piece across content-block shapes.
    /// Non-text items contribute nothing.
    pub fn joined_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Items(items) => items
                .iter()
                .filter_map(|item| match item {
                    ContentItem::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(""),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Items(items) => items.is_empty(),
        }
    }
}

impl From<String> for MessageContent {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for MessageContent {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joined_text_concatenates_text_items_only() {
        let content = MessageContent::Items(vec![
            ContentItem::Text { text: "see ".into() },
            ContentItem::ImageUrl { url: "https://x/img.png".into() },
            ContentItem::Text { text: "attached".into() },
        ]);
        assert_eq!(content.joined_text(), "see attached");
    }

    #[test]
    fn plain_string_deserializes_as_text() {
        let content: MessageContent = serde_json::from_str("\"hello\"").unwrap();
        assert_eq!(content, MessageContent::Text("hello".into()));
    }
}
