//! Messages exchanged with the messaging transport

use serde::{Deserialize, Serialize};

/// Contact details reported by the transport for the sender
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContactInfo {
    /// Display name the user set in the app
    #[serde(default)]
    pub push_name: Option<String>,
    /// Phone number without the chat suffix
    #[serde(default)]
    pub number: String,
}

/// Downloaded media attached to an inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAttachment {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl MediaAttachment {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Extension derived from the MIME subtype, `bin` when there is none
    pub fn extension(&self) -> &str {
        self.mime_type
            .split('/')
            .nth(1)
            .map(|sub| sub.split(';').next().unwrap_or(sub).trim())
            .filter(|sub| !sub.is_empty())
            .unwrap_or("bin")
    }
}

/// Inbound chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: String,
    pub body: String,
    pub from_me: bool,
    pub contact: ContactInfo,
    pub media: Option<MediaAttachment>,
}

impl InboundMessage {
    pub fn text(chat_id: impl Into<String>, body: impl Into<String>) -> Self {
        let chat_id = chat_id.into();
        let number = chat_id.split('@').next().unwrap_or_default().to_string();
        Self {
            chat_id,
            body: body.into(),
            from_me: false,
            contact: ContactInfo {
                push_name: None,
                number,
            },
            media: None,
        }
    }

    pub fn with_media(mut self, media: MediaAttachment) -> Self {
        self.media = Some(media);
        self
    }

    pub fn with_push_name(mut self, name: impl Into<String>) -> Self {
        self.contact.push_name = Some(name.into());
        self
    }

    pub fn has_media(&self) -> bool {
        self.media.is_some()
    }
}

/// Outbound message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    Text { text: String },
    Media { url: String, caption: Option<String> },
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn media(url: impl Into<String>, caption: Option<String>) -> Self {
        Self::Media {
            url: url.into(),
            caption,
        }
    }

    /// Text body, if this is a text message
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Media { .. } => None,
        }
    }
}
