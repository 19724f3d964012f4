//! # Replies
//!
//! Transport-neutral replies.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use super::event::{Selection, Topic};

/// A clickable choice. `custom_id` parses back into an [`InboundEvent`].
///
/// [`InboundEvent`]: super::event::InboundEvent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub custom_id: String,
    pub label: String,
}

impl Button {
    pub fn topic(topic: Topic) -> Self {
        Self {
            custom_id: topic.id().to_string(),
            label: topic.label().to_string(),
        }
    }

    pub fn selection(selection: Selection, label: impl Into<String>) -> Self {
        Self {
            custom_id: selection.custom_id(),
            label: label.into(),
        }
    }
}

/// A file sent along with the reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reply {
    pub text: String,
    pub buttons: Vec<Button>,
    pub attachment: Option<Attachment>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_buttons(mut self, buttons: Vec<Button>) -> Self {
        self.buttons.extend(buttons);
        self
    }

    /// Append the main menu so the user can start the next flow
    pub fn with_menu(self) -> Self {
        self.with_buttons(main_menu())
    }

    pub fn with_attachment(mut self, filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.attachment = Some(Attachment {
            filename: filename.into(),
            bytes,
        });
        self
    }

    /// True if any button would re-enter a menu topic
    pub fn has_menu(&self) -> bool {
        self.buttons
            .iter()
            .any(|b| Topic::MENU.iter().any(|t| t.id() == b.custom_id))
    }
}

pub fn main_menu() -> Vec<Button> {
    Topic::MENU.into_iter().map(Button::topic).collect()
}
