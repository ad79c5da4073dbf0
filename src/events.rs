//! Entry point for the UI collaborators.
//!
//! The selection overlay, the context-menu trigger and the popup all speak
//! [`NoteEvent`]. [`NoteEvents::dispatch`] validates the event, runs the
//! matching store operation and returns the list to re-render. On error
//! nothing is returned, and the caller keeps showing its previous state.

use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::backend::KvBackend;
use crate::error::EventError;
use crate::note_model::{Note, NoteDraft};
use crate::note_store::NoteStore;
use crate::validation::NoteValidator;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum NoteEvent {
    /// The user confirmed the in-page selection affordance.
    SelectionConfirmed {
        text: String,
        #[serde(default)]
        url: Option<String>,
    },

    /// The browser context-menu entry was clicked.
    MenuItemActivated {
        selected_text: String,
        #[serde(default)]
        page_url: Option<String>,
    },

    Edit {
        id: String,
        text: String,
        #[serde(default)]
        url: Option<String>,
    },

    Delete { id: String },

    MoveUp { id: String },

    MoveDown { id: String },
}

pub struct NoteEvents<B: KvBackend> {
    store: Arc<NoteStore<B>>,
    validator: NoteValidator,
}

impl<B: KvBackend> NoteEvents<B> {
    pub fn new(store: Arc<NoteStore<B>>, validator: NoteValidator) -> Self {
        NoteEvents { store, validator }
    }

    pub fn store(&self) -> &Arc<NoteStore<B>> {
        &self.store
    }

    pub async fn dispatch(&self, event: NoteEvent) -> Result<Vec<Note>, EventError> {
        match event {
            NoteEvent::SelectionConfirmed { text, url } => {
                debug!("selection confirmed");
                self.add(&text, url.as_deref()).await?;
            }
            NoteEvent::MenuItemActivated { selected_text, page_url } => {
                debug!("context menu activated");
                self.add(&selected_text, page_url.as_deref()).await?;
            }
            NoteEvent::Edit { id, text, url } => {
                let text = self.validator.text(&text)?;
                let url = self.validator.url(url.as_deref())?;
                self.store.update(&id, text, url).await?;
            }
            NoteEvent::Delete { id } => self.store.delete(&id).await?,
            NoteEvent::MoveUp { id } => self.store.move_up(&id).await?,
            NoteEvent::MoveDown { id } => self.store.move_down(&id).await?,
        }
        Ok(self.store.read_all().await?)
    }

    async fn add(&self, text: &str, url: Option<&str>) -> Result<Note, EventError> {
        let draft = NoteDraft {
            text: self.validator.text(text)?,
            url: self.validator.url(url)?.filter(|url| !url.is_empty()),
        };
        Ok(self.store.add(draft).await?)
    }
}
