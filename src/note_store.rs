//! The note store: the ordered collection behind one persisted key.
//!
//! Every mutating operation is a read-modify-write of the whole record,
//! run through [`KvBackend::update`] so the backend applies it atomically.
//! Two stores on the same record (the context-menu trigger and the popup,
//! each with their own handle) therefore cannot lose each other's updates.
//! Within one store, mutations also queue on an async mutex so they do not
//! tie up backend writers while waiting. `read_all` takes no lock: the
//! backend swaps whole values, so readers see either the previous or the
//! next collection.
//!
//! Build one store at startup and hand an `Arc<NoteStore<_>>` to every
//! consumer.

use std::sync::Arc;

use log::debug;
use serde_json::Value as JsonValue;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::backend::KvBackend;
use crate::error::StoreError;
use crate::note_collection::NoteCollection;
use crate::note_model::{Note, NoteDraft, NoteRecord};

/// Source of "now" in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

pub struct NoteStore<B: KvBackend> {
    backend: B,
    key: String,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl<B: KvBackend> NoteStore<B> {
    pub fn new(backend: B, key: impl Into<String>) -> Self {
        Self::with_clock(backend, key, Arc::new(SystemClock))
    }

    pub fn with_clock(backend: B, key: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        NoteStore {
            backend,
            key: key.into(),
            clock,
            write_lock: Mutex::new(()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// All notes in display order. Empty if nothing was ever saved.
    pub async fn read_all(&self) -> Result<Vec<Note>, StoreError> {
        let value = self.backend.get(&self.key).await?;
        Ok(decode(&self.key, value)?.into_notes())
    }

    /// Saves a new note at the top of the list.
    ///
    /// The draft is stored as given; callers validate it first.
    pub async fn add(&self, draft: NoteDraft) -> Result<Note, StoreError> {
        let now = self.clock.now_millis();
        let note = Note {
            id: Uuid::new_v4().hyphenated().to_string(),
            text: draft.text,
            url: draft.url.filter(|url| !url.trim().is_empty()),
            created_at: now,
            updated_at: now,
            index: 0,
        };
        debug!("adding note {} under '{}'", note.id, self.key);
        let inserted = note.clone();
        self.mutate(move |notes| {
            notes.prepend(inserted);
            true
        })
        .await?;
        Ok(note)
    }

    /// Replaces a note's text and, if `url` is given, its source link.
    ///
    /// `url: None` keeps the current link; an empty string clears it.
    /// Unknown ids are ignored.
    pub async fn update(
        &self,
        id: &str,
        text: impl Into<String>,
        url: Option<String>,
    ) -> Result<(), StoreError> {
        let text = text.into();
        let now = self.clock.now_millis();
        let target = id.to_string();
        let written = self
            .mutate(move |notes| {
                notes.modify(&target, |note| {
                    note.text = text;
                    if let Some(url) = url {
                        note.url = Some(url).filter(|url| !url.trim().is_empty());
                    }
                    // strictly increasing even when the clock has not moved
                    note.updated_at = now.max(note.updated_at + 1);
                })
            })
            .await?;
        self.log_outcome("update", id, written);
        Ok(())
    }

    /// Removes a note and closes the gap it leaves. Unknown ids are ignored.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let target = id.to_string();
        let written = self.mutate(move |notes| notes.remove(&target).is_some()).await?;
        self.log_outcome("delete", id, written);
        Ok(())
    }

    /// Moves a note one place towards the top.
    pub async fn move_up(&self, id: &str) -> Result<(), StoreError> {
        let target = id.to_string();
        let written = self.mutate(move |notes| notes.move_up(&target)).await?;
        self.log_outcome("move_up", id, written);
        Ok(())
    }

    /// Moves a note one place towards the bottom.
    pub async fn move_down(&self, id: &str) -> Result<(), StoreError> {
        let target = id.to_string();
        let written = self.mutate(move |notes| notes.move_down(&target)).await?;
        self.log_outcome("move_down", id, written);
        Ok(())
    }

    /// Applies `change` to the stored collection in one atomic backend
    /// update. Nothing is written when `change` returns `false`.
    async fn mutate<F>(&self, change: F) -> Result<bool, StoreError>
    where
        F: FnOnce(&mut NoteCollection) -> bool + Send + 'static,
    {
        let _guard = self.write_lock.lock().await;
        let key = self.key.clone();
        self.backend
            .update(
                &self.key,
                Box::new(move |current: Option<JsonValue>| -> Result<Option<JsonValue>, StoreError> {
                    let mut notes = decode(&key, current)?;
                    if !change(&mut notes) {
                        return Ok(None);
                    }
                    Ok(Some(serde_json::to_value(notes.into_record())?))
                }),
            )
            .await
    }

    fn log_outcome(&self, op: &str, id: &str, written: bool) {
        if written {
            debug!("{op}: note {id} under '{}' saved", self.key);
        } else {
            debug!("{op}: nothing to do for note {id} under '{}'", self.key);
        }
    }
}

fn decode(key: &str, value: Option<JsonValue>) -> Result<NoteCollection, StoreError> {
    let record = match value {
        Some(value) => serde_json::from_value::<NoteRecord>(value).map_err(|source| {
            StoreError::Corrupt {
                key: key.to_string(),
                source,
            }
        })?,
        None => NoteRecord::default(),
    };
    Ok(NoteCollection::from_record(record))
}
