//! In-memory ordered list of notes.
//!
//! Position in the backing `Vec` is the single source of ordering truth.
//! `Note::index` is only trusted when loading a record (to recover order)
//! and is rewritten from position before anything leaves this type.

use crate::note_model::{Note, NoteRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteCollection {
    notes: Vec<Note>,
}

impl NoteCollection {
    /// Builds a collection from a persisted record, ordered by `index`.
    ///
    /// The sort is stable, so duplicate indices written by an older or
    /// foreign writer keep their array order. Indices are then renumbered.
    pub fn from_record(record: NoteRecord) -> Self {
        let mut notes = record.notes;
        notes.sort_by_key(|note| note.index);
        let mut collection = NoteCollection { notes };
        collection.renumber();
        collection
    }

    pub fn into_record(mut self) -> NoteRecord {
        self.renumber();
        NoteRecord { notes: self.notes }
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn into_notes(mut self) -> Vec<Note> {
        self.renumber();
        self.notes
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.notes.iter().position(|note| note.id == id)
    }

    /// Inserts `note` at position 0, shifting every other note down by one.
    pub fn prepend(&mut self, note: Note) {
        self.notes.insert(0, note);
        self.renumber();
    }

    /// Applies `edit` to the note with `id`. Returns `false` if absent.
    pub fn modify<F>(&mut self, id: &str, edit: F) -> bool
    where
        F: FnOnce(&mut Note),
    {
        match self.notes.iter_mut().find(|note| note.id == id) {
            Some(note) => {
                edit(note);
                true
            }
            None => false,
        }
    }

    /// Removes the note with `id` and compacts indices.
    pub fn remove(&mut self, id: &str) -> Option<Note> {
        let position = self.position(id)?;
        let removed = self.notes.remove(position);
        self.renumber();
        Some(removed)
    }

    /// Swaps the note with its predecessor. `false` if absent or already first.
    pub fn move_up(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(position) if position > 0 => {
                self.notes.swap(position - 1, position);
                self.renumber();
                true
            }
            _ => false,
        }
    }

    /// Swaps the note with its successor. `false` if absent or already last.
    pub fn move_down(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(position) if position + 1 < self.notes.len() => {
                self.notes.swap(position, position + 1);
                self.renumber();
                true
            }
            _ => false,
        }
    }

    fn renumber(&mut self) {
        for (position, note) in self.notes.iter_mut().enumerate() {
            note.index = position as u32;
        }
    }
}
