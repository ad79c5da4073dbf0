//! # Clip Notes Core
//!
//! Storage core for a text-clipping browser extension. A user selects text
//! on a page, saves it (optionally with the page URL) and manages the saved
//! list from a popup: edit, delete, move up, move down.
//!
//! ## Features
//!
//! - **Single-record persistence**: the whole ordered list is one JSON value
//!   (`{ "notes": [...] }`) under one key
//! - **Newest first**: new notes land at index 0, everything else shifts down
//! - **Serialized mutations**: concurrent triggers (context menu and popup)
//!   cannot lose each other's writes
//! - **LMDB-backed**: durable across restarts, whole-value atomic writes
//! - **FFI-ready**: C functions exchanging JSON, for the native host shell
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use clip_notes_core::backend::MemoryBackend;
//! use clip_notes_core::events::{NoteEvent, NoteEvents};
//! use clip_notes_core::note_store::NoteStore;
//! use clip_notes_core::validation::NoteValidator;
//!
//! # async fn run() -> Result<(), clip_notes_core::error::EventError> {
//! let store = Arc::new(NoteStore::new(MemoryBackend::new(), "notes"));
//! let events = NoteEvents::new(store, NoteValidator::new(10_000));
//!
//! let notes = events
//!     .dispatch(NoteEvent::SelectionConfirmed {
//!         text: "hello".to_string(),
//!         url: None,
//!     })
//!     .await?;
//! assert_eq!(notes[0].index, 0);
//! # Ok(())
//! # }
//! ```
//!
//! ## FFI Functions
//!
//! - [`open_note_store`] - Open the store described by a JSON config
//! - [`read_all_notes`] - Current list, in display order
//! - [`dispatch_note_event`] - Apply a UI event and return the new list
//! - [`close_note_store`] - Release the store handle
//! - [`free_response`] - Free a string returned by any of the above

pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod lmdb_backend;
pub mod note_collection;
pub mod note_model;
pub mod note_store;
pub mod validation;
pub mod app_response;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::sync::Arc;

use log::{info, warn};
use tokio::runtime::{Builder, Runtime};

use crate::app_response::AppResponse;
use crate::config::StoreConfig;
use crate::events::{NoteEvent, NoteEvents};
use crate::lmdb_backend::LmdbBackend;
use crate::note_model::Note;
use crate::note_store::NoteStore;
use crate::validation::NoteValidator;

/// Store instance owned by the host across FFI calls.
///
/// Holds its own runtime so the async store can be driven from plain C
/// calls. Calls from several host threads are safe, and so are several
/// handles on the same database: each mutation is one LMDB write
/// transaction on an environment shared by every handle in the process.
pub struct NoteStoreHandle {
    runtime: Runtime,
    events: NoteEvents<LmdbBackend>,
}

impl NoteStoreHandle {
    pub fn open(config: &StoreConfig) -> Result<Self, AppResponse> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .map_err(|e| AppResponse::DatabaseError(format!("Failed to start runtime: {e}")))?;
        let backend = LmdbBackend::open(config)?;
        let store = Arc::new(NoteStore::new(backend, config.storage_key.clone()));
        let events = NoteEvents::new(store, NoteValidator::from_config(config));
        Ok(NoteStoreHandle { runtime, events })
    }

    pub fn read_all(&self) -> Result<Vec<Note>, AppResponse> {
        Ok(self.runtime.block_on(self.events.store().read_all())?)
    }

    pub fn dispatch(&self, event: NoteEvent) -> Result<Vec<Note>, AppResponse> {
        Ok(self.runtime.block_on(self.events.dispatch(event))?)
    }
}

/// Opens the note store described by `config_json`.
///
/// # Parameters
///
/// * `config_json` - Null-terminated JSON [`StoreConfig`]; `{}` uses defaults
///
/// # Returns
///
/// A pointer to the [`NoteStoreHandle`], or null if the config is invalid
/// or the database cannot be opened. Release it with [`close_note_store`].
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use clip_notes_core::{open_note_store, close_note_store};
///
/// let config = CString::new(r#"{"db_path":"extension_notes"}"#).unwrap();
/// let handle = open_note_store(config.as_ptr());
/// assert!(!handle.is_null());
/// close_note_store(handle);
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn open_note_store(config_json: *const c_char) -> *mut NoteStoreHandle {
    if config_json.is_null() {
        warn!("Null config pointer passed to open_note_store");
        return std::ptr::null_mut();
    }

    let config_str = match unsafe { CStr::from_ptr(config_json).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in config parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    let config = match StoreConfig::from_json(config_str) {
        Ok(config) => config,
        Err(e) => {
            warn!("Invalid store config: {e}");
            return std::ptr::null_mut();
        }
    };

    match NoteStoreHandle::open(&config) {
        Ok(handle) => {
            info!("Note store opened at: {}", config.lmdb_dir());
            Box::into_raw(Box::new(handle))
        }
        Err(e) => {
            warn!("Failed to open note store at {}: {e}", config.lmdb_dir());
            std::ptr::null_mut()
        }
    }
}

/// Returns every note, in display order.
///
/// # Returns
///
/// `{"Ok": "<json array of notes>"}` on success, otherwise an error
/// envelope. Free the string with [`free_response`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn read_all_notes(handle: *mut NoteStoreHandle) -> *const c_char {
    let handle = match unsafe { handle.as_ref() } {
        Some(h) => h,
        None => {
            let error = AppResponse::BadRequest("Null handle passed to read_all_notes".to_string());
            return response_to_c_string(&error);
        }
    };

    notes_response(handle.read_all())
}

/// Applies one UI event and returns the list to re-render.
///
/// # Parameters
///
/// * `handle` - Store handle from [`open_note_store`]
/// * `event_json` - Null-terminated JSON [`NoteEvent`]
///
/// # JSON Format
///
/// ```json
/// { "type": "selection-confirmed", "text": "clipped text", "url": "https://example.com" }
/// { "type": "menu-item-activated", "selectedText": "clipped text", "pageUrl": "https://example.com" }
/// { "type": "edit", "id": "<note id>", "text": "new text", "url": "" }
/// { "type": "delete", "id": "<note id>" }
/// { "type": "move-up", "id": "<note id>" }
/// { "type": "move-down", "id": "<note id>" }
/// ```
///
/// # Returns
///
/// `{"Ok": "<json array of notes>"}` after the change is persisted. Any
/// error envelope means the change was not saved.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn dispatch_note_event(
    handle: *mut NoteStoreHandle,
    event_json: *const c_char,
) -> *const c_char {
    let handle = match unsafe { handle.as_ref() } {
        Some(h) => h,
        None => {
            let error = AppResponse::BadRequest("Null handle passed to dispatch_note_event".to_string());
            return response_to_c_string(&error);
        }
    };

    let json_str = match c_ptr_to_string(event_json, "event") {
        Ok(json) => json,
        Err(error_ptr) => return error_ptr,
    };

    let event: NoteEvent = match serde_json::from_str(&json_str) {
        Ok(event) => event,
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Invalid event JSON: {e}"));
            return response_to_c_string(&error);
        }
    };

    notes_response(handle.dispatch(event))
}

/// Closes the store and frees the handle. Null is ignored.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_note_store(handle: *mut NoteStoreHandle) {
    if handle.is_null() {
        warn!("Null handle passed to close_note_store");
        return;
    }
    drop(unsafe { Box::from_raw(handle) });
    info!("Note store closed");
}

/// Frees a string returned by this library. Null is ignored.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_response(ptr: *const c_char) {
    if ptr.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(ptr as *mut c_char) });
}

fn notes_response(result: Result<Vec<Note>, AppResponse>) -> *const c_char {
    let response = match result {
        Ok(notes) => match serde_json::to_string(&notes) {
            Ok(json) => AppResponse::success(json),
            Err(e) => AppResponse::from(e),
        },
        Err(error) => {
            warn!("Note operation failed: {error}");
            error
        }
    };
    response_to_c_string(&response)
}

/// Serializes an [`AppResponse`] into a C string owned by the caller.
///
/// Returns null if serialization or C string creation fails.
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

/// Converts a C string pointer to a `String`, or an error response pointer.
fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
        return Err(response_to_c_string(&error));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}
