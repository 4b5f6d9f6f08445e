//! Client-side state for the leafnote UI.
//!
//! [`NotesController`](controller::NotesController) caches notes and folders
//! and keeps them consistent with the server after every round trip.
//! [`EditorAdapter`](editor::EditorAdapter) bridges a rich-text widget to
//! debounced saves, and [`shared`] resolves public share links.

pub mod api;
pub mod controller;
pub mod editor;
pub mod shared;

pub use api::{ClientError, ClientResult, HttpNotesApi, NotesApi};
pub use controller::{NotesController, SharedController};
