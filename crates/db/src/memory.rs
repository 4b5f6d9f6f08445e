//! In-process [`NotesStore`] with the same semantics as the Postgres schema.
//!
//! Used by the test suites and by the server when `DATABASE_URL` is
//! `memory://`. Contents are lost when the process exits.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use leafnote_core::types::{new_id, DbId, Timestamp};
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::models::folder::{Folder, FolderWithCount};
use crate::models::note::{NewNote, Note, NoteFilter, NoteWithFolder, SharedNote, UpdateNote};
use crate::store::NotesStore;

#[derive(Default)]
struct Tables {
    folders: HashMap<DbId, Folder>,
    notes: HashMap<DbId, Note>,
}

impl Tables {
    fn note_count(&self, folder_id: DbId) -> i64 {
        self.notes
            .values()
            .filter(|n| n.folder_id == Some(folder_id))
            .count() as i64
    }

    fn with_count(&self, folder: &Folder) -> FolderWithCount {
        FolderWithCount {
            folder: folder.clone(),
            note_count: self.note_count(folder.id),
        }
    }

    fn with_folder(&self, note: &Note) -> NoteWithFolder {
        NoteWithFolder {
            note: note.clone(),
            folder: note.folder_id.and_then(|id| self.folders.get(&id).cloned()),
        }
    }

    fn ensure_folder(&self, folder_id: Option<DbId>) -> StoreResult<()> {
        match folder_id {
            Some(id) if !self.folders.contains_key(&id) => Err(StoreError::FolderNotFound(id)),
            _ => Ok(()),
        }
    }
}

/// A later timestamp than `previous`, even if the clock has not moved.
fn touch(previous: Timestamp) -> Timestamp {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + chrono::Duration::microseconds(1)
    }
}

fn matches_search(note: &Note, needle_lower: &str) -> bool {
    note.title.to_lowercase().contains(needle_lower)
        || note.content.to_lowercase().contains(needle_lower)
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotesStore for MemoryStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn list_folders(&self) -> StoreResult<Vec<FolderWithCount>> {
        let tables = self.tables.read().await;
        let mut folders: Vec<FolderWithCount> =
            tables.folders.values().map(|f| tables.with_count(f)).collect();
        folders.sort_by(|a, b| {
            a.folder
                .name
                .cmp(&b.folder.name)
                .then(a.folder.created_at.cmp(&b.folder.created_at))
        });
        Ok(folders)
    }

    async fn find_folder(&self, id: DbId) -> StoreResult<Option<FolderWithCount>> {
        let tables = self.tables.read().await;
        Ok(tables.folders.get(&id).map(|f| tables.with_count(f)))
    }

    async fn create_folder(&self, name: &str) -> StoreResult<FolderWithCount> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let folder = Folder {
            id: new_id(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.folders.insert(folder.id, folder.clone());
        Ok(FolderWithCount {
            folder,
            note_count: 0,
        })
    }

    async fn rename_folder(
        &self,
        id: DbId,
        name: Option<&str>,
    ) -> StoreResult<Option<FolderWithCount>> {
        let mut tables = self.tables.write().await;
        let Some(folder) = tables.folders.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = name {
            folder.name = name.to_string();
        }
        folder.updated_at = touch(folder.updated_at);
        let folder = folder.clone();
        Ok(Some(tables.with_count(&folder)))
    }

    async fn delete_folder(&self, id: DbId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.folders.remove(&id).is_none() {
            return Ok(false);
        }
        // ON DELETE SET NULL: unfile without touching updated_at.
        for note in tables.notes.values_mut() {
            if note.folder_id == Some(id) {
                note.folder_id = None;
            }
        }
        Ok(true)
    }

    async fn list_notes(&self, filter: &NoteFilter) -> StoreResult<Vec<NoteWithFolder>> {
        let tables = self.tables.read().await;
        let needle = filter.search.as_deref().map(str::to_lowercase);
        let mut notes: Vec<&Note> = tables
            .notes
            .values()
            .filter(|n| filter.folder_id.is_none() || n.folder_id == filter.folder_id)
            .filter(|n| needle.as_deref().map_or(true, |s| matches_search(n, s)))
            .collect();
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(notes.into_iter().map(|n| tables.with_folder(n)).collect())
    }

    async fn find_note(&self, id: DbId) -> StoreResult<Option<NoteWithFolder>> {
        let tables = self.tables.read().await;
        Ok(tables.notes.get(&id).map(|n| tables.with_folder(n)))
    }

    async fn create_note(&self, input: &NewNote) -> StoreResult<NoteWithFolder> {
        let mut tables = self.tables.write().await;
        tables.ensure_folder(input.folder_id)?;
        let now = Utc::now();
        let note = Note {
            id: new_id(),
            title: input.title.clone(),
            content: input.content.clone(),
            folder_id: input.folder_id,
            share_token: None,
            created_at: now,
            updated_at: now,
        };
        tables.notes.insert(note.id, note.clone());
        Ok(tables.with_folder(&note))
    }

    async fn update_note(
        &self,
        id: DbId,
        input: &UpdateNote,
    ) -> StoreResult<Option<NoteWithFolder>> {
        let mut tables = self.tables.write().await;
        if !tables.notes.contains_key(&id) {
            return Ok(None);
        }
        tables.ensure_folder(input.folder_id.value().copied())?;

        let Some(note) = tables.notes.get_mut(&id) else {
            return Ok(None);
        };
        input.title.clone().apply_required(&mut note.title);
        input.content.clone().apply_required(&mut note.content);
        input.folder_id.clone().apply(&mut note.folder_id);
        note.updated_at = touch(note.updated_at);
        let note = note.clone();
        Ok(Some(tables.with_folder(&note)))
    }

    async fn delete_note(&self, id: DbId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.notes.remove(&id).is_some())
    }

    async fn find_share_token(&self, note_id: DbId) -> StoreResult<Option<Option<String>>> {
        let tables = self.tables.read().await;
        Ok(tables.notes.get(&note_id).map(|n| n.share_token.clone()))
    }

    async fn assign_share_token(&self, note_id: DbId, token: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let shared = match tables.notes.get(&note_id) {
            Some(note) => note.share_token.is_some(),
            None => return Ok(false),
        };
        if shared {
            return Ok(false);
        }
        if tables
            .notes
            .values()
            .any(|n| n.share_token.as_deref() == Some(token))
        {
            return Err(StoreError::DuplicateShareToken);
        }
        if let Some(note) = tables.notes.get_mut(&note_id) {
            note.share_token = Some(token.to_string());
        }
        Ok(true)
    }

    async fn clear_share_token(&self, note_id: DbId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.notes.get_mut(&note_id) {
            Some(note) => {
                note.share_token = None;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_shared_note(&self, token: &str) -> StoreResult<Option<SharedNote>> {
        let tables = self.tables.read().await;
        Ok(tables
            .notes
            .values()
            .find(|n| n.share_token.as_deref() == Some(token))
            .map(|n| SharedNote {
                id: n.id,
                title: n.title.clone(),
                content: n.content.clone(),
                created_at: n.created_at,
                updated_at: n.updated_at,
            }))
    }
}
