//! In-memory cache of notes and folders for the UI.
//!
//! State changes only through controller methods. Mutations are sent to the
//! server first and the cache is updated from the returned representation.

use std::sync::Arc;

use async_trait::async_trait;
use leafnote_core::defaults::DEFAULT_NOTE_TITLE;
use leafnote_core::types::DbId;
use leafnote_db::models::folder::{CreateFolder, FolderWithCount, UpdateFolder};
use leafnote_db::models::note::{CreateNote, NoteFilter, NoteWithFolder, UpdateNote};
use tokio::sync::Mutex;

use crate::api::{ClientError, ClientResult, NotesApi};

pub const NOTES_LOAD_ERROR: &str = "Something went wrong loading notes.";
pub const FOLDERS_LOAD_ERROR: &str = "Something went wrong loading folders.";

/// A controller shared between UI bindings and autosave tasks.
pub type SharedController<A> = Arc<Mutex<NotesController<A>>>;

pub struct NotesController<A> {
    api: Arc<A>,
    notes: Vec<NoteWithFolder>,
    folders: Vec<FolderWithCount>,
    selected_note: Option<NoteWithFolder>,
    selected_folder: Option<DbId>,
    search: String,
    loading: bool,
    error: Option<String>,
}

impl<A: NotesApi> NotesController<A> {
    /// A controller with an empty cache, marked as loading until [`load`](Self::load).
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            notes: Vec::new(),
            folders: Vec::new(),
            selected_note: None,
            selected_folder: None,
            search: String::new(),
            loading: true,
            error: None,
        }
    }

    pub fn into_shared(self) -> SharedController<A> {
        Arc::new(Mutex::new(self))
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    pub fn notes(&self) -> &[NoteWithFolder] {
        &self.notes
    }

    /// Folders, always sorted by name.
    pub fn folders(&self) -> &[FolderWithCount] {
        &self.folders
    }

    pub fn selected_note(&self) -> Option<&NoteWithFolder> {
        self.selected_note.as_ref()
    }

    pub fn selected_folder(&self) -> Option<DbId> {
        self.selected_folder
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message from the last failed round trip, cleared by the next success.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Cached notes filed in `folder_id`.
    pub fn notes_in_folder(&self, folder_id: DbId) -> impl Iterator<Item = &NoteWithFolder> {
        self.notes
            .iter()
            .filter(move |n| n.note.folder_id == Some(folder_id))
    }

    pub fn unfiled_notes(&self) -> impl Iterator<Item = &NoteWithFolder> {
        self.notes.iter().filter(|n| n.note.folder_id.is_none())
    }

    // ---- loading ----

    /// Fetch notes and folders concurrently. Loading clears once both finish.
    pub async fn load(&mut self) -> ClientResult<()> {
        self.loading = true;
        let filter = self.filter();
        let (notes, folders) = tokio::join!(self.api.list_notes(&filter), self.api.list_folders());
        self.loading = false;

        let notes_ok = self.apply_notes(notes);
        let folders_ok = self.apply_folders(folders);
        match notes_ok {
            // The folders success must not clear the notes failure.
            Err(e) => {
                self.error = Some(NOTES_LOAD_ERROR.to_string());
                Err(e)
            }
            Ok(()) => folders_ok,
        }
    }

    pub async fn refresh_notes(&mut self) -> ClientResult<()> {
        let filter = self.filter();
        let notes = self.api.list_notes(&filter).await;
        self.apply_notes(notes)
    }

    pub async fn refresh_folders(&mut self) -> ClientResult<()> {
        let folders = self.api.list_folders().await;
        self.apply_folders(folders)
    }

    /// Change the search string and re-fetch the note list.
    pub async fn set_search(&mut self, search: impl Into<String>) -> ClientResult<()> {
        self.search = search.into();
        self.refresh_notes().await
    }

    /// Change the folder filter and re-fetch the note list.
    pub async fn select_folder(&mut self, folder_id: Option<DbId>) -> ClientResult<()> {
        self.selected_folder = folder_id;
        self.refresh_notes().await
    }

    /// Select a cached note; an unknown id clears the selection.
    pub fn select_note(&mut self, note_id: Option<DbId>) {
        self.selected_note =
            note_id.and_then(|id| self.notes.iter().find(|n| n.note.id == id).cloned());
    }

    // ---- note mutations ----

    /// Create an empty note in `folder_id`, or in the selected folder when `None`.
    ///
    /// The note is prepended to the list and becomes the selection.
    pub async fn create_note(&mut self, folder_id: Option<DbId>) -> ClientResult<NoteWithFolder> {
        let input = CreateNote {
            title: Some(DEFAULT_NOTE_TITLE.to_string()),
            content: Some(String::new()),
            folder_id: folder_id.or(self.selected_folder),
        };
        let result = self.api.create_note(&input).await;
        let note = self.track(result)?;

        self.notes.insert(0, note.clone());
        self.selected_note = Some(note.clone());
        Ok(note)
    }

    pub async fn update_note(&mut self, id: DbId, patch: &UpdateNote) -> ClientResult<NoteWithFolder> {
        let result = self.api.update_note(id, patch).await;
        let updated = self.track(result)?;

        if let Some(cached) = self.notes.iter_mut().find(|n| n.note.id == id) {
            *cached = updated.clone();
        }
        if self.is_selected(id) {
            self.selected_note = Some(updated.clone());
        }
        Ok(updated)
    }

    pub async fn delete_note(&mut self, id: DbId) -> ClientResult<()> {
        let result = self.api.delete_note(id).await;
        self.track(result)?;

        self.notes.retain(|n| n.note.id != id);
        if self.is_selected(id) {
            self.selected_note = None;
        }
        Ok(())
    }

    /// Publish a note and return its share token.
    pub async fn share_note(&mut self, id: DbId) -> ClientResult<String> {
        let result = self.api.issue_share_token(id).await;
        let token = self.track(result)?;
        self.set_share_token(id, Some(token.clone()));
        Ok(token)
    }

    pub async fn unshare_note(&mut self, id: DbId) -> ClientResult<()> {
        let result = self.api.revoke_share_token(id).await;
        self.track(result)?;
        self.set_share_token(id, None);
        Ok(())
    }

    // ---- folder mutations ----

    pub async fn create_folder(&mut self, name: &str) -> ClientResult<FolderWithCount> {
        let input = CreateFolder {
            name: Some(name.to_string()),
        };
        let result = self.api.create_folder(&input).await;
        let folder = self.track(result)?;

        self.folders.push(folder.clone());
        self.sort_folders();
        Ok(folder)
    }

    pub async fn rename_folder(&mut self, id: DbId, name: &str) -> ClientResult<FolderWithCount> {
        let input = UpdateFolder {
            name: Some(name.to_string()),
        };
        let result = self.api.rename_folder(id, &input).await;
        let renamed = self.track(result)?;

        if let Some(cached) = self.folders.iter_mut().find(|f| f.folder.id == id) {
            *cached = renamed.clone();
        }
        self.sort_folders();
        Ok(renamed)
    }

    /// Delete a folder. Its notes stay, unfiled, so the note list is re-fetched.
    pub async fn delete_folder(&mut self, id: DbId) -> ClientResult<()> {
        let result = self.api.delete_folder(id).await;
        self.track(result)?;

        self.folders.retain(|f| f.folder.id != id);
        if self.selected_folder == Some(id) {
            self.selected_folder = None;
        }
        self.refresh_notes().await
    }

    // ---- private helpers ----

    fn filter(&self) -> NoteFilter {
        NoteFilter::new(Some(self.search.clone()), self.selected_folder)
    }

    fn is_selected(&self, id: DbId) -> bool {
        self.selected_note.as_ref().is_some_and(|n| n.note.id == id)
    }

    fn sort_folders(&mut self) {
        self.folders
            .sort_by(|a, b| a.folder.name.cmp(&b.folder.name));
    }

    fn set_share_token(&mut self, id: DbId, token: Option<String>) {
        if let Some(cached) = self.notes.iter_mut().find(|n| n.note.id == id) {
            cached.note.share_token = token.clone();
        }
        if let Some(selected) = self.selected_note.as_mut().filter(|n| n.note.id == id) {
            selected.note.share_token = token;
        }
    }

    fn apply_notes(&mut self, result: ClientResult<Vec<NoteWithFolder>>) -> ClientResult<()> {
        match result {
            Ok(notes) => {
                self.notes = notes;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load notes");
                self.error = Some(NOTES_LOAD_ERROR.to_string());
                Err(e)
            }
        }
    }

    fn apply_folders(&mut self, result: ClientResult<Vec<FolderWithCount>>) -> ClientResult<()> {
        match result {
            Ok(folders) => {
                self.folders = folders;
                self.sort_folders();
                self.error = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load folders");
                self.error = Some(FOLDERS_LOAD_ERROR.to_string());
                Err(e)
            }
        }
    }

    /// Record the outcome of a mutation round trip.
    fn track<T>(&mut self, result: ClientResult<T>) -> ClientResult<T> {
        match &result {
            Ok(_) => self.error = None,
            Err(e) => {
                tracing::warn!(error = %e, "Request failed");
                self.error = Some(e.to_string());
            }
        }
        result
    }
}

/// Persists editor changes for a note.
#[async_trait]
pub trait SaveNote: Send + Sync + 'static {
    async fn save(&self, id: DbId, patch: UpdateNote) -> Result<(), ClientError>;
}

#[async_trait]
impl<A: NotesApi + 'static> SaveNote for SharedController<A> {
    async fn save(&self, id: DbId, patch: UpdateNote) -> Result<(), ClientError> {
        self.lock().await.update_note(id, &patch).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    use assert_matches::assert_matches;
    use chrono::Utc;
    use leafnote_core::types::new_id;
    use leafnote_db::models::folder::Folder;
    use leafnote_db::models::note::{Note, SharedNote};

    use super::*;

    /// Scriptable in-process API that records every filter it was asked for.
    #[derive(Default)]
    struct FakeApi {
        notes: StdMutex<HashMap<DbId, NoteWithFolder>>,
        folders: StdMutex<HashMap<DbId, FolderWithCount>>,
        filters: StdMutex<Vec<NoteFilter>>,
        fail_lists: StdMutex<bool>,
        fail_folders: StdMutex<bool>,
        fail_notes: StdMutex<bool>,
    }

    fn note(title: &str, folder_id: Option<DbId>) -> NoteWithFolder {
        let now = Utc::now();
        NoteWithFolder {
            note: Note {
                id: new_id(),
                title: title.to_string(),
                content: String::new(),
                folder_id,
                share_token: None,
                created_at: now,
                updated_at: now,
            },
            folder: None,
        }
    }

    fn folder(name: &str) -> FolderWithCount {
        let now = Utc::now();
        FolderWithCount {
            folder: Folder {
                id: new_id(),
                name: name.to_string(),
                created_at: now,
                updated_at: now,
            },
            note_count: 0,
        }
    }

    fn server_error() -> ClientError {
        ClientError::Api {
            status: 500,
            body: "boom".into(),
        }
    }

    impl FakeApi {
        fn with(notes: Vec<NoteWithFolder>, folders: Vec<FolderWithCount>) -> Arc<Self> {
            let api = Self::default();
            *api.notes.lock().unwrap() = notes.into_iter().map(|n| (n.note.id, n)).collect();
            *api.folders.lock().unwrap() = folders.into_iter().map(|f| (f.folder.id, f)).collect();
            Arc::new(api)
        }

        fn missing(id: DbId) -> ClientError {
            ClientError::NotFound(id.to_string())
        }
    }

    #[async_trait]
    impl NotesApi for FakeApi {
        async fn list_folders(&self) -> ClientResult<Vec<FolderWithCount>> {
            if *self.fail_lists.lock().unwrap() || *self.fail_folders.lock().unwrap() {
                return Err(server_error());
            }
            Ok(self.folders.lock().unwrap().values().cloned().collect())
        }

        async fn create_folder(&self, input: &CreateFolder) -> ClientResult<FolderWithCount> {
            let created = folder(input.name.as_deref().unwrap_or("New Folder"));
            self.folders
                .lock()
                .unwrap()
                .insert(created.folder.id, created.clone());
            Ok(created)
        }

        async fn rename_folder(&self, id: DbId, input: &UpdateFolder) -> ClientResult<FolderWithCount> {
            let mut folders = self.folders.lock().unwrap();
            let cached = folders.get_mut(&id).ok_or_else(|| Self::missing(id))?;
            if let Some(name) = &input.name {
                cached.folder.name = name.clone();
            }
            Ok(cached.clone())
        }

        async fn delete_folder(&self, id: DbId) -> ClientResult<()> {
            self.folders
                .lock()
                .unwrap()
                .remove(&id)
                .ok_or_else(|| Self::missing(id))?;
            for n in self.notes.lock().unwrap().values_mut() {
                if n.note.folder_id == Some(id) {
                    n.note.folder_id = None;
                    n.folder = None;
                }
            }
            Ok(())
        }

        async fn list_notes(&self, filter: &NoteFilter) -> ClientResult<Vec<NoteWithFolder>> {
            self.filters.lock().unwrap().push(filter.clone());
            if *self.fail_lists.lock().unwrap() || *self.fail_notes.lock().unwrap() {
                return Err(server_error());
            }
            Ok(self
                .notes
                .lock()
                .unwrap()
                .values()
                .filter(|n| filter.folder_id.is_none() || n.note.folder_id == filter.folder_id)
                .cloned()
                .collect())
        }

        async fn get_note(&self, id: DbId) -> ClientResult<NoteWithFolder> {
            self.notes
                .lock()
                .unwrap()
                .get(&id)
                .cloned()
                .ok_or_else(|| Self::missing(id))
        }

        async fn create_note(&self, input: &CreateNote) -> ClientResult<NoteWithFolder> {
            let created = note(input.title.as_deref().unwrap_or_default(), input.folder_id);
            self.notes
                .lock()
                .unwrap()
                .insert(created.note.id, created.clone());
            Ok(created)
        }

        async fn update_note(&self, id: DbId, input: &UpdateNote) -> ClientResult<NoteWithFolder> {
            let mut notes = self.notes.lock().unwrap();
            let cached = notes.get_mut(&id).ok_or_else(|| Self::missing(id))?;
            input.title.clone().apply_required(&mut cached.note.title);
            input.content.clone().apply_required(&mut cached.note.content);
            input.folder_id.clone().apply(&mut cached.note.folder_id);
            cached.note.updated_at = Utc::now();
            Ok(cached.clone())
        }

        async fn delete_note(&self, id: DbId) -> ClientResult<()> {
            self.notes
                .lock()
                .unwrap()
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| Self::missing(id))
        }

        async fn issue_share_token(&self, id: DbId) -> ClientResult<String> {
            let mut notes = self.notes.lock().unwrap();
            let cached = notes.get_mut(&id).ok_or_else(|| Self::missing(id))?;
            let token = cached
                .note
                .share_token
                .get_or_insert_with(leafnote_core::share_token::generate_share_token);
            Ok(token.clone())
        }

        async fn revoke_share_token(&self, id: DbId) -> ClientResult<()> {
            let mut notes = self.notes.lock().unwrap();
            let cached = notes.get_mut(&id).ok_or_else(|| Self::missing(id))?;
            cached.note.share_token = None;
            Ok(())
        }

        async fn resolve_shared_note(&self, token: &str) -> ClientResult<SharedNote> {
            Err(ClientError::NotFound(token.to_string()))
        }
    }

    #[tokio::test]
    async fn load_fetches_both_lists_and_clears_loading() {
        let api = FakeApi::with(vec![note("a", None)], vec![folder("Work"), folder("Archive")]);
        let mut controller = NotesController::new(api);
        assert!(controller.is_loading());

        controller.load().await.unwrap();

        assert!(!controller.is_loading());
        assert_eq!(controller.notes().len(), 1);
        let names: Vec<_> = controller.folders().iter().map(|f| f.folder.name.as_str()).collect();
        assert_eq!(names, ["Archive", "Work"]);
        assert_eq!(controller.error(), None);
    }

    #[tokio::test]
    async fn failed_load_surfaces_message_and_clears_loading() {
        let api = FakeApi::with(vec![], vec![]);
        *api.fail_lists.lock().unwrap() = true;
        let mut controller = NotesController::new(Arc::clone(&api));

        assert_matches!(controller.load().await, Err(ClientError::Api { status: 500, .. }));
        assert!(!controller.is_loading());
        assert_eq!(controller.error(), Some(NOTES_LOAD_ERROR));

        *api.fail_lists.lock().unwrap() = false;
        controller.refresh_notes().await.unwrap();
        assert_eq!(controller.error(), None);
    }

    #[tokio::test]
    async fn folder_failure_survives_successful_notes_load() {
        let api = FakeApi::with(vec![note("a", None)], vec![folder("Work")]);
        *api.fail_folders.lock().unwrap() = true;
        let mut controller = NotesController::new(Arc::clone(&api));

        assert_matches!(controller.load().await, Err(ClientError::Api { status: 500, .. }));
        assert!(!controller.is_loading());
        assert_eq!(controller.notes().len(), 1);
        assert!(controller.folders().is_empty());
        assert_eq!(controller.error(), Some(FOLDERS_LOAD_ERROR));

        *api.fail_folders.lock().unwrap() = false;
        controller.load().await.unwrap();
        assert_eq!(controller.folders().len(), 1);
        assert_eq!(controller.error(), None);
    }

    #[tokio::test]
    async fn notes_failure_survives_successful_folders_load() {
        let api = FakeApi::with(vec![], vec![folder("Work")]);
        *api.fail_notes.lock().unwrap() = true;
        let mut controller = NotesController::new(Arc::clone(&api));

        assert_matches!(controller.load().await, Err(ClientError::Api { status: 500, .. }));
        assert_eq!(controller.folders().len(), 1);
        assert_eq!(controller.error(), Some(NOTES_LOAD_ERROR));
    }

    #[tokio::test]
    async fn search_and_folder_filter_refetch_notes() {
        let work = folder("Work");
        let work_id = work.folder.id;
        let api = FakeApi::with(vec![note("a", Some(work_id)), note("b", None)], vec![work]);
        let mut controller = NotesController::new(Arc::clone(&api));
        controller.load().await.unwrap();

        controller.set_search("plan").await.unwrap();
        controller.select_folder(Some(work_id)).await.unwrap();

        let filters = api.filters.lock().unwrap().clone();
        assert_eq!(filters.last(), Some(&NoteFilter::new(Some("plan".into()), Some(work_id))));
        assert_eq!(controller.notes().len(), 1);
        // an empty search string is not sent
        assert_eq!(filters[0].search, None);
    }

    #[tokio::test]
    async fn create_note_files_into_selected_folder_and_selects_it() {
        let work = folder("Work");
        let work_id = work.folder.id;
        let api = FakeApi::with(vec![note("older", None)], vec![work]);
        let mut controller = NotesController::new(api);
        controller.load().await.unwrap();
        controller.select_folder(Some(work_id)).await.unwrap();

        let created = controller.create_note(None).await.unwrap();

        assert_eq!(created.note.folder_id, Some(work_id));
        assert_eq!(created.note.title, "Untitled");
        assert_eq!(controller.notes()[0].note.id, created.note.id);
        assert_eq!(controller.selected_note().map(|n| n.note.id), Some(created.note.id));
    }

    #[tokio::test]
    async fn update_note_replaces_cache_and_selection_from_response() {
        let existing = note("Old", None);
        let id = existing.note.id;
        let mut controller = NotesController::new(FakeApi::with(vec![existing], vec![]));
        controller.load().await.unwrap();
        controller.select_note(Some(id));

        controller.update_note(id, &UpdateNote::title("New")).await.unwrap();

        assert_eq!(controller.notes()[0].note.title, "New");
        assert_eq!(controller.selected_note().unwrap().note.title, "New");
    }

    #[tokio::test]
    async fn failed_mutation_sets_error_and_returns_it() {
        let mut controller = NotesController::new(FakeApi::with(vec![], vec![]));
        controller.load().await.unwrap();

        let result = controller.update_note(new_id(), &UpdateNote::title("x")).await;

        assert_matches!(result, Err(ClientError::NotFound(_)));
        assert!(controller.error().is_some());
    }

    #[tokio::test]
    async fn deleting_selected_note_clears_selection() {
        let existing = note("gone", None);
        let id = existing.note.id;
        let mut controller = NotesController::new(FakeApi::with(vec![existing], vec![]));
        controller.load().await.unwrap();
        controller.select_note(Some(id));

        controller.delete_note(id).await.unwrap();

        assert!(controller.notes().is_empty());
        assert!(controller.selected_note().is_none());
    }

    #[tokio::test]
    async fn deleting_selected_folder_clears_filter_and_refetches() {
        let work = folder("Work");
        let work_id = work.folder.id;
        let filed = note("filed", Some(work_id));
        let api = FakeApi::with(vec![filed, note("loose", None)], vec![work]);
        let mut controller = NotesController::new(Arc::clone(&api));
        controller.load().await.unwrap();
        controller.select_folder(Some(work_id)).await.unwrap();
        assert_eq!(controller.notes().len(), 1);

        controller.delete_folder(work_id).await.unwrap();

        assert_eq!(controller.selected_folder(), None);
        assert!(controller.folders().is_empty());
        assert_eq!(controller.notes().len(), 2);
        assert_eq!(controller.unfiled_notes().count(), 2);
        assert_eq!(api.filters.lock().unwrap().last().unwrap().folder_id, None);
    }

    #[tokio::test]
    async fn folder_list_stays_sorted_after_create_and_rename() {
        let mut controller = NotesController::new(FakeApi::with(vec![], vec![folder("Middle")]));
        controller.load().await.unwrap();

        let zed = controller.create_folder("Zed").await.unwrap();
        controller.create_folder("Alpha").await.unwrap();
        controller.rename_folder(zed.folder.id, "Aardvark").await.unwrap();

        let names: Vec<_> = controller.folders().iter().map(|f| f.folder.name.as_str()).collect();
        assert_eq!(names, ["Aardvark", "Alpha", "Middle"]);
    }

    #[tokio::test]
    async fn share_and_unshare_update_cache_and_selection() {
        let existing = note("Draft", None);
        let id = existing.note.id;
        let mut controller = NotesController::new(FakeApi::with(vec![existing], vec![]));
        controller.load().await.unwrap();
        controller.select_note(Some(id));

        let token = controller.share_note(id).await.unwrap();
        assert_eq!(controller.notes()[0].note.share_token.as_deref(), Some(token.as_str()));
        assert_eq!(
            controller.selected_note().unwrap().note.share_token.as_deref(),
            Some(token.as_str())
        );
        assert_eq!(controller.share_note(id).await.unwrap(), token);

        controller.unshare_note(id).await.unwrap();
        assert_eq!(controller.notes()[0].note.share_token, None);
        assert_eq!(controller.selected_note().unwrap().note.share_token, None);
    }

    #[tokio::test]
    async fn notes_in_folder_view() {
        let work = folder("Work");
        let work_id = work.folder.id;
        let api = FakeApi::with(
            vec![note("a", Some(work_id)), note("b", Some(work_id)), note("c", None)],
            vec![work],
        );
        let mut controller = NotesController::new(api);
        controller.load().await.unwrap();

        assert_eq!(controller.notes_in_folder(work_id).count(), 2);
        assert_eq!(controller.unfiled_notes().count(), 1);
    }

    #[tokio::test]
    async fn shared_controller_saves_through_update_note() {
        let existing = note("Old", None);
        let id = existing.note.id;
        let shared = NotesController::new(FakeApi::with(vec![existing], vec![])).into_shared();
        shared.lock().await.load().await.unwrap();

        shared.save(id, UpdateNote::content("<p>hi</p>")).await.unwrap();

        assert_eq!(shared.lock().await.notes()[0].note.content, "<p>hi</p>");
    }
}
