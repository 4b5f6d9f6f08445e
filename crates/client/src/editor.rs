//! Bridges a rich-text widget to debounced note saves.
//!
//! Each `(note, field)` pair has at most one pending save. A new edit
//! restarts that pair's timer; the save fires once after [`AUTOSAVE_DELAY`]
//! of quiet. Switching notes cancels the previous note's pending saves and
//! dropping the adapter cancels everything.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use leafnote_core::types::DbId;
use leafnote_db::models::note::{Note, UpdateNote};
use tokio_util::sync::CancellationToken;

use crate::controller::SaveNote;

/// Quiet period before an edit is persisted.
pub const AUTOSAVE_DELAY: Duration = Duration::from_millis(500);

/// The external rich-text editor, seen only through its serialized HTML.
pub trait RichTextWidget: Send {
    fn html(&self) -> String;
    fn set_html(&mut self, html: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveField {
    Title,
    Content,
}

impl SaveField {
    fn patch(self, value: String) -> UpdateNote {
        match self {
            SaveField::Title => UpdateNote::title(value),
            SaveField::Content => UpdateNote::content(value),
        }
    }
}

type SaveKey = (DbId, SaveField);

struct PendingSave {
    generation: u64,
    cancel: CancellationToken,
}

/// Cancellable debounce timers keyed by note and field.
pub struct AutosaveScheduler<S> {
    saver: S,
    delay: Duration,
    pending: Arc<Mutex<HashMap<SaveKey, PendingSave>>>,
    shutdown: CancellationToken,
    next_generation: u64,
}

impl<S: SaveNote + Clone> AutosaveScheduler<S> {
    pub fn new(saver: S) -> Self {
        Self::with_delay(saver, AUTOSAVE_DELAY)
    }

    pub fn with_delay(saver: S, delay: Duration) -> Self {
        Self {
            saver,
            delay,
            pending: Arc::new(Mutex::new(HashMap::new())),
            shutdown: CancellationToken::new(),
            next_generation: 0,
        }
    }

    /// (Re)start the timer for `field` of `note_id`, replacing any pending value.
    pub fn schedule(&mut self, note_id: DbId, field: SaveField, value: String) {
        self.next_generation += 1;
        let generation = self.next_generation;
        let cancel = self.shutdown.child_token();
        let key = (note_id, field);

        if let Some(previous) = self.lock_pending().insert(
            key,
            PendingSave {
                generation,
                cancel: cancel.clone(),
            },
        ) {
            previous.cancel.cancel();
        }

        let saver = self.saver.clone();
        let pending = Arc::clone(&self.pending);
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }

            // Claim the slot; a newer schedule for the same key owns it otherwise.
            {
                let mut pending = match pending.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                match pending.get(&key) {
                    Some(entry) if entry.generation == generation => {
                        pending.remove(&key);
                    }
                    _ => return,
                }
            }

            tracing::debug!(note_id = %note_id, ?field, "Autosaving note");
            if let Err(e) = saver.save(note_id, field.patch(value)).await {
                tracing::warn!(note_id = %note_id, ?field, error = %e, "Autosave failed");
            }
        });
    }

    /// Cancel pending saves for one note.
    pub fn cancel_note(&mut self, note_id: DbId) {
        let mut pending = self.lock_pending();
        for field in [SaveField::Title, SaveField::Content] {
            if let Some(entry) = pending.remove(&(note_id, field)) {
                entry.cancel.cancel();
            }
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, entry) in self.lock_pending().drain() {
            entry.cancel.cancel();
        }
    }

    pub fn pending_count(&self) -> usize {
        self.lock_pending().len()
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, HashMap<SaveKey, PendingSave>> {
        match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<S> Drop for AutosaveScheduler<S> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Keeps a [`RichTextWidget`] in step with the selected note.
pub struct EditorAdapter<W, S> {
    widget: W,
    note_id: Option<DbId>,
    scheduler: AutosaveScheduler<S>,
}

impl<W: RichTextWidget, S: SaveNote + Clone> EditorAdapter<W, S> {
    pub fn new(widget: W, saver: S) -> Self {
        Self::with_scheduler(widget, AutosaveScheduler::new(saver))
    }

    pub fn with_scheduler(widget: W, scheduler: AutosaveScheduler<S>) -> Self {
        Self {
            widget,
            note_id: None,
            scheduler,
        }
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    pub fn current_note(&self) -> Option<DbId> {
        self.note_id
    }

    pub fn scheduler(&self) -> &AutosaveScheduler<S> {
        &self.scheduler
    }

    /// Point the editor at `note`.
    ///
    /// Re-rendering the same note is a no-op. On a switch, pending saves for
    /// the previous note are dropped and the widget is reset only when its
    /// HTML differs from the stored content.
    pub fn show_note(&mut self, note: Option<&Note>) {
        let next = note.map(|n| n.id);
        if next == self.note_id {
            return;
        }

        if let Some(previous) = self.note_id {
            self.scheduler.cancel_note(previous);
        }
        self.note_id = next;

        if let Some(note) = note {
            if self.widget.html() != note.content {
                self.widget.set_html(&note.content);
            }
        }
    }

    /// Call after every widget edit.
    pub fn content_changed(&mut self) {
        if let Some(id) = self.note_id {
            let html = self.widget.html();
            self.scheduler.schedule(id, SaveField::Content, html);
        }
    }

    /// Call after every keystroke in the title field.
    pub fn title_changed(&mut self, title: &str) {
        if let Some(id) = self.note_id {
            self.scheduler.schedule(id, SaveField::Title, title.to_string());
        }
    }

    /// Tear down the editor without saving pending edits.
    pub fn close(mut self) -> W {
        self.scheduler.cancel_all();
        let Self { widget, .. } = self;
        widget
    }
}
