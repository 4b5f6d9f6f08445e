//! Query parameter types for API handlers.

use leafnote_core::types::DbId;
use leafnote_db::models::note::NoteFilter;
use serde::Deserialize;

use crate::error::AppError;

/// Query parameters for `GET /notes` (`?search=&folderId=`).
///
/// Empty values are treated as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteListParams {
    pub search: Option<String>,
    pub folder_id: Option<String>,
}

impl TryFrom<NoteListParams> for NoteFilter {
    type Error = AppError;

    fn try_from(params: NoteListParams) -> Result<Self, Self::Error> {
        let folder_id = match params.folder_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<DbId>().map_err(|_| {
                AppError::BadRequest(format!("folderId '{raw}' is not a valid id"))
            })?),
        };
        Ok(NoteFilter::new(params.search, folder_id))
    }
}
