//! Three-state field for partial updates.
//!
//! A JSON PATCH body distinguishes a field that is absent (leave the stored
//! value alone), a field that is explicitly `null` (clear it), and a field
//! carrying a value (set it). `Option<T>` collapses the first two, so update
//! DTOs use [`Patch<T>`] with `#[serde(default)]` instead:
//!
//! ```
//! use leafnote_core::patch::Patch;
//!
//! #[derive(serde::Deserialize)]
//! struct Body {
//!     #[serde(default)]
//!     folder_id: Patch<u32>,
//! }
//!
//! let absent: Body = serde_json::from_str("{}").unwrap();
//! let null: Body = serde_json::from_str(r#"{"folder_id": null}"#).unwrap();
//! let set: Body = serde_json::from_str(r#"{"folder_id": 7}"#).unwrap();
//!
//! assert_eq!(absent.folder_id, Patch::Unchanged);
//! assert_eq!(null.folder_id, Patch::Null);
//! assert_eq!(set.folder_id, Patch::Value(7));
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    /// Field was not present in the request.
    Unchanged,
    /// Field was present and explicitly `null`.
    Null,
    /// Field was present with a value.
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Unchanged
    }
}

impl<T> Patch<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Patch::Unchanged)
    }

    pub fn as_ref(&self) -> Patch<&T> {
        match self {
            Patch::Unchanged => Patch::Unchanged,
            Patch::Null => Patch::Null,
            Patch::Value(v) => Patch::Value(v),
        }
    }

    /// The carried value, if any. `Null` and `Unchanged` both yield `None`.
    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }

    /// `None` when unchanged, `Some(None)` when cleared, `Some(Some(v))` when set.
    pub fn into_option(self) -> Option<Option<T>> {
        match self {
            Patch::Unchanged => None,
            Patch::Null => Some(None),
            Patch::Value(v) => Some(Some(v)),
        }
    }

    /// Apply to a nullable stored field.
    pub fn apply(self, target: &mut Option<T>) {
        if let Some(next) = self.into_option() {
            *target = next;
        }
    }

    /// Apply to a non-nullable stored field. `Null` leaves it unchanged.
    pub fn apply_required(self, target: &mut T) {
        if let Patch::Value(v) = self {
            *target = v;
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

/// `Unchanged` must be skipped by the containing struct
/// (`skip_serializing_if = "Patch::is_unchanged"`); if it is not, it is
/// written as `null`.
impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::Value(v) => serializer.serialize_some(v),
            Patch::Unchanged | Patch::Null => serializer.serialize_none(),
        }
    }
}
