//! Domain primitives for leafnote.
//!
//! Pure types and rules with no I/O, shared by the data layer, the HTTP
//! service and the client.

pub mod defaults;
pub mod error;
pub mod patch;
pub mod share_token;
pub mod types;
