//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - `FromRow` + `Serialize` entity structs matching the database rows
//! - `Deserialize` create DTOs for inserts
//! - `Deserialize` update DTOs for partial updates
//!
//! Wire JSON is camelCase.

pub mod folder;
pub mod note;
