//! Records exchanged with the remote `usuarios` collection.

pub mod user;

pub use user::{Estado, User, UserDraft, UserPatch};
