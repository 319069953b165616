//! Usuarios directory.
//!
//! [`UserDirectory`] owns the list shown by the admin screen: it loads users
//! through a [`platform_gateway::UserGateway`], filters and paginates them in
//! memory, and runs the create, edit and deactivate workflows, leaving
//! [`Notice`]s behind for whoever renders the result.

mod directory;
mod error;
mod filter;
mod notice;
mod pagination;
mod validation;

pub use directory::{DirectoryConfig, LoadStatus, Modal, UserDirectory};
pub use error::{DirectoryError, ValidationError};
pub use filter::{filter_users, matches};
pub use notice::{Notice, Severity};
pub use pagination::{PageInfo, paginate};
pub use validation::{check_create, check_edit, check_unique_id};
