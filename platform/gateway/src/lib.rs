//! Access to the remote `usuarios` collection.
//!
//! The collection follows the json-server convention: id-addressed CRUD,
//! query-string filters, `_page`/`_limit` pagination and an `X-Total-Count`
//! header carrying the unpaginated size.

mod error;
mod http;

use async_trait::async_trait;
use entity::{User, UserPatch};

pub use error::{GatewayError, GatewayResult};
pub use http::{GatewayConfig, HttpUserGateway, parse_total_count};

/// Response header carrying the total number of matching records.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// One page of a paginated listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserPage {
    pub users: Vec<User>,
    pub total_records: u64,
}

#[async_trait]
pub trait UserGateway: Send + Sync {
    /// `GET {api}?sector={sector}`
    async fn list_by_sector(&self, sector: i64) -> GatewayResult<Vec<User>>;

    /// `GET {api}?sector={sector}&_limit={page_size}&_page={page}`; `page` is 1-based.
    async fn list_by_page(&self, sector: i64, page_size: u32, page: u32) -> GatewayResult<UserPage>;

    /// `GET {api}`, the whole collection regardless of sector.
    async fn list_all(&self) -> GatewayResult<Vec<User>>;

    /// `POST {api}`
    async fn create(&self, user: &User) -> GatewayResult<User>;

    /// `PUT {api}/{id}` with only the fields present in `patch`.
    async fn update(&self, id: &str, patch: &UserPatch) -> GatewayResult<User>;

    /// `GET {api}?_sort=id&_order=desc&_limit=1`
    async fn latest(&self) -> GatewayResult<Option<User>>;
}
