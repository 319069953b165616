//! In-memory stand-in for the remote `usuarios` collection.
//!
//! Serves the same json-server style routes the gateway talks to, so the
//! admin CLI can run without the real backend and the integration tests have
//! something real to hit.

mod collection;
mod routes;

use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use entity::{Estado, User};
use tokio::{net::TcpListener, task::JoinHandle};
use tracing::warn;

pub use collection::{Collection, CollectionError, ListQuery, SortOrder, compare_ids};
pub use routes::{COLLECTION_PATH, router};

pub type SharedCollection = Arc<Collection>;

const SAMPLE_NAMES: [&str; 8] = [
    "ana", "bruno", "carla", "diego", "elena", "fabian", "gloria", "hector",
];

/// Generate `count` users in `sector` with ids `1..=count`. Every fourth user
/// starts out inactive.
pub fn seed_users(sector: i64, count: usize) -> Vec<User> {
    (1..=count)
        .map(|n| {
            let name = SAMPLE_NAMES[(n - 1) % SAMPLE_NAMES.len()];
            let estado = if n % 4 == 0 {
                Estado::Inactivo
            } else {
                Estado::Activo
            };
            User::new(n.to_string(), format!("{name}{n}"), estado, sector)
        })
        .collect()
}

/// Mock collection bound to an ephemeral localhost port. The server task is
/// aborted on drop.
#[derive(Debug)]
pub struct MockServer {
    addr: SocketAddr,
    collection: SharedCollection,
    task: JoinHandle<()>,
}

impl MockServer {
    pub async fn start(users: Vec<User>) -> anyhow::Result<Self> {
        let collection = Collection::shared(users);
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .context("failed to bind mock collection")?;
        let addr = listener.local_addr()?;
        let app = router(collection.clone());
        let task = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app.into_make_service()).await {
                warn!(%err, "mock collection stopped");
            }
        });
        Ok(Self {
            addr,
            collection,
            task,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Full collection endpoint, suitable as the gateway's `api_url`.
    pub fn collection_url(&self) -> String {
        format!("http://{}{}", self.addr, COLLECTION_PATH)
    }

    pub fn collection(&self) -> &SharedCollection {
        &self.collection
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
