use std::{
    cmp::Ordering,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering as AtomicOrdering},
    },
};

use entity::{User, UserPatch};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;

/// Page size applied when `_page` is given without `_limit`.
pub const DEFAULT_LIMIT: usize = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Query string accepted by the listing route.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListQuery {
    pub sector: Option<i64>,
    #[serde(rename = "_page")]
    pub page: Option<usize>,
    #[serde(rename = "_limit")]
    pub limit: Option<usize>,
    #[serde(rename = "_sort")]
    pub sort: Option<String>,
    #[serde(rename = "_order")]
    pub order: Option<SortOrder>,
}

impl ListQuery {
    pub fn is_paginated(&self) -> bool {
        self.page.is_some() || self.limit.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    #[error("user {0} already exists")]
    DuplicateId(String),
    #[error("user {0} not found")]
    NotFound(String),
    #[error("cannot sort by {0}")]
    UnsupportedSort(String),
}

#[derive(Debug, Default)]
pub struct Collection {
    users: RwLock<Vec<User>>,
    omit_total_count: AtomicBool,
}

impl Collection {
    pub fn shared(users: Vec<User>) -> Arc<Self> {
        Arc::new(Self {
            users: RwLock::new(users),
            omit_total_count: AtomicBool::new(false),
        })
    }

    /// Stop (or resume) sending `X-Total-Count` on paginated listings, like
    /// backends that never report it.
    pub fn omit_total_count(&self, omit: bool) {
        self.omit_total_count.store(omit, AtomicOrdering::Relaxed);
    }

    pub fn reports_total_count(&self) -> bool {
        !self.omit_total_count.load(AtomicOrdering::Relaxed)
    }

    pub async fn snapshot(&self) -> Vec<User> {
        self.users.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    pub async fn get(&self, id: &str) -> Option<User> {
        self.users.read().await.iter().find(|u| u.id == id).cloned()
    }

    /// Filter, sort and slice. Returns the page and the number of matches
    /// before slicing.
    pub async fn query(&self, query: &ListQuery) -> Result<(Vec<User>, usize), CollectionError> {
        let mut matching: Vec<User> = self
            .users
            .read()
            .await
            .iter()
            .filter(|u| query.sector.is_none_or(|sector| u.sector == Some(sector)))
            .cloned()
            .collect();

        match query.sort.as_deref() {
            None => {}
            Some("id") => matching.sort_by(|a, b| compare_ids(&a.id, &b.id)),
            Some("usuario") => matching.sort_by_key(|u| u.usuario.to_lowercase()),
            Some(other) => return Err(CollectionError::UnsupportedSort(other.to_string())),
        }
        if query.order == Some(SortOrder::Desc) {
            matching.reverse();
        }

        let total = matching.len();
        if query.is_paginated() {
            let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
            let page = query.page.unwrap_or(1).max(1);
            matching = matching
                .into_iter()
                .skip((page - 1).saturating_mul(limit))
                .take(limit)
                .collect();
        }
        Ok((matching, total))
    }

    pub async fn insert(&self, user: User) -> Result<User, CollectionError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.id == user.id) {
            return Err(CollectionError::DuplicateId(user.id));
        }
        users.push(user.clone());
        Ok(user)
    }

    /// Merge `patch` into the record with `id`. The id itself never changes.
    pub async fn patch(&self, id: &str, patch: &UserPatch) -> Result<User, CollectionError> {
        let mut users = self.users.write().await;
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| CollectionError::NotFound(id.to_string()))?;
        let patch = UserPatch {
            id: None,
            ..patch.clone()
        };
        user.apply(&patch);
        Ok(user.clone())
    }
}

/// Numeric order when both ids are integers, lexical otherwise.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed_users;
    use entity::Estado;

    #[tokio::test]
    async fn pages_are_sliced_after_counting() {
        let collection = Collection::shared(seed_users(7000, 25));
        let query = ListQuery {
            sector: Some(7000),
            page: Some(2),
            limit: Some(10),
            ..ListQuery::default()
        };
        let (page, total) = collection.query(&query).await.unwrap();
        assert_eq!(total, 25);
        assert_eq!(page.len(), 10);
        assert_eq!(page[0].id, "11");

        let last = ListQuery {
            page: Some(3),
            ..query
        };
        let (page, total) = collection.query(&last).await.unwrap();
        assert_eq!((page.len(), total), (5, 25));
    }

    #[tokio::test]
    async fn sector_filter_excludes_other_sectors() {
        let mut users = seed_users(7000, 3);
        users.push(User::new("99", "zoe", Estado::Activo, 8000));
        let collection = Collection::shared(users);
        let (page, total) = collection
            .query(&ListQuery {
                sector: Some(8000),
                ..ListQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(page[0].usuario, "zoe");
    }

    #[tokio::test]
    async fn latest_sorts_ids_numerically() {
        let collection = Collection::shared(seed_users(7000, 12));
        let (page, _) = collection
            .query(&ListQuery {
                sort: Some("id".into()),
                order: Some(SortOrder::Desc),
                limit: Some(1),
                ..ListQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(page[0].id, "12");
    }

    #[tokio::test]
    async fn duplicate_ids_are_refused() {
        let collection = Collection::shared(seed_users(7000, 1));
        let err = collection
            .insert(User::new("1", "otra", Estado::Activo, 7000))
            .await
            .unwrap_err();
        assert_eq!(err, CollectionError::DuplicateId("1".into()));
    }

    #[tokio::test]
    async fn patch_keeps_the_id() {
        let collection = Collection::shared(seed_users(7000, 1));
        let patch = UserPatch {
            id: Some("2".into()),
            estado: Some(Estado::Inactivo),
            ..UserPatch::default()
        };
        let updated = collection.patch("1", &patch).await.unwrap();
        assert_eq!(updated.id, "1");
        assert_eq!(updated.estado, Estado::Inactivo);
        assert_eq!(
            collection.patch("7", &patch).await.unwrap_err(),
            CollectionError::NotFound("7".into())
        );
    }

    #[test]
    fn mixed_ids_fall_back_to_lexical_order() {
        assert_eq!(compare_ids("9", "10"), Ordering::Less);
        assert_eq!(compare_ids("a9", "a10"), Ordering::Greater);
    }
}
