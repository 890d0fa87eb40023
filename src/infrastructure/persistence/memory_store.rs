//! In-process implementation of both store traits.
//!
//! Used by integration tests and local experiments. Enforces the same
//! constraints the PostgreSQL schema does: unique short codes, one link per
//! owner and destination, clicks referencing a live link, and a click limit
//! that never goes below zero.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::{Click, NewClick, NewShortLink, ShortLink};
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::error::AppError;

#[derive(Default)]
struct State {
    links: HashMap<Uuid, ShortLink>,
    codes: HashMap<String, Uuid>,
    clicks: Vec<Click>,
}

/// Store kept entirely in memory.
///
/// Counts calls to [`LinkRepository::find_by_code`] so tests can check that a
/// cached code is not read from the store again.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
    find_by_code_calls: AtomicUsize,
    pending_click_failures: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `find_by_code` calls served so far.
    pub fn find_by_code_calls(&self) -> usize {
        self.find_by_code_calls.load(Ordering::SeqCst)
    }

    /// Makes the next `count` click inserts fail with a transient error.
    pub fn fail_next_click_inserts(&self, count: usize) {
        self.pending_click_failures.store(count, Ordering::SeqCst);
    }

    /// Current click limit of a link, if the link exists.
    pub async fn click_limit_of(&self, id: Uuid) -> Option<Option<i32>> {
        self.state.read().await.links.get(&id).map(|l| l.click_limit)
    }

    pub async fn link_count(&self) -> usize {
        self.state.read().await.links.len()
    }

    pub async fn click_count(&self) -> usize {
        self.state.read().await.clicks.len()
    }

    fn take_click_failure(&self) -> bool {
        self.pending_click_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl LinkRepository for InMemoryStore {
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let mut state = self.state.write().await;

        if state.codes.contains_key(&new_link.short_code) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "short_links_short_code_key" }),
            ));
        }
        if state
            .links
            .values()
            .any(|l| l.owner_id == new_link.owner_id && l.destination == new_link.destination)
        {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "short_links_owner_destination_key" }),
            ));
        }

        let link = new_link.into_link(Uuid::new_v4(), Utc::now());
        state.codes.insert(link.short_code.clone(), link.id);
        state.links.insert(link.id, link.clone());

        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        self.find_by_code_calls.fetch_add(1, Ordering::SeqCst);

        let state = self.state.read().await;
        Ok(state
            .codes
            .get(code)
            .and_then(|id| state.links.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ShortLink>, AppError> {
        Ok(self.state.read().await.links.get(&id).cloned())
    }

    async fn find_by_owner_and_destination(
        &self,
        owner_id: Uuid,
        destination: &str,
    ) -> Result<Option<ShortLink>, AppError> {
        Ok(self
            .state
            .read()
            .await
            .links
            .values()
            .find(|l| l.owner_id == owner_id && l.destination == destination)
            .cloned())
    }

    async fn count_by_owner(&self, owner_id: Uuid) -> Result<i64, AppError> {
        let state = self.state.read().await;
        Ok(state.links.values().filter(|l| l.owner_id == owner_id).count() as i64)
    }

    async fn decrement_click_limit(&self, id: Uuid) -> Result<Option<i32>, AppError> {
        let mut state = self.state.write().await;

        let Some(link) = state.links.get_mut(&id) else {
            return Ok(None);
        };

        match link.click_limit {
            Some(limit) if limit > 0 => {
                link.click_limit = Some(limit - 1);
                Ok(link.click_limit)
            }
            _ => Ok(None),
        }
    }

    async fn delete_with_clicks(&self, id: Uuid) -> Result<Option<String>, AppError> {
        let mut state = self.state.write().await;

        state.clicks.retain(|c| c.short_link_id != id);
        let removed = state.links.remove(&id);
        if let Some(link) = &removed {
            state.codes.remove(&link.short_code);
        }

        Ok(removed.map(|l| l.short_code))
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[async_trait]
impl ClickRepository for InMemoryStore {
    async fn insert_click(&self, new_click: NewClick) -> Result<Click, AppError> {
        if self.take_click_failure() {
            return Err(AppError::internal("Database error", json!({})));
        }

        let mut state = self.state.write().await;

        if !state.links.contains_key(&new_click.short_link_id) {
            return Err(AppError::not_found(
                "Short link no longer exists",
                json!({ "short_link_id": new_click.short_link_id }),
            ));
        }

        let click = new_click.into_click(Uuid::new_v4());
        state.clicks.push(click.clone());

        Ok(click)
    }

    async fn count_by_link_id(&self, link_id: Uuid) -> Result<i64, AppError> {
        let state = self.state.read().await;
        Ok(state
            .clicks
            .iter()
            .filter(|c| c.short_link_id == link_id)
            .count() as i64)
    }
}
