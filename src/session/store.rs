// src/session/store.rs
//! In-memory sessions keyed by browser cookie. Nothing is persisted.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use super::controller::SessionController;
use crate::assessment::AssessmentService;
use crate::validator::HostMatching;

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

struct Entry {
    controller: Arc<SessionController>,
    last_seen: Instant,
}

pub struct SessionStore {
    service: Arc<dyn AssessmentService>,
    host_matching: HostMatching,
    idle_timeout: Duration,
    max_sessions: usize,
    sessions: Mutex<HashMap<Uuid, Entry>>,
}

impl SessionStore {
    pub fn new(service: Arc<dyn AssessmentService>, host_matching: HostMatching) -> Self {
        Self {
            service,
            host_matching,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            max_sessions: DEFAULT_MAX_SESSIONS,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// At capacity, the least recently seen session makes room for a new one
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    /// Existing session for `id`, or a fresh one under a new id
    pub async fn get_or_create(&self, id: Option<Uuid>) -> (Uuid, Arc<SessionController>) {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();

        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < self.idle_timeout);
        if sessions.len() < before {
            info!("Dropped {} idle sessions", before - sessions.len());
        }

        if let Some(id) = id {
            if let Some(entry) = sessions.get_mut(&id) {
                entry.last_seen = now;
                return (id, entry.controller.clone());
            }
        }

        if sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id);
            if let Some(oldest) = oldest {
                sessions.remove(&oldest);
                info!("Session limit reached, evicted {}", oldest);
            }
        }

        let id = Uuid::new_v4();
        let controller = Arc::new(SessionController::new(
            self.service.clone(),
            self.host_matching,
        ));
        sessions.insert(
            id,
            Entry {
                controller: controller.clone(),
                last_seen: now,
            },
        );
        (id, controller)
    }

    pub async fn get(&self, id: &Uuid) -> Option<Arc<SessionController>> {
        self.sessions
            .lock()
            .await
            .get(id)
            .map(|entry| entry.controller.clone())
    }

    pub async fn remove(&self, id: &Uuid) -> bool {
        self.sessions.lock().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::{AssessmentRequest, AssessmentResult};
    use crate::errors::ClientError;
    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    struct Unused;

    #[async_trait]
    impl AssessmentService for Unused {
        async fn analyze(
            &self,
            _request: &AssessmentRequest,
            _cancel: &CancellationToken,
        ) -> Result<AssessmentResult, ClientError> {
            Err(ClientError::Unreachable("unused".into()))
        }
    }

    fn store() -> SessionStore {
        SessionStore::new(Arc::new(Unused), HostMatching::Substring)
    }

    #[tokio::test]
    async fn test_reuses_known_session() {
        let store = store();
        let (id, first) = store.get_or_create(None).await;
        let (same_id, second) = store.get_or_create(Some(id)).await;
        assert_eq!(id, same_id);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_id_gets_fresh_session() {
        let store = store();
        let stale = Uuid::new_v4();
        let (id, _) = store.get_or_create(Some(stale)).await;
        assert_ne!(id, stale);
        assert!(store.get(&stale).await.is_none());
        assert!(store.remove(&id).await);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_idle_sessions_are_dropped() {
        let store = store().with_idle_timeout(Duration::from_millis(10));
        let (id, _) = store.get_or_create(None).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        let (new_id, _) = store.get_or_create(Some(id)).await;
        assert_ne!(id, new_id);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_is_capped() {
        let store = store().with_max_sessions(2);
        let (first, _) = store.get_or_create(None).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let (second, _) = store.get_or_create(None).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let (third, _) = store.get_or_create(None).await;

        assert_eq!(store.len().await, 2);
        assert!(store.get(&first).await.is_none());
        assert!(store.get(&second).await.is_some());
        assert!(store.get(&third).await.is_some());
    }
}
