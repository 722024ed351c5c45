use crate::domain::model::LoadedTable;
use axum::http::{header, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "finder_session";

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub loaded: LoadedTable,
    pub uploaded_at: DateTime<Utc>,
}

/// Uploaded tables keyed by session id. The only state shared between requests.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, UploadedFile>>>,
    ttl: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(ttl: Duration, max_sessions: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn new_session_id() -> String {
        Uuid::new_v4().to_string()
    }

    fn is_expired(&self, file: &UploadedFile, now: DateTime<Utc>) -> bool {
        now - file.uploaded_at > self.ttl
    }

    pub async fn insert(&self, session_id: &str, file: UploadedFile) {
        let now = Utc::now();
        let mut sessions = self.inner.write().await;

        let before = sessions.len();
        sessions.retain(|_, f| now - f.uploaded_at <= self.ttl);
        if sessions.len() < before {
            tracing::debug!("Purged {} expired sessions", before - sessions.len());
        }

        // 滿了就淘汰最舊的
        while !sessions.contains_key(session_id) && sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, f)| f.uploaded_at)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    tracing::debug!("Evicting session {}", id);
                    sessions.remove(&id);
                }
                None => break,
            }
        }

        sessions.insert(session_id.to_string(), file);
    }

    pub async fn get(&self, session_id: &str) -> Option<UploadedFile> {
        let sessions = self.inner.read().await;
        sessions
            .get(session_id)
            .filter(|f| !self.is_expired(f, Utc::now()))
            .cloned()
    }

    /// Live (not expired) session with this id.
    pub async fn contains(&self, session_id: &str) -> bool {
        let sessions = self.inner.read().await;
        sessions
            .get(session_id)
            .is_some_and(|f| !self.is_expired(f, Utc::now()))
    }

    pub async fn remove(&self, session_id: &str) -> bool {
        self.inner.write().await.remove(session_id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

pub fn session_cookie(session_id: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, session_id
    )
}
