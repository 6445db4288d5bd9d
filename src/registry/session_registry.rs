//! Maps client identifiers to their game sessions.
//!
//! The id map sits behind an `RwLock` held only for lookup, insert and
//! removal. Each session has its own `Mutex`, so operations on different
//! sessions run in parallel and one session sees one request at a time.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::errors::{InvariantViolation, SessionError};
use crate::registry::registry_config::RegistryConfig;
use crate::session::game_result::GameResult;
use crate::session::game_session::GameSession;

/// What `get` does with an id it has never seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownSessionPolicy {
    #[default]
    CreateOnFirstReference,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered session plus its bookkeeping timestamps.
#[derive(Debug)]
pub struct SessionSlot {
    session: Mutex<GameSession>,
    created_at: DateTime<Utc>,
    last_active_ms: AtomicI64,
}

pub type SessionHandle = Arc<SessionSlot>;

impl SessionSlot {
    fn new(session: GameSession, now: DateTime<Utc>) -> Self {
        Self {
            session: Mutex::new(session),
            created_at: now,
            last_active_ms: AtomicI64::new(now.timestamp_millis()),
        }
    }

    /// Locks the session for one operation.
    pub fn lock(&self) -> Result<MutexGuard<'_, GameSession>, SessionError> {
        self.session.lock().map_err(|err| poisoned("session", err))
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.last_active_ms.load(Ordering::Relaxed))
            .unwrap_or(self.created_at)
    }

    fn touch(&self, now: DateTime<Utc>) {
        self.last_active_ms
            .fetch_max(now.timestamp_millis(), Ordering::Relaxed);
    }
}

/// A finished game kept after its session was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedGame {
    pub id: SessionId,
    pub result: GameResult,
    pub moves: String,
    pub final_fen: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
    archive: Mutex<Vec<ArchivedGame>>,
    config: RegistryConfig,
}

impl SessionRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            archive: Mutex::new(Vec::new()),
            config,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Handle for `id`. Unknown ids get a fresh session or are rejected,
    /// depending on the configured policy.
    pub fn get(&self, id: &SessionId) -> Result<SessionHandle, SessionError> {
        let now = Utc::now();
        if let Some(handle) = self.read_map()?.get(id) {
            handle.touch(now);
            return Ok(Arc::clone(handle));
        }

        if self.config.unknown_session == UnknownSessionPolicy::Reject {
            return Err(SessionError::UnknownSession(id.to_string()));
        }

        let session = self.fresh_session()?;
        let mut map = self.write_map()?;
        // Another request may have created it since the read lock was dropped.
        let handle = map.entry(id.clone()).or_insert_with(|| {
            info!("created session {id} on first reference");
            Arc::new(SessionSlot::new(session, now))
        });
        handle.touch(now);
        Ok(Arc::clone(handle))
    }

    /// Starts a new game for `id`, replacing any existing one.
    pub fn new_game(&self, id: &SessionId) -> Result<SessionHandle, SessionError> {
        let now = Utc::now();
        let handle = Arc::new(SessionSlot::new(self.fresh_session()?, now));
        let replaced = self.write_map()?.insert(id.clone(), Arc::clone(&handle));
        info!("new game for session {id}");

        if let Some(old) = replaced {
            self.archive_if_finished(id, &old, now)?;
        }
        Ok(handle)
    }

    /// Runs `op` under the session's lock. The map lock is released before
    /// `op` starts.
    pub fn with_session<T>(
        &self,
        id: &SessionId,
        op: impl FnOnce(&mut GameSession) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let handle = self.get(id)?;
        let mut session = handle.lock()?;
        let outcome = op(&mut *session);
        handle.touch(Utc::now());

        if let Err(err) = &outcome {
            if err.is_fatal() {
                warn!("session {id}: {err}");
            }
        }
        outcome
    }

    /// Drops the session for `id`, archiving it when the game had ended.
    /// Returns whether a session was registered.
    pub fn remove(&self, id: &SessionId) -> Result<bool, SessionError> {
        let removed = self.write_map()?.remove(id);
        match removed {
            Some(handle) => {
                info!("removed session {id}");
                self.archive_if_finished(id, &handle, Utc::now())?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Removes every session idle for longer than the configured timeout at
    /// `now`, returning their ids in sorted order.
    pub fn expire_idle(&self, now: DateTime<Utc>) -> Result<Vec<SessionId>, SessionError> {
        let timeout = self.config.idle_timeout();
        let expired: Vec<(SessionId, SessionHandle)> = {
            let mut map = self.write_map()?;
            let ids: Vec<SessionId> = map
                .iter()
                .filter(|(_, handle)| now.signed_duration_since(handle.last_active()) > timeout)
                .map(|(id, _)| id.clone())
                .collect();
            ids.into_iter()
                .filter_map(|id| map.remove(&id).map(|handle| (id, handle)))
                .collect()
        };

        let mut ids = Vec::with_capacity(expired.len());
        for (id, handle) in expired {
            info!("session {id} expired after idling since {}", handle.last_active());
            self.archive_if_finished(&id, &handle, now)?;
            ids.push(id);
        }
        ids.sort();
        Ok(ids)
    }

    pub fn archived(&self) -> Result<Vec<ArchivedGame>, SessionError> {
        Ok(self
            .archive
            .lock()
            .map_err(|err| poisoned("archive", err))?
            .clone())
    }

    pub fn contains(&self, id: &SessionId) -> Result<bool, SessionError> {
        Ok(self.read_map()?.contains_key(id))
    }

    pub fn len(&self) -> Result<usize, SessionError> {
        Ok(self.read_map()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, SessionError> {
        Ok(self.len()? == 0)
    }

    fn fresh_session(&self) -> Result<GameSession, SessionError> {
        match &self.config.start_fen {
            Some(fen) => GameSession::from_fen(fen),
            None => Ok(GameSession::new()),
        }
    }

    fn archive_if_finished(
        &self,
        id: &SessionId,
        handle: &SessionSlot,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        let session = handle.lock()?;
        let Some(result) = session.result() else {
            return Ok(());
        };

        let entry = ArchivedGame {
            id: id.clone(),
            result,
            moves: session.move_list(),
            final_fen: session.fen(),
            started_at: handle.created_at(),
            finished_at: now,
        };
        drop(session);

        info!("archived session {id}: {result}");
        self.archive
            .lock()
            .map_err(|err| poisoned("archive", err))?
            .push(entry);
        Ok(())
    }

    fn read_map(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<SessionId, SessionHandle>>, SessionError> {
        self.sessions.read().map_err(|err| poisoned("session map", err))
    }

    fn write_map(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<SessionId, SessionHandle>>, SessionError> {
        self.sessions.write().map_err(|err| poisoned("session map", err))
    }
}

fn poisoned<T>(what: &str, _err: PoisonError<T>) -> SessionError {
    warn!("{what} lock poisoned");
    SessionError::Internal(InvariantViolation::PoisonedLock(what.to_owned()))
}
