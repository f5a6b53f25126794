use crate::config::Config;
use crate::core::{fetch_route, DirectionsClient, Locator};
use crate::models::{Coordinate, DecodedPath, RouteQuery, RouteStatus};
use anyhow::Error;
use chrono::{DateTime, Utc};
use futures::future::{AbortHandle, Abortable};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// What a client currently has on screen.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub status: RouteStatus,
    pub origin: Option<Coordinate>,
    pub path: DecodedPath,
    pub failure: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            status: RouteStatus::Idle,
            origin: None,
            path: Vec::new(),
            failure: None,
            updated_at: None,
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    /// The locator had no position, nothing was fetched.
    NoOrigin,
    /// A newer refresh started before this one finished.
    Superseded,
    Committed(Snapshot),
}

#[derive(Default)]
struct State {
    generation: u64,
    in_flight: Option<AbortHandle>,
    // Last status that is not `Fetching`.
    settled: RouteStatus,
    snapshot: Snapshot,
}

impl State {
    fn settle(&mut self, status: RouteStatus) {
        self.settled = status;
        self.snapshot.status = status;
    }

    /// Starts a new generation, aborting whatever is in flight.
    fn supersede(&mut self, next: Option<AbortHandle>) -> u64 {
        self.generation += 1;
        if let Some(previous) = std::mem::replace(&mut self.in_flight, next) {
            previous.abort();
        }
        self.generation
    }
}

/// Route state owned by a single client. Only the most recent refresh may
/// commit, older in-flight fetches are aborted.
#[derive(Default)]
pub struct RouteSession {
    state: Mutex<State>,
}

// Puts the session back to its settled status when a refresh is dropped
// before it finishes.
struct PendingRefresh<'a> {
    session: &'a RouteSession,
    generation: u64,
    done: bool,
}

impl Drop for PendingRefresh<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        let mut state = self.session.lock();
        if state.generation == self.generation {
            log::warn!("route refresh abandoned before completion");
            state.in_flight = None;
            let settled = state.settled;
            state.snapshot.status = settled;
        }
    }
}

impl RouteSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot.clone()
    }

    pub async fn refresh<L, C>(&self, locator: &L, client: &C, destination: Coordinate) -> Result<Outcome, Error>
    where
        L: Locator,
        C: DirectionsClient,
    {
        let origin = match locator.locate().await? {
            Some(origin) => origin,
            None => {
                log::warn!("no origin available, route to {} not fetched", destination);
                let mut state = self.lock();
                state.supersede(None);
                state.settle(RouteStatus::NoOrigin);
                return Ok(Outcome::NoOrigin);
            }
        };

        let (handle, registration) = AbortHandle::new_pair();
        let generation = {
            let mut state = self.lock();
            state.snapshot.status = RouteStatus::Fetching;
            state.supersede(Some(handle))
        };
        let mut pending = PendingRefresh {
            session: self,
            generation,
            done: false,
        };

        let query = RouteQuery { origin, destination };
        let res = Abortable::new(fetch_route(client, &query), registration).await;
        pending.done = true;
        let res = match res {
            Ok(res) => res,
            Err(_) => {
                log::warn!("route {} -> {} superseded", origin, destination);
                return Ok(Outcome::Superseded);
            }
        };

        let mut state = self.lock();
        if state.generation != generation {
            log::warn!("route {} -> {} superseded", origin, destination);
            return Ok(Outcome::Superseded);
        }
        state.in_flight = None;
        match res {
            Ok(path) => {
                log::info!("route {} -> {} committed with {} points", origin, destination, path.len());
                let status = if path.is_empty() { RouteStatus::NoRoute } else { RouteStatus::Succeeded };
                state.snapshot = Snapshot {
                    status,
                    origin: Some(origin),
                    path,
                    failure: None,
                    updated_at: Some(Utc::now()),
                };
                state.settled = status;
                Ok(Outcome::Committed(state.snapshot.clone()))
            }
            Err(e) => {
                log::error!("route {} -> {} failed: {}", origin, destination, e);
                state.settle(RouteStatus::Failed);
                state.snapshot.failure = Some(e.to_string());
                Err(e.into())
            }
        }
    }
}

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

struct Entry {
    session: Arc<RouteSession>,
    last_seen: Instant,
}

/// Route sessions keyed by client id.
///
/// A session unused for longer than the ttl is dropped. When the map is full
/// the least recently used session makes room for a new one.
#[derive(Clone)]
pub struct Sessions {
    inner: Arc<Mutex<HashMap<String, Entry>>>,
    ttl: Duration,
    capacity: usize,
}

impl Default for Sessions {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL, DEFAULT_MAX_SESSIONS)
    }
}

impl Sessions {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.session_ttl, config.max_sessions)
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &str) -> Option<Arc<RouteSession>> {
        self.get_at(id, Instant::now())
    }

    pub fn get_or_create(&self, id: &str) -> Arc<RouteSession> {
        self.get_or_create_at(id, Instant::now())
    }

    fn get_at(&self, id: &str, now: Instant) -> Option<Arc<RouteSession>> {
        let mut entries = self.entries();
        if let Some(entry) = entries.get_mut(id) {
            if now.duration_since(entry.last_seen) < self.ttl {
                entry.last_seen = now;
                return Some(entry.session.clone());
            }
        }
        entries.remove(id);
        None
    }

    fn get_or_create_at(&self, id: &str, now: Instant) -> Arc<RouteSession> {
        let mut entries = self.entries();
        if let Some(entry) = entries.get_mut(id) {
            if now.duration_since(entry.last_seen) < self.ttl {
                entry.last_seen = now;
                return entry.session.clone();
            }
        }

        let ttl = self.ttl;
        entries.retain(|_, entry| now.duration_since(entry.last_seen) < ttl);
        if entries.len() >= self.capacity {
            let oldest = entries.iter().min_by_key(|(_, entry)| entry.last_seen).map(|(id, _)| id.clone());
            if let Some(oldest) = oldest {
                log::warn!("{} sessions held, evicting {}", entries.len(), oldest);
                entries.remove(&oldest);
            }
        }

        let session = Arc::new(RouteSession::new());
        entries.insert(
            id.to_owned(),
            Entry {
                session: session.clone(),
                last_seen: now,
            },
        );
        session
    }
}
