//! [`KeySession`]: owns the session key and degrades to pass-through without one.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized ──start()──► Loading ──ok──► Ready(KeyHandle)
//!       ▲                       └──err──► Degraded
//!       └──────────────end()─────────────────┘
//! ```
//!
//! 1. [`KeySession::start`] assigns a session id and spawns the single key
//!    fetch. Later `start` calls for the same session do nothing.
//! 2. Codec calls made while `Loading` wait for the outcome, then proceed.
//! 3. `Ready` delegates to the row/batch codecs. `Degraded` and
//!    `Uninitialized` return records unchanged. `Degraded` is terminal until
//!    [`KeySession::end`].
//! 4. `end` cancels an in-flight fetch and drops the key. An outcome that
//!    arrives for a session that has since ended is discarded.
//! 5. A fetch task that is aborted or panics settles its session as
//!    `Degraded` with a transport error, so callers never wait forever.
//!
//! Reads of the current state are lock-free (`arc-swap`); the key handle is
//! never mutated once set, so codec calls share it without locking.

mod phase;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arc_swap::ArcSwap;
use common::{KeyError, Readiness, SessionStatus};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::codec::{self, Decrypted, EncryptError, Record};
use crate::key::{self, KeyHandle, KeySource};
use crate::schema::EntityType;
use phase::Phase;

/// Explicitly owned key context for one user session at a time.
///
/// Cheap to clone; clones share the same state. Inject it into whatever data
/// access code needs to encrypt or decrypt records.
#[derive(Clone, Default)]
pub struct KeySession {
    inner: Arc<Inner>,
}

struct Inner {
    phase: ArcSwap<Phase>,
    /// Woken whenever a phase leaves `Loading`.
    settled: Notify,
    /// Serialises transitions; holds the cancel token of the in-flight fetch.
    in_flight: Mutex<Option<CancellationToken>>,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            phase: ArcSwap::from_pointee(Phase::Uninitialized),
            settled: Notify::new(),
            in_flight: Mutex::new(None),
        }
    }
}

impl std::fmt::Debug for KeySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySession")
            .field("state", &self.readiness())
            .finish()
    }
}

impl KeySession {
    /// Create a session in the `Uninitialized` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a session: fetch and import the key from `source` in the
    /// background.
    ///
    /// Returns the fetch task, or `None` if a session is already loading or
    /// settled; no second fetch is started. Must be called from within a
    /// Tokio runtime.
    pub fn start(&self, source: Arc<dyn KeySource>) -> Option<JoinHandle<()>> {
        let mut in_flight = self.lock_in_flight();
        if !matches!(**self.inner.phase.load(), Phase::Uninitialized) {
            debug!(state = %self.readiness(), "key session already started");
            return None;
        }

        let session_id = Uuid::new_v4();
        let token = CancellationToken::new();
        *in_flight = Some(token.clone());
        self.inner.phase.store(Arc::new(Phase::Loading { session_id }));
        drop(in_flight);

        // Built outside the task so an abort before the first poll still settles.
        let guard = FetchGuard {
            session: self.clone(),
            session_id,
            done: false,
        };
        let task = async move {
            debug!("fetching session key");
            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("key fetch abandoned: session ended");
                    guard.dismiss();
                    return;
                }
                outcome = key::acquire(source.as_ref()) => outcome,
            };
            guard.settle(outcome);
        };
        Some(tokio::spawn(
            task.instrument(info_span!("key_session", %session_id)),
        ))
    }

    /// End the session: cancel any in-flight fetch, drop the key, and return to
    /// `Uninitialized`. Callers waiting on the fetch are released and see
    /// pass-through behaviour.
    pub fn end(&self) {
        let mut in_flight = self.lock_in_flight();
        if let Some(token) = in_flight.take() {
            token.cancel();
        }
        let previous = self.inner.phase.swap(Arc::new(Phase::Uninitialized));
        drop(in_flight);
        self.inner.settled.notify_waiters();

        if let Some(session_id) = previous.session_id() {
            info!(%session_id, was = %previous.readiness(), "key session ended");
        }
    }

    /// Current state, without waiting.
    pub fn readiness(&self) -> Readiness {
        self.inner.phase.load().readiness()
    }

    /// Serialisable snapshot for host applications.
    pub fn status(&self) -> SessionStatus {
        self.inner.phase.load().status()
    }

    /// Id of the current session, if one was started.
    pub fn session_id(&self) -> Option<Uuid> {
        self.inner.phase.load().session_id()
    }

    /// Wait until the key fetch (if any) has resolved.
    pub async fn ready(&self) -> Readiness {
        self.settled_phase().await.readiness()
    }

    /// Encrypt `record`'s sensitive fields, or return it unchanged without a key.
    ///
    /// # Errors
    ///
    /// Propagates [`EncryptError`] from the row codec when a key is loaded.
    pub async fn encrypt_row(&self, entity: EntityType, record: Record) -> Result<Record, EncryptError> {
        match self.current_key().await {
            Some(key) => codec::encrypt_row(entity, record, &key),
            None => Ok(record),
        }
    }

    /// Encrypt a batch, or return it unchanged without a key.
    pub async fn encrypt_rows(&self, entity: EntityType, records: Vec<Record>) -> Result<Vec<Record>, EncryptError> {
        match self.current_key().await {
            Some(key) => codec::encrypt_rows(entity, records, &key),
            None => Ok(records),
        }
    }

    /// Decrypt `record`'s sensitive fields, or return it unchanged without a key.
    pub async fn decrypt_row(&self, entity: EntityType, record: Record) -> Decrypted {
        match self.current_key().await {
            Some(key) => codec::decrypt_row(entity, record, &key),
            None => Decrypted::untouched(record),
        }
    }

    /// Decrypt a query result in order, or return it unchanged without a key.
    pub async fn decrypt_rows(&self, entity: EntityType, records: Vec<Record>) -> Vec<Decrypted> {
        match self.current_key().await {
            Some(key) => codec::decrypt_rows(entity, records, &key),
            None => records.into_iter().map(Decrypted::untouched).collect(),
        }
    }

    async fn current_key(&self) -> Option<Arc<KeyHandle>> {
        let key = self.settled_phase().await.key();
        if key.is_none() {
            debug!(state = %self.readiness(), "no session key; passing record through");
        }
        key
    }

    async fn settled_phase(&self) -> Arc<Phase> {
        loop {
            // Register before checking so a transition in between is not missed.
            let notified = self.inner.settled.notified();
            let phase = self.inner.phase.load_full();
            if !matches!(*phase, Phase::Loading { .. }) {
                return phase;
            }
            notified.await;
        }
    }

    /// Apply a fetch outcome if `session_id` is still the loading session.
    fn settle(&self, session_id: Uuid, outcome: Result<KeyHandle, KeyError>) {
        let mut in_flight = self.lock_in_flight();
        if !self.inner.phase.load().is_loading_for(session_id) {
            debug!("discarding key outcome for an ended session");
            return;
        }

        let next = match outcome {
            Ok(key) => {
                info!(key_fingerprint = key.fingerprint(), "session key ready");
                Phase::Ready {
                    session_id,
                    key: Arc::new(key),
                }
            }
            Err(reason) => {
                warn!(
                    error = %reason,
                    code = reason.code(),
                    "key unavailable; field encryption disabled for this session"
                );
                Phase::Degraded { session_id, reason }
            }
        };
        self.inner.phase.store(Arc::new(next));
        *in_flight = None;
        drop(in_flight);
        self.inner.settled.notify_waiters();
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Degrades its session if the fetch task ends without an outcome, whether
/// the task was aborted or the source panicked.
struct FetchGuard {
    session: KeySession,
    session_id: Uuid,
    done: bool,
}

impl FetchGuard {
    fn settle(mut self, outcome: Result<KeyHandle, KeyError>) {
        self.done = true;
        self.session.settle(self.session_id, outcome);
    }

    fn dismiss(mut self) {
        self.done = true;
    }
}

impl Drop for FetchGuard {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        self.session.settle(
            self.session_id,
            Err(KeyError::Transport("key fetch aborted".into())),
        );
    }
}
