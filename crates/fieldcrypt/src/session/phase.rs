//! Internal state of a [`KeySession`](super::KeySession).

use std::sync::Arc;

use common::{KeyError, Readiness, SessionStatus};
use uuid::Uuid;

use crate::key::KeyHandle;

/// Session state. Every non-initial phase carries the id of the session that
/// produced it, so a fetch that outlives its session can be recognised.
#[derive(Debug)]
pub(crate) enum Phase {
    Uninitialized,
    Loading { session_id: Uuid },
    Ready { session_id: Uuid, key: Arc<KeyHandle> },
    Degraded { session_id: Uuid, reason: KeyError },
}

impl Phase {
    pub(crate) fn readiness(&self) -> Readiness {
        match self {
            Phase::Uninitialized => Readiness::Uninitialized,
            Phase::Loading { .. } => Readiness::Loading,
            Phase::Ready { .. } => Readiness::Ready,
            Phase::Degraded { .. } => Readiness::Degraded,
        }
    }

    pub(crate) fn session_id(&self) -> Option<Uuid> {
        match self {
            Phase::Uninitialized => None,
            Phase::Loading { session_id }
            | Phase::Ready { session_id, .. }
            | Phase::Degraded { session_id, .. } => Some(*session_id),
        }
    }

    pub(crate) fn key(&self) -> Option<Arc<KeyHandle>> {
        match self {
            Phase::Ready { key, .. } => Some(Arc::clone(key)),
            _ => None,
        }
    }

    pub(crate) fn is_loading_for(&self, id: Uuid) -> bool {
        matches!(self, Phase::Loading { session_id } if *session_id == id)
    }

    pub(crate) fn status(&self) -> SessionStatus {
        SessionStatus {
            state: self.readiness(),
            key_ready: matches!(self, Phase::Ready { .. }),
            key_fingerprint: match self {
                Phase::Ready { key, .. } => Some(key.fingerprint().to_owned()),
                _ => None,
            },
            degraded_reason: match self {
                Phase::Degraded { reason, .. } => Some(reason.code().to_owned()),
                _ => None,
            },
        }
    }
}
