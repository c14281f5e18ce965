//! Microphone permission gate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

/// Checks and requests the permission recognition depends on.
#[async_trait]
pub trait PermissionGate: Send + Sync {
    fn has_permission(&self) -> bool;

    /// Ask the user. Resolves to whether permission is now granted.
    async fn request_permission(&self) -> bool;
}

pub type PermissionGateRef = Arc<dyn PermissionGate>;

/// Permission gate with a fixed answer to requests.
///
/// `granted` is the current state; `grant_on_request` is what a request
/// resolves to (and becomes the new state).
#[derive(Debug)]
pub struct StaticPermission {
    granted: AtomicBool,
    grant_on_request: bool,
}

impl StaticPermission {
    pub fn granted() -> Self {
        Self {
            granted: AtomicBool::new(true),
            grant_on_request: true,
        }
    }

    pub fn denied() -> Self {
        Self {
            granted: AtomicBool::new(false),
            grant_on_request: false,
        }
    }

    /// Not granted yet, but a request will be accepted.
    pub fn on_request() -> Self {
        Self {
            granted: AtomicBool::new(false),
            grant_on_request: true,
        }
    }
}

#[async_trait]
impl PermissionGate for StaticPermission {
    fn has_permission(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    async fn request_permission(&self) -> bool {
        self.granted.store(self.grant_on_request, Ordering::SeqCst);
        self.grant_on_request
    }
}
