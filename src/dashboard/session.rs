use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::info;

use super::{AdminDashboard, MountFlag};
use crate::auth::AdminToken;
use crate::store::CertificateStore;

/// Dashboards kept when no explicit capacity is configured
pub const DEFAULT_MAX_SESSIONS: usize = 64;

/// A mounted dashboard shared between requests carrying the same token
#[derive(Clone)]
pub struct DashboardHandle {
    pub dashboard: Arc<Mutex<AdminDashboard>>,
    pub mount: MountFlag,
}

struct SessionEntry {
    handle: DashboardHandle,
    last_used: AtomicU64,
}

/// One dashboard per admin token, created on first use. Entries leave on
/// logout, or when the registry is full and the entry is the least recently used.
pub struct SessionRegistry {
    store: Arc<dyn CertificateStore>,
    capacity: usize,
    clock: AtomicU64,
    sessions: RwLock<HashMap<AdminToken, SessionEntry>>,
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn CertificateStore>) -> Self {
        Self::with_capacity(store, DEFAULT_MAX_SESSIONS)
    }

    pub fn with_capacity(store: Arc<dyn CertificateStore>, capacity: usize) -> Self {
        Self {
            store,
            capacity: capacity.max(1),
            clock: AtomicU64::new(0),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    /// Existing dashboard for this token, or a freshly mounted one
    pub async fn open(&self, token: &AdminToken) -> DashboardHandle {
        // Fast path: try read lock
        {
            let sessions = self.sessions.read().await;
            if let Some(entry) = sessions.get(token) {
                entry.last_used.store(self.tick(), Ordering::Relaxed);
                return entry.handle.clone();
            }
        }

        let mount = MountFlag::mounted();
        let dashboard = AdminDashboard::mount(self.store.clone(), mount.clone()).await;
        let handle = DashboardHandle {
            dashboard: Arc::new(Mutex::new(dashboard)),
            mount,
        };

        let mut sessions = self.sessions.write().await;

        // Another request may have mounted one while we were loading
        if let Some(entry) = sessions.get(token) {
            handle.mount.unmount();
            entry.last_used.store(self.tick(), Ordering::Relaxed);
            return entry.handle.clone();
        }

        while sessions.len() >= self.capacity {
            if !evict_least_recent(&mut sessions) {
                break;
            }
        }

        sessions.insert(
            token.clone(),
            SessionEntry {
                handle: handle.clone(),
                last_used: AtomicU64::new(self.tick()),
            },
        );
        info!(sessions = sessions.len(), "admin dashboard opened");
        handle
    }

    /// Unmount and forget the dashboard for this token. `false` if none was open.
    pub async fn close(&self, token: &AdminToken) -> bool {
        let removed = self.sessions.write().await.remove(token);
        match removed {
            Some(entry) => {
                entry.handle.mount.unmount();
                info!("admin dashboard closed");
                true
            }
            None => false,
        }
    }

    pub async fn contains(&self, token: &AdminToken) -> bool {
        self.sessions.read().await.contains_key(token)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn evict_least_recent(sessions: &mut HashMap<AdminToken, SessionEntry>) -> bool {
    let oldest = sessions
        .iter()
        .min_by_key(|(_, entry)| entry.last_used.load(Ordering::Relaxed))
        .map(|(token, _)| token.clone());

    match oldest.and_then(|token| sessions.remove(&token)) {
        Some(entry) => {
            entry.handle.mount.unmount();
            info!("evicted least recently used admin dashboard");
            true
        }
        None => false,
    }
}
