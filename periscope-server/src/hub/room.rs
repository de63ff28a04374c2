use std::time::SystemTime;

use periscope_core::{ClientId, Role, RoomId, RoomSummary};

use crate::admission;

/// One pairing context: a display name, the digest of the admission key
/// and the two slots. At most one broadcaster and one viewer.
pub struct Room {
    pub id: RoomId,
    pub name: String,
    key_digest: [u8; 32],
    broadcaster: Option<ClientId>,
    viewer: Option<ClientId>,
    pub created_at: SystemTime,
    /// Bumped on every join and every cleanup (re-)arm. A deferred
    /// cleanup task only destroys the room if the epoch it captured is
    /// still current, so a racing join always wins.
    cleanup_epoch: u64,
    cleanup_pending: bool,
}

impl Room {
    pub fn new(id: RoomId, name: String, key: &str) -> Self {
        Self {
            id,
            name,
            key_digest: admission::digest_key(key),
            broadcaster: None,
            viewer: None,
            created_at: SystemTime::now(),
            cleanup_epoch: 0,
            cleanup_pending: false,
        }
    }

    pub fn verify_key(&self, key: &str) -> bool {
        admission::verify_key(key, &self.key_digest)
    }

    /// Place a connection in the first free slot, broadcaster first.
    pub fn claim_slot(&mut self, id: ClientId) -> Option<Role> {
        if self.broadcaster.is_none() {
            self.broadcaster = Some(id);
            Some(Role::Broadcaster)
        } else if self.viewer.is_none() {
            self.viewer = Some(id);
            Some(Role::Viewer)
        } else {
            None
        }
    }

    /// Clear whichever slot holds `id`.
    pub fn release_slot(&mut self, id: ClientId) -> Option<Role> {
        if self.broadcaster == Some(id) {
            self.broadcaster = None;
            Some(Role::Broadcaster)
        } else if self.viewer == Some(id) {
            self.viewer = None;
            Some(Role::Viewer)
        } else {
            None
        }
    }

    pub fn role_of(&self, id: ClientId) -> Option<Role> {
        if self.broadcaster == Some(id) {
            Some(Role::Broadcaster)
        } else if self.viewer == Some(id) {
            Some(Role::Viewer)
        } else {
            None
        }
    }

    pub fn occupant(&self, role: Role) -> Option<ClientId> {
        match role {
            Role::Broadcaster => self.broadcaster,
            Role::Viewer => self.viewer,
        }
    }

    pub fn participants(&self) -> u8 {
        u8::from(self.broadcaster.is_some()) + u8::from(self.viewer.is_some())
    }

    pub fn is_full(&self) -> bool {
        self.broadcaster.is_some() && self.viewer.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.broadcaster.is_none() && self.viewer.is_none()
    }

    /// Mark the room for deferred destruction and return the epoch the
    /// timer must present when it fires.
    pub(crate) fn arm_cleanup(&mut self) -> u64 {
        self.cleanup_pending = true;
        self.cleanup_epoch += 1;
        self.cleanup_epoch
    }

    pub(crate) fn cancel_cleanup(&mut self) {
        self.cleanup_pending = false;
        self.cleanup_epoch += 1;
    }

    pub(crate) fn cleanup_matches(&self, epoch: u64) -> bool {
        self.cleanup_pending && self.cleanup_epoch == epoch
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            participants: self.participants(),
            is_full: self.is_full(),
        }
    }
}
