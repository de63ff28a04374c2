use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use periscope_core::{ClientFrame, ClientId, Role, RoomId, ServerFrame};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::error::AdmissionError;
use crate::hub::{FrameSink, Room};

/// Longest accepted chat message, in bytes.
pub const MAX_CHAT_MESSAGE_LEN: usize = 2000;

/// Longest stored room display name, in characters.
pub const MAX_ROOM_NAME_LEN: usize = 64;

struct HubState {
    rooms: HashMap<RoomId, Room>,
    /// Connection -> room back-reference, kept under the same lock as
    /// the rooms so slot and binding updates are atomic.
    bindings: HashMap<ClientId, RoomId>,
}

struct HubInner {
    connections: DashMap<ClientId, Arc<dyn FrameSink>>,
    state: Mutex<HubState>,
    next_client_id: AtomicU64,
    max_rooms: usize,
    cleanup_grace: Duration,
}

/// Process-wide signaling state: the connection registry, the room
/// table and the session coordinator. Constructed once at startup and
/// handed to every connection handler.
#[derive(Clone)]
pub struct Hub {
    inner: Arc<HubInner>,
}

impl Hub {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            inner: Arc::new(HubInner {
                connections: DashMap::new(),
                state: Mutex::new(HubState {
                    rooms: HashMap::new(),
                    bindings: HashMap::new(),
                }),
                next_client_id: AtomicU64::new(1),
                max_rooms: config.max_rooms,
                cleanup_grace: config.cleanup_grace,
            }),
        }
    }

    /// Register a freshly accepted connection and hand it the current
    /// room inventory.
    pub async fn accept(&self, sink: Arc<dyn FrameSink>) -> ClientId {
        let id = ClientId::from_index(self.inner.next_client_id.fetch_add(1, Ordering::Relaxed));
        self.inner.connections.insert(id, sink);
        info!("Connection accepted: {}", id);

        let snapshot = self.room_list().await;
        self.send(id, snapshot).await;
        id
    }

    /// Transport close. Runs the same path as an explicit leave, then
    /// drops the registry entry.
    pub async fn closed(&self, id: ClientId) {
        self.leave(id, false).await;
        self.inner.connections.remove(&id);
        info!("Connection closed: {}", id);
    }

    /// Dispatch one inbound frame. Counterpart notifications and the
    /// room-list broadcast are emitted before this returns.
    pub async fn handle_frame(&self, id: ClientId, frame: ClientFrame) {
        match frame {
            ClientFrame::Ping => self.send(id, ServerFrame::Pong).await,
            ClientFrame::CreateRoom { name, key } => self.create_room(id, &name, &key).await,
            ClientFrame::JoinRoom { room_id, key } => self.join_room(id, room_id, &key).await,
            ClientFrame::LeaveRoom => self.leave(id, true).await,
            ClientFrame::GetRoomList => {
                let snapshot = self.room_list().await;
                self.send(id, snapshot).await;
            }
            ClientFrame::BroadcasterReady => self.broadcaster_ready(id).await,
            ClientFrame::ViewerJoin => self.viewer_join(id).await,
            ClientFrame::Offer { offer, .. } => self.relay_offer(id, offer).await,
            ClientFrame::Answer { answer } => self.relay_answer(id, answer).await,
            ClientFrame::IceCandidate { candidate, .. } => {
                self.relay_candidate(id, candidate).await;
            }
            ClientFrame::ChatMessage { message } => self.relay_chat(id, message).await,
        }
    }

    async fn create_room(&self, id: ClientId, name: &str, key: &str) {
        let created = {
            let mut state = self.inner.state.lock().await;
            if state.bindings.contains_key(&id) {
                Err(AdmissionError::AlreadyInRoom)
            } else if state.rooms.len() >= self.inner.max_rooms {
                Err(AdmissionError::MaxRooms)
            } else {
                let mut room_id = RoomId::generate();
                while state.rooms.contains_key(&room_id) {
                    room_id = RoomId::generate();
                }
                let mut room = Room::new(room_id.clone(), bound_name(name), key);
                room.claim_slot(id);
                let room_name = room.name.clone();
                state.bindings.insert(id, room_id.clone());
                state.rooms.insert(room_id.clone(), room);
                Ok((room_id, room_name))
            }
        };

        match created {
            Ok((room_id, name)) => {
                info!("Room {} created by {}", room_id, id);
                self.send(
                    id,
                    ServerFrame::RoomCreated {
                        room_id,
                        name,
                        role: Role::Broadcaster,
                    },
                )
                .await;
                self.broadcast_room_list().await;
            }
            Err(err) => self.reject(id, err).await,
        }
    }

    async fn join_room(&self, id: ClientId, room_id: RoomId, key: &str) {
        let outcome = {
            let mut guard = self.inner.state.lock().await;
            let state = &mut *guard;
            if state.bindings.contains_key(&id) {
                Err(AdmissionError::AlreadyInRoom)
            } else {
                match state.rooms.get_mut(&room_id) {
                    None => Err(AdmissionError::RoomNotFound),
                    Some(room) if !room.verify_key(key) => Err(AdmissionError::InvalidKey),
                    Some(room) => match room.claim_slot(id) {
                        None => Err(AdmissionError::RoomFull),
                        Some(role) => {
                            room.cancel_cleanup();
                            let counterpart = room.occupant(role.opposite());
                            let name = room.name.clone();
                            state.bindings.insert(id, room_id.clone());
                            Ok((role, name, counterpart))
                        }
                    },
                }
            }
        };

        match outcome {
            Ok((role, name, counterpart)) => {
                info!("{} joined {} as {}", id, room_id, role);
                self.send(
                    id,
                    ServerFrame::RoomJoined {
                        room_id,
                        name,
                        role,
                    },
                )
                .await;
                if let Some(peer) = counterpart {
                    let notification = match role {
                        Role::Viewer => ServerFrame::ViewerJoined { viewer_id: id },
                        Role::Broadcaster => ServerFrame::BroadcasterAvailable,
                    };
                    self.send(peer, notification).await;
                }
                self.broadcast_room_list().await;
            }
            Err(err) => self.reject(id, err).await,
        }
    }

    /// Idempotent: clears the caller's slot if it holds one. `explicit`
    /// marks a `leave-room` frame, which gets a `room-left` reply.
    async fn leave(&self, id: ClientId, explicit: bool) {
        let (room_id, role, counterpart, cleanup_epoch) = {
            let mut state = self.inner.state.lock().await;
            let Some(room_id) = state.bindings.remove(&id) else {
                return;
            };
            let Some(room) = state.rooms.get_mut(&room_id) else {
                return;
            };
            let Some(role) = room.release_slot(id) else {
                return;
            };
            let counterpart = room.occupant(role.opposite());
            let cleanup_epoch = room.is_empty().then(|| room.arm_cleanup());
            (room_id, role, counterpart, cleanup_epoch)
        };

        info!("{} left {} ({})", id, room_id, role);
        if explicit {
            self.send(id, ServerFrame::RoomLeft).await;
        }
        if let Some(peer) = counterpart {
            let notification = match role {
                Role::Broadcaster => ServerFrame::BroadcasterLeft,
                Role::Viewer => ServerFrame::ViewerLeft { viewer_id: id },
            };
            self.send(peer, notification).await;
        }
        if let Some(epoch) = cleanup_epoch {
            self.spawn_cleanup(room_id, epoch);
        }
        self.broadcast_room_list().await;
    }

    fn spawn_cleanup(&self, room_id: RoomId, epoch: u64) {
        let hub = self.clone();
        let grace = self.inner.cleanup_grace;
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            hub.reap_room(room_id, epoch).await;
        });
    }

    /// Deadline fired: destroy the room only if it is still empty and no
    /// join has re-armed or canceled the cleanup since the timer was set.
    async fn reap_room(&self, room_id: RoomId, epoch: u64) {
        let destroyed = {
            let mut state = self.inner.state.lock().await;
            let expired = state
                .rooms
                .get(&room_id)
                .is_some_and(|room| room.is_empty() && room.cleanup_matches(epoch));
            if expired {
                state.rooms.remove(&room_id);
            }
            expired
        };
        if destroyed {
            info!("Room {} destroyed after idle grace", room_id);
            self.broadcast_room_list().await;
        }
    }

    /// A bound viewer asking the coordinator to (re-)notify the
    /// broadcaster, e.g. after the viewer reloaded its page.
    async fn viewer_join(&self, id: ClientId) {
        let target = {
            let state = self.inner.state.lock().await;
            state
                .bindings
                .get(&id)
                .and_then(|room_id| state.rooms.get(room_id))
                .filter(|room| room.role_of(id) == Some(Role::Viewer))
                .map(|room| room.occupant(Role::Broadcaster))
        };
        match target {
            Some(Some(broadcaster)) => {
                self.send(broadcaster, ServerFrame::ViewerJoined { viewer_id: id })
                    .await;
            }
            Some(None) => self.send(id, ServerFrame::NoBroadcaster).await,
            None => debug!("Dropping viewer-join from {}", id),
        }
    }

    /// A restarted broadcaster re-arming its offer path: when a viewer
    /// is already present, replay `viewer-joined`.
    async fn broadcaster_ready(&self, id: ClientId) {
        let viewer = {
            let state = self.inner.state.lock().await;
            state
                .bindings
                .get(&id)
                .and_then(|room_id| state.rooms.get(room_id))
                .filter(|room| room.role_of(id) == Some(Role::Broadcaster))
                .and_then(|room| room.occupant(Role::Viewer))
        };
        if let Some(viewer) = viewer {
            self.send(id, ServerFrame::ViewerJoined { viewer_id: viewer })
                .await;
        }
    }

    /// The sender's role and its counterpart, if both slots are live.
    async fn route(&self, id: ClientId) -> Option<(Role, ClientId)> {
        let state = self.inner.state.lock().await;
        let room_id = state.bindings.get(&id)?;
        let room = state.rooms.get(room_id)?;
        let role = room.role_of(id)?;
        let peer = room.occupant(role.opposite())?;
        Some((role, peer))
    }

    async fn relay_offer(&self, id: ClientId, offer: Value) {
        match self.route(id).await {
            Some((Role::Broadcaster, viewer)) => {
                self.send(viewer, ServerFrame::Offer { offer }).await;
            }
            _ => debug!("Dropping offer from {}", id),
        }
    }

    async fn relay_answer(&self, id: ClientId, answer: Value) {
        match self.route(id).await {
            Some((Role::Viewer, broadcaster)) => {
                self.send(
                    broadcaster,
                    ServerFrame::Answer {
                        viewer_id: id,
                        answer,
                    },
                )
                .await;
            }
            _ => debug!("Dropping answer from {}", id),
        }
    }

    /// Candidates to the viewer go without a target id; candidates to
    /// the broadcaster carry the sending viewer's id so the broadcaster
    /// can address the right peer connection.
    async fn relay_candidate(&self, id: ClientId, candidate: Value) {
        match self.route(id).await {
            Some((Role::Broadcaster, viewer)) => {
                self.send(
                    viewer,
                    ServerFrame::IceCandidate {
                        candidate,
                        viewer_id: None,
                    },
                )
                .await;
            }
            Some((Role::Viewer, broadcaster)) => {
                self.send(
                    broadcaster,
                    ServerFrame::IceCandidate {
                        candidate,
                        viewer_id: Some(id),
                    },
                )
                .await;
            }
            None => debug!("Dropping ice-candidate from {}", id),
        }
    }

    /// Relay chat to the opposite slot. The sender is identified by the
    /// slot it occupies, never by anything in the incoming frame.
    async fn relay_chat(&self, id: ClientId, message: String) {
        if message.len() > MAX_CHAT_MESSAGE_LEN {
            warn!("Dropping oversized chat message from {}", id);
            return;
        }
        match self.route(id).await {
            Some((sender, peer)) => {
                self.send(
                    peer,
                    ServerFrame::ChatBroadcast {
                        sender,
                        message,
                        timestamp: unix_millis(),
                    },
                )
                .await;
            }
            None => debug!("Dropping chat message from {}", id),
        }
    }

    async fn reject(&self, id: ClientId, err: AdmissionError) {
        debug!("Admission rejected for {}: {}", id, err);
        self.send(id, err.into_frame()).await;
    }

    /// Best-effort write: frames for unknown or dead connections are
    /// dropped.
    async fn send(&self, id: ClientId, frame: ServerFrame) {
        let sink = self
            .inner
            .connections
            .get(&id)
            .map(|entry| Arc::clone(entry.value()));
        match sink {
            Some(sink) => sink.deliver(frame).await,
            None => debug!("Dropping frame for disconnected {}", id),
        }
    }

    /// Snapshot of the current inventory, oldest room first.
    async fn room_list(&self) -> ServerFrame {
        let state = self.inner.state.lock().await;
        let mut rooms: Vec<&Room> = state.rooms.values().collect();
        rooms.sort_by_key(|room| room.created_at);
        ServerFrame::RoomList {
            rooms: rooms.into_iter().map(Room::summary).collect(),
        }
    }

    /// Emit the current inventory to every connected client.
    async fn broadcast_room_list(&self) {
        let frame = self.room_list().await;
        // Collect the sinks first so no map guard is held across an await.
        let sinks: Vec<Arc<dyn FrameSink>> = self
            .inner
            .connections
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        for sink in sinks {
            sink.deliver(frame.clone()).await;
        }
    }
}

fn bound_name(name: &str) -> String {
    name.trim().chars().take(MAX_ROOM_NAME_LEN).collect()
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}
