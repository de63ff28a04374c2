use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{ClientId, RoomId, RoomSummary};

/// The two parts a connection can play in a room. The broadcaster
/// produces the media stream, the viewer consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Broadcaster,
    Viewer,
}

impl Role {
    pub fn opposite(self) -> Self {
        match self {
            Self::Broadcaster => Self::Viewer,
            Self::Viewer => Self::Broadcaster,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Broadcaster => f.write_str("broadcaster"),
            Self::Viewer => f.write_str("viewer"),
        }
    }
}

/// Stable admission-failure codes carried by `room-error` frames. The
/// code is the canonical signal; the accompanying message is display
/// text only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomErrorCode {
    RoomNotFound,
    InvalidKey,
    RoomFull,
    MaxRooms,
    AlreadyInRoom,
}

/// Frames a client may send. Each wire frame is a JSON object tagged by
/// `type`; anything that fails to parse is discarded by the transport.
///
/// The `offer`, `answer` and `candidate` payloads are opaque to the
/// server and forwarded as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientFrame {
    Ping,
    CreateRoom {
        name: String,
        key: String,
    },
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        room_id: RoomId,
        key: String,
    },
    LeaveRoom,
    GetRoomList,
    BroadcasterReady,
    ViewerJoin,
    #[serde(rename_all = "camelCase")]
    Offer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        viewer_id: Option<ClientId>,
        offer: Value,
    },
    Answer {
        answer: Value,
    },
    #[serde(rename_all = "camelCase")]
    IceCandidate {
        candidate: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        viewer_id: Option<ClientId>,
    },
    ChatMessage {
        message: String,
    },
}

/// Frames the server emits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerFrame {
    Pong,
    #[serde(rename_all = "camelCase")]
    RoomCreated {
        room_id: RoomId,
        name: String,
        role: Role,
    },
    #[serde(rename_all = "camelCase")]
    RoomJoined {
        room_id: RoomId,
        name: String,
        role: Role,
    },
    RoomLeft,
    RoomError {
        code: RoomErrorCode,
        error: String,
    },
    RoomList {
        rooms: Vec<RoomSummary>,
    },
    #[serde(rename_all = "camelCase")]
    ViewerJoined {
        viewer_id: ClientId,
    },
    #[serde(rename_all = "camelCase")]
    ViewerLeft {
        viewer_id: ClientId,
    },
    BroadcasterAvailable,
    BroadcasterLeft,
    NoBroadcaster,
    Offer {
        offer: Value,
    },
    #[serde(rename_all = "camelCase")]
    Answer {
        viewer_id: ClientId,
        answer: Value,
    },
    #[serde(rename_all = "camelCase")]
    IceCandidate {
        candidate: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        viewer_id: Option<ClientId>,
    },
    ChatBroadcast {
        sender: Role,
        message: String,
        timestamp: u64,
    },
}
