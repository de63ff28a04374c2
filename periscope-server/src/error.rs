use periscope_core::{RoomErrorCode, ServerFrame};
use thiserror::Error;

/// Why a create or join request was refused. Non-fatal to the
/// connection; the display text is what the client UI shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AdmissionError {
    #[error("Room not found.")]
    RoomNotFound,

    #[error("Incorrect room key.")]
    InvalidKey,

    #[error("Room is full.")]
    RoomFull,

    #[error("Maximum number of rooms reached.")]
    MaxRooms,

    #[error("Already in a room.")]
    AlreadyInRoom,
}

impl AdmissionError {
    pub fn code(&self) -> RoomErrorCode {
        match self {
            Self::RoomNotFound => RoomErrorCode::RoomNotFound,
            Self::InvalidKey => RoomErrorCode::InvalidKey,
            Self::RoomFull => RoomErrorCode::RoomFull,
            Self::MaxRooms => RoomErrorCode::MaxRooms,
            Self::AlreadyInRoom => RoomErrorCode::AlreadyInRoom,
        }
    }

    pub fn into_frame(self) -> ServerFrame {
        ServerFrame::RoomError {
            code: self.code(),
            error: self.to_string(),
        }
    }
}
