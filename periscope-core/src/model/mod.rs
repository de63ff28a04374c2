mod client;
mod room;
mod signaling;

pub use client::ClientId;
pub use room::{RoomId, RoomSummary};
pub use signaling::{ClientFrame, Role, RoomErrorCode, ServerFrame};
