use serde::{Deserialize, Serialize};
use std::fmt;

/// Room identifier: `room-` followed by 8 lowercase hex characters.
/// Short enough for users to read out loud when sharing.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Mint a fresh identifier from 4 random bytes.
    pub fn generate() -> Self {
        Self(format!("room-{:08x}", rand::random::<u32>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Public entry in a room-list snapshot. Carries no secrets and no
/// connection identities.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: RoomId,
    pub name: String,
    pub participants: u8,
    pub is_full: bool,
}
