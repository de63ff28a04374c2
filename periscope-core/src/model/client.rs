use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque connection identifier, unique for the lifetime of the server
/// process and rendered as `client-<n>` on the wire.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ClientId(u64);

impl ClientId {
    pub fn from_index(index: u64) -> Self {
        Self(index)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

impl From<ClientId> for String {
    fn from(id: ClientId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for ClientId {
    type Error = InvalidClientId;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.strip_prefix("client-")
            .and_then(|n| n.parse().ok())
            .map(Self)
            .ok_or(InvalidClientId)
    }
}

#[derive(Debug)]
pub struct InvalidClientId;

impl fmt::Display for InvalidClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected an identifier of the form client-<n>")
    }
}

impl std::error::Error for InvalidClientId {}
