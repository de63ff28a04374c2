use async_trait::async_trait;
use periscope_core::ServerFrame;

/// Write side of one client connection. The WebSocket transport
/// implements this over the connection's outbound queue; tests
/// substitute a capturing mock.
#[async_trait]
pub trait FrameSink: Send + Sync {
    /// Best-effort delivery. A sink whose connection has died swallows
    /// the frame; the transport's close event does the cleanup.
    async fn deliver(&self, frame: ServerFrame);
}
