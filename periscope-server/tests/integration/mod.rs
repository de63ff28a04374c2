pub mod relay_tests;

use std::sync::Arc;
use std::time::Duration;

use periscope_core::{ClientFrame, ClientId, RoomId, ServerFrame};
use periscope_server::{Hub, ServerConfig};
use tokio::sync::mpsc;
use tracing::Level;

use crate::utils::MockSink;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn test_config() -> ServerConfig {
    ServerConfig::default()
}

pub fn test_hub() -> Hub {
    Hub::new(&test_config())
}

/// Register a mock connection and consume the room-list snapshot every
/// client receives on accept.
pub async fn connect(hub: &Hub) -> (ClientId, MockSink, mpsc::UnboundedReceiver<ServerFrame>) {
    let (sink, mut rx) = MockSink::new();
    let id = hub.accept(Arc::new(sink.clone())).await;
    let first = recv(&mut rx).await;
    assert!(
        matches!(first, ServerFrame::RoomList { .. }),
        "expected room-list snapshot on accept, got {first:?}"
    );
    (id, sink, rx)
}

/// Next frame, or panic after a short timeout.
pub async fn recv(rx: &mut mpsc::UnboundedReceiver<ServerFrame>) -> ServerFrame {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for frame")
        .expect("frame channel closed")
}

/// Skip frames until one matches the predicate.
pub async fn recv_where(
    rx: &mut mpsc::UnboundedReceiver<ServerFrame>,
    pred: impl Fn(&ServerFrame) -> bool,
) -> ServerFrame {
    loop {
        let frame = recv(rx).await;
        if pred(&frame) {
            return frame;
        }
    }
}

/// Discard everything currently queued.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<ServerFrame>) {
    while rx.try_recv().is_ok() {}
}

/// Create a room and return its id; trailing broadcasts are drained.
pub async fn create_room(
    hub: &Hub,
    id: ClientId,
    rx: &mut mpsc::UnboundedReceiver<ServerFrame>,
    name: &str,
    key: &str,
) -> RoomId {
    hub.handle_frame(
        id,
        ClientFrame::CreateRoom {
            name: name.to_string(),
            key: key.to_string(),
        },
    )
    .await;
    let created = recv_where(rx, |f| matches!(f, ServerFrame::RoomCreated { .. })).await;
    drain(rx);
    match created {
        ServerFrame::RoomCreated { room_id, .. } => room_id,
        _ => unreachable!(),
    }
}

/// Join a room and wait for the `room-joined` reply; trailing
/// broadcasts are drained.
pub async fn join_room(
    hub: &Hub,
    id: ClientId,
    rx: &mut mpsc::UnboundedReceiver<ServerFrame>,
    room_id: &RoomId,
    key: &str,
) {
    hub.handle_frame(
        id,
        ClientFrame::JoinRoom {
            room_id: room_id.clone(),
            key: key.to_string(),
        },
    )
    .await;
    let joined = recv_where(rx, |f| matches!(f, ServerFrame::RoomJoined { .. })).await;
    match joined {
        ServerFrame::RoomJoined { room_id: actual, .. } => assert_eq!(&actual, room_id),
        _ => unreachable!(),
    }
    drain(rx);
}

pub struct FullRoom {
    pub room_id: RoomId,
    pub broadcaster: ClientId,
    pub broadcaster_rx: mpsc::UnboundedReceiver<ServerFrame>,
    pub viewer: ClientId,
    pub viewer_rx: mpsc::UnboundedReceiver<ServerFrame>,
}

/// A hub with one occupied room: broadcaster + viewer, all queues
/// drained.
pub async fn full_room(hub: &Hub) -> FullRoom {
    let (broadcaster, _sink_b, mut broadcaster_rx) = connect(hub).await;
    let (viewer, _sink_v, mut viewer_rx) = connect(hub).await;

    let room_id = create_room(hub, broadcaster, &mut broadcaster_rx, "movie", "hunter2").await;
    join_room(hub, viewer, &mut viewer_rx, &room_id, "hunter2").await;
    drain(&mut broadcaster_rx);

    FullRoom {
        room_id,
        broadcaster,
        broadcaster_rx,
        viewer,
        viewer_rx,
    }
}
