use periscope_core::{ClientFrame, ServerFrame};

use crate::integration::{connect, drain, full_room, init_tracing, recv, recv_where, test_hub};

#[tokio::test]
async fn test_viewer_join_renotifies_broadcaster() {
    init_tracing();
    let hub = test_hub();
    let mut room = full_room(&hub).await;

    hub.handle_frame(room.viewer, ClientFrame::ViewerJoin).await;

    match recv(&mut room.broadcaster_rx).await {
        ServerFrame::ViewerJoined { viewer_id } => assert_eq!(viewer_id, room.viewer),
        other => panic!("expected viewer-joined, got {other:?}"),
    }
}

#[tokio::test]
async fn test_broadcaster_ready_replays_viewer() {
    init_tracing();
    let hub = test_hub();
    let mut room = full_room(&hub).await;

    // Safe to re-trigger any number of times.
    for _ in 0..2 {
        hub.handle_frame(room.broadcaster, ClientFrame::BroadcasterReady)
            .await;
        match recv(&mut room.broadcaster_rx).await {
            ServerFrame::ViewerJoined { viewer_id } => assert_eq!(viewer_id, room.viewer),
            other => panic!("expected viewer-joined, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_viewer_join_without_broadcaster() {
    init_tracing();
    let hub = test_hub();
    let mut room = full_room(&hub).await;

    hub.handle_frame(room.broadcaster, ClientFrame::LeaveRoom)
        .await;
    recv_where(&mut room.viewer_rx, |f| {
        matches!(f, ServerFrame::BroadcasterLeft)
    })
    .await;
    drain(&mut room.viewer_rx);

    hub.handle_frame(room.viewer, ClientFrame::ViewerJoin).await;

    match recv(&mut room.viewer_rx).await {
        ServerFrame::NoBroadcaster => {}
        other => panic!("expected no-broadcaster, got {other:?}"),
    }
}

#[tokio::test]
async fn test_viewer_join_from_unbound_is_dropped() {
    init_tracing();
    let hub = test_hub();

    let (stranger, _sink, mut rx) = connect(&hub).await;
    hub.handle_frame(stranger, ClientFrame::ViewerJoin).await;

    assert!(rx.try_recv().is_err());
}
