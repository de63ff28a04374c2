use periscope_core::{ClientFrame, Role, ServerFrame};

use crate::integration::{connect, init_tracing, recv, recv_where, test_hub};

#[tokio::test]
async fn test_create_then_join() {
    init_tracing();
    let hub = test_hub();

    let (a, _a_sink, mut a_rx) = connect(&hub).await;
    let (b, _b_sink, mut b_rx) = connect(&hub).await;

    hub.handle_frame(
        a,
        ClientFrame::CreateRoom {
            name: "movie".to_string(),
            key: "hunter2".to_string(),
        },
    )
    .await;

    let room_id = match recv(&mut a_rx).await {
        ServerFrame::RoomCreated {
            room_id,
            name,
            role,
        } => {
            assert_eq!(name, "movie");
            assert_eq!(role, Role::Broadcaster);
            assert!(room_id.as_str().starts_with("room-"));
            assert_eq!(room_id.as_str().len(), "room-".len() + 8);
            room_id
        }
        other => panic!("expected room-created, got {other:?}"),
    };

    hub.handle_frame(
        b,
        ClientFrame::JoinRoom {
            room_id: room_id.clone(),
            key: "hunter2".to_string(),
        },
    )
    .await;

    match recv_where(&mut b_rx, |f| matches!(f, ServerFrame::RoomJoined { .. })).await {
        ServerFrame::RoomJoined {
            room_id: joined,
            name,
            role,
        } => {
            assert_eq!(joined, room_id);
            assert_eq!(name, "movie");
            assert_eq!(role, Role::Viewer);
        }
        _ => unreachable!(),
    }

    // The broadcaster learns its viewer's addressable id.
    match recv_where(&mut a_rx, |f| matches!(f, ServerFrame::ViewerJoined { .. })).await {
        ServerFrame::ViewerJoined { viewer_id } => {
            assert_eq!(viewer_id, b);
            assert_eq!(viewer_id.to_string(), "client-2");
        }
        _ => unreachable!(),
    }

    // The inventory broadcast reflects the full room.
    match recv_where(&mut b_rx, |f| matches!(f, ServerFrame::RoomList { .. })).await {
        ServerFrame::RoomList { rooms } => {
            assert_eq!(rooms.len(), 1);
            assert_eq!(rooms[0].participants, 2);
            assert!(rooms[0].is_full);
        }
        _ => unreachable!(),
    }
}
