use periscope_core::{ClientFrame, RoomErrorCode, RoomId, ServerFrame};

use crate::integration::{connect, init_tracing, recv, test_hub};

#[tokio::test]
async fn test_join_unknown_room() {
    init_tracing();
    let hub = test_hub();

    let (a, _a_sink, mut a_rx) = connect(&hub).await;
    hub.handle_frame(
        a,
        ClientFrame::JoinRoom {
            room_id: RoomId::from("room-00000000"),
            key: "whatever".to_string(),
        },
    )
    .await;

    match recv(&mut a_rx).await {
        ServerFrame::RoomError { code, error } => {
            assert_eq!(code, RoomErrorCode::RoomNotFound);
            assert_eq!(error, "Room not found.");
        }
        other => panic!("expected room-error, got {other:?}"),
    }
}
