// Live-socket smoke test: boots the real route stack on an ephemeral
// port and talks to it through a WebSocket client.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream};
use warp::Filter;

use noughts::core::server::{GameServer, SharedGameServer};
use noughts::handlers::websocket::handle_ws_client;

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

// The same route stack the binary serves, minus CORS
fn routes(
    server: SharedGameServer,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let ws_route = warp::path("ws")
        .and(warp::ws())
        .and(warp::any().map(move || server.clone()))
        .map(|ws: warp::ws::Ws, server: SharedGameServer| {
            ws.on_upgrade(move |socket| handle_ws_client(socket, server))
        });
    let health_route = warp::path("health").map(|| "OK");
    ws_route.or(health_route)
}

async fn start_server() -> String {
    let server: SharedGameServer = Arc::new(GameServer::new());
    let (addr, fut) = warp::serve(routes(server)).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(fut);
    format!("ws://{}/ws", addr)
}

async fn connect(url: &str) -> WsClient {
    let (ws, _) = timeout(Duration::from_secs(5), connect_async(url))
        .await
        .expect("connect timed out")
        .expect("connection failed");
    ws
}

async fn send_event(ws: &mut WsClient, event: &str) {
    ws.send(Message::Text(event.to_string()))
        .await
        .expect("send failed");
}

async fn recv_event(ws: &mut WsClient) -> Value {
    let frame = timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("receive timed out")
        .expect("stream ended")
        .expect("socket error");
    serde_json::from_str(frame.to_text().expect("text frame")).expect("valid JSON payload")
}

#[tokio::test]
async fn test_lobby_roundtrip_over_a_real_socket() {
    let url = start_server().await;
    let mut ws = connect(&url).await;

    send_event(&mut ws, r#"{"type":"join-lobby","name":"alice"}"#).await;
    let event = recv_event(&mut ws).await;
    assert_eq!(event["type"], "public-rooms");
    assert_eq!(event["rooms"], serde_json::json!([]));

    send_event(
        &mut ws,
        r#"{"type":"create-room","isPublic":true,"name":"alice"}"#,
    )
    .await;
    let event = recv_event(&mut ws).await;
    assert_eq!(event["type"], "room-created");
    assert_eq!(event["roomId"].as_str().unwrap().len(), 6);

    // the creator is also a connected client, so the lobby refresh and
    // the room state both arrive on this socket
    let event = recv_event(&mut ws).await;
    assert_eq!(event["type"], "public-rooms");
    assert_eq!(event["rooms"].as_array().unwrap().len(), 1);
    let event = recv_event(&mut ws).await;
    assert_eq!(event["type"], "room-state");
    assert_eq!(event["status"], "waiting");
}

#[tokio::test]
async fn test_closing_a_socket_cleans_up_the_room() {
    let url = start_server().await;
    let mut alice = connect(&url).await;
    let mut bob = connect(&url).await;

    // round-trip through the lobby so bob is registered before the
    // create-room broadcast goes out
    send_event(&mut bob, r#"{"type":"join-lobby","name":"bob"}"#).await;
    assert_eq!(recv_event(&mut bob).await["type"], "public-rooms");

    send_event(
        &mut alice,
        r#"{"type":"create-room","isPublic":true,"name":"alice"}"#,
    )
    .await;
    let created = recv_event(&mut alice).await;
    let room_id = created["roomId"].as_str().unwrap().to_string();
    // drain the creator's lobby refresh and room state
    recv_event(&mut alice).await;
    recv_event(&mut alice).await;
    // bob saw the lobby refresh too
    let event = recv_event(&mut bob).await;
    assert_eq!(event["type"], "public-rooms");

    send_event(
        &mut bob,
        &format!(r#"{{"type":"join-room","roomId":"{}","name":"bob"}}"#, room_id),
    )
    .await;
    assert_eq!(recv_event(&mut bob).await["type"], "room-joined");

    // alice: room-state (game starts), then the lobby refresh
    let event = recv_event(&mut alice).await;
    assert_eq!(event["type"], "room-state");
    assert_eq!(event["status"], "playing");
    recv_event(&mut alice).await;

    bob.close(None).await.expect("close failed");

    // the server treats the closed socket as a departure
    let event = recv_event(&mut alice).await;
    assert_eq!(event["type"], "room-state");
    assert_eq!(event["players"].as_array().unwrap().len(), 1);
    assert_eq!(event["players"][0]["name"], "alice");
}
