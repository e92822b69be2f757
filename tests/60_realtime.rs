mod common;

use std::time::Duration;

use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use common::{ADMIN_EMAIL, PASSWORD, USER_EMAIL};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(server: &common::TestServer, token: &str) -> Result<Socket> {
    let mut request = server.ws_url.as_str().into_client_request()?;
    request
        .headers_mut()
        .insert("authentication", HeaderValue::from_str(token)?);

    let (socket, _) = connect_async(request).await?;
    Ok(socket)
}

/// Next JSON event, skipping control frames
async fn next_event(socket: &mut Socket) -> Result<Value> {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .context("timed out waiting for an event")?
            .context("socket closed")??;

        match frame {
            Message::Text(text) => return Ok(serde_json::from_str(&text)?),
            Message::Close(_) => anyhow::bail!("socket closed by server"),
            _ => continue,
        }
    }
}

async fn send_message(socket: &mut Socket, data: Value) -> Result<()> {
    let frame = json!({ "event": "message-from-client", "data": data });
    socket.send(Message::Text(frame.to_string())).await?;
    Ok(())
}

fn names(event: &Value) -> Vec<String> {
    event["data"]
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|e| e["fullName"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn presence_and_chat_flow() -> Result<()> {
    let server = common::spawn_seeded_server().await?;
    let admin_token = server.login(ADMIN_EMAIL, PASSWORD).await?;
    let user_token = server.login(USER_EMAIL, PASSWORD).await?;

    let mut one = connect(&server, &admin_token).await?;
    let first = next_event(&mut one).await?;
    assert_eq!(first["event"], "clients-updated");
    assert_eq!(names(&first), vec!["Test One"]);

    let mut two = connect(&server, &user_token).await?;
    let joined = next_event(&mut one).await?;
    assert_eq!(joined["event"], "clients-updated");
    assert_eq!(names(&joined), vec!["Test One", "Test Two"]);
    assert_eq!(names(&next_event(&mut two).await?), vec!["Test One", "Test Two"]);

    send_message(&mut two, json!({ "message": "hello" })).await?;
    let chat = next_event(&mut one).await?;
    assert_eq!(
        chat,
        json!({ "event": "message-from-server", "data": { "fullName": "Test Two", "message": "hello" } })
    );
    // the sender receives its own message too
    assert_eq!(next_event(&mut two).await?, chat);

    send_message(&mut one, json!({})).await?;
    let empty = next_event(&mut two).await?;
    assert_eq!(empty["data"]["fullName"], "Test One");
    assert_eq!(empty["data"]["message"], "no-message!!");
    next_event(&mut one).await?;

    two.close(None).await?;
    let left = next_event(&mut one).await?;
    assert_eq!(left["event"], "clients-updated");
    assert_eq!(names(&left), vec!["Test One"]);
    Ok(())
}

#[tokio::test]
async fn bad_credentials_are_dropped_silently() -> Result<()> {
    let server = common::spawn_seeded_server().await?;
    let token = server.login(ADMIN_EMAIL, PASSWORD).await?;

    let mut watcher = connect(&server, &token).await?;
    next_event(&mut watcher).await?;

    let mut intruder = connect(&server, "not-a-real-token").await?;
    let frame = tokio::time::timeout(Duration::from_secs(5), intruder.next()).await?;
    match frame {
        None | Some(Err(_)) | Some(Ok(Message::Close(_))) => {}
        Some(Ok(other)) => panic!("rejected socket received {:?}", other),
    }

    // nothing was broadcast for the rejected socket: the next event is our own chat message
    send_message(&mut watcher, json!({ "message": "still here" })).await?;
    let next = next_event(&mut watcher).await?;
    assert_eq!(next["event"], "message-from-server");
    assert_eq!(server.state.presence.list().await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn bearer_authorization_header_is_accepted() -> Result<()> {
    let server = common::spawn_seeded_server().await?;
    let token = server.login(USER_EMAIL, PASSWORD).await?;

    let mut request = server.ws_url.as_str().into_client_request()?;
    request
        .headers_mut()
        .insert("authorization", HeaderValue::from_str(&format!("Bearer {}", token))?);
    let (mut socket, _) = connect_async(request).await?;

    let event = next_event(&mut socket).await?;
    assert_eq!(names(&event), vec!["Test Two"]);
    Ok(())
}
