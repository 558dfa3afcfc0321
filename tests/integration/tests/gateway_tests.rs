//! Gateway session tests against the fake server
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use std::time::Duration;

use anyhow::{Context, Result};
use chat_client::{ActivityType, Client, Event, Snowflake, Status};
use chat_gateway::SessionState;
use integration_tests::*;
use serde_json::json;

/// Connect, identify and receive READY plus one guild
async fn handshake(server: &FakeServer, client: &Client) -> Result<FakeConnection> {
    let mut events = client.subscribe();
    client.connect().await?;

    let mut conn = server.accept().await?;
    conn.send(hello(45_000));
    conn.expect_op(2).await?;
    conn.send(dispatch("READY", 1, ready("session-1")));
    conn.send(dispatch("GUILD_CREATE", 2, guild()));
    wait_for_event(&mut events, |e| matches!(e, Event::GuildCreate { .. })).await?;
    Ok(conn)
}

#[tokio::test]
async fn test_identify_ready_and_guild_cache() -> Result<()> {
    let server = FakeServer::start().await?;
    let client = Client::new(server.client_config())?;
    let mut events = client.subscribe();

    client.connect().await?;
    let mut conn = server.accept().await?;
    conn.send(hello(45_000));

    let identify = conn.expect_op(2).await?;
    assert_eq!(identify["d"]["token"], TOKEN);
    assert_eq!(identify["d"]["compress"], true);
    assert!(identify["d"]["properties"]["$os"].is_string());
    assert!(identify["d"].get("shard").is_none());

    conn.send(dispatch("READY", 1, ready("session-1")));
    wait_for_event(&mut events, |e| matches!(e, Event::ShardConnected { shard_id: 0 })).await?;

    // Split across two binary frames
    conn.send_split(dispatch("GUILD_CREATE", 2, guild()));
    wait_for_event(&mut events, |e| matches!(e, Event::GuildCreate { .. })).await?;

    let cached = client.guild(Snowflake::new(GUILD_ID)).context("guild not cached")?;
    assert_eq!(cached.name, "Integration Guild");
    assert_eq!(client.guilds().len(), 1);
    assert!(client.channel(Snowflake::new(CHANNEL_ID)).is_some());
    assert_eq!(client.current_user().map(|u| u.username).as_deref(), Some("bot"));

    let shard = client.shards().shard(0).context("shard 0")?;
    assert_eq!(shard.session_id().as_deref(), Some("session-1"));
    assert_eq!(shard.last_sequence(), 2);
    assert_eq!(shard.state(), SessionState::Connected);

    // The URL lookup went out without credentials
    let lookup = &server.requests()[0];
    assert_eq!(lookup.path, "/gateway");
    assert_eq!(lookup.authorization, None);

    client.disconnect();
    Ok(())
}

#[tokio::test]
async fn test_dropped_socket_resumes_session() -> Result<()> {
    let server = FakeServer::start().await?;
    let client = Client::new(server.client_config())?;
    let conn = handshake(&server, &client).await?;
    let mut events = client.subscribe();

    conn.drop_socket();
    wait_for_event(&mut events, |e| {
        matches!(e, Event::ShardDisconnected { close_code: None, .. })
    })
    .await?;

    let mut second = server.accept().await?;
    let resume = second.expect_op(6).await?;
    assert_eq!(
        resume["d"],
        json!({"token": TOKEN, "session_id": "session-1", "seq": 2})
    );

    second.send(hello(45_000));
    second.send(dispatch("RESUMED", 3, json!({})));
    wait_for_event(&mut events, |e| matches!(e, Event::ShardResumed { shard_id: 0 })).await?;

    let shard = client.shards().shard(0).context("shard 0")?;
    assert_eq!(shard.state(), SessionState::Resumed);
    assert_eq!(shard.last_sequence(), 3);
    // Cached URL reused
    assert_eq!(server.gateway_lookups(), 1);
    // Guild cache survives the reconnect
    assert!(client.guild(Snowflake::new(GUILD_ID)).is_some());

    client.disconnect();
    Ok(())
}

#[tokio::test]
async fn test_authentication_failure_is_final() -> Result<()> {
    let server = FakeServer::start().await?;
    let client = Client::new(server.client_config())?;
    let mut events = client.subscribe();

    client.connect().await?;
    let mut conn = server.accept().await?;
    conn.send(hello(45_000));
    conn.expect_op(2).await?;
    conn.close(4004);

    wait_for_event(&mut events, |e| {
        matches!(e, Event::ShardDisconnected { close_code: Some(4004), .. })
    })
    .await?;
    let shard = client.shards().shard(0).context("shard 0")?;
    wait_until(|| shard.state() == SessionState::Disconnected).await?;

    assert!(!shard.reconnect_pending());
    assert!(server.try_accept(Duration::from_millis(400)).await.is_none());
    Ok(())
}

#[tokio::test]
async fn test_server_requested_reconnect() -> Result<()> {
    let server = FakeServer::start().await?;
    let client = Client::new(server.client_config())?;
    let mut conn = handshake(&server, &client).await?;

    conn.send(json!({"op": 7, "d": null}));
    assert_eq!(conn.expect_close().await?, Some(4000));

    let mut second = server.accept().await?;
    let resume = second.expect_op(6).await?;
    assert_eq!(resume["d"]["session_id"], "session-1");

    client.disconnect();
    Ok(())
}

#[tokio::test]
async fn test_invalid_session_identifies_again() -> Result<()> {
    let server = FakeServer::start().await?;
    let client = Client::new(server.client_config())?;
    let mut conn = handshake(&server, &client).await?;

    conn.send(json!({"op": 9, "d": false}));
    let identify = conn.expect_op(2).await?;
    assert_eq!(identify["d"]["token"], TOKEN);

    let shard = client.shards().shard(0).context("shard 0")?;
    assert_eq!(shard.session_id(), None);
    assert_eq!(shard.last_sequence(), -1);

    client.disconnect();
    Ok(())
}

#[tokio::test]
async fn test_disconnect_sends_normal_close() -> Result<()> {
    let server = FakeServer::start().await?;
    let client = Client::new(server.client_config())?;
    let mut conn = handshake(&server, &client).await?;

    client.disconnect();
    assert_eq!(conn.expect_close().await?, Some(1000));

    let shard = client.shards().shard(0).context("shard 0")?;
    wait_until(|| shard.state() == SessionState::Disconnected).await?;
    assert!(server.try_accept(Duration::from_millis(400)).await.is_none());
    Ok(())
}

#[tokio::test]
async fn test_heartbeat_needs_ack() -> Result<()> {
    let server = FakeServer::start().await?;
    let client = Client::new(server.client_config())?;
    client.connect().await?;

    let mut conn = server.accept().await?;
    conn.send(dispatch("READY", 4, ready("session-1")));
    conn.send(hello(100));

    // First tick fires immediately
    // A stored session skips identify, so the first frame is the heartbeat
    let ClientFrame::Payload(first) = conn.next_frame().await? else {
        anyhow::bail!("expected a heartbeat");
    };
    assert_eq!(first["op"], 1);
    assert_eq!(first["d"], 4);

    conn.send(heartbeat_ack());
    let second = conn.expect_op(1).await?;
    assert_eq!(second["d"], 4);

    // Without an ack no further heartbeat goes out
    let quiet = tokio::time::timeout(Duration::from_millis(350), conn.next_frame()).await;
    assert!(quiet.is_err());

    client.disconnect();
    Ok(())
}

#[tokio::test]
async fn test_presence_broadcast() -> Result<()> {
    let server = FakeServer::start().await?;
    let client = Client::new(server.client_config())?;
    let mut conn = handshake(&server, &client).await?;

    client.set_status(Status::Idle)?;
    let update = conn.expect_op(3).await?;
    assert_eq!(
        update["d"],
        json!({"afk": false, "since": null, "status": "idle", "game": null})
    );

    client.set_activity(Some((ActivityType::Playing, "chess".into())))?;
    let update = conn.expect_op(3).await?;
    assert_eq!(update["d"]["status"], "idle");
    assert_eq!(update["d"]["game"], json!({"type": 0, "name": "chess"}));

    client.disconnect();
    Ok(())
}
