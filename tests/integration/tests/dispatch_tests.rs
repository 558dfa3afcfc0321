//! Cache and event flow for dispatched events
//!
//! Run with: cargo test -p integration-tests --test dispatch_tests

use anyhow::{Context, Result};
use chat_client::{Client, Emoji, Event, Snowflake};
use chat_core::{EntityKey, StoreExt};
use integration_tests::*;
use serde_json::json;

async fn connected(server: &FakeServer) -> Result<(Client, FakeConnection)> {
    let client = Client::new(server.client_config())?;
    let mut events = client.subscribe();
    client.connect().await?;

    let mut conn = server.accept().await?;
    conn.send(hello(45_000));
    conn.expect_op(2).await?;
    conn.send(dispatch("READY", 1, ready("session-1")));
    conn.send(dispatch("GUILD_CREATE", 2, guild()));
    wait_for_event(&mut events, |e| matches!(e, Event::GuildCreate { .. })).await?;
    Ok((client, conn))
}

#[tokio::test]
async fn test_message_lifecycle() -> Result<()> {
    let server = FakeServer::start().await?;
    let (client, conn) = connected(&server).await?;
    let mut events = client.subscribe();

    // Direct messages are not cached or published
    let mut direct = message("700", "130", "psst");
    direct.as_object_mut().context("object")?.remove("guild_id");
    conn.send(dispatch("MESSAGE_CREATE", 3, direct));
    conn.send(dispatch("MESSAGE_CREATE", 4, message("701", "130", "hello")));

    let event = wait_for_event(&mut events, |e| matches!(e, Event::MessageCreate { .. })).await?;
    let Event::MessageCreate { message: created } = event else {
        unreachable!();
    };
    assert_eq!(created.id, Snowflake::new(701));
    assert!(client.store().message(Snowflake::new(700)).is_none());

    conn.send(dispatch("MESSAGE_UPDATE", 5, message("701", "130", "hello again")));
    let event = wait_for_event(&mut events, |e| matches!(e, Event::FieldChanged { .. })).await?;
    assert_eq!(
        event,
        Event::FieldChanged {
            target: EntityKey::Message(Snowflake::new(701)),
            field: "content",
            old: json!("hello"),
            new: json!("hello again"),
        }
    );

    conn.send(dispatch(
        "MESSAGE_DELETE",
        6,
        json!({"id": "701", "channel_id": CHANNEL_ID.to_string(), "guild_id": GUILD_ID.to_string()}),
    ));
    wait_for_event(&mut events, |e| matches!(e, Event::MessageDelete { .. })).await?;
    assert!(client.store().message(Snowflake::new(701)).is_none());

    client.disconnect();
    Ok(())
}

#[tokio::test]
async fn test_reactions_track_counts_and_own_flag() -> Result<()> {
    let server = FakeServer::start().await?;
    let (client, conn) = connected(&server).await?;
    let mut events = client.subscribe();

    conn.send(dispatch("MESSAGE_CREATE", 3, message("800", "130", "vote")));
    wait_for_event(&mut events, |e| matches!(e, Event::MessageCreate { .. })).await?;

    let thumbs = json!({"id": null, "name": "👍"});
    conn.send(dispatch("MESSAGE_REACTION_ADD", 4, reaction(BOT_ID, "800", thumbs.clone())));
    conn.send(dispatch("MESSAGE_REACTION_ADD", 5, reaction("130", "800", thumbs.clone())));

    let event = wait_for_event(&mut events, |e| matches!(e, Event::ReactionAdd { .. })).await?;
    assert_eq!(
        event,
        Event::ReactionAdd {
            channel_id: Snowflake::new(CHANNEL_ID),
            message_id: Snowflake::new(800),
            user_id: Snowflake::new(5),
            emoji: Emoji::unicode("👍"),
        }
    );
    wait_for_event(&mut events, |e| matches!(e, Event::ReactionAdd { .. })).await?;

    let cached = client.store().message(Snowflake::new(800)).context("message cached")?;
    assert_eq!(cached.reactions.len(), 1);
    assert_eq!(cached.reactions[0].count, 2);
    assert!(cached.reactions[0].me);

    conn.send(dispatch("MESSAGE_REACTION_REMOVE", 6, reaction(BOT_ID, "800", thumbs)));
    wait_for_event(&mut events, |e| matches!(e, Event::ReactionRemove { .. })).await?;
    let cached = client.store().message(Snowflake::new(800)).context("message cached")?;
    assert_eq!(cached.reactions[0].count, 1);
    assert!(!cached.reactions[0].me);

    conn.send(dispatch(
        "MESSAGE_REACTION_REMOVE_ALL",
        7,
        json!({"channel_id": CHANNEL_ID.to_string(), "message_id": "800", "guild_id": GUILD_ID.to_string()}),
    ));
    wait_for_event(&mut events, |e| matches!(e, Event::ReactionClear { .. })).await?;
    let cached = client.store().message(Snowflake::new(800)).context("message cached")?;
    assert!(cached.reactions.is_empty());

    client.disconnect();
    Ok(())
}

#[tokio::test]
async fn test_member_and_guild_removal() -> Result<()> {
    let server = FakeServer::start().await?;
    let (client, conn) = connected(&server).await?;
    let mut events = client.subscribe();
    let guild_id = Snowflake::new(GUILD_ID);

    assert!(client.store().member(guild_id, Snowflake::new(130)).is_some());
    conn.send(dispatch(
        "GUILD_MEMBER_REMOVE",
        3,
        json!({"guild_id": GUILD_ID.to_string(), "user": {"id": "130", "username": "grace", "discriminator": "1906"}}),
    ));
    let event = wait_for_event(&mut events, |e| matches!(e, Event::MemberRemove { .. })).await?;
    assert_eq!(
        event,
        Event::MemberRemove {
            guild_id,
            user_id: Snowflake::new(130)
        }
    );
    assert!(client.store().member(guild_id, Snowflake::new(130)).is_none());

    conn.send(dispatch("GUILD_DELETE", 4, json!({"id": GUILD_ID.to_string()})));
    wait_for_event(&mut events, |e| matches!(e, Event::GuildDelete { .. })).await?;
    assert!(client.guild(guild_id).is_none());
    let shard = client.shards().shard(0).context("shard 0")?;
    wait_until(|| !shard.has_guild(guild_id)).await?;

    client.disconnect();
    Ok(())
}
