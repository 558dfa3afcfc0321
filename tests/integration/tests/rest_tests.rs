//! REST client against the fake API
//!
//! Run with: cargo test -p integration-tests --test rest_tests

use anyhow::Result;
use chat_client::{Client, Snowflake};
use integration_tests::*;
use serde_json::json;

#[tokio::test]
async fn test_send_message_is_authenticated() -> Result<()> {
    let server = FakeServer::start().await?;
    let client = Client::new(server.client_config())?;

    let message = client
        .rest()
        .send_message(Snowflake::new(CHANNEL_ID), "hello", Some(json!({"title": "report"})))
        .await?;
    assert_eq!(message.id, Snowflake::new(900));
    assert_eq!(message.channel_id, Snowflake::new(CHANNEL_ID));
    assert_eq!(message.content, "hello");
    assert_eq!(message.embeds, vec![json!({"title": "report"})]);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/channels/110/messages");
    assert_eq!(request.authorization.as_deref(), Some(TOKEN));
    assert!(request.user_agent.is_some());
    assert_eq!(request.body.as_ref().map(|b| b["content"].clone()), Some(json!("hello")));
    Ok(())
}

#[tokio::test]
async fn test_gateway_lookup_is_unauthenticated() -> Result<()> {
    let server = FakeServer::start().await?;
    let client = Client::new(server.client_config())?;

    let url = client.rest().gateway_url().await?;
    assert_eq!(url, format!("ws://{}/ws", server.addr));

    let requests = server.requests();
    assert_eq!(requests[0].path, "/gateway");
    assert_eq!(requests[0].authorization, None);
    Ok(())
}

#[tokio::test]
async fn test_rate_limited_request_is_retried() -> Result<()> {
    let server = FakeServer::start().await?;
    let client = Client::new(server.client_config())?;

    client
        .rest()
        .delete_message(Snowflake::new(CHANNEL_ID), Snowflake::new(900))
        .await?;

    let deletes: Vec<_> = server
        .requests()
        .into_iter()
        .filter(|r| r.method == "DELETE")
        .collect();
    assert_eq!(deletes.len(), 2);
    assert!(deletes.iter().all(|r| r.path == "/channels/110/messages/900"));
    Ok(())
}

#[tokio::test]
async fn test_requests_on_one_route_complete_in_order() -> Result<()> {
    let server = FakeServer::start().await?;
    let client = Client::new(server.client_config())?;
    let rest = client.rest();
    let channel = Snowflake::new(CHANNEL_ID);

    let (first, second, third) = tokio::join!(
        rest.send_message(channel, "one", None),
        rest.send_message(channel, "two", None),
        rest.send_message(channel, "three", None),
    );
    assert_eq!(first?.content, "one");
    assert_eq!(second?.content, "two");
    assert_eq!(third?.content, "three");

    let contents: Vec<_> = server
        .requests()
        .into_iter()
        .filter_map(|r| r.body.map(|b| b["content"].clone()))
        .collect();
    assert_eq!(contents, vec![json!("one"), json!("two"), json!("three")]);
    Ok(())
}
