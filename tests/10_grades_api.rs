mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::TestServer;

#[tokio::test]
async fn create_get_patch_delete_cycle() -> Result<()> {
    let server = TestServer::memory().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/grades"))
        .json(&json!({ "student": "Alice", "class": "math", "score": 88 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let ack = res.json::<Value>().await?;
    assert_eq!(ack["acknowledged"], json!(true), "unexpected ack: {}", ack);
    let id = ack["insertedId"].as_str().expect("generated id").to_string();

    let record = client
        .get(server.url(&format!("/grades/{}", id)))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(
        record,
        json!({ "_id": id, "student": "Alice", "class": "math", "score": 88 })
    );

    let res = client
        .patch(server.url(&format!("/grades/{}", id)))
        .json(&json!({ "score": 95 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let ack = res.json::<Value>().await?;
    assert_eq!(ack["matchedCount"], json!(1));

    let record = client
        .get(server.url(&format!("/grades/{}", id)))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(record["score"], json!(95));
    assert_eq!(record["class"], json!("math"));

    let res = client
        .delete(server.url(&format!("/grades/{}", id)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.json::<Value>().await?,
        json!({ "acknowledged": true, "deletedCount": 1 })
    );

    let res = client
        .get(server.url(&format!("/grades/{}", id)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.json::<Value>().await?,
        json!({ "Error": "No data found with the given id" })
    );

    Ok(())
}

#[tokio::test]
async fn listing_pages_through_records() -> Result<()> {
    let server = TestServer::memory().await?;
    let client = reqwest::Client::new();

    for i in 0..25 {
        let res = client
            .post(server.url("/grades"))
            .json(&json!({ "_id": i, "score": i }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
    }

    let first = client.get(server.url("/grades")).send().await?.json::<Value>().await?;
    let ids: Vec<i64> = first
        .as_array()
        .expect("array body")
        .iter()
        .map(|r| r["_id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, (0..10).collect::<Vec<_>>());

    let last = client
        .get(server.url("/grades?page=2"))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(last.as_array().map(Vec::len), Some(5));

    // Integer ids are addressable directly
    let record = client.get(server.url("/grades/7")).send().await?.json::<Value>().await?;
    assert_eq!(record, json!({ "_id": 7, "score": 7 }));

    Ok(())
}

#[tokio::test]
async fn invalid_ids_are_rejected() -> Result<()> {
    let server = TestServer::memory().await?;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/grades/not-an-id")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?, json!({ "Error": "Invalid id provided" }));

    let res = client.delete(server.url("/grades/12a")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn misses_keep_success_status() -> Result<()> {
    let server = TestServer::memory().await?;
    let client = reqwest::Client::new();

    let res = client
        .delete(server.url("/grades/ffffffffffffffffffffffff"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({ "Error": "Could not delete the data" }));

    let res = client
        .patch(server.url("/grades/31"))
        .json(&json!({ "score": 1 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({ "Error": "Could not update the data" }));

    Ok(())
}
