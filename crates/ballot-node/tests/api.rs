use ballot_core::{Chain, Payload};
use ballot_node::{router, AppState};
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn spawn_node(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.expect("serve");
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_health() -> anyhow::Result<()> {
    let node = spawn_node(AppState::new(Chain::new(1))).await;
    let body: Value = reqwest::get(format!("{node}/health")).await?.json().await?;
    assert_eq!(body, json!({ "status": "ok" }));
    Ok(())
}

#[tokio::test]
async fn test_cast_and_verify_vote() -> anyhow::Result<()> {
    let node = spawn_node(AppState::new(Chain::new(2))).await;
    let client = reqwest::Client::new();

    let genesis: Value = client.get(format!("{node}/chain/latest")).send().await?.json().await?;
    assert_eq!(genesis["index"], 0);

    let res = client
        .post(format!("{node}/votes"))
        .json(&json!({ "voter_id": "V001", "candidate": "Alice Johnson" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let cast: Value = res.json().await?;
    let block = &cast["block"];
    assert_eq!(block["index"], 1);
    assert_eq!(block["previous_hash"], genesis["hash"]);
    assert!(block["hash"].as_str().unwrap().starts_with("00"));
    assert_eq!(cast["receipt"]["voter_id"], "V001");
    assert_eq!(cast["receipt"]["candidate"], "Alice Johnson");
    assert_eq!(cast["receipt"]["block_hash"], block["hash"]);
    assert_eq!(cast["receipt"]["block_index"], 1);

    let res = client.get(format!("{node}/votes/V001")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let verified: Value = res.json().await?;
    assert_eq!(verified["verified"], true);
    assert_eq!(verified["chain_valid"], true);
    assert_eq!(&verified["block"], block);

    let latest: Value = client.get(format!("{node}/chain/latest")).send().await?.json().await?;
    assert_eq!(&latest, block);
    Ok(())
}

#[tokio::test]
async fn test_candidate_name_alias() -> anyhow::Result<()> {
    let node = spawn_node(AppState::new(Chain::new(1))).await;
    let res = reqwest::Client::new()
        .post(format!("{node}/votes"))
        .json(&json!({ "voter_id": "V002", "candidate_name": "Bob Smith" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let cast: Value = res.json().await?;
    assert_eq!(cast["block"]["data"]["candidate"], "Bob Smith");
    Ok(())
}

#[tokio::test]
async fn test_invalid_payload_is_rejected() -> anyhow::Result<()> {
    let node = spawn_node(AppState::new(Chain::new(1))).await;
    let client = reqwest::Client::new();

    for body in [
        json!({ "candidate": "Alice Johnson" }),
        json!({ "voter_id": "V001" }),
        json!({ "voter_id": "  ", "candidate": "Alice Johnson" }),
    ] {
        let res = client.post(format!("{node}/votes")).json(&body).send().await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let err: Value = res.json().await?;
        assert!(err["error"].as_str().unwrap().starts_with("invalid payload"));
    }

    let stats: Value = client.get(format!("{node}/chain/stats")).send().await?.json().await?;
    assert_eq!(stats["total_blocks"], 1);
    assert_eq!(stats["total_votes"], 0);
    Ok(())
}

#[tokio::test]
async fn test_unknown_voter_is_not_found() -> anyhow::Result<()> {
    let node = spawn_node(AppState::new(Chain::new(1))).await;
    let res = reqwest::get(format!("{node}/votes/V404")).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["verified"], false);
    assert!(body.get("block").is_none());
    Ok(())
}

#[tokio::test]
async fn test_stats_and_export_grow_with_votes() -> anyhow::Result<()> {
    let node = spawn_node(AppState::new(Chain::new(1))).await;
    let client = reqwest::Client::new();
    for i in 1..=3 {
        client
            .post(format!("{node}/votes"))
            .json(&json!({ "voter_id": format!("V{i:03}"), "candidate": "Carol White" }))
            .send()
            .await?
            .error_for_status()?;
    }

    let stats: Value = client.get(format!("{node}/chain/stats")).send().await?.json().await?;
    assert_eq!(stats["total_blocks"], 4);
    assert_eq!(stats["total_votes"], 3);
    assert_eq!(stats["difficulty"], 1);
    assert_eq!(stats["is_valid"], true);

    let chain: Vec<Value> = client.get(format!("{node}/chain")).send().await?.json().await?;
    assert_eq!(chain.len(), 4);
    assert_eq!(stats["latest_hash"], chain[3]["hash"]);
    for (i, block) in chain.iter().enumerate() {
        assert_eq!(block["index"], i);
    }
    Ok(())
}

#[tokio::test]
async fn test_validate_reports_tampering() -> anyhow::Result<()> {
    let state = AppState::new(Chain::new(1));
    let handle = state.chain();
    let node = spawn_node(state).await;
    let client = reqwest::Client::new();

    client
        .post(format!("{node}/votes"))
        .json(&json!({ "voter_id": "V001", "candidate": "Alice Johnson" }))
        .send()
        .await?
        .error_for_status()?;

    let report: Value = client.get(format!("{node}/chain/validate")).send().await?.json().await?;
    assert_eq!(report["valid"], true);
    assert!(report["violation"].is_null());
    assert_eq!(report["chain"].as_array().unwrap().len(), 2);

    {
        let mut chain = handle.write().unwrap();
        if let Payload::Vote { candidate, .. } = &mut chain.block_mut(1).unwrap().data {
            candidate.push('!');
        }
    }

    let report: Value = client.get(format!("{node}/chain/validate")).send().await?.json().await?;
    assert_eq!(report["valid"], false);
    assert_eq!(report["violation"]["kind"], "hash_mismatch");
    assert_eq!(report["violation"]["index"], 1);
    assert_eq!(report["stats"]["is_valid"], false);

    let verified: Value = client.get(format!("{node}/votes/V001")).send().await?.json().await?;
    assert_eq!(verified["chain_valid"], false);
    Ok(())
}
