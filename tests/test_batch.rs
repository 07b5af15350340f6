mod common;

use serde_json::Value;

#[tokio::test]
async fn batch_delete_removes_matching_ids_only() {
    let env = common::TestEnv::start();
    let server = env.server();

    let a = env.create_listing(&server, "A", "Town", 500).await;
    let b = env.create_listing(&server, "B", "Town", 600).await;
    env.create_listing(&server, "C", "Town", 700).await;

    let response: Value = server
        .post("/roommates/batch")
        .json(&serde_json::json!({
            "action": "delete",
            "ids": [a, b, "not-a-real-id"]
        }))
        .await
        .json();
    assert_eq!(response["modifiedCount"], 2);

    let remaining: Value = server.get("/roommates").await.json();
    let titles: Vec<&str> = remaining
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["C"]);
}

#[tokio::test]
async fn batch_toggle_flips_each_listing_independently() {
    let env = common::TestEnv::start();
    let server = env.server();

    let open = env.create_listing(&server, "Open", "Town", 500).await;
    let taken = env.create_listing(&server, "Taken", "Town", 600).await;
    let mut body = common::listing_body("Taken", "Town", 600);
    body["availability"] = serde_json::json!("not available");
    server.put(&format!("/roommates/{taken}")).json(&body).await;

    let response: Value = server
        .post("/roommates/batch")
        .json(&serde_json::json!({
            "action": "toggle-availability",
            "ids": [open, taken]
        }))
        .await
        .json();
    assert_eq!(response["modifiedCount"], 2);

    let open_now: Value = server.get(&format!("/roommates/{open}")).await.json();
    assert_eq!(open_now["availability"], "not available");
    let taken_now: Value = server.get(&format!("/roommates/{taken}")).await.json();
    assert_eq!(taken_now["availability"], "available");
}

#[tokio::test]
async fn batch_toggle_skips_unknown_ids() {
    let env = common::TestEnv::start();
    let server = env.server();
    let id = env.create_listing(&server, "Room", "Town", 500).await;

    let response: Value = server
        .post("/roommates/batch")
        .json(&serde_json::json!({
            "action": "toggle-availability",
            "ids": [id, "ghost"]
        }))
        .await
        .json();
    assert_eq!(response["modifiedCount"], 1);
}

#[tokio::test]
async fn batch_rejects_unknown_action_and_empty_ids() {
    let env = common::TestEnv::start();
    let server = env.server_permissive();
    let id = env.create_listing(&server, "Room", "Town", 500).await;

    let bad_action = server
        .post("/roommates/batch")
        .json(&serde_json::json!({ "action": "archive", "ids": [id] }))
        .await;
    bad_action.assert_status_bad_request();
    let body: Value = bad_action.json();
    assert!(body["error"].as_str().unwrap().contains("Invalid action"));

    let no_ids = server
        .post("/roommates/batch")
        .json(&serde_json::json!({ "action": "delete", "ids": [] }))
        .await;
    no_ids.assert_status_bad_request();
}

#[tokio::test]
async fn batch_malformed_body_gets_json_error_shape() {
    let env = common::TestEnv::start();
    let server = env.server_permissive();

    let response = server
        .post("/roommates/batch")
        .json(&serde_json::json!({ "ids": "not-a-list" }))
        .await;
    response.assert_status_bad_request();
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("Invalid batch request"));
}
