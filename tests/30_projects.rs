mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

fn member_ids(body: &Value) -> Vec<i64> {
    body["data"]["members"]
        .as_array()
        .expect("members array")
        .iter()
        .map(|m| m["id"].as_i64().expect("member id"))
        .collect()
}

#[tokio::test]
async fn create_project_embeds_members() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let name = common::unique("pm");
    let user_id = common::create_user(&server.base_url, &name, &format!("{}@x.com", name), 30).await?;

    let res = client
        .post(format!("{}/api/v1/projects", server.base_url))
        .json(&json!({
            "title": "T",
            "description": "D",
            "status": "pending",
            "userIds": [user_id],
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["title"], "T");
    assert_eq!(body["data"]["status"], "pending");
    let members = body["data"]["members"].as_array().expect("members");
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["id"].as_i64(), Some(user_id));
    assert_eq!(members[0]["name"], name.as_str());
    // id + name only, no membership metadata
    assert!(members[0].get("email").is_none());

    let project_id = body["data"]["id"].as_i64().expect("project id");
    let res = client
        .get(format!("{}/api/v1/projects/{}", server.base_url, project_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let fetched = res.json::<Value>().await?;
    assert_eq!(fetched["data"], body["data"]);

    Ok(())
}

#[tokio::test]
async fn create_requires_non_empty_member_list() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for user_ids in [json!([]), json!(null), json!("1")] {
        let mut payload = json!({ "title": "T", "description": "D", "status": "pending" });
        if !user_ids.is_null() {
            payload["userIds"] = user_ids.clone();
        }
        let res = client
            .post(format!("{}/api/v1/projects", server.base_url))
            .json(&payload)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "userIds={}", user_ids);
        let body = res.json::<Value>().await?;
        assert_eq!(
            body["message"],
            "userIds is required and must be a non-empty array of integers."
        );
    }

    Ok(())
}

#[tokio::test]
async fn create_rejects_unknown_member_ids() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let name = common::unique("exists");
    let user_id = common::create_user(&server.base_url, &name, &format!("{}@x.com", name), 30).await?;
    let missing = 999_999_999;

    // A duplicated valid id must not mask the missing one
    let res = client
        .post(format!("{}/api/v1/projects", server.base_url))
        .json(&json!({
            "title": "T",
            "description": "D",
            "status": "pending",
            "userIds": [user_id, user_id, missing],
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], false);
    assert!(
        body["message"]
            .as_str()
            .unwrap_or_default()
            .starts_with("One or more userIds do not exist"),
        "unexpected message: {}",
        body
    );

    Ok(())
}

#[tokio::test]
async fn create_rejects_unknown_status() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let name = common::unique("st");
    let user_id = common::create_user(&server.base_url, &name, &format!("{}@x.com", name), 30).await?;

    let res = client
        .post(format!("{}/api/v1/projects", server.base_url))
        .json(&json!({
            "title": "T",
            "description": "D",
            "status": "done",
            "userIds": [user_id],
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "Status must be one of: pending, in progress, completed");

    Ok(())
}

#[tokio::test]
async fn create_rejects_overlong_description() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let name = common::unique("longdesc");
    let user_id = common::create_user(&server.base_url, &name, &format!("{}@x.com", name), 30).await?;

    let res = client
        .post(format!("{}/api/v1/projects", server.base_url))
        .json(&json!({
            "title": "T",
            "description": "d".repeat(1001),
            "status": "pending",
            "userIds": [user_id],
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Description must be between 1 and 1000 characters.");

    Ok(())
}

#[tokio::test]
async fn update_replaces_membership_wholesale() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let mut ids = Vec::new();
    for i in 0..3 {
        let name = common::unique(&format!("rep{}", i));
        ids.push(common::create_user(&server.base_url, &name, &format!("{}@x.com", name), 20 + i).await?);
    }
    let (a, b, c) = (ids[0], ids[1], ids[2]);

    let res = client
        .post(format!("{}/api/v1/projects", server.base_url))
        .json(&json!({ "title": "T", "description": "D", "status": "pending", "userIds": [a, b] }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<Value>().await?;
    let project_id = body["data"]["id"].as_i64().expect("project id");

    // [a, b] -> [b, c]: a removed, c added, b retained
    let res = client
        .put(format!("{}/api/v1/projects/{}", server.base_url, project_id))
        .json(&json!({ "userIds": [b, c] }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    let mut members = member_ids(&body);
    members.sort_unstable();
    let mut expected = vec![b, c];
    expected.sort_unstable();
    assert_eq!(members, expected);

    // An empty list on update clears the membership set entirely
    let res = client
        .put(format!("{}/api/v1/projects/{}", server.base_url, project_id))
        .json(&json!({ "userIds": [] }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(member_ids(&body), Vec::<i64>::new());

    Ok(())
}

#[tokio::test]
async fn update_patches_scalar_fields_independently() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let name = common::unique("scalar");
    let user_id = common::create_user(&server.base_url, &name, &format!("{}@x.com", name), 30).await?;

    let res = client
        .post(format!("{}/api/v1/projects", server.base_url))
        .json(&json!({ "title": "Old", "description": "D", "status": "pending", "userIds": [user_id] }))
        .send()
        .await?;
    let body = res.json::<Value>().await?;
    let project_id = body["data"]["id"].as_i64().expect("project id");

    // Status only; title, description and members stay put
    let res = client
        .put(format!("{}/api/v1/projects/{}", server.base_url, project_id))
        .json(&json!({ "status": "completed" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["data"]["status"], "completed");
    assert_eq!(body["data"]["title"], "Old");
    assert_eq!(member_ids(&body), vec![user_id]);

    // Status transitions are free-form: completed back to pending is fine
    let res = client
        .put(format!("{}/api/v1/projects/{}", server.base_url, project_id))
        .json(&json!({ "status": "pending", "title": "New" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["title"], "New");

    // Unknown member ids on update are rejected before anything changes
    let res = client
        .put(format!("{}/api/v1/projects/{}", server.base_url, project_id))
        .json(&json!({ "userIds": [999_999_999] }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn delete_project_keeps_users() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let name = common::unique("survivor");
    let user_id = common::create_user(&server.base_url, &name, &format!("{}@x.com", name), 30).await?;

    let res = client
        .post(format!("{}/api/v1/projects", server.base_url))
        .json(&json!({ "title": "T", "description": "D", "status": "pending", "userIds": [user_id] }))
        .send()
        .await?;
    let body = res.json::<Value>().await?;
    let project_id = body["data"]["id"].as_i64().expect("project id");

    let res = client
        .delete(format!("{}/api/v1/projects/{}", server.base_url, project_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], true);
    // Delete responds with the row's last-known data
    assert_eq!(body["data"]["id"].as_i64(), Some(project_id));
    assert_eq!(body["data"]["title"], "T");

    let res = client
        .get(format!("{}/api/v1/projects/{}", server.base_url, project_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // The member user outlives the project
    let res = client
        .get(format!("{}/api/v1/users/{}", server.base_url, user_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn deleting_sole_member_leaves_project_with_empty_member_list() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let name = common::unique("sole");
    let user_id = common::create_user(&server.base_url, &name, &format!("{}@x.com", name), 30).await?;

    let res = client
        .post(format!("{}/api/v1/projects", server.base_url))
        .json(&json!({ "title": "T", "description": "D", "status": "pending", "userIds": [user_id] }))
        .send()
        .await?;
    let body = res.json::<Value>().await?;
    let project_id = body["data"]["id"].as_i64().expect("project id");

    let res = client
        .delete(format!("{}/api/v1/users/{}", server.base_url, user_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // The project row is intact, its membership row is gone
    let res = client
        .get(format!("{}/api/v1/projects/{}", server.base_url, project_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(member_ids(&body), Vec::<i64>::new());

    Ok(())
}

#[tokio::test]
async fn unknown_project_ids_return_not_found() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let missing = 999_999_999;
    for res in [
        client.get(format!("{}/api/v1/projects/{}", server.base_url, missing)).send().await?,
        client
            .put(format!("{}/api/v1/projects/{}", server.base_url, missing))
            .json(&json!({ "title": "X" }))
            .send()
            .await?,
        client.delete(format!("{}/api/v1/projects/{}", server.base_url, missing)).send().await?,
    ] {
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body = res.json::<Value>().await?;
        assert_eq!(body["success"], false);
    }

    Ok(())
}

#[tokio::test]
async fn list_projects_returns_success_envelope() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/v1/projects", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], true);
    assert!(body["data"].is_array(), "data should be an array: {}", body);

    Ok(())
}
