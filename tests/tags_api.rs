//! HTTP-level integration tests for the tag endpoints.

mod common;

use axum::http::StatusCode;
use common::{
    count_rows, create_diary, create_tag, delete_auth, expect_json, get_auth, post_json_auth,
    put_json_auth, register_and_login, setup,
};
use serde_json::{json, Value};

fn names(list: &Value) -> Vec<&str> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|tag| tag["name"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn create_defaults_color_and_counts_usage() {
    let (app, _pool) = setup().await;
    let (token, _) = register_and_login(&app, "alice").await;

    let json = expect_json(
        post_json_auth(&app, "/api/tags", &token, json!({ "name": " Work " })).await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(json["message"], "Tag created successfully");
    assert_eq!(json["data"]["name"], "Work");
    assert_eq!(json["data"]["color"], "#6B7280");
    assert_eq!(json["data"]["usageCount"], 0);
    assert!(json["data"]["createdAt"].is_string());

    let id = json["data"]["id"].as_i64().unwrap();
    create_diary(&app, &token, json!({ "title": "t", "content": "c", "tagIds": [id] })).await;

    let json = expect_json(get_auth(&app, "/api/tags", &token).await, StatusCode::OK).await;
    assert_eq!(json["data"][0]["usageCount"], 1);
}

#[tokio::test]
async fn names_are_unique_per_user_ignoring_case() {
    let (app, pool) = setup().await;
    let (alice, _) = register_and_login(&app, "alice").await;
    let (bob, _) = register_and_login(&app, "bob").await;
    create_tag(&app, &alice, "Work").await;

    let json = expect_json(
        post_json_auth(&app, "/api/tags", &alice, json!({ "name": "work" })).await,
        StatusCode::CONFLICT,
    )
    .await;
    assert_eq!(json["message"], "Tag with this name already exists");

    // Another user may use the same name
    create_tag(&app, &bob, "Work").await;
    assert_eq!(count_rows(&pool, "tags").await, 2);
}

#[tokio::test]
async fn rename_checks_conflicts_except_self() {
    let (app, _pool) = setup().await;
    let (token, _) = register_and_login(&app, "alice").await;
    let work = create_tag(&app, &token, "Work").await;
    create_tag(&app, &token, "Home").await;
    let uri = format!("/api/tags/{work}");

    let json = expect_json(
        put_json_auth(&app, &uri, &token, json!({ "name": "work" })).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"]["name"], "work");

    let json = expect_json(
        put_json_auth(&app, &uri, &token, json!({ "name": "HOME" })).await,
        StatusCode::CONFLICT,
    )
    .await;
    assert_eq!(json["message"], "Tag with this name already exists");

    // Color alone keeps the name
    let json = expect_json(
        put_json_auth(&app, &uri, &token, json!({ "color": "#112233" })).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"]["name"], "work");
    assert_eq!(json["data"]["color"], "#112233");
}

#[tokio::test]
async fn invalid_name_or_color_is_rejected() {
    let (app, pool) = setup().await;
    let (token, _) = register_and_login(&app, "alice").await;

    let json = expect_json(
        post_json_auth(
            &app,
            "/api/tags",
            &token,
            json!({ "name": "work!", "color": "red" }),
        )
        .await,
        StatusCode::UNPROCESSABLE_ENTITY,
    )
    .await;
    assert!(json["errors"]["name"].is_string());
    assert_eq!(
        json["errors"]["color"],
        "Color must be a valid hex color code (e.g., #FF5733)"
    );
    assert_eq!(count_rows(&pool, "tags").await, 0);
}

#[tokio::test]
async fn list_is_sorted_by_name_and_searchable() {
    let (app, _pool) = setup().await;
    let (alice, _) = register_and_login(&app, "alice").await;
    let (bob, _) = register_and_login(&app, "bob").await;
    for name in ["homework", "Travel", "Work", "art"] {
        create_tag(&app, &alice, name).await;
    }
    create_tag(&app, &bob, "Workshop").await;

    let json = expect_json(get_auth(&app, "/api/tags", &alice).await, StatusCode::OK).await;
    assert_eq!(names(&json["data"]), vec!["art", "homework", "Travel", "Work"]);

    let json = expect_json(
        get_auth(&app, "/api/tags?search=WOR", &alice).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(names(&json["data"]), vec!["homework", "Work"]);
}

#[tokio::test]
async fn detail_lists_five_most_recent_diaries() {
    let (app, _pool) = setup().await;
    let (token, _) = register_and_login(&app, "alice").await;
    let tag = create_tag(&app, &token, "Work").await;
    for i in 0..7 {
        create_diary(
            &app,
            &token,
            json!({ "title": format!("d{i}"), "content": "c", "tagIds": [tag] }),
        )
        .await;
    }

    let json = expect_json(
        get_auth(&app, &format!("/api/tags/{tag}"), &token).await,
        StatusCode::OK,
    )
    .await;
    let data = &json["data"];
    assert_eq!(data["name"], "Work");
    assert_eq!(data["usageCount"], 7);

    let recent = data["recentDiaries"].as_array().unwrap();
    assert_eq!(recent.len(), 5);
    assert_eq!(recent[0]["title"], "d6");
    assert_eq!(recent[4]["title"], "d2");
    assert!(recent[0].get("content").is_none());
}

#[tokio::test]
async fn other_users_tags_look_missing() {
    let (app, _pool) = setup().await;
    let (alice, _) = register_and_login(&app, "alice").await;
    let (bob, _) = register_and_login(&app, "bob").await;
    let tag = create_tag(&app, &alice, "Private").await;
    let uri = format!("/api/tags/{tag}");

    for response in [
        get_auth(&app, &uri, &bob).await,
        put_json_auth(&app, &uri, &bob, json!({ "name": "Mine" })).await,
        delete_auth(&app, &uri, &bob).await,
    ] {
        let json = expect_json(response, StatusCode::NOT_FOUND).await;
        assert_eq!(json["message"], "Tag not found");
    }

    let json = expect_json(
        get_auth(&app, "/api/tags/0", &alice).await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(json["message"], "Invalid tag ID");
}

#[tokio::test]
async fn deleting_a_tag_keeps_its_diaries() {
    let (app, pool) = setup().await;
    let (token, _) = register_and_login(&app, "alice").await;
    let tag = create_tag(&app, &token, "Work").await;
    let diary = create_diary(
        &app,
        &token,
        json!({ "title": "t", "content": "c", "tagIds": [tag] }),
    )
    .await;

    let json = expect_json(
        delete_auth(&app, &format!("/api/tags/{tag}"), &token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["message"], "Tag deleted successfully");
    assert_eq!(json["data"], Value::Null);

    let json = expect_json(
        get_auth(&app, &format!("/api/diaries/{}", diary["id"]), &token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"]["tags"], json!([]));
    assert_eq!(count_rows(&pool, "diaries").await, 1);
    assert_eq!(count_rows(&pool, "diary_tags").await, 0);
}
