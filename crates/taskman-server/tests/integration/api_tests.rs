use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::json;

use taskman_server::routes::MAX_BODY_BYTES;

use crate::integration::common::{delete, get, post_json, put_json, setup_test_app};

#[tokio::test]
async fn welcome_is_public() {
    let app = setup_test_app().await;

    let response = app.send(get("/", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"Welcome to Taskman");
}

#[tokio::test]
async fn health_reports_backend() {
    let app = setup_test_app().await;

    let (status, json) = app.send_json(get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "ok");
    assert_eq!(json["backend"], "memory");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = setup_test_app().await;

    let (status, json) = app.send_json(get("/api-docs/openapi.json", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/api/tasks"].is_object());
    assert!(json["paths"]["/api/login"].is_object());
    assert!(json["components"]["securitySchemes"]["bearer"].is_object());
}

#[tokio::test]
async fn protected_routes_require_token() {
    let app = setup_test_app().await;

    for uri in ["/api/users", "/api/tasks", "/api/labels", "/api/task_statuses"] {
        let (status, json) = app.send_json(get(uri, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(json["error"], "unauthorized");
    }

    let (status, _) = app.send_json(get("/api/users", Some("not-a-jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = setup_test_app().await;

    let (status, json) = app
        .send_json(post_json(
            "/api/login",
            None,
            &json!({ "username": "hexlet@example.com", "password": "wrong" }),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "invalid_credentials");

    let (status, _) = app
        .send_json(post_json(
            "/api/login",
            None,
            &json!({ "username": "nobody@example.com", "password": "qwerty" }),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_validates_input() {
    let app = setup_test_app().await;

    let (status, json) = app
        .send_json(post_json(
            "/api/users",
            None,
            &json!({ "email": "not-an-email", "password": "ab" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
    assert!(json["fields"]["email"].is_string());
    assert_eq!(json["fields"]["password"], "Minimum 3 characters");
}

#[tokio::test]
async fn malformed_body_returns_400() {
    let app = setup_test_app().await;
    let token = app.admin_token().await;

    let response = app
        .send(
            Request::post("/api/labels")
                .header("authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["fields"]["body"].is_string());
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let app = setup_test_app().await;
    app.register("jack@example.com", "secret").await;

    let (status, json) = app
        .send_json(post_json(
            "/api/users",
            None,
            &json!({ "email": "jack@example.com", "password": "other" }),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "conflict");
}

#[tokio::test]
async fn registered_user_can_edit_only_themselves() {
    let app = setup_test_app().await;
    let jack = app.register("jack@example.com", "secret").await;
    let jill = app.register("jill@example.com", "secret").await;
    let token = app.login("jack@example.com", "secret").await;

    let (status, json) = app
        .send_json(put_json(
            &format!("/api/users/{jack}"),
            Some(&token),
            &json!({ "firstName": "Jack" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["firstName"], "Jack");
    assert_eq!(json["email"], "jack@example.com");
    assert!(json.get("password").is_none());
    assert!(json.get("passwordDigest").is_none());

    let (status, json) = app
        .send_json(put_json(
            &format!("/api/users/{jill}"),
            Some(&token),
            &json!({ "firstName": "Mallory" }),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"], "forbidden");

    let (status, _) = app
        .send_json(delete(&format!("/api/users/{jill}"), Some(&token)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = app.admin_token().await;
    let (status, _) = app
        .send_json(delete(&format!("/api/users/{jill}"), Some(&admin)))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .send_json(get(&format!("/api/users/{jill}"), Some(&admin)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn password_change_takes_effect() {
    let app = setup_test_app().await;
    let jack = app.register("jack@example.com", "secret").await;
    let token = app.login("jack@example.com", "secret").await;

    let (status, _) = app
        .send_json(put_json(
            &format!("/api/users/{jack}"),
            Some(&token),
            &json!({ "password": "new-secret" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send_json(post_json(
            "/api/login",
            None,
            &json!({ "username": "jack@example.com", "password": "secret" }),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    app.login("jack@example.com", "new-secret").await;
}

#[tokio::test]
async fn user_list_is_paginated_with_total_header() {
    let app = setup_test_app().await;
    for name in ["ann", "bob", "cat"] {
        app.register(&format!("{name}@example.com"), "secret").await;
    }
    let token = app.admin_token().await;

    let response = app.send(get("/api/users?page=1&size=2", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-total-count"], "4");

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 2);

    let (_, json) = app
        .send_json(get("/api/users?emailCont=BO", Some(&token)))
        .await;
    let items = json.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["email"], "bob@example.com");
}

#[tokio::test]
async fn task_lifecycle() {
    let app = setup_test_app().await;
    let token = app.admin_token().await;
    let jack = app.register("jack@example.com", "secret").await;

    let (_, labels) = app.send_json(get("/api/labels", Some(&token))).await;
    let bug = labels
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["name"] == "bug")
        .unwrap()["id"]
        .as_i64()
        .unwrap();

    let (status, task) = app
        .send_json(post_json(
            "/api/tasks",
            Some(&token),
            &json!({
                "title": "Fix login",
                "content": "Users cannot log in",
                "status": "draft",
                "assigneeId": jack,
                "taskLabelIds": [bug],
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{task}");
    assert_eq!(task["status"], "draft");
    assert_eq!(task["assigneeId"], jack);
    assert_eq!(task["taskLabelIds"], json!([bug]));
    let id = task["id"].as_i64().unwrap();

    let (status, updated) = app
        .send_json(put_json(
            &format!("/api/tasks/{id}"),
            Some(&token),
            &json!({ "status": "to_review", "assigneeId": null, "taskLabelIds": [] }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "to_review");
    assert!(updated.get("assigneeId").is_none());
    assert_eq!(updated["taskLabelIds"], json!([]));
    assert_eq!(updated["title"], "Fix login");

    let response = app
        .send(get("/api/tasks?status=to_review&titleCont=LOGIN", Some(&token)))
        .await;
    assert_eq!(response.headers()["x-total-count"], "1");

    let (status, _) = app
        .send_json(delete(&format!("/api/tasks/{id}"), Some(&token)))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .send_json(get(&format!("/api/tasks/{id}"), Some(&token)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn task_with_unknown_references_is_rejected() {
    let app = setup_test_app().await;
    let token = app.admin_token().await;

    let (status, json) = app
        .send_json(post_json(
            "/api/tasks",
            Some(&token),
            &json!({ "title": "Orphan", "status": "nonexistent" }),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");

    let (status, _) = app
        .send_json(post_json(
            "/api/tasks",
            Some(&token),
            &json!({ "title": "Orphan", "status": "draft", "assigneeId": 9999 }),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send_json(post_json(
            "/api/tasks",
            Some(&token),
            &json!({ "title": "Orphan", "status": "draft", "taskLabelIds": [9999] }),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = app
        .send_json(post_json(
            "/api/tasks",
            Some(&token),
            &json!({ "title": "  ", "status": "draft" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["fields"]["title"].is_string());
}

#[tokio::test]
async fn referenced_rows_cannot_be_deleted() {
    let app = setup_test_app().await;
    let token = app.admin_token().await;

    let (_, label) = app
        .send_json(post_json("/api/labels", Some(&token), &json!({ "name": "backend" })))
        .await;
    let label_id = label["id"].as_i64().unwrap();

    let (status, json) = app
        .send_json(post_json(
            "/api/task_statuses",
            Some(&token),
            &json!({ "name": "Blocked", "slug": "blocked" }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let status_id = json["id"].as_i64().unwrap();

    let (status, _) = app
        .send_json(post_json(
            "/api/tasks",
            Some(&token),
            &json!({ "title": "Waiting", "status": "blocked", "taskLabelIds": [label_id] }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .send_json(delete(&format!("/api/task_statuses/{status_id}"), Some(&token)))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .send_json(delete(&format!("/api/labels/{label_id}"), Some(&token)))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn status_and_label_names_are_unique() {
    let app = setup_test_app().await;
    let token = app.admin_token().await;

    let (status, _) = app
        .send_json(post_json(
            "/api/task_statuses",
            Some(&token),
            &json!({ "name": "Another draft", "slug": "draft" }),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .send_json(post_json("/api/labels", Some(&token), &json!({ "name": "bug" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let response = app.send(get("/api/task_statuses", Some(&token))).await;
    assert_eq!(response.headers()["x-total-count"], "5");
}

#[tokio::test]
async fn sentry_test_message_is_admin_only() {
    let app = setup_test_app().await;
    app.register("jack@example.com", "secret").await;
    let user = app.login("jack@example.com", "secret").await;
    let admin = app.admin_token().await;

    let (status, _) = app
        .send_json(get("/api/debug/sentry-message", Some(&user)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let response = app
        .send(get("/api/debug/sentry-message", Some(&admin)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn welcome_is_also_served_at_welcome_path() {
    let app = setup_test_app().await;

    let response = app.send(get("/welcome", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"Welcome to Taskman");
}

#[tokio::test]
async fn sentry_test_exception_is_admin_only() {
    let app = setup_test_app().await;
    app.register("jack@example.com", "secret").await;
    let user = app.login("jack@example.com", "secret").await;
    let admin = app.admin_token().await;

    let (status, _) = app
        .send_json(get("/api/debug/sentry-test", Some(&user)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let response = app.send(get("/api/debug/sentry-test", Some(&admin))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn overlong_title_is_a_validation_error() {
    let app = setup_test_app().await;
    let token = app.admin_token().await;

    let (status, json) = app
        .send_json(post_json(
            "/api/tasks",
            Some(&token),
            &json!({ "title": "x".repeat(256), "status": "draft" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
    assert_eq!(json["fields"]["title"], "size must be at most 255");

    let (status, _) = app
        .send_json(post_json(
            "/api/tasks",
            Some(&token),
            &json!({ "title": "x".repeat(255), "status": "draft" }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let app = setup_test_app().await;
    let payload = vec![b' '; MAX_BODY_BYTES + 1];

    let response = app
        .send(
            Request::post("/api/users")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::CONTENT_LENGTH, payload.len())
                .body(Body::from(payload))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn cors_exposes_total_count() {
    let app = setup_test_app().await;
    let token = app.admin_token().await;

    let response = app
        .send(
            Request::get("/api/labels")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let exposed = response.headers()[header::ACCESS_CONTROL_EXPOSE_HEADERS]
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(exposed.contains("x-total-count"), "{exposed}");
}

#[tokio::test]
async fn malformed_path_and_query_return_json_errors() {
    let app = setup_test_app().await;
    let token = app.admin_token().await;

    let (status, json) = app.send_json(get("/api/tasks/abc", Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
    assert!(json["fields"]["path"].is_string());

    let (status, json) = app
        .send_json(get("/api/tasks?assigneeId=abc", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
    assert!(json["fields"]["query"].is_string());
}
