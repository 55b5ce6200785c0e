/// Integration tests for the user endpoints
///
/// These drive the full router (routing, extraction, validation, error
/// mapping) over an in-memory store.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::TestContext;
use serde_json::{json, Value};

#[tokio::test]
async fn test_documented_scenario() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .send(
            "POST",
            "/users",
            Some(json!({ "email": "a@x.com", "firstName": "A", "lastName": "B" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body,
        json!({ "id": 1, "email": "a@x.com", "firstName": "A", "lastName": "B" })
    );

    let (status, body) = ctx
        .send(
            "POST",
            "/users",
            Some(json!({ "email": "a@x.com", "firstName": "C", "lastName": "D" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email address already exists.");

    let (status, body) = ctx.send("DELETE", "/users/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = ctx.send("GET", "/users/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["message"], "User with ID 1 not found");
}

#[tokio::test]
async fn test_conflict_leaves_original_unchanged() {
    let ctx = TestContext::new();
    let id = ctx.create_user("a@x.com", "Ada", "Lovelace").await;

    let (status, _) = ctx
        .send(
            "POST",
            "/users",
            Some(json!({ "email": "a@x.com", "firstName": "Other", "lastName": "Person" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = ctx.send("GET", &format!("/users/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["firstName"], "Ada");
    assert_eq!(body["lastName"], "Lovelace");
    assert_eq!(ctx.store.len().await, 1);
}

#[tokio::test]
async fn test_list_returns_all_users() {
    let ctx = TestContext::new();

    let (status, body) = ctx.send("GET", "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    ctx.create_user("a@x.com", "A", "B").await;
    ctx.create_user("b@x.com", "C", "D").await;

    let (status, body) = ctx.send("GET", "/users", None).await;
    assert_eq!(status, StatusCode::OK);

    let emails: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["email"].as_str().unwrap())
        .collect();
    assert_eq!(emails, vec!["a@x.com", "b@x.com"]);
}

#[tokio::test]
async fn test_get_returns_created_fields() {
    let ctx = TestContext::new();
    let id = ctx.create_user("grace@example.com", "Grace", "Hopper").await;

    let (status, body) = ctx.send("GET", &format!("/users/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "id": id, "email": "grace@example.com", "firstName": "Grace", "lastName": "Hopper" })
    );
}

#[tokio::test]
async fn test_patch_merges_partial_fields() {
    let ctx = TestContext::new();
    let id = ctx.create_user("a@x.com", "A", "B").await;

    let (status, body) = ctx
        .send(
            "PATCH",
            &format!("/users/{}", id),
            Some(json!({ "lastName": "Z" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "id": id, "email": "a@x.com", "firstName": "A", "lastName": "Z" })
    );
}

#[tokio::test]
async fn test_patch_ignores_id_in_body() {
    let ctx = TestContext::new();
    let id = ctx.create_user("a@x.com", "A", "B").await;

    let (status, body) = ctx
        .send(
            "PATCH",
            &format!("/users/{}", id),
            Some(json!({ "id": 500, "firstName": "Q" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert_eq!(body["firstName"], "Q");
}

#[tokio::test]
async fn test_patch_missing_user_is_404() {
    let ctx = TestContext::new();
    ctx.create_user("a@x.com", "A", "B").await;

    let (status, body) = ctx
        .send("PATCH", "/users/77", Some(json!({ "firstName": "Nobody" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User with ID 77 not found");

    let (_, list) = ctx.send("GET", "/users", None).await;
    assert_eq!(list[0]["firstName"], "A");
}

#[tokio::test]
async fn test_patch_to_taken_email_is_409() {
    let ctx = TestContext::new();
    ctx.create_user("a@x.com", "A", "B").await;
    let second = ctx.create_user("b@x.com", "C", "D").await;

    let (status, body) = ctx
        .send(
            "PATCH",
            &format!("/users/{}", second),
            Some(json!({ "email": "a@x.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["message"],
        "Email address already exists for another user."
    );
}

#[tokio::test]
async fn test_patch_rejects_empty_string() {
    let ctx = TestContext::new();
    let id = ctx.create_user("a@x.com", "A", "B").await;

    let (status, body) = ctx
        .send(
            "PATCH",
            &format!("/users/{}", id),
            Some(json!({ "firstName": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "firstName");
}

#[tokio::test]
async fn test_delete_twice_is_404() {
    let ctx = TestContext::new();
    let id = ctx.create_user("a@x.com", "A", "B").await;
    let uri = format!("/users/{}", id);

    let (status, _) = ctx.send("DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = ctx.send("DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], format!("User with ID {} not found", id));
}

#[tokio::test]
async fn test_create_validation_errors_are_400() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .send(
            "POST",
            "/users",
            Some(json!({ "email": "not-an-email", "firstName": "A", "lastName": "B" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["message"], "Email must be a valid email address");

    let (status, body) = ctx
        .send(
            "POST",
            "/users",
            Some(json!({ "email": "a@x.com", "firstName": "", "lastName": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["firstName", "lastName"]);

    assert!(ctx.store.is_empty().await);
}

#[tokio::test]
async fn test_email_without_tld_is_400() {
    let ctx = TestContext::new();
    let id = ctx.create_user("a@x.com", "A", "B").await;

    for email in ["a@x", "a@localhost"] {
        let (status, body) = ctx
            .send(
                "POST",
                "/users",
                Some(json!({ "email": email, "firstName": "A", "lastName": "B" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "create {}", email);
        assert_eq!(body["message"], "Email must be a valid email address");

        let (status, body) = ctx
            .send(
                "PATCH",
                &format!("/users/{}", id),
                Some(json!({ "email": email })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "update {}", email);
        assert_eq!(body["details"][0]["field"], "email");
    }

    assert_eq!(ctx.store.len().await, 1);
    let (_, body) = ctx.send("GET", &format!("/users/{}", id), None).await;
    assert_eq!(body["email"], "a@x.com");
}

#[tokio::test]
async fn test_long_names_are_accepted() {
    let ctx = TestContext::new();
    let long_name = "A".repeat(300);

    let (status, body) = ctx
        .send(
            "POST",
            "/users",
            Some(json!({ "email": "long@x.com", "firstName": long_name, "lastName": "B" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["firstName"], long_name);
}

#[tokio::test]
async fn test_create_missing_field_is_400() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .send(
            "POST",
            "/users",
            Some(json!({ "email": "a@x.com", "firstName": "A" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert!(body["message"].as_str().unwrap().contains("lastName"));
    assert!(ctx.store.is_empty().await);
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("POST")
        .uri("/users")
        .header("content-type", "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();

    let (status, body) = ctx.send_request(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_missing_content_type_is_400() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("POST")
        .uri("/users")
        .body(Body::from(
            json!({ "email": "a@x.com", "firstName": "A", "lastName": "B" }).to_string(),
        ))
        .unwrap();

    let (status, _) = ctx.send_request(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(ctx.store.is_empty().await);
}

#[tokio::test]
async fn test_malformed_id_is_400() {
    let ctx = TestContext::new();

    for (method, body) in [
        ("GET", None),
        ("PATCH", Some(json!({ "firstName": "A" }))),
        ("DELETE", None),
    ] {
        let (status, response) = ctx.send(method, "/users/abc", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} /users/abc", method);
        assert_eq!(response["message"], "Invalid user ID: abc");
    }
}

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new();

    let (status, body) = ctx.send("GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_cors_preflight_is_answered() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/users")
        .header("origin", "http://localhost:3001")
        .header("access-control-request-method", "PATCH")
        .body(Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(ctx.app.clone(), request)
        .await
        .unwrap();
    assert!(response.status().is_success());
    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));
}
