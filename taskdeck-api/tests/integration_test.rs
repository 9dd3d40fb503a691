/// Integration tests for the Taskdeck API
///
/// Drive the complete router (auth middleware, CORS, security headers)
/// over in-memory storage:
/// - Registration, login and the current identity
/// - Task CRUD and status changes over REST
/// - Ownership isolation
/// - The GraphQL surface
mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{TestContext, SUBJECT_HEADER};
use serde_json::{json, Value};

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new();
    let (status, body) = ctx.send("GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "connected");
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_register_login_and_me() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .send(
            "POST",
            "/v1/auth/register",
            None,
            Some(json!({ "name": "Ann", "email": "Ann@X.com", "password": "secret1" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "ann@x.com");
    assert_eq!(body["user"]["username"], "ann");
    assert!(body["user"].get("password_hash").is_none());

    let (status, login) = ctx
        .send(
            "POST",
            "/v1/auth/login",
            None,
            Some(json!({ "emailOrUsername": "ANN", "password": "secret1" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = login["token"].as_str().unwrap();

    let (status, me) = ctx.send("GET", "/v1/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], body["user"]["id"]);
    assert_eq!(me["name"], "Ann");
}

#[tokio::test]
async fn test_login_failures_share_one_message() {
    let ctx = TestContext::new();
    ctx.register("Ann", "ann@x.com").await;

    let (wrong_status, wrong) = ctx
        .send(
            "POST",
            "/v1/auth/login",
            None,
            Some(json!({ "emailOrUsername": "ann@x.com", "password": "wrong" })),
        )
        .await;
    let (unknown_status, unknown) = ctx
        .send(
            "POST",
            "/v1/auth/login",
            None,
            Some(json!({ "emailOrUsername": "bob@x.com", "password": "secret1" })),
        )
        .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong["message"], "Invalid email/username or password");
    assert_eq!(wrong["message"], unknown["message"]);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let ctx = TestContext::new();
    ctx.register("Ann", "ann@x.com").await;

    let (status, body) = ctx
        .send(
            "POST",
            "/v1/auth/register",
            None,
            Some(json!({ "name": "Ann Again", "email": "ANN@x.com", "password": "secret2" })),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
    assert_eq!(body["message"], "User already exists with this email or username");
}

#[tokio::test]
async fn test_registration_validation() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .send(
            "POST",
            "/v1/auth/register",
            None,
            Some(json!({ "name": "Ann", "email": "not-an-email", "password": "123" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
}

#[tokio::test]
async fn test_external_subject_registration() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/register")
        .header(SUBJECT_HEADER, "auth0|abc123")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "name": "Gateway User", "email": "gw@x.com" }).to_string(),
        ))
        .unwrap();
    let (status, registered) = ctx.dispatch(request).await;
    assert_eq!(status, StatusCode::CREATED);

    let request = Request::builder()
        .uri("/v1/auth/me")
        .header(SUBJECT_HEADER, "auth0|abc123")
        .body(Body::empty())
        .unwrap();
    let (status, me) = ctx.dispatch(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], registered["user"]["id"]);
}

#[tokio::test]
async fn test_task_lifecycle() {
    let ctx = TestContext::new();
    let token = ctx.register("Ann", "ann@x.com").await;

    let created = ctx.create_task(&token, "  Buy milk  ").await;
    assert_eq!(created["title"], "Buy milk");
    assert_eq!(created["status"], "PENDING");
    assert_eq!(created["description"], Value::Null);
    let id = created["id"].as_str().unwrap();
    let uri = format!("/v1/tasks/{id}");

    let (status, list) = ctx.send("GET", "/v1/tasks", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["title"], "Buy milk");

    let (status, updated) = ctx
        .send(
            "PATCH",
            &uri,
            Some(&token),
            Some(json!({ "title": "Buy oat milk", "description": "2 litres" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Buy oat milk");
    assert_eq!(updated["description"], "2 litres");
    assert_eq!(updated["userId"], created["userId"]);

    let (status, cleared) = ctx
        .send("PATCH", &uri, Some(&token), Some(json!({ "description": null })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleared["description"], Value::Null);
    assert_eq!(cleared["title"], "Buy oat milk");

    let (status, done) = ctx
        .send(
            "PATCH",
            &format!("{uri}/status"),
            Some(&token),
            Some(json!({ "status": "DONE" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["status"], "DONE");

    let (status, deleted) = ctx.send("DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["message"], "Task deleted successfully");

    let (status, missing) = ctx.send("GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["message"], "Task not found");
}

#[tokio::test]
async fn test_task_validation_errors() {
    let ctx = TestContext::new();
    let token = ctx.register("Ann", "ann@x.com").await;

    let (status, body) = ctx
        .send("POST", "/v1/tasks", Some(&token), Some(json!({ "title": "   " })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Title is required");

    let task = ctx.create_task(&token, "Write report").await;
    let (status, body) = ctx
        .send(
            "PATCH",
            &format!("/v1/tasks/{}/status", task["id"].as_str().unwrap()),
            Some(&token),
            Some(json!({ "status": "pending" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["message"],
        "Valid status is required (PENDING, IN_PROGRESS, DONE, ARCHIVED)"
    );

    let (_, unchanged) = ctx
        .send(
            "GET",
            &format!("/v1/tasks/{}", task["id"].as_str().unwrap()),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(unchanged["status"], "PENDING");
}

#[tokio::test]
async fn test_edit_cannot_change_status() {
    let ctx = TestContext::new();
    let token = ctx.register("Ann", "ann@x.com").await;
    let task = ctx.create_task(&token, "Write report").await;
    let uri = format!("/v1/tasks/{}", task["id"].as_str().unwrap());

    let (status, body) = ctx
        .send(
            "PATCH",
            &uri,
            Some(&token),
            Some(json!({ "title": "Renamed", "status": "ARCHIVED" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (_, unchanged) = ctx.send("GET", &uri, Some(&token), None).await;
    assert_eq!(unchanged["status"], "PENDING");
    assert_eq!(unchanged["title"], "Write report");
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let ctx = TestContext::new();
    let token = ctx.register("Ann", "ann@x.com").await;

    let request = Request::builder()
        .method("POST")
        .uri("/v1/tasks")
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = ctx.dispatch(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_tasks_are_isolated_between_owners() {
    let ctx = TestContext::new();
    let ann = ctx.register("Ann", "ann@x.com").await;
    let bob = ctx.register("Bob", "bob@x.com").await;

    let task = ctx.create_task(&ann, "Private").await;
    let uri = format!("/v1/tasks/{}", task["id"].as_str().unwrap());

    let (status, _) = ctx.send("GET", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .send("PATCH", &uri, Some(&bob), Some(json!({ "title": "Mine now" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.send("DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, bobs) = ctx.send("GET", "/v1/tasks", Some(&bob), None).await;
    assert!(bobs.as_array().unwrap().is_empty());

    let (_, still_there) = ctx.send("GET", &uri, Some(&ann), None).await;
    assert_eq!(still_there["title"], "Private");
}

#[tokio::test]
async fn test_authentication_required() {
    let ctx = TestContext::new();

    let (status, body) = ctx.send("GET", "/v1/tasks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authentication required");

    let (status, _) = ctx.send("GET", "/v1/tasks/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .send("GET", "/v1/tasks", Some("garbage.token.value"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_task_id_is_not_found() {
    let ctx = TestContext::new();
    let token = ctx.register("Ann", "ann@x.com").await;

    let (status, body) = ctx
        .send("GET", "/v1/tasks/not-a-uuid", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Task not found");
}

#[tokio::test]
async fn test_security_headers() {
    let ctx = TestContext::new();

    let response = tower::ServiceExt::oneshot(
        ctx.app.clone(),
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");

    let response = tower::ServiceExt::oneshot(
        ctx.app.clone(),
        Request::builder().uri("/graphql").body(Body::empty()).unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let csp = response.headers()["content-security-policy"].to_str().unwrap();
    assert!(csp.contains("https://unpkg.com"));
}

#[tokio::test]
async fn test_graphql_flow() {
    let ctx = TestContext::new();

    let registered = ctx
        .graphql(
            None,
            r#"mutation($name: String!, $email: String!, $password: String!) {
                registerUser(name: $name, email: $email, password: $password) {
                    token
                    user { id email }
                }
            }"#,
            json!({ "name": "Ann", "email": "ann@x.com", "password": "secret1" }),
        )
        .await;
    let token = registered["data"]["registerUser"]["token"]
        .as_str()
        .unwrap()
        .to_string();

    let created = ctx
        .graphql(
            Some(&token),
            r#"mutation { createTask(title: "Buy milk", description: "2 litres") { id status description } }"#,
            json!({}),
        )
        .await;
    let task = &created["data"]["createTask"];
    assert_eq!(task["status"], "PENDING");
    let id = task["id"].as_str().unwrap();

    let changed = ctx
        .graphql(
            Some(&token),
            r#"mutation($id: ID!) { changeTaskStatus(id: $id, status: IN_PROGRESS) { status updatedAt } }"#,
            json!({ "id": id }),
        )
        .await;
    assert_eq!(changed["data"]["changeTaskStatus"]["status"], "IN_PROGRESS");

    let cleared = ctx
        .graphql(
            Some(&token),
            r#"mutation($id: ID!) { updateTask(id: $id, description: null) { title description } }"#,
            json!({ "id": id }),
        )
        .await;
    assert_eq!(cleared["data"]["updateTask"]["title"], "Buy milk");
    assert_eq!(cleared["data"]["updateTask"]["description"], Value::Null);

    let listed = ctx
        .graphql(Some(&token), "{ me { email } tasks { id } }", json!({}))
        .await;
    assert_eq!(listed["data"]["me"]["email"], "ann@x.com");
    assert_eq!(listed["data"]["tasks"].as_array().unwrap().len(), 1);

    let deleted = ctx
        .graphql(
            Some(&token),
            "mutation($id: ID!) { deleteTask(id: $id) }",
            json!({ "id": id }),
        )
        .await;
    assert_eq!(deleted["data"]["deleteTask"], true);
}

#[tokio::test]
async fn test_graphql_error_codes() {
    let ctx = TestContext::new();

    let anonymous = ctx.graphql(None, "{ tasks { id } }", json!({})).await;
    assert_eq!(anonymous["errors"][0]["extensions"]["code"], "UNAUTHENTICATED");

    let token = ctx.register("Ann", "ann@x.com").await;
    let invalid = ctx
        .graphql(Some(&token), r#"mutation { createTask(title: "") { id } }"#, json!({}))
        .await;
    assert_eq!(invalid["errors"][0]["extensions"]["code"], "BAD_USER_INPUT");
    assert_eq!(invalid["errors"][0]["message"], "Title is required");

    let failed_login = ctx
        .graphql(
            None,
            r#"mutation { loginUser(emailOrUsername: "ann", password: "nope") { token } }"#,
            json!({}),
        )
        .await;
    assert_eq!(
        failed_login["errors"][0]["extensions"]["code"],
        "UNAUTHENTICATED"
    );
}
