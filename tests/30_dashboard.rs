mod common;

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use common::{certificate_form, TestServer};

/// Fill the form and submit it, returning the response body
async fn create(server: &TestServer, token: &str, name: &str, serial: &str) -> Result<Value> {
    let (status, _) = server
        .admin(token, Method::PUT, "/dashboard/form", Some(certificate_form(name, serial)))
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server.admin(token, Method::POST, "/dashboard/form", None).await?;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
    Ok(body)
}

async fn show_table(server: &TestServer, token: &str) -> Result<Value> {
    let (status, body) = server.admin(token, Method::POST, "/dashboard/visibility", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["dashboard"]["show_table"], true);
    Ok(body)
}

fn listed(body: &Value) -> Vec<Value> {
    body["data"]["dashboard"]["certificates"]
        .as_array()
        .cloned()
        .unwrap_or_default()
}

#[tokio::test]
async fn test_created_certificate_is_listed_first() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.login().await?;

    create(&server, &token, "Ann Older", "S-1").await?;
    let body = create(&server, &token, "Bob Newer", "S-2").await?;
    assert_eq!(body["data"]["notice"], "Certificate created!");

    // Form is cleared back to create mode with the default status
    let form = &body["data"]["dashboard"]["form"];
    assert!(form["id"].is_null());
    assert_eq!(form["fields"]["student_name"], "");
    assert_eq!(form["fields"]["completion_status"], "Completed");

    let body = show_table(&server, &token).await?;
    let rows = listed(&body);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["student_name"], "Bob Newer");
    assert_eq!(rows[1]["student_name"], "Ann Older");
    Ok(())
}

#[tokio::test]
async fn test_submit_rejects_incomplete_form() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.login().await?;

    server
        .admin(&token, Method::PUT, "/dashboard/form", Some(json!({ "student_name": "Ann" })))
        .await?;
    let (status, body) = server.admin(&token, Method::POST, "/dashboard/form", None).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["serial_number"].is_string());
    assert!(body["field_errors"].get("student_name").is_none());
    assert!(server.store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn test_submit_rejects_malformed_email() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.login().await?;

    let mut form = certificate_form("Ann", "S-1");
    form["student_email"] = json!("not-an-email");
    server.admin(&token, Method::PUT, "/dashboard/form", Some(form)).await?;

    let (status, body) = server.admin(&token, Method::POST, "/dashboard/form", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["student_email"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_edit_updates_existing_record() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.login().await?;

    create(&server, &token, "Ann", "S-1").await?;
    let body = show_table(&server, &token).await?;
    let id = listed(&body)[0]["id"].as_str().context("row id")?.to_string();

    let (status, body) = server
        .admin(&token, Method::POST, &format!("/dashboard/certificates/{}/edit", id), None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["dashboard"]["editing"], true);
    assert_eq!(body["data"]["dashboard"]["form"]["focused"], true);
    assert_eq!(body["data"]["dashboard"]["form"]["fields"]["student_name"], "Ann");

    server
        .admin(
            &token,
            Method::PUT,
            "/dashboard/form",
            Some(json!({ "course_name": "Advanced React", "completion_status": "In Progress" })),
        )
        .await?;
    let (status, body) = server.admin(&token, Method::POST, "/dashboard/form", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["notice"], "Certificate updated!");
    assert_eq!(body["data"]["dashboard"]["editing"], false);

    let rows = listed(&body);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], id.as_str());
    assert_eq!(rows[0]["course_name"], "Advanced React");
    assert_eq!(rows[0]["completion_status"], "In Progress");
    Ok(())
}

#[tokio::test]
async fn test_cancel_edit_clears_form() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.login().await?;

    create(&server, &token, "Ann", "S-1").await?;
    let body = show_table(&server, &token).await?;
    let id = listed(&body)[0]["id"].as_str().context("row id")?.to_string();
    server
        .admin(&token, Method::POST, &format!("/dashboard/certificates/{}/edit", id), None)
        .await?;

    let (status, body) = server.admin(&token, Method::DELETE, "/dashboard/form", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["notice"], "Form cleared");
    assert_eq!(body["data"]["dashboard"]["editing"], false);
    assert_eq!(server.store.len().await, 1);
    Ok(())
}

#[tokio::test]
async fn test_edit_of_unlisted_record_is_not_found() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.login().await?;

    let (status, _) = server
        .admin(&token, Method::POST, "/dashboard/certificates/missing/edit", None)
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_delete_requires_confirmation() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.login().await?;

    create(&server, &token, "Ann", "S-1").await?;
    let body = show_table(&server, &token).await?;
    let id = listed(&body)[0]["id"].as_str().context("row id")?.to_string();

    let path = format!("/dashboard/certificates/{}", id);
    let (status, body) = server.admin(&token, Method::DELETE, &path, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["notice"], "Delete cancelled");
    assert_eq!(server.store.len().await, 1);

    let (status, body) = server
        .admin(&token, Method::DELETE, &format!("{}?confirm=true", path), None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["notice"], "Deleted successfully");
    assert_eq!(body["data"]["dashboard"]["total"], 0);
    assert!(server.store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn test_search_filters_without_touching_store() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.login().await?;

    create(&server, &token, "Jane Doe", "S-1").await?;
    create(&server, &token, "Mark Twain", "S-2").await?;
    create(&server, &token, "John Doe", "S-3").await?;
    show_table(&server, &token).await?;

    let (status, body) = server
        .admin(&token, Method::PUT, "/dashboard/search", Some(json!({ "query": "doe" })))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["dashboard"]["total"], 3);
    assert_eq!(body["data"]["dashboard"]["matching"], 2);

    let names: Vec<_> = listed(&body)
        .iter()
        .map(|row| row["student_name"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(names, vec!["John Doe", "Jane Doe"]);

    let (_, body) = server
        .admin(&token, Method::PUT, "/dashboard/search", Some(json!({ "query": "" })))
        .await?;
    assert_eq!(body["data"]["dashboard"]["matching"], 3);
    Ok(())
}

#[tokio::test]
async fn test_store_failure_surfaces_with_prefix() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.login().await?;
    server.store.set_write_failure(Some("duplicate key value".to_string())).await;

    server
        .admin(&token, Method::PUT, "/dashboard/form", Some(certificate_form("Ann", "S-1")))
        .await?;
    let (status, body) = server.admin(&token, Method::POST, "/dashboard/form", None).await?;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let message = body["message"].as_str().unwrap_or_default();
    assert!(message.starts_with("Error: "), "message: {}", message);
    assert!(message.contains("duplicate key value"), "message: {}", message);

    // The form keeps its input so the admin can retry
    let (_, body) = server.admin(&token, Method::GET, "/dashboard", None).await?;
    assert_eq!(body["data"]["form"]["fields"]["student_name"], "Ann");
    Ok(())
}
