//! API integration tests
//!
//! Each test starts its own server on an ephemeral port with an empty shelf.

use std::time::Duration;

use bookshelf_server::{api, repository::Repository, services::Services, AppState};
use reqwest::Client;
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Start a server and return its base URL
async fn spawn_app() -> String {
    let state = AppState::new(Services::new(Repository::new()));
    let app = api::create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server error");
    });

    format!("http://{}", addr)
}

async fn create_book(client: &Client, base_url: &str, payload: Value) -> String {
    let response = client
        .post(format!("{}/books", base_url))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    body["data"]["bookId"]
        .as_str()
        .expect("No book ID")
        .to_string()
}

async fn list_names(client: &Client, base_url: &str, query: &str) -> Vec<String> {
    let response = client
        .get(format!("{}/books{}", base_url, query))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "success");
    body["data"]["books"]
        .as_array()
        .expect("No books array")
        .iter()
        .map(|book| book["name"].as_str().unwrap_or_default().to_string())
        .collect()
}

fn full_payload(name: &str, page_count: u32, read_page: u32, reading: bool) -> Value {
    json!({
        "name": name,
        "year": 2010,
        "author": "John Doe",
        "summary": "Lorem ipsum dolor sit amet",
        "publisher": "Dicoding Indonesia",
        "pageCount": page_count,
        "readPage": read_page,
        "reading": reading
    })
}

#[tokio::test]
async fn test_health_check() {
    let base_url = spawn_app().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/health", base_url))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_readiness_reports_book_count() {
    let base_url = spawn_app().await;
    let client = Client::new();
    create_book(&client, &base_url, full_payload("X", 10, 0, false)).await;

    let response = client
        .get(format!("{}/ready", base_url))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
    assert_eq!(body["books"], 1);
}

#[tokio::test]
async fn test_book_lifecycle() {
    let base_url = spawn_app().await;
    let client = Client::new();

    // Create
    let response = client
        .post(format!("{}/books", base_url))
        .json(&full_payload("X", 100, 100, false))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Buku berhasil ditambahkan");
    let book_id = body["data"]["bookId"].as_str().expect("No book ID").to_string();
    assert_eq!(book_id.len(), 16);

    // Get
    let response = client
        .get(format!("{}/books/{}", base_url, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    let created = body["data"]["book"].clone();
    assert_eq!(created["id"], book_id.as_str());
    assert_eq!(created["name"], "X");
    assert_eq!(created["year"], 2010);
    assert_eq!(created["publisher"], "Dicoding Indonesia");
    assert_eq!(created["readPage"], 100);
    assert_eq!(created["finished"], true);
    assert_eq!(created["reading"], false);
    assert_eq!(created["insertedAt"], created["updatedAt"]);

    // Update
    tokio::time::sleep(Duration::from_millis(5)).await;
    let response = client
        .put(format!("{}/books/{}", base_url, book_id))
        .json(&full_payload("X", 100, 50, true))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Buku berhasil diperbarui");

    let body: Value = client
        .get(format!("{}/books/{}", base_url, book_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let updated = &body["data"]["book"];
    assert_eq!(updated["id"], book_id.as_str());
    assert_eq!(updated["readPage"], 50);
    assert_eq!(updated["finished"], false);
    assert_eq!(updated["reading"], true);
    assert_eq!(updated["insertedAt"], created["insertedAt"]);
    assert_ne!(updated["updatedAt"], created["updatedAt"]);

    // Delete
    let response = client
        .delete(format!("{}/books/{}", base_url, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Buku berhasil dihapus");

    // Delete again
    let response = client
        .delete(format!("{}/books/{}", base_url, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Buku gagal dihapus. Id tidak ditemukan");
}

#[tokio::test]
async fn test_create_validation() {
    let base_url = spawn_app().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/books", base_url))
        .json(&json!({ "pageCount": 10, "readPage": 1 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Gagal menambahkan buku. Mohon isi nama buku");

    let response = client
        .post(format!("{}/books", base_url))
        .json(&full_payload("X", 10, 11, false))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        body["message"],
        "Gagal menambahkan buku. readPage tidak boleh lebih besar dari pageCount"
    );

    assert!(list_names(&client, &base_url, "").await.is_empty());
}

#[tokio::test]
async fn test_malformed_payload() {
    let base_url = spawn_app().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/books", base_url))
        .json(&json!({ "name": "X", "pageCount": -5 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "fail");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_update_errors() {
    let base_url = spawn_app().await;
    let client = Client::new();
    let book_id = create_book(&client, &base_url, full_payload("X", 10, 0, false)).await;

    let response = client
        .put(format!("{}/books/{}", base_url, book_id))
        .json(&json!({ "name": "", "pageCount": 10, "readPage": 0 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Gagal memperbarui buku. Mohon isi nama buku");

    let response = client
        .put(format!("{}/books/{}", base_url, book_id))
        .json(&full_payload("X", 10, 20, false))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        body["message"],
        "Gagal memperbarui buku. readPage tidak boleh lebih besar dari pageCount"
    );

    let response = client
        .put(format!("{}/books/unknown-book-id", base_url))
        .json(&full_payload("Y", 10, 0, false))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Gagal memperbarui buku. Id tidak ditemukan");

    assert_eq!(list_names(&client, &base_url, "").await, vec!["X"]);
}

#[tokio::test]
async fn test_get_unknown_book() {
    let base_url = spawn_app().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/books/unknown-book-id", base_url))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Buku tidak ditemukan");
}

#[tokio::test]
async fn test_list_filters() {
    let base_url = spawn_app().await;
    let client = Client::new();

    create_book(&client, &base_url, full_payload("Harry Potter", 100, 100, true)).await;
    create_book(&client, &base_url, full_payload("harry potter and stuff", 100, 10, false)).await;
    create_book(&client, &base_url, full_payload("Dune", 300, 300, false)).await;

    let response = client
        .get(format!("{}/books", base_url))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let first = &body["data"]["books"][0];
    assert_eq!(first["publisher"], "Dicoding Indonesia");
    assert!(first.get("readPage").is_none());
    assert!(first.as_object().map_or(false, |book| book.len() == 3));

    assert_eq!(
        list_names(&client, &base_url, "?name=harry").await,
        vec!["Harry Potter", "harry potter and stuff"]
    );
    assert_eq!(
        list_names(&client, &base_url, "?reading=1").await,
        vec!["Harry Potter"]
    );
    assert_eq!(
        list_names(&client, &base_url, "?reading=0").await,
        vec!["harry potter and stuff", "Dune"]
    );
    assert_eq!(
        list_names(&client, &base_url, "?finished=1").await,
        vec!["Harry Potter", "Dune"]
    );
    assert_eq!(
        list_names(&client, &base_url, "?finished=0").await,
        vec!["harry potter and stuff"]
    );
    assert_eq!(
        list_names(&client, &base_url, "?name=HARRY&finished=1").await,
        vec!["Harry Potter"]
    );
    assert_eq!(list_names(&client, &base_url, "?finished=").await.len(), 3);
    assert!(list_names(&client, &base_url, "?name=tolkien").await.is_empty());
}

#[tokio::test]
async fn test_scalar_fields_round_trip_unchanged() {
    let base_url = spawn_app().await;
    let client = Client::new();

    let book_id = create_book(
        &client,
        &base_url,
        json!({
            "name": "X",
            "year": "2010",
            "author": 42,
            "summary": ["part one", "part two"],
            "pageCount": 10,
            "readPage": 1
        }),
    )
    .await;

    let body: Value = client
        .get(format!("{}/books/{}", base_url, book_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let book = &body["data"]["book"];
    assert_eq!(book["year"], "2010");
    assert_eq!(book["author"], 42);
    assert_eq!(book["summary"], json!(["part one", "part two"]));
    assert!(book["publisher"].is_null());
}

#[tokio::test]
async fn test_missing_name_wins_over_odd_scalars() {
    let base_url = spawn_app().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/books", base_url))
        .json(&json!({ "year": "2010", "author": 42, "pageCount": 10, "readPage": 1 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Gagal menambahkan buku. Mohon isi nama buku");
}

#[tokio::test]
async fn test_malformed_query() {
    let base_url = spawn_app().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/books?name=a&name=b", base_url))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "fail");
    assert!(body["message"].is_string());
}
