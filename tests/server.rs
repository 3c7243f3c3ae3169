//! HTTP API tests: start the server on a free port and drive it with reqwest.

use serde_json::{json, Value};

use coachdesk::config::Config;
use coachdesk::server::run_server;
use coachdesk_core::assistant::Assistant;

fn test_config_with_port(port: u16, max_sessions: usize) -> Config {
    let config_content = format!(
        r#"
[server]
bind = "127.0.0.1:{}"
max_sessions = {}
"#,
        port, max_sessions
    );
    toml::from_str(&config_content).unwrap()
}

fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn wait_for_server(port: u16) {
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
    }
    panic!("Server did not become ready within 5 seconds");
}

/// Start a server with built-in content; returns its base URL.
async fn start_server(max_sessions: usize) -> (String, tokio::task::JoinHandle<()>) {
    let port = find_free_port();
    let cfg = test_config_with_port(port, max_sessions);
    let assistant = Assistant::builtin().unwrap();

    let handle = tokio::spawn(async move {
        run_server(&cfg, assistant).await.ok();
    });
    wait_for_server(port).await;

    (format!("http://127.0.0.1:{}", port), handle)
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health() {
    let (base, handle) = start_server(10).await;

    let body: Value = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());

    handle.abort();
}

#[tokio::test]
async fn test_ask_endpoint() {
    let (base, handle) = start_server(10).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/ask", base))
        .json(&json!({"query": "how do I book for an athlete", "role": "coach"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["match"]["title"], "Booking for an Athlete");
    assert_eq!(body["match"]["fallback"], false);

    // Role defaults to visitor
    let body: Value = client
        .post(format!("{}/ask", base))
        .json(&json!({"query": "xyzxyz nonsense qwerty"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["match"]["title"], "How Can I Help, Guest?");
    assert_eq!(body["match"]["fallback"], true);
    assert_eq!(body["match"]["score"], 0);
    assert_eq!(body["match"]["actions"].as_array().unwrap().len(), 4);

    // Blank query → 400
    let resp = client
        .post(format!("{}/ask", base))
        .json(&json!({"query": "   "}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");

    handle.abort();
}

#[tokio::test]
async fn test_suggestions_endpoint() {
    let (base, handle) = start_server(10).await;

    let body: Value = reqwest::get(format!("{}/suggestions?path=/admin/drills/7", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["path"], "/admin/drills/7");
    let first = &body["suggestions"][0];
    assert_eq!(first["query"], "How do I create a drill?");

    // No path → root list
    let body: Value = reqwest::get(format!("{}/suggestions", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["path"], "/");
    assert!(!body["suggestions"].as_array().unwrap().is_empty());

    handle.abort();
}

#[tokio::test]
async fn test_session_lifecycle() {
    let (base, handle) = start_server(10).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/sessions", base))
        .json(&json!({"role": "athlete", "first_name": "Sam"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let created: Value = resp.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["phase"], "unopened");
    assert_eq!(created["open"], false);
    assert!(created["messages"].as_array().unwrap().is_empty());

    // First open greets
    let opened: Value = client
        .post(format!("{}/sessions/{}/open", base, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(opened["phase"], "greeted");
    assert_eq!(opened["open"], true);
    let messages = opened["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "assistant");
    assert!(messages[0]["text"].as_str().unwrap().starts_with("Hi Sam!"));

    // Submit appends a user message and a reply
    let submitted: Value = client
        .post(format!("{}/sessions/{}/messages", base, id))
        .json(&json!({"query": "how much does it cost"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(submitted["phase"], "active");
    let appended = submitted["messages"].as_array().unwrap();
    assert_eq!(appended.len(), 2);
    assert_eq!(appended[0]["role"], "user");
    assert_eq!(appended[0]["text"], "how much does it cost");
    assert_eq!(appended[1]["match"]["title"], "Pricing & Packages");

    // Blank submit appends nothing
    let submitted: Value = client
        .post(format!("{}/sessions/{}/messages", base, id))
        .json(&json!({"query": "  "}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(submitted["messages"].as_array().unwrap().is_empty());

    // Close then reopen keeps the log and does not greet again
    client
        .post(format!("{}/sessions/{}/close", base, id))
        .send()
        .await
        .unwrap();
    let reopened: Value = client
        .post(format!("{}/sessions/{}/open", base, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reopened["messages"].as_array().unwrap().len(), 3);

    let state: Value = client
        .get(format!("{}/sessions/{}", base, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(state["role"], "athlete");
    assert_eq!(state["messages"].as_array().unwrap().len(), 3);

    handle.abort();
}

#[tokio::test]
async fn test_submit_role_override() {
    let (base, handle) = start_server(10).await;
    let client = reqwest::Client::new();

    let created: Value = client
        .post(format!("{}/sessions", base))
        .json(&json!({"role": "athlete"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap();

    let body: Value = client
        .post(format!("{}/sessions/{}/messages", base, id))
        .json(&json!({"query": "how do I book for an athlete", "role": "coach"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    // Submitting to an unopened session skips the greeting
    let appended = body["messages"].as_array().unwrap();
    assert_eq!(appended.len(), 2);
    assert_eq!(appended[1]["match"]["title"], "Booking for an Athlete");

    handle.abort();
}

#[tokio::test]
async fn test_unknown_session_is_404() {
    let (base, handle) = start_server(10).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/sessions/not-a-session", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "not_found");

    let resp = client
        .post(format!("{}/sessions/not-a-session/messages", base))
        .json(&json!({"query": "pricing"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    handle.abort();
}

#[tokio::test]
async fn test_session_limit() {
    let (base, handle) = start_server(1).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/sessions", base))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let resp = client
        .post(format!("{}/sessions", base))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 429);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "too_many_sessions");

    handle.abort();
}

#[tokio::test]
async fn test_deleting_session_frees_slot() {
    let (base, handle) = start_server(2).await;
    let client = reqwest::Client::new();

    let mut ids = Vec::new();
    for _ in 0..2 {
        let created: Value = client
            .post(format!("{}/sessions", base))
            .json(&json!({"role": "coach"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        ids.push(created["id"].as_str().unwrap().to_string());
    }

    // Closing hides the widget but keeps the session
    client
        .post(format!("{}/sessions/{}/close", base, ids[0]))
        .send()
        .await
        .unwrap();
    let resp = client
        .post(format!("{}/sessions", base))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 429);

    let resp = client
        .delete(format!("{}/sessions/{}", base, ids[0]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let resp = client
        .get(format!("{}/sessions/{}", base, ids[0]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client
        .post(format!("{}/sessions", base))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    // Deleting twice is not found
    let resp = client
        .delete(format!("{}/sessions/{}", base, ids[0]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "not_found");

    handle.abort();
}
