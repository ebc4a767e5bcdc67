//! End-to-end HTTP tests. Each test seeds a temporary store, starts the
//! full router on an ephemeral port with scripted LLM backends, and talks
//! to it over real HTTP, the same way the React frontend does.

use std::sync::Arc;

use ndarray::{array, Array1};
use tempfile::TempDir;

use kennisbank_core::Result;
use kennisbank_llm::{EmbedderBackend, GeneratorBackend, LLMConfig};
use kennisbank_server::routes::build_router;
use kennisbank_server::state::AppState;
use kennisbank_store::{NewDocument, SqliteStore};

// ---------------------------------------------------------------
// Scripted backends
// ---------------------------------------------------------------

struct StaticEmbedder {
    vector: Array1<f32>,
}

impl EmbedderBackend for StaticEmbedder {
    async fn embed(&self, _text: &str) -> Result<Array1<f32>> {
        Ok(self.vector.clone())
    }

    fn dimension(&self) -> usize {
        self.vector.len()
    }
}

struct ScriptedGenerator {
    answer: String,
}

impl GeneratorBackend for ScriptedGenerator {
    async fn generate(&self, _system_prompt: &str, _question: &str) -> Result<String> {
        Ok(self.answer.clone())
    }
}

// ---------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------

/// Unit vector whose cosine against the x axis is `sim`.
fn evidence_vector(sim: f32) -> Array1<f32> {
    array![sim, (1.0 - sim * sim).sqrt()]
}

fn seed_doc(store: &SqliteStore, title: &str) -> String {
    store
        .add_document(&NewDocument {
            title: title.into(),
            file_type: "pdf".into(),
            content_text: format!("{} inhoud", title),
            file_url: format!("https://files.example/{}", title),
            ..Default::default()
        })
        .unwrap()
}

/// Store with an HR category assigned to user `harm` and two indexed
/// documents whose chunks score 0.85/0.78 and 0.72 against the static
/// query vector, plus one below-floor chunk.
fn hr_corpus() -> (Arc<SqliteStore>, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(SqliteStore::open(dir.path()).unwrap());

    let hr = store.add_category("HR").unwrap();
    store.assign_user_category("harm", &hr).unwrap();

    let d1 = seed_doc(&store, "Verlofregeling");
    let d2 = seed_doc(&store, "Personeelshandboek");
    store.link_document_category(&d1, &hr).unwrap();
    store.link_document_category(&d2, &hr).unwrap();

    store
        .add_chunk_embedding(&d1, 0, "25 verlofdagen per jaar", &evidence_vector(0.85))
        .unwrap();
    store
        .add_chunk_embedding(&d1, 1, "verlof aanvragen via HR", &evidence_vector(0.78))
        .unwrap();
    store
        .add_chunk_embedding(&d2, 0, "algemene regels", &evidence_vector(0.72))
        .unwrap();
    store
        .add_chunk_embedding(&d2, 1, "parkeerbeleid", &evidence_vector(0.5))
        .unwrap();

    (store, dir)
}

/// Serve the full router on an ephemeral local port.
async fn spawn_app(store: Arc<SqliteStore>, answer: &str) -> (String, reqwest::Client) {
    let llm_config = LLMConfig {
        openai_api_key: Some("sk-test".into()),
        ..Default::default()
    };
    let state = Arc::new(AppState::new(
        store,
        llm_config,
        StaticEmbedder {
            vector: array![1.0f32, 0.0],
        },
        ScriptedGenerator {
            answer: answer.into(),
        },
    ));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), reqwest::Client::new())
}

async fn ask(
    client: &reqwest::Client,
    base: &str,
    user: &str,
    role: &str,
    question: &str,
) -> reqwest::Response {
    client
        .post(format!("{}/api/chat/ask", base))
        .header("x-user-id", user)
        .header("x-user-role", role)
        .json(&serde_json::json!({ "question": question }))
        .send()
        .await
        .unwrap()
}

// ---------------------------------------------------------------
// Tests
// ---------------------------------------------------------------

#[tokio::test]
async fn test_root_banner() {
    let (store, _dir) = hr_corpus();
    let (base, client) = spawn_app(store, "ok").await;

    let resp = client.get(&base).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "AI Kennisbank API");
    assert_eq!(body["status"], "running");
}

#[tokio::test]
async fn test_status_reports_corpus_and_provider() {
    let (store, _dir) = hr_corpus();
    let (base, client) = spawn_app(store, "ok").await;

    let resp = client
        .get(format!("{}/api/chat/status", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["llm_available"], true);
    assert_eq!(body["llm_provider"], "openai");
    assert_eq!(body["embedding_model"], "text-embedding-ada-002");
    assert_eq!(body["embedding_dimension"], 2);
    assert_eq!(body["documents"], 2);
    assert_eq!(body["embedded_chunks"], 4);
}

#[tokio::test]
async fn test_missing_identity_rejected() {
    let (store, _dir) = hr_corpus();
    let (base, client) = spawn_app(store, "ok").await;

    let resp = client
        .post(format!("{}/api/chat/ask", base))
        .json(&serde_json::json!({ "question": "Hoeveel verlofdagen?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Missing or invalid identity headers");

    // Unknown role is rejected the same way.
    let resp = client
        .post(format!("{}/api/chat/ask", base))
        .header("x-user-id", "harm")
        .header("x-user-role", "wizard")
        .json(&serde_json::json!({ "question": "Hoeveel verlofdagen?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_ask_empty_question_rejected() {
    let (store, _dir) = hr_corpus();
    let (base, client) = spawn_app(store, "ok").await;

    let resp = ask(&client, &base, "harm", "medewerker", "   ").await;
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Question must not be empty");
}

#[tokio::test]
async fn test_ask_answers_with_sources_and_record() {
    let (store, _dir) = hr_corpus();
    let (base, client) = spawn_app(store, "Je hebt 25 verlofdagen per jaar.").await;

    let resp = ask(
        &client,
        &base,
        "harm",
        "medewerker",
        "Hoeveel verlofdagen heb ik?",
    )
    .await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();

    assert_eq!(body["answer"], "Je hebt 25 verlofdagen per jaar.");
    assert_eq!(body["outcome"], "answered");
    assert_eq!(body["confidence"], 78.3);
    let sources = body["sources"].as_array().unwrap();
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0]["document_title"], "Verlofregeling");
    assert_eq!(sources[1]["document_title"], "Personeelshandboek");
    assert!(body["record_id"].is_string());

    // The interaction is visible in history.
    let record_id = body["record_id"].as_str().unwrap();
    let history: serde_json::Value = client
        .get(format!("{}/api/chat/history", base))
        .header("x-user-id", "harm")
        .header("x-user-role", "medewerker")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], record_id);
    assert_eq!(entries[0]["question"], "Hoeveel verlofdagen heb ik?");
}

#[tokio::test]
async fn test_ask_without_categories_returns_canned_answer() {
    let (store, _dir) = hr_corpus();
    let (base, client) = spawn_app(store, "ok").await;

    let resp = ask(&client, &base, "gast", "medewerker", "Wat is het beleid?").await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["outcome"], "no_categories");
    assert_eq!(
        body["answer"],
        "Je hebt nog geen toegang tot documentcategorieën."
    );
    assert_eq!(body["confidence"], 0.0);
    assert_eq!(body["sources"].as_array().unwrap().len(), 0);
    assert!(body.get("record_id").is_none());
}

#[tokio::test]
async fn test_feedback_endpoints() {
    let (store, _dir) = hr_corpus();
    let (base, client) = spawn_app(store, "antwoord").await;

    let body: serde_json::Value = ask(&client, &base, "harm", "medewerker", "vraag?")
        .await
        .json()
        .await
        .unwrap();
    let record_id = body["record_id"].as_str().unwrap().to_string();

    let feedback_url = |id: &str| format!("{}/api/chat/history/{}/feedback", base, id);

    // Values other than +1/-1 are rejected.
    let resp = client
        .post(feedback_url(&record_id))
        .header("x-user-id", "harm")
        .header("x-user-role", "medewerker")
        .json(&serde_json::json!({ "feedback": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Another user's record is off limits.
    let resp = client
        .post(feedback_url(&record_id))
        .header("x-user-id", "pieter")
        .header("x-user-role", "medewerker")
        .json(&serde_json::json!({ "feedback": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    // Unknown record.
    let resp = client
        .post(feedback_url("nope"))
        .header("x-user-id", "harm")
        .header("x-user-role", "medewerker")
        .json(&serde_json::json!({ "feedback": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // Owner can vote.
    let resp = client
        .post(feedback_url(&record_id))
        .header("x-user-id", "harm")
        .header("x-user-role", "medewerker")
        .json(&serde_json::json!({ "feedback": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Feedback saved");
}

#[tokio::test]
async fn test_clear_history() {
    let (store, _dir) = hr_corpus();
    let (base, client) = spawn_app(store, "antwoord").await;

    ask(&client, &base, "harm", "medewerker", "eerste vraag?").await;
    ask(&client, &base, "harm", "medewerker", "tweede vraag?").await;

    let resp = client
        .delete(format!("{}/api/chat/history", base))
        .header("x-user-id", "harm")
        .header("x-user-role", "medewerker")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Chat history cleared");
    assert_eq!(body["removed"], 2);

    let history: serde_json::Value = client
        .get(format!("{}/api/chat/history", base))
        .header("x-user-id", "harm")
        .header("x-user-role", "medewerker")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_dashboard_requires_admin() {
    let (store, _dir) = hr_corpus();
    let (base, client) = spawn_app(store, "antwoord").await;

    let resp = client
        .get(format!("{}/api/admin/dashboard", base))
        .header("x-user-id", "harm")
        .header("x-user-role", "medewerker")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Admin access required");

    ask(&client, &base, "harm", "medewerker", "vraag?").await;

    let resp = client
        .get(format!("{}/api/admin/dashboard", base))
        .header("x-user-id", "beheer")
        .header("x-user-role", "admin")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["total_documents"], 2);
    assert_eq!(body["embedded_chunks"], 4);
    assert_eq!(body["questions_this_month"], 1);
    assert!(body["knowledge_gaps"].is_array());
}
