use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde_json::{Value, json};

use shop_assistant_widget::agent::{AgentClient, HttpAgentClient, Route, ThreadId};
use shop_assistant_widget::config::WidgetConfig;
use shop_assistant_widget::error::AgentError;
use shop_assistant_widget::widget::{Applied, ChatWidget, Message, NoopObserver};

/// Requests seen by the fake backend, as `(path, body)`.
#[derive(Clone, Default)]
struct Recorded(Arc<Mutex<Vec<(String, Value)>>>);

impl Recorded {
    fn push(&self, path: String, body: Value) {
        self.0.lock().unwrap().push((path, body));
    }

    fn paths(&self) -> Vec<String> {
        self.0.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }

    fn bodies(&self) -> Vec<Value> {
        self.0.lock().unwrap().iter().map(|(_, b)| b.clone()).collect()
    }
}

// Behaves like the real agent server: a new thread id on `/chat`, and a
// null thread id when continuing.
async fn start_chat(State(rec): State<Recorded>, Json(body): Json<Value>) -> Json<Value> {
    rec.push("/chat".into(), body);
    Json(json!({ "response": "Here are some headphones", "threadId": "t1" }))
}

async fn continue_chat(
    State(rec): State<Recorded>,
    Path(thread_id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let message = body["message"].as_str().unwrap_or_default().to_string();
    rec.push(format!("/chat/{thread_id}"), body);
    Json(json!({ "response": format!("More results for {message}"), "threadId": null }))
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "LangGraph Agent Server" }))
}

async fn internal_error(State(rec): State<Recorded>, Json(body): Json<Value>) -> (StatusCode, String) {
    rec.push("/chat".into(), body);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
}

async fn wrong_shape(Json(_body): Json<Value>) -> Json<Value> {
    Json(json!({ "reply": "no response field here" }))
}

async fn never_answers(Json(_body): Json<Value>) -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(30)).await;
    Json(json!({ "response": "too late", "threadId": "t-late" }))
}

async fn spawn_backend(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn healthy_backend() -> (String, Recorded) {
    let rec = Recorded::default();
    let app = Router::new()
        .route("/", get(root))
        .route("/chat", post(start_chat))
        .route("/chat/{thread_id}", post(continue_chat))
        .with_state(rec.clone());
    (spawn_backend(app).await, rec)
}

fn mount(client: HttpAgentClient) -> ChatWidget {
    let client: Arc<dyn AgentClient> = Arc::new(client);
    ChatWidget::mount(client, WidgetConfig::default()).with_observer(NoopObserver)
}

#[tokio::test]
async fn test_client_start_and_continue() {
    let (base, rec) = healthy_backend().await;
    let client = HttpAgentClient::new(&base).unwrap();

    let first = client
        .send(&Route::NewSession, "show me headphones")
        .await
        .unwrap();
    assert_eq!(first.text, "Here are some headphones");
    assert_eq!(first.thread_id, ThreadId::new("t1"));

    let second = client
        .send(&Route::ContinueSession(first.thread_id.clone()), "cheaper ones")
        .await
        .unwrap();
    assert_eq!(second.text, "More results for cheaper ones");
    assert_eq!(second.thread_id, ThreadId::new("t1"));

    assert_eq!(rec.paths(), ["/chat", "/chat/t1"]);
    assert_eq!(rec.bodies()[0], json!({ "message": "show me headphones" }));
}

#[tokio::test]
async fn test_client_health() {
    let (base, _rec) = healthy_backend().await;
    let client = HttpAgentClient::new(&base).unwrap();
    let banner = client.health().await.unwrap();
    assert_eq!(banner.message, "LangGraph Agent Server");
}

#[tokio::test]
async fn test_client_maps_status_failure() {
    let rec = Recorded::default();
    let app = Router::new()
        .route("/chat", post(internal_error))
        .with_state(rec.clone());
    let base = spawn_backend(app).await;

    let err = HttpAgentClient::new(&base)
        .unwrap()
        .send(&Route::NewSession, "hello")
        .await
        .unwrap_err();

    match err {
        AgentError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "Internal server error");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_client_maps_wrong_shape_to_malformed() {
    let app = Router::new().route("/chat", post(wrong_shape));
    let base = spawn_backend(app).await;

    let err = HttpAgentClient::new(&base)
        .unwrap()
        .send(&Route::NewSession, "hello")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "malformed");
}

#[tokio::test]
async fn test_client_timeout_is_transport_failure() {
    let app = Router::new().route("/chat", post(never_answers));
    let base = spawn_backend(app).await;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    let err = HttpAgentClient::with_client(&base, http)
        .unwrap()
        .send(&Route::NewSession, "hello")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "timeout");
}

#[tokio::test]
async fn test_client_connection_refused() {
    // Bind then drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = HttpAgentClient::new(format!("http://{addr}"))
        .unwrap()
        .send(&Route::NewSession, "hello")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "transport");
}

#[tokio::test]
async fn test_widget_round_trip() {
    let (base, rec) = healthy_backend().await;
    let mut widget = mount(HttpAgentClient::new(&base).unwrap());

    widget.toggle();
    assert_eq!(widget.messages().len(), 1);

    widget.set_draft("show me headphones");
    widget.submit().unwrap();
    assert_eq!(widget.settle().await, Some(Applied::Reply));
    assert_eq!(widget.messages().len(), 3);
    assert_eq!(widget.thread_id().map(ThreadId::as_str), Some("t1"));

    widget.set_draft("cheaper ones");
    widget.submit().unwrap();
    assert_eq!(widget.settle().await, Some(Applied::Reply));
    assert_eq!(widget.messages().len(), 5);
    assert_eq!(
        widget.messages()[4],
        Message::agent("More results for cheaper ones", ThreadId::new("t1"))
    );
    assert_eq!(widget.thread_id().map(ThreadId::as_str), Some("t1"));

    assert_eq!(rec.paths(), ["/chat", "/chat/t1"]);
}

#[tokio::test]
async fn test_widget_http_500_appends_nothing() {
    let rec = Recorded::default();
    let app = Router::new()
        .route("/chat", post(internal_error))
        .with_state(rec.clone());
    let base = spawn_backend(app).await;
    let mut widget = mount(HttpAgentClient::new(&base).unwrap());

    widget.toggle();
    widget.set_draft("hello");
    widget.submit().unwrap();
    assert_eq!(widget.settle().await, Some(Applied::Failure));

    assert_eq!(widget.messages().len(), 2);
    assert_eq!(widget.messages()[1], Message::user("hello"));
    assert!(widget.thread_id().is_none());
    assert_eq!(rec.paths(), ["/chat"]);
}
