use chrono::{Duration as ChronoDuration, Utc};
use homies_api::app::{AppServices, build_router};
use homies_auth::JwtClaims;
use homies_core::UserId;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value, json};

const SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod over a fresh in-memory store, on an ephemeral port.
        let app = build_router(SECRET, AppServices::in_memory());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
    }

    async fn post(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
    }

    async fn create(&self, token: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url("/events"))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(secret: &str, user_id: &str, name: &str) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: UserId::new(user_id).unwrap(),
        name: name.to_string(),
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn chess_night() -> Value {
    json!({
        "name": "Chess Night",
        "description": "Casual games, all levels welcome.",
        "start": "20-05-2024 18:00",
        "end": "20-05-2024 20:00",
        "type_id": 1
    })
}

async fn create_chess_night(srv: &TestServer, token: &str) -> i64 {
    let res = srv.create(token, &chess_night()).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/events")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let forged = mint_jwt("other-secret", "alice", "Alice");
    let res = srv.get("/events", &forged).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn whoami_reflects_token() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(SECRET, "alice", "Alice");

    let res = srv.get("/whoami", &token).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["user_id"], "alice");
    assert_eq!(body["user_name"], "Alice");
}

#[tokio::test]
async fn type_catalog_and_empty_form() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(SECRET, "alice", "Alice");

    let types: Value = srv.get("/types", &token).await.json().await.unwrap();
    let names: Vec<&str> = types
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Animals", "Fun", "Discussion", "Work"]);

    let form: Value = srv.get("/events/new", &token).await.json().await.unwrap();
    assert_eq!(form["form"]["name"], "");
    assert_eq!(form["types"].as_array().unwrap().len(), 4);
    assert_eq!(form["date_format"], "dd-MM-yyyy HH:mm");
}

#[tokio::test]
async fn create_then_detail_round_trips_fields() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(SECRET, "alice", "Alice");

    let id = create_chess_night(&srv, &token).await;

    let res = srv.get(&format!("/events/{id}"), &token).await;
    assert_eq!(res.status(), StatusCode::OK);
    let detail: Value = res.json().await.unwrap();
    assert_eq!(detail["name"], "Chess Night");
    assert_eq!(detail["start"], "20-05-2024 18:00");
    assert_eq!(detail["end"], "20-05-2024 20:00");
    assert_eq!(detail["type"], "Animals");
    assert_eq!(detail["organiser"], "Alice");

    let list: Value = srv.get("/events", &token).await.json().await.unwrap();
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"], id);
}

#[tokio::test]
async fn invalid_submission_echoes_form_and_field_errors() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(SECRET, "alice", "Alice");

    let mut body = chess_night();
    body["start"] = json!("2024-05-20 18:00");
    body["end"] = json!("tomorrow");

    let res = srv.create(&token, &body).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["error"], "validation_error");

    let fields: Vec<&str> = err["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["start", "end"]);
    assert_eq!(err["form"]["start"], "2024-05-20 18:00");
    assert_eq!(err["types"].as_array().unwrap().len(), 4);

    let list: Value = srv.get("/events", &token).await.json().await.unwrap();
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_type_is_not_found() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(SECRET, "alice", "Alice");

    let mut body = chess_night();
    body["type_id"] = json!(99);
    let res = srv.create(&token, &body).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn only_organiser_can_edit() {
    let srv = TestServer::spawn().await;
    let alice = mint_jwt(SECRET, "alice", "Alice");
    let bob = mint_jwt(SECRET, "bob", "Bob");
    let id = create_chess_night(&srv, &alice).await;

    let res = srv.get(&format!("/events/{id}/edit"), &bob).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let mut changed = chess_night();
    changed["name"] = json!("Chess Marathon");

    let res = srv
        .client
        .put(srv.url(&format!("/events/{id}")))
        .bearer_auth(&bob)
        .json(&changed)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv.get(&format!("/events/{id}/edit"), &alice).await;
    assert_eq!(res.status(), StatusCode::OK);
    let form: Value = res.json().await.unwrap();
    assert_eq!(form["form"]["start"], "20-05-2024 18:00");
    assert_eq!(form["form"]["type_id"], 1);

    let res = srv
        .client
        .put(srv.url(&format!("/events/{id}")))
        .bearer_auth(&alice)
        .json(&changed)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let detail: Value = srv.get(&format!("/events/{id}"), &bob).await.json().await.unwrap();
    assert_eq!(detail["name"], "Chess Marathon");
}

#[tokio::test]
async fn join_leave_lifecycle() {
    let srv = TestServer::spawn().await;
    let alice = mint_jwt(SECRET, "alice", "Alice");
    let bob = mint_jwt(SECRET, "bob", "Bob");
    let id = create_chess_night(&srv, &alice).await;

    let res = srv.post(&format!("/events/{id}/leave"), &bob).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = srv.post(&format!("/events/{id}/join"), &bob).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["outcome"], "joined");

    let res = srv.post(&format!("/events/{id}/join"), &bob).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["outcome"], "already_joined");

    let detail: Value = srv.get(&format!("/events/{id}"), &bob).await.json().await.unwrap();
    assert_eq!(detail["joined"], true);
    let detail: Value = srv.get(&format!("/events/{id}"), &alice).await.json().await.unwrap();
    assert_eq!(detail["joined"], false);

    let joined: Value = srv.get("/events/joined", &bob).await.json().await.unwrap();
    assert_eq!(joined.as_array().unwrap().len(), 1);
    assert_eq!(joined[0]["organiser"], "Alice");

    let res = srv.post(&format!("/events/{id}/leave"), &bob).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let joined: Value = srv.get("/events/joined", &bob).await.json().await.unwrap();
    assert!(joined.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn bad_ids_and_missing_events() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(SECRET, "alice", "Alice");

    let res = srv.get("/events/abc", &token).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = srv.get("/events/404", &token).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = srv.post("/events/404/join", &token).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
