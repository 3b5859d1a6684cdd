#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use dmponline::client::DmpClient;
use dmponline::config::ClientConfig;

pub const TOKEN: &str = "good-token";
pub const EMAIL: &str = "admin@tudelft.nl";
pub const BEARER: &str = "bearer-123";

/// Plan ids the mock answers with a full plan, an empty list, a server error
/// and a non-JSON body respectively. Anything else is a 404.
pub const PLAN_OK: i64 = 1;
pub const PLAN_EMPTY: i64 = 2;
pub const PLAN_ERROR: i64 = 3;
pub const PLAN_GARBLED: i64 = 4;

/// A request the mock received.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub path: String,
    pub authorization: Option<String>,
    pub query: HashMap<String, String>,
}

#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl Recorder {
    fn record(&self, path: String, headers: &HeaderMap, query: HashMap<String, String>) {
        let authorization = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.calls.lock().unwrap().push(RecordedCall {
            path,
            authorization,
            query,
        });
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.path).collect()
    }
}

/// In-process stand-in for a DMPonline instance.
pub struct MockDmpOnline {
    pub base_url: String,
    pub recorder: Recorder,
}

impl MockDmpOnline {
    pub async fn spawn() -> Self {
        let recorder = Recorder::default();
        let app = Router::new()
            .route("/api/v1/authenticate", post(authenticate))
            .route("/api/v0/plans", get(plans_v0))
            .route("/api/v1/plans/{id}", get(plans_v1))
            .route("/api/v0/statistics/plans", get(statistics))
            .route("/api/v0/departments", get(departments))
            .route("/api/v0/departments/users", get(department_users))
            .with_state(recorder.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().expect("Failed to read local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server crashed");
        });

        Self {
            base_url: format!("http://{}/api/", addr),
            recorder,
        }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(TOKEN).with_base_url(self.base_url.clone())
    }

    /// Client with a v1 bearer token.
    pub async fn client(&self) -> DmpClient {
        DmpClient::connect(&self.config().with_user_email(Some(EMAIL.to_string())))
            .await
            .expect("Failed to connect to mock")
    }
}

/// Base URL on which nothing listens.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read local addr");
    drop(listener);
    format!("http://{}/api/", addr)
}

pub fn plan_v0_fixture() -> Value {
    json!([{
        "id": PLAN_OK,
        "title": "Soil samples",
        "creation_date": "2021-03-04T10:20:30Z",
        "last_updated": "2022-01-02T08:00:00Z",
        "template": {"id": 975303870, "title": "TU Delft Data Management Plan template (2021)"},
        "principal_investigator": {"name": "Ada", "email": "ada@tudelft.nl"},
        "users": [{"email": "ada@tudelft.nl"}, {"email": "bob@tudelft.nl"}],
        "plan_content": [{
            "title": "DMP",
            "sections": [
                {"number": 1, "title": "Admin", "questions": [
                    {"number": 1, "text": "Project title?", "format": "textfield",
                     "option_based": false, "answered": true,
                     "answer": {"text": "Soil", "options": []}}
                ]},
                {"number": 5, "title": "Personal data", "questions": [
                    {"number": 1, "text": "Sensitive data?", "format": "radiobuttons",
                     "option_based": true, "answered": true,
                     "answer": {"options": [{"text": "No"}]}},
                    {"number": 2, "text": "Will you process personal data?", "format": "radiobuttons",
                     "option_based": true, "answered": true,
                     "answer": {"options": [{"text": "Yes"}]}}
                ]}
            ]
        }]
    }])
}

pub fn plan_v1_fixture() -> Value {
    json!({
        "items": [{"dmp": {
            "title": "Soil samples",
            "created": "2021-03-04T10:20:30.000Z",
            "modified": "2021-05-06T07:08:09.000Z",
            "contact": {"name": "Ada", "mbox": "ada@tudelft.nl"},
            "contributor": [
                {"name": "Bob", "mbox": "bob@tudelft.nl"},
                {"name": "Cy", "mbox": "cy@tudelft.nl"}
            ]
        }}]
    })
}

fn token_ok(headers: &HeaderMap) -> bool {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
        == Some(format!("Token token={}", TOKEN).as_str())
}

fn bearer_ok(headers: &HeaderMap) -> bool {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
        == Some(format!("Bearer {}", BEARER).as_str())
}

async fn authenticate(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    recorder.record("/api/v1/authenticate".to_string(), &headers, HashMap::new());
    if body["grant_type"] == "authorization_code" && body["code"] == TOKEN && body["email"] == EMAIL {
        Json(json!({"access_token": BEARER})).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, "invalid credentials").into_response()
    }
}

async fn plans_v0(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    recorder.record("/api/v0/plans".to_string(), &headers, query.clone());
    if !token_ok(&headers) {
        return (StatusCode::UNAUTHORIZED, "bad token").into_response();
    }
    let plan = query.get("plan").and_then(|p| p.parse::<i64>().ok());
    match plan {
        Some(PLAN_OK) => Json(plan_v0_fixture()).into_response(),
        Some(PLAN_EMPTY) => Json(json!([])).into_response(),
        Some(PLAN_ERROR) => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        Some(PLAN_GARBLED) => (StatusCode::OK, "<html>maintenance</html>").into_response(),
        _ => (StatusCode::NOT_FOUND, "no such plan").into_response(),
    }
}

async fn plans_v1(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    recorder.record(format!("/api/v1/plans/{}", id), &headers, query);
    if !bearer_ok(&headers) {
        return (StatusCode::UNAUTHORIZED, "bad bearer").into_response();
    }
    match id {
        PLAN_OK => Json(plan_v1_fixture()).into_response(),
        _ => Json(json!({"items": []})).into_response(),
    }
}

async fn statistics(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    recorder.record("/api/v0/statistics/plans".to_string(), &headers, query);
    Json(json!({"plans": [
        {"id": 1, "title": "Soil samples", "date_created": "2021-03-04T10:20:30Z",
         "date_last_updated": "2022-01-02T08:00:00Z", "owner": {"email": "ada@tudelft.nl"}},
        {"id": 2, "title": "Wind tunnel", "date_created": "2020-06-01T00:00:00Z",
         "date_last_updated": "2020-07-01T00:00:00Z", "owner": {"email": "bob@tudelft.nl"}}
    ]}))
    .into_response()
}

async fn departments(State(recorder): State<Recorder>, headers: HeaderMap) -> Response {
    recorder.record("/api/v0/departments".to_string(), &headers, HashMap::new());
    Json(json!([
        {"id": 10, "name": "Electrical Engineering", "code": "EWI"},
        {"id": 11, "name": "Architecture", "code": "BK"}
    ]))
    .into_response()
}

async fn department_users(State(recorder): State<Recorder>, headers: HeaderMap) -> Response {
    recorder.record("/api/v0/departments/users".to_string(), &headers, HashMap::new());
    Json(json!([
        {"code": "EWI", "name": "Electrical Engineering", "users": [
            {"email": "ada@tudelft.nl"}, {"email": "bob@tudelft.nl"}
        ]},
        {"code": "BK", "name": "Architecture", "users": [{"email": "cy@tudelft.nl"}]}
    ]))
    .into_response()
}
