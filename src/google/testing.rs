//! A local stand-in for the Google token, Drive and Sheets endpoints.
//!
//! Serves every path from one fallback handler, records each request, and
//! answers `/token` with numbered access tokens. Everything else goes to
//! the responder the test supplies.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use super::{GoogleApi, GoogleEndpoints, ServiceAccountKey};

const TEST_PRIVATE_KEY: &str = include_str!("testdata/service_account_key.pem");

const TOKEN_PATH: &str = "/token";

/// One request as the stub saw it.
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: Method,
    /// Path exactly as sent, percent-encoding intact.
    pub path: String,
    pub query: String,
    pub authorization: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decoded value of a query parameter.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == name).then(|| {
                urlencoding::decode(&value.replace('+', " "))
                    .map(|v| v.into_owned())
                    .unwrap_or_default()
            })
        })
    }
}

type Responder = dyn Fn(&RecordedRequest) -> (u16, Value) + Send + Sync;

struct StubState {
    token_status: u16,
    token_lifetime: i64,
    tokens_issued: AtomicUsize,
    requests: Mutex<Vec<RecordedRequest>>,
    respond: Box<Responder>,
}

pub(crate) struct StubGoogle {
    base: String,
    state: Arc<StubState>,
}

impl StubGoogle {
    /// Start a stub issuing hour-long tokens.
    pub async fn start<F>(respond: F) -> Self
    where
        F: Fn(&RecordedRequest) -> (u16, Value) + Send + Sync + 'static,
    {
        Self::start_with_token(200, 3600, respond).await
    }

    /// Start a stub whose token endpoint answers with `token_status` and,
    /// on success, tokens valid for `token_lifetime` seconds.
    pub async fn start_with_token<F>(token_status: u16, token_lifetime: i64, respond: F) -> Self
    where
        F: Fn(&RecordedRequest) -> (u16, Value) + Send + Sync + 'static,
    {
        let state = Arc::new(StubState {
            token_status,
            token_lifetime,
            tokens_issued: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        });

        let app = Router::new().fallback(record).with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{}", addr),
            state,
        }
    }

    /// A service-account key whose token URI points at this stub.
    pub fn key(&self) -> ServiceAccountKey {
        ServiceAccountKey {
            client_email: "receipts@test-project.iam.gserviceaccount.com".to_string(),
            private_key: TEST_PRIVATE_KEY.to_string(),
            token_uri: format!("{}{}", self.base, TOKEN_PATH),
        }
    }

    pub fn endpoints(&self) -> GoogleEndpoints {
        GoogleEndpoints {
            drive_files: format!("{}/drive/v3/files", self.base),
            drive_upload: format!("{}/upload/drive/v3/files", self.base),
            spreadsheets: format!("{}/v4/spreadsheets", self.base),
        }
    }

    pub fn api(&self) -> GoogleApi {
        GoogleApi::new(self.key(), Duration::from_secs(5), self.endpoints()).unwrap()
    }

    /// Every request received, token exchanges included.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn token_requests(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == TOKEN_PATH)
            .collect()
    }

    /// Requests other than token exchanges.
    pub fn api_requests(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path != TOKEN_PATH)
            .collect()
    }
}

async fn record(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let request = RecordedRequest {
        method,
        path: uri.path().to_string(),
        query: uri.query().unwrap_or_default().to_string(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: body.to_vec(),
    };
    state.requests.lock().unwrap().push(request.clone());

    let (status, body) = if request.path == TOKEN_PATH {
        if state.token_status == 200 {
            let n = state.tokens_issued.fetch_add(1, Ordering::SeqCst) + 1;
            let token = json!({
                "access_token": format!("token-{}", n),
                "expires_in": state.token_lifetime,
                "token_type": "Bearer",
            });
            (200, token)
        } else {
            (state.token_status, json!({ "error": "invalid_grant" }))
        }
    } else {
        (state.respond)(&request)
    };

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(body))
}
