//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;

/// A request received on `/metrics/...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub body: String,
}

#[derive(Debug)]
struct Inner {
    query_status: u16,
    query_body: String,
    push_status: u16,
    delete_status: u16,
    requests: Vec<Recorded>,
}

/// In-process Pushgateway stand-in.
#[derive(Debug, Clone)]
pub struct MockGateway {
    inner: Arc<Mutex<Inner>>,
    pub addr: SocketAddr,
}

#[allow(dead_code)]
impl MockGateway {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Replace the Query API response.
    pub fn set_query(&self, status: u16, body: impl Into<String>) {
        let mut inner = self.inner.lock().unwrap();
        inner.query_status = status;
        inner.query_body = body.into();
    }

    pub fn set_push_status(&self, status: u16) {
        self.inner.lock().unwrap().push_status = status;
    }

    pub fn set_delete_status(&self, status: u16) {
        self.inner.lock().unwrap().delete_status = status;
    }

    /// Requests received on `/metrics/...`, in arrival order.
    pub fn requests(&self) -> Vec<Recorded> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.inner.lock().unwrap().requests.clear();
    }
}

/// Start a mock gateway on an ephemeral port.
pub async fn start_mock_gateway() -> MockGateway {
    let inner = Arc::new(Mutex::new(Inner {
        query_status: 200,
        query_body: r#"{"status":"success","data":[]}"#.to_string(),
        push_status: 200,
        delete_status: 202,
        requests: Vec::new(),
    }));

    let app = Router::new()
        .route("/api/v1/metrics", get(query))
        .route("/metrics/{*key}", any(record))
        .with_state(inner.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockGateway { inner, addr }
}

async fn query(State(inner): State<Arc<Mutex<Inner>>>) -> impl IntoResponse {
    let inner = inner.lock().unwrap();
    (
        StatusCode::from_u16(inner.query_status).unwrap(),
        [(header::CONTENT_TYPE, "application/json")],
        inner.query_body.clone(),
    )
}

async fn record(
    State(inner): State<Arc<Mutex<Inner>>>,
    method: Method,
    uri: Uri,
    body: String,
) -> StatusCode {
    let mut inner = inner.lock().unwrap();
    inner.requests.push(Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        body,
    });
    let status = if method == Method::DELETE {
        inner.delete_status
    } else {
        inner.push_status
    };
    StatusCode::from_u16(status).unwrap()
}

/// A Query API body with one group per `(job, instance, metric timestamps)`.
#[allow(dead_code)]
pub fn query_body(groups: &[(&str, &str, Vec<(&str, &str)>)]) -> String {
    let data: Vec<serde_json::Value> = groups
        .iter()
        .map(|(job, instance, metrics)| {
            let mut object = serde_json::Map::new();
            object.insert(
                "labels".to_string(),
                serde_json::json!({ "job": job, "instance": instance }),
            );
            object.insert("last_push_successful".to_string(), serde_json::json!(true));
            for (name, timestamp) in metrics.iter() {
                object.insert(
                    name.to_string(),
                    serde_json::json!({ "time_stamp": timestamp, "type": "GAUGE", "metrics": [] }),
                );
            }
            serde_json::Value::Object(object)
        })
        .collect();
    serde_json::json!({ "status": "success", "data": data }).to_string()
}
