use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Instant;
use tokio::sync::Mutex;
use crate::state::AppState;

const MAX_REQUESTS: usize = 50;
const MAX_ERRORS: usize = 20;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    pub time: DateTime<Utc>,
    pub method: String,
    pub path: String,
    pub status: u16,
    pub elapsed_ms: u64,
}

/// Bounded history of recent requests and server errors for the debug
/// endpoints.
#[derive(Debug, Default)]
pub struct DebugLog {
    requests: Mutex<VecDeque<RequestRecord>>,
    errors: Mutex<VecDeque<RequestRecord>>,
}

impl DebugLog {
    pub async fn record(&self, record: RequestRecord) {
        if record.status >= 500 {
            push_bounded(&mut *self.errors.lock().await, record.clone(), MAX_ERRORS);
        }
        push_bounded(&mut *self.requests.lock().await, record, MAX_REQUESTS);
    }

    pub async fn recent_requests(&self) -> Vec<RequestRecord> {
        self.requests.lock().await.iter().cloned().collect()
    }

    pub async fn recent_errors(&self) -> Vec<RequestRecord> {
        self.errors.lock().await.iter().cloned().collect()
    }
}

fn push_bounded(queue: &mut VecDeque<RequestRecord>, record: RequestRecord, cap: usize) {
    if queue.len() == cap {
        queue.pop_front();
    }
    queue.push_back(record);
}

pub async fn record_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    state
        .debug
        .record(RequestRecord {
            time: Utc::now(),
            method,
            path,
            status: response.status().as_u16(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
        .await;

    response
}
