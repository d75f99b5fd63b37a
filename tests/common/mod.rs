#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Semaphore;

use polywatch::errors::MonitorError;
use polywatch::models::TradingStatus;
use polywatch::polymarket::{DataClient, Transport, TransportError};
use polywatch::services::StatusObserver;

pub const ADDRESS: &str = "0x1234567890abcdef1234567890abcdef12345678";

#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    NotFound,
    Status(u16),
}

impl Reply {
    fn to_result(&self, path: &str) -> Result<Value, TransportError> {
        match self {
            Reply::Json(v) => Ok(v.clone()),
            Reply::NotFound => Err(TransportError::NotFound { path: path.into() }),
            Reply::Status(status) => Err(TransportError::Status {
                status: *status,
                path: path.into(),
            }),
        }
    }
}

/// Scripted transport keyed by request path. Unscripted paths are 404.
/// While held, requests are recorded and then park until released.
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<String, Reply>>,
    requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, path: &str, reply: Reply) {
        self.replies.lock().unwrap().insert(path.to_string(), reply);
    }

    pub fn requests(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hold(&self) {
        *self.gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self) {
        if let Some(gate) = self.gate.lock().unwrap().take() {
            gate.close();
        }
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, TransportError> {
        self.requests.lock().unwrap().push((
            path.to_string(),
            query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ));

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            // Closing the semaphore is the release signal.
            let _ = gate.acquire().await;
        }

        let reply = self.replies.lock().unwrap().get(path).cloned();
        match reply {
            Some(reply) => reply.to_result(path),
            None => Err(TransportError::NotFound { path: path.into() }),
        }
    }
}

pub fn client(transport: &Arc<MockTransport>) -> DataClient {
    DataClient::new(transport.clone())
}

pub fn positions_path() -> String {
    format!("/users/{ADDRESS}/positions")
}

pub fn trades_path() -> String {
    format!("/users/{ADDRESS}/trades")
}

pub fn position_json(id: &str, size: &str, price: &str) -> Value {
    json!({
        "id": id,
        "market": { "id": format!("m-{id}"), "question": format!("Question {id}?") },
        "outcome": "Yes",
        "size": size,
        "price": price,
    })
}

pub fn trade_json(id: &str) -> Value {
    json!({
        "id": id,
        "conditionId": "0xcond",
        "title": "Will it happen?",
        "outcome": "Yes",
        "side": "BUY",
        "size": "10",
        "price": "0.42",
        "timestamp": 1_700_000_000,
    })
}

/// Observer that records everything it receives.
#[derive(Default)]
pub struct RecordingObserver {
    pub updates: Mutex<Vec<TradingStatus>>,
    pub errors: Mutex<Vec<String>>,
    update_count: AtomicUsize,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn update_count(&self) -> usize {
        self.update_count.load(Ordering::SeqCst)
    }

    pub fn error_count(&self) -> usize {
        self.errors.lock().unwrap().len()
    }
}

impl StatusObserver for RecordingObserver {
    fn on_update(&self, status: &TradingStatus) {
        self.update_count.fetch_add(1, Ordering::SeqCst);
        self.updates.lock().unwrap().push(status.clone());
    }

    fn on_error(&self, error: &MonitorError) {
        self.errors.lock().unwrap().push(error.to_string());
    }
}
