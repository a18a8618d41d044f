// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stub fleet API for integration tests.
//!
//! The server runs on its own thread and single-threaded runtime so that
//! both the blocking credential client and async dispatch tests can talk to
//! it. Every request is recorded before its handler runs, so a handler that
//! panics (dropping the connection) still leaves a record.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::Request;
use axum::http::{HeaderMap, StatusCode};
use axum::Router;
use parking_lot::Mutex;

/// One request as seen by the stub.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: String,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Captured {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> anyhow::Result<serde_json::Value> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

pub struct Stub {
    pub addr: SocketAddr,
    pub requests: Arc<Mutex<Vec<Captured>>>,
}

impl Stub {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Captured> {
        self.requests.lock().clone()
    }
}

/// Serve `router` on a random port from a background thread.
pub fn serve(router: Router) -> anyhow::Result<SocketAddr> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    listener.set_nonblocking(true)?;
    let addr = listener.local_addr()?;
    std::thread::spawn(move || {
        let Ok(runtime) = tokio::runtime::Builder::new_current_thread().enable_all().build() else {
            return;
        };
        runtime.block_on(async move {
            if let Ok(listener) = tokio::net::TcpListener::from_std(listener) {
                let _ = axum::serve(listener, router).await;
            }
        });
    });
    Ok(addr)
}

/// Spawn a stub that records every request and answers with `respond`.
pub fn spawn_stub<F>(respond: F) -> anyhow::Result<Stub>
where
    F: Fn(&Captured) -> (u16, String) + Send + Sync + 'static,
{
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);
    let respond = Arc::new(respond);

    let router = Router::new().fallback(move |req: Request| {
        let recorded = Arc::clone(&recorded);
        let respond = Arc::clone(&respond);
        async move {
            let (parts, body) = req.into_parts();
            let body = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
            let captured = Captured {
                method: parts.method.to_string(),
                path: parts.uri.path().to_owned(),
                headers: parts.headers,
                body: body.to_vec(),
            };
            recorded.lock().push(captured.clone());
            let (status, text) = respond(&captured);
            (StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR), text)
        }
    });

    let addr = serve(router)?;
    Ok(Stub { addr, requests })
}

/// A fleet API that accepts any auth, knows one robot, and stops anything.
pub fn spawn_fleet() -> anyhow::Result<Stub> {
    spawn_stub(|req| match (req.method.as_str(), req.path.as_str()) {
        ("POST", "/robot") => {
            (200, r#"{"robotId": "mock_id", "secretKey": "mock_secret"}"#.to_owned())
        }
        ("POST", p) if p.starts_with("/user/") && p.ends_with("/auth") => {
            (200, r#"{"apiKey": "mock_key", "token": "mock_token"}"#.to_owned())
        }
        ("PUT", p) if p.starts_with("/robot/") && p.ends_with("/stop") => (200, "{}".to_owned()),
        _ => (404, String::new()),
    })
}
