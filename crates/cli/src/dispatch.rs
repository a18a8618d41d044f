// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concurrent stop broadcast.
//!
//! One PUT `/robot/{id}/stop` per robot, each on its own HTTP client and
//! optionally routed through a forward proxy. [`dispatch_stop`] waits for
//! every request to resolve; one robot failing never cancels the others.

use std::fmt;

use anyhow::Context;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Proxy, StatusCode};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::credential::Credential;

/// Header carrying the API key on the stop command.
pub const API_KEY_HEADER: &str = "X-Ciraas-Api-Key";
/// Header carrying the session token on the stop command.
pub const TOKEN_HEADER: &str = "X-Ciraas-Token";

/// A single fire-once stop command.
#[derive(Clone, PartialEq, Eq)]
pub struct StopRequest {
    pub endpoint: String,
    pub robot_id: String,
    pub api_key: String,
    pub token: String,
    pub proxy_url: Option<String>,
}

impl StopRequest {
    pub fn new(
        endpoint: &str,
        robot_id: &str,
        credential: &Credential,
        proxy_url: Option<&str>,
    ) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            robot_id: robot_id.to_owned(),
            api_key: credential.api_key.clone(),
            token: credential.token.clone(),
            proxy_url: proxy_url.map(str::to_owned),
        }
    }

    pub fn url(&self) -> String {
        format!("{}/robot/{}/stop", self.endpoint, self.robot_id)
    }
}

impl fmt::Debug for StopRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopRequest")
            .field("endpoint", &self.endpoint)
            .field("robot_id", &self.robot_id)
            .field("api_key", &self.api_key)
            .field("token", &"<redacted>")
            .field("proxy_url", &self.proxy_url)
            .finish()
    }
}

/// Result of one stop command, keyed by robot.
#[derive(Debug)]
pub struct StopOutcome {
    pub robot_id: String,
    /// Any status counts as a completed request; `Err` is a transport fault.
    pub result: anyhow::Result<StatusCode>,
}

impl StopOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

fn build_client(proxy_url: Option<&str>) -> anyhow::Result<Client> {
    crate::ensure_crypto_provider();
    let builder = match proxy_url {
        Some(url) => {
            Client::builder().proxy(Proxy::all(url).with_context(|| format!("proxy {url}"))?)
        }
        None => Client::builder().no_proxy(),
    };
    Ok(builder.build()?)
}

/// Send one stop command and wait for its full response.
pub async fn send_stop(req: &StopRequest) -> anyhow::Result<StatusCode> {
    info!(robot_id = %req.robot_id, "start stop request");

    let client = build_client(req.proxy_url.as_deref())?;
    let resp = client
        .put(req.url())
        .header(CONTENT_TYPE, "application/json")
        .header(API_KEY_HEADER, req.api_key.as_str())
        .header(TOKEN_HEADER, req.token.as_str())
        .send()
        .await?;
    let status = resp.status();
    // Body is drained so the request counts as complete, then discarded.
    let _ = resp.bytes().await?;

    info!(robot_id = %req.robot_id, status = status.as_u16(), "received status");
    Ok(status)
}

/// Stop every robot in `robot_ids` concurrently.
///
/// Must run inside a tokio runtime. Returns one outcome per id, in input
/// order, after all requests have resolved.
pub async fn dispatch_stop(
    endpoint: &str,
    robot_ids: &[String],
    credential: &Credential,
    proxy_url: Option<&str>,
) -> Vec<StopOutcome> {
    let mut set = JoinSet::new();
    for (idx, robot_id) in robot_ids.iter().enumerate() {
        let req = StopRequest::new(endpoint, robot_id, credential, proxy_url);
        set.spawn(async move { (idx, send_stop(&req).await) });
    }

    let mut results: Vec<Option<anyhow::Result<StatusCode>>> =
        robot_ids.iter().map(|_| None).collect();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((idx, result)) => {
                if let Err(ref e) = result {
                    let robot_id = robot_ids.get(idx).map(String::as_str).unwrap_or("?");
                    warn!(robot_id, "stop request failed: {e:#}");
                }
                if let Some(slot) = results.get_mut(idx) {
                    *slot = Some(result);
                }
            }
            Err(e) => error!("stop task aborted: {e}"),
        }
    }

    robot_ids
        .iter()
        .zip(results)
        .map(|(robot_id, result)| StopOutcome {
            robot_id: robot_id.clone(),
            result: result.unwrap_or_else(|| Err(anyhow::anyhow!("stop task did not complete"))),
        })
        .collect()
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
