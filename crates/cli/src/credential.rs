// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Blocking client for the fleet API's credential endpoints.
//!
//! Two single-attempt exchanges: account auth (`apiKey` + `token`) and robot
//! lookup (`robotId` + `secretKey`). Non-2xx statuses and transport failures
//! are logged here and returned as [`Fetched::Failed`]; a 2xx body that
//! cannot be used is an `Err`.

use std::fmt;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::{debug, error};

use crate::error::{CredentialError, FetchFailure};
use crate::validate::{require_type, ValueKind};

/// Header carrying the API key on the robot lookup.
pub const API_KEY_HEADER: &str = "X-ciraas-api-key";
/// Header carrying the session token on the robot lookup.
pub const TOKEN_HEADER: &str = "X-ciraas-token";

/// API key and session token for one account.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub api_key: String,
    pub token: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("api_key", &self.api_key)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Identifier and secret key of one robot.
#[derive(Clone, PartialEq, Eq)]
pub struct RobotCredential {
    pub robot_id: String,
    pub secret_key: String,
}

impl fmt::Debug for RobotCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RobotCredential")
            .field("robot_id", &self.robot_id)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Outcome of a credential exchange that did not hit a programmer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched<T> {
    Ready(T),
    /// Already logged at the client boundary.
    Failed(FetchFailure),
}

impl<T> Fetched<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Ready(v) => Some(v),
            Self::Failed(_) => None,
        }
    }

    /// Treat a logged failure as terminal for the caller.
    pub fn into_result(self, what: &str) -> anyhow::Result<T> {
        match self {
            Self::Ready(v) => Ok(v),
            Self::Failed(failure) => anyhow::bail!("{what} failed: {failure}"),
        }
    }
}

/// Blocking HTTP client bound to one fleet API endpoint.
pub struct CredentialClient {
    endpoint: String,
    client: Client,
}

impl CredentialClient {
    pub fn new(endpoint: &str) -> Self {
        crate::ensure_crypto_provider();
        let client = Client::builder().build().unwrap_or_default();
        Self { endpoint: endpoint.trim_end_matches('/').to_owned(), client }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST `/user/{account_id}/{user_name}/auth` and extract `apiKey` and
    /// `token`.
    pub fn fetch_api_credential(
        &self,
        account_id: &str,
        user_name: &str,
        password: &str,
    ) -> Result<Fetched<Credential>, CredentialError> {
        const OP: &str = "fetch_api_credential";

        let url = format!("{}/user/{account_id}/{user_name}/auth", self.endpoint);
        debug!(%url, "requesting api credential");
        let req = self.client.post(&url).json(&serde_json::json!({ "password": password }));

        let body = match self.exchange(OP, req)? {
            Fetched::Ready(body) => body,
            Fetched::Failed(f) => return Ok(Fetched::Failed(f)),
        };
        Ok(Fetched::Ready(Credential {
            api_key: string_field(&body, OP, "apiKey")?,
            token: string_field(&body, OP, "token")?,
        }))
    }

    /// POST `/robot` with the account's key and token, and extract `robotId`
    /// and `secretKey`.
    pub fn fetch_robot_credential(
        &self,
        credential: &Credential,
    ) -> Result<Fetched<RobotCredential>, CredentialError> {
        const OP: &str = "fetch_robot_credential";

        let url = format!("{}/robot", self.endpoint);
        debug!(%url, "requesting robot credential");
        let req = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, credential.api_key.as_str())
            .header(TOKEN_HEADER, credential.token.as_str());

        let body = match self.exchange(OP, req)? {
            Fetched::Ready(body) => body,
            Fetched::Failed(f) => return Ok(Fetched::Failed(f)),
        };
        Ok(Fetched::Ready(RobotCredential {
            robot_id: string_field(&body, OP, "robotId")?,
            secret_key: string_field(&body, OP, "secretKey")?,
        }))
    }

    /// Send one request and decode a 2xx body as a JSON object.
    fn exchange(
        &self,
        operation: &'static str,
        req: RequestBuilder,
    ) -> Result<Fetched<Value>, CredentialError> {
        let resp = match req.send() {
            Ok(r) => r,
            Err(e) => return Ok(failed(operation, FetchFailure::Transport(error_chain(&e)))),
        };

        let status = resp.status();
        if !status.is_success() {
            return Ok(failed(operation, FetchFailure::Status(status)));
        }

        let bytes = match resp.bytes() {
            Ok(b) => b,
            Err(e) => {
                let reason = format!("reading response body: {}", error_chain(&e));
                return Ok(failed(operation, FetchFailure::Transport(reason)));
            }
        };
        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|e| CredentialError::MalformedBody { operation, detail: e.to_string() })?;
        if !body.is_object() {
            return Err(CredentialError::MalformedBody {
                operation,
                detail: format!("expected object, found {}", ValueKind::of(&body)),
            });
        }
        Ok(Fetched::Ready(body))
    }
}

/// Log a failed exchange and wrap it.
fn failed<T>(operation: &'static str, failure: FetchFailure) -> Fetched<T> {
    error!(
        operation,
        kind = failure.kind(),
        status = failure.status().map(|s| s.as_u16()),
        "{failure}"
    );
    Fetched::Failed(failure)
}

/// Pull a required string field out of a response object.
pub(crate) fn string_field(
    body: &Value,
    operation: &'static str,
    field: &str,
) -> Result<String, CredentialError> {
    let value = body.get(field).ok_or_else(|| CredentialError::MalformedBody {
        operation,
        detail: format!("missing field \"{field}\""),
    })?;
    require_type(value, &[ValueKind::String], operation, field)?;
    Ok(value.as_str().unwrap_or_default().to_owned())
}

/// Render an error and its sources as one `a: b: c` line.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(e) = source {
        let msg = e.to_string();
        if !out.contains(&msg) {
            out.push_str(": ");
            out.push_str(&msg);
        }
        source = e.source();
    }
    out
}

#[cfg(test)]
#[path = "credential_tests.rs"]
mod tests;
