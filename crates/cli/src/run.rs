// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The two command flows behind the binary.
//!
//! Credentials are fetched on the calling thread with the blocking client.
//! The stop broadcast then runs on a dedicated single-threaded runtime, so
//! neither function may be called from inside an async context.

use tracing::{info, warn};

use crate::config::{Session, StopPlan};
use crate::credential::{Credential, CredentialClient, RobotCredential};
use crate::dispatch::{dispatch_stop, StopOutcome};
use crate::error::CredentialError;

/// Tag an unusable credential response with its error code.
fn rejected(what: &str, e: CredentialError) -> anyhow::Error {
    let code = e.as_str();
    anyhow::Error::new(e).context(format!("{what} rejected [{code}]"))
}

fn authenticate(client: &CredentialClient, session: &Session) -> anyhow::Result<Credential> {
    const WHAT: &str = "api credential request";
    let credential = client
        .fetch_api_credential(&session.account_id, &session.user_name, &session.password)
        .map_err(|e| rejected(WHAT, e))?
        .into_result(WHAT)?;
    info!(
        endpoint = client.endpoint(),
        account_id = %session.account_id,
        user = %session.user_name,
        "authenticated"
    );
    Ok(credential)
}

/// Authenticate, then look up the robot bound to the account.
pub fn robot_id(session: &Session) -> anyhow::Result<RobotCredential> {
    let client = CredentialClient::new(&session.endpoint);
    let credential = authenticate(&client, session)?;
    const WHAT: &str = "robot credential request";
    let robot = client
        .fetch_robot_credential(&credential)
        .map_err(|e| rejected(WHAT, e))?
        .into_result(WHAT)?;
    info!(robot_id = %robot.robot_id, "robot credential fetched");
    Ok(robot)
}

/// Authenticate, then stop every robot in the plan concurrently.
///
/// Returns one outcome per robot once all requests have resolved.
pub fn stop(session: &Session, plan: &StopPlan) -> anyhow::Result<Vec<StopOutcome>> {
    let credential = {
        let client = CredentialClient::new(&session.endpoint);
        authenticate(&client, session)?
    };

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let outcomes = runtime.block_on(dispatch_stop(
        &session.endpoint,
        &plan.robot_ids,
        &credential,
        plan.proxy_url.as_deref(),
    ));

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    if failed == 0 {
        info!(robots = outcomes.len(), "stop broadcast complete");
    } else {
        warn!(robots = outcomes.len(), failed, "stop broadcast complete with failures");
    }
    Ok(outcomes)
}
