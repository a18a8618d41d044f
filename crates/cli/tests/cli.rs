// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end runs of the `robostop` binary against a stub fleet API.

mod support;

use std::io::Write;
use std::process::{Command, Output};

use support::{spawn_fleet, spawn_stub};

fn robostop(args: &[&str]) -> anyhow::Result<Output> {
    let output = Command::new(env!("CARGO_BIN_EXE_robostop"))
        .args(args)
        .env_remove("ROBOSTOP_PROFILE")
        .env_remove("ROBOSTOP_PROXY")
        .env_remove("ROBOSTOP_ROBOTS")
        .env("ROBOSTOP_LOG_LEVEL", "debug")
        .output()?;
    Ok(output)
}

fn with_credentials<'a>(endpoint: &'a str, rest: &[&'a str]) -> Vec<&'a str> {
    let mut args = vec![
        "--endpoint",
        endpoint,
        "--account-id",
        "CI0001",
        "--user-name",
        "admin",
        "--password",
        "secret",
    ];
    args.extend_from_slice(rest);
    args
}

#[test]
fn robot_id_prints_id() -> anyhow::Result<()> {
    let stub = spawn_fleet()?;
    let url = stub.url();
    let output = robostop(&with_credentials(&url, &["robot-id"]))?;

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8(output.stdout)?, "robot_id:mock_id\n");

    let paths: Vec<String> = stub.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(paths, vec!["/user/CI0001/admin/auth", "/robot"]);
    Ok(())
}

#[test]
fn stop_hits_every_robot() -> anyhow::Result<()> {
    let stub = spawn_fleet()?;
    let url = stub.url();
    let output = robostop(&with_credentials(&url, &["stop", "--robot", "r1", "--robot", "r2"]))?;

    assert_eq!(output.status.code(), Some(0));
    let puts: Vec<String> = stub
        .requests()
        .into_iter()
        .filter(|r| r.method == "PUT")
        .map(|r| r.path)
        .collect();
    assert_eq!(puts.len(), 2);
    assert!(puts.contains(&"/robot/r1/stop".to_owned()));
    assert!(puts.contains(&"/robot/r2/stop".to_owned()));

    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("received status"));
    Ok(())
}

#[test]
fn stop_reads_robots_from_profile() -> anyhow::Result<()> {
    let stub = spawn_fleet()?;
    let mut profile = tempfile::NamedTempFile::new()?;
    write!(
        profile,
        "{}",
        serde_json::json!({
            "endpoint": stub.url(),
            "account_id": "CI0001",
            "user_name": "admin",
            "password": "secret",
            "robot_ids": ["p1", "p2", "p3"]
        })
    )?;
    let path = profile.path().to_string_lossy().into_owned();

    let output = robostop(&["--profile", &path, "stop"])?;
    assert_eq!(output.status.code(), Some(0));
    let puts = stub.requests().into_iter().filter(|r| r.method == "PUT").count();
    assert_eq!(puts, 3);
    Ok(())
}

#[test]
fn auth_failure_exits_1_without_stopping() -> anyhow::Result<()> {
    let stub = spawn_stub(|_| (503, "NG".to_owned()))?;
    let url = stub.url();
    let output = robostop(&with_credentials(&url, &["stop", "--robot", "r1"]))?;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("503"));
    assert!(stderr.contains("HTTP_STATUS"));
    assert!(stub.requests().iter().all(|r| r.method != "PUT"));
    Ok(())
}

#[test]
fn malformed_auth_body_exits_1_with_code() -> anyhow::Result<()> {
    let stub = spawn_stub(|_| (200, "<html>not json</html>".to_owned()))?;
    let url = stub.url();
    let output = robostop(&with_credentials(&url, &["robot-id"]))?;

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("api credential request rejected [MALFORMED_BODY]"));
    assert_eq!(stub.requests().len(), 1);
    Ok(())
}

#[test]
fn unreachable_endpoint_logs_transport_kind() -> anyhow::Result<()> {
    let output = robostop(&with_credentials("http://127.0.0.1:1", &["robot-id"]))?;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("TRANSPORT"));
    Ok(())
}

#[test]
fn failed_stop_exits_1() -> anyhow::Result<()> {
    let stub = spawn_stub(|req| {
        if req.method == "PUT" {
            (200, String::new())
        } else {
            (200, r#"{"apiKey": "k", "token": "t"}"#.to_owned())
        }
    })?;
    let url = stub.url();
    // The proxy refuses connections, so every stop fails after auth succeeds.
    let output = robostop(&with_credentials(
        &url,
        &["stop", "--robot", "r1", "--proxy", "http://127.0.0.1:1"],
    ))?;
    assert_eq!(output.status.code(), Some(1));
    Ok(())
}

#[test]
fn missing_settings_exit_2() -> anyhow::Result<()> {
    let output = robostop(&["--endpoint", "http://127.0.0.1:1", "robot-id"])?;
    assert_eq!(output.status.code(), Some(2));
    Ok(())
}

#[test]
fn profile_type_mismatch_exits_2() -> anyhow::Result<()> {
    let mut profile = tempfile::NamedTempFile::new()?;
    write!(profile, r#"{{"endpoint": 0}}"#)?;
    let path = profile.path().to_string_lossy().into_owned();

    let output = robostop(&["--profile", &path, "robot-id"])?;
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("type mismatch in load_profile"));
    Ok(())
}

#[test]
fn invalid_log_format_exits_2() -> anyhow::Result<()> {
    let output = robostop(&["--log-format", "yaml", "robot-id"])?;
    assert_eq!(output.status.code(), Some(2));
    Ok(())
}
