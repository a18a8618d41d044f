// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;
use std::path::PathBuf;

use clap::Parser;
use reqwest::Url;

use crate::profile::Profile;

/// Fleet API client: fetch robot credentials and broadcast stop commands.
#[derive(Debug, Parser)]
#[command(name = "robostop", version, about)]
pub struct Config {
    /// Base URL of the fleet API.
    #[arg(long, global = true, env = "ROBOSTOP_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Account identifier used for authentication.
    #[arg(long, global = true, env = "ROBOSTOP_ACCOUNT_ID")]
    pub account_id: Option<String>,

    /// User name used for authentication.
    #[arg(long, global = true, env = "ROBOSTOP_USER_NAME")]
    pub user_name: Option<String>,

    /// User password used for authentication.
    #[arg(long, global = true, env = "ROBOSTOP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// JSON profile supplying any setting not given by flag or env.
    #[arg(long, global = true, env = "ROBOSTOP_PROFILE")]
    pub profile: Option<PathBuf>,

    /// Log format (json or text).
    #[arg(long, global = true, env = "ROBOSTOP_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, env = "ROBOSTOP_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Authenticate and print the robot id bound to the account.
    RobotId,
    /// Send a stop command to every listed robot at once.
    Stop(StopArgs),
}

#[derive(Debug, clap::Args)]
pub struct StopArgs {
    /// Robot id to stop (repeatable).
    #[arg(long = "robot", env = "ROBOSTOP_ROBOTS", value_delimiter = ',')]
    pub robots: Vec<String>,

    /// Forward proxy for the stop requests.
    #[arg(long, env = "ROBOSTOP_PROXY")]
    pub proxy: Option<String>,

    /// Connect directly, ignoring any proxy from flag, env or profile.
    #[arg(long)]
    pub no_proxy: bool,
}

/// Connection settings after merging flags, env and profile.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub endpoint: String,
    pub account_id: String,
    pub user_name: String,
    pub password: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("endpoint", &self.endpoint)
            .field("account_id", &self.account_id)
            .field("user_name", &self.user_name)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Robots to stop and the proxy to route through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopPlan {
    pub robot_ids: Vec<String>,
    pub proxy_url: Option<String>,
}

impl Config {
    /// Validate the configuration after parsing.
    pub fn validate(&self) -> anyhow::Result<()> {
        match self.log_format.as_str() {
            "json" | "text" => Ok(()),
            other => anyhow::bail!("invalid log format: {other} (expected json or text)"),
        }
    }

    /// Load the profile named by `--profile`, or an empty one.
    pub fn load_profile(&self) -> anyhow::Result<Profile> {
        match self.profile {
            Some(ref path) => Profile::load(path),
            None => Ok(Profile::default()),
        }
    }

    /// Merge connection settings; flag/env values win over the profile.
    pub fn session(&self, profile: &Profile) -> anyhow::Result<Session> {
        let endpoint = pick(&self.endpoint, &profile.endpoint, "--endpoint", "endpoint")?;
        parse_http_url(&endpoint, "endpoint")?;
        Ok(Session {
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            account_id: pick(&self.account_id, &profile.account_id, "--account-id", "account_id")?,
            user_name: pick(&self.user_name, &profile.user_name, "--user-name", "user_name")?,
            password: pick(&self.password, &profile.password, "--password", "password")?,
        })
    }
}

impl StopArgs {
    /// Resolve the robot list and proxy; flag/env values win over the profile.
    pub fn plan(&self, profile: &Profile) -> anyhow::Result<StopPlan> {
        let robot_ids: Vec<String> = if self.robots.is_empty() {
            profile.robot_ids.clone().unwrap_or_default()
        } else {
            self.robots.clone()
        };
        let robot_ids: Vec<String> =
            robot_ids.into_iter().map(|id| id.trim().to_owned()).filter(|id| !id.is_empty()).collect();
        if robot_ids.is_empty() {
            anyhow::bail!("no robots to stop: pass --robot or set robot_ids in the profile");
        }

        let proxy_url = if self.no_proxy {
            None
        } else {
            self.proxy.clone().or_else(|| profile.proxy_url.clone())
        };
        if let Some(ref url) = proxy_url {
            parse_http_url(url, "proxy")?;
        }

        Ok(StopPlan { robot_ids, proxy_url })
    }
}

fn pick(
    flag: &Option<String>,
    profile: &Option<String>,
    flag_name: &str,
    key: &str,
) -> anyhow::Result<String> {
    match flag.as_ref().or(profile.as_ref()) {
        Some(v) => Ok(v.clone()),
        None => anyhow::bail!("missing {key}: pass {flag_name} or set {key} in the profile"),
    }
}

fn parse_http_url(raw: &str, what: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw).map_err(|e| anyhow::anyhow!("invalid {what} url {raw:?}: {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => anyhow::bail!("invalid {what} url {raw:?}: unsupported scheme {other}"),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
