// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;
use tracing::error;

use robostop::config::{Command, Config};

fn main() {
    let config = Config::parse();

    if let Err(e) = config.validate() {
        eprintln!("error: {e}");
        std::process::exit(2);
    }

    init_tracing(&config);
    robostop::ensure_crypto_provider();

    std::process::exit(run(&config));
}

fn init_tracing(config: &Config) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout is reserved for command output.
    match config.log_format.as_str() {
        "json" => {
            fmt::fmt().with_env_filter(filter).with_writer(std::io::stderr).json().init();
        }
        _ => {
            fmt::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
        }
    }
}

/// Returns the process exit code: 0 ok, 1 operational failure, 2 bad config.
fn run(config: &Config) -> i32 {
    let profile = match config.load_profile() {
        Ok(p) => p,
        Err(e) => {
            error!("{e:#}");
            return 2;
        }
    };
    let session = match config.session(&profile) {
        Ok(s) => s,
        Err(e) => {
            error!("{e:#}");
            return 2;
        }
    };

    match config.command {
        Command::RobotId => match robostop::run::robot_id(&session) {
            Ok(robot) => {
                println!("robot_id:{}", robot.robot_id);
                0
            }
            Err(e) => {
                error!("{e:#}");
                1
            }
        },
        Command::Stop(ref args) => {
            let plan = match args.plan(&profile) {
                Ok(p) => p,
                Err(e) => {
                    error!("{e:#}");
                    return 2;
                }
            };
            match robostop::run::stop(&session, &plan) {
                Ok(outcomes) if outcomes.iter().all(|o| o.is_ok()) => 0,
                Ok(_) => 1,
                Err(e) => {
                    error!("{e:#}");
                    1
                }
            }
        }
    }
}
