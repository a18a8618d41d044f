// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Robostop: minimal fleet API client for robot credentials and stop broadcasts.

pub mod config;
pub mod credential;
pub mod dispatch;
pub mod error;
pub mod profile;
pub mod run;
pub mod validate;

#[cfg(test)]
mod test_support;

use std::sync::Once;

static CRYPTO_INIT: Once = Once::new();

/// Install the ring crypto provider for reqwest/rustls. Only the first call
/// has effect.
pub fn ensure_crypto_provider() {
    CRYPTO_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
