// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP client with consistent User-Agent header.

use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::warn;

/// Creates a client builder with the scaffold User-Agent and the given
/// request timeout.
///
/// `verify_tls = false` accepts any server certificate, for
/// GitHub Enterprise installs fronted by a private CA.
pub fn builder(timeout: Duration, verify_tls: bool) -> ClientBuilder {
	let builder = Client::builder().user_agent(user_agent()).timeout(timeout);
	if verify_tls {
		builder
	} else {
		warn!("TLS certificate verification is disabled");
		builder.danger_accept_invalid_certs(true)
	}
}

/// Builds a client, mapping builder failures to a plain message.
pub fn new_client(timeout: Duration, verify_tls: bool) -> Result<Client, String> {
	builder(timeout, verify_tls)
		.build()
		.map_err(|e| format!("failed to build HTTP client: {e}"))
}

/// Returns the User-Agent string: `scaffold/{version}`.
pub fn user_agent() -> String {
	format!("scaffold/{}", env!("CARGO_PKG_VERSION"))
}
