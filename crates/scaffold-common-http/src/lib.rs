// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for scaffold.
//!
//! This crate provides:
//! - A pre-configured HTTP client with a consistent User-Agent header
//! - Retry with exponential backoff, gated by a configurable [`RetryScope`]
//!   so non-idempotent writes are never replayed

mod client;
mod retry;

pub use client::{builder, new_client, user_agent};
pub use retry::{retry, retry_call, CallKind, RetryConfig, RetryScope, RetryableError};
