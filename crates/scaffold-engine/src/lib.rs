// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Template automation engine.
//!
//! Creates repositories from a template repository (optionally a
//! subdirectory of it) and destroys them again on presentation of the
//! destroy token that was committed into the repository at creation.
//!
//! Each invocation gets its own [`InvocationContext`] holding the
//! version-control host, the secret and variable stores and the engine
//! configuration. Nothing is cached across invocations; the only durable
//! state is the `.destroy-token` file inside each created repository.
//! Editing or deleting that file revokes the ability to destroy the
//! repository through the engine, and there is no recovery path if it is
//! lost.

pub mod config;
pub mod distributor;
pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod render;
pub mod request;
pub mod resolver;
pub mod response;
pub mod token;

pub use config::EngineConfig;
pub use engine::{CreateOutcome, InvocationContext};
pub use error::{EngineError, PartialFailure, Result, Stage, StageFailure};
pub use orchestrator::BranchCollision;
pub use request::{CreateRequest, DestroyRequest, TemplateRequest, TemplateSettings, VariableValue};
pub use response::{CreateResponse, DestroyResponse, RejectedResponse, Response, Status};
pub use token::{DestroyToken, TOKEN_FILE};
