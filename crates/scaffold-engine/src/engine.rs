// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Create and destroy state machines.
//!
//! Create: validated, resolved, rendered, tokenized, committed, then the
//! post-commit stages. Everything before `committed` only reads, so a
//! failure there surfaces directly with nothing to clean up. Failures from
//! `committed` onwards are collected into a [`PartialFailure`].
//!
//! Destroy: token validated, secrets removed (best effort), repository deleted.

use std::sync::Arc;

use scaffold_bundle_store::BundleStore;
use scaffold_github::{CreateRepoOptions, PullRequestSpec, RepoHost, TreeFile};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::distributor;
use crate::error::{EngineError, PartialFailure, Result, Stage, StageFailure};
use crate::orchestrator::{
	choose_branch, commit_rendered_tree, create_init_branch, init_branch_name, open_pull_request,
	pull_request_body,
};
use crate::render::{render_template, RenderContext, Renderer};
use crate::request::{validate_repo_name, CreateRequest, DestroyRequest, TemplateRequest};
use crate::resolver::{self, TemplateSource};
use crate::response::{CreateResponse, DestroyResponse, RejectedResponse, Response};
use crate::token::{self, DestroyToken, TokenLocation, TOKEN_FILE};

/// Stages that only read remote state.
const PRE_COMMIT: [Stage; 4] = [
	Stage::Validated,
	Stage::Resolved,
	Stage::Rendered,
	Stage::Tokenized,
];

/// A create that completed every stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOutcome {
	pub repository_url: String,
	pub pull_request_url: String,
	pub branch: String,
	pub commit_sha: String,
	pub completed: Vec<Stage>,
}

/// Everything one invocation needs. Built per request and dropped with it.
#[derive(Clone)]
pub struct InvocationContext {
	host: Arc<dyn RepoHost>,
	secrets: Arc<dyn BundleStore>,
	variables: Arc<dyn BundleStore>,
	config: Arc<EngineConfig>,
	invocation_id: Uuid,
}

impl InvocationContext {
	pub fn new(
		host: Arc<dyn RepoHost>,
		secrets: Arc<dyn BundleStore>,
		variables: Arc<dyn BundleStore>,
		config: Arc<EngineConfig>,
	) -> Self {
		Self {
			host,
			secrets,
			variables,
			config,
			invocation_id: Uuid::new_v4(),
		}
	}

	pub fn invocation_id(&self) -> Uuid {
		self.invocation_id
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	/// Parse, validate and execute a raw JSON request.
	#[instrument(skip(self, raw), fields(invocation_id = %self.invocation_id))]
	pub async fn run(&self, raw: &str) -> Response {
		match TemplateRequest::from_json(raw) {
			Ok(request) => self.handle(request).await,
			Err(e) => {
				warn!(error = %e, "Rejected request");
				Response::Rejected(RejectedResponse::new(&e))
			}
		}
	}

	/// Execute an already validated request.
	#[instrument(skip(self, request), fields(invocation_id = %self.invocation_id, action = request.action(), project = request.project_name()))]
	pub async fn handle(&self, request: TemplateRequest) -> Response {
		match request {
			TemplateRequest::Create(create) => {
				let result = self.create(&create).await;
				match &result {
					Ok(outcome) => info!(url = %outcome.repository_url, "Create succeeded"),
					Err(EngineError::PartialFailure(partial)) => {
						warn!(failed = ?partial.failed_stages(), "Create partially failed")
					}
					Err(e) => error!(kind = e.kind(), error = %e, "Create failed"),
				}
				Response::Create(CreateResponse::from_result(&create.project_name, result))
			}
			TemplateRequest::Destroy(destroy) => {
				let result = self.destroy(&destroy).await;
				match &result {
					Ok(()) => info!("Destroy succeeded"),
					// The reason stays in the logs; the response does not carry it.
					Err(e) => warn!(kind = e.kind(), error = %e, "Destroy failed"),
				}
				Response::Destroy(DestroyResponse::from_result(&destroy.project_name, result))
			}
		}
	}

	/// Create a repository from the template.
	#[instrument(skip(self, request), fields(project = %request.project_name, template_type = %request.template_settings.template_type))]
	pub async fn create(&self, request: &CreateRequest) -> Result<CreateOutcome> {
		let host = self.host.as_ref();
		let config = self.config.as_ref();
		let project = request.project_name.as_str();

		validate_repo_name(project)?;
		let settings = request.template_settings.clone().validate()?;

		// Only repositories created here ever receive a destroy token.
		if host.get_repo(project).await?.is_some() {
			return Err(repository_exists(project));
		}

		let template_repo = host
			.get_repo(&config.template_repo)
			.await?
			.ok_or_else(|| {
				EngineError::NotFound(format!("template repository {}", config.template_repo))
			})?;
		let source = TemplateSource {
			repo: template_repo.name.clone(),
			git_ref: config
				.template_ref
				.clone()
				.unwrap_or_else(|| template_repo.default_branch.clone()),
			source_path: settings.source_path.clone(),
		};
		let template = resolver::resolve(host, &source).await?;

		let context = RenderContext::new(project, &settings);
		let renderer = Renderer::new();
		let mut tree = render_template(host, &template, &renderer, &context).await?;
		let settings_json = serde_json::to_string_pretty(&settings)
			.map_err(|e| EngineError::render(&config.settings_file, e.to_string()))?;
		tree.insert(TreeFile::new(
			config.settings_file.clone(),
			format!("{settings_json}\n"),
		))?;
		let title = renderer.render_str("pull request title", &config.pr_title, &context)?;

		let destroy_token = DestroyToken::generate();
		tree.insert(TreeFile::new(TOKEN_FILE, destroy_token.file_body()))?;

		let base_branch = init_branch_name(&config.branch_prefix, &settings.template_type);
		let body = pull_request_body(
			&source.repo,
			&source.git_ref,
			source.source_path.as_deref(),
			tree.paths(),
		);
		let message = format!(
			"Initialize {project} from {}@{}",
			source.repo, source.git_ref
		);

		// Everything below mutates the remote.
		let options = CreateRepoOptions {
			private: config.private_repos,
			description: Some(format!(
				"Created from {} ({})",
				source.repo, settings.template_type
			)),
		};
		let handle = host.get_or_create_repo(project, &options).await?;
		if !handle.created {
			// Created by someone else after the existence check.
			return Err(repository_exists(project));
		}
		let repository = handle.repository;

		let mut progress = PartialFailure {
			repository_url: Some(repository.html_url.clone()),
			completed: PRE_COMMIT.to_vec(),
			..Default::default()
		};

		let branch =
			match choose_branch(host, project, &base_branch, config.branch_collision).await {
				Ok(branch) => branch,
				Err(e) => return Err(commit_failed(progress, e)),
			};
		let head = match create_init_branch(host, &repository, &branch).await {
			Ok(head) => head,
			Err(e) => return Err(commit_failed(progress, e)),
		};
		let commit_sha =
			match commit_rendered_tree(host, project, &branch, head, tree.into_files(), message).await {
				Ok(sha) => sha,
				Err(e) => return Err(commit_failed(progress, e)),
			};
		progress.completed.push(Stage::Committed);

		let spec = PullRequestSpec {
			title,
			body,
			head: branch.clone(),
			base: repository.default_branch.clone(),
		};
		match open_pull_request(host, project, &spec, &config.pr_labels).await {
			Ok(pull) => {
				progress.pull_request_url = Some(pull.html_url);
				progress.completed.push(Stage::PrOpened);
			}
			Err(e) => progress.failed.push(StageFailure::new(Stage::PrOpened, e.to_string())),
		}

		let report = distributor::apply(
			host,
			project,
			self.secrets.as_ref(),
			self.variables.as_ref(),
			&settings.template_type,
		)
		.await;
		if report.is_clean() {
			progress.completed.push(Stage::SecretsApplied);
		} else {
			progress
				.failed
				.push(StageFailure::new(Stage::SecretsApplied, report.to_string()));
		}

		if !config.topics.is_empty() {
			record_stage(
				&mut progress,
				Stage::TopicsSet,
				host.set_topics(project, &config.topics).await,
			);
		}

		if let Some(team) = &request.owning_team {
			match host
				.grant_team(project, team, config.owning_team_permission)
				.await
			{
				Ok(()) => progress.completed.push(Stage::TeamAccess),
				Err(e) if e.is_not_found() => {
					warn!(team = %team, "Owning team not found; skipping team access")
				}
				Err(e) => progress
					.failed
					.push(StageFailure::new(Stage::TeamAccess, e.to_string())),
			}
		}

		if request.trigger_init_workflow {
			record_stage(
				&mut progress,
				Stage::WorkflowTriggered,
				host.dispatch_workflow(project, &config.init_workflow, &branch)
					.await,
			);
		}

		if !progress.failed.is_empty() {
			return Err(EngineError::PartialFailure(Box::new(progress)));
		}

		Ok(CreateOutcome {
			repository_url: repository.html_url,
			pull_request_url: progress.pull_request_url.unwrap_or_default(),
			branch,
			commit_sha,
			completed: progress.completed,
		})
	}

	/// Destroy a repository created by [`InvocationContext::create`].
	///
	/// Nothing is deleted unless the provided token matches the live token file.
	#[instrument(skip(self, request), fields(project = %request.project_name))]
	pub async fn destroy(&self, request: &DestroyRequest) -> Result<()> {
		let host = self.host.as_ref();
		let project = request.project_name.as_str();

		validate_repo_name(project)?;
		if request.destroy_token.is_blank() {
			return Err(EngineError::Validation(
				"destroy_token must not be empty".to_string(),
			));
		}

		let repository = host
			.get_repo(project)
			.await?
			.ok_or_else(|| EngineError::NotFound(format!("repository {project}")))?;

		let location = TokenLocation {
			default_branch: &repository.default_branch,
			init_branch_prefix: &self.config.branch_prefix,
		};
		token::validate(host, project, &request.destroy_token, &location).await?;
		info!(project, "Destroy token validated");

		let report = distributor::remove(host, project).await;
		if !report.is_clean() {
			warn!(project, %report, "Continuing with repository deletion");
		}

		host.delete_repo(project).await?;
		info!(project, removed = report.applied.len(), "Repository deleted");
		Ok(())
	}
}

fn repository_exists(project: &str) -> EngineError {
	EngineError::Conflict(format!("repository {project} already exists"))
}

fn commit_failed(mut progress: PartialFailure, error: EngineError) -> EngineError {
	progress
		.failed
		.push(StageFailure::new(Stage::Committed, error.to_string()));
	EngineError::PartialFailure(Box::new(progress))
}

fn record_stage(
	progress: &mut PartialFailure,
	stage: Stage,
	result: scaffold_github::Result<()>,
) {
	match result {
		Ok(()) => progress.completed.push(stage),
		Err(e) => progress.failed.push(StageFailure::new(stage, e.to_string())),
	}
}
