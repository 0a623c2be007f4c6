// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! GitHub REST client implementing [`RepoHost`].
//!
//! Each call is classified with a [`CallKind`] so the retry policy never
//! replays repository creation, branch creation, ref updates, pull request
//! creation or workflow dispatch.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, Method, Response, StatusCode};
use scaffold_common_config::SecretString;
use scaffold_common_http::{retry_call, CallKind};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument, warn};

use crate::config::GithubConfig;
use crate::error::{GithubError, Result};
use crate::host::RepoHost;
use crate::sealed::seal_for_repository;
use crate::types::{
	CommitRequest, CreateRepoOptions, EntryKind, PullRequest, PullRequestSpec, PullRequestSummary,
	PullState, RepoHandle, Repository, TeamPermission, TreeEntry,
};

const API_VERSION: &str = "2022-11-28";
const SECRETS_PAGE_SIZE: u32 = 100;
const VARIABLES_PAGE_SIZE: u32 = 30;
const PULLS_PAGE_SIZE: u32 = 100;
const INIT_POLL_ATTEMPTS: u32 = 6;
const INIT_POLL_BASE_DELAY: Duration = Duration::from_millis(250);

/// Client for the GitHub REST API, scoped to one organization.
#[derive(Clone)]
pub struct GithubClient {
	http_client: Client,
	config: GithubConfig,
}

impl GithubClient {
	pub fn new(config: GithubConfig) -> Result<Self> {
		let http_client = scaffold_common_http::builder(config.request_timeout(), config.verify_tls())
			.build()
			.map_err(|e| GithubError::Config(format!("Failed to create HTTP client: {e}")))?;

		info!(
			org = config.org(),
			base_url = %config.base_url(),
			"Created GitHub client"
		);

		Ok(Self {
			http_client,
			config,
		})
	}

	pub fn config(&self) -> &GithubConfig {
		&self.config
	}

	fn repo_path(&self, repo: &str, rest: &str) -> String {
		format!(
			"repos/{}/{}{rest}",
			urlencoding::encode(self.config.org()),
			urlencoding::encode(repo)
		)
	}

	async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Response> {
		let url = self
			.config
			.base_url()
			.join(path)
			.map_err(|e| GithubError::Config(format!("Invalid URL: {e}")))?;

		debug!(%method, url = %url, "Sending GitHub request");

		let mut request = self
			.http_client
			.request(method, url)
			.header(
				"Authorization",
				format!("Bearer {}", self.config.token().expose()),
			)
			.header("Accept", "application/vnd.github+json")
			.header("X-GitHub-Api-Version", API_VERSION);

		if let Some(body) = body {
			request = request.json(body);
		}

		let response = request.send().await.map_err(|e| {
			if e.is_timeout() {
				return GithubError::Timeout;
			}
			GithubError::Network(e)
		})?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(map_github_error(status, path, &body));
		}

		Ok(response)
	}

	async fn call_json<T: DeserializeOwned>(
		&self,
		kind: CallKind,
		method: Method,
		path: &str,
		body: Option<Value>,
	) -> Result<T> {
		let method = &method;
		let body = body.as_ref();
		retry_call(&self.config.retry_config, kind, || async move {
			let response = self.send(method.clone(), path, body).await?;
			response.json::<T>().await.map_err(|e| {
				error!(error = %e, path, "Failed to parse GitHub response");
				GithubError::InvalidResponse(format!("JSON parse error: {e}"))
			})
		})
		.await
	}

	async fn call_empty(
		&self,
		kind: CallKind,
		method: Method,
		path: &str,
		body: Option<Value>,
	) -> Result<()> {
		let method = &method;
		let body = body.as_ref();
		retry_call(&self.config.retry_config, kind, || async move {
			self.send(method.clone(), path, body).await.map(|_| ())
		})
		.await
	}

	/// Polls until the default branch of a freshly created repository has a head.
	async fn wait_for_default_branch(&self, repo: &str, branch: &str) -> Result<String> {
		for attempt in 0..INIT_POLL_ATTEMPTS {
			match self.branch_head(repo, branch).await {
				Ok(Some(sha)) => return Ok(sha),
				Ok(None) => debug!(repo, branch, attempt, "Default branch not ready yet"),
				Err(e) => debug!(repo, branch, attempt, error = %e, "Default branch not readable yet"),
			}
			tokio::time::sleep(INIT_POLL_BASE_DELAY * (attempt + 1)).await;
		}

		Err(GithubError::InvalidResponse(format!(
			"default branch '{branch}' of {repo} was not initialized"
		)))
	}

	async fn list_names(&self, repo: &str, collection: Collection) -> Result<Vec<String>> {
		let mut names = Vec::new();
		let mut page = 1u32;

		loop {
			let path = self.repo_path(
				repo,
				&format!(
					"/actions/{}?per_page={}&page={page}",
					collection.segment(),
					collection.page_size()
				),
			);
			let listing: NamedListing = self
				.call_json(CallKind::Read, Method::GET, &path, None)
				.await?;

			let batch = match collection {
				Collection::Secrets => listing.secrets,
				Collection::Variables => listing.variables,
			};
			let batch_len = batch.len();
			names.extend(batch.into_iter().map(|n| n.name));

			if batch_len == 0 || names.len() as u64 >= listing.total_count {
				break;
			}
			page += 1;
		}

		Ok(names)
	}

	async fn delete_named(&self, repo: &str, collection: Collection, name: &str) -> Result<()> {
		let path = self.repo_path(
			repo,
			&format!(
				"/actions/{}/{}",
				collection.segment(),
				urlencoding::encode(name)
			),
		);
		match self
			.call_empty(CallKind::IdempotentWrite, Method::DELETE, &path, None)
			.await
		{
			Err(GithubError::NotFound(_)) => {
				debug!(repo, name, "Already absent");
				Ok(())
			}
			other => other,
		}
	}
}

#[derive(Debug, Clone, Copy)]
enum Collection {
	Secrets,
	Variables,
}

impl Collection {
	fn segment(self) -> &'static str {
		match self {
			Collection::Secrets => "secrets",
			Collection::Variables => "variables",
		}
	}

	fn page_size(self) -> u32 {
		match self {
			Collection::Secrets => SECRETS_PAGE_SIZE,
			Collection::Variables => VARIABLES_PAGE_SIZE,
		}
	}
}

#[async_trait]
impl RepoHost for GithubClient {
	fn org(&self) -> &str {
		self.config.org()
	}

	#[instrument(skip(self))]
	async fn get_repo(&self, repo: &str) -> Result<Option<Repository>> {
		let path = self.repo_path(repo, "");
		found(self.call_json(CallKind::Read, Method::GET, &path, None).await)
	}

	#[instrument(skip(self, options))]
	async fn get_or_create_repo(
		&self,
		repo: &str,
		options: &CreateRepoOptions,
	) -> Result<RepoHandle> {
		if let Some(repository) = self.get_repo(repo).await? {
			return Ok(RepoHandle {
				repository,
				created: false,
			});
		}

		let body = json!({
			"name": repo,
			"private": options.private,
			"auto_init": true,
			"description": options.description,
		});
		let path = format!("orgs/{}/repos", urlencoding::encode(self.config.org()));

		let repository: Repository = match self
			.call_json(CallKind::NonIdempotentWrite, Method::POST, &path, Some(body))
			.await
		{
			Ok(repository) => repository,
			Err(GithubError::Conflict(message)) => {
				warn!(repo, "Repository appeared concurrently");
				return match self.get_repo(repo).await? {
					Some(repository) => Ok(RepoHandle {
						repository,
						created: false,
					}),
					None => Err(GithubError::Conflict(message)),
				};
			}
			Err(e) => return Err(e),
		};

		info!(repo, default_branch = %repository.default_branch, "Created repository");
		self
			.wait_for_default_branch(repo, &repository.default_branch)
			.await?;

		Ok(RepoHandle {
			repository,
			created: true,
		})
	}

	#[instrument(skip(self))]
	async fn list_tree(&self, repo: &str, git_ref: &str) -> Result<Vec<TreeEntry>> {
		let path = self.repo_path(
			repo,
			&format!("/git/trees/{git_ref}?recursive=1"),
		);
		let tree: GitHubTree = self
			.call_json(CallKind::Read, Method::GET, &path, None)
			.await?;

		if tree.truncated {
			return Err(GithubError::InvalidResponse(format!(
				"tree listing of {repo}@{git_ref} was truncated"
			)));
		}

		debug!(entries = tree.tree.len(), "Tree listed");

		Ok(tree
			.tree
			.into_iter()
			.map(|entry| TreeEntry {
				path: entry.path,
				kind: entry.kind,
				sha: entry.sha,
				mode: entry.mode,
			})
			.collect())
	}

	#[instrument(skip(self))]
	async fn get_blob(&self, repo: &str, sha: &str) -> Result<Vec<u8>> {
		let path = self.repo_path(repo, &format!("/git/blobs/{sha}"));
		let blob: GitHubBlob = self
			.call_json(CallKind::Read, Method::GET, &path, None)
			.await?;

		match blob.encoding.as_str() {
			"base64" => decode_base64(&blob.content),
			"utf-8" => Ok(blob.content.into_bytes()),
			other => Err(GithubError::InvalidResponse(format!(
				"unsupported blob encoding '{other}'"
			))),
		}
	}

	#[instrument(skip(self))]
	async fn get_file(
		&self,
		repo: &str,
		path: &str,
		git_ref: Option<&str>,
	) -> Result<Option<Vec<u8>>> {
		let mut request_path = self.repo_path(repo, &format!("/contents/{}", encode_path(path)));
		if let Some(git_ref) = git_ref {
			request_path.push_str(&format!("?ref={}", urlencoding::encode(git_ref)));
		}

		let value: Option<Value> = found(
			self
				.call_json(CallKind::Read, Method::GET, &request_path, None)
				.await,
		)?;

		// Directories come back as arrays.
		let Some(Value::Object(object)) = value else {
			return Ok(None);
		};
		if object.get("type").and_then(Value::as_str) != Some("file") {
			return Ok(None);
		}

		let content = object.get("content").and_then(Value::as_str).unwrap_or("");
		let encoding = object.get("encoding").and_then(Value::as_str);
		if encoding == Some("base64") && !content.is_empty() {
			return decode_base64(content).map(Some);
		}

		// Large files omit inline content.
		match object.get("sha").and_then(Value::as_str) {
			Some(sha) => self.get_blob(repo, sha).await.map(Some),
			None => Err(GithubError::InvalidResponse(format!(
				"file {path} has neither content nor sha"
			))),
		}
	}

	#[instrument(skip(self))]
	async fn branch_head(&self, repo: &str, branch: &str) -> Result<Option<String>> {
		let path = self.repo_path(repo, &format!("/git/ref/heads/{branch}"));
		let reference: Option<GitHubRef> =
			found(self.call_json(CallKind::Read, Method::GET, &path, None).await)?;
		Ok(reference.map(|r| r.object.sha))
	}

	#[instrument(skip(self))]
	async fn path_has_history(&self, repo: &str, path: &str, git_ref: &str) -> Result<bool> {
		let request_path = self.repo_path(
			repo,
			&format!(
				"/commits?sha={}&path={}&per_page=1",
				urlencoding::encode(git_ref),
				urlencoding::encode(path)
			),
		);
		let commits: Vec<GitHubSha> = match self
			.call_json(CallKind::Read, Method::GET, &request_path, None)
			.await
		{
			Ok(commits) => commits,
			// Empty repositories have no history at all.
			Err(GithubError::Conflict(_)) => Vec::new(),
			Err(e) => return Err(e),
		};

		Ok(!commits.is_empty())
	}

	#[instrument(skip(self))]
	async fn list_branches(&self, repo: &str, prefix: &str) -> Result<Vec<String>> {
		let path = self.repo_path(repo, &format!("/git/matching-refs/heads/{prefix}"));
		let refs: Vec<GitHubRef> = match self
			.call_json(CallKind::Read, Method::GET, &path, None)
			.await
		{
			Ok(refs) => refs,
			// Empty repositories have no refs at all.
			Err(GithubError::Conflict(_)) | Err(GithubError::NotFound(_)) => Vec::new(),
			Err(e) => return Err(e),
		};

		Ok(refs
			.into_iter()
			.filter_map(|r| r.name.strip_prefix("refs/heads/").map(str::to_string))
			.collect())
	}

	#[instrument(skip(self))]
	async fn create_branch(&self, repo: &str, branch: &str, from_sha: &str) -> Result<()> {
		let path = self.repo_path(repo, "/git/refs");
		let body = json!({
			"ref": format!("refs/heads/{branch}"),
			"sha": from_sha,
		});
		let _: GitHubRef = self
			.call_json(CallKind::NonIdempotentWrite, Method::POST, &path, Some(body))
			.await?;

		info!(repo, branch, "Created branch");
		Ok(())
	}

	#[instrument(skip(self, commit), fields(branch = %commit.branch, files = commit.files.len()))]
	async fn commit_tree(&self, repo: &str, commit: &CommitRequest) -> Result<String> {
		let parent_path = self.repo_path(repo, &format!("/git/commits/{}", commit.parent_sha));
		let parent: GitHubCommit = self
			.call_json(CallKind::Read, Method::GET, &parent_path, None)
			.await?;

		let blobs_path = self.repo_path(repo, "/git/blobs");
		let mut tree = Vec::with_capacity(commit.files.len());
		for file in &commit.files {
			let body = json!({
				"content": STANDARD.encode(&file.content),
				"encoding": "base64",
			});
			let blob: GitHubSha = self
				.call_json(CallKind::IdempotentWrite, Method::POST, &blobs_path, Some(body))
				.await?;
			tree.push(json!({
				"path": file.path,
				"mode": file.mode.as_git_mode(),
				"type": "blob",
				"sha": blob.sha,
			}));
		}

		let trees_path = self.repo_path(repo, "/git/trees");
		let new_tree: GitHubSha = self
			.call_json(
				CallKind::IdempotentWrite,
				Method::POST,
				&trees_path,
				Some(json!({ "base_tree": parent.tree.sha, "tree": tree })),
			)
			.await?;

		let author = self.config.author();
		let commits_path = self.repo_path(repo, "/git/commits");
		let new_commit: GitHubSha = self
			.call_json(
				CallKind::IdempotentWrite,
				Method::POST,
				&commits_path,
				Some(json!({
					"message": commit.message,
					"tree": new_tree.sha,
					"parents": [commit.parent_sha],
					"author": { "name": author.name, "email": author.email },
					"committer": { "name": author.name, "email": author.email },
				})),
			)
			.await?;

		// Nothing is visible on the branch until this fast-forward lands.
		let ref_path = self.repo_path(repo, &format!("/git/refs/heads/{}", commit.branch));
		let _: GitHubRef = self
			.call_json(
				CallKind::NonIdempotentWrite,
				Method::PATCH,
				&ref_path,
				Some(json!({ "sha": new_commit.sha, "force": false })),
			)
			.await?;

		info!(repo, sha = %new_commit.sha, "Committed tree");
		Ok(new_commit.sha)
	}

	#[instrument(skip(self, spec), fields(head = %spec.head, base = %spec.base))]
	async fn open_pull_request(&self, repo: &str, spec: &PullRequestSpec) -> Result<PullRequest> {
		let path = self.repo_path(repo, "/pulls");
		let body = json!({
			"title": spec.title,
			"body": spec.body,
			"head": spec.head,
			"base": spec.base,
		});
		let pull: PullRequest = self
			.call_json(CallKind::NonIdempotentWrite, Method::POST, &path, Some(body))
			.await?;

		info!(repo, number = pull.number, "Opened pull request");
		Ok(pull)
	}

	#[instrument(skip(self))]
	async fn list_pull_requests(&self, repo: &str, base: &str) -> Result<Vec<PullRequestSummary>> {
		let mut pulls = Vec::new();
		let mut page = 1u32;

		loop {
			let path = self.repo_path(
				repo,
				&format!(
					"/pulls?state=all&base={}&sort=created&direction=asc&per_page={PULLS_PAGE_SIZE}&page={page}",
					urlencoding::encode(base)
				),
			);
			let batch: Vec<GitHubPull> = self
				.call_json(CallKind::Read, Method::GET, &path, None)
				.await?;

			let batch_len = batch.len();
			pulls.extend(batch.into_iter().map(|pull| PullRequestSummary {
				number: pull.number,
				state: pull.state,
				head: pull.head.name,
			}));

			if batch_len < PULLS_PAGE_SIZE as usize {
				break;
			}
			page += 1;
		}

		pulls.sort_by_key(|pull| pull.number);
		Ok(pulls)
	}

	#[instrument(skip(self))]
	async fn add_labels(&self, repo: &str, number: u64, labels: &[String]) -> Result<()> {
		if labels.is_empty() {
			return Ok(());
		}
		let path = self.repo_path(repo, &format!("/issues/{number}/labels"));
		let _: Value = self
			.call_json(
				CallKind::IdempotentWrite,
				Method::POST,
				&path,
				Some(json!({ "labels": labels })),
			)
			.await?;
		Ok(())
	}

	#[instrument(skip(self, value))]
	async fn set_secret(&self, repo: &str, name: &str, value: &SecretString) -> Result<()> {
		let key_path = self.repo_path(repo, "/actions/secrets/public-key");
		let key: PublicKeyResponse = self
			.call_json(CallKind::Read, Method::GET, &key_path, None)
			.await?;

		let encrypted_value = seal_for_repository(&key.key, value.expose().as_bytes())?;

		let path = self.repo_path(
			repo,
			&format!("/actions/secrets/{}", urlencoding::encode(name)),
		);
		self
			.call_empty(
				CallKind::IdempotentWrite,
				Method::PUT,
				&path,
				Some(json!({ "encrypted_value": encrypted_value, "key_id": key.key_id })),
			)
			.await
	}

	#[instrument(skip(self, value))]
	async fn set_variable(&self, repo: &str, name: &str, value: &str) -> Result<()> {
		let body = json!({ "name": name, "value": value });
		let path = self.repo_path(
			repo,
			&format!("/actions/variables/{}", urlencoding::encode(name)),
		);

		match self
			.call_empty(CallKind::IdempotentWrite, Method::PATCH, &path, Some(body.clone()))
			.await
		{
			Err(GithubError::NotFound(_)) => {
				debug!(repo, name, "Variable absent, creating");
				let create_path = self.repo_path(repo, "/actions/variables");
				self
					.call_empty(
						CallKind::NonIdempotentWrite,
						Method::POST,
						&create_path,
						Some(body),
					)
					.await
			}
			other => other,
		}
	}

	#[instrument(skip(self))]
	async fn list_secrets(&self, repo: &str) -> Result<Vec<String>> {
		self.list_names(repo, Collection::Secrets).await
	}

	#[instrument(skip(self))]
	async fn list_variables(&self, repo: &str) -> Result<Vec<String>> {
		self.list_names(repo, Collection::Variables).await
	}

	#[instrument(skip(self))]
	async fn delete_secret(&self, repo: &str, name: &str) -> Result<()> {
		self.delete_named(repo, Collection::Secrets, name).await
	}

	#[instrument(skip(self))]
	async fn delete_variable(&self, repo: &str, name: &str) -> Result<()> {
		self.delete_named(repo, Collection::Variables, name).await
	}

	#[instrument(skip(self))]
	async fn delete_repo(&self, repo: &str) -> Result<()> {
		let path = self.repo_path(repo, "");
		self
			.call_empty(CallKind::IdempotentWrite, Method::DELETE, &path, None)
			.await?;
		info!(repo, "Deleted repository");
		Ok(())
	}

	#[instrument(skip(self))]
	async fn set_topics(&self, repo: &str, topics: &[String]) -> Result<()> {
		let path = self.repo_path(repo, "/topics");
		let _: Value = self
			.call_json(
				CallKind::IdempotentWrite,
				Method::PUT,
				&path,
				Some(json!({ "names": topics })),
			)
			.await?;
		Ok(())
	}

	#[instrument(skip(self))]
	async fn grant_team(&self, repo: &str, team: &str, permission: TeamPermission) -> Result<()> {
		let org = urlencoding::encode(self.config.org());
		let path = format!(
			"orgs/{org}/teams/{}/repos/{org}/{}",
			urlencoding::encode(team),
			urlencoding::encode(repo)
		);
		self
			.call_empty(
				CallKind::IdempotentWrite,
				Method::PUT,
				&path,
				Some(json!({ "permission": permission.as_str() })),
			)
			.await
	}

	#[instrument(skip(self))]
	async fn dispatch_workflow(&self, repo: &str, workflow: &str, git_ref: &str) -> Result<()> {
		let path = self.repo_path(
			repo,
			&format!(
				"/actions/workflows/{}/dispatches",
				urlencoding::encode(workflow)
			),
		);
		self
			.call_empty(
				CallKind::NonIdempotentWrite,
				Method::POST,
				&path,
				Some(json!({ "ref": git_ref })),
			)
			.await
	}
}

// GitHub API response types (internal)

#[derive(Debug, Deserialize)]
struct GitHubTree {
	#[serde(default)]
	truncated: bool,
	tree: Vec<GitHubTreeEntry>,
}

#[derive(Debug, Deserialize)]
struct GitHubTreeEntry {
	path: String,
	mode: String,
	#[serde(rename = "type")]
	kind: EntryKind,
	sha: String,
}

#[derive(Debug, Deserialize)]
struct GitHubBlob {
	content: String,
	encoding: String,
}

#[derive(Debug, Deserialize)]
struct GitHubRef {
	#[serde(rename = "ref")]
	name: String,
	object: GitHubSha,
}

#[derive(Debug, Deserialize)]
struct GitHubSha {
	sha: String,
}

#[derive(Debug, Deserialize)]
struct GitHubCommit {
	tree: GitHubSha,
}

#[derive(Debug, Deserialize)]
struct GitHubPull {
	number: u64,
	state: PullState,
	head: GitHubPullHead,
}

#[derive(Debug, Deserialize)]
struct GitHubPullHead {
	#[serde(rename = "ref")]
	name: String,
}

#[derive(Debug, Deserialize)]
struct PublicKeyResponse {
	key_id: String,
	key: String,
}

#[derive(Debug, Deserialize)]
struct NamedListing {
	total_count: u64,
	#[serde(default)]
	secrets: Vec<Named>,
	#[serde(default)]
	variables: Vec<Named>,
}

#[derive(Debug, Deserialize)]
struct Named {
	name: String,
}

/// Turn a not-found error into `Ok(None)`.
fn found<T>(result: Result<T>) -> Result<Option<T>> {
	match result {
		Ok(value) => Ok(Some(value)),
		Err(GithubError::NotFound(_)) => Ok(None),
		Err(e) => Err(e),
	}
}

fn encode_path(path: &str) -> String {
	path
		.split('/')
		.map(|segment| urlencoding::encode(segment).into_owned())
		.collect::<Vec<_>>()
		.join("/")
}

fn decode_base64(content: &str) -> Result<Vec<u8>> {
	let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
	STANDARD
		.decode(compact)
		.map_err(|e| GithubError::InvalidResponse(format!("invalid base64 content: {e}")))
}

fn error_message(body: &str) -> String {
	serde_json::from_str::<Value>(body)
		.ok()
		.and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
		.unwrap_or_else(|| body.to_string())
}

/// Map an HTTP error status from GitHub to a [`GithubError`].
pub(crate) fn map_github_error(status: StatusCode, path: &str, body: &str) -> GithubError {
	let status_code = status.as_u16();
	let lower = body.to_lowercase();
	let resource = path.split('?').next().unwrap_or(path).to_string();

	match status_code {
		401 => {
			warn!(status = status_code, "Unauthorized request to GitHub");
			GithubError::Unauthorized
		}
		403 if lower.contains("rate limit") || lower.contains("api rate") => {
			warn!(status = status_code, "GitHub rate limit exceeded");
			GithubError::RateLimited
		}
		403 => {
			warn!(status = status_code, "Forbidden request to GitHub");
			GithubError::Forbidden
		}
		404 => GithubError::NotFound(resource),
		409 => GithubError::Conflict(error_message(body)),
		422 if lower.contains("already exists") => GithubError::Conflict(error_message(body)),
		429 => {
			warn!(status = status_code, "GitHub rate limit exceeded");
			GithubError::RateLimited
		}
		_ => {
			error!(status = status_code, body = %body, "GitHub API error");
			GithubError::ApiError {
				status: status_code,
				message: body.to_string(),
			}
		}
	}
}
