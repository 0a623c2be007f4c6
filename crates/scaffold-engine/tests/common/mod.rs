// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! In-memory `RepoHost` and `BundleStore` used by the lifecycle tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use scaffold_bundle_store::{Bundle, BundleStore, StoreError};
use scaffold_common_secret::SecretString;
use scaffold_engine::{EngineConfig, InvocationContext};
use scaffold_github::{
	CommitRequest, CreateRepoOptions, EntryKind, FileMode, GithubError, PullRequest,
	PullRequestSpec, PullRequestSummary, PullState, RepoHandle, RepoHost, Repository,
	TeamPermission, TreeEntry,
};

pub const ORG: &str = "acme";
pub const TEMPLATE_REPO: &str = "platform-templates";

type Snapshot = BTreeMap<String, (Vec<u8>, FileMode)>;

#[derive(Debug, Clone, Default)]
pub struct FakeRepo {
	pub default_branch: String,
	pub private: bool,
	pub description: Option<String>,
	pub branches: BTreeMap<String, String>,
	pub secrets: BTreeMap<String, String>,
	pub variables: BTreeMap<String, String>,
	pub topics: Vec<String>,
	pub teams: Vec<(String, TeamPermission)>,
	/// Pull request `n` is `pulls[n - 1]`.
	pub pulls: Vec<PullRequestSpec>,
	pub closed_pulls: BTreeSet<u64>,
	pub labels: Vec<String>,
	pub dispatches: Vec<(String, String)>,
}

#[derive(Default)]
struct State {
	repos: BTreeMap<String, FakeRepo>,
	commits: BTreeMap<String, Snapshot>,
	parents: BTreeMap<String, Vec<String>>,
	next_commit: u64,
	/// Repositories that someone else creates between our existence check and our create.
	appearing: HashSet<String>,
	/// Branches pushed by someone else right after we create a repository.
	racing_branches: BTreeMap<String, Vec<String>>,
	teams: HashSet<String>,
	failing: HashSet<String>,
	mutations: Vec<String>,
}

impl State {
	fn fail(&self, op: &str, detail: &str) -> Result<(), GithubError> {
		if self.failing.contains(op) || self.failing.contains(&format!("{op}:{detail}")) {
			return Err(GithubError::Timeout);
		}
		Ok(())
	}

	fn repo(&self, repo: &str) -> Result<&FakeRepo, GithubError> {
		self.repos
			.get(repo)
			.ok_or_else(|| GithubError::NotFound(format!("repos/{ORG}/{repo}")))
	}

	fn repo_mut(&mut self, repo: &str) -> Result<&mut FakeRepo, GithubError> {
		self.repos
			.get_mut(repo)
			.ok_or_else(|| GithubError::NotFound(format!("repos/{ORG}/{repo}")))
	}

	fn store_commit(&mut self, snapshot: Snapshot, parents: Vec<String>) -> String {
		self.next_commit += 1;
		let sha = format!("c{}", self.next_commit);
		self.commits.insert(sha.clone(), snapshot);
		self.parents.insert(sha.clone(), parents);
		sha
	}

	fn new_repo(&mut self, snapshot: Snapshot) -> FakeRepo {
		let sha = self.store_commit(snapshot, Vec::new());
		let mut repo = FakeRepo {
			default_branch: "main".to_string(),
			..Default::default()
		};
		repo.branches.insert("main".to_string(), sha);
		repo
	}

	fn resolve_ref(&self, repo: &str, git_ref: &str) -> Result<String, GithubError> {
		let fake = self.repo(repo)?;
		if let Some(sha) = fake.branches.get(git_ref) {
			return Ok(sha.clone());
		}
		if self.commits.contains_key(git_ref) {
			return Ok(git_ref.to_string());
		}
		Err(GithubError::NotFound(format!("repos/{ORG}/{repo}/git/trees/{git_ref}")))
	}
}

/// Fake version-control host. Commits are full snapshots; blob shas are
/// `"{commit}:{path}"`.
#[derive(Default)]
pub struct FakeHost {
	state: Mutex<State>,
}

impl FakeHost {
	pub fn new() -> Self {
		Self::default()
	}

	fn state(&self) -> MutexGuard<'_, State> {
		self.state.lock().unwrap()
	}

	/// Add a repository whose `main` branch holds `files`. Not logged as a mutation.
	pub fn seed_repo(&self, name: &str, files: &[(&str, &str)]) {
		let mut state = self.state();
		let snapshot: Snapshot = files
			.iter()
			.map(|(path, content)| {
				(
					path.to_string(),
					(content.as_bytes().to_vec(), FileMode::Regular),
				)
			})
			.collect();
		let repo = state.new_repo(snapshot);
		state.repos.insert(name.to_string(), repo);
	}

	/// Add a branch to `repo` holding `files` on top of the default branch.
	pub fn seed_branch(&self, repo: &str, branch: &str, files: &[(&str, &str)]) {
		let mut state = self.state();
		let default = state.repos[repo].default_branch.clone();
		let head = state.repos[repo].branches[&default].clone();
		let mut snapshot = state.commits[&head].clone();
		for (path, content) in files {
			snapshot.insert(
				path.to_string(),
				(content.as_bytes().to_vec(), FileMode::Regular),
			);
		}
		let sha = state.store_commit(snapshot, vec![head]);
		state
			.repos
			.get_mut(repo)
			.unwrap()
			.branches
			.insert(branch.to_string(), sha);
	}

	pub fn seed_team(&self, team: &str) {
		self.state().teams.insert(team.to_string());
	}

	pub fn seed_secret(&self, repo: &str, name: &str, value: &str) {
		self.state()
			.repos
			.get_mut(repo)
			.unwrap()
			.secrets
			.insert(name.to_string(), value.to_string());
	}

	/// Make `op` (or `op:detail`) fail with a timeout from now on.
	pub fn fail_on(&self, op: &str) {
		self.state().failing.insert(op.to_string());
	}

	pub fn heal(&self, op: &str) {
		self.state().failing.remove(op);
	}

	pub fn mutations(&self) -> Vec<String> {
		self.state().mutations.clone()
	}

	pub fn repo(&self, name: &str) -> Option<FakeRepo> {
		self.state().repos.get(name).cloned()
	}

	/// Content of `path` on `branch`, or `None`.
	pub fn file(&self, repo: &str, branch: &str, path: &str) -> Option<String> {
		let state = self.state();
		let sha = state.repos.get(repo)?.branches.get(branch)?;
		let (content, _) = state.commits.get(sha)?.get(path)?;
		Some(String::from_utf8_lossy(content).into_owned())
	}

	/// Every path on `branch`, sorted.
	pub fn paths(&self, repo: &str, branch: &str) -> Vec<String> {
		let state = self.state();
		let Some(sha) = state.repos.get(repo).and_then(|r| r.branches.get(branch)) else {
			return Vec::new();
		};
		state.commits[sha].keys().cloned().collect()
	}

	/// Overwrite `path` on `branch` as a manual edit would.
	pub fn edit_file(&self, repo: &str, branch: &str, path: &str, content: Option<&str>) {
		let mut state = self.state();
		let head = state.repos[repo].branches[branch].clone();
		let mut snapshot = state.commits[&head].clone();
		match content {
			Some(content) => {
				snapshot.insert(
					path.to_string(),
					(content.as_bytes().to_vec(), FileMode::Regular),
				);
			}
			None => {
				snapshot.remove(path);
			}
		}
		let sha = state.store_commit(snapshot, vec![head]);
		state
			.repos
			.get_mut(repo)
			.unwrap()
			.branches
			.insert(branch.to_string(), sha);
	}

	/// Merge pull request `number` with a merge commit and close it.
	pub fn merge_pull(&self, repo: &str, number: u64) {
		let mut state = self.state();
		let spec = state.repos[repo].pulls[number as usize - 1].clone();
		let base = state.repos[repo].branches[&spec.base].clone();
		let head = state.repos[repo].branches[&spec.head].clone();
		let snapshot = state.commits[&head].clone();
		let sha = state.store_commit(snapshot, vec![base, head]);
		let fake = state.repos.get_mut(repo).unwrap();
		fake.branches.insert(spec.base, sha);
		fake.closed_pulls.insert(number);
	}

	/// Close pull request `number` without merging.
	pub fn close_pull(&self, repo: &str, number: u64) {
		self.state()
			.repos
			.get_mut(repo)
			.unwrap()
			.closed_pulls
			.insert(number);
	}

	/// Open a pull request as another user would. Returns its number.
	pub fn open_foreign_pull(&self, repo: &str, head: &str, base: &str) -> u64 {
		let mut state = self.state();
		let fake = state.repos.get_mut(repo).unwrap();
		fake.pulls.push(PullRequestSpec {
			title: "unrelated".into(),
			body: String::new(),
			head: head.into(),
			base: base.into(),
		});
		fake.pulls.len() as u64
	}

	/// Have `repo` created by someone else right before our own create call.
	pub fn appear_on_create(&self, repo: &str) {
		self.state().appearing.insert(repo.to_string());
	}

	/// Have `branch` pushed to `repo` right after we create it.
	pub fn race_branch_on_create(&self, repo: &str, branch: &str) {
		self.state()
			.racing_branches
			.entry(repo.to_string())
			.or_default()
			.push(branch.to_string());
	}

	fn repository(name: &str, fake: &FakeRepo) -> Repository {
		Repository {
			name: name.to_string(),
			full_name: format!("{ORG}/{name}"),
			html_url: format!("https://github.example/{ORG}/{name}"),
			default_branch: fake.default_branch.clone(),
			private: fake.private,
		}
	}
}

#[async_trait]
impl RepoHost for FakeHost {
	fn org(&self) -> &str {
		ORG
	}

	async fn get_repo(&self, repo: &str) -> Result<Option<Repository>, GithubError> {
		let state = self.state();
		state.fail("get_repo", repo)?;
		Ok(state
			.repos
			.get(repo)
			.map(|fake| Self::repository(repo, fake)))
	}

	async fn get_or_create_repo(
		&self,
		repo: &str,
		options: &CreateRepoOptions,
	) -> Result<RepoHandle, GithubError> {
		let mut state = self.state();
		state.fail("get_or_create_repo", repo)?;
		if state.appearing.remove(repo) {
			let mut readme = Snapshot::new();
			readme.insert(
				"README.md".to_string(),
				(b"someone else's\n".to_vec(), FileMode::Regular),
			);
			let fake = state.new_repo(readme);
			state.repos.insert(repo.to_string(), fake);
		}
		if let Some(fake) = state.repos.get(repo) {
			return Ok(RepoHandle {
				repository: Self::repository(repo, fake),
				created: false,
			});
		}

		let mut readme = Snapshot::new();
		readme.insert(
			"README.md".to_string(),
			(format!("# {repo}\n").into_bytes(), FileMode::Regular),
		);
		let mut fake = state.new_repo(readme);
		fake.private = options.private;
		fake.description = options.description.clone();
		let head = fake.branches["main"].clone();
		for branch in state.racing_branches.remove(repo).unwrap_or_default() {
			fake.branches.insert(branch, head.clone());
		}
		let repository = Self::repository(repo, &fake);
		state.repos.insert(repo.to_string(), fake);
		state.mutations.push(format!("create_repo:{repo}"));

		Ok(RepoHandle {
			repository,
			created: true,
		})
	}

	async fn list_tree(&self, repo: &str, git_ref: &str) -> Result<Vec<TreeEntry>, GithubError> {
		let state = self.state();
		state.fail("list_tree", repo)?;
		let sha = state.resolve_ref(repo, git_ref)?;

		let mut directories = BTreeSet::new();
		let mut entries = Vec::new();
		for (path, (_, mode)) in &state.commits[&sha] {
			let segments: Vec<&str> = path.split('/').collect();
			for depth in 1..segments.len() {
				directories.insert(segments[..depth].join("/"));
			}
			entries.push(TreeEntry {
				path: path.clone(),
				kind: EntryKind::Blob,
				sha: format!("{sha}:{path}"),
				mode: mode.as_git_mode().to_string(),
			});
		}
		entries.extend(directories.into_iter().map(|path| TreeEntry {
			sha: format!("tree:{path}"),
			path,
			kind: EntryKind::Tree,
			mode: "040000".to_string(),
		}));
		entries.sort_by(|a, b| a.path.cmp(&b.path));
		Ok(entries)
	}

	async fn get_blob(&self, repo: &str, sha: &str) -> Result<Vec<u8>, GithubError> {
		let state = self.state();
		state.fail("get_blob", repo)?;
		let (commit, path) = sha
			.split_once(':')
			.ok_or_else(|| GithubError::NotFound(format!("blob {sha}")))?;
		state
			.commits
			.get(commit)
			.and_then(|snapshot| snapshot.get(path))
			.map(|(content, _)| content.clone())
			.ok_or_else(|| GithubError::NotFound(format!("blob {sha}")))
	}

	async fn get_file(
		&self,
		repo: &str,
		path: &str,
		git_ref: Option<&str>,
	) -> Result<Option<Vec<u8>>, GithubError> {
		let state = self.state();
		state.fail("get_file", repo)?;
		let fake = state.repo(repo)?;
		let branch = git_ref.unwrap_or(&fake.default_branch);
		let Some(sha) = fake.branches.get(branch) else {
			return Ok(None);
		};
		Ok(state.commits[sha].get(path).map(|(content, _)| content.clone()))
	}

	async fn branch_head(&self, repo: &str, branch: &str) -> Result<Option<String>, GithubError> {
		let state = self.state();
		state.fail("branch_head", repo)?;
		Ok(state.repo(repo)?.branches.get(branch).cloned())
	}

	async fn path_has_history(
		&self,
		repo: &str,
		path: &str,
		git_ref: &str,
	) -> Result<bool, GithubError> {
		let state = self.state();
		state.fail("path_has_history", repo)?;
		let mut pending = vec![state.resolve_ref(repo, git_ref)?];
		let mut seen = HashSet::new();
		while let Some(sha) = pending.pop() {
			if !seen.insert(sha.clone()) {
				continue;
			}
			if state.commits[&sha].contains_key(path) {
				return Ok(true);
			}
			pending.extend(state.parents.get(&sha).into_iter().flatten().cloned());
		}
		Ok(false)
	}

	async fn list_branches(&self, repo: &str, prefix: &str) -> Result<Vec<String>, GithubError> {
		let state = self.state();
		state.fail("list_branches", repo)?;
		Ok(state
			.repo(repo)?
			.branches
			.keys()
			.filter(|name| name.starts_with(prefix))
			.cloned()
			.collect())
	}

	async fn create_branch(&self, repo: &str, branch: &str, from_sha: &str) -> Result<(), GithubError> {
		let mut state = self.state();
		state.fail("create_branch", repo)?;
		let fake = state.repo_mut(repo)?;
		if fake.branches.contains_key(branch) {
			// GitHub answers 422 "Reference already exists".
			return Err(GithubError::Conflict(format!("Reference refs/heads/{branch} already exists")));
		}
		fake.branches.insert(branch.to_string(), from_sha.to_string());
		state.mutations.push(format!("create_branch:{repo}:{branch}"));
		Ok(())
	}

	async fn commit_tree(&self, repo: &str, commit: &CommitRequest) -> Result<String, GithubError> {
		let mut state = self.state();
		state.fail("commit_tree", repo)?;
		let head = state
			.repo(repo)?
			.branches
			.get(&commit.branch)
			.cloned()
			.ok_or_else(|| GithubError::NotFound(format!("branch {}", commit.branch)))?;
		if head != commit.parent_sha {
			return Err(GithubError::Conflict("Update is not a fast forward".into()));
		}

		let mut snapshot = state.commits[&head].clone();
		for file in &commit.files {
			snapshot.insert(file.path.clone(), (file.content.clone(), file.mode));
		}
		let sha = state.store_commit(snapshot, vec![head]);
		state
			.repo_mut(repo)?
			.branches
			.insert(commit.branch.clone(), sha.clone());
		state
			.mutations
			.push(format!("commit:{repo}:{}", commit.branch));
		Ok(sha)
	}

	async fn open_pull_request(
		&self,
		repo: &str,
		spec: &PullRequestSpec,
	) -> Result<PullRequest, GithubError> {
		let mut state = self.state();
		state.fail("open_pull_request", repo)?;
		let fake = state.repo_mut(repo)?;
		fake.pulls.push(spec.clone());
		let number = fake.pulls.len() as u64;
		state.mutations.push(format!("open_pull_request:{repo}"));
		Ok(PullRequest {
			number,
			html_url: format!("https://github.example/{ORG}/{repo}/pull/{number}"),
		})
	}

	async fn list_pull_requests(
		&self,
		repo: &str,
		base: &str,
	) -> Result<Vec<PullRequestSummary>, GithubError> {
		let state = self.state();
		state.fail("list_pull_requests", repo)?;
		let fake = state.repo(repo)?;
		Ok(fake
			.pulls
			.iter()
			.zip(1u64..)
			.filter(|(spec, _)| spec.base == base)
			.map(|(spec, number)| PullRequestSummary {
				number,
				state: if fake.closed_pulls.contains(&number) {
					PullState::Closed
				} else {
					PullState::Open
				},
				head: spec.head.clone(),
			})
			.collect())
	}

	async fn add_labels(&self, repo: &str, _number: u64, labels: &[String]) -> Result<(), GithubError> {
		let mut state = self.state();
		state.fail("add_labels", repo)?;
		state.repo_mut(repo)?.labels.extend(labels.iter().cloned());
		Ok(())
	}

	async fn set_secret(&self, repo: &str, name: &str, value: &SecretString) -> Result<(), GithubError> {
		let mut state = self.state();
		state.fail("set_secret", name)?;
		state
			.repo_mut(repo)?
			.secrets
			.insert(name.to_string(), value.expose().clone());
		state.mutations.push(format!("set_secret:{repo}:{name}"));
		Ok(())
	}

	async fn set_variable(&self, repo: &str, name: &str, value: &str) -> Result<(), GithubError> {
		let mut state = self.state();
		state.fail("set_variable", name)?;
		state
			.repo_mut(repo)?
			.variables
			.insert(name.to_string(), value.to_string());
		state.mutations.push(format!("set_variable:{repo}:{name}"));
		Ok(())
	}

	async fn list_secrets(&self, repo: &str) -> Result<Vec<String>, GithubError> {
		let state = self.state();
		state.fail("list_secrets", repo)?;
		Ok(state.repo(repo)?.secrets.keys().cloned().collect())
	}

	async fn list_variables(&self, repo: &str) -> Result<Vec<String>, GithubError> {
		let state = self.state();
		state.fail("list_variables", repo)?;
		Ok(state.repo(repo)?.variables.keys().cloned().collect())
	}

	async fn delete_secret(&self, repo: &str, name: &str) -> Result<(), GithubError> {
		let mut state = self.state();
		state.fail("delete_secret", name)?;
		state.repo_mut(repo)?.secrets.remove(name);
		state.mutations.push(format!("delete_secret:{repo}:{name}"));
		Ok(())
	}

	async fn delete_variable(&self, repo: &str, name: &str) -> Result<(), GithubError> {
		let mut state = self.state();
		state.fail("delete_variable", name)?;
		state.repo_mut(repo)?.variables.remove(name);
		state.mutations.push(format!("delete_variable:{repo}:{name}"));
		Ok(())
	}

	async fn delete_repo(&self, repo: &str) -> Result<(), GithubError> {
		let mut state = self.state();
		state.fail("delete_repo", repo)?;
		state
			.repos
			.remove(repo)
			.ok_or_else(|| GithubError::NotFound(format!("repos/{ORG}/{repo}")))?;
		state.mutations.push(format!("delete_repo:{repo}"));
		Ok(())
	}

	async fn set_topics(&self, repo: &str, topics: &[String]) -> Result<(), GithubError> {
		let mut state = self.state();
		state.fail("set_topics", repo)?;
		state.repo_mut(repo)?.topics = topics.to_vec();
		state.mutations.push(format!("set_topics:{repo}"));
		Ok(())
	}

	async fn grant_team(
		&self,
		repo: &str,
		team: &str,
		permission: TeamPermission,
	) -> Result<(), GithubError> {
		let mut state = self.state();
		state.fail("grant_team", repo)?;
		if !state.teams.contains(team) {
			return Err(GithubError::NotFound(format!("orgs/{ORG}/teams/{team}")));
		}
		state
			.repo_mut(repo)?
			.teams
			.push((team.to_string(), permission));
		state.mutations.push(format!("grant_team:{repo}:{team}"));
		Ok(())
	}

	async fn dispatch_workflow(&self, repo: &str, workflow: &str, git_ref: &str) -> Result<(), GithubError> {
		let mut state = self.state();
		state.fail("dispatch_workflow", repo)?;
		state
			.repo_mut(repo)?
			.dispatches
			.push((workflow.to_string(), git_ref.to_string()));
		state.mutations.push(format!("dispatch_workflow:{repo}"));
		Ok(())
	}
}

/// Bundle store backed by a map of scope to bundle.
pub struct FakeStore {
	kind: &'static str,
	scopes: BTreeMap<String, Vec<(String, String)>>,
	failing: AtomicBool,
	calls: AtomicUsize,
}

impl FakeStore {
	pub fn new(kind: &'static str) -> Self {
		Self {
			kind,
			scopes: BTreeMap::new(),
			failing: AtomicBool::new(false),
			calls: AtomicUsize::new(0),
		}
	}

	pub fn with(mut self, scope: &str, name: &str, value: &str) -> Self {
		self.scopes
			.entry(scope.to_string())
			.or_default()
			.push((name.to_string(), value.to_string()));
		self
	}

	pub fn set_failing(&self, failing: bool) {
		self.failing.store(failing, Ordering::SeqCst);
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl BundleStore for FakeStore {
	fn kind(&self) -> &'static str {
		self.kind
	}

	async fn get_bundle(&self, scope: &str) -> Result<Bundle, StoreError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		if self.failing.load(Ordering::SeqCst) {
			return Err(StoreError::Throttled(format!("{}/{scope}: timed out", self.kind)));
		}
		Ok(self
			.scopes
			.get(scope)
			.map(|pairs| {
				pairs
					.iter()
					.map(|(name, value)| (name.clone(), SecretString::new(value.clone())))
					.collect()
			})
			.unwrap_or_default())
	}
}

/// Template repository used by every lifecycle test.
pub fn template_files() -> Vec<(&'static str, &'static str)> {
	vec![
		("README.md", "Platform templates\n"),
		(
			"templates/microservice/main.tf.j2",
			"module \"{{ project_name }}\" {\n  region = \"{{ region | default('us-east-1') }}\"\n}\n",
		),
		("templates/microservice/src/app.py", "print('hello')\n"),
		("templates/microservice/docs/README.md.j2", "# {{ repo_name }}\n"),
		("templates/other/notes.txt", "other template\n"),
		("templates/strict/app.yaml.j2", "replicas: {{ replicas }}\n"),
	]
}

pub struct Harness {
	pub host: Arc<FakeHost>,
	pub secrets: Arc<FakeStore>,
	pub variables: Arc<FakeStore>,
	pub config: EngineConfig,
}

impl Harness {
	pub fn new() -> Self {
		let host = Arc::new(FakeHost::new());
		host.seed_repo(TEMPLATE_REPO, &template_files());

		let secrets = FakeStore::new("secrets")
			.with("global", "shared_token", "global-secret")
			.with("global", "db_password", "global-db")
			.with("service", "db_password", "service-db");
		let variables = FakeStore::new("variables")
			.with("global", "AWS_REGION", "us-east-1")
			.with("service", "CLUSTER", "blue");

		Self {
			host,
			secrets: Arc::new(secrets),
			variables: Arc::new(variables),
			config: EngineConfig::new(TEMPLATE_REPO),
		}
	}

	pub fn with_stores(mut self, secrets: FakeStore, variables: FakeStore) -> Self {
		self.secrets = Arc::new(secrets);
		self.variables = Arc::new(variables);
		self
	}

	/// A fresh context, as each invocation would get.
	pub fn context(&self) -> InvocationContext {
		InvocationContext::new(
			self.host.clone(),
			self.secrets.clone(),
			self.variables.clone(),
			Arc::new(self.config.clone()),
		)
	}
}
