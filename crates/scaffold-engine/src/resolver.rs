// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Template resolution: which files of the template repository make up a
//! template, and where each lands in the new repository.

use scaffold_github::{EntryKind, FileMode, RepoHost, TreeEntry};
use tracing::{debug, instrument, warn};

use crate::error::{EngineError, Result};

/// Files ending in this suffix are rendered; everything else is copied verbatim.
pub const TEMPLATE_SUFFIX: &str = ".j2";

/// Where templates are read from.
#[derive(Debug, Clone)]
pub struct TemplateSource {
	pub repo: String,
	pub git_ref: String,
	pub source_path: Option<String>,
}

/// One file of a resolved template. Content is fetched on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
	/// Path in the template repository.
	pub source_path: String,
	/// Path relative to the template root, before template suffix removal.
	pub relative_path: String,
	pub sha: String,
	pub mode: FileMode,
	pub is_template: bool,
}

impl TemplateFile {
	/// Path in the new repository.
	pub fn destination(&self) -> &str {
		if self.is_template {
			self
				.relative_path
				.strip_suffix(TEMPLATE_SUFFIX)
				.unwrap_or(&self.relative_path)
		} else {
			&self.relative_path
		}
	}

	pub async fn load(&self, host: &dyn RepoHost, template_repo: &str) -> Result<Vec<u8>> {
		Ok(host.get_blob(template_repo, &self.sha).await?)
	}
}

/// The files of one template. Iterating is cheap and can be repeated;
/// content is only fetched by [`TemplateFile::load`].
#[derive(Debug, Clone)]
pub struct ResolvedTemplate {
	pub source: TemplateSource,
	files: Vec<TemplateFile>,
}

impl ResolvedTemplate {
	pub fn files(&self) -> impl Iterator<Item = &TemplateFile> + '_ {
		self.files.iter()
	}

	pub fn len(&self) -> usize {
		self.files.len()
	}

	pub fn is_empty(&self) -> bool {
		self.files.is_empty()
	}
}

/// List the template tree at the configured ref and scope it to `source_path`.
///
/// Fails with `NotFound` if the repository, ref or `source_path` directory
/// does not exist, or if the scoped tree holds no files.
#[instrument(skip(host), fields(repo = %source.repo, git_ref = %source.git_ref))]
pub async fn resolve(host: &dyn RepoHost, source: &TemplateSource) -> Result<ResolvedTemplate> {
	let entries = host
		.list_tree(&source.repo, &source.git_ref)
		.await
		.map_err(|e| match EngineError::from(e) {
			EngineError::NotFound(_) => EngineError::NotFound(format!(
				"template repository {}@{}",
				source.repo, source.git_ref
			)),
			other => other,
		})?;

	let files = scope_entries(&entries, source.source_path.as_deref())?;
	debug!(files = files.len(), "Resolved template");

	Ok(ResolvedTemplate {
		source: source.clone(),
		files,
	})
}

/// Select the blobs under `source_path` and strip that prefix.
pub fn scope_entries(entries: &[TreeEntry], source_path: Option<&str>) -> Result<Vec<TemplateFile>> {
	let prefix = match source_path {
		Some(path) => {
			let exists = entries
				.iter()
				.any(|entry| entry.kind == EntryKind::Tree && entry.path == path);
			if !exists {
				return Err(EngineError::NotFound(format!("template path '{path}'")));
			}
			Some(format!("{path}/"))
		}
		None => None,
	};

	let mut files = Vec::new();
	for entry in entries {
		let relative = match &prefix {
			Some(prefix) => match entry.path.strip_prefix(prefix.as_str()) {
				Some(rest) => rest,
				None => continue,
			},
			None => entry.path.as_str(),
		};

		match entry.kind {
			EntryKind::Blob => files.push(TemplateFile {
				source_path: entry.path.clone(),
				relative_path: relative.to_string(),
				sha: entry.sha.clone(),
				mode: FileMode::from_git_mode(&entry.mode),
				is_template: relative.ends_with(TEMPLATE_SUFFIX),
			}),
			EntryKind::Commit => warn!(path = %entry.path, "Skipping submodule in template"),
			EntryKind::Tree => {}
		}
	}

	if files.is_empty() {
		return Err(EngineError::NotFound(format!(
			"template files under '{}'",
			source_path.unwrap_or("/")
		)));
	}

	Ok(files)
}
