// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Rendering template files into the tree that gets committed.

use std::collections::BTreeMap;

use minijinja::{AutoEscape, Environment, UndefinedBehavior, Value};
use scaffold_github::{RepoHost, TreeFile};
use tracing::{debug, instrument};

use crate::error::{EngineError, Result};
use crate::request::{TemplateSettings, VariableValue};
use crate::resolver::ResolvedTemplate;

/// Values visible to templates.
///
/// Request variables are top-level names. `project_name`, `repo_name`,
/// `template_type`, `environment` (when given), `tags` and `variables` are
/// always present and shadow request variables of the same name.
#[derive(Debug, Clone)]
pub struct RenderContext {
	value: Value,
}

impl RenderContext {
	pub fn new(project_name: &str, settings: &TemplateSettings) -> Self {
		let mut values: BTreeMap<String, Value> = settings
			.variables
			.iter()
			.map(|(name, value)| (name.clone(), variable_value(value)))
			.collect();

		values.insert("project_name".into(), Value::from(project_name));
		values.insert("repo_name".into(), Value::from(project_name));
		values.insert(
			"template_type".into(),
			Value::from(settings.template_type.as_str()),
		);
		if let Some(environment) = &settings.environment {
			values.insert("environment".into(), Value::from(environment.as_str()));
		}
		values.insert("tags".into(), Value::from_serialize(&settings.tags));
		values.insert(
			"variables".into(),
			Value::from_serialize(&settings.variables),
		);

		Self {
			value: Value::from_serialize(&values),
		}
	}
}

fn variable_value(value: &VariableValue) -> Value {
	match value {
		VariableValue::Bool(b) => Value::from(*b),
		VariableValue::Integer(i) => Value::from(*i),
		VariableValue::Float(f) => Value::from(*f),
		VariableValue::Text(s) => Value::from(s.as_str()),
	}
}

/// Jinja renderer. Undefined names are errors unless guarded with `default`.
pub struct Renderer {
	env: Environment<'static>,
}

impl Default for Renderer {
	fn default() -> Self {
		Self::new()
	}
}

impl Renderer {
	pub fn new() -> Self {
		let mut env = Environment::new();
		env.set_undefined_behavior(UndefinedBehavior::Strict);
		// Output is code and config, never HTML.
		env.set_auto_escape_callback(|_| AutoEscape::None);
		env.set_keep_trailing_newline(true);
		Self { env }
	}

	/// Render `source`; `name` identifies it in errors.
	pub fn render_str(&self, name: &str, source: &str, context: &RenderContext) -> Result<String> {
		self
			.env
			.render_str(source, &context.value)
			.map_err(|e| EngineError::render(name, e.to_string()))
	}
}

/// Ordered files to commit. Inserting an existing path replaces it in place.
#[derive(Debug, Clone, Default)]
pub struct RenderedTree {
	files: Vec<TreeFile>,
}

impl RenderedTree {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, file: TreeFile) -> Result<()> {
		check_destination(&file.path)?;
		match self.files.iter_mut().find(|existing| existing.path == file.path) {
			Some(existing) => *existing = file,
			None => self.files.push(file),
		}
		Ok(())
	}

	pub fn get(&self, path: &str) -> Option<&TreeFile> {
		self.files.iter().find(|file| file.path == path)
	}

	pub fn paths(&self) -> impl Iterator<Item = &str> + '_ {
		self.files.iter().map(|file| file.path.as_str())
	}

	pub fn len(&self) -> usize {
		self.files.len()
	}

	pub fn is_empty(&self) -> bool {
		self.files.is_empty()
	}

	pub fn into_files(self) -> Vec<TreeFile> {
		self.files
	}
}

/// Destinations are relative, non-empty and free of `.`/`..` segments.
fn check_destination(path: &str) -> Result<()> {
	let invalid = path.is_empty()
		|| path.starts_with('/')
		|| path.contains('\\')
		|| path
			.split('/')
			.any(|segment| segment.is_empty() || segment == "." || segment == "..");

	if invalid {
		return Err(EngineError::render(path, "invalid destination path"));
	}
	Ok(())
}

/// Load every template file, render the `.j2` ones and collect the tree.
///
/// `foo` and `foo.j2` in the same template collide and fail the render.
/// Reads only. Any failure aborts before anything is written.
#[instrument(skip_all, fields(repo = %template.source.repo, files = template.len()))]
pub async fn render_template(
	host: &dyn RepoHost,
	template: &ResolvedTemplate,
	renderer: &Renderer,
	context: &RenderContext,
) -> Result<RenderedTree> {
	let mut tree = RenderedTree::new();

	for file in template.files() {
		let raw = file.load(host, &template.source.repo).await?;

		let content = if file.is_template {
			let source = String::from_utf8(raw)
				.map_err(|_| EngineError::render(&file.source_path, "template is not valid UTF-8"))?;
			renderer
				.render_str(&file.source_path, &source, context)?
				.into_bytes()
		} else {
			raw
		};

		let destination = file.destination();
		if tree.get(destination).is_some() {
			return Err(EngineError::render(
				&file.source_path,
				format!("another template file already renders to {destination}"),
			));
		}
		tree.insert(TreeFile::new(destination, content).with_mode(file.mode))?;
	}

	debug!(files = tree.len(), "Rendered template");
	Ok(tree)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn settings(variables: &[(&str, VariableValue)]) -> TemplateSettings {
		TemplateSettings {
			template_type: "service".into(),
			environment: Some("dev".into()),
			source_path: None,
			variables: variables
				.iter()
				.map(|(k, v)| (k.to_string(), v.clone()))
				.collect(),
			tags: [("owner".to_string(), "platform".to_string())].into(),
		}
	}

	fn render(source: &str, variables: &[(&str, VariableValue)]) -> Result<String> {
		let context = RenderContext::new("svc-a", &settings(variables));
		Renderer::new().render_str("test.j2", source, &context)
	}

	#[test]
	fn substitutes_variables_and_builtins() {
		let out = render(
			"{{ project_name }} in {{ region }} ({{ environment }}, {{ template_type }})",
			&[("region", VariableValue::Text("us-west-2".into()))],
		)
		.unwrap();
		assert_eq!(out, "svc-a in us-west-2 (dev, service)");
	}

	#[test]
	fn scalar_types_render_naturally() {
		let out = render(
			"{{ replicas + 1 }} {{ public }} {{ ratio }}",
			&[
				("replicas", VariableValue::Integer(2)),
				("public", VariableValue::Bool(true)),
				("ratio", VariableValue::Float(0.5)),
			],
		)
		.unwrap();
		assert_eq!(out, "3 true 0.5");
	}

	#[test]
	fn tags_are_iterable() {
		let out = render("{% for k, v in tags|items %}{{ k }}={{ v }}{% endfor %}", &[]).unwrap();
		assert_eq!(out, "owner=platform");
	}

	#[test]
	fn missing_placeholder_without_default_fails() {
		let err = render("region = {{ region }}", &[]).unwrap_err();
		match err {
			EngineError::Render { path, .. } => assert_eq!(path, "test.j2"),
			other => panic!("expected render error, got {other:?}"),
		}
	}

	#[test]
	fn empty_variables_render_when_defaults_cover_placeholders() {
		let out = render("region = {{ region | default('us-east-1') }}", &[]).unwrap();
		assert_eq!(out, "region = us-east-1");
	}

	#[test]
	fn builtins_shadow_request_variables() {
		let out = render(
			"{{ project_name }}",
			&[("project_name", VariableValue::Text("spoofed".into()))],
		)
		.unwrap();
		assert_eq!(out, "svc-a");
	}

	#[test]
	fn trailing_newline_and_html_are_preserved() {
		let out = render("<a>{{ value }}</a>\n", &[("value", VariableValue::Text("&".into()))]).unwrap();
		assert_eq!(out, "<a>&</a>\n");
	}

	#[test]
	fn tree_replaces_duplicate_paths_in_place() {
		let mut tree = RenderedTree::new();
		tree.insert(TreeFile::new("a.txt", "1")).unwrap();
		tree.insert(TreeFile::new("b.txt", "2")).unwrap();
		tree.insert(TreeFile::new("a.txt", "3")).unwrap();

		assert_eq!(tree.paths().collect::<Vec<_>>(), vec!["a.txt", "b.txt"]);
		assert_eq!(tree.get("a.txt").unwrap().content, b"3");
	}

	#[test]
	fn tree_rejects_traversal() {
		let mut tree = RenderedTree::new();
		for path in ["", "/etc/passwd", "a/../b", "./a", "a//b", "a\\b"] {
			assert!(
				tree.insert(TreeFile::new(path, "x")).is_err(),
				"{path:?} should be rejected"
			);
		}
		assert!(tree.is_empty());
	}
}
