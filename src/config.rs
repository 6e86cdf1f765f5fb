//! Loading [`ResolveOptions`] from `lres.json`.
//!
//! A config file is a JSON object with the option fields, plus an optional
//! `extends` naming another config file (relative to this one, `.json`
//! implied). Fields of the extending file override the extended one.

use anyhow::{Context, Result, anyhow, bail};
use lres_common::ResolveOptions;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "lres.json";

pub fn parse_options(source: &str) -> Result<ResolveOptions> {
    let object = parse_object(source)?;
    options_from(object)
}

pub fn load_options(path: &Path) -> Result<ResolveOptions> {
    let mut visited = HashSet::new();
    let merged = load_inner(path, &mut visited)?;
    options_from(merged)
        .with_context(|| format!("invalid resolve options in {}", path.display()))
}

/// Nearest `lres.json` in `start` or any of its ancestors.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

fn parse_object(source: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str(source).context("failed to parse config JSON")? {
        Value::Object(object) => Ok(object),
        other => bail!("config must be a JSON object, found {}", kind_of(&other)),
    }
}

fn options_from(mut object: Map<String, Value>) -> Result<ResolveOptions> {
    object.remove("extends");
    let options = serde_json::from_value(Value::Object(object))?;
    Ok(options)
}

fn load_inner(path: &Path, visited: &mut HashSet<PathBuf>) -> Result<Map<String, Value>> {
    let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical.clone()) {
        bail!("config extends cycle detected at {}", canonical.display());
    }

    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let mut object = parse_object(&source)
        .with_context(|| format!("failed to parse config: {}", path.display()))?;

    if let Some(extends) = object.remove("extends") {
        let Value::String(extends) = extends else {
            bail!("'extends' in {} must be a string", path.display());
        };
        let base_path = resolve_extends_path(path, &extends)?;
        debug!(config = %path.display(), base = %base_path.display(), "config extends");
        let mut base = load_inner(&base_path, visited)?;
        base.extend(object);
        object = base;
    }

    visited.remove(&canonical);
    Ok(object)
}

fn resolve_extends_path(current_path: &Path, extends: &str) -> Result<PathBuf> {
    let base_dir = current_path
        .parent()
        .ok_or_else(|| anyhow!("config has no parent directory"))?;
    let mut candidate = PathBuf::from(extends);
    if candidate.extension().is_none() {
        candidate.set_extension("json");
    }

    if candidate.is_absolute() {
        Ok(candidate)
    } else {
        Ok(base_dir.join(candidate))
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
