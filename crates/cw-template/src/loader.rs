//! Template file loading and include resolution.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{TemplateError, TemplateResult};
use crate::template::Template;

/// Key marking an object as a reference to another template file.
pub const INCLUDE_KEY: &str = "@include@";

/// Environment variable holding extra include directories.
pub const SEARCH_PATH_ENV: &str = "CHIPWEAVE_PATH";

/// On-disk template encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Format> {
        match path.extension()?.to_str()? {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            _ => None,
        }
    }
}

/// Loads template files and resolves `@include@` references.
///
/// Includes are looked up relative to the including file first, then in each
/// search directory in order.
#[derive(Debug, Clone, Default)]
pub struct TemplateLoader {
    search_path: Vec<PathBuf>,
}

impl TemplateLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader whose search path comes from `CHIPWEAVE_PATH`.
    pub fn from_env() -> Self {
        let search_path = std::env::var_os(SEARCH_PATH_ENV)
            .map(|paths| std::env::split_paths(&paths).collect())
            .unwrap_or_default();
        Self { search_path }
    }

    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_path.push(dir.into());
        self
    }

    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    /// Load a template file, resolving includes.
    pub fn load(&self, path: &Path) -> TemplateResult<Template> {
        let mut stack = Vec::new();
        let value = self.load_value(path, &mut stack)?;
        Ok(Template::new(value))
    }

    /// Parse template text. Includes resolve against the search path only.
    pub fn load_str(&self, text: &str, format: Format) -> TemplateResult<Template> {
        let origin = PathBuf::from("<inline>");
        let value = parse(text, format, &origin)?;
        let mut stack = Vec::new();
        let value = self.resolve(value, None, &mut stack)?;
        Ok(Template::new(value))
    }

    /// Locate `name` relative to `base` or along the search path.
    pub fn find(&self, name: &str, base: Option<&Path>) -> Option<PathBuf> {
        self.candidates(name, base).into_iter().find(|p| p.is_file())
    }

    fn candidates(&self, name: &str, base: Option<&Path>) -> Vec<PathBuf> {
        let requested = Path::new(name);
        if requested.is_absolute() {
            return vec![requested.to_path_buf()];
        }
        let mut out = Vec::new();
        if let Some(base) = base {
            out.push(base.join(requested));
        }
        out.extend(self.search_path.iter().map(|dir| dir.join(requested)));
        if base.is_none() && self.search_path.is_empty() {
            out.push(requested.to_path_buf());
        }
        out
    }

    /// Load a referenced description file. With `tolerant`, a file that
    /// cannot be found yields `Ok(None)` instead of an error.
    pub fn import(&self, name: &str, tolerant: bool) -> TemplateResult<Option<Template>> {
        match self.find(name, None) {
            Some(path) => self.load(&path).map(Some),
            None if tolerant => {
                warn!(name, "include not found, skipping");
                Ok(None)
            }
            None => Err(TemplateError::IncludeNotFound {
                name: name.to_string(),
                searched: self.candidates(name, None),
            }),
        }
    }

    fn load_value(&self, path: &Path, stack: &mut Vec<PathBuf>) -> TemplateResult<Value> {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if stack.contains(&canonical) {
            return Err(TemplateError::IncludeCycle { path: canonical });
        }

        debug!(path = %path.display(), "load template");
        let format = Format::from_path(path).ok_or_else(|| TemplateError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;
        let text = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let value = parse(&text, format, path)?;

        stack.push(canonical);
        let resolved = self.resolve(value, path.parent(), stack);
        stack.pop();
        resolved
    }

    fn resolve(
        &self,
        value: Value,
        base: Option<&Path>,
        stack: &mut Vec<PathBuf>,
    ) -> TemplateResult<Value> {
        match value {
            Value::Object(mut map) => {
                let merged = match map.remove(INCLUDE_KEY) {
                    Some(Value::String(name)) => {
                        let path = self.find(&name, base).ok_or_else(|| {
                            TemplateError::IncludeNotFound {
                                searched: self.candidates(&name, base),
                                name,
                            }
                        })?;
                        let included = self.load_value(&path, stack)?;
                        overlay(included, map)
                    }
                    Some(other) => {
                        return Err(TemplateError::TypeMismatch {
                            path: INCLUDE_KEY.to_string(),
                            expected: "string",
                            found: match other {
                                Value::Array(_) => "list",
                                Value::Object(_) => "map",
                                _ => "scalar",
                            },
                        });
                    }
                    None => Value::Object(map),
                };

                match merged {
                    Value::Object(map) => {
                        let mut out = Map::new();
                        for (key, child) in map {
                            out.insert(key, self.resolve(child, base, stack)?);
                        }
                        Ok(Value::Object(out))
                    }
                    other => Ok(other),
                }
            }
            Value::Array(items) => items
                .into_iter()
                .map(|item| self.resolve(item, base, stack))
                .collect::<TemplateResult<Vec<_>>>()
                .map(Value::Array),
            other => Ok(other),
        }
    }
}

/// Layer `local` keys over an included value. A non-map include is kept
/// as-is only when there is nothing to layer on top of it.
fn overlay(included: Value, local: Map<String, Value>) -> Value {
    match included {
        Value::Object(mut base) => {
            for (key, value) in local {
                base.insert(key, value);
            }
            Value::Object(base)
        }
        other if local.is_empty() => other,
        _ => Value::Object(local),
    }
}

fn parse(text: &str, format: Format, origin: &Path) -> TemplateResult<Value> {
    match format {
        Format::Json => serde_json::from_str(text).map_err(|source| TemplateError::Json {
            path: origin.to_path_buf(),
            source,
        }),
        Format::Yaml => serde_yaml::from_str(text).map_err(|source| TemplateError::Yaml {
            path: origin.to_path_buf(),
            source,
        }),
    }
}
