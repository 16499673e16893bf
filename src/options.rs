use crate::engine::Includer;
use crate::error::IncluderError;
use crate::output::Markers;
use crate::types::Vars;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Traversal order for combining directories and files into paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    /// All files in the first directory, then all files in the second, and so on.
    #[default]
    DirOrder,
    /// The first file in every directory, then the second file, and so on.
    FileOrder,
}

impl Order {
    pub fn as_str(&self) -> &'static str {
        match self {
            Order::DirOrder => "dir_order",
            Order::FileOrder => "file_order",
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Order {
    type Err = IncluderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dir_order" => Ok(Order::DirOrder),
            "file_order" => Ok(Order::FileOrder),
            _ => Err(IncluderError::InvalidOrder(s.to_string())),
        }
    }
}

/// Serializable configuration for an [`Includer`].
///
/// Directories and files are normalized when the options are turned into an
/// includer, not when they are deserialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IncluderOptions {
    pub dirs: Vec<String>,
    pub files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_file: Option<PathBuf>,
    pub order: Order,
    pub markers: Markers,
}

impl IncluderOptions {
    /// Loads options from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, IncluderError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| IncluderError::io(path, e))?;
        serde_json::from_str(&text)
            .map_err(|e| IncluderError::Config(format!("{}: {}", path.display(), e)))
    }
}

#[derive(Debug, Default)]
pub struct IncluderBuilder {
    options: IncluderOptions,
    vars: Vars,
}
impl IncluderBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn from_options(options: IncluderOptions) -> Self {
        Self {
            options,
            vars: Vars::new(),
        }
    }
    pub fn dir(mut self, dir: impl Into<String>) -> Self {
        self.options.dirs.push(dir.into());
        self
    }
    pub fn dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.dirs.extend(dirs.into_iter().map(Into::into));
        self
    }
    pub fn file(mut self, file: impl Into<String>) -> Self {
        self.options.files.push(file.into());
        self
    }
    pub fn files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.files.extend(files.into_iter().map(Into::into));
        self
    }
    pub fn cache_file(mut self, path: Option<PathBuf>) -> Self {
        self.options.cache_file = path;
        self
    }
    pub fn order(mut self, order: Order) -> Self {
        self.options.order = order;
        self
    }
    pub fn markers(mut self, markers: Markers) -> Self {
        self.options.markers = markers;
        self
    }
    pub fn var(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.vars.insert(name.into(), value);
        self
    }
    pub fn vars(mut self, vars: Vars) -> Self {
        self.vars = vars;
        self
    }
    pub fn build(self) -> Includer {
        let mut includer = Includer::from_options(self.options);
        includer.set_vars(self.vars);
        includer
    }
}
