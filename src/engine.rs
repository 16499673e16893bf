use crate::error::IncluderError;
use crate::eval::{Evaluator, Scope};
use crate::options::{IncluderOptions, Order};
use crate::output::{Markers, concat, render_block};
use crate::types::{Fragment, Vars};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::fs::{self, File};
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
#[cfg(feature = "logging")]
use tracing;

/// Collects files by name from an ordered list of directories, then loads
/// or concatenates them.
#[derive(Debug, Default)]
pub struct Includer {
    dirs: Vec<String>,
    files: Vec<String>,
    vars: Vars,
    cache_file: Option<PathBuf>,
    order: Order,
    markers: Markers,
}

impl Includer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_options(options: IncluderOptions) -> Self {
        let mut includer = Self {
            cache_file: options.cache_file,
            order: options.order,
            markers: options.markers,
            ..Self::default()
        };
        includer.add_dirs(options.dirs);
        includer.add_files(options.files);
        includer
    }

    /// Returns the current configuration, without the variables.
    pub fn options(&self) -> IncluderOptions {
        IncluderOptions {
            dirs: self.dirs.clone(),
            files: self.files.clone(),
            cache_file: self.cache_file.clone(),
            order: self.order,
            markers: self.markers.clone(),
        }
    }

    /// Replaces all directories.
    pub fn set_dirs<I, S>(&mut self, dirs: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.dirs.clear();
        self.add_dirs(dirs);
    }

    pub fn add_dirs<I, S>(&mut self, dirs: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for dir in dirs {
            self.add_dir(dir);
        }
    }

    /// Adds one directory, normalized to end in exactly one separator.
    pub fn add_dir(&mut self, dir: impl AsRef<str>) {
        let dir = normalize_separators(dir.as_ref());
        let mut dir = dir.trim_end_matches(MAIN_SEPARATOR).to_string();
        dir.push(MAIN_SEPARATOR);
        self.dirs.push(dir);
    }

    pub fn dirs(&self) -> &[String] {
        &self.dirs
    }

    /// Replaces all file names.
    pub fn set_files<I, S>(&mut self, files: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.files.clear();
        self.add_files(files);
    }

    pub fn add_files<I, S>(&mut self, files: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for file in files {
            self.add_file(file);
        }
    }

    pub fn add_file(&mut self, file: impl AsRef<str>) {
        self.files.push(normalize_separators(file.as_ref()));
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn set_vars(&mut self, vars: Vars) {
        self.vars = vars;
    }

    pub fn vars(&self) -> &Vars {
        &self.vars
    }

    pub fn vars_mut(&mut self) -> &mut Vars {
        &mut self.vars
    }

    pub fn into_vars(self) -> Vars {
        self.vars
    }

    pub fn set_cache_file(&mut self, path: impl Into<PathBuf>) {
        self.cache_file = Some(path.into());
    }

    pub fn clear_cache_file(&mut self) {
        self.cache_file = None;
    }

    pub fn cache_file(&self) -> Option<&Path> {
        self.cache_file.as_deref()
    }

    /// Configured order, used by the CLI when no order is given.
    pub fn order(&self) -> Order {
        self.order
    }

    pub fn set_order(&mut self, order: Order) {
        self.order = order;
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    pub fn set_markers(&mut self, markers: Markers) {
        self.markers = markers;
    }

    /// Returns the readable paths combined from the directories and files.
    ///
    /// A pair is skipped when its file does not exist, cannot be read, or
    /// resolves outside its directory. Duplicates are kept.
    pub fn paths(&self, order: Order) -> Vec<PathBuf> {
        let dirs: Vec<(&str, PathBuf)> = self
            .dirs
            .iter()
            .map(|dir| (dir.as_str(), real_dir(dir)))
            .collect();
        let mut paths = Vec::new();
        match order {
            Order::DirOrder => {
                for (dir, real_dir) in &dirs {
                    for file in &self.files {
                        push_real_path(&mut paths, dir, real_dir, file);
                    }
                }
            }
            Order::FileOrder => {
                for file in &self.files {
                    for (dir, real_dir) in &dirs {
                        push_real_path(&mut paths, dir, real_dir, file);
                    }
                }
            }
        }
        paths
    }

    /// Like [`paths`](Self::paths), taking the order by name.
    pub fn paths_by_name(&self, order: &str) -> Result<Vec<PathBuf>, IncluderError> {
        Ok(self.paths(order.parse()?))
    }

    /// Evaluates the resolved paths in order, all against the same variables.
    ///
    /// When a cache file is set, only the cache file is evaluated and the
    /// directories and files are not consulted.
    pub fn load<E>(&mut self, order: Order, evaluator: &mut E) -> Result<(), IncluderError>
    where
        E: Evaluator + ?Sized,
    {
        if let Some(cache_file) = &self.cache_file {
            #[cfg(feature = "logging")]
            tracing::debug!("Loading cache file {}", cache_file.display());
            return evaluate(evaluator, cache_file, &mut self.vars);
        }
        let paths = self.paths(order);
        #[cfg(feature = "logging")]
        tracing::debug!("Loading {} paths in {}", paths.len(), order);
        for path in &paths {
            evaluate(evaluator, path, &mut self.vars)?;
        }
        Ok(())
    }

    pub fn load_by_name<E>(&mut self, order: &str, evaluator: &mut E) -> Result<(), IncluderError>
    where
        E: Evaluator + ?Sized,
    {
        let order = order.parse()?;
        self.load(order, evaluator)
    }

    /// Reads and renders every resolved path.
    ///
    /// The cache file is never consulted here.
    pub fn read_fragments(&self, order: Order) -> Result<Vec<Fragment>, IncluderError> {
        let paths = self.paths(order);
        #[cfg(feature = "logging")]
        tracing::debug!("Reading {} paths in {}", paths.len(), order);
        #[cfg(not(feature = "parallel"))]
        let fragments: Result<Vec<Fragment>, IncluderError> = paths
            .into_iter()
            .map(|path| read_fragment(path, &self.markers))
            .collect();
        #[cfg(feature = "parallel")]
        let fragments: Result<Vec<Fragment>, IncluderError> = paths
            .into_par_iter()
            .map(|path| read_fragment(path, &self.markers))
            .collect();
        fragments
    }

    /// Concatenates the rendered contents of every resolved path.
    pub fn read(&self, order: Order) -> Result<String, IncluderError> {
        let fragments = self.read_fragments(order)?;
        Ok(concat(&fragments))
    }

    pub fn read_by_name(&self, order: &str) -> Result<String, IncluderError> {
        self.read(order.parse()?)
    }

    /// Renders resolved paths lazily, one fragment per item.
    #[cfg(feature = "streaming")]
    pub fn stream(&self, order: Order) -> ReadStream {
        ReadStream::new(self, order)
    }

    /// Writes the concatenation to `path`, typically for use as a cache file.
    pub fn write_to_file(&self, order: Order, path: impl AsRef<Path>) -> Result<(), IncluderError> {
        let path = path.as_ref();
        let text = self.read(order)?;
        fs::write(path, text).map_err(|e| IncluderError::io(path, e))
    }
}

fn normalize_separators(path: &str) -> String {
    path.replace('/', &MAIN_SEPARATOR.to_string())
}

/// Canonical form of a configured directory, or the directory as given when
/// it does not exist.
fn real_dir(dir: &str) -> PathBuf {
    fs::canonicalize(dir).unwrap_or_else(|_| PathBuf::from(dir))
}

fn push_real_path(paths: &mut Vec<PathBuf>, dir: &str, real_dir: &Path, file: &str) {
    let candidate = format!("{}{}", dir, file);
    let Ok(real) = fs::canonicalize(&candidate) else {
        #[cfg(feature = "logging")]
        tracing::debug!("Skipping missing path {}", candidate);
        return;
    };
    if !is_readable_file(&real) {
        #[cfg(feature = "logging")]
        tracing::debug!("Skipping unreadable path {}", real.display());
        return;
    }
    // a symlink pointing out of the directory fails here as well
    if !real.starts_with(real_dir) {
        #[cfg(feature = "logging")]
        tracing::debug!(
            "Skipping {}: outside of {}",
            real.display(),
            real_dir.display()
        );
        return;
    }
    paths.push(real);
}

fn is_readable_file(path: &Path) -> bool {
    path.is_file() && File::open(path).is_ok()
}

fn evaluate<E>(evaluator: &mut E, path: &Path, vars: &mut Vars) -> Result<(), IncluderError>
where
    E: Evaluator + ?Sized,
{
    #[cfg(feature = "logging")]
    tracing::debug!("Evaluating {}", path.display());
    let mut scope = Scope::new(path, vars);
    evaluator
        .evaluate(&mut scope)
        .map_err(|e| IncluderError::eval(path, e))
}

fn read_fragment(path: PathBuf, markers: &Markers) -> Result<Fragment, IncluderError> {
    let text = fs::read_to_string(&path).map_err(|e| IncluderError::io(&path, e))?;
    let content = render_block(&path, &text, markers);
    Ok(Fragment { path, content })
}

#[cfg(feature = "streaming")]
pub struct ReadStream {
    paths: std::vec::IntoIter<PathBuf>,
    markers: Markers,
}

#[cfg(feature = "streaming")]
impl ReadStream {
    /// Resolves the paths up front and renders each one on demand.
    pub fn new(includer: &Includer, order: Order) -> Self {
        Self {
            paths: includer.paths(order).into_iter(),
            markers: includer.markers.clone(),
        }
    }
}

#[cfg(feature = "streaming")]
impl Iterator for ReadStream {
    type Item = Result<Fragment, IncluderError>;
    fn next(&mut self) -> Option<Self::Item> {
        let path = self.paths.next()?;
        Some(read_fragment(path, &self.markers))
    }
}
