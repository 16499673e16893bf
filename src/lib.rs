//! # Includer
//!
//! `includer` looks for a list of file names in an ordered list of directories and
//! either loads every file found (through an [`Evaluator`] sharing one set of
//! [`Vars`]) or concatenates them into a single text blob.
//!
//! This suits "cascading" configuration: a base directory plus per-environment
//! override directories, merged in a fixed order. The concatenated output can be
//! written once and set as a cache file, after which [`Includer::load`] evaluates
//! only that file.
//!
//! # Features
//!
//! - `parallel`: Reads file contents in parallel using Rayon. Output order is unchanged.
//! - `streaming`: Enables [`ReadStream`] for rendering files one by one.
//! - `logging`: Enables debug logging via the `tracing` crate.
//!
//! # Example
//!
//! ```no_run
//! use includer::{IncluderBuilder, MergeEvaluator, Order};
//!
//! let mut includer = IncluderBuilder::new()
//!     .dirs(["config/base", "config/production"])
//!     .files(["app.json", "db.json"])
//!     .build();
//!
//! let mut evaluator = MergeEvaluator::new("config");
//! includer.load(Order::DirOrder, &mut evaluator).expect("Failed to load config");
//! println!("{}", includer.vars()["config"]);
//!
//! let text = includer.read(Order::FileOrder).expect("Failed to read files");
//! println!("{}", text);
//! ```

mod engine;
mod error;
mod eval;
mod options;
pub mod output;
mod types;

#[cfg(feature = "streaming")]
pub use engine::ReadStream;
pub use engine::Includer;
pub use error::{BoxError, IncluderError};
pub use eval::{Evaluator, MergeEvaluator, Scope};
pub use options::{IncluderBuilder, IncluderOptions, Order};
pub use output::Markers;
pub use types::{Fragment, RESERVED_FILE_VAR, Vars, parse_var};
