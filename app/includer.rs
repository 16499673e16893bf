//! Command-line interface for includer.
//!
//! Resolves file names across directories and prints the resolved paths, the
//! concatenated contents, or the result of merging JSON fragments.

use clap::{Parser, ValueEnum};
use includer::{
    Includer, IncluderBuilder, IncluderError, IncluderOptions, MergeEvaluator, Order, Vars,
    output, parse_var,
};
#[cfg(feature = "streaming")]
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::exit;

/// includer — merge cascading files from ordered directories
#[derive(Parser)]
#[command(name = "includer", version, about, long_about = None)]
struct Cli {
    /// JSON config file with dirs, files, cache_file, order and markers
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to look in (can be repeated, searched in order)
    #[arg(short, long = "dir")]
    dirs: Vec<String>,

    /// File name to look for (can be repeated, searched in order)
    #[arg(short, long = "file")]
    files: Vec<String>,

    /// Traversal order: dir_order or file_order
    #[arg(long, value_parser = parse_order)]
    order: Option<Order>,

    /// Cache file evaluated by `load` instead of the directories
    #[arg(long)]
    cache_file: Option<PathBuf>,

    /// Variable for `load`, as name=<json> (can be repeated, strings need quotes)
    #[arg(long = "var")]
    vars: Vec<String>,

    /// Variable that `load` merges JSON fragments into
    #[arg(long, default_value = "config")]
    target: String,

    /// Output format for `read`
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write the output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty JSON output
    #[arg(short, long)]
    pretty: bool,

    /// Operation mode
    #[arg(long, value_enum, default_value_t = Mode::Read)]
    mode: Mode,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Mode {
    Paths,
    Read,
    Load,
    #[cfg(feature = "streaming")]
    Stream,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl From<OutputFormat> for output::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => output::OutputFormat::Text,
            OutputFormat::Json => output::OutputFormat::Json,
        }
    }
}

/// Parse string into Order enum.
fn parse_order(s: &str) -> Result<Order, String> {
    s.parse().map_err(|e: IncluderError| e.to_string())
}

impl Cli {
    fn into_includer(self) -> Result<(Includer, Settings), IncluderError> {
        let options = match &self.config {
            Some(path) => IncluderOptions::from_json_file(path)?,
            None => IncluderOptions::default(),
        };
        let mut builder = IncluderBuilder::from_options(options)
            .dirs(self.dirs)
            .files(self.files);
        if let Some(order) = self.order {
            builder = builder.order(order);
        }
        if let Some(cache_file) = self.cache_file {
            builder = builder.cache_file(Some(cache_file));
        }
        let vars = self
            .vars
            .iter()
            .map(|binding| parse_var(binding))
            .collect::<Result<Vars, _>>()?;
        let includer = builder.vars(vars).build();
        let settings = Settings {
            mode: self.mode,
            format: self.format,
            output: self.output,
            pretty: self.pretty,
            target: self.target,
        };
        Ok((includer, settings))
    }
}

struct Settings {
    mode: Mode,
    format: OutputFormat,
    output: Option<PathBuf>,
    pretty: bool,
    target: String,
}

fn main() {
    #[cfg(feature = "logging")]
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = cli.into_includer().and_then(|(includer, settings)| run(includer, settings));
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        exit(1);
    }
}

fn run(mut includer: Includer, settings: Settings) -> Result<(), IncluderError> {
    let order = includer.order();
    match settings.mode {
        Mode::Paths => {
            let text: String = includer
                .paths(order)
                .iter()
                .map(|p| format!("{}\n", p.display()))
                .collect();
            emit(&text, settings.output)
        }
        Mode::Read => {
            let fragments = includer.read_fragments(order)?;
            match settings.output {
                Some(path) => output::write_fragments_to_file(
                    &fragments,
                    settings.format.into(),
                    path,
                    settings.pretty,
                ),
                None => {
                    let text =
                        output::format_fragments(&fragments, settings.format.into(), settings.pretty)?;
                    print!("{}", text);
                    Ok(())
                }
            }
        }
        Mode::Load => {
            let mut evaluator = MergeEvaluator::new(settings.target);
            includer.load(order, &mut evaluator)?;
            let merged = includer
                .vars()
                .get(evaluator.target())
                .cloned()
                .unwrap_or(serde_json::Value::Null);
            let json = if settings.pretty {
                serde_json::to_string_pretty(&merged)
            } else {
                serde_json::to_string(&merged)
            }
            .map_err(|e| IncluderError::Config(format!("JSON serialization failed: {}", e)))?;
            emit(&format!("{}\n", json), settings.output)
        }
        #[cfg(feature = "streaming")]
        Mode::Stream => run_streaming(&includer, order, settings.output),
    }
}

/// Writes one JSON fragment per line as each file is rendered.
#[cfg(feature = "streaming")]
fn run_streaming(
    includer: &Includer,
    order: Order,
    output: Option<PathBuf>,
) -> Result<(), IncluderError> {
    let mut handle: Box<dyn Write> = match &output {
        Some(path) => Box::new(io::BufWriter::new(
            std::fs::File::create(path).map_err(|e| IncluderError::Io {
                path: path.clone(),
                source: e,
            })?,
        )),
        None => Box::new(io::stdout().lock()),
    };
    let target = output.unwrap_or_else(|| PathBuf::from("<stdout>"));
    for fragment in includer.stream(order) {
        let fragment = fragment?;
        let json = serde_json::to_string(&fragment)
            .map_err(|e| IncluderError::Config(format!("JSON serialization failed: {}", e)))?;
        writeln!(handle, "{}", json).map_err(|source| IncluderError::Io {
            path: target.clone(),
            source,
        })?;
    }
    handle.flush().map_err(|source| IncluderError::Io {
        path: target,
        source,
    })
}

fn emit(text: &str, output: Option<PathBuf>) -> Result<(), IncluderError> {
    match output {
        Some(path) => std::fs::write(&path, text).map_err(|source| IncluderError::Io { path, source }),
        None => {
            print!("{}", text);
            Ok(())
        }
    }
}
