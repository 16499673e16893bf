//! Rendering of resolved files into concatenation blocks.
//!
//! Each file becomes a block with a comment header naming its real path,
//! its trimmed body with the open/close markers removed, and the file and
//! directory tokens replaced by quoted literals of its own location.

use crate::{Fragment, IncluderError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Markers and tokens recognized while rendering a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markers {
    /// Stripped when the trimmed body starts with it.
    pub open: String,
    /// Stripped when the trimmed body ends with it.
    pub close: String,
    /// Replaced by the quoted path of the file.
    pub file_token: String,
    /// Replaced by the quoted path of the file's directory.
    pub dir_token: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            open: "<?php".to_string(),
            close: "?>".to_string(),
            file_token: "__FILE__".to_string(),
            dir_token: "__DIR__".to_string(),
        }
    }
}

/// Supported output formats for a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Renders the raw contents of `path` into a concatenation block.
///
/// Substitution is plain text replacement, so tokens inside string literals
/// or comments are replaced too.
pub fn render_block(path: &Path, text: &str, markers: &Markers) -> String {
    let mut body = text.trim();
    if !markers.open.is_empty() {
        if let Some(rest) = body.strip_prefix(markers.open.as_str()) {
            body = rest;
        }
    }
    if !markers.close.is_empty() {
        if let Some(rest) = body.strip_suffix(markers.close.as_str()) {
            body = rest;
        }
    }

    let file = path.display().to_string();
    let dir = path
        .parent()
        .map(|d| d.display().to_string())
        .unwrap_or_else(|| ".".to_string());

    let mut body = body.to_string();
    if !markers.file_token.is_empty() {
        body = body.replace(markers.file_token.as_str(), &format!("'{}'", file));
    }
    if !markers.dir_token.is_empty() {
        body = body.replace(markers.dir_token.as_str(), &format!("'{}'", dir));
    }

    let mut out = String::with_capacity(body.len() + file.len() + 16);
    out.push_str("/**\n");
    out.push_str(&format!(" * {}\n", file));
    out.push_str(" */\n");
    out.push_str(body.trim());
    out.push_str("\n\n");
    out
}

/// Concatenates fragments in order.
pub fn concat(fragments: &[Fragment]) -> String {
    let mut out = String::with_capacity(fragments.iter().map(|f| f.content.len()).sum());
    for fragment in fragments {
        out.push_str(&fragment.content);
    }
    out
}

/// Formats fragments into a string.
pub fn format_fragments(
    fragments: &[Fragment],
    format: OutputFormat,
    pretty: bool,
) -> Result<String, IncluderError> {
    match format {
        OutputFormat::Text => Ok(concat(fragments)),
        OutputFormat::Json => {
            let json = if pretty {
                serde_json::to_string_pretty(fragments)
            } else {
                serde_json::to_string(fragments)
            };
            json.map_err(|e| IncluderError::Config(format!("JSON serialization failed: {}", e)))
        }
    }
}

/// Writes formatted fragments to a file.
pub fn write_fragments_to_file(
    fragments: &[Fragment],
    format: OutputFormat,
    path: impl AsRef<Path>,
    pretty: bool,
) -> Result<(), IncluderError> {
    let content = format_fragments(fragments, format, pretty)?;
    fs::write(&path, content).map_err(|e| IncluderError::io(path.as_ref(), e))?;
    Ok(())
}
