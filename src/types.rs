use crate::error::IncluderError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Named variables shared by every fragment evaluated in one load.
pub type Vars = serde_json::Map<String, serde_json::Value>;

/// Binding name that always refers to the fragment being evaluated.
///
/// An entry with this name in [`Vars`] is never visible to a fragment.
pub const RESERVED_FILE_VAR: &str = "__FILE__";

/// A single file prepared for concatenation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    /// The resolved real path of the file.
    pub path: PathBuf,
    /// The rendered block: a comment header naming the path, the cleaned
    /// file body and two trailing newlines.
    pub content: String,
}

/// Parses a `name=<json>` binding.
///
/// The value must be valid JSON, so string values need quotes (`env="prod"`).
pub fn parse_var(binding: &str) -> Result<(String, serde_json::Value), IncluderError> {
    let (name, raw) = binding.split_once('=').ok_or_else(|| {
        IncluderError::Config(format!("invalid variable (expected name=<json>): {}", binding))
    })?;
    if name.is_empty() {
        return Err(IncluderError::Config(format!(
            "invalid variable (empty name): {}",
            binding
        )));
    }
    let value = serde_json::from_str(raw).map_err(|e| {
        IncluderError::Config(format!("invalid JSON value for variable `{}`: {}", name, e))
    })?;
    Ok((name.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_json_bindings() {
        assert_eq!(parse_var("port=8080").unwrap(), ("port".to_string(), json!(8080)));
        assert_eq!(
            parse_var(r#"env="prod""#).unwrap(),
            ("env".to_string(), json!("prod"))
        );
        assert_eq!(
            parse_var(r#"track={"files":[]}"#).unwrap(),
            ("track".to_string(), json!({"files": []}))
        );
        assert_eq!(parse_var("eq=\"a=b\"").unwrap().1, json!("a=b"));
    }

    #[test]
    fn rejects_malformed_bindings() {
        for binding in ["no-equals", "=1", "env=prod", "x="] {
            assert!(
                matches!(parse_var(binding), Err(IncluderError::Config(_))),
                "{binding:?} should be rejected"
            );
        }
    }
}
