//! Fragment evaluation for [`Includer::load`](crate::Includer::load).
//!
//! The includer only resolves paths. What it means to "execute" a fragment is
//! up to an [`Evaluator`], which sees the fragment through a [`Scope`]: its own
//! path plus the shared variables, and nothing from the caller.

use crate::error::BoxError;
use crate::types::{RESERVED_FILE_VAR, Vars};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// The limited view a fragment gets while it is evaluated.
///
/// Bindings are read and written straight through to the includer's [`Vars`],
/// so changes made by one fragment are seen by the next. The reserved
/// [`RESERVED_FILE_VAR`] name is masked in both directions.
pub struct Scope<'a> {
    file: &'a Path,
    vars: &'a mut Vars,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(file: &'a Path, vars: &'a mut Vars) -> Self {
        Self { file, vars }
    }

    /// Path of the fragment being evaluated.
    pub fn file(&self) -> &Path {
        self.file
    }

    /// Directory containing the fragment.
    pub fn dir(&self) -> &Path {
        self.file.parent().unwrap_or(self.file)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        if name == RESERVED_FILE_VAR {
            return None;
        }
        self.vars.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        if name == RESERVED_FILE_VAR {
            return None;
        }
        self.vars.get_mut(name)
    }

    /// Sets a binding, returning the previous value.
    ///
    /// Setting the reserved name is ignored and returns `None`.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        let name = name.into();
        if name == RESERVED_FILE_VAR {
            return None;
        }
        self.vars.insert(name, value)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        if name == RESERVED_FILE_VAR {
            return None;
        }
        self.vars.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        name != RESERVED_FILE_VAR && self.vars.contains_key(name)
    }

    /// Names of all visible bindings.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars
            .keys()
            .map(String::as_str)
            .filter(|name| *name != RESERVED_FILE_VAR)
    }
}

/// Executes one fragment against a [`Scope`].
pub trait Evaluator {
    fn evaluate(&mut self, scope: &mut Scope<'_>) -> Result<(), BoxError>;
}

impl<F> Evaluator for F
where
    F: FnMut(&mut Scope<'_>) -> Result<(), BoxError>,
{
    fn evaluate(&mut self, scope: &mut Scope<'_>) -> Result<(), BoxError> {
        self(scope)
    }
}

/// Parses each fragment as JSON and deep-merges it into one binding.
///
/// Objects merge key by key; any other value replaces what was there. Loading
/// a base directory before an override directory therefore yields the base
/// config with the overrides applied on top.
#[derive(Debug, Clone)]
pub struct MergeEvaluator {
    target: String,
}

impl MergeEvaluator {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Evaluator for MergeEvaluator {
    fn evaluate(&mut self, scope: &mut Scope<'_>) -> Result<(), BoxError> {
        let text = fs::read_to_string(scope.file())?;
        let incoming: Value = serde_json::from_str(&text)?;
        match scope.get_mut(&self.target) {
            Some(existing) => merge_value(existing, incoming),
            None => {
                if self.target == RESERVED_FILE_VAR {
                    return Err(format!("cannot merge into `{}`", RESERVED_FILE_VAR).into());
                }
                scope.set(self.target.clone(), incoming);
            }
        }
        Ok(())
    }
}

pub(crate) fn merge_value(base: &mut Value, incoming: Value) {
    match (base, incoming) {
        (Value::Object(base), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match base.get_mut(&key) {
                    Some(slot) => merge_value(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, incoming) => *base = incoming,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scope_masks_reserved_name() {
        let mut vars = Vars::new();
        vars.insert(RESERVED_FILE_VAR.into(), json!("/elsewhere"));
        vars.insert("track".into(), json!([]));
        let path = Path::new("/conf/dir1/file1.json");
        let mut scope = Scope::new(path, &mut vars);

        assert!(scope.get(RESERVED_FILE_VAR).is_none());
        assert!(!scope.contains(RESERVED_FILE_VAR));
        assert_eq!(scope.set(RESERVED_FILE_VAR, json!("x")), None);
        assert_eq!(scope.remove(RESERVED_FILE_VAR), None);
        assert_eq!(scope.names().collect::<Vec<_>>(), vec!["track"]);
        assert_eq!(scope.file(), path);
        assert_eq!(scope.dir(), Path::new("/conf/dir1"));

        assert_eq!(vars[RESERVED_FILE_VAR], json!("/elsewhere"));
    }

    #[test]
    fn scope_writes_through() {
        let mut vars = Vars::new();
        vars.insert("count".into(), json!(1));
        {
            let mut scope = Scope::new(Path::new("/a"), &mut vars);
            *scope.get_mut("count").unwrap() = json!(2);
            scope.set("new", json!(true));
        }
        assert_eq!(vars["count"], json!(2));
        assert_eq!(vars["new"], json!(true));
    }

    #[test]
    fn merge_is_deep_for_objects_only() {
        let mut base = json!({"db": {"host": "localhost", "port": 5432}, "tags": ["a"]});
        merge_value(
            &mut base,
            json!({"db": {"host": "prod.internal"}, "tags": ["b"], "debug": false}),
        );
        assert_eq!(
            base,
            json!({
                "db": {"host": "prod.internal", "port": 5432},
                "tags": ["b"],
                "debug": false
            })
        );
    }
}
