//! Field-level validation primitives shared by both operations.
//!
//! Checks collect every violation in a single pass so the host can show the
//! complete list to the user, instead of stopping at the first bad field.
//! Numeric bounds are inclusive, enum tokens are exact case-sensitive
//! matches, and no coercion happens anywhere (a numeric-looking string is
//! not a number).

use serde_json::{Map, Value, json};
use std::fmt;

/// Machine-readable category of a single violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    Missing,
    WrongType,
    TooSmall,
    TooBig,
    InvalidValue,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::Missing => "missing",
            ViolationKind::WrongType => "wrong type",
            ViolationKind::TooSmall => "too small",
            ViolationKind::TooBig => "too big",
            ViolationKind::InvalidValue => "invalid value",
        }
    }
}

/// One field-level violation: where, what, and which category.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Path segments from the root; empty means the violation applies to
    /// the whole value.
    pub path: Vec<String>,
    pub message: String,
    pub kind: ViolationKind,
}

impl Violation {
    pub fn new(path: &[&str], kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            path: path.iter().map(|s| s.to_string()).collect(),
            message: message.into(),
            kind,
        }
    }

    /// Dot-joined path, or `root` when the path is empty.
    ///
    /// ```
    /// use driftwave_connector::schema::{Violation, ViolationKind};
    ///
    /// let v = Violation::new(&["results", "web", "0", "url"], ViolationKind::Missing, "is required");
    /// assert_eq!(v.dotted_path(), "results.web.0.url");
    ///
    /// let root = Violation::new(&[], ViolationKind::WrongType, "must be an object");
    /// assert_eq!(root.dotted_path(), "root");
    /// ```
    pub fn dotted_path(&self) -> String {
        if self.path.is_empty() {
            "root".to_string()
        } else {
            self.path.join(".")
        }
    }
}

/// Ordered, non-empty list of violations from one validation pass.
///
/// `Display` renders the host-observable form: numbered lines, one per
/// violation, each naming the dot-joined field path (or `root`) and the
/// human message.
#[derive(Debug, Clone)]
pub struct Violations(Vec<Violation>);

impl Violations {
    /// Wrap a collected list; `None` when the list is empty.
    pub fn from_vec(list: Vec<Violation>) -> Option<Self> {
        if list.is_empty() { None } else { Some(Self(list)) }
    }

    pub fn single(violation: Violation) -> Self {
        Self(vec![violation])
    }

    /// Number of violations; at least 1 by construction.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    /// Structured form for host-facing error records.
    pub fn to_json(&self) -> Vec<Value> {
        self.0
            .iter()
            .map(|v| {
                json!({
                    "path": v.dotted_path(),
                    "message": v.message,
                    "kind": v.kind.as_str(),
                })
            })
            .collect()
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}. {}: {}", i + 1, v.dotted_path(), v.message)?;
        }
        Ok(())
    }
}

/// Accumulator used by the per-operation validators.
///
/// Every helper records a violation and keeps going, so callers get the
/// full list from one `finish` call.
#[derive(Debug, Default)]
pub struct Checker {
    violations: Vec<Violation>,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, path: &[&str], kind: ViolationKind, message: impl Into<String>) {
        self.violations.push(Violation::new(path, kind, message));
    }

    pub fn finish(self) -> Result<(), Violations> {
        match Violations::from_vec(self.violations) {
            Some(v) => Err(v),
            None => Ok(()),
        }
    }

    /// Required string field. Missing or mistyped fields record a
    /// violation and yield `None`.
    pub fn required_str(&mut self, obj: &Map<String, Value>, field: &str) -> Option<String> {
        match obj.get(field) {
            None => {
                self.error(&[field], ViolationKind::Missing, "is required");
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.error(&[field], ViolationKind::WrongType, "must be a string");
                None
            }
        }
    }

    /// Optional string field; absent stays absent.
    pub fn optional_str(&mut self, obj: &Map<String, Value>, field: &str) -> Option<String> {
        match obj.get(field) {
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.error(&[field], ViolationKind::WrongType, "must be a string");
                None
            }
        }
    }

    /// Optional integer with inclusive bounds. Floats and numeric strings
    /// are rejected, not coerced.
    pub fn optional_int(
        &mut self,
        obj: &Map<String, Value>,
        field: &str,
        min: i64,
        max: i64,
    ) -> Option<i64> {
        let value = obj.get(field)?;
        let Some(n) = value.as_i64() else {
            self.error(&[field], ViolationKind::WrongType, "must be an integer");
            return None;
        };
        if n < min {
            self.error(
                &[field],
                ViolationKind::TooSmall,
                format!("must be at least {min}"),
            );
            return None;
        }
        if n > max {
            self.error(
                &[field],
                ViolationKind::TooBig,
                format!("must be at most {max}"),
            );
            return None;
        }
        Some(n)
    }

    /// Optional enum token parsed with `parse`; `allowed` is the human
    /// rendering of the value set for the violation message.
    pub fn optional_token<T>(
        &mut self,
        obj: &Map<String, Value>,
        field: &str,
        parse: fn(&str) -> Option<T>,
        allowed: &str,
    ) -> Option<T> {
        let value = obj.get(field)?;
        let Some(s) = value.as_str() else {
            self.error(&[field], ViolationKind::WrongType, "must be a string");
            return None;
        };
        match parse(s) {
            Some(t) => Some(t),
            None => {
                self.error(
                    &[field],
                    ViolationKind::InvalidValue,
                    format!("must be one of {allowed}"),
                );
                None
            }
        }
    }

    /// Optional order-preserving list of enum tokens. Each bad element gets
    /// its own violation at `field.<index>`.
    pub fn optional_token_list<T>(
        &mut self,
        obj: &Map<String, Value>,
        field: &str,
        parse: fn(&str) -> Option<T>,
        allowed: &str,
    ) -> Option<Vec<T>> {
        let value = obj.get(field)?;
        let Some(items) = value.as_array() else {
            self.error(&[field], ViolationKind::WrongType, "must be a list");
            return None;
        };
        let mut out = Vec::with_capacity(items.len());
        let mut ok = true;
        for (i, item) in items.iter().enumerate() {
            let idx = i.to_string();
            let Some(s) = item.as_str() else {
                self.error(
                    &[field, idx.as_str()],
                    ViolationKind::WrongType,
                    "must be a string",
                );
                ok = false;
                continue;
            };
            match parse(s) {
                Some(t) => out.push(t),
                None => {
                    self.error(
                        &[field, idx.as_str()],
                        ViolationKind::InvalidValue,
                        format!("must be one of {allowed}"),
                    );
                    ok = false;
                }
            }
        }
        if ok { Some(out) } else { None }
    }
}

/// View a parameter value as an object. `Null` (the host sent no
/// parameters at all) reads as an empty object so required-field checks
/// still produce per-field violations.
pub fn as_params_object(value: &Value) -> Result<Map<String, Value>, Violations> {
    match value {
        Value::Object(m) => Ok(m.clone()),
        Value::Null => Ok(Map::new()),
        _ => Err(Violations::single(Violation::new(
            &[],
            ViolationKind::WrongType,
            "must be an object",
        ))),
    }
}
