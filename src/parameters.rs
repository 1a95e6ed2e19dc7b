//! Hierarchical parameter store.
//!
//! Entries are declared under a subsection path together with a default value,
//! a validation [`Pattern`] and a documentation string. Values are then read from
//! a text parameter file (`subsection` / `set` / `end`) or from nested JSON and
//! validated as they are set, so malformed input fails at parse time.

use crate::error::ParameterError;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::trace;

pub type Result<T> = std::result::Result<T, ParameterError>;

/// Validation rule attached to a declared entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Integer { min: Option<i64>, max: Option<i64> },
    Double { min: Option<f64>, max: Option<f64> },
    Bool,
    Selection(Vec<String>),
    Anything,
}

impl Pattern {
    /// Integer with an inclusive lower bound and no upper bound.
    pub fn integer_at_least(min: i64) -> Self {
        Pattern::Integer {
            min: Some(min),
            max: None,
        }
    }

    pub fn selection(options: &[&str]) -> Self {
        Pattern::Selection(options.iter().map(|o| o.to_string()).collect())
    }

    pub fn matches(&self, value: &str) -> bool {
        let value = value.trim();
        match self {
            Pattern::Integer { min, max } => match value.parse::<i64>() {
                Ok(v) => min.map_or(true, |m| v >= m) && max.map_or(true, |m| v <= m),
                Err(_) => false,
            },
            Pattern::Double { min, max } => match value.parse::<f64>() {
                Ok(v) if v.is_finite() => {
                    min.map_or(true, |m| v >= m) && max.map_or(true, |m| v <= m)
                }
                _ => false,
            },
            Pattern::Bool => parse_bool(value).is_some(),
            Pattern::Selection(options) => options.iter().any(|o| o == value),
            Pattern::Anything => true,
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Integer { min, max } => write!(
                f,
                "[Integer range {}...{} (inclusive)]",
                min.map_or("MIN_INT".to_string(), |m| m.to_string()),
                max.map_or("MAX_INT".to_string(), |m| m.to_string()),
            ),
            Pattern::Double { min, max } => write!(
                f,
                "[Double {}...{} (inclusive)]",
                min.map_or("-MAX_DOUBLE".to_string(), |m| m.to_string()),
                max.map_or("MAX_DOUBLE".to_string(), |m| m.to_string()),
            ),
            Pattern::Bool => write!(f, "[Bool]"),
            Pattern::Selection(options) => write!(f, "[Selection {} ]", options.join("|")),
            Pattern::Anything => write!(f, "[Anything]"),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone)]
struct Entry {
    default: String,
    value: Option<String>,
    pattern: Pattern,
    documentation: String,
}

impl Entry {
    fn current(&self) -> &str {
        self.value.as_deref().unwrap_or(&self.default)
    }
}

#[derive(Debug, Clone, Default)]
struct Section {
    entries: BTreeMap<String, Entry>,
    subsections: BTreeMap<String, Section>,
}

impl Section {
    fn find(&self, path: &[&str]) -> Option<&Section> {
        let mut current = self;
        for &key in path {
            current = current.subsections.get(key)?;
        }
        Some(current)
    }

    fn find_mut(&mut self, path: &[&str]) -> Option<&mut Section> {
        let mut current = self;
        for &key in path {
            current = current.subsections.get_mut(key)?;
        }
        Some(current)
    }

    fn find_or_create(&mut self, path: &[&str]) -> &mut Section {
        let mut current = self;
        for &key in path {
            current = current.subsections.entry(key.to_string()).or_default();
        }
        current
    }
}

/// Full `a/b/c/entry` path used in error messages.
pub fn entry_path(path: &[&str], name: &str) -> String {
    let mut parts: Vec<&str> = path.to_vec();
    parts.push(name);
    parts.join("/")
}

#[derive(Debug, Clone, Default)]
pub struct ParameterHandler {
    root: Section,
}

impl ParameterHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_entry(
        &mut self,
        path: &[&str],
        name: &str,
        default: &str,
        pattern: Pattern,
        documentation: &str,
    ) -> Result<()> {
        if !pattern.matches(default) {
            return Err(ParameterError::InvalidDefault {
                path: entry_path(path, name),
                value: default.to_string(),
                pattern: pattern.to_string(),
            });
        }

        let section = self.root.find_or_create(path);
        if section.entries.contains_key(name) {
            return Err(ParameterError::DuplicateEntry {
                path: entry_path(path, name),
            });
        }

        trace!(entry = %entry_path(path, name), default, "declared parameter");
        section.entries.insert(
            name.to_string(),
            Entry {
                default: default.trim().to_string(),
                value: None,
                pattern,
                documentation: documentation.to_string(),
            },
        );
        Ok(())
    }

    fn entry(&self, path: &[&str], name: &str) -> Result<&Entry> {
        self.root
            .find(path)
            .and_then(|s| s.entries.get(name))
            .ok_or_else(|| ParameterError::UndeclaredEntry {
                path: entry_path(path, name),
            })
    }

    /// Sets a declared entry, validating the value against its pattern.
    pub fn set(&mut self, path: &[&str], name: &str, value: &str) -> Result<()> {
        let entry = self
            .root
            .find_mut(path)
            .and_then(|s| s.entries.get_mut(name))
            .ok_or_else(|| ParameterError::UndeclaredEntry {
                path: entry_path(path, name),
            })?;

        let value = value.trim();
        if !entry.pattern.matches(value) {
            return Err(ParameterError::InvalidValue {
                path: entry_path(path, name),
                value: value.to_string(),
                pattern: entry.pattern.to_string(),
            });
        }
        entry.value = Some(value.to_string());
        Ok(())
    }

    /// Current value of an entry: the last value set, or the declared default.
    pub fn get(&self, path: &[&str], name: &str) -> Result<&str> {
        self.entry(path, name).map(Entry::current)
    }

    pub fn get_integer(&self, path: &[&str], name: &str) -> Result<i64> {
        let raw = self.get(path, name)?;
        raw.parse::<i64>()
            .map_err(|_| ParameterError::InvalidValue {
                path: entry_path(path, name),
                value: raw.to_string(),
                pattern: Pattern::Integer { min: None, max: None }.to_string(),
            })
    }

    pub fn get_double(&self, path: &[&str], name: &str) -> Result<f64> {
        let raw = self.get(path, name)?;
        raw.parse::<f64>()
            .map_err(|_| ParameterError::InvalidValue {
                path: entry_path(path, name),
                value: raw.to_string(),
                pattern: Pattern::Double { min: None, max: None }.to_string(),
            })
    }

    pub fn get_bool(&self, path: &[&str], name: &str) -> Result<bool> {
        let raw = self.get(path, name)?;
        parse_bool(raw).ok_or_else(|| ParameterError::InvalidValue {
            path: entry_path(path, name),
            value: raw.to_string(),
            pattern: Pattern::Bool.to_string(),
        })
    }

    /// Reads a parameter file in the `subsection` / `set` / `end` format.
    ///
    /// `#` starts a comment and a trailing `\` continues a line.
    pub fn parse_input_from_str(&mut self, text: &str) -> Result<()> {
        let mut stack: Vec<String> = Vec::new();
        let mut pending = String::new();
        let mut pending_start = 0;

        for (number, raw_line) in text.lines().enumerate() {
            let line_number = number + 1;
            if pending.is_empty() {
                pending_start = line_number;
            }

            let line = match raw_line.find('#') {
                Some(pos) => &raw_line[..pos],
                None => raw_line,
            };

            let trimmed = line.trim_end();
            if let Some(continued) = trimmed.strip_suffix('\\') {
                pending.push_str(continued);
                continue;
            }
            pending.push_str(line);

            let logical = std::mem::take(&mut pending);
            self.parse_line(logical.trim(), pending_start, &mut stack)?;
        }

        if !pending.trim().is_empty() {
            self.parse_line(pending.trim(), pending_start, &mut stack)?;
        }

        if !stack.is_empty() {
            return Err(ParameterError::UnbalancedSubsection(format!(
                "subsection `{}` is never closed",
                stack.join("/")
            )));
        }
        Ok(())
    }

    fn parse_line(&mut self, line: &str, line_number: usize, stack: &mut Vec<String>) -> Result<()> {
        if line.is_empty() {
            return Ok(());
        }

        if line == "end" {
            return match stack.pop() {
                Some(_) => Ok(()),
                None => Err(ParameterError::Syntax {
                    line: line_number,
                    message: "`end` without a matching `subsection`".to_string(),
                }),
            };
        }

        if let Some(name) = keyword_argument(line, "subsection") {
            if name.is_empty() {
                return Err(ParameterError::Syntax {
                    line: line_number,
                    message: "`subsection` needs a name".to_string(),
                });
            }
            stack.push(name.to_string());
            return Ok(());
        }

        if let Some(assignment) = keyword_argument(line, "set") {
            let Some((name, value)) = assignment.split_once('=') else {
                return Err(ParameterError::Syntax {
                    line: line_number,
                    message: format!("expected `set <entry> = <value>`, found `{line}`"),
                });
            };
            let path: Vec<&str> = stack.iter().map(String::as_str).collect();
            return self.set(&path, name.trim(), value.trim());
        }

        Err(ParameterError::Syntax {
            line: line_number,
            message: format!("unrecognized line `{line}`"),
        })
    }

    /// Reads nested JSON: objects are subsections, scalars are entry values.
    pub fn parse_input_from_json(&mut self, json: &Value) -> Result<()> {
        let mut path = Vec::new();
        self.walk_json(json, &mut path)
    }

    pub fn parse_input_from_json_str(&mut self, text: &str) -> Result<()> {
        let json: Value = serde_json::from_str(text)?;
        self.parse_input_from_json(&json)
    }

    fn walk_json(&mut self, json: &Value, path: &mut Vec<String>) -> Result<()> {
        let Value::Object(map) = json else {
            return Err(ParameterError::NotASection(path.join("/")));
        };

        for (key, value) in map {
            match value {
                Value::Object(_) => {
                    path.push(key.clone());
                    self.walk_json(value, path)?;
                    path.pop();
                }
                scalar => {
                    let section: Vec<&str> = path.iter().map(String::as_str).collect();
                    match scalar {
                        Value::String(s) => self.set(&section, key, s)?,
                        Value::Number(n) => self.set(&section, key, &n.to_string())?,
                        Value::Bool(b) => {
                            self.set(&section, key, if *b { "true" } else { "false" })?
                        }
                        _ => {
                            let entry = self.entry(&section, key)?;
                            return Err(ParameterError::InvalidValue {
                                path: entry_path(&section, key),
                                value: scalar.to_string(),
                                pattern: entry.pattern.to_string(),
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Renders every declared entry, with documentation and pattern, in the
    /// text format accepted by [`ParameterHandler::parse_input_from_str`].
    pub fn print_parameters(&self) -> String {
        let mut out = String::new();
        print_section(&self.root, 0, &mut out);
        out
    }
}

fn keyword_argument<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    if rest.is_empty() {
        return Some("");
    }
    rest.starts_with(char::is_whitespace).then(|| rest.trim())
}

fn print_section(section: &Section, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for (name, entry) in &section.entries {
        if !entry.documentation.is_empty() {
            out.push_str(&format!("{indent}# {}\n", entry.documentation));
        }
        out.push_str(&format!("{indent}# {}\n", entry.pattern));
        out.push_str(&format!("{indent}set {name} = {}\n", entry.current()));
    }
    for (name, subsection) in &section.subsections {
        out.push_str(&format!("{indent}subsection {name}\n"));
        print_section(subsection, depth + 1, out);
        out.push_str(&format!("{indent}end\n"));
    }
}
