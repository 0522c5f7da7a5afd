//! Resolution of class, process and task-affinity names against a package name

use super::options::ParseFlags;
use super::result::{ParseError, ParseResult};

/// Resolve a possibly relative class name.
///
/// `.Foo` and `Foo` are package-relative; anything else containing a dot is
/// taken as already qualified. Empty input yields `None`.
pub fn build_class_name(package: &str, name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    if name.starts_with('.') {
        return Some(format!("{}{}", package, name));
    }
    if !name.contains('.') {
        return Some(format!("{}.{}", package, name));
    }
    Some(name.to_string())
}

/// Check that `name` is a dotted Java-like identifier.
///
/// Each segment must start with an ASCII letter; digits and `_` may follow.
pub fn validate_name(name: &str, require_separator: bool) -> Result<(), String> {
    let mut has_separator = false;
    let mut front = true;

    for c in name.chars() {
        if c.is_ascii_alphabetic() {
            front = false;
            continue;
        }
        if !front && (c.is_ascii_digit() || c == '_') {
            continue;
        }
        if c == '.' {
            has_separator = true;
            front = true;
            continue;
        }
        return Err(format!("bad character '{}'", c));
    }

    if has_separator || !require_separator {
        Ok(())
    } else {
        Err("must have at least one '.' separator".to_string())
    }
}

/// Resolve a process-like name. A leading `:` makes it package-private.
pub fn build_compound_name(package: &str, name: &str, kind: &str) -> ParseResult<String> {
    if let Some(sub_name) = name.strip_prefix(':') {
        if sub_name.is_empty() {
            return Err(ParseError::invalid(format!(
                "Bad {} name {} in package {}: must be at least two characters",
                kind, name, package
            )));
        }
        validate_name(sub_name, false).map_err(|reason| {
            ParseError::invalid(format!(
                "Invalid {} name {} in package {}: {}",
                kind, name, package, reason
            ))
        })?;
        return Ok(format!("{}{}", package, name));
    }

    if name != "system" {
        validate_name(name, true).map_err(|reason| {
            ParseError::invalid(format!(
                "Invalid {} name {} in package {}: {}",
                kind, name, package, reason
            ))
        })?;
    }
    Ok(name.to_string())
}

/// Resolve the process a component (or the application) runs in
pub fn build_process_name(
    package: &str,
    default_process: Option<&str>,
    name: Option<&str>,
    flags: ParseFlags,
    separate_processes: &[String],
) -> ParseResult<Option<String>> {
    if flags.contains(ParseFlags::IGNORE_PROCESSES) && name != Some("system") {
        return Ok(Some(default_process.unwrap_or(package).to_string()));
    }

    for separate in separate_processes.iter().rev() {
        if separate == package
            || Some(separate.as_str()) == default_process
            || Some(separate.as_str()) == name
        {
            return Ok(Some(package.to_string()));
        }
    }

    match name {
        None | Some("") => Ok(default_process.map(str::to_string)),
        Some(name) => build_compound_name(package, name, "process").map(Some),
    }
}

/// Resolve `android:taskAffinity`. An explicitly empty value means no affinity.
pub fn build_task_affinity_name(
    package: &str,
    default_affinity: Option<&str>,
    name: Option<&str>,
) -> ParseResult<Option<String>> {
    match name {
        None => Ok(default_affinity.map(str::to_string)),
        Some("") => Ok(None),
        Some(name) => build_compound_name(package, name, "taskAffinity").map(Some),
    }
}
