use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use crate::model::SshTerminal;

/// Outcome of comparing one profile name across two reconciliation passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    None,
    Created,
    Removed,
    Edited,
}

/// Structural validation of an untyped profile entry. Returns `None` for
/// anything that does not qualify as an SSH terminal; malformed input is
/// routine data here, not an error.
///
/// When `name` comes from the surrounding keyed mapping it is attached to
/// the result, otherwise an inline `name` field is required.
pub fn validate_terminal(value: &Value, name: Option<&str>) -> Option<SshTerminal> {
    let obj = value.as_object()?;

    if name.is_none() && !obj.get("name").is_some_and(Value::is_string) {
        return None;
    }
    if obj.get("overrideName") != Some(&Value::Bool(true)) {
        return None;
    }

    // exactly one of path / source
    let path = obj.get("path");
    let source = obj.get("source");
    match (path, source) {
        (Some(p), None) if p.is_string() => {}
        (None, Some(s)) if s.is_string() => {}
        _ => return None,
    }

    if !is_optional_string(obj.get("icon")) || !is_optional_string(obj.get("color")) {
        return None;
    }
    if let Some(args) = obj.get("args") {
        if !args.is_string() && !is_string_array(args) {
            return None;
        }
    }
    if let Some(env) = obj.get("env") {
        let entries = env.as_object()?;
        if !entries.values().all(|v| v.is_string() || v.is_null()) {
            return None;
        }
    }

    let ssh = obj.get("ssh")?.as_object()?;
    if !ssh.get("host").and_then(Value::as_str).is_some_and(|h| !h.is_empty()) {
        return None;
    }
    if !ssh.get("user").and_then(Value::as_str).is_some_and(|u| !u.is_empty()) {
        return None;
    }
    if let Some(port) = ssh.get("port") {
        if !port.as_u64().is_some_and(|p| p <= u64::from(u16::MAX)) {
            return None;
        }
    }
    if !is_optional_string(ssh.get("password")) || !is_optional_string(ssh.get("key")) {
        return None;
    }
    if ssh.get("crypted").is_some_and(|c| !c.is_boolean()) {
        return None;
    }

    let mut value = value.clone();
    if let Some(name) = name {
        value["name"] = Value::String(name.to_string());
    }
    serde_json::from_value(value).ok()
}

/// Classifies a profile across two passes. `name` and `override_name` are
/// identity fields and excluded from the comparison; `args` compare as an
/// ordered sequence, `env` as an unordered key/value set.
pub fn classify_change(prev: Option<&SshTerminal>, next: Option<&SshTerminal>) -> ChangeKind {
    let (prev, next) = match (prev, next) {
        (None, None) => return ChangeKind::None,
        (None, Some(_)) => return ChangeKind::Created,
        (Some(_), None) => return ChangeKind::Removed,
        (Some(prev), Some(next)) => (prev, next),
    };

    if prev.icon != next.icon
        || prev.color != next.color
        || prev.args != next.args
        || prev.env != next.env
        || prev.path != next.path
        || prev.source != next.source
        || prev.ssh != next.ssh
    {
        ChangeKind::Edited
    } else {
        ChangeKind::None
    }
}

/// True iff the profile names a private key file that exists right now.
/// The filesystem can change between profile edits and connect attempts,
/// so this is re-checked on every call.
pub fn has_usable_key(terminal: &SshTerminal) -> bool {
    terminal
        .ssh
        .key
        .as_deref()
        .is_some_and(|key| Path::new(key).is_file())
}

pub fn terminal_map(terminals: &[SshTerminal]) -> HashMap<&str, &SshTerminal> {
    terminals
        .iter()
        .map(|terminal| (terminal.name.as_str(), terminal))
        .collect()
}

pub fn contains_name(terminals: &[SshTerminal], name: &str) -> bool {
    terminals.iter().any(|terminal| terminal.name == name)
}

fn is_optional_string(value: Option<&Value>) -> bool {
    value.is_none_or(Value::is_string)
}

fn is_string_array(value: &Value) -> bool {
    value
        .as_array()
        .is_some_and(|items| items.iter().all(Value::is_string))
}
