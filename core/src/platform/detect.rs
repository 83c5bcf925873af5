//! Capability detection implementation.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::Capabilities;

/// Detect the current platform. Never fails: undetectable facts are left at
/// their empty defaults and logged at debug level.
pub fn detect() -> Capabilities {
    let mut caps = Capabilities {
        os: std::env::consts::OS.to_string(),
        is_root: is_elevated(),
        ..Capabilities::default()
    };

    match parse_os_release(Path::new("/etc/os-release")) {
        Ok(fields) => {
            caps.distro = fields.get("ID").cloned().unwrap_or_default();
            if caps.distro.is_empty() {
                if let Some(id_like) = fields.get("ID_LIKE") {
                    caps.distro = id_like.clone();
                }
            }
        }
        Err(e) => tracing::debug!("no os-release info: {e}"),
    }
    caps.distro = caps.distro.to_lowercase();
    if !caps.distro.is_empty() {
        caps.distro_id = format!("{}_linux", caps.distro);
    }

    caps.is_wayland = std::env::var("WAYLAND_DISPLAY").is_ok_and(|v| !v.is_empty());
    caps.desktop = detect_desktop();

    tracing::debug!("detected platform: {}", caps.summary());
    caps
}

fn is_elevated() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}

/// Parse an os-release style file into a key/value map. Quotes are stripped,
/// comments and malformed lines skipped.
pub(crate) fn parse_os_release(path: &Path) -> std::io::Result<HashMap<String, String>> {
    let content = fs::read_to_string(path)?;
    let mut fields = HashMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim_matches(|c| c == '"' || c == '\'');
        fields.insert(key.to_string(), value.to_string());
    }

    Ok(fields)
}

/// Best-effort desktop / window-manager detection from the session
/// environment. Returns an empty string when nothing is found.
fn detect_desktop() -> String {
    for var in ["XDG_CURRENT_DESKTOP", "XDG_SESSION_DESKTOP", "DESKTOP_SESSION"] {
        if let Ok(v) = std::env::var(var) {
            if !v.is_empty() {
                return v.to_lowercase();
            }
        }
    }

    if std::env::var("HYPRLAND_INSTANCE_SIGNATURE").is_ok() {
        return "hyprland".to_string();
    }
    if std::env::var("SWAYSOCK").is_ok() {
        return "sway".to_string();
    }

    String::new()
}
