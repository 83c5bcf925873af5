//! Platform capability detection.
//!
//! Produces an immutable [`Capabilities`] snapshot once per run:
//! - Operating-system family and distribution identifier
//! - Active desktop / window-manager label
//! - Privilege level and display-server family
//!
//! The snapshot is shared read-only by all concurrent eligibility checks.

mod detect;

pub use detect::detect;

use serde::{Deserialize, Serialize};

/// Immutable snapshot of environment facts used for eligibility decisions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Capabilities {
    /// Operating-system family, e.g. "linux" or "macos".
    pub os: String,

    /// Raw distribution identifier from os-release, e.g. "arch" or "ubuntu".
    pub distro: String,

    /// Normalised distribution identifier, e.g. "arch_linux".
    pub distro_id: String,

    /// Lower-cased window-manager / desktop label, empty when undetected.
    pub desktop: String,

    /// Whether the process runs with elevated privileges.
    pub is_root: bool,

    /// Whether a Wayland display server is active.
    pub is_wayland: bool,
}

impl Capabilities {
    /// Check whether this platform matches at least one of the given tags.
    ///
    /// Well-known tags (display-server family, specific desktop names) get
    /// semantic handling; anything else falls back to substring containment
    /// against the distro or desktop label.
    pub fn matches_tags(&self, tags: &[String]) -> bool {
        if tags.is_empty() {
            return true;
        }

        tags.iter().any(|tag| self.matches_tag(tag))
    }

    fn matches_tag(&self, tag: &str) -> bool {
        let tag = tag.to_lowercase();
        match tag.as_str() {
            "wayland" => self.is_wayland,
            "x11" => !self.is_wayland && !self.desktop.is_empty(),
            "hyprland" | "sway" | "gnome" => self.desktop.contains(&tag),
            "kde" | "plasma" => self.desktop.contains("kde") || self.desktop.contains("plasma"),
            _ => self.distro.contains(&tag) || self.desktop.contains(&tag),
        }
    }

    /// One-line summary for logging.
    pub fn summary(&self) -> String {
        format!(
            "os={} distro={} desktop={} root={} wayland={}",
            self.os,
            if self.distro_id.is_empty() {
                "unknown"
            } else {
                &self.distro_id
            },
            if self.desktop.is_empty() {
                "none"
            } else {
                &self.desktop
            },
            self.is_root,
            self.is_wayland,
        )
    }
}
