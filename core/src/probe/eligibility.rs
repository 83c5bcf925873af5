//! Pass/skip decisions for tasks against the capability snapshot.

use crate::platform::Capabilities;

use super::types::Task;

/// Decide whether a task can run here. Returns `None` when eligible, or the
/// human-readable skip reason for the first failing check.
///
/// Check order: privilege, then binary dependencies (first missing one
/// reported, the rest unchecked), then environment tags.
pub fn skip_reason(task: &Task, caps: &Capabilities) -> Option<String> {
    if task.privilege == "sudo" && !caps.is_root {
        return Some("Requires elevated privileges".to_string());
    }

    for bin in &task.requires {
        if which::which(bin).is_err() {
            return Some(format!("Missing dependency: {bin}"));
        }
    }

    if !task.tags.is_empty() && !caps.matches_tags(&task.tags) {
        return Some(format!(
            "Environment mismatch: requires {}",
            task.tags.join(" or ")
        ));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> Task {
        Task {
            name: "t".to_string(),
            command: "true".to_string(),
            ..Task::default()
        }
    }

    fn caps() -> Capabilities {
        Capabilities {
            os: "linux".to_string(),
            distro: "arch".to_string(),
            distro_id: "arch_linux".to_string(),
            desktop: "hyprland".to_string(),
            is_root: false,
            is_wayland: true,
        }
    }

    #[test]
    fn unconstrained_task_is_eligible() {
        assert_eq!(skip_reason(&task(), &caps()), None);
    }

    #[test]
    fn sudo_task_skipped_without_root() {
        let mut t = task();
        t.privilege = "sudo".to_string();
        assert_eq!(
            skip_reason(&t, &caps()).unwrap(),
            "Requires elevated privileges"
        );

        let mut root = caps();
        root.is_root = true;
        assert_eq!(skip_reason(&t, &root), None);
    }

    #[test]
    fn first_missing_dependency_is_named() {
        let mut t = task();
        t.requires = vec![
            "definitely-nonexistent-binary-xyz".to_string(),
            "also-missing".to_string(),
        ];
        assert_eq!(
            skip_reason(&t, &caps()).unwrap(),
            "Missing dependency: definitely-nonexistent-binary-xyz"
        );
    }

    #[test]
    fn privilege_check_precedes_dependency_check() {
        let mut t = task();
        t.privilege = "sudo".to_string();
        t.requires = vec!["definitely-nonexistent-binary-xyz".to_string()];
        assert_eq!(
            skip_reason(&t, &caps()).unwrap(),
            "Requires elevated privileges"
        );
    }

    #[test]
    fn tag_mismatch_enumerates_required_tags() {
        let mut t = task();
        t.tags = vec!["gnome".to_string(), "kde".to_string()];
        assert_eq!(
            skip_reason(&t, &caps()).unwrap(),
            "Environment mismatch: requires gnome or kde"
        );
    }

    #[test]
    fn matching_tag_passes() {
        let mut t = task();
        t.tags = vec!["hyprland".to_string()];
        assert_eq!(skip_reason(&t, &caps()), None);
    }
}
