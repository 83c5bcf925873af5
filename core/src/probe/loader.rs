//! Probe manifest loading.
//!
//! Manifests are YAML documents embedded into the binary, optionally
//! supplemented by a user directory. Loading is all-or-nothing: the first
//! malformed source aborts with an error naming it.

use std::path::PathBuf;

use crate::error::LoaderError;
use crate::platform::Capabilities;

use super::types::{Profile, Task, TaskId};

/// Built-in probe manifests, in canonical enumeration order.
const EMBEDDED_MANIFESTS: &[(&str, &str)] = &[
    ("intro", include_str!("../../probes/intro.yaml")),
    ("system", include_str!("../../probes/system.yaml")),
    ("hardware", include_str!("../../probes/hardware.yaml")),
    ("network", include_str!("../../probes/network.yaml")),
    ("desktop", include_str!("../../probes/desktop.yaml")),
    ("audio", include_str!("../../probes/audio.yaml")),
    ("arch", include_str!("../../probes/arch.yaml")),
    ("debian", include_str!("../../probes/debian.yaml")),
];

/// Loads and filters probe manifests against the current platform.
pub struct Loader {
    caps: Capabilities,
    extra_dir: Option<PathBuf>,
}

impl Loader {
    pub fn new(caps: Capabilities) -> Self {
        Self {
            caps,
            extra_dir: None,
        }
    }

    /// Layer a directory of additional `*.yaml` manifests on top of the
    /// embedded set. Files are enumerated in file-name order.
    pub fn with_extra_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.extra_dir = Some(dir.into());
        self
    }

    /// Load every platform-applicable profile, keeping source order.
    pub fn load_profiles(&self) -> Result<Vec<Profile>, LoaderError> {
        let mut profiles = Vec::new();

        for (name, content) in EMBEDDED_MANIFESTS {
            if let Some(profile) = self.parse_profile(name, content)? {
                profiles.push(profile);
            }
        }

        for (name, content) in self.read_extra_manifests()? {
            if let Some(profile) = self.parse_profile(&name, &content)? {
                profiles.push(profile);
            }
        }

        Ok(profiles)
    }

    /// Load all matching profiles and flatten them into the canonical task
    /// list: source-enumeration order, then declaration order within each
    /// source. Assigns the per-run sequence ids used for event correlation.
    pub fn tasks(&self) -> Result<Vec<Task>, LoaderError> {
        let profiles = self.load_profiles()?;

        let mut tasks = Vec::new();
        let mut next_id = 0u64;
        for profile in profiles {
            for mut task in profile.tasks {
                task.id = TaskId(next_id);
                next_id += 1;
                tasks.push(task);
            }
        }

        tracing::debug!("loaded {} tasks", tasks.len());
        Ok(tasks)
    }

    /// Parse one manifest; returns `None` when it targets another platform.
    fn parse_profile(&self, name: &str, content: &str) -> Result<Option<Profile>, LoaderError> {
        let mut profile: Profile =
            serde_yaml::from_str(content).map_err(|source| LoaderError::Parse {
                name: name.to_string(),
                source,
            })?;

        if !matches_platform(&profile.platform, &self.caps) {
            tracing::debug!(
                "manifest {name} targets {}, skipping on {}",
                profile.platform,
                self.caps.distro_id
            );
            return Ok(None);
        }

        for task in &mut profile.tasks {
            if task.category.is_empty() {
                task.category = name.to_string();
            }
        }

        Ok(Some(profile))
    }

    fn read_extra_manifests(&self) -> Result<Vec<(String, String)>, LoaderError> {
        let Some(dir) = &self.extra_dir else {
            return Ok(Vec::new());
        };

        let io_err = |source| LoaderError::Io {
            path: dir.display().to_string(),
            source,
        };

        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(io_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(io_err)?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "yaml"))
            .collect();
        paths.sort();

        let mut manifests = Vec::new();
        for path in paths {
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let content = std::fs::read_to_string(&path).map_err(|source| LoaderError::Io {
                path: path.display().to_string(),
                source,
            })?;
            manifests.push((name, content));
        }

        Ok(manifests)
    }
}

/// Platform applicability for a manifest:
/// - no declared platform applies universally
/// - case-insensitive equality with the distribution identifier
/// - coarse family prefix match, e.g. "arch" applies to "arch_linux"
/// - the generic OS family name, e.g. "linux", applies to any distribution
fn matches_platform(platform: &str, caps: &Capabilities) -> bool {
    if platform.is_empty() {
        return true;
    }

    let platform = platform.to_lowercase();
    let distro_id = caps.distro_id.to_lowercase();

    if platform == distro_id {
        return true;
    }
    if distro_id.contains(&platform) {
        return true;
    }
    platform == caps.os
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn arch_caps() -> Capabilities {
        Capabilities {
            os: "linux".to_string(),
            distro: "arch".to_string(),
            distro_id: "arch_linux".to_string(),
            ..Capabilities::default()
        }
    }

    #[test]
    fn platform_matching_rules() {
        let caps = arch_caps();
        assert!(matches_platform("", &caps));
        assert!(matches_platform("arch_linux", &caps));
        assert!(matches_platform("ARCH_LINUX", &caps));
        assert!(matches_platform("arch", &caps));
        assert!(matches_platform("linux", &caps));
        assert!(!matches_platform("debian", &caps));
        assert!(!matches_platform("macos", &caps));
    }

    #[test]
    fn category_defaults_to_source_name() {
        let loader = Loader::new(arch_caps());
        let yaml = "
name: Test
tasks:
  - name: one
    command: echo one
  - name: two
    command: echo two
    category: custom
";
        let profile = loader.parse_profile("netinfo", yaml).unwrap().unwrap();
        assert_eq!(profile.tasks[0].category, "netinfo");
        assert_eq!(profile.tasks[1].category, "custom");
    }

    #[test]
    fn foreign_platform_manifest_is_excluded_entirely() {
        let loader = Loader::new(arch_caps());
        let yaml = "
name: Debian only
platform: debian
tasks:
  - name: apt
    command: apt list
";
        assert!(loader.parse_profile("deb", yaml).unwrap().is_none());
    }

    #[test]
    fn malformed_manifest_aborts_with_source_name() {
        let loader = Loader::new(arch_caps());
        let err = loader.parse_profile("broken", "tasks: [not a task").unwrap_err();
        match err {
            LoaderError::Parse { name, .. } => assert_eq!(name, "broken"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn embedded_manifests_load_and_ids_are_sequential() {
        let tasks = Loader::new(arch_caps()).tasks().unwrap();
        assert!(!tasks.is_empty());
        for (i, task) in tasks.iter().enumerate() {
            assert_eq!(task.id, TaskId(i as u64));
            assert!(!task.name.is_empty());
            assert!(!task.command.is_empty());
            assert!(!task.category.is_empty());
        }
    }

    #[test]
    fn extra_dir_manifests_follow_embedded_ones() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("zcustom.yaml")).unwrap();
        write!(
            file,
            "name: Custom\ntasks:\n  - name: marker-task\n    command: echo hi\n"
        )
        .unwrap();

        let tasks = Loader::new(arch_caps())
            .with_extra_dir(dir.path())
            .tasks()
            .unwrap();
        let last = tasks.last().unwrap();
        assert_eq!(last.name, "marker-task");
        assert_eq!(last.category, "zcustom");
    }

    #[test]
    fn malformed_extra_manifest_produces_no_partial_list() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.yaml"), "tasks: [oops").unwrap();

        let res = Loader::new(arch_caps()).with_extra_dir(dir.path()).tasks();
        assert!(res.is_err());
    }
}
