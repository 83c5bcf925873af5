use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// Get the default hostdiag data directory: ~/.hostdiag
pub fn get_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".hostdiag"))
}

/// Load configuration with the standard layering:
/// explicit path > ~/.hostdiag/config.toml > ./hostdiag.toml > defaults,
/// then environment-variable overrides on top.
pub fn load_default(explicit: Option<&Path>) -> anyhow::Result<AppConfig> {
    let mut cfg: AppConfig = if let Some(path) = explicit {
        let s = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
        toml::from_str::<AppConfig>(&s)?
    } else {
        let user_config = get_data_dir()?.join("config.toml");
        let local_config = Path::new("hostdiag.toml");

        if user_config.exists() {
            let s = std::fs::read_to_string(&user_config)?;
            toml::from_str::<AppConfig>(&s)?
        } else if local_config.exists() {
            let s = std::fs::read_to_string(local_config)?;
            toml::from_str::<AppConfig>(&s)?
        } else {
            AppConfig::default()
        }
    };

    if let Ok(v) = std::env::var("HOSTDIAG_WORKERS") {
        if let Ok(workers) = v.trim().parse() {
            cfg.scheduler.workers = workers;
        }
    }
    if let Ok(v) = std::env::var("HOSTDIAG_TIMEOUT_SECS") {
        if let Ok(secs) = v.trim().parse() {
            cfg.runner.timeout_secs = secs;
        }
    }

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_policy_constants() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.runner.timeout_secs, 30);
        assert_eq!(cfg.runner.max_lines, 500);
        assert_eq!(cfg.runner.max_bytes, 64 * 1024);
        assert_eq!(cfg.scheduler.workers, 4);
        assert!(cfg.report.tokenizer_path.is_none());
    }

    #[test]
    fn explicit_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scheduler]\nworkers = 9\n[runner]\ntimeout_secs = 5").unwrap();

        let cfg = load_default(Some(file.path())).unwrap();
        assert_eq!(cfg.scheduler.workers, 9);
        assert_eq!(cfg.runner.timeout_secs, 5);
        // Untouched sections keep their defaults.
        assert_eq!(cfg.runner.max_lines, 500);
    }

    #[test]
    fn partial_sections_deserialize() {
        let cfg: AppConfig = toml::from_str("[logging]\nlevel = \"debug\"").unwrap();
        assert_eq!(cfg.logging.level, "debug");
        assert!(cfg.logging.enabled);
    }
}
