use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("loading probes failed: {0}")]
    Load(#[from] LoaderError),
    #[error("config error: {0}")]
    Config(String),
    #[error("no tasks found for this platform")]
    NoTasks,
    #[error("writing report to {path}: {source}")]
    ReportWrite {
        path: String,
        source: std::io::Error,
    },
    #[error("terminal error: {0}")]
    Terminal(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Errors raised while loading probe manifests. Loading is all-or-nothing:
/// the first malformed source aborts the run with no partial task list.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("reading probe manifest {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("parsing probe manifest {name}: {source}")]
    Parse {
        name: String,
        source: serde_yaml::Error,
    },
}
