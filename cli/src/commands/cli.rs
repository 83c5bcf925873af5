use clap::Parser;
use hostdiag_core::api::ReportMode;

pub const DEFAULT_OUTPUT: &str = "hostdiag-report.md";
pub const DEFAULT_INTRO_OUTPUT: &str = "hostdiag-intro.md";

/// Collect host diagnostics into an LLM-friendly markdown report.
#[derive(Parser, Debug)]
#[command(name = "hostdiag", version, about)]
pub struct Args {
    /// Output file path for the report.
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT)]
    pub output: String,

    /// Disable the interactive UI (print results to stdout).
    #[arg(long)]
    pub no_ui: bool,

    /// Generate minified output for a smaller token count.
    #[arg(long, conflicts_with = "intro")]
    pub minified: bool,

    /// Generate only the system intro for LLM chat context.
    #[arg(long)]
    pub intro: bool,

    /// Number of concurrent workers.
    #[arg(long)]
    pub workers: Option<usize>,

    /// Per-probe timeout in seconds (applies to every probe).
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Directory of additional probe manifests.
    #[arg(long)]
    pub probes_dir: Option<String>,

    /// Explicit configuration file path.
    #[arg(long)]
    pub config: Option<String>,
}

impl Args {
    pub fn report_mode(&self) -> ReportMode {
        if self.intro {
            ReportMode::Intro
        } else if self.minified {
            ReportMode::Minified
        } else {
            ReportMode::Full
        }
    }

    /// Effective output path: intro mode redirects the default file name,
    /// and `~` expands to the home directory.
    pub fn output_path(&self) -> String {
        let raw = if self.intro && self.output == DEFAULT_OUTPUT {
            DEFAULT_INTRO_OUTPUT
        } else {
            &self.output
        };
        shellexpand::tilde(raw).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_selection_follows_flag_priority() {
        let args = Args::parse_from(["hostdiag", "--intro"]);
        assert_eq!(args.report_mode(), ReportMode::Intro);

        let args = Args::parse_from(["hostdiag", "--minified"]);
        assert_eq!(args.report_mode(), ReportMode::Minified);

        let args = Args::parse_from(["hostdiag"]);
        assert_eq!(args.report_mode(), ReportMode::Full);
    }

    #[test]
    fn intro_mode_redirects_default_output_only() {
        let args = Args::parse_from(["hostdiag", "--intro"]);
        assert_eq!(args.output_path(), DEFAULT_INTRO_OUTPUT);

        let args = Args::parse_from(["hostdiag", "--intro", "-o", "custom.md"]);
        assert_eq!(args.output_path(), "custom.md");
    }
}
