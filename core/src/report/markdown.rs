//! Markdown report rendering.
//!
//! All three variants are pure functions of the capability snapshot, the
//! result list and the generation timestamp captured at construction, each
//! paired with a token count over the exact text produced.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::platform::Capabilities;
use crate::probe::{TaskResult, TaskStatus};

use super::tokenizer::TokenCounter;

/// Which report variant to render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportMode {
    #[default]
    Full,
    Minified,
    Intro,
}

/// Renders markdown reports from a completed result set.
pub struct MarkdownReport {
    caps: Capabilities,
    results: Vec<TaskResult>,
    generated: DateTime<Utc>,
    counter: TokenCounter,
}

impl MarkdownReport {
    pub fn new(caps: Capabilities, results: Vec<TaskResult>, counter: TokenCounter) -> Self {
        Self {
            caps,
            results,
            generated: Utc::now(),
            counter,
        }
    }

    #[cfg(test)]
    fn at(mut self, generated: DateTime<Utc>) -> Self {
        self.generated = generated;
        self
    }

    /// Render the chosen variant, returning the document and its token count.
    pub fn render(&self, mode: ReportMode) -> (String, usize) {
        match mode {
            ReportMode::Full => self.generate(),
            ReportMode::Minified => self.generate_minified(),
            ReportMode::Intro => self.generate_intro(),
        }
    }

    /// Full report: successes grouped by category, then errors and skips.
    ///
    /// Assembled twice: once to measure the body, once with the measured
    /// count embedded in the header. The embedding shifts the count
    /// negligibly, so one extra measurement pass is the only correction.
    pub fn generate(&self) -> (String, usize) {
        let body = self.body();
        let tokens = self.counter.count(&body);

        let report = format!("{}{}", self.header(tokens), body);
        let final_tokens = self.counter.count(&report);
        (report, final_tokens)
    }

    /// Compact single-pass variant: successes with output, original order,
    /// no grouping and no errors section.
    pub fn generate_minified(&self) -> (String, usize) {
        let mut doc = String::new();
        doc.push_str("# Hostdiag Report\n");
        doc.push_str(&format!(
            "Time:{} Platform:{}\n",
            self.generated.format("%Y-%m-%dT%H:%M"),
            self.platform_label(),
        ));

        for result in &self.results {
            if result.status == TaskStatus::Success && !result.output.is_empty() {
                doc.push_str(&format!(
                    "\n## {}\n```\n{}\n```\n",
                    result.name,
                    result.output.trim()
                ));
            }
        }

        let tokens = self.counter.count(&doc);
        (doc, tokens)
    }

    /// Intro variant: only results in the literal "intro" category, under a
    /// fixed preamble. Curated to stay small; no hard cap is enforced.
    pub fn generate_intro(&self) -> (String, usize) {
        let mut doc = String::new();
        doc.push_str("# System Context\n\n");
        doc.push_str("Use this information to understand my environment when helping me.\n\n");

        for result in &self.results {
            if result.category != "intro" {
                continue;
            }
            if result.status == TaskStatus::Success && !result.output.is_empty() {
                doc.push_str(&format!(
                    "## {}\n```\n{}\n```\n\n",
                    result.name,
                    result.output.trim()
                ));
            }
        }

        let tokens = self.counter.count(&doc);
        (doc, tokens)
    }

    fn header(&self, tokens: usize) -> String {
        let mut header = String::new();
        header.push_str("# Hostdiag Diagnostic Report\n\n");
        header.push_str(&format!(
            "Generated: {}\n",
            self.generated.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
        header.push_str(&format!("Platform: {}", self.platform_label()));
        if !self.caps.desktop.is_empty() {
            header.push_str(&format!(" ({})", self.caps.desktop));
        }
        header.push('\n');
        header.push_str(&format!("Token Count: {tokens}\n"));
        header
    }

    fn body(&self) -> String {
        let mut body = String::new();

        for (category, results) in self.group_by_category() {
            body.push_str(&format!("\n## {category}\n"));
            for result in results {
                write_success_section(&mut body, result);
            }
        }

        self.write_errors_section(&mut body);
        body
    }

    fn platform_label(&self) -> &str {
        if self.caps.distro_id.is_empty() {
            &self.caps.os
        } else {
            &self.caps.distro_id
        }
    }

    /// Group results under title-cased category labels, so "network" and
    /// "NETWORK" fold into one section. BTreeMap keeps the labels sorted.
    fn group_by_category(&self) -> BTreeMap<String, Vec<&TaskResult>> {
        let mut groups: BTreeMap<String, Vec<&TaskResult>> = BTreeMap::new();
        for result in &self.results {
            let label = if result.category.is_empty() {
                "General".to_string()
            } else {
                title_case(&result.category)
            };
            groups.entry(label).or_default().push(result);
        }
        groups
    }

    fn write_errors_section(&self, body: &mut String) {
        let failed: Vec<&TaskResult> = self
            .results
            .iter()
            .filter(|r| r.status == TaskStatus::Failed)
            .collect();
        let skipped: Vec<&TaskResult> = self
            .results
            .iter()
            .filter(|r| r.status == TaskStatus::Skipped)
            .collect();

        if failed.is_empty() && skipped.is_empty() {
            return;
        }

        body.push_str("\n## Errors & Skipped\n\n");

        for result in failed {
            let message = if result.error.is_empty() {
                "Unknown error"
            } else {
                &result.error
            };
            body.push_str(&format!("- **{}**: Failed ({message})\n", result.name));
        }

        for result in skipped {
            let reason = if result.skip_reason.is_empty() {
                "Unknown reason"
            } else {
                &result.skip_reason
            };
            body.push_str(&format!("- **{}**: Skipped ({reason})\n", result.name));
        }
    }
}

fn write_success_section(body: &mut String, result: &TaskResult) {
    if result.status != TaskStatus::Success {
        return;
    }

    body.push_str(&format!("\n### {}\n", result.name));
    body.push_str(&format!("```\n$ {}\n", result.command));
    if result.output.is_empty() {
        body.push_str("[no output]\n");
    } else {
        body.push_str(result.output.trim_end());
        body.push('\n');
    }
    body.push_str("```\n");
}

/// Capitalize the first letter of each whitespace-separated word, lowering
/// the rest, e.g. "NETWORK state" -> "Network State".
fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
