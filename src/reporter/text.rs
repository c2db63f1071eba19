//! Plain text report generator.

use crate::config::Config;
use crate::error::Result;
use crate::reporter::ReportGenerator;
use crate::rules::{Finding, RuleDefinition};
use crate::types::{ScanResult, Severity};
use colored::Colorize;
use std::fmt::Write as _;

const RULE: usize = 80;

/// Text report generator for CLI output.
pub struct TextReporter {
    /// Whether to use colors
    use_colors: bool,
}

impl TextReporter {
    /// Create a new text reporter.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            use_colors: config.output.colored,
        }
    }

    /// One line per rule, grouped by provider and service.
    #[must_use]
    pub fn rules(&self, definitions: &[&RuleDefinition]) -> String {
        let mut output = self.section("Rules");
        for definition in definitions {
            let _ = writeln!(
                output,
                "  {:<16} {:<9} {:<48} {}",
                definition.avd_id,
                self.severity(definition.severity),
                definition.long_id(),
                definition.summary
            );
        }
        let _ = writeln!(output, "\n  {} rules", definitions.len());
        output
    }
}

impl ReportGenerator for TextReporter {
    fn generate(&self, result: &ScanResult) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header());
        output.push_str(&self.format_summary(result));

        if !result.findings.is_empty() {
            output.push_str(&self.format_findings(result));
        }

        if !result.diagnostics.is_empty() {
            output.push_str(&self.format_diagnostics(result));
        }

        output.push_str(&self.format_footer(result));

        Ok(output)
    }
}

impl TextReporter {
    fn format_header(&self) -> String {
        let title = "Rampart Scan";
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));

        if self.use_colors {
            format!(
                "\n{} {}\n{}\n",
                title.bright_white().bold(),
                version.dimmed(),
                "=".repeat(RULE).bright_blue(),
            )
        } else {
            format!("\n{title} {version}\n{}\n", "=".repeat(RULE))
        }
    }

    fn section(&self, title: &str) -> String {
        let title = if self.use_colors {
            title.bright_cyan().bold().to_string()
        } else {
            title.to_string()
        };
        format!("\n{title}\n{}\n", "-".repeat(RULE))
    }

    fn format_summary(&self, result: &ScanResult) -> String {
        let mut output = self.section("Summary");

        let counts: Vec<String> = [Severity::Critical, Severity::High, Severity::Medium, Severity::Low]
            .into_iter()
            .map(|severity| {
                let count = result.findings_by_severity(severity).len();
                format!("{} {}", count, self.severity(severity))
            })
            .collect();
        let _ = writeln!(output, "  {}", counts.join(" | "));
        let _ = writeln!(
            output,
            "  {} files | {} rules evaluated | {} diagnostics",
            result.files_scanned.len(),
            result.rules_evaluated,
            result.diagnostics.len()
        );
        if result.cancelled {
            let note = "  evaluation stopped early, some rules did not run";
            let _ = writeln!(output, "{}", if self.use_colors { note.yellow().to_string() } else { note.to_string() });
        }

        output
    }

    fn format_findings(&self, result: &ScanResult) -> String {
        let mut output = self.section("Findings");

        // Critical first, evaluation order within a severity
        let mut findings: Vec<&Finding> = result.findings.iter().collect();
        findings.sort_by(|a, b| b.severity.cmp(&a.severity));

        for finding in findings {
            output.push_str(&self.format_finding(finding));
        }

        output
    }

    fn format_finding(&self, finding: &Finding) -> String {
        let mut output = format!(
            "\n  [{}] {} ({})\n",
            self.severity(finding.severity),
            finding.message,
            finding.rule
        );

        for location in finding.locations() {
            let line = if location.start_line == location.end_line {
                format!("    at {}:{}", location.file, location.start_line)
            } else {
                format!("    at {}:{}-{}", location.file, location.start_line, location.end_line)
            };
            let line = format!("{line} ({})", location.reference);
            let _ = writeln!(output, "{}", if self.use_colors { line.dimmed().to_string() } else { line });
        }

        if !finding.rule.resolution.is_empty() {
            let resolution = format!("    Resolution: {}", finding.rule.resolution);
            let _ = writeln!(
                output,
                "{}",
                if self.use_colors { resolution.green().to_string() } else { resolution }
            );
        }

        output
    }

    fn format_diagnostics(&self, result: &ScanResult) -> String {
        let mut output = self.section("Diagnostics");
        for diagnostic in &result.diagnostics {
            let line = format!("  {diagnostic}");
            let _ = writeln!(output, "{}", if self.use_colors { line.yellow().to_string() } else { line });
        }
        output
    }

    fn format_footer(&self, result: &ScanResult) -> String {
        let status = if result.has_findings_at_or_above(Severity::High) {
            if self.use_colors {
                "FAILED - High severity findings".red().bold().to_string()
            } else {
                "FAILED - High severity findings".to_string()
            }
        } else if !result.findings.is_empty() {
            if self.use_colors {
                "PASSED with findings".yellow().to_string()
            } else {
                "PASSED with findings".to_string()
            }
        } else {
            "PASSED - No issues found".to_string()
        };

        format!("\n{status}\n\n")
    }

    fn severity(&self, severity: Severity) -> String {
        let label = severity.to_string();
        if !self.use_colors {
            return label;
        }
        match severity {
            Severity::Critical => label.red().bold().to_string(),
            Severity::High => label.red().to_string(),
            Severity::Medium => label.yellow().to_string(),
            Severity::Low => label.blue().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::fixture::scan_result;

    fn plain() -> TextReporter {
        let mut config = Config::default();
        config.output.colored = false;
        TextReporter::new(&config)
    }

    #[test]
    fn test_text_report_generation() {
        let text = plain().generate(&scan_result()).unwrap();

        assert!(text.contains("Rampart Scan"));
        assert!(text.contains("0 CRITICAL | 1 HIGH | 0 MEDIUM | 1 LOW"));
        assert!(text.contains("at infra/main.tf:1-3 (aws_s3_bucket.logs)"));
        assert!(text.contains("[parse] infra/broken.tf: unexpected token"));
        assert!(text.contains("FAILED - High severity findings"));
    }

    #[test]
    fn test_findings_sorted_by_severity() {
        let text = plain().generate(&scan_result()).unwrap();
        let high = text.find("AVD-TEST-0001 violated.").unwrap();
        let low = text.find("AVD-TEST-0002 violated.").unwrap();
        assert!(high < low);
    }

    #[test]
    fn test_clean_scan() {
        let text = plain().generate(&ScanResult::default()).unwrap();
        assert!(text.contains("PASSED - No issues found"));
        assert!(!text.contains("Findings"));
    }
}
