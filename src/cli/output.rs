//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying reconciliation
//! reports to the user in various formats.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::config::ValidationResult;
use crate::reconciler::{ApplyReport, PlanReport, ResourceAction, StatusReport};

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Plan step row for table display.
#[derive(Tabled)]
struct PlanStepRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Command")]
    command: String,
}

/// Resource status row for table display.
#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Drift")]
    drift: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a validation result for display.
    #[must_use]
    pub fn format_validation(&self, result: &ValidationResult, show_warnings: bool) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
                "valid": result.errors.is_empty(),
                "warnings": result.warnings,
            }))
            .unwrap_or_default(),
            OutputFormat::Text => {
                let mut output = format!("{} Configuration is valid.\n", "✓".green());
                if show_warnings && !result.warnings.is_empty() {
                    let _ = write!(output, "\n{} Warnings:\n", "⚠".yellow());
                    for warning in &result.warnings {
                        let _ = writeln!(output, "   - {warning}");
                    }
                }
                output
            }
        }
    }

    /// Formats a dry-run plan for display.
    #[must_use]
    pub fn format_plan(&self, plan: &PlanReport, detailed: bool) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(plan).unwrap_or_default(),
            OutputFormat::Text => Self::format_plan_text(plan, detailed),
        }
    }

    fn format_plan_text(plan: &PlanReport, detailed: bool) -> String {
        if plan.is_converged() {
            return format!(
                "{} No changes required - the server matches the desired state.\n",
                "✓".green()
            );
        }

        let mut output = String::from("\nReconciliation plan\n\n");

        let mut index = 0;
        let mut rows = Vec::new();
        for entry in &plan.entries {
            for step in &entry.steps {
                index += 1;
                rows.push(PlanStepRow {
                    index,
                    resource: format!("{} {}", entry.kind, entry.name),
                    command: Self::truncate(&step.command, 72),
                });
            }
        }

        let table = Table::new(rows).to_string();
        output.push_str(&table);
        output.push('\n');

        if detailed {
            output.push_str("\nReasons:\n");
            for entry in &plan.entries {
                for step in &entry.steps {
                    let _ = writeln!(output, "   {} {} - {}", entry.kind, entry.name, step.reason);
                }
            }
        }

        let _ = write!(
            output,
            "\nPlan: {} command(s) across {} resource(s)\n",
            plan.total_steps().to_string().yellow(),
            plan.entries.iter().filter(|e| !e.steps.is_empty()).count()
        );

        output
    }

    /// Formats an apply report for display.
    #[must_use]
    pub fn format_apply(&self, report: &ApplyReport) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Text => {
                let status = if report.success() {
                    format!("{} Reconciliation successful", "✓".green())
                } else {
                    format!("{} Reconciliation failed", "✗".red())
                };

                let mut output = format!("{status}\n\n");
                let _ = writeln!(output, "   Created: {}", report.count(ResourceAction::Created));
                let _ = writeln!(output, "   Updated: {}", report.count(ResourceAction::Updated));
                let _ = writeln!(output, "   Removed: {}", report.count(ResourceAction::Removed));
                let _ = writeln!(
                    output,
                    "   Unchanged: {}",
                    report.count(ResourceAction::Unchanged)
                );

                let failures: Vec<_> = report
                    .results
                    .iter()
                    .filter(|r| r.action == ResourceAction::Failed)
                    .collect();
                if !failures.is_empty() {
                    let _ = write!(output, "\n{} Failures:\n", "⚠".yellow());
                    for failure in failures {
                        let _ = writeln!(
                            output,
                            "   - {} {}: {}",
                            failure.kind,
                            failure.name,
                            failure.error.as_deref().unwrap_or("unknown error")
                        );
                    }
                }

                output
            }
        }
    }

    /// Formats a status report for display.
    #[must_use]
    pub fn format_status(&self, report: &StatusReport) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Text => {
                if report.rows.is_empty() {
                    return String::from("No resources configured.\n");
                }

                let rows: Vec<StatusRow> = report
                    .rows
                    .iter()
                    .map(|r| StatusRow {
                        kind: r.kind.clone(),
                        name: r.name.clone(),
                        state: if r.exists {
                            "present".green().to_string()
                        } else {
                            "absent".red().to_string()
                        },
                        drift: if r.pending_steps == 0 {
                            "in sync".green().to_string()
                        } else {
                            format!("{} command(s)", r.pending_steps)
                                .yellow()
                                .to_string()
                        },
                    })
                    .collect();

                let mut output = String::from("\n");
                output.push_str(&Table::new(rows).to_string());
                output.push('\n');

                let drifted = report.drifted();
                let summary = if drifted == 0 {
                    format!("{} All {} resource(s) in sync.", "✓".green(), report.rows.len())
                } else {
                    format!(
                        "{} {drifted}/{} resource(s) have drifted.",
                        "⚠".yellow(),
                        report.rows.len()
                    )
                };
                let _ = write!(output, "\n{summary}\n");

                output
            }
        }
    }

    /// Truncates a string to at most `max_len` bytes, ellipsis included.
    ///
    /// Rendered commands embed user-chosen names (logger categories, JNDI
    /// names, file paths), so the cut must land on a char boundary.
    fn truncate(s: &str, max_len: usize) -> String {
        if s.len() <= max_len {
            return s.to_string();
        }
        let mut cut = max_len.saturating_sub(3);
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...", &s[..cut])
    }
}
