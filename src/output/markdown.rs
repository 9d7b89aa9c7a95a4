//! Markdown rendering
//!
//! This module renders conversation transcripts and the end-of-run summary.

use crate::conversation::Conversation;
use crate::crawler::RunReport;
use crate::output::traits::SinkResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Renders a conversation as Markdown
///
/// Each turn becomes a `### User` / `### Assistant` heading followed by the
/// turn text.
pub fn format_conversation(conversation: &Conversation) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(conversation.turns.len() * 3);
    for turn in &conversation.turns {
        lines.push(format!("### {}\n", turn.role.label()));
        lines.push(turn.text.clone());
        lines.push(String::new());
    }
    lines.join("\n")
}

/// Writes a run summary as Markdown
///
/// # Arguments
///
/// * `report` - The final run counters
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(SinkError)` - Failed to write summary
pub fn generate_markdown_summary(report: &RunReport, output_path: &Path) -> SinkResult<()> {
    let markdown = format_markdown_summary(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run summary as markdown
pub fn format_markdown_summary(report: &RunReport) -> String {
    let mut md = String::new();

    md.push_str("# Convo-Archiver Run Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Mode**: {}\n", report.mode));
    md.push_str(&format!("- **Attempted**: {}\n", report.attempted()));
    md.push_str(&format!("- **Exported**: {}\n", report.exported()));
    md.push_str(&format!("- **Skipped**: {}\n", report.skipped()));
    md.push_str(&format!("- **Failed**: {}\n", report.failed()));
    md.push_str(&format!("- **Unique Conversations Seen**: {}\n\n", report.seen));

    md.push_str("## Phases\n\n");
    md.push_str("| Scope | Discovered | Attempted | Exported | Skipped | Failed |\n");
    md.push_str("|-------|------------|-----------|----------|---------|--------|\n");
    for phase in &report.phases {
        if phase.navigation_failed {
            md.push_str(&format!(
                "| {} | not reachable | 0 | 0 | 0 | 0 |\n",
                phase.scope
            ));
        } else {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                phase.scope,
                phase.discovered,
                phase.attempted,
                phase.exported,
                phase.skipped,
                phase.failed
            ));
        }
    }
    md.push('\n');

    let unreachable = report.unreachable_scopes();
    if !unreachable.is_empty() {
        md.push_str("## Unreachable Scopes\n\n");
        for scope in unreachable {
            md.push_str(&format!("- {}\n", scope));
        }
        md.push('\n');
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{ConversationTurn, Role, Scope};
    use crate::crawler::PhaseReport;
    use crate::state::ItemOutcome;

    #[test]
    fn test_format_conversation() {
        let conversation = Conversation::new(
            "Greeting",
            vec![
                ConversationTurn::new(Role::User, "hi"),
                ConversationTurn::new(Role::Assistant, "hello"),
            ],
            Scope::Root,
        );

        assert_eq!(
            format_conversation(&conversation),
            "### User\n\nhi\n\n### Assistant\n\nhello\n"
        );
    }

    fn create_test_report() -> RunReport {
        let mut root = PhaseReport::new(Scope::Root);
        root.discovered = 3;
        root.record(ItemOutcome::Exported);
        root.record(ItemOutcome::Failed);
        root.record(ItemOutcome::Exported);

        let mut report = RunReport::new("all");
        report.phases.push(root);
        report
            .phases
            .push(PhaseReport::navigation_failed(Scope::Named("Archive".into())));
        report.seen = 2;
        report
    }

    #[test]
    fn test_format_markdown_summary() {
        let markdown = format_markdown_summary(&create_test_report());

        assert!(markdown.contains("# Convo-Archiver Run Summary"));
        assert!(markdown.contains("- **Attempted**: 3"));
        assert!(markdown.contains("- **Exported**: 2"));
        assert!(markdown.contains("- **Skipped**: 1"));
        assert!(markdown.contains("| root | 3 | 3 | 2 | 1 | 1 |"));
        assert!(markdown.contains("| project 'Archive' | not reachable |"));
        assert!(markdown.contains("## Unreachable Scopes"));
    }

    #[test]
    fn test_generate_markdown_summary_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.md");
        generate_markdown_summary(&create_test_report(), &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Convo-Archiver Run Summary"));
    }
}
