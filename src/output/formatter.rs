//! Output formatters for console, JSON and Markdown reports

use crate::config::OutputFormat;
use crate::error::{AtsScorerError, Result};
use crate::output::report::{ScoreBand, ScoreReport};
use crate::processing::scoring::{CONTENT_WEIGHT, FORMAT_WEIGHT, KEYWORD_WEIGHT};
use colored::{Color, Colorize};
use std::path::{Path, PathBuf};

/// Trait for rendering score reports
pub trait OutputFormatter {
    fn format_report(&self, report: &ScoreReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Terminal output with optional colors
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

/// JSON formatter for scripting and API integration
pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Picks the formatter for a requested output format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, band: ScoreBand) -> String {
        let color = match band {
            ScoreBand::Excellent => Color::Green,
            ScoreBand::Good => Color::BrightGreen,
            ScoreBand::Fair => Color::Yellow,
            ScoreBand::Poor => Color::Red,
        };
        let badge = band.label().to_uppercase();

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn format_check(&self, present: bool) -> String {
        match (present, self.use_colors) {
            (true, true) => "✓".green().to_string(),
            (false, true) => "✗".red().to_string(),
            (true, false) => "[x]".to_string(),
            (false, false) => "[ ]".to_string(),
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &ScoreReport) -> Result<String> {
        let result = &report.result;
        let mut output = String::new();

        output.push_str(&self.format_header("ATS RESUME SCORE", 1));
        output.push_str(&format!(
            "Resume: {} | Generated: {} | Processing time: {}ms\n",
            report.metadata.resume_file,
            report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.metadata.processing_time_ms
        ));

        output.push_str(&self.format_header("Summary", 2));
        output.push_str(&format!(
            "Total Score: {:.2} {}\n",
            result.total_score,
            self.format_score_badge(report.band)
        ));

        output.push_str(&self.format_header("Score Breakdown", 3));
        output.push_str(&format!(
            "Content:  {}/50 (weight: {:.0}%)\n",
            result.content_score,
            CONTENT_WEIGHT * 100.0
        ));
        output.push_str(&format!(
            "Format:   {}/100 (weight: {:.0}%)\n",
            result.format_score,
            FORMAT_WEIGHT * 100.0
        ));
        output.push_str(&format!(
            "Keywords: {:.1}/100 (weight: {:.0}%)\n",
            result.keyword_score,
            KEYWORD_WEIGHT * 100.0
        ));

        if report.metadata.job_description_provided {
            output.push_str(&self.format_header("Matched Keywords", 3));
            if result.matched_keywords.is_empty() {
                output.push_str(&self.colorize("None of the job's technical keywords were found\n", Color::Yellow));
            } else {
                output.push_str(&format!("{}\n", self.colorize(&result.matched_keywords.join(", "), Color::Green)));
            }
        }

        output.push_str(&self.format_header("Format Issues", 3));
        if result.format_issues.is_empty() {
            output.push_str(&self.colorize("No formatting issues found\n", Color::Green));
        } else {
            for issue in &result.format_issues {
                output.push_str(&format!("  • {}\n", self.colorize(issue, Color::Red)));
            }
        }

        if !result.missing_features.is_empty() {
            output.push_str(&self.format_header("Missing Features", 3));
            for feature in &result.missing_features {
                output.push_str(&format!("  • {}\n", feature));
            }
        }

        if let (true, Some(details)) = (self.detailed, &report.details) {
            output.push_str(&self.format_header("Feature Checklist", 2));
            for (feature, present) in details.features.iter() {
                output.push_str(&format!("  {} {}\n", self.format_check(present), feature.display_name()));
            }

            output.push_str(&self.format_header("Layout", 2));
            output.push_str(&format!("Pages: {}\n", details.layout.pages));
            output.push_str(&format!("Words: {}\n", details.word_count));
            output.push_str(&format!("Text blocks: {}\n", details.layout.blocks));
            output.push_str(&format!("Images: {}\n", details.layout.images));
            output.push_str(&format!("Pages with tables: {}\n", details.layout.pages_with_tables));
            output.push_str(&format!(
                "Fonts ({}): {}\n",
                details.layout.fonts.len(),
                details.layout.fonts.join(", ")
            ));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &ScoreReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn markdown_score_badge(band: ScoreBand) -> &'static str {
        match band {
            ScoreBand::Excellent => "🟢 Excellent",
            ScoreBand::Good => "🟡 Good",
            ScoreBand::Fair => "🟠 Fair",
            ScoreBand::Poor => "🔴 Poor",
        }
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &ScoreReport) -> Result<String> {
        let result = &report.result;
        let mut output = String::new();

        output.push_str("# ATS Resume Score\n\n");

        if self.include_metadata {
            let resume_name = Path::new(&report.metadata.resume_file)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| report.metadata.resume_file.clone());
            output.push_str(&format!(
                "**Generated:** {} | **Processing Time:** {}ms\n",
                report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                report.metadata.processing_time_ms
            ));
            output.push_str(&format!("**Resume:** `{}`\n\n", resume_name));
        }

        output.push_str(&format!(
            "**Total Score:** {:.2} {}\n\n",
            result.total_score,
            Self::markdown_score_badge(report.band)
        ));

        output.push_str("## Score Breakdown\n\n");
        output.push_str("| Component | Score | Weight |\n");
        output.push_str("|-----------|-------|--------|\n");
        output.push_str(&format!("| Content | {}/50 | {:.0}% |\n", result.content_score, CONTENT_WEIGHT * 100.0));
        output.push_str(&format!("| Format | {}/100 | {:.0}% |\n", result.format_score, FORMAT_WEIGHT * 100.0));
        output.push_str(&format!(
            "| Keywords | {:.1}/100 | {:.0}% |\n\n",
            result.keyword_score,
            KEYWORD_WEIGHT * 100.0
        ));

        if report.metadata.job_description_provided {
            output.push_str("## Matched Keywords\n\n");
            if result.matched_keywords.is_empty() {
                output.push_str("_None_\n\n");
            } else {
                let keywords: Vec<String> = result.matched_keywords.iter().map(|k| format!("`{}`", k)).collect();
                output.push_str(&format!("{}\n\n", keywords.join(", ")));
            }
        }

        output.push_str("## Format Issues\n\n");
        if result.format_issues.is_empty() {
            output.push_str("No formatting issues found.\n\n");
        } else {
            for issue in &result.format_issues {
                output.push_str(&format!("- {}\n", issue));
            }
            output.push('\n');
        }

        if !result.missing_features.is_empty() {
            output.push_str("## Missing Features\n\n");
            for feature in &result.missing_features {
                output.push_str(&format!("- {}\n", feature));
            }
            output.push('\n');
        }

        if let Some(details) = &report.details {
            output.push_str("## Feature Checklist\n\n");
            for (feature, present) in details.features.iter() {
                let mark = if present { "x" } else { " " };
                output.push_str(&format!("- [{}] {}\n", mark, feature.display_name()));
            }

            output.push_str("\n## Layout\n\n");
            output.push_str("| Pages | Words | Blocks | Images | Pages with tables | Fonts |\n");
            output.push_str("|-------|-------|--------|--------|-------------------|-------|\n");
            output.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                details.layout.pages,
                details.word_count,
                details.layout.blocks,
                details.layout.images,
                details.layout.pages_with_tables,
                details.layout.fonts.join(", ")
            ));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(true, false),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(true),
        }
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool, include_metadata: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
        }
    }

    pub fn generate_report(&self, report: &ScoreReport, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content).map_err(|e| {
        AtsScorerError::OutputFormatting(format!("Failed to save report to '{}': {}", file_path.display(), e))
    })
}

/// Where a saved report goes: a directory gets a suggested file name inside it
pub fn report_destination(save: &Path, format: &OutputFormat, resume_name: &str) -> PathBuf {
    if save.is_dir() {
        save.join(suggest_filename(format, resume_name, true))
    } else {
        save.to_path_buf()
    }
}

pub fn suggest_filename(format: &OutputFormat, resume_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(resume_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    match format {
        OutputFormat::Console => format!("{}_ats_score{}.txt", base_name, timestamp_suffix),
        OutputFormat::Json => format!("{}_ats_score{}.json", base_name, timestamp_suffix),
        OutputFormat::Markdown => format!("{}_ats_score{}.md", base_name, timestamp_suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::report::tests::sample_analysis;
    use tempfile::TempDir;

    fn report(detailed: bool) -> ScoreReport {
        ScoreReport::from_analysis(sample_analysis(), "/tmp/jane_doe.pdf", true, detailed)
    }

    #[test]
    fn test_console_plain_output() {
        let output = ConsoleFormatter::new(false, false).format_report(&report(false)).unwrap();

        assert!(output.contains("Total Score: 49.50 [POOR]"));
        assert!(output.contains("Content:  45/50 (weight: 40%)"));
        assert!(output.contains("  • Too many fonts used (recommend 1-2)"));
        assert!(output.contains("python"));
        assert!(!output.contains("Feature Checklist"));
        assert!(!output.contains('\u{1b}'));
    }

    #[test]
    fn test_console_detailed_output() {
        let output = ConsoleFormatter::new(false, true).format_report(&report(true)).unwrap();

        assert!(output.contains("Feature Checklist"));
        assert!(output.contains("[x] Email"));
        assert!(output.contains("[ ] Projects"));
        assert!(output.contains("Fonts (2): Arial, Georgia"));
    }

    #[test]
    fn test_json_uses_result_field_names() {
        let compact = JsonFormatter::new(false).format_report(&report(false)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&compact).unwrap();

        assert_eq!(value["total_score"], 49.5);
        assert_eq!(value["keyword_score"], 50.0);
        assert_eq!(value["matched_keywords"][0], "python");
        assert!(!compact.contains('\n'));

        let pretty = JsonFormatter::new(true).format_report(&report(true)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&pretty).unwrap();
        assert_eq!(value["details"]["features"]["email"], true);
        assert_eq!(value["details"]["features"]["has_projects"], false);
    }

    #[test]
    fn test_markdown_output() {
        let output = MarkdownFormatter::new(true).format_report(&report(true)).unwrap();

        assert!(output.starts_with("# ATS Resume Score"));
        assert!(output.contains("**Resume:** `jane_doe.pdf`"));
        assert!(output.contains("| Format | 55/100 | 30% |"));
        assert!(output.contains("- Resume too short (< 200 words)"));
        assert!(output.contains("- [ ] Metrics"));
    }

    #[test]
    fn test_generator_dispatch() {
        let generator = ReportGenerator::with_options(false, false, true, false);
        let markdown = generator.generate_report(&report(false), &OutputFormat::Markdown).unwrap();
        assert!(!markdown.contains("**Generated:**"));

        assert_eq!(JsonFormatter::new(true).supports_format(), OutputFormat::Json);
        assert_eq!(ConsoleFormatter::new(true, true).supports_format(), OutputFormat::Console);
    }

    #[test]
    fn test_save_report_creates_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reports/nested/score.md");

        save_report_to_file("# report", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# report");
    }

    #[test]
    fn test_suggest_filename() {
        assert_eq!(suggest_filename(&OutputFormat::Json, "cv/jane.pdf", false), "jane_ats_score.json");
        assert_eq!(suggest_filename(&OutputFormat::Markdown, "jane.pdf", false), "jane_ats_score.md");
        assert!(suggest_filename(&OutputFormat::Console, "jane.pdf", true).starts_with("jane_ats_score_"));
    }

    #[test]
    fn test_report_destination_names_file_inside_directory() {
        let dir = TempDir::new().unwrap();

        let inside = report_destination(dir.path(), &OutputFormat::Json, "cv/jane.pdf");
        assert_eq!(inside.parent(), Some(dir.path()));
        let name = inside.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("jane_ats_score_") && name.ends_with(".json"), "{}", name);

        let explicit = dir.path().join("score.md");
        assert_eq!(report_destination(&explicit, &OutputFormat::Markdown, "jane.pdf"), explicit);
    }
}
