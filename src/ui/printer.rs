use colored::*;
use std::path::{Path, PathBuf};

use crate::driver::RunManifest;
use crate::outcome::extractor::{BuildReport, SessionReport};
use crate::targets::GenerationReport;
use crate::targets::versions::VersionRanges;
use crate::ui::table::TableBuilder;

const RULE: &str = "═══════════════════════════════════════";

fn banner(title: &str) {
    println!("\n{}", RULE.green().bold());
    println!("{}", title.green().bold());
    println!("{}", RULE.green().bold());
}

pub fn print_batch_header(position: usize, total: usize, name: &str, targets: usize) {
    println!(
        "\n{} {} {}",
        format!("[{}/{}]", position, total).cyan().bold(),
        name.bold(),
        format!("({} targets)", targets).bright_black()
    );
}

pub fn print_gate_wait(running: u32, waited: u64) {
    println!(
        "{} waiting for {} parallel session(s) to finish ({})...",
        "WAIT".yellow().bold(),
        running,
        waited
    );
}

pub fn print_generation_summary(report: &GenerationReport) {
    banner("Targets Generated");
    println!("\n{}: {}", "Platform".cyan().bold(), report.platform);
    println!("{}: {}", "Fetched".cyan().bold(), report.fetched);
    println!("{}: {}", "Kept".cyan().bold(), report.kept.to_string().green().bold());

    println!("\n{}", "Files:".yellow().bold());
    for file in &report.files {
        println!("  • {}", file.display());
    }
}

pub fn print_scope_summary(path: &Path, ranges: &VersionRanges) {
    banner("Browser Versions Scoped");
    let lists = [
        ("firefox", &ranges.firefox_versions),
        ("chrome", &ranges.chrome_versions),
        ("edge", &ranges.edge_versions),
        ("safari", &ranges.safari_versions),
        ("opera", &ranges.opera_versions),
    ];
    println!();
    for (browser, versions) in lists {
        let shown = match (versions.first(), versions.last()) {
            (Some(newest), Some(oldest)) => format!("{} .. {}", newest, oldest),
            _ => "none".red().to_string(),
        };
        println!("  {} {}", format!("{:<8}", browser).cyan().bold(), shown);
    }
    println!("\n{}", format!("Written to {}", path.display()).green().dimmed());
}

pub fn print_session_report(report: &SessionReport) {
    println!("\n{}: {}", "Session".cyan().bold(), report.session_id);
    if report.record.outcomes.is_empty() {
        println!("{}", "No outcomes found in the session logs".yellow());
    } else {
        println!("{}", TableBuilder::outcomes(&report.record));
    }
    print_skipped(report.skipped);
    println!(
        "\n{}",
        format!("Check {} for a cleaner view of the output.", report.path.display())
            .green()
            .dimmed()
    );
}

pub fn print_build_summary(report: &BuildReport) {
    banner("Outcome Extraction Complete");
    println!("\n{}: {}", "Fragment".cyan().bold(), report.fragment);
    println!(
        "{}: {}/{}",
        "Sessions saved".cyan().bold(),
        report.saved.len().to_string().green().bold(),
        report.found
    );
    if !report.failed.is_empty() {
        println!(
            "{}: {}",
            "Failed".cyan().bold(),
            report.failed.len().to_string().red().bold()
        );
    }
    if report.found == 0 {
        println!(
            "\n{}",
            format!("No sessions found in builds matching {:?}", report.fragment).yellow()
        );
        return;
    }
    if !report.saved.is_empty() {
        println!("{}", TableBuilder::build_sessions(&report.saved));
    }
    print_skipped(report.saved.iter().map(|r| r.skipped).sum());
}

fn print_skipped(skipped: usize) {
    if skipped > 0 {
        println!(
            "{} {} log line(s) could not be decoded; those outcomes are missing",
            "WARN".yellow().bold(),
            skipped
        );
    }
}

pub fn print_logs_saved(paths: &[PathBuf]) {
    println!("\n{}: {}", "Logs saved".cyan().bold(), paths.len().to_string().green().bold());
    for path in paths {
        println!("  • {}", path.display());
    }
}

pub fn print_run_summary(manifest: &RunManifest, manifest_path: &Path) {
    banner("Run Complete");
    println!("\n{}: {}", "Build".cyan().bold(), manifest.build_name);
    println!("{}: {}", "Batches".cyan().bold(), manifest.batches.len());
    if let Some(point) = &manifest.resumed_from {
        println!("{}: {}", "Resumed from".cyan().bold(), point);
    }
    let elapsed = manifest.finished_at - manifest.started_at;
    println!("{}: {}s", "Duration".cyan().bold(), elapsed.num_seconds());
    println!(
        "\n{} mobile-phish save-outcome -u {}",
        "Collect outcomes with:".yellow().bold(),
        manifest.unique_token
    );
    println!("{}", format!("Manifest written to {}", manifest_path.display()).green().dimmed());
}
