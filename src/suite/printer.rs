use std::path::Path;

use colored::{Color, Colorize};
use url::Url;

use crate::config::Environment;

use super::{
    diagnostics::{KeyStatus, ProbeOutcome, ProbeResult},
    runner::{PlannedScenario, ScenarioResult, SuiteReport, Verdict},
};

/// One result rendered as a line, with mismatch details on the lines below.
pub fn render_result(result: &ScenarioResult) -> String {
    let badge = match &result.verdict {
        Verdict::Passed => "PASS".green().bold(),
        Verdict::Failed(_) => "FAIL".red().bold(),
        Verdict::Errored(_) => "ERR ".yellow().bold(),
    };

    let mut details = Vec::new();
    if let Some(status) = result.status {
        details.push(status.to_string().color(status_color(status)).to_string());
    }
    if let Some(duration_ms) = result.duration_ms {
        details.push(format!("{duration_ms} ms"));
    }
    if result.attempts > 1 {
        details.push(format!("{} attempts", result.attempts));
    }
    let details = if details.is_empty() {
        String::new()
    } else {
        format!(" {}", format!("({})", details.join(", ")).dimmed())
    };

    let mut line = format!(
        "{} {} {} {}{}",
        badge,
        result.environment.as_str().dimmed(),
        result.endpoint.cyan(),
        result.scenario,
        details
    );

    match &result.verdict {
        Verdict::Passed => {}
        Verdict::Failed(mismatches) => {
            for mismatch in mismatches {
                line.push_str(&format!("\n    {}", mismatch.to_string().red()));
            }
        }
        Verdict::Errored(message) => line.push_str(&format!("\n    {}", message.yellow())),
    }
    if let Some(path) = &result.artifact {
        line.push_str(&format!("\n    {} {}", "Body:".bold(), format_artifact_link(path)));
    }
    line
}

pub fn print_summary(report: &SuiteReport) {
    println!();
    println!(
        "{} {}",
        "Run".bold(),
        report.run_id.to_string().dimmed()
    );
    for (environment, tally) in report.by_environment() {
        println!(
            "  {:<11} {} passed, {} failed, {} errored",
            environment.as_str().bold(),
            tally.passed.to_string().green(),
            tally.failed.to_string().color(if tally.failed > 0 {
                Color::Red
            } else {
                Color::White
            }),
            tally.errored.to_string().color(if tally.errored > 0 {
                Color::Yellow
            } else {
                Color::White
            }),
        );
    }

    let totals = report.totals();
    let elapsed = chrono::Utc::now() - report.started_at;
    let verdict = if report.is_success() {
        "OK".green().bold()
    } else {
        "FAILED".red().bold()
    };
    println!(
        "{} {} of {} scenarios passed {}",
        verdict,
        totals.passed,
        totals.total(),
        format!("({:.1} s)", elapsed.num_milliseconds() as f64 / 1000.0).dimmed()
    );
}

/// Scenario table for `--list`; nothing is dispatched.
pub fn print_plan(environments: &[Environment], planned: &[PlannedScenario<'_>]) {
    let names = environments
        .iter()
        .map(Environment::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    println!("{} {}", "Environments:".bold(), names);
    for PlannedScenario { endpoint, scenario } in planned {
        println!(
            "  {:<8} {:<4} {:<26} {}",
            scenario.intent.as_str().dimmed(),
            endpoint.method.as_str(),
            endpoint.name.cyan(),
            scenario.name
        );
    }
    println!("{} scenarios", planned.len());
}

pub fn print_diagnostics(keys: &[KeyStatus], probes: &[ProbeResult]) {
    println!("{}", "Configuration".bold());
    for status in keys {
        match &status.display {
            Some(value) => println!("  {:<18} {}", status.key, value.green()),
            None => println!("  {:<18} {}", status.key, "Missing".red()),
        }
    }

    println!("{}", "Connectivity".bold());
    for probe in probes {
        let target = probe.base_url.as_deref().unwrap_or("<unset>");
        let outcome = match &probe.outcome {
            ProbeOutcome::NotConfigured => "not configured".yellow().to_string(),
            ProbeOutcome::Responded {
                status,
                duration_ms,
            } => format!(
                "{} {}",
                status.to_string().color(status_color(*status)),
                format!("({duration_ms} ms)").dimmed()
            ),
            ProbeOutcome::Unreachable(message) => message.red().to_string(),
        };
        println!(
            "  {:<11} {} {}",
            probe.environment.as_str(),
            target.cyan(),
            outcome
        );
    }
}

fn status_color(status: u16) -> Color {
    if status >= 400 {
        Color::Red
    } else if status >= 300 {
        Color::Yellow
    } else {
        Color::Green
    }
}

fn format_artifact_link(path: &Path) -> String {
    let display = path.to_string_lossy();
    match Url::from_file_path(path) {
        Ok(url) => format!("\x1b]8;;{}\x1b\\{}\x1b]8;;\x1b\\", url, display.cyan()),
        Err(_) => display.cyan().to_string(),
    }
}
