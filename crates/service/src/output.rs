//! Output formatting for command results.

use std::path::Path;

use anyhow::Error;
use colored::Colorize;
use eclipse_guardian_service::RunSummary;
use guardian_detect::{DecisionThreshold, ModelSummary, RuleHit, Verdict};
use guardian_fdir::FdirState;
use guardian_telemetry::FeatureVector;
use serde_json::json;

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format output as JSON: {e}"),
    }
}

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    print_json(&json!({
        "success": false,
        "error": {
            "message": format!("{error:#}"),
        }
    }));
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);
    for cause in error.chain().skip(1) {
        eprintln!("  {} {}", "Caused by:".yellow(), cause);
    }
}

/// Print the result of scoring one feature vector.
pub fn print_score(
    features: &FeatureVector,
    verdict: &Verdict,
    threshold: DecisionThreshold,
    rule_hit: Option<RuleHit>,
    json: bool,
) {
    if json {
        print_json(&json!({
            "success": true,
            "features": features,
            "anomaly_score": verdict.score.value,
            "mean_path_length": verdict.score.mean_path_length,
            "truncated_trees": verdict.score.truncated_trees,
            "is_anomaly": verdict.model_hit,
            "threshold": threshold.value(),
            "threshold_source": threshold.source(),
            "rule_hit": rule_hit,
        }));
        return;
    }

    println!("{}", "Result:".bold());
    println!("  Anomaly Score: {:.4}", verdict.score.value);
    let flag = if verdict.model_hit {
        "Yes".red().bold()
    } else {
        "No".green()
    };
    println!("  Is Anomaly: {flag}");
    println!(
        "  Threshold: {:.4} ({})",
        threshold.value(),
        threshold.source()
    );
    match rule_hit {
        Some(rule) => println!("  Guard rail: {}", rule.to_string().red()),
        None => println!("  Guard rail: none"),
    }
    if verdict.score.truncated_trees > 0 {
        println!(
            "  {} {} tree walks hit the depth cap",
            "Warning:".yellow(),
            verdict.score.truncated_trees
        );
    }
}

/// Print a loaded model's summary.
pub fn print_model_summary(path: &Path, summary: &ModelSummary, json: bool) {
    if json {
        print_json(&json!({
            "success": true,
            "path": path,
            "model": summary,
        }));
        return;
    }

    println!("{} {}", "Model OK:".green().bold(), path.display());
    println!("  Trees: {}", summary.num_trees);
    println!("  Nodes: {}", summary.num_nodes);
    println!("  Max samples: {}", summary.max_samples);
    println!("  Normalization c(n): {:.6}", summary.normalization);
    println!(
        "  Threshold: {:.6} ({})",
        summary.threshold, summary.threshold_source
    );
}

/// Print the totals of a finished run.
pub fn print_run_summary(summary: &RunSummary, json: bool) {
    if json {
        print_json(&json!({
            "success": true,
            "run": summary,
        }));
        return;
    }

    let state = match summary.final_state {
        FdirState::Normal => summary.final_state.to_string().green(),
        FdirState::Hold | FdirState::Verify => summary.final_state.to_string().yellow(),
        FdirState::Safe => summary.final_state.to_string().red().bold(),
    };
    println!("{}", "Run complete:".bold());
    println!(
        "  Ticks: {} ({} filling, {} anomalous)",
        summary.ticks, summary.not_ready_ticks, summary.anomalous_ticks
    );
    println!("  Final state: {state}");
    println!(
        "  Power cuts: {}  Restarts: {}  Safe entries: {}",
        summary.fdir.power_cuts, summary.fdir.soft_restarts, summary.fdir.safe_entries
    );
    println!(
        "  Missed ticks: {}  Max jitter: {} us  p99 jitter: {} us",
        summary.missed_ticks, summary.max_jitter_us, summary.p99_jitter_us
    );
}
