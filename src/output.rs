//! Output formatting.
//!
//! Two modes: human-readable terminal output with colors, and JSON carrying
//! the wire member names for machine consumption.

use crate::error::Result;
use crate::report::{EngineStats, Recommendation, ScoreReport};
use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;

/// Serialize any report as pretty JSON.
pub fn format_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn rating_color(percent: f64) -> colored::ColoredString {
    let text = format!("{percent:.2}%");
    if percent >= 50.0 {
        text.red().bold()
    } else if percent >= 20.0 {
        text.yellow()
    } else {
        text.green()
    }
}

pub fn format_score_terminal(report: &ScoreReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Feature set score".bold());
    let _ = writeln!(out, "  features:     {}", report.features.join(", "));
    let _ = writeln!(out, "  fingerprint:  {}", report.fingerprint);
    let _ = writeln!(
        out,
        "  checks:       {} total / {} failed / {} passed",
        report.counters.totals, report.counters.fails, report.counters.success
    );
    let _ = writeln!(out, "  failure rate: {}", rating_color(report.failure_percent));
    out
}

pub fn format_recommendation_terminal(recommendation: &Recommendation) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Current feature group".bold());
    let _ = writeln!(
        out,
        "  features:     {}",
        recommendation.current_feature_group.join(", ")
    );
    let _ = writeln!(
        out,
        "  categories:   {}",
        recommendation.current_category_group.join(", ")
    );
    let _ = writeln!(
        out,
        "  checks:       {} failed / {} passed across {} resource group(s)",
        recommendation.total_fail_count,
        recommendation.total_success_count,
        recommendation.total_occurrences
    );
    let _ = writeln!(
        out,
        "  rating:       {}",
        rating_color(recommendation.security_rating)
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} (safest first)",
        "Feature groups in the same category profile".bold()
    );
    if recommendation.recommended_feature_groups.is_empty() {
        let _ = writeln!(out, "  (none observed)");
    }
    for (position, group) in recommendation.recommended_feature_groups.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>2}. {} — {} ({} of {} checks failed)",
            position + 1,
            group.features.join(", "),
            rating_color(group.failure_percent),
            group.fails,
            group.totals
        );
    }
    out
}

pub fn format_stats_terminal(stats: &EngineStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Engine snapshot".bold());
    let _ = writeln!(out, "  resource groups:         {}", stats.resource_groups);
    let _ = writeln!(out, "  feature groups:          {}", stats.feature_groups);
    let _ = writeln!(out, "  category combinations:   {}", stats.category_combinations);
    let _ = writeln!(out, "  recommendation buckets:  {}", stats.recommendation_buckets);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Counters;
    use crate::report::RecommendedGroup;

    fn sample_score() -> ScoreReport {
        ScoreReport {
            features: vec!["KeyVault".to_string()],
            fingerprint: 3_125_831,
            counters: Counters { totals: 10, fails: 3, success: 7 },
            failure_percent: 30.0,
        }
    }

    #[test]
    fn test_score_terminal_mentions_rate() {
        colored::control::set_override(false);
        let text = format_score_terminal(&sample_score());
        assert!(text.contains("30.00%"));
        assert!(text.contains("KeyVault"));
    }

    #[test]
    fn test_score_json_round_trips() {
        let json = format_json(&sample_score()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["failure_percent"], 30.0);
        assert_eq!(value["counters"]["fails"], 3);
    }

    #[test]
    fn test_recommendation_terminal_orders_groups() {
        colored::control::set_override(false);
        let recommendation = Recommendation {
            recommended_feature_groups: vec![
                RecommendedGroup {
                    features: vec!["Storage".to_string()],
                    totals: 4,
                    fails: 0,
                    success: 4,
                    failure_percent: 0.0,
                },
                RecommendedGroup {
                    features: vec!["SQLDatabase".to_string()],
                    totals: 4,
                    fails: 4,
                    success: 0,
                    failure_percent: 100.0,
                },
            ],
            current_feature_group: vec!["SQLDatabase".to_string()],
            ranking: 0,
            total_success_count: 0,
            total_fail_count: 4,
            security_rating: 100.0,
            total_occurrences: 1,
            current_category_group: vec!["Storage".to_string()],
        };
        let text = format_recommendation_terminal(&recommendation);
        let storage_at = text.find(" 1. Storage").unwrap();
        let sql_at = text.find(" 2. SQLDatabase").unwrap();
        assert!(storage_at < sql_at);
    }

    #[test]
    fn test_empty_recommendations_marked() {
        colored::control::set_override(false);
        let recommendation = Recommendation {
            recommended_feature_groups: Vec::new(),
            current_feature_group: vec!["KeyVault".to_string()],
            ranking: 0,
            total_success_count: 1,
            total_fail_count: 0,
            security_rating: 0.0,
            total_occurrences: 1,
            current_category_group: vec!["Security Infra".to_string()],
        };
        let text = format_recommendation_terminal(&recommendation);
        assert!(text.contains("(none observed)"));
    }
}
