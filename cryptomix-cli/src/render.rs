//! Plain-text rendering for terminal output.

use cryptomix_core::{Allocation, Assignment, Comparison, Profile, Scenario, ScenarioSet};

fn allocation_line(allocation: &Allocation) -> String {
    allocation
        .iter()
        .filter(|(_, v)| *v > 0.0)
        .map(|(asset, v)| format!("{asset} {v:.1}%"))
        .collect::<Vec<_>>()
        .join(" | ")
}

pub fn print_profile(profile: &Profile, variants: &[Assignment]) {
    println!("# Profile\n");
    println!("Tier:    {}", profile.tier);
    println!("Horizon: {}", profile.horizon);
    println!("\n## Allocation\n");
    for (asset, v) in profile.allocation.iter().filter(|(_, v)| *v > 0.0) {
        println!("- {:<10} {:<8} {v:>5.1}%", asset.name(), asset.symbol());
    }
    if let Some(alert) = &profile.alert {
        println!("\n! {alert}");
    }
    if !variants.is_empty() {
        println!("\n## Experiments\n");
        for a in variants {
            let note = if a.fallback.is_some() { " (fallback)" } else { "" };
            println!("- {}: {}{}", a.experiment_id, a.variant, note);
        }
    }
}

fn print_scenario(s: &Scenario) {
    let marker = if s.recommended { " [recommended]" } else { "" };
    println!("## {} ({}){}", s.name, s.id, marker);
    println!("{}", s.description);
    println!("Allocation: {}", allocation_line(&s.allocation));
    println!(
        "Return: {:.1}%-{:.1}% (avg {:.1}%) | risk {}/10 | diversification {}/10 | suitability {}/100",
        s.expected_return.min,
        s.expected_return.max,
        s.expected_return.average,
        s.risk_metrics.risk_score,
        s.risk_metrics.diversification_score,
        s.suitability_score
    );
    if let Some(data) = &s.portfolio_data {
        println!(
            "Value: ${:.2} | 24h {:+.2}%",
            data.total_value, data.weighted_change_24h
        );
    }
    for p in &s.pros {
        println!("  + {p}");
    }
    for c in &s.cons {
        println!("  - {c}");
    }
    println!();
}

pub fn print_scenarios(set: &ScenarioSet) {
    println!("# Scenarios ({})\n", set.len());
    for s in set.iter() {
        print_scenario(s);
    }
}

pub fn print_comparison(cmp: &Comparison) {
    println!("# Comparison\n");
    println!("Best return:      {}", cmp.best_return);
    println!("Lowest risk:      {}", cmp.lowest_risk);
    println!("Best suitability: {}\n", cmp.best_suitability);

    println!("{:<22} {:>8} {:>6} {:>6} {:>6}", "scenario", "avg ret", "risk", "div", "fit");
    for m in &cmp.metrics {
        println!(
            "{:<22} {:>7.1}% {:>6} {:>6} {:>6}",
            m.id, m.average_return, m.risk_score, m.diversification_score, m.suitability_score
        );
    }

    println!("\nBy risk:   {}", cmp.by_risk.join(" < "));
    println!("By return: {}", cmp.by_return.join(" > "));

    if !cmp.recommendations.is_empty() {
        println!("\n## Recommendations\n");
        for r in &cmp.recommendations {
            println!("- {}", r.reason);
        }
    }
}
