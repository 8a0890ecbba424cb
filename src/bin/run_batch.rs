//! Run projections for a whole block of plans from a CSV
//!
//! Outputs one summary row per plan plus monthly totals across the block.

use std::collections::BTreeMap;
use std::env;
use std::fs::File;
use std::io::Write;
use std::time::Instant;
use wealth_engine::plan::loader;
use wealth_engine::projection::{ProjectionConfig, ProjectionResult};
use wealth_engine::{ScenarioRunner, TimePoint};

/// Monthly totals across every plan in the block
#[derive(Debug, Clone, Default)]
struct AggregatedRow {
    plans: u32,
    total_balance: f64,
    total_planned: f64,
    total_contributions: f64,
    total_withdrawals: f64,
    total_return: f64,
    total_scheduled_impact: f64,
}

fn main() {
    env_logger::init();

    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "data/plans.csv".to_string());

    let start = Instant::now();
    println!("Loading plans from {}...", path);
    let plans = loader::load_plans(&path).expect("Failed to load plans");
    println!("Loaded {} plans in {:?}", plans.len(), start.elapsed());

    let runner = ScenarioRunner::new();
    let config = ProjectionConfig::default();

    println!("Running projections...");
    let proj_start = Instant::now();
    let outcomes = runner.run_batch(&plans, config);
    println!("Projections complete in {:?}", proj_start.elapsed());

    let mut results: Vec<ProjectionResult> = Vec::with_capacity(outcomes.len());
    let mut failures = 0u32;
    for (plan, outcome) in plans.iter().zip(outcomes) {
        match outcome {
            Ok(result) => results.push(result),
            Err(err) => {
                eprintln!("plan {} failed: {}", plan.plan_id, err);
                failures += 1;
            }
        }
    }

    // Aggregate by calendar month across the block
    let mut aggregated: BTreeMap<i32, AggregatedRow> = BTreeMap::new();
    for result in &results {
        for row in &result.months {
            let agg = aggregated.entry(row.time.index()).or_default();
            agg.plans += 1;
            agg.total_balance += row.balance;
            agg.total_planned += row.planned_balance;
            agg.total_contributions += row.contribution;
            agg.total_withdrawals += row.withdrawal;
            agg.total_return += row.return_amount;
            agg.total_scheduled_impact += row.scheduled_cash_flow_impact;
        }
    }

    // Per-plan summaries
    let summary_path = "batch_summary.csv";
    let mut file = File::create(summary_path).expect("Failed to create output file");
    writeln!(file, "PlanID,MonthsProjected,FinalBalance,PeakBalance,PeakMonth,TotalContributions,TotalWithdrawals,TotalReturn,DepletionMonth").unwrap();
    for result in &results {
        let summary = result.summary();
        writeln!(
            file,
            "{},{},{:.2},{:.2},{},{:.2},{:.2},{:.2},{}",
            summary.plan_id,
            summary.months_projected,
            summary.final_balance,
            summary.peak_balance,
            summary.peak_month.map_or(String::new(), |m| m.to_string()),
            summary.total_contributions,
            summary.total_withdrawals,
            summary.total_return,
            summary.depletion_month.map_or(String::new(), |m| m.to_string()),
        )
        .unwrap();
    }
    println!("Plan summaries written to {}", summary_path);

    // Monthly totals
    let monthly_path = "batch_by_month.csv";
    let mut file = File::create(monthly_path).expect("Failed to create output file");
    writeln!(file, "Year,Month,Plans,TotalBalance,TotalPlanned,TotalContributions,TotalWithdrawals,TotalReturn,TotalScheduledImpact").unwrap();
    for (&index, agg) in &aggregated {
        let time = TimePoint::from_index(index);
        writeln!(
            file,
            "{},{},{},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}",
            time.year,
            time.month,
            agg.plans,
            agg.total_balance,
            agg.total_planned,
            agg.total_contributions,
            agg.total_withdrawals,
            agg.total_return,
            agg.total_scheduled_impact,
        )
        .unwrap();
    }
    println!("Monthly totals written to {}", monthly_path);

    println!("\nBlock Summary:");
    println!("  Plans projected: {} ({} failed)", results.len(), failures);
    if let Some((&index, agg)) = aggregated.iter().next() {
        println!(
            "  {}: Plans={}, Balance=${:.0}",
            TimePoint::from_index(index),
            agg.plans,
            agg.total_balance
        );
    }
    if let Some((&index, agg)) = aggregated.iter().next_back() {
        println!(
            "  {}: Plans={}, Balance=${:.0}",
            TimePoint::from_index(index),
            agg.plans,
            agg.total_balance
        );
    }
    let combined_final: f64 = results.iter().map(|r| r.summary().final_balance).sum();
    println!("  Combined final balance: ${:.2}", combined_final);
    let depleting = results
        .iter()
        .filter(|r| r.summary().depletion_month.is_some())
        .count();
    println!("  Plans that deplete: {}", depleting);

    println!("\nTotal time: {:?}", start.elapsed());
}
