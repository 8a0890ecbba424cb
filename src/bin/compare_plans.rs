//! Compare a base plan against a revised plan, year by year
//!
//! Usage: compare_plans [plans.csv base_id revised_id]
//! With no arguments a built-in pair is compared.

use std::env;
use std::fs::File;
use std::io::Write;
use wealth_engine::plan::{loader, ClientPlan, ClientProfile, PlanSettings};
use wealth_engine::projection::ProjectionConfig;
use wealth_engine::{ScenarioRunner, TimePoint};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let (base, revised) = if args.len() >= 4 {
        let plans = loader::load_plans(&args[1]).expect("Failed to load plans");
        let base_id: u32 = args[2].parse().expect("base plan id must be a number");
        let revised_id: u32 = args[3].parse().expect("revised plan id must be a number");
        let find = |id: u32| -> ClientPlan {
            plans
                .iter()
                .find(|p| p.plan_id == id)
                .unwrap_or_else(|| panic!("plan {} not found in {}", id, args[1]))
                .clone()
        };
        (find(base_id), find(revised_id))
    } else {
        sample_pair()
    };

    println!(
        "Comparing plan {} (base) against plan {} (revised)",
        base.plan_id, revised.plan_id
    );
    println!(
        "  Base:    retire at {}, ${:.0}/mo contribution",
        base.settings.retirement_age,
        base.settings.derived_monthly_contribution()
    );
    println!(
        "  Revised: retire at {}, ${:.0}/mo contribution",
        revised.settings.retirement_age,
        revised.settings.derived_monthly_contribution()
    );

    let runner = ScenarioRunner::new();
    let comparison = runner
        .compare(&base, &revised, ProjectionConfig::default())
        .expect("projection failed");

    let base_retirement = comparison.base.retirement_month;
    let revised_retirement = comparison.revised.retirement_month;

    println!("\n{:>5} {:>16} {:>16} {:>14}  {}", "Year", "Base", "Revised", "Delta", "Notes");
    println!("{}", "-".repeat(72));
    for delta in comparison.yearly_deltas() {
        let mut notes = Vec::new();
        if base_retirement.map_or(false, |m| m.year == delta.year) {
            notes.push("base retires");
        }
        if revised_retirement.map_or(false, |m| m.year == delta.year) {
            notes.push("revised retires");
        }
        println!(
            "{:>5} {:>16.2} {:>16.2} {:>14.2}  {}",
            delta.year,
            delta.base_end_balance,
            delta.revised_end_balance,
            delta.delta,
            notes.join(", "),
        );
    }

    println!("\nFinal balance delta: ${:.2}", comparison.final_balance_delta());

    let base_summary = comparison.base.summary();
    let revised_summary = comparison.revised.summary();
    let describe = |label: &str, month: Option<TimePoint>| match month {
        Some(m) => println!("  {} depletes at {}", label, m),
        None => println!("  {} never depletes", label),
    };
    describe("Base", base_summary.depletion_month);
    describe("Revised", revised_summary.depletion_month);

    let output_path = "plan_comparison.csv";
    let mut file = File::create(output_path).expect("Failed to create output file");
    writeln!(file, "Year,BaseEndBalance,RevisedEndBalance,Delta").unwrap();
    for delta in comparison.yearly_deltas() {
        writeln!(
            file,
            "{},{:.2},{:.2},{:.2}",
            delta.year, delta.base_end_balance, delta.revised_end_balance, delta.delta
        )
        .unwrap();
    }
    println!("\nComparison written to {}", output_path);
}

/// Built-in pair: the revision trims expenses and retires three years
/// later on a higher pension.
fn sample_pair() -> (ClientPlan, ClientPlan) {
    let profile = ClientProfile::new(
        chrono::NaiveDate::from_ymd_opt(1983, 4, 2).expect("valid date"),
        92,
    );
    let settings = PlanSettings {
        starting_balance: 120_000.0,
        base_monthly_income: 15_000.0,
        base_monthly_expenses: 11_000.0,
        expected_annual_return_percent: 8.5,
        annual_inflation_percent: 4.5,
        inflate_income: true,
        inflate_expenses: true,
        retirement_age: 60,
        retirement_monthly_income: 10_000.0,
        inflate_retirement_income: true,
    };

    let base = ClientPlan::new(1, profile, settings, TimePoint::new(2025, 1));

    let mut revised = base.clone();
    revised.plan_id = 2;
    revised.settings.base_monthly_expenses = 10_000.0;
    revised.settings.retirement_age = 63;
    revised.settings.retirement_monthly_income = 11_000.0;

    (base, revised)
}
