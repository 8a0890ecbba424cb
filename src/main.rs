//! Wealth Engine CLI
//!
//! Projects one plan and prints the yearly trajectory, with the full
//! monthly detail written to CSV.

use anyhow::{anyhow, Context};
use clap::Parser;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use wealth_engine::plan::{
    loader, ActualRecord, ClientPlan, ClientProfile, ItemKind, PaymentMode, PlanSettings,
    ScheduledItem, StageOverride,
};
use wealth_engine::projection::{ProjectionConfig, ProjectionEngine};
use wealth_engine::rates::Indicators;
use wealth_engine::TimePoint;

#[derive(Parser, Debug)]
#[command(name = "wealth_engine", version, about = "Monthly wealth projection for personal financial plans")]
struct Args {
    /// Plans CSV; omit to run the built-in sample plan
    #[arg(long)]
    plans: Option<PathBuf>,

    /// Plan id to project when loading from CSV (defaults to the first)
    #[arg(long)]
    plan_id: Option<u32>,

    /// Actuals CSV with the recorded months of the selected plan
    #[arg(long)]
    actuals: Option<PathBuf>,

    /// Scheduled goals/events JSON replacing the plan's own items
    #[arg(long)]
    items: Option<PathBuf>,

    /// Indicator CSV directory; omit to use the built-in benchmarks
    #[arg(long)]
    indicators: Option<PathBuf>,

    /// Project only up to this age
    #[arg(long)]
    limit_age: Option<u8>,

    /// Hard end month (YYYY-MM); wins over any age-derived horizon
    #[arg(long, value_parser = parse_end)]
    end: Option<TimePoint>,

    /// Project returns from this indicator instead of the plan assumption
    #[arg(long)]
    return_series: Option<String>,

    /// Output CSV for the monthly rows
    #[arg(long, default_value = "projection_output.csv")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("Wealth Engine v0.1.0");
    println!("====================\n");

    let mut plan = match &args.plans {
        Some(path) => {
            let plans = loader::load_plans(path).map_err(|e| anyhow!("{e}"))?;
            match args.plan_id {
                Some(id) => plans
                    .into_iter()
                    .find(|p| p.plan_id == id)
                    .ok_or_else(|| anyhow!("plan {} not found in {}", id, path.display()))?,
                None => plans
                    .into_iter()
                    .next()
                    .ok_or_else(|| anyhow!("no plans in {}", path.display()))?,
            }
        }
        None => sample_plan(),
    };
    if let Some(path) = &args.actuals {
        plan.actuals = loader::load_actuals(path).map_err(|e| anyhow!("{e}"))?;
    }
    if let Some(path) = &args.items {
        let file = File::open(path)
            .with_context(|| format!("unable to open {}", path.display()))?;
        plan.scheduled_items = serde_json::from_reader(file)
            .with_context(|| format!("malformed scheduled items in {}", path.display()))?;
    }

    println!("Plan: {}", plan.plan_id);
    println!("  Birth Date: {}", plan.profile.birth_date);
    println!("  Plan Start: {}", plan.start);
    println!("  Starting Balance: ${:.2}", plan.settings.starting_balance);
    println!("  Base Contribution: ${:.2}/mo", plan.settings.derived_monthly_contribution());
    println!("  Retirement: age {} (${:.2}/mo)", plan.settings.retirement_age, plan.settings.retirement_monthly_income);
    println!("  Recorded Months: {}", plan.actuals.len());
    println!("  Scheduled Items: {}", plan.scheduled_items.len());
    println!();

    let indicators = match &args.indicators {
        Some(path) => Indicators::from_csv_path(path).map_err(|e| anyhow!("{e}"))?,
        None => Indicators::default_benchmarks(),
    };

    let config = ProjectionConfig {
        limit_age: args.limit_age,
        end_override: args.end,
        return_series: args.return_series.clone(),
        ..ProjectionConfig::default()
    };

    let engine = ProjectionEngine::new(indicators, config);
    let result = engine.project(&plan)?;

    // Yearly trajectory to console
    println!("Projection Results ({} months):", result.months.len());
    println!(
        "{:>5} {:>4} {:>16} {:>16} {:>13} {:>13}  {}",
        "Year", "Age", "End Balance", "Planned", "Contribs", "Withdrawals", "Notes"
    );
    println!("{}", "-".repeat(90));

    for year in result.by_year() {
        let age = year.months.last().map_or(0, |m| m.age);
        let mut notes = Vec::new();
        if year.has_historical_data {
            notes.push("history");
        }
        if year.is_retirement_transition_year {
            notes.push("retirement");
        }
        println!(
            "{:>5} {:>4} {:>16.2} {:>16.2} {:>13.2} {:>13.2}  {}",
            year.year,
            age,
            year.end_balance(),
            year.end_planned_balance(),
            year.total_contributions(),
            year.total_withdrawals(),
            notes.join(", "),
        );
    }

    // Full monthly detail to CSV
    let mut file = File::create(&args.output)
        .with_context(|| format!("unable to create {}", args.output.display()))?;
    writeln!(
        file,
        "Year,Month,Age,Balance,PlannedBalance,Contribution,Withdrawal,ReturnAmount,ScheduledImpact,IsHistorical,IsRetirement"
    )?;
    for row in &result.months {
        writeln!(
            file,
            "{},{},{},{:.8},{:.8},{:.8},{:.8},{:.8},{:.8},{},{}",
            row.time.year,
            row.time.month,
            row.age,
            row.balance,
            row.planned_balance,
            row.contribution,
            row.withdrawal,
            row.return_amount,
            row.scheduled_cash_flow_impact,
            row.is_historical,
            row.is_retirement_month,
        )?;
    }
    println!("\nFull results written to: {}", args.output.display());

    let summary = result.summary();
    println!("\nSummary:");
    println!("  Months Projected: {}", summary.months_projected);
    println!("  Final Balance: ${:.2}", summary.final_balance);
    println!("  Final Planned Balance: ${:.2}", summary.final_planned_balance);
    println!("  Total Contributions: ${:.2}", summary.total_contributions);
    println!("  Total Withdrawals: ${:.2}", summary.total_withdrawals);
    println!("  Total Return: ${:.2}", summary.total_return);

    println!("\nKey Milestones:");
    if let Some(peak) = summary.peak_month {
        println!("  Peak Balance: ${:.2} at {}", summary.peak_balance, peak);
    }
    if let Some(retirement) = result.retirement_month {
        println!("  Retirement: {}", retirement);
    }
    match summary.depletion_month {
        Some(month) => println!("  Depletion: {} (balance goes negative)", month),
        None => println!("  Depletion: never"),
    }

    if !result.diagnostics.is_empty() {
        println!("\nDiagnostics ({}):", result.diagnostics.len());
        for diagnostic in &result.diagnostics {
            println!("  - {}", diagnostic);
        }
    }

    Ok(())
}

fn parse_end(s: &str) -> Result<TimePoint, String> {
    let (year, month) = s
        .split_once('-')
        .ok_or_else(|| format!("expected YYYY-MM, got '{s}'"))?;
    let year: i32 = year.parse().map_err(|_| format!("invalid year in '{s}'"))?;
    let month: u32 = month.parse().map_err(|_| format!("invalid month in '{s}'"))?;
    let point = TimePoint::new(year, month);
    if !point.is_valid() {
        return Err(format!("month out of range in '{s}'"));
    }
    Ok(point)
}

/// Built-in sample: mid-career saver with recorded history, a raise two
/// years in, and three scheduled goals/events.
fn sample_plan() -> ClientPlan {
    let profile = ClientProfile::new(
        chrono::NaiveDate::from_ymd_opt(1987, 9, 21).expect("valid date"),
        90,
    );
    let settings = PlanSettings {
        starting_balance: 85_000.0,
        base_monthly_income: 14_000.0,
        base_monthly_expenses: 9_500.0,
        expected_annual_return_percent: 9.0,
        annual_inflation_percent: 4.5,
        inflate_income: true,
        inflate_expenses: true,
        retirement_age: 62,
        retirement_monthly_income: 9_000.0,
        inflate_retirement_income: true,
    };

    let mut plan = ClientPlan::new(1001, profile, settings, TimePoint::new(2025, 1));

    plan.actuals = vec![
        ActualRecord {
            time: TimePoint::new(2025, 1),
            starting_balance: 85_000.0,
            monthly_contribution: 4_500.0,
            monthly_return_rate_percent: 0.91,
            monthly_return_amount: 773.50,
            ending_balance: 90_273.50,
            target_return_rate_percent: 0.72,
        },
        ActualRecord {
            time: TimePoint::new(2025, 2),
            starting_balance: 90_273.50,
            monthly_contribution: 4_500.0,
            monthly_return_rate_percent: 0.55,
            monthly_return_amount: 496.50,
            ending_balance: 95_270.00,
            target_return_rate_percent: 0.72,
        },
        ActualRecord {
            time: TimePoint::new(2025, 3),
            starting_balance: 95_270.00,
            monthly_contribution: 4_500.0,
            monthly_return_rate_percent: 1.12,
            monthly_return_amount: 1_067.02,
            ending_balance: 100_837.02,
            target_return_rate_percent: 0.72,
        },
    ];

    plan.stage_overrides = vec![StageOverride {
        effective_from: TimePoint::new(2027, 1),
        monthly_income: 16_500.0,
        monthly_expenses: 10_000.0,
        monthly_contribution: 6_500.0,
    }];

    plan.scheduled_items = vec![
        ScheduledItem {
            name: "beach house down payment".to_string(),
            kind: ItemKind::Goal,
            asset_value: -180_000.0,
            anchor: TimePoint::new(2031, 1),
            payment_mode: PaymentMode::Installment,
            installment_count: 24,
            installment_interval: 1,
            adjust_for_inflation: true,
        },
        ScheduledItem {
            name: "car upgrade".to_string(),
            kind: ItemKind::Event,
            asset_value: -65_000.0,
            anchor: TimePoint::new(2028, 6),
            payment_mode: PaymentMode::None,
            installment_count: 1,
            installment_interval: 1,
            adjust_for_inflation: false,
        },
        ScheduledItem {
            name: "apartment sale".to_string(),
            kind: ItemKind::Event,
            asset_value: 350_000.0,
            anchor: TimePoint::new(2033, 3),
            payment_mode: PaymentMode::None,
            installment_count: 1,
            installment_interval: 1,
            adjust_for_inflation: false,
        },
    ];

    plan
}
