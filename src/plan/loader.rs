//! Load client plans and actual records from CSV

use super::{ActualRecord, ClientPlan, ClientProfile, PlanSettings};
use crate::error::ConfigError;
use crate::timepoint::TimePoint;
use chrono::NaiveDate;
use csv::Reader;
use std::error::Error;
use std::path::Path;

/// Raw CSV row for one client plan
#[derive(Debug, serde::Deserialize)]
struct PlanCsvRow {
    #[serde(rename = "PlanID")]
    plan_id: u32,
    #[serde(rename = "BirthDate")]
    birth_date: String,
    #[serde(rename = "LifeExpectancy")]
    life_expectancy: u8,
    #[serde(rename = "StartYear")]
    start_year: i32,
    #[serde(rename = "StartMonth")]
    start_month: u32,
    #[serde(rename = "StartingBalance")]
    starting_balance: f64,
    #[serde(rename = "MonthlyIncome")]
    monthly_income: f64,
    #[serde(rename = "MonthlyExpenses")]
    monthly_expenses: f64,
    #[serde(rename = "AnnualReturnPct")]
    annual_return_pct: f64,
    #[serde(rename = "AnnualInflationPct")]
    annual_inflation_pct: f64,
    #[serde(rename = "InflateIncome")]
    inflate_income: bool,
    #[serde(rename = "InflateExpenses")]
    inflate_expenses: bool,
    #[serde(rename = "RetirementAge")]
    retirement_age: u8,
    #[serde(rename = "RetirementIncome")]
    retirement_income: f64,
    #[serde(rename = "InflateRetirementIncome")]
    inflate_retirement_income: bool,
}

impl PlanCsvRow {
    fn to_plan(self) -> Result<ClientPlan, Box<dyn Error>> {
        if self.birth_date.trim().is_empty() {
            return Err(Box::new(ConfigError::MissingBirthDate));
        }
        let birth_date = NaiveDate::parse_from_str(&self.birth_date, "%Y-%m-%d")?;

        if !(1..=12).contains(&self.start_month) {
            return Err(format!("invalid StartMonth: {}", self.start_month).into());
        }

        let profile = ClientProfile::new(birth_date, self.life_expectancy);
        let settings = PlanSettings {
            starting_balance: self.starting_balance,
            base_monthly_income: self.monthly_income,
            base_monthly_expenses: self.monthly_expenses,
            expected_annual_return_percent: self.annual_return_pct,
            annual_inflation_percent: self.annual_inflation_pct,
            inflate_income: self.inflate_income,
            inflate_expenses: self.inflate_expenses,
            retirement_age: self.retirement_age,
            retirement_monthly_income: self.retirement_income,
            inflate_retirement_income: self.inflate_retirement_income,
        };

        Ok(ClientPlan::new(
            self.plan_id,
            profile,
            settings,
            TimePoint::new(self.start_year, self.start_month),
        ))
    }
}

/// Raw CSV row for one recorded month
#[derive(Debug, serde::Deserialize)]
struct ActualCsvRow {
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "Month")]
    month: u32,
    #[serde(rename = "StartingBalance")]
    starting_balance: f64,
    #[serde(rename = "Contribution")]
    contribution: f64,
    #[serde(rename = "ReturnRatePct")]
    return_rate_pct: f64,
    #[serde(rename = "ReturnAmount")]
    return_amount: f64,
    #[serde(rename = "EndingBalance")]
    ending_balance: f64,
    #[serde(rename = "TargetReturnPct", default)]
    target_return_pct: f64,
}

impl ActualCsvRow {
    fn to_record(self) -> Result<ActualRecord, Box<dyn Error>> {
        if !(1..=12).contains(&self.month) {
            return Err(format!("invalid Month: {}", self.month).into());
        }

        Ok(ActualRecord {
            time: TimePoint::new(self.year, self.month),
            starting_balance: self.starting_balance,
            monthly_contribution: self.contribution,
            monthly_return_rate_percent: self.return_rate_pct,
            monthly_return_amount: self.return_amount,
            ending_balance: self.ending_balance,
            target_return_rate_percent: self.target_return_pct,
        })
    }
}

/// Load all plans from a CSV file
pub fn load_plans<P: AsRef<Path>>(path: P) -> Result<Vec<ClientPlan>, Box<dyn Error>> {
    let mut reader = Reader::from_path(path)?;
    let mut plans = Vec::new();

    for result in reader.deserialize() {
        let row: PlanCsvRow = result?;
        plans.push(row.to_plan()?);
    }

    Ok(plans)
}

/// Load plans from any reader (e.g., string buffer, network stream)
pub fn load_plans_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<ClientPlan>, Box<dyn Error>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut plans = Vec::new();

    for result in csv_reader.deserialize() {
        let row: PlanCsvRow = result?;
        plans.push(row.to_plan()?);
    }

    Ok(plans)
}

/// Load one client's actual records from a CSV file
pub fn load_actuals<P: AsRef<Path>>(path: P) -> Result<Vec<ActualRecord>, Box<dyn Error>> {
    let mut reader = Reader::from_path(path)?;
    let mut records = Vec::new();

    for result in reader.deserialize() {
        let row: ActualCsvRow = result?;
        records.push(row.to_record()?);
    }

    Ok(records)
}

/// Load actual records from any reader
pub fn load_actuals_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<ActualRecord>, Box<dyn Error>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut records = Vec::new();

    for result in csv_reader.deserialize() {
        let row: ActualCsvRow = result?;
        records.push(row.to_record()?);
    }

    Ok(records)
}
