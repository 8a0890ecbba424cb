//! AWS Lambda handler for running wealth projections
//!
//! Accepts a batch of client plans via JSON and returns per-plan summaries,
//! diagnostics and (optionally) the full monthly rows.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde::{Deserialize, Serialize};
use wealth_engine::{
    error::Diagnostic,
    plan::ClientPlan,
    projection::{ProjectionConfig, ProjectionMonth, ProjectionSummary},
    rates::{Indicators, RatePoint, RateSeries, SeriesUnit},
    scenario::ScenarioRunner,
    timepoint::TimePoint,
};

/// Input for a projection batch
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    /// Plans to project, complete with settings, stages, items and actuals
    pub plans: Vec<ClientPlan>,

    /// Cap the horizon at this attained age
    #[serde(default)]
    pub limit_age: Option<u8>,

    /// Explicit final month; takes precedence over ages
    #[serde(default)]
    pub end: Option<TimePoint>,

    /// Indicator driving scheduled-item indexation (default: IPCA)
    #[serde(default = "default_inflation_series")]
    pub inflation_series: Option<String>,

    /// Indicator replacing the plan return assumption where it has data
    #[serde(default)]
    pub return_series: Option<String>,

    /// Extra indicator series supplied inline; a name that matches a
    /// built-in replaces it
    #[serde(default)]
    pub series: Vec<SeriesInput>,

    /// Include the full monthly rows per plan (summaries are always
    /// included)
    #[serde(default)]
    pub include_months: bool,
}

fn default_inflation_series() -> Option<String> {
    Some("IPCA".to_string())
}

/// An indicator series supplied in the request body
#[derive(Debug, Deserialize)]
pub struct SeriesInput {
    pub name: String,
    /// "monthly_percent" or "index_level"
    pub unit: SeriesUnit,
    pub points: Vec<RatePoint>,
}

/// Output for a projection batch
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub plan_count: usize,
    pub projected: usize,
    pub failed: usize,
    pub results: Vec<PlanOutcome>,
    pub execution_time_ms: u64,
}

/// Per-plan outcome: a summary plus optional detail, or the failure
#[derive(Debug, Serialize)]
pub struct PlanOutcome {
    pub plan_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ProjectionSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retirement_month: Option<TimePoint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub months: Vec<ProjectionMonth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn error_response(status: u16, message: &str) -> Response<Body> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Body::Text(format!(r#"{{"error":"{}"}}"#, message)))
        .unwrap()
}

fn json_response(body: &BatchResponse) -> Response<Body> {
    Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
        .body(Body::Text(serde_json::to_string(body).unwrap()))
        .unwrap()
}

/// Lambda handler function
async fn handler(event: Request) -> Result<Response<Body>, Error> {
    let start = std::time::Instant::now();

    // Handle CORS preflight
    if event.method().as_str() == "OPTIONS" {
        return Ok(Response::builder()
            .status(200)
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "POST, OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type")
            .body(Body::Empty)
            .unwrap());
    }

    // Parse request body
    let body = event.body();
    let body_str = match body {
        Body::Text(s) => s.clone(),
        Body::Binary(b) => String::from_utf8_lossy(b).to_string(),
        Body::Empty => "{}".to_string(),
    };

    let request: BatchRequest = match serde_json::from_str(&body_str) {
        Ok(r) => r,
        Err(e) => {
            return Ok(error_response(400, &format!("Invalid JSON: {}", e)));
        }
    };

    if request.plans.is_empty() {
        return Ok(error_response(400, "Request carries no plans"));
    }

    // Built-in benchmark history plus whatever the caller supplied
    let mut indicators = Indicators::default_benchmarks();
    for input in request.series {
        indicators.insert(RateSeries::new(input.name, input.unit, input.points));
    }

    let config = ProjectionConfig {
        limit_age: request.limit_age,
        end_override: request.end,
        inflation_series: request.inflation_series,
        return_series: request.return_series,
    };

    // Run projections in parallel
    let runner = ScenarioRunner::with_indicators(indicators);
    let outcomes = runner.run_batch(&request.plans, config);

    let plan_count = request.plans.len();
    let mut projected = 0;
    let mut failed = 0;

    let results: Vec<PlanOutcome> = request
        .plans
        .iter()
        .zip(outcomes)
        .map(|(plan, outcome)| match outcome {
            Ok(result) => {
                projected += 1;
                PlanOutcome {
                    plan_id: result.plan_id,
                    summary: Some(result.summary()),
                    retirement_month: result.retirement_month,
                    diagnostics: result.diagnostics.clone(),
                    months: if request.include_months {
                        result.months.clone()
                    } else {
                        Vec::new()
                    },
                    error: None,
                }
            }
            Err(e) => {
                failed += 1;
                PlanOutcome {
                    plan_id: plan.plan_id,
                    summary: None,
                    retirement_month: None,
                    diagnostics: Vec::new(),
                    months: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        })
        .collect();

    let execution_time_ms = start.elapsed().as_millis() as u64;

    let response = BatchResponse {
        plan_count,
        projected,
        failed,
        results,
        execution_time_ms,
    };

    Ok(json_response(&response))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
