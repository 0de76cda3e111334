use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use jiff::civil::Weekday;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::net::TcpListener;

use crate::core::{
    BucketAllocation, BudgetBlueprint, BudgetInputs, CalendarMonth, InvalidReason, LevelSummary,
    MAX_SIMULATED_MONTHS, MonthlyPaymentRow, PayoffInputs, ProgressEvent, ProgressState,
    RoadmapInputs, RoadmapProjection, SimulationResult, StageReport, WeeklySpending,
    add_spending, level_summary, project_emergency_fund, simulate, simulate_with_trace,
    split_budget, stage_report, weekly_spending,
};
use crate::input::{DebtDraft, into_debts, parse_amount};

mod error;

pub use error::{ApiError, ApiResult};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
        }
    }
}

/// A numeric form field. Browsers send whatever was typed, so both JSON
/// numbers and strings are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum AmountField {
    Number(f64),
    Text(String),
}

impl AmountField {
    fn value(&self) -> f64 {
        match self {
            AmountField::Number(value) if value.is_finite() => *value,
            AmountField::Number(_) => 0.0,
            AmountField::Text(raw) => parse_amount(raw),
        }
    }
}

fn amount_or_zero(field: Option<&AmountField>) -> f64 {
    field.map(AmountField::value).unwrap_or(0.0)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DebtPayload {
    id: Option<String>,
    name: Option<String>,
    #[serde(alias = "originalAmount")]
    amount: Option<AmountField>,
    min_payment: Option<AmountField>,
}

impl From<DebtPayload> for DebtDraft {
    fn from(payload: DebtPayload) -> Self {
        DebtDraft {
            id: payload.id,
            name: payload.name.unwrap_or_default(),
            amount: amount_or_zero(payload.amount.as_ref()),
            min_payment: amount_or_zero(payload.min_payment.as_ref()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct BudgetPayload {
    monthly_income: Option<AmountField>,
    monthly_essentials: Option<AmountField>,
    growth: Option<u32>,
    stability: Option<u32>,
    rewards: Option<u32>,
}

impl From<BudgetPayload> for BudgetInputs {
    fn from(payload: BudgetPayload) -> Self {
        let defaults = BucketAllocation::default();
        BudgetInputs {
            monthly_income: amount_or_zero(payload.monthly_income.as_ref()),
            monthly_essentials: amount_or_zero(payload.monthly_essentials.as_ref()),
            allocation: BucketAllocation {
                growth: payload.growth.unwrap_or(defaults.growth),
                stability: payload.stability.unwrap_or(defaults.stability),
                rewards: payload.rewards.unwrap_or(defaults.rewards),
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    debts: Vec<DebtPayload>,
    #[serde(alias = "growthAllocation")]
    monthly_capacity: Option<AmountField>,
    #[serde(alias = "bonusPayment")]
    lump_sum: Option<AmountField>,
    reference_month: Option<String>,
    budget: Option<BudgetPayload>,
    include_trace: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SpendingPayload {
    weekly_budget: Option<AmountField>,
    current_spending: Option<AmountField>,
    new_spending: Option<AmountField>,
    budget: Option<BudgetPayload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RoadmapPayload {
    current_savings: Option<AmountField>,
    #[serde(alias = "stabilityAllocation")]
    monthly_allocation: Option<AmountField>,
    reference_month: Option<String>,
    budget: Option<BudgetPayload>,
}

#[derive(Debug, Deserialize)]
struct ProgressPayload {
    #[serde(flatten)]
    state: ProgressState,
    #[serde(default)]
    events: Vec<ProgressEvent>,
}

/// Where a derived monthly or weekly amount came from.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
enum AmountSource {
    Explicit,
    GrowthBucket,
    StabilityBucket,
    RewardsBucket,
    Missing,
}

/// An explicit field wins; otherwise the named budget bucket; otherwise 0.
fn explicit_or_bucket(
    explicit: Option<&AmountField>,
    budget: Option<&BudgetBlueprint>,
    bucket: fn(&BudgetBlueprint) -> Option<f64>,
    bucket_source: AmountSource,
) -> (f64, AmountSource) {
    if let Some(field) = explicit {
        return (field.value(), AmountSource::Explicit);
    }
    match budget.and_then(bucket) {
        Some(amount) => (amount, bucket_source),
        None => (0.0, AmountSource::Missing),
    }
}

fn reference_month_or(raw: Option<&str>, today: CalendarMonth) -> ApiResult<CalendarMonth> {
    match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => Ok(raw.parse::<CalendarMonth>()?),
        _ => Ok(today),
    }
}

#[derive(Debug)]
struct SimulateRequest {
    inputs: PayoffInputs,
    capacity_source: AmountSource,
    budget: Option<BudgetBlueprint>,
    include_trace: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    capacity_source: AmountSource,
    reference_month: CalendarMonth,
    lump_sum: f64,
    #[serde(flatten)]
    result: SimulationResult,
    message: Option<String>,
    budget: Option<BudgetBlueprint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    monthly_trace: Option<Vec<MonthlyPaymentRow>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BudgetResponse {
    #[serde(flatten)]
    budget: BudgetBlueprint,
    message: Option<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpendingResponse {
    weekly_budget_source: AmountSource,
    /// Present when a new purchase was submitted.
    spending_accepted: Option<bool>,
    #[serde(flatten)]
    status: WeeklySpending,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RoadmapResponse {
    allocation_source: AmountSource,
    reference_month: CalendarMonth,
    #[serde(flatten)]
    projection: RoadmapProjection,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressResponse {
    earned_xp: u32,
    state: ProgressState,
    level: LevelSummary,
    stage: StageReport,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub fn router() -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/simulate", post(simulate_post_handler))
        .route(
            "/api/budget",
            get(budget_get_handler).post(budget_post_handler),
        )
        .route("/api/spending", post(spending_post_handler))
        .route("/api/roadmap", post(roadmap_post_handler))
        .route("/api/progress", post(progress_post_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(config: ServerConfig) -> std::io::Result<()> {
    let addr = SocketAddr::new(config.host, config.port);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "snowball HTTP API listening");
    tracing::info!("Local access: http://127.0.0.1:{}/api/health", config.port);

    axum::serve(listener, router()).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    ApiError::NotFound.into_response()
}

async fn simulate_post_handler(
    payload: Result<Json<SimulatePayload>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(payload) = payload?;
    simulate_handler_impl(payload, CalendarMonth::current())
}

async fn budget_get_handler(
    payload: Result<Query<BudgetPayload>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(payload) = payload?;
    Ok(budget_handler_impl(payload))
}

async fn budget_post_handler(
    payload: Result<Json<BudgetPayload>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(payload) = payload?;
    Ok(budget_handler_impl(payload))
}

async fn spending_post_handler(
    payload: Result<Json<SpendingPayload>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(payload) = payload?;
    Ok(spending_handler_impl(payload, jiff::Zoned::now().weekday()))
}

async fn roadmap_post_handler(
    payload: Result<Json<RoadmapPayload>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(payload) = payload?;
    roadmap_handler_impl(payload, CalendarMonth::current())
}

async fn progress_post_handler(
    payload: Result<Json<ProgressPayload>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(payload) = payload?;
    Ok(progress_handler_impl(payload))
}

fn simulate_handler_impl(payload: SimulatePayload, today: CalendarMonth) -> ApiResult<Response> {
    let request = simulate_request_from_payload(payload, today)?;
    tracing::debug!(
        debts = request.inputs.debts.len(),
        monthly_capacity = request.inputs.monthly_capacity,
        lump_sum = request.inputs.lump_sum,
        reference_month = %request.inputs.reference_month,
        "simulate request"
    );

    let (result, monthly_trace) = if request.include_trace {
        let (result, rows) = simulate_with_trace(&request.inputs);
        (result, Some(rows))
    } else {
        (simulate(&request.inputs), None)
    };
    let response = SimulateResponse {
        capacity_source: request.capacity_source,
        reference_month: request.inputs.reference_month,
        lump_sum: request.inputs.lump_sum,
        message: corrective_message(&result),
        result,
        budget: request.budget,
        monthly_trace,
    };
    Ok(json_response(StatusCode::OK, response))
}

fn budget_handler_impl(payload: BudgetPayload) -> Response {
    let budget = split_budget(&payload.into());
    tracing::debug!(
        income = budget.monthly_income,
        essentials = budget.monthly_essentials,
        "budget request"
    );
    let response = BudgetResponse {
        message: budget.reality_check.map(|check| check.message()),
        budget,
    };
    json_response(StatusCode::OK, response)
}

fn spending_handler_impl(payload: SpendingPayload, today: Weekday) -> Response {
    let budget = payload.budget.map(|budget| split_budget(&budget.into()));
    let (weekly_budget, weekly_budget_source) = explicit_or_bucket(
        payload.weekly_budget.as_ref(),
        budget.as_ref(),
        BudgetBlueprint::weekly_rewards,
        AmountSource::RewardsBucket,
    );

    let mut current_spending = amount_or_zero(payload.current_spending.as_ref());
    let spending_accepted = payload.new_spending.as_ref().map(|field| {
        match add_spending(current_spending, field.value()) {
            Some(total) => {
                current_spending = total;
                true
            }
            None => false,
        }
    });

    let status = weekly_spending(weekly_budget, current_spending, today);
    tracing::debug!(
        weekly_budget,
        current_spending,
        tier = ?status.tier,
        ?spending_accepted,
        "spending request"
    );
    json_response(
        StatusCode::OK,
        SpendingResponse {
            weekly_budget_source,
            spending_accepted,
            status,
        },
    )
}

fn roadmap_handler_impl(payload: RoadmapPayload, today: CalendarMonth) -> ApiResult<Response> {
    let reference_month = reference_month_or(payload.reference_month.as_deref(), today)?;
    let budget = payload.budget.map(|budget| split_budget(&budget.into()));
    let (monthly_allocation, allocation_source) = explicit_or_bucket(
        payload.monthly_allocation.as_ref(),
        budget.as_ref(),
        BudgetBlueprint::stability_amount,
        AmountSource::StabilityBucket,
    );

    let projection = project_emergency_fund(&RoadmapInputs {
        current_savings: amount_or_zero(payload.current_savings.as_ref()),
        monthly_allocation,
        reference_month,
    });
    Ok(json_response(
        StatusCode::OK,
        RoadmapResponse {
            allocation_source,
            reference_month,
            projection,
        },
    ))
}

fn progress_handler_impl(payload: ProgressPayload) -> Response {
    let mut state = payload.state;
    let earned_xp = payload
        .events
        .into_iter()
        .fold(0u32, |earned, event| earned.saturating_add(state.apply(event)));
    tracing::debug!(earned_xp, xp = state.xp, stage = %state.current_stage, "progress request");

    let response = ProgressResponse {
        earned_xp,
        level: level_summary(state.xp),
        stage: stage_report(state.current_stage, &state.flags),
        state,
    };
    json_response(StatusCode::OK, response)
}

fn simulate_request_from_payload(
    payload: SimulatePayload,
    today: CalendarMonth,
) -> ApiResult<SimulateRequest> {
    let drafts = payload.debts.into_iter().map(DebtDraft::from).collect();
    let debts = into_debts(drafts)?;

    let reference_month = reference_month_or(payload.reference_month.as_deref(), today)?;

    let budget = payload.budget.map(|budget| split_budget(&budget.into()));
    let (monthly_capacity, capacity_source) = explicit_or_bucket(
        payload.monthly_capacity.as_ref(),
        budget.as_ref(),
        BudgetBlueprint::growth_amount,
        AmountSource::GrowthBucket,
    );

    let lump_sum = amount_or_zero(payload.lump_sum.as_ref());
    if lump_sum < 0.0 {
        return Err(ApiError::Validation {
            field: "lumpSum".to_string(),
            message: "must be >= 0".to_string(),
        });
    }

    Ok(SimulateRequest {
        inputs: PayoffInputs {
            debts,
            monthly_capacity,
            lump_sum,
            reference_month,
        },
        capacity_source,
        budget,
        include_trace: payload.include_trace,
    })
}

fn corrective_message(result: &SimulationResult) -> Option<String> {
    match result.invalid_reason {
        Some(InvalidReason::NoDebts) => {
            Some("Add at least one debt to build a payoff timeline.".to_string())
        }
        Some(InvalidReason::CapacityBelowMinimums) => Some(format!(
            "Monthly capacity of {:.2} doesn't cover the {:.2} in combined minimum payments. Increase it to build a payoff timeline.",
            result.monthly_capacity, result.total_min_payments
        )),
        None if !result.completed => Some(format!(
            "Not every debt is paid off within {MAX_SIMULATED_MONTHS} months. Increase the monthly capacity to finish sooner."
        )),
        None => None,
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn simulate_request_from_json(json: &str, today: CalendarMonth) -> ApiResult<SimulateRequest> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| ApiError::Body(format!("Invalid API JSON payload: {e}")))?;
    simulate_request_from_payload(payload, today)
}
