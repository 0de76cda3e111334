use serde::{Deserialize, Serialize};

use super::calendar::CalendarMonth;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub id: String,
    pub name: String,
    pub original_amount: f64,
    pub min_payment: f64,
}

#[derive(Debug, Clone)]
pub struct PayoffInputs {
    pub debts: Vec<Debt>,
    pub monthly_capacity: f64,
    pub lump_sum: f64,
    /// Month 1 of the simulation.
    pub reference_month: CalendarMonth,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InvalidReason {
    NoDebts,
    CapacityBelowMinimums,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffEvent {
    pub debt_id: String,
    pub debt_name: String,
    pub payoff_month_index: u32,
    pub payoff_date: CalendarMonth,
    pub starting_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub is_valid: bool,
    pub invalid_reason: Option<InvalidReason>,
    pub ordered_debts: Vec<Debt>,
    pub timeline: Vec<PayoffEvent>,
    pub final_freedom_date: Option<CalendarMonth>,
    /// Debt that receives the month-1 remainder. Differs from the first
    /// timeline entry when the lump sum clears that debt up front.
    pub first_month_target_id: Option<String>,
    pub first_month_mission_payment: f64,
    pub total_min_payments: f64,
    pub monthly_capacity: f64,
    pub lump_sum_applied: f64,
    pub months_simulated: u32,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtMonthState {
    pub debt_id: String,
    pub payment: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPaymentRow {
    pub month_index: u32,
    pub month: CalendarMonth,
    pub available_payment: f64,
    pub target_debt_id: Option<String>,
    pub total_paid: f64,
    pub remaining_balance: f64,
    pub debts: Vec<DebtMonthState>,
}
