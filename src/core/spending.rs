use jiff::civil::Weekday;
use serde::Serialize;

use crate::format::format_currency_short;

const CAUTION_SPENT_PERCENTAGE: f64 = 80.0;
const COMFORTABLE_SPENT_PERCENTAGE: f64 = 50.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SpendingTier {
    OverBudget,
    FullySpent,
    /// More than 80% of the week's budget is gone.
    RunningLow,
    /// More than 50% is gone.
    OnTrack,
    Plenty,
}

impl SpendingTier {
    pub fn message(self, remaining: f64) -> String {
        let left = format_currency_short(remaining);
        match self {
            SpendingTier::OverBudget => {
                "We've gone a bit over this week. That's okay, next week is a fresh start."
                    .to_string()
            }
            SpendingTier::FullySpent => {
                "Perfect! We've used exactly our weekly budget.".to_string()
            }
            SpendingTier::RunningLow => format!("We have {left} left to enjoy together this week."),
            SpendingTier::OnTrack => format!("We've got {left} free to play with this week."),
            SpendingTier::Plenty => {
                format!("We have {left} ready for whatever we want this week!")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySpending {
    pub weekly_budget: f64,
    pub current_spending: f64,
    /// Negative once the budget is exceeded.
    pub remaining: f64,
    /// Never below zero; the headline figure.
    pub spendable: f64,
    pub spent_percentage: f64,
    pub tier: SpendingTier,
    pub message: String,
    pub days_until_reset: u8,
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Budgets reset on Sunday. On Sunday itself the next reset is a week out.
pub fn days_until_reset(today: Weekday) -> u8 {
    match today.to_sunday_zero_offset() {
        0 => 7,
        offset => (7 - offset) as u8,
    }
}

pub fn weekly_spending(weekly_budget: f64, current_spending: f64, today: Weekday) -> WeeklySpending {
    let weekly_budget = finite_or_zero(weekly_budget);
    let current_spending = finite_or_zero(current_spending);

    let remaining = weekly_budget - current_spending;
    let spent_percentage = if weekly_budget > 0.0 {
        current_spending / weekly_budget * 100.0
    } else {
        0.0
    };

    let tier = if remaining < 0.0 {
        SpendingTier::OverBudget
    } else if remaining == 0.0 {
        SpendingTier::FullySpent
    } else if spent_percentage > CAUTION_SPENT_PERCENTAGE {
        SpendingTier::RunningLow
    } else if spent_percentage > COMFORTABLE_SPENT_PERCENTAGE {
        SpendingTier::OnTrack
    } else {
        SpendingTier::Plenty
    };

    WeeklySpending {
        weekly_budget,
        current_spending,
        remaining,
        spendable: remaining.max(0.0),
        spent_percentage,
        tier,
        message: tier.message(remaining),
        days_until_reset: days_until_reset(today),
    }
}

/// Adds a tracked purchase to the week's total. Only finite amounts above
/// zero are accepted.
pub fn add_spending(current_spending: f64, amount: f64) -> Option<f64> {
    if !(amount.is_finite() && amount > 0.0) {
        tracing::debug!(amount, "ignored spending entry");
        return None;
    }
    Some(finite_or_zero(current_spending) + amount)
}
