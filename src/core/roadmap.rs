use serde::Serialize;

use super::calendar::CalendarMonth;

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: &'static str,
    pub name: &'static str,
    pub amount: f64,
    pub description: &'static str,
}

/// Emergency fund ladder, in ascending order of amount.
pub const EMERGENCY_FUND_MILESTONES: [Milestone; 4] = [
    Milestone {
        id: "starter",
        name: "Starter Emergency Fund",
        amount: 1_000.0,
        description: "Your first buffer for small surprises.",
    },
    Milestone {
        id: "one-month",
        name: "One-Month Essentials",
        amount: 2_200.0,
        description: "Cover one full month of your core bills.",
    },
    Milestone {
        id: "three-month",
        name: "Three-Month Cushion",
        amount: 5_000.0,
        description: "A solid safety net for bigger emergencies.",
    },
    Milestone {
        id: "fully-funded",
        name: "Fully Funded EF",
        amount: 10_000.0,
        description: "Six months of living expenses, secured.",
    },
];

#[derive(Debug, Clone, Copy)]
pub struct RoadmapInputs {
    pub current_savings: f64,
    pub monthly_allocation: f64,
    pub reference_month: CalendarMonth,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneStatus {
    #[serde(flatten)]
    pub milestone: Milestone,
    pub completed: bool,
    pub is_next: bool,
    /// Months of saving at the current allocation; `None` once reached or
    /// when nothing is being set aside.
    pub months_needed: Option<u32>,
    pub projected_month: Option<CalendarMonth>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapProjection {
    pub current_savings: f64,
    pub monthly_allocation: f64,
    pub next_milestone: Option<Milestone>,
    /// Progress between the previous milestone and the next one, in percent.
    pub progress_percentage: f64,
    pub months_to_next: Option<u32>,
    pub projected_month: Option<CalendarMonth>,
    pub fully_funded: bool,
    pub milestones: Vec<MilestoneStatus>,
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

fn months_to_reach(target: f64, savings: f64, allocation: f64) -> Option<u32> {
    if savings >= target || allocation <= 0.0 {
        return None;
    }
    // `as` saturates, and `plus_months` saturates too.
    Some(((target - savings) / allocation).ceil() as u32)
}

pub fn project_emergency_fund(inputs: &RoadmapInputs) -> RoadmapProjection {
    let savings = non_negative(inputs.current_savings);
    let allocation = non_negative(inputs.monthly_allocation);
    let project = |months: u32| inputs.reference_month.plus_months(months);

    let next_index = EMERGENCY_FUND_MILESTONES
        .iter()
        .position(|milestone| savings < milestone.amount);

    let progress_percentage = match next_index {
        Some(idx) => {
            let floor = idx
                .checked_sub(1)
                .map_or(0.0, |prev| EMERGENCY_FUND_MILESTONES[prev].amount);
            let target = EMERGENCY_FUND_MILESTONES[idx].amount;
            (savings - floor) / (target - floor) * 100.0
        }
        None => 100.0,
    };

    let milestones: Vec<MilestoneStatus> = EMERGENCY_FUND_MILESTONES
        .iter()
        .enumerate()
        .map(|(idx, milestone)| {
            let months_needed = months_to_reach(milestone.amount, savings, allocation);
            MilestoneStatus {
                milestone: *milestone,
                completed: savings >= milestone.amount,
                is_next: next_index == Some(idx),
                months_needed,
                projected_month: months_needed.map(project),
            }
        })
        .collect();

    let next = next_index.map(|idx| &milestones[idx]);
    let months_to_next = next.and_then(|status| status.months_needed);
    let projected_month = next.and_then(|status| status.projected_month);

    tracing::debug!(
        savings,
        allocation,
        next = next.map(|status| status.milestone.id),
        months_to_next,
        "emergency fund projection computed"
    );

    RoadmapProjection {
        current_savings: savings,
        monthly_allocation: allocation,
        next_milestone: next.map(|status| status.milestone),
        progress_percentage,
        months_to_next,
        projected_month,
        fully_funded: next_index.is_none(),
        milestones,
    }
}
