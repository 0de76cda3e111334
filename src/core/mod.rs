mod budget;
mod calendar;
mod engine;
mod progress;
mod roadmap;
mod spending;
mod types;

pub use budget::{
    Blueprint, BucketAllocation, BucketShare, BudgetBlueprint, BudgetInputs, RealityCheck,
    WEEKS_PER_MONTH, split_budget,
};
pub use calendar::{CalendarError, CalendarMonth};
pub use engine::{
    MAX_SIMULATED_MONTHS, order_debts, run_monthly_payment_trace, simulate, simulate_with_trace,
    total_min_payments,
};
pub use progress::{
    Badge, LevelSummary, ProgressError, ProgressEvent, ProgressFlags, ProgressState, STARTING_XP,
    Stage, StageAvailability, StageReport, StageSummary, TaskStatus, XP_PER_LEVEL,
    can_select_stage, can_unlock_next_stage, level_summary, level_title, stage_completion,
    stage_report,
};
pub use roadmap::{
    EMERGENCY_FUND_MILESTONES, Milestone, MilestoneStatus, RoadmapInputs, RoadmapProjection,
    project_emergency_fund,
};
pub use spending::{SpendingTier, WeeklySpending, add_spending, days_until_reset, weekly_spending};
pub use types::{
    Debt, DebtMonthState, InvalidReason, MonthlyPaymentRow, PayoffEvent, PayoffInputs,
    SimulationResult,
};
