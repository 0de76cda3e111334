//! Stage progression and XP bookkeeping.
//!
//! Households move through four stages. A stage counts as mastered once 80%
//! of its tasks are done, which unlocks the next one. XP accrues from
//! progress events and maps onto 100-point levels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const XP_PER_LEVEL: u32 = 100;
pub const STARTING_XP: u32 = 25;
const UNLOCK_COMPLETION_PERCENTAGE: f64 = 80.0;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressError {
    #[error("unknown stage '{0}', expected crawl, walk, run or fly")]
    UnknownStage(String),
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Crawl,
    Walk,
    Run,
    Fly,
}

/// Completion flags tracked for the household. Tasks without a flag are
/// never counted as done.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressFlags {
    pub has_completed_compass: bool,
    pub has_basic_budget: bool,
    pub has_tracked_spending: bool,
    pub has_emergency_fund: bool,
    pub has_shared_goals: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum TaskFlag {
    BasicBudget,
    TrackedSpending,
    EmergencyFund,
    SharedGoals,
}

impl TaskFlag {
    fn is_set(self, flags: &ProgressFlags) -> bool {
        match self {
            TaskFlag::BasicBudget => flags.has_basic_budget,
            TaskFlag::TrackedSpending => flags.has_tracked_spending,
            TaskFlag::EmergencyFund => flags.has_emergency_fund,
            TaskFlag::SharedGoals => flags.has_shared_goals,
        }
    }
}

#[derive(Copy, Clone, Debug)]
struct StageTask {
    id: &'static str,
    label: &'static str,
    flag: Option<TaskFlag>,
}

const fn task(id: &'static str, label: &'static str, flag: Option<TaskFlag>) -> StageTask {
    StageTask { id, label, flag }
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Crawl, Stage::Walk, Stage::Run, Stage::Fly];

    pub fn index(self) -> usize {
        match self {
            Stage::Crawl => 0,
            Stage::Walk => 1,
            Stage::Run => 2,
            Stage::Fly => 3,
        }
    }

    pub fn next(self) -> Option<Stage> {
        Stage::ALL.get(self.index() + 1).copied()
    }

    pub fn title(self) -> &'static str {
        match self {
            Stage::Crawl => "Crawl: Getting Started",
            Stage::Walk => "Walk: Building Habits",
            Stage::Run => "Run: Shared Goals",
            Stage::Fly => "Fly: Advanced Tools",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Stage::Crawl => "Track essentials and an income baseline",
            Stage::Walk => "Buckets unlocked and weekly spending live",
            Stage::Run => "Shared goals and automation layered in",
            Stage::Fly => "Pledges, accords and investments",
        }
    }

    fn tasks(self) -> &'static [StageTask] {
        static CRAWL: [StageTask; 2] = [
            task("budget", "Set up basic budget", Some(TaskFlag::BasicBudget)),
            task("track", "Track spending for 3 days", Some(TaskFlag::TrackedSpending)),
        ];
        static WALK: [StageTask; 2] = [
            task("consistent", "Track spending consistently for 1 week", None),
            task("buckets", "Use all three buckets successfully", None),
        ];
        static RUN: [StageTask; 2] = [
            task("emergency", "Build $1000 emergency fund", Some(TaskFlag::EmergencyFund)),
            task("goals", "Set shared financial goals", Some(TaskFlag::SharedGoals)),
        ];
        static FLY: [StageTask; 2] = [
            task("automation", "Set up automated savings", None),
            task("investing", "Start investment strategy", None),
        ];
        match self {
            Stage::Crawl => &CRAWL,
            Stage::Walk => &WALK,
            Stage::Run => &RUN,
            Stage::Fly => &FLY,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Stage::Crawl => "crawl",
            Stage::Walk => "walk",
            Stage::Run => "run",
            Stage::Fly => "fly",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == wanted)
            .ok_or_else(|| ProgressError::UnknownStage(s.trim().to_string()))
    }
}

/// Percentage of the stage's tasks that are done.
pub fn stage_completion(stage: Stage, flags: &ProgressFlags) -> f64 {
    let tasks = stage.tasks();
    if tasks.is_empty() {
        return 0.0;
    }
    let done = tasks
        .iter()
        .filter(|task| task.flag.is_some_and(|flag| flag.is_set(flags)))
        .count();
    done as f64 / tasks.len() as f64 * 100.0
}

pub fn can_unlock_next_stage(stage: Stage, flags: &ProgressFlags) -> bool {
    stage_completion(stage, flags) >= UNLOCK_COMPLETION_PERCENTAGE
}

/// Whether a household at `current` may switch to `target`: staying put is
/// always allowed, anything up to one stage ahead needs `current` mastered.
pub fn can_select_stage(current: Stage, target: Stage, flags: &ProgressFlags) -> bool {
    if target.index() > current.index() + 1 {
        return false;
    }
    target == current || can_unlock_next_stage(current, flags)
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StageAvailability {
    Completed,
    Current,
    Unlocked,
    Locked,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    pub id: &'static str,
    pub label: &'static str,
    pub done: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSummary {
    pub stage: Stage,
    pub title: &'static str,
    pub availability: StageAvailability,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageReport {
    pub current_stage: Stage,
    pub title: &'static str,
    pub description: &'static str,
    /// 1-based position among all stages.
    pub stage_number: usize,
    pub stage_count: usize,
    pub completion_percentage: f64,
    pub tasks: Vec<TaskStatus>,
    pub next_stage: Option<Stage>,
    pub next_stage_unlocked: bool,
    pub stages: Vec<StageSummary>,
}

pub fn stage_report(current: Stage, flags: &ProgressFlags) -> StageReport {
    let unlocked = can_unlock_next_stage(current, flags);
    let stages = Stage::ALL
        .iter()
        .map(|&stage| {
            let availability = if stage.index() < current.index() {
                StageAvailability::Completed
            } else if stage == current {
                StageAvailability::Current
            } else if stage.index() == current.index() + 1 && unlocked {
                StageAvailability::Unlocked
            } else {
                StageAvailability::Locked
            };
            StageSummary {
                stage,
                title: stage.title(),
                availability,
            }
        })
        .collect();

    let next_stage = current.next();
    StageReport {
        current_stage: current,
        title: current.title(),
        description: current.description(),
        stage_number: current.index() + 1,
        stage_count: Stage::ALL.len(),
        completion_percentage: stage_completion(current, flags),
        tasks: current
            .tasks()
            .iter()
            .map(|task| TaskStatus {
                id: task.id,
                label: task.label,
                done: task.flag.is_some_and(|flag| flag.is_set(flags)),
            })
            .collect(),
        next_stage,
        next_stage_unlocked: next_stage.is_some() && unlocked,
        stages,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelSummary {
    pub xp: u32,
    pub level: u32,
    pub title: &'static str,
    pub xp_into_level: u32,
    pub xp_to_next_level: u32,
    pub level_percentage: f64,
}

pub fn level_title(level: u32) -> &'static str {
    match level {
        0 | 1 => "Financial Seedlings",
        2..=3 => "Budget Buddies",
        4..=5 => "Money Managers",
        6..=10 => "Wealth Warriors",
        _ => "Financial Freedom Fighters",
    }
}

pub fn level_summary(xp: u32) -> LevelSummary {
    let level = xp / XP_PER_LEVEL + 1;
    let xp_into_level = xp % XP_PER_LEVEL;
    LevelSummary {
        xp,
        level,
        title: level_title(level),
        xp_into_level,
        xp_to_next_level: XP_PER_LEVEL - xp_into_level,
        level_percentage: f64::from(xp_into_level) / f64::from(XP_PER_LEVEL) * 100.0,
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Badge {
    CompassComplete,
    FirstBudget,
    ConsistentTracker,
    EmergencyBuilder,
    TeamworkTriumph,
    GoalCrusher,
    DebtDestroyer,
}

impl Badge {
    pub fn name(self) -> &'static str {
        match self {
            Badge::CompassComplete => "Compass Calibrated",
            Badge::FirstBudget => "First Steps Together",
            Badge::ConsistentTracker => "Consistency Champions",
            Badge::EmergencyBuilder => "Emergency Shield Builders",
            Badge::TeamworkTriumph => "Teamwork Triumph",
            Badge::GoalCrusher => "Goal Crushers",
            Badge::DebtDestroyer => "Debt Destroyers",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Badge::CompassComplete => "Completed the compass quiz together",
            Badge::FirstBudget => "Created your first budget as a team",
            Badge::ConsistentTracker => "Tracked spending for 7 days straight",
            Badge::EmergencyBuilder => "Built your first $1000 emergency fund",
            Badge::TeamworkTriumph => "Stayed within budget for a full month",
            Badge::GoalCrusher => "Completed your first shared financial goal",
            Badge::DebtDestroyer => "Paid off your first debt together",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProgressEvent {
    BudgetCreated,
    SpendingTracked,
    StageAdvanced { stage: Stage },
    CompassCompleted,
}

/// Persistent progress for a household.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressState {
    pub current_stage: Stage,
    pub xp: u32,
    pub badges: Vec<Badge>,
    pub recent_achievements: Vec<String>,
    pub flags: ProgressFlags,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            current_stage: Stage::Crawl,
            xp: STARTING_XP,
            badges: Vec::new(),
            recent_achievements: Vec::new(),
            flags: ProgressFlags::default(),
        }
    }
}

impl ProgressState {
    fn award_badge(&mut self, badge: Badge) {
        if !self.badges.contains(&badge) {
            self.badges.push(badge);
        }
    }

    /// Applies one event and returns the XP it earned. A stage change the
    /// household has not unlocked yet is ignored.
    pub fn apply(&mut self, event: ProgressEvent) -> u32 {
        let earned = match event {
            ProgressEvent::BudgetCreated if !self.flags.has_basic_budget => {
                self.flags.has_basic_budget = true;
                self.award_badge(Badge::FirstBudget);
                self.recent_achievements
                    .push("Created first budget together!".to_string());
                15
            }
            ProgressEvent::BudgetCreated => 0,
            ProgressEvent::SpendingTracked if !self.flags.has_tracked_spending => {
                self.flags.has_tracked_spending = true;
                self.recent_achievements
                    .push("Started tracking spending!".to_string());
                10
            }
            ProgressEvent::SpendingTracked => 5,
            ProgressEvent::StageAdvanced { stage } => {
                if !can_select_stage(self.current_stage, stage, &self.flags) {
                    tracing::debug!(from = %self.current_stage, to = %stage, "stage change refused");
                    return 0;
                }
                self.current_stage = stage;
                self.recent_achievements
                    .push(format!("Advanced to {} stage!", stage.title()));
                25
            }
            ProgressEvent::CompassCompleted => {
                self.flags.has_completed_compass = true;
                self.award_badge(Badge::CompassComplete);
                self.recent_achievements
                    .push("Completed the compass!".to_string());
                50
            }
        };
        self.xp = self.xp.saturating_add(earned);
        earned
    }
}
