use serde::Serialize;

/// Weeks per month used to turn the monthly rewards bucket into a weekly figure.
pub const WEEKS_PER_MONTH: f64 = 4.33;

const TIGHT_ESSENTIALS_PERCENTAGE: f64 = 75.0;
const STARTING_POINT_ESSENTIALS_PERCENTAGE: f64 = 50.0;

/// Whole-percent split of the monthly surplus.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketAllocation {
    pub growth: u32,
    pub stability: u32,
    pub rewards: u32,
}

impl BucketAllocation {
    pub fn total(self) -> u32 {
        self.growth
            .saturating_add(self.stability)
            .saturating_add(self.rewards)
    }
}

impl Default for BucketAllocation {
    fn default() -> Self {
        Self {
            growth: 52,
            stability: 31,
            rewards: 17,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BudgetInputs {
    pub monthly_income: f64,
    pub monthly_essentials: f64,
    pub allocation: BucketAllocation,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RealityCheck {
    Overspent,
    Tight,
    StartingPoint,
    Strong,
}

impl RealityCheck {
    pub fn message(self) -> &'static str {
        match self {
            RealityCheck::Overspent => {
                "Your essentials cost more than your income. Adjust the numbers to find a starting point."
            }
            RealityCheck::Tight => {
                "This is a tight spot, but every dollar of surplus is a win."
            }
            RealityCheck::StartingPoint => {
                "This is your starting point. The goal is to manage your surplus strategically."
            }
            RealityCheck::Strong => {
                "You're in a great position. Put your surplus to work for your future."
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketShare {
    pub amount: f64,
    /// Share of total income, in percent.
    pub percentage: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    pub essentials: BucketShare,
    pub growth: BucketShare,
    pub stability: BucketShare,
    pub rewards: BucketShare,
    pub weekly_rewards: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetBlueprint {
    pub monthly_income: f64,
    pub monthly_essentials: f64,
    pub surplus: f64,
    pub essentials_percentage: f64,
    pub surplus_percentage: f64,
    pub is_valid: bool,
    pub is_overspent: bool,
    pub total_allocation_percentage: u32,
    pub allocation: BucketAllocation,
    pub reality_check: Option<RealityCheck>,
    pub blueprint: Option<Blueprint>,
}

impl BudgetBlueprint {
    /// Monthly amount available for debt payoff, when a blueprint exists.
    pub fn growth_amount(&self) -> Option<f64> {
        self.blueprint.map(|blueprint| blueprint.growth.amount)
    }

    /// Monthly amount set aside for the emergency fund.
    pub fn stability_amount(&self) -> Option<f64> {
        self.blueprint.map(|blueprint| blueprint.stability.amount)
    }

    pub fn weekly_rewards(&self) -> Option<f64> {
        self.blueprint.map(|blueprint| blueprint.weekly_rewards)
    }
}

pub fn split_budget(inputs: &BudgetInputs) -> BudgetBlueprint {
    let income = if inputs.monthly_income.is_finite() {
        inputs.monthly_income
    } else {
        0.0
    };
    let essentials = if inputs.monthly_essentials.is_finite() {
        inputs.monthly_essentials
    } else {
        0.0
    };
    let allocation = inputs.allocation;

    let is_valid = income > 0.0 && essentials > 0.0 && income >= essentials;
    let is_overspent = income > 0.0 && essentials > income;

    if !is_valid && !is_overspent {
        return BudgetBlueprint {
            monthly_income: income,
            monthly_essentials: essentials,
            surplus: 0.0,
            essentials_percentage: 0.0,
            surplus_percentage: 0.0,
            is_valid: false,
            is_overspent: false,
            total_allocation_percentage: 0,
            allocation,
            reality_check: None,
            blueprint: None,
        };
    }

    let surplus = income - essentials;
    let essentials_percentage = essentials / income * 100.0;
    let surplus_percentage = 100.0 - essentials_percentage;
    let total_allocation_percentage = allocation.total();

    let share = |percent: u32| {
        let fraction = f64::from(percent) / 100.0;
        BucketShare {
            amount: surplus * fraction,
            percentage: surplus_percentage * fraction,
        }
    };

    let blueprint = (is_valid && total_allocation_percentage == 100).then(|| {
        let rewards = share(allocation.rewards);
        Blueprint {
            essentials: BucketShare {
                amount: essentials,
                percentage: essentials_percentage,
            },
            growth: share(allocation.growth),
            stability: share(allocation.stability),
            rewards,
            weekly_rewards: rewards.amount / WEEKS_PER_MONTH,
        }
    });

    let reality_check = if is_overspent {
        RealityCheck::Overspent
    } else if essentials_percentage > TIGHT_ESSENTIALS_PERCENTAGE {
        RealityCheck::Tight
    } else if essentials_percentage > STARTING_POINT_ESSENTIALS_PERCENTAGE {
        RealityCheck::StartingPoint
    } else {
        RealityCheck::Strong
    };

    tracing::debug!(
        income,
        essentials,
        surplus,
        ?reality_check,
        has_blueprint = blueprint.is_some(),
        "budget split computed"
    );

    BudgetBlueprint {
        monthly_income: income,
        monthly_essentials: essentials,
        surplus,
        essentials_percentage,
        surplus_percentage,
        is_valid,
        is_overspent,
        total_allocation_percentage,
        allocation,
        reality_check: Some(reality_check),
        blueprint,
    }
}
