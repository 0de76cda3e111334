use std::fmt::Write as _;
use std::net::IpAddr;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use jiff::civil::Weekday;

use crate::api::{ServerConfig, run_http_server};
use crate::core::{
    BucketAllocation, BudgetBlueprint, BudgetInputs, CalendarError, CalendarMonth, InvalidReason,
    LevelSummary, MonthlyPaymentRow, PayoffInputs, ProgressFlags, RoadmapInputs,
    RoadmapProjection, SimulationResult, SpendingTier, Stage, StageAvailability, StageReport,
    WeeklySpending, add_spending, level_summary, project_emergency_fund, simulate,
    simulate_with_trace, split_budget, stage_report, weekly_spending,
};
use crate::format::{format_currency, format_currency_short};
use crate::input::{InputError, into_debts, parse_amount, parse_debt_spec};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("--start: {0}")]
    Start(#[from] CalendarError),
    #[error("--lump-sum must be >= 0")]
    NegativeLumpSum,
    #[error("--add must be a positive amount, got '{0}'")]
    RejectedSpending(String),
    #[error("could not encode JSON output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(
    name = "snowball",
    about = "Debt snowball payoff planner with a bucket budget splitter"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error); RUST_LOG overrides it"
    )]
    pub log_level: String,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON API over HTTP
    Serve(ServeArgs),
    /// Project a snowball payoff timeline
    Simulate(SimulateArgs),
    /// Split monthly income into essentials, growth, stability and rewards
    Budget(BudgetArgs),
    /// Show this week's spendable amount, optionally tracking a purchase
    Spending(SpendingArgs),
    /// Project the emergency fund milestones
    Roadmap(RoadmapArgs),
    /// Show stage progress and XP level
    Progress(ProgressArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, env = "SNOWBALL_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,
    #[arg(short, long, env = "SNOWBALL_PORT", default_value_t = 8080)]
    pub port: u16,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[arg(
        long = "debt",
        value_name = "NAME:AMOUNT:MIN_PAYMENT",
        help = "A debt to pay off; repeat for each debt"
    )]
    pub debts: Vec<String>,
    #[arg(
        long,
        default_value = "0",
        help = "Monthly amount available for all debt payments"
    )]
    pub capacity: String,
    #[arg(
        long,
        default_value = "0",
        help = "One-time payment applied to the smallest debt before month 1"
    )]
    pub lump_sum: String,
    #[arg(long, value_name = "YYYY-MM", help = "First simulated month, defaults to this month")]
    pub start: Option<String>,
    #[arg(long, help = "Print the month-by-month payment ledger")]
    pub trace: bool,
    #[arg(long, help = "Print JSON instead of a text report")]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct BudgetArgs {
    #[arg(long, help = "Combined monthly net income")]
    pub income: String,
    #[arg(long, help = "Total monthly essentials")]
    pub essentials: String,
    #[arg(long, default_value_t = 52, help = "Surplus percent for growth")]
    pub growth: u32,
    #[arg(long, default_value_t = 31, help = "Surplus percent for stability")]
    pub stability: u32,
    #[arg(long, default_value_t = 17, help = "Surplus percent for rewards")]
    pub rewards: u32,
    #[arg(long, help = "Print JSON instead of a text report")]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SpendingArgs {
    #[arg(long, help = "Guilt-free weekly spending budget")]
    pub weekly_budget: String,
    #[arg(long, default_value = "0", help = "Already spent this week")]
    pub spent: String,
    #[arg(long, help = "A new purchase to add to this week's spending")]
    pub add: Option<String>,
    #[arg(long, help = "Print JSON instead of a text report")]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RoadmapArgs {
    #[arg(long, default_value = "0", help = "Current emergency fund savings")]
    pub savings: String,
    #[arg(
        long,
        default_value = "0",
        help = "Monthly amount set aside, usually the stability bucket"
    )]
    pub allocation: String,
    #[arg(long, value_name = "YYYY-MM", help = "Month to project from, defaults to this month")]
    pub start: Option<String>,
    #[arg(long, help = "Print JSON instead of a text report")]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ProgressArgs {
    #[arg(long, default_value = "crawl", help = "Current stage: crawl, walk, run or fly")]
    pub stage: Stage,
    #[arg(long, default_value_t = crate::core::STARTING_XP, help = "Total XP earned")]
    pub xp: u32,
    #[arg(long, help = "A basic budget is set up")]
    pub basic_budget: bool,
    #[arg(long, help = "Spending has been tracked")]
    pub tracked_spending: bool,
    #[arg(long, help = "The starter emergency fund is built")]
    pub emergency_fund: bool,
    #[arg(long, help = "Shared financial goals are set")]
    pub shared_goals: bool,
    #[arg(long, help = "Print JSON instead of a text report")]
    pub json: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressOutput {
    level: LevelSummary,
    stage: StageReport,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateOutput<'a> {
    #[serde(flatten)]
    result: &'a SimulationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    monthly_trace: Option<&'a [MonthlyPaymentRow]>,
}

pub async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Serve(args) => {
            run_http_server(ServerConfig {
                host: args.host,
                port: args.port,
            })
            .await?;
        }
        Command::Simulate(args) => print!("{}", run_simulate(&args, CalendarMonth::current())?),
        Command::Budget(args) => print!("{}", run_budget(&args)?),
        Command::Spending(args) => {
            print!("{}", run_spending(&args, jiff::Zoned::now().weekday())?)
        }
        Command::Roadmap(args) => print!("{}", run_roadmap(&args, CalendarMonth::current())?),
        Command::Progress(args) => print!("{}", run_progress(&args)?),
    }
    Ok(())
}

fn simulate_inputs(args: &SimulateArgs, today: CalendarMonth) -> Result<PayoffInputs, CliError> {
    let drafts = args
        .debts
        .iter()
        .map(|spec| parse_debt_spec(spec))
        .collect::<Result<Vec<_>, _>>()?;
    let debts = into_debts(drafts)?;

    let lump_sum = parse_amount(&args.lump_sum);
    if lump_sum < 0.0 {
        return Err(CliError::NegativeLumpSum);
    }

    let reference_month = match &args.start {
        Some(raw) => raw.parse::<CalendarMonth>()?,
        None => today,
    };

    Ok(PayoffInputs {
        debts,
        monthly_capacity: parse_amount(&args.capacity),
        lump_sum,
        reference_month,
    })
}

fn run_simulate(args: &SimulateArgs, today: CalendarMonth) -> Result<String, CliError> {
    let inputs = simulate_inputs(args, today)?;
    let (result, trace) = if args.trace {
        let (result, rows) = simulate_with_trace(&inputs);
        (result, Some(rows))
    } else {
        (simulate(&inputs), None)
    };

    if args.json {
        let output = SimulateOutput {
            result: &result,
            monthly_trace: trace.as_deref(),
        };
        return Ok(format!("{}\n", serde_json::to_string_pretty(&output)?));
    }

    let mut report = render_simulation_report(&result);
    if let Some(rows) = &trace {
        report.push('\n');
        report.push_str(&render_trace(rows));
    }
    Ok(report)
}

fn run_budget(args: &BudgetArgs) -> Result<String, CliError> {
    let budget = split_budget(&BudgetInputs {
        monthly_income: parse_amount(&args.income),
        monthly_essentials: parse_amount(&args.essentials),
        allocation: BucketAllocation {
            growth: args.growth,
            stability: args.stability,
            rewards: args.rewards,
        },
    });
    if args.json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(&budget)?));
    }
    Ok(render_budget_report(&budget))
}

fn run_spending(args: &SpendingArgs, today: Weekday) -> Result<String, CliError> {
    let mut spent = parse_amount(&args.spent);
    if let Some(raw) = &args.add {
        spent = add_spending(spent, parse_amount(raw))
            .ok_or_else(|| CliError::RejectedSpending(raw.clone()))?;
    }
    let status = weekly_spending(parse_amount(&args.weekly_budget), spent, today);
    if args.json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(&status)?));
    }
    Ok(render_spending_report(&status))
}

fn run_roadmap(args: &RoadmapArgs, today: CalendarMonth) -> Result<String, CliError> {
    let reference_month = match &args.start {
        Some(raw) => raw.parse::<CalendarMonth>()?,
        None => today,
    };
    let projection = project_emergency_fund(&RoadmapInputs {
        current_savings: parse_amount(&args.savings),
        monthly_allocation: parse_amount(&args.allocation),
        reference_month,
    });
    if args.json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(&projection)?));
    }
    Ok(render_roadmap_report(&projection))
}

fn run_progress(args: &ProgressArgs) -> Result<String, CliError> {
    let flags = ProgressFlags {
        has_basic_budget: args.basic_budget,
        has_tracked_spending: args.tracked_spending,
        has_emergency_fund: args.emergency_fund,
        has_shared_goals: args.shared_goals,
        ..ProgressFlags::default()
    };
    let output = ProgressOutput {
        level: level_summary(args.xp),
        stage: stage_report(args.stage, &flags),
    };
    if args.json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(&output)?));
    }
    Ok(render_progress_report(&output))
}

fn render_simulation_report(result: &SimulationResult) -> String {
    let mut out = String::new();
    match result.invalid_reason {
        Some(InvalidReason::NoDebts) => {
            out.push_str("No debts entered yet. Add one with --debt NAME:AMOUNT:MIN_PAYMENT.\n");
            return out;
        }
        Some(InvalidReason::CapacityBelowMinimums) => {
            let _ = writeln!(
                out,
                "Monthly capacity {} doesn't cover the minimum payments ({}). Increase it to build a timeline.",
                format_currency(result.monthly_capacity),
                format_currency(result.total_min_payments)
            );
            return out;
        }
        None => {}
    }

    let mission = result.first_month_target_id.as_deref().and_then(|id| {
        let debt = result.ordered_debts.iter().find(|debt| debt.id == id)?;
        let payoff = result.timeline.iter().find(|event| event.debt_id == id);
        Some((debt, payoff))
    });
    if let Some((debt, payoff)) = mission {
        let _ = write!(
            out,
            "Current mission: destroy '{}' with {} this month",
            debt.name,
            format_currency(result.first_month_mission_payment)
        );
        match payoff {
            Some(event) => {
                let _ = writeln!(out, " (payoff {})", event.payoff_date.label());
            }
            None => out.push('\n'),
        }
    }
    let _ = writeln!(
        out,
        "Monthly capacity {} | minimums {}",
        format_currency(result.monthly_capacity),
        format_currency(result.total_min_payments)
    );
    if result.lump_sum_applied > 0.0 {
        let _ = writeln!(
            out,
            "Lump sum applied: {}",
            format_currency(result.lump_sum_applied)
        );
    }

    out.push_str("\nFreedom timeline\n");
    for (idx, event) in result.timeline.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {:<24} {:>14}  {:<15} (month {})",
            idx + 1,
            event.debt_name,
            format_currency(event.starting_balance),
            event.payoff_date.label(),
            event.payoff_month_index
        );
    }

    match result.final_freedom_date {
        Some(date) if result.completed => {
            let _ = writeln!(out, "\nDebt freedom date: {}", date.label());
        }
        _ => {
            let _ = writeln!(
                out,
                "\nOnly {} of {} debts are paid off within {} months.",
                result.timeline.len(),
                result.ordered_debts.len(),
                result.months_simulated
            );
        }
    }
    out
}

fn render_trace(rows: &[MonthlyPaymentRow]) -> String {
    let mut out = String::from("Month             Available     Paid          Remaining      Target\n");
    for row in rows {
        let _ = writeln!(
            out,
            "{:>4} {:<12} {:>13} {:>13} {:>14}  {}",
            row.month_index,
            row.month.to_string(),
            format_currency(row.available_payment),
            format_currency(row.total_paid),
            format_currency(row.remaining_balance),
            row.target_debt_id.as_deref().unwrap_or("-")
        );
    }
    out
}

fn render_spending_report(status: &WeeklySpending) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Weekly spendable: {}",
        format_currency_short(status.spendable)
    );
    let _ = writeln!(out, "{}", status.message);
    if status.weekly_budget > 0.0 {
        let _ = writeln!(
            out,
            "Spent {} of {} ({:.0}%)",
            format_currency(status.current_spending),
            format_currency(status.weekly_budget),
            status.spent_percentage
        );
    }
    if status.tier == SpendingTier::OverBudget {
        let _ = writeln!(out, "Over by {}", format_currency(-status.remaining));
    }
    let days = status.days_until_reset;
    let _ = writeln!(
        out,
        "Resets in {days} {}",
        if days == 1 { "day" } else { "days" }
    );
    out
}

fn render_roadmap_report(projection: &RoadmapProjection) -> String {
    let mut out = String::new();
    match &projection.next_milestone {
        Some(next) => {
            let _ = writeln!(
                out,
                "Next milestone: {} ({})",
                next.name,
                format_currency(next.amount)
            );
            let _ = writeln!(out, "{}", next.description);
            let _ = writeln!(
                out,
                "Progress to next milestone: {:.0}%",
                projection.progress_percentage
            );
            if let Some(month) = projection.projected_month {
                let _ = writeln!(out, "Projected to reach by: {}", month.label());
            }
        }
        None => out.push_str("Shield is fully charged! Every emergency fund milestone is reached.\n"),
    }

    out.push('\n');
    for status in &projection.milestones {
        let marker = if status.completed {
            "[x]"
        } else if status.is_next {
            "[>]"
        } else {
            "[ ]"
        };
        let eta = status
            .projected_month
            .map(|month| month.label())
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{marker} {:<24} {:>12}  {eta}",
            status.milestone.name,
            format_currency(status.milestone.amount)
        );
    }
    out
}

fn render_progress_report(output: &ProgressOutput) -> String {
    let mut out = String::new();
    let level = &output.level;
    let stage = &output.stage;
    let _ = writeln!(
        out,
        "Level {} - {} ({} XP, {} XP to next level)",
        level.level, level.title, level.xp, level.xp_to_next_level
    );
    let _ = writeln!(
        out,
        "Stage {} of {}: {}",
        stage.stage_number, stage.stage_count, stage.title
    );
    let _ = writeln!(out, "{}", stage.description);
    for task in &stage.tasks {
        let _ = writeln!(out, "  [{}] {}", if task.done { "x" } else { " " }, task.label);
    }
    let _ = writeln!(
        out,
        "Stage completion: {:.0}%",
        stage.completion_percentage
    );
    if let (Some(next), true) = (stage.next_stage, stage.next_stage_unlocked) {
        let _ = writeln!(out, "Unlocked: {}", next.title());
    }
    let locked = stage
        .stages
        .iter()
        .filter(|summary| summary.availability == StageAvailability::Locked)
        .count();
    if locked > 0 {
        let _ = writeln!(out, "{locked} stage(s) still locked");
    }
    out
}

fn render_budget_report(budget: &BudgetBlueprint) -> String {
    let mut out = String::new();
    if !budget.is_valid && !budget.is_overspent {
        out.push_str("Enter a positive income and essentials amount to split your budget.\n");
        return out;
    }

    let _ = writeln!(
        out,
        "Essentials {:.1}% | surplus {:.1}% ({})",
        budget.essentials_percentage,
        budget.surplus_percentage,
        format_currency(budget.surplus)
    );
    if let Some(check) = budget.reality_check {
        let _ = writeln!(out, "{}", check.message());
    }

    match &budget.blueprint {
        Some(blueprint) => {
            out.push('\n');
            for (label, share) in [
                ("Essentials", blueprint.essentials),
                ("Growth", blueprint.growth),
                ("Stability", blueprint.stability),
                ("Rewards", blueprint.rewards),
            ] {
                let _ = writeln!(
                    out,
                    "{label:<11} {:>14}  {:>5.1}% of income",
                    format_currency(share.amount),
                    share.percentage
                );
            }
            let _ = writeln!(
                out,
                "\nGuilt-free weekly spending: {}",
                format_currency(blueprint.weekly_rewards)
            );
        }
        None if budget.is_valid => {
            let _ = writeln!(
                out,
                "Bucket percentages add up to {}%, they must total 100%.",
                budget.total_allocation_percentage
            );
        }
        None => {}
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> CalendarMonth {
        CalendarMonth::new(2026, 10).expect("valid month")
    }

    fn simulate_args(debts: &[&str], capacity: &str) -> SimulateArgs {
        SimulateArgs {
            debts: debts.iter().map(|d| d.to_string()).collect(),
            capacity: capacity.to_string(),
            lump_sum: "0".to_string(),
            start: None,
            trace: false,
            json: false,
        }
    }

    #[test]
    fn cli_parses_simulate_subcommand() {
        let cli = Cli::try_parse_from([
            "snowball",
            "simulate",
            "--debt",
            "Zip:1741.81:86.60",
            "--debt",
            "Visa:900:30",
            "--capacity",
            "400",
            "--start",
            "2027-01",
        ])
        .expect("valid args");

        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate command");
        };
        assert_eq!(args.debts.len(), 2);
        assert_eq!(args.start.as_deref(), Some("2027-01"));
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn cli_serve_defaults() {
        let cli = Cli::try_parse_from(["snowball", "serve", "--port", "9000"]).expect("valid args");
        let Command::Serve(args) = cli.command else {
            panic!("expected serve command");
        };
        assert_eq!(args.port, 9000);
    }

    #[test]
    fn cli_parses_progress_stage() {
        let cli = Cli::try_parse_from(["snowball", "progress", "--stage", "Run", "--basic-budget"])
            .expect("valid args");
        let Command::Progress(args) = cli.command else {
            panic!("expected progress command");
        };
        assert_eq!(args.stage, Stage::Run);
        assert_eq!(args.xp, 25);
        assert!(args.basic_budget);

        assert!(Cli::try_parse_from(["snowball", "progress", "--stage", "sprint"]).is_err());
    }

    #[test]
    fn mission_names_the_debt_paid_in_month_one() {
        // The lump sum clears "Tiny" before month 1, so the $200 goes to "Next".
        let mut args = simulate_args(&["Tiny:300:50", "Next:1000:100"], "150");
        args.lump_sum = "500".to_string();
        let report = run_simulate(&args, today()).expect("report");

        assert!(report.contains("Current mission: destroy 'Next' with $200.00 this month (payoff February 2027)"));
        assert!(!report.contains("destroy 'Tiny'"));
    }

    #[test]
    fn spending_report_tracks_a_purchase() {
        let args = SpendingArgs {
            weekly_budget: "100".to_string(),
            spent: "60".to_string(),
            add: Some("25".to_string()),
            json: false,
        };
        let report = run_spending(&args, Weekday::Saturday).expect("report");

        assert!(report.contains("Weekly spendable: $15"));
        assert!(report.contains("We have $15 left to enjoy together this week."));
        assert!(report.contains("Spent $85.00 of $100.00 (85%)"));
        assert!(report.contains("Resets in 1 day\n"));
    }

    #[test]
    fn spending_rejects_non_positive_purchase() {
        let args = SpendingArgs {
            weekly_budget: "100".to_string(),
            spent: "0".to_string(),
            add: Some("-5".to_string()),
            json: false,
        };
        assert!(matches!(
            run_spending(&args, Weekday::Monday),
            Err(CliError::RejectedSpending(_))
        ));
    }

    #[test]
    fn roadmap_report_projects_next_milestone() {
        let args = RoadmapArgs {
            savings: "1,600".to_string(),
            allocation: "200".to_string(),
            start: None,
            json: false,
        };
        let report = run_roadmap(&args, today()).expect("report");

        assert!(report.contains("Next milestone: One-Month Essentials ($2,200.00)"));
        assert!(report.contains("Progress to next milestone: 50%"));
        assert!(report.contains("Projected to reach by: January 2027"));
        assert!(report.contains("[x] Starter Emergency Fund"));
    }

    #[test]
    fn roadmap_json_without_allocation_omits_dates() {
        let args = RoadmapArgs {
            savings: "12000".to_string(),
            allocation: "0".to_string(),
            start: Some("2027-01".to_string()),
            json: true,
        };
        let output = run_roadmap(&args, today()).expect("report");
        let json: serde_json::Value = serde_json::from_str(&output).expect("valid JSON");

        assert_eq!(json["fullyFunded"], true);
        assert_eq!(json["projectedMonth"], serde_json::Value::Null);
    }

    #[test]
    fn progress_report_shows_level_and_unlock() {
        let report = run_progress(&ProgressArgs {
            stage: Stage::Crawl,
            xp: 140,
            basic_budget: true,
            tracked_spending: true,
            emergency_fund: false,
            shared_goals: false,
            json: false,
        })
        .expect("report");

        assert!(report.contains("Level 2 - Budget Buddies (140 XP, 60 XP to next level)"));
        assert!(report.contains("Stage 1 of 4: Crawl: Getting Started"));
        assert!(report.contains("Stage completion: 100%"));
        assert!(report.contains("Unlocked: Walk: Building Habits"));
        assert!(report.contains("2 stage(s) still locked"));
    }

    #[test]
    fn simulate_report_lists_timeline_and_freedom_date() {
        let args = simulate_args(&["Big:2000:100", "Small:1000:50"], "200");
        let report = run_simulate(&args, today()).expect("report");

        assert!(report.contains("Current mission: destroy 'Small' with $100.00"));
        assert!(report.contains("July 2027"));
        assert!(report.contains("Debt freedom date: November 2027"));
    }

    #[test]
    fn simulate_report_explains_low_capacity() {
        let args = simulate_args(&["Zip:1000:50"], "20");
        let report = run_simulate(&args, today()).expect("report");
        assert!(report.contains("doesn't cover the minimum payments ($50.00)"));
    }

    #[test]
    fn simulate_json_includes_trace_when_requested() {
        let mut args = simulate_args(&["Zip:500:50"], "100");
        args.json = true;
        args.trace = true;
        let output = run_simulate(&args, today()).expect("report");
        let json: serde_json::Value = serde_json::from_str(&output).expect("valid JSON");

        assert_eq!(json["timeline"][0]["payoffMonthIndex"], 5);
        assert_eq!(json["monthlyTrace"].as_array().map(Vec::len), Some(5));
    }

    #[test]
    fn simulate_rejects_bad_debt_specs() {
        let args = simulate_args(&["Zip"], "100");
        assert!(matches!(
            run_simulate(&args, today()),
            Err(CliError::Input(InputError::MalformedDebtSpec(_)))
        ));

        let args = simulate_args(&["Zip:abc:10"], "100");
        assert!(matches!(
            run_simulate(&args, today()),
            Err(CliError::Input(InputError::NonPositive { .. }))
        ));
    }

    #[test]
    fn budget_report_shows_buckets() {
        let report = run_budget(&BudgetArgs {
            income: "$6,000".to_string(),
            essentials: "4000".to_string(),
            growth: 52,
            stability: 31,
            rewards: 17,
            json: false,
        })
        .expect("report");

        assert!(report.contains("Growth"));
        assert!(report.contains("$1,040.00"));
        assert!(report.contains("Guilt-free weekly spending: $78.52"));
    }
}
