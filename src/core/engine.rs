use super::types::{
    Debt, DebtMonthState, InvalidReason, MonthlyPaymentRow, PayoffEvent, PayoffInputs,
    SimulationResult,
};

/// Upper bound on simulated months. Minimums that are tiny next to their
/// balance can reach it even when capacity covers every minimum.
pub const MAX_SIMULATED_MONTHS: u32 = 1200;

#[derive(Debug)]
struct SimulatedDebt<'a> {
    debt: &'a Debt,
    balance: f64,
    paid_off: bool,
}

impl SimulatedDebt<'_> {
    fn is_outstanding(&self) -> bool {
        self.balance > 0.0
    }
}

pub fn simulate(inputs: &PayoffInputs) -> SimulationResult {
    run_simulation(inputs, false).0
}

pub fn run_monthly_payment_trace(inputs: &PayoffInputs) -> Vec<MonthlyPaymentRow> {
    run_simulation(inputs, true).1
}

/// One pass that yields both the result and the month-by-month ledger.
pub fn simulate_with_trace(inputs: &PayoffInputs) -> (SimulationResult, Vec<MonthlyPaymentRow>) {
    run_simulation(inputs, true)
}

/// Stable ascending sort by starting balance; ties keep input order.
pub fn order_debts(debts: &[Debt]) -> Vec<Debt> {
    let mut ordered = debts.to_vec();
    ordered.sort_by(|a, b| a.original_amount.total_cmp(&b.original_amount));
    ordered
}

pub fn total_min_payments(debts: &[Debt]) -> f64 {
    debts.iter().map(|debt| debt.min_payment).sum()
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn run_simulation(
    inputs: &PayoffInputs,
    record_trace: bool,
) -> (SimulationResult, Vec<MonthlyPaymentRow>) {
    let monthly_capacity = finite_or_zero(inputs.monthly_capacity);
    let lump_sum = finite_or_zero(inputs.lump_sum).max(0.0);
    let total_min = total_min_payments(&inputs.debts);

    let invalid_reason = if inputs.debts.is_empty() {
        Some(InvalidReason::NoDebts)
    } else if monthly_capacity < total_min {
        Some(InvalidReason::CapacityBelowMinimums)
    } else {
        None
    };
    if let Some(reason) = invalid_reason {
        tracing::debug!(
            ?reason,
            debts = inputs.debts.len(),
            monthly_capacity,
            total_min,
            "payoff simulation skipped"
        );
        let result = SimulationResult {
            is_valid: false,
            invalid_reason: Some(reason),
            ordered_debts: Vec::new(),
            timeline: Vec::new(),
            final_freedom_date: None,
            first_month_target_id: None,
            first_month_mission_payment: 0.0,
            total_min_payments: total_min,
            monthly_capacity,
            lump_sum_applied: 0.0,
            months_simulated: 0,
            completed: false,
        };
        return (result, Vec::new());
    }

    let ordered_debts = order_debts(&inputs.debts);
    let mut sim: Vec<SimulatedDebt<'_>> = ordered_debts
        .iter()
        .map(|debt| SimulatedDebt {
            debt,
            balance: debt.original_amount,
            paid_off: false,
        })
        .collect();

    let mut timeline = Vec::with_capacity(sim.len());
    let mut freed_cashflow = 0.0;
    let mut lump_sum_applied = 0.0;

    if lump_sum > 0.0 {
        let first = &mut sim[0];
        lump_sum_applied = lump_sum.min(first.balance.max(0.0));
        first.balance -= lump_sum;
        // A debt the lump sum clears frees its minimum before month 1's pool.
        record_payoffs(inputs, &mut sim, 1, &mut timeline, &mut freed_cashflow);
    }

    let mut rows = Vec::new();
    let mut first_month_target_id = None;
    let mut first_month_mission_payment = 0.0;
    let mut month_index = 0;
    let mut months_simulated = 0;

    while sim.iter().any(SimulatedDebt::is_outstanding) {
        month_index += 1;
        if month_index > MAX_SIMULATED_MONTHS {
            tracing::warn!(
                paid_off = timeline.len(),
                debts = sim.len(),
                "payoff simulation hit the {MAX_SIMULATED_MONTHS}-month bound"
            );
            break;
        }
        months_simulated = month_index;

        let available_payment = monthly_capacity + freed_cashflow;
        let mut pool = available_payment;
        let mut payments = vec![0.0; sim.len()];

        let target = sim.iter().position(SimulatedDebt::is_outstanding);
        for (idx, entry) in sim.iter_mut().enumerate() {
            if !entry.is_outstanding() || Some(idx) == target {
                continue;
            }
            let payment = entry.debt.min_payment.min(entry.balance);
            entry.balance -= payment;
            pool -= payment;
            payments[idx] += payment;
        }

        // Re-identify the target after minimums; the remainder all goes to it.
        let target = sim.iter().position(SimulatedDebt::is_outstanding);
        if let Some(idx) = target {
            let entry = &mut sim[idx];
            let payment = pool.min(entry.balance).max(0.0);
            if month_index == 1 {
                first_month_target_id = Some(entry.debt.id.clone());
                first_month_mission_payment = payment;
            }
            entry.balance -= payment;
            payments[idx] += payment;
        }

        record_payoffs(
            inputs,
            &mut sim,
            month_index,
            &mut timeline,
            &mut freed_cashflow,
        );

        if record_trace {
            rows.push(MonthlyPaymentRow {
                month_index,
                month: inputs.reference_month.plus_months(month_index - 1),
                available_payment,
                target_debt_id: target.map(|idx| sim[idx].debt.id.clone()),
                total_paid: payments.iter().sum(),
                remaining_balance: sim.iter().map(|entry| entry.balance.max(0.0)).sum(),
                debts: sim
                    .iter()
                    .zip(&payments)
                    .map(|(entry, payment)| DebtMonthState {
                        debt_id: entry.debt.id.clone(),
                        payment: *payment,
                        balance: entry.balance.max(0.0),
                    })
                    .collect(),
            });
        }
    }

    let completed = timeline.len() == ordered_debts.len();
    let final_freedom_date = timeline.last().map(|event| event.payoff_date);

    tracing::debug!(
        debts = ordered_debts.len(),
        months_simulated,
        completed,
        final_freedom_date = final_freedom_date.map(|month| month.to_string()),
        "payoff simulation finished"
    );

    let result = SimulationResult {
        is_valid: true,
        invalid_reason: None,
        ordered_debts,
        timeline,
        final_freedom_date,
        first_month_target_id,
        first_month_mission_payment,
        total_min_payments: total_min,
        monthly_capacity,
        lump_sum_applied,
        months_simulated,
        completed,
    };
    (result, rows)
}

fn record_payoffs(
    inputs: &PayoffInputs,
    sim: &mut [SimulatedDebt<'_>],
    month_index: u32,
    timeline: &mut Vec<PayoffEvent>,
    freed_cashflow: &mut f64,
) {
    for entry in sim.iter_mut().filter(|entry| !entry.paid_off) {
        if entry.balance > 0.0 {
            continue;
        }
        entry.paid_off = true;
        *freed_cashflow += entry.debt.min_payment;
        timeline.push(PayoffEvent {
            debt_id: entry.debt.id.clone(),
            debt_name: entry.debt.name.clone(),
            payoff_month_index: month_index,
            payoff_date: inputs.reference_month.plus_months(month_index - 1),
            starting_balance: entry.debt.original_amount,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CalendarMonth;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};
    use proptest::collection::vec;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn debt(id: &str, amount: f64, min_payment: f64) -> Debt {
        Debt {
            id: id.to_string(),
            name: format!("{id} card"),
            original_amount: amount,
            min_payment,
        }
    }

    fn reference_month() -> CalendarMonth {
        CalendarMonth::new(2026, 10).expect("valid month")
    }

    fn inputs(debts: Vec<Debt>, monthly_capacity: f64, lump_sum: f64) -> PayoffInputs {
        PayoffInputs {
            debts,
            monthly_capacity,
            lump_sum,
            reference_month: reference_month(),
        }
    }

    fn debts_from_cents(raw: &[(u32, u32)]) -> Vec<Debt> {
        raw.iter()
            .enumerate()
            .map(|(idx, (amount, min))| {
                debt(
                    &format!("d{idx}"),
                    f64::from(*amount) / 100.0,
                    f64::from(*min) / 100.0,
                )
            })
            .collect()
    }

    /// Minimum payment is `share` per mille of the balance, so every debt
    /// clears within 1000 months on its minimum alone.
    fn debts_with_min_share(raw: &[(u32, u32)]) -> Vec<Debt> {
        raw.iter()
            .enumerate()
            .map(|(idx, (amount, share))| {
                let amount = f64::from(*amount) / 100.0;
                debt(&format!("d{idx}"), amount, amount * f64::from(*share) / 1000.0)
            })
            .collect()
    }

    #[test]
    fn smaller_debt_is_targeted_first() {
        let result = simulate(&inputs(
            vec![debt("big", 2000.0, 100.0), debt("small", 1000.0, 50.0)],
            200.0,
            0.0,
        ));

        assert!(result.is_valid);
        assert_eq!(result.ordered_debts[0].id, "small");
        assert_eq!(result.timeline.len(), 2);
        assert_eq!(result.timeline[0].debt_id, "small");
        assert_eq!(result.timeline[1].debt_id, "big");
        assert_approx(result.first_month_mission_payment, 100.0);
    }

    #[test]
    fn two_debt_oracle_matches_hand_calculation() {
        // small: 100/month for 10 months. big: 100/month for 10 months leaves
        // 1000, then 200 + 50 freed = 250/month clears it in 4 more months.
        let result = simulate(&inputs(
            vec![debt("small", 1000.0, 50.0), debt("big", 2000.0, 100.0)],
            200.0,
            0.0,
        ));

        assert_eq!(result.timeline[0].payoff_month_index, 10);
        assert_eq!(result.timeline[1].payoff_month_index, 14);
        assert_eq!(
            result.timeline[0].payoff_date,
            CalendarMonth::new(2027, 7).expect("valid month")
        );
        assert_eq!(
            result.final_freedom_date,
            Some(CalendarMonth::new(2027, 11).expect("valid month"))
        );
        assert_eq!(result.months_simulated, 14);
        assert!(result.completed);
    }

    #[test]
    fn capacity_equal_to_minimums_pays_single_debt_in_ten_months() {
        let result = simulate(&inputs(vec![debt("only", 500.0, 50.0)], 50.0, 0.0));

        assert!(result.is_valid);
        assert_eq!(result.timeline.len(), 1);
        assert_eq!(result.timeline[0].payoff_month_index, 10);
        assert_approx(result.first_month_mission_payment, 50.0);
    }

    #[test]
    fn lump_sum_clearing_first_debt_pays_it_off_in_month_one() {
        let result = simulate(&inputs(vec![debt("only", 1000.0, 100.0)], 100.0, 1000.0));

        assert!(result.is_valid);
        assert_eq!(result.timeline.len(), 1);
        assert_eq!(result.timeline[0].payoff_month_index, 1);
        assert_eq!(result.timeline[0].payoff_date, reference_month());
        assert_eq!(result.months_simulated, 0);
        assert_approx(result.first_month_mission_payment, 0.0);
        assert_approx(result.lump_sum_applied, 1000.0);
    }

    #[test]
    fn lump_sum_payoff_frees_minimum_before_first_month_pool() {
        // Month 1 pool = 150 capacity + 50 freed = 200, all of it to "next".
        let debts = vec![debt("tiny", 300.0, 50.0), debt("next", 1000.0, 100.0)];
        let rows = run_monthly_payment_trace(&inputs(debts.clone(), 150.0, 500.0));
        let result = simulate(&inputs(debts, 150.0, 500.0));

        assert_eq!(result.timeline[0].debt_id, "tiny");
        assert_eq!(result.timeline[0].payoff_month_index, 1);
        assert_approx(result.lump_sum_applied, 300.0);
        assert_approx(rows[0].available_payment, 200.0);
        assert_approx(result.first_month_mission_payment, 200.0);
        assert_eq!(result.first_month_target_id.as_deref(), Some("next"));
        assert_eq!(result.timeline[1].payoff_month_index, 5);
    }

    #[test]
    fn single_pass_trace_matches_separate_runs() {
        let payoff = inputs(
            vec![debt("tiny", 300.0, 50.0), debt("next", 1000.0, 100.0)],
            150.0,
            120.0,
        );
        let (result, rows) = simulate_with_trace(&payoff);

        assert_eq!(result, simulate(&payoff));
        assert_eq!(rows, run_monthly_payment_trace(&payoff));
        assert_eq!(rows.len() as u32, result.months_simulated);
    }

    #[test]
    fn partial_lump_sum_reduces_first_debt_only() {
        let rows = run_monthly_payment_trace(&inputs(
            vec![debt("a", 1000.0, 50.0), debt("b", 1500.0, 50.0)],
            100.0,
            400.0,
        ));

        assert_approx(rows[0].debts[0].balance, 550.0);
        assert_approx(rows[0].debts[1].balance, 1450.0);
    }

    #[test]
    fn capacity_below_minimums_is_invalid_without_timeline() {
        let result = simulate(&inputs(
            vec![debt("a", 1000.0, 50.0), debt("b", 2000.0, 100.0)],
            149.99,
            0.0,
        ));

        assert!(!result.is_valid);
        assert_eq!(
            result.invalid_reason,
            Some(InvalidReason::CapacityBelowMinimums)
        );
        assert!(result.timeline.is_empty());
        assert!(result.ordered_debts.is_empty());
        assert_eq!(result.final_freedom_date, None);
        assert_approx(result.total_min_payments, 150.0);
    }

    #[test]
    fn no_debts_is_invalid() {
        let result = simulate(&inputs(Vec::new(), 500.0, 100.0));
        assert!(!result.is_valid);
        assert_eq!(result.invalid_reason, Some(InvalidReason::NoDebts));
        assert!(result.timeline.is_empty());
    }

    #[test]
    fn non_finite_capacity_is_treated_as_zero() {
        let result = simulate(&inputs(vec![debt("a", 100.0, 10.0)], f64::NAN, 0.0));
        assert!(!result.is_valid);
        assert_approx(result.monthly_capacity, 0.0);
    }

    #[test]
    fn validity_gate_is_exact_at_sum_of_minimums() {
        let debts = vec![
            debt("a", 800.0, 33.3),
            debt("b", 1200.0, 41.7),
            debt("c", 90.0, 15.0),
        ];
        let total = total_min_payments(&debts);

        assert!(simulate(&inputs(debts.clone(), total, 0.0)).is_valid);
        assert!(!simulate(&inputs(debts, total - 0.01, 0.0)).is_valid);
    }

    #[test]
    fn equal_balances_keep_input_order_and_share_a_payoff_month() {
        let result = simulate(&inputs(
            vec![debt("first", 100.0, 50.0), debt("second", 100.0, 50.0)],
            200.0,
            0.0,
        ));

        assert_eq!(result.ordered_debts[0].id, "first");
        assert_eq!(result.timeline[0].debt_id, "first");
        assert_eq!(result.timeline[1].debt_id, "second");
        // Month 1: second pays its 50 minimum, first takes 100 of the
        // remaining 150. Month 2: second clears its last 50.
        assert_eq!(result.timeline[0].payoff_month_index, 1);
        assert_eq!(result.timeline[1].payoff_month_index, 2);
    }

    #[test]
    fn debts_cleared_in_the_same_month_follow_sort_order() {
        let result = simulate(&inputs(
            vec![debt("larger", 60.0, 60.0), debt("smaller", 50.0, 10.0)],
            500.0,
            0.0,
        ));

        assert_eq!(result.timeline[0].debt_id, "smaller");
        assert_eq!(result.timeline[1].debt_id, "larger");
        assert_eq!(result.timeline[0].payoff_month_index, 1);
        assert_eq!(result.timeline[1].payoff_month_index, 1);
    }

    #[test]
    fn ordering_is_fixed_by_original_amount_not_remaining_balance() {
        // "high-min" overtakes "low-min" in remaining balance after month 1,
        // but "low-min" stays the target until cleared.
        let rows = run_monthly_payment_trace(&inputs(
            vec![debt("low-min", 500.0, 10.0), debt("high-min", 600.0, 400.0)],
            410.0,
            0.0,
        ));

        assert_eq!(rows[0].target_debt_id.as_deref(), Some("low-min"));
        assert!(rows[0].debts[1].balance < rows[0].debts[0].balance);
        assert_eq!(rows[1].target_debt_id.as_deref(), Some("low-min"));
    }

    #[test]
    fn trace_rows_match_timeline() {
        let input = inputs(
            vec![debt("a", 1000.0, 50.0), debt("b", 2000.0, 100.0)],
            200.0,
            0.0,
        );
        let rows = run_monthly_payment_trace(&input);
        let result = simulate(&input);

        assert_eq!(rows.len() as u32, result.months_simulated);
        assert_eq!(rows[0].month, reference_month());
        assert_approx(rows[0].total_paid, 200.0);
        assert_approx(rows[0].remaining_balance, 2800.0);
        let last = rows.last().expect("trace rows");
        assert_approx(last.remaining_balance, 0.0);
        assert_eq!(last.target_debt_id.as_deref(), Some("b"));
    }

    #[test]
    fn invalid_inputs_produce_empty_trace() {
        let rows = run_monthly_payment_trace(&inputs(vec![debt("a", 100.0, 60.0)], 50.0, 0.0));
        assert!(rows.is_empty());
    }

    #[test]
    fn iteration_bound_returns_partial_timeline() {
        // Valid, but a 1e-9 monthly payment cannot clear the balance in time.
        let result = simulate(&inputs(vec![debt("slow", 1_000_000.0, 1e-9)], 1e-9, 0.0));

        assert!(result.is_valid);
        assert_eq!(result.months_simulated, MAX_SIMULATED_MONTHS);
        assert!(result.timeline.is_empty());
        assert!(!result.completed);
        assert_eq!(result.final_freedom_date, None);
    }

    #[test]
    fn result_serializes_camel_case_fields() {
        let result = simulate(&inputs(vec![debt("a", 500.0, 50.0)], 100.0, 0.0));
        let json = serde_json::to_string(&result).expect("result should serialize");
        assert!(json.contains("\"orderedDebts\""));
        assert!(json.contains("\"originalAmount\""));
        assert!(json.contains("\"payoffMonthIndex\""));
        assert!(json.contains("\"finalFreedomDate\""));
        assert!(json.contains("\"firstMonthMissionPayment\""));
        assert!(json.contains("\"firstMonthTargetId\":\"a\""));
        assert!(json.contains("\"isValid\":true"));
        assert!(json.contains("\"label\":\"February 2027\""));
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_ordered_debts_are_sorted_and_stable(
            raw in vec((1u32..50_000, 1u32..5_000), 1..8),
        ) {
            let debts = debts_from_cents(&raw);
            let capacity = total_min_payments(&debts) + 10.0;
            let result = simulate(&inputs(debts.clone(), capacity, 0.0));

            prop_assert_eq!(result.ordered_debts.len(), debts.len());
            for pair in result.ordered_debts.windows(2) {
                prop_assert!(pair[0].original_amount <= pair[1].original_amount);
                if pair[0].original_amount == pair[1].original_amount {
                    let left = debts.iter().position(|d| d.id == pair[0].id);
                    let right = debts.iter().position(|d| d.id == pair[1].id);
                    prop_assert!(left < right);
                }
            }
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_payments_conserve_balances_and_never_increase_them(
            raw in vec((100u32..500_000, 1u32..=200), 1..6),
            surplus_cents in 0u32..50_000,
            lump_cents in 0u32..300_000,
        ) {
            let debts = debts_with_min_share(&raw);
            let capacity = total_min_payments(&debts) + f64::from(surplus_cents) / 100.0;
            let lump_sum = f64::from(lump_cents) / 100.0;
            let input = inputs(debts, capacity, lump_sum);
            let result = simulate(&input);
            let rows = run_monthly_payment_trace(&input);

            prop_assert!(result.is_valid);
            prop_assert!(result.completed);
            let ordered = &result.ordered_debts;
            let mut previous: Vec<f64> = ordered.iter().map(|d| d.original_amount).collect();
            previous[0] = (previous[0] - lump_sum).max(0.0);

            for row in &rows {
                for (idx, state) in row.debts.iter().enumerate() {
                    prop_assert!(state.payment >= 0.0);
                    prop_assert!(state.balance >= 0.0);
                    prop_assert!(state.balance <= previous[idx] + EPS);
                    previous[idx] = state.balance;
                }
                prop_assert!(row.total_paid <= row.available_payment + EPS);
            }

            for (idx, debt) in ordered.iter().enumerate() {
                let paid: f64 = rows.iter().map(|row| row.debts[idx].payment).sum();
                let applied_lump = if idx == 0 { result.lump_sum_applied } else { 0.0 };
                let tolerance = 1e-9 * debt.original_amount.max(1.0) * rows.len().max(1) as f64;
                prop_assert!(
                    (paid + applied_lump - debt.original_amount).abs() <= tolerance,
                    "debt {} paid {} + lump {} != {}",
                    debt.id,
                    paid,
                    applied_lump,
                    debt.original_amount
                );
            }
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_valid_inputs_pay_off_every_debt_once(
            raw in vec((100u32..2_000_000, 1u32..=200), 1..7),
            surplus_cents in 0u32..100_000,
            lump_cents in 0u32..100_000,
        ) {
            let debts = debts_with_min_share(&raw);
            let capacity = total_min_payments(&debts) + f64::from(surplus_cents) / 100.0;
            let result = simulate(&inputs(debts.clone(), capacity, f64::from(lump_cents) / 100.0));

            prop_assert!(result.is_valid);
            prop_assert!(result.completed);
            prop_assert_eq!(result.timeline.len(), debts.len());
            prop_assert!(result.months_simulated <= MAX_SIMULATED_MONTHS);
            for pair in result.timeline.windows(2) {
                prop_assert!(pair[0].payoff_month_index <= pair[1].payoff_month_index);
            }
            for debt in &debts {
                let events = result.timeline.iter().filter(|e| e.debt_id == debt.id).count();
                prop_assert_eq!(events, 1);
            }
            let last = result.timeline.last().map(|e| e.payoff_date);
            prop_assert_eq!(result.final_freedom_date, last);
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(32))]

        #[test]
        fn prop_reruns_are_identical(
            raw in vec((1u32..1_000_000, 1u32..50_000), 0..6),
            capacity_cents in 0u32..200_000,
            lump_cents in 0u32..200_000,
        ) {
            let input = inputs(
                debts_from_cents(&raw),
                f64::from(capacity_cents) / 100.0,
                f64::from(lump_cents) / 100.0,
            );
            prop_assert_eq!(simulate(&input), simulate(&input));
            prop_assert_eq!(run_monthly_payment_trace(&input), run_monthly_payment_trace(&input));
        }
    }
}
