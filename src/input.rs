//! Caller-side normalization of raw form input.
//!
//! The engine assumes clean numbers. Everything typed by a person passes
//! through here first: unparseable amounts become 0, and debt records are
//! checked before they reach a simulation.

use std::collections::HashSet;

use crate::core::Debt;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("debt #{position}: name must not be empty")]
    MissingName { position: usize },
    #[error("debt #{position} ({name}): {field} must be greater than 0")]
    NonPositive {
        position: usize,
        name: String,
        field: &'static str,
    },
    #[error("debt id '{0}' is used more than once")]
    DuplicateId(String),
    #[error("expected NAME:AMOUNT:MIN_PAYMENT, got '{0}'")]
    MalformedDebtSpec(String),
}

/// A debt as entered, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct DebtDraft {
    pub id: Option<String>,
    pub name: String,
    pub amount: f64,
    pub min_payment: f64,
}

/// Parses a currency amount typed by a person. Accepts surrounding
/// whitespace, a leading `$`, and `,` thousands separators; anything else
/// that does not parse to a finite number is 0.
pub fn parse_amount(raw: &str) -> f64 {
    let trimmed = raw.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };
    let (dollar, digits) = match unsigned.strip_prefix('$') {
        Some(rest) => (true, rest),
        None => (false, unsigned),
    };
    // A sign is only valid in front, so "--5" and "$-5" are garbage.
    if (negative || dollar) && digits.starts_with(['+', '-']) {
        return 0.0;
    }
    let cleaned: String = digits.chars().filter(|c| *c != ',').collect();
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => {
            if negative {
                -value
            } else {
                value
            }
        }
        _ => 0.0,
    }
}

/// Parses `NAME:AMOUNT:MIN_PAYMENT`. The name may itself contain colons;
/// the last two fields are always the numbers.
pub fn parse_debt_spec(spec: &str) -> Result<DebtDraft, InputError> {
    let malformed = || InputError::MalformedDebtSpec(spec.to_string());
    let mut parts = spec.rsplitn(3, ':');
    let min_payment = parts.next().ok_or_else(malformed)?;
    let amount = parts.next().ok_or_else(malformed)?;
    let name = parts.next().ok_or_else(malformed)?;
    Ok(DebtDraft {
        id: None,
        name: name.trim().to_string(),
        amount: parse_amount(amount),
        min_payment: parse_amount(min_payment),
    })
}

/// Validates drafts in input order and assigns `debt-N` ids where missing.
pub fn into_debts(drafts: Vec<DebtDraft>) -> Result<Vec<Debt>, InputError> {
    let mut seen = HashSet::with_capacity(drafts.len());
    let mut debts = Vec::with_capacity(drafts.len());

    for (idx, draft) in drafts.into_iter().enumerate() {
        let position = idx + 1;
        let name = draft.name.trim().to_string();
        if name.is_empty() {
            return Err(InputError::MissingName { position });
        }
        for (field, value) in [
            ("amount", draft.amount),
            ("minimum payment", draft.min_payment),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(InputError::NonPositive {
                    position,
                    name,
                    field,
                });
            }
        }

        let id = match draft.id.map(|id| id.trim().to_string()) {
            Some(id) if !id.is_empty() => id,
            _ => format!("debt-{position}"),
        };
        if !seen.insert(id.clone()) {
            return Err(InputError::DuplicateId(id));
        }

        debts.push(Debt {
            id,
            name,
            original_amount: draft.amount,
            min_payment: draft.min_payment,
        });
    }

    Ok(debts)
}
