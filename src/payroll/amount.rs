use serde::Deserialize;

use crate::payroll::error::PayrollError;

/// A withdrawal amount as typed into a form: either a JSON number or text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(serde_json::Number),
    Text(String),
}

/// Accepts positive whole currency units only.
pub fn parse_amount(input: &AmountInput) -> Result<i64, PayrollError> {
    let amount = match input {
        AmountInput::Number(n) => n.as_i64().ok_or(PayrollError::InvalidAmount)?,
        AmountInput::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| PayrollError::InvalidAmount)?,
    };

    if amount <= 0 {
        return Err(PayrollError::InvalidAmount);
    }
    Ok(amount)
}
