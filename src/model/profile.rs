use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::payroll::accrual::PayRates;
use crate::payroll::error::PayrollError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "user_id": 1,
        "name": "Somchai",
        "age": 27,
        "rate": 300,
        "fullday_rate": 450,
        "email": "somchai@example.com",
        "is_admin": false
    })
)]
pub struct Profile {
    pub user_id: u64,
    pub name: String,
    pub age: u8,
    /// Base daily rate
    pub rate: i64,
    /// Full-day rate, falls back to the configured default when absent
    pub fullday_rate: Option<i64>,
    pub email: String,
    pub is_admin: bool,
}

impl Profile {
    pub fn pay_rates(&self, fullday_default: i64) -> PayRates {
        PayRates {
            base: self.rate,
            fullday: self.fullday_rate.unwrap_or(fullday_default),
        }
    }
}

/// Self-service profile payload. Rates are only honoured on creation.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ProfileInput {
    #[schema(example = "Somchai")]
    pub name: String,
    #[schema(example = 27)]
    pub age: u8,
    #[schema(example = 300)]
    pub rate: Option<i64>,
    #[schema(example = 450)]
    pub fullday_rate: Option<i64>,
    #[schema(example = "somchai@example.com")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RatesInput {
    #[schema(example = 320)]
    pub rate: i64,
    #[schema(example = 480)]
    pub fullday_rate: Option<i64>,
}

/// Upper bound for a daily rate.
pub const MAX_RATE: i64 = 1_000_000;

pub fn validate_rates(rate: i64, fullday_rate: Option<i64>) -> Result<(), PayrollError> {
    if !(0..=MAX_RATE).contains(&rate) {
        return Err(PayrollError::InvalidProfile(format!(
            "rate must be between 0 and {}",
            MAX_RATE
        )));
    }
    if fullday_rate.is_some_and(|r| !(0..=MAX_RATE).contains(&r)) {
        return Err(PayrollError::InvalidProfile(format!(
            "fullday_rate must be between 0 and {}",
            MAX_RATE
        )));
    }
    Ok(())
}

pub fn validate_profile_input(input: &ProfileInput) -> Result<(), PayrollError> {
    if input.name.trim().is_empty() {
        return Err(PayrollError::InvalidProfile("name must not be empty".into()));
    }
    if !(1..=100).contains(&input.age) {
        return Err(PayrollError::InvalidProfile(
            "age must be between 1 and 100".into(),
        ));
    }
    if let Some(email) = &input.email {
        if !email.contains('@') {
            return Err(PayrollError::InvalidProfile("email is malformed".into()));
        }
    }
    validate_rates(input.rate.unwrap_or(0), input.fullday_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, age: u8, rate: Option<i64>) -> ProfileInput {
        ProfileInput {
            name: name.to_string(),
            age,
            rate,
            fullday_rate: None,
            email: None,
        }
    }

    #[test]
    fn accepts_a_reasonable_profile() {
        assert!(validate_profile_input(&input("Somchai", 27, Some(300))).is_ok());
    }

    #[test]
    fn rejects_blank_name_bad_age_and_negative_rate() {
        assert!(validate_profile_input(&input("  ", 27, Some(300))).is_err());
        assert!(validate_profile_input(&input("A", 0, Some(300))).is_err());
        assert!(validate_profile_input(&input("A", 101, Some(300))).is_err());
        assert!(validate_profile_input(&input("A", 30, Some(-1))).is_err());
    }

    #[test]
    fn rates_are_capped() {
        assert!(validate_rates(MAX_RATE, Some(MAX_RATE)).is_ok());
        assert!(matches!(
            validate_rates(MAX_RATE + 1, None),
            Err(PayrollError::InvalidProfile(_))
        ));
        assert!(validate_rates(300, Some(i64::MAX / 2)).is_err());
        assert!(validate_profile_input(&input("A", 30, Some(i64::MAX / 2))).is_err());
    }

    #[test]
    fn missing_fullday_rate_uses_default() {
        let profile = Profile {
            user_id: 1,
            name: "A".into(),
            age: 30,
            rate: 300,
            fullday_rate: None,
            email: "a@example.com".into(),
            is_admin: false,
        };
        let rates = profile.pay_rates(450);
        assert_eq!(rates.base, 300);
        assert_eq!(rates.fullday, 450);
    }
}
