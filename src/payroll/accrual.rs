//! Shift-based salary accrual.
//!
//! Two pay models exist and only one is active at a time, chosen by
//! configuration:
//!
//! - hourly overtime: every record pays the base rate, overtime records add a
//!   fixed number of hours at an hourly bonus;
//! - full-day premium: morning, evening and full-day records pay the base rate,
//!   full-day records additionally pay the difference up to the full-day rate.

use serde::Serialize;
use std::sync::Arc;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::model::attendance::{AttendanceRecord, ShiftKind};

/// Rates a profile pays, in currency units per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayRates {
    pub base: i64,
    pub fullday: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AccrualModel {
    HourlyOvertime,
    FulldayPremium,
}

/// Derived day counts and gross salary for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Accrual {
    /// Days paid at the base rate
    #[schema(example = 6)]
    pub day_count: u32,
    /// Overtime or full-day shifts, depending on the model
    #[schema(example = 1)]
    pub premium_days: u32,
    /// Bonus hours, always zero under the full-day model
    #[schema(example = 4)]
    pub overtime_hours: u32,
    #[schema(example = 1740)]
    pub gross: i64,
}

pub trait AccrualPolicy: Send + Sync {
    fn model(&self) -> AccrualModel;

    /// Whether a check-in with this shift is allowed.
    fn accepts(&self, shift: ShiftKind) -> bool;

    /// The shift a morning or evening record upgrades to.
    fn premium_shift(&self) -> ShiftKind;

    fn accrue(&self, shifts: &[ShiftKind], rates: &PayRates) -> Accrual;
}

#[derive(Debug, Clone, Copy)]
pub struct HourlyOvertime {
    pub hourly_bonus: i64,
    pub hours_per_shift: u32,
}

impl Default for HourlyOvertime {
    fn default() -> Self {
        Self {
            hourly_bonus: 60,
            hours_per_shift: 4,
        }
    }
}

impl AccrualPolicy for HourlyOvertime {
    fn model(&self) -> AccrualModel {
        AccrualModel::HourlyOvertime
    }

    fn accepts(&self, shift: ShiftKind) -> bool {
        shift != ShiftKind::Fullday
    }

    fn premium_shift(&self) -> ShiftKind {
        ShiftKind::Overtime
    }

    fn accrue(&self, shifts: &[ShiftKind], rates: &PayRates) -> Accrual {
        let day_count = shifts.len() as u32;
        let premium_days = count(shifts, |s| s == ShiftKind::Overtime);
        let overtime_hours = premium_days * self.hours_per_shift;
        let gross = i64::from(day_count)
            .saturating_mul(rates.base)
            .saturating_add(i64::from(overtime_hours).saturating_mul(self.hourly_bonus));

        Accrual {
            day_count,
            premium_days,
            overtime_hours,
            gross,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FulldayPremium;

impl AccrualPolicy for FulldayPremium {
    fn model(&self) -> AccrualModel {
        AccrualModel::FulldayPremium
    }

    fn accepts(&self, shift: ShiftKind) -> bool {
        shift != ShiftKind::Overtime
    }

    fn premium_shift(&self) -> ShiftKind {
        ShiftKind::Fullday
    }

    fn accrue(&self, shifts: &[ShiftKind], rates: &PayRates) -> Accrual {
        // full-day records are counted in both totals
        let day_count = count(shifts, |s| s != ShiftKind::Overtime);
        let premium_days = count(shifts, |s| s == ShiftKind::Fullday);
        let gross = i64::from(day_count)
            .saturating_mul(rates.base)
            .saturating_add(
                i64::from(premium_days).saturating_mul(rates.fullday.saturating_sub(rates.base)),
            );

        Accrual {
            day_count,
            premium_days,
            overtime_hours: 0,
            gross,
        }
    }
}

fn count(shifts: &[ShiftKind], pred: impl Fn(ShiftKind) -> bool) -> u32 {
    shifts.iter().filter(|s| pred(**s)).count() as u32
}

pub fn build_policy(
    model: AccrualModel,
    hourly_bonus: i64,
    hours_per_shift: u32,
) -> Arc<dyn AccrualPolicy> {
    match model {
        AccrualModel::HourlyOvertime => Arc::new(HourlyOvertime {
            hourly_bonus,
            hours_per_shift,
        }),
        AccrualModel::FulldayPremium => Arc::new(FulldayPremium),
    }
}

pub fn shifts_of(records: &[AttendanceRecord]) -> Vec<ShiftKind> {
    records.iter().map(|r| r.shift).collect()
}

/// Gross minus everything already withdrawn.
pub fn available_balance(gross: i64, withdrawals: impl IntoIterator<Item = i64>) -> i64 {
    withdrawals
        .into_iter()
        .fold(gross, |left, amount| left.saturating_sub(amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ShiftKind::*;

    const RATES: PayRates = PayRates {
        base: 300,
        fullday: 450,
    };

    fn repeat(shift: ShiftKind, n: usize) -> Vec<ShiftKind> {
        vec![shift; n]
    }

    #[test]
    fn hourly_model_worked_example() {
        let mut shifts = repeat(Morning, 3);
        shifts.extend(repeat(Evening, 2));
        shifts.push(Overtime);

        let accrual = HourlyOvertime::default().accrue(&shifts, &RATES);
        assert_eq!(accrual.day_count, 6);
        assert_eq!(accrual.premium_days, 1);
        assert_eq!(accrual.overtime_hours, 4);
        // 6 days at the base rate plus 4 bonus hours
        assert_eq!(accrual.gross, 6 * 300 + 4 * 60);
    }

    #[test]
    fn hourly_model_matches_formula() {
        let policy = HourlyOvertime::default();
        for days in 0..8usize {
            for ot in 0..=days {
                for rate in [0, 1, 275, 300] {
                    let mut shifts = repeat(Morning, days - ot);
                    shifts.extend(repeat(Overtime, ot));
                    let rates = PayRates { base: rate, fullday: 0 };
                    let accrual = policy.accrue(&shifts, &rates);
                    let hours = (ot * 4) as i64;
                    assert_eq!(accrual.gross, days as i64 * rate + hours * 60);
                }
            }
        }
    }

    #[test]
    fn fullday_model_pays_the_differential() {
        let shifts = vec![Morning, Evening, Fullday, Fullday];
        let accrual = FulldayPremium.accrue(&shifts, &RATES);
        assert_eq!(accrual.day_count, 4);
        assert_eq!(accrual.premium_days, 2);
        assert_eq!(accrual.overtime_hours, 0);
        assert_eq!(accrual.gross, 4 * 300 + 2 * 150);
    }

    #[test]
    fn fullday_model_ignores_overtime_records() {
        let shifts = vec![Morning, Overtime];
        let accrual = FulldayPremium.accrue(&shifts, &RATES);
        assert_eq!(accrual.day_count, 1);
        assert_eq!(accrual.gross, 300);
    }

    #[test]
    fn fullday_gross_never_drops_as_fullday_rate_rises() {
        let shifts = vec![Morning, Fullday, Fullday, Evening];
        let mut previous = i64::MIN;
        for fullday in (0..=1000).step_by(50) {
            let rates = PayRates { base: 300, fullday };
            let gross = FulldayPremium.accrue(&shifts, &rates).gross;
            assert!(gross >= previous);
            previous = gross;
        }
    }

    #[test]
    fn accrual_ignores_record_order() {
        let forward = vec![Morning, Overtime, Evening, Overtime, Morning];
        let mut reversed = forward.clone();
        reversed.reverse();
        let policy = HourlyOvertime::default();
        let first = policy.accrue(&forward, &RATES);
        assert_eq!(first, policy.accrue(&reversed, &RATES));
        assert_eq!(first, policy.accrue(&forward, &RATES));
    }

    #[test]
    fn huge_rates_saturate_instead_of_overflowing() {
        let rates = PayRates {
            base: i64::MAX / 2,
            fullday: i64::MAX,
        };
        let hourly = HourlyOvertime::default().accrue(&repeat(Morning, 3), &rates);
        assert_eq!(hourly.gross, i64::MAX);
        let fullday = FulldayPremium.accrue(&repeat(Fullday, 3), &rates);
        assert_eq!(fullday.gross, i64::MAX);
    }

    #[test]
    fn policies_accept_their_own_premium_shift_only() {
        let hourly = HourlyOvertime::default();
        assert!(hourly.accepts(Overtime));
        assert!(!hourly.accepts(Fullday));
        assert_eq!(hourly.premium_shift(), Overtime);

        assert!(FulldayPremium.accepts(Fullday));
        assert!(!FulldayPremium.accepts(Overtime));
        assert_eq!(FulldayPremium.premium_shift(), Fullday);
    }

    #[test]
    fn balance_subtracts_withdrawals() {
        assert_eq!(available_balance(1740, [500]), 1240);
        assert_eq!(available_balance(1740, Vec::<i64>::new()), 1740);
        assert_eq!(available_balance(1000, [200, 300, 500]), 0);
    }

    #[test]
    fn model_names_parse_from_config_strings() {
        assert_eq!(
            "hourly_overtime".parse::<AccrualModel>().unwrap(),
            AccrualModel::HourlyOvertime
        );
        assert_eq!(
            "fullday_premium".parse::<AccrualModel>().unwrap(),
            AccrualModel::FulldayPremium
        );
        assert!("weekly".parse::<AccrualModel>().is_err());
        let policy = build_policy(AccrualModel::HourlyOvertime, 60, 4);
        assert_eq!(policy.model(), AccrualModel::HourlyOvertime);
    }
}
