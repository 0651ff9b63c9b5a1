//! Persistence for users, profiles, check-ins and withdrawals.
//!
//! Two backends share one contract: at most one check-in per user and date,
//! and a withdrawal is validated against the balance and recorded as a single
//! step, so two concurrent requests can never both spend the same balance.

pub mod memory;
pub mod mysql;

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::attendance::{AttendanceRecord, ShiftKind};
use crate::model::profile::Profile;
use crate::model::summary::AdminSummary;
use crate::model::user::User;
use crate::model::withdrawal::WithdrawalRecord;
use crate::payroll::accrual::{AccrualPolicy, available_balance};
use crate::payroll::error::PayrollError;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WithdrawalReceipt {
    pub withdrawal: WithdrawalRecord,
    /// Balance left after this withdrawal
    #[schema(example = 1240)]
    pub available: i64,
}

/// Balance check shared by both backends. Returns the balance that remains
/// once `amount` is taken.
pub(crate) fn settle(
    profile: &Profile,
    shifts: &[ShiftKind],
    withdrawn: i64,
    amount: i64,
    policy: &dyn AccrualPolicy,
    fullday_default: i64,
) -> Result<i64, PayrollError> {
    if amount <= 0 {
        return Err(PayrollError::InvalidAmount);
    }
    let gross = policy.accrue(shifts, &profile.pay_rates(fullday_default)).gross;
    let available = available_balance(gross, [withdrawn]);
    if amount > available {
        return Err(PayrollError::InsufficientBalance {
            requested: amount,
            available,
        });
    }
    Ok(available - amount)
}

/// Outcome of trying to upgrade a stored shift.
pub(crate) fn check_upgradable(
    date: NaiveDate,
    current: Option<ShiftKind>,
) -> Result<ShiftKind, PayrollError> {
    match current {
        None => Err(PayrollError::CheckInNotFound(date)),
        Some(shift) if !shift.is_normal() => Err(PayrollError::ShiftNotUpgradable(shift)),
        Some(shift) => Ok(shift),
    }
}

#[derive(Clone)]
pub enum Store {
    MySql(MySqlStore),
    Memory(MemoryStore),
}

impl Store {
    pub async fn create_user(&self, email: &str, password_hash: &str) -> Result<u64, PayrollError> {
        match self {
            Store::MySql(s) => s.create_user(email, password_hash).await,
            Store::Memory(s) => s.create_user(email, password_hash),
        }
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, PayrollError> {
        match self {
            Store::MySql(s) => s.find_user_by_email(email).await,
            Store::Memory(s) => Ok(s.find_user_by_email(email)),
        }
    }

    pub async fn get_profile(&self, user_id: u64) -> Result<Option<Profile>, PayrollError> {
        match self {
            Store::MySql(s) => s.get_profile(user_id).await,
            Store::Memory(s) => Ok(s.get_profile(user_id)),
        }
    }

    pub async fn save_profile(&self, profile: &Profile) -> Result<(), PayrollError> {
        match self {
            Store::MySql(s) => s.save_profile(profile).await,
            Store::Memory(s) => {
                s.save_profile(profile);
                Ok(())
            }
        }
    }

    pub async fn set_rates(
        &self,
        user_id: u64,
        rate: i64,
        fullday_rate: Option<i64>,
    ) -> Result<Profile, PayrollError> {
        match self {
            Store::MySql(s) => s.set_rates(user_id, rate, fullday_rate).await,
            Store::Memory(s) => s.set_rates(user_id, rate, fullday_rate),
        }
    }

    pub async fn insert_check_in(
        &self,
        user_id: u64,
        record: &AttendanceRecord,
    ) -> Result<(), PayrollError> {
        match self {
            Store::MySql(s) => s.insert_check_in(user_id, record).await,
            Store::Memory(s) => s.insert_check_in(user_id, record),
        }
    }

    /// Check-ins sorted by date, oldest first.
    pub async fn list_check_ins(&self, user_id: u64) -> Result<Vec<AttendanceRecord>, PayrollError> {
        match self {
            Store::MySql(s) => s.list_check_ins(user_id).await,
            Store::Memory(s) => Ok(s.list_check_ins(user_id)),
        }
    }

    pub async fn upgrade_shift(
        &self,
        user_id: u64,
        date: NaiveDate,
        target: ShiftKind,
    ) -> Result<AttendanceRecord, PayrollError> {
        match self {
            Store::MySql(s) => s.upgrade_shift(user_id, date, target).await,
            Store::Memory(s) => s.upgrade_shift(user_id, date, target),
        }
    }

    /// Withdrawals, newest first.
    pub async fn list_withdrawals(&self, user_id: u64) -> Result<Vec<WithdrawalRecord>, PayrollError> {
        match self {
            Store::MySql(s) => s.list_withdrawals(user_id).await,
            Store::Memory(s) => Ok(s.list_withdrawals(user_id)),
        }
    }

    pub async fn withdraw(
        &self,
        user_id: u64,
        amount: i64,
        policy: &dyn AccrualPolicy,
        fullday_default: i64,
    ) -> Result<WithdrawalReceipt, PayrollError> {
        match self {
            Store::MySql(s) => s.withdraw(user_id, amount, policy, fullday_default).await,
            Store::Memory(s) => s.withdraw(user_id, amount, policy, fullday_default),
        }
    }

    pub async fn admin_summary(&self) -> Result<AdminSummary, PayrollError> {
        match self {
            Store::MySql(s) => s.admin_summary().await,
            Store::Memory(s) => Ok(s.admin_summary()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payroll::accrual::HourlyOvertime;

    fn profile(rate: i64) -> Profile {
        Profile {
            user_id: 1,
            name: "A".into(),
            age: 30,
            rate,
            fullday_rate: None,
            email: "a@example.com".into(),
            is_admin: false,
        }
    }

    #[test]
    fn settle_takes_amount_from_available() {
        let shifts = vec![ShiftKind::Morning; 5];
        let policy = HourlyOvertime::default();
        let left = settle(&profile(300), &shifts, 500, 400, &policy, 450).unwrap();
        assert_eq!(left, 1500 - 500 - 400);
    }

    #[test]
    fn settle_rejects_overdraw() {
        let shifts = vec![ShiftKind::Morning; 2];
        let policy = HourlyOvertime::default();
        let err = settle(&profile(300), &shifts, 0, 601, &policy, 450).unwrap_err();
        assert!(matches!(
            err,
            PayrollError::InsufficientBalance {
                requested: 601,
                available: 600
            }
        ));
    }

    #[test]
    fn only_normal_shifts_are_upgradable() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert!(check_upgradable(day, Some(ShiftKind::Evening)).is_ok());
        assert!(matches!(
            check_upgradable(day, Some(ShiftKind::Overtime)),
            Err(PayrollError::ShiftNotUpgradable(ShiftKind::Overtime))
        ));
        assert!(matches!(
            check_upgradable(day, None),
            Err(PayrollError::CheckInNotFound(_))
        ));
    }
}
