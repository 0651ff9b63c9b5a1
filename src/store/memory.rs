use chrono::{NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::model::attendance::{AttendanceRecord, ShiftKind};
use crate::model::profile::Profile;
use crate::model::summary::{
    AdminSummary, RECENT_LIMIT, RecentCheckIn, RecentWithdrawal, UNKNOWN_EMAIL,
};
use crate::model::user::User;
use crate::model::withdrawal::WithdrawalRecord;
use crate::payroll::accrual::AccrualPolicy;
use crate::payroll::error::PayrollError;
use crate::store::{WithdrawalReceipt, check_upgradable, settle};

#[derive(Default)]
struct State {
    next_user_id: u64,
    next_withdrawal_id: u64,
    users: HashMap<u64, User>,
    profiles: HashMap<u64, Profile>,
    /// keyed by date, which keeps one record per day and date order for free
    check_ins: HashMap<u64, BTreeMap<NaiveDate, ShiftKind>>,
    withdrawals: Vec<(u64, WithdrawalRecord)>,
}

/// In-process store. Every operation runs under one lock, which also makes
/// the withdrawal check and insert a single step.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("memory store poisoned")
    }

    pub fn create_user(&self, email: &str, password_hash: &str) -> Result<u64, PayrollError> {
        let mut state = self.state();
        let email = email.to_lowercase();
        if state.users.values().any(|u| u.email == email) {
            return Err(PayrollError::EmailTaken);
        }
        state.next_user_id += 1;
        let id = state.next_user_id;
        state.users.insert(
            id,
            User {
                id,
                email,
                password: password_hash.to_string(),
            },
        );
        Ok(id)
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<User> {
        let email = email.to_lowercase();
        self.state().users.values().find(|u| u.email == email).cloned()
    }

    pub fn get_profile(&self, user_id: u64) -> Option<Profile> {
        self.state().profiles.get(&user_id).cloned()
    }

    pub fn save_profile(&self, profile: &Profile) {
        self.state().profiles.insert(profile.user_id, profile.clone());
    }

    pub fn set_rates(
        &self,
        user_id: u64,
        rate: i64,
        fullday_rate: Option<i64>,
    ) -> Result<Profile, PayrollError> {
        let mut state = self.state();
        let profile = state
            .profiles
            .get_mut(&user_id)
            .ok_or(PayrollError::ProfileMissing)?;
        profile.rate = rate;
        profile.fullday_rate = fullday_rate;
        Ok(profile.clone())
    }

    pub fn insert_check_in(&self, user_id: u64, record: &AttendanceRecord) -> Result<(), PayrollError> {
        let mut state = self.state();
        let days = state.check_ins.entry(user_id).or_default();
        if days.contains_key(&record.date) {
            return Err(PayrollError::DuplicateCheckIn(record.date));
        }
        days.insert(record.date, record.shift);
        Ok(())
    }

    pub fn list_check_ins(&self, user_id: u64) -> Vec<AttendanceRecord> {
        self.state()
            .check_ins
            .get(&user_id)
            .map(|days| {
                days.iter()
                    .map(|(date, shift)| AttendanceRecord::new(*date, *shift))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn upgrade_shift(
        &self,
        user_id: u64,
        date: NaiveDate,
        target: ShiftKind,
    ) -> Result<AttendanceRecord, PayrollError> {
        let mut state = self.state();
        let slot = state
            .check_ins
            .get_mut(&user_id)
            .and_then(|days| days.get_mut(&date));
        check_upgradable(date, slot.as_deref().copied())?;
        if let Some(shift) = slot {
            *shift = target;
        }
        Ok(AttendanceRecord::new(date, target))
    }

    pub fn list_withdrawals(&self, user_id: u64) -> Vec<WithdrawalRecord> {
        let mut records: Vec<WithdrawalRecord> = self
            .state()
            .withdrawals
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, w)| w.clone())
            .collect();
        records.sort_by(|a, b| b.withdrawal_date.cmp(&a.withdrawal_date).then(b.id.cmp(&a.id)));
        records
    }

    pub fn withdraw(
        &self,
        user_id: u64,
        amount: i64,
        policy: &dyn AccrualPolicy,
        fullday_default: i64,
    ) -> Result<WithdrawalReceipt, PayrollError> {
        let mut state = self.state();
        let profile = state
            .profiles
            .get(&user_id)
            .ok_or(PayrollError::ProfileMissing)?;
        let shifts: Vec<ShiftKind> = state
            .check_ins
            .get(&user_id)
            .map(|days| days.values().copied().collect())
            .unwrap_or_default();
        let withdrawn: i64 = state
            .withdrawals
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, w)| w.amount)
            .sum();

        let available = settle(profile, &shifts, withdrawn, amount, policy, fullday_default)?;

        state.next_withdrawal_id += 1;
        let withdrawal = WithdrawalRecord {
            id: state.next_withdrawal_id,
            amount,
            withdrawal_date: Utc::now(),
        };
        state.withdrawals.push((user_id, withdrawal.clone()));

        Ok(WithdrawalReceipt {
            withdrawal,
            available,
        })
    }

    pub fn admin_summary(&self) -> AdminSummary {
        let state = self.state();
        let email_of = |user_id: &u64| {
            state
                .profiles
                .get(user_id)
                .map(|p| p.email.clone())
                .unwrap_or_else(|| UNKNOWN_EMAIL.to_string())
        };

        let mut check_ins: Vec<(u64, NaiveDate, ShiftKind)> = state
            .check_ins
            .iter()
            .flat_map(|(user_id, days)| days.iter().map(move |(d, s)| (*user_id, *d, *s)))
            .collect();
        check_ins.sort_by(|a, b| b.1.cmp(&a.1));

        let mut withdrawals: Vec<&(u64, WithdrawalRecord)> = state.withdrawals.iter().collect();
        withdrawals.sort_by(|a, b| b.1.withdrawal_date.cmp(&a.1.withdrawal_date).then(b.1.id.cmp(&a.1.id)));

        AdminSummary {
            total_users: state.profiles.len() as i64,
            total_check_ins: check_ins.len() as i64,
            total_withdrawals: state.withdrawals.len() as i64,
            total_withdrawn: state.withdrawals.iter().map(|(_, w)| w.amount).sum(),
            recent_check_ins: check_ins
                .iter()
                .take(RECENT_LIMIT)
                .map(|(user_id, date, shift)| RecentCheckIn {
                    user_email: email_of(user_id),
                    check_date: *date,
                    shift: *shift,
                })
                .collect(),
            recent_withdrawals: withdrawals
                .iter()
                .take(RECENT_LIMIT)
                .map(|(user_id, w)| RecentWithdrawal {
                    user_email: email_of(user_id),
                    amount: w.amount,
                    withdrawal_date: w.withdrawal_date,
                })
                .collect(),
        }
    }
}
