//! User-facing payroll operations on top of a [`Store`].

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::model::attendance::{AttendanceRecord, ShiftKind};
use crate::model::profile::{
    Profile, ProfileInput, RatesInput, validate_profile_input, validate_rates,
};
use crate::model::summary::AdminSummary;
use crate::model::withdrawal::WithdrawalRecord;
use crate::notifier::{Notifier, check_in_message, withdrawal_message};
use crate::payroll::accrual::{
    Accrual, AccrualModel, AccrualPolicy, available_balance, shifts_of,
};
use crate::payroll::amount::{AmountInput, parse_amount};
use crate::payroll::calendar::{CalendarMonth, month_grid};
use crate::payroll::error::PayrollError;
use crate::store::{Store, WithdrawalReceipt};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PayrollSummary {
    pub model: AccrualModel,
    #[schema(example = 300)]
    pub rate: i64,
    #[schema(example = 450)]
    pub fullday_rate: i64,
    pub accrual: Accrual,
    #[schema(example = 500)]
    pub withdrawn: i64,
    #[schema(example = 1240)]
    pub available: i64,
}

pub struct Ledger {
    store: Store,
    policy: Arc<dyn AccrualPolicy>,
    fullday_default: i64,
    notifier: Notifier,
}

impl Ledger {
    pub fn new(
        store: Store,
        policy: Arc<dyn AccrualPolicy>,
        fullday_default: i64,
        notifier: Notifier,
    ) -> Self {
        Self {
            store,
            policy,
            fullday_default,
            notifier,
        }
    }

    pub fn model(&self) -> AccrualModel {
        self.policy.model()
    }

    pub async fn profile(&self, user_id: u64) -> Result<Profile, PayrollError> {
        self.store
            .get_profile(user_id)
            .await?
            .ok_or(PayrollError::ProfileMissing)
    }

    /// Creates the caller's profile or edits it. Once a profile exists its
    /// rates belong to admins.
    pub async fn save_profile(
        &self,
        user_id: u64,
        account_email: &str,
        grant_admin: bool,
        input: ProfileInput,
    ) -> Result<Profile, PayrollError> {
        validate_profile_input(&input)?;

        let profile = match self.store.get_profile(user_id).await? {
            None => Profile {
                user_id,
                name: input.name.trim().to_string(),
                age: input.age,
                rate: input
                    .rate
                    .ok_or_else(|| PayrollError::InvalidProfile("rate is required".into()))?,
                fullday_rate: input.fullday_rate,
                email: input.email.unwrap_or_else(|| account_email.to_string()),
                is_admin: grant_admin,
            },
            Some(existing) => {
                let rate_changed = input.rate.is_some_and(|r| r != existing.rate);
                let fullday_changed = input
                    .fullday_rate
                    .is_some_and(|r| Some(r) != existing.fullday_rate);
                let is_admin = existing.is_admin || grant_admin;
                if (rate_changed || fullday_changed) && !is_admin {
                    warn!(user_id, "Rejected rate change from non-admin");
                    return Err(PayrollError::RatesLocked);
                }
                Profile {
                    name: input.name.trim().to_string(),
                    age: input.age,
                    rate: input.rate.unwrap_or(existing.rate),
                    fullday_rate: input.fullday_rate.or(existing.fullday_rate),
                    email: input.email.unwrap_or(existing.email),
                    is_admin,
                    user_id,
                }
            }
        };

        self.store.save_profile(&profile).await?;
        info!(user_id, "Profile saved");
        Ok(profile)
    }

    pub async fn set_rates(&self, user_id: u64, input: RatesInput) -> Result<Profile, PayrollError> {
        validate_rates(input.rate, input.fullday_rate)?;
        let profile = self
            .store
            .set_rates(user_id, input.rate, input.fullday_rate)
            .await?;
        info!(user_id, rate = input.rate, "Pay rates updated");
        Ok(profile)
    }

    pub async fn check_in(
        &self,
        user_id: u64,
        date: NaiveDate,
        shift: ShiftKind,
    ) -> Result<PayrollSummary, PayrollError> {
        if !self.policy.accepts(shift) {
            return Err(PayrollError::InvalidShift(shift));
        }
        let profile = self.profile(user_id).await?;

        let record = AttendanceRecord::new(date, shift);
        if let Err(e) = self.store.insert_check_in(user_id, &record).await {
            warn!(user_id, %date, error = %e, "Check-in rejected");
            return Err(e);
        }
        info!(user_id, %date, %shift, "Checked in");

        self.notifier
            .notify(check_in_message(&profile, date, shift));
        self.summary_for(&profile).await
    }

    /// Turns a morning or evening record into the active model's premium shift.
    pub async fn upgrade_shift(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> Result<PayrollSummary, PayrollError> {
        let profile = self.profile(user_id).await?;
        let target = self.policy.premium_shift();
        let record = self.store.upgrade_shift(user_id, date, target).await?;
        info!(user_id, %date, shift = %record.shift, "Shift upgraded");
        self.summary_for(&profile).await
    }

    pub async fn check_ins(&self, user_id: u64) -> Result<Vec<AttendanceRecord>, PayrollError> {
        self.store.list_check_ins(user_id).await
    }

    pub async fn withdraw(
        &self,
        user_id: u64,
        amount: &AmountInput,
    ) -> Result<WithdrawalReceipt, PayrollError> {
        let amount = parse_amount(amount)?;
        let profile = self.profile(user_id).await?;

        let receipt = match self
            .store
            .withdraw(user_id, amount, self.policy.as_ref(), self.fullday_default)
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(user_id, amount, error = %e, "Withdrawal rejected");
                return Err(e);
            }
        };
        info!(user_id, amount, available = receipt.available, "Withdrawal recorded");

        self.notifier.notify(withdrawal_message(
            &profile,
            amount,
            receipt.available,
            receipt.withdrawal.withdrawal_date,
        ));
        Ok(receipt)
    }

    pub async fn withdrawals(&self, user_id: u64) -> Result<Vec<WithdrawalRecord>, PayrollError> {
        self.store.list_withdrawals(user_id).await
    }

    pub async fn summary(&self, user_id: u64) -> Result<PayrollSummary, PayrollError> {
        let profile = self.profile(user_id).await?;
        self.summary_for(&profile).await
    }

    async fn summary_for(&self, profile: &Profile) -> Result<PayrollSummary, PayrollError> {
        let records = self.store.list_check_ins(profile.user_id).await?;
        let withdrawals = self.store.list_withdrawals(profile.user_id).await?;

        let rates = profile.pay_rates(self.fullday_default);
        let accrual = self.policy.accrue(&shifts_of(&records), &rates);
        let withdrawn: i64 = withdrawals.iter().map(|w| w.amount).sum();

        Ok(PayrollSummary {
            model: self.policy.model(),
            rate: rates.base,
            fullday_rate: rates.fullday,
            accrual,
            withdrawn,
            available: available_balance(accrual.gross, [withdrawn]),
        })
    }

    pub async fn calendar(
        &self,
        user_id: u64,
        year: i32,
        month: u32,
    ) -> Result<CalendarMonth, PayrollError> {
        let records = self.store.list_check_ins(user_id).await?;
        month_grid(year, month, &records)
    }

    pub async fn admin_summary(&self) -> Result<AdminSummary, PayrollError> {
        self.store.admin_summary().await
    }
}
