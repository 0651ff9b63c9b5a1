use chrono::{DateTime, NaiveDate, Utc};
use sqlx::MySqlPool;
use std::str::FromStr;

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

const PROFILE_COLUMNS: &str = "user_id, name, age, rate, fullday_rate, email, is_admin";

fn is_duplicate_key(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23000"),
        _ => false,
    }
}

fn parse_shift(raw: &str) -> Result<ShiftKind, PayrollError> {
    ShiftKind::from_str(raw).map_err(|_| {
        PayrollError::Store(sqlx::Error::Decode(
            format!("unknown shift '{}'", raw).into(),
        ))
    })
}

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, email: &str, password_hash: &str) -> Result<u64, PayrollError> {
        let result = sqlx::query(r#"INSERT INTO users (email, password) VALUES (?, ?)"#)
            .bind(email.to_lowercase())
            .bind(password_hash)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => Ok(done.last_insert_id()),
            Err(e) if is_duplicate_key(&e) => Err(PayrollError::EmailTaken),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, PayrollError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email.to_lowercase())
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn get_profile(&self, user_id: u64) -> Result<Option<Profile>, PayrollError> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {} FROM profiles WHERE user_id = ?",
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn save_profile(&self, profile: &Profile) -> Result<(), PayrollError> {
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, name, age, rate, fullday_rate, email, is_admin)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                name = VALUES(name),
                age = VALUES(age),
                rate = VALUES(rate),
                fullday_rate = VALUES(fullday_rate),
                email = VALUES(email),
                is_admin = VALUES(is_admin),
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(profile.user_id)
        .bind(&profile.name)
        .bind(profile.age)
        .bind(profile.rate)
        .bind(profile.fullday_rate)
        .bind(&profile.email)
        .bind(profile.is_admin)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn set_rates(
        &self,
        user_id: u64,
        rate: i64,
        fullday_rate: Option<i64>,
    ) -> Result<Profile, PayrollError> {
        // rows_affected is zero when the rates are unchanged, so read back instead
        sqlx::query(
            r#"
            UPDATE profiles
            SET rate = ?, fullday_rate = ?, updated_at = CURRENT_TIMESTAMP
            WHERE user_id = ?
            "#,
        )
        .bind(rate)
        .bind(fullday_rate)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        self.get_profile(user_id)
            .await?
            .ok_or(PayrollError::ProfileMissing)
    }

    pub async fn insert_check_in(
        &self,
        user_id: u64,
        record: &AttendanceRecord,
    ) -> Result<(), PayrollError> {
        let result = sqlx::query(
            r#"
            INSERT INTO check_ins (user_id, check_date, shift)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(record.date)
        .bind(record.shift.as_ref())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(PayrollError::DuplicateCheckIn(record.date)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_check_ins(&self, user_id: u64) -> Result<Vec<AttendanceRecord>, PayrollError> {
        let rows = sqlx::query_as::<_, (NaiveDate, String)>(
            r#"
            SELECT check_date, shift
            FROM check_ins
            WHERE user_id = ?
            ORDER BY check_date ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(date, shift)| Ok(AttendanceRecord::new(date, parse_shift(&shift)?)))
            .collect()
    }

    pub async fn upgrade_shift(
        &self,
        user_id: u64,
        date: NaiveDate,
        target: ShiftKind,
    ) -> Result<AttendanceRecord, PayrollError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_scalar::<_, String>(
            r#"
            SELECT shift
            FROM check_ins
            WHERE user_id = ? AND check_date = ?
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&mut *tx)
        .await?
        .map(|raw| parse_shift(&raw))
        .transpose()?;

        check_upgradable(date, current)?;

        sqlx::query(r#"UPDATE check_ins SET shift = ? WHERE user_id = ? AND check_date = ?"#)
            .bind(target.as_ref())
            .bind(user_id)
            .bind(date)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(AttendanceRecord::new(date, target))
    }

    pub async fn list_withdrawals(&self, user_id: u64) -> Result<Vec<WithdrawalRecord>, PayrollError> {
        let rows = sqlx::query_as::<_, WithdrawalRecord>(
            r#"
            SELECT id, amount, withdrawal_date
            FROM withdrawals
            WHERE user_id = ?
            ORDER BY withdrawal_date DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Locks the profile row for the length of the transaction, so withdrawals
    /// for one user are validated and inserted one at a time.
    pub async fn withdraw(
        &self,
        user_id: u64,
        amount: i64,
        policy: &dyn AccrualPolicy,
        fullday_default: i64,
    ) -> Result<WithdrawalReceipt, PayrollError> {
        let mut tx = self.pool.begin().await?;

        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {} FROM profiles WHERE user_id = ? FOR UPDATE",
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(PayrollError::ProfileMissing)?;

        let shifts = sqlx::query_scalar::<_, String>(r#"SELECT shift FROM check_ins WHERE user_id = ?"#)
            .bind(user_id)
            .fetch_all(&mut *tx)
            .await?
            .iter()
            .map(|raw| parse_shift(raw))
            .collect::<Result<Vec<_>, _>>()?;

        let withdrawn = sqlx::query_scalar::<_, i64>(
            r#"SELECT CAST(COALESCE(SUM(amount), 0) AS SIGNED) FROM withdrawals WHERE user_id = ?"#,
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        // dropping the transaction on rejection rolls it back
        let available = settle(&profile, &shifts, withdrawn, amount, policy, fullday_default)?;

        let withdrawal_date = Utc::now();
        let done = sqlx::query(
            r#"
            INSERT INTO withdrawals (user_id, amount, withdrawal_date)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .bind(withdrawal_date)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(WithdrawalReceipt {
            withdrawal: WithdrawalRecord {
                id: done.last_insert_id(),
                amount,
                withdrawal_date,
            },
            available,
        })
    }

    pub async fn admin_summary(&self) -> Result<AdminSummary, PayrollError> {
        let total_users = sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM profiles"#)
            .fetch_one(&self.pool)
            .await?;
        let total_check_ins = sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM check_ins"#)
            .fetch_one(&self.pool)
            .await?;
        let (total_withdrawals, total_withdrawn) = sqlx::query_as::<_, (i64, i64)>(
            r#"SELECT COUNT(*), CAST(COALESCE(SUM(amount), 0) AS SIGNED) FROM withdrawals"#,
        )
        .fetch_one(&self.pool)
        .await?;

        let recent_check_ins = sqlx::query_as::<_, (Option<String>, NaiveDate, String)>(
            r#"
            SELECT p.email, c.check_date, c.shift
            FROM check_ins c
            LEFT JOIN profiles p ON p.user_id = c.user_id
            ORDER BY c.check_date DESC, c.id DESC
            LIMIT ?
            "#,
        )
        .bind(RECENT_LIMIT as i64)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|(email, check_date, shift)| {
            Ok(RecentCheckIn {
                user_email: email.unwrap_or_else(|| UNKNOWN_EMAIL.to_string()),
                check_date,
                shift: parse_shift(&shift)?,
            })
        })
        .collect::<Result<Vec<_>, PayrollError>>()?;

        let recent_withdrawals = sqlx::query_as::<_, (Option<String>, i64, DateTime<Utc>)>(
            r#"
            SELECT p.email, w.amount, w.withdrawal_date
            FROM withdrawals w
            LEFT JOIN profiles p ON p.user_id = w.user_id
            ORDER BY w.withdrawal_date DESC, w.id DESC
            LIMIT ?
            "#,
        )
        .bind(RECENT_LIMIT as i64)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|(email, amount, withdrawal_date)| RecentWithdrawal {
            user_email: email.unwrap_or_else(|| UNKNOWN_EMAIL.to_string()),
            amount,
            withdrawal_date,
        })
        .collect();

        Ok(AdminSummary {
            total_users,
            total_check_ins,
            total_withdrawals,
            total_withdrawn,
            recent_check_ins,
            recent_withdrawals,
        })
    }
}
