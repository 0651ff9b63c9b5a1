use crate::api::attendance::{CalendarQuery, CheckInReq};
use crate::api::withdrawal::WithdrawReq;
use crate::ledger::PayrollSummary;
use crate::model::attendance::{AttendanceRecord, ShiftKind};
use crate::model::profile::{Profile, ProfileInput, RatesInput};
use crate::model::summary::{AdminSummary, RecentCheckIn, RecentWithdrawal};
use crate::model::withdrawal::WithdrawalRecord;
use crate::payroll::accrual::{Accrual, AccrualModel};
use crate::payroll::calendar::{CalendarDay, CalendarMonth};
use crate::store::WithdrawalReceipt;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shiftpay API",
        version = "1.0.0",
        description = r#"
## Shift Check-in & Salary Withdrawal

Employees record one check-in per day and draw earned salary before payday.

### 🔹 Key Features
- **Attendance**
  - Daily check-in with a shift, full-day upgrades, monthly calendar grid
- **Payroll**
  - Gross pay derived from check-ins under the configured pay model
- **Withdrawals**
  - Draw down the available balance, never below zero
- **Admin**
  - Organisation-wide totals and per-employee pay rates

### 🔐 Security
All `/api` endpoints require a **JWT Bearer** access token from `/auth/login`.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::list_check_ins,
        crate::api::attendance::upgrade_shift,
        crate::api::attendance::calendar,

        crate::api::withdrawal::withdraw,
        crate::api::withdrawal::list_withdrawals,

        crate::api::payroll::get_summary,

        crate::api::profile::get_profile,
        crate::api::profile::save_profile,

        crate::api::admin::summary,
        crate::api::admin::set_rates
    ),
    components(
        schemas(
            CheckInReq,
            CalendarQuery,
            WithdrawReq,
            ShiftKind,
            AttendanceRecord,
            CalendarDay,
            CalendarMonth,
            AccrualModel,
            Accrual,
            PayrollSummary,
            WithdrawalRecord,
            WithdrawalReceipt,
            Profile,
            ProfileInput,
            RatesInput,
            AdminSummary,
            RecentCheckIn,
            RecentWithdrawal
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Daily check-in APIs"),
        (name = "Withdrawal", description = "Salary withdrawal APIs"),
        (name = "Payroll", description = "Accrued pay APIs"),
        (name = "Profile", description = "Employee profile APIs"),
        (name = "Admin", description = "Organisation-wide APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_routes_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/withdrawals"));
        assert!(doc.paths.paths.contains_key("/api/attendance/{date}/upgrade"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
