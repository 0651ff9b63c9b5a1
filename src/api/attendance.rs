use crate::auth::auth::AuthUser;
use crate::ledger::{Ledger, PayrollSummary};
use crate::model::attendance::{AttendanceRecord, ShiftKind};
use crate::payroll::calendar::CalendarMonth;
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CheckInReq {
    #[schema(example = "2026-01-15", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "morning")]
    pub shift: ShiftKind,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct CalendarQuery {
    /// Defaults to the current year
    #[schema(example = 2026)]
    pub year: Option<i32>,
    /// 1 - 12, defaults to the current month
    #[schema(example = 1)]
    pub month: Option<u32>,
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = CheckInReq,
    responses(
        (status = 201, description = "Checked in, recomputed pay", body = PayrollSummary),
        (status = 400, description = "Shift not accepted by the active pay model", body = Object, example = json!({
            "message": "Shift 'overtime' is not accepted by the active pay model"
        })),
        (status = 404, description = "Profile missing"),
        (status = 409, description = "Already checked in on this date", body = Object, example = json!({
            "message": "Already checked in on 2026-01-15"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    ledger: web::Data<Ledger>,
    payload: web::Json<CheckInReq>,
) -> actix_web::Result<impl Responder> {
    let summary = ledger
        .check_in(auth.user_id, payload.date, payload.shift)
        .await?;
    Ok(HttpResponse::Created().json(summary))
}

#[utoipa::path(
    get,
    path = "/api/attendance",
    responses(
        (status = 200, description = "Check-ins, oldest first", body = Vec<AttendanceRecord>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_check_ins(
    auth: AuthUser,
    ledger: web::Data<Ledger>,
) -> actix_web::Result<impl Responder> {
    let records: Vec<AttendanceRecord> = ledger.check_ins(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(records))
}

#[utoipa::path(
    put,
    path = "/api/attendance/{date}/upgrade",
    params(
        ("date" = String, Path, description = "Check-in date, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Shift upgraded, recomputed pay", body = PayrollSummary),
        (status = 400, description = "Shift already upgraded"),
        (status = 404, description = "No check-in on that date")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn upgrade_shift(
    auth: AuthUser,
    ledger: web::Data<Ledger>,
    path: web::Path<NaiveDate>,
) -> actix_web::Result<impl Responder> {
    let summary = ledger.upgrade_shift(auth.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[utoipa::path(
    get,
    path = "/api/attendance/calendar",
    params(CalendarQuery),
    responses(
        (status = 200, body = CalendarMonth),
        (status = 400, description = "Invalid month")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn calendar(
    auth: AuthUser,
    ledger: web::Data<Ledger>,
    query: web::Query<CalendarQuery>,
) -> actix_web::Result<impl Responder> {
    let today = Utc::now().date_naive();
    let year = query.year.unwrap_or(today.year());
    let month = query.month.unwrap_or(today.month());

    let grid = ledger.calendar(auth.user_id, year, month).await?;
    Ok(HttpResponse::Ok().json(grid))
}
