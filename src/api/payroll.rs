use crate::auth::auth::AuthUser;
use crate::ledger::{Ledger, PayrollSummary};
use actix_web::{HttpResponse, Responder, web};

#[utoipa::path(
    get,
    path = "/api/payroll",
    responses(
        (status = 200, description = "Accrued pay and available balance", body = PayrollSummary),
        (status = 404, description = "Profile missing")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_summary(
    auth: AuthUser,
    ledger: web::Data<Ledger>,
) -> actix_web::Result<impl Responder> {
    let summary = ledger.summary(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(summary))
}
