use crate::auth::auth::AuthUser;
use crate::ledger::Ledger;
use crate::model::profile::{Profile, RatesInput};
use crate::model::summary::AdminSummary;
use actix_web::{HttpResponse, Responder, web};

#[utoipa::path(
    get,
    path = "/api/admin/summary",
    responses(
        (status = 200, body = AdminSummary),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn summary(
    auth: AuthUser,
    ledger: web::Data<Ledger>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let summary = ledger.admin_summary().await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[utoipa::path(
    put,
    path = "/api/admin/profiles/{user_id}/rates",
    request_body = RatesInput,
    params(
        ("user_id" = u64, Path, description = "Owner of the profile")
    ),
    responses(
        (status = 200, description = "Rates updated", body = Profile),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Profile not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn set_rates(
    auth: AuthUser,
    ledger: web::Data<Ledger>,
    path: web::Path<u64>,
    payload: web::Json<RatesInput>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let profile = ledger
        .set_rates(path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(profile))
}
