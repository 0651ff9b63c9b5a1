use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::ledger::Ledger;
use crate::model::profile::{Profile, ProfileInput};
use actix_web::{HttpResponse, Responder, web};

#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, body = Profile),
        (status = 404, description = "No profile yet, create one first")
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn get_profile(
    auth: AuthUser,
    ledger: web::Data<Ledger>,
) -> actix_web::Result<impl Responder> {
    let profile = ledger.profile(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// Creates the caller's profile on first use, edits it afterwards.
#[utoipa::path(
    put,
    path = "/api/profile",
    request_body = ProfileInput,
    responses(
        (status = 200, description = "Profile saved", body = Profile),
        (status = 400, description = "Invalid profile"),
        (status = 403, description = "Rates can only be changed by an admin")
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn save_profile(
    auth: AuthUser,
    ledger: web::Data<Ledger>,
    config: web::Data<Config>,
    payload: web::Json<ProfileInput>,
) -> actix_web::Result<impl Responder> {
    let grant_admin = config.is_admin_email(&auth.email);
    let profile = ledger
        .save_profile(auth.user_id, &auth.email, grant_admin, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(profile))
}
