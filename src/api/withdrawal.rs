use crate::auth::auth::AuthUser;
use crate::ledger::Ledger;
use crate::model::withdrawal::WithdrawalRecord;
use crate::payroll::amount::AmountInput;
use crate::store::WithdrawalReceipt;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct WithdrawReq {
    /// Whole currency units, as a number or numeric string
    #[schema(example = 500, value_type = i64)]
    pub amount: AmountInput,
}

#[utoipa::path(
    post,
    path = "/api/withdrawals",
    request_body = WithdrawReq,
    responses(
        (status = 201, description = "Withdrawal recorded", body = WithdrawalReceipt),
        (status = 400, description = "Malformed or non-positive amount", body = Object, example = json!({
            "message": "Amount must be a positive whole number"
        })),
        (status = 404, description = "Profile missing"),
        (status = 422, description = "Amount exceeds available balance", body = Object, example = json!({
            "message": "Requested 2000 exceeds available balance 1240"
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Withdrawal"
)]
pub async fn withdraw(
    auth: AuthUser,
    ledger: web::Data<Ledger>,
    payload: web::Json<WithdrawReq>,
) -> actix_web::Result<impl Responder> {
    let receipt = ledger.withdraw(auth.user_id, &payload.amount).await?;
    Ok(HttpResponse::Created().json(receipt))
}

#[utoipa::path(
    get,
    path = "/api/withdrawals",
    responses(
        (status = 200, description = "Withdrawals, newest first", body = Vec<WithdrawalRecord>)
    ),
    security(("bearer_auth" = [])),
    tag = "Withdrawal"
)]
pub async fn list_withdrawals(
    auth: AuthUser,
    ledger: web::Data<Ledger>,
) -> actix_web::Result<impl Responder> {
    let history: Vec<WithdrawalRecord> = ledger.withdrawals(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(history))
}
