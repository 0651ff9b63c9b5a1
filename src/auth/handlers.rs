use crate::{
    auth::{
        auth::AuthUser,
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
        revocation::RevokedTokens,
    },
    config::Config,
    model::role::Role,
    models::{LoginReqDto, RegisterReq, TokenType},
    payroll::error::PayrollError,
    store::Store,
};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info, instrument};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

fn bearer(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

fn issue_pair(
    user_id: u64,
    email: &str,
    role: u8,
    config: &Config,
) -> Result<TokenPair, jsonwebtoken::errors::Error> {
    let access_token = generate_access_token(
        user_id,
        email.to_string(),
        role,
        &config.jwt_secret,
        config.access_token_ttl,
    )?;
    let (refresh_token, _) = generate_refresh_token(
        user_id,
        email.to_string(),
        role,
        &config.jwt_secret,
        config.refresh_token_ttl,
    )?;
    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// User registration handler
pub async fn register(user: web::Json<RegisterReq>, store: web::Data<Store>) -> impl Responder {
    let email = user.email.trim().to_lowercase();
    let password = &user.password;

    if email.is_empty() || password.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Email and password must not be empty"
        }));
    }
    if !email.contains('@') {
        return HttpResponse::BadRequest().json(json!({
            "error": "Email is malformed"
        }));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return HttpResponse::BadRequest().json(json!({
            "error": format!("Password must be at least {} characters", MIN_PASSWORD_LEN)
        }));
    }

    let hashed = match hash_password(password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Failed to hash password");
            return HttpResponse::InternalServerError().finish();
        }
    };

    match store.create_user(&email, &hashed).await {
        Ok(user_id) => {
            info!(user_id, "User registered");
            HttpResponse::Created().json(json!({
                "message": "User registered successfully",
                "user_id": user_id
            }))
        }
        Err(PayrollError::EmailTaken) => HttpResponse::Conflict().json(json!({
            "error": "Email already registered"
        })),
        Err(e) => {
            error!(error = %e, "Failed to register user");
            HttpResponse::InternalServerError().json(json!({
                "error": "Failed to register user"
            }))
        }
    }
}

#[instrument(
    name = "auth_login",
    skip(store, config, user),
    fields(email = %user.email)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    store: web::Data<Store>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    if user.email.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty email or password");
        return HttpResponse::BadRequest().body("Email or password required");
    }

    debug!("Fetching user");

    let db_user = match store.find_user_by_email(user.email.trim()).await {
        Ok(Some(user)) => {
            debug!(user_id = user.id, "User found");
            user
        }
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return HttpResponse::Unauthorized().body("Invalid credentials");
        }
        Err(e) => {
            error!(error = %e, "Store error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Err(e) = verify_password(&user.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    debug!("Password verified");

    // admin flag lives on the profile, which may not exist yet
    let profile_admin = match store.get_profile(db_user.id).await {
        Ok(profile) => profile.is_some_and(|p| p.is_admin),
        Err(e) => {
            error!(error = %e, "Store error while fetching profile");
            return HttpResponse::InternalServerError().finish();
        }
    };
    let role = Role::from_admin_flag(profile_admin || config.is_admin_email(&db_user.email));

    match issue_pair(db_user.id, &db_user.email, role.id(), &config) {
        Ok(pair) => {
            info!("Login successful");
            HttpResponse::Ok().json(pair)
        }
        Err(e) => {
            error!(error = %e, "Failed to sign tokens");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Rotates a refresh token: the presented one is revoked, a new pair issued.
pub async fn refresh_token(
    req: HttpRequest,
    config: web::Data<Config>,
    revoked: web::Data<RevokedTokens>,
) -> impl Responder {
    let Some(token) = bearer(&req) else {
        return HttpResponse::Unauthorized().body("No token");
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::Unauthorized().finish(),
    };

    if claims.token_type != TokenType::Refresh {
        return HttpResponse::Unauthorized().finish();
    }

    // spends the token; a concurrent refresh with the same one loses
    if !revoked.revoke_once(&claims.jti).await {
        return HttpResponse::Unauthorized().finish();
    }

    match issue_pair(claims.user_id, &claims.sub, claims.role, &config) {
        Ok(pair) => HttpResponse::Ok().json(pair),
        Err(e) => {
            error!(error = %e, "Failed to sign tokens");
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub async fn logout(
    req: HttpRequest,
    config: web::Data<Config>,
    revoked: web::Data<RevokedTokens>,
) -> impl Responder {
    let Some(token) = bearer(&req) else {
        return HttpResponse::NoContent().finish();
    };

    // only refresh tokens can log out; anything else is a no-op
    if let Ok(claims) = verify_token(token, &config.jwt_secret) {
        if claims.token_type == TokenType::Refresh {
            revoked.revoke(&claims.jti).await;
        }
    }

    HttpResponse::NoContent().finish()
}

pub async fn me(auth: AuthUser) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "user_id": auth.user_id,
        "email": auth.email,
        "is_admin": auth.is_admin()
    }))
}
