use crate::{
    api::{admin, attendance, payroll, profile, withdrawal},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let requests_per_min = requests_per_min.max(1);
        let per_ms = 60_000 / requests_per_min as u64;
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms.max(1))
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .expect("non-zero period and burst size");
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(web::resource("/me").route(web::get().to(handlers::me)))
            .service(
                web::resource("/profile")
                    .route(web::get().to(profile::get_profile))
                    .route(web::put().to(profile::save_profile)),
            )
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("")
                            .route(web::get().to(attendance::list_check_ins))
                            .route(web::post().to(attendance::check_in)),
                    )
                    // /attendance/calendar?year=&month=
                    .service(
                        web::resource("/calendar").route(web::get().to(attendance::calendar)),
                    )
                    // /attendance/{date}/upgrade
                    .service(
                        web::resource("/{date}/upgrade")
                            .route(web::put().to(attendance::upgrade_shift)),
                    ),
            )
            .service(
                web::resource("/withdrawals")
                    .route(web::get().to(withdrawal::list_withdrawals))
                    .route(web::post().to(withdrawal::withdraw)),
            )
            .service(web::resource("/payroll").route(web::get().to(payroll::get_summary)))
            .service(
                web::scope("/admin")
                    .service(web::resource("/summary").route(web::get().to(admin::summary)))
                    .service(
                        web::resource("/profiles/{user_id}/rates")
                            .route(web::put().to(admin::set_rates)),
                    ),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /auth/refresh with refresh_token
//       └─ returns new access_token + refresh_token, old refresh_token revoked

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::revocation::RevokedTokens;
    use crate::ledger::Ledger;
    use crate::notifier::Notifier;
    use crate::payroll::accrual::{AccrualModel, build_policy};
    use crate::store::{MemoryStore, Store};
    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};

    const PEER: &str = "127.0.0.1:8080";

    macro_rules! test_app {
        ($model:expr) => {{
            let config = Config::for_tests($model);
            let store = Store::Memory(MemoryStore::new());
            let policy = build_policy(
                config.accrual_model,
                config.overtime_hourly_bonus,
                config.overtime_hours_per_shift,
            );
            let ledger = Ledger::new(
                store.clone(),
                policy,
                config.fullday_default_rate,
                Notifier::disabled(),
            );
            let revoked = RevokedTokens::new(config.refresh_token_ttl as u64);
            let routes_config = config.clone();

            test::init_service(
                App::new()
                    .app_data(web::Data::new(config))
                    .app_data(web::Data::new(store))
                    .app_data(web::Data::new(ledger))
                    .app_data(web::Data::new(revoked))
                    .configure(|cfg| configure(cfg, routes_config)),
            )
            .await
        }};
    }

    macro_rules! send {
        ($app:expr, $req:expr $(,)?) => {{
            let resp = test::call_service(
                &$app,
                $req.peer_addr(PEER.parse().unwrap()).to_request(),
            )
            .await;
            let status: StatusCode = resp.status();
            let body = test::read_body(resp).await;
            let value: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
            (status, value)
        }};
    }

    macro_rules! sign_up {
        ($app:expr, $email:expr) => {{
            let creds = json!({ "email": $email, "password": "secret123" });
            let (status, _) = send!(
                $app,
                test::TestRequest::post().uri("/auth/register").set_json(&creds)
            );
            assert_eq!(status, StatusCode::CREATED);

            let (status, tokens) = send!(
                $app,
                test::TestRequest::post().uri("/auth/login").set_json(&creds)
            );
            assert_eq!(status, StatusCode::OK);
            tokens
        }};
    }

    fn bearer(token: &Value) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", token.as_str().unwrap()))
    }

    #[actix_web::test]
    async fn api_requires_a_bearer_token() {
        let app = test_app!(AccrualModel::HourlyOvertime);
        let (status, body) = send!(app, test::TestRequest::get().uri("/api/payroll"));
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Missing Authorization header");
    }

    #[actix_web::test]
    async fn check_in_and_withdraw_over_http() {
        let app = test_app!(AccrualModel::HourlyOvertime);
        let tokens = sign_up!(app, "worker@example.com");
        let auth = bearer(&tokens["access_token"]);

        let (status, _) = send!(
            app,
            test::TestRequest::get().uri("/api/payroll").insert_header(auth.clone()),
        );
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, profile) = send!(
            app,
            test::TestRequest::put()
                .uri("/api/profile")
                .insert_header(auth.clone())
                .set_json(json!({ "name": "Worker", "age": 30, "rate": 250 })),
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["email"], "worker@example.com");

        for (date, shift) in [
            ("2026-01-05", "morning"),
            ("2026-01-06", "evening"),
            ("2026-01-07", "morning"),
            ("2026-01-08", "morning"),
            ("2026-01-09", "evening"),
            ("2026-01-10", "overtime"),
        ] {
            let (status, _) = send!(
                app,
                test::TestRequest::post()
                    .uri("/api/attendance")
                    .insert_header(auth.clone())
                    .set_json(json!({ "date": date, "shift": shift })),
            );
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/attendance")
                .insert_header(auth.clone())
                .set_json(json!({ "date": "2026-01-10", "shift": "morning" })),
        );
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "Already checked in on 2026-01-10");

        let (_, summary) = send!(
            app,
            test::TestRequest::get().uri("/api/payroll").insert_header(auth.clone()),
        );
        assert_eq!(summary["accrual"]["gross"], 1740);
        assert_eq!(summary["model"], "hourly_overtime");

        let (status, receipt) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/withdrawals")
                .insert_header(auth.clone())
                .set_json(json!({ "amount": "500" })),
        );
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(receipt["available"], 1240);

        let (status, _) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/withdrawals")
                .insert_header(auth.clone())
                .set_json(json!({ "amount": 2000 })),
        );
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/withdrawals")
                .insert_header(auth.clone())
                .set_json(json!({ "amount": "lots" })),
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, history) = send!(
            app,
            test::TestRequest::get().uri("/api/withdrawals").insert_header(auth.clone()),
        );
        assert_eq!(history.as_array().unwrap().len(), 1);

        let (_, grid) = send!(
            app,
            test::TestRequest::get()
                .uri("/api/attendance/calendar?year=2026&month=1")
                .insert_header(auth),
        );
        let overtime_cell = grid["weeks"]
            .as_array()
            .unwrap()
            .iter()
            .flat_map(|w| w.as_array().unwrap())
            .find(|d| d["date"] == "2026-01-10")
            .unwrap();
        assert_eq!(overtime_cell["shift"], "overtime");
    }

    #[actix_web::test]
    async fn upgrade_endpoint_switches_to_fullday() {
        let app = test_app!(AccrualModel::FulldayPremium);
        let tokens = sign_up!(app, "worker@example.com");
        let auth = bearer(&tokens["access_token"]);

        send!(
            app,
            test::TestRequest::put()
                .uri("/api/profile")
                .insert_header(auth.clone())
                .set_json(json!({ "name": "Worker", "age": 30, "rate": 300 })),
        );
        send!(
            app,
            test::TestRequest::post()
                .uri("/api/attendance")
                .insert_header(auth.clone())
                .set_json(json!({ "date": "2026-02-02", "shift": "morning" })),
        );

        let (status, summary) = send!(
            app,
            test::TestRequest::put()
                .uri("/api/attendance/2026-02-02/upgrade")
                .insert_header(auth.clone()),
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["accrual"]["premium_days"], 1);
        assert_eq!(summary["accrual"]["gross"], 450);

        let (status, _) = send!(
            app,
            test::TestRequest::put()
                .uri("/api/attendance/2026-02-03/upgrade")
                .insert_header(auth),
        );
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn admin_routes_are_for_admins() {
        let app = test_app!(AccrualModel::FulldayPremium);
        let worker = sign_up!(app, "worker@example.com");
        let worker_auth = bearer(&worker["access_token"]);
        let (status, _) = send!(
            app,
            test::TestRequest::get()
                .uri("/api/admin/summary")
                .insert_header(worker_auth.clone()),
        );
        assert_eq!(status, StatusCode::FORBIDDEN);

        // worker profile so the admin has something to re-rate
        let (_, profile) = send!(
            app,
            test::TestRequest::put()
                .uri("/api/profile")
                .insert_header(worker_auth)
                .set_json(json!({ "name": "Worker", "age": 30, "rate": 300 })),
        );
        let worker_id = profile["user_id"].as_u64().unwrap();

        let boss = sign_up!(app, "boss@example.com");
        let boss_auth = bearer(&boss["access_token"]);
        let (status, summary) = send!(
            app,
            test::TestRequest::get()
                .uri("/api/admin/summary")
                .insert_header(boss_auth.clone()),
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["total_users"], 1);

        let (status, profile) = send!(
            app,
            test::TestRequest::put()
                .uri(&format!("/api/admin/profiles/{}/rates", worker_id))
                .insert_header(boss_auth)
                .set_json(json!({ "rate": 350, "fullday_rate": 500 })),
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["rate"], 350);
    }

    #[actix_web::test]
    async fn refresh_rotates_and_logout_revokes() {
        let app = test_app!(AccrualModel::FulldayPremium);
        let tokens = sign_up!(app, "worker@example.com");
        let refresh = bearer(&tokens["refresh_token"]);

        // refresh tokens do not open the API
        let (status, _) = send!(
            app,
            test::TestRequest::get().uri("/api/me").insert_header(refresh.clone()),
        );
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, rotated) = send!(
            app,
            test::TestRequest::post().uri("/auth/refresh").insert_header(refresh.clone()),
        );
        assert_eq!(status, StatusCode::OK);

        // the old refresh token is spent
        let (status, _) = send!(
            app,
            test::TestRequest::post().uri("/auth/refresh").insert_header(refresh),
        );
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let new_refresh = bearer(&rotated["refresh_token"]);
        let (status, _) = send!(
            app,
            test::TestRequest::post().uri("/auth/logout").insert_header(new_refresh.clone()),
        );
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send!(
            app,
            test::TestRequest::post().uri("/auth/refresh").insert_header(new_refresh),
        );
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, me) = send!(
            app,
            test::TestRequest::get()
                .uri("/api/me")
                .insert_header(bearer(&rotated["access_token"])),
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["email"], "worker@example.com");
    }

    #[actix_web::test]
    async fn duplicate_registration_conflicts() {
        let app = test_app!(AccrualModel::FulldayPremium);
        sign_up!(app, "worker@example.com");
        let (status, _) = send!(
            app,
            test::TestRequest::post()
                .uri("/auth/register")
                .set_json(json!({ "email": "Worker@example.com", "password": "secret123" })),
        );
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
