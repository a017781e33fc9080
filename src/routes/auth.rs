use actix_web::{HttpResponse, get, post, web};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::config::AppConfig;
use crate::errors::ApiError;
use crate::middleware::AuthUser;
use crate::models::dto::{
    ChangePasswordRequest, LoginRequest, LoginResponse, SetPasswordRequest, TokenQuery,
    TokenStatusResponse,
};
use crate::services::account_service::AccountService;
use crate::services::token_service::TokenService;
use crate::utils::jwt;

/// POST /api/auth/login - Se connecter (PUBLIC)
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    // 1. Valider le corps
    body.validate()?;

    // 2. Vérifier email + mot de passe (compte actif uniquement)
    let (usuario, persona) =
        AccountService::authenticate(db.get_ref(), &body.email, &body.password).await?;

    // 3. Générer le JWT
    let token = jwt::generate_token(
        usuario.id,
        &persona.email,
        usuario.role,
        usuario.empleado_id,
        &config.auth.jwt_secret,
        config.auth.jwt_ttl_hours,
    )
    .map_err(ApiError::Internal)?;

    tracing::info!(usuario_id = usuario.id, role = %usuario.role, "login");

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        usuario_id: usuario.id,
        email: persona.email,
        role: usuario.role,
        empleado_id: usuario.empleado_id,
    }))
}

/// GET /api/auth/me - Session courante (PROTÉGÉE)
#[get("/me")]
pub async fn me(AuthUser(session): AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(session)
}

/// POST /api/auth/change-password - Changer son mot de passe (PROTÉGÉE)
#[post("/change-password")]
pub async fn change_password(
    AuthUser(session): AuthUser,
    body: web::Json<ChangePasswordRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;
    AccountService::change_password(
        db.get_ref(),
        &session,
        &body.current_password,
        &body.new_password,
    )
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Password changed successfully"
    })))
}

/// GET /api/auth/set-password?token=xxx - Vérifier un lien (PUBLIC)
/// Le token n'est pas consommé.
#[get("/set-password")]
pub async fn check_set_password_token(
    query: web::Query<TokenQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let row = TokenService::inspect(db.get_ref(), &query.token).await?;

    Ok(HttpResponse::Ok().json(TokenStatusResponse {
        email: row.identifier,
        expires: row.expires,
    }))
}

/// POST /api/auth/set-password - Définir son mot de passe avec le lien (PUBLIC)
#[post("/set-password")]
pub async fn set_password(
    body: web::Json<SetPasswordRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    // 1. Politique du mot de passe (avant de toucher la BD)
    body.validate()?;

    // 2. Consommer le token + enregistrer le hash
    TokenService::redeem(db.get_ref(), &body.token, &body.password).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(login)
            .service(me)
            .service(change_password)
            .service(check_set_password_token)
            .service(set_password),
    );
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use sea_orm::EntityTrait;
    use serde_json::{Value, json};

    use crate::models::usuario::Role;
    use crate::models::verification_token;
    use crate::test_support::{TestContext, bearer, seed_staff};

    #[actix_web::test]
    async fn invited_admin_sets_password_then_logs_in() {
        let ctx = TestContext::new().await;
        let (boss, _) = seed_staff(&ctx.db, "boss@x.com", Role::Administrador, Some("Abcdef12")).await;
        let app = test::init_service(App::new().configure(|cfg| ctx.register(cfg))).await;

        // 1. Création d'un administrateur
        let req = test::TestRequest::post()
            .uri("/api/admin/administradores")
            .insert_header(bearer(&boss, "boss@x.com"))
            .set_json(json!({
                "nombre": "Ana",
                "apellido": "Gómez",
                "dni": "30111222",
                "email": "ana@x.com"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        assert_eq!(created["emailSent"], true);

        // 2. Avant le lien: connexion impossible
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "ana@x.com", "password": "Abcdef12" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let token = verification_token::Entity::find()
            .one(&ctx.db)
            .await
            .unwrap()
            .unwrap()
            .token;
        let sent = ctx.notifier.sent();
        assert!(sent[0].content.ends_with(&token));

        // 3. Le lien est valide
        let req = test::TestRequest::get()
            .uri(&format!("/api/auth/set-password?token={}", token))
            .to_request();
        let status: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(status["email"], "ana@x.com");

        // 4. Mot de passe trop faible: le token reste utilisable
        let req = test::TestRequest::post()
            .uri("/api/auth/set-password")
            .set_json(json!({ "token": token, "password": "short" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["fields"]["password"].is_array());

        // 5. Définition du mot de passe
        let req = test::TestRequest::post()
            .uri("/api/auth/set-password")
            .set_json(json!({ "token": token, "password": "Abcdef12" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        // 6. Connexion + session
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "ana@x.com", "password": "Abcdef12" }))
            .to_request();
        let login: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(login["role"], "administrador");
        let jwt = login["token"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", format!("Bearer {}", jwt)))
            .to_request();
        let me: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(me["email"], "ana@x.com");
        assert_eq!(me["role"], "administrador");

        // 7. Réutiliser le lien échoue
        let req = test::TestRequest::post()
            .uri("/api/auth/set-password")
            .set_json(json!({ "token": token, "password": "Zyxwvu98" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "invalid or expired token");
    }

    #[actix_web::test]
    async fn unknown_token_link_is_rejected() {
        let ctx = TestContext::new().await;
        let app = test::init_service(App::new().configure(|cfg| ctx.register(cfg))).await;

        let req = test::TestRequest::get()
            .uri("/api/auth/set-password?token=nope")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri("/api/auth/set-password").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn me_requires_a_session() {
        let ctx = TestContext::new().await;
        let app = test::init_service(App::new().configure(|cfg| ctx.register(cfg))).await;

        let req = test::TestRequest::get().uri("/api/auth/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", "Bearer not-a-jwt"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn change_password_over_http() {
        let ctx = TestContext::new().await;
        let (agent, _) = seed_staff(&ctx.db, "agent@x.com", Role::Agente, Some("Abcdef12")).await;
        let app = test::init_service(App::new().configure(|cfg| ctx.register(cfg))).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/change-password")
            .insert_header(bearer(&agent, "agent@x.com"))
            .set_json(json!({ "currentPassword": "Abcdef12", "newPassword": "Newpass12" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "agent@x.com", "password": "Newpass12" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }
}
