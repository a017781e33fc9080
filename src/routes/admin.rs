use actix_web::{HttpResponse, delete, get, post, web};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::config::AppConfig;
use crate::errors::ApiError;
use crate::middleware::AdminUser;
use crate::models::dto::{CreateStaffRequest, ResendInvitationRequest, ResendInvitationResponse};
use crate::models::usuario::Role;
use crate::services::account_service::AccountService;
use crate::services::notifier::Notifier;

async fn create_staff(
    role: Role,
    body: web::Json<CreateStaffRequest>,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<dyn Notifier>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    // 1. Valider le corps
    body.validate()?;

    // 2. Créer le compte + envoyer l'email
    let created = AccountService::create_staff(
        db.get_ref(),
        notifier.get_ref(),
        &config.app_base_url,
        role,
        body.into_inner(),
    )
    .await?;

    Ok(HttpResponse::Created().json(created))
}

/// POST /api/admin/administradores - Créer un administrateur (ADMIN)
#[post("/administradores")]
pub async fn create_administrador(
    _admin: AdminUser,
    body: web::Json<CreateStaffRequest>,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<dyn Notifier>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    create_staff(Role::Administrador, body, db, notifier, config).await
}

/// POST /api/admin/agentes - Créer un agent (ADMIN)
#[post("/agentes")]
pub async fn create_agente(
    _admin: AdminUser,
    body: web::Json<CreateStaffRequest>,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<dyn Notifier>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    create_staff(Role::Agente, body, db, notifier, config).await
}

#[get("/administradores")]
pub async fn list_administradores(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let staff = AccountService::list_staff(db.get_ref(), Role::Administrador).await?;
    Ok(HttpResponse::Ok().json(staff))
}

#[get("/agentes")]
pub async fn list_agentes(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let staff = AccountService::list_staff(db.get_ref(), Role::Agente).await?;
    Ok(HttpResponse::Ok().json(staff))
}

/// POST /api/admin/resend-invitation - Nouveau lien, l'ancien devient invalide (ADMIN)
#[post("/resend-invitation")]
pub async fn resend_invitation(
    _admin: AdminUser,
    body: web::Json<ResendInvitationRequest>,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<dyn Notifier>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let email_sent = AccountService::resend_invitation(
        db.get_ref(),
        notifier.get_ref(),
        &config.app_base_url,
        body.persona_id,
    )
    .await?;

    Ok(HttpResponse::Ok().json(ResendInvitationResponse { email_sent }))
}

/// DELETE /api/admin/usuarios/{id} - Désactiver un compte (ADMIN)
#[delete("/usuarios/{id}")]
pub async fn delete_usuario(
    AdminUser(session): AdminUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    AccountService::deactivate(db.get_ref(), &session, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(create_administrador)
            .service(create_agente)
            .service(list_administradores)
            .service(list_agentes)
            .service(resend_invitation)
            .service(delete_usuario),
    );
}
