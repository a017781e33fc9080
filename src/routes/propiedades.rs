use actix_web::{HttpResponse, delete, get, post, put, web};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::errors::ApiError;
use crate::middleware::{AdminUser, AuthUser};
use crate::models::dto::{PropiedadRequest, PropiedadResponse};
use crate::services::propiedad_service::PropiedadService;

/// GET /api/propiedades - Biens visibles par l'utilisateur (PROTÉGÉE)
#[get("")]
pub async fn list_propiedades(
    AuthUser(session): AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let items: Vec<PropiedadResponse> = PropiedadService::list(db.get_ref(), &session)
        .await?
        .into_iter()
        .map(PropiedadResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(items))
}

#[get("/{id}")]
pub async fn get_propiedad(
    AuthUser(session): AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let found = PropiedadService::get(db.get_ref(), &session, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(PropiedadResponse::from(found)))
}

/// POST /api/propiedades - Créer un bien (PROTÉGÉE)
#[post("")]
pub async fn create_propiedad(
    AuthUser(session): AuthUser,
    body: web::Json<PropiedadRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;
    let created = PropiedadService::create(db.get_ref(), &session, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(PropiedadResponse::from(created)))
}

/// PUT /api/propiedades/{id} - Modifier un bien (PROTÉGÉE, agent: ses biens)
#[put("/{id}")]
pub async fn update_propiedad(
    AuthUser(session): AuthUser,
    path: web::Path<i32>,
    body: web::Json<PropiedadRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;
    let updated =
        PropiedadService::update(db.get_ref(), &session, path.into_inner(), body.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(PropiedadResponse::from(updated)))
}

/// DELETE /api/propiedades/{id} - Suppression logique (ADMIN)
#[delete("/{id}")]
pub async fn delete_propiedad(
    _admin: AdminUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    PropiedadService::delete(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn propiedad_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/propiedades")
            .service(list_propiedades)
            .service(get_propiedad)
            .service(create_propiedad)
            .service(update_propiedad)
            .service(delete_propiedad),
    );
}
