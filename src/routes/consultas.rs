use actix_web::{HttpResponse, get, patch, post, web};
use chrono::Utc;
use sea_orm::*;
use validator::Validate;

use crate::errors::ApiError;
use crate::middleware::AuthUser;
use crate::models::consulta;
use crate::models::dto::{ConsultaRequest, ConsultaResponse, ConsultasQuery};
use crate::services::propiedad_service::PropiedadService;

/// POST /api/consultas - Demande d'un client (PUBLIC)
#[post("")]
pub async fn create_consulta(
    body: web::Json<ConsultaRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    // 1. Valider le corps
    body.validate()?;
    let body = body.into_inner();

    // 2. Le bien cité doit être visible dans le catalogue
    if let Some(propiedad_id) = body.propiedad_id {
        match PropiedadService::catalog_get(db.get_ref(), propiedad_id).await {
            Ok(_) => {}
            Err(ApiError::NotFound(_)) => {
                return Err(ApiError::field("propiedadId", "Unknown property"));
            }
            Err(e) => return Err(e),
        }
    }

    // 3. Enregistrer
    let created = consulta::ActiveModel {
        propiedad_id: Set(body.propiedad_id),
        nombre: Set(body.nombre.trim().to_string()),
        email: Set(body.email.trim().to_lowercase()),
        telefono: Set(body.telefono),
        mensaje: Set(body.mensaje),
        atendida: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db.get_ref())
    .await?;

    tracing::info!(consulta_id = created.id, propiedad_id = ?created.propiedad_id, "consulta received");
    Ok(HttpResponse::Created().json(ConsultaResponse::from(created)))
}

/// GET /api/consultas?pendientes=true - Liste, plus récentes d'abord (PROTÉGÉE)
#[get("")]
pub async fn list_consultas(
    _user: AuthUser,
    query: web::Query<ConsultasQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let mut select = consulta::Entity::find();
    if query.pendientes.unwrap_or(false) {
        select = select.filter(consulta::Column::Atendida.eq(false));
    }

    let items: Vec<ConsultaResponse> = select
        .order_by_desc(consulta::Column::CreatedAt)
        .order_by_desc(consulta::Column::Id)
        .all(db.get_ref())
        .await?
        .into_iter()
        .map(ConsultaResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(items))
}

/// PATCH /api/consultas/{id}/atendida - Marquer comme traitée (PROTÉGÉE)
#[patch("/{id}/atendida")]
pub async fn mark_atendida(
    AuthUser(session): AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let found = consulta::Entity::find_by_id(path.into_inner())
        .one(db.get_ref())
        .await?
        .ok_or(ApiError::NotFound("consulta"))?;

    let mut active: consulta::ActiveModel = found.into();
    active.atendida = Set(true);
    let updated = active.update(db.get_ref()).await?;

    tracing::info!(consulta_id = updated.id, usuario_id = session.usuario_id, "consulta handled");
    Ok(HttpResponse::Ok().json(ConsultaResponse::from(updated)))
}

pub fn consulta_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/consultas")
            .service(create_consulta)
            .service(list_consultas)
            .service(mark_atendida),
    );
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::{Value, json};

    use crate::models::usuario::Role;
    use crate::test_support::{TestContext, bearer, seed_staff};

    #[actix_web::test]
    async fn inquiry_lifecycle() {
        let ctx = TestContext::new().await;
        let (agent, _) = seed_staff(&ctx.db, "agent@x.com", Role::Agente, Some("Abcdef12")).await;
        let app = test::init_service(App::new().configure(|cfg| ctx.register(cfg))).await;

        let req = test::TestRequest::post()
            .uri("/api/consultas")
            .set_json(json!({ "nombre": "Juan", "email": "Juan@Mail.com", "mensaje": "¿Sigue disponible?" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        assert_eq!(created["email"], "juan@mail.com");
        assert_eq!(created["atendida"], false);

        // Bien inexistant
        let req = test::TestRequest::post()
            .uri("/api/consultas")
            .set_json(json!({ "propiedadId": 77, "nombre": "Juan", "email": "j@mail.com", "mensaje": "Hola" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/consultas")
            .set_json(json!({ "nombre": "  ", "email": "j@mail.com", "mensaje": "\n\t " }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let err: Value = test::read_body_json(resp).await;
        assert!(err["fields"]["nombre"].is_array());
        assert!(err["fields"]["mensaje"].is_array());

        // Liste réservée au personnel
        let req = test::TestRequest::get().uri("/api/consultas").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::patch()
            .uri(&format!("/api/consultas/{}/atendida", created["id"]))
            .insert_header(bearer(&agent, "agent@x.com"))
            .to_request();
        let handled: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(handled["atendida"], true);

        let req = test::TestRequest::get()
            .uri("/api/consultas?pendientes=true")
            .insert_header(bearer(&agent, "agent@x.com"))
            .to_request();
        let pending: Value = test::call_and_read_body_json(&app, req).await;
        assert!(pending.as_array().unwrap().is_empty());

        let req = test::TestRequest::get()
            .uri("/api/consultas")
            .insert_header(bearer(&agent, "agent@x.com"))
            .to_request();
        let all: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(all.as_array().unwrap().len(), 1);
    }
}
