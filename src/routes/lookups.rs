// ============================================================================
// ROUTES : TABLES DE RÉFÉRENCE
// ============================================================================
//
// Même jeu de routes pour localidades, zonas, barrios, categorias, estados:
//   - GET    /api/{table}       : lignes actives triées par nom (PUBLIC)
//   - POST   /api/{table}       : créer (ADMIN)
//   - PUT    /api/{table}/{id}  : renommer (ADMIN)
//   - DELETE /api/{table}/{id}  : activo = false (ADMIN)
//
// Le nom est unique parmi les lignes actives.
//
// ============================================================================

use actix_web::web;

use crate::errors::ApiError;
use crate::models::dto::LookupRequest;

/// Nom nettoyé ou erreur de validation
fn clean_nombre(body: &LookupRequest) -> Result<String, ApiError> {
    let nombre = body.nombre.trim();
    if nombre.is_empty() {
        return Err(ApiError::field("nombre", "Nombre is required"));
    }
    Ok(nombre.to_string())
}

macro_rules! lookup_table {
    ($name:ident, $model:ident, $path:literal, $label:literal) => {
        pub mod $name {
            use actix_web::{HttpResponse, delete, get, post, put, web};
            use sea_orm::*;
            use validator::Validate;

            use super::clean_nombre;
            use crate::errors::ApiError;
            use crate::middleware::AdminUser;
            use crate::models::$model;
            use crate::models::dto::{LookupRequest, LookupResponse};

            async fn ensure_unique(
                db: &DatabaseConnection,
                nombre: &str,
                except: Option<i32>,
            ) -> Result<(), ApiError> {
                let mut query = $model::Entity::find()
                    .filter($model::Column::Nombre.eq(nombre))
                    .filter($model::Column::Activo.eq(true));
                if let Some(id) = except {
                    query = query.filter($model::Column::Id.ne(id));
                }
                if query.one(db).await?.is_some() {
                    return Err(ApiError::Conflict(format!("{} already exists", nombre)));
                }
                Ok(())
            }

            async fn find_active(db: &DatabaseConnection, id: i32) -> Result<$model::Model, ApiError> {
                $model::Entity::find_by_id(id)
                    .filter($model::Column::Activo.eq(true))
                    .one(db)
                    .await?
                    .ok_or(ApiError::NotFound($label))
            }

            #[get("")]
            pub async fn list(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, ApiError> {
                let rows = $model::Entity::find()
                    .filter($model::Column::Activo.eq(true))
                    .order_by_asc($model::Column::Nombre)
                    .all(db.get_ref())
                    .await?;

                let items: Vec<LookupResponse> = rows
                    .into_iter()
                    .map(|row| LookupResponse { id: row.id, nombre: row.nombre })
                    .collect();
                Ok(HttpResponse::Ok().json(items))
            }

            #[post("")]
            pub async fn create(
                _admin: AdminUser,
                body: web::Json<LookupRequest>,
                db: web::Data<DatabaseConnection>,
            ) -> Result<HttpResponse, ApiError> {
                body.validate()?;
                let nombre = clean_nombre(&body)?;
                ensure_unique(db.get_ref(), &nombre, None).await?;

                let row = $model::ActiveModel {
                    nombre: Set(nombre),
                    activo: Set(true),
                    ..Default::default()
                }
                .insert(db.get_ref())
                .await?;

                Ok(HttpResponse::Created().json(LookupResponse { id: row.id, nombre: row.nombre }))
            }

            #[put("/{id}")]
            pub async fn update(
                _admin: AdminUser,
                path: web::Path<i32>,
                body: web::Json<LookupRequest>,
                db: web::Data<DatabaseConnection>,
            ) -> Result<HttpResponse, ApiError> {
                body.validate()?;
                let nombre = clean_nombre(&body)?;
                let row = find_active(db.get_ref(), path.into_inner()).await?;
                ensure_unique(db.get_ref(), &nombre, Some(row.id)).await?;

                let mut active: $model::ActiveModel = row.into();
                active.nombre = Set(nombre);
                let row = active.update(db.get_ref()).await?;

                Ok(HttpResponse::Ok().json(LookupResponse { id: row.id, nombre: row.nombre }))
            }

            #[delete("/{id}")]
            pub async fn remove(
                _admin: AdminUser,
                path: web::Path<i32>,
                db: web::Data<DatabaseConnection>,
            ) -> Result<HttpResponse, ApiError> {
                let row = find_active(db.get_ref(), path.into_inner()).await?;

                let mut active: $model::ActiveModel = row.into();
                active.activo = Set(false);
                active.update(db.get_ref()).await?;

                Ok(HttpResponse::NoContent().finish())
            }

            pub fn routes(cfg: &mut web::ServiceConfig) {
                cfg.service(
                    web::scope($path)
                        .service(list)
                        .service(create)
                        .service(update)
                        .service(remove),
                );
            }
        }
    };
}

lookup_table!(localidades, localidad, "/localidades", "localidad");
lookup_table!(zonas, zona, "/zonas", "zona");
lookup_table!(barrios, barrio, "/barrios", "barrio");
lookup_table!(categorias, categoria, "/categorias", "categoria");
lookup_table!(estados, estado, "/estados", "estado");

pub fn lookup_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(localidades::routes)
        .configure(zonas::routes)
        .configure(barrios::routes)
        .configure(categorias::routes)
        .configure(estados::routes);
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::{Value, json};

    use crate::models::usuario::Role;
    use crate::test_support::{TestContext, bearer, seed_staff};

    #[actix_web::test]
    async fn lookup_crud_with_unique_active_names() {
        let ctx = TestContext::new().await;
        let (boss, _) = seed_staff(&ctx.db, "boss@x.com", Role::Administrador, Some("Abcdef12")).await;
        let (agent, _) = seed_staff(&ctx.db, "agent@x.com", Role::Agente, Some("Abcdef12")).await;
        let app = test::init_service(App::new().configure(|cfg| ctx.register(cfg))).await;

        // Réservé aux administrateurs
        let req = test::TestRequest::post()
            .uri("/api/zonas")
            .insert_header(bearer(&agent, "agent@x.com"))
            .set_json(json!({ "nombre": "Norte" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri("/api/zonas")
            .insert_header(bearer(&boss, "boss@x.com"))
            .set_json(json!({ "nombre": "  Norte " }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let norte: Value = test::read_body_json(resp).await;
        assert_eq!(norte["nombre"], "Norte");

        let req = test::TestRequest::post()
            .uri("/api/zonas")
            .insert_header(bearer(&boss, "boss@x.com"))
            .set_json(json!({ "nombre": "Norte" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

        // Après désactivation le nom est de nouveau libre
        let req = test::TestRequest::delete()
            .uri(&format!("/api/zonas/{}", norte["id"]))
            .insert_header(bearer(&boss, "boss@x.com"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get().uri("/api/zonas").to_request();
        let listed: Value = test::call_and_read_body_json(&app, req).await;
        assert!(listed.as_array().unwrap().is_empty());

        let req = test::TestRequest::post()
            .uri("/api/zonas")
            .insert_header(bearer(&boss, "boss@x.com"))
            .set_json(json!({ "nombre": "Norte" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn rename_and_blank_names() {
        let ctx = TestContext::new().await;
        let (boss, _) = seed_staff(&ctx.db, "boss@x.com", Role::Administrador, Some("Abcdef12")).await;
        let app = test::init_service(App::new().configure(|cfg| ctx.register(cfg))).await;

        let req = test::TestRequest::post()
            .uri("/api/categorias")
            .insert_header(bearer(&boss, "boss@x.com"))
            .set_json(json!({ "nombre": "Depto" }))
            .to_request();
        let depto: Value = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::put()
            .uri(&format!("/api/categorias/{}", depto["id"]))
            .insert_header(bearer(&boss, "boss@x.com"))
            .set_json(json!({ "nombre": "Departamento" }))
            .to_request();
        let renamed: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(renamed["nombre"], "Departamento");

        let req = test::TestRequest::put()
            .uri(&format!("/api/categorias/{}", depto["id"]))
            .insert_header(bearer(&boss, "boss@x.com"))
            .set_json(json!({ "nombre": "   " }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::put()
            .uri("/api/categorias/999")
            .insert_header(bearer(&boss, "boss@x.com"))
            .set_json(json!({ "nombre": "Casa" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
