use actix_web::{HttpResponse, get, web};
use sea_orm::DatabaseConnection;

use crate::errors::ApiError;
use crate::models::dto::{CatalogoQuery, PropiedadResponse};
use crate::services::propiedad_service::PropiedadService;

/// GET /api/catalogo - Biens publiés, filtres + pagination (PUBLIC)
#[get("")]
pub async fn catalogo(
    query: web::Query<CatalogoQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let page = PropiedadService::catalog(db.get_ref(), &query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /api/catalogo/{id} - Fiche d'un bien publié (PUBLIC)
#[get("/{id}")]
pub async fn catalogo_item(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let found = PropiedadService::catalog_get(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(PropiedadResponse::from(found)))
}

pub fn catalogo_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/catalogo")
            .service(catalogo)
            .service(catalogo_item),
    );
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::Value;

    use crate::middleware::Session;
    use crate::models::usuario::Role;
    use crate::services::propiedad_service::PropiedadService;
    use crate::test_support::{TestContext, propiedad_request, seed_catalog_refs, seed_staff};

    #[actix_web::test]
    async fn public_catalog_filters_and_paginates() {
        let ctx = TestContext::new().await;
        let refs = seed_catalog_refs(&ctx.db).await;
        let (boss, _) = seed_staff(&ctx.db, "boss@x.com", Role::Administrador, Some("Abcdef12")).await;
        let session = Session {
            usuario_id: boss.id,
            email: "boss@x.com".to_string(),
            role: Role::Administrador,
            empleado_id: boss.empleado_id,
        };

        let mut hidden_id = 0;
        for (i, publicada) in [true, true, true, false].into_iter().enumerate() {
            let mut request = propiedad_request(&refs, &format!("P{}", i), 1_000 * (i as i64 + 1));
            request.publicada = publicada;
            let created = PropiedadService::create(&ctx.db, &session, request).await.unwrap();
            if !publicada {
                hidden_id = created.id;
            }
        }
        let app = test::init_service(App::new().configure(|cfg| ctx.register(cfg))).await;

        let req = test::TestRequest::get()
            .uri("/api/catalogo?perPage=2&page=2")
            .to_request();
        let page: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(page["total"], 3);
        assert_eq!(page["page"], 2);
        assert_eq!(page["perPage"], 2);
        assert_eq!(page["items"].as_array().unwrap().len(), 1);

        let req = test::TestRequest::get()
            .uri(&format!("/api/catalogo?minPrecio=2000&categoriaId={}", refs.categoria_id))
            .to_request();
        let page: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(page["total"], 2);

        let req = test::TestRequest::get()
            .uri(&format!("/api/catalogo/{}", hidden_id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri("/api/catalogo?page=18446744073709551615&perPage=50")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let page: Value = test::read_body_json(resp).await;
        assert_eq!(page["total"], 3);
        assert!(page["items"].as_array().unwrap().is_empty());

        let req = test::TestRequest::get()
            .uri("/api/catalogo?page=abc")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
