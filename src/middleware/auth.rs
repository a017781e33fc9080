use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures::future::LocalBoxFuture;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::ApiError;
use crate::models::usuario::{self, Role};
use crate::utils::jwt;

/// Session de l'utilisateur authentifié (claims du JWT)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub usuario_id: i32,
    pub email: String,
    pub role: Role,
    pub empleado_id: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("not authorized")]
    NotAuthorized,
}

/// Contrôle d'accès: fonction pure, sans état partagé.
/// Pas de session -> NotAuthenticated, mauvais rôle -> NotAuthorized
pub fn authorize(session: Option<Session>, required: Option<Role>) -> Result<Session, AuthError> {
    let session = session.ok_or(AuthError::NotAuthenticated)?;
    match required {
        Some(role) if session.role != role => Err(AuthError::NotAuthorized),
        _ => Ok(session),
    }
}

/// Capacité injectée (web::Data<dyn SessionResolver>) qui retrouve la
/// session à partir de la requête
pub trait SessionResolver: Send + Sync {
    fn resolve(&self, req: &HttpRequest) -> Option<Session>;
}

/// Résout la session depuis le header "Authorization: Bearer <jwt>"
pub struct JwtSessionResolver {
    secret: String,
}

impl JwtSessionResolver {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl SessionResolver for JwtSessionResolver {
    fn resolve(&self, req: &HttpRequest) -> Option<Session> {
        let header = req.headers().get("Authorization")?.to_str().ok()?;
        let token = header.strip_prefix("Bearer ")?.trim();

        match jwt::verify_token(token, &self.secret) {
            Ok(claims) => Some(Session {
                usuario_id: claims.sub,
                email: claims.email,
                role: claims.role,
                empleado_id: claims.empleado_id,
            }),
            Err(e) => {
                tracing::debug!("rejected session token: {}", e);
                None
            }
        }
    }
}

async fn gate(req: HttpRequest, required: Option<Role>) -> Result<Session, ApiError> {
    let resolver = req
        .app_data::<web::Data<dyn SessionResolver>>()
        .ok_or_else(|| ApiError::Internal("session resolver not configured".to_string()))?;
    let session = authorize(resolver.resolve(&req), required)?;

    // Un JWT survit à la suppression logique du compte: on revérifie
    let db = req
        .app_data::<web::Data<DatabaseConnection>>()
        .ok_or_else(|| ApiError::Internal("database not configured".to_string()))?;
    let active = usuario::Entity::find_by_id(session.usuario_id)
        .filter(usuario::Column::Deleted.eq(false))
        .one(db.get_ref())
        .await?;

    match active {
        Some(_) => Ok(session),
        None => {
            tracing::debug!(usuario_id = session.usuario_id, "session for a deactivated account");
            Err(ApiError::NotAuthenticated)
        }
    }
}

/// Extracteur pour les routes réservées au personnel (tout rôle)
#[derive(Debug, Clone)]
pub struct AuthUser(pub Session);

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { gate(req, None).await.map(AuthUser) })
    }
}

/// Extracteur pour les routes réservées aux administrateurs
#[derive(Debug, Clone)]
pub struct AdminUser(pub Session);

impl FromRequest for AdminUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { gate(req, Some(Role::Administrador)).await.map(AdminUser) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use sea_orm::{ActiveModelTrait, Set};
    use std::sync::Arc;

    use crate::test_support::{seed_staff, test_db};

    const SECRET: &str = "gate-secret";

    fn session(role: Role) -> Session {
        Session {
            usuario_id: 1,
            email: "a@x.com".to_string(),
            role,
            empleado_id: Some(1),
        }
    }

    #[test]
    fn no_session_is_not_authenticated() {
        assert_eq!(
            authorize(None, Some(Role::Administrador)),
            Err(AuthError::NotAuthenticated)
        );
        assert_eq!(authorize(None, None), Err(AuthError::NotAuthenticated));
    }

    #[test]
    fn wrong_role_is_not_authorized() {
        assert_eq!(
            authorize(Some(session(Role::Agente)), Some(Role::Administrador)),
            Err(AuthError::NotAuthorized)
        );
    }

    #[test]
    fn matching_role_or_no_requirement_passes() {
        let admin = session(Role::Administrador);
        assert_eq!(
            authorize(Some(admin.clone()), Some(Role::Administrador)),
            Ok(admin)
        );
        assert!(authorize(Some(session(Role::Agente)), None).is_ok());
    }

    #[test]
    fn jwt_resolver_reads_bearer_header() {
        let resolver = JwtSessionResolver::new(SECRET);
        let token = jwt::generate_token(5, "b@x.com", Role::Agente, Some(9), SECRET, 1).unwrap();

        let req = TestRequest::default()
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_http_request();
        let session = resolver.resolve(&req).unwrap();
        assert_eq!(session.usuario_id, 5);
        assert_eq!(session.role, Role::Agente);
        assert_eq!(session.empleado_id, Some(9));

        let missing = TestRequest::default().to_http_request();
        assert!(resolver.resolve(&missing).is_none());

        let basic = TestRequest::default()
            .insert_header(("Authorization", format!("Basic {}", token)))
            .to_http_request();
        assert!(resolver.resolve(&basic).is_none());
    }

    #[actix_web::test]
    async fn admin_extractor_maps_gate_failures() {
        let resolver: Arc<dyn SessionResolver> = Arc::new(JwtSessionResolver::new(SECRET));
        let agent = jwt::generate_token(2, "c@x.com", Role::Agente, None, SECRET, 1).unwrap();

        let req = TestRequest::default()
            .app_data(web::Data::from(resolver.clone()))
            .to_http_request();
        let err = AdminUser::extract(&req).await.unwrap_err();
        assert!(matches!(err, ApiError::NotAuthenticated));

        let req = TestRequest::default()
            .app_data(web::Data::from(resolver))
            .insert_header(("Authorization", format!("Bearer {}", agent)))
            .to_http_request();
        let err = AdminUser::extract(&req).await.unwrap_err();
        assert!(matches!(err, ApiError::NotAuthorized));
    }

    #[actix_web::test]
    async fn extractor_rejects_deactivated_account() {
        let db = test_db().await;
        let (boss, _) = seed_staff(&db, "boss@x.com", Role::Administrador, None).await;
        let resolver: Arc<dyn SessionResolver> = Arc::new(JwtSessionResolver::new(SECRET));
        let token = jwt::generate_token(boss.id, "boss@x.com", Role::Administrador, boss.empleado_id, SECRET, 1)
            .unwrap();
        let request = || {
            TestRequest::default()
                .app_data(web::Data::from(resolver.clone()))
                .app_data(web::Data::new(db.clone()))
                .insert_header(("Authorization", format!("Bearer {}", token)))
                .to_http_request()
        };

        let AdminUser(session) = AdminUser::extract(&request()).await.unwrap();
        assert_eq!(session.usuario_id, boss.id);

        let mut active: usuario::ActiveModel = boss.into();
        active.deleted = Set(true);
        active.update(&db).await.unwrap();

        let err = AuthUser::extract(&request()).await.unwrap_err();
        assert!(matches!(err, ApiError::NotAuthenticated));
    }
}
