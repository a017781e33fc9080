// Outils partagés par les tests (BD SQLite en mémoire, notifier enregistreur)

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::web;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;

use crate::config::{AppConfig, AppEnvironment, AuthConfig, ServerConfig};
use crate::middleware::{JwtSessionResolver, SessionResolver};
use crate::migration::Migrator;
use crate::models::dto::{CreateStaffRequest, PropiedadRequest};
use crate::models::usuario::Role;
use crate::models::{categoria, empleado, estado, localidad, persona, usuario, zona};
use crate::services::notifier::{Notifier, NotifierError};
use crate::utils::{jwt, password};

pub const TEST_SECRET: &str = "test-secret";
pub const TEST_BASE_URL: &str = "http://localhost:3000";

static NEXT_DNI: AtomicU32 = AtomicU32::new(20_000_000);

/// Une seule connexion: la base en mémoire vit avec elle
pub async fn test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await.expect("sqlite in memory");
    Migrator::up(&db, None).await.expect("migrations");
    db
}

pub fn staff_request(email: &str, dni: &str) -> CreateStaffRequest {
    CreateStaffRequest {
        nombre: "Ana".to_string(),
        apellido: "Pérez".to_string(),
        dni: dni.to_string(),
        email: email.to_string(),
        cuit: None,
        telefono: None,
        fecha_ingreso: None,
    }
}

/// Insère persona + empleado + usuario. Sans mot de passe, le compte reçoit
/// un hash inutilisable (administrateur en attente d'invitation).
pub async fn seed_staff(
    db: &DatabaseConnection,
    email: &str,
    role: Role,
    secret: Option<&str>,
) -> (usuario::Model, persona::Model) {
    let now = Utc::now();
    let dni = NEXT_DNI.fetch_add(1, Ordering::Relaxed).to_string();

    let persona = persona::ActiveModel {
        nombre: Set("Test".to_string()),
        apellido: Set(role.to_string()),
        dni: Set(dni),
        email: Set(email.to_string()),
        cuit: Set(None),
        telefono: Set(None),
        deleted: Set(false),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    let empleado = empleado::ActiveModel {
        persona_id: Set(persona.id),
        fecha_ingreso: Set(now.date_naive()),
        deleted: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    let password_hash = match secret {
        Some(p) => password::hash_password(p).unwrap(),
        None => password::unusable_hash().unwrap(),
    };

    let usuario = usuario::ActiveModel {
        persona_id: Set(persona.id),
        empleado_id: Set(Some(empleado.id)),
        password_hash: Set(password_hash),
        role: Set(role),
        email_verified: Set(secret.map(|_| now)),
        deleted: Set(false),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    (usuario, persona)
}

/// Ids des tables de référence utilisées par les biens de test
#[derive(Debug, Clone, Copy)]
pub struct CatalogRefs {
    pub localidad_id: i32,
    pub zona_id: i32,
    pub categoria_id: i32,
    pub estado_id: i32,
}

pub async fn seed_catalog_refs(db: &DatabaseConnection) -> CatalogRefs {
    let localidad = localidad::ActiveModel {
        nombre: Set("Rosario".to_string()),
        activo: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
    let zona = zona::ActiveModel {
        nombre: Set("Centro".to_string()),
        activo: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
    let categoria = categoria::ActiveModel {
        nombre: Set("Casa".to_string()),
        activo: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
    let estado = estado::ActiveModel {
        nombre: Set("En venta".to_string()),
        activo: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    CatalogRefs {
        localidad_id: localidad.id,
        zona_id: zona.id,
        categoria_id: categoria.id,
        estado_id: estado.id,
    }
}

/// Bien non publié en USD
pub fn propiedad_request(refs: &CatalogRefs, titulo: &str, precio: i64) -> PropiedadRequest {
    PropiedadRequest {
        titulo: titulo.to_string(),
        descripcion: None,
        direccion: "Córdoba 1234".to_string(),
        precio,
        moneda: "USD".to_string(),
        ambientes: Some(3),
        superficie: Some(80),
        localidad_id: refs.localidad_id,
        zona_id: refs.zona_id,
        barrio_id: None,
        categoria_id: refs.categoria_id,
        estado_id: refs.estado_id,
        agente_id: None,
        publicada: false,
    }
}

/// Header Authorization pour un usuario
pub fn bearer(usuario: &usuario::Model, email: &str) -> (&'static str, String) {
    let token = jwt::generate_token(
        usuario.id,
        email,
        usuario.role,
        usuario.empleado_id,
        TEST_SECRET,
        1,
    )
    .unwrap();
    ("Authorization", format!("Bearer {}", token))
}

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub kind: &'static str,
    /// Lien d'invitation ou mot de passe temporaire
    pub content: String,
}

/// Garde les messages en mémoire au lieu de les envoyer
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMail>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    fn record(&self, to: &str, kind: &'static str, content: &str) -> Result<(), NotifierError> {
        if self.fail {
            return Err(NotifierError::Rejected {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            kind,
            content: content.to_string(),
        });
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_invitation(&self, to_email: &str, _to_name: &str, link: &str) -> Result<(), NotifierError> {
        self.record(to_email, "invitation", link)
    }

    async fn send_temporary_password(
        &self,
        to_email: &str,
        _to_name: &str,
        password: &str,
    ) -> Result<(), NotifierError> {
        self.record(to_email, "temporary_password", password)
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        environment: AppEnvironment::Test,
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database_url: "sqlite::memory:".to_string(),
        auth: AuthConfig {
            jwt_secret: TEST_SECRET.to_string(),
            jwt_ttl_hours: 1,
        },
        app_base_url: TEST_BASE_URL.to_string(),
        log_level: "warn".to_string(),
        mail: None,
    }
}

/// État partagé d'une App de test
pub struct TestContext {
    pub db: DatabaseConnection,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_notifier(RecordingNotifier::default()).await
    }

    pub async fn with_notifier(notifier: RecordingNotifier) -> Self {
        Self {
            db: test_db().await,
            notifier: Arc::new(notifier),
        }
    }

    /// Même enregistrement que dans main.rs
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        let notifier: Arc<dyn Notifier> = self.notifier.clone();
        let resolver: Arc<dyn SessionResolver> = Arc::new(JwtSessionResolver::new(TEST_SECRET));

        cfg.app_data(web::Data::new(self.db.clone()))
            .app_data(web::Data::new(test_config()))
            .app_data(web::Data::from(notifier))
            .app_data(web::Data::from(resolver));
        crate::routes::configure_routes(cfg);
    }
}
