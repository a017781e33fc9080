//pour les requêtes et réponses JSON (camelCase sur le fil)
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::usuario::Role;
use crate::models::{consulta, propiedad};
use crate::utils::password;

pub const MONEDAS: [&str; 2] = ["ARS", "USD"];

fn validate_password_policy(value: &str) -> Result<(), ValidationError> {
    password::check_policy(value).map_err(|message| {
        let mut error = ValidationError::new("password_policy");
        error.message = Some(message.into());
        error
    })
}

fn validate_moneda(value: &str) -> Result<(), ValidationError> {
    if MONEDAS.contains(&value) {
        Ok(())
    } else {
        let mut error = ValidationError::new("moneda");
        error.message = Some("Must be one of: ARS, USD".into());
        Err(error)
    }
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("Must not be blank".into());
        Err(error)
    } else {
        Ok(())
    }
}

// Longueur comptée après trim: c'est la valeur stockée
fn validate_dni(value: &str) -> Result<(), ValidationError> {
    let len = value.trim().chars().count();
    if (6..=20).contains(&len) {
        Ok(())
    } else {
        let mut error = ValidationError::new("dni");
        error.message = Some("Invalid DNI".into());
        Err(error)
    }
}

// ----------------------------------------------------------------------------
// Auth
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub usuario_id: i32,
    pub email: String,
    pub role: Role,
    pub empleado_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(custom(function = "validate_password_policy"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetPasswordRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
    #[validate(custom(function = "validate_password_policy"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct TokenStatusResponse {
    pub email: String,
    pub expires: DateTime<Utc>,
}

// ----------------------------------------------------------------------------
// Personnel
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStaffRequest {
    #[validate(length(min = 1, max = 100, message = "Nombre is required"), custom(function = "validate_not_blank"))]
    pub nombre: String,
    #[validate(length(min = 1, max = 100, message = "Apellido is required"), custom(function = "validate_not_blank"))]
    pub apellido: String,
    #[validate(custom(function = "validate_dni"))]
    pub dni: String,
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 8, max = 20, message = "Invalid CUIT"))]
    pub cuit: Option<String>,
    #[validate(length(max = 40))]
    pub telefono: Option<String>,
    pub fecha_ingreso: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStaffResponse {
    pub persona_id: i32,
    pub empleado_id: i32,
    pub usuario_id: i32,
    pub email_sent: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResendInvitationRequest {
    pub persona_id: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResendInvitationResponse {
    pub email_sent: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffSummary {
    pub usuario_id: i32,
    pub persona_id: i32,
    pub empleado_id: Option<i32>,
    pub nombre: String,
    pub apellido: String,
    pub dni: String,
    pub email: String,
    pub role: Role,
    pub email_verified: bool, // false tant que le lien d'invitation n'a pas été utilisé
}

// ----------------------------------------------------------------------------
// Tables de référence
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct LookupRequest {
    #[validate(length(min = 1, max = 120, message = "Nombre is required"))]
    pub nombre: String,
}

#[derive(Debug, Serialize)]
pub struct LookupResponse {
    pub id: i32,
    pub nombre: String,
}

// ----------------------------------------------------------------------------
// Propiedades
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PropiedadRequest {
    #[validate(length(min = 1, max = 200, message = "Titulo is required"), custom(function = "validate_not_blank"))]
    pub titulo: String,
    pub descripcion: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Direccion is required"), custom(function = "validate_not_blank"))]
    pub direccion: String,
    #[validate(range(min = 1, message = "Precio must be greater than 0"))]
    pub precio: i64,
    #[validate(custom(function = "validate_moneda"))]
    pub moneda: String,
    #[validate(range(min = 0))]
    pub ambientes: Option<i32>,
    #[validate(range(min = 0))]
    pub superficie: Option<i32>,
    pub localidad_id: i32,
    pub zona_id: i32,
    pub barrio_id: Option<i32>,
    pub categoria_id: i32,
    pub estado_id: i32,
    pub agente_id: Option<i32>,
    #[serde(default)]
    pub publicada: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropiedadResponse {
    pub id: i32,
    pub titulo: String,
    pub descripcion: Option<String>,
    pub direccion: String,
    pub precio: i64,
    pub moneda: String,
    pub ambientes: Option<i32>,
    pub superficie: Option<i32>,
    pub localidad_id: i32,
    pub zona_id: i32,
    pub barrio_id: Option<i32>,
    pub categoria_id: i32,
    pub estado_id: i32,
    pub agente_id: Option<i32>,
    pub publicada: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<propiedad::Model> for PropiedadResponse {
    fn from(p: propiedad::Model) -> Self {
        Self {
            id: p.id,
            titulo: p.titulo,
            descripcion: p.descripcion,
            direccion: p.direccion,
            precio: p.precio,
            moneda: p.moneda,
            ambientes: p.ambientes,
            superficie: p.superficie,
            localidad_id: p.localidad_id,
            zona_id: p.zona_id,
            barrio_id: p.barrio_id,
            categoria_id: p.categoria_id,
            estado_id: p.estado_id,
            agente_id: p.agente_id,
            publicada: p.publicada,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogoQuery {
    pub categoria_id: Option<i32>,
    pub localidad_id: Option<i32>,
    pub zona_id: Option<i32>,
    pub min_precio: Option<i64>,
    pub max_precio: Option<i64>,
    pub moneda: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

// ----------------------------------------------------------------------------
// Consultas
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConsultaRequest {
    pub propiedad_id: Option<i32>,
    #[validate(length(min = 1, max = 120, message = "Nombre is required"), custom(function = "validate_not_blank"))]
    pub nombre: String,
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(max = 40))]
    pub telefono: Option<String>,
    #[validate(length(min = 1, max = 2000, message = "Mensaje is required"), custom(function = "validate_not_blank"))]
    pub mensaje: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConsultasQuery {
    pub pendientes: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultaResponse {
    pub id: i32,
    pub propiedad_id: Option<i32>,
    pub nombre: String,
    pub email: String,
    pub telefono: Option<String>,
    pub mensaje: String,
    pub atendida: bool,
    pub created_at: DateTime<Utc>,
}

impl From<consulta::Model> for ConsultaResponse {
    fn from(c: consulta::Model) -> Self {
        Self {
            id: c.id,
            propiedad_id: c.propiedad_id,
            nombre: c.nombre,
            email: c.email,
            telefono: c.telefono,
            mensaje: c.mensaje,
            atendida: c.atendida,
            created_at: c.created_at,
        }
    }
}
