// ============================================================================
// MODÈLE : USUARIOS (identifiants de connexion)
// ============================================================================
//
// Colonnes:
//   - persona_id : FK vers personas
//   - empleado_id : FK vers empleados (porté dans la session)
//   - password_hash : jamais NULL. Format pbkdf2:sha256:iterations$salt$hash
//   - role : 'administrador' | 'agente'
//   - email_verified : rempli quand le mot de passe est défini via le lien
//   - deleted : suppression logique, jamais de DELETE physique
//
// Points d'attention:
//   - Un administrateur créé sans mot de passe reçoit un hash "inutilisable"
//     (hash d'octets aléatoires jetés) au lieu d'un NULL: le compte existe
//     mais aucune connexion n'est possible avant l'utilisation du token.
//
// ============================================================================

use serde::{Deserialize, Serialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "usuarios")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub persona_id: i32,
    pub empleado_id: Option<i32>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub email_verified: Option<DateTimeUtc>,
    pub deleted: bool,
    pub created_at: DateTimeUtc,
}

/// Rôles du personnel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "administrador")]
    Administrador,
    #[sea_orm(string_value = "agente")]
    Agente,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrador => "administrador",
            Role::Agente => "agente",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::persona::Entity",
        from = "Column::PersonaId",
        to = "super::persona::Column::Id"
    )]
    Persona,

    #[sea_orm(
        belongs_to = "super::empleado::Entity",
        from = "Column::EmpleadoId",
        to = "super::empleado::Column::Id"
    )]
    Empleado,
}

impl Related<super::persona::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Persona.def()
    }
}

impl Related<super::empleado::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Empleado.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
