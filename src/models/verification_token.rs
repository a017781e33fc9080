// ============================================================================
// MODÈLE : VERIFICATION TOKENS
// ============================================================================
//
// Colonnes de la table verification_tokens:
//   - identifier (VARCHAR, NOT NULL) - email du compte
//   - token (VARCHAR, NOT NULL, UNIQUE) - 32 octets aléatoires en hex
//   - expires (TIMESTAMPTZ, NOT NULL) - création + 24 heures
//   - PRIMARY KEY (identifier, token)
//
// Workflow:
//   1. Un administrateur crée un compte (ou demande un renvoi)
//   2. Backend supprime les anciens tokens de l'email et en insère un nouveau
//   3. Backend envoie l'email avec le lien /set-password?token=xxx
//   4. User envoie POST /api/auth/set-password avec token + mot de passe
//   5. Backend vérifie: token existe, non expiré
//   6. Backend supprime le token et change le hash dans la même transaction
//
// Points d'attention:
//   - Au plus un token vivant par email
//   - Pas de UPDATE: un token est créé puis supprimé
//   - Un token expiré est supprimé dès qu'il est présenté
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "verification_tokens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub identifier: String,

    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(skip_serializing)]
    pub token: String,

    pub expires: DateTimeUtc,
}

impl Model {
    pub fn is_expired(&self, now: DateTimeUtc) -> bool {
        self.expires < now
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
