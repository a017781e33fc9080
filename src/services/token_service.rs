use chrono::{Duration, Utc};
use sea_orm::*;

use crate::errors::ApiError;
use crate::models::{persona, usuario, verification_token};
use crate::utils::{password, token};

/// Durée de validité d'un lien d'invitation
pub const INVITATION_TTL_HOURS: i64 = 24;

/// Résultat de la lecture d'un token présenté
#[derive(Debug)]
enum TokenState {
    Valid(verification_token::Model),
    Expired(verification_token::Model),
    Unknown,
}

pub struct TokenService;

impl TokenService {
    /// Émet un nouveau token pour un email et invalide les précédents.
    /// Suppression + insertion dans la même transaction, après verrouillage
    /// de la persona: deux émissions concurrentes laissent un seul token.
    pub async fn issue(
        db: &DatabaseConnection,
        identifier: &str,
    ) -> Result<verification_token::Model, ApiError> {
        let new_token = verification_token::Model {
            identifier: identifier.to_string(),
            token: token::generate_token(),
            expires: Utc::now() + Duration::hours(INVITATION_TTL_HOURS),
        };

        let txn = db.begin().await?;

        // 1. Verrouiller le compte propriétaire (SELECT ... FOR UPDATE)
        let owners = persona::Entity::find()
            .filter(persona::Column::Email.eq(identifier))
            .filter(persona::Column::Deleted.eq(false))
            .lock_exclusive()
            .all(&txn)
            .await?;

        if owners.is_empty() {
            txn.rollback().await?;
            return Err(ApiError::NotFound("account"));
        }

        // 2. Supprimer les invitations en cours
        verification_token::Entity::delete_many()
            .filter(verification_token::Column::Identifier.eq(identifier))
            .exec(&txn)
            .await?;

        // 3. Insérer le nouveau token
        verification_token::Entity::insert(new_token.clone().into_active_model())
            .exec_without_returning(&txn)
            .await?;

        txn.commit().await?;

        tracing::info!(identifier, expires = %new_token.expires, "verification token issued");
        Ok(new_token)
    }

    /// Vérifie un token sans le consommer (GET set-password).
    /// Un token expiré est supprimé au passage.
    pub async fn inspect(
        db: &DatabaseConnection,
        presented: &str,
    ) -> Result<verification_token::Model, ApiError> {
        match Self::classify(db, presented).await? {
            TokenState::Valid(row) => Ok(row),
            TokenState::Expired(row) => {
                Self::purge(db, &row).await?;
                Err(ApiError::ExpiredToken)
            }
            TokenState::Unknown => Err(ApiError::InvalidToken),
        }
    }

    /// Consomme un token et définit le mot de passe du compte.
    /// Suppression du token + mise à jour du hash: tout ou rien.
    pub async fn redeem(
        db: &DatabaseConnection,
        presented: &str,
        new_password: &str,
    ) -> Result<usuario::Model, ApiError> {
        // La politique est vérifiée avant de toucher la BD
        password::check_policy(new_password).map_err(|msg| ApiError::field("password", msg))?;
        let new_hash = password::hash_password(new_password).map_err(ApiError::Internal)?;

        let txn = db.begin().await?;

        let row = match Self::classify(&txn, presented).await? {
            TokenState::Valid(row) => row,
            TokenState::Expired(row) => {
                Self::purge(&txn, &row).await?;
                txn.commit().await?;
                return Err(ApiError::ExpiredToken);
            }
            TokenState::Unknown => {
                txn.rollback().await?;
                return Err(ApiError::InvalidToken);
            }
        };

        // Le premier qui supprime la ligne gagne, les autres échouent
        let deleted = Self::purge(&txn, &row).await?;
        if deleted != 1 {
            txn.rollback().await?;
            return Err(ApiError::InvalidToken);
        }

        let account = usuario::Entity::find()
            .inner_join(persona::Entity)
            .filter(persona::Column::Email.eq(row.identifier.as_str()))
            .filter(persona::Column::Deleted.eq(false))
            .filter(usuario::Column::Deleted.eq(false))
            .one(&txn)
            .await?;

        let Some(account) = account else {
            txn.rollback().await?;
            return Err(ApiError::NotFound("account"));
        };

        let mut active: usuario::ActiveModel = account.into();
        active.password_hash = Set(new_hash);
        active.email_verified = Set(Some(Utc::now()));
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        tracing::info!(usuario_id = updated.id, "password set from verification token");
        Ok(updated)
    }

    /// Supprime les tokens d'un email (compte désactivé)
    pub async fn revoke_all<C: ConnectionTrait>(db: &C, identifier: &str) -> Result<u64, DbErr> {
        let result = verification_token::Entity::delete_many()
            .filter(verification_token::Column::Identifier.eq(identifier))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn classify<C: ConnectionTrait>(db: &C, presented: &str) -> Result<TokenState, DbErr> {
        let presented = presented.trim();
        if presented.is_empty() {
            return Ok(TokenState::Unknown);
        }

        let row = verification_token::Entity::find()
            .filter(verification_token::Column::Token.eq(presented))
            .one(db)
            .await?;

        Ok(match row {
            None => TokenState::Unknown,
            Some(row) if row.is_expired(Utc::now()) => TokenState::Expired(row),
            Some(row) => TokenState::Valid(row),
        })
    }

    async fn purge<C: ConnectionTrait>(
        db: &C,
        row: &verification_token::Model,
    ) -> Result<u64, DbErr> {
        let result = verification_token::Entity::delete_many()
            .filter(verification_token::Column::Identifier.eq(row.identifier.as_str()))
            .filter(verification_token::Column::Token.eq(row.token.as_str()))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}

/// Lien envoyé par email
pub fn invitation_link(base_url: &str, token: &str) -> String {
    format!("{}/set-password?token={}", base_url.trim_end_matches('/'), token)
}
