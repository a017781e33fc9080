use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::*;

use crate::errors::ApiError;
use crate::middleware::Session;
use crate::models::dto::{CreateStaffRequest, CreateStaffResponse, StaffSummary};
use crate::models::usuario::Role;
use crate::models::{empleado, persona, usuario};
use crate::services::notifier::Notifier;
use crate::services::token_service::{TokenService, invitation_link};
use crate::utils::password;

pub struct AccountService;

impl AccountService {
    /// Crée persona + empleado + usuario en une transaction, puis envoie
    /// l'email (lien d'invitation pour un administrateur, mot de passe
    /// temporaire pour un agent). Un échec d'envoi ne fait pas échouer la
    /// création: on renvoie email_sent = false.
    pub async fn create_staff(
        db: &DatabaseConnection,
        notifier: &dyn Notifier,
        base_url: &str,
        role: Role,
        request: CreateStaffRequest,
    ) -> Result<CreateStaffResponse, ApiError> {
        let input = normalize(request);

        // 1. Secret initial (hashé avant d'ouvrir la transaction)
        let (password_hash, temporary_password) = match role {
            Role::Administrador => (password::unusable_hash().map_err(ApiError::Internal)?, None),
            Role::Agente => {
                let temporary = password::generate_temporary_password();
                let hash = password::hash_password(&temporary).map_err(ApiError::Internal)?;
                (hash, Some(temporary))
            }
        };

        // 2. Vérifications d'unicité + insertions
        let txn = db.begin().await?;
        Self::ensure_unique(&txn, &input).await?;

        let now = Utc::now();
        let persona = persona::ActiveModel {
            nombre: Set(input.nombre),
            apellido: Set(input.apellido),
            dni: Set(input.dni),
            email: Set(input.email),
            cuit: Set(input.cuit),
            telefono: Set(input.telefono),
            deleted: Set(false),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(unique_violation)?;

        let empleado = empleado::ActiveModel {
            persona_id: Set(persona.id),
            fecha_ingreso: Set(input.fecha_ingreso.unwrap_or_else(|| now.date_naive())),
            deleted: Set(false),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let usuario = usuario::ActiveModel {
            persona_id: Set(persona.id),
            empleado_id: Set(Some(empleado.id)),
            password_hash: Set(password_hash),
            role: Set(role),
            email_verified: Set(None),
            deleted: Set(false),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        tracing::info!(persona_id = persona.id, usuario_id = usuario.id, %role, "staff account created");

        // 3. Notification
        let email_sent = match temporary_password {
            None => match Self::send_invitation(db, notifier, base_url, &persona).await {
                Ok(sent) => sent,
                Err(e) => {
                    tracing::warn!(persona_id = persona.id, error = %e, "could not issue invitation token");
                    false
                }
            },
            Some(temporary) => {
                match notifier
                    .send_temporary_password(&persona.email, &persona.full_name(), &temporary)
                    .await
                {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!(persona_id = persona.id, error = %e, "temporary password not delivered");
                        false
                    }
                }
            }
        };

        Ok(CreateStaffResponse {
            persona_id: persona.id,
            empleado_id: empleado.id,
            usuario_id: usuario.id,
            email_sent,
        })
    }

    /// Renvoi manuel du lien (nouveau token, les anciens sont invalidés)
    pub async fn resend_invitation(
        db: &DatabaseConnection,
        notifier: &dyn Notifier,
        base_url: &str,
        persona_id: i32,
    ) -> Result<bool, ApiError> {
        let persona = persona::Entity::find_by_id(persona_id)
            .filter(persona::Column::Deleted.eq(false))
            .one(db)
            .await?
            .ok_or(ApiError::NotFound("persona"))?;

        let has_account = usuario::Entity::find()
            .filter(usuario::Column::PersonaId.eq(persona.id))
            .filter(usuario::Column::Deleted.eq(false))
            .one(db)
            .await?
            .is_some();
        if !has_account {
            return Err(ApiError::NotFound("account"));
        }

        Self::send_invitation(db, notifier, base_url, &persona).await
    }

    /// Émet le token puis l'envoie. Erreur seulement si le token n'a pas pu
    /// être créé; un échec d'envoi renvoie Ok(false).
    async fn send_invitation(
        db: &DatabaseConnection,
        notifier: &dyn Notifier,
        base_url: &str,
        persona: &persona::Model,
    ) -> Result<bool, ApiError> {
        let issued = TokenService::issue(db, &persona.email).await?;
        let link = invitation_link(base_url, &issued.token);

        match notifier
            .send_invitation(&persona.email, &persona.full_name(), &link)
            .await
        {
            Ok(()) => Ok(true),
            Err(e) => {
                tracing::warn!(persona_id = persona.id, error = %e, "invitation not delivered");
                Ok(false)
            }
        }
    }

    async fn ensure_unique<C: ConnectionTrait>(
        db: &C,
        input: &CreateStaffRequest,
    ) -> Result<(), ApiError> {
        let active = || persona::Entity::find().filter(persona::Column::Deleted.eq(false));

        if active()
            .filter(persona::Column::Dni.eq(input.dni.as_str()))
            .one(db)
            .await?
            .is_some()
        {
            return Err(ApiError::Conflict("DNI already registered".to_string()));
        }

        if active()
            .filter(persona::Column::Email.eq(input.email.as_str()))
            .one(db)
            .await?
            .is_some()
        {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }

        if let Some(cuit) = &input.cuit {
            if active()
                .filter(persona::Column::Cuit.eq(cuit.as_str()))
                .one(db)
                .await?
                .is_some()
            {
                return Err(ApiError::Conflict("CUIT already registered".to_string()));
            }
        }

        Ok(())
    }

    /// Comptes actifs d'un rôle avec les données de la persona
    pub async fn list_staff(db: &DatabaseConnection, role: Role) -> Result<Vec<StaffSummary>, ApiError> {
        let rows = usuario::Entity::find()
            .find_also_related(persona::Entity)
            .filter(usuario::Column::Role.eq(role))
            .filter(usuario::Column::Deleted.eq(false))
            .order_by_asc(usuario::Column::Id)
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(usuario, persona)| persona.map(|p| (usuario, p)))
            .filter(|(_, persona)| !persona.deleted)
            .map(|(usuario, persona)| StaffSummary {
                usuario_id: usuario.id,
                persona_id: persona.id,
                empleado_id: usuario.empleado_id,
                nombre: persona.nombre,
                apellido: persona.apellido,
                dni: persona.dni,
                email: persona.email,
                role: usuario.role,
                email_verified: usuario.email_verified.is_some(),
            })
            .collect())
    }

    /// Suppression logique d'un compte (usuario, empleado et persona)
    pub async fn deactivate(
        db: &DatabaseConnection,
        actor: &Session,
        usuario_id: i32,
    ) -> Result<(), ApiError> {
        if actor.usuario_id == usuario_id {
            return Err(ApiError::Conflict("You cannot delete your own account".to_string()));
        }

        let txn = db.begin().await?;

        let (usuario, persona) = usuario::Entity::find_by_id(usuario_id)
            .find_also_related(persona::Entity)
            .filter(usuario::Column::Deleted.eq(false))
            .one(&txn)
            .await?
            .ok_or(ApiError::NotFound("usuario"))?;

        let empleado_id = usuario.empleado_id;
        let mut active: usuario::ActiveModel = usuario.into();
        active.deleted = Set(true);
        active.update(&txn).await?;

        if let Some(empleado_id) = empleado_id {
            empleado::Entity::update_many()
                .col_expr(empleado::Column::Deleted, Expr::value(true))
                .filter(empleado::Column::Id.eq(empleado_id))
                .exec(&txn)
                .await?;
        }

        if let Some(persona) = persona {
            TokenService::revoke_all(&txn, &persona.email).await?;
            let mut active: persona::ActiveModel = persona.into();
            active.deleted = Set(true);
            active.update(&txn).await?;
        }

        txn.commit().await?;
        tracing::info!(usuario_id, by = actor.usuario_id, "staff account deactivated");
        Ok(())
    }

    /// Vérifie email + mot de passe pour la connexion
    pub async fn authenticate(
        db: &DatabaseConnection,
        email: &str,
        password: &str,
    ) -> Result<(usuario::Model, persona::Model), ApiError> {
        let email = email.trim().to_lowercase();

        let found = usuario::Entity::find()
            .find_also_related(persona::Entity)
            .filter(persona::Column::Email.eq(email.as_str()))
            .filter(persona::Column::Deleted.eq(false))
            .filter(usuario::Column::Deleted.eq(false))
            .one(db)
            .await?;

        let Some((usuario, Some(persona))) = found else {
            return Err(ApiError::InvalidCredentials);
        };

        match password::verify_password(password, &usuario.password_hash) {
            Ok(true) => Ok((usuario, persona)),
            Ok(false) => Err(ApiError::InvalidCredentials),
            Err(e) => {
                tracing::error!(usuario_id = usuario.id, "stored password hash is unreadable: {}", e);
                Err(ApiError::InvalidCredentials)
            }
        }
    }

    /// Changement de mot de passe par l'utilisateur connecté
    pub async fn change_password(
        db: &DatabaseConnection,
        session: &Session,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        password::check_policy(new_password).map_err(|msg| ApiError::field("new_password", msg))?;

        let usuario = usuario::Entity::find_by_id(session.usuario_id)
            .filter(usuario::Column::Deleted.eq(false))
            .one(db)
            .await?
            .ok_or(ApiError::NotFound("usuario"))?;

        let is_valid = password::verify_password(current_password, &usuario.password_hash)
            .map_err(ApiError::Internal)?;
        if !is_valid {
            return Err(ApiError::field("current_password", "Current password is incorrect"));
        }

        let new_hash = password::hash_password(new_password).map_err(ApiError::Internal)?;
        let mut active: usuario::ActiveModel = usuario.into();
        active.password_hash = Set(new_hash);
        active.update(db).await?;

        tracing::info!(usuario_id = session.usuario_id, "password changed");
        Ok(())
    }
}

// Course entre deux créations: l'index unique partiel tranche
fn unique_violation(err: DbErr) -> ApiError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            let field = if detail.contains("dni") {
                "DNI"
            } else if detail.contains("cuit") {
                "CUIT"
            } else {
                "Email"
            };
            ApiError::Conflict(format!("{} already registered", field))
        }
        _ => ApiError::Database(err),
    }
}

fn normalize(request: CreateStaffRequest) -> CreateStaffRequest {
    let trim_opt = |value: Option<String>| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    CreateStaffRequest {
        nombre: request.nombre.trim().to_string(),
        apellido: request.apellido.trim().to_string(),
        dni: request.dni.trim().to_string(),
        email: request.email.trim().to_lowercase(),
        cuit: trim_opt(request.cuit),
        telefono: trim_opt(request.telefono),
        fecha_ingreso: request.fecha_ingreso,
    }
}
