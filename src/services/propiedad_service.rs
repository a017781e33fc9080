// ============================================================================
// SERVICE : PROPIEDADES
// ============================================================================
//
// Description:
//   CRUD des biens pour le personnel + catalogue public paginé.
//
// Règles:
//   - Un agent ne voit et ne modifie que ses propres biens
//   - Un agent est toujours l'agent assigné des biens qu'il crée
//   - Les tables de référence citées doivent exister et être actives
//   - Suppression logique uniquement (administrateur)
//
// ============================================================================

use chrono::Utc;
use sea_orm::*;

use crate::errors::ApiError;
use crate::middleware::Session;
use crate::models::dto::{CatalogoQuery, Page, PropiedadRequest, PropiedadResponse};
use crate::models::usuario::Role;
use crate::models::{barrio, categoria, empleado, estado, localidad, propiedad, zona};

pub const DEFAULT_PER_PAGE: u64 = 12;
pub const MAX_PER_PAGE: u64 = 50;

// Vérifie qu'une ligne de référence existe et est active
macro_rules! ensure_active {
    ($db:expr, $module:ident, $id:expr, $field:literal) => {
        if $module::Entity::find_by_id($id)
            .filter($module::Column::Activo.eq(true))
            .one($db)
            .await?
            .is_none()
        {
            return Err(ApiError::field($field, "Unknown or inactive reference"));
        }
    };
}

pub struct PropiedadService;

impl PropiedadService {
    pub async fn list(
        db: &DatabaseConnection,
        session: &Session,
    ) -> Result<Vec<propiedad::Model>, ApiError> {
        let mut query = propiedad::Entity::find().filter(propiedad::Column::Deleted.eq(false));

        if session.role == Role::Agente {
            let Some(empleado_id) = session.empleado_id else {
                return Ok(Vec::new());
            };
            query = query.filter(propiedad::Column::AgenteId.eq(empleado_id));
        }

        Ok(query
            .order_by_desc(propiedad::Column::UpdatedAt)
            .order_by_desc(propiedad::Column::Id)
            .all(db)
            .await?)
    }

    pub async fn get(
        db: &DatabaseConnection,
        session: &Session,
        id: i32,
    ) -> Result<propiedad::Model, ApiError> {
        let found = Self::find_active(db, id).await?;
        ensure_owner(session, &found)?;
        Ok(found)
    }

    pub async fn create(
        db: &DatabaseConnection,
        session: &Session,
        request: PropiedadRequest,
    ) -> Result<propiedad::Model, ApiError> {
        let agente_id = match session.role {
            Role::Agente => session.empleado_id,
            Role::Administrador => request.agente_id,
        };
        Self::check_references(db, &request, agente_id).await?;

        let now = Utc::now();
        let created = propiedad::ActiveModel {
            titulo: Set(request.titulo.trim().to_string()),
            descripcion: Set(request.descripcion),
            direccion: Set(request.direccion.trim().to_string()),
            precio: Set(request.precio),
            moneda: Set(request.moneda),
            ambientes: Set(request.ambientes),
            superficie: Set(request.superficie),
            localidad_id: Set(request.localidad_id),
            zona_id: Set(request.zona_id),
            barrio_id: Set(request.barrio_id),
            categoria_id: Set(request.categoria_id),
            estado_id: Set(request.estado_id),
            agente_id: Set(agente_id),
            publicada: Set(request.publicada),
            deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        tracing::info!(propiedad_id = created.id, usuario_id = session.usuario_id, "propiedad created");
        Ok(created)
    }

    pub async fn update(
        db: &DatabaseConnection,
        session: &Session,
        id: i32,
        request: PropiedadRequest,
    ) -> Result<propiedad::Model, ApiError> {
        let existing = Self::find_active(db, id).await?;
        ensure_owner(session, &existing)?;

        // Un agent ne peut pas réassigner le bien
        let agente_id = match session.role {
            Role::Agente => existing.agente_id,
            Role::Administrador => request.agente_id,
        };
        Self::check_references(db, &request, agente_id).await?;

        let mut active: propiedad::ActiveModel = existing.into();
        active.titulo = Set(request.titulo.trim().to_string());
        active.descripcion = Set(request.descripcion);
        active.direccion = Set(request.direccion.trim().to_string());
        active.precio = Set(request.precio);
        active.moneda = Set(request.moneda);
        active.ambientes = Set(request.ambientes);
        active.superficie = Set(request.superficie);
        active.localidad_id = Set(request.localidad_id);
        active.zona_id = Set(request.zona_id);
        active.barrio_id = Set(request.barrio_id);
        active.categoria_id = Set(request.categoria_id);
        active.estado_id = Set(request.estado_id);
        active.agente_id = Set(agente_id);
        active.publicada = Set(request.publicada);
        active.updated_at = Set(Utc::now());

        Ok(active.update(db).await?)
    }

    pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<(), ApiError> {
        let existing = Self::find_active(db, id).await?;

        let mut active: propiedad::ActiveModel = existing.into();
        active.deleted = Set(true);
        active.publicada = Set(false);
        active.updated_at = Set(Utc::now());
        active.update(db).await?;

        tracing::info!(propiedad_id = id, "propiedad deleted");
        Ok(())
    }

    /// Catalogue public: biens publiés, filtres optionnels, pagination 1-based
    pub async fn catalog(
        db: &DatabaseConnection,
        query: &CatalogoQuery,
    ) -> Result<Page<PropiedadResponse>, ApiError> {
        let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
        let page = query.page.unwrap_or(1).max(1);

        let mut select = Self::published();
        if let Some(id) = query.categoria_id {
            select = select.filter(propiedad::Column::CategoriaId.eq(id));
        }
        if let Some(id) = query.localidad_id {
            select = select.filter(propiedad::Column::LocalidadId.eq(id));
        }
        if let Some(id) = query.zona_id {
            select = select.filter(propiedad::Column::ZonaId.eq(id));
        }
        if let Some(min) = query.min_precio {
            select = select.filter(propiedad::Column::Precio.gte(min));
        }
        if let Some(max) = query.max_precio {
            select = select.filter(propiedad::Column::Precio.lte(max));
        }
        if let Some(moneda) = &query.moneda {
            select = select.filter(propiedad::Column::Moneda.eq(moneda.trim().to_uppercase()));
        }

        let paginator = select
            .order_by_desc(propiedad::Column::UpdatedAt)
            .order_by_desc(propiedad::Column::Id)
            .paginate(db, per_page);

        let total = paginator.num_items().await?;
        // Au-delà du dernier élément (ou offset hors u64): page vide
        let items = match (page - 1).checked_mul(per_page) {
            Some(offset) if offset < total => paginator.fetch_page(page - 1).await?,
            _ => Vec::new(),
        };

        Ok(Page {
            items: items.into_iter().map(PropiedadResponse::from).collect(),
            page,
            per_page,
            total,
        })
    }

    pub async fn catalog_get(db: &DatabaseConnection, id: i32) -> Result<propiedad::Model, ApiError> {
        Self::published()
            .filter(propiedad::Column::Id.eq(id))
            .one(db)
            .await?
            .ok_or(ApiError::NotFound("propiedad"))
    }

    fn published() -> Select<propiedad::Entity> {
        propiedad::Entity::find()
            .filter(propiedad::Column::Publicada.eq(true))
            .filter(propiedad::Column::Deleted.eq(false))
    }

    async fn find_active(db: &DatabaseConnection, id: i32) -> Result<propiedad::Model, ApiError> {
        propiedad::Entity::find_by_id(id)
            .filter(propiedad::Column::Deleted.eq(false))
            .one(db)
            .await?
            .ok_or(ApiError::NotFound("propiedad"))
    }

    async fn check_references(
        db: &DatabaseConnection,
        request: &PropiedadRequest,
        agente_id: Option<i32>,
    ) -> Result<(), ApiError> {
        ensure_active!(db, localidad, request.localidad_id, "localidadId");
        ensure_active!(db, zona, request.zona_id, "zonaId");
        if let Some(barrio_id) = request.barrio_id {
            ensure_active!(db, barrio, barrio_id, "barrioId");
        }
        ensure_active!(db, categoria, request.categoria_id, "categoriaId");
        ensure_active!(db, estado, request.estado_id, "estadoId");

        if let Some(agente_id) = agente_id {
            let found = empleado::Entity::find_by_id(agente_id)
                .filter(empleado::Column::Deleted.eq(false))
                .one(db)
                .await?;
            if found.is_none() {
                return Err(ApiError::field("agenteId", "Unknown agent"));
            }
        }
        Ok(())
    }
}

fn ensure_owner(session: &Session, propiedad: &propiedad::Model) -> Result<(), ApiError> {
    match session.role {
        Role::Administrador => Ok(()),
        Role::Agente if session.empleado_id.is_some() && propiedad.agente_id == session.empleado_id => Ok(()),
        Role::Agente => Err(ApiError::NotAuthorized),
    }
}
