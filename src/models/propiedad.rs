use serde::{Deserialize, Serialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "propiedades")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub titulo: String,
    pub descripcion: Option<String>,
    pub direccion: String,
    pub precio: i64,            // Montant entier dans la devise `moneda`
    pub moneda: String,         // 'ARS', 'USD'
    pub ambientes: Option<i32>,
    pub superficie: Option<i32>, // m²
    pub localidad_id: i32,
    pub zona_id: i32,
    pub barrio_id: Option<i32>,
    pub categoria_id: i32,
    pub estado_id: i32,
    pub agente_id: Option<i32>, // FK empleados
    pub publicada: bool,
    pub deleted: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::localidad::Entity",
        from = "Column::LocalidadId",
        to = "super::localidad::Column::Id"
    )]
    Localidad,

    #[sea_orm(
        belongs_to = "super::zona::Entity",
        from = "Column::ZonaId",
        to = "super::zona::Column::Id"
    )]
    Zona,

    #[sea_orm(
        belongs_to = "super::barrio::Entity",
        from = "Column::BarrioId",
        to = "super::barrio::Column::Id"
    )]
    Barrio,

    #[sea_orm(
        belongs_to = "super::categoria::Entity",
        from = "Column::CategoriaId",
        to = "super::categoria::Column::Id"
    )]
    Categoria,

    #[sea_orm(
        belongs_to = "super::estado::Entity",
        from = "Column::EstadoId",
        to = "super::estado::Column::Id"
    )]
    Estado,

    #[sea_orm(
        belongs_to = "super::empleado::Entity",
        from = "Column::AgenteId",
        to = "super::empleado::Column::Id"
    )]
    Agente,

    #[sea_orm(has_many = "super::consulta::Entity")]
    Consulta,
}

impl Related<super::localidad::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Localidad.def()
    }
}

impl Related<super::zona::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Zona.def()
    }
}

impl Related<super::barrio::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Barrio.def()
    }
}

impl Related<super::categoria::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categoria.def()
    }
}

impl Related<super::estado::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Estado.def()
    }
}

impl Related<super::empleado::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Agente.def()
    }
}

impl Related<super::consulta::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Consulta.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
