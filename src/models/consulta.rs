use serde::{Deserialize, Serialize};
use sea_orm::entity::prelude::*;

/// Demande envoyée depuis le catalogue public
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "consultas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub propiedad_id: Option<i32>, // NULL = demande générale
    pub nombre: String,
    pub email: String,
    pub telefono: Option<String>,
    pub mensaje: String,
    pub atendida: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::propiedad::Entity",
        from = "Column::PropiedadId",
        to = "super::propiedad::Column::Id"
    )]
    Propiedad,
}

impl Related<super::propiedad::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Propiedad.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
