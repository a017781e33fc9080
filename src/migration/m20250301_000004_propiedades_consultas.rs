use sea_orm_migration::prelude::*;

use super::m20250301_000001_staff_tables::Empleados;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Propiedades::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Propiedades::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Propiedades::Titulo).string().not_null())
                    .col(ColumnDef::new(Propiedades::Descripcion).text())
                    .col(ColumnDef::new(Propiedades::Direccion).string().not_null())
                    .col(ColumnDef::new(Propiedades::Precio).big_integer().not_null())
                    .col(ColumnDef::new(Propiedades::Moneda).string_len(3).not_null())
                    .col(ColumnDef::new(Propiedades::Ambientes).integer())
                    .col(ColumnDef::new(Propiedades::Superficie).integer())
                    .col(ColumnDef::new(Propiedades::LocalidadId).integer().not_null())
                    .col(ColumnDef::new(Propiedades::ZonaId).integer().not_null())
                    .col(ColumnDef::new(Propiedades::BarrioId).integer())
                    .col(ColumnDef::new(Propiedades::CategoriaId).integer().not_null())
                    .col(ColumnDef::new(Propiedades::EstadoId).integer().not_null())
                    .col(ColumnDef::new(Propiedades::AgenteId).integer())
                    .col(
                        ColumnDef::new(Propiedades::Publicada)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Propiedades::Deleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Propiedades::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Propiedades::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_propiedades_localidad")
                            .from(Propiedades::Table, Propiedades::LocalidadId)
                            .to(Alias::new("localidades"), Alias::new("id")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_propiedades_zona")
                            .from(Propiedades::Table, Propiedades::ZonaId)
                            .to(Alias::new("zonas"), Alias::new("id")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_propiedades_barrio")
                            .from(Propiedades::Table, Propiedades::BarrioId)
                            .to(Alias::new("barrios"), Alias::new("id")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_propiedades_categoria")
                            .from(Propiedades::Table, Propiedades::CategoriaId)
                            .to(Alias::new("categorias"), Alias::new("id")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_propiedades_estado")
                            .from(Propiedades::Table, Propiedades::EstadoId)
                            .to(Alias::new("estados"), Alias::new("id")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_propiedades_agente")
                            .from(Propiedades::Table, Propiedades::AgenteId)
                            .to(Empleados::Table, Empleados::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_propiedades_catalogo")
                    .table(Propiedades::Table)
                    .col(Propiedades::Publicada)
                    .col(Propiedades::Deleted)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Consultas::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Consultas::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Consultas::PropiedadId).integer())
                    .col(ColumnDef::new(Consultas::Nombre).string().not_null())
                    .col(ColumnDef::new(Consultas::Email).string().not_null())
                    .col(ColumnDef::new(Consultas::Telefono).string_len(40))
                    .col(ColumnDef::new(Consultas::Mensaje).text().not_null())
                    .col(
                        ColumnDef::new(Consultas::Atendida)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Consultas::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_consultas_propiedad")
                            .from(Consultas::Table, Consultas::PropiedadId)
                            .to(Propiedades::Table, Propiedades::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Consultas::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Propiedades::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Propiedades {
    Table,
    Id,
    Titulo,
    Descripcion,
    Direccion,
    Precio,
    Moneda,
    Ambientes,
    Superficie,
    LocalidadId,
    ZonaId,
    BarrioId,
    CategoriaId,
    EstadoId,
    AgenteId,
    Publicada,
    Deleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Consultas {
    Table,
    Id,
    PropiedadId,
    Nombre,
    Email,
    Telefono,
    Mensaje,
    Atendida,
    CreatedAt,
}
