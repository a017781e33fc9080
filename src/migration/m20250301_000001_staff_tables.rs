use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Personas::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Personas::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Personas::Nombre).string().not_null())
                    .col(ColumnDef::new(Personas::Apellido).string().not_null())
                    .col(ColumnDef::new(Personas::Dni).string_len(20).not_null())
                    .col(ColumnDef::new(Personas::Email).string().not_null())
                    .col(ColumnDef::new(Personas::Cuit).string_len(20))
                    .col(ColumnDef::new(Personas::Telefono).string_len(40))
                    .col(
                        ColumnDef::new(Personas::Deleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Personas::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Unicité parmi les personnes actives seulement (index partiels,
        // supportés par Postgres et SQLite). Une persona supprimée ne bloque
        // pas la création d'un nouveau compte avec le même DNI/email/CUIT.
        let db = manager.get_connection();
        for (name, column) in [
            ("uq_personas_email_active", "email"),
            ("uq_personas_dni_active", "dni"),
            ("uq_personas_cuit_active", "cuit"),
        ] {
            db.execute_unprepared(&format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {} ON personas ({}) WHERE deleted = false",
                name, column
            ))
            .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(Empleados::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Empleados::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Empleados::PersonaId).integer().not_null())
                    .col(ColumnDef::new(Empleados::FechaIngreso).date().not_null())
                    .col(
                        ColumnDef::new(Empleados::Deleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_empleados_persona")
                            .from(Empleados::Table, Empleados::PersonaId)
                            .to(Personas::Table, Personas::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Usuarios::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Usuarios::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Usuarios::PersonaId).integer().not_null())
                    .col(ColumnDef::new(Usuarios::EmpleadoId).integer())
                    .col(ColumnDef::new(Usuarios::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Usuarios::Role).string_len(20).not_null())
                    .col(ColumnDef::new(Usuarios::EmailVerified).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Usuarios::Deleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Usuarios::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_usuarios_persona")
                            .from(Usuarios::Table, Usuarios::PersonaId)
                            .to(Personas::Table, Personas::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_usuarios_empleado")
                            .from(Usuarios::Table, Usuarios::EmpleadoId)
                            .to(Empleados::Table, Empleados::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_usuarios_persona")
                    .table(Usuarios::Table)
                    .col(Usuarios::PersonaId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Usuarios::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Empleados::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Personas::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Personas {
    Table,
    Id,
    Nombre,
    Apellido,
    Dni,
    Email,
    Cuit,
    Telefono,
    Deleted,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum Empleados {
    Table,
    Id,
    PersonaId,
    FechaIngreso,
    Deleted,
}

#[derive(DeriveIden)]
enum Usuarios {
    Table,
    Id,
    PersonaId,
    EmpleadoId,
    PasswordHash,
    Role,
    EmailVerified,
    Deleted,
    CreatedAt,
}
