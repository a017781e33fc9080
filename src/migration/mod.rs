// Schéma de la base, appliqué au démarrage (Migrator::up dans db.rs)
pub use sea_orm_migration::prelude::*;

mod m20250301_000001_staff_tables;
mod m20250301_000002_verification_tokens;
mod m20250301_000003_lookup_tables;
mod m20250301_000004_propiedades_consultas;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_staff_tables::Migration),
            Box::new(m20250301_000002_verification_tokens::Migration),
            Box::new(m20250301_000003_lookup_tables::Migration),
            Box::new(m20250301_000004_propiedades_consultas::Migration),
        ]
    }
}
