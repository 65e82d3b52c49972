pub use sea_orm_migration::prelude::*;

mod m20260110_000001_create_signals;
mod m20260110_000002_create_parameter_versions;
mod m20260110_000003_create_heartbeat;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260110_000001_create_signals::Migration),
            Box::new(m20260110_000002_create_parameter_versions::Migration),
            Box::new(m20260110_000003_create_heartbeat::Migration),
        ]
    }
}
