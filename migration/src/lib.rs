pub use sea_orm_migration::prelude::*;

mod m20241201_000001_initial_schema;
mod m20241227_000001_add_maintenance_comments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241201_000001_initial_schema::Migration),
            Box::new(m20241227_000001_add_maintenance_comments::Migration),
        ]
    }
}
