//! Schema migrations for the exploration tables.
//!
//! ```no_run
//! use branddock_exploration::migration::{Migrator, MigratorTrait};
//!
//! # async fn example(conn: &sea_orm::DatabaseConnection) -> Result<(), sea_orm::DbErr> {
//! Migrator::up(conn, None).await?;
//! # Ok(())
//! # }
//! ```

pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_exploration_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    // Own migration table so we can share a database with the host application
    fn migration_table_name() -> sea_orm::DynIden {
        Alias::new("branddock_exploration_migrations").into_iden()
    }

    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250101_000001_create_exploration_tables::Migration)]
    }
}
