//! Versioned schema. Applied once at startup and by the `migrate` binary;
//! repository code assumes the latest version.

use sea_orm_migration::prelude::*;

mod m20240101_000001_create_tables;
mod m20240601_000002_add_bill_status_and_creator;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_tables::Migration),
            Box::new(m20240601_000002_add_bill_status_and_creator::Migration),
        ]
    }
}
