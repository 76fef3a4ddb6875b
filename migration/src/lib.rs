pub use sea_orm_migration::prelude::*;

mod m20260830_000001_create_profiles_table;
mod m20260830_000002_create_jobs_table;
mod m20260830_000003_create_reviews_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260830_000001_create_profiles_table::Migration),
            Box::new(m20260830_000002_create_jobs_table::Migration),
            Box::new(m20260830_000003_create_reviews_table::Migration),
        ]
    }
}
