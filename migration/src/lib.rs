pub use sea_orm_migration::prelude::*;

mod m20250601_000001_create_users;
mod m20250601_000002_create_gardens;
mod m20250601_000003_create_submissions;
mod m20250601_000004_create_carbon_credits;
mod m20250601_000005_create_transactions;
mod m20250601_000006_create_notifications;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_users::Migration),
            Box::new(m20250601_000002_create_gardens::Migration),
            Box::new(m20250601_000003_create_submissions::Migration),
            Box::new(m20250601_000004_create_carbon_credits::Migration),
            Box::new(m20250601_000005_create_transactions::Migration),
            Box::new(m20250601_000006_create_notifications::Migration),
        ]
    }
}
