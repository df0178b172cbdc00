use sea_orm_migration::prelude::*;
use migration::Migrator;

#[async_std::main]
async fn main() {
    // DATABASE_URL and DB_NATIVE_ENUMS usually live in the service's .env
    dotenvy::dotenv().ok();
    cli::run_cli(Migrator).await;
}
