pub use sea_orm_migration::prelude::*;

pub mod enum_storage;
mod m20240515_000001_create_car_and_picture_tables;

pub use m20240515_000001_create_car_and_picture_tables::{
    CATEGORIES, FUEL_TYPES, TRANSMISSION_TYPES, VEHICLE_CONDITIONS, VEHICLE_TYPES,
};

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240515_000001_create_car_and_picture_tables::Migration),
        ]
    }
}
