use chrono::{Datelike, Utc};
use sea_orm_migration::prelude::*;

use crate::enum_storage::EnumStorage;

pub const FUEL_TYPES: [&str; 5] = ["Gasoline", "Diesel", "Electric", "Hybrid", "Gas"];
pub const TRANSMISSION_TYPES: [&str; 2] = ["Automatic", "Manual"];
pub const VEHICLE_TYPES: [&str; 7] = ["Sedan", "SUV", "Truck", "Van", "Convertible", "Coupe", "Hatchback"];
pub const VEHICLE_CONDITIONS: [&str; 3] = ["New", "Used", "Damaged"];
pub const CATEGORIES: [&str; 11] = [
    "FRONT", "BACK", "LEFT", "RIGHT", "INSIDE", "ENGINE", "TRUNK", "WHEEL", "DASHBOARD", "SEAT", "OTHER",
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let enums = EnumStorage::from_env();
        let current_year = Utc::now().year();

        // 1. Car
        manager.create_table(
            Table::create()
                .table(Car::Table)
                .if_not_exists()
                .col(ColumnDef::new(Car::Id).integer().not_null().auto_increment().primary_key())
                .col(ColumnDef::new(Car::CreatedAt).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
                .col(ColumnDef::new(Car::UpdatedAt).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
                .col(ColumnDef::new(Car::Make).string_len(255).not_null())
                .col(ColumnDef::new(Car::Model).string_len(255).not_null())
                .col(ColumnDef::new(Car::Year).integer().not_null().default(current_year))
                .col(ColumnDef::new(Car::Color).string_len(255).not_null())
                .col(ColumnDef::new(Car::Mileage).integer().not_null().default(0))
                .col(enums.column(Car::FuelType, &FUEL_TYPES, "Gasoline"))
                .col(enums.column(Car::Transmission, &TRANSMISSION_TYPES, "Manual"))
                .col(ColumnDef::new(Car::Seats).integer().not_null().default(5))
                .col(ColumnDef::new(Car::PricePerDay).integer().not_null().default(0))
                .col(ColumnDef::new(Car::Available).boolean().not_null().default(false))
                .col(enums.column(Car::Type, &VEHICLE_TYPES, "Sedan"))
                .col(enums.column(Car::Condition, &VEHICLE_CONDITIONS, "New"))
                .col(ColumnDef::new(Car::Location).text().not_null())
                .col(ColumnDef::new(Car::LicensePlate).string_len(10).not_null())
                .to_owned(),
        ).await?;

        // 2. Picture (car_id stays nullable, pictures are removed explicitly before their car)
        manager.create_table(
            Table::create()
                .table(Picture::Table)
                .if_not_exists()
                .col(ColumnDef::new(Picture::Id).integer().not_null().auto_increment().primary_key())
                .col(ColumnDef::new(Picture::CreatedAt).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
                .col(ColumnDef::new(Picture::UpdatedAt).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
                .col(ColumnDef::new(Picture::Title).string_len(255).not_null())
                .col(ColumnDef::new(Picture::Description).text().null())
                .col(enums.column(Picture::Category, &CATEGORIES, "FRONT"))
                .col(ColumnDef::new(Picture::Url).text().not_null())
                .col(ColumnDef::new(Picture::Key).text().not_null())
                .col(ColumnDef::new(Picture::Format).string_len(20).not_null())
                .col(ColumnDef::new(Picture::Size).big_integer().not_null().default(0))
                .col(ColumnDef::new(Picture::CarId).integer().null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_picture_car_id")
                        .from(Picture::Table, Picture::CarId)
                        .to(Car::Table, Car::Id)
                        .on_delete(ForeignKeyAction::NoAction)
                        .on_update(ForeignKeyAction::NoAction)
                )
                .to_owned(),
        ).await?;

        manager.create_index(Index::create().name("idx_picture_car_id").table(Picture::Table).col(Picture::CarId).to_owned()).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Picture::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Car::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(Iden, Clone)]
enum Car {
    Table,
    Id,
    CreatedAt,
    UpdatedAt,
    Make,
    Model,
    Year,
    Color,
    Mileage,
    FuelType,
    Transmission,
    Seats,
    PricePerDay,
    Available,
    Type,
    Condition,
    Location,
    LicensePlate,
}

#[derive(Iden, Clone)]
enum Picture {
    Table,
    Id,
    CreatedAt,
    UpdatedAt,
    Title,
    Description,
    Category,
    Url,
    Key,
    Format,
    Size,
    CarId,
}
