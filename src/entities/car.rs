use sea_orm::{entity::prelude::*, sea_query::StringLen};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum FuelType {
    #[sea_orm(string_value = "Gasoline")]
    Gasoline,
    #[sea_orm(string_value = "Diesel")]
    Diesel,
    #[sea_orm(string_value = "Electric")]
    Electric,
    #[sea_orm(string_value = "Hybrid")]
    Hybrid,
    #[sea_orm(string_value = "Gas")]
    Gas,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum TransmissionType {
    #[sea_orm(string_value = "Automatic")]
    Automatic,
    #[sea_orm(string_value = "Manual")]
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum VehicleType {
    #[sea_orm(string_value = "Sedan")]
    Sedan,
    #[sea_orm(string_value = "SUV")]
    #[serde(rename = "SUV")]
    Suv,
    #[sea_orm(string_value = "Truck")]
    Truck,
    #[sea_orm(string_value = "Van")]
    Van,
    #[sea_orm(string_value = "Convertible")]
    Convertible,
    #[sea_orm(string_value = "Coupe")]
    Coupe,
    #[sea_orm(string_value = "Hatchback")]
    Hatchback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum VehicleCondition {
    #[sea_orm(string_value = "New")]
    New,
    #[sea_orm(string_value = "Used")]
    Used,
    #[sea_orm(string_value = "Damaged")]
    Damaged,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "car")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,

    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub mileage: i32,
    pub fuel_type: FuelType,
    pub transmission: TransmissionType,
    pub seats: i32,
    pub price_per_day: i32,
    pub available: bool,
    #[sea_orm(column_name = "type")]
    pub r#type: VehicleType,
    pub condition: VehicleCondition,
    #[sea_orm(column_type = "Text")]
    pub location: String,
    pub license_plate: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::picture::Entity")]
    Picture,
}

impl Related<super::picture::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Picture.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    fn values<E: ActiveEnum<Value = String>>() -> Vec<String> {
        E::iter().map(|v| v.to_value()).collect()
    }

    #[test]
    fn enum_values_match_migration_constraints() {
        assert_eq!(values::<FuelType>(), migration::FUEL_TYPES.to_vec());
        assert_eq!(values::<TransmissionType>(), migration::TRANSMISSION_TYPES.to_vec());
        assert_eq!(values::<VehicleType>(), migration::VEHICLE_TYPES.to_vec());
        assert_eq!(values::<VehicleCondition>(), migration::VEHICLE_CONDITIONS.to_vec());
    }

    #[test]
    fn suv_keeps_its_upper_case_wire_name() {
        assert_eq!(serde_json::to_string(&VehicleType::Suv).unwrap(), "\"SUV\"");
        assert_eq!(VehicleType::Suv.to_value(), "SUV");
    }
}
