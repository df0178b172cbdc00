use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub use crate::entities::car::{FuelType, TransmissionType, VehicleCondition, VehicleType};
use crate::models::picture_model::{Picture, PictureDocumentationSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
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
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    pub condition: VehicleCondition,
    pub location: String,
    pub license_plate: String,
    pub pictures: Vec<Picture>,
}

/// Car row about to be inserted, without pictures.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCar {
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
    pub vehicle_type: VehicleType,
    pub condition: VehicleCondition,
    pub location: String,
    pub license_plate: String,
}

/// Partial car; `None` fields keep their stored value.
/// `pictures`, when set, are linked to the car.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarChanges {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub mileage: Option<i32>,
    pub fuel_type: Option<FuelType>,
    pub transmission: Option<TransmissionType>,
    pub seats: Option<i32>,
    pub price_per_day: Option<i32>,
    pub available: Option<bool>,
    pub vehicle_type: Option<VehicleType>,
    pub condition: Option<VehicleCondition>,
    pub location: Option<String>,
    pub license_plate: Option<String>,
    pub pictures: Option<Vec<Picture>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCarRequest {
    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    pub make: String,

    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    pub model: String,

    #[validate(range(min = 1900, message = "cannot be before 1900"))]
    #[validate(custom(function = "crate::utils::validator_utils::validate_not_future_year"))]
    pub year: i32,

    #[validate(length(min = 1, max = 20, message = "must be between 1 and 20 characters"))]
    pub color: String,

    #[validate(range(min = 0, message = "cannot be negative"))]
    pub mileage: i32,

    pub fuel_type: FuelType,
    pub transmission: TransmissionType,

    #[validate(range(min = 1, message = "must be at least 1"))]
    pub seats: i32,

    #[validate(range(min = 0, message = "cannot be negative"))]
    pub price_per_day: i32,

    pub available: bool,

    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,

    pub condition: VehicleCondition,

    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub location: String,

    #[validate(length(min = 1, max = 10, message = "must be between 1 and 10 characters"))]
    pub license_plate: String,

    #[serde(default)]
    pub pictures: Option<PictureDocumentationSet>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCarRequest {
    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    pub make: Option<String>,

    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    pub model: Option<String>,

    #[validate(range(min = 1900, message = "cannot be before 1900"))]
    #[validate(custom(function = "crate::utils::validator_utils::validate_not_future_year"))]
    pub year: Option<i32>,

    #[validate(length(min = 1, max = 20, message = "must be between 1 and 20 characters"))]
    pub color: Option<String>,

    #[validate(range(min = 0, message = "cannot be negative"))]
    pub mileage: Option<i32>,

    pub fuel_type: Option<FuelType>,
    pub transmission: Option<TransmissionType>,

    #[validate(range(min = 1, message = "must be at least 1"))]
    pub seats: Option<i32>,

    #[validate(range(min = 0, message = "cannot be negative"))]
    pub price_per_day: Option<i32>,

    pub available: Option<bool>,

    #[serde(rename = "type")]
    pub vehicle_type: Option<VehicleType>,

    pub condition: Option<VehicleCondition>,

    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub location: Option<String>,

    #[validate(length(min = 1, max = 10, message = "must be between 1 and 10 characters"))]
    pub license_plate: Option<String>,

    #[serde(default)]
    pub pictures: Option<PictureDocumentationSet>,
}

impl CreateCarRequest {
    /// Splits the request into the bare car and its picture documentation.
    pub fn into_parts(self) -> (NewCar, Option<PictureDocumentationSet>) {
        let car = NewCar {
            make: self.make,
            model: self.model,
            year: self.year,
            color: self.color,
            mileage: self.mileage,
            fuel_type: self.fuel_type,
            transmission: self.transmission,
            seats: self.seats,
            price_per_day: self.price_per_day,
            available: self.available,
            vehicle_type: self.vehicle_type,
            condition: self.condition,
            location: self.location,
            license_plate: self.license_plate,
        };
        (car, self.pictures)
    }

    pub fn pictures(&self) -> Option<&PictureDocumentationSet> {
        self.pictures.as_ref()
    }
}

impl UpdateCarRequest {
    pub fn into_parts(self) -> (CarChanges, Option<PictureDocumentationSet>) {
        let changes = CarChanges {
            make: self.make,
            model: self.model,
            year: self.year,
            color: self.color,
            mileage: self.mileage,
            fuel_type: self.fuel_type,
            transmission: self.transmission,
            seats: self.seats,
            price_per_day: self.price_per_day,
            available: self.available,
            vehicle_type: self.vehicle_type,
            condition: self.condition,
            location: self.location,
            license_plate: self.license_plate,
            pictures: None,
        };
        (changes, self.pictures)
    }

    pub fn pictures(&self) -> Option<&PictureDocumentationSet> {
        self.pictures.as_ref()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedCar {
    pub old_car: Car,
    pub new_car: Car,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedCar {
    pub deleted_car: Car,
}
