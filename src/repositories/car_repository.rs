use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{sea_query::Expr, *};

use crate::entities::{car, car::Entity as CarEntity, picture, picture::Entity as PictureEntity};
use crate::models::car_model::{Car, CarChanges, NewCar, UpdatedCar};
use crate::models::common_model::{FindAllResponse, Pagination};
use crate::models::messages::{self, car as msg};
use crate::models::picture_model::Picture;
use crate::utils::api_response::AppError;

#[async_trait]
pub trait CarRepository: Send + Sync {
    async fn create(&self, car: NewCar) -> Result<Car, AppError>;

    /// Merges `changes` into the stored car and returns both snapshots.
    ///
    /// `old_car` lets a caller that already holds the current car skip the lookup.
    async fn update(&self, id: i32, changes: CarChanges, old_car: Option<Car>) -> Result<UpdatedCar, AppError>;

    /// Writes `changes` without looking the row up first.
    async fn internal_update(&self, id: i32, changes: CarChanges) -> Result<Car, AppError>;

    async fn delete(&self, id: i32) -> Result<Car, AppError>;
    async fn find_all(&self, pagination: Pagination) -> Result<FindAllResponse<Car>, AppError>;
    async fn find_by_id(&self, id: i32) -> Result<Car, AppError>;
}

pub(crate) fn not_found(id: i32) -> AppError {
    tracing::warn!(car_id = id, "car not found");
    AppError::not_found(messages::with_id(msg::NOT_FOUND, id))
}

fn to_domain(model: car::Model, mut pictures: Vec<picture::Model>) -> Car {
    pictures.sort_by_key(|p| p.id);
    Car {
        id: model.id,
        created_at: model.created_at,
        updated_at: model.updated_at,
        make: model.make,
        model: model.model,
        year: model.year,
        color: model.color,
        mileage: model.mileage,
        fuel_type: model.fuel_type,
        transmission: model.transmission,
        seats: model.seats,
        price_per_day: model.price_per_day,
        available: model.available,
        vehicle_type: model.r#type,
        condition: model.condition,
        location: model.location,
        license_plate: model.license_plate,
        pictures: pictures.into_iter().map(Picture::from).collect(),
    }
}

fn changes_to_active(id: i32, changes: &CarChanges) -> car::ActiveModel {
    let mut active = car::ActiveModel {
        id: Unchanged(id),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };
    if let Some(make) = &changes.make {
        active.make = Set(make.clone());
    }
    if let Some(model) = &changes.model {
        active.model = Set(model.clone());
    }
    if let Some(year) = changes.year {
        active.year = Set(year);
    }
    if let Some(color) = &changes.color {
        active.color = Set(color.clone());
    }
    if let Some(mileage) = changes.mileage {
        active.mileage = Set(mileage);
    }
    if let Some(fuel_type) = changes.fuel_type {
        active.fuel_type = Set(fuel_type);
    }
    if let Some(transmission) = changes.transmission {
        active.transmission = Set(transmission);
    }
    if let Some(seats) = changes.seats {
        active.seats = Set(seats);
    }
    if let Some(price_per_day) = changes.price_per_day {
        active.price_per_day = Set(price_per_day);
    }
    if let Some(available) = changes.available {
        active.available = Set(available);
    }
    if let Some(vehicle_type) = changes.vehicle_type {
        active.r#type = Set(vehicle_type);
    }
    if let Some(condition) = changes.condition {
        active.condition = Set(condition);
    }
    if let Some(location) = &changes.location {
        active.location = Set(location.clone());
    }
    if let Some(license_plate) = &changes.license_plate {
        active.license_plate = Set(license_plate.clone());
    }
    active
}

#[derive(Clone)]
pub struct SeaOrmCarRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmCarRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn load(&self, model: car::Model) -> Result<Car, AppError> {
        let pictures = model
            .find_related(PictureEntity)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::internal(msg::FIND_ERROR, e))?;
        Ok(to_domain(model, pictures))
    }

    /// Row update plus picture linking. The car must exist.
    async fn write_changes(&self, id: i32, changes: &CarChanges) -> Result<(), AppError> {
        match changes_to_active(id, changes).update(self.db.as_ref()).await {
            Ok(_) => {}
            Err(DbErr::RecordNotUpdated) => return Err(not_found(id)),
            Err(e) => return Err(AppError::internal(msg::UPDATE_ERROR, e)),
        }

        if let Some(pictures) = &changes.pictures {
            let ids: Vec<i32> = pictures.iter().map(|p| p.id).collect();
            if !ids.is_empty() {
                PictureEntity::update_many()
                    .col_expr(picture::Column::CarId, Expr::value(id))
                    .filter(picture::Column::Id.is_in(ids))
                    .exec(self.db.as_ref())
                    .await
                    .map_err(|e| AppError::internal(msg::UPDATE_ERROR, e))?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CarRepository for SeaOrmCarRepository {
    async fn create(&self, car: NewCar) -> Result<Car, AppError> {
        let now = Utc::now();
        let new_car = car::ActiveModel {
            id: NotSet,
            created_at: Set(now),
            updated_at: Set(now),
            make: Set(car.make),
            model: Set(car.model),
            year: Set(car.year),
            color: Set(car.color),
            mileage: Set(car.mileage),
            fuel_type: Set(car.fuel_type),
            transmission: Set(car.transmission),
            seats: Set(car.seats),
            price_per_day: Set(car.price_per_day),
            available: Set(car.available),
            r#type: Set(car.vehicle_type),
            condition: Set(car.condition),
            location: Set(car.location),
            license_plate: Set(car.license_plate),
        };

        let model = new_car
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::internal(msg::CREATE_ERROR, e))?;
        tracing::debug!(car_id = model.id, "car row created");
        Ok(to_domain(model, Vec::new()))
    }

    async fn update(&self, id: i32, changes: CarChanges, old_car: Option<Car>) -> Result<UpdatedCar, AppError> {
        let old_car = match old_car {
            Some(car) => car,
            None => self.find_by_id(id).await?,
        };
        self.write_changes(id, &changes).await?;
        let new_car = self.find_by_id(id).await?;
        Ok(UpdatedCar { old_car, new_car })
    }

    async fn internal_update(&self, id: i32, changes: CarChanges) -> Result<Car, AppError> {
        self.write_changes(id, &changes).await?;
        self.find_by_id(id).await
    }

    async fn delete(&self, id: i32) -> Result<Car, AppError> {
        let existing = self.find_by_id(id).await?;
        CarEntity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::internal(msg::DELETE_ERROR, e))?;
        Ok(existing)
    }

    async fn find_all(&self, pagination: Pagination) -> Result<FindAllResponse<Car>, AppError> {
        super::check_window(&pagination)?;

        let cars = CarEntity::find()
            .order_by_asc(car::Column::Id)
            .offset(pagination.skip)
            .limit(pagination.take)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::internal(msg::FIND_ERROR, e))?;

        let pictures = cars
            .load_many(PictureEntity, self.db.as_ref())
            .await
            .map_err(|e| AppError::internal(msg::FIND_ERROR, e))?;

        let total = CarEntity::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::internal(msg::FIND_ERROR, e))?;

        Ok(FindAllResponse {
            items: cars
                .into_iter()
                .zip(pictures)
                .map(|(car, pictures)| to_domain(car, pictures))
                .collect(),
            total,
            take: pagination.take,
            skip: pagination.skip,
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<Car, AppError> {
        let model = CarEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::internal(msg::FIND_ERROR, e))?
            .ok_or_else(|| not_found(id))?;
        self.load(model).await
    }
}
