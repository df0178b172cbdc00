//! In-memory repositories sharing one store, for service and router tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::models::car_model::{Car, CarChanges, NewCar, UpdatedCar};
use crate::models::common_model::{FindAllResponse, Pagination};
use crate::models::messages::{car as car_msg, picture as picture_msg};
use crate::models::picture_model::{NewPicture, Picture, PictureChanges, UpdatedPicture};
use crate::repositories::{car_repository, picture_repository, CarRepository, PictureRepository};
use crate::utils::api_response::AppError;

#[derive(Default)]
pub struct MemoryStore {
    cars: BTreeMap<i32, Car>,
    pictures: BTreeMap<i32, Picture>,
    next_car_id: i32,
    next_picture_id: i32,
    picture_inserts_left: Option<usize>,
}

#[derive(Clone, Default)]
pub struct SharedStore(Arc<Mutex<MemoryStore>>);

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryStore> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Picture inserts start failing once `n` more have succeeded.
    pub fn fail_picture_inserts_after(&self, n: usize) {
        self.lock().picture_inserts_left = Some(n);
    }

    pub fn car_count(&self) -> usize {
        self.lock().cars.len()
    }

    pub fn picture_count(&self) -> usize {
        self.lock().pictures.len()
    }

    pub fn pictures(&self) -> Vec<Picture> {
        self.lock().pictures.values().cloned().collect()
    }
}

impl MemoryStore {
    fn hydrate(&self, car: &Car) -> Car {
        let mut car = car.clone();
        car.pictures = self
            .pictures
            .values()
            .filter(|p| p.car_id == Some(car.id))
            .cloned()
            .collect();
        car
    }

    fn find_car(&self, id: i32) -> Result<Car, AppError> {
        self.cars
            .get(&id)
            .map(|car| self.hydrate(car))
            .ok_or_else(|| car_repository::not_found(id))
    }

    fn apply_car(&mut self, id: i32, changes: CarChanges) -> Result<(), AppError> {
        let car = self.cars.get_mut(&id).ok_or_else(|| car_repository::not_found(id))?;
        if let Some(v) = changes.make {
            car.make = v;
        }
        if let Some(v) = changes.model {
            car.model = v;
        }
        if let Some(v) = changes.year {
            car.year = v;
        }
        if let Some(v) = changes.color {
            car.color = v;
        }
        if let Some(v) = changes.mileage {
            car.mileage = v;
        }
        if let Some(v) = changes.fuel_type {
            car.fuel_type = v;
        }
        if let Some(v) = changes.transmission {
            car.transmission = v;
        }
        if let Some(v) = changes.seats {
            car.seats = v;
        }
        if let Some(v) = changes.price_per_day {
            car.price_per_day = v;
        }
        if let Some(v) = changes.available {
            car.available = v;
        }
        if let Some(v) = changes.vehicle_type {
            car.vehicle_type = v;
        }
        if let Some(v) = changes.condition {
            car.condition = v;
        }
        if let Some(v) = changes.location {
            car.location = v;
        }
        if let Some(v) = changes.license_plate {
            car.license_plate = v;
        }
        car.updated_at = Utc::now();

        for picture in changes.pictures.unwrap_or_default() {
            if let Some(stored) = self.pictures.get_mut(&picture.id) {
                stored.car_id = Some(id);
            }
        }
        Ok(())
    }

    fn apply_picture(&mut self, id: i32, changes: PictureChanges) -> Result<Picture, AppError> {
        let picture = self
            .pictures
            .get_mut(&id)
            .ok_or_else(|| picture_repository::not_found(id))?;
        if let Some(v) = changes.title {
            picture.title = v;
        }
        if let Some(v) = changes.description {
            picture.description = Some(v);
        }
        if let Some(v) = changes.car_id {
            picture.car_id = Some(v);
        }
        picture.updated_at = Utc::now();
        Ok(picture.clone())
    }
}

fn page<T: Clone>(items: Vec<T>, pagination: Pagination) -> FindAllResponse<T> {
    let total = items.len() as u64;
    let items = items
        .into_iter()
        .skip(pagination.skip as usize)
        .take(pagination.take as usize)
        .collect();
    FindAllResponse {
        items,
        total,
        take: pagination.take,
        skip: pagination.skip,
    }
}

#[derive(Clone)]
pub struct InMemoryCarRepository {
    store: SharedStore,
}

impl InMemoryCarRepository {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CarRepository for InMemoryCarRepository {
    async fn create(&self, car: NewCar) -> Result<Car, AppError> {
        let mut store = self.store.lock();
        store.next_car_id += 1;
        let now = Utc::now();
        let car = Car {
            id: store.next_car_id,
            created_at: now,
            updated_at: now,
            make: car.make,
            model: car.model,
            year: car.year,
            color: car.color,
            mileage: car.mileage,
            fuel_type: car.fuel_type,
            transmission: car.transmission,
            seats: car.seats,
            price_per_day: car.price_per_day,
            available: car.available,
            vehicle_type: car.vehicle_type,
            condition: car.condition,
            location: car.location,
            license_plate: car.license_plate,
            pictures: Vec::new(),
        };
        store.cars.insert(car.id, car.clone());
        Ok(car)
    }

    async fn update(&self, id: i32, changes: CarChanges, old_car: Option<Car>) -> Result<UpdatedCar, AppError> {
        let mut store = self.store.lock();
        let old_car = match old_car {
            Some(car) => car,
            None => store.find_car(id)?,
        };
        store.apply_car(id, changes)?;
        let new_car = store.find_car(id)?;
        Ok(UpdatedCar { old_car, new_car })
    }

    async fn internal_update(&self, id: i32, changes: CarChanges) -> Result<Car, AppError> {
        let mut store = self.store.lock();
        store.apply_car(id, changes)?;
        store.find_car(id)
    }

    async fn delete(&self, id: i32) -> Result<Car, AppError> {
        let mut store = self.store.lock();
        let existing = store.find_car(id)?;
        if store.pictures.values().any(|p| p.car_id == Some(id)) {
            return Err(AppError::internal(car_msg::DELETE_ERROR, "picture rows still reference the car"));
        }
        store.cars.remove(&id);
        Ok(existing)
    }

    async fn find_all(&self, pagination: Pagination) -> Result<FindAllResponse<Car>, AppError> {
        let store = self.store.lock();
        let cars = store.cars.values().map(|car| store.hydrate(car)).collect();
        Ok(page(cars, pagination))
    }

    async fn find_by_id(&self, id: i32) -> Result<Car, AppError> {
        self.store.lock().find_car(id)
    }
}

#[derive(Clone)]
pub struct InMemoryPictureRepository {
    store: SharedStore,
}

impl InMemoryPictureRepository {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PictureRepository for InMemoryPictureRepository {
    async fn create(&self, picture: NewPicture) -> Result<Picture, AppError> {
        let mut store = self.store.lock();
        if let Some(left) = store.picture_inserts_left.as_mut() {
            if *left == 0 {
                return Err(AppError::internal(picture_msg::CREATE_ERROR, "insert refused"));
            }
            *left -= 1;
        }
        store.next_picture_id += 1;
        let now = Utc::now();
        let picture = Picture {
            id: store.next_picture_id,
            created_at: now,
            updated_at: now,
            title: picture.title,
            description: picture.description,
            category: picture.category,
            url: picture.url,
            key: picture.key,
            format: picture.format,
            size: picture.size,
            car_id: picture.car_id,
        };
        store.pictures.insert(picture.id, picture.clone());
        Ok(picture)
    }

    async fn update(&self, id: i32, changes: PictureChanges) -> Result<UpdatedPicture, AppError> {
        let mut store = self.store.lock();
        let old_picture = store
            .pictures
            .get(&id)
            .cloned()
            .ok_or_else(|| picture_repository::not_found(id))?;
        let new_picture = store.apply_picture(id, changes)?;
        Ok(UpdatedPicture { old_picture, new_picture })
    }

    async fn internal_update(&self, id: i32, changes: PictureChanges) -> Result<Picture, AppError> {
        self.store.lock().apply_picture(id, changes)
    }

    async fn delete(&self, id: i32) -> Result<Picture, AppError> {
        self.store
            .lock()
            .pictures
            .remove(&id)
            .ok_or_else(|| picture_repository::not_found(id))
    }

    async fn find_all(&self, pagination: Pagination) -> Result<FindAllResponse<Picture>, AppError> {
        let pictures = self.store.lock().pictures.values().cloned().collect();
        Ok(page(pictures, pagination))
    }

    async fn find_by_id(&self, id: i32) -> Result<Picture, AppError> {
        self.store
            .lock()
            .pictures
            .get(&id)
            .cloned()
            .ok_or_else(|| picture_repository::not_found(id))
    }
}
