pub mod car_service;
pub mod picture_service;
pub mod s3_service;
