pub mod car_model;
pub mod common_model;
pub mod messages;
pub mod picture_model;
