pub mod car;
pub mod picture;
