pub mod map;
pub mod mapper;
pub mod projector;
pub mod ray;
pub mod shared;
pub mod transform;
