//! One module per resource, mirroring `memoria-grpc`'s `services/` layout.

pub mod apikey;
pub mod embedder;
pub mod memory;
pub mod space;
pub mod system;
pub mod user;
