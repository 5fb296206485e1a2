//! Binary entrypoint for the Memoria vector memory service: wires
//! storage, the resource services, and both transports (`memoria-grpc`,
//! `memoria-web`) together behind one shared `AuthInterceptor`.

pub mod bootstrap;
pub mod shutdown;

pub use bootstrap::run;
