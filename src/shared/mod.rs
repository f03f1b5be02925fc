// This is free and unencumbered software released into the public domain.

mod auth;
pub use auth::*;

mod camera;
pub use camera::*;

mod config;
pub use config::*;

mod error;
pub use error::*;

pub mod events;
pub use events::{EnabledEvents, EventView, Events};

mod motor;
pub use motor::*;

pub(crate) mod params;
pub use params::Parameters;

mod parser;
pub use parser::*;

mod transport;
pub use transport::*;

#[cfg(test)]
pub(crate) mod testing;
