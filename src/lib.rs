#[macro_use]
extern crate rocket;

pub mod bound_port;
pub mod catchers;
pub mod configuration;
pub mod cors;
pub mod domain;
pub mod email;
pub mod models;
pub mod monitor;
pub mod notifier;
pub mod routes;
pub mod schema;
pub mod startup;
pub mod store;
pub mod telemetry;
