// Hotel rate plan pricing and availability engine

pub mod app;
pub mod auth;
pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod hotels;
pub mod inventory;
pub mod metrics;
pub mod rate_plans;
pub mod reservations;
pub mod response;
pub mod validation;

#[cfg(test)]
mod memory;
