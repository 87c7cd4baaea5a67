pub mod auth;
pub mod config;
pub mod error;
pub mod mail;
pub mod media;
pub mod models;
pub mod openapi;
pub mod otp;
pub mod routes;
pub mod store;
pub mod validation;

#[cfg(test)]
mod testing;
