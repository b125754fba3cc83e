//! Library crate for streakr-back, exposing modules for binaries and integration tests.

/// Bearer-token identity verification.
pub mod auth;
/// Runtime configuration loading.
pub mod config;
/// Pure domain logic.
pub mod core;
/// Storage access.
pub mod dao;
/// Request and response shapes.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// HTTP route trees.
pub mod routes;
/// Business services.
pub mod services;
/// Shared application state.
pub mod state;
