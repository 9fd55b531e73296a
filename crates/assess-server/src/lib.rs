//! HTTP service exposing the assessment engine, health checks and metrics

pub mod api;
pub mod config;
