//! Session Service - Session Lifecycle Management Microservice
//!
//! This crate manages per-user troubleshooting sessions backed by a
//! key-value store with expiration: create, retrieve, update, heartbeat,
//! list, and delete, with TTL-based expiry and per-user capacity limits.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
