//! Postboard Library
//!
//! Posts browser with an offline cache. The binary drives these modules from
//! a terminal UI; they are exposed here for integration tests.

pub mod app;
pub mod auth;
pub mod cache;
pub mod cli;
pub mod dashboard;
pub mod data;
pub mod feed;
pub mod notifications;
pub mod refresh;
pub mod ui;
