//! College ERP master-data forms
//!
//! A headless client for the ERP backend: typed records, a session-aware REST client and
//! form state machines for committees, events, programs, cities and student records.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod forms;
pub mod models;

#[cfg(test)]
mod tests;
