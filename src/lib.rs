//! campusreport - Command-line client for a campus issue reporting backend

pub mod api;
pub mod config;
pub mod domain;
pub mod geofence;
pub mod image;
