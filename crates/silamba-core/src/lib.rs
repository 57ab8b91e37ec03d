//! Core library for the Silamba photo studio catalog.
//!
//! This crate holds everything that is not terminal rendering:
//!
//! - `models`: Catalog records (banners, categories, occasions, offers, ads)
//! - `api`: REST collection client for the five catalog resources
//! - `cache`: Read-through query cache with request de-duplication
//! - `store`: Single-document local persistence with change broadcasts
//! - `present`: Ephemeral presentation state (carousels, overlays, toasts)
//! - `forms`: Admin record forms with presence validation
//! - `auth`: Hardcoded admin login flag
//! - `upload`: Hosted image upload (ImageKit, Cloudinary)
//! - `routes`: Storefront and admin route table

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod forms;
pub mod models;
pub mod present;
pub mod routes;
pub mod store;
pub mod upload;
pub mod utils;
