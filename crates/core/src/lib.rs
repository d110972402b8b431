//! Simple Shop Core - Shared catalog types library.
//!
//! This crate provides the types used across all Simple Shop components:
//! - `server` - Storefront, admin back-office and JSON API
//! - `cli` - Command-line tools for migrations, seeding and user roles
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. The validation contract lives here so the product
//! form and the HTTP handlers check submissions with exactly the same rules.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses
//! - [`catalog`] - Product, variant, image, tag and supplier records
//! - [`validation`] - The product and supplier validation contract
//! - [`write`] - Create payloads and the nested-write update instruction format
//! - [`form`] - The product form model and its transformation to wire payloads

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod form;
pub mod types;
pub mod validation;
pub mod write;

pub use catalog::*;
pub use types::*;
