//! Code Thesaurus: a polyglot concept dictionary.
//!
//! A read-only JSON corpus describes how each language (or database, ...)
//! expresses a shared catalog of concepts. This crate loads that corpus,
//! lines entries up side by side, validates the corpus offline and serves
//! lookups over HTTP.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod lookup;
pub mod models;
pub mod store;
pub mod templates;
pub mod validate;
