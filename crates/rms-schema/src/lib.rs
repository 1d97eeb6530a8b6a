//! Validation of JSON entities fetched from the store.
//!
//! The server's payload shapes drift over time and vary with a document's
//! file type and age. This crate declares every accepted shape as an explicit
//! field table ([`ObjectSchema`]), groups shapes into ordered variant lists
//! per [`EntityKind`], and validates payloads by trying each variant in
//! priority order.
//!
//! # Modules
//!
//! - [`domain`] — Field tables: value domains, presence and nullability
//! - [`catalog`] — Entity kinds and the built-in variant tables
//! - [`validator`] — [`SchemaValidator`] and [`ValidatedEntity`]
//! - [`normalize`] — Opt-in rewriting of legacy tag arrays
//! - [`error`] — Per-variant diagnostics
//!
//! Validation never mutates or re-interprets the payload: a
//! [`ValidatedEntity`] carries the JSON exactly as received.

pub mod catalog;
pub mod domain;
pub mod error;
pub mod normalize;
pub mod validator;

pub use catalog::{EntityKind, SchemaSet, Variant};
pub use domain::{Domain, FieldSpec, ObjectSchema, Presence};
pub use error::{SchemaError, SchemaResult, ValidationError, VariantFailure, Violation};
pub use normalize::normalize_tags;
pub use validator::{SchemaValidator, ValidatedEntity};
