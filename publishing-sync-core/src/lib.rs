#![doc = "publishing-sync-core: core logic library for publishing-sync."]

//! This crate holds the business logic of the publishing sync: taxon trees and
//! their visibility, the asset draft-state worker and its job queue, and the
//! publishing records with their validation rules.
//! It talks to the outside world only through the traits in [`contract`];
//! HTTP clients live in the `publishing-sync` crate.
//!
//! # Usage
//! Depend on this crate for domain logic and, in tests, for the `Mock*`
//! service implementations exported under the `test-export-mocks` feature.

pub mod attachments;
pub mod contract;
pub mod edition;
pub mod jobs;
pub mod models;
pub mod publications;
pub mod tag_form;
pub mod taxonomy;
pub mod worker;
