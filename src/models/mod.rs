//! Domain models for the thesaurus.
//!
//! # Core Concepts
//!
//! - [`ThesaurusMetaInfo`]: the manifest (`meta_info.json`) listing categories,
//!   entries and structures.
//! - [`MetaStructure`]: a structure catalog from `_meta/`, grouping concept ids
//!   into labelled categories.
//! - [`ThesaurusEntry`]: one language or database, with the concepts of one
//!   structure/version loaded on demand.
//! - [`Concept`]: a single record, either implemented (with code) or marked
//!   `not-implemented`.
//! - [`SiteVisit`], [`LookupData`], [`MissingLookup`]: rows of the
//!   best-effort lookup log.

mod concept;
mod entry;
mod meta_info;
mod names;
mod structure;
mod visit;

pub use concept::*;
pub use entry::*;
pub use meta_info::*;
pub use names::*;
pub use structure::*;
pub use visit::*;
