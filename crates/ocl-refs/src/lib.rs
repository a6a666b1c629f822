//! Reference management for OCI image layouts.
//!
//! A reference is a human-readable name attached to an entry of the
//! top-level index through the `org.opencontainers.image.ref.name`
//! annotation. Names are not unique: several entries may carry the same one,
//! which makes the reference ambiguous. This crate resolves names to
//! manifests and edits the index while reporting such ambiguity to the
//! caller instead of rejecting it.
//!
//! # Architecture
//!
//! - **Resolution** matches top-level entries only, then walks below each
//!   match through indexes and descriptor blobs until it reaches manifests or
//!   blobs of a media type it does not know.
//! - **Mutation** is read-modify-write of the whole index: one read, at most
//!   one write, no locking. Concurrent writers race; the last one wins.
//! - **Ambiguity** is returned in a [`MutationOutcome`], never logged here.
//!
//! # Modules
//!
//! - [`error`]: error types for reference operations
//! - [`names`]: reference name validation
//! - [`outcome`]: [`MutationOutcome`] and [`Ambiguity`]
//! - [`RefEngine`]: the five reference operations over a
//!   [`LayoutStore`](ocl_store::LayoutStore)

mod engine;
pub mod error;
mod mutate;
pub mod names;
pub mod outcome;
mod resolve;

#[cfg(test)]
mod fixtures;

pub use engine::RefEngine;
pub use error::{RefError, Result};
pub use names::{validate_new_ref_name, validate_ref_name};
pub use outcome::{Ambiguity, MutationOutcome};
