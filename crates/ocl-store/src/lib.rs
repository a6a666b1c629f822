//! Storage and traversal for OCI image layouts.
//!
//! A layout is a content-addressed blob store plus one mutable document, the
//! top-level [`ImageIndex`](ocl_types::ImageIndex). This crate defines the
//! [`LayoutStore`] interface over that pair, two backends, and the generic
//! Merkle graph [`walk`] used to explore what the index points at.
//!
//! # Storage Backends
//!
//! All backends implement the [`LayoutStore`] trait:
//!
//! - [`InMemoryLayoutStore`] -- `HashMap`-based store for tests and embedding
//! - [`DirLayoutStore`] -- an OCI image layout directory on disk
//!
//! # Design Rules
//!
//! 1. Blobs are immutable once written (content addressing guarantees this).
//! 2. The index is only ever replaced as a whole, never patched in place.
//! 3. Every call takes a [`Context`]; a cancelled context fails the call with
//!    [`StoreError::Cancelled`].
//! 4. The store never interprets blob contents. Only the walker does.

pub mod context;
pub mod dir;
pub mod error;
pub mod memory;
pub mod traits;
pub mod walk;

// Re-export primary types at crate root for ergonomic imports.
pub use context::Context;
pub use dir::DirLayoutStore;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryLayoutStore;
pub use traits::LayoutStore;
pub use walk::{walk, WalkError, WalkSignal};
