//! Schema and example loading
//!
//! This module provides:
//! - Document stores (directory, in-memory, bundled)
//! - JSON and YAML parsing
//! - Identifier resolution (`grant` -> `grant.json`, `grant.yaml`, `grant.yml`)
//! - In-memory LRU caching with modification-time invalidation
//!
//! # Example Usage
//!
//! ```rust
//! use grantready_schemas::loader::SchemaLoader;
//!
//! let mut loader = SchemaLoader::bundled()?;
//! let schema = loader.load_schema("grant")?;
//! assert_eq!(schema.metadata().title.as_deref(), Some("Grant"));
//!
//! let err = loader.load_schema("invoice").unwrap_err();
//! assert!(err.is_not_found());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Copyright (c) 2026 GrantReady Team
//! Licensed under the Apache-2.0 license

pub mod cache;
pub mod error;
pub mod parser;
pub mod schema_loader;
pub mod store;

pub use cache::{CacheConfig, CacheEntry, CacheStats, DocumentCache};
pub use error::{DocumentKind, LoaderError, LoaderResult};
pub use parser::{DocumentParser, Format};
pub use schema_loader::SchemaLoader;
pub use store::{DirectoryStore, DocumentStore, MemoryStore, StoredDocument};
