//! GrantReady schemas and examples compiled into the crate
//!
//! Copyright (c) 2026 GrantReady Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::LoaderResult;
use crate::loader::store::MemoryStore;

/// Bundled schema documents, by file name
pub const SCHEMAS: &[(&str, &str)] = &[
    ("grant.json", include_str!("../schemas/grant.json")),
    ("disbursement.json", include_str!("../schemas/disbursement.json")),
    ("audit.json", include_str!("../schemas/audit.json")),
];

/// Bundled example payloads, by file name
pub const EXAMPLES: &[(&str, &str)] = &[
    ("grant-example.json", include_str!("../schemas/examples/grant-example.json")),
    (
        "disbursement-example.json",
        include_str!("../schemas/examples/disbursement-example.json"),
    ),
    ("audit-example.json", include_str!("../schemas/examples/audit-example.json")),
];

/// A store holding the bundled schemas
pub fn schema_store() -> LoaderResult<MemoryStore> {
    store_of(SCHEMAS)
}

/// A store holding the bundled examples
pub fn example_store() -> LoaderResult<MemoryStore> {
    store_of(EXAMPLES)
}

fn store_of(documents: &[(&str, &str)]) -> LoaderResult<MemoryStore> {
    let mut store = MemoryStore::new();
    for (name, content) in documents {
        store.insert(*name, *content)?;
    }
    Ok(store)
}
