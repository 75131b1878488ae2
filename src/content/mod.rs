//! Stat-grid content: shape detection, canonicalization, display-value
//! derivation, seeding, and the stores the documents live in.

pub mod canonical;
pub mod compact;
pub mod derive;
pub mod model;
pub mod postgres;
pub mod seed;
pub mod service;
pub mod shape;
pub mod store;

pub use canonical::{canonicalize, normalize, MalformedShape, NormalizeError, Normalized, Normalizer};
pub use compact::{compact, Compacted, Unit};
pub use derive::{derive_and_compact, scalar_text, ExplicitValue};
pub use model::{CanonicalCard, CanonicalGrid, ContentRecord, DerivedValue};
pub use postgres::PgContentStore;
pub use seed::{SeedCatalog, SeedError};
pub use service::{ContentService, ReadOutcome, SeedOptions};
pub use shape::ContentShape;
pub use store::{ContentStore, MemoryContentStore, StoreError};
