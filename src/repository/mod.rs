// ==========================================
// Poultry Metrics - repository layer
// ==========================================
// Role: fetch raw batch / log rows; hide storage details
// Rule: no business logic; every query is parameterized
// ==========================================

pub mod cache;
pub mod error;
pub mod log_source;
pub mod sqlite_repo;

pub use cache::CachedLogSource;
pub use error::{RepositoryError, RepositoryResult};
pub use log_source::BatchLogSource;
pub use sqlite_repo::SqliteLogRepository;
