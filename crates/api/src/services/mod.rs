//! Application services between the HTTP layer and persistence.

pub mod aggregator;
pub mod artifact;
pub mod audit_export;
pub mod auth;
pub mod evidence;
pub mod jwks;

pub use aggregator::Aggregator;
pub use audit_export::AuditExportService;
pub use auth::AuthService;
pub use evidence::EvidenceService;
pub use jwks::JwksVerifier;
