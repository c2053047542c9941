//! Row-level security, field masking, access validation and audit logging for caller-scoped
//! search. Composes over a plain search call via [`engine::GovernanceLayer::secure_search`]
//! rather than depending on the routing crate, so governance stays reusable outside this
//! workspace's own facade.

pub mod access;
pub mod audit;
pub mod classification;
pub mod compliance;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod events;
pub mod masking;
pub mod redaction;
pub mod rls;

pub use access::{validate_data_access, FieldAccessDecision};
pub use audit::{AuditOutcome, AuditRecord, AuditSink, TracingAuditSink};
pub use compliance::derive_compliance_flags;
pub use classification::{Classification, ClearanceLevel, RolePolicy};
pub use config::{GovernanceConfig, GovernanceConfigBuilder};
pub use context::SecurityContext;
pub use engine::{GovernanceLayer, SecureSearchResponse};
pub use error::GovernanceError;
pub use events::GovernanceEvent;
pub use masking::{apply_masking, mask_tail, FieldRule, MaskFn};
pub use rls::{apply_rls, InstitutionScoped, RlsPolicy, RLS_FILTER_KEY};
