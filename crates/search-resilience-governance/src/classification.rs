//! Data-sensitivity tags attached to field paths, and the role -> allowed-classification
//! policy that [`crate::access::validate_data_access`] enforces.

use std::collections::{HashMap, HashSet};

/// Sensitivity tag attached to a field path by [`crate::masking::MaskingRule`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Classification {
    Public,
    Internal,
    Confidential,
    Restricted,
    Pii,
    Phi,
}

impl Classification {
    /// Whether this classification counts toward `sensitiveDataAccessed` in an audit record.
    pub fn is_sensitive(&self) -> bool {
        matches!(
            self,
            Classification::Confidential | Classification::Restricted | Classification::Pii | Classification::Phi
        )
    }
}

/// The caller-declared clearance on a [`crate::context::SecurityContext`]. Distinct from
/// [`Classification`]: clearance is one ordinal value per caller, classification is a tag per
/// field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ClearanceLevel {
    Public,
    Internal,
    Confidential,
    Restricted,
}

/// Maps a role name to the set of classifications it may see. Roles not present in the map
/// are denied every classified field.
#[derive(Clone, Debug, Default)]
pub struct RolePolicy {
    allowed: HashMap<String, HashSet<Classification>>,
}

impl RolePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow(mut self, role: impl Into<String>, classifications: impl IntoIterator<Item = Classification>) -> Self {
        self.allowed
            .entry(role.into())
            .or_default()
            .extend(classifications);
        self
    }

    pub fn can_see(&self, role: &str, classification: Classification) -> bool {
        self.allowed
            .get(role)
            .map(|set| set.contains(&classification))
            .unwrap_or(false)
    }

    /// A healthcare-flavored preset mirroring the example role hierarchy in the component
    /// design: admin ⊇ doctor ⊇ nurse ⊇ researcher ⊇ patient.
    pub fn healthcare_default() -> Self {
        use Classification::*;

        let patient = [Public, Internal];
        let researcher = [Public, Internal, Confidential];
        let nurse = [Public, Internal, Confidential, Pii];
        let doctor = [Public, Internal, Confidential, Restricted, Pii, Phi];
        let admin = [Public, Internal, Confidential, Restricted, Pii, Phi];

        RolePolicy::new()
            .allow("patient", patient)
            .allow("researcher", researcher)
            .allow("nurse", nurse)
            .allow("doctor", doctor)
            .allow("admin", admin)
    }
}
