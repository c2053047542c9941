//! Caller identity passed into `secureSearch`. Created by the caller; never mutated by the
//! governance layer.

use chrono::{DateTime, Utc};

use crate::classification::ClearanceLevel;

#[derive(Clone, Debug)]
pub struct SecurityContext {
    pub user_id: String,
    pub user_role: String,
    pub institution_id: Option<String>,
    pub clearance_level: ClearanceLevel,
    pub session_id: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl SecurityContext {
    pub fn new(user_id: impl Into<String>, user_role: impl Into<String>, session_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            user_role: user_role.into(),
            institution_id: None,
            clearance_level: ClearanceLevel::Public,
            session_id: session_id.into(),
            ip_address: None,
            user_agent: None,
            timestamp,
        }
    }

    pub fn with_institution(mut self, institution_id: impl Into<String>) -> Self {
        self.institution_id = Some(institution_id.into());
        self
    }

    pub fn with_clearance(mut self, level: ClearanceLevel) -> Self {
        self.clearance_level = level;
        self
    }
}
