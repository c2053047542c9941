//! Row-level security: injects a caller-scoped predicate into `filters.custom` before a
//! query reaches a provider, so unauthorized rows never leave the provider in the first
//! place (as distinct from field masking, which redacts columns of rows the caller is
//! otherwise allowed to see).

use search_resilience_core::types::SearchOptions;

pub const RLS_FILTER_KEY: &str = "rowLevelSecurity";

/// Builds the RLS predicate for one caller. Implementations are free to return any
/// provider-understood predicate string; the default institution-scoped rule is the common
/// case for the healthcare preset.
pub trait RlsPolicy: Send + Sync {
    fn predicate(&self, user_id: &str, user_role: &str, institution_id: Option<&str>) -> Option<String>;
}

/// Scopes every query to the caller's institution, except for roles in `unrestricted_roles`
/// (typically `admin`).
pub struct InstitutionScoped {
    pub unrestricted_roles: Vec<String>,
}

impl InstitutionScoped {
    pub fn new(unrestricted_roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            unrestricted_roles: unrestricted_roles.into_iter().map(Into::into).collect(),
        }
    }
}

impl RlsPolicy for InstitutionScoped {
    fn predicate(&self, _user_id: &str, user_role: &str, institution_id: Option<&str>) -> Option<String> {
        if self.unrestricted_roles.iter().any(|r| r == user_role) {
            return None;
        }
        institution_id.map(|id| format!("institution_id = '{id}'"))
    }
}

/// Injects `policy`'s predicate into `opts.filters.custom[RLS_FILTER_KEY]`, combining with
/// any predicate the caller already set via an `AND`. Returns whether a predicate was added.
pub fn apply_rls(opts: &mut SearchOptions, policy: &dyn RlsPolicy, user_id: &str, user_role: &str, institution_id: Option<&str>) -> bool {
    let Some(predicate) = policy.predicate(user_id, user_role, institution_id) else {
        return false;
    };

    opts.filters
        .custom
        .entry(RLS_FILTER_KEY.to_string())
        .and_modify(|existing| *existing = format!("({existing}) AND ({predicate})"))
        .or_insert(predicate);

    true
}
