//! Tenant (repository) scopes.

use std::fmt;

/// Path segments that collide with server routes and cannot name a tenant.
pub const RESERVED_TENANT_NAMES: &[&str] = &["api", "health", "metrics"];

/// A logical repository namespace.
///
/// Every storage key touched on behalf of a tenant is prefixed with the
/// tenant name, so the name is restricted to a single safe path segment.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TenantScope(String);

impl TenantScope {
    /// Parse a tenant name, validating that it is a single path segment.
    pub fn parse(name: &str) -> crate::Result<Self> {
        if name.is_empty() {
            return Err(crate::Error::InvalidTenant(
                "tenant name cannot be empty".to_string(),
            ));
        }

        // Storage keys never carry "..", so neither may a tenant prefix.
        if name == "." || name.contains("..") {
            return Err(crate::Error::InvalidTenant(format!(
                "tenant name not allowed: {name}"
            )));
        }

        if let Some(c) = name
            .chars()
            .find(|c| matches!(c, '/' | '\\') || c.is_control())
        {
            return Err(crate::Error::InvalidTenant(format!(
                "invalid character in tenant name: {c:?}"
            )));
        }

        if RESERVED_TENANT_NAMES.contains(&name) {
            return Err(crate::Error::InvalidTenant(format!(
                "tenant name is reserved: {name}"
            )));
        }

        Ok(Self(name.to_string()))
    }

    /// Get the tenant name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Storage key for an object owned by this tenant.
    pub fn key(&self, filename: &str) -> String {
        format!("{}/{}", self.0, filename)
    }

    /// Key prefix covering every object owned by this tenant.
    pub fn prefix(&self) -> String {
        format!("{}/", self.0)
    }
}

impl fmt::Debug for TenantScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TenantScope({self})")
    }
}

impl fmt::Display for TenantScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
