//! Dialect resolution
//!
//! A resolver answers one question: which backend does the current unit of
//! work talk to? The generator asks once per call and never caches the answer,
//! so a single generator can serve tenants on different backends. A resolver
//! that cannot answer fails; it never guesses a backend.

use super::DatabaseBackend;
use crate::error::{Error, Result};
use crate::tenant::ExecutionContext;
use dashmap::DashMap;

/// Reports the backend active for the current execution context
pub trait DialectResolver: Send + Sync {
    fn current_backend(&self) -> Result<DatabaseBackend>;

    fn is_mysql(&self) -> Result<bool> {
        Ok(self.current_backend()?.is_mysql_family())
    }

    fn is_postgres(&self) -> Result<bool> {
        Ok(self.current_backend()?.is_postgres_family())
    }
}

/// Single-backend deployments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDialectResolver {
    backend: DatabaseBackend,
}

impl FixedDialectResolver {
    pub fn new(backend: DatabaseBackend) -> Self {
        Self { backend }
    }
}

impl DialectResolver for FixedDialectResolver {
    fn current_backend(&self) -> Result<DatabaseBackend> {
        Ok(self.backend)
    }
}

/// Resolves the backend of the tenant bound to the current thread
///
/// Lookup order: the bound tenant's own backend override, then the tenant
/// registry. A bound tenant found in neither is an [`Error::UnknownTenant`].
/// Only threads with no bound tenant use the default backend.
#[derive(Debug)]
pub struct TenantDialectResolver {
    default: DatabaseBackend,
    tenants: DashMap<String, DatabaseBackend>,
}

impl TenantDialectResolver {
    pub fn new(default: DatabaseBackend) -> Self {
        Self {
            default,
            tenants: DashMap::new(),
        }
    }

    pub fn default_backend(&self) -> DatabaseBackend {
        self.default
    }

    /// Register or replace a tenant's backend
    pub fn register(&self, identifier: impl Into<String>, backend: DatabaseBackend) {
        let identifier = identifier.into();
        log::debug!("Registering tenant '{}' on {}", identifier, backend);
        self.tenants.insert(identifier, backend);
    }

    pub fn unregister(&self, identifier: &str) -> Option<DatabaseBackend> {
        self.tenants.remove(identifier).map(|(_, backend)| backend)
    }

    /// Backend registered for a tenant
    pub fn backend_for(&self, identifier: &str) -> Result<DatabaseBackend> {
        self.tenants
            .get(identifier)
            .map(|entry| *entry.value())
            .ok_or_else(|| Error::unknown_tenant(identifier.to_string()))
    }

    pub fn tenant_count(&self) -> usize {
        self.tenants.len()
    }

    pub fn list_tenants(&self) -> Vec<String> {
        self.tenants.iter().map(|entry| entry.key().clone()).collect()
    }
}

impl DialectResolver for TenantDialectResolver {
    fn current_backend(&self) -> Result<DatabaseBackend> {
        ExecutionContext::with_current(|ctx| {
            let Some(tenant) = ctx.and_then(|c| c.tenant()) else {
                return Ok(self.default);
            };

            if let Some(backend) = tenant.backend {
                return Ok(backend);
            }

            self.backend_for(&tenant.identifier).inspect_err(|_| {
                log::error!("Tenant '{}' has no registered backend", tenant.identifier);
            })
        })
    }
}
