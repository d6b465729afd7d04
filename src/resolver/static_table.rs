//! Fixed name → host table.

use std::collections::HashMap;

use super::{BaseUrlResolver, ResolveError, ResolveFuture, ResolvedAddress};

/// Resolves names from a table fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    functions: HashMap<String, String>,
}

impl StaticResolver {
    pub fn new(functions: HashMap<String, String>) -> Self {
        Self { functions }
    }

    /// Add or replace a single entry.
    pub fn with_function(mut self, name: impl Into<String>, host: impl Into<String>) -> Self {
        self.functions.insert(name.into(), host.into());
        self
    }

    fn lookup(&self, name: &str) -> Result<ResolvedAddress, ResolveError> {
        self.functions
            .get(name)
            .and_then(|host| ResolvedAddress::new(host.as_str()))
            .ok_or_else(|| ResolveError::NotFound {
                name: name.to_string(),
            })
    }
}

impl BaseUrlResolver for StaticResolver {
    fn resolve<'a>(&'a self, name: &'a str) -> ResolveFuture<'a> {
        Box::pin(async move { self.lookup(name) })
    }
}
