//! Dial target resolution
//!
//! Turns call metadata into the dial string handed to `bridge`. The default
//! policy addresses the destination extension directly inside the caller's
//! domain; a directory-backed resolver can be plugged in behind the same trait.

use crate::domain::call::CallContext;
use crate::domain::shared::Result;
use std::fmt;

/// Dial string the switch routes the bridged leg to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DialTarget(String);

impl DialTarget {
    pub fn new(dial_string: impl Into<String>) -> Self {
        Self(dial_string.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DialTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait DialTargetResolver: Send + Sync {
    /// Resolve where to bridge the call, or `NoRouteFound`
    fn resolve(&self, ctx: &CallContext) -> Result<DialTarget>;
}

/// `user/<destination>@<domain>` addressing
#[derive(Debug, Clone, Copy, Default)]
pub struct UserDirectoryResolver;

impl UserDirectoryResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn dial_string(destination: &str, domain: &str) -> String {
        format!("user/{}@{}", destination, domain)
    }
}

impl DialTargetResolver for UserDirectoryResolver {
    fn resolve(&self, ctx: &CallContext) -> Result<DialTarget> {
        Ok(DialTarget::new(Self::dial_string(
            ctx.destination(),
            ctx.domain(),
        )))
    }
}
