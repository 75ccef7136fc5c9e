//! Per-thread execution context
//!
//! The context carries what the surrounding request or batch job knows about
//! the caller: which tenant is being served, the tenant's business dates and
//! whether the work runs as part of close-of-business (COB) processing.
//! Resolvers and clocks read it; they never write it.

use crate::database::DatabaseBackend;
use crate::error::{Error, Result};
use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

thread_local! {
    static CURRENT: RefCell<Option<ExecutionContext>> = const { RefCell::new(None) };
}

/// Which of the tenant's operational dates is meant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BusinessDateType {
    /// The date the institution is currently operating on
    BusinessDate,
    /// The date close-of-business jobs are processing
    CobDate,
}

impl fmt::Display for BusinessDateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusinessDateType::BusinessDate => write!(f, "business date"),
            BusinessDateType::CobDate => write!(f, "COB date"),
        }
    }
}

/// What kind of work the current thread is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionContext {
    #[default]
    Default,
    Cob,
}

impl ActionContext {
    /// The business date type that applies to this action
    pub fn business_date_type(&self) -> BusinessDateType {
        match self {
            ActionContext::Default => BusinessDateType::BusinessDate,
            ActionContext::Cob => BusinessDateType::CobDate,
        }
    }
}

/// The tenant a request is served for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    pub identifier: String,
    /// Backend override; when absent the resolver's registry decides
    pub backend: Option<DatabaseBackend>,
    pub timezone: FixedOffset,
}

impl TenantContext {
    /// A tenant in UTC with no backend override
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            backend: None,
            timezone: utc_offset(),
        }
    }

    pub fn with_backend(mut self, backend: DatabaseBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_timezone(mut self, timezone: FixedOffset) -> Self {
        self.timezone = timezone;
        self
    }
}

/// Snapshot of everything known about the current unit of work
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionContext {
    tenant: Option<TenantContext>,
    business_dates: HashMap<BusinessDateType, NaiveDate>,
    action_context: ActionContext,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_tenant(tenant: TenantContext) -> Self {
        Self {
            tenant: Some(tenant),
            ..Self::default()
        }
    }

    pub fn with_business_date(mut self, date_type: BusinessDateType, date: NaiveDate) -> Self {
        self.business_dates.insert(date_type, date);
        self
    }

    pub fn with_action_context(mut self, action_context: ActionContext) -> Self {
        self.action_context = action_context;
        self
    }

    pub fn tenant(&self) -> Option<&TenantContext> {
        self.tenant.as_ref()
    }

    pub fn action_context(&self) -> ActionContext {
        self.action_context
    }

    pub fn business_dates(&self) -> &HashMap<BusinessDateType, NaiveDate> {
        &self.business_dates
    }

    /// Business date matching the current action context
    pub fn business_date(&self) -> Option<NaiveDate> {
        self.business_dates
            .get(&self.action_context.business_date_type())
            .copied()
    }

    /// Bind this context to the current thread until the guard is dropped.
    ///
    /// Scopes nest: dropping the guard restores whatever was bound before.
    pub fn enter(self) -> ContextGuard {
        if let Some(tenant) = &self.tenant {
            log::debug!("Entering execution context for tenant '{}'", tenant.identifier);
        }
        let previous = CURRENT.with(|current| current.replace(Some(self)));
        ContextGuard {
            previous,
            _not_send: PhantomData,
        }
    }

    /// Clone of the context bound to this thread, if any
    pub fn current() -> Option<ExecutionContext> {
        Self::with_current(|ctx| ctx.cloned())
    }

    /// Borrow the bound context without cloning it
    pub fn with_current<R>(f: impl FnOnce(Option<&ExecutionContext>) -> R) -> R {
        CURRENT.with(|current| f(current.borrow().as_ref()))
    }
}

/// Restores the previously bound context on drop
///
/// The guard is tied to the thread that created it.
#[must_use = "the context is unbound as soon as the guard is dropped"]
pub struct ContextGuard {
    previous: Option<ExecutionContext>,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        let left = CURRENT.with(|current| current.replace(previous));
        if let Some(tenant) = left.as_ref().and_then(|ctx| ctx.tenant()) {
            log::debug!("Leaving execution context for tenant '{}'", tenant.identifier);
        }
    }
}

pub(crate) fn utc_offset() -> FixedOffset {
    Utc.fix()
}

/// Parse a fixed UTC offset such as `UTC`, `Z`, `+05:30`, `-0300` or `+02`
pub fn parse_timezone(value: &str) -> Result<FixedOffset> {
    let trimmed = value.trim();
    let upper = trimmed.to_uppercase();
    if upper == "UTC" || upper == "GMT" || upper == "Z" {
        return Ok(utc_offset());
    }

    let rest = upper
        .strip_prefix("UTC")
        .or_else(|| upper.strip_prefix("GMT"))
        .unwrap_or(&upper);

    let (sign, digits) = match rest.chars().next() {
        Some('+') => (1, &rest[1..]),
        Some('-') => (-1, &rest[1..]),
        _ => return Err(Error::invalid_timezone(trimmed.to_string())),
    };

    let digits = digits.replace(':', "");
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::invalid_timezone(trimmed.to_string()));
    }

    let (hours, minutes) = match digits.len() {
        1 | 2 => (digits.parse::<i32>().ok(), Some(0)),
        4 => (digits[..2].parse::<i32>().ok(), digits[2..].parse::<i32>().ok()),
        _ => (None, None),
    };

    match (hours, minutes) {
        (Some(h), Some(m)) if h <= 18 && m < 60 => {
            FixedOffset::east_opt(sign * (h * 3600 + m * 60))
                .ok_or_else(|| Error::invalid_timezone(trimmed.to_string()))
        }
        _ => Err(Error::invalid_timezone(trimmed.to_string())),
    }
}
