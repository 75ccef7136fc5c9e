//! Business and tenant clocks
//!
//! Two notions of "today" exist side by side. The tenant date is the wall-clock
//! date in the tenant's timezone. The business date is the date the institution
//! is operating on; it is advanced by operations staff or by close-of-business
//! jobs and may lag behind the wall clock. Date-valued SQL fragments always
//! name which of the two they embed, and one is never substituted for the
//! other.

use super::context::{utc_offset, ActionContext, ExecutionContext};
use crate::error::{Error, Result};
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, Utc};

/// Source of the dates embedded into generated SQL
pub trait BusinessClock: Send + Sync {
    /// Business date for the current tenant and action context
    ///
    /// Fails with [`Error::MissingBusinessDate`] when the date is unknown.
    fn business_date(&self) -> Result<NaiveDate>;

    /// Wall-clock date in the current tenant's timezone
    fn tenant_date(&self) -> NaiveDate;

    /// Wall-clock date and time in the current tenant's timezone
    fn tenant_date_time(&self) -> NaiveDateTime;
}

/// Clock backed by the system time and the thread's execution context
#[derive(Debug, Clone)]
pub struct SystemClock {
    default_timezone: FixedOffset,
}

impl SystemClock {
    /// A clock that treats threads without a bound tenant as UTC
    pub fn new() -> Self {
        Self {
            default_timezone: utc_offset(),
        }
    }

    /// A clock that treats threads without a bound tenant as `timezone`
    pub fn with_default_timezone(timezone: FixedOffset) -> Self {
        Self {
            default_timezone: timezone,
        }
    }

    pub fn default_timezone(&self) -> FixedOffset {
        self.default_timezone
    }

    fn tenant_timezone(&self) -> FixedOffset {
        ExecutionContext::with_current(|ctx| {
            ctx.and_then(|c| c.tenant())
                .map(|tenant| tenant.timezone)
                .unwrap_or(self.default_timezone)
        })
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl BusinessClock for SystemClock {
    fn business_date(&self) -> Result<NaiveDate> {
        ExecutionContext::with_current(|ctx| {
            let date_type = ctx
                .map(|c| c.action_context())
                .unwrap_or(ActionContext::Default)
                .business_date_type();
            ctx.and_then(|c| c.business_date()).ok_or_else(|| {
                log::error!("No {} bound to the current execution context", date_type);
                Error::MissingBusinessDate(date_type)
            })
        })
    }

    fn tenant_date(&self) -> NaiveDate {
        self.tenant_date_time().date()
    }

    fn tenant_date_time(&self) -> NaiveDateTime {
        Utc::now()
            .with_timezone(&self.tenant_timezone())
            .naive_local()
    }
}

/// Clock frozen at fixed values
///
/// Useful for tests and for replaying batch jobs against a known date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    business_date: NaiveDate,
    tenant_date_time: NaiveDateTime,
}

impl FixedClock {
    pub fn new(business_date: NaiveDate, tenant_date_time: NaiveDateTime) -> Self {
        Self {
            business_date,
            tenant_date_time,
        }
    }

    /// Business date and tenant date are the same day, at midnight
    pub fn at_date(date: NaiveDate) -> Self {
        Self::new(date, date.and_time(chrono::NaiveTime::MIN))
    }
}

impl BusinessClock for FixedClock {
    fn business_date(&self) -> Result<NaiveDate> {
        Ok(self.business_date)
    }

    fn tenant_date(&self) -> NaiveDate {
        self.tenant_date_time.date()
    }

    fn tenant_date_time(&self) -> NaiveDateTime {
        self.tenant_date_time
    }
}
