//! Tenant execution context and clocks
//!
//! Everything the generator needs to know about "who" and "when" lives here,
//! passed in explicitly rather than read from process-wide globals.

pub mod clock;
pub mod context;

pub use clock::{BusinessClock, FixedClock, SystemClock};
pub use context::{
    parse_timezone, ActionContext, BusinessDateType, ContextGuard, ExecutionContext,
    TenantContext,
};
