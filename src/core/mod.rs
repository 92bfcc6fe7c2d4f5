/*!
 * Core Module
 * Shared fundamentals: value types, error taxonomy, fixed limits
 */

pub mod errors;
pub mod limits;
pub mod types;

pub use errors::{AllocError, AllocResult};
pub use types::{Granularity, Platform, ResourceId, ResourceKind, Vendor};
