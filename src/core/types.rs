/*!
 * Core Types
 * Execution contexts, coherence granularity, resource kinds, and ids
 */

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Execution context
// ============================================================================

/// Execution context: where code runs and which address space it dereferences.
///
/// Pinned and unified memory are resource *kinds*, not execution contexts
/// (no code executes "in" pinned memory), so they live in [`ResourceKind`].
/// Keeping the device ordinal here lets accessibility checks distinguish a
/// resource's own accelerator from an unrelated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "context", content = "device", rename_all = "snake_case")]
pub enum Platform {
    /// Host CPU threads, ordinary process address space
    Host,
    /// Accelerator device by ordinal
    Device(u32),
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Host => write!(f, "host"),
            Platform::Device(ordinal) => write!(f, "device{}", ordinal),
        }
    }
}

// ============================================================================
// Coherence granularity
// ============================================================================

/// Coherence granularity: how writes become visible across execution contexts.
///
/// `Unknown` selects the backend's default allocation call; the qualified
/// modes select coherence-qualified variants where the runtime supports them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Unknown,
    FineGrained,
    CoarseGrained,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Unknown => write!(f, "unknown"),
            Granularity::FineGrained => write!(f, "fine_grained"),
            Granularity::CoarseGrained => write!(f, "coarse_grained"),
        }
    }
}

// ============================================================================
// Resource kind and vendor flags
// ============================================================================

/// Kind of memory a resource hands out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    #[default]
    Unknown,
    /// Plain process heap
    Host,
    /// Accelerator device heap
    Device,
    /// Page-locked host memory visible to an accelerator
    Pinned,
    /// Unified/managed memory migrating between contexts
    Unified,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Unknown => write!(f, "unknown"),
            ResourceKind::Host => write!(f, "host"),
            ResourceKind::Device => write!(f, "device"),
            ResourceKind::Pinned => write!(f, "pinned"),
            ResourceKind::Unified => write!(f, "unified"),
        }
    }
}

/// Accelerator vendor, recorded in resource traits for vendor-specific flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vendor {
    #[default]
    Unknown,
    Amd,
    Nvidia,
    Intel,
}

// ============================================================================
// Resource identity
// ============================================================================

/// Memory resource id: dense integer, stable for the process lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub u32);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
