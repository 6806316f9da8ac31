//! Centralized limits and thresholds for type resolution.
//!
//! The resolver breaks genuine cycles with reference descriptors, so these
//! limits are a backstop: they bound pathological oracles (for example a host
//! that mints a fresh type handle for every instantiation of a recursive
//! generic) so that a single declaration cannot hang a documentation build.
//!
//! # Categories
//!
//! - **Recursion Depths**: nesting of `resolve` calls for one request
//! - **Operation Counts**: total guarded expansions for one request
//! - **Capacity Limits**: size of the in-flight set

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum nesting depth of type expansions within one resolution request.
///
/// Each expansion of an object, union, signature parameter, etc. that is not
/// replaced by a reference descriptor adds one level. When exceeded the
/// occurrence is reported as `Unknown` with its rendered text.
///
/// # TypeScript example
///
/// ```typescript
/// // Every level is a fresh instantiation, so identity-based cycle
/// // detection never fires and only the depth bound stops expansion:
/// type Nest<T> = { inner: Nest<[T]> };
/// export const value: Nest<string> = null!;
/// ```
pub const MAX_RESOLVE_DEPTH: u32 = 100;

// =============================================================================
// Operation Count Limits
// =============================================================================

/// Maximum number of guarded expansions for a single resolution context.
///
/// Contexts reused across many sequential requests reset their iteration
/// budget at every top-level entry point, so this applies per request.
pub const MAX_RESOLVE_ITERATIONS: u32 = 100_000;

// =============================================================================
// Capacity Limits
// =============================================================================

/// Maximum number of type occurrences that may be in flight simultaneously.
pub const MAX_IN_FLIGHT_TYPES: u32 = 10_000;

/// Maximum number of parent directories visited while searching for a
/// workspace root.
pub const MAX_ROOT_SEARCH_DEPTH: usize = 256;
