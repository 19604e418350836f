// ============================================================================
// OPS — the filter engine
// ============================================================================
//
// Pure, stateless transforms over RGBA8 buffers. `adjustments` holds the
// plain per-pixel color operations, `effects` the neighbourhood/coordinate
// aware ones, and `pipeline` strings them together in the fixed order the
// rest of the crate relies on.
// ============================================================================

pub mod adjustments;
pub mod effects;
pub mod pipeline;
