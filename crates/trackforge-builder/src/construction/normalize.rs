//! Height normalization for sloped pieces
//!
//! The host encodes down-sloping pieces with the leading edge above the
//! trailing edge: `(begin, 0)` with `begin > 0`. Placement works from the
//! leading edge, so such pieces are shifted down by `begin` before dispatch.

use trackforge_core::PieceHeights;

/// Normalize canonical heights: `(b, e)` with `b > 0` becomes `(-b, 0)`
pub fn normalize_heights(heights: PieceHeights) -> PieceHeights {
    if heights.begin_z > 0 {
        PieceHeights::new(-heights.begin_z, 0)
    } else {
        heights
    }
}
