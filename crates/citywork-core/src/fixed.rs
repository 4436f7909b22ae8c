use fixed::types::I32F32;

use crate::resource::Quantity;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
pub type Fixed64 = I32F32;

/// Convert an f64 to Fixed64. Use only for configuration, never in the tick loop.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Multiply a quantity by a fixed-point factor and floor the result.
///
/// Returns `None` when the product does not fit a [`Quantity`]. Negative
/// factors floor to zero.
pub fn scale_quantity(quantity: Quantity, factor: Fixed64) -> Option<Quantity> {
    // I32F32 only holds 31 integer bits; widen before multiplying.
    let wide = fixed::types::I64F64::from_num(quantity)
        .checked_mul(fixed::types::I64F64::from_num(factor))?;
    let floored: i64 = wide.checked_floor()?.checked_to_num()?;
    if floored <= 0 {
        return Some(0);
    }
    Quantity::try_from(floored).ok()
}
