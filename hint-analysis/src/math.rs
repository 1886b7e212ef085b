//! 26.6 fixed point helpers for TrueType hinting arithmetic.

pub fn floor(x: i32) -> i32 {
    x & !63
}

pub fn round(x: i32) -> i32 {
    floor(x.wrapping_add(32))
}

pub fn ceil(x: i32) -> i32 {
    floor(x.wrapping_add(63))
}

fn floor_pad(x: i32, n: i32) -> i32 {
    x & !(n - 1)
}

pub fn round_pad(x: i32, n: i32) -> i32 {
    floor_pad(x.wrapping_add(n / 2), n)
}

/// Multiply and divide with rounding: a * b / c
///
/// Returns `None` when `c` is zero.
pub fn mul_div(a: i32, b: i32, c: i32) -> Option<i32> {
    if c == 0 {
        return None;
    }
    let product = a as i64 * b as i64;
    let c = c as i64;
    let negative = (product < 0) != (c < 0);
    let quotient = (product.abs() + c.abs() / 2) / c.abs();
    let quotient = if negative { -quotient } else { quotient };
    Some(quotient as i32)
}

/// Multiply and divide without rounding: a * b / c
///
/// Returns `None` when `c` is zero.
///
/// Based on <https://gitlab.freedesktop.org/freetype/freetype/-/blob/57617782464411201ce7bbc93b086c1b4d7d84a5/src/base/ftcalc.c#L200>
pub fn mul_div_no_round(a: i32, b: i32, c: i32) -> Option<i32> {
    if c == 0 {
        return None;
    }
    Some(((a as i64 * b as i64) / c as i64) as i32)
}
