//! Structured (rectilinear) grids and data sampled on them.
//!
//! A [`Grid`] is the Cartesian product of per-dimension sample vectors. Nodes
//! are enumerated with the `xy` meshgrid convention: the first dimension runs
//! fastest inside rows indexed by the second one, so a 2-D node list reshapes
//! into a `(ny, nx)` matrix without transposing. [`GridData`] attaches one or
//! more sampled value columns to a grid.
pub mod data;
pub mod interpolate;
pub mod structured;

pub use data::GridData;
pub use interpolate::Interpolator;
pub use structured::Grid;

/// Format a value with two significant digits the way `"{:.2}"` behaves for
/// floats in Python format specs (`1.0`, `0.25`, `1e+01`).
pub(crate) fn format_sig2(value: f64) -> String {
    const PRECISION: i32 = 2;

    if value == 0.0 || !value.is_finite() {
        return if value == 0.0 {
            "0.0".to_string()
        } else {
            value.to_string()
        };
    }

    // Rounding to the target precision can bump the exponent (9.96 -> 1.0e1).
    let sci = format!("{:.*e}", (PRECISION - 1) as usize, value);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    // Fixed notation keeps at least one fractional digit, which moves the
    // switch to exponent notation one decade earlier than `%g`.
    if (-4..PRECISION - 1).contains(&exponent) {
        let decimals = (PRECISION - 1 - exponent).max(0) as usize;
        let mut fixed = format!("{:.*}", decimals, value);
        if fixed.contains('.') {
            while fixed.ends_with('0') {
                fixed.pop();
            }
            if fixed.ends_with('.') {
                fixed.push('0');
            }
        } else {
            fixed.push_str(".0");
        }
        fixed
    } else {
        let mut mantissa = mantissa.to_string();
        if mantissa.contains('.') {
            while mantissa.ends_with('0') {
                mantissa.pop();
            }
            if mantissa.ends_with('.') {
                mantissa.pop();
            }
        }
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}
