//! Number rendering for table cells

use crate::NULL_TOKEN;

/// Significant digits kept when a number is written to the table
pub const SIGNIFICANT_DIGITS: usize = 6;

/// Render `value` with [`SIGNIFICANT_DIGITS`] significant digits, `%g` style.
///
/// Fixed notation is used while the decimal exponent is in `-4..6`, scientific
/// notation (`1.23457e+06`) otherwise. Trailing fractional zeros are dropped.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return NULL_TOKEN.to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // Rounding to the target precision may carry into the next power of ten,
    // so the exponent is read back from the rounded scientific form.
    let sci = format!("{:.*e}", SIGNIFICANT_DIGITS - 1, value);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);

    if exp < -4 || exp >= SIGNIFICANT_DIGITS as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exp.unsigned_abs())
    } else {
        let decimals = (SIGNIFICANT_DIGITS as i32 - 1 - exp) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if !s.contains('.') {
        return s;
    }
    s.trim_end_matches('0').trim_end_matches('.')
}
