const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Integral values that survive an `f64 -> i64 -> f64` round trip exactly.
pub fn as_integral(value: f64) -> Option<i64> {
    if value.fract() == 0.0 && value.abs() < MAX_SAFE_INTEGER {
        Some(value as i64)
    } else {
        None
    }
}

#[derive(Default)]
pub struct NumberBuffer {
    integer: itoa::Buffer,
    float: ryu::Buffer,
}

impl NumberBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shortest text that parses back to `value`; non-finite values have no
    /// JSON spelling and become `null`.
    pub fn format(&mut self, value: f64) -> &str {
        if let Some(integer) = as_integral(value) {
            return self.integer.format(integer);
        }
        if !value.is_finite() {
            return "null";
        }
        self.float.format_finite(value)
    }
}
