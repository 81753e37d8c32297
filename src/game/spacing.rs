use super::constants::GAP_ROUNDING_SCALE;
use super::error::ChainError;

pub fn validate_value(value: u32) -> Result<u32, ChainError> {
    if value.is_power_of_two() {
        Ok(value)
    } else {
        Err(ChainError::InvalidValue(value))
    }
}

/// Edge length of a segment carrying `value`. Grows by half a unit per doubling.
pub fn size_for_value(value: u32) -> f64 {
    let exponent = value.max(1).trailing_zeros() as f64;
    exponent / 2.0 + 0.5
}

#[derive(Debug, Clone, Copy)]
pub struct SpacingModel {
    pub fixed_gap: f64,
}

impl SpacingModel {
    pub fn new(fixed_gap: f64) -> Self {
        Self { fixed_gap }
    }

    /// Center-to-center spacing for two neighbours. The half-sum is rounded
    /// to three decimals so repeated recomputation never drifts.
    pub fn gap(&self, size_a: f64, size_b: f64) -> f64 {
        let half_sum = (size_a + size_b) * 0.5;
        self.fixed_gap + (half_sum * GAP_ROUNDING_SCALE).round() / GAP_ROUNDING_SCALE
    }

    pub fn gap_between(&self, value_a: u32, value_b: u32) -> f64 {
        self.gap(size_for_value(value_a), size_for_value(value_b))
    }

    /// Arc-length offsets behind the head, one per chain index.
    pub fn cumulative_offsets(&self, values: &[u32]) -> Vec<f64> {
        let mut offsets = Vec::with_capacity(values.len());
        let mut distance = 0.0;
        for (index, value) in values.iter().enumerate() {
            if index > 0 {
                distance += self.gap_between(values[index - 1], *value);
            }
            offsets.push(distance);
        }
        offsets
    }
}
