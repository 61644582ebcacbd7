use crate::error::{LayoutError, Result};
use serde::{Deserialize, Serialize};

/// Largest accepted `row_stride`.
pub const MAX_ROW_STRIDE: i32 = 1 << 16;

/// Geometry of the grid and of the nodes placed on it.
///
/// The defaults reproduce the reference diagrams: 150px columns, 100px rows, a 50px margin and
/// 100x100 nodes. `row_stride` is the number of grid rows between fanned-out branches, between
/// independent chains, and of a collision shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub column_pitch: f64,
    pub row_pitch: f64,
    pub margin: f64,
    pub row_stride: i32,
    pub node_width: f64,
    pub node_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            column_pitch: 150.0,
            row_pitch: 100.0,
            margin: 50.0,
            row_stride: 1,
            node_width: 100.0,
            node_height: 100.0,
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("column_pitch", self.column_pitch),
            ("row_pitch", self.row_pitch),
            ("node_width", self.node_width),
            ("node_height", self.node_height),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(format!("{name} must be a positive number, got {value}")));
            }
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(invalid(format!(
                "margin must be a non-negative number, got {}",
                self.margin
            )));
        }
        if !(1..=MAX_ROW_STRIDE).contains(&self.row_stride) {
            return Err(invalid(format!(
                "row_stride must be between 1 and {MAX_ROW_STRIDE}, got {}",
                self.row_stride
            )));
        }
        Ok(())
    }
}

fn invalid(message: String) -> LayoutError {
    LayoutError::InvalidConfig { message }
}
