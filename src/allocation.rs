// =============================================================================
// Allocation Planner — capital sizing across the accumulation ladder
// =============================================================================
//
// For a total capital figure C and each zone z:
//   amount   = C * z.allocation_pct / 100
//   quantity = amount / z.price
//
// Quantities are left unrounded; exchanges have their own lot-size filters
// and display code rounds for presentation only.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::zones::{AccumulationZone, ZoneSet};

/// Errors raised while sizing a plan.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error("total capital must be positive and finite, got {0}")]
    InvalidCapital(f64),
}

/// One row of the sizing table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocationRow {
    pub zone: AccumulationZone,
    /// Quote-currency amount committed to this tier.
    pub amount: f64,
    /// Base-asset quantity bought if the tier fills.
    pub quantity: f64,
}

/// Capital split across the three zones, in tier order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub total_capital: f64,
    pub rows: Vec<AllocationRow>,
}

impl AllocationPlan {
    /// Size `total_capital` across `zones`.
    pub fn build(total_capital: f64, zones: &ZoneSet) -> Result<Self, PlanError> {
        if !total_capital.is_finite() || total_capital <= 0.0 {
            return Err(PlanError::InvalidCapital(total_capital));
        }

        let rows = zones
            .iter()
            .map(|zone| {
                let amount = total_capital * zone.allocation_pct / 100.0;
                AllocationRow {
                    zone: *zone,
                    amount,
                    quantity: amount / zone.price,
                }
            })
            .collect();

        Ok(Self {
            total_capital,
            rows,
        })
    }

    /// Base-asset quantity held if every tier fills.
    pub fn total_quantity(&self) -> f64 {
        self.rows.iter().map(|r| r.quantity).sum()
    }

    /// Volume-weighted entry price if every tier fills.
    pub fn average_entry(&self) -> f64 {
        let quantity = self.total_quantity();
        if quantity > 0.0 {
            self.rows.iter().map(|r| r.amount).sum::<f64>() / quantity
        } else {
            0.0
        }
    }
}

/// Percentage the price must fall from `current_price` to reach `target`.
///
/// Positive when the target is below the price. Returns 0 when the current
/// price is unknown (zero, negative, or non-finite).
pub fn distance_pct(current_price: f64, target: f64) -> f64 {
    if !current_price.is_finite() || current_price <= 0.0 {
        return 0.0;
    }
    (current_price - target) / current_price * 100.0
}
