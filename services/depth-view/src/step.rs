//! Aggregation step control
//!
//! The step is the multiplier the bucketer applies to prices: bucket width
//! is `1/step`, so the displayed "grouping" value is the reciprocal. Steps
//! are clamped to `[0.1, 1e8]` (bucket widths from 10 down to 1e-8) and
//! mutate by decades.

use rust_decimal::Decimal;
use tracing::debug;

/// Coarsest allowed step (bucket width 10).
pub fn step_lower_bound() -> Decimal {
    Decimal::new(1, 1)
}

/// Finest allowed step (bucket width 1e-8).
pub fn step_upper_bound() -> Decimal {
    Decimal::from(100_000_000_u64)
}

/// Clamp a step into the allowed range. Out-of-range values are never an
/// error; they are silently pulled to the nearest bound.
pub fn clamp_step(step: Decimal) -> Decimal {
    step.max(step_lower_bound()).min(step_upper_bound())
}

/// Owns the current aggregation step and its mutation rules.
///
/// Every mutation reports whether it actually changed the step, so callers
/// can skip recomputes and avoid redraw storms on clamped no-ops.
#[derive(Debug, Clone)]
pub struct StepController {
    step: Decimal,
}

impl StepController {
    /// Start at the coarse default used before any market is known.
    pub fn new() -> Self {
        Self {
            step: Decimal::ONE_HUNDRED,
        }
    }

    /// Current step.
    pub fn step(&self) -> Decimal {
        self.step
    }

    /// Displayed grouping (bucket width), the reciprocal of the step.
    pub fn grouping(&self) -> Decimal {
        Decimal::ONE / self.step
    }

    /// Default step for an instrument: `10^(price_precision - 1)`, clamped.
    pub fn default_step_for_precision(precision: u32) -> Decimal {
        let raw = if precision == 0 {
            step_lower_bound()
        } else {
            Decimal::from(10_u64.pow((precision - 1).min(9)))
        };
        clamp_step(raw)
    }

    /// Coarsen by one decade (grouping grows). Returns true if changed.
    pub fn increase_aggregation(&mut self) -> bool {
        self.set(self.step / Decimal::TEN)
    }

    /// Refine by one decade (grouping shrinks). Returns true if changed.
    pub fn decrease_aggregation(&mut self) -> bool {
        self.set(self.step * Decimal::TEN)
    }

    /// Clamp and set. Returns false, without any side effect, when the
    /// clamped value equals the current step.
    pub fn set(&mut self, step: Decimal) -> bool {
        let clamped = clamp_step(step);
        if clamped == self.step {
            return false;
        }

        debug!(old = %self.step, new = %clamped, "aggregation step changed");
        self.step = clamped;
        true
    }

    /// Reset to the instrument default on market change.
    pub fn reset_for_market(&mut self, price_precision: u32) {
        self.set(Self::default_step_for_precision(price_precision));
    }

    /// Toolbar label for the current grouping.
    ///
    /// Two decimal places for steps at or below 1; otherwise one fewer
    /// digit than the step's integer width, with a floor of two.
    pub fn display_grouping(&self) -> String {
        let places = if self.step <= Decimal::ONE {
            2
        } else {
            let digits = self.step.normalize().trunc().to_string().len();
            digits.saturating_sub(1).max(2)
        };
        format!("{:.prec$}", self.grouping(), prec = places)
    }
}

impl Default for StepController {
    fn default() -> Self {
        Self::new()
    }
}
