//! First-success distribution derived from a [`RateModel`].
use serde::{Deserialize, Serialize};

use crate::numbers::u32_to_f64;
use crate::rate::RateModel;

/// One row of the tabulated distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionRow {
    pub draw: u32,
    pub rate: f64,
    pub first_success: f64,
    pub cumulative: f64,
}

/// Tabulated first-success probabilities, cumulative sums and expectation,
/// computed once per rate model.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    rates: Vec<f64>,
    first_success: Vec<f64>,
    cumulative: Vec<f64>,
    expected: f64,
}

impl Distribution {
    #[must_use]
    pub fn tabulate(model: &RateModel) -> Self {
        let cap = model.hard_cap();
        let mut rates = vec![0.0];
        let mut first_success = vec![0.0];
        let mut cumulative = vec![0.0];
        let mut survival = 1.0;
        let mut running = 0.0;
        let mut expected = 0.0;

        for n in 1..=cap {
            let rate = model.rate(n);
            let mass = survival * rate;
            running += mass;
            expected += u32_to_f64(n) * mass;
            survival *= 1.0 - rate;

            rates.push(rate);
            first_success.push(mass);
            cumulative.push(running.min(1.0));
        }

        log::debug!(
            "tabulated rare distribution: cap {cap}, mass {running:.12}, expectation {expected:.4}"
        );
        Self {
            rates,
            first_success,
            cumulative,
            expected,
        }
    }

    /// Index of the last tabulated draw (the hard cap).
    #[must_use]
    pub fn cap(&self) -> u32 {
        u32::try_from(self.first_success.len().saturating_sub(1)).unwrap_or(u32::MAX)
    }

    /// Probability that the first rare outcome lands exactly on draw `n`.
    /// Zero outside `1..=cap`.
    #[must_use]
    pub fn first_success_at(&self, n: u32) -> f64 {
        if n == 0 {
            return 0.0;
        }
        usize::try_from(n)
            .ok()
            .and_then(|idx| self.first_success.get(idx))
            .copied()
            .unwrap_or(0.0)
    }

    /// Probability that a rare outcome occurs within `n` draws, clamped to 1.
    #[must_use]
    pub fn cumulative_at(&self, n: u32) -> f64 {
        let idx = n.min(self.cap());
        usize::try_from(idx)
            .ok()
            .and_then(|i| self.cumulative.get(i))
            .copied()
            .unwrap_or(0.0)
    }

    /// Mean draws per rare outcome for a single pity cycle.
    #[must_use]
    pub const fn expected_first_success(&self) -> f64 {
        self.expected
    }

    /// Iterate the table from draw 1 to the hard cap.
    pub fn rows(&self) -> impl Iterator<Item = DistributionRow> + '_ {
        (1..=self.cap()).map(|draw| DistributionRow {
            draw,
            rate: usize::try_from(draw)
                .ok()
                .and_then(|i| self.rates.get(i))
                .copied()
                .unwrap_or(1.0),
            first_success: self.first_success_at(draw),
            cumulative: self.cumulative_at(draw),
        })
    }
}
