/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/// Derived quality metrics for a code over a known symbol distribution.
///
/// Purely a report: nothing here feeds back into encoding. All quantities
/// are computed from `(probability, code length)` pairs in one pass over the
/// symbols with nonzero probability.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CodeStats {
    /// Source entropy, `-Σ p·log2 p`, in bits per symbol.
    pub entropy: f64,
    /// Average code length, `Σ p·len`, in bits per symbol.
    pub average_length: f64,
    /// Code-length variance, `Σ p·(len - average)²`.
    pub variance: f64,
    /// Coding efficiency, `entropy / average_length`. At most 1 by the
    /// Shannon bound, with equality only for power-of-two frequencies.
    pub efficiency: f64,
}

impl CodeStats {
    /// Compute the statistics from `(probability, code length)` pairs.
    ///
    /// Symbols with zero probability contribute nothing and may be included
    /// or skipped by the caller. The degenerate zero-length-average case
    /// cannot arise from a well-formed code table, which always holds at
    /// least two nonempty codes.
    pub fn new<I>(symbols: I) -> Self
    where
        I: IntoIterator<Item = (f64, u8)> + Clone,
    {
        let mut entropy = 0.0;
        let mut average_length = 0.0;
        for (p, len) in symbols.clone() {
            if p > 0.0 {
                entropy -= p * p.log2();
                average_length += p * len as f64;
            }
        }
        let mut variance = 0.0;
        for (p, len) in symbols {
            if p > 0.0 {
                variance += p * (len as f64 - average_length).powi(2);
            }
        }
        Self {
            entropy,
            average_length,
            variance,
            efficiency: entropy / average_length,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn known_distribution() {
        // 'a' x4 (len 1), 'b' x2 (len 2), 'c' x1 (len 2)
        let symbols = [(4.0 / 7.0, 1), (2.0 / 7.0, 2), (1.0 / 7.0, 2)];
        let stats = CodeStats::new(symbols);
        assert!((stats.average_length - 10.0 / 7.0).abs() < EPS);
        let entropy = -(4.0 / 7.0_f64 * (4.0 / 7.0_f64).log2()
            + 2.0 / 7.0 * (2.0 / 7.0_f64).log2()
            + 1.0 / 7.0 * (1.0 / 7.0_f64).log2());
        assert!((stats.entropy - entropy).abs() < EPS);
        assert!(stats.efficiency <= 1.0 + EPS);
    }

    #[test]
    fn dyadic_distribution_is_perfect() {
        // power-of-two frequencies: entropy equals the average length, the
        // lengths vary, and the efficiency is exactly 1
        let symbols = [(0.5, 1), (0.25, 2), (0.125, 3), (0.125, 3)];
        let stats = CodeStats::new(symbols);
        assert!((stats.entropy - stats.average_length).abs() < EPS);
        assert!((stats.efficiency - 1.0).abs() < EPS);
        assert!(stats.variance > 0.0);
    }

    #[test]
    fn uniform_distribution_has_zero_variance() {
        let symbols = [(0.25, 2); 4];
        let stats = CodeStats::new(symbols);
        assert!((stats.variance).abs() < EPS);
        assert!((stats.average_length - 2.0).abs() < EPS);
    }
}
