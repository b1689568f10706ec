use crate::filter::FilterConfig;
use crate::record::MatchRecord;

/// Decay rate of the extreme-value distribution for random alignments
pub const DEFAULT_LAMBDA: f64 = 0.25;
/// Karlin-Altschul K parameter for the scoring system
pub const DEFAULT_K: f64 = 0.249865;
/// Expected per-symbol score under the alignment's scoring matrix
pub const DEFAULT_SCALE_FACTOR: f64 = 5.0;

/// Karlin-Altschul model of the longest match expected from random
/// sequence alignment. A reported match is significant when its score
/// gain over the scoring scale exceeds the gain a random alignment of
/// the same length would be expected to reach.
#[derive(Debug, Clone, Copy)]
pub struct KarlinAltschul {
    lambda: f64,
    k: f64,
    scale_factor: f64,
    /// 99%-confidence adjustment to the expected longest random match
    /// length, derived once at construction
    x: f64,
}

impl Default for KarlinAltschul {
    fn default() -> Self {
        KarlinAltschul::new(DEFAULT_LAMBDA, DEFAULT_K, DEFAULT_SCALE_FACTOR)
    }
}

impl KarlinAltschul {
    pub fn new(lambda: f64, k: f64, scale_factor: f64) -> Self {
        let x = -(1.0f64 / 0.99).ln().ln() / lambda;
        KarlinAltschul {
            lambda,
            k,
            scale_factor,
            x,
        }
    }

    /// Decide whether a (score, length) pair is distinguishable from
    /// random alignment noise. Pure: identical inputs always yield the
    /// same decision.
    pub fn is_significant(&self, score: i64, length: i64) -> bool {
        // Logarithms below require positive operands
        if length <= 0 || score <= 0 {
            return false;
        }

        let len = length as f64;
        let gain = 20.0 * (score as f64 / (self.scale_factor * len)).log10();

        let noise = (len.ln() + self.k.ln()) / self.lambda + self.x;
        if noise <= 0.0 {
            // The noise bound degenerates below any observable gain
            return true;
        }

        let noise_gain = 20.0 * (noise / (self.scale_factor * len)).log10();
        gain >= noise_gain
    }
}

/// Reason a record was dropped, or Accept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    /// Failed the hard min-score / min-length thresholds
    BelowThreshold,
    /// Indistinguishable from random alignment noise
    BelowNoise,
}

/// Per-record accept/reject decision combining the hard thresholds with
/// the Karlin-Altschul noise bound.
#[derive(Debug, Clone, Copy)]
pub struct SignificanceFilter {
    min_score: i64,
    min_len: i64,
    model: KarlinAltschul,
}

impl SignificanceFilter {
    pub fn new(config: &FilterConfig) -> Self {
        SignificanceFilter {
            min_score: config.min_score,
            min_len: config.min_len,
            model: KarlinAltschul::new(config.lambda, config.k, config.scale_factor),
        }
    }

    pub fn judge(&self, rec: &MatchRecord) -> Verdict {
        if rec.score < self.min_score || rec.length < self.min_len {
            return Verdict::BelowThreshold;
        }
        if self.model.is_significant(rec.score, rec.length) {
            Verdict::Accept
        } else {
            Verdict::BelowNoise
        }
    }

    pub fn accepts(&self, rec: &MatchRecord) -> bool {
        self.judge(rec) == Verdict::Accept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_match_is_significant() {
        let model = KarlinAltschul::default();
        // gain = 20*log10(50/100) ~ -6.02 vs noise gain ~ -12.07
        assert!(model.is_significant(50, 20));
    }

    #[test]
    fn weak_match_is_noise() {
        let model = KarlinAltschul::default();
        // gain = 20*log10(5/100) ~ -26.02, well below the noise bound
        assert!(!model.is_significant(5, 20));
    }

    #[test]
    fn degenerate_inputs_never_reach_a_logarithm() {
        let model = KarlinAltschul::default();
        assert!(!model.is_significant(50, 0));
        assert!(!model.is_significant(0, 20));
        assert!(!model.is_significant(-1, 20));
        assert!(!model.is_significant(50, -3));
    }

    #[test]
    fn tiny_k_disables_the_noise_bound() {
        // With K pushed toward zero the expected noise length is negative
        // for every practical match length, so any positive score passes.
        let model = KarlinAltschul::new(DEFAULT_LAMBDA, 1e-30, DEFAULT_SCALE_FACTOR);
        assert!(model.is_significant(1, 1));
        assert!(model.is_significant(1, 100_000));
    }

    #[test]
    fn thresholds_apply_before_the_model() {
        let config = FilterConfig {
            min_score: 60,
            ..FilterConfig::default()
        };
        let filter = SignificanceFilter::new(&config);
        let rec = MatchRecord {
            a: 0,
            b: 0,
            score: 50,
            length: 20,
        };
        assert_eq!(filter.judge(&rec), Verdict::BelowThreshold);

        let filter = SignificanceFilter::new(&FilterConfig::default());
        assert_eq!(filter.judge(&rec), Verdict::Accept);
        let weak = MatchRecord {
            a: 0,
            b: 0,
            score: 5,
            length: 20,
        };
        assert_eq!(filter.judge(&weak), Verdict::BelowNoise);
    }
}
