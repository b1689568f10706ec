use crate::significance::{DEFAULT_K, DEFAULT_LAMBDA, DEFAULT_SCALE_FACTOR};

/// Output reduction strategy, chosen once per run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Emit each surviving record in arrival order
    Passthrough,
    /// Buffer surviving records and emit in descending score order
    Sort,
    /// Collapse surviving records into run-length coverage of fileA
    Coverage,
}

/// Filter configuration, read-only after startup
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Correct section-relative offsets to absolute offsets on emission
    pub dirout: bool,
    /// Buffer and emit results by descending score
    pub sort: bool,
    /// Reduce results to run-length coverage of fileA
    pub coverage: bool,
    /// Minimum score threshold
    pub min_score: i64,
    /// Minimum match length threshold
    pub min_len: i64,
    /// Karlin-Altschul decay rate
    pub lambda: f64,
    /// Karlin-Altschul K parameter
    pub k: f64,
    /// Expected per-symbol score under the scoring matrix
    pub scale_factor: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            dirout: true,
            sort: true,
            coverage: false,
            min_score: 1,
            min_len: 1,
            lambda: DEFAULT_LAMBDA,
            k: DEFAULT_K,
            scale_factor: DEFAULT_SCALE_FACTOR,
        }
    }
}

impl FilterConfig {
    /// Coverage and sort are mutually exclusive output modes; coverage
    /// takes precedence when both are set.
    pub fn output_mode(&self) -> OutputMode {
        if self.coverage {
            OutputMode::Coverage
        } else if self.sort {
            OutputMode::Sort
        } else {
            OutputMode::Passthrough
        }
    }

    /// Annotation comment echoed after each section's header pair,
    /// recording the flags this run was filtered with. Thresholds are
    /// listed when nonzero.
    pub fn annotation(&self) -> String {
        let mut opts = String::new();
        if self.dirout {
            opts.push_str(" dirout");
        }
        if self.min_len != 0 {
            opts.push_str(&format!(" minlen={}", self.min_len));
        }
        if self.min_score != 0 {
            opts.push_str(&format!(" minscore={}", self.min_score));
        }
        if self.coverage {
            opts.push_str(" coverage");
        }
        if self.sort {
            opts.push_str(" sort");
        }
        format!("# binsift:{opts}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coverage_takes_precedence_over_sort() {
        let config = FilterConfig {
            coverage: true,
            sort: true,
            ..FilterConfig::default()
        };
        assert_eq!(config.output_mode(), OutputMode::Coverage);
    }

    #[test]
    fn default_mode_is_sort() {
        assert_eq!(FilterConfig::default().output_mode(), OutputMode::Sort);
    }

    #[test]
    fn passthrough_when_both_disabled() {
        let config = FilterConfig {
            sort: false,
            ..FilterConfig::default()
        };
        assert_eq!(config.output_mode(), OutputMode::Passthrough);
    }

    #[test]
    fn annotation_lists_enabled_flags_in_order() {
        let config = FilterConfig::default();
        assert_eq!(
            config.annotation(),
            "# binsift: dirout minlen=1 minscore=1 sort"
        );

        let config = FilterConfig {
            dirout: false,
            sort: false,
            coverage: true,
            min_score: 0,
            min_len: 4,
            ..FilterConfig::default()
        };
        assert_eq!(config.annotation(), "# binsift: minlen=4 coverage");
    }
}
