/// Run-length coverage of fileA by surviving matches, scoped to one
/// section. Positions are section-relative; the array spans exactly
/// `[0, len_a)` and writes outside it are clipped, never an error.
#[derive(Debug, Clone)]
pub struct CoverageMap {
    covered: Vec<bool>,
}

impl CoverageMap {
    pub fn new(len: usize) -> Self {
        CoverageMap {
            covered: vec![false; len],
        }
    }

    pub fn len(&self) -> usize {
        self.covered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.covered.is_empty()
    }

    /// Mark `[start, start + length)` covered, clipped to the array
    /// bounds. Returns the number of requested positions that fell
    /// outside and were dropped.
    pub fn mark(&mut self, start: i64, length: i64) -> u64 {
        if length <= 0 {
            return 0;
        }

        let end = start.saturating_add(length);
        let clipped_begin = start.clamp(0, self.covered.len() as i64) as usize;
        let clipped_end = end.clamp(0, self.covered.len() as i64) as usize;

        for slot in &mut self.covered[clipped_begin..clipped_end] {
            *slot = true;
        }

        length as u64 - (clipped_end - clipped_begin) as u64
    }

    /// Number of covered positions
    pub fn covered_count(&self) -> usize {
        self.covered.iter().filter(|&&c| c).count()
    }

    /// Scan left-to-right and collect maximal contiguous covered runs as
    /// `(start, length)` pairs. A run still open at the array end is
    /// emitted as a final interval.
    pub fn runs(&self) -> Vec<(usize, usize)> {
        let mut runs = Vec::new();
        let mut run_start = 0;
        let mut in_covered = false;

        for (i, &covered) in self.covered.iter().enumerate() {
            if covered && !in_covered {
                run_start = i;
                in_covered = true;
            } else if !covered && in_covered {
                runs.push((run_start, i - run_start));
                in_covered = false;
            }
        }
        if in_covered {
            runs.push((run_start, self.covered.len() - run_start));
        }

        runs
    }
}
