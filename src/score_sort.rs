use anyhow::Result;
use std::collections::BTreeMap;
use std::io::Write;

/// Score-keyed buffers of formatted output lines. Lines within a bucket
/// keep their insertion order; flushing emits buckets in strictly
/// descending score order and clears the buffers for the next section.
#[derive(Debug, Default)]
pub struct ScoreBuckets {
    buckets: BTreeMap<i64, Vec<String>>,
    lines: usize,
}

impl ScoreBuckets {
    pub fn new() -> Self {
        ScoreBuckets::default()
    }

    pub fn push(&mut self, score: i64, line: String) {
        self.buckets.entry(score).or_default().push(line);
        self.lines += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.lines == 0
    }

    pub fn len(&self) -> usize {
        self.lines
    }

    /// Emit all buffered lines in descending score order, then clear
    pub fn flush<W: Write>(&mut self, output: &mut W) -> Result<()> {
        for lines in self.buckets.values().rev() {
            for line in lines {
                writeln!(output, "{line}")?;
            }
        }
        self.buckets.clear();
        self.lines = 0;
        Ok(())
    }
}
