use anyhow::Result;
use log::debug;
use std::io::{BufRead, Write};

use crate::coverage::CoverageMap;
use crate::filter::{FilterConfig, OutputMode};
use crate::record::{FileSpan, Section};
use crate::report;
use crate::score_sort::ScoreBuckets;
use crate::significance::{SignificanceFilter, Verdict};

/// Parser position within the repeating section grammar. The fileA
/// header carries over into SeekB, and the completed section into
/// Matching, so no state lives outside the machine itself.
#[derive(Debug)]
enum DriverState {
    /// Waiting for the fileA header of the next section
    SeekA,
    /// fileA header seen, waiting for the matching fileB header
    SeekB { file_a: FileSpan },
    /// Both headers seen, consuming match lines
    Matching { section: Section },
}

/// Diagnostic counters for one filtering run. Purely observational:
/// counters never change the output stream.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FilterStats {
    pub lines_read: u64,
    pub sections: u64,
    pub records_parsed: u64,
    pub records_kept: u64,
    pub malformed_lines: u64,
    pub below_threshold: u64,
    pub below_noise: u64,
    pub clipped_positions: u64,
}

/// Streaming filter for bincompare match reports.
///
/// Single-threaded and single-pass: memory use is bounded by one
/// section's coverage array or the distinct-score count in sort mode,
/// never by total input size.
pub struct StreamFilter {
    config: FilterConfig,
    significance: SignificanceFilter,
}

impl StreamFilter {
    pub fn new(config: FilterConfig) -> Self {
        let significance = SignificanceFilter::new(&config);
        StreamFilter {
            config,
            significance,
        }
    }

    /// Filter the incoming match stream and write the surviving records
    /// to `output`, flushing per-section reducer state at every section
    /// boundary and at end-of-stream.
    pub fn process<R: BufRead, W: Write>(&self, input: R, output: &mut W) -> Result<FilterStats> {
        let mode = self.config.output_mode();
        let mut stats = FilterStats::default();
        let mut state = DriverState::SeekA;

        // Per-section reducer state, reset at every section boundary
        let mut buckets = ScoreBuckets::new();
        let mut coverage: Option<CoverageMap> = None;

        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            stats.lines_read += 1;

            // A header line while consuming matches is a section
            // boundary: flush the previous section, then let the same
            // line parse as the new fileA header below.
            if report::is_header(line) {
                if let DriverState::Matching { section } = &state {
                    self.flush_section(section, &mut buckets, &mut coverage, output, &mut stats)?;
                    state = DriverState::SeekA;
                }
            }

            // Comments and blank lines pass through in every state
            if report::is_passthrough(line) {
                writeln!(output, "{line}")?;
                continue;
            }

            state = match state {
                DriverState::SeekA => match report::parse_header(line) {
                    Some(file_a) => {
                        writeln!(output, "{}", file_a.header_line())?;
                        DriverState::SeekB { file_a }
                    }
                    None => {
                        stats.malformed_lines += 1;
                        DriverState::SeekA
                    }
                },
                DriverState::SeekB { file_a } => match report::parse_header(line) {
                    Some(file_b) => {
                        writeln!(output, "{}", file_b.header_line())?;
                        writeln!(output, "{}", self.config.annotation())?;

                        let section = Section { file_a, file_b };
                        stats.sections += 1;
                        debug!(
                            "section {}: {} vs {} (len_a={})",
                            stats.sections, section.file_a.name, section.file_b.name, section.file_a.len
                        );

                        if mode == OutputMode::Coverage {
                            coverage = Some(CoverageMap::new(section.file_a.len as usize));
                        }
                        DriverState::Matching { section }
                    }
                    None => {
                        stats.malformed_lines += 1;
                        DriverState::SeekB { file_a }
                    }
                },
                DriverState::Matching { section } => {
                    match report::parse_match(line) {
                        Some(rec) => {
                            stats.records_parsed += 1;
                            match self.significance.judge(&rec) {
                                Verdict::Accept => {
                                    stats.records_kept += 1;
                                    match mode {
                                        OutputMode::Coverage => {
                                            if let Some(cov) = coverage.as_mut() {
                                                // Coverage indexing stays section-relative;
                                                // dirout only shifts emitted coordinates
                                                stats.clipped_positions +=
                                                    cov.mark(rec.a, rec.length);
                                            }
                                        }
                                        OutputMode::Sort => {
                                            buckets.push(
                                                rec.score,
                                                rec.format_corrected(&section, self.config.dirout),
                                            );
                                        }
                                        OutputMode::Passthrough => {
                                            writeln!(
                                                output,
                                                "{}",
                                                rec.format_corrected(&section, self.config.dirout)
                                            )?;
                                        }
                                    }
                                }
                                Verdict::BelowThreshold => stats.below_threshold += 1,
                                Verdict::BelowNoise => stats.below_noise += 1,
                            }
                        }
                        None => stats.malformed_lines += 1,
                    }
                    DriverState::Matching { section }
                }
            };
        }

        // End-of-stream, including truncation mid-section, flushes
        // whatever reducer state is pending
        if let DriverState::Matching { section } = &state {
            self.flush_section(section, &mut buckets, &mut coverage, output, &mut stats)?;
        }

        Ok(stats)
    }

    /// Emit a finished section's buffered reducer state: sort buckets in
    /// descending score order, then coverage runs as synthetic records.
    fn flush_section<W: Write>(
        &self,
        section: &Section,
        buckets: &mut ScoreBuckets,
        coverage: &mut Option<CoverageMap>,
        output: &mut W,
        stats: &mut FilterStats,
    ) -> Result<()> {
        if !buckets.is_empty() {
            debug!(
                "flushing {} sorted records for {}",
                buckets.len(),
                section.file_a.name
            );
            buckets.flush(output)?;
        }

        if let Some(cov) = coverage.take() {
            let runs = cov.runs();
            debug!(
                "flushing {} coverage runs for {} ({} of {} positions covered)",
                runs.len(),
                section.file_a.name,
                cov.covered_count(),
                cov.len()
            );
            for (start, len) in runs {
                // The 0 and -1 fields are fixed sentinels marking a
                // synthetic coverage record rather than an observed
                // match; the start offset is always absolute.
                writeln!(output, "{},0,-1,{}", start as u64 + section.file_a.offset, len)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(config: FilterConfig, input: &str) -> (String, FilterStats) {
        let filter = StreamFilter::new(config);
        let mut out = Vec::new();
        let stats = filter.process(Cursor::new(input), &mut out).unwrap();
        (String::from_utf8(out).unwrap(), stats)
    }

    fn passthrough_config() -> FilterConfig {
        FilterConfig {
            dirout: false,
            sort: false,
            ..FilterConfig::default()
        }
    }

    #[test]
    fn headers_echo_before_the_annotation() {
        let input = "File a.bin, offset 0, len 100\nFile b.bin, offset 0, len 50\n";
        let (out, stats) = run(passthrough_config(), input);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "File a.bin, offset 0, len 100");
        assert_eq!(lines[1], "File b.bin, offset 0, len 50");
        assert_eq!(lines[2], "# binsift: minlen=1 minscore=1");
        assert_eq!(stats.sections, 1);
    }

    #[test]
    fn accepted_match_streams_through() {
        let input = "File a.bin, offset 0, len 100\n\
                     File b.bin, offset 0, len 50\n\
                     10,5,50,20\n";
        let (out, stats) = run(passthrough_config(), input);
        assert!(out.lines().any(|l| l == "10,5,50,20"));
        assert_eq!(stats.records_kept, 1);
    }

    #[test]
    fn malformed_lines_are_dropped_not_fatal() {
        let input = "File a.bin, offset zero, len 100\n\
                     File a.bin, offset 0, len 100\n\
                     File b.bin, offset 0, len 50\n\
                     not,enough\n\
                     10,five,50,20\n\
                     10,5,50,20\n";
        let (out, stats) = run(passthrough_config(), input);
        assert_eq!(stats.malformed_lines, 3);
        assert_eq!(stats.records_kept, 1);
        assert!(out.lines().any(|l| l == "10,5,50,20"));
        assert!(!out.contains("zero"));
    }

    #[test]
    fn truncated_stream_still_flushes() {
        let config = FilterConfig {
            dirout: false,
            ..FilterConfig::default()
        };
        // Sort mode with no trailing newline or following section
        let input = "File a.bin, offset 0, len 100\n\
                     File b.bin, offset 0, len 50\n\
                     10,5,50,20";
        let (out, _) = run(config, input);
        assert!(out.lines().any(|l| l == "10,5,50,20"));
    }
}
