use anyhow::{bail, Result};
use clap::Parser;
use std::io::{self, BufRead, BufReader, BufWriter, Write};

use binsift::filter::FilterConfig;
use binsift::filter_stream::StreamFilter;
use binsift::report::open_report_input;

/// binsift - significance filtering for bincompare match streams
///
/// Reads the textual report produced by a binary-comparison run, drops
/// matches that Karlin-Altschul analysis puts below the random-alignment
/// noise threshold, and optionally reduces the survivors to score-sorted
/// or fileA-coverage form. Designed for in-line use on result streams
/// larger than available memory.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Input match report (stdin if not specified; .gz accepted)
    #[clap(short = 'i', long = "input")]
    input: Option<String>,

    /// Output stream (stdout if not specified)
    #[clap(short = 'o', long = "output")]
    output: Option<String>,

    /// Do not correct dirout relative offsets to absolute offsets
    #[clap(short = 'd', long = "no-dirout")]
    no_dirout: bool,

    /// Don't sort results (reduces memory usage)
    #[clap(short = 'n', long = "no-sort")]
    no_sort: bool,

    /// Threshold minimum score, if score is above the noise threshold
    #[clap(short = 't', long = "threshold", default_value = "1")]
    threshold: i64,

    /// Minimum match length
    #[clap(short = 'l', long = "min-len", default_value = "1")]
    min_len: i64,

    /// Reduce results into matches covering only fileA
    #[clap(short = 'a', long = "coverage")]
    coverage: bool,

    /// Karlin-Altschul decay rate
    #[clap(long = "lambda", default_value = "0.25")]
    lambda: f64,

    /// Karlin-Altschul K parameter
    #[clap(long = "k-param", default_value = "0.249865")]
    k_param: f64,

    /// Expected per-symbol score under the alignment scoring matrix
    #[clap(long = "scale", default_value = "5.0")]
    scale: f64,

    /// Quiet mode (no end-of-run summary on stderr)
    #[clap(short = 'q', long = "quiet")]
    quiet: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.threshold < 0 || args.min_len < 0 {
        bail!("thresholds must be non-negative");
    }
    if args.lambda <= 0.0 || args.k_param <= 0.0 || args.scale <= 0.0 {
        bail!("Karlin-Altschul constants must be positive");
    }

    let config = FilterConfig {
        dirout: !args.no_dirout,
        sort: !args.no_sort,
        coverage: args.coverage,
        min_score: args.threshold,
        min_len: args.min_len,
        lambda: args.lambda,
        k: args.k_param,
        scale_factor: args.scale,
    };

    let input: Box<dyn BufRead> = match args.input {
        Some(ref path) => open_report_input(path)?,
        None => Box::new(BufReader::new(io::stdin())),
    };
    let mut output: Box<dyn Write> = match args.output {
        Some(ref path) => Box::new(BufWriter::new(std::fs::File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    let filter = StreamFilter::new(config);
    let stats = filter.process(input, &mut output)?;
    output.flush()?;

    if !args.quiet {
        eprintln!(
            "binsift: {} sections, kept {}/{} records ({} malformed, {} below threshold, {} below noise)",
            stats.sections,
            stats.records_kept,
            stats.records_parsed,
            stats.malformed_lines,
            stats.below_threshold,
            stats.below_noise
        );
    }

    Ok(())
}
