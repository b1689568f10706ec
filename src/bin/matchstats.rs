/// matchstats - Statistics for bincompare match reports
///
/// Summarizes one or two match reports: sections, record counts, matched
/// bases, score spread, and fileA coverage per section. With two files,
/// prints a before/after comparison (the dominant use: raw comparison
/// output vs its filtered form).
use anyhow::{Context, Result};
use clap::Parser;
use std::io::BufRead;

use binsift::coverage::CoverageMap;
use binsift::record::FileSpan;
use binsift::report;

#[derive(Parser)]
#[clap(name = "matchstats", about = "Statistics for bincompare match reports")]
struct Args {
    /// First match report (.gz accepted)
    file1: String,

    /// Optional second report for before/after comparison
    file2: Option<String>,

    /// Show per-section statistics
    #[clap(short = 'd', long)]
    detailed: bool,
}

#[derive(Debug, Default)]
struct ReportStats {
    sections: usize,
    records: u64,
    matched_bases: u64,
    synthetic_records: u64,
    score_min: Option<i64>,
    score_max: Option<i64>,
    score_sum: i64,
    per_section: Vec<SectionStats>,
}

#[derive(Debug)]
struct SectionStats {
    file_a: String,
    file_b: String,
    len_a: u64,
    records: u64,
    covered: usize,
}

impl ReportStats {
    fn mean_score(&self) -> f64 {
        let observed = self.records - self.synthetic_records;
        if observed > 0 {
            self.score_sum as f64 / observed as f64
        } else {
            0.0
        }
    }

    fn add_record(&mut self, score: i64, length: i64) {
        self.records += 1;
        self.matched_bases += length.max(0) as u64;
        if score == -1 {
            // Sentinel score of synthetic coverage records
            self.synthetic_records += 1;
            return;
        }
        self.score_min = Some(self.score_min.map_or(score, |m| m.min(score)));
        self.score_max = Some(self.score_max.map_or(score, |m| m.max(score)));
        self.score_sum += score;
    }
}

/// Parse a match report and collect statistics
fn parse_report(path: &str) -> Result<ReportStats> {
    let reader = report::open_report_input(path).context(format!("Failed to open {path}"))?;

    let mut stats = ReportStats::default();
    let mut pending_a: Option<FileSpan> = None;
    let mut current: Option<(FileSpan, FileSpan, CoverageMap)> = None;
    let mut section_records = 0u64;

    let close_section =
        |current: &mut Option<(FileSpan, FileSpan, CoverageMap)>, section_records: &mut u64, stats: &mut ReportStats| {
            if let Some((file_a, file_b, cov)) = current.take() {
                stats.per_section.push(SectionStats {
                    file_a: file_a.name,
                    file_b: file_b.name,
                    len_a: file_a.len,
                    records: *section_records,
                    covered: cov.covered_count(),
                });
                *section_records = 0;
            }
        };

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();

        if report::is_passthrough(line) {
            continue;
        }

        if report::is_header(line) {
            let Some(span) = report::parse_header(line) else {
                continue;
            };
            match pending_a.take() {
                None => {
                    close_section(&mut current, &mut section_records, &mut stats);
                    pending_a = Some(span);
                }
                Some(file_a) => {
                    stats.sections += 1;
                    let cov = CoverageMap::new(file_a.len as usize);
                    current = Some((file_a, span, cov));
                }
            }
            continue;
        }

        if let Some((_, _, cov)) = current.as_mut() {
            if let Some(rec) = report::parse_match(line) {
                stats.add_record(rec.score, rec.length);
                section_records += 1;
                cov.mark(rec.a, rec.length);
            }
        }
    }
    close_section(&mut current, &mut section_records, &mut stats);

    Ok(stats)
}

fn print_stats(path: &str, stats: &ReportStats, detailed: bool) {
    println!("\nStatistics for {path}:");
    println!("{}", "=".repeat(60));
    println!("Sections:              {:>12}", format_number(stats.sections));
    println!(
        "Match records:         {:>12}",
        format_number(stats.records as usize)
    );
    println!(
        "Matched bases:         {:>12}",
        format_number(stats.matched_bases as usize)
    );
    println!(
        "Synthetic (coverage):  {:>12}",
        format_number(stats.synthetic_records as usize)
    );
    match (stats.score_min, stats.score_max) {
        (Some(min), Some(max)) => {
            println!("Score range:           {min:>12} .. {max}");
            println!("Mean score:            {:>12.1}", stats.mean_score());
        }
        _ => println!("Score range:           {:>12}", "n/a"),
    }

    if detailed && !stats.per_section.is_empty() {
        println!("\nPer-section statistics:");
        println!("{}", "-".repeat(60));
        for s in &stats.per_section {
            let coverage_pct = if s.len_a > 0 {
                100.0 * s.covered as f64 / s.len_a as f64
            } else {
                0.0
            };
            println!(
                "{:24} vs {:24} {:>8} records, {:5.1}% of fileA covered",
                s.file_a,
                s.file_b,
                format_number(s.records as usize),
                coverage_pct
            );
        }
    }
}

fn compare_stats(file1: &str, file2: &str, stats1: &ReportStats, stats2: &ReportStats) {
    println!("\nComparison: {file1} vs {file2}");
    println!("{}", "=".repeat(60));

    print_comparison("Sections", stats1.sections, stats2.sections);
    print_comparison(
        "Match records",
        stats1.records as usize,
        stats2.records as usize,
    );
    print_comparison(
        "Matched bases",
        stats1.matched_bases as usize,
        stats2.matched_bases as usize,
    );

    println!("\nMean score:");
    println!("  {:30} {:>12.1}", file1, stats1.mean_score());
    println!("  {:30} {:>12.1}", file2, stats2.mean_score());
}

fn print_comparison(label: &str, val1: usize, val2: usize) {
    println!("\n{label}:");
    println!("  {:30} {:>12}", "Before", format_number(val1));
    println!("  {:30} {:>12}", "After", format_number(val2));

    let diff = val2 as i64 - val1 as i64;
    let pct = if val1 > 0 {
        100.0 * diff as f64 / val1 as f64
    } else {
        0.0
    };
    println!("  {:30} {:>12} ({:+.1}%)", "Change", format_signed(diff), pct);
}

fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

fn format_signed(n: i64) -> String {
    if n >= 0 {
        format!("+{}", format_number(n as usize))
    } else {
        format!("-{}", format_number((-n) as usize))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let stats1 = parse_report(&args.file1)?;

    if let Some(file2) = args.file2 {
        let stats2 = parse_report(&file2)?;
        compare_stats(&args.file1, &file2, &stats1, &stats2);
    } else {
        print_stats(&args.file1, &stats1, args.detailed);
    }

    Ok(())
}
