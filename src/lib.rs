// Library exports for binsift
pub mod coverage;
pub mod filter;
pub mod filter_stream;
pub mod record;
pub mod report;
pub mod score_sort;
pub mod significance;
