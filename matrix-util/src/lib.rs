pub mod column_stat; // column-wise summaries that skip missing (NaN) entries
pub mod common_io; // gzip-aware buffered readers and writers
