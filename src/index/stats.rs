use crate::error::Result;
use crate::index::reader::{IndexReader, IndexStats};
use crate::index::types::*;
use std::fmt;
use std::path::Path;

/// Display index statistics for the store at `index_path`
pub fn show_stats(index_path: &Path) -> Result<()> {
    let reader = IndexReader::open(index_path)?;
    let stats = reader.stats()?;
    print!("{}", render_stats(reader.index_path(), &stats));
    Ok(())
}

/// Human-readable statistics report
pub fn render_stats(index_path: &Path, stats: &IndexStats) -> String {
    StatsReport { index_path, stats }.to_string()
}

struct StatsReport<'a> {
    index_path: &'a Path,
    stats: &'a IndexStats,
}

impl fmt::Display for StatsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats;
        writeln!(f, "Index Statistics")?;
        writeln!(f, "================")?;
        writeln!(f)?;
        writeln!(f, "Index location:   {}", self.index_path.display())?;
        writeln!(f, "Entries:          {}", stats.entries)?;
        writeln!(f, "Keywords:         {}", stats.keywords)?;
        writeln!(f, "First letters:    {}", stats.letters)?;
        writeln!(f)?;
        writeln!(f, "Region sizes:")?;
        for (name, bytes) in [
            (DICTIONARY_FILE, stats.dictionary_bytes),
            (KEYWORDS_FILE, stats.keyword_bytes),
            (ADDRESSES_FILE, stats.address_bytes),
            (DATA_FILE, stats.data_bytes),
        ] {
            writeln!(f, "  {:12} {}", name, format_size(bytes as u64))?;
        }
        writeln!(f)?;
        writeln!(f, "Index size:       {}", format_size(stats.total_bytes() as u64))
    }
}

/// Format byte size to human readable
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
