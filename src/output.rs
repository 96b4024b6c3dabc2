//! Output formatting for lookup and search results

use crate::index::types::IndexEntry;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// How entries are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One path per line, keywords optionally appended
    #[default]
    Plain,
    /// One JSON object per line: `{"path": ..., "keywords": [...]}`
    JsonLines,
}

/// Print entries to stdout
pub fn print_entries(
    entries: &[IndexEntry],
    format: OutputFormat,
    color: bool,
    show_keywords: bool,
) -> io::Result<()> {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);
    write_entries(&mut stdout, entries, format, show_keywords)
}

/// Write entries to any colour-capable writer
pub fn write_entries<W: WriteColor>(
    out: &mut W,
    entries: &[IndexEntry],
    format: OutputFormat,
    show_keywords: bool,
) -> io::Result<()> {
    for entry in entries {
        match format {
            OutputFormat::Plain => write_plain(out, entry, show_keywords)?,
            OutputFormat::JsonLines => {
                serde_json::to_writer(&mut *out, entry).map_err(io::Error::other)?;
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

/// Path with the file name emphasised, then `[keywords]` if requested
fn write_plain<W: WriteColor>(out: &mut W, entry: &IndexEntry, show_keywords: bool) -> io::Result<()> {
    let full = entry.path().display().to_string();
    let name = entry.file_name();
    let prefix = full.strip_suffix(name.as_ref()).unwrap_or(&full);

    if !prefix.is_empty() {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
        write!(out, "{}", prefix)?;
        out.reset()?;
    }

    if prefix.len() < full.len() {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)).set_bold(true))?;
        write!(out, "{}", name)?;
        out.reset()?;
    }

    if show_keywords {
        write!(out, "  ")?;
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        let keywords: Vec<&str> = entry.keywords().iter().map(String::as_str).collect();
        write!(out, "[{}]", keywords.join(", "))?;
        out.reset()?;
    }

    writeln!(out)?;
    Ok(())
}
