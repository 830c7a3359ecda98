use crate::error::Result;
use crate::modes::Mode;
use crate::table::Table;
use crate::{log_info, log_warn};
use chrono::{DateTime, Local};
use clap::ValueEnum;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const DATETIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// `--output` choices. Leaving the flag out prints plain rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    Pretty,
    File,
}

pub fn control_output(
    table: &Table,
    output: Option<OutputMode>,
    mode: Mode,
    results_dir: &Path,
) -> Result<()> {
    match output {
        None => {
            let stdout = io::stdout();
            write_plain(table, &mut stdout.lock())?;
        }
        Some(OutputMode::Pretty) => {
            let stdout = io::stdout();
            write_pretty(table, &mut stdout.lock())?;
        }
        Some(OutputMode::File) => {
            save_csv(table, results_dir, mode, Local::now())?;
        }
    }
    Ok(())
}

pub fn write_plain(table: &Table, out: &mut impl Write) -> io::Result<()> {
    for row in table.iter_all() {
        writeln!(out, "{}", row.join(" "))?;
    }
    out.flush()
}

/// Left-aligned, bordered table with the header as column titles.
pub fn write_pretty(table: &Table, out: &mut impl Write) -> io::Result<()> {
    let mut widths: Vec<usize> = table.header().iter().map(|h| h.chars().count()).collect();
    for row in table.rows() {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let border = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let border = format!("+{}+", border);

    let line = |cells: &[String]| {
        let padded = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!(" {:<width$} ", cell, width = *width))
            .collect::<Vec<_>>()
            .join("|");
        format!("|{}|", padded)
    };

    writeln!(out, "{}", border)?;
    writeln!(out, "{}", line(table.header()))?;
    writeln!(out, "{}", border)?;
    for row in table.rows() {
        writeln!(out, "{}", line(row.as_slice()))?;
    }
    writeln!(out, "{}", border)?;
    out.flush()
}

/// Quotes every field and ends lines with `\n`.
pub fn write_csv(table: &Table, out: impl Write) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);
    for row in table.iter_all() {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn results_file_name(mode: Mode, now: DateTime<Local>) -> String {
    format!("{}_{}.csv", mode.as_str(), now.format(DATETIME_FORMAT))
}

// Names have one-second resolution, so two runs of the same mode within a
// second share a file. The later run wins and says so in the log.
pub fn save_csv(
    table: &Table,
    results_dir: &Path,
    mode: Mode,
    now: DateTime<Local>,
) -> Result<PathBuf> {
    std::fs::create_dir_all(results_dir)?;
    let file_path = results_dir.join(results_file_name(mode, now));
    if file_path.exists() {
        log_warn!("[output] Overwriting existing results file {}", file_path.display());
    }

    let file = std::fs::File::create(&file_path)?;
    write_csv(table, file)?;
    log_info!("[output] Results saved to {}", file_path.display());
    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn sample() -> Table {
        let mut table = Table::new(["Status", "Count"]);
        table.push_row(["Active", "3"]).unwrap();
        table.push_row(["Withdrawn", "1"]).unwrap();
        table.push_row(["Total", "4"]).unwrap();
        table
    }

    #[test]
    fn plain_output_is_space_separated() {
        let mut out = Vec::new();
        write_plain(&sample(), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Status Count\nActive 3\nWithdrawn 1\nTotal 4\n"
        );
    }

    #[test]
    fn pretty_output_aligns_columns_left() {
        let mut out = Vec::new();
        write_pretty(&sample(), &mut out).unwrap();
        let expected = "\
+-----------+-------+
| Status    | Count |
+-----------+-------+
| Active    | 3     |
| Withdrawn | 1     |
| Total     | 4     |
+-----------+-------+
";
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn csv_quotes_every_field() {
        let mut table = Table::new(["Link", "Title"]);
        table
            .push_row(["https://docs.python.org/3/", "Say \"hi\", world"])
            .unwrap();

        let mut out = Vec::new();
        write_csv(&table, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\"Link\",\"Title\"\n\"https://docs.python.org/3/\",\"Say \"\"hi\"\", world\"\n"
        );
    }

    #[test]
    fn saves_timestamped_file_in_results_dir() {
        let dir = tempfile::tempdir().unwrap();
        let results_dir = dir.path().join("results");
        let now = Local.with_ymd_and_hms(2024, 5, 17, 9, 3, 7).unwrap();

        let path = save_csv(&sample(), &results_dir, Mode::Pep, now).unwrap();

        assert_eq!(path, results_dir.join("pep_2024-05-17_09-03-07.csv"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("\"Status\",\"Count\"\n"));
        assert_eq!(content.lines().count(), 4);
    }
}
