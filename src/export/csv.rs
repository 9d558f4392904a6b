use crate::error::Result;
use crate::import::csv::CompletionRow;
use crate::models::Completions;
use crate::summary::WeeklySummary;
use csv::Writer;
use std::io::Write;
use std::path::Path;

/// Write the completion log with the columns the CSV importer reads
pub fn write_completions<W: Write>(completions: &Completions, writer: W) -> Result<()> {
    let mut writer = Writer::from_writer(writer);
    for completion in completions.values() {
        writer.serialize(CompletionRow::from(completion))?;
    }
    writer.flush()?;
    Ok(())
}

/// Export the completion log to a CSV file
pub fn export_completions<P: AsRef<Path>>(completions: &Completions, output_path: P) -> Result<()> {
    let file = std::fs::File::create(output_path)?;
    write_completions(completions, file)
}

/// Write one row per weekly summary
pub fn write_weekly_summaries<W: Write>(summaries: &[WeeklySummary], writer: W) -> Result<()> {
    let mut writer = Writer::from_writer(writer);
    for summary in summaries {
        writer.serialize(summary)?;
    }
    writer.flush()?;
    Ok(())
}

/// Export weekly summaries to a CSV file (suitable for spreadsheet plotting)
pub fn export_weekly_summaries<P: AsRef<Path>>(
    summaries: &[WeeklySummary],
    output_path: P,
) -> Result<()> {
    let file = std::fs::File::create(output_path)?;
    write_weekly_summaries(summaries, file)
}
