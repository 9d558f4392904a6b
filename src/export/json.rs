use super::TrainingReport;
use crate::error::Result;
use std::io::Write;
use std::path::Path;

/// Export training report to JSON format
pub fn export_training_report<P: AsRef<Path>>(report: &TrainingReport, output_path: P) -> Result<()> {
    export_json(report, output_path)
}

/// Export any serializable data structure to JSON
pub fn export_json<T, P>(data: &T, output_path: P) -> Result<()>
where
    T: serde::Serialize + ?Sized,
    P: AsRef<Path>,
{
    let json_data = serde_json::to_string_pretty(data)?;

    let mut file = std::fs::File::create(output_path)?;
    file.write_all(json_data.as_bytes())?;

    Ok(())
}
