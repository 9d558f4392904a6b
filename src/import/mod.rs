use crate::calendar::TrainingCalendar;
use crate::error::{ImportExportError, Result};
use crate::models::WorkoutCompletion;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub mod activity;
pub mod csv;

/// Trait for importing completion records from different file formats
pub trait ImportFormat {
    /// Check if this importer can handle the given file
    fn can_import(&self, file_path: &Path) -> bool;

    /// Import completion records from the file
    fn import_file(&self, file_path: &Path) -> Result<Vec<WorkoutCompletion>>;

    /// Get the format name for this importer
    fn get_format_name(&self) -> &'static str;
}

/// Manager for coordinating different import formats
pub struct ImportManager {
    importers: Vec<Box<dyn ImportFormat>>,
}

impl ImportManager {
    /// Importers for every format; provider activities need a calendar to
    /// be placed in the plan, so they are only accepted when one is given
    pub fn new(calendar: Option<TrainingCalendar>) -> Self {
        let mut importers: Vec<Box<dyn ImportFormat>> =
            vec![Box::new(csv::CompletionCsvImporter::new())];

        if let Some(calendar) = calendar {
            importers.push(Box::new(activity::ActivityImporter::new(calendar)));
        }

        Self { importers }
    }

    /// Names of the registered formats
    pub fn format_names(&self) -> Vec<&'static str> {
        self.importers.iter().map(|i| i.get_format_name()).collect()
    }

    /// Import a single file, auto-detecting the format
    pub fn import_file(&self, file_path: &Path) -> Result<Vec<WorkoutCompletion>> {
        let Some(importer) = self.importers.iter().find(|i| i.can_import(file_path)) else {
            let format = file_path
                .extension()
                .and_then(|ext| ext.to_str())
                .unwrap_or("unknown")
                .to_string();
            return Err(ImportExportError::UnsupportedFormat { format }.into());
        };

        info!(
            path = %file_path.display(),
            format = importer.get_format_name(),
            "Importing file"
        );
        let completions = importer.import_file(file_path)?;
        info!(count = completions.len(), "Import finished");
        Ok(completions)
    }

    /// Import all files from a directory; files that fail are logged and skipped
    pub fn import_directory(&self, dir_path: &Path) -> Result<Vec<WorkoutCompletion>> {
        let mut all_completions = Vec::new();

        for file_path in self.collect_importable_files(dir_path)? {
            match self.import_file(&file_path) {
                Ok(mut completions) => all_completions.append(&mut completions),
                Err(e) => warn!(path = %file_path.display(), error = %e, "Failed to import file"),
            }
        }

        Ok(all_completions)
    }

    /// Collect all files that can be imported from a directory, sorted by name
    fn collect_importable_files(&self, dir_path: &Path) -> Result<Vec<PathBuf>> {
        if !dir_path.is_dir() {
            return Err(ImportExportError::MissingData {
                field: format!("directory {}", dir_path.display()),
            }
            .into());
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir_path)? {
            let path = entry?.path();
            if path.is_file() && self.importers.iter().any(|i| i.can_import(&path)) {
                files.push(path);
            }
        }
        files.sort();

        Ok(files)
    }
}

/// True when `path` has the extension `ext`, ignoring case
pub(crate) fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}
