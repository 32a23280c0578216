//! Writes generated text to the output directory.

// Internal imports (std, crate)
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::Config;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::utils::sanitize_filename;

// External imports (alphabetized)
use tokio::fs;

/// Writes stub files and the declaration file.
///
/// Existing files are overwritten. Failures never abort the run; each one is
/// recorded as an [`DiagnosticKind::Io`] diagnostic.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
    extension: String,
    import_line: String,
}

/// Outcome of a write pass
#[derive(Debug, Default)]
pub struct WriteReport {
    /// Files written, in write order
    pub written: Vec<PathBuf>,
    pub diagnostics: Diagnostics,
}

impl OutputWriter {
    pub fn new(dir: impl Into<PathBuf>, config: &Config) -> Self {
        Self {
            dir: dir.into(),
            extension: config.extension.clone(),
            import_line: config.import_line.clone(),
        }
    }

    /// File name of the stub file of a group
    pub fn stub_file_name(&self, group: &str) -> String {
        format!("api.{}.{}", sanitize_filename(group), self.extension)
    }

    /// File name of the declaration file
    pub fn declaration_file_name(&self) -> String {
        format!("types.d.{}", self.extension)
    }

    /// Write one file per stub group, then the declaration file when
    /// `declarations` is non-empty
    pub async fn write(&self, declarations: &str, stubs: &BTreeMap<String, String>) -> WriteReport {
        let mut report = WriteReport::default();

        if let Err(e) = fs::create_dir_all(&self.dir).await {
            report.diagnostics.push(
                DiagnosticKind::Io,
                self.dir.display().to_string(),
                format!("cannot create output directory: {}", e),
            );
            return report;
        }

        // Groups that differ only in unsafe characters share a file
        let mut files: BTreeMap<String, String> = BTreeMap::new();
        for (group, text) in stubs {
            let content = files
                .entry(self.stub_file_name(group))
                .or_insert_with(|| format!("{}\n", self.import_line));
            content.push_str(text);
        }
        if !declarations.is_empty() {
            files.insert(self.declaration_file_name(), declarations.to_string());
        }

        for (name, content) in files {
            let path = self.dir.join(&name);
            match fs::write(&path, content).await {
                Ok(()) => {
                    log::debug!("Wrote {}", path.display());
                    report.written.push(path);
                }
                Err(e) => report.diagnostics.push(
                    DiagnosticKind::Io,
                    name,
                    format!("cannot write {}: {}", path.display(), e),
                ),
            }
        }
        report
    }
}
