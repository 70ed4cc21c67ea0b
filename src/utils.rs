use crate::report::error::ReportError;
use log::info;
use std::io;
use std::path::Path;

/// Makes a city name safe to use in a file name.
///
/// Spaces become underscores, then everything except letters, digits, `_`, `-` and
/// whitespace is dropped.
pub fn sanitize_filename(name: &str) -> String {
    name.replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect()
}

pub async fn ensure_output_dir_exists(path: &Path) -> Result<(), ReportError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(ReportError::OutputPathNotDirectory(path.to_path_buf()));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating output directory: {}", path.display());
            tokio::fs::create_dir_all(path)
                .await
                .map_err(|e| ReportError::OutputDirCreation(path.to_path_buf(), e))
        }
        Err(e) => Err(ReportError::OutputDirCreation(path.to_path_buf(), e)),
    }
}
