use std::fs;
use std::path::PathBuf;

use crashlens_application::{ApplicationError, ExportSink};

/// Writes exported documents into one directory, created on first use.
#[derive(Debug, Clone)]
pub struct FsExportSink {
    dir: PathBuf,
}

impl FsExportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ExportSink for FsExportSink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ApplicationError> {
        if file_name.is_empty() || file_name.contains(['/', '\\']) {
            return Err(ApplicationError::InvalidInput(format!(
                "invalid export file name: {file_name}"
            )));
        }
        fs::create_dir_all(&self.dir).map_err(|error| ApplicationError::Io(error.to_string()))?;

        let path = self.dir.join(file_name);
        fs::write(&path, bytes)
            .map_err(|error| ApplicationError::Io(format!("{}: {error}", path.display())))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_into_created_directory() {
        let dir = TempDir::new().expect("tempdir");
        let sink = FsExportSink::new(dir.path().join("informes"));
        let path = sink.save("informe.pdf", b"%PDF").expect("save");
        assert_eq!(path, dir.path().join("informes").join("informe.pdf"));
        assert_eq!(fs::read(path).expect("read"), b"%PDF");
    }

    #[test]
    fn rejects_path_like_names() {
        let dir = TempDir::new().expect("tempdir");
        let sink = FsExportSink::new(dir.path());
        assert!(sink.save("../x.pdf", b"x").is_err());
        assert!(sink.save("", b"x").is_err());
    }
}
