use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::cert::Certificate;
use crate::error::{CertGenError, Result};

/// Where the finished certificate goes.
///
/// The PEM form is always written; the DER form only when `der` names a
/// different file.
#[derive(Clone, Debug)]
pub struct OutputPaths {
    pub pem: PathBuf,
    pub der: Option<PathBuf>,
}

impl OutputPaths {
    pub fn pem_only(pem: impl Into<PathBuf>) -> Self {
        Self {
            pem: pem.into(),
            der: None,
        }
    }

    fn validate(&self) -> Result<()> {
        if let Some(der) = &self.der {
            if same_file(der, &self.pem) {
                return Err(CertGenError::InvalidInput(format!(
                    "DER and PEM outputs must be different files, both are {}",
                    self.pem.display()
                )));
            }
        }
        Ok(())
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    a == b || resolve(a) == resolve(b)
}

/// Resolves `path` through its parent directory, so files that do not exist
/// yet still compare equal when they alias.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(full) = fs::canonicalize(path) {
        return full;
    }
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    match (fs::canonicalize(parent), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

/// Writes `der` as PEM (and as raw DER when requested), returning the PEM text.
///
/// Both encodings are produced and checked against `capacity` before any file
/// is touched.
pub fn write_certificate(der: &[u8], paths: &OutputPaths, capacity: usize) -> Result<String> {
    paths.validate()?;

    info!("Convert the der cert to pem formatted cert");
    let pem = Certificate::der_to_pem_bounded(der, capacity)?;
    info!(bytes = pem.len(), "Resulting pem buffer");

    if let Some(der_path) = &paths.der {
        write_file(der_path, der)?;
        info!(path = %der_path.display(), bytes = der.len(), "wrote DER certificate");
    }

    write_file(&paths.pem, pem.as_bytes())?;
    info!(path = %paths.pem.display(), bytes = pem.len(), "wrote PEM certificate");

    Ok(pem)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|e| CertGenError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAKE_DER: &[u8] = &[0x30, 0x03, 0x02, 0x01, 0x05];

    #[test]
    fn pem_and_der_go_to_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths {
            pem: dir.path().join("cert.pem"),
            der: Some(dir.path().join("cert.der")),
        };
        let pem = write_certificate(FAKE_DER, &paths, 4096).unwrap();

        assert_eq!(fs::read_to_string(&paths.pem).unwrap(), pem);
        assert_eq!(fs::read(paths.der.unwrap()).unwrap(), FAKE_DER);
    }

    #[test]
    fn same_path_for_both_encodings_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cert.pem");
        let paths = OutputPaths {
            pem: path.clone(),
            der: Some(path.clone()),
        };
        let err = write_certificate(FAKE_DER, &paths, 4096).unwrap_err();
        assert!(matches!(err, CertGenError::InvalidInput(_)));
        assert!(!path.exists());
    }

    #[test]
    fn aliased_path_to_a_new_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let paths = OutputPaths {
            pem: dir.path().join("cert.pem"),
            der: Some(dir.path().join("sub").join("..").join("cert.pem")),
        };
        let err = write_certificate(FAKE_DER, &paths, 4096).unwrap_err();
        assert!(matches!(err, CertGenError::InvalidInput(_)));
        assert!(!paths.pem.exists());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(dir.path(), &link).unwrap();
        let paths = OutputPaths {
            pem: dir.path().join("cert.pem"),
            der: Some(link.join("cert.pem")),
        };
        let err = write_certificate(FAKE_DER, &paths, 4096).unwrap_err();
        assert!(matches!(err, CertGenError::InvalidInput(_)));
        assert!(!paths.pem.exists());
    }

    #[test]
    fn relative_and_bare_names_resolve_alike() {
        assert_eq!(resolve(Path::new("cert.pem")), resolve(Path::new("./cert.pem")));
    }

    #[test]
    fn oversized_pem_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths {
            pem: dir.path().join("cert.pem"),
            der: Some(dir.path().join("cert.der")),
        };
        let err = write_certificate(FAKE_DER, &paths, 16).unwrap_err();
        assert!(matches!(err, CertGenError::BufferTooSmall { .. }));
        assert!(!paths.pem.exists());
        assert!(!paths.der.unwrap().exists());
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let paths = OutputPaths::pem_only("/nonexistent/dir/cert.pem");
        let err = write_certificate(FAKE_DER, &paths, 4096).unwrap_err();
        assert!(matches!(err, CertGenError::Io { .. }));
    }
}
