//! Temporary files for one job in the shared storage directory.
//!
//! Every job gets its own UUIDv7 (millisecond timestamp plus random bits),
//! so concurrent jobs share the directory without any locking.

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::CourierError;
use crate::job::StagedHtml;

/// Check that the storage directory is configured, exists and is writable.
pub fn validate_storage_dir(path: Option<&Path>) -> Result<&Path, CourierError> {
    let path = path.ok_or_else(|| {
        CourierError::Configuration("a storage path has not been set".to_string())
    })?;

    let metadata = fs::metadata(path).map_err(|_| not_writable(path))?;
    if !metadata.is_dir() || metadata.permissions().readonly() || !can_create_files(path) {
        return Err(not_writable(path));
    }
    Ok(path)
}

/// Whether this process may create entries in `dir`, as the kernel sees it
/// (owner, group, ACLs, read-only mounts).
#[cfg(unix)]
fn can_create_files(dir: &Path) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let Ok(dir) = CString::new(dir.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: `dir` is a valid NUL-terminated string for the whole call.
    unsafe { libc::access(dir.as_ptr(), libc::W_OK | libc::X_OK) == 0 }
}

#[cfg(not(unix))]
fn can_create_files(_dir: &Path) -> bool {
    true
}

fn not_writable(path: &Path) -> CourierError {
    CourierError::Configuration(format!(
        "the storage path {} is not a writable directory",
        path.display()
    ))
}

/// Header, footer, content and output paths sharing one job id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempFileSet {
    id: String,
    header: PathBuf,
    footer: PathBuf,
    content: PathBuf,
    pdf: PathBuf,
}

impl TempFileSet {
    /// Derive a fresh set of paths under `dir`.
    pub fn generate(dir: &Path) -> Self {
        Self::with_id(dir, Uuid::now_v7().simple().to_string())
    }

    pub fn with_id(dir: &Path, id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            header: dir.join(format!("header-{id}.html")),
            footer: dir.join(format!("footer-{id}.html")),
            content: dir.join(format!("content-{id}.html")),
            pdf: dir.join(format!("pdf-{id}.pdf")),
            id,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn header(&self) -> &Path {
        &self.header
    }

    pub fn footer(&self) -> &Path {
        &self.footer
    }

    pub fn content(&self) -> &Path {
        &self.content
    }

    pub fn pdf(&self) -> &Path {
        &self.pdf
    }

    pub fn write_html(&self, html: &StagedHtml) -> Result<(), CourierError> {
        for (path, text) in [
            (&self.header, &html.header),
            (&self.footer, &html.footer),
            (&self.content, &html.content),
        ] {
            fs::write(path, text).map_err(|e| CourierError::filesystem(path, e))?;
        }
        Ok(())
    }

    /// Best-effort removal of the three HTML files.
    pub fn remove_html(&self) {
        for path in [&self.header, &self.footer, &self.content] {
            remove_quietly(path);
        }
    }

    /// Best-effort removal of a partially written PDF.
    pub fn discard_pdf(&self) {
        if self.pdf.exists() {
            remove_quietly(&self.pdf);
        }
    }

    /// Move the rendered PDF to `destination`.
    pub fn promote(&self, destination: &Path) -> Result<(), CourierError> {
        fs::rename(&self.pdf, destination).map_err(|e| CourierError::filesystem(destination, e))
    }
}

fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        log::warn!("Could not remove temporary file {}: {e}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn paths_share_one_id() {
        let files = TempFileSet::with_id(Path::new("/srv/tmp"), "abc");
        assert_eq!(files.header(), Path::new("/srv/tmp/header-abc.html"));
        assert_eq!(files.footer(), Path::new("/srv/tmp/footer-abc.html"));
        assert_eq!(files.content(), Path::new("/srv/tmp/content-abc.html"));
        assert_eq!(files.pdf(), Path::new("/srv/tmp/pdf-abc.pdf"));
    }

    #[test]
    fn generated_ids_are_unique() {
        let ids: HashSet<String> = (0..1000)
            .map(|_| TempFileSet::generate(Path::new("/tmp")).id().to_string())
            .collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn unset_storage_path_is_rejected() {
        assert!(matches!(
            validate_storage_dir(None),
            Err(CourierError::Configuration(_))
        ));
    }

    #[test]
    fn missing_storage_path_is_rejected() {
        assert!(matches!(
            validate_storage_dir(Some(Path::new("/no/such/courier/dir"))),
            Err(CourierError::Configuration(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn directory_writable_only_by_others_is_rejected() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().join("shared");
        fs::create_dir(&storage).unwrap();
        // Owner (this process) may not write; everyone else may.
        fs::set_permissions(&storage, fs::Permissions::from_mode(0o577)).unwrap();
        assert!(!fs::metadata(&storage).unwrap().permissions().readonly());

        let result = validate_storage_dir(Some(&storage));
        fs::set_permissions(&storage, fs::Permissions::from_mode(0o755)).unwrap();

        // The superuser bypasses permission bits, so the directory is usable.
        if unsafe { libc::geteuid() } == 0 {
            assert!(result.is_ok());
        } else {
            assert!(matches!(result, Err(CourierError::Configuration(_))));
        }
    }

    #[cfg(unix)]
    #[test]
    fn read_only_bits_are_rejected_even_for_the_superuser() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o555)).unwrap();
        let result = validate_storage_dir(Some(dir.path()));
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o755)).unwrap();
        assert!(matches!(result, Err(CourierError::Configuration(_))));
    }

    #[test]
    fn write_promote_and_clean_up() {
        let dir = tempfile::tempdir().unwrap();
        let files = TempFileSet::generate(dir.path());
        files
            .write_html(&StagedHtml {
                header: "h".into(),
                footer: "f".into(),
                content: "c".into(),
            })
            .unwrap();
        assert_eq!(fs::read_to_string(files.content()).unwrap(), "c");

        fs::write(files.pdf(), b"%PDF-1.4").unwrap();
        let destination = dir.path().join("out.pdf");
        files.promote(&destination).unwrap();
        files.remove_html();

        let left: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(left, vec![std::ffi::OsString::from("out.pdf")]);
    }
}
