//! Filesystem helpers shared by the local providers.

use crate::core::Artifact;
use crate::errors::{ArtifactSourceDoesNotExistError, Result, SourceKind};
use crate::utils::{format_iso8601, from_system_time};
use std::ffi::{OsStr, OsString};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

/// Metadata key: the entry name relative to the provider source.
pub const META_FILE_NAME: &str = "file_name";
/// Metadata key: payload size in bytes.
pub const META_SIZE_BYTES: &str = "size_bytes";
/// Metadata key: last modification time, RFC 3339.
pub const META_MODIFIED_AT: &str = "modified_at";
/// Metadata key: SHA-256 hex digest of the payload.
pub const META_CONTENT_HASH: &str = "content_hash";

/// Makes `path` absolute against the working directory.
pub(crate) fn absolute_path(path: &Path) -> Result<PathBuf> {
    let base = std::env::current_dir()?;
    Ok(absolutize(&base, path))
}

/// Joins a relative `path` onto `base` and normalizes `.` and `..` lexically.
///
/// Symlinks are left unresolved, so identifiers keep the caller's spelling.
pub(crate) fn absolutize(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Checks that `path` exists and is of the `expected` kind.
pub(crate) fn ensure_source(path: &Path, expected: SourceKind) -> Result<()> {
    // Any metadata failure means the source is not accessible to us.
    let Ok(meta) = fs::metadata(path) else {
        return Err(ArtifactSourceDoesNotExistError::not_found(path, expected).into());
    };

    let matches = match expected {
        SourceKind::Directory => meta.is_dir(),
        SourceKind::File => meta.is_file(),
    };
    if !matches {
        return Err(ArtifactSourceDoesNotExistError::wrong_kind(path, expected).into());
    }
    Ok(())
}

/// Returns the UTF-8 file name of `path`.
pub(crate) fn utf8_file_name(path: &Path) -> io::Result<String> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no file name", path.display()),
        )
    })?;
    name.to_str().map(str::to_string).ok_or_else(|| non_utf8(name))
}

fn non_utf8(name: &OsStr) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("file name {name:?} is not valid UTF-8"),
    )
}

/// Lazily lists the names of the entries directly inside `dir`.
///
/// Entries are not inspected: subdirectories and symlinks, dangling or not,
/// are listed like files. Order is the platform's.
pub(crate) fn list_names(dir: &Path) -> Result<impl Iterator<Item = io::Result<OsString>>> {
    let read_dir = fs::read_dir(dir)?;
    Ok(read_dir.map(|entry| entry.map(|e| e.file_name())))
}

/// Converts one listed name to UTF-8.
///
/// A non-UTF-8 name fails as `InvalidData` for that entry alone.
pub(crate) fn entry_name(name: OsString) -> Result<String> {
    name.into_string().map_err(|name| non_utf8(&name).into())
}

/// Resolves an entry name under `root`, refusing names that leave it.
///
/// `.` components are dropped so the result matches enumerated identifiers.
pub(crate) fn entry_path(root: &Path, name: &str) -> io::Result<PathBuf> {
    let mut path = root.to_path_buf();
    let mut pushed = false;
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => {
                path.push(part);
                pushed = true;
            }
            Component::CurDir => {}
            _ => return Err(outside_root(root, name)),
        }
    }
    if !pushed {
        return Err(outside_root(root, name));
    }
    Ok(path)
}

fn outside_root(root: &Path, name: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("entry name '{name}' is not relative to {}", root.display()),
    )
}

/// Reads the file at `path` into an artifact with file metadata.
///
/// The handle is scoped to this call and closed on every exit path.
pub(crate) fn read_artifact(path: &Path, name: &str) -> Result<Artifact> {
    let mut file = File::open(path)?;
    let meta = file.metadata()?;
    if !meta.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a regular file", path.display()),
        )
        .into());
    }

    let mut payload = Vec::with_capacity(usize::try_from(meta.len()).unwrap_or(0));
    file.read_to_end(&mut payload)?;
    drop(file);

    let size = payload.len();
    let identifier = path.to_string_lossy().into_owned();
    let mut artifact = Artifact::with_payload(identifier, payload)
        .with_metadata(META_FILE_NAME, serde_json::json!(name))
        .with_metadata(META_SIZE_BYTES, serde_json::json!(size));

    if let Ok(modified) = meta.modified() {
        let modified = format_iso8601(&from_system_time(modified));
        artifact = artifact.with_metadata(META_MODIFIED_AT, serde_json::json!(modified));
    }
    if let Some(hash) = artifact.content_hash() {
        artifact = artifact.with_metadata(META_CONTENT_HASH, serde_json::json!(hash));
    }

    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_absolutize_relative() {
        let base = Path::new("/work/run");
        assert_eq!(absolutize(base, Path::new("foo")), PathBuf::from("/work/run/foo"));
        assert_eq!(absolutize(base, Path::new("folder/")), PathBuf::from("/work/run/folder"));
        assert_eq!(absolutize(base, Path::new("./a/../b")), PathBuf::from("/work/run/b"));
        assert_eq!(absolutize(base, Path::new("../up")), PathBuf::from("/work/up"));
    }

    #[test]
    fn test_absolutize_absolute_ignores_base() {
        let base = Path::new("/work");
        assert_eq!(absolutize(base, Path::new("/data/./x")), PathBuf::from("/data/x"));
    }

    #[test]
    fn test_entry_path_rejects_escapes() {
        let root = Path::new("/data");
        assert_eq!(entry_path(root, "foo.bar").unwrap(), PathBuf::from("/data/foo.bar"));

        for bad in ["", ".", "../etc/passwd", "/etc/passwd", "a/../../b"] {
            let err = entry_path(root, bad).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput, "{bad}");
        }
    }

    #[test]
    fn test_entry_path_drops_cur_dir() {
        let root = Path::new("/data");
        assert_eq!(entry_path(root, "./foo.bar").unwrap(), PathBuf::from("/data/foo.bar"));
        assert_eq!(entry_path(root, "a/./b").unwrap(), PathBuf::from("/data/a/b"));
        assert_eq!(
            entry_path(root, "./foo.bar").unwrap().to_string_lossy(),
            root.join("foo.bar").to_string_lossy()
        );
    }

    #[test]
    fn test_ensure_source_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        fs::write(&file, "x").unwrap();

        assert!(ensure_source(dir.path(), SourceKind::Directory).is_ok());
        assert!(ensure_source(&file, SourceKind::File).is_ok());
        assert!(ensure_source(&file, SourceKind::Directory).unwrap_err().is_source_missing());
        assert!(ensure_source(dir.path(), SourceKind::File).unwrap_err().is_source_missing());
        assert!(ensure_source(&dir.path().join("nope"), SourceKind::Directory)
            .unwrap_err()
            .is_source_missing());
    }

    #[test]
    fn test_list_names_includes_every_entry() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a"), "1").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("nested"), "2").unwrap();

        let mut names: Vec<String> = list_names(dir.path())
            .unwrap()
            .map(|name| entry_name(name.unwrap()))
            .collect::<Result<_>>()
            .unwrap();
        names.sort();
        assert_eq!(names, vec!["a".to_string(), "sub".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_entry_name_rejects_non_utf8() {
        use std::os::unix::ffi::OsStringExt;

        assert_eq!(entry_name(OsString::from("ok")).unwrap(), "ok");
        let err = entry_name(OsString::from_vec(b"bad\xFF".to_vec())).unwrap_err();
        assert_eq!(err.io_kind(), Some(io::ErrorKind::InvalidData));
    }

    #[test]
    fn test_read_artifact_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foo.baz");
        fs::write(&path, "helloworld").unwrap();

        let artifact = read_artifact(&path, "foo.baz").unwrap();

        assert_eq!(artifact.identifier, path.to_string_lossy());
        assert_eq!(artifact.payload_utf8(), Some("helloworld"));
        assert_eq!(artifact.metadata[META_FILE_NAME], serde_json::json!("foo.baz"));
        assert_eq!(artifact.metadata[META_SIZE_BYTES], serde_json::json!(10));
        assert_eq!(
            artifact.metadata[META_CONTENT_HASH],
            serde_json::json!("936a185caaa266bb9cbe981e9e05cb78cd732b0b3280eb944412bb6f8f8f07af")
        );
        assert!(artifact.metadata.contains_key(META_MODIFIED_AT));
    }

    #[test]
    fn test_read_artifact_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let err = read_artifact(&dir.path().join("sub"), "sub").unwrap_err();
        assert_eq!(err.io_kind(), Some(io::ErrorKind::InvalidInput));
    }

    #[test]
    fn test_read_artifact_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_artifact(&dir.path().join("gone"), "gone").unwrap_err();
        assert_eq!(err.io_kind(), Some(io::ErrorKind::NotFound));
    }
}
