//! Crash-safe whole-file writes.
//!
//! Data lands in a uniquely named sibling temp file, is synced, and is then
//! renamed over the target so readers never observe a partial file.

use std::{
    io::{self, Write},
    path::Path,
};

use rand::TryRngCore;

const CREATE_ATTEMPTS: usize = 5;

/// Replace `path` with `data` atomically.
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| io::Error::other("target path has no parent directory"))?;
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("target path has no file name"))?;

    let mut last_err = None;
    for _ in 0..CREATE_ATTEMPTS {
        let tmp_path = dir.join(format!(
            ".{}.tmp-{}",
            file_name.to_string_lossy(),
            random_suffix()?
        ));
        let mut file = match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
        {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                last_err = Some(err);
                continue;
            }
            Err(err) => return Err(err),
        };

        let written = file.write_all(data).and_then(|()| file.sync_all());
        drop(file);
        if let Err(err) = written.and_then(|()| replace_file(&tmp_path, path)) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(err);
        }
        sync_dir(dir)?;
        return Ok(());
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!(
            "failed to create temporary file for {}: {}",
            path.display(),
            last_err
                .map(|err| err.to_string())
                .unwrap_or_else(|| "unknown error".into())
        ),
    ))
}

fn random_suffix() -> io::Result<String> {
    let mut bytes = [0u8; 6];
    rand::rngs::OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|err| io::Error::other(format!("failed to generate temp suffix: {err}")))?;
    Ok(bytes.iter().map(|b| format!("{b:02x}")).collect())
}

fn replace_file(temp_path: &Path, path: &Path) -> io::Result<()> {
    match std::fs::rename(temp_path, path) {
        Ok(()) => Ok(()),
        #[cfg(target_os = "windows")]
        Err(err)
            if err.kind() == io::ErrorKind::AlreadyExists
                || err.kind() == io::ErrorKind::PermissionDenied =>
        {
            if let Err(inner) = std::fs::remove_file(path)
                && inner.kind() != io::ErrorKind::NotFound
            {
                return Err(inner);
            }
            std::fs::rename(temp_path, path)
        }
        Err(err) => Err(err),
    }
}

fn sync_dir(dir: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        std::fs::File::open(dir)?.sync_all()?;
    }
    #[cfg(not(unix))]
    {
        let _ = dir;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn overwrites_existing_file_without_leftovers() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("out.json");
        std::fs::write(&target, b"old").unwrap();

        write_atomic(&target, b"new contents").unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"new contents");
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
