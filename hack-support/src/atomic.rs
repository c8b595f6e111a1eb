//! Atomic, all-or-nothing file output.
//!
//! Each compilation stage writes its result to a temporary file in the
//! destination directory and renames it into place only once the output is
//! known-good. A stage that fails midway through emission never leaves a
//! truncated `.vm`/`.asm`/`.hack` file where the caller might mistake it for
//! a finished artifact.

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Writes `contents` to `dest` atomically.
///
/// Creates a [`NamedTempFile`] alongside `dest` (so the final rename stays
/// on the same filesystem), writes the full contents, then persists it to
/// `dest`. On any error the temp file is dropped and `dest` is left
/// untouched — whatever was there before (including nothing) survives.
pub fn write_atomic(dest: &Path, contents: &str) -> io::Result<()> {
    let parent = dest.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = match parent {
        Some(dir) => NamedTempFile::new_in(dir)?,
        None => NamedTempFile::new()?,
    };
    tmp.write_all(contents.as_bytes())?;
    tmp.flush()?;
    tmp.persist(dest)
        .map_err(|persist_err| persist_err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn writes_contents_to_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.hack");

        write_atomic(&dest, "0000000000000000\n").unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "0000000000000000\n");
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.hack");
        fs::write(&dest, "stale").unwrap();

        write_atomic(&dest, "fresh").unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "fresh");
    }

    #[test]
    fn leaves_no_temp_file_behind_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.hack");

        write_atomic(&dest, "contents").unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("out.hack")]);
    }
}
