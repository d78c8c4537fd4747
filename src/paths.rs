//! Destination naming and low-level file moves shared by organize and undo.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Returns true if anything, including a dangling symlink, occupies `path`.
pub(crate) fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Picks a free destination for `candidate`.
///
/// A free candidate is returned unchanged. Otherwise the current local time
/// (`HHMMSS`) is inserted between stem and extension: `report.pdf` becomes
/// `report_153245.pdf`.
pub(crate) fn free_destination(candidate: &Path) -> PathBuf {
    if !entry_exists(candidate) {
        return candidate.to_path_buf();
    }
    let stamp = chrono::Local::now().format("%H%M%S").to_string();
    disambiguate(candidate, &stamp)
}

/// Builds `<stem>_<stamp>[.ext]` next to `candidate`.
///
/// Should that name be taken too, a counter follows the stamp
/// (`report_153245_1.pdf`, `report_153245_2.pdf`, ...) until a free name is found.
pub(crate) fn disambiguate(candidate: &Path, stamp: &str) -> PathBuf {
    let stem = candidate
        .file_stem()
        .map(|s| s.to_owned())
        .unwrap_or_else(|| OsString::from("file"));
    let ext = candidate.extension().map(|e| e.to_owned());

    let build = |suffix: &str| {
        let mut name = stem.clone();
        name.push("_");
        name.push(stamp);
        name.push(suffix);
        if let Some(ref e) = ext {
            name.push(".");
            name.push(e);
        }
        candidate.with_file_name(name)
    };

    let mut dest = build("");
    let mut n: u32 = 1;
    while entry_exists(&dest) {
        dest = build(&format!("_{n}"));
        n += 1;
    }
    dest
}

/// Moves a file without ever replacing an existing entry at `to`.
///
/// Uses a rename and falls back to copy-then-delete when the paths are on
/// different filesystems. A symlink is only ever renamed; across filesystems
/// it is reported as an error rather than replaced by a copy of its target.
pub(crate) fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if entry_exists(to) {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", to.display()),
        ));
    }

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            if fs::symlink_metadata(from)?.file_type().is_symlink() {
                return Err(e);
            }
            copy_noclobber(from, to)?;
            if let Err(e) = fs::remove_file(from) {
                // Keep the original; drop the copy so the file exists exactly once.
                let _ = fs::remove_file(to);
                return Err(e);
            }
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Copies `from` to `to` through a temp file in the target directory.
///
/// `to` appears only once the copy is complete and is never overwritten. On
/// any error the temp file is removed and `to` is left as it was.
fn copy_noclobber(from: &Path, to: &Path) -> io::Result<()> {
    let dir = match to.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut source = fs::File::open(from)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    io::copy(&mut source, tmp.as_file_mut())?;
    tmp.as_file().set_permissions(source.metadata()?.permissions())?;
    tmp.as_file().sync_all()?;
    tmp.persist_noclobber(to).map_err(|e| e.error)?;
    Ok(())
}
