use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, warn};

use crate::category::suffixed_name;
use crate::config::RenamePolicy;
use crate::error::Error;

/// Pick the name a file will get inside `dir`.
///
/// With `keep_original` the file's own name is used when free. Otherwise (or
/// when it is taken) a `_N` name is synthesized according to `policy`. A name
/// is free when `is_registered` rejects it and nothing other than `source`
/// exists at that path. Existing files are never overwritten.
pub fn resolve_name<F>(
    dir: &Path,
    name: &str,
    keep_original: bool,
    policy: RenamePolicy,
    source: &Path,
    is_registered: F,
) -> Result<String, Error>
where
    F: Fn(&str) -> bool,
{
    let is_free = |candidate: &str| {
        if is_registered(candidate) {
            return false;
        }
        let target = dir.join(candidate);
        target == source || fs::symlink_metadata(&target).is_err()
    };

    if keep_original && is_free(name) {
        return Ok(name.to_string());
    }

    match policy {
        RenamePolicy::Fixed => {
            let candidate = suffixed_name(name, 1);
            if is_free(candidate.as_str()) {
                Ok(candidate)
            } else {
                Err(Error::NameCollision {
                    name: candidate,
                    dir: dir.to_path_buf(),
                })
            }
        }
        RenamePolicy::Increment => (1..=u32::MAX)
            .map(|n| suffixed_name(name, n))
            .find(|candidate| is_free(candidate.as_str()))
            .ok_or_else(|| Error::NameCollision {
                name: name.to_string(),
                dir: dir.to_path_buf(),
            }),
    }
}

/// Move `from` to `to`, creating the destination directory as needed.
///
/// Falls back to copy-then-remove when a plain rename fails (e.g. across
/// filesystems). The source is only removed once the copy has succeeded.
pub fn move_file(from: &Path, to: &Path) -> Result<(), Error> {
    if from == to {
        return Ok(());
    }

    let move_error = |source: io::Error| Error::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(move_error)?;
    }

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Err(move_error(err)),
        Err(err) => {
            debug!(
                "Rename {} -> {} failed ({}), copying instead",
                from.display(),
                to.display(),
                err
            );
            copy_then_remove(from, to).map_err(move_error)
        }
    }
}

fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    if let Err(err) = fs::copy(from, to) {
        let _ = fs::remove_file(to);
        return Err(err);
    }

    if let Err(err) = fs::remove_file(from) {
        warn!(
            "Copied {} to {} but could not remove the source: {}",
            from.display(),
            to.display(),
            err
        );
    }
    Ok(())
}
