//! Validation of mount-relative file names given on the command line.

use std::path::Path;

use crate::error::InputError;

/// Extension required for database files.
pub const DB_EXTENSION: &str = "db";
/// Extension required for DBML schema files.
pub const DBML_EXTENSION: &str = "dbml";

/// Checks that `name` is a bare file name (no directory part) with the given
/// extension.
///
/// # Arguments
/// * `name` - File name relative to the mount directory
/// * `extension` - Required extension, without the dot
///
/// # Returns
/// `Result<&str, InputError>` echoing `name` on success.
pub fn validate_bare_filename<'a>(
    name: &'a str,
    extension: &'static str,
) -> Result<&'a str, InputError> {
    let path = Path::new(name);

    if path.extension().and_then(|e| e.to_str()) != Some(extension) {
        return Err(InputError::WrongExtension {
            name: name.to_string(),
            expected: extension,
        });
    }

    let has_dir = path
        .parent()
        .is_some_and(|parent| !parent.as_os_str().is_empty());
    if has_dir {
        return Err(InputError::NotBareFilename {
            name: name.to_string(),
        });
    }

    Ok(name)
}

/// File name without its extension.
pub fn file_stem(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
}
