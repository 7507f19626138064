use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use prettyplease::unparse;
use proc_macro2::TokenStream;
use syn::{File as SynFile, parse2};

use crate::error::SqlTypegenError;

/// First line of every generated file; also how generated files are recognised.
pub const HEADER: &str = "// WARNING: Auto-generated code. DO NOT EDIT!\n";

/// Format generated tokens as a source file.
///
/// # Errors
/// Returns `SqlTypegenError::GenerationError` if the tokens are not a valid file.
pub fn render(tokens: TokenStream) -> Result<String, SqlTypegenError> {
    let file: SynFile = parse2(tokens).map_err(|e| {
        SqlTypegenError::GenerationError(format!("generated code does not parse: {e}"))
    })?;
    Ok(format!("{HEADER}\n{}", unparse(&file)))
}

/// Write `text` to `path` unless the file already holds exactly that text.
///
/// Returns whether the file was written.
///
/// # Errors
/// Returns `SqlTypegenError::IoError` on filesystem failure.
pub fn write_if_changed(path: &Path, text: &str) -> Result<bool, SqlTypegenError> {
    if fs::read_to_string(path).is_ok_and(|existing| existing == text) {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)?;
    Ok(true)
}

/// Delete a generated file. Returns `false` if there was nothing to delete.
///
/// # Errors
/// Returns `SqlTypegenError::IoError` for failures other than a missing file.
pub fn remove(path: &Path) -> Result<bool, SqlTypegenError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// True if the file at `path` starts with [`HEADER`].
#[must_use]
pub fn is_generated(path: &Path) -> bool {
    fs::read_to_string(path).is_ok_and(|text| text.starts_with(HEADER))
}
