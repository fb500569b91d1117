use crate::domain::DeclaredVersion;
use crate::error::{Result, VertagError};
use std::fs;
use std::path::Path;

/// Default name of the per-module version file
pub const DEFAULT_VERSION_FILE: &str = "VERSION";

/// Read the trimmed contents of a module's version file.
///
/// # Arguments
/// * `module_dir` - Directory of the module
/// * `file_name` - Name of the version file inside it (usually `VERSION`)
///
/// # Returns
/// * `Ok(String)` - File contents without surrounding whitespace
/// * `Err` - If the file is absent or unreadable
pub fn read_version_file(module_dir: &Path, file_name: &str) -> Result<String> {
    let path = module_dir.join(file_name);
    let module = module_name(module_dir);

    let contents = fs::read_to_string(&path)
        .map_err(|e| VertagError::version_file(module, format!("{}: {}", path.display(), e)))?;

    Ok(contents.trim().to_string())
}

/// Read and parse a module's declared `MAJOR.MINOR` version
pub fn read_declared_version(module_dir: &Path, file_name: &str) -> Result<DeclaredVersion> {
    let text = read_version_file(module_dir, file_name)?;

    DeclaredVersion::parse(&text).ok_or_else(|| {
        VertagError::version_file(
            module_name(module_dir),
            format!("'{}' is not a MAJOR.MINOR version", text),
        )
    })
}

fn module_name(module_dir: &Path) -> String {
    module_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| module_dir.display().to_string())
}
