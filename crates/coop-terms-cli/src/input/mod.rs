pub mod file;
pub mod policy;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Typed input from `--input <file.json>` or, failing that, piped stdin.
pub fn read_input<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(file::read_json(path)?));
    }
    stdin::read_typed()
}
