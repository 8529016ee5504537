pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Load a run document from `--input`, falling back to piped stdin.
pub fn read_document<T: DeserializeOwned>(
    path: Option<&str>,
    what: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        file::read_document(path)
    } else if let Some(value) = stdin::read_stdin()? {
        Ok(value)
    } else {
        Err(format!("--input <run.json|run.yaml> or stdin required for {what}").into())
    }
}
