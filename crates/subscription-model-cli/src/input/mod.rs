pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Load a typed input from `--input <path>` or piped stdin.
pub fn load<T: DeserializeOwned>(path: Option<&str>) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        file::read_input(path)
    } else if let Some(data) = stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        Err("--input <file.json|file.yaml> or stdin required".into())
    }
}

/// Like [`load`], but falls back to `T::default()` when neither is given.
pub fn load_or_default<T: DeserializeOwned + Default>(
    path: Option<&str>,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        file::read_input(path)
    } else if let Some(data) = stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        Ok(T::default())
    }
}
