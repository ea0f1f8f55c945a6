//! Study settings files.
//!
//! Every study has a `Default` configuration; a JSON file may override any
//! subset of its fields.

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// Defaults, or the JSON file at `path` layered over them
pub fn load_config<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match path {
        Some(path) => {
            log::info!("loading settings from {}", path.display());
            Ok(beam_io::load_json(path)?)
        }
        None => Ok(T::default()),
    }
}

/// Write `config` as pretty JSON.
pub fn save_config<T: Serialize>(path: &Path, config: &T) -> Result<()> {
    beam_io::save_json(path, config)?;
    Ok(())
}
