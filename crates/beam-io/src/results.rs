//! Small result and settings files.
//!
//! The convergence sweep persists one float per resolution as plain text;
//! study settings round-trip through pretty JSON.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{IoError, Result};

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Write a single float as text.
pub fn write_scalar_result(path: impl AsRef<Path>, value: f64) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    fs::write(path, format!("{}", value))?;
    Ok(())
}

/// Read back a file written by [`write_scalar_result`].
pub fn read_scalar_result(path: impl AsRef<Path>) -> Result<f64> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    text.trim().parse::<f64>().map_err(|err| {
        IoError::InvalidData(format!("{}: not a float ({})", path.display(), err))
    })
}

pub fn save_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let bytes = serde_json::to_vec_pretty(value)?;
    fs::write(path, bytes)?;
    Ok(())
}

pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::FileNotFound(path.display().to_string()));
    }
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde::Deserialize;

    #[test]
    fn scalar_result_is_a_single_float() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beam").join("displacement_99.txt");

        write_scalar_result(&path, -0.012345678901234).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert_relative_eq!(read_scalar_result(&path).unwrap(), -0.012345678901234);
    }

    #[test]
    fn json_round_trip() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Settings {
            steps: usize,
            force: [f64; 3],
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            steps: 10,
            force: [0.0, -2000.0, 0.0],
        };
        save_json(&path, &settings).unwrap();
        let loaded: Settings = load_json(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn load_json_missing_file() {
        let err = load_json::<Vec<f64>>("/no/such/settings.json").unwrap_err();
        assert!(matches!(err, IoError::FileNotFound(_)));
    }
}
