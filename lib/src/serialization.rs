//! Byte-level persistence of stats snapshots and learned factors.
//!
//! Persisted types hold only plain numeric data (`Vec<f32>`, `Vec<f64>`,
//! scalars); raw training sets are never written.

use std::path::Path;

use crate::error::{FactorError, Result};

/// Parameter representations that can be serialized to and from bytes.
pub trait SerializableParams: Sized {
    /// Serialize the parameters into a byte buffer.
    fn to_bytes(&self) -> Result<Vec<u8>>;

    /// Deserialize the parameters from a byte buffer.
    fn from_bytes(bytes: &[u8]) -> Result<Self>;
}

impl<T> SerializableParams for T
where
    T: serde::Serialize + for<'de> serde::Deserialize<'de>,
{
    fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// File round trip for anything with a byte representation.
///
/// The format is opaque binary; `load_from_file(save_to_file(x)) == x`.
pub trait Persist: SerializableParams {
    /// Save to `path`, replacing any existing file.
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Load from a file written by [`Persist::save_to_file`].
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
            .map_err(|e| FactorError::Serialization(format!("corrupt snapshot: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        values: Vec<f32>,
        scale: f64,
    }

    impl Persist for Sample {}

    #[test]
    fn test_bytes_roundtrip() {
        let sample = Sample {
            values: vec![0.5, 1.5],
            scale: 3.25,
        };
        let bytes = sample.to_bytes().unwrap();
        assert_eq!(Sample::from_bytes(&bytes).unwrap(), sample);
    }

    #[test]
    fn test_file_roundtrip() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let sample = Sample {
            values: vec![1.0, 2.0, 3.0],
            scale: -0.5,
        };
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("sample.bin");

        sample.save_to_file(&path)?;
        let loaded = Sample::load_from_file(&path)?;

        assert_eq!(loaded, sample);
        Ok(())
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = Sample::load_from_file(tmp.path().join("absent.bin")).unwrap_err();
        assert!(matches!(err, FactorError::Io(_)));
    }

    #[test]
    fn test_load_garbage_is_serialization_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("garbage.bin");
        std::fs::write(&path, [0xffu8; 3]).unwrap();

        let err = Sample::load_from_file(&path).unwrap_err();
        assert!(matches!(err, FactorError::Serialization(_)));
    }
}
