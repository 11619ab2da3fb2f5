use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stretch_core::errors::ErrorInfo;
use stretch_core::SamplerError;

use crate::chain::ChainStore;

/// Dense row-major array written to disk with `bincode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayFile {
    /// Array shape, outermost axis first.
    pub shape: Vec<usize>,
    /// Row-major values.
    pub data: Vec<f64>,
}

impl ArrayFile {
    /// Encodes the array to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SamplerError> {
        bincode::serialize(self).map_err(|err| SamplerError::serde("array-serialize", err))
    }

    /// Decodes an array and checks that the shape matches the data length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SamplerError> {
        let array: ArrayFile = bincode::deserialize(bytes)
            .map_err(|err| SamplerError::serde("array-deserialize", err))?;
        let expected: usize = array.shape.iter().product();
        if expected != array.data.len() {
            return Err(SamplerError::Serde(
                ErrorInfo::new("array-shape", "array shape does not match its data length")
                    .with_context("shape", format!("{:?}", array.shape))
                    .with_context("len", array.data.len()),
            ));
        }
        Ok(array)
    }
}

/// Paths produced by [`write_chain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedFiles {
    /// `<basename>_chain.<ext>`: shape `(dimension, walkers * saved_steps)`.
    pub chain: PathBuf,
    /// `<basename>_lnprob.<ext>`: shape `(walkers * saved_steps,)`.
    pub ln_prob: PathBuf,
}

/// Writes the flattened chain and log-posterior next to each other.
///
/// `basename` may include a directory; it is created when missing.
pub fn write_chain(
    basename: &Path,
    extension: &str,
    store: &ChainStore,
) -> Result<ExportedFiles, SamplerError> {
    let samples = store.walkers() * store.saved_steps();
    let chain = ArrayFile {
        shape: vec![store.dimension(), samples],
        data: store.flatten().concat(),
    };
    let ln_prob = ArrayFile {
        shape: vec![samples],
        data: store.flat_ln_posterior(),
    };
    let files = ExportedFiles {
        chain: suffixed(basename, "chain", extension),
        ln_prob: suffixed(basename, "lnprob", extension),
    };
    write_array(&files.chain, &chain)?;
    write_array(&files.ln_prob, &ln_prob)?;
    Ok(files)
}

/// Writes a single array file.
pub fn write_array(path: &Path, array: &ArrayFile) -> Result<(), SamplerError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            SamplerError::Serde(
                ErrorInfo::new("export-mkdir", err.to_string())
                    .with_context("path", parent.display()),
            )
        })?;
    }
    let bytes = array.to_bytes()?;
    fs::write(path, bytes).map_err(|err| {
        SamplerError::Serde(
            ErrorInfo::new("export-write", err.to_string()).with_context("path", path.display()),
        )
    })
}

/// Reads an array file written by [`write_array`].
pub fn read_array(path: &Path) -> Result<ArrayFile, SamplerError> {
    let bytes = fs::read(path).map_err(|err| {
        SamplerError::Serde(
            ErrorInfo::new("export-read", err.to_string()).with_context("path", path.display()),
        )
    })?;
    ArrayFile::from_bytes(&bytes)
}

fn suffixed(basename: &Path, kind: &str, extension: &str) -> PathBuf {
    let stem = basename
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    basename.with_file_name(format!("{stem}_{kind}.{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_keeps_directory() {
        let path = suffixed(Path::new("out/run.v1"), "chain", "bin");
        assert_eq!(path, PathBuf::from("out/run.v1_chain.bin"));
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let bogus = ArrayFile {
            shape: vec![2, 2],
            data: vec![1.0],
        };
        let bytes = bogus.to_bytes().unwrap();
        let err = ArrayFile::from_bytes(&bytes).unwrap_err();
        assert_eq!(err.info().code, "array-shape");
    }
}
