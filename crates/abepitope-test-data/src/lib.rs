//! abepitope-test-data
//!
//! Structure and model fixtures embedded in the crate for use in testing.
//!
//! The fixtures are represented as `TestFile` objects which package the raw file contents
//! and create temporary files for programs to operate on.
use std::fs;
use std::path::Path;
use tempfile::{Builder, NamedTempFile};

#[derive(Debug)]
/// Test File
///
/// Example usage:
///
/// ```ignore
/// // returns (filepath, _tempfile_handle).
/// // _handle ensures the tempfile remains in scope
/// use abepitope_test_data::TestFile;
/// let (complex_file, _temp) = TestFile::abag_complex().create_temp().unwrap();
/// ```
pub struct TestFile {
    filebinary: &'static [u8],
    name: &'static str,
    suffix: &'static str,
}

impl TestFile {
    /// Heavy chain `H`, light chain `L` and antigen chain `A`.
    ///
    /// Antigen residues A10 and A11 sit within 4 Å of the antibody,
    /// A12 and A13 are far away. A water (chain `W`) is included and
    /// should never show up as a protein chain.
    pub fn abag_complex() -> Self {
        Self {
            filebinary: include_bytes!("../data/structures/abag_complex.pdb"),
            name: "abag_complex",
            suffix: "pdb",
        }
    }
    /// Single-domain antibody: heavy chain `H` and antigen chain `A`.
    pub fn nanobody_complex() -> Self {
        Self {
            filebinary: include_bytes!("../data/structures/nanobody_complex.pdb"),
            name: "nanobody_complex",
            suffix: "pdb",
        }
    }
    /// Antigen chain only. Not a valid antibody-antigen complex.
    pub fn single_chain() -> Self {
        Self {
            filebinary: include_bytes!("../data/structures/single_chain.pdb"),
            name: "single_chain",
            suffix: "pdb",
        }
    }

    /// ONNX model with the scoring signature (opset 13):
    ///
    /// * `residue_scores = sigmoid(mean(features, axis 2))`
    /// * `abepiscore = mean(epitope_mask, axis 1)`
    /// * `abepitarget = max(epitope_mask, axis 1)`
    pub fn mask_scorer_onnx() -> Self {
        Self {
            filebinary: include_bytes!("../data/models/mask_scorer.onnx"),
            name: "mask_scorer",
            suffix: "onnx",
        }
    }

    pub fn create_temp(&self) -> std::io::Result<(String, NamedTempFile)> {
        let temp = Builder::new()
            .suffix(&format!(".{}", self.suffix))
            .tempfile()?;

        fs::write(&temp, self.filebinary)?;
        let path = temp.path().to_string_lossy().into_owned();

        Ok((path, temp))
    }

    /// Write the fixture into `dir` under its own name, e.g. `abag_complex.pdb`.
    ///
    /// Useful when the file stem matters, as it names the encoding and the output rows.
    pub fn write_to(&self, dir: &Path) -> std::io::Result<std::path::PathBuf> {
        let path = dir.join(format!("{}.{}", self.name, self.suffix));
        fs::write(&path, self.filebinary)?;
        Ok(path)
    }
}
