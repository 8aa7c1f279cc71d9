//! Complex -> Tensor encoding and its on-disk layout.
//!
//! Every complex becomes `<name>.safetensors` in the encodings directory, holding
//!
//! * `features` `[L, 26]`: amino acid one-hot (21), chain role one-hot (3),
//!   interface flag, contact density.
//! * `interface` `[L]`: 1.0 for residues on either side of the interface.
//! * `epitope_mask` `[L]`: 1.0 for antigen residues on the interface.
//!
//! `manifest.json` lists the encoded complexes with their residue labels. Files are
//! staged in the temporary directory and only moved into place once fully written.
use crate::chains::{ChainAssignment, ChainRole};
use crate::constants::{
    aa1_to_index, CONTACT_COLUMN, CONTACT_NORMALIZER, CONTACT_RADIUS, DEFAULT_INTERFACE_CUTOFF,
    ENCODING_FORMAT, ENCODING_VERSION, INTERFACE_COLUMN, MANIFEST_FILE, NUM_FEATURES, ROLE_OFFSET,
};
use crate::error::{EpitopeError, Result};
use crate::interface::{contact_counts, epitope_flags, interface_flags};
use crate::structure::{discover_structures, Complex};
use candle_core::{Device, Tensor};
use safetensors::SafeTensors;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidueLabel {
    pub chain: String,
    pub number: isize,
    pub insertion_code: Option<String>,
    pub aa: char,
    pub role: ChainRole,
    pub interface: bool,
}

impl ResidueLabel {
    pub fn is_epitope(&self) -> bool {
        self.interface && self.role == ChainRole::Antigen
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSummary {
    pub id: String,
    pub role: ChainRole,
    pub length: usize,
}

/// Manifest entry for one encoded complex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingRecord {
    pub name: String,
    pub source: PathBuf,
    pub tensor_file: String,
    pub interface_cutoff: f32,
    pub chains: Vec<ChainSummary>,
    pub residues: Vec<ResidueLabel>,
}

impl EncodingRecord {
    pub fn epitope_count(&self) -> usize {
        self.residues.iter().filter(|res| res.is_epitope()).count()
    }
    pub fn antigen_chains(&self) -> Vec<&str> {
        self.chains
            .iter()
            .filter(|chain| chain.role == ChainRole::Antigen)
            .map(|chain| chain.id.as_str())
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    format: String,
    version: String,
    records: Vec<EncodingRecord>,
}

/// Tensors of one encoded complex.
#[derive(Debug, Clone)]
pub struct EncodedComplex {
    pub features: Tensor,
    pub interface: Tensor,
    pub epitope_mask: Tensor,
}

impl EncodedComplex {
    pub fn num_residues(&self) -> Result<usize> {
        let (residues, _) = self.features.dims2()?;
        Ok(residues)
    }

    /// Row indices of the epitope residues.
    pub fn epitope_indices(&self) -> Result<Vec<u32>> {
        Ok(self
            .epitope_mask
            .to_vec1::<f32>()?
            .into_iter()
            .enumerate()
            .filter(|(_, flag)| *flag > 0.5)
            .map(|(idx, _)| idx as u32)
            .collect())
    }

    pub fn to_device(&self, device: &Device) -> Result<Self> {
        Ok(Self {
            features: self.features.to_device(device)?,
            interface: self.interface.to_device(device)?,
            epitope_mask: self.epitope_mask.to_device(device)?,
        })
    }
}

/// Encodings present in a directory, in manifest order.
#[derive(Debug, Clone)]
pub struct EncodedSet {
    dir: PathBuf,
    records: Vec<EncodingRecord>,
}

impl EncodedSet {
    /// Rebuild the set from `dir/manifest.json`.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let manifest_path = dir.join(MANIFEST_FILE);
        if !manifest_path.exists() {
            return Err(EpitopeError::MissingEncodings(dir.to_path_buf()));
        }
        let manifest: Manifest = serde_json::from_str(&fs::read_to_string(&manifest_path)?)?;
        if manifest.format != ENCODING_FORMAT {
            return Err(EpitopeError::InvalidEncoding {
                path: manifest_path,
                reason: format!("unexpected format {}", manifest.format),
            });
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            records: manifest.records,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
    pub fn records(&self) -> &[EncodingRecord] {
        &self.records
    }
    pub fn len(&self) -> usize {
        self.records.len()
    }
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn load_tensors(&self, record: &EncodingRecord, device: &Device) -> Result<EncodedComplex> {
        let path = self.dir.join(&record.tensor_file);
        let invalid = |reason: String| EpitopeError::InvalidEncoding {
            path: path.clone(),
            reason,
        };
        let buffer = fs::read(&path)?;
        let (_, metadata) = SafeTensors::read_metadata(&buffer)?;
        let format = metadata
            .metadata()
            .as_ref()
            .and_then(|meta| meta.get("format"))
            .cloned();
        if format.as_deref() != Some(ENCODING_FORMAT) {
            return Err(invalid(format!("unexpected format {:?}", format)));
        }

        let mut tensors = candle_core::safetensors::load_buffer(&buffer, device)?;
        let mut take = |name: &str| {
            tensors
                .remove(name)
                .ok_or_else(|| invalid(format!("missing tensor {}", name)))
        };
        let encoded = EncodedComplex {
            features: take("features")?,
            interface: take("interface")?,
            epitope_mask: take("epitope_mask")?,
        };
        let dims = encoded.features.dims2()?;
        if dims != (record.residues.len(), NUM_FEATURES) {
            return Err(invalid(format!(
                "features have shape {:?}, expected ({}, {})",
                dims,
                record.residues.len(),
                NUM_FEATURES
            )));
        }
        Ok(encoded)
    }

    fn write_manifest(&self, tmpdir: &Path) -> Result<()> {
        let manifest = Manifest {
            format: ENCODING_FORMAT.to_string(),
            version: ENCODING_VERSION.to_string(),
            records: self.records.clone(),
        };
        let staged = tmpdir.join(MANIFEST_FILE);
        fs::write(&staged, serde_json::to_string_pretty(&manifest)?)?;
        move_file(&staged, &self.dir.join(MANIFEST_FILE))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncodingOptions {
    pub interface_cutoff: f32,
    pub assignment: ChainAssignment,
}

impl Default for EncodingOptions {
    fn default() -> Self {
        Self {
            interface_cutoff: DEFAULT_INTERFACE_CUTOFF,
            assignment: ChainAssignment::FileOrder,
        }
    }
}

/// Structure encoding capability.
pub trait Encoder {
    /// Encode `input` (a structure file or a directory of them) into `encdir`,
    /// using `tmpdir` for intermediate files.
    fn encode(&self, input: &Path, encdir: &Path, tmpdir: &Path) -> Result<EncodedSet>;
}

/// Encodes antibody-antigen structures into per-residue feature tensors.
#[derive(Debug, Clone, Default)]
pub struct StructureData {
    options: EncodingOptions,
}

impl StructureData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EncodingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EncodingOptions {
        &self.options
    }

    pub fn encode_proteins(&self, input: &Path, encdir: &Path, tmpdir: &Path) -> Result<EncodedSet> {
        let files = discover_structures(input)?;
        fs::create_dir_all(encdir)?;
        fs::create_dir_all(tmpdir)?;

        let mut records = Vec::with_capacity(files.len());
        for file in files {
            let complex = Complex::open(&file, &self.options.assignment)?;
            let record = self.write_complex(&complex, encdir, tmpdir)?;
            records.push(record);
        }
        let set = EncodedSet {
            dir: encdir.to_path_buf(),
            records,
        };
        set.write_manifest(tmpdir)?;
        log::info!("Encoded {} structure(s) into {}", set.len(), encdir.display());
        Ok(set)
    }

    /// Feature tensors for a complex, on the CPU.
    pub fn encode_complex(&self, complex: &Complex) -> Result<EncodedComplex> {
        let n = complex.len();
        let interface = interface_flags(complex, self.options.interface_cutoff);
        let epitope = epitope_flags(complex, &interface);
        let contacts = contact_counts(complex, CONTACT_RADIUS);

        let mut features = vec![0f32; n * NUM_FEATURES];
        for (idx, residue) in complex.residues().iter().enumerate() {
            let row = &mut features[idx * NUM_FEATURES..(idx + 1) * NUM_FEATURES];
            row[aa1_to_index(residue.aa)] = 1.0;
            row[ROLE_OFFSET + residue.role.index()] = 1.0;
            row[INTERFACE_COLUMN] = if interface[idx] { 1.0 } else { 0.0 };
            row[CONTACT_COLUMN] = contacts[idx] as f32 / CONTACT_NORMALIZER;
        }
        let as_mask = |flags: &[bool]| -> Vec<f32> {
            flags.iter().map(|&f| if f { 1.0 } else { 0.0 }).collect()
        };

        let device = Device::Cpu;
        Ok(EncodedComplex {
            features: Tensor::from_vec(features, (n, NUM_FEATURES), &device)?,
            interface: Tensor::from_vec(as_mask(&interface), (n,), &device)?,
            epitope_mask: Tensor::from_vec(as_mask(&epitope), (n,), &device)?,
        })
    }

    fn write_complex(&self, complex: &Complex, encdir: &Path, tmpdir: &Path) -> Result<EncodingRecord> {
        let name = complex.name();
        let encoded = self.encode_complex(complex)?;
        let interface = encoded
            .interface
            .to_vec1::<f32>()?
            .into_iter()
            .map(|flag| flag > 0.5);

        let record = EncodingRecord {
            name: name.to_string(),
            source: complex.source().to_path_buf(),
            tensor_file: format!("{}.safetensors", name),
            interface_cutoff: self.options.interface_cutoff,
            chains: complex
                .chains()
                .iter()
                .map(|(id, role)| ChainSummary {
                    id: id.clone(),
                    role: *role,
                    length: complex.sequence(id).len(),
                })
                .collect(),
            residues: complex
                .residues()
                .iter()
                .zip(interface)
                .map(|(res, interface)| ResidueLabel {
                    chain: res.chain_id.clone(),
                    number: res.number,
                    insertion_code: res.insertion_code.clone(),
                    aa: res.aa,
                    role: res.role,
                    interface,
                })
                .collect(),
        };
        log::info!(
            "{}: {} residues, {} epitope residues",
            name,
            complex.len(),
            record.epitope_count()
        );

        fs::write(tmpdir.join(format!("{}.fasta", name)), complex.to_fasta())?;

        let staged = tmpdir.join(&record.tensor_file);
        let metadata: HashMap<String, String> = [
            ("format", ENCODING_FORMAT),
            ("version", ENCODING_VERSION),
            ("name", name),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        safetensors::serialize_to_file(
            [
                ("features", &encoded.features),
                ("interface", &encoded.interface),
                ("epitope_mask", &encoded.epitope_mask),
            ],
            &Some(metadata),
            &staged,
        )?;
        move_file(&staged, &encdir.join(&record.tensor_file))?;
        Ok(record)
    }
}

impl Encoder for StructureData {
    fn encode(&self, input: &Path, encdir: &Path, tmpdir: &Path) -> Result<EncodedSet> {
        self.encode_proteins(input, encdir, tmpdir)
    }
}

// rename fails across filesystems
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if fs::rename(from, to).is_err() {
        fs::copy(from, to)?;
        fs::remove_file(from)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workdirs::WorkDirs;
    use abepitope_test_data::TestFile;

    fn encode_fixture(test_file: TestFile) -> (tempfile::TempDir, WorkDirs, EncodedSet) {
        let base = tempfile::tempdir().unwrap();
        let dirs = WorkDirs::under(base.path());
        dirs.ensure().unwrap();
        let pdb_file = test_file.write_to(base.path()).unwrap();
        let set = StructureData::new()
            .encode_proteins(&pdb_file, &dirs.encodings, &dirs.temporary)
            .unwrap();
        (base, dirs, set)
    }

    #[test]
    fn test_feature_layout() {
        let (pdb_file, _tmp) = TestFile::abag_complex().create_temp().unwrap();
        let complex = Complex::open(&pdb_file, &ChainAssignment::FileOrder).unwrap();
        let encoded = StructureData::new().encode_complex(&complex).unwrap();

        assert_eq!(encoded.features.dims(), &[9, NUM_FEATURES]);
        let rows = encoded.features.to_vec2::<f32>().unwrap();
        // every row has exactly one amino acid and one role
        for row in rows.iter() {
            assert_eq!(row[..ROLE_OFFSET].iter().sum::<f32>(), 1.0);
            assert_eq!(row[ROLE_OFFSET..INTERFACE_COLUMN].iter().sum::<f32>(), 1.0);
        }
        // H1 is GLY on the heavy chain
        assert_eq!(rows[0][aa1_to_index('G')], 1.0);
        assert_eq!(rows[0][ROLE_OFFSET + ChainRole::Heavy.index()], 1.0);
        // A12 is ALA on the antigen, away from the interface, with one CA neighbour
        assert_eq!(rows[7][aa1_to_index('A')], 1.0);
        assert_eq!(rows[7][ROLE_OFFSET + ChainRole::Antigen.index()], 1.0);
        assert_eq!(rows[7][INTERFACE_COLUMN], 0.0);
        assert_eq!(rows[7][CONTACT_COLUMN], 1.0 / CONTACT_NORMALIZER);

        assert_eq!(encoded.epitope_indices().unwrap(), vec![5, 6]);
    }

    #[test]
    fn test_encode_writes_artifacts() {
        let (_base, dirs, set) = encode_fixture(TestFile::abag_complex());

        assert_eq!(set.len(), 1);
        assert!(dirs.encodings.join("abag_complex.safetensors").exists());
        assert!(dirs.encodings.join(MANIFEST_FILE).exists());
        assert!(dirs.temporary.join("abag_complex.fasta").exists());
        // staged tensor file has been moved out of the temporary directory
        assert!(!dirs.temporary.join("abag_complex.safetensors").exists());
        assert!(!dirs.temporary.join(MANIFEST_FILE).exists());

        let record = &set.records()[0];
        assert_eq!(record.epitope_count(), 2);
        assert_eq!(record.antigen_chains(), vec!["A"]);
        assert_eq!(record.residues.len(), 9);
    }

    #[test]
    fn test_reload_from_manifest() {
        let (_base, dirs, set) = encode_fixture(TestFile::abag_complex());
        let reloaded = EncodedSet::load(&dirs.encodings).unwrap();
        assert_eq!(reloaded.records(), set.records());

        let encoded = reloaded
            .load_tensors(&reloaded.records()[0], &Device::Cpu)
            .unwrap();
        assert_eq!(encoded.num_residues().unwrap(), 9);
        assert_eq!(encoded.epitope_indices().unwrap(), vec![5, 6]);
    }

    #[test]
    fn test_encode_twice() {
        let (base, dirs, _) = encode_fixture(TestFile::nanobody_complex());
        let pdb_file = base.path().join("nanobody_complex.pdb");
        let again = StructureData::new()
            .encode_proteins(&pdb_file, &dirs.encodings, &dirs.temporary)
            .unwrap();
        assert_eq!(again.len(), 1);
        assert_eq!(again.records()[0].chains.len(), 2);
    }

    #[test]
    fn test_encode_directory() {
        let base = tempfile::tempdir().unwrap();
        let inputs = base.path().join("inputs");
        std::fs::create_dir(&inputs).unwrap();
        TestFile::abag_complex().write_to(&inputs).unwrap();
        TestFile::nanobody_complex().write_to(&inputs).unwrap();

        let dirs = WorkDirs::under(base.path());
        let set = StructureData::new()
            .encode_proteins(&inputs, &dirs.encodings, &dirs.temporary)
            .unwrap();
        let names: Vec<&str> = set.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["abag_complex", "nanobody_complex"]);
    }

    #[test]
    fn test_same_stem_in_directory() {
        let base = tempfile::tempdir().unwrap();
        let inputs = base.path().join("inputs");
        std::fs::create_dir(&inputs).unwrap();
        let abag = TestFile::abag_complex().write_to(&inputs).unwrap();
        let nanobody = TestFile::nanobody_complex().write_to(&inputs).unwrap();
        std::fs::rename(abag, inputs.join("x.pdb")).unwrap();
        std::fs::rename(nanobody, inputs.join("x.ent")).unwrap();

        let dirs = WorkDirs::under(base.path());
        dirs.ensure().unwrap();
        let err = StructureData::new()
            .encode_proteins(&inputs, &dirs.encodings, &dirs.temporary)
            .unwrap_err();
        assert!(matches!(err, EpitopeError::DuplicateName { ref name, .. } if name == "x"));
        assert_eq!(std::fs::read_dir(&dirs.encodings).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_structure_writes_nothing() {
        let base = tempfile::tempdir().unwrap();
        let dirs = WorkDirs::under(base.path());
        dirs.ensure().unwrap();
        let err = StructureData::new()
            .encode_proteins(
                &base.path().join("missing.pdb"),
                &dirs.encodings,
                &dirs.temporary,
            )
            .unwrap_err();
        assert!(matches!(err, EpitopeError::MissingStructure(_)));
        assert_eq!(std::fs::read_dir(&dirs.encodings).unwrap().count(), 0);
    }

    #[test]
    fn test_load_without_manifest() {
        let base = tempfile::tempdir().unwrap();
        assert!(matches!(
            EncodedSet::load(base.path()),
            Err(EpitopeError::MissingEncodings(_))
        ));
    }
}
