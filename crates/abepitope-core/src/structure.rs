//! Structure loading.
//!
//! Structures are parsed with pdbtbx and flattened into a [`Complex`]: the protein
//! residues of the first model, in file order, each tagged with the role of its chain.
use crate::chains::{ChainAssignment, ChainRole};
use crate::constants::{aa3to1, is_water};
use crate::error::{EpitopeError, Result};
use itertools::Itertools;
use pdbtbx::{Element, Format, ReadOptions, StrictnessLevel, PDB};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const STRUCTURE_EXTENSIONS: [&str; 4] = ["pdb", "ent", "cif", "mmcif"];

#[derive(Debug, Clone)]
pub struct Residue {
    pub chain_id: String,
    pub role: ChainRole,
    pub number: isize,
    pub insertion_code: Option<String>,
    pub res_name: String,
    pub aa: char,
    pub ca: [f32; 3],
    /// Non-hydrogen atom positions, CA included.
    pub heavy_atoms: Vec<[f32; 3]>,
}

impl Residue {
    /// e.g. `A10` or `H52A`
    pub fn label(&self) -> String {
        format!(
            "{}{}{}",
            self.chain_id,
            self.number,
            self.insertion_code.as_deref().unwrap_or("")
        )
    }
}

/// Protein residues of an antibody-antigen complex.
#[derive(Debug, Clone)]
pub struct Complex {
    name: String,
    source: PathBuf,
    chains: Vec<(String, ChainRole)>,
    residues: Vec<Residue>,
}

impl Complex {
    /// Read and assign chain roles in one go. The complex is named after the file stem.
    pub fn open<P: AsRef<Path>>(path: P, assignment: &ChainAssignment) -> Result<Self> {
        let path = path.as_ref();
        let pdb = read_structure(path)?;
        let name = structure_name(path);
        Self::from_pdb(&name, path, &pdb, assignment)
    }

    pub fn from_pdb(
        name: &str,
        source: &Path,
        pdb: &PDB,
        assignment: &ChainAssignment,
    ) -> Result<Self> {
        // the PDB API requires us to iterate:
        // Model --> Chain --> Residue --> Atom.
        // Only the first model is used.
        let mut protein_chains: Vec<(String, Vec<Residue>)> = Vec::new();
        if let Some(model) = pdb.models().next() {
            for chain in model.chains() {
                let chain_id = chain.id().to_string();
                let residues: Vec<Residue> = chain
                    .residues()
                    .filter_map(|residue| protein_residue(&chain_id, residue))
                    .collect();
                if residues.is_empty() {
                    continue;
                }
                // pdbtbx can hand back a chain in several pieces (e.g. after a TER)
                match protein_chains.iter_mut().find(|(id, _)| *id == chain_id) {
                    Some((_, existing)) => existing.extend(residues),
                    None => protein_chains.push((chain_id, residues)),
                }
            }
        }

        let chain_ids: Vec<String> = protein_chains.iter().map(|(id, _)| id.clone()).collect();
        let chains = assignment.assign(name, &chain_ids)?;
        if !chains.iter().any(|(_, role)| *role == ChainRole::Antigen) {
            return Err(EpitopeError::NoAntigen {
                name: name.to_string(),
            });
        }

        let residues = protein_chains
            .into_iter()
            .filter_map(|(id, residues)| {
                chains
                    .iter()
                    .find(|(assigned, _)| *assigned == id)
                    .map(|(_, role)| (*role, residues))
            })
            .flat_map(|(role, residues)| {
                residues.into_iter().map(move |mut residue| {
                    residue.role = role;
                    residue
                })
            })
            .collect();

        Ok(Self {
            name: name.to_string(),
            source: source.to_path_buf(),
            chains,
            residues,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn source(&self) -> &Path {
        &self.source
    }
    pub fn chains(&self) -> &[(String, ChainRole)] {
        &self.chains
    }
    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }
    pub fn len(&self) -> usize {
        self.residues.len()
    }
    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    pub fn sequence(&self, chain_id: &str) -> String {
        self.residues
            .iter()
            .filter(|res| res.chain_id == chain_id)
            .map(|res| res.aa)
            .collect()
    }

    /// One record per chain, headers are `<name>|<chain>|<role>`.
    pub fn to_fasta(&self) -> String {
        self.chains
            .iter()
            .map(|(id, role)| format!(">{}|{}|{}\n{}\n", self.name, id, role, self.sequence(id)))
            .join("")
    }
}

fn protein_residue(chain_id: &str, residue: &pdbtbx::Residue) -> Option<Residue> {
    let res_name = residue.name().unwrap_or_default().to_string();
    if is_water(&res_name) {
        return None;
    }
    let aa = aa3to1(&res_name);
    // unknown residue names are only kept when they are part of the polymer
    if aa == 'X' && residue.atoms().any(|atom| atom.hetero()) {
        return None;
    }
    let mut ca = None;
    let mut heavy_atoms = Vec::new();
    for atom in residue.atoms() {
        if matches!(atom.element(), Some(Element::H)) {
            continue;
        }
        let (x, y, z) = atom.pos();
        let pos = [x as f32, y as f32, z as f32];
        if atom.name() == "CA" && ca.is_none() {
            ca = Some(pos);
        }
        heavy_atoms.push(pos);
    }
    let (number, insertion_code) = residue.id();
    Some(Residue {
        chain_id: chain_id.to_string(),
        role: ChainRole::Antigen,
        number,
        insertion_code: insertion_code.map(|code| code.to_string()),
        res_name,
        aa,
        ca: ca?,
        heavy_atoms,
    })
}

fn structure_format(path: &Path) -> Result<Format> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("pdb") | Some("ent") => Ok(Format::Pdb),
        Some("cif") | Some("mmcif") => Ok(Format::Mmcif),
        _ => Err(EpitopeError::UnsupportedFormat(path.to_path_buf())),
    }
}

pub fn is_structure_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| STRUCTURE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
}

/// File stem used to name encodings and output rows.
pub fn structure_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "structure".to_string())
}

/// Parse a PDB or mmCIF file. Warnings are logged, errors are returned.
pub fn read_structure(path: &Path) -> Result<PDB> {
    if !path.exists() {
        return Err(EpitopeError::MissingStructure(path.to_path_buf()));
    }
    let format = structure_format(path)?;
    let path_str = path
        .to_str()
        .ok_or_else(|| EpitopeError::UnsupportedFormat(path.to_path_buf()))?;

    let mut options = ReadOptions::default();
    options
        .set_format(format)
        .set_level(StrictnessLevel::Loose);
    let (pdb, warnings) = options.read(path_str).map_err(|errors| EpitopeError::Parse {
        path: path.to_path_buf(),
        messages: errors.iter().map(|e| e.to_string()).join("; "),
    })?;
    for warning in warnings {
        log::debug!("{}: {}", path.display(), warning);
    }
    Ok(pdb)
}

/// A single structure file, or every structure file inside a directory (sorted by name).
pub fn discover_structures(input: &Path) -> Result<Vec<PathBuf>> {
    if !input.exists() {
        return Err(EpitopeError::MissingStructure(input.to_path_buf()));
    }
    if input.is_file() {
        structure_format(input)?;
        return Ok(vec![input.to_path_buf()]);
    }
    let files: Vec<PathBuf> = std::fs::read_dir(input)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .filter(|path| is_structure_file(path))
        .sorted()
        .collect();
    if files.is_empty() {
        return Err(EpitopeError::NoStructures(input.to_path_buf()));
    }
    // encodings and reports are keyed by file stem
    let mut names: HashMap<String, &PathBuf> = HashMap::new();
    for file in &files {
        if let Some(first) = names.insert(structure_name(file), file) {
            return Err(EpitopeError::DuplicateName {
                name: structure_name(file),
                first: first.clone(),
                second: file.clone(),
            });
        }
    }
    drop(names);
    Ok(files)
}
