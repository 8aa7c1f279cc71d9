//! Antibody/antigen interface detection.
use crate::chains::ChainRole;
use crate::constants::CA_REACH;
use crate::structure::{Complex, Residue};

fn distance_sq(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
}

fn residues_in_contact(a: &Residue, b: &Residue, cutoff: f32) -> bool {
    let reach = cutoff + CA_REACH;
    if distance_sq(&a.ca, &b.ca) > reach * reach {
        return false;
    }
    let cutoff_sq = cutoff * cutoff;
    a.heavy_atoms.iter().any(|atom_a| {
        b.heavy_atoms
            .iter()
            .any(|atom_b| distance_sq(atom_a, atom_b) <= cutoff_sq)
    })
}

/// One flag per residue of `complex`: true when any heavy atom of the residue is within
/// `cutoff` Å of a heavy atom on the other side of the antibody/antigen interface.
pub fn interface_flags(complex: &Complex, cutoff: f32) -> Vec<bool> {
    let residues = complex.residues();
    let mut flags = vec![false; residues.len()];
    for (i, a) in residues.iter().enumerate() {
        if !a.role.is_antibody() {
            continue;
        }
        for (j, b) in residues.iter().enumerate() {
            if b.role != ChainRole::Antigen {
                continue;
            }
            if residues_in_contact(a, b, cutoff) {
                flags[i] = true;
                flags[j] = true;
            }
        }
    }
    flags
}

/// Antigen residues on the interface.
pub fn epitope_flags(complex: &Complex, interface: &[bool]) -> Vec<bool> {
    complex
        .residues()
        .iter()
        .zip(interface)
        .map(|(res, &flag)| flag && res.role == ChainRole::Antigen)
        .collect()
}

/// Number of other residues whose CA lies within `radius` Å of each residue's CA.
pub fn contact_counts(complex: &Complex, radius: f32) -> Vec<usize> {
    let residues = complex.residues();
    let radius_sq = radius * radius;
    residues
        .iter()
        .enumerate()
        .map(|(i, a)| {
            residues
                .iter()
                .enumerate()
                .filter(|(j, b)| *j != i && distance_sq(&a.ca, &b.ca) <= radius_sq)
                .count()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::ChainAssignment;
    use crate::constants::{CONTACT_RADIUS, DEFAULT_INTERFACE_CUTOFF};
    use abepitope_test_data::TestFile;

    fn labels(complex: &Complex, flags: &[bool]) -> Vec<String> {
        complex
            .residues()
            .iter()
            .zip(flags)
            .filter(|(_, &flag)| flag)
            .map(|(res, _)| res.label())
            .collect()
    }

    #[test]
    fn test_epitope() {
        let (pdb_file, _tmp) = TestFile::abag_complex().create_temp().unwrap();
        let complex = Complex::open(&pdb_file, &ChainAssignment::FileOrder).unwrap();
        let interface = interface_flags(&complex, DEFAULT_INTERFACE_CUTOFF);
        let epitope = epitope_flags(&complex, &interface);

        assert_eq!(labels(&complex, &epitope), ["A10", "A11"]);
        // H2 CA sits 3.5 Å from A10 CA
        assert!(labels(&complex, &interface).contains(&"H2".to_string()));
    }

    #[test]
    fn test_small_cutoff_shrinks_interface() {
        let (pdb_file, _tmp) = TestFile::abag_complex().create_temp().unwrap();
        let complex = Complex::open(&pdb_file, &ChainAssignment::FileOrder).unwrap();
        let interface = interface_flags(&complex, 0.5);
        assert!(interface.iter().all(|flag| !flag));
    }

    #[test]
    fn test_contact_counts() {
        let (pdb_file, _tmp) = TestFile::abag_complex().create_temp().unwrap();
        let complex = Complex::open(&pdb_file, &ChainAssignment::FileOrder).unwrap();
        let counts = contact_counts(&complex, CONTACT_RADIUS);
        assert_eq!(counts.len(), complex.len());
        // A12 and A13 only see each other
        assert_eq!(&counts[7..], &[1, 1]);
    }
}
