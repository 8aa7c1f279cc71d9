//! Residue alphabet and encoding constants.

/// Amino acid alphabet used for the one-hot block. `X` collects everything non-standard.
pub const ALPHABET: [char; 21] = [
    'A', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'V', 'W',
    'Y', 'X',
];

/// Columns per residue: 21 amino acid + 3 chain role + interface flag + contact density.
pub const NUM_FEATURES: usize = 26;
pub const ROLE_OFFSET: usize = 21;
pub const INTERFACE_COLUMN: usize = 24;
pub const CONTACT_COLUMN: usize = 25;

/// Heavy-atom distance (Å) under which two residues are in contact across the interface.
pub const DEFAULT_INTERFACE_CUTOFF: f32 = 4.0;

/// CA-CA radius (Å) for the contact density column.
pub const CONTACT_RADIUS: f32 = 10.0;
pub const CONTACT_NORMALIZER: f32 = 32.0;

/// Residues whose CA atoms are further apart than `cutoff + CA_REACH` cannot have
/// side chain atoms within `cutoff`.
pub const CA_REACH: f32 = 20.0;

pub const ENCODING_FORMAT: &str = "abepitope-encoding";
pub const ENCODING_VERSION: &str = "1";
pub const MANIFEST_FILE: &str = "manifest.json";

#[rustfmt::skip]
pub fn aa3to1(aa: &str) -> char {
    match aa {
        "ALA" => 'A', "CYS" => 'C', "ASP" => 'D',
        "GLU" => 'E', "PHE" => 'F', "GLY" => 'G',
        "HIS" => 'H', "ILE" => 'I', "LYS" => 'K',
        "LEU" => 'L', "MET" => 'M', "ASN" => 'N',
        "PRO" => 'P', "GLN" => 'Q', "ARG" => 'R',
        "SER" => 'S', "THR" => 'T', "VAL" => 'V',
        "TRP" => 'W', "TYR" => 'Y',
        // common modified residues in deposited antibody structures
        "MSE" => 'M', "SEP" => 'S', "TPO" => 'T',
        "PCA" => 'E', "HYP" => 'P',
        _     => 'X',
    }
}

#[rustfmt::skip]
pub fn aa1_to_index(aa: char) -> usize {
    match aa {
        'A' => 0, 'C' => 1, 'D' => 2,
        'E' => 3, 'F' => 4, 'G' => 5,
        'H' => 6, 'I' => 7, 'K' => 8,
        'L' => 9, 'M' => 10, 'N' => 11,
        'P' => 12, 'Q' => 13, 'R' => 14,
        'S' => 15, 'T' => 16, 'V' => 17,
        'W' => 18, 'Y' => 19, _   => 20,
    }
}

pub fn is_water(res_name: &str) -> bool {
    matches!(res_name, "HOH" | "WAT" | "DOD" | "H2O")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_roundtrip() {
        for (idx, aa) in ALPHABET.iter().enumerate() {
            assert_eq!(aa1_to_index(*aa), idx);
        }
    }

    #[test]
    fn test_aa3to1() {
        assert_eq!(aa3to1("TYR"), 'Y');
        assert_eq!(aa3to1("MSE"), 'M');
        assert_eq!(aa3to1("HEM"), 'X');
        assert_eq!(aa1_to_index(aa3to1("UNK")), 20);
    }

    #[test]
    fn test_feature_columns() {
        assert_eq!(ROLE_OFFSET, ALPHABET.len());
        assert_eq!(INTERFACE_COLUMN, ROLE_OFFSET + 3);
        assert_eq!(CONTACT_COLUMN + 1, NUM_FEATURES);
    }
}
