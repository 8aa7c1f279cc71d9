//! Chain roles in an antibody-antigen complex.
use crate::error::{EpitopeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChainRole {
    Heavy,
    Light,
    Antigen,
}

impl ChainRole {
    pub fn is_antibody(&self) -> bool {
        matches!(self, ChainRole::Heavy | ChainRole::Light)
    }
    /// Column of this role inside the role one-hot block.
    pub fn index(&self) -> usize {
        match self {
            ChainRole::Heavy => 0,
            ChainRole::Light => 1,
            ChainRole::Antigen => 2,
        }
    }
}

/// How protein chains are mapped onto antibody and antigen roles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ChainAssignment {
    /// Heavy chain first, light chain second, antigen chains after.
    /// With exactly two chains the first one is a single-domain antibody.
    #[default]
    FileOrder,
    Explicit {
        heavy: String,
        light: Option<String>,
        antigen: Vec<String>,
    },
}

impl ChainAssignment {
    /// Assign roles to the protein chains of `name`, given in file order.
    ///
    /// Returns the participating chains in file order. Chains that are not named by an
    /// `Explicit` assignment are dropped.
    pub fn assign(&self, name: &str, chain_ids: &[String]) -> Result<Vec<(String, ChainRole)>> {
        match self {
            ChainAssignment::FileOrder => match chain_ids.len() {
                0 | 1 => Err(EpitopeError::TooFewChains {
                    name: name.to_string(),
                    found: chain_ids.len(),
                }),
                2 => Ok(vec![
                    (chain_ids[0].clone(), ChainRole::Heavy),
                    (chain_ids[1].clone(), ChainRole::Antigen),
                ]),
                _ => Ok(chain_ids
                    .iter()
                    .enumerate()
                    .map(|(idx, id)| {
                        let role = match idx {
                            0 => ChainRole::Heavy,
                            1 => ChainRole::Light,
                            _ => ChainRole::Antigen,
                        };
                        (id.clone(), role)
                    })
                    .collect()),
            },
            ChainAssignment::Explicit {
                heavy,
                light,
                antigen,
            } => {
                if antigen.is_empty() {
                    return Err(EpitopeError::NoAntigen {
                        name: name.to_string(),
                    });
                }
                let requested = std::iter::once(heavy)
                    .chain(light.iter())
                    .chain(antigen.iter());
                let mut seen = HashSet::new();
                for chain in requested {
                    if !seen.insert(chain) {
                        return Err(EpitopeError::OverlappingChain {
                            name: name.to_string(),
                            chain: chain.clone(),
                        });
                    }
                    if !chain_ids.contains(chain) {
                        return Err(EpitopeError::UnknownChain {
                            name: name.to_string(),
                            chain: chain.clone(),
                        });
                    }
                }
                Ok(chain_ids
                    .iter()
                    .filter_map(|id| {
                        let role = if id == heavy {
                            ChainRole::Heavy
                        } else if light.as_ref() == Some(id) {
                            ChainRole::Light
                        } else if antigen.contains(id) {
                            ChainRole::Antigen
                        } else {
                            return None;
                        };
                        Some((id.clone(), role))
                    })
                    .collect())
            }
        }
    }
}
