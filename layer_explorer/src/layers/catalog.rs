//! Descriptive text shown next to the 3D view for each layer.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::LayerId;

/// Human-readable description of a layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerInfo {
    pub title: String,
    pub material: String,
    pub function: String,
    #[serde(alias = "char")]
    pub characteristic: String,
}

impl LayerInfo {
    fn new(title: &str, material: &str, function: &str, characteristic: &str) -> Self {
        Self {
            title: title.to_string(),
            material: material.to_string(),
            function: function.to_string(),
            characteristic: characteristic.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog has no entry for layer `{0}`")]
    MissingLayer(LayerId),
}

/// Read-only lookup table from layer id to its description.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct LayerCatalog {
    entries: [LayerInfo; 4],
}

impl Default for LayerCatalog {
    fn default() -> Self {
        Self {
            entries: [
                LayerInfo::new(
                    "GFRC (Base)",
                    "Glass-fibre reinforced concrete",
                    "Structural substrate",
                    "High tensile strength, fire resistant.",
                ),
                LayerInfo::new(
                    "3D-Printed Mesh",
                    "Thermoplastic PLA / ABS / PETG",
                    "Mechanical anchoring and scaffolding",
                    "Lattice structure, lightweight.",
                ),
                LayerInfo::new(
                    "Filling Layer",
                    "Epoxy putty / resin mortar",
                    "Surface levelling and smoothing",
                    "Fills the mesh voids, easy to sand.",
                ),
                LayerInfo::new(
                    "Finishing Layer",
                    "Polyurethane paint, gel coat, or architectural coating",
                    "Aesthetics and protection (UV / water)",
                    "Smooth, non-porous, seamless finish.",
                ),
            ],
        }
    }
}

impl LayerCatalog {
    pub fn get(&self, id: LayerId) -> &LayerInfo {
        &self.entries[id.index()]
    }

    /// Parses a JSON object keyed by layer wire name. Every layer must be present.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let mut table: HashMap<LayerId, LayerInfo> = serde_json::from_str(json)?;
        let mut take = |id: LayerId| table.remove(&id).ok_or(CatalogError::MissingLayer(id));
        Ok(Self {
            entries: [
                take(LayerId::Gfcr)?,
                take(LayerId::Mesh)?,
                take(LayerId::Filling)?,
                take(LayerId::Finishing)?,
            ],
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    #[cfg(test)]
    pub fn to_json_string(&self) -> Result<String, CatalogError> {
        let table: HashMap<LayerId, &LayerInfo> = LayerId::ALL
            .iter()
            .map(|&id| (id, self.get(id)))
            .collect();
        Ok(serde_json::to_string_pretty(&table)?)
    }
}
