// src/tabula/models.rs
use serde::Deserialize;

use super::Grid;

/// One table as emitted by `tabula --format JSON`.
/// Example element: {"extraction_method":"lattice","page_number":4,"top":91.5,...,"data":[[{"text":"..."}]]}
#[derive(Debug, Deserialize)]
pub struct TabulaTable {
    #[serde(default)]
    pub extraction_method: String,
    #[serde(default)]
    pub page_number: Option<u32>,
    #[serde(default)]
    pub data: Vec<Vec<TabulaCell>>,
}

/// A single cell; geometry fields are ignored.
#[derive(Debug, Deserialize)]
pub struct TabulaCell {
    #[serde(default)]
    pub text: String,
}

impl TabulaTable {
    pub fn into_grid(self) -> Grid {
        self.data
            .into_iter()
            .map(|row| row.into_iter().map(|cell| cell.text).collect())
            .collect()
    }
}
