//! Module and cell selection.
//!
//! Stands in for the host system's selection language. A selection is a
//! list of `module` or `module/cell` patterns; an empty list selects
//! everything.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Pattern {
    module: String,
    cell: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    patterns: Vec<Pattern>,
}

impl Selection {
    /// Selects every module and cell.
    pub fn all() -> Self {
        Selection::default()
    }

    /// Parse `module` / `module/cell` patterns.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Self {
        let patterns = args
            .iter()
            .map(|arg| {
                let arg = arg.as_ref();
                match arg.split_once('/') {
                    Some((module, cell)) => Pattern {
                        module: module.to_string(),
                        cell: Some(cell.to_string()),
                    },
                    None => Pattern {
                        module: arg.to_string(),
                        cell: None,
                    },
                }
            })
            .collect();
        Selection { patterns }
    }

    pub fn is_all(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn matches_module(&self, module: &str) -> bool {
        self.is_all() || self.patterns.iter().any(|p| p.module == module)
    }

    pub fn matches_cell(&self, module: &str, cell: &str) -> bool {
        self.is_all()
            || self.patterns.iter().any(|p| {
                p.module == module && p.cell.as_deref().map_or(true, |name| name == cell)
            })
    }
}
