//! Modules and designs: containers for wires, cells and wire aliases.

use crate::cell::Cell;
use crate::selection::Selection;
use crate::sig::{SigSpec, WireId};
use crate::{NetlistError, NetlistResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named bundle of signal bits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wire {
    pub name: String,
    pub width: u32,
}

/// A module: cells plus the wires connecting them.
///
/// Iteration order over cells is the insertion order; the equivalence
/// engine's CNF determinism depends on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    wires: Vec<Wire>,
    cells: Vec<Cell>,
    connections: Vec<(SigSpec, SigSpec)>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Module {
            name: name.into(),
            wires: Vec::new(),
            cells: Vec::new(),
            connections: Vec::new(),
        }
    }

    pub fn add_wire(&mut self, name: impl Into<String>, width: u32) -> WireId {
        let id = WireId(self.wires.len() as u32);
        self.wires.push(Wire {
            name: name.into(),
            width,
        });
        id
    }

    /// Add a wire and return the full-width spec over it.
    pub fn wire(&mut self, name: impl Into<String>, width: u32) -> SigSpec {
        let id = self.add_wire(name, width);
        SigSpec::from_wire(id, width)
    }

    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    pub fn add_cell(&mut self, cell: Cell) -> usize {
        self.cells.push(cell);
        self.cells.len() - 1
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Declare two equal-width signal vectors as aliases of each other.
    pub fn connect(&mut self, left: SigSpec, right: SigSpec) -> NetlistResult<()> {
        if left.len() != right.len() {
            return Err(NetlistError::WidthMismatch {
                left: left.len(),
                right: right.len(),
            });
        }
        self.connections.push((left, right));
        Ok(())
    }

    pub fn connections(&self) -> &[(SigSpec, SigSpec)] {
        &self.connections
    }

    /// Ordered iteration over the cells admitted by `selection`, with their
    /// indices into [`Module::cells`].
    pub fn selected_cells<'a>(
        &'a self,
        selection: &'a Selection,
    ) -> impl Iterator<Item = (usize, &'a Cell)> + 'a {
        self.cells
            .iter()
            .enumerate()
            .filter(move |(_, cell)| selection.matches_cell(&self.name, &cell.name))
    }
}

/// A design: independently processed modules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Design {
    pub modules: Vec<Module>,
}

impl Design {
    pub fn new() -> Self {
        Design::default()
    }

    pub fn add_module(&mut self, module: Module) -> &mut Module {
        self.modules.push(module);
        self.modules.last_mut().expect("just pushed")
    }

    pub fn selected_modules_mut<'a>(
        &'a mut self,
        selection: &'a Selection,
    ) -> impl Iterator<Item = &'a mut Module> + 'a {
        self.modules
            .iter_mut()
            .filter(move |module| selection.matches_module(&module.name))
    }
}

/// Per-module summary used by the CLI `show` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleStats {
    pub name: String,
    pub wires: usize,
    pub cells: usize,
    pub cells_by_kind: BTreeMap<String, usize>,
    pub proven_markers: usize,
    pub unproven_markers: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignStats {
    pub modules: Vec<ModuleStats>,
}

impl DesignStats {
    pub fn from_design(design: &Design) -> Self {
        let modules = design
            .modules
            .iter()
            .map(|module| {
                let mut cells_by_kind = BTreeMap::new();
                let mut proven = 0;
                let mut unproven = 0;
                for cell in module.cells() {
                    *cells_by_kind
                        .entry(cell.kind.type_name().to_string())
                        .or_insert(0) += 1;
                    if cell.is_equiv() {
                        if cell.is_proven_equiv() {
                            proven += 1;
                        } else {
                            unproven += 1;
                        }
                    }
                }
                ModuleStats {
                    name: module.name.clone(),
                    wires: module.wires().len(),
                    cells: module.cells().len(),
                    cells_by_kind,
                    proven_markers: proven,
                    unproven_markers: unproven,
                }
            })
            .collect();
        DesignStats { modules }
    }
}
