//! Value-semantics edits on [`Scenario`].
//!
//! Every edit borrows the current scenario and returns a new one; the
//! original is never touched.

use std::collections::BTreeSet;

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::ModelError;
use crate::model::{Lot, RegulationSet, Scenario, Tract, Typology};

const LOT_ID_PREFIX: &str = "LOT-";

impl Scenario {
    /// Empty scenario with a freshly assigned id.
    pub fn new(regulation: RegulationSet) -> Self {
        Self {
            id: new_scenario_id(),
            regulation,
            lots: Vec::new(),
            tracts: Vec::new(),
        }
    }

    /// Same content under a new id.
    pub fn regenerated(&self) -> Self {
        Self {
            id: new_scenario_id(),
            ..self.clone()
        }
    }

    pub fn with_regulation(&self, regulation: RegulationSet) -> Self {
        Self {
            regulation,
            ..self.clone()
        }
    }

    pub fn lot(&self, id: &str) -> Option<&Lot> {
        self.lots.iter().find(|l| l.id == id)
    }

    pub fn tract(&self, id: &str) -> Option<&Tract> {
        self.tracts.iter().find(|t| t.id == id)
    }

    // ── Lots ──

    pub fn with_lot_added(&self, lot: Lot) -> Result<Self, ModelError> {
        if self.lot(&lot.id).is_some() {
            return Err(ModelError::DuplicateLot(lot.id));
        }
        let mut next = self.clone();
        next.lots.push(lot);
        Ok(next)
    }

    /// Replace the lot with id `id` by `lot` (which may carry a new id).
    pub fn with_lot_replaced(&self, id: &str, lot: Lot) -> Result<Self, ModelError> {
        let idx = self.lot_index(id)?;
        if lot.id != id && self.lot(&lot.id).is_some() {
            return Err(ModelError::DuplicateLot(lot.id));
        }
        let mut next = self.clone();
        next.lots[idx] = lot;
        Ok(next)
    }

    pub fn with_typology(&self, id: &str, typology: Typology) -> Result<Self, ModelError> {
        let idx = self.lot_index(id)?;
        let mut next = self.clone();
        next.lots[idx].typology = typology;
        Ok(next)
    }

    pub fn without_lot(&self, id: &str) -> Result<Self, ModelError> {
        let idx = self.lot_index(id)?;
        let mut next = self.clone();
        next.lots.remove(idx);
        Ok(next)
    }

    /// Next free `LOT-NNN` id: highest numeric suffix plus one.
    ///
    /// When the highest suffix cannot be incremented, the lowest unused
    /// suffix is taken instead.
    pub fn next_lot_id(&self) -> String {
        let taken: BTreeSet<u64> = self
            .lots
            .iter()
            .filter_map(|l| l.id.strip_prefix(LOT_ID_PREFIX))
            .filter_map(|n| n.parse::<u64>().ok())
            .collect();
        let next = match taken.last() {
            None => 1,
            Some(&n) => n
                .checked_add(1)
                .unwrap_or_else(|| (1..).find(|n| !taken.contains(n)).unwrap_or(0)),
        };
        format!("{LOT_ID_PREFIX}{next:03}")
    }

    // ── Tracts ──

    pub fn with_tract_added(&self, tract: Tract) -> Result<Self, ModelError> {
        if self.tract(&tract.id).is_some() {
            return Err(ModelError::DuplicateTract(tract.id));
        }
        let mut next = self.clone();
        next.tracts.push(tract);
        renumber(&mut next.tracts);
        Ok(next)
    }

    pub fn with_tract_replaced(&self, id: &str, tract: Tract) -> Result<Self, ModelError> {
        let idx = self.tract_index(id)?;
        if tract.id != id && self.tract(&tract.id).is_some() {
            return Err(ModelError::DuplicateTract(tract.id));
        }
        let mut next = self.clone();
        next.tracts[idx] = tract;
        renumber(&mut next.tracts);
        Ok(next)
    }

    pub fn without_tract(&self, id: &str) -> Result<Self, ModelError> {
        let idx = self.tract_index(id)?;
        let mut next = self.clone();
        next.tracts.remove(idx);
        renumber(&mut next.tracts);
        Ok(next)
    }

    /// Swap a tract with its neighbour `offset` places away.
    ///
    /// A move past either end leaves the sequence unchanged.
    pub fn with_tract_moved(&self, id: &str, offset: isize) -> Result<Self, ModelError> {
        let idx = self.tract_index(id)?;
        let mut next = self.clone();
        let target = idx as isize + offset;
        if target >= 0 && (target as usize) < next.tracts.len() {
            next.tracts.swap(idx, target as usize);
        }
        renumber(&mut next.tracts);
        Ok(next)
    }

    /// SHA-256 of the scenario's JSON form, hex-encoded.
    ///
    /// Identical inputs always yield the same fingerprint.
    pub fn fingerprint(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        Sha256::digest(&bytes)
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    fn lot_index(&self, id: &str) -> Result<usize, ModelError> {
        self.lots
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| ModelError::UnknownLot(id.to_string()))
    }

    fn tract_index(&self, id: &str) -> Result<usize, ModelError> {
        self.tracts
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| ModelError::UnknownTract(id.to_string()))
    }
}

fn new_scenario_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn renumber(tracts: &mut [Tract]) {
    for (i, t) in tracts.iter_mut().enumerate() {
        t.order = i as u32;
    }
}
