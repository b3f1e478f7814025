use serde::{Deserialize, Serialize};

use farmops_core::{AssetId, Choice, Entity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetStatus {
    Available,
    InUse,
    UnderMaintenance,
    Damaged,
    Retired,
}

impl Choice for AssetStatus {
    const ALL: &'static [Self] = &[
        AssetStatus::Available,
        AssetStatus::InUse,
        AssetStatus::UnderMaintenance,
        AssetStatus::Damaged,
        AssetStatus::Retired,
    ];

    fn name(self) -> &'static str {
        match self {
            AssetStatus::Available => "Available",
            AssetStatus::InUse => "InUse",
            AssetStatus::UnderMaintenance => "UnderMaintenance",
            AssetStatus::Damaged => "Damaged",
            AssetStatus::Retired => "Retired",
        }
    }
}

/// How many units of an asset are in one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetState {
    pub status: AssetStatus,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    id: AssetId,
    name: String,
    description: Option<String>,
    states: Vec<AssetState>,
}

impl Asset {
    pub fn new(
        id: AssetId,
        name: impl Into<String>,
        description: Option<String>,
        states: Vec<AssetState>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description,
            states,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn states(&self) -> &[AssetState] {
        &self.states
    }

    pub fn quantity_in(&self, status: AssetStatus) -> u64 {
        self.states
            .iter()
            .filter(|s| s.status == status)
            .map(|s| s.quantity)
            .sum()
    }

    /// Units across every state, saturating at `u64::MAX`.
    pub fn total_quantity(&self) -> u64 {
        self.states.iter().fold(0, |total, s| total.saturating_add(s.quantity))
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    /// Replace the whole state breakdown.
    pub fn replace_states(&mut self, states: Vec<AssetState>) {
        self.states = states;
    }
}

impl Entity for Asset {
    type Id = AssetId;

    const KIND: &'static str = "asset";

    fn id(&self) -> &AssetId {
        &self.id
    }
}

/// Status names appearing more than once, compared case-insensitively.
///
/// Returns one entry per duplicated group (spelled as first seen), in order of
/// first appearance.
pub fn duplicate_statuses<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut groups: Vec<(String, &'a str, usize)> = Vec::new();
    for name in names {
        let key = name.trim().to_lowercase();
        match groups.iter_mut().find(|(k, _, _)| *k == key) {
            Some((_, _, count)) => *count += 1,
            None => groups.push((key, name, 1)),
        }
    }
    groups
        .into_iter()
        .filter(|(_, _, count)| *count > 1)
        .map(|(_, first, _)| first)
        .collect()
}
