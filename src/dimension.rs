use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use polars::prelude::*;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{DiError, Result};
use crate::schema::lookup;

/// Label prefix of the rolling "latest year" entry in the year listing.
pub const LAST_INVENTORY_YEAR: &str = "Last Inventory Year";

/// Party grouping entries carrying this name are aggregates, not parties.
const GROUPS_MARKER: &str = "Groups";

/// The classification axes of the data service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Party,
    Category,
    Classification,
    Measure,
    Gas,
    Unit,
    Year,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Party => "party",
            Self::Category => "category",
            Self::Classification => "classification",
            Self::Measure => "measure",
            Self::Gas => "gas",
            Self::Unit => "unit",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two reporting groups the service splits its parties into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartyCategory {
    AnnexOne,
    NonAnnexOne,
}

impl PartyCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AnnexOne => "annexOne",
            Self::NonAnnexOne => "nonAnnexOne",
        }
    }
}

impl fmt::Display for PartyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartyCategory {
    type Err = DiError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "annexOne" => Ok(Self::AnnexOne),
            "nonAnnexOne" => Ok(Self::NonAnnexOne),
            other => Err(DiError::InvalidArgument(format!(
                "party category must be `annexOne` or `nonAnnexOne`, got `{other}`"
            ))),
        }
    }
}

// ── Flat dimensions ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct DimensionEntry {
    pub id: i64,
    pub name: String,
}

/// Flat id → label mapping for one dimension.
#[derive(Debug, Clone)]
pub struct DimensionTable {
    dimension: Dimension,
    entries: BTreeMap<i64, String>,
}

impl DimensionTable {
    pub fn new(dimension: Dimension, entries: impl IntoIterator<Item = DimensionEntry>) -> Self {
        let entries = entries.into_iter().map(|e| (e.id, e.name)).collect();
        Self { dimension, entries }
    }

    /// Year table; labels of the rolling latest-year entry are reduced to the year.
    pub fn years(entries: impl IntoIterator<Item = DimensionEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|e| (e.id, normalize_year_label(&e.name)))
            .collect();
        Self {
            dimension: Dimension::Year,
            entries,
        }
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn name(&self, id: i64) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }

    /// Label for an id that must be present.
    pub fn require(&self, id: i64) -> Result<&str> {
        self.name(id).ok_or(DiError::MissingDimensionEntry {
            dimension: self.dimension,
            id,
        })
    }

    /// Lowest id carrying exactly this name.
    pub fn id_of(&self, name: &str) -> Result<i64> {
        self.entries
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(id, _)| *id)
            .ok_or_else(|| DiError::UnknownDimensionValue {
                dimension: self.dimension,
                value: name.to_string(),
            })
    }

    /// Ids in ascending order.
    pub fn ids(&self) -> Vec<i64> {
        self.entries.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &str)> {
        self.entries.iter().map(|(id, name)| (*id, name.as_str()))
    }

    /// Union of two tables; on an id collision the entry of `self` wins.
    pub fn union(&self, other: &DimensionTable) -> DimensionTable {
        let mut entries = self.entries.clone();
        for (id, name) in &other.entries {
            entries.entry(*id).or_insert_with(|| name.clone());
        }
        DimensionTable {
            dimension: self.dimension,
            entries,
        }
    }

    pub fn to_frame(&self) -> Result<DataFrame> {
        let ids: Vec<i64> = self.entries.keys().copied().collect();
        let names: Vec<&str> = self.entries.values().map(String::as_str).collect();
        let df = DataFrame::new(vec![
            Column::new(lookup::ID.into(), &ids),
            Column::new(lookup::NAME.into(), &names),
        ])?;
        Ok(df)
    }
}

/// Reduce `Last Inventory Year (2019)` to `2019`; other labels pass unchanged.
///
/// Takes the four characters ending one before the end of the label, so it
/// relies on the service keeping the `(YYYY)` suffix format.
pub fn normalize_year_label(label: &str) -> String {
    if !label.starts_with(LAST_INVENTORY_YEAR) {
        return label.to_string();
    }
    let chars: Vec<char> = label.chars().collect();
    if chars.len() < 5 {
        return label.to_string();
    }
    chars[chars.len() - 5..chars.len() - 1].iter().collect()
}

// ── Parties ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Party {
    pub id: i64,
    pub code: String,
    pub name: String,
}

/// One grouping entry of the party listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyGroup {
    pub category_code: String,
    pub name: String,
    #[serde(default)]
    pub parties: Vec<Party>,
}

#[derive(Debug, Clone, Default)]
pub struct PartyTable {
    parties: BTreeMap<i64, Party>,
}

impl PartyTable {
    /// Flatten the groups of one party category, skipping the aggregate groups.
    pub fn from_groups(groups: Vec<PartyGroup>, category: PartyCategory) -> Result<Self> {
        let mut parties = BTreeMap::new();
        let mut found = false;
        for group in groups {
            if group.category_code != category.as_str() || group.name == GROUPS_MARKER {
                continue;
            }
            found = true;
            for party in group.parties {
                parties.entry(party.id).or_insert(party);
            }
        }
        if !found {
            return Err(DiError::Configuration(format!(
                "could not find parties for the party category `{category}`"
            )));
        }
        Ok(Self { parties })
    }

    pub fn len(&self) -> usize {
        self.parties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parties.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Party> {
        self.parties.get(&id)
    }

    pub fn code(&self, id: i64) -> Result<&str> {
        self.parties
            .get(&id)
            .map(|p| p.code.as_str())
            .ok_or(DiError::MissingDimensionEntry {
                dimension: Dimension::Party,
                id,
            })
    }

    /// Lowest party id with this code.
    pub fn id_of_code(&self, code: &str) -> Option<i64> {
        self.parties.values().find(|p| p.code == code).map(|p| p.id)
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.id_of_code(code).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Party> {
        self.parties.values()
    }

    /// Union of two tables; on an id collision the party of `self` wins.
    pub fn union(&self, other: &PartyTable) -> PartyTable {
        let mut parties = self.parties.clone();
        for (id, party) in &other.parties {
            parties.entry(*id).or_insert_with(|| party.clone());
        }
        PartyTable { parties }
    }

    pub fn to_frame(&self) -> Result<DataFrame> {
        let ids: Vec<i64> = self.parties.keys().copied().collect();
        let codes: Vec<&str> = self.parties.values().map(|p| p.code.as_str()).collect();
        let names: Vec<&str> = self.parties.values().map(|p| p.name.as_str()).collect();
        let df = DataFrame::new(vec![
            Column::new(lookup::ID.into(), &ids),
            Column::new(lookup::CODE.into(), &codes),
            Column::new(lookup::NAME.into(), &names),
        ])?;
        Ok(df)
    }
}

// ── Units ───────────────────────────────────────────────────────────────────

/// Units plus the per-category conversion factors.
///
/// Conversion factors are kept as delivered; nothing in the query path reads them.
#[derive(Debug, Clone)]
pub struct UnitCatalog {
    pub units: DimensionTable,
    pub conversion_factors: Vec<Map<String, Value>>,
}

impl UnitCatalog {
    /// Conversion factors as a frame of string columns, one per key seen.
    pub fn conversion_factors_frame(&self) -> Result<DataFrame> {
        let keys: BTreeSet<&str> = self
            .conversion_factors
            .iter()
            .flat_map(|row| row.keys().map(String::as_str))
            .collect();

        let columns = keys
            .into_iter()
            .map(|key| {
                let values: Vec<Option<String>> = self
                    .conversion_factors
                    .iter()
                    .map(|row| match row.get(key) {
                        None | Some(Value::Null) => None,
                        Some(Value::String(s)) => Some(s.clone()),
                        Some(other) => Some(other.to_string()),
                    })
                    .collect();
                Column::new(key.into(), &values)
            })
            .collect::<Vec<_>>();

        Ok(DataFrame::new(columns)?)
    }
}
