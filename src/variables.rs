use std::collections::BTreeMap;

use polars::prelude::*;
use serde::Deserialize;

use crate::error::Result;
use crate::schema::variable;

/// One dimension tuple the service files under a variable id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableRecord {
    pub variable_id: i64,
    pub category_id: i64,
    pub classification_id: i64,
    pub measure_id: i64,
    pub gas_id: i64,
    pub unit_id: i64,
}

/// Per-dimension id filters. `None` matches every value of that dimension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DimensionFilter {
    pub classification_ids: Option<Vec<i64>>,
    pub category_ids: Option<Vec<i64>>,
    pub measure_ids: Option<Vec<i64>>,
    pub gas_ids: Option<Vec<i64>>,
}

impl DimensionFilter {
    /// True if the record passes every given filter.
    pub fn matches(&self, record: &VariableRecord) -> bool {
        admits(&self.classification_ids, record.classification_id)
            && admits(&self.category_ids, record.category_id)
            && admits(&self.measure_ids, record.measure_id)
            && admits(&self.gas_ids, record.gas_id)
    }
}

fn admits(filter: &Option<Vec<i64>>, value: i64) -> bool {
    filter.as_ref().map_or(true, |ids| ids.contains(&value))
}

/// Variable records grouped by their (non-unique) variable id.
///
/// Every record is kept: one id may stand for several dimension tuples and
/// only some of them may be wanted by a query.
#[derive(Debug, Clone, Default)]
pub struct VariableIndex {
    by_id: BTreeMap<i64, Vec<VariableRecord>>,
}

impl VariableIndex {
    pub fn from_records(records: impl IntoIterator<Item = VariableRecord>) -> Self {
        let mut by_id: BTreeMap<i64, Vec<VariableRecord>> = BTreeMap::new();
        for record in records {
            by_id.entry(record.variable_id).or_default().push(record);
        }
        Self { by_id }
    }

    /// Number of distinct variable ids.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.by_id.values().map(Vec::len).sum()
    }

    pub fn records(&self, variable_id: i64) -> Option<&[VariableRecord]> {
        self.by_id.get(&variable_id).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariableRecord> {
        self.by_id.values().flatten()
    }

    /// Distinct ids, ascending, with at least one record passing the filter.
    pub fn select(&self, filter: &DimensionFilter) -> Vec<i64> {
        self.by_id
            .iter()
            .filter(|(_, records)| records.iter().any(|r| filter.matches(r)))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Flat table with the first record of each variable id.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let firsts: Vec<&VariableRecord> = self
            .by_id
            .values()
            .filter_map(|records| records.first())
            .collect();
        let pick = |f: fn(&VariableRecord) -> i64| -> Vec<i64> {
            firsts.iter().map(|r| f(r)).collect()
        };

        let df = DataFrame::new(vec![
            Column::new(variable::VARIABLE_ID.into(), &pick(|r| r.variable_id)),
            Column::new(variable::CATEGORY_ID.into(), &pick(|r| r.category_id)),
            Column::new(variable::CLASSIFICATION_ID.into(), &pick(|r| r.classification_id)),
            Column::new(variable::MEASURE_ID.into(), &pick(|r| r.measure_id)),
            Column::new(variable::GAS_ID.into(), &pick(|r| r.gas_id)),
            Column::new(variable::UNIT_ID.into(), &pick(|r| r.unit_id)),
        ])?;
        Ok(df)
    }
}
