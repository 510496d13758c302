use std::collections::HashSet;

use polars::prelude::*;

use crate::dimension::{DimensionTable, PartyTable};
use crate::error::{DiError, Result};
use crate::executor::DataPoint;
use crate::gas;
use crate::schema::record;
use crate::taxonomy::TaxonomyTree;
use crate::variables::{DimensionFilter, VariableIndex};

/// One labelled observation of a query result.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRow {
    pub party: String,
    pub category: String,
    pub classification: String,
    pub measure: String,
    pub gas: String,
    pub unit: String,
    pub year: String,
    pub number_value: Option<f64>,
    pub string_value: Option<String>,
}

impl DataRow {
    fn sort_key(&self) -> [&str; 7] {
        [
            self.party.as_str(),
            self.category.as_str(),
            self.classification.as_str(),
            self.measure.as_str(),
            self.gas.as_str(),
            self.unit.as_str(),
            self.year.as_str(),
        ]
    }

    /// Every field, floats by bit pattern, so exact duplicates hash alike.
    fn identity(&self) -> ([&str; 7], Option<u64>, Option<&str>) {
        (
            self.sort_key(),
            self.number_value.map(f64::to_bits),
            self.string_value.as_deref(),
        )
    }
}

/// Everything needed to turn raw points back into labelled rows.
pub struct ResponseAssembler<'a> {
    pub parties: &'a PartyTable,
    pub variables: &'a VariableIndex,
    pub categories: &'a TaxonomyTree,
    pub measures: &'a TaxonomyTree,
    pub classifications: &'a DimensionTable,
    pub gases: &'a DimensionTable,
    pub units: &'a DimensionTable,
    pub years: &'a DimensionTable,
}

impl ResponseAssembler<'_> {
    /// Join points with every variable record that passes `filter`, then sort
    /// by the service labels and drop exact duplicates.
    ///
    /// Gas and unit labels are translated to ASCII digits only after sorting,
    /// so the order and the duplicate check follow the service spelling.
    ///
    /// An empty result is returned as is; callers decide whether that is an error.
    pub fn assemble(
        &self,
        points: &[DataPoint],
        filter: &DimensionFilter,
        normalize_gas_names: bool,
    ) -> Result<Vec<DataRow>> {
        let mut rows = Vec::with_capacity(points.len());
        for point in points {
            let records = self
                .variables
                .records(point.variable_id)
                .ok_or(DiError::UnknownVariable(point.variable_id))?;

            for variable in records.iter().filter(|r| filter.matches(r)) {
                rows.push(DataRow {
                    party: self.parties.code(point.party_id)?.to_string(),
                    category: self
                        .categories
                        .label_or_placeholder(variable.category_id)
                        .into_owned(),
                    classification: self
                        .classifications
                        .require(variable.classification_id)?
                        .to_string(),
                    measure: self
                        .measures
                        .label_or_placeholder(variable.measure_id)
                        .into_owned(),
                    gas: self.gases.require(variable.gas_id)?.to_string(),
                    unit: self.units.require(variable.unit_id)?.to_string(),
                    year: self.years.require(point.year_id)?.to_string(),
                    number_value: point.number_value,
                    string_value: point.string_value.clone(),
                });
            }
        }

        rows.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        let mut seen = HashSet::with_capacity(rows.len());
        let rows: Vec<DataRow> = rows
            .into_iter()
            .filter(|row| seen.insert(identity_owned(row)))
            .map(|mut row| {
                if normalize_gas_names {
                    row.gas = gas::normalize(&row.gas).into_owned();
                    row.unit = gas::normalize(&row.unit).into_owned();
                }
                row
            })
            .collect();
        Ok(rows)
    }
}

fn identity_owned(row: &DataRow) -> (Vec<String>, Option<u64>, Option<String>) {
    let (key, number, string) = row.identity();
    (
        key.iter().map(|s| s.to_string()).collect(),
        number,
        string.map(str::to_string),
    )
}

/// Build the result frame; columns follow [`record`] order.
pub fn rows_to_frame(rows: &[DataRow]) -> Result<DataFrame> {
    let numbers: Vec<Option<f64>> = rows.iter().map(|r| r.number_value).collect();
    let strings: Vec<Option<&str>> = rows.iter().map(|r| r.string_value.as_deref()).collect();

    let df = DataFrame::new(vec![
        text_column(record::PARTY, rows, |r| r.party.as_str()),
        text_column(record::CATEGORY, rows, |r| r.category.as_str()),
        text_column(record::CLASSIFICATION, rows, |r| r.classification.as_str()),
        text_column(record::MEASURE, rows, |r| r.measure.as_str()),
        text_column(record::GAS, rows, |r| r.gas.as_str()),
        text_column(record::UNIT, rows, |r| r.unit.as_str()),
        text_column(record::YEAR, rows, |r| r.year.as_str()),
        Column::new(record::NUMBER_VALUE.into(), &numbers),
        Column::new(record::STRING_VALUE.into(), &strings),
    ])?;
    Ok(df)
}

fn text_column(name: &str, rows: &[DataRow], field: fn(&DataRow) -> &str) -> Column {
    let values: Vec<&str> = rows.iter().map(field).collect();
    Column::new(name.into(), &values)
}
