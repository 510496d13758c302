use std::fmt;
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::DataFrame;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::assemble::{rows_to_frame, DataRow, ResponseAssembler};
use crate::config::{ReaderConfig, DEFAULT_BATCH_SIZE};
use crate::dimension::{
    Dimension, DimensionEntry, DimensionTable, PartyCategory, PartyGroup, PartyTable, UnitCatalog,
};
use crate::error::{DiError, Result};
use crate::executor::BatchedQuery;
use crate::schema::endpoint;
use crate::taxonomy::{NodeSpec, TaxonomyTree};
use crate::transport::Transport;
use crate::variables::{DimensionFilter, VariableIndex, VariableRecord};

/// Parameters of a query against a single party category.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParameters {
    /// Party codes, e.g. `DEU`.
    pub party_codes: Vec<String>,
    /// Category ids as shown by [`CategoryReader::show_category_hierarchy`]; `None` = all.
    pub category_ids: Option<Vec<i64>>,
    /// Classification names; `None` = all.
    pub classifications: Option<Vec<String>>,
    /// Measure ids as shown by [`CategoryReader::show_measure_hierarchy`]; `None` = all.
    pub measure_ids: Option<Vec<i64>>,
    /// Gas names in service spelling (`N₂O`); `None` = all.
    pub gases: Option<Vec<String>>,
    pub batch_size: usize,
    /// Show a progress bar while batches run.
    pub progress: bool,
    /// Write gas and unit labels with ASCII digits instead of subscripts.
    pub normalize_gas_names: bool,
}

impl Default for QueryParameters {
    fn default() -> Self {
        Self {
            party_codes: Vec::new(),
            category_ids: None,
            classifications: None,
            measure_ids: None,
            gases: None,
            batch_size: DEFAULT_BATCH_SIZE,
            progress: false,
            normalize_gas_names: true,
        }
    }
}

impl QueryParameters {
    pub fn for_parties<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            party_codes: codes.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn category_ids(mut self, ids: impl Into<Vec<i64>>) -> Self {
        self.category_ids = Some(ids.into());
        self
    }

    pub fn classifications<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classifications = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn measure_ids(mut self, ids: impl Into<Vec<i64>>) -> Self {
        self.measure_ids = Some(ids.into());
        self
    }

    pub fn gases<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.gases = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn normalize_gas_names(mut self, normalize: bool) -> Self {
        self.normalize_gas_names = normalize;
        self
    }
}

impl fmt::Display for QueryParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "party_codes={:?}, category_ids={:?}, classifications={:?}, measure_ids={:?}, gases={:?}",
            self.party_codes, self.category_ids, self.classifications, self.measure_ids, self.gases
        )
    }
}

/// Reader for one party category (Annex I or non-Annex I).
///
/// Loads parties, years, both taxonomies, the flat dimensions and the
/// variable catalogue once; queries afterwards only hit the flexible query
/// endpoint.
pub struct CategoryReader {
    category: PartyCategory,
    transport: Arc<dyn Transport>,
    large_selection: usize,
    parties: PartyTable,
    years: DimensionTable,
    category_tree: TaxonomyTree,
    classifications: DimensionTable,
    measure_tree: TaxonomyTree,
    gases: DimensionTable,
    unit_catalog: UnitCatalog,
    variables: VariableIndex,
}

impl CategoryReader {
    pub fn new(
        category: PartyCategory,
        transport: Arc<dyn Transport>,
        config: &ReaderConfig,
    ) -> Result<Self> {
        let groups: Vec<PartyGroup> =
            decode(transport.fetch(&endpoint::parties(category.as_str()))?)?;
        let parties = PartyTable::from_groups(groups, category)?;

        let years = DimensionTable::years(per_category::<Vec<DimensionEntry>>(
            transport.as_ref(),
            endpoint::YEARS,
            category,
        )?);

        let category_roots: Vec<NodeSpec> =
            per_category(transport.as_ref(), endpoint::CATEGORIES, category)?;
        let category_root = category_roots.first().ok_or_else(|| {
            DiError::Configuration(format!("no category hierarchy for `{category}`"))
        })?;
        let category_tree = TaxonomyTree::build(Dimension::Category, category_root)?;

        let classifications = DimensionTable::new(
            Dimension::Classification,
            per_category::<Vec<DimensionEntry>>(
                transport.as_ref(),
                endpoint::CLASSIFICATIONS,
                category,
            )?,
        );

        let measure_roots: Vec<NodeSpec> =
            per_category(transport.as_ref(), endpoint::MEASURES, category)?;
        let measure_tree = TaxonomyTree::build_forest(Dimension::Measure, &measure_roots)?;

        let gases = DimensionTable::new(
            Dimension::Gas,
            per_category::<Vec<DimensionEntry>>(transport.as_ref(), endpoint::GASES, category)?,
        );

        let conversion = transport.fetch(endpoint::CONVERSION)?;
        let units: Vec<DimensionEntry> =
            decode(field(&conversion, endpoint::CONVERSION, "units")?)?;
        let conversion_factors: Vec<Map<String, Value>> = decode(field(
            &conversion,
            endpoint::CONVERSION,
            category.as_str(),
        )?)?;
        let unit_catalog = UnitCatalog {
            units: DimensionTable::new(Dimension::Unit, units),
            conversion_factors,
        };

        let records: Vec<VariableRecord> =
            decode(transport.fetch(&endpoint::variables(category.as_str()))?)?;
        let variables = VariableIndex::from_records(records);

        debug!(
            %category,
            parties = parties.len(),
            years = years.len(),
            categories = category_tree.len(),
            measures = measure_tree.len(),
            variables = variables.len(),
            records = variables.record_count(),
            "reader initialised"
        );

        Ok(Self {
            category,
            transport,
            large_selection: config.large_selection,
            parties,
            years,
            category_tree,
            classifications,
            measure_tree,
            gases,
            unit_catalog,
            variables,
        })
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    /// Query the service and return the labelled result table.
    pub fn query(&self, params: &QueryParameters) -> Result<DataFrame> {
        let rows = self.query_rows(params)?;
        rows_to_frame(&rows)
    }

    /// Same as [`CategoryReader::query`], without building a frame.
    pub fn query_rows(&self, params: &QueryParameters) -> Result<Vec<DataRow>> {
        let party_ids = self.resolve_parties(&params.party_codes)?;
        let filter = self.resolve_filter(params)?;
        let variable_ids = self.variables.select(&filter);
        // always query all years
        let year_ids = self.years.ids();

        let executor = BatchedQuery::new(
            self.transport.as_ref(),
            params.batch_size,
            self.large_selection,
        );
        let points = if params.progress {
            let bar = ProgressBar::new(variable_ids.len() as u64);
            if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} variables") {
                bar.set_style(style);
            }
            let mut report = |sent: usize| bar.set_position(sent as u64);
            let points = executor.execute(
                &variable_ids,
                &party_ids,
                &year_ids,
                Some(&mut report as &mut dyn FnMut(usize)),
            );
            bar.finish_and_clear();
            points?
        } else {
            executor.execute(&variable_ids, &party_ids, &year_ids, None)?
        };

        let rows = self
            .assembler()
            .assemble(&points, &filter, params.normalize_gas_names)?;
        if rows.is_empty() {
            return Err(DiError::NoData(Box::new(params.clone())));
        }
        info!(
            category = %self.category,
            variables = variable_ids.len(),
            points = points.len(),
            rows = rows.len(),
            "query complete"
        );
        Ok(rows)
    }

    /// Translate the name filters of a query into id filters.
    pub fn resolve_filter(&self, params: &QueryParameters) -> Result<DimensionFilter> {
        let classification_ids = params
            .classifications
            .as_ref()
            .map(|names| resolve_names(&self.classifications, names))
            .transpose()?;
        let gas_ids = params
            .gases
            .as_ref()
            .map(|names| resolve_names(&self.gases, names))
            .transpose()?;
        Ok(DimensionFilter {
            classification_ids,
            category_ids: params.category_ids.clone(),
            measure_ids: params.measure_ids.clone(),
            gas_ids,
        })
    }

    /// Variable ids a query would request.
    pub fn select_variable_ids(&self, params: &QueryParameters) -> Result<Vec<i64>> {
        Ok(self.variables.select(&self.resolve_filter(params)?))
    }

    fn resolve_parties(&self, codes: &[String]) -> Result<Vec<i64>> {
        codes
            .iter()
            .map(|code| {
                self.parties
                    .id_of_code(code)
                    .ok_or_else(|| DiError::UnknownParty {
                        code: code.clone(),
                        hint: "check `CategoryReader::parties` for a list of valid codes"
                            .to_string(),
                    })
            })
            .collect()
    }

    fn assembler(&self) -> ResponseAssembler<'_> {
        ResponseAssembler {
            parties: &self.parties,
            variables: &self.variables,
            categories: &self.category_tree,
            measures: &self.measure_tree,
            classifications: &self.classifications,
            gases: &self.gases,
            units: &self.unit_catalog.units,
            years: &self.years,
        }
    }

    // ── Hierarchies ─────────────────────────────────────────────────────────

    /// The category tree with ids, one node per line.
    pub fn show_category_hierarchy(&self) -> String {
        self.category_tree.render()
    }

    /// The measure tree with ids, one node per line.
    pub fn show_measure_hierarchy(&self) -> String {
        self.measure_tree.render()
    }

    // ── Properties ──────────────────────────────────────────────────────────

    pub fn category(&self) -> PartyCategory {
        self.category
    }

    pub fn parties(&self) -> &PartyTable {
        &self.parties
    }

    pub fn years(&self) -> &DimensionTable {
        &self.years
    }

    pub fn category_tree(&self) -> &TaxonomyTree {
        &self.category_tree
    }

    pub fn classifications(&self) -> &DimensionTable {
        &self.classifications
    }

    pub fn measure_tree(&self) -> &TaxonomyTree {
        &self.measure_tree
    }

    pub fn gases(&self) -> &DimensionTable {
        &self.gases
    }

    pub fn units(&self) -> &UnitCatalog {
        &self.unit_catalog
    }

    pub fn variables(&self) -> &VariableIndex {
        &self.variables
    }

    pub fn parties_df(&self) -> Result<DataFrame> {
        self.parties.to_frame()
    }

    pub fn years_df(&self) -> Result<DataFrame> {
        self.years.to_frame()
    }

    pub fn classifications_df(&self) -> Result<DataFrame> {
        self.classifications.to_frame()
    }

    pub fn gases_df(&self) -> Result<DataFrame> {
        self.gases.to_frame()
    }

    pub fn units_df(&self) -> Result<DataFrame> {
        self.unit_catalog.units.to_frame()
    }

    pub fn conversion_factors_df(&self) -> Result<DataFrame> {
        self.unit_catalog.conversion_factors_frame()
    }

    pub fn variables_df(&self) -> Result<DataFrame> {
        self.variables.to_frame()
    }
}

fn resolve_names(table: &DimensionTable, names: &[String]) -> Result<Vec<i64>> {
    names.iter().map(|name| table.id_of(name)).collect()
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}

fn field(value: &Value, path: &str, key: &str) -> Result<Value> {
    value.get(key).cloned().ok_or_else(|| {
        DiError::Configuration(format!("`{path}` has no entry for `{key}`"))
    })
}

/// Fetch a listing keyed by party category and decode this category's part.
fn per_category<T: DeserializeOwned>(
    transport: &dyn Transport,
    path: &str,
    category: PartyCategory,
) -> Result<T> {
    let listing = transport.fetch(path)?;
    decode(field(&listing, path, category.as_str())?)
}
