use pyo3::prelude::*;
use pyo3::types::PyModule;
use pyo3_polars::PyDataFrame;

use crate::category::QueryParameters;
use crate::config::ReaderConfig;
use crate::dimension::PartyCategory;
use crate::reader::Reader;
use crate::schema::record;

/// Python face of [`Reader`].
#[pyclass(name = "UNFCCCApiReader")]
pub struct PyReader {
    inner: Reader,
}

#[pymethods]
impl PyReader {
    #[new]
    #[pyo3(signature = (base_url=None))]
    fn new(base_url: Option<String>) -> PyResult<Self> {
        let mut config = ReaderConfig::from_env();
        if let Some(url) = base_url {
            config.base_url = url;
        }
        Ok(Self {
            inner: Reader::new(config)?,
        })
    }

    /// Query all data of one party.
    #[pyo3(signature = (party_code, gases=None, normalize_gas_names=true, progress=false))]
    fn query(
        &self,
        party_code: &str,
        gases: Option<Vec<String>>,
        normalize_gas_names: bool,
        progress: bool,
    ) -> PyResult<PyDataFrame> {
        let gases: Option<Vec<&str>> = gases
            .as_ref()
            .map(|g| g.iter().map(String::as_str).collect());
        let df = self
            .inner
            .query(party_code, gases.as_deref(), normalize_gas_names, progress)?;
        Ok(PyDataFrame(df))
    }

    /// Filtered query against one party category (`annexOne` or `nonAnnexOne`).
    #[pyo3(signature = (
        party_category,
        party_codes,
        category_ids=None,
        classifications=None,
        measure_ids=None,
        gases=None,
        batch_size=1000,
        progress=false,
        normalize_gas_names=true,
    ))]
    #[allow(clippy::too_many_arguments)]
    fn query_category(
        &self,
        party_category: &str,
        party_codes: Vec<String>,
        category_ids: Option<Vec<i64>>,
        classifications: Option<Vec<String>>,
        measure_ids: Option<Vec<i64>>,
        gases: Option<Vec<String>>,
        batch_size: usize,
        progress: bool,
        normalize_gas_names: bool,
    ) -> PyResult<PyDataFrame> {
        let category: PartyCategory = party_category.parse()?;
        let params = QueryParameters {
            party_codes,
            category_ids,
            classifications,
            measure_ids,
            gases,
            batch_size,
            progress,
            normalize_gas_names,
        };
        let df = self.inner.category_reader(category).query(&params)?;
        Ok(PyDataFrame(df))
    }

    /// Print the category tree of a party category with ids.
    fn show_category_hierarchy(&self, party_category: &str) -> PyResult<String> {
        let category: PartyCategory = party_category.parse()?;
        Ok(self.inner.category_reader(category).show_category_hierarchy())
    }

    /// Print the measure tree of a party category with ids.
    fn show_measure_hierarchy(&self, party_category: &str) -> PyResult<String> {
        let category: PartyCategory = party_category.parse()?;
        Ok(self.inner.category_reader(category).show_measure_hierarchy())
    }

    // ── Properties ──────────────────────────────────────────────────────────

    #[getter]
    fn parties(&self) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(self.inner.parties_df()?))
    }

    #[getter]
    fn gases(&self) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(self.inner.gases_df()?))
    }
}

/// Export result column names as a Python submodule.
fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    let columns = PyModule::new(m.py(), "columns")?;
    columns.add("PARTY", record::PARTY)?;
    columns.add("CATEGORY", record::CATEGORY)?;
    columns.add("CLASSIFICATION", record::CLASSIFICATION)?;
    columns.add("MEASURE", record::MEASURE)?;
    columns.add("GAS", record::GAS)?;
    columns.add("UNIT", record::UNIT)?;
    columns.add("YEAR", record::YEAR)?;
    columns.add("NUMBER_VALUE", record::NUMBER_VALUE)?;
    columns.add("STRING_VALUE", record::STRING_VALUE)?;
    m.add_submodule(&columns)?;
    Ok(())
}

#[pymodule]
fn unfccc_di_api(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyReader>()?;
    add_schema_exports(m)?;
    Ok(())
}
