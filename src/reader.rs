use std::sync::Arc;

use polars::prelude::DataFrame;

use crate::category::{CategoryReader, QueryParameters};
use crate::config::ReaderConfig;
use crate::dimension::{DimensionTable, PartyCategory, PartyTable};
use crate::error::{DiError, Result};
use crate::gas;
use crate::transport::{HttpTransport, Transport};

/// Unified access to both party categories.
///
/// Callers name a party; the reader finds out whether it reports as an
/// Annex I or non-Annex I party. Filtering by category, classification or
/// measure needs the per-category readers.
pub struct Reader {
    annex_one: CategoryReader,
    non_annex_one: CategoryReader,
    parties: PartyTable,
    gases: DimensionTable,
    batch_size: usize,
}

impl Reader {
    /// Connect to the service described by `config`.
    pub fn new(config: ReaderConfig) -> Result<Self> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(config.clone()));
        Self::with_transport(transport, &config)
    }

    pub fn with_transport(transport: Arc<dyn Transport>, config: &ReaderConfig) -> Result<Self> {
        let annex_one =
            CategoryReader::new(PartyCategory::AnnexOne, Arc::clone(&transport), config)?;
        let non_annex_one = CategoryReader::new(PartyCategory::NonAnnexOne, transport, config)?;

        let parties = annex_one.parties().union(non_annex_one.parties());
        let gases = annex_one.gases().union(non_annex_one.gases());

        Ok(Self {
            annex_one,
            non_annex_one,
            parties,
            gases,
            batch_size: config.batch_size,
        })
    }

    /// Query all data of one party, optionally restricted to some gases.
    ///
    /// Gas names may use ASCII digits (`N2O`) or the service spelling (`N₂O`).
    pub fn query(
        &self,
        party_code: &str,
        gases: Option<&[&str]>,
        normalize_gas_names: bool,
        progress: bool,
    ) -> Result<DataFrame> {
        let reader = self.reader_for(party_code)?;

        let mut params = QueryParameters::for_parties([party_code])
            .batch_size(self.batch_size)
            .progress(progress)
            .normalize_gas_names(normalize_gas_names);
        if let Some(gases) = gases {
            params = params.gases(gases.iter().map(|g| gas::denormalize(g)));
        }

        reader.query(&params)
    }

    /// The per-category reader whose party table holds `party_code`.
    pub fn reader_for(&self, party_code: &str) -> Result<&CategoryReader> {
        if self.annex_one.parties().contains_code(party_code) {
            Ok(&self.annex_one)
        } else if self.non_annex_one.parties().contains_code(party_code) {
            Ok(&self.non_annex_one)
        } else {
            Err(DiError::UnknownParty {
                code: party_code.to_string(),
                hint: "check `Reader::parties` for a list of valid codes".to_string(),
            })
        }
    }

    pub fn annex_one_reader(&self) -> &CategoryReader {
        &self.annex_one
    }

    pub fn non_annex_one_reader(&self) -> &CategoryReader {
        &self.non_annex_one
    }

    pub fn category_reader(&self, category: PartyCategory) -> &CategoryReader {
        match category {
            PartyCategory::AnnexOne => &self.annex_one,
            PartyCategory::NonAnnexOne => &self.non_annex_one,
        }
    }

    /// Parties of both categories.
    pub fn parties(&self) -> &PartyTable {
        &self.parties
    }

    /// Gases of both categories; ids present in both keep the Annex I name.
    pub fn gases(&self) -> &DimensionTable {
        &self.gases
    }

    pub fn parties_df(&self) -> Result<DataFrame> {
        self.parties.to_frame()
    }

    pub fn gases_df(&self) -> Result<DataFrame> {
        self.gases.to_frame()
    }
}
