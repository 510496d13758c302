/// Column-name constants for the frames produced by this crate.
/// Single source of truth - exported to Python via PyO3.

// ── Query result columns ────────────────────────────────────────────────────
pub mod record {
    pub const PARTY: &str = "party";
    pub const CATEGORY: &str = "category";
    pub const CLASSIFICATION: &str = "classification";
    pub const MEASURE: &str = "measure";
    pub const GAS: &str = "gas";
    pub const UNIT: &str = "unit";
    pub const YEAR: &str = "year";
    pub const NUMBER_VALUE: &str = "numberValue";
    pub const STRING_VALUE: &str = "stringValue";

    /// Sort key of an assembled table, in priority order.
    pub const SORT_KEY: [&str; 7] = [PARTY, CATEGORY, CLASSIFICATION, MEASURE, GAS, UNIT, YEAR];
}

// ── Lookup table columns ────────────────────────────────────────────────────
pub mod lookup {
    pub const ID: &str = "id";
    pub const CODE: &str = "code";
    pub const NAME: &str = "name";
}

// ── Variable table columns ──────────────────────────────────────────────────
pub mod variable {
    pub const VARIABLE_ID: &str = "variableId";
    pub const CATEGORY_ID: &str = "categoryId";
    pub const CLASSIFICATION_ID: &str = "classificationId";
    pub const MEASURE_ID: &str = "measureId";
    pub const GAS_ID: &str = "gasId";
    pub const UNIT_ID: &str = "unitId";
}

// ── Service endpoints ───────────────────────────────────────────────────────
pub mod endpoint {
    pub const YEARS: &str = "years/single";
    pub const CATEGORIES: &str = "dimension-instances/category";
    pub const CLASSIFICATIONS: &str = "dimension-instances/classification";
    pub const MEASURES: &str = "dimension-instances/measure";
    pub const GASES: &str = "dimension-instances/gas";
    pub const CONVERSION: &str = "conversion/fq";
    pub const FLEXIBLE_QUERY: &str = "records/flexible-queries";

    pub fn parties(category: &str) -> String {
        format!("parties/{category}")
    }

    pub fn variables(category: &str) -> String {
        format!("variables/fq/{category}")
    }
}
