use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{DiError, Result};
use crate::schema::endpoint;
use crate::transport::Transport;

/// One observation as returned by a flexible query.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    pub variable_id: i64,
    pub party_id: i64,
    pub year_id: i64,
    #[serde(default)]
    pub number_value: Option<f64>,
    #[serde(default)]
    pub string_value: Option<String>,
}

/// Request body of a flexible query.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FlexibleQuery<'a> {
    variable_ids: &'a [i64],
    party_ids: &'a [i64],
    year_ids: &'a [i64],
}

/// Issues flexible queries in consecutive variable-id batches.
///
/// Batches run one after another; the concatenated result does not depend on
/// the batch size.
pub struct BatchedQuery<'a> {
    transport: &'a dyn Transport,
    batch_size: usize,
    large_selection: usize,
}

impl<'a> BatchedQuery<'a> {
    pub fn new(transport: &'a dyn Transport, batch_size: usize, large_selection: usize) -> Self {
        Self {
            transport,
            batch_size,
            large_selection,
        }
    }

    /// Fetch all points for the variables, parties and years.
    ///
    /// `progress` receives the cumulative number of variable ids sent after each batch.
    pub fn execute(
        &self,
        variable_ids: &[i64],
        party_ids: &[i64],
        year_ids: &[i64],
        mut progress: Option<&mut dyn FnMut(usize)>,
    ) -> Result<Vec<DataPoint>> {
        if self.batch_size == 0 {
            return Err(DiError::InvalidArgument(
                "batch size must be at least 1".to_string(),
            ));
        }
        if variable_ids.len() > self.large_selection {
            warn!(
                variables = variable_ids.len(),
                "Your query parameters lead to a lot of variables selected at once. \
                 If the query fails, try restricting your query more."
            );
        }

        let mut points = Vec::new();
        let mut sent = 0;
        for batch in variable_ids.chunks(self.batch_size) {
            let payload = serde_json::to_value(FlexibleQuery {
                variable_ids: batch,
                party_ids,
                year_ids,
            })?;
            let raw = self.transport.submit(endpoint::FLEXIBLE_QUERY, &payload)?;
            debug!(batch = batch.len(), points = raw.len(), "flexible query answered");
            for value in raw {
                points.push(serde_json::from_value::<DataPoint>(value)?);
            }

            sent += batch.len();
            if let Some(report) = progress.as_mut() {
                report(sent);
            }
        }
        Ok(points)
    }
}
