#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use unfccc_di_api::{DiError, ReaderConfig, Result, Transport};

/// In-memory stand-in for the data interface.
///
/// GET routes are served from a map; flexible queries answer one point per
/// requested variable, party and year with `numberValue = variable * 100 + year`.
pub struct FixtureTransport {
    routes: HashMap<String, Value>,
    fetches: Mutex<Vec<String>>,
    submissions: Mutex<Vec<Value>>,
}

impl FixtureTransport {
    pub fn new() -> Self {
        Self {
            routes: default_routes(),
            fetches: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub fn with_route(mut self, path: &str, value: Value) -> Self {
        self.routes.insert(path.to_string(), value);
        self
    }

    pub fn without_route(mut self, path: &str) -> Self {
        self.routes.remove(path);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }

    pub fn submit_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }

    pub fn submissions(&self) -> Vec<Value> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn into_shared(self) -> Arc<FixtureTransport> {
        Arc::new(self)
    }
}

impl Transport for FixtureTransport {
    fn fetch(&self, path: &str) -> Result<Value> {
        self.fetches.lock().unwrap().push(path.to_string());
        self.routes
            .get(path)
            .cloned()
            .ok_or_else(|| DiError::Transport {
                path: path.to_string(),
                status: Some(404),
                message: "http status 404".to_string(),
            })
    }

    fn submit(&self, path: &str, payload: &Value) -> Result<Vec<Value>> {
        assert_eq!(path, "records/flexible-queries");
        self.submissions.lock().unwrap().push(payload.clone());
        let ids = |key: &str| -> Vec<i64> {
            payload[key]
                .as_array()
                .map(|a| a.iter().filter_map(Value::as_i64).collect())
                .unwrap_or_default()
        };
        let mut points = Vec::new();
        for variable in ids("variableIds") {
            for party in ids("partyIds") {
                for year in ids("yearIds") {
                    points.push(json!({
                        "variableId": variable,
                        "partyId": party,
                        "yearId": year,
                        "numberValue": (variable * 100 + year) as f64,
                        "stringValue": null
                    }));
                }
            }
        }
        Ok(points)
    }
}

pub fn config() -> ReaderConfig {
    ReaderConfig::default().with_base_url("http://fixture.invalid/api/")
}

fn default_routes() -> HashMap<String, Value> {
    let mut routes = HashMap::new();
    routes.insert(
        "parties/annexOne".to_string(),
        json!([
            {
                "categoryCode": "annexOne",
                "name": "Annex I",
                "parties": [
                    {"id": 1, "code": "DEU", "name": "Germany"},
                    {"id": 2, "code": "FRA", "name": "France"},
                    {"id": 1, "code": "DEU", "name": "Germany"}
                ]
            },
            {
                "categoryCode": "annexOne",
                "name": "Groups",
                "parties": [{"id": 90, "code": "EUA", "name": "European Union"}]
            }
        ]),
    );
    routes.insert(
        "parties/nonAnnexOne".to_string(),
        json!([
            {
                "categoryCode": "nonAnnexOne",
                "name": "Non-Annex I",
                "parties": [
                    {"id": 11, "code": "AFG", "name": "Afghanistan"},
                    {"id": 12, "code": "MMR", "name": "Myanmar"}
                ]
            },
            {
                "categoryCode": "nonAnnexOne",
                "name": "Groups",
                "parties": [{"id": 91, "code": "LDC", "name": "Least developed countries"}]
            }
        ]),
    );
    routes.insert(
        "years/single".to_string(),
        json!({
            "annexOne": [
                {"id": 1, "name": "1990"},
                {"id": 2, "name": "2019"},
                {"id": 3, "name": "Last Inventory Year (2020)"}
            ],
            "nonAnnexOne": [
                {"id": 1, "name": "1990"},
                {"id": 4, "name": "2000"}
            ]
        }),
    );
    routes.insert(
        "dimension-instances/category".to_string(),
        json!({
            "annexOne": [{
                "id": 100,
                "name": "Totals",
                "children": [
                    {
                        "id": 101,
                        "name": "1. Energy",
                        "children": [{"id": 103, "name": "1.A. Fuel Combustion"}]
                    },
                    {"id": 102, "name": "2. Industrial Processes"}
                ]
            }],
            "nonAnnexOne": [{
                "id": 200,
                "name": "Total GHG",
                "children": [{"id": 201, "name": "1. Energy"}]
            }]
        }),
    );
    routes.insert(
        "dimension-instances/classification".to_string(),
        json!({
            "annexOne": [
                {"id": 300, "name": "Total for category"},
                {"id": 301, "name": "Other"}
            ],
            "nonAnnexOne": [{"id": 300, "name": "Total for category"}]
        }),
    );
    routes.insert(
        "dimension-instances/measure".to_string(),
        json!({
            "annexOne": [
                {
                    "id": 400,
                    "name": "Net emissions/removals",
                    "children": [{"id": 401, "name": "Emissions"}]
                },
                {"id": 410, "name": "Activity data"}
            ],
            "nonAnnexOne": [{"id": 400, "name": "Net emissions/removals"}]
        }),
    );
    routes.insert(
        "dimension-instances/gas".to_string(),
        json!({
            "annexOne": [
                {"id": 500, "name": "CO₂"},
                {"id": 501, "name": "N₂O"},
                {"id": 502, "name": "CH₄"}
            ],
            "nonAnnexOne": [
                {"id": 500, "name": "CO₂"},
                {"id": 501, "name": "N₂O"},
                {"id": 503, "name": "Aggregate GHGs"}
            ]
        }),
    );
    routes.insert(
        "conversion/fq".to_string(),
        json!({
            "units": [
                {"id": 600, "name": "kt"},
                {"id": 601, "name": "kt CO₂ equivalent"}
            ],
            "annexOne": [{"gasId": 501, "factor": 298}],
            "nonAnnexOne": []
        }),
    );
    routes.insert(
        "variables/fq/annexOne".to_string(),
        json!([
            {"variableId": 1000, "categoryId": 100, "classificationId": 300, "measureId": 400, "gasId": 500, "unitId": 600},
            {"variableId": 1001, "categoryId": 101, "classificationId": 300, "measureId": 401, "gasId": 501, "unitId": 601},
            {"variableId": 1002, "categoryId": 102, "classificationId": 301, "measureId": 410, "gasId": 502, "unitId": 600},
            {"variableId": 1003, "categoryId": 101, "classificationId": 300, "measureId": 400, "gasId": 500, "unitId": 600},
            {"variableId": 1003, "categoryId": 103, "classificationId": 300, "measureId": 400, "gasId": 501, "unitId": 600},
            {"variableId": 1004, "categoryId": 199, "classificationId": 300, "measureId": 499, "gasId": 502, "unitId": 600}
        ]),
    );
    routes.insert(
        "variables/fq/nonAnnexOne".to_string(),
        json!([
            {"variableId": 2000, "categoryId": 200, "classificationId": 300, "measureId": 400, "gasId": 503, "unitId": 601},
            {"variableId": 2001, "categoryId": 201, "classificationId": 300, "measureId": 400, "gasId": 500, "unitId": 600}
        ]),
    );
    routes
}
