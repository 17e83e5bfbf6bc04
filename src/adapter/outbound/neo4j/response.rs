//! Neo4j HTTP transaction response decoding.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::PipelineError;

/// Body returned by `POST /db/{database}/tx/commit`.
#[derive(Debug, Deserialize)]
pub struct TxResponse {
    #[serde(default)]
    pub results: Vec<StatementResult>,
    #[serde(default)]
    pub errors: Vec<TxError>,
}

#[derive(Debug, Deserialize)]
pub struct StatementResult {
    pub columns: Vec<String>,
    #[serde(default)]
    pub data: Vec<DataRow>,
}

#[derive(Debug, Deserialize)]
pub struct DataRow {
    pub row: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct TxError {
    pub code: String,
    pub message: String,
}

impl TxResponse {
    /// Rows of the first statement as column-keyed objects.
    ///
    /// # Errors
    ///
    /// Reports server-side errors and rows whose width disagrees with the
    /// column list.
    pub fn into_records(self, query: &'static str) -> Result<Vec<Map<String, Value>>, PipelineError> {
        if let Some(err) = self.errors.first() {
            return Err(PipelineError::upstream(
                query,
                format!("{}: {}", err.code, err.message),
            ));
        }
        let Some(result) = self.results.into_iter().next() else {
            return Ok(Vec::new());
        };
        let columns = result.columns;
        result
            .data
            .into_iter()
            .map(|data| {
                if data.row.len() != columns.len() {
                    return Err(PipelineError::upstream(
                        query,
                        format!("row has {} values for {} columns", data.row.len(), columns.len()),
                    ));
                }
                Ok(columns.iter().cloned().zip(data.row).collect())
            })
            .collect()
    }

    /// Rows of the first statement decoded into `T`.
    ///
    /// # Errors
    ///
    /// As [`into_records`](Self::into_records), plus rows that do not fit `T`.
    pub fn decode<T: DeserializeOwned>(self, query: &'static str) -> Result<Vec<T>, PipelineError> {
        self.into_records(query)?
            .into_iter()
            .map(|record| {
                serde_json::from_value(Value::Object(record))
                    .map_err(|e| PipelineError::upstream(query, format!("undecodable row: {e}")))
            })
            .collect()
    }
}
