use serde::{Deserialize, Serialize};

/// Payload forwarded to the hosted model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendPredictRequest {
    pub input_text: String,
    pub target: String,
    pub data_file_name: String,
}
