use serde::{Deserialize, Serialize};

/// Body accepted by `POST /predict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub input_text: String,
}
