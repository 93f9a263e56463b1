//! Turns raw model output into a canonical estimate.
//!
//! The model is asked for a JSON object but may return anything.  Text
//! that is not JSON, or JSON that is not shaped like an estimate, is a
//! real failure for that attempt.  A well-formed estimate with nothing
//! in it (the model gave up on an ambiguous photo) is replaced by the
//! dimension-only estimate so the user always gets a number.

use crate::error::EstimateError;
use crate::fallback::estimate_from_inputs_only;
use crate::models::{EstimateResult, JobInputs};
use crate::validate::validate_estimate;
use serde_json::Value;
use tracing::{debug, warn};

pub fn normalize(raw_text: &str, inputs: &JobInputs) -> Result<EstimateResult, EstimateError> {
    let parsed: Value = serde_json::from_str(raw_text).map_err(|err| {
        warn!(error = %err, "model response is not JSON");
        EstimateError::UnparsableResponse(err.to_string())
    })?;

    match validate_estimate(&parsed) {
        Ok(estimate) => {
            debug!(area_m2 = estimate.area_m2, "model estimate accepted");
            Ok(estimate)
        }
        Err(EstimateError::UnestimatableImage) => {
            warn!(
                job_type = inputs.job_type.as_str(),
                anchor_value = inputs.anchor_value,
                "degenerate model estimate, using dimension-only fallback"
            );
            Ok(estimate_from_inputs_only(inputs))
        }
        Err(err) => {
            warn!(error = %err, "model response rejected");
            Err(err)
        }
    }
}
