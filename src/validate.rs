//! Input and estimate validation.
//!
//! Two gates live here.  [`validate_job_inputs`] runs before anything is
//! sent to the vision model, and [`validate_estimate`] checks whatever
//! JSON came back before it is allowed anywhere near a quote.

use crate::error::EstimateError;
use crate::models::{EstimateResult, JobInputs, Materials, Range};
use serde_json::{Map, Value};

/// Largest anchor dimension accepted, in metres.
pub const MAX_ANCHOR_METRES: f64 = 100.0;

/// Check user-supplied job inputs.  Enum fields are already constrained
/// by deserialisation, so only the anchor dimension needs checking.
pub fn validate_job_inputs(inputs: &JobInputs) -> Result<(), EstimateError> {
    check_anchor(inputs.anchor_value).map_err(|msg| EstimateError::InvalidInput(msg.to_string()))
}

/// Parse the anchor dimension as typed into a form field.
///
/// The messages are shown to the user verbatim.
pub fn parse_anchor_value(text: &str) -> Result<f64, EstimateError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(EstimateError::InvalidInput("Anchor dimension is required".into()));
    }
    let parsed: f64 = trimmed
        .parse()
        .map_err(|_| EstimateError::InvalidInput("Please enter a valid number".into()))?;
    check_anchor(parsed).map_err(|msg| EstimateError::InvalidInput(msg.to_string()))?;
    Ok(parsed)
}

fn check_anchor(value: f64) -> Result<(), &'static str> {
    if !value.is_finite() {
        Err("Please enter a valid number")
    } else if value <= 0.0 {
        Err("Value must be greater than 0")
    } else if value > MAX_ANCHOR_METRES {
        Err("Value seems too large. Please enter in meters.")
    } else {
        Ok(())
    }
}

/// Validate a parsed model response and turn it into an estimate.
///
/// Fails with [`EstimateError::MalformedResponse`] when a required field
/// is missing or mis-shaped, and with [`EstimateError::UnestimatableImage`]
/// when the result is well formed but degenerate.
pub fn validate_estimate(candidate: &Value) -> Result<EstimateResult, EstimateError> {
    let obj = candidate
        .as_object()
        .ok_or_else(|| malformed("expected a JSON object"))?;

    let area_m2 = obj
        .get("area_m2")
        .and_then(Value::as_f64)
        .ok_or_else(|| malformed("missing area_m2"))?;

    let materials = obj
        .get("materials")
        .and_then(Value::as_object)
        .ok_or_else(|| malformed("missing materials"))?;
    let materials = Materials {
        sand_kg_range: range_field(materials, "sand_kg_range")?,
        cement_bags_range: range_field(materials, "cement_bags_range")?,
        other: string_list(materials, "other")?,
    };

    let estimate = EstimateResult {
        area_m2,
        brick_count_range: range_field(obj, "brick_count_range")?,
        materials,
        labour_hours_range: range_field(obj, "labour_hours_range")?,
        recommended_price_gbp_range: range_field(obj, "recommended_price_gbp_range")?,
        assumptions: string_list(obj, "assumptions")?,
        exclusions: string_list(obj, "exclusions")?,
        notes: string_list(obj, "notes")?,
        image_analysis: optional_string(obj, "image_analysis")?,
    };

    check_estimate(&estimate)?;
    Ok(estimate)
}

/// Check the numeric rules every estimate obeys: a non-negative area,
/// ranges that are non-negative with `low <= high`, and a usable result.
///
/// Estimates that arrive already typed (a client re-pricing or saving a
/// job) go through this directly.
pub fn check_estimate(estimate: &EstimateResult) -> Result<(), EstimateError> {
    if !(estimate.area_m2 >= 0.0) {
        return Err(malformed("area_m2 is negative"));
    }

    let ranges = [
        ("brick_count_range", estimate.brick_count_range),
        ("sand_kg_range", estimate.materials.sand_kg_range),
        ("cement_bags_range", estimate.materials.cement_bags_range),
        ("labour_hours_range", estimate.labour_hours_range),
        ("recommended_price_gbp_range", estimate.recommended_price_gbp_range),
    ];
    for (key, [low, high]) in ranges {
        // Negated so NaN fails too.
        if !(low >= 0.0 && low <= high) {
            return Err(malformed(format!("{key} is not an ordered non-negative pair")));
        }
    }

    if estimate.is_degenerate() {
        return Err(EstimateError::UnestimatableImage);
    }
    Ok(())
}

fn malformed(msg: impl Into<String>) -> EstimateError {
    EstimateError::MalformedResponse(msg.into())
}

fn range_field(obj: &Map<String, Value>, key: &str) -> Result<Range, EstimateError> {
    let pair = match obj.get(key).and_then(Value::as_array) {
        Some(items) if items.len() == 2 => items,
        _ => return Err(malformed(format!("missing {key}"))),
    };
    match (pair[0].as_f64(), pair[1].as_f64()) {
        (Some(low), Some(high)) => Ok([low, high]),
        _ => Err(malformed(format!("{key} must hold two numbers"))),
    }
}

/// Optional list of strings; absent means empty.
fn string_list(obj: &Map<String, Value>, key: &str) -> Result<Vec<String>, EstimateError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| malformed(format!("{key} must contain only strings")))
            })
            .collect(),
        Some(_) => Err(malformed(format!("{key} must be a list"))),
    }
}

fn optional_string(obj: &Map<String, Value>, key: &str) -> Result<Option<String>, EstimateError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(malformed(format!("{key} must be a string"))),
    }
}
