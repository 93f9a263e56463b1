//! Dimension-only estimation.
//!
//! When the vision model cannot say anything useful about a photo the
//! quote still needs numbers.  [`estimate_from_inputs_only`] derives a
//! wall area from the single measured dimension and scales a set of
//! fixed UK masonry constants from it.  It uses no photo evidence and
//! cannot fail for inputs that passed
//! [`crate::validate::validate_job_inputs`].

use crate::models::{AnchorType, Difficulty, EstimateResult, JobInputs, JobType, Materials, Range};

/// Wall height assumed when only the length was measured, in metres.
pub const ASSUMED_WALL_HEIGHT_M: f64 = 2.1;
/// Length-to-height ratio assumed when only the height was measured.
pub const ASSUMED_LENGTH_TO_HEIGHT: f64 = 1.5;
/// Share of the area removed for doors and windows.
pub const OPENINGS_REDUCTION: f64 = 0.15;
pub const MIN_AREA_M2: f64 = 2.0;
pub const MAX_AREA_M2: f64 = 100.0;

/// Half-brick wall in stretcher bond.
pub const BRICKS_PER_M2: f64 = 60.0;
pub const SAND_KG_PER_M2: f64 = 50.0;
pub const M2_PER_CEMENT_BAG: f64 = 2.5;
pub const LABOUR_HOURS_PER_M2: f64 = 4.0;

/// Symmetric spread applied to every base quantity.
pub fn variance_for(difficulty: Difficulty) -> f64 {
    match difficulty {
        Difficulty::Easy => 0.15,
        Difficulty::Standard => 0.25,
        Difficulty::Tricky => 0.35,
    }
}

/// Baseline all-in price per square metre.  Repointing buys no new
/// units; demolition carries disposal on top of a rebuild.
pub fn baseline_rate_per_m2(job_type: JobType) -> f64 {
    match job_type {
        JobType::Repointing => 80.0,
        JobType::Brickwork | JobType::Blockwork => 130.0,
        JobType::DemoRebuild => 180.0,
    }
}

/// Wall area in m² implied by the anchor dimension, before clamping.
fn derived_area(inputs: &JobInputs) -> f64 {
    let anchor = inputs.anchor_value;
    let area = match inputs.anchor_type {
        AnchorType::Length => anchor * ASSUMED_WALL_HEIGHT_M,
        AnchorType::Height => anchor * (anchor * ASSUMED_LENGTH_TO_HEIGHT),
    };
    if inputs.has_openings {
        area * (1.0 - OPENINGS_REDUCTION)
    } else {
        area
    }
}

fn spread(base: f64, variance: f64) -> Range {
    [
        (base * (1.0 - variance)).round(),
        (base * (1.0 + variance)).round(),
    ]
}

/// Produce a non-degenerate estimate from the job inputs alone.
pub fn estimate_from_inputs_only(inputs: &JobInputs) -> EstimateResult {
    let area = derived_area(inputs).clamp(MIN_AREA_M2, MAX_AREA_M2);
    let variance = variance_for(inputs.difficulty);

    let cement = spread((area / M2_PER_CEMENT_BAG).max(1.0), variance);
    let cement_bags_range = [cement[0].max(1.0), cement[1].max(1.0)];

    let mut other = Vec::new();
    if inputs.job_type == JobType::DemoRebuild {
        other.push("Skip hire".to_string());
        other.push("Scaffolding possible".to_string());
    }

    EstimateResult {
        area_m2: (area * 10.0).round() / 10.0,
        brick_count_range: spread(area * BRICKS_PER_M2, variance),
        materials: Materials {
            sand_kg_range: spread(area * SAND_KG_PER_M2, variance),
            cement_bags_range,
            other,
        },
        labour_hours_range: spread(area * LABOUR_HOURS_PER_M2, variance),
        recommended_price_gbp_range: spread(area * baseline_rate_per_m2(inputs.job_type), variance),
        assumptions: assumptions(inputs, variance),
        exclusions: vec![
            "Scaffolding (if required)".to_string(),
            "Footings and foundations".to_string(),
            "Skip hire".to_string(),
            "Planning or building control permits".to_string(),
        ],
        notes: vec![
            "Dimension-only estimate: quantities are not based on photo analysis".to_string(),
            "A site visit is recommended to confirm measurements before quoting".to_string(),
        ],
        image_analysis: None,
    }
}

fn assumptions(inputs: &JobInputs, variance: f64) -> Vec<String> {
    let anchor = inputs.anchor_value;
    let dimension = match inputs.anchor_type {
        AnchorType::Length => format!(
            "Area derived from the measured length of {anchor} m and an assumed wall height of {ASSUMED_WALL_HEIGHT_M} m"
        ),
        AnchorType::Height => format!(
            "Area derived from the measured height of {anchor} m and an assumed length of {ASSUMED_LENGTH_TO_HEIGHT}x the height"
        ),
    };
    let mut out = vec![
        dimension,
        "Standard UK brick (215x102.5x65mm) in stretcher bond, 60 bricks per m²".to_string(),
        "Photo analysis was inconclusive".to_string(),
        format!(
            "Ranges are ±{}% for {} difficulty",
            (variance * 100.0).round(),
            inputs.difficulty.as_str()
        ),
    ];
    if inputs.has_openings {
        out.push("Area reduced by 15% for doors and windows".to_string());
    }
    out
}
