//! Quote documents.
//!
//! A [`QuoteDocument`] is everything a PDF (or any other) renderer needs
//! to lay out a customer quote, already priced and formatted.  The
//! renderer makes no decisions; it only places these strings on a page.

use crate::format::{format_labour_range, format_number, format_pounds_range, format_range};
use crate::models::{AppSettings, FinalPricing, SavedJob};
use crate::pricing::price;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Assumptions and exclusions shown on a quote are capped at this many.
pub const MAX_LISTED_ITEMS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteLine {
    pub label: String,
    pub value: String,
}

impl QuoteLine {
    fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDocument {
    pub company_name: String,
    pub contact: Vec<String>,
    /// e.g. `16 October 2026`.
    pub date: String,
    pub job_title: String,
    /// e.g. `Standard • length: 4.5m • Has openings`.
    pub job_meta: String,
    pub area: String,
    pub breakdown: Vec<QuoteLine>,
    pub total: String,
    pub includes_vat: bool,
    pub materials: Vec<QuoteLine>,
    pub labour: String,
    pub assumptions: Vec<String>,
    pub exclusions: Vec<String>,
    pub disclaimer: String,
    pub pricing: FinalPricing,
}

/// Price `job` with the settings' default billing and format the result.
pub fn build_quote(job: &SavedJob, settings: &AppSettings) -> QuoteDocument {
    let pricing_inputs = settings.pricing_inputs();
    let pricing = price(&job.outputs, &pricing_inputs, job.inputs.job_type);
    let inputs = &job.inputs;
    let outputs = &job.outputs;

    let mut breakdown = vec![
        QuoteLine::new("Labour", format_pounds_range(pricing.labour_low, pricing.labour_high)),
        QuoteLine::new(
            format!("Materials (+{}%)", format_number(settings.material_markup)),
            format_pounds_range(pricing.materials_low, pricing.materials_high),
        ),
    ];
    if settings.vat_registered {
        breakdown.push(QuoteLine::new(
            format!("VAT ({}%)", format_number(settings.vat_rate)),
            format_pounds_range(pricing.vat_low, pricing.vat_high),
        ));
    }

    let mut job_meta = format!(
        "{} • {}: {}m",
        inputs.difficulty.as_str(),
        inputs.anchor_type.as_str(),
        inputs.anchor_value
    );
    if inputs.has_openings {
        job_meta.push_str(" • Has openings");
    }

    let contact = [&settings.phone, &settings.email, &settings.address]
        .into_iter()
        .flatten()
        .map(|line| line.replace('\n', ", "))
        .filter(|line| !line.trim().is_empty())
        .collect();

    let date = DateTime::<Utc>::from_timestamp_millis(job.timestamp)
        .map(|at| at.format("%-d %B %Y").to_string())
        .unwrap_or_default();

    QuoteDocument {
        company_name: settings.company_name.to_uppercase(),
        contact,
        date,
        job_title: inputs.job_type.as_str().to_uppercase(),
        job_meta,
        area: format!("{:.1} m²", outputs.area_m2),
        breakdown,
        total: format_pounds_range(pricing.total_low, pricing.total_high),
        includes_vat: settings.vat_registered,
        materials: vec![
            QuoteLine::new("Bricks", format_range(outputs.brick_count_range, format_number)),
            QuoteLine::new(
                "Sand",
                format!("{} kg", format_range(outputs.materials.sand_kg_range, format_number)),
            ),
            QuoteLine::new(
                "Cement",
                format!("{} bags", format_range(outputs.materials.cement_bags_range, format_number)),
            ),
        ],
        labour: format_labour_range(outputs.labour_hours_range),
        assumptions: outputs.assumptions.iter().take(MAX_LISTED_ITEMS).cloned().collect(),
        exclusions: outputs.exclusions.iter().take(MAX_LISTED_ITEMS).cloned().collect(),
        disclaimer: settings.disclaimer_text.clone(),
        pricing,
    }
}
