//! Data models for the quoting engine.
//!
//! The `models` module defines the serialisable structs and enums that
//! flow through the estimation and pricing pipeline: the job a user
//! describes, the estimate produced for it, the billing preferences
//! applied on top and the final priced breakdown.  Wire names follow
//! the JSON the mobile and web clients already exchange, so these
//! values can be persisted or returned over HTTP verbatim.

use serde::{Deserialize, Serialize};

/// An ordered `[low, high]` pair.  Every range in an [`EstimateResult`]
/// satisfies `low <= high`.
pub type Range = [f64; 2];

/// The kind of masonry work being quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    Brickwork,
    Blockwork,
    Repointing,
    #[serde(rename = "Demo+Rebuild")]
    DemoRebuild,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::Brickwork => "Brickwork",
            JobType::Blockwork => "Blockwork",
            JobType::Repointing => "Repointing",
            JobType::DemoRebuild => "Demo+Rebuild",
        }
    }
}

/// Which wall dimension the user physically measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorType {
    Length,
    Height,
}

impl AnchorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnchorType::Length => "length",
            AnchorType::Height => "height",
        }
    }
}

/// How awkward the job looks.  Drives the width of every estimated range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Standard,
    Tricky,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Standard => "Standard",
            Difficulty::Tricky => "Tricky",
        }
    }
}

/// The job as described by the user before any estimate is made.
///
/// `anchor_value` is in metres and must lie in `(0, 100]`; see
/// [`crate::validate::validate_job_inputs`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInputs {
    pub job_type: JobType,
    pub anchor_type: AnchorType,
    pub anchor_value: f64,
    pub difficulty: Difficulty,
    /// Doors or windows in the wall reduce the effective area.
    pub has_openings: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
    /// Billing preferences captured alongside the job, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<PricingInputs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl JobInputs {
    /// Inputs with no optional fields set.
    pub fn new(
        job_type: JobType,
        anchor_type: AnchorType,
        anchor_value: f64,
        difficulty: Difficulty,
        has_openings: bool,
    ) -> Self {
        Self {
            job_type,
            anchor_type,
            anchor_value,
            difficulty,
            has_openings,
            job_description: None,
            pricing: None,
            photo_uri: None,
            photo_url: None,
        }
    }
}

/// Material quantities carried by an estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Materials {
    pub sand_kg_range: Range,
    pub cement_bags_range: Range,
    /// Free-text extras such as skip hire or wall ties.
    #[serde(default)]
    pub other: Vec<String>,
}

/// The canonical estimate for a job, produced either by the vision
/// model or by [`crate::fallback::estimate_from_inputs_only`].
///
/// Once produced an estimate is never mutated; it is stored verbatim
/// inside a [`SavedJob`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateResult {
    pub area_m2: f64,
    pub brick_count_range: Range,
    pub materials: Materials,
    pub labour_hours_range: Range,
    pub recommended_price_gbp_range: Range,
    #[serde(default)]
    pub assumptions: Vec<String>,
    #[serde(default)]
    pub exclusions: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
    /// The model's description of what it saw in the photo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_analysis: Option<String>,
}

impl EstimateResult {
    /// True when the estimate carries no usable numbers: zero area with
    /// no bricks, or a zero price range.  Degenerate estimates are never
    /// shown to a user.
    pub fn is_degenerate(&self) -> bool {
        let no_area = self.area_m2 == 0.0
            && self.brick_count_range[0] == 0.0
            && self.brick_count_range[1] == 0.0;
        let no_price = self.recommended_price_gbp_range[0] == 0.0
            && self.recommended_price_gbp_range[1] == 0.0;
        no_area || no_price
    }
}

/// How the user bills labour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PricingMethod {
    #[serde(rename = "day_rate")]
    DayRate,
    #[serde(rename = "per_1000_bricks")]
    Per1000Bricks,
    #[serde(rename = "per_m2")]
    PerM2,
}

/// User billing configuration.  Only the rate matching `method` is
/// consulted when pricing labour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingInputs {
    pub method: PricingMethod,
    pub day_rate: f64,
    pub rate_per1000: f64,
    pub rate_per_m2: f64,
    /// Percentage added to the materials cost.
    pub material_markup: f64,
    #[serde(rename = "includeVAT")]
    pub include_vat: bool,
    /// Percentage, typically 20.
    pub vat_rate: f64,
}

impl Default for PricingInputs {
    fn default() -> Self {
        AppSettings::default().pricing_inputs()
    }
}

/// A priced quote, rounded to whole pounds.  Derived on demand from an
/// estimate and a set of [`PricingInputs`]; never persisted on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalPricing {
    pub labour_low: u64,
    pub labour_high: u64,
    pub materials_low: u64,
    pub materials_high: u64,
    pub subtotal_low: u64,
    pub subtotal_high: u64,
    pub vat_low: u64,
    pub vat_high: u64,
    pub total_low: u64,
    pub total_high: u64,
}

/// A job persisted by the [`crate::store::JobStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedJob {
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub inputs: JobInputs,
    pub outputs: EstimateResult,
    #[serde(default)]
    pub photo_uri: String,
}

/// Per-user preferences: quote branding and default billing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub company_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub disclaimer_text: String,
    pub default_pricing_method: PricingMethod,
    pub default_day_rate: f64,
    pub default_rate_per1000: f64,
    pub default_rate_per_m2: f64,
    pub material_markup: f64,
    pub vat_registered: bool,
    pub vat_rate: f64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            company_name: String::new(),
            phone: None,
            email: None,
            address: None,
            disclaimer_text: "This is an estimate only and is subject to site survey. Prices may vary \
                based on actual conditions, material availability, and scope changes."
                .to_string(),
            default_pricing_method: PricingMethod::DayRate,
            default_day_rate: 220.0,
            default_rate_per1000: 500.0,
            default_rate_per_m2: 65.0,
            material_markup: 10.0,
            vat_registered: false,
            vat_rate: 20.0,
        }
    }
}

impl AppSettings {
    /// The billing configuration these settings imply.
    pub fn pricing_inputs(&self) -> PricingInputs {
        PricingInputs {
            method: self.default_pricing_method,
            day_rate: self.default_day_rate,
            rate_per1000: self.default_rate_per1000,
            rate_per_m2: self.default_rate_per_m2,
            material_markup: self.material_markup,
            include_vat: self.vat_registered,
            vat_rate: self.vat_rate,
        }
    }
}

/// Body of `POST /api/estimate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    pub inputs: JobInputs,
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Envelope returned by `POST /api/estimate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<EstimateResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `POST /api/price`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRequest {
    pub estimate: EstimateResult,
    pub pricing: PricingInputs,
    pub job_type: JobType,
}

/// Body of `POST /api/jobs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveJobRequest {
    pub inputs: JobInputs,
    pub outputs: EstimateResult,
    #[serde(default)]
    pub photo_uri: String,
}

/// A saved job together with its price under the current settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobQuote {
    pub job: SavedJob,
    pub pricing: FinalPricing,
}
