//! Pricing engine.
//!
//! The `pricing` module turns a canonical [`EstimateResult`] and the
//! user's [`PricingInputs`] into a [`FinalPricing`] breakdown.  Labour
//! is priced by an implementation of the [`LabourPricer`] trait, one per
//! billing method, so each method can keep the spread of whichever
//! estimated range it bills against.  Materials are priced from
//! midpoint quantities and given their own band.
//!
//! Low and high bounds are carried separately through every stage and
//! never mixed, so the low quote reads as a coherent "everything goes
//! well" scenario.

use crate::models::{EstimateResult, FinalPricing, JobType, PricingInputs, PricingMethod, Range};

pub const HOURS_PER_DAY: f64 = 8.0;
/// Band manufactured around `area x rate` for per-m² billing.
pub const PER_M2_BAND: f64 = 0.05;
/// Band applied around the marked-up materials cost.
pub const MATERIALS_BAND: f64 = 0.10;

/// Approximate UK trade prices for consumables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialCosts {
    pub brick_each: f64,
    pub block_each: f64,
    pub sand_per_kg: f64,
    pub cement_per_bag: f64,
}

impl Default for MaterialCosts {
    fn default() -> Self {
        Self {
            brick_each: 0.50,
            block_each: 1.50,
            sand_per_kg: 0.05,
            cement_per_bag: 8.0,
        }
    }
}

impl MaterialCosts {
    /// Cost of one walling unit for the given job.
    pub fn unit_cost(&self, job_type: JobType) -> f64 {
        match job_type {
            JobType::Blockwork => self.block_each,
            _ => self.brick_each,
        }
    }
}

/// Prices labour for one billing method.
///
/// Implementations return `(low, high)` in pounds, derived from a range
/// the estimate already carries or one the pricer manufactures, never
/// from a midpoint alone.
pub trait LabourPricer: Send + Sync {
    fn labour_range(&self, estimate: &EstimateResult) -> (f64, f64);
}

/// Bills the estimated hours in days at a day rate.
pub struct DayRatePricer {
    pub day_rate: f64,
}

impl LabourPricer for DayRatePricer {
    fn labour_range(&self, estimate: &EstimateResult) -> (f64, f64) {
        let [low, high] = estimate.labour_hours_range;
        (
            low / HOURS_PER_DAY * self.day_rate,
            high / HOURS_PER_DAY * self.day_rate,
        )
    }
}

/// Bills per thousand bricks laid.
pub struct PerThousandBricksPricer {
    pub rate_per_1000: f64,
}

impl LabourPricer for PerThousandBricksPricer {
    fn labour_range(&self, estimate: &EstimateResult) -> (f64, f64) {
        let [low, high] = estimate.brick_count_range;
        (
            low / 1000.0 * self.rate_per_1000,
            high / 1000.0 * self.rate_per_1000,
        )
    }
}

/// Bills per square metre of wall.  The estimate has a single area, so
/// a narrow band is applied around it.
pub struct PerSquareMetrePricer {
    pub rate_per_m2: f64,
}

impl LabourPricer for PerSquareMetrePricer {
    fn labour_range(&self, estimate: &EstimateResult) -> (f64, f64) {
        let base = estimate.area_m2 * self.rate_per_m2;
        (base * (1.0 - PER_M2_BAND), base * (1.0 + PER_M2_BAND))
    }
}

/// The pricer matching `pricing.method`, holding only that method's rate.
pub fn labour_pricer(pricing: &PricingInputs) -> Box<dyn LabourPricer> {
    match pricing.method {
        PricingMethod::DayRate => Box::new(DayRatePricer {
            day_rate: pricing.day_rate,
        }),
        PricingMethod::Per1000Bricks => Box::new(PerThousandBricksPricer {
            rate_per_1000: pricing.rate_per1000,
        }),
        PricingMethod::PerM2 => Box::new(PerSquareMetrePricer {
            rate_per_m2: pricing.rate_per_m2,
        }),
    }
}

fn midpoint(range: Range) -> f64 {
    (range[0] + range[1]) / 2.0
}

/// Marked-up materials cost as a `(low, high)` band.
pub fn materials_range(
    estimate: &EstimateResult,
    pricing: &PricingInputs,
    job_type: JobType,
    costs: &MaterialCosts,
) -> (f64, f64) {
    let base = midpoint(estimate.brick_count_range) * costs.unit_cost(job_type)
        + midpoint(estimate.materials.sand_kg_range) * costs.sand_per_kg
        + midpoint(estimate.materials.cement_bags_range) * costs.cement_per_bag;
    let marked_up = base * (1.0 + pricing.material_markup / 100.0);
    (
        marked_up * (1.0 - MATERIALS_BAND),
        marked_up * (1.0 + MATERIALS_BAND),
    )
}

/// Price an estimate with the default material costs.
pub fn price(estimate: &EstimateResult, pricing: &PricingInputs, job_type: JobType) -> FinalPricing {
    price_with_costs(estimate, pricing, job_type, &MaterialCosts::default())
}

/// Price an estimate.
///
/// Arithmetic stays in floating point until the end.  Labour and
/// materials are then rounded to whole pounds, and subtotal and total
/// are summed from the rounded parts so the breakdown always adds up.
/// VAT is rounded from the unrounded subtotal.
pub fn price_with_costs(
    estimate: &EstimateResult,
    pricing: &PricingInputs,
    job_type: JobType,
    costs: &MaterialCosts,
) -> FinalPricing {
    let (labour_low, labour_high) = labour_pricer(pricing).labour_range(estimate);
    let (materials_low, materials_high) = materials_range(estimate, pricing, job_type, costs);

    let vat_fraction = if pricing.include_vat {
        pricing.vat_rate / 100.0
    } else {
        0.0
    };
    let vat_low = (labour_low + materials_low) * vat_fraction;
    let vat_high = (labour_high + materials_high) * vat_fraction;

    let labour = (pounds(labour_low), pounds(labour_high));
    let materials = (pounds(materials_low), pounds(materials_high));
    let subtotal = (labour.0 + materials.0, labour.1 + materials.1);
    let vat = (pounds(vat_low), pounds(vat_high));

    FinalPricing {
        labour_low: labour.0,
        labour_high: labour.1,
        materials_low: materials.0,
        materials_high: materials.1,
        subtotal_low: subtotal.0,
        subtotal_high: subtotal.1,
        vat_low: vat.0,
        vat_high: vat.1,
        total_low: subtotal.0 + vat.0,
        total_high: subtotal.1 + vat.1,
    }
}

fn pounds(amount: f64) -> u64 {
    if amount.is_finite() && amount > 0.0 {
        amount.round() as u64
    } else {
        0
    }
}
