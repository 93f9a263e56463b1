//! Estimation and quoting pipeline.
//!
//! The `engine` module strings the pieces together.  [`estimate_job`]
//! takes validated job inputs and a photo through the vision provider
//! and the normalizer to a canonical [`EstimateResult`].
//! [`price_saved_jobs`] uses the [`rayon`] crate to price a whole list
//! of saved jobs across CPU cores for the jobs overview.

use crate::error::EstimateError;
use crate::models::{EstimateResult, JobInputs, JobQuote, PricingInputs, SavedJob};
use crate::normalize::normalize;
use crate::pricing::price;
use crate::prompt::{build_user_message, SYSTEM_MESSAGE};
use crate::provider::{ImageSource, VisionProvider};
use crate::validate::validate_job_inputs;
use rayon::prelude::*;
use tracing::{info, instrument};

/// Estimate a job from its inputs and photo.
///
/// Invalid inputs are rejected before the provider is called.  Provider
/// failures and unusable responses are returned to the caller; a
/// degenerate response is silently replaced by the dimension-only
/// estimate.
#[instrument(skip_all, fields(job_type = inputs.job_type.as_str(), provider = provider.name()))]
pub async fn estimate_job(
    inputs: &JobInputs,
    image: &ImageSource,
    provider: &dyn VisionProvider,
) -> Result<EstimateResult, EstimateError> {
    validate_job_inputs(inputs)?;

    let user_prompt = build_user_message(inputs);
    let raw = provider.complete(SYSTEM_MESSAGE, &user_prompt, image).await?;
    let estimate = normalize(&raw, inputs)?;

    info!(
        area_m2 = estimate.area_m2,
        price_low = estimate.recommended_price_gbp_range[0],
        price_high = estimate.recommended_price_gbp_range[1],
        "estimate ready"
    );
    Ok(estimate)
}

/// Price every saved job with the same billing configuration.
///
/// A job's own embedded pricing, when present, takes precedence over
/// `default_pricing`.  Output order matches input order.
pub fn price_saved_jobs(jobs: Vec<SavedJob>, default_pricing: &PricingInputs) -> Vec<JobQuote> {
    jobs.into_par_iter()
        .map(|job| {
            let pricing = job.inputs.pricing.as_ref().unwrap_or(default_pricing);
            let final_pricing = price(&job.outputs, pricing, job.inputs.job_type);
            JobQuote {
                job,
                pricing: final_pricing,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::estimate_from_inputs_only;
    use crate::models::{AnchorType, Difficulty, JobType, PricingMethod};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubProvider {
        reply: Result<String, EstimateError>,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn replying(reply: Result<String, EstimateError>) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl VisionProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        async fn complete(&self, _: &str, user_prompt: &str, _: &ImageSource) -> Result<String, EstimateError> {
            assert!(user_prompt.contains("INPUTS:"));
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    fn inputs(anchor_value: f64) -> JobInputs {
        JobInputs::new(JobType::Brickwork, AnchorType::Length, anchor_value, Difficulty::Standard, false)
    }

    fn image() -> ImageSource {
        ImageSource::Url("https://example.com/wall.jpg".into())
    }

    #[tokio::test]
    async fn invalid_inputs_never_reach_the_provider() {
        let provider = StubProvider::replying(Ok("{}".into()));
        for bad in [0.0, -1.0, 150.0] {
            let err = estimate_job(&inputs(bad), &image(), &provider).await.unwrap_err();
            assert!(matches!(err, EstimateError::InvalidInput(_)));
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn degenerate_reply_falls_back() {
        let reply = json!({
            "area_m2": 0,
            "brick_count_range": [0, 0],
            "materials": {"sand_kg_range": [0, 0], "cement_bags_range": [0, 0], "other": []},
            "labour_hours_range": [0, 0],
            "recommended_price_gbp_range": [0, 0],
            "assumptions": [], "exclusions": [], "notes": []
        });
        let provider = StubProvider::replying(Ok(reply.to_string()));
        let estimate = estimate_job(&inputs(4.5), &image(), &provider).await.unwrap();
        assert_eq!(estimate, estimate_from_inputs_only(&inputs(4.5)));
    }

    #[tokio::test]
    async fn provider_errors_propagate() {
        let provider = StubProvider::replying(Err(EstimateError::provider(Some(429), "Rate limit reached")));
        let err = estimate_job(&inputs(4.5), &image(), &provider).await.unwrap_err();
        assert_eq!(err, EstimateError::provider(Some(429), "Rate limit reached"));
    }

    #[test]
    fn batch_pricing_respects_embedded_pricing() {
        let defaults = PricingInputs::default();
        let mut custom = defaults.clone();
        custom.method = PricingMethod::PerM2;
        custom.rate_per_m2 = 100.0;

        let mut with_own = inputs(5.0);
        with_own.pricing = Some(custom.clone());
        let jobs: Vec<SavedJob> = [inputs(5.0), with_own]
            .into_iter()
            .enumerate()
            .map(|(i, inputs)| SavedJob {
                id: format!("job-{i}"),
                timestamp: i as i64,
                outputs: estimate_from_inputs_only(&inputs),
                inputs,
                photo_uri: String::new(),
            })
            .collect();

        let quotes = price_saved_jobs(jobs.clone(), &defaults);
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].job.id, "job-0");
        assert_eq!(quotes[0].pricing, price(&jobs[0].outputs, &defaults, JobType::Brickwork));
        assert_eq!(quotes[1].pricing, price(&jobs[1].outputs, &custom, JobType::Brickwork));
    }
}
