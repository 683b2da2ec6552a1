//! Typed endpoint wrappers
//!
//! One normalization function per endpoint: each call returns a typed
//! outcome or an explicit not-found/rejected variant. No duck-typed
//! fallback chains over response shapes.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::errors::AppError;
use crate::http::{ApiClient, ApiFailure, ApiOutcome, Transport};
use crate::models::offer::Offer;
use crate::models::redemption::{ClaimReceipt, CustomerDetails, Redemption, ValidationRecord};
use crate::models::survey::{QuestionStats, Survey, SurveyStats};
use crate::{log_debug, log_info};

/// `GET /subadmin/public/offer/{code}/`
#[derive(Debug)]
pub enum OfferLookup {
    Found(Box<Offer>),
    NotFound,
    Rejected(ApiFailure),
}

/// `POST /subadmin/public/offer/{code}/redeem/`
#[derive(Debug)]
pub enum InitiateOutcome {
    Accepted { redemption_id: String },
    Rejected(ApiFailure),
}

/// `POST /subadmin/public/offer/verify-otp/`
#[derive(Debug)]
pub enum VerifyOutcome {
    Verified(ClaimReceipt),
    Rejected(ApiFailure),
}

/// `POST /subadmin/offers/validate-redemption/`
#[derive(Debug)]
pub enum ValidateOutcome {
    Valid(ValidationRecord),
    Rejected(ApiFailure),
}

#[derive(Debug)]
pub enum SurveyStatsOutcome {
    Ready(SurveyStats),
    Rejected(ApiFailure),
}

/// The endpoint seam the redemption flows drive. Abstracted so flow logic
/// is unit-testable against stub backends.
#[async_trait]
pub trait RedemptionApi {
    async fn fetch_offer(&self, unique_code: &str) -> Result<OfferLookup, AppError>;

    /// Used for both the initial OTP send and resend: the server treats a
    /// re-initiation of a pending redemption as an OTP re-issue.
    async fn initiate_redemption(
        &self,
        unique_code: &str,
        details: &CustomerDetails,
    ) -> Result<InitiateOutcome, AppError>;

    async fn verify_otp(
        &self,
        redemption_id: &str,
        otp: &str,
    ) -> Result<VerifyOutcome, AppError>;

    async fn validate_code(&self, redemption_code: &str) -> Result<ValidateOutcome, AppError>;
}

/// The server may issue redemption ids as strings or numbers.
fn redemption_id_field(data: &Value) -> Result<String, AppError> {
    if let Some(id) = data.get("redemption_id") {
        if let Some(s) = id.as_str() {
            return Ok(s.to_string());
        }
        if let Some(n) = id.as_i64() {
            return Ok(n.to_string());
        }
    }
    Err(AppError::MalformedResponse(
        "initiate response missing redemption_id".to_string(),
    ))
}

#[async_trait]
impl<T: Transport> RedemptionApi for ApiClient<T> {
    async fn fetch_offer(&self, unique_code: &str) -> Result<OfferLookup, AppError> {
        let path = format!("/subadmin/public/offer/{}/", unique_code);
        let outcome = self.request(Method::GET, &path, None, false).await?;

        match outcome {
            ApiOutcome::Success(data) => {
                let offer: Offer = serde_json::from_value(data).map_err(|e| {
                    AppError::MalformedResponse(format!("offer payload: {}", e))
                })?;
                Ok(OfferLookup::Found(Box::new(offer)))
            }
            ApiOutcome::Failure(f) if f.http_status == 404 => Ok(OfferLookup::NotFound),
            ApiOutcome::Failure(f) => Ok(OfferLookup::Rejected(f)),
        }
    }

    async fn initiate_redemption(
        &self,
        unique_code: &str,
        details: &CustomerDetails,
    ) -> Result<InitiateOutcome, AppError> {
        let path = format!("/subadmin/public/offer/{}/redeem/", unique_code);
        let body = serde_json::to_value(details)
            .map_err(|e| AppError::Internal(format!("details payload: {}", e)))?;

        log_debug!("API", "Initiating redemption", serde_json::json!({
            "offer_code": unique_code,
        }));

        let outcome = self.request(Method::POST, &path, Some(&body), false).await?;
        match outcome {
            ApiOutcome::Success(data) => Ok(InitiateOutcome::Accepted {
                redemption_id: redemption_id_field(&data)?,
            }),
            ApiOutcome::Failure(f) => Ok(InitiateOutcome::Rejected(f)),
        }
    }

    async fn verify_otp(
        &self,
        redemption_id: &str,
        otp: &str,
    ) -> Result<VerifyOutcome, AppError> {
        let body = serde_json::json!({
            "redemption_id": redemption_id,
            "otp": otp,
        });

        let outcome = self
            .request(Method::POST, "/subadmin/public/offer/verify-otp/", Some(&body), false)
            .await?;
        match outcome {
            ApiOutcome::Success(data) => {
                let receipt: ClaimReceipt = serde_json::from_value(data).map_err(|e| {
                    AppError::MalformedResponse(format!("verify response: {}", e))
                })?;
                log_info!("API", "OTP verified, redemption code issued");
                Ok(VerifyOutcome::Verified(receipt))
            }
            ApiOutcome::Failure(f) => Ok(VerifyOutcome::Rejected(f)),
        }
    }

    async fn validate_code(&self, redemption_code: &str) -> Result<ValidateOutcome, AppError> {
        let body = serde_json::json!({ "redemption_code": redemption_code });

        let outcome = self
            .request(
                Method::POST,
                "/subadmin/offers/validate-redemption/",
                Some(&body),
                true,
            )
            .await?;
        match outcome {
            ApiOutcome::Success(data) => {
                let message = data
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("Redemption code validated")
                    .to_string();
                let redemption = data
                    .get("redemption")
                    .cloned()
                    .and_then(|v| serde_json::from_value::<Redemption>(v).ok());

                Ok(ValidateOutcome::Valid(ValidationRecord {
                    redemption_code: redemption_code.to_string(),
                    redemption,
                    message,
                    validated_at: chrono::Utc::now(),
                }))
            }
            ApiOutcome::Failure(f) => Ok(ValidateOutcome::Rejected(f)),
        }
    }
}

impl<T: Transport> ApiClient<T> {
    /// Survey stats aggregation: the survey definition and the response
    /// stats are independent calls run concurrently; both must land before
    /// the aggregate is produced.
    pub async fn fetch_survey_stats(
        &self,
        survey_id: i64,
    ) -> Result<SurveyStatsOutcome, AppError> {
        let survey_path = format!("/subadmin/surveys/{}/", survey_id);
        let stats_path = format!("/subadmin/surveys/{}/stats/", survey_id);

        let (survey_res, stats_res) = tokio::join!(
            self.request(Method::GET, &survey_path, None, true),
            self.request(Method::GET, &stats_path, None, true),
        );

        let survey_data = match survey_res? {
            ApiOutcome::Success(data) => data,
            ApiOutcome::Failure(f) => return Ok(SurveyStatsOutcome::Rejected(f)),
        };
        let stats_data = match stats_res? {
            ApiOutcome::Success(data) => data,
            ApiOutcome::Failure(f) => return Ok(SurveyStatsOutcome::Rejected(f)),
        };

        let survey: Survey = serde_json::from_value(survey_data)
            .map_err(|e| AppError::MalformedResponse(format!("survey payload: {}", e)))?;
        let total_responses = stats_data
            .get("total_responses")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        let question_stats: Vec<QuestionStats> = stats_data
            .get("question_stats")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| AppError::MalformedResponse(format!("survey stats payload: {}", e)))?
            .unwrap_or_default();

        Ok(SurveyStatsOutcome::Ready(SurveyStats {
            survey,
            total_responses,
            question_stats,
        }))
    }
}
