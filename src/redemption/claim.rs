//! Public claim flow: details → otp → success
//!
//! The customer lands on an offer's QR-code URL, submits contact details,
//! confirms the OTP sent to their mobile and receives a single-use
//! redemption code. The server owns every status decision — OTP expiry,
//! attempt limits, code issuance — this flow only drives the calls and
//! mirrors the responses.

use crate::api::{InitiateOutcome, OfferLookup, RedemptionApi, VerifyOutcome};
use crate::errors::AppError;
use crate::models::redemption::{ClaimReceipt, CustomerDetails};
use crate::redemption::Notice;
use crate::validation;
use crate::{log_debug, log_warn};

/// Flow state. `Details` is the true initial state (there is no further
/// "back" from it); `Success` is terminal — claiming again takes a fresh
/// flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimState {
    Details,
    Otp { redemption_id: String },
    Success(ClaimReceipt),
}

/// Everything that can happen to the flow. Network results arrive as
/// events so the transition function stays pure.
#[derive(Debug, Clone)]
pub enum ClaimEvent {
    InitiateAccepted { redemption_id: String },
    InitiateRejected { message: String },
    VerifyAccepted(ClaimReceipt),
    VerifyRejected { message: String },
    OtpResent,
    ResendRejected { message: String },
    Back,
}

/// Pure transition: no I/O, no notification dispatch. Out-of-state events
/// leave the state untouched; `Success` ignores everything.
pub fn transition(state: ClaimState, event: ClaimEvent) -> (ClaimState, Option<Notice>) {
    match (state, event) {
        (ClaimState::Success(receipt), _) => (ClaimState::Success(receipt), None),

        (ClaimState::Details, ClaimEvent::InitiateAccepted { redemption_id }) => {
            (ClaimState::Otp { redemption_id }, None)
        }
        (ClaimState::Details, ClaimEvent::InitiateRejected { message }) => {
            (ClaimState::Details, Some(Notice::Error(message)))
        }
        (ClaimState::Details, ClaimEvent::Back) => (ClaimState::Details, None),

        (ClaimState::Otp { .. }, ClaimEvent::VerifyAccepted(receipt)) => {
            (ClaimState::Success(receipt), None)
        }
        (state @ ClaimState::Otp { .. }, ClaimEvent::VerifyRejected { message }) => {
            (state, Some(Notice::Error(message)))
        }
        (state @ ClaimState::Otp { .. }, ClaimEvent::OtpResent) => {
            (state, Some(Notice::Info("OTP has been resent".to_string())))
        }
        (state @ ClaimState::Otp { .. }, ClaimEvent::ResendRejected { message }) => {
            (state, Some(Notice::Error(message)))
        }
        // Back never re-submits; it just returns to the details form.
        (ClaimState::Otp { .. }, ClaimEvent::Back) => (ClaimState::Details, None),

        (state, _) => (state, None),
    }
}

pub struct ClaimFlow {
    offer_code: String,
    /// Retained for OTP resend, which re-invokes initiate with the same data.
    details: Option<CustomerDetails>,
    state: ClaimState,
    notice: Option<Notice>,
}

impl ClaimFlow {
    pub fn new(offer_code: impl Into<String>) -> Self {
        Self {
            offer_code: offer_code.into(),
            details: None,
            state: ClaimState::Details,
            notice: None,
        }
    }

    pub fn state(&self) -> &ClaimState {
        &self.state
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn offer_code(&self) -> &str {
        &self.offer_code
    }

    /// Offer metadata for the claim landing page.
    pub async fn load_offer<A: RedemptionApi + Sync>(
        &self,
        api: &A,
    ) -> Result<OfferLookup, AppError> {
        api.fetch_offer(&self.offer_code).await
    }

    /// Submit the contact form. Client-side validation failures surface as
    /// an error notice and never reach the network.
    pub async fn submit_details<A: RedemptionApi + Sync>(
        &mut self,
        api: &A,
        details: CustomerDetails,
    ) -> Result<(), AppError> {
        if !matches!(self.state, ClaimState::Details) {
            return Ok(());
        }

        if let Err(message) = validation::validate_customer_details(&details) {
            self.notice = Some(Notice::Error(message));
            return Ok(());
        }

        self.details = Some(details.clone());

        let event = match api.initiate_redemption(&self.offer_code, &details).await? {
            InitiateOutcome::Accepted { redemption_id } => {
                log_debug!("CLAIM", "Redemption initiated, OTP sent");
                ClaimEvent::InitiateAccepted { redemption_id }
            }
            InitiateOutcome::Rejected(failure) => {
                log_warn!("CLAIM", "Initiate redemption rejected");
                ClaimEvent::InitiateRejected {
                    message: failure.display_message(),
                }
            }
        };
        self.apply(event);
        Ok(())
    }

    /// Submit the 6-digit OTP.
    pub async fn submit_otp<A: RedemptionApi + Sync>(
        &mut self,
        api: &A,
        otp: &str,
    ) -> Result<(), AppError> {
        let redemption_id = match &self.state {
            ClaimState::Otp { redemption_id } => redemption_id.clone(),
            _ => return Ok(()),
        };

        if let Err(message) = validation::validate_otp(otp) {
            self.notice = Some(Notice::Error(message));
            return Ok(());
        }

        let event = match api.verify_otp(&redemption_id, otp.trim()).await? {
            VerifyOutcome::Verified(receipt) => ClaimEvent::VerifyAccepted(receipt),
            VerifyOutcome::Rejected(failure) => {
                log_warn!("CLAIM", "OTP verification rejected");
                ClaimEvent::VerifyRejected {
                    message: failure.display_message(),
                }
            }
        };
        self.apply(event);
        Ok(())
    }

    /// Re-invoke initiate with the original details; the server re-issues
    /// the OTP for the pending redemption. Never transitions state.
    pub async fn resend_otp<A: RedemptionApi + Sync>(
        &mut self,
        api: &A,
    ) -> Result<(), AppError> {
        if !matches!(self.state, ClaimState::Otp { .. }) {
            return Ok(());
        }

        let details = match &self.details {
            Some(d) => d.clone(),
            None => {
                self.notice = Some(Notice::Error(
                    "Missing contact details, go back and re-enter them".to_string(),
                ));
                return Ok(());
            }
        };

        let event = match api.initiate_redemption(&self.offer_code, &details).await? {
            InitiateOutcome::Accepted { .. } => ClaimEvent::OtpResent,
            InitiateOutcome::Rejected(failure) => ClaimEvent::ResendRejected {
                message: failure.display_message(),
            },
        };
        self.apply(event);
        Ok(())
    }

    /// From the OTP step back to the details form; a no-op anywhere else.
    pub fn back(&mut self) {
        self.apply(ClaimEvent::Back);
    }

    fn apply(&mut self, event: ClaimEvent) {
        let state = std::mem::replace(&mut self.state, ClaimState::Details);
        let (next, notice) = transition(state, event);
        self.state = next;
        self.notice = notice;
    }
}
