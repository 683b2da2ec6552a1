//! Display formatting helpers
//!
//! Status labels, attempts-remaining augmentation and offer-term rendering.
//! Pure string functions so the flows stay free of presentation text.

use crate::models::offer::{Offer, OfferType};
use crate::models::redemption::RedemptionStatus;

/// Append the server-computed attempts count to an error message.
pub fn append_attempts(message: &str, attempts_remaining: Option<u32>) -> String {
    match attempts_remaining {
        Some(1) => format!("{} (1 attempt remaining)", message),
        Some(n) => format!("{} ({} attempts remaining)", message, n),
        None => message.to_string(),
    }
}

/// Human label for a redemption status.
pub fn status_label(status: RedemptionStatus) -> &'static str {
    match status {
        RedemptionStatus::OtpSent => "OTP sent",
        RedemptionStatus::Verified => "Verified",
        RedemptionStatus::Used => "Used",
        RedemptionStatus::Expired => "Expired",
        RedemptionStatus::Pending => "Pending",
        RedemptionStatus::Cancelled => "Cancelled",
    }
}

/// One-line description of an offer's discount terms.
pub fn offer_terms(offer: &Offer) -> String {
    match offer.offer_type {
        OfferType::Percentage => match offer.discount_percentage {
            Some(p) => format!("{}% off", trim_trailing_zeros(p)),
            None => "Percentage discount".to_string(),
        },
        OfferType::Fixed => match offer.discount_amount {
            Some(a) => format!("{} off", trim_trailing_zeros(a)),
            None => "Fixed discount".to_string(),
        },
        OfferType::Bogo => match (offer.buy_quantity, offer.get_quantity) {
            (Some(buy), Some(get)) => format!("Buy {}, get {} free", buy, get),
            _ => "Buy one, get one free".to_string(),
        },
        OfferType::FreeItem => match &offer.free_item_name {
            Some(item) => format!("Free {}", item),
            None => "Free item".to_string(),
        },
        OfferType::Combo => match (&offer.combo_items, offer.combo_price) {
            (Some(items), Some(price)) => {
                format!("{} for {}", items.join(" + "), trim_trailing_zeros(price))
            }
            _ => "Combo deal".to_string(),
        },
    }
}

/// Human validity line for the success screen.
pub fn validity_line(valid_until: Option<&str>) -> String {
    match valid_until {
        Some(until) => format!("Valid until {}", until),
        None => "No expiry".to_string(),
    }
}

fn trim_trailing_zeros(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
