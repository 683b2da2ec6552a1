use serde::{Deserialize, Serialize};

/// Discount mechanics of an offer. Exactly one field-set on
/// [`OfferPayload`] is meaningful per type; the rest must be null on the
/// wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferType {
    Percentage,
    Fixed,
    Bogo,
    FreeItem,
    Combo,
}

/// A promotional campaign as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: i64,
    /// Permanent identifier embedded in the offer's QR code / public URL.
    pub unique_code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub offer_type: OfferType,

    #[serde(default)]
    pub discount_percentage: Option<f64>,
    #[serde(default)]
    pub discount_amount: Option<f64>,
    #[serde(default)]
    pub buy_quantity: Option<u32>,
    #[serde(default)]
    pub get_quantity: Option<u32>,
    #[serde(default)]
    pub free_item_name: Option<String>,
    #[serde(default)]
    pub combo_items: Option<Vec<String>>,
    #[serde(default)]
    pub combo_price: Option<f64>,

    #[serde(default)]
    pub valid_from: Option<String>,
    #[serde(default)]
    pub valid_until: Option<String>,
    /// Optional day-of-week restriction, e.g. ["mon", "tue"]
    #[serde(default)]
    pub days_of_week: Option<Vec<String>>,
    #[serde(default)]
    pub time_from: Option<String>,
    #[serde(default)]
    pub time_to: Option<String>,

    #[serde(default)]
    pub max_redemptions: Option<u32>,
    #[serde(default)]
    pub per_user_limit: Option<u32>,
    #[serde(default)]
    pub daily_cap: Option<u32>,

    #[serde(default)]
    pub is_active: bool,
}

/// Create/edit form payload. The form leaves stale values in fields the
/// selected type does not use; [`normalize`](Self::normalize) nulls them
/// before the payload goes on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferPayload {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub offer_type: OfferType,

    pub discount_percentage: Option<f64>,
    pub discount_amount: Option<f64>,
    pub buy_quantity: Option<u32>,
    pub get_quantity: Option<u32>,
    pub free_item_name: Option<String>,
    pub combo_items: Option<Vec<String>>,
    pub combo_price: Option<f64>,

    #[serde(default)]
    pub valid_from: Option<String>,
    #[serde(default)]
    pub valid_until: Option<String>,
    #[serde(default)]
    pub days_of_week: Option<Vec<String>>,
    #[serde(default)]
    pub time_from: Option<String>,
    #[serde(default)]
    pub time_to: Option<String>,

    #[serde(default)]
    pub max_redemptions: Option<u32>,
    #[serde(default)]
    pub per_user_limit: Option<u32>,
    #[serde(default)]
    pub daily_cap: Option<u32>,

    #[serde(default)]
    pub is_active: bool,
}

impl OfferPayload {
    /// Null every discount field not belonging to the selected type.
    pub fn normalize(&mut self) {
        let keep_percentage = self.offer_type == OfferType::Percentage;
        let keep_fixed = self.offer_type == OfferType::Fixed;
        let keep_bogo = self.offer_type == OfferType::Bogo;
        let keep_free_item = self.offer_type == OfferType::FreeItem;
        let keep_combo = self.offer_type == OfferType::Combo;

        if !keep_percentage {
            self.discount_percentage = None;
        }
        if !keep_fixed {
            self.discount_amount = None;
        }
        if !keep_bogo {
            self.buy_quantity = None;
            self.get_quantity = None;
        }
        if !keep_free_item {
            self.free_item_name = None;
        }
        if !keep_combo {
            self.combo_items = None;
            self.combo_price = None;
        }
    }
}
