pub mod offer;
pub mod redemption;
pub mod survey;
