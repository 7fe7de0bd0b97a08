pub mod price;
pub mod sentiment;

pub use price::{PriceIndex, PricePoint};
pub use sentiment::{AlignedSample, DailySentiment};
