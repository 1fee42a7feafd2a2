//! Quotation value objects.

pub mod complexity;
pub mod material;
pub mod result;

pub use complexity::Complexity;
pub use material::Material;
pub use result::{PricingBreakdown, QuoteResult};
