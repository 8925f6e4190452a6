mod commercial;
mod industrial;
mod residential;

pub use commercial::CommercialRule;
pub use industrial::IndustrialRule;
pub use residential::ResidentialRule;
