//! Value Objects - Immutable, identity-less domain primitives

mod geo_location;
mod resolved_date;

pub use geo_location::GeoLocation;
pub use resolved_date::ResolvedDate;
