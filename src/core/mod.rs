pub mod calendar;
pub mod filter;
pub mod normalize;
pub mod query;
pub mod rank;
pub mod report;
pub mod scan;

pub use crate::domain::model::{Offer, ProviderResult, RankedReport, SearchQuery, WeekendWindow};
pub use crate::domain::ports::{FlightProvider, ReportSink};
pub use crate::utils::error::Result;
