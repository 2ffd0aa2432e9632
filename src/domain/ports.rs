use crate::domain::model::{ProviderResult, QuotaStatus, SearchQuery};
use crate::utils::error::Result;
use async_trait::async_trait;

/// A flight-search backend. Implementations collapse every transport detail
/// (status codes, client errors, decoding problems) into a `ProviderResult`.
#[async_trait]
pub trait FlightProvider: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> ProviderResult;

    /// Remaining call budget, when the provider exposes one.
    async fn check_quota(&self) -> QuotaStatus {
        QuotaStatus::Unknown
    }

    fn name(&self) -> &str;
}

#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn deliver(&self, report: &str) -> Result<()>;

    fn name(&self) -> &str;
}
