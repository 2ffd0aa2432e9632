use crate::config::{Catalog, FilterConfig, ScanConfig};
use crate::core::calendar::generate_calendar;
use crate::core::filter::apply_filters;
use crate::core::normalize::normalize_offer;
use crate::core::query::build_query;
use crate::core::rank::build_report;
use crate::core::report::ReportAssembler;
use crate::domain::model::{
    CycleReport, Offer, ProviderResult, QueryOutcome, QueryStatus, QuotaStatus, RawOffer,
    ScanOutcome, ScanStats, SearchQuery, TimeProfile, WeekendWindow,
};
use crate::domain::ports::{FlightProvider, ReportSink};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use chrono::{Local, NaiveDate};
use std::time::Duration;

/// Runs one scan cycle at a time against a single provider. Calls are made
/// one after another with a pause in between; the provider's quota is shared
/// with everything else using the same key.
pub struct ScanEngine<P: FlightProvider> {
    provider: P,
    scan: ScanConfig,
    filter: FilterConfig,
    catalog: Catalog,
}

impl<P: FlightProvider> ScanEngine<P> {
    pub fn new(provider: P, scan: ScanConfig, filter: FilterConfig, catalog: Catalog) -> Self {
        Self {
            provider,
            scan,
            filter,
            catalog,
        }
    }

    pub fn scan_config(&self) -> &ScanConfig {
        &self.scan
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn start_date(&self) -> NaiveDate {
        self.scan
            .start_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    fn windows(&self) -> Result<Vec<WeekendWindow>> {
        self.scan.validate()?;
        self.filter.validate()?;
        generate_calendar(
            self.start_date(),
            self.scan.horizon_weeks,
            &self.scan.patterns,
            self.scan.stay_nights,
            self.scan.include_today_if_match,
        )
    }

    fn queries_for(&self, windows: &[WeekendWindow]) -> Vec<SearchQuery> {
        let mut queries = Vec::new();
        for window in windows {
            for destination in &self.scan.destinations {
                if self.scan.time_profiles.is_empty() {
                    queries.push(build_query(
                        &self.scan.origin,
                        destination,
                        window,
                        &self.filter,
                        None,
                        &self.scan.currency,
                    ));
                } else {
                    for profile in &self.scan.time_profiles {
                        queries.push(build_query(
                            &self.scan.origin,
                            destination,
                            window,
                            &self.filter,
                            Some(profile),
                            &self.scan.currency,
                        ));
                    }
                }
            }
        }
        queries
    }

    /// Every query a scan would send, in the order it would send them.
    pub fn plan(&self) -> Result<Vec<SearchQuery>> {
        let windows = self.windows()?;
        Ok(self.queries_for(&windows))
    }

    pub async fn scan(&self) -> Result<ScanOutcome> {
        let windows = self.windows()?;
        let queries = self.queries_for(&windows);

        tracing::info!(
            "🔎 Scanning {} weekend window(s) × {} destination(s) from {} via {} ({} queries)",
            windows.len(),
            self.scan.destinations.len(),
            self.scan.origin,
            self.provider.name(),
            queries.len()
        );

        let quota = self.provider.check_quota().await;
        if let QuotaStatus::Known { remaining } = quota {
            tracing::info!("📊 Provider quota before scan: {} call(s) left", remaining);
            if (remaining as usize) < queries.len() {
                tracing::warn!(
                    "Quota ({}) is below the {} planned queries; later queries may be throttled",
                    remaining,
                    queries.len()
                );
            }
        }

        let mut stats = ScanStats::default();
        let mut outcomes = Vec::with_capacity(queries.len());
        let mut accepted: Vec<Offer> = Vec::new();

        for (i, query) in queries.iter().enumerate() {
            if i > 0 {
                pause(self.scan.pacing).await;
            }
            stats.queries += 1;

            tracing::debug!(
                "📡 [{}/{}] {} → {} {}{}",
                i + 1,
                queries.len(),
                query.origin,
                query.destination,
                query.window.label,
                query
                    .profile
                    .as_deref()
                    .map(|p| format!(" ({})", p))
                    .unwrap_or_default()
            );

            let status = match self.search_with_retry(query).await {
                ProviderResult::Success(records) => {
                    stats.completed += 1;
                    let kept = self.process_records(query, records, &mut stats, &mut accepted);
                    QueryStatus::Completed { kept }
                }
                ProviderResult::RateLimited => {
                    stats.rate_limited += 1;
                    tracing::warn!(
                        "⏳ Still rate limited for {} {}, skipping",
                        query.destination,
                        query.window.label
                    );
                    QueryStatus::RateLimited
                }
                ProviderResult::Failure(reason) => {
                    stats.failed += 1;
                    tracing::warn!(
                        "Provider failed for {} {}: {}",
                        query.destination,
                        query.window.label,
                        reason
                    );
                    QueryStatus::Failed(reason)
                }
            };

            outcomes.push(QueryOutcome {
                destination: query.destination.clone(),
                window_label: query.window.label.clone(),
                profile: query.profile.clone(),
                status,
            });
        }

        let report = build_report(
            accepted,
            windows,
            self.scan.render_mode,
            self.scan.top_n,
            self.scan.per_window_top_k,
        );

        tracing::info!(
            "✅ Scan finished: {}/{} queries answered, {} rate limited, {} failed, {} offer(s) accepted, {} in report",
            stats.completed,
            stats.queries,
            stats.rate_limited,
            stats.failed,
            stats.accepted,
            report.offers.len()
        );

        let quota_after = self.provider.check_quota().await;
        if let QuotaStatus::Known { remaining } = quota_after {
            tracing::info!("📊 Provider quota after scan: {} call(s) left", remaining);
        }

        Ok(ScanOutcome {
            report,
            outcomes,
            stats,
            quota: quota_after,
        })
    }

    async fn search_with_retry(&self, query: &SearchQuery) -> ProviderResult {
        match self.provider.search(query).await {
            ProviderResult::RateLimited => {
                tracing::info!(
                    "⏳ Rate limited on {} {}, backing off {:?} before one retry",
                    query.destination,
                    query.window.label,
                    self.scan.rate_limit_backoff
                );
                pause(self.scan.rate_limit_backoff).await;
                self.provider.search(query).await
            }
            other => other,
        }
    }

    fn process_records(
        &self,
        query: &SearchQuery,
        records: Vec<RawOffer>,
        stats: &mut ScanStats,
        accepted: &mut Vec<Offer>,
    ) -> usize {
        stats.raw_records += records.len();

        let mut offers = Vec::with_capacity(records.len());
        for raw in &records {
            match normalize_offer(raw, query, &self.filter, &self.catalog) {
                Ok(offer) => offers.push(offer),
                Err(e) => {
                    stats.normalization_failures += 1;
                    tracing::debug!("Skipping record for {}: {}", query.destination, e);
                }
            }
        }

        // Profile names need not be unique; the query holds the ranges it was built with.
        let profile = query.profile.as_ref().map(|name| TimeProfile {
            name: name.clone(),
            outbound_hours: query.outbound_hours,
            inbound_hours: query.inbound_hours,
        });
        let (kept, rejected) = apply_filters(offers, &self.filter, profile.as_ref());
        stats.filtered_out += rejected.total();
        stats.accepted += kept.len();

        if let Some(best) = kept
            .iter()
            .min_by(|a, b| a.price.total_cmp(&b.price))
        {
            tracing::info!(
                "✅ {} {}: {:.2} {}",
                query.destination,
                query.window.label,
                best.price,
                best.currency
            );
        }

        let count = kept.len();
        accepted.extend(kept);
        count
    }

    /// Scan, render and hand the report to `sink`. Delivery problems are
    /// logged and reported in the result, never returned as errors.
    pub async fn run_cycle<S: ReportSink + ?Sized>(
        &self,
        assembler: &ReportAssembler,
        sink: &S,
    ) -> Result<CycleReport> {
        let outcome = self.scan().await?;
        let rendered = assembler.render(&outcome.report);

        let delivered = if outcome.report.is_empty() && !self.scan.deliver_empty {
            tracing::info!("No deals this cycle, nothing sent to {}", sink.name());
            None
        } else {
            match sink.deliver(&rendered).await {
                Ok(()) => {
                    tracing::info!("📨 Report delivered via {}", sink.name());
                    Some(true)
                }
                Err(e) => {
                    tracing::error!("❌ Delivery via {} failed: {}", sink.name(), e);
                    tracing::error!("💡 {}", e.recovery_suggestion());
                    Some(false)
                }
            }
        };

        Ok(CycleReport {
            outcome,
            rendered,
            delivered,
        })
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{TimeProfile, WeekendPattern};
    use async_trait::async_trait;

    struct Silent;

    #[async_trait]
    impl FlightProvider for Silent {
        async fn search(&self, _query: &SearchQuery) -> ProviderResult {
            ProviderResult::Success(vec![])
        }

        fn name(&self) -> &str {
            "silent"
        }
    }

    fn config() -> ScanConfig {
        ScanConfig {
            origin: "MAD".to_string(),
            destinations: vec!["LON".to_string(), "PAR".to_string()],
            start_date: NaiveDate::from_ymd_opt(2024, 6, 3),
            horizon_weeks: 2,
            patterns: vec![WeekendPattern::FriSun],
            pacing: Duration::ZERO,
            rate_limit_backoff: Duration::ZERO,
            ..ScanConfig::default()
        }
    }

    #[test]
    fn test_plan_iterates_windows_then_destinations() {
        let engine = ScanEngine::new(Silent, config(), FilterConfig::default(), Catalog::empty());
        let plan = engine.plan().unwrap();
        let order: Vec<_> = plan
            .iter()
            .map(|q| (q.outbound_date.to_string(), q.destination.clone()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("2024-06-07".to_string(), "LON".to_string()),
                ("2024-06-07".to_string(), "PAR".to_string()),
                ("2024-06-14".to_string(), "LON".to_string()),
                ("2024-06-14".to_string(), "PAR".to_string()),
            ]
        );
    }

    #[test]
    fn test_plan_multiplies_by_profiles() {
        let scan = ScanConfig {
            time_profiles: vec![
                TimeProfile {
                    name: "late".to_string(),
                    outbound_hours: None,
                    inbound_hours: None,
                },
                TimeProfile {
                    name: "early".to_string(),
                    outbound_hours: None,
                    inbound_hours: None,
                },
            ],
            ..config()
        };
        let engine = ScanEngine::new(Silent, scan, FilterConfig::default(), Catalog::empty());
        assert_eq!(engine.plan().unwrap().len(), 8);
    }

    #[test]
    fn test_invalid_configuration_fails_before_planning() {
        let scan = ScanConfig {
            horizon_weeks: 0,
            ..config()
        };
        let engine = ScanEngine::new(Silent, scan, FilterConfig::default(), Catalog::empty());
        assert!(engine.plan().unwrap_err().is_fatal());
    }

    #[test]
    fn test_empty_scan_is_not_an_error() {
        let engine = ScanEngine::new(Silent, config(), FilterConfig::default(), Catalog::empty());
        let outcome = tokio_test::block_on(engine.scan()).unwrap();
        assert!(outcome.report.is_empty());
        assert_eq!(outcome.stats.queries, 4);
        assert_eq!(outcome.stats.completed, 4);
        assert_eq!(outcome.quota, QuotaStatus::Unknown);
    }
}
