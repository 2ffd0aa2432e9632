use crate::config::{Catalog, FilterConfig, ScanConfig};
use crate::core::report::{ReportAssembler, DEFAULT_LINK_BASE, DEFAULT_MAX_CHARS};
use crate::domain::model::{HourRange, RenderMode, TimeProfile, WeekendPattern};
use crate::utils::error::{FareError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_required_field, validate_url,
    Validate,
};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaresConfig {
    #[serde(default)]
    pub scan: ScanSection,
    #[serde(default)]
    pub filter: FilterSection,
    #[serde(default)]
    pub report: ReportSection,
    #[serde(default)]
    pub provider: ProviderSection,
    #[serde(default)]
    pub delivery: DeliverySection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSection {
    pub origin: String,
    pub destinations: Vec<String>,
    /// Catalog region names, expanded into destination codes.
    pub regions: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub horizon_weeks: i64,
    pub patterns: Vec<WeekendPattern>,
    pub stay_nights: Option<i64>,
    pub include_today_if_match: bool,
    pub currency: String,
    pub pacing_ms: u64,
    pub rate_limit_backoff_ms: u64,
    pub top_n: usize,
    pub render_mode: RenderMode,
    pub per_window_top_k: usize,
    pub deliver_empty: bool,
    pub time_profiles: Vec<TimeProfile>,
}

impl Default for ScanSection {
    fn default() -> Self {
        let defaults = ScanConfig::default();
        Self {
            origin: defaults.origin,
            destinations: Vec::new(),
            regions: Vec::new(),
            start_date: None,
            horizon_weeks: defaults.horizon_weeks,
            patterns: defaults.patterns,
            stay_nights: None,
            include_today_if_match: defaults.include_today_if_match,
            currency: defaults.currency,
            pacing_ms: defaults.pacing.as_millis() as u64,
            rate_limit_backoff_ms: defaults.rate_limit_backoff.as_millis() as u64,
            top_n: defaults.top_n,
            render_mode: defaults.render_mode,
            per_window_top_k: defaults.per_window_top_k,
            deliver_empty: defaults.deliver_empty,
            time_profiles: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSection {
    pub max_price: Option<f64>,
    pub nonstop_only: bool,
    pub outbound_hours: Option<HourRange>,
    pub inbound_hours: Option<HourRange>,
    pub premium_return_hour: u32,
}

impl Default for FilterSection {
    fn default() -> Self {
        let defaults = FilterConfig::default();
        Self {
            max_price: defaults.max_price,
            nonstop_only: defaults.nonstop_only,
            outbound_hours: defaults.outbound_hours,
            inbound_hours: defaults.inbound_hours,
            premium_return_hour: defaults.premium_return_hour,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    pub max_chars: usize,
    pub link_base: String,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            link_base: DEFAULT_LINK_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Amadeus,
    Kiwi,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSection {
    pub kind: ProviderKind,
    pub endpoint: Option<String>,
    /// Bearer token (Amadeus) or API key (Kiwi).
    pub token: Option<String>,
    pub max_results: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryKind {
    #[default]
    Stdout,
    Telegram,
    File,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliverySection {
    pub kind: DeliveryKind,
    pub token: Option<String>,
    pub chat_id: Option<String>,
    pub api_base: Option<String>,
    pub path: Option<String>,
}

impl FaresConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| FareError::ConfigParse {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR}` with the environment value; unknown variables are
    /// left as written and caught by validation where they matter.
    fn substitute_env_vars(content: &str) -> String {
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    /// Destination codes from the explicit list followed by region members,
    /// upper-cased, without duplicates.
    pub fn destinations(&self, catalog: &Catalog) -> Result<Vec<String>> {
        let mut destinations: Vec<String> = Vec::new();
        let from_regions = self
            .scan
            .regions
            .iter()
            .map(|region| {
                catalog.region(region).ok_or_else(|| {
                    FareError::invalid_config(
                        "scan.regions",
                        region,
                        format!("Unknown region. Known regions: {}", Catalog::region_names().join(", ")),
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;

        for code in self
            .scan
            .destinations
            .iter()
            .cloned()
            .chain(from_regions.into_iter().flatten())
        {
            let code = code.trim().to_ascii_uppercase();
            if !destinations.contains(&code) {
                destinations.push(code);
            }
        }

        if destinations.is_empty() {
            return Ok(ScanConfig::default().destinations);
        }
        Ok(destinations)
    }

    pub fn scan_config(&self, catalog: &Catalog) -> Result<ScanConfig> {
        let scan = &self.scan;
        Ok(ScanConfig {
            origin: scan.origin.trim().to_ascii_uppercase(),
            destinations: self.destinations(catalog)?,
            start_date: scan.start_date,
            horizon_weeks: scan.horizon_weeks,
            patterns: scan.patterns.clone(),
            stay_nights: scan.stay_nights,
            include_today_if_match: scan.include_today_if_match,
            time_profiles: scan.time_profiles.clone(),
            currency: scan.currency.clone(),
            pacing: Duration::from_millis(scan.pacing_ms),
            rate_limit_backoff: Duration::from_millis(scan.rate_limit_backoff_ms),
            top_n: scan.top_n,
            render_mode: scan.render_mode,
            per_window_top_k: scan.per_window_top_k,
            deliver_empty: scan.deliver_empty,
        })
    }

    pub fn filter_config(&self) -> FilterConfig {
        FilterConfig {
            max_price: self.filter.max_price,
            nonstop_only: self.filter.nonstop_only,
            outbound_hours: self.filter.outbound_hours,
            inbound_hours: self.filter.inbound_hours,
            premium_return_hour: self.filter.premium_return_hour,
        }
    }

    pub fn report_assembler(&self) -> ReportAssembler {
        ReportAssembler::new(self.scan.origin.trim().to_ascii_uppercase())
            .with_max_chars(self.report.max_chars)
            .with_link_base(self.report.link_base.clone())
    }

    pub fn provider_secret(&self) -> Result<&str> {
        let token = validate_required_field("provider.token", &self.provider.token)?;
        validate_secret("provider.token", token)?;
        Ok(token.as_str())
    }

    pub fn validate_config(&self) -> Result<()> {
        let catalog = Catalog::builtin();
        self.scan_config(&catalog)?.validate()?;
        self.filter_config().validate()?;

        validate_url("report.link_base", &self.report.link_base)?;
        validate_positive_number("report.max_chars", self.report.max_chars as i64, 100)?;

        if let Some(endpoint) = &self.provider.endpoint {
            validate_url("provider.endpoint", endpoint)?;
        }
        if let Some(max_results) = self.provider.max_results {
            validate_positive_number("provider.max_results", max_results as i64, 1)?;
        }

        match self.delivery.kind {
            DeliveryKind::Telegram => {
                let token = validate_required_field("delivery.token", &self.delivery.token)?;
                validate_secret("delivery.token", token)?;
                let chat_id = validate_required_field("delivery.chat_id", &self.delivery.chat_id)?;
                validate_secret("delivery.chat_id", chat_id)?;
                if let Some(api_base) = &self.delivery.api_base {
                    validate_url("delivery.api_base", api_base)?;
                }
            }
            DeliveryKind::File => {
                let path = validate_required_field("delivery.path", &self.delivery.path)?;
                validate_non_empty_string("delivery.path", path)?;
            }
            DeliveryKind::Stdout => {}
        }

        Ok(())
    }
}

fn validate_secret(field_name: &str, value: &str) -> Result<()> {
    validate_non_empty_string(field_name, value)?;
    if value.starts_with("${") {
        return Err(FareError::invalid_config(
            field_name,
            value,
            "Environment variable is not set",
        ));
    }
    Ok(())
}

impl Validate for FaresConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
