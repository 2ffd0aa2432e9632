use crate::domain::model::{Offer, RankedReport, RenderMode};
use chrono::NaiveDate;

pub const TRUNCATION_MARKER: &str = "… (truncated)";
pub const DEFAULT_MAX_CHARS: usize = 4000;
pub const DEFAULT_LINK_BASE: &str = "https://www.skyscanner.es/transport/flights";

/// Purchase link built from the search fields only, no lookup involved.
pub fn deep_link(
    base: &str,
    origin: &str,
    destination: &str,
    outbound: NaiveDate,
    inbound: NaiveDate,
) -> String {
    format!(
        "{}/{}/{}/{}/{}/",
        base.trim_end_matches('/'),
        origin.to_ascii_lowercase(),
        destination.to_ascii_lowercase(),
        outbound.format("%y%m%d"),
        inbound.format("%y%m%d")
    )
}

#[derive(Debug, Clone)]
pub struct ReportAssembler {
    origin: String,
    max_chars: usize,
    link_base: String,
}

impl ReportAssembler {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            max_chars: DEFAULT_MAX_CHARS,
            link_base: DEFAULT_LINK_BASE.to_string(),
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    pub fn with_link_base(mut self, link_base: impl Into<String>) -> Self {
        self.link_base = link_base.into();
        self
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn render(&self, report: &RankedReport) -> String {
        if report.is_empty() {
            let text = format!(
                "No deals found for weekends from {} this time.",
                self.origin
            );
            return fit(|_| text.clone(), &[], self.max_chars);
        }

        let total = report.offers.len();
        let header = |shown: usize| {
            if shown == total {
                format!("✈️ Weekend deals from {} ({} found)", self.origin, total)
            } else {
                format!(
                    "✈️ Weekend deals from {} (showing {} of {})",
                    self.origin, shown, total
                )
            }
        };

        let blocks = match report.mode {
            RenderMode::Flat => report
                .offers
                .iter()
                .enumerate()
                .map(|(i, offer)| format!("{}. {}", i + 1, self.line(offer)))
                .collect::<Vec<_>>(),
            RenderMode::ByWindow => {
                let mut blocks = Vec::new();
                for window in &report.windows {
                    let mut first = true;
                    for offer in report
                        .offers
                        .iter()
                        .filter(|o| o.source_window.label == window.label)
                    {
                        if first {
                            // Heading and first record form one block.
                            blocks.push(format!("\n🗓️ {}\n• {}", window.label, self.line(offer)));
                            first = false;
                        } else {
                            blocks.push(format!("• {}", self.line(offer)));
                        }
                    }
                }
                blocks
            }
        };

        fit(header, &blocks, self.max_chars)
    }

    fn line(&self, offer: &Offer) -> String {
        let mut parts = vec![
            format!("{} ({})", offer.destination_name, offer.destination_code),
            format!("{:.2} {}", offer.price, offer.currency),
        ];
        if let Some(carrier) = &offer.carrier {
            parts.push(carrier.clone());
        }
        if offer.stops > 0 {
            parts.push(format!("{} stop(s)", offer.stops));
        }
        parts.push(format!(
            "{} → {}",
            offer.outbound_departure.format("%a %d %b %H:%M"),
            offer.inbound_departure.format("%a %d %b %H:%M")
        ));
        parts.push(deep_link(
            &self.link_base,
            &self.origin,
            &offer.destination_code,
            offer.source_window.outbound_date,
            offer.source_window.inbound_date,
        ));
        parts.join(" · ")
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Join the header and `blocks` with newlines, dropping whole blocks from
/// the end and appending the marker when the result would exceed
/// `max_chars`. `header` receives the number of blocks actually shown.
fn fit(header: impl Fn(usize) -> String, blocks: &[String], max_chars: usize) -> String {
    let full_header = header(blocks.len());
    let full_len = char_len(&full_header)
        + blocks.iter().map(|b| 1 + char_len(b)).sum::<usize>();
    if full_len <= max_chars {
        let mut out = full_header;
        for block in blocks {
            out.push('\n');
            out.push_str(block);
        }
        return out;
    }

    // Shown counts are below the total here, so this is the longest header.
    let header_len = char_len(&header(blocks.len().saturating_sub(1)));
    let marker_len = char_len(TRUNCATION_MARKER);
    if header_len + 1 + marker_len > max_chars {
        return TRUNCATION_MARKER.chars().take(max_chars).collect();
    }

    let mut used = header_len;
    let mut shown = 0;
    for block in blocks {
        let block_len = 1 + char_len(block);
        if used + block_len + 1 + marker_len > max_chars {
            break;
        }
        used += block_len;
        shown += 1;
    }

    let mut out = header(shown);
    for block in &blocks[..shown] {
        out.push('\n');
        out.push_str(block);
    }
    out.push('\n');
    out.push_str(TRUNCATION_MARKER);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Tier, WeekendPattern, WeekendWindow};

    fn window() -> WeekendWindow {
        WeekendWindow::new(
            NaiveDate::from_ymd_opt(2024, 6, 7).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 9).unwrap(),
            WeekendPattern::FriSun,
        )
    }

    fn offer(code: &str, price: f64) -> Offer {
        let w = window();
        Offer {
            destination_code: code.to_string(),
            destination_name: format!("City {}", code),
            price,
            currency: "EUR".to_string(),
            carrier: Some("Vueling".to_string()),
            outbound_departure: w.outbound_date.and_hms_opt(16, 5, 0).unwrap(),
            inbound_departure: w.inbound_date.and_hms_opt(18, 30, 0).unwrap(),
            stops: 0,
            tier: Tier::Premium,
            source_window: w,
        }
    }

    fn report(count: usize, mode: RenderMode) -> RankedReport {
        RankedReport {
            offers: (0..count)
                .map(|i| offer(&format!("X{:02}", i), 10.0 + i as f64))
                .collect(),
            windows: vec![window()],
            mode,
        }
    }

    #[test]
    fn test_deep_link_template() {
        let link = deep_link(
            DEFAULT_LINK_BASE,
            "MAD",
            "LON",
            NaiveDate::from_ymd_opt(2024, 6, 7).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 9).unwrap(),
        );
        assert_eq!(
            link,
            "https://www.skyscanner.es/transport/flights/mad/lon/240607/240609/"
        );
    }

    #[test]
    fn test_line_contains_all_fields() {
        let text = ReportAssembler::new("MAD").render(&report(1, RenderMode::Flat));
        assert!(text.contains("City X00 (X00)"));
        assert!(text.contains("10.00 EUR"));
        assert!(text.contains("Vueling"));
        assert!(text.contains("Fri 07 Jun 16:05 → Sun 09 Jun 18:30"));
        assert!(text.contains("/mad/x00/240607/240609/"));
        assert!(!text.contains(TRUNCATION_MARKER));
    }

    #[test]
    fn test_empty_report_message() {
        let text = ReportAssembler::new("MAD").render(&report(0, RenderMode::Flat));
        assert!(text.starts_with("No deals found"));
    }

    #[test]
    fn test_output_never_exceeds_max_and_keeps_whole_lines() {
        let full = report(40, RenderMode::Flat);
        for max in [120, 300, 777, 1500, 4000] {
            let assembler = ReportAssembler::new("MAD").with_max_chars(max);
            let text = assembler.render(&full);
            assert!(text.chars().count() <= max, "len exceeded for max {}", max);
            assert!(text.ends_with(TRUNCATION_MARKER));
            for line in text.lines().skip(1) {
                if line == TRUNCATION_MARKER {
                    continue;
                }
                // Every record line ends with its link.
                assert!(line.ends_with("/240607/240609/"), "partial line: {}", line);
            }
        }
    }

    #[test]
    fn test_truncated_header_counts_shown_offers() {
        let text = ReportAssembler::new("MAD")
            .with_max_chars(777)
            .render(&report(40, RenderMode::Flat));
        let shown = text
            .lines()
            .filter(|line| line.ends_with("/240607/240609/"))
            .count();
        assert!(shown > 0 && shown < 40);
        let first_line = text.lines().next().unwrap();
        assert_eq!(
            first_line,
            format!("✈️ Weekend deals from MAD (showing {} of 40)", shown)
        );

        let full = ReportAssembler::new("MAD").render(&report(3, RenderMode::Flat));
        assert!(full.starts_with("✈️ Weekend deals from MAD (3 found)"));
    }

    #[test]
    fn test_grouped_heading_only_with_records() {
        let text = ReportAssembler::new("MAD").render(&report(2, RenderMode::ByWindow));
        assert_eq!(text.matches("🗓️ Fri 07 Jun → Sun 09 Jun 2024").count(), 1);
        assert_eq!(text.matches("• ").count(), 2);
    }
}
