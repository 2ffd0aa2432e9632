use crate::domain::model::{Offer, RankedReport, RenderMode, Tier, WeekendWindow};
use std::cmp::Ordering;
use std::collections::HashMap;

/// One offer per `(destination_code, window label)`: the cheapest, with a
/// premium offer winning an exact price tie against a budget-timing one and
/// the first seen winning any other tie. Output keeps first-seen key order.
pub fn dedupe(offers: Vec<Offer>) -> Vec<Offer> {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut kept: Vec<Offer> = Vec::new();

    for offer in offers {
        let key = (
            offer.destination_code.clone(),
            offer.source_window.label.clone(),
        );
        match index.get(&key) {
            Some(&slot) => {
                if replaces(&kept[slot], &offer) {
                    kept[slot] = offer;
                }
            }
            None => {
                index.insert(key, kept.len());
                kept.push(offer);
            }
        }
    }

    kept
}

fn replaces(current: &Offer, candidate: &Offer) -> bool {
    match candidate.price.total_cmp(&current.price) {
        Ordering::Less => true,
        Ordering::Equal => candidate.tier == Tier::Premium && current.tier == Tier::BudgetTiming,
        Ordering::Greater => false,
    }
}

fn ranking_order(a: &Offer, b: &Offer) -> Ordering {
    a.price
        .total_cmp(&b.price)
        .then_with(|| a.destination_code.cmp(&b.destination_code))
        .then_with(|| a.source_window.outbound_date.cmp(&b.source_window.outbound_date))
        .then_with(|| a.source_window.label.cmp(&b.source_window.label))
}

/// Ascending by price, ties broken by destination code then window.
pub fn rank(mut offers: Vec<Offer>) -> Vec<Offer> {
    offers.sort_by(ranking_order);
    offers
}

/// Global top `top_n` in flat mode; top `per_window` for each window, windows
/// in chronological order, when grouping.
pub fn truncate(
    ranked: Vec<Offer>,
    windows: &[WeekendWindow],
    mode: RenderMode,
    top_n: usize,
    per_window: usize,
) -> Vec<Offer> {
    match mode {
        RenderMode::Flat => ranked.into_iter().take(top_n).collect(),
        RenderMode::ByWindow => windows
            .iter()
            .flat_map(|window| {
                ranked
                    .iter()
                    .filter(|o| o.source_window.label == window.label)
                    .take(per_window)
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect(),
    }
}

pub fn build_report(
    offers: Vec<Offer>,
    windows: Vec<WeekendWindow>,
    mode: RenderMode,
    top_n: usize,
    per_window: usize,
) -> RankedReport {
    let ranked = rank(dedupe(offers));
    let offers = truncate(ranked, &windows, mode, top_n, per_window);
    RankedReport {
        offers,
        windows,
        mode,
    }
}
