use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::asset::AssetId;

/// A single price data point (date → price).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: Decimal) -> Self {
        Self { date, price }
    }
}

/// Historical closing prices for every asset, unique per (asset, date).
///
/// Each asset's points are kept sorted by date so lookups and range
/// queries are binary searches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceBook {
    pub entries: HashMap<AssetId, Vec<PricePoint>>,
}

impl PriceBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Price of an asset on an exact date. O(log n).
    pub fn get_price(&self, asset_id: AssetId, date: NaiveDate) -> Option<Decimal> {
        let points = self.entries.get(&asset_id)?;
        points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|idx| points[idx].price)
    }

    /// Insert or overwrite the price for (asset, date).
    pub fn set_price(&mut self, asset_id: AssetId, date: NaiveDate, price: Decimal) {
        let points = self.entries.entry(asset_id).or_default();
        match points.binary_search_by_key(&date, |p| p.date) {
            Ok(idx) => points[idx].price = price,
            Err(idx) => points.insert(idx, PricePoint { date, price }),
        }
    }

    /// Insert the price only if (asset, date) has none yet.
    /// Returns `true` when the point was inserted.
    pub fn insert_if_absent(&mut self, asset_id: AssetId, date: NaiveDate, price: Decimal) -> bool {
        let points = self.entries.entry(asset_id).or_default();
        match points.binary_search_by_key(&date, |p| p.date) {
            Ok(_) => false,
            Err(idx) => {
                points.insert(idx, PricePoint { date, price });
                true
            }
        }
    }

    /// All points of an asset within `[from, to]`, in date order.
    pub fn get_price_range(&self, asset_id: AssetId, from: NaiveDate, to: NaiveDate) -> Vec<PricePoint> {
        self.entries
            .get(&asset_id)
            .map(|points| {
                let start = points
                    .binary_search_by_key(&from, |p| p.date)
                    .unwrap_or_else(|pos| pos);
                let end = points
                    .binary_search_by_key(&to, |p| p.date)
                    .map(|pos| pos + 1)
                    .unwrap_or_else(|pos| pos);
                if start >= end {
                    Vec::new()
                } else {
                    points[start..end].to_vec()
                }
            })
            .unwrap_or_default()
    }

    /// Every asset's price on `date`.
    pub fn prices_on(&self, date: NaiveDate) -> HashMap<AssetId, Decimal> {
        self.entries
            .keys()
            .filter_map(|&asset_id| self.get_price(asset_id, date).map(|p| (asset_id, p)))
            .collect()
    }

    /// All points of one asset, oldest first.
    pub fn points_for(&self, asset_id: AssetId) -> &[PricePoint] {
        self.entries.get(&asset_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn earliest_date(&self) -> Option<NaiveDate> {
        self.entries.values().filter_map(|v| v.first()).map(|p| p.date).min()
    }

    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.entries.values().filter_map(|v| v.last()).map(|p| p.date).max()
    }

    /// Total number of price points across all assets.
    pub fn total_entries(&self) -> usize {
        self.entries.values().map(|v| v.len()).sum()
    }

    /// Number of assets with at least one price.
    pub fn asset_count(&self) -> usize {
        self.entries.values().filter(|v| !v.is_empty()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.total_entries() == 0
    }
}
