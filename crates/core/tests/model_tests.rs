// ═══════════════════════════════════════════════════════════════════
// Model Tests — Asset, Weight, Holding, Operation, PriceBook, Ledger
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::collections::HashSet;

use portfolio_tracker_core::models::asset::Asset;
use portfolio_tracker_core::models::holding::Holding;
use portfolio_tracker_core::models::ledger::Ledger;
use portfolio_tracker_core::models::operation::{Operation, OperationRequest, OperationType};
use portfolio_tracker_core::models::portfolio::Portfolio;
use portfolio_tracker_core::models::price::PriceBook;
use portfolio_tracker_core::models::valuation::{
    AssetWeight, DateRange, PortfolioEvolution, PortfolioRef, PortfolioValue, ValuePoint,
    WeightSnapshot,
};
use portfolio_tracker_core::models::weight::Weight;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// Asset
// ═══════════════════════════════════════════════════════════════════

mod asset {
    use super::*;

    #[test]
    fn symbol_is_trimmed() {
        let a = Asset::new(1, "  AAPL ", "Apple");
        assert_eq!(a.symbol, "AAPL");
        assert_eq!(a.name, "Apple");
    }

    #[test]
    fn equality_ignores_id_and_name() {
        let a = Asset::new(1, "AAPL", "Apple");
        let b = Asset::new(7, "AAPL", "Apple Inc.");
        assert_eq!(a, b);
        assert_ne!(a, Asset::new(1, "MSFT", "Apple"));
    }

    #[test]
    fn hash_follows_symbol() {
        let mut set = HashSet::new();
        set.insert(Asset::new(1, "AAPL", "Apple"));
        set.insert(Asset::new(2, "AAPL", "Other"));
        set.insert(Asset::new(3, "MSFT", "Microsoft"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn display_is_symbol() {
        assert_eq!(Asset::new(1, "BONO-2030", "Bond").to_string(), "BONO-2030");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Weight / Holding / PortfolioValue scales
// ═══════════════════════════════════════════════════════════════════

mod scales {
    use super::*;

    #[test]
    fn weight_keeps_six_places() {
        let w = Weight::new(1, 1, d(2022, 2, 15), dec!(0.1234567));
        assert_eq!(w.weight, dec!(0.123457));
    }

    #[test]
    fn holding_keeps_six_places() {
        let h = Holding::new(1, 1, dec!(3.33333333));
        assert_eq!(h.quantity, dec!(3.333333));
    }

    #[test]
    fn portfolio_value_keeps_two_places() {
        let v = PortfolioValue::new(1, d(2022, 2, 15), dec!(1000.456));
        assert_eq!(v.total_value, dec!(1000.46));
    }

    #[test]
    fn stored_decimals_serialize_as_strings() {
        let h = Holding::new(1, 2, dec!(1.5));
        let json = serde_json::to_value(&h).unwrap();
        assert_eq!(json["quantity"], "1.5");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Operation
// ═══════════════════════════════════════════════════════════════════

mod operation {
    use super::*;

    #[test]
    fn signed_quantity_by_direction() {
        let buy = Operation::new(1, 1, d(2022, 3, 1), dec!(4), OperationType::Buy);
        let sell = Operation::new(1, 1, d(2022, 3, 1), dec!(4), OperationType::Sell);
        assert_eq!(buy.signed_quantity(), dec!(4));
        assert_eq!(sell.signed_quantity(), dec!(-4));
    }

    #[test]
    fn each_operation_gets_its_own_id() {
        let a = Operation::new(1, 1, d(2022, 3, 1), dec!(1), OperationType::Buy);
        let b = Operation::new(1, 1, d(2022, 3, 1), dec!(1), OperationType::Buy);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn type_display() {
        assert_eq!(OperationType::Buy.to_string(), "Buy");
        assert_eq!(OperationType::Sell.to_string(), "Sell");
    }

    #[test]
    fn type_wire_names() {
        assert_eq!(serde_json::to_string(&OperationType::Buy).unwrap(), "\"buy\"");
        let sell: OperationType = serde_json::from_str("\"sell\"").unwrap();
        assert_eq!(sell, OperationType::Sell);
    }

    #[test]
    fn type_accepts_legacy_names() {
        let buy: OperationType = serde_json::from_str("\"compra\"").unwrap();
        let sell: OperationType = serde_json::from_str("\"venta\"").unwrap();
        assert_eq!(buy, OperationType::Buy);
        assert_eq!(sell, OperationType::Sell);
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(serde_json::from_str::<OperationType>("\"hold\"").is_err());
    }

    #[test]
    fn request_from_json() {
        let req: OperationRequest = serde_json::from_str(
            r#"{"asset": "AAA", "date": "2022-03-01", "quantity": 2.5, "type": "buy"}"#,
        )
        .unwrap();
        assert_eq!(req, OperationRequest::buy("AAA", d(2022, 3, 1), dec!(2.5)));
    }

    #[test]
    fn request_accepts_string_quantity() {
        let req: OperationRequest = serde_json::from_str(
            r#"{"asset": "AAA", "date": "2022-03-01", "quantity": "10", "type": "sell"}"#,
        )
        .unwrap();
        assert_eq!(req.quantity, dec!(10));
        assert_eq!(req.operation_type, OperationType::Sell);
    }

    #[test]
    fn request_accepts_legacy_field_names() {
        let req: OperationRequest = serde_json::from_str(
            r#"{"activo": "BBB", "fecha": "2022-03-02", "cantidad": 3, "tipo": "venta"}"#,
        )
        .unwrap();
        assert_eq!(req, OperationRequest::sell("BBB", d(2022, 3, 2), dec!(3)));
    }

    #[test]
    fn request_missing_field_is_rejected() {
        let res = serde_json::from_str::<OperationRequest>(r#"{"asset": "AAA", "type": "buy"}"#);
        assert!(res.is_err());
    }
}

// ═══════════════════════════════════════════════════════════════════
// PriceBook
// ═══════════════════════════════════════════════════════════════════

mod price_book {
    use super::*;

    fn book() -> PriceBook {
        let mut b = PriceBook::new();
        b.set_price(1, d(2022, 2, 17), dec!(12));
        b.set_price(1, d(2022, 2, 15), dec!(10));
        b.set_price(1, d(2022, 2, 16), dec!(11));
        b.set_price(2, d(2022, 2, 16), dec!(50));
        b
    }

    #[test]
    fn exact_date_lookup() {
        let b = book();
        assert_eq!(b.get_price(1, d(2022, 2, 16)), Some(dec!(11)));
        assert_eq!(b.get_price(1, d(2022, 2, 18)), None);
        assert_eq!(b.get_price(3, d(2022, 2, 16)), None);
    }

    #[test]
    fn points_stay_sorted() {
        let b = book();
        let dates: Vec<_> = b.points_for(1).iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d(2022, 2, 15), d(2022, 2, 16), d(2022, 2, 17)]);
    }

    #[test]
    fn set_price_overwrites() {
        let mut b = book();
        b.set_price(1, d(2022, 2, 15), dec!(9));
        assert_eq!(b.get_price(1, d(2022, 2, 15)), Some(dec!(9)));
        assert_eq!(b.points_for(1).len(), 3);
    }

    #[test]
    fn insert_if_absent_keeps_existing() {
        let mut b = book();
        assert!(!b.insert_if_absent(1, d(2022, 2, 15), dec!(99)));
        assert_eq!(b.get_price(1, d(2022, 2, 15)), Some(dec!(10)));
        assert!(b.insert_if_absent(1, d(2022, 2, 18), dec!(13)));
        assert_eq!(b.total_entries(), 5);
    }

    #[test]
    fn range_is_inclusive() {
        let b = book();
        let pts = b.get_price_range(1, d(2022, 2, 16), d(2022, 2, 17));
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[0].price, dec!(11));
        assert_eq!(pts[1].price, dec!(12));
    }

    #[test]
    fn range_without_points_is_empty() {
        let b = book();
        assert!(b.get_price_range(1, d(2023, 1, 1), d(2023, 2, 1)).is_empty());
        assert!(b.get_price_range(9, d(2022, 1, 1), d(2023, 1, 1)).is_empty());
    }

    #[test]
    fn prices_on_date() {
        let b = book();
        let on = b.prices_on(d(2022, 2, 16));
        assert_eq!(on.len(), 2);
        assert_eq!(on[&2], dec!(50));
        assert!(b.prices_on(d(2022, 2, 15)).get(&2).is_none());
    }

    #[test]
    fn date_bounds_and_counts() {
        let b = book();
        assert_eq!(b.earliest_date(), Some(d(2022, 2, 15)));
        assert_eq!(b.latest_date(), Some(d(2022, 2, 17)));
        assert_eq!(b.asset_count(), 2);
        assert!(!b.is_empty());
        assert!(PriceBook::new().is_empty());
        assert_eq!(PriceBook::new().earliest_date(), None);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Ledger
// ═══════════════════════════════════════════════════════════════════

mod ledger {
    use super::*;

    #[test]
    fn ids_start_at_one() {
        let mut l = Ledger::new();
        assert_eq!(l.get_or_create_portfolio("Portfolio 1"), 1);
        assert_eq!(l.get_or_create_asset("AAA", "AAA"), (1, true));
    }

    #[test]
    fn get_or_create_asset_reuses_symbol() {
        let mut l = Ledger::new();
        let (a, created) = l.get_or_create_asset("AAA", "AAA");
        let (b, created_again) = l.get_or_create_asset(" AAA ", "Other");
        assert!(created);
        assert!(!created_again);
        assert_eq!(a, b);
        assert_eq!(l.assets.len(), 1);
        assert_eq!(l.asset_by_id(a).unwrap().name, "AAA");
    }

    #[test]
    fn add_portfolio_allows_duplicate_names() {
        let mut l = Ledger::new();
        let a = l.add_portfolio("Growth");
        let b = l.add_portfolio("Growth");
        assert_ne!(a, b);
        assert_eq!(l.get_or_create_portfolio("Growth"), a);
        assert_eq!(l.first_portfolio(), Some(&Portfolio::new(a, "Growth")));
    }

    #[test]
    fn weights_are_unique_per_key() {
        let mut l = Ledger::new();
        assert!(l.insert_weight_if_absent(Weight::new(1, 1, d(2022, 2, 15), dec!(0.5))));
        assert!(!l.insert_weight_if_absent(Weight::new(1, 1, d(2022, 2, 15), dec!(0.9))));
        assert!(l.insert_weight_if_absent(Weight::new(2, 1, d(2022, 2, 15), dec!(0.9))));
        assert_eq!(l.weights_on(d(2022, 2, 15)).len(), 2);
        assert!(l.weights_on(d(2022, 2, 16)).is_empty());
    }

    #[test]
    fn upsert_holding_creates_then_replaces() {
        let mut l = Ledger::new();
        assert!(l.upsert_holding(1, 1, dec!(5)));
        assert!(!l.upsert_holding(1, 1, dec!(7)));
        assert_eq!(l.holding(1, 1).unwrap().quantity, dec!(7));
        assert_eq!(l.holdings_for(1).len(), 1);
        assert!(l.holdings_for(2).is_empty());
    }

    #[test]
    fn operations_are_kept_in_date_order() {
        let mut l = Ledger::new();
        l.push_operation(Operation::new(1, 1, d(2022, 3, 5), dec!(1), OperationType::Buy));
        l.push_operation(Operation::new(1, 1, d(2022, 3, 1), dec!(2), OperationType::Buy));
        l.push_operation(Operation::new(2, 1, d(2022, 3, 5), dec!(3), OperationType::Sell));
        let dates: Vec<_> = l.operations.iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![d(2022, 3, 1), d(2022, 3, 5), d(2022, 3, 5)]);
        // Equal dates keep insertion order
        assert_eq!(l.operations[2].quantity, dec!(3));
        assert_eq!(l.operations_for(1).len(), 2);
    }

    #[test]
    fn portfolio_values_upsert_by_date() {
        let mut l = Ledger::new();
        l.upsert_portfolio_value(PortfolioValue::new(1, d(2022, 2, 16), dec!(900)));
        l.upsert_portfolio_value(PortfolioValue::new(1, d(2022, 2, 15), dec!(1000)));
        l.upsert_portfolio_value(PortfolioValue::new(1, d(2022, 2, 16), dec!(950)));
        let values = l.values_for(1);
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].date, d(2022, 2, 15));
        assert_eq!(values[1].total_value, dec!(950));
    }

    #[test]
    fn bincode_round_trip_keeps_tables() {
        let mut l = Ledger::new();
        let pf = l.get_or_create_portfolio("Portfolio 1");
        let (asset, _) = l.get_or_create_asset("AAA", "AAA");
        l.prices.set_price(asset, d(2022, 2, 15), dec!(100.25));
        l.upsert_holding(pf, asset, dec!(5));
        l.push_operation(Operation::new(pf, asset, d(2022, 2, 16), dec!(1), OperationType::Sell));

        let bytes = bincode::serialize(&l).unwrap();
        let mut back: Ledger = bincode::deserialize(&bytes).unwrap();

        assert_eq!(back.prices.get_price(asset, d(2022, 2, 15)), Some(dec!(100.25)));
        assert_eq!(back.holding(pf, asset).unwrap().quantity, dec!(5));
        assert_eq!(back.operations, l.operations);
        // Id counters survive: the next asset does not reuse id 1
        assert_eq!(back.get_or_create_asset("BBB", "BBB"), (2, true));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Evolution payload
// ═══════════════════════════════════════════════════════════════════

mod evolution_payload {
    use super::*;

    #[test]
    fn value_series_is_named_vt() {
        let evo = PortfolioEvolution {
            portfolio: PortfolioRef {
                id: 1,
                name: "Portfolio 1".into(),
            },
            range: DateRange {
                start: d(2022, 2, 15),
                end: d(2022, 2, 16),
            },
            value_series: vec![ValuePoint {
                date: d(2022, 2, 15),
                value: 1000.0,
            }],
            weights: vec![WeightSnapshot {
                date: d(2022, 2, 15),
                w: vec![AssetWeight {
                    asset: "AAA".into(),
                    value: 1.0,
                }],
            }],
        };
        let json = serde_json::to_value(&evo).unwrap();
        assert_eq!(json["Vt"][0]["date"], "2022-02-15");
        assert_eq!(json["Vt"][0]["value"], 1000.0);
        assert_eq!(json["weights"][0]["w"][0]["asset"], "AAA");
        assert_eq!(json["range"]["start"], "2022-02-15");
        assert!(json.get("value_series").is_none());
    }
}
