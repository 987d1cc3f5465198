//! Commodity catalog: which commodities exist and how they are linked.
//!
//! Loaded from JSON when a catalog file is supplied, otherwise the built-in
//! default set is used.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use types::{CrossEffect, Symbol};

/// One commodity definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommoditySpec {
    pub symbol: Symbol,
    pub name: String,
    pub category: String,
    pub initial_price: f64,
    pub base_production: f64,
    pub base_consumption: f64,
    pub volatility: f64,
    pub initial_inventory: f64,
    /// target symbol -> expected return per 1% move in this commodity.
    pub cross_effects: BTreeMap<Symbol, f64>,
}

impl Default for CommoditySpec {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            name: String::new(),
            category: "General".to_string(),
            initial_price: 50.0,
            base_production: 100.0,
            base_consumption: 100.0,
            volatility: 0.02,
            initial_inventory: 50.0,
            cross_effects: BTreeMap::new(),
        }
    }
}

impl CommoditySpec {
    pub fn cross_effect_list(&self) -> Vec<CrossEffect> {
        self.cross_effects
            .iter()
            .map(|(target, &coefficient)| CrossEffect {
                target_symbol: target.clone(),
                coefficient,
            })
            .collect()
    }
}

/// The full catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommodityCatalog {
    pub commodities: Vec<CommoditySpec>,
}

impl CommodityCatalog {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn is_empty(&self) -> bool {
        self.commodities.is_empty()
    }

    /// The built-in five-commodity world with its cross-effect web.
    pub fn default_catalog() -> Self {
        fn spec(
            symbol: &str,
            name: &str,
            category: &str,
            price: f64,
            effects: &[(&str, f64)],
        ) -> CommoditySpec {
            CommoditySpec {
                symbol: symbol.to_string(),
                name: name.to_string(),
                category: category.to_string(),
                initial_price: price,
                cross_effects: effects
                    .iter()
                    .map(|&(target, coefficient)| (target.to_string(), coefficient))
                    .collect(),
                ..Default::default()
            }
        }

        Self {
            commodities: vec![
                spec(
                    "OIL",
                    "Crude Oil",
                    "Energy",
                    75.0,
                    &[("STEEL", 0.25), ("BRICK", 0.15), ("WOOD", 0.10)],
                ),
                spec(
                    "STEEL",
                    "Steel",
                    "Construction",
                    120.0,
                    &[("OIL", 0.30), ("BRICK", 0.35), ("WOOD", 0.20)],
                ),
                spec(
                    "WOOD",
                    "Lumber",
                    "Construction",
                    45.0,
                    &[("BRICK", 0.30), ("STEEL", 0.15)],
                ),
                spec(
                    "BRICK",
                    "Brick",
                    "Construction",
                    25.0,
                    &[("STEEL", 0.40), ("WOOD", 0.35)],
                ),
                spec("GRAIN", "Grain", "Agriculture", 8.0, &[]),
            ],
        }
    }
}
