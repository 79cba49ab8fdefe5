// src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub symbol: String,
    pub description: String,
    pub current_price: f64,
    pub last_close: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockBought {
    pub stock: Stock,
    #[serde(default = "Utc::now")]
    pub purchase_date: DateTime<Utc>,
    pub average_price: f64,
    pub quantity: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "Utc::now")]
    pub creation_date: DateTime<Utc>,
    #[serde(default)]
    pub stocks_bought: Vec<StockBought>,
}

impl Wallet {
    // Total is fixed at purchase time and never recomputed from later prices.
    pub fn add_stock(&mut self, stock: Stock, average_price: f64, quantity: f64) {
        let total = average_price * quantity;
        self.stocks_bought.push(StockBought {
            stock,
            purchase_date: Utc::now(),
            average_price,
            quantity,
            total,
        });
    }

    // Drops every purchase of the symbol, exact match. No-op when nothing matches.
    pub fn remove_stock(&mut self, symbol: &str) {
        self.stocks_bought
            .retain(|bought| bought.stock.symbol != symbol);
    }
}
