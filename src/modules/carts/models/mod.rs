use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line of a shopping cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    /// Catalog unit price in USD
    pub unit_price_usd: Decimal,
}

impl CartLine {
    pub fn line_total_usd(&self) -> Decimal {
        self.unit_price_usd * Decimal::from(self.quantity)
    }
}

/// Read-only snapshot of a user's cart at checkout time.
///
/// Staged onto the trade attempt so the order is materialized from what
/// the user actually paid for, not from whatever the cart holds by the
/// time the callback arrives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub user_id: String,
    pub lines: Vec<CartLine>,
    pub subtotal_usd: Decimal,
}

impl CartSnapshot {
    pub fn new(user_id: String, lines: Vec<CartLine>) -> Self {
        let subtotal_usd = lines.iter().map(CartLine::line_total_usd).sum();
        Self {
            user_id,
            lines,
            subtotal_usd,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Short human-readable summary for the processor's product descriptor
    pub fn descriptor(&self) -> String {
        match self.lines.as_slice() {
            [] => "Empty cart".to_string(),
            [only] => only.name.clone(),
            [first, rest @ ..] => format!("{} +{} more", first.name, rest.len()),
        }
    }
}
