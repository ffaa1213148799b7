//! Sale totals derived from cart lines.

use serde::Serialize;

use poscart_cart::LineItem;
use poscart_core::Money;

/// Totals shown on the POS terminal and sent with a completed sale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Sum of line totals as priced.
    pub subtotal: Money,
    /// Tax contained in tax-inclusive lines plus tax added on top of the rest.
    pub tax: Money,
    /// Subtotal plus tax-exclusive tax.
    pub grand_total: Money,
    pub line_count: usize,
    pub unit_count: i64,
}

impl CartTotals {
    pub fn from_lines(lines: &[LineItem]) -> Self {
        let mut totals = Self::default();
        let mut added_tax = Money::ZERO;

        for line in lines {
            totals.subtotal += line.line_total();
            totals.line_count += 1;
            totals.unit_count = totals.unit_count.saturating_add(line.quantity());

            let Some(rate) = line.tax_rate() else {
                continue;
            };
            if line.tax_included() {
                totals.tax += line.line_total().included_tax(rate);
            } else {
                let tax = line.line_total().percent(rate);
                totals.tax += tax;
                added_tax += tax;
            }
        }

        totals.grand_total = totals.subtotal + added_tax;
        totals
    }
}
