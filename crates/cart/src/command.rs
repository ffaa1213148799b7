//! Serializable cart commands, one per engine operation.
//!
//! UI event handlers (scan callbacks, quantity inputs, wholesale switch) hand
//! these to [`LineCollection::execute`](crate::LineCollection::execute) or to a
//! context's `execute`.

use serde::{Deserialize, Serialize};

use poscart_core::{LocalId, Money};

use crate::line::{LineDraft, LinePatch, PricingMode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum CartCommand {
    ReplaceAll { items: Vec<LineDraft> },
    AddLine(LineDraft),
    UpdateLine(LinePatch),
    RemoveLine { local_id: LocalId },
    SetQuantity { local_id: LocalId, quantity: i64 },
    SetUnitPrice { local_id: LocalId, unit_price: Money },
    SetReceivedQuantity { local_id: LocalId, received_quantity: i64 },
    SetPricingMode { local_id: LocalId, mode: PricingMode },
    SetPricingModeAll { mode: PricingMode },
    Clear,
}

impl CartCommand {
    /// Stable operation name, as used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            CartCommand::ReplaceAll { .. } => "replace_all",
            CartCommand::AddLine(_) => "add_line",
            CartCommand::UpdateLine(_) => "update_line",
            CartCommand::RemoveLine { .. } => "remove_line",
            CartCommand::SetQuantity { .. } => "set_quantity",
            CartCommand::SetUnitPrice { .. } => "set_unit_price",
            CartCommand::SetReceivedQuantity { .. } => "set_received_quantity",
            CartCommand::SetPricingMode { .. } => "set_pricing_mode",
            CartCommand::SetPricingModeAll { .. } => "set_pricing_mode_all",
            CartCommand::Clear => "clear",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poscart_core::ProductId;

    #[test]
    fn commands_decode_from_ui_payloads() {
        let cmd: CartCommand =
            serde_json::from_str(r#"{"op":"set_quantity","localId":3,"quantity":5}"#).unwrap();
        assert_eq!(
            cmd,
            CartCommand::SetQuantity {
                local_id: LocalId(3),
                quantity: 5
            }
        );

        let cmd: CartCommand = serde_json::from_str(
            r#"{"op":"add_line","localId":1,"productId":10,"unitPrice":50,"quantity":2}"#,
        )
        .unwrap();
        match cmd {
            CartCommand::AddLine(draft) => {
                assert_eq!(draft.product_id, Some(ProductId(10)));
                assert_eq!(draft.quantity, 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cmd: CartCommand = serde_json::from_str(r#"{"op":"clear"}"#).unwrap();
        assert_eq!(cmd.name(), "clear");
    }

    #[test]
    fn pricing_mode_uses_lowercase_names() {
        let cmd = CartCommand::SetPricingModeAll {
            mode: PricingMode::Wholesale,
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["op"], "set_pricing_mode_all");
        assert_eq!(json["mode"], "wholesale");
    }
}
