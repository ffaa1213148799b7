use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use poscart_cart::{
    CartCommand, CartConfig, LineCollection, LineDraft, LineItem, LinePatch, Outcome,
    ReceiptStatus,
};
use poscart_core::{AggregateRoot, DomainResult, ExpectedVersion, LocalId, Money, PurchaseOrderId};

/// Purchase order being assembled or received.
///
/// Keeps a running total that always equals the sum of its line totals.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseOrderDraft {
    id: PurchaseOrderId,
    lines: LineCollection,
    created_at: DateTime<Utc>,
}

impl PurchaseOrderDraft {
    pub fn new(id: PurchaseOrderId, config: CartConfig, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            lines: LineCollection::with_tracked_total(config),
            created_at,
        }
    }

    pub fn id_typed(&self) -> PurchaseOrderId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn lines(&self) -> &[LineItem] {
        self.lines.lines()
    }

    pub fn get(&self, local_id: LocalId) -> Option<&LineItem> {
        self.lines.get(local_id)
    }

    /// Running total of the order.
    pub fn total(&self) -> Money {
        self.lines.tracked_total().unwrap_or_default()
    }

    /// Receipt state of the whole order, rolled up from its lines.
    pub fn receipt_status(&self) -> ReceiptStatus {
        let statuses: Vec<ReceiptStatus> = self
            .lines
            .lines()
            .iter()
            .map(|line| line.receipt_status().unwrap_or(ReceiptStatus::Ordered))
            .collect();

        if !statuses.is_empty() && statuses.iter().all(|s| *s == ReceiptStatus::Received) {
            ReceiptStatus::Received
        } else if statuses.iter().any(|s| *s != ReceiptStatus::Ordered) {
            ReceiptStatus::PartiallyReceived
        } else {
            ReceiptStatus::Ordered
        }
    }

    pub fn replace_all<I>(&mut self, items: I) -> Outcome
    where
        I: IntoIterator<Item = LineDraft>,
    {
        self.lines.replace_all(items)
    }

    pub fn add_line(&mut self, candidate: LineDraft) -> Outcome {
        self.lines.add_line(candidate)
    }

    pub fn update_line(&mut self, patch: LinePatch) -> Outcome {
        self.lines.update_line(patch)
    }

    pub fn remove_line(&mut self, local_id: LocalId) -> Outcome {
        self.lines.remove_line(local_id)
    }

    pub fn set_quantity(&mut self, local_id: LocalId, quantity: i64) -> Outcome {
        self.lines.set_quantity(local_id, quantity)
    }

    pub fn set_unit_price(&mut self, local_id: LocalId, unit_price: Money) -> Outcome {
        self.lines.set_unit_price(local_id, unit_price)
    }

    pub fn set_received_quantity(&mut self, local_id: LocalId, received: i64) -> Outcome {
        let outcome = self.lines.set_received_quantity(local_id, received);
        if outcome.is_applied() {
            debug!(order_id = %self.id, %local_id, received, status = ?self.receipt_status(), "goods received");
        }
        outcome
    }

    pub fn clear(&mut self) -> Outcome {
        self.lines.clear()
    }

    pub fn execute(&mut self, command: CartCommand) -> Outcome {
        self.lines.execute(command)
    }

    pub fn execute_expected(
        &mut self,
        expected: ExpectedVersion,
        command: CartCommand,
    ) -> DomainResult<Outcome> {
        self.lines.execute_expected(expected, command)
    }

    /// Close the draft into a payload for the purchasing service.
    pub fn submit(self, submitted_at: DateTime<Utc>) -> PurchaseOrderSubmission {
        let submission = PurchaseOrderSubmission {
            order_id: self.id,
            status: self.receipt_status(),
            total: self.total(),
            created_at: self.created_at,
            submitted_at,
            lines: self.lines.into_lines(),
        };
        info!(
            order_id = %submission.order_id,
            lines = submission.lines.len(),
            total = %submission.total,
            "purchase order submitted"
        );
        submission
    }
}

impl AggregateRoot for PurchaseOrderDraft {
    type Id = PurchaseOrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.lines.version()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderSubmission {
    pub order_id: PurchaseOrderId,
    pub status: ReceiptStatus,
    pub total: Money,
    pub created_at: DateTime<Utc>,
    pub submitted_at: DateTime<Utc>,
    pub lines: Vec<LineItem>,
}
