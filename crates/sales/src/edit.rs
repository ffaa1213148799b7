//! Editing a saved sales order.

use tracing::debug;

use poscart_cart::{
    CartCommand, CartConfig, IgnoreReason, LineCollection, LineDraft, LineItem, LinePatch,
    Outcome, PricingMode,
};
use poscart_core::{
    AggregateRoot, DomainResult, ExpectedVersion, LocalId, LocalIdSequence, Money, OrderId,
};

use crate::totals::CartTotals;

/// Lines of an existing order, loaded for editing.
///
/// The loaded state is kept so the session can tell whether anything changed
/// and can be reverted.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderEditSession {
    order_id: OrderId,
    original: Vec<LineItem>,
    lines: LineCollection,
}

impl OrderEditSession {
    /// Bulk-load the saved lines; drafts without a product id are dropped.
    pub fn load<I>(order_id: OrderId, items: I, config: CartConfig) -> Self
    where
        I: IntoIterator<Item = LineDraft>,
    {
        let mut lines = LineCollection::new(config);
        if let Outcome::Replaced { kept, dropped } = lines.replace_all(items) {
            debug!(%order_id, kept, dropped, "loaded order for editing");
        }
        Self {
            order_id,
            original: lines.lines().to_vec(),
            lines,
        }
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn lines(&self) -> &[LineItem] {
        self.lines.lines()
    }

    pub fn get(&self, local_id: LocalId) -> Option<&LineItem> {
        self.lines.get(local_id)
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals::from_lines(self.lines.lines())
    }

    /// Id source for lines created during the edit, continuing after the
    /// loaded ones.
    pub fn local_ids(&self) -> LocalIdSequence {
        LocalIdSequence::after(self.lines.lines().iter().map(LineItem::local_id))
    }

    pub fn has_changes(&self) -> bool {
        self.lines.lines() != self.original.as_slice()
    }

    /// Throw away edits and return to the loaded lines.
    pub fn revert(&mut self) -> Outcome {
        let snapshot = self.original.iter().cloned().map(LineDraft::from);
        self.lines.replace_all(snapshot)
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

    pub fn set_pricing_mode(&mut self, local_id: LocalId, mode: PricingMode) -> Outcome {
        self.lines.set_pricing_mode(local_id, mode)
    }

    pub fn clear(&mut self) -> Outcome {
        self.lines.clear()
    }

    pub fn execute(&mut self, command: CartCommand) -> Outcome {
        match command {
            CartCommand::SetReceivedQuantity { .. } => {
                debug!(order_id = %self.order_id, op = command.name(), "not available while editing an order");
                Outcome::Ignored(IgnoreReason::UnsupportedInContext)
            }
            other => self.lines.execute(other),
        }
    }

    pub fn execute_expected(
        &mut self,
        expected: ExpectedVersion,
        command: CartCommand,
    ) -> DomainResult<Outcome> {
        expected.check(self.version())?;
        Ok(self.execute(command))
    }

    /// End the session, yielding the edited lines for submission.
    pub fn finish(self) -> Vec<LineItem> {
        self.lines.into_lines()
    }
}

impl AggregateRoot for OrderEditSession {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.order_id
    }

    fn version(&self) -> u64 {
        self.lines.version()
    }
}
