//! POS carts, one per store.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use poscart_cart::{
    CartCommand, CartConfig, IgnoreReason, LineCollection, LineDraft, LineItem, LinePatch,
    Outcome, PricingMode,
};
use poscart_core::{AggregateRoot, DomainResult, ExpectedVersion, LocalId, Money, StoreId};

use crate::totals::CartTotals;

/// The sale in progress at one store's terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreCart {
    store_id: StoreId,
    lines: LineCollection,
    pricing_mode: PricingMode,
    opened_at: DateTime<Utc>,
}

impl StoreCart {
    pub fn open(store_id: StoreId, config: CartConfig, opened_at: DateTime<Utc>) -> Self {
        Self {
            store_id,
            lines: LineCollection::new(config),
            pricing_mode: PricingMode::Regular,
            opened_at,
        }
    }

    pub fn store_id(&self) -> StoreId {
        self.store_id
    }

    pub fn lines(&self) -> &[LineItem] {
        self.lines.lines()
    }

    pub fn get(&self, local_id: LocalId) -> Option<&LineItem> {
        self.lines.get(local_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    pub fn pricing_mode(&self) -> PricingMode {
        self.pricing_mode
    }

    pub fn is_wholesale(&self) -> bool {
        self.pricing_mode == PricingMode::Wholesale
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals::from_lines(self.lines.lines())
    }

    pub fn subtotal(&self) -> Money {
        self.lines.subtotal()
    }

    pub fn replace_all<I>(&mut self, items: I) -> Outcome
    where
        I: IntoIterator<Item = LineDraft>,
    {
        self.lines.replace_all(items)
    }

    /// Add a scanned/selected candidate, priced in the cart's current mode.
    pub fn add_line(&mut self, candidate: LineDraft) -> Outcome {
        self.lines.add_line(candidate.priced_for(self.pricing_mode))
    }

    /// Patch a line; a line the patch creates is priced in the cart's mode.
    pub fn update_line(&mut self, patch: LinePatch) -> Outcome {
        self.lines.update_line_in_mode(patch, self.pricing_mode)
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

    /// Wholesale toggle: reprice every line and every line added later.
    pub fn set_wholesale(&mut self, wholesale: bool) -> Outcome {
        self.pricing_mode = if wholesale {
            PricingMode::Wholesale
        } else {
            PricingMode::Regular
        };
        self.lines.set_pricing_mode_all(self.pricing_mode)
    }

    pub fn clear(&mut self) -> Outcome {
        self.lines.clear()
    }

    pub fn execute(&mut self, command: CartCommand) -> Outcome {
        match command {
            CartCommand::AddLine(candidate) => self.add_line(candidate),
            CartCommand::UpdateLine(patch) => self.update_line(patch),
            CartCommand::SetPricingModeAll { mode } => {
                self.set_wholesale(mode == PricingMode::Wholesale)
            }
            CartCommand::SetReceivedQuantity { .. } => {
                debug!(store_id = %self.store_id, op = command.name(), "not available on a POS cart");
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

    /// Close the cart into a sale ready for submission.
    pub fn checkout(self, completed_at: DateTime<Utc>) -> SaleSubmission {
        let totals = self.totals();
        SaleSubmission {
            store_id: self.store_id,
            pricing_mode: self.pricing_mode,
            opened_at: self.opened_at,
            completed_at,
            totals,
            lines: self.lines.into_lines(),
        }
    }
}

impl AggregateRoot for StoreCart {
    type Id = StoreId;

    fn id(&self) -> &Self::Id {
        &self.store_id
    }

    fn version(&self) -> u64 {
        self.lines.version()
    }
}

/// A completed sale, handed to the order submission service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleSubmission {
    pub store_id: StoreId,
    pub pricing_mode: PricingMode,
    pub opened_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub totals: CartTotals,
    pub lines: Vec<LineItem>,
}

/// Open carts keyed by store.
///
/// Handing out `&mut StoreCart` for a single store keeps every operation
/// scoped to that store's lines.
#[derive(Debug, Clone, Default)]
pub struct PosCarts {
    carts: HashMap<StoreId, StoreCart>,
    config: CartConfig,
}

impl PosCarts {
    pub fn new(config: CartConfig) -> Self {
        Self {
            carts: HashMap::new(),
            config,
        }
    }

    pub fn cart(&self, store_id: StoreId) -> Option<&StoreCart> {
        self.carts.get(&store_id)
    }

    /// The store's cart, opened empty on first access.
    pub fn cart_mut(&mut self, store_id: StoreId) -> &mut StoreCart {
        let config = self.config;
        self.carts.entry(store_id).or_insert_with(|| {
            debug!(%store_id, "opening store cart");
            StoreCart::open(store_id, config, Utc::now())
        })
    }

    /// Drop a store's cart without completing the sale.
    pub fn discard(&mut self, store_id: StoreId) -> Option<StoreCart> {
        let cart = self.carts.remove(&store_id);
        if cart.is_some() {
            debug!(%store_id, "discarded store cart");
        }
        cart
    }

    /// Complete the store's sale. Absent or empty carts are left alone.
    pub fn checkout(&mut self, store_id: StoreId) -> Option<SaleSubmission> {
        if self.carts.get(&store_id).is_none_or(StoreCart::is_empty) {
            return None;
        }
        let cart = self.carts.remove(&store_id)?;
        let sale = cart.checkout(Utc::now());
        info!(
            %store_id,
            lines = sale.lines.len(),
            grand_total = %sale.totals.grand_total,
            "sale checked out"
        );
        Some(sale)
    }

    pub fn stores(&self) -> impl Iterator<Item = StoreId> + '_ {
        self.carts.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.carts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carts.is_empty()
    }
}
