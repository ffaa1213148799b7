//! The line reconciliation engine.
//!
//! A [`LineCollection`] owns the ordered lines of one transaction context and
//! applies every mutation so that, once it returns:
//!
//! - incremental operations never make two non-serialized lines share
//!   `(product_id, variant_key)`; a bulk load ([`LineCollection::replace_all`])
//!   keeps lines as given, so duplicates it brings in remain until removed,
//! - every line's `line_total` equals `unit_price * quantity`,
//! - every line has a product id and a unique `local_id`,
//! - the tracked total (if any) equals the sum of line totals.
//!
//! Mutations are synchronous and all-or-nothing; rejected input is reported as
//! [`Outcome::Ignored`] and leaves the collection untouched.

use tracing::{debug, trace};

use poscart_core::{DomainResult, Entity, ExpectedVersion, LocalId, Money, ProductId, VariantKey};

use crate::command::CartCommand;
use crate::config::CartConfig;
use crate::line::{LineDraft, LineItem, LinePatch, PricingMode, ReceiptStatus};
use crate::outcome::{IgnoreReason, Outcome};

#[derive(Debug, Clone, PartialEq)]
pub struct LineCollection {
    lines: Vec<LineItem>,
    config: CartConfig,
    tracked_total: Option<Money>,
    version: u64,
}

impl LineCollection {
    /// Empty collection without a running total (POS carts, edit sessions).
    pub fn new(config: CartConfig) -> Self {
        Self {
            lines: Vec::new(),
            config,
            tracked_total: None,
            version: 0,
        }
    }

    /// Empty collection that keeps a running total (purchase orders).
    pub fn with_tracked_total(config: CartConfig) -> Self {
        Self {
            tracked_total: Some(Money::ZERO),
            ..Self::new(config)
        }
    }

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<LineItem> {
        self.lines
    }

    pub fn get(&self, local_id: LocalId) -> Option<&LineItem> {
        self.lines.iter().find(|line| line.id() == local_id)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn config(&self) -> &CartConfig {
        &self.config
    }

    /// Number of applied mutations so far.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Sum of all line totals.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(LineItem::line_total).sum()
    }

    /// Running total, for collections created with [`Self::with_tracked_total`].
    pub fn tracked_total(&self) -> Option<Money> {
        self.tracked_total
    }

    /// Bulk load. Drafts without a product id (or otherwise invalid, or
    /// reusing an earlier draft's local id) are dropped; the rest become the
    /// collection as given, without merging.
    pub fn replace_all<I>(&mut self, items: I) -> Outcome
    where
        I: IntoIterator<Item = LineDraft>,
    {
        let mut lines: Vec<LineItem> = Vec::new();
        let mut dropped = 0;
        for draft in items {
            let local_id = draft.local_id;
            match LineItem::try_from(draft) {
                Ok(item) if lines.iter().all(|line| line.local_id != local_id) => {
                    lines.push(item)
                }
                Ok(_) => {
                    debug!(%local_id, "dropping draft with duplicate local id");
                    dropped += 1;
                }
                Err(reason) => {
                    debug!(%local_id, %reason, "dropping invalid draft");
                    dropped += 1;
                }
            }
        }
        let kept = lines.len();
        self.lines = lines;
        self.finish("replace_all", Outcome::Replaced { kept, dropped })
    }

    /// Add a candidate line, merging it into the matching line if one exists.
    pub fn add_line(&mut self, candidate: LineDraft) -> Outcome {
        let outcome = match LineItem::try_from(candidate) {
            Ok(item) if item.quantity < 1 => Outcome::Ignored(IgnoreReason::NonPositiveQuantity),
            Ok(item) => self.reconcile(item),
            Err(reason) => Outcome::Ignored(reason),
        };
        self.finish("add_line", outcome)
    }

    /// Apply a typed patch to the line it names.
    ///
    /// A patch for an unknown line that carries a product id is inserted as a
    /// new line (merging like [`Self::add_line`] if its product/variant already
    /// has one).
    pub fn update_line(&mut self, patch: LinePatch) -> Outcome {
        let outcome = self.apply_update(patch, None);
        self.finish("update_line", outcome)
    }

    /// [`Self::update_line`] for owners with an active pricing mode: a line
    /// created from the patch is priced in `mode`, like a scanned candidate.
    pub fn update_line_in_mode(&mut self, patch: LinePatch, mode: PricingMode) -> Outcome {
        let outcome = self.apply_update(patch, Some(mode));
        self.finish("update_line", outcome)
    }

    /// Idempotent: removing an absent line is ignored, not an error.
    pub fn remove_line(&mut self, local_id: LocalId) -> Outcome {
        let outcome = match self.index_of(local_id) {
            Some(idx) => {
                self.lines.remove(idx);
                Outcome::Removed(local_id)
            }
            None => Outcome::Ignored(IgnoreReason::UnknownLine(local_id)),
        };
        self.finish("remove_line", outcome)
    }

    /// Set a line's quantity. The stock ceiling is only enforced here when
    /// [`CartConfig::clamp_direct_edits`] is on.
    pub fn set_quantity(&mut self, local_id: LocalId, quantity: i64) -> Outcome {
        let outcome = if quantity < 0 {
            Outcome::Ignored(IgnoreReason::NegativeQuantity)
        } else {
            let clamp = self.config.clamp_direct_edits;
            self.with_line(local_id, |line| {
                line.quantity = if clamp {
                    clamp_to_ceiling(quantity, line.stock_ceiling).0
                } else {
                    quantity
                };
            })
        };
        self.finish("set_quantity", outcome)
    }

    pub fn set_unit_price(&mut self, local_id: LocalId, unit_price: Money) -> Outcome {
        let outcome = if unit_price.is_negative() {
            Outcome::Ignored(IgnoreReason::NegativePrice)
        } else {
            self.with_line(local_id, |line| line.unit_price = unit_price)
        };
        self.finish("set_unit_price", outcome)
    }

    /// Record how many units of a purchase line arrived and derive its status.
    pub fn set_received_quantity(&mut self, local_id: LocalId, received: i64) -> Outcome {
        let outcome = if received < 0 {
            Outcome::Ignored(IgnoreReason::NegativeQuantity)
        } else {
            self.with_line(local_id, |line| {
                line.received_quantity = Some(received);
                line.receipt_status = Some(ReceiptStatus::derive(line.quantity, received));
            })
        };
        self.finish("set_received_quantity", outcome)
    }

    /// Switch one line between its regular and wholesale price.
    pub fn set_pricing_mode(&mut self, local_id: LocalId, mode: PricingMode) -> Outcome {
        let outcome = match self.index_of(local_id) {
            Some(idx) => {
                self.lines[idx].apply_pricing_mode(mode);
                Outcome::Updated(local_id)
            }
            None => Outcome::Ignored(IgnoreReason::UnknownLine(local_id)),
        };
        self.finish("set_pricing_mode", outcome)
    }

    /// Switch every line between its regular and wholesale price.
    pub fn set_pricing_mode_all(&mut self, mode: PricingMode) -> Outcome {
        for line in &mut self.lines {
            line.apply_pricing_mode(mode);
        }
        let repriced = self.lines.len();
        self.finish("set_pricing_mode_all", Outcome::Repriced(repriced))
    }

    pub fn clear(&mut self) -> Outcome {
        self.lines.clear();
        self.finish("clear", Outcome::Cleared)
    }

    /// Dispatch a serialized command to the matching operation.
    pub fn execute(&mut self, command: CartCommand) -> Outcome {
        match command {
            CartCommand::ReplaceAll { items } => self.replace_all(items),
            CartCommand::AddLine(candidate) => self.add_line(candidate),
            CartCommand::UpdateLine(patch) => self.update_line(patch),
            CartCommand::RemoveLine { local_id } => self.remove_line(local_id),
            CartCommand::SetQuantity { local_id, quantity } => self.set_quantity(local_id, quantity),
            CartCommand::SetUnitPrice {
                local_id,
                unit_price,
            } => self.set_unit_price(local_id, unit_price),
            CartCommand::SetReceivedQuantity {
                local_id,
                received_quantity,
            } => self.set_received_quantity(local_id, received_quantity),
            CartCommand::SetPricingMode { local_id, mode } => self.set_pricing_mode(local_id, mode),
            CartCommand::SetPricingModeAll { mode } => self.set_pricing_mode_all(mode),
            CartCommand::Clear => self.clear(),
        }
    }

    /// Compare-and-swap flavored [`Self::execute`]: fails with a conflict
    /// when the collection moved past `expected`.
    pub fn execute_expected(
        &mut self,
        expected: ExpectedVersion,
        command: CartCommand,
    ) -> DomainResult<Outcome> {
        expected.check(self.version)?;
        Ok(self.execute(command))
    }

    fn index_of(&self, local_id: LocalId) -> Option<usize> {
        self.lines.iter().position(|line| line.id() == local_id)
    }

    fn index_of_key(&self, product_id: ProductId, variant_key: Option<&VariantKey>) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.matches_key(product_id, variant_key))
    }

    fn with_line<F>(&mut self, local_id: LocalId, mutate: F) -> Outcome
    where
        F: FnOnce(&mut LineItem),
    {
        match self.index_of(local_id) {
            Some(idx) => {
                let line = &mut self.lines[idx];
                mutate(&mut *line);
                line.recompute();
                Outcome::Updated(local_id)
            }
            None => Outcome::Ignored(IgnoreReason::UnknownLine(local_id)),
        }
    }

    /// Merge-or-append for a validated line.
    fn reconcile(&mut self, item: LineItem) -> Outcome {
        if item.is_serialized && !item.serials.is_empty() {
            return self.append(item);
        }

        if let Some(idx) = self.index_of_key(item.product_id, item.variant_key.as_ref()) {
            return self.merge_into(idx, item);
        }

        // Identity healing: a line loaded without a variant key takes the key
        // the variant picker supplies instead of becoming a second line.
        if self.config.heal_variant_identity && item.variant_key.is_some() {
            if let Some(idx) = self.index_of_key(item.product_id, None) {
                let line = &mut self.lines[idx];
                line.variant_key = item.variant_key.clone();
                line.stock_ceiling = item.stock_ceiling.or(line.stock_ceiling);
                return self.merge_into(idx, item);
            }
        }

        self.append(item)
    }

    fn append(&mut self, item: LineItem) -> Outcome {
        let local_id = item.local_id;
        if self.index_of(local_id).is_some() {
            return Outcome::Ignored(IgnoreReason::DuplicateLocalId(local_id));
        }
        self.lines.push(item);
        Outcome::Appended(local_id)
    }

    fn merge_into(&mut self, idx: usize, incoming: LineItem) -> Outcome {
        let line = &mut self.lines[idx];
        let ceiling = incoming.stock_ceiling.or(line.stock_ceiling);
        let (quantity, clamped) =
            clamp_to_ceiling(line.quantity.saturating_add(incoming.quantity), ceiling);
        line.stock_ceiling = ceiling;
        line.quantity = quantity;
        line.recompute();
        Outcome::Merged {
            into: line.local_id,
            clamped,
        }
    }

    fn apply_update(&mut self, patch: LinePatch, mode: Option<PricingMode>) -> Outcome {
        if patch.quantity.is_some_and(|q| q < 0) {
            return Outcome::Ignored(IgnoreReason::NegativeQuantity);
        }
        if patch.has_negative_price() {
            return Outcome::Ignored(IgnoreReason::NegativePrice);
        }

        let local_id = patch.local_id;
        let Some(idx) = self.index_of(local_id) else {
            if patch.product_id.is_none() {
                return Outcome::Ignored(IgnoreReason::UnknownLine(local_id));
            }
            let candidate = LineDraft::from(patch);
            let candidate = match mode {
                Some(mode) => candidate.priced_for(mode),
                None => candidate,
            };
            return match LineItem::try_from(candidate) {
                Ok(item) => self.reconcile(item),
                Err(reason) => Outcome::Ignored(reason),
            };
        };

        let current = &self.lines[idx];
        let product_id = patch.product_id.unwrap_or(current.product_id);
        let variant_key = patch
            .variant_key
            .clone()
            .or_else(|| current.variant_key.clone());
        let rekeyed = product_id != current.product_id || variant_key != current.variant_key;
        let collides = rekeyed
            && !current.is_serialized
            && self
                .lines
                .iter()
                .enumerate()
                .any(|(i, other)| i != idx && other.matches_key(product_id, variant_key.as_ref()));
        if collides {
            return Outcome::Ignored(IgnoreReason::IdentityConflict(local_id));
        }

        let clamp = self.config.clamp_direct_edits;
        let line = &mut self.lines[idx];
        line.apply_patch(patch);
        if clamp {
            line.quantity = clamp_to_ceiling(line.quantity, line.stock_ceiling).0;
            line.recompute();
        }
        Outcome::Updated(local_id)
    }

    fn finish(&mut self, op: &'static str, outcome: Outcome) -> Outcome {
        match outcome {
            Outcome::Ignored(reason) => {
                debug!(op, %reason, "cart mutation ignored");
            }
            _ => {
                self.version += 1;
                if self.tracked_total.is_some() {
                    self.tracked_total = Some(self.subtotal());
                }
                trace!(op, ?outcome, lines = self.lines.len(), version = self.version, "cart mutation applied");
            }
        }
        outcome
    }
}

/// Returns the clamped quantity and whether clamping happened.
fn clamp_to_ceiling(quantity: i64, ceiling: Option<i64>) -> (i64, bool) {
    match ceiling {
        Some(ceiling) if quantity > ceiling => (ceiling.max(0), true),
        _ => (quantity, false),
    }
}
