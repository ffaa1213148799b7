//! Cart/order line types: candidates, retained lines and typed patches.

use serde::{Deserialize, Serialize};

use poscart_core::{Entity, LocalId, Money, ProductId, VariantKey};

use crate::outcome::IgnoreReason;

/// Which of a line's alternate prices is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingMode {
    #[default]
    Regular,
    Wholesale,
}

/// Receipt state of a purchase order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    Ordered,
    PartiallyReceived,
    Received,
}

impl ReceiptStatus {
    /// Status of a line ordered at `quantity` of which `received` units arrived.
    pub fn derive(quantity: i64, received: i64) -> Self {
        if received >= quantity {
            ReceiptStatus::Received
        } else if received > 0 {
            ReceiptStatus::PartiallyReceived
        } else {
            ReceiptStatus::Ordered
        }
    }
}

/// Candidate line, as built from a product lookup or loaded from a saved order.
///
/// A draft may lack a product id (stale or corrupt data); such drafts never
/// make it into a collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineDraft {
    pub local_id: LocalId,
    pub product_id: Option<ProductId>,
    pub variant_key: Option<VariantKey>,
    #[serde(default)]
    pub unit_price: Money,
    pub regular_unit_price: Option<Money>,
    pub wholesale_unit_price: Option<Money>,
    #[serde(default)]
    pub pricing_mode: PricingMode,
    #[serde(default)]
    pub quantity: i64,
    pub stock_ceiling: Option<i64>,
    #[serde(default)]
    pub is_serialized: bool,
    #[serde(default)]
    pub serials: Vec<String>,
    pub tax_rate: Option<f64>,
    #[serde(default)]
    pub tax_included: bool,
    pub received_quantity: Option<i64>,
}

impl LineDraft {
    pub fn new(local_id: LocalId, product_id: ProductId, unit_price: Money, quantity: i64) -> Self {
        Self {
            local_id,
            product_id: Some(product_id),
            unit_price,
            quantity,
            ..Self::default()
        }
    }

    pub fn with_variant(mut self, variant_key: impl Into<VariantKey>) -> Self {
        self.variant_key = Some(variant_key.into());
        self
    }

    pub fn with_stock_ceiling(mut self, ceiling: i64) -> Self {
        self.stock_ceiling = Some(ceiling);
        self
    }

    /// Mark the draft as a serialized unit carrying the given serial numbers.
    pub fn with_serials<I, S>(mut self, serials: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.is_serialized = true;
        self.serials = serials.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_alternate_prices(mut self, regular: Money, wholesale: Money) -> Self {
        self.regular_unit_price = Some(regular);
        self.wholesale_unit_price = Some(wholesale);
        self
    }

    pub fn with_tax(mut self, rate: f64, included: bool) -> Self {
        self.tax_rate = Some(rate);
        self.tax_included = included;
        self
    }

    /// Select the active price for `mode`, keeping the current price when the
    /// matching alternate is unknown.
    pub fn priced_for(mut self, mode: PricingMode) -> Self {
        if let Some(price) = alternate_price(mode, self.regular_unit_price, self.wholesale_unit_price)
        {
            self.unit_price = price;
        }
        self.pricing_mode = mode;
        self
    }
}

fn alternate_price(
    mode: PricingMode,
    regular: Option<Money>,
    wholesale: Option<Money>,
) -> Option<Money> {
    match mode {
        PricingMode::Regular => regular,
        PricingMode::Wholesale => wholesale,
    }
}

/// A line retained in a collection.
///
/// Fields are only mutated by the collection so that `line_total` always
/// equals `unit_price * quantity`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub(crate) local_id: LocalId,
    pub(crate) product_id: ProductId,
    pub(crate) variant_key: Option<VariantKey>,
    pub(crate) unit_price: Money,
    pub(crate) regular_unit_price: Option<Money>,
    pub(crate) wholesale_unit_price: Option<Money>,
    pub(crate) pricing_mode: PricingMode,
    pub(crate) quantity: i64,
    pub(crate) line_total: Money,
    pub(crate) stock_ceiling: Option<i64>,
    pub(crate) is_serialized: bool,
    pub(crate) serials: Vec<String>,
    pub(crate) tax_rate: Option<f64>,
    pub(crate) tax_included: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) received_quantity: Option<i64>,
    #[serde(rename = "status", skip_serializing_if = "Option::is_none")]
    pub(crate) receipt_status: Option<ReceiptStatus>,
}

impl LineItem {
    pub fn local_id(&self) -> LocalId {
        self.local_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn variant_key(&self) -> Option<&VariantKey> {
        self.variant_key.as_ref()
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn regular_unit_price(&self) -> Option<Money> {
        self.regular_unit_price
    }

    pub fn wholesale_unit_price(&self) -> Option<Money> {
        self.wholesale_unit_price
    }

    pub fn pricing_mode(&self) -> PricingMode {
        self.pricing_mode
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn line_total(&self) -> Money {
        self.line_total
    }

    pub fn stock_ceiling(&self) -> Option<i64> {
        self.stock_ceiling
    }

    pub fn is_serialized(&self) -> bool {
        self.is_serialized
    }

    pub fn serials(&self) -> &[String] {
        &self.serials
    }

    pub fn tax_rate(&self) -> Option<f64> {
        self.tax_rate
    }

    pub fn tax_included(&self) -> bool {
        self.tax_included
    }

    pub fn received_quantity(&self) -> Option<i64> {
        self.received_quantity
    }

    pub fn receipt_status(&self) -> Option<ReceiptStatus> {
        self.receipt_status
    }

    /// True when this line is the merge target for `product_id`/`variant_key`.
    pub(crate) fn matches_key(&self, product_id: ProductId, variant_key: Option<&VariantKey>) -> bool {
        !self.is_serialized && self.product_id == product_id && self.variant_key.as_ref() == variant_key
    }

    /// Re-derive every computed field from the stored inputs.
    pub(crate) fn recompute(&mut self) {
        self.line_total = self.unit_price.times(self.quantity);
        if let Some(received) = self.received_quantity {
            self.receipt_status = Some(ReceiptStatus::derive(self.quantity, received));
        }
    }

    pub(crate) fn apply_pricing_mode(&mut self, mode: PricingMode) {
        if let Some(price) = alternate_price(mode, self.regular_unit_price, self.wholesale_unit_price)
        {
            self.unit_price = price;
        }
        self.pricing_mode = mode;
        self.recompute();
    }

    /// Shallow field replacement; identity checks happen in the collection.
    pub(crate) fn apply_patch(&mut self, patch: LinePatch) {
        if let Some(product_id) = patch.product_id {
            self.product_id = product_id;
        }
        if let Some(variant_key) = patch.variant_key {
            self.variant_key = Some(variant_key);
        }
        if let Some(price) = patch.unit_price {
            self.unit_price = price;
        }
        if let Some(price) = patch.regular_unit_price {
            self.regular_unit_price = Some(price);
        }
        if let Some(price) = patch.wholesale_unit_price {
            self.wholesale_unit_price = Some(price);
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(ceiling) = patch.stock_ceiling {
            self.stock_ceiling = Some(ceiling);
        }
        if let Some(serials) = patch.serials {
            self.serials = serials;
        }
        if let Some(rate) = patch.tax_rate {
            self.tax_rate = Some(rate);
        }
        if let Some(included) = patch.tax_included {
            self.tax_included = included;
        }
        self.recompute();
    }
}

impl Entity for LineItem {
    type Id = LocalId;

    fn id(&self) -> LocalId {
        self.local_id
    }
}

impl TryFrom<LineDraft> for LineItem {
    type Error = IgnoreReason;

    fn try_from(draft: LineDraft) -> Result<Self, Self::Error> {
        let product_id = draft.product_id.ok_or(IgnoreReason::MissingProduct)?;
        if draft.quantity < 0 {
            return Err(IgnoreReason::NegativeQuantity);
        }
        if [Some(draft.unit_price), draft.regular_unit_price, draft.wholesale_unit_price]
            .into_iter()
            .flatten()
            .any(Money::is_negative)
        {
            return Err(IgnoreReason::NegativePrice);
        }

        let mut item = LineItem {
            local_id: draft.local_id,
            product_id,
            variant_key: draft.variant_key,
            unit_price: draft.unit_price,
            regular_unit_price: draft.regular_unit_price,
            wholesale_unit_price: draft.wholesale_unit_price,
            pricing_mode: draft.pricing_mode,
            quantity: draft.quantity,
            line_total: Money::ZERO,
            stock_ceiling: draft.stock_ceiling,
            is_serialized: draft.is_serialized,
            serials: draft.serials,
            tax_rate: draft.tax_rate,
            tax_included: draft.tax_included,
            received_quantity: draft.received_quantity,
            receipt_status: None,
        };
        item.recompute();
        Ok(item)
    }
}

impl From<LineItem> for LineDraft {
    fn from(item: LineItem) -> Self {
        Self {
            local_id: item.local_id,
            product_id: Some(item.product_id),
            variant_key: item.variant_key,
            unit_price: item.unit_price,
            regular_unit_price: item.regular_unit_price,
            wholesale_unit_price: item.wholesale_unit_price,
            pricing_mode: item.pricing_mode,
            quantity: item.quantity,
            stock_ceiling: item.stock_ceiling,
            is_serialized: item.is_serialized,
            serials: item.serials,
            tax_rate: item.tax_rate,
            tax_included: item.tax_included,
            received_quantity: item.received_quantity,
        }
    }
}

/// Fields an update may change on an existing line.
///
/// `line_total` is absent: it is always derived. `None` leaves
/// the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinePatch {
    pub local_id: LocalId,
    pub product_id: Option<ProductId>,
    pub variant_key: Option<VariantKey>,
    pub unit_price: Option<Money>,
    pub regular_unit_price: Option<Money>,
    pub wholesale_unit_price: Option<Money>,
    pub quantity: Option<i64>,
    pub stock_ceiling: Option<i64>,
    pub serials: Option<Vec<String>>,
    pub tax_rate: Option<f64>,
    pub tax_included: Option<bool>,
}

impl LinePatch {
    pub fn new(local_id: LocalId) -> Self {
        Self {
            local_id,
            ..Self::default()
        }
    }

    pub fn with_product(mut self, product_id: ProductId) -> Self {
        self.product_id = Some(product_id);
        self
    }

    pub fn with_variant(mut self, variant_key: impl Into<VariantKey>) -> Self {
        self.variant_key = Some(variant_key.into());
        self
    }

    pub fn with_unit_price(mut self, price: Money) -> Self {
        self.unit_price = Some(price);
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_stock_ceiling(mut self, ceiling: i64) -> Self {
        self.stock_ceiling = Some(ceiling);
        self
    }

    pub(crate) fn has_negative_price(&self) -> bool {
        [self.unit_price, self.regular_unit_price, self.wholesale_unit_price]
            .into_iter()
            .flatten()
            .any(Money::is_negative)
    }
}

impl From<LinePatch> for LineDraft {
    /// Builds a candidate from a patch that addressed no existing line.
    fn from(patch: LinePatch) -> Self {
        let serials = patch.serials.unwrap_or_default();
        Self {
            local_id: patch.local_id,
            product_id: patch.product_id,
            variant_key: patch.variant_key,
            unit_price: patch.unit_price.unwrap_or_default(),
            regular_unit_price: patch.regular_unit_price,
            wholesale_unit_price: patch.wholesale_unit_price,
            pricing_mode: PricingMode::Regular,
            quantity: patch.quantity.unwrap_or_default(),
            stock_ceiling: patch.stock_ceiling,
            is_serialized: !serials.is_empty(),
            serials,
            tax_rate: patch.tax_rate,
            tax_included: patch.tax_included.unwrap_or_default(),
            received_quantity: None,
        }
    }
}
