//! End-to-end checkout flows through the public API only.

use poscart_cart::{CartCommand, CartConfig, LineDraft, LinePatch, Outcome};
use poscart_core::{
    AggregateRoot, ExpectedVersion, LocalId, LocalIdSequence, Money, OrderId, ProductId, StoreId,
};
use poscart_sales::{OrderEditSession, PosCarts};
use serde_json::json;

fn scan(ids: &mut LocalIdSequence, product: i64, price: i64) -> LineDraft {
    LineDraft::new(ids.next_id(), ProductId(product), Money(price), 1)
}

#[test]
fn repeated_scans_collapse_into_one_line() {
    let mut carts = PosCarts::new(CartConfig::default());
    let store = StoreId::new();
    let mut ids = LocalIdSequence::new();

    for _ in 0..3 {
        carts.cart_mut(store).add_line(scan(&mut ids, 42, 199).with_stock_ceiling(10));
    }
    carts.cart_mut(store).add_line(scan(&mut ids, 7, 1250));

    let cart = carts.cart(store).unwrap();
    assert_eq!(cart.lines().len(), 2);
    assert_eq!(cart.lines()[0].quantity(), 3);
    assert_eq!(cart.lines()[0].line_total(), Money(597));
    assert_eq!(cart.totals().grand_total, Money(597 + 1250));
}

#[test]
fn stock_ceiling_stops_runaway_scanning() {
    let mut carts = PosCarts::new(CartConfig::default());
    let store = StoreId::new();
    let mut ids = LocalIdSequence::new();

    let mut last = Outcome::Cleared;
    for _ in 0..5 {
        last = carts
            .cart_mut(store)
            .add_line(scan(&mut ids, 42, 199).with_stock_ceiling(2));
    }
    assert_eq!(
        last,
        Outcome::Merged {
            into: LocalId(0),
            clamped: true
        }
    );
    assert_eq!(carts.cart(store).unwrap().lines()[0].quantity(), 2);
}

#[test]
fn ui_commands_drive_a_store_cart() {
    let mut carts = PosCarts::new(CartConfig::default());
    let store = StoreId::new();
    let cart = carts.cart_mut(store);

    let commands: Vec<CartCommand> = serde_json::from_value(json!([
        {"op": "add_line", "localId": 1, "productId": 10, "unitPrice": 50, "quantity": 2},
        {"op": "add_line", "localId": 2, "productId": 11, "unitPrice": 20, "quantity": 1,
         "regularUnitPrice": 20, "wholesaleUnitPrice": 15},
        {"op": "set_quantity", "localId": 1, "quantity": 4},
        {"op": "set_pricing_mode_all", "mode": "wholesale"},
        {"op": "remove_line", "localId": 99}
    ]))
    .unwrap();
    for command in commands {
        cart.execute(command);
    }

    assert!(cart.is_wholesale());
    assert_eq!(cart.get(LocalId(1)).unwrap().line_total(), Money(200));
    assert_eq!(cart.get(LocalId(2)).unwrap().line_total(), Money(15));
    assert_eq!(cart.version(), 4);

    let sale = carts.checkout(store).unwrap();
    let payload = serde_json::to_value(&sale).unwrap();
    assert_eq!(payload["totals"]["subtotal"], 215);
    assert_eq!(payload["lines"][1]["pricingMode"], "wholesale");
    assert_eq!(payload["pricingMode"], "wholesale");
}

#[test]
fn concurrent_terminals_detect_stale_writes() {
    let mut carts = PosCarts::new(CartConfig::default());
    let store = StoreId::new();
    let cart = carts.cart_mut(store);
    cart.add_line(LineDraft::new(LocalId(1), ProductId(10), Money(50), 1));
    let seen = cart.version();

    cart.set_quantity(LocalId(1), 2);
    let stale = cart.execute_expected(
        ExpectedVersion::Exact(seen),
        CartCommand::UpdateLine(LinePatch::new(LocalId(1)).with_quantity(9)),
    );
    assert!(stale.is_err());
    assert_eq!(cart.get(LocalId(1)).unwrap().quantity(), 2);
}

#[test]
fn edited_order_round_trips_from_saved_json() {
    let saved = json!([
        {"localId": 1, "productId": 10, "unitPrice": 500, "quantity": 2},
        {"localId": 2, "unitPrice": 100, "quantity": 1},
        {"localId": 3, "productId": 12, "unitPrice": 999, "quantity": 1,
         "isSerialized": true, "serials": ["SN-9"]}
    ]);
    let drafts: Vec<LineDraft> = serde_json::from_value(saved).unwrap();
    let mut session = OrderEditSession::load(OrderId::new(), drafts, CartConfig::default());
    assert_eq!(session.lines().len(), 2);

    session.add_line(
        LineDraft::new(LocalId(4), ProductId(12), Money(999), 1).with_serials(["SN-10"]),
    );
    assert_eq!(session.lines().len(), 3);
    assert!(session.has_changes());

    let lines = session.finish();
    let total: Money = lines.iter().map(|l| l.line_total()).sum();
    assert_eq!(total, Money(1000 + 999 + 999));
}
