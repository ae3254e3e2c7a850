//! Integration tests for retail-core

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use retail_core::{
    utils::{EnhancedOrderValidator, EnhancedPurchaseValidator, MemoryStore},
    CoreError, Customer, ExpenseDraft, OrderDraftBuilder, OrderLine, OrderPatch, OrderStatus,
    PaymentStatus, Product, PurchaseDraft, PurchaseItem, PurchaseStatus, RetailCore,
};

async fn setup_customer(core: &mut RetailCore<MemoryStore>) -> Customer {
    core.create_customer(
        "Asha Stores".to_string(),
        Some("9000000001".to_string()),
        None,
        None,
        BigDecimal::from(0),
    )
    .await
    .unwrap()
}

async fn setup_product(core: &mut RetailCore<MemoryStore>, sku: &str, stock: i64) -> Product {
    core.create_product(
        sku.to_string(),
        format!("Product {}", sku),
        BigDecimal::from(40),
        BigDecimal::from(25),
        stock,
        5,
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_create_order_moves_balance_and_stock() {
    let storage = MemoryStore::new();
    let mut core = RetailCore::new(storage);

    let customer = setup_customer(&mut core).await;
    let product = setup_product(&mut core, "SKU-1", 50).await;

    let mut line = OrderLine::new(product.id.clone(), 3, BigDecimal::from(40));
    line.free_quantity = 1;
    let draft = OrderDraftBuilder::new(customer.id.clone())
        .line_with(line)
        .amount_paid(BigDecimal::from(20))
        .payment_mode("cash".to_string())
        .build();

    let order = core.create_order(draft).await.unwrap();
    assert_eq!(order.total, BigDecimal::from(120));
    assert_eq!(order.amount_paid, BigDecimal::from(20));
    assert_eq!(order.payment_status, PaymentStatus::Partial);
    assert_eq!(order.status, OrderStatus::Pending);

    // Balance moved by amount_paid - total; stock debited by sold + free
    let customer = core.get_customer(&customer.id).await.unwrap().unwrap();
    assert_eq!(customer.balance, BigDecimal::from(-100));
    assert_eq!(customer.amount_owed(), BigDecimal::from(100));
    let product = core.get_product(&product.id).await.unwrap().unwrap();
    assert_eq!(product.stock_level, 46);

    // Order is persisted with its lines
    let stored = core.get_order(&order.id).await.unwrap().unwrap();
    assert_eq!(stored.lines.len(), 1);
    assert_eq!(stored.lines[0].stock_units(), 4);
}

#[tokio::test]
async fn test_create_order_rejections_happen_before_writes() {
    let storage = MemoryStore::new();
    let mut core = RetailCore::new(storage);

    let customer = setup_customer(&mut core).await;
    let product = setup_product(&mut core, "SKU-1", 50).await;

    // Empty line list
    let draft = OrderDraftBuilder::new(customer.id.clone()).build();
    assert!(matches!(
        core.create_order(draft).await,
        Err(CoreError::Validation(_))
    ));

    // Non-positive quantity
    let draft = OrderDraftBuilder::new(customer.id.clone())
        .line(product.id.clone(), 0, BigDecimal::from(40))
        .build();
    assert!(matches!(
        core.create_order(draft).await,
        Err(CoreError::Validation(_))
    ));

    // Unknown customer
    let draft = OrderDraftBuilder::new("missing".to_string())
        .line(product.id.clone(), 1, BigDecimal::from(40))
        .build();
    assert!(matches!(
        core.create_order(draft).await,
        Err(CoreError::CustomerNotFound(_))
    ));

    // Unknown product
    let draft = OrderDraftBuilder::new(customer.id.clone())
        .line("missing".to_string(), 1, BigDecimal::from(40))
        .build();
    assert!(matches!(
        core.create_order(draft).await,
        Err(CoreError::ProductNotFound(_))
    ));

    // Paying more than the total is rejected, not banked
    let draft = OrderDraftBuilder::new(customer.id.clone())
        .line(product.id.clone(), 1, BigDecimal::from(40))
        .amount_paid(BigDecimal::from(45))
        .build();
    assert!(matches!(
        core.create_order(draft).await,
        Err(CoreError::Validation(_))
    ));

    // Nothing was written by any rejected draft
    let customer = core.get_customer(&customer.id).await.unwrap().unwrap();
    assert_eq!(customer.balance, BigDecimal::from(0));
    let product = core.get_product(&product.id).await.unwrap().unwrap();
    assert_eq!(product.stock_level, 50);
    assert!(core
        .list_customer_orders(&customer.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_update_order_applies_delta_not_absolute_value() {
    let storage = MemoryStore::new();
    let mut core = RetailCore::new(storage);

    let customer = setup_customer(&mut core).await;
    let product = setup_product(&mut core, "SKU-1", 50).await;

    let draft = OrderDraftBuilder::new(customer.id.clone())
        .line(product.id.clone(), 5, BigDecimal::from(40))
        .amount_paid(BigDecimal::from(50))
        .build();
    let order = core.create_order(draft).await.unwrap();

    // Balance after creation: 50 - 200 = -150
    let before = core.get_customer(&customer.id).await.unwrap().unwrap();
    assert_eq!(before.balance, BigDecimal::from(-150));

    // Raising amount_paid from 50 to 120 must move the balance by +70
    core.update_order(&order.id, OrderPatch::amount_paid(BigDecimal::from(120)))
        .await
        .unwrap();

    let after = core.get_customer(&customer.id).await.unwrap().unwrap();
    assert_eq!(after.balance, BigDecimal::from(-80));

    let order = core.get_order(&order.id).await.unwrap().unwrap();
    assert_eq!(order.amount_paid, BigDecimal::from(120));
    assert_eq!(order.payment_status, PaymentStatus::Partial);

    // Patching other fields leaves the balance alone
    let mut patch = OrderPatch::default();
    patch.status = Some(OrderStatus::Completed);
    core.update_order(&order.id, patch).await.unwrap();
    let untouched = core.get_customer(&customer.id).await.unwrap().unwrap();
    assert_eq!(untouched.balance, BigDecimal::from(-80));

    // The payment bound holds on update as well
    let result = core
        .update_order(&order.id, OrderPatch::amount_paid(BigDecimal::from(500)))
        .await;
    assert!(matches!(result, Err(CoreError::Validation(_))));
}

#[tokio::test]
async fn test_total_patch_enforces_bound_and_recomputes_status() {
    let storage = MemoryStore::new();
    let mut core = RetailCore::new(storage);

    let customer = setup_customer(&mut core).await;
    let product = setup_product(&mut core, "SKU-1", 50).await;

    let draft = OrderDraftBuilder::new(customer.id.clone())
        .line(product.id.clone(), 5, BigDecimal::from(40))
        .amount_paid(BigDecimal::from(120))
        .build();
    let order = core.create_order(draft).await.unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Partial);

    // Lowering the total below the stored amount_paid is rejected
    let mut patch = OrderPatch::default();
    patch.total = Some(BigDecimal::from(100));
    let result = core.update_order(&order.id, patch).await;
    assert!(matches!(result, Err(CoreError::Validation(_))));
    let stored = core.get_order(&order.id).await.unwrap().unwrap();
    assert_eq!(stored.total, BigDecimal::from(200));
    assert_eq!(stored.amount_paid, BigDecimal::from(120));

    // Lowering it to exactly amount_paid settles the order
    let mut patch = OrderPatch::default();
    patch.total = Some(BigDecimal::from(120));
    core.update_order(&order.id, patch).await.unwrap();
    let stored = core.get_order(&order.id).await.unwrap().unwrap();
    assert_eq!(stored.total, BigDecimal::from(120));
    assert_eq!(stored.payment_status, PaymentStatus::Paid);

    // A total-only patch moves no balance: the delta comes from
    // amount_paid, which did not change
    let customer_row = core.get_customer(&customer.id).await.unwrap().unwrap();
    assert_eq!(customer_row.balance, BigDecimal::from(-80));
}

#[tokio::test]
async fn test_delete_order_is_net_zero_on_stock_and_balance() {
    let storage = MemoryStore::new();
    let mut core = RetailCore::new(storage);

    let customer = setup_customer(&mut core).await;
    let product = setup_product(&mut core, "SKU-1", 50).await;

    let mut line = OrderLine::new(product.id.clone(), 3, BigDecimal::from(40));
    line.free_quantity = 1;
    let draft = OrderDraftBuilder::new(customer.id.clone())
        .line_with(line)
        .amount_paid(BigDecimal::from(20))
        .build();
    let order = core.create_order(draft).await.unwrap();

    // A later payment change is part of the combined effect to reverse
    core.update_order(&order.id, OrderPatch::amount_paid(BigDecimal::from(70)))
        .await
        .unwrap();

    core.delete_order(&order.id).await.unwrap();

    let customer = core.get_customer(&customer.id).await.unwrap().unwrap();
    assert_eq!(customer.balance, BigDecimal::from(0));
    let product = core.get_product(&product.id).await.unwrap().unwrap();
    assert_eq!(product.stock_level, 50);
    assert!(core.get_order(&order.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_fifo_allocation_settles_oldest_first() {
    let storage = MemoryStore::new();
    let mut core = RetailCore::new(storage);

    let customer = setup_customer(&mut core).await;
    let product = setup_product(&mut core, "SKU-1", 100).await;

    // O1 (older) owes 100, O2 (newer) owes 50
    let o1 = core
        .create_order(
            OrderDraftBuilder::new(customer.id.clone())
                .line(product.id.clone(), 5, BigDecimal::from(20))
                .build(),
        )
        .await
        .unwrap();
    let o2 = core
        .create_order(
            OrderDraftBuilder::new(customer.id.clone())
                .line(product.id.clone(), 5, BigDecimal::from(10))
                .build(),
        )
        .await
        .unwrap();

    core.allocate_payment(&customer.id, BigDecimal::from(120))
        .await
        .unwrap();

    let o1 = core.get_order(&o1.id).await.unwrap().unwrap();
    assert_eq!(o1.amount_paid, BigDecimal::from(100));
    assert_eq!(o1.payment_status, PaymentStatus::Paid);
    assert_eq!(o1.status, OrderStatus::Completed);

    let o2 = core.get_order(&o2.id).await.unwrap().unwrap();
    assert_eq!(o2.amount_paid, BigDecimal::from(20));
    assert_eq!(o2.payment_status, PaymentStatus::Partial);
    assert_eq!(o2.status, OrderStatus::Pending);

    // Conservation: owed 150 before, 120 paid in, no credit left over
    let customer = core.get_customer(&customer.id).await.unwrap().unwrap();
    assert_eq!(customer.balance, BigDecimal::from(-30));
}

#[tokio::test]
async fn test_allocation_overpayment_becomes_credit() {
    let storage = MemoryStore::new();
    let mut core = RetailCore::new(storage);

    let customer = setup_customer(&mut core).await;
    let product = setup_product(&mut core, "SKU-1", 100).await;

    let order = core
        .create_order(
            OrderDraftBuilder::new(customer.id.clone())
                .line(product.id.clone(), 5, BigDecimal::from(20))
                .build(),
        )
        .await
        .unwrap();

    core.allocate_payment(&customer.id, BigDecimal::from(150))
        .await
        .unwrap();

    let order = core.get_order(&order.id).await.unwrap().unwrap();
    assert_eq!(order.amount_paid, BigDecimal::from(100));
    assert_eq!(order.payment_status, PaymentStatus::Paid);
    assert_eq!(order.status, OrderStatus::Completed);

    // -100 owed + 150 paid = 50 credit held
    let customer = core.get_customer(&customer.id).await.unwrap().unwrap();
    assert_eq!(customer.balance, BigDecimal::from(50));
}

#[tokio::test]
async fn test_allocation_with_no_outstanding_orders_is_all_credit() {
    let storage = MemoryStore::new();
    let mut core = RetailCore::new(storage);

    let customer = setup_customer(&mut core).await;

    core.allocate_payment(&customer.id, BigDecimal::from(75))
        .await
        .unwrap();

    let customer = core.get_customer(&customer.id).await.unwrap().unwrap();
    assert_eq!(customer.balance, BigDecimal::from(75));
}

#[tokio::test]
async fn test_allocation_conserves_the_full_amount() {
    let storage = MemoryStore::new();
    let mut core = RetailCore::new(storage);

    let customer = setup_customer(&mut core).await;
    let product = setup_product(&mut core, "SKU-1", 100).await;

    // Three outstanding orders owing 30, 45, 60
    for price in [30, 45, 60] {
        core.create_order(
            OrderDraftBuilder::new(customer.id.clone())
                .line(product.id.clone(), 1, BigDecimal::from(price))
                .build(),
        )
        .await
        .unwrap();
    }

    let before = core.get_customer(&customer.id).await.unwrap().unwrap();
    assert_eq!(before.balance, BigDecimal::from(-135));

    core.allocate_payment(&customer.id, BigDecimal::from(100))
        .await
        .unwrap();

    // The balance moved by exactly the allocated amount
    let after = core.get_customer(&customer.id).await.unwrap().unwrap();
    assert_eq!(&after.balance - &before.balance, BigDecimal::from(100));

    // Rejects a non-positive amount and an unknown customer
    assert!(matches!(
        core.allocate_payment(&customer.id, BigDecimal::from(0)).await,
        Err(CoreError::Validation(_))
    ));
    assert!(matches!(
        core.allocate_payment("missing", BigDecimal::from(10)).await,
        Err(CoreError::CustomerNotFound(_))
    ));
}

#[tokio::test]
async fn test_record_purchase_updates_each_line_independently() {
    let storage = MemoryStore::new();
    let mut core = RetailCore::new(storage);

    let p1 = setup_product(&mut core, "SKU-1", 10).await;
    let p2 = setup_product(&mut core, "SKU-2", 20).await;

    let draft = PurchaseDraft {
        supplier_name: "Mega Wholesale".to_string(),
        bill_to: Some("Asha Stores HQ".to_string()),
        lines: vec![
            PurchaseItem::new(p1.id.clone(), 5, BigDecimal::from(8)),
            PurchaseItem::new(p2.id.clone(), 7, BigDecimal::from(12)),
        ],
    };

    let purchase = core.record_purchase(draft).await.unwrap();
    assert_eq!(purchase.total, BigDecimal::from(124));
    assert_eq!(purchase.status, PurchaseStatus::Received);
    assert_eq!(purchase.payment_status, PaymentStatus::Paid);

    // Stock increments and last-cost-wins unit pricing, per product
    let p1 = core.get_product(&p1.id).await.unwrap().unwrap();
    assert_eq!(p1.stock_level, 15);
    assert_eq!(p1.unit_price, BigDecimal::from(8));
    let p2 = core.get_product(&p2.id).await.unwrap().unwrap();
    assert_eq!(p2.stock_level, 27);
    assert_eq!(p2.unit_price, BigDecimal::from(12));

    let stored = core.get_purchase(&purchase.id).await.unwrap().unwrap();
    assert_eq!(stored.lines.len(), 2);
}

#[tokio::test]
async fn test_purchase_delete_leaves_stock_untouched() {
    let storage = MemoryStore::new();
    let mut core = RetailCore::new(storage);

    let product = setup_product(&mut core, "SKU-1", 10).await;
    let purchase = core
        .record_purchase(PurchaseDraft {
            supplier_name: "Mega Wholesale".to_string(),
            bill_to: None,
            lines: vec![PurchaseItem::new(product.id.clone(), 5, BigDecimal::from(8))],
        })
        .await
        .unwrap();

    core.set_purchase_status(&purchase.id, PurchaseStatus::Cancelled)
        .await
        .unwrap();
    core.delete_purchase(&purchase.id).await.unwrap();

    assert!(core.get_purchase(&purchase.id).await.unwrap().is_none());
    let product = core.get_product(&product.id).await.unwrap().unwrap();
    assert_eq!(product.stock_level, 15);
}

#[tokio::test]
async fn test_fallback_path_produces_the_same_figures() {
    // Same scenario as the atomic path, with the increment primitive off
    let storage = MemoryStore::without_atomic_adjust();
    let mut core = RetailCore::new(storage);

    let customer = setup_customer(&mut core).await;
    let product = setup_product(&mut core, "SKU-1", 50).await;

    let order = core
        .create_order(
            OrderDraftBuilder::new(customer.id.clone())
                .line(product.id.clone(), 3, BigDecimal::from(40))
                .amount_paid(BigDecimal::from(30))
                .build(),
        )
        .await
        .unwrap();

    let customer_row = core.get_customer(&customer.id).await.unwrap().unwrap();
    assert_eq!(customer_row.balance, BigDecimal::from(-90));
    let product_row = core.get_product(&product.id).await.unwrap().unwrap();
    assert_eq!(product_row.stock_level, 47);

    core.allocate_payment(&customer.id, BigDecimal::from(120))
        .await
        .unwrap();

    let order = core.get_order(&order.id).await.unwrap().unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Paid);
    let customer_row = core.get_customer(&customer.id).await.unwrap().unwrap();
    assert_eq!(customer_row.balance, BigDecimal::from(30));
}

#[tokio::test]
async fn test_partial_write_is_surfaced_and_diagnosable() {
    let storage = MemoryStore::new();
    let mut core = RetailCore::new(storage.clone());

    let customer = setup_customer(&mut core).await;
    let product = setup_product(&mut core, "SKU-1", 50).await;

    // Fail the line insert: the header commits, nothing after it runs
    storage.fail_once("insert_order_lines");
    let result = core
        .create_order(
            OrderDraftBuilder::new(customer.id.clone())
                .line(product.id.clone(), 2, BigDecimal::from(40))
                .amount_paid(BigDecimal::from(10))
                .build(),
        )
        .await;

    match result {
        Err(CoreError::PartialWrite {
            operation, step, ..
        }) => {
            assert_eq!(operation, "create_order");
            assert_eq!(step, "insert_order_lines");
        }
        other => panic!("expected partial write, got {:?}", other.map(|o| o.id)),
    }

    // The partial state is distinguishable: header without lines, and the
    // later stock/balance steps never ran
    let orders = core.list_customer_orders(&customer.id).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert!(orders[0].lines.is_empty());
    let customer_row = core.get_customer(&customer.id).await.unwrap().unwrap();
    assert_eq!(customer_row.balance, BigDecimal::from(0));
    let product_row = core.get_product(&product.id).await.unwrap().unwrap();
    assert_eq!(product_row.stock_level, 50);

    // Fail the balance step of a fresh order: stock is already debited
    storage.fail_once("adjust_customer_balance");
    let result = core
        .create_order(
            OrderDraftBuilder::new(customer.id.clone())
                .line(product.id.clone(), 2, BigDecimal::from(40))
                .amount_paid(BigDecimal::from(10))
                .build(),
        )
        .await;
    assert!(matches!(
        result,
        Err(CoreError::PartialWrite {
            operation: "create_order",
            step: "apply_balance_change",
            ..
        })
    ));
    let product_row = core.get_product(&product.id).await.unwrap().unwrap();
    assert_eq!(product_row.stock_level, 48);
    let customer_row = core.get_customer(&customer.id).await.unwrap().unwrap();
    assert_eq!(customer_row.balance, BigDecimal::from(0));
}

#[tokio::test]
async fn test_enhanced_validators() {
    let storage = MemoryStore::new();
    let mut core = RetailCore::with_validators(
        storage,
        Box::new(EnhancedOrderValidator),
        Box::new(EnhancedPurchaseValidator),
    );

    let customer = setup_customer(&mut core).await;
    let product = setup_product(&mut core, "SKU-1", 50).await;

    // Duplicate product lines are rejected by the enhanced rules
    let draft = OrderDraftBuilder::new(customer.id.clone())
        .line(product.id.clone(), 1, BigDecimal::from(40))
        .line(product.id.clone(), 2, BigDecimal::from(40))
        .build();
    assert!(matches!(
        core.create_order(draft).await,
        Err(CoreError::Validation(_))
    ));

    let draft = PurchaseDraft {
        supplier_name: "Mega Wholesale".to_string(),
        bill_to: None,
        lines: vec![
            PurchaseItem::new(product.id.clone(), 1, BigDecimal::from(8)),
            PurchaseItem::new(product.id.clone(), 2, BigDecimal::from(8)),
        ],
    };
    assert!(matches!(
        core.record_purchase(draft).await,
        Err(CoreError::Validation(_))
    ));
}

#[tokio::test]
async fn test_customer_and_product_maintenance() {
    let storage = MemoryStore::new();
    let mut core = RetailCore::new(storage);

    let customer = setup_customer(&mut core).await;
    let product = setup_product(&mut core, "SKU-1", 50).await;

    // Contact updates keep the balance untouched
    core.create_order(
        OrderDraftBuilder::new(customer.id.clone())
            .line(product.id.clone(), 1, BigDecimal::from(40))
            .build(),
    )
    .await
    .unwrap();

    let updated = core
        .update_customer_details(
            &customer.id,
            "Asha Traders".to_string(),
            Some("9000000002".to_string()),
            Some("asha@example.com".to_string()),
            None,
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Asha Traders");
    assert_eq!(updated.balance, BigDecimal::from(-40));

    // Product detail updates keep stock and unit cost untouched
    let updated = core
        .update_product_details(&product.id, "Soap Bar".to_string(), BigDecimal::from(45), 8)
        .await
        .unwrap();
    assert_eq!(updated.name, "Soap Bar");
    assert_eq!(updated.stock_level, 49);

    // Deleting the customer does not cascade to their orders
    core.delete_customer(&customer.id).await.unwrap();
    let orders = core.list_customer_orders(&customer.id).await.unwrap();
    assert_eq!(orders.len(), 1);
}

#[tokio::test]
async fn test_order_survives_json_round_trip() {
    let storage = MemoryStore::new();
    let mut core = RetailCore::new(storage);

    let customer = setup_customer(&mut core).await;
    let product = setup_product(&mut core, "SKU-1", 50).await;

    let mut line = OrderLine::new(product.id.clone(), 3, BigDecimal::from(40));
    line.free_quantity = 1;
    let order = core
        .create_order(
            OrderDraftBuilder::new(customer.id.clone())
                .line_with(line)
                .amount_paid(BigDecimal::from(20))
                .payment_mode("cash".to_string())
                .build(),
        )
        .await
        .unwrap();

    let json = serde_json::to_string(&order).unwrap();
    let back: retail_core::Order = serde_json::from_str(&json).unwrap();
    assert_eq!(back, order);
    assert_eq!(back.payment_status, PaymentStatus::Partial);
    assert_eq!(back.lines[0].stock_units(), 4);
}

#[tokio::test]
async fn test_expense_log_is_independent() {
    let storage = MemoryStore::new();
    let mut core = RetailCore::new(storage);

    let lunch = core
        .record_expense(ExpenseDraft {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            description: "Staff lunch".to_string(),
            amount: BigDecimal::from(450),
            category: Some("food".to_string()),
            payment_mode: Some("cash".to_string()),
        })
        .await
        .unwrap();
    core.record_expense(ExpenseDraft {
        date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
        description: "Electricity".to_string(),
        amount: BigDecimal::from(1200),
        category: Some("utilities".to_string()),
        payment_mode: None,
    })
    .await
    .unwrap();

    let expenses = core.list_expenses().await.unwrap();
    assert_eq!(expenses.len(), 2);
    assert_eq!(expenses[0].description, "Staff lunch");

    core.delete_expense(&lunch.id).await.unwrap();
    assert_eq!(core.list_expenses().await.unwrap().len(), 1);

    // Negative and unnamed expenses are rejected
    let result = core
        .record_expense(ExpenseDraft {
            date: NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
            description: "  ".to_string(),
            amount: BigDecimal::from(10),
            category: None,
            payment_mode: None,
        })
        .await;
    assert!(matches!(result, Err(CoreError::Validation(_))));
}
