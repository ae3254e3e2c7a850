//! Basic retail workflow example

use bigdecimal::BigDecimal;
use retail_core::utils::MemoryStore;
use retail_core::{OrderDraftBuilder, OrderPatch, PurchaseDraft, PurchaseItem, RetailCore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    println!("🛒 Retail Core - Basic Workflows Example\n");

    let storage = MemoryStore::new();
    let mut core = RetailCore::new(storage);

    // 1. Intake: one customer, two products
    println!("📇 Setting up customer and products...");
    let customer = core
        .create_customer(
            "Asha Stores".to_string(),
            Some("9000000001".to_string()),
            None,
            None,
            BigDecimal::from(0),
        )
        .await?;
    let soap = core
        .create_product(
            "SOAP-01".to_string(),
            "Soap Bar".to_string(),
            BigDecimal::from(40),
            BigDecimal::from(25),
            0,
            10,
        )
        .await?;
    let oil = core
        .create_product(
            "OIL-01".to_string(),
            "Cooking Oil 1L".to_string(),
            BigDecimal::from(150),
            BigDecimal::from(120),
            0,
            5,
        )
        .await?;
    println!("  ✓ Customer {} and 2 products created\n", customer.name);

    // 2. Restock from a supplier
    println!("📦 Recording a purchase...");
    let purchase = core
        .record_purchase(PurchaseDraft {
            supplier_name: "Mega Wholesale".to_string(),
            bill_to: None,
            lines: vec![
                PurchaseItem::new(soap.id.clone(), 100, BigDecimal::from(25)),
                PurchaseItem::new(oil.id.clone(), 40, BigDecimal::from(120)),
            ],
        })
        .await?;
    println!(
        "  ✓ Purchase {} received, total {}\n",
        purchase.id, purchase.total
    );

    // 3. Two credit sales
    println!("🧾 Creating two orders on credit...");
    let first = core
        .create_order(
            OrderDraftBuilder::new(customer.id.clone())
                .line(soap.id.clone(), 5, BigDecimal::from(40))
                .build(),
        )
        .await?;
    let second = core
        .create_order(
            OrderDraftBuilder::new(customer.id.clone())
                .line(oil.id.clone(), 2, BigDecimal::from(150))
                .amount_paid(BigDecimal::from(100))
                .payment_mode("upi".to_string())
                .build(),
        )
        .await?;
    let balance = core.get_customer(&customer.id).await?.unwrap().balance;
    println!(
        "  ✓ Orders totalling {} and {}; customer balance now {}\n",
        first.total, second.total, balance
    );

    // 4. A lump payment settles the oldest order first
    println!("💰 Allocating a lump payment of 250...");
    core.allocate_payment(&customer.id, BigDecimal::from(250))
        .await?;
    for order in core.list_customer_orders(&customer.id).await? {
        println!(
            "  • order {}: paid {}/{} ({:?}, {:?})",
            order.id, order.amount_paid, order.total, order.payment_status, order.status
        );
    }
    let balance = core.get_customer(&customer.id).await?.unwrap().balance;
    println!("  ✓ Customer balance after allocation: {}\n", balance);

    // 5. Correct the second order's payment, then remove it entirely
    println!("✏️  Updating and deleting the second order...");
    core.update_order(&second.id, OrderPatch::amount_paid(BigDecimal::from(300)))
        .await?;
    core.delete_order(&second.id).await?;
    let balance = core.get_customer(&customer.id).await?.unwrap().balance;
    let stock = core.get_product(&oil.id).await?.unwrap().stock_level;
    println!(
        "  ✓ Deletion reversed its effects: balance {}, oil stock {}\n",
        balance, stock
    );

    println!("Done.");
    Ok(())
}
