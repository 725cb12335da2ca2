//! End-to-end flows through the real services against one database.
//!
//! Each test drives the same code paths the route handlers use: register,
//! browse, fill the cart, check out, and track the order.

mod common;

use rust_decimal::Decimal;

use pizzeria_storefront::db::ProductRepository;
use pizzeria_storefront::models::{Cart, NewProduct};
use pizzeria_storefront::services::{
    CartService, CheckoutService, OrderError, OrderService,
};

use common::{as_current, pool, register, register_admin};

fn price(s: &str) -> Decimal {
    s.parse().expect("valid decimal")
}

#[tokio::test]
async fn full_purchase_flow() {
    let pool = pool().await;
    let products = ProductRepository::new(&pool);

    // Admin stocks the catalog.
    let category = products
        .create_category("Pizzas", "pizzas")
        .await
        .expect("category");
    let margherita = products
        .create(&NewProduct {
            category_id: Some(category.id),
            name: "Margherita".to_owned(),
            description: "Tomato, mozzarella, basil".to_owned(),
            price: price("12.99"),
            image_url: None,
            is_available: true,
        })
        .await
        .expect("product");
    let quattro = products
        .create(&NewProduct {
            category_id: Some(category.id),
            name: "Quattro Formaggi".to_owned(),
            description: String::new(),
            price: price("15.50"),
            image_url: None,
            is_available: true,
        })
        .await
        .expect("product");

    // A customer signs up and browses.
    let customer = register(&pool, "mario@example.com", "super secret").await;
    let listing = products.list_available(Some("pizzas")).await.expect("listing");
    assert_eq!(listing.len(), 2);

    // Fill the cart: two margheritas, one quattro.
    let carts = CartService::new(&pool);
    let mut cart = Cart::new();
    carts.add(&mut cart, margherita.id, 2).await.expect("add");
    carts.add(&mut cart, quattro.id, 1).await.expect("add");

    let view = carts.view(&mut cart).await.expect("view");
    assert_eq!(view.items.len(), 2);
    assert_eq!(view.total, price("41.48"));

    // Check out.
    let receipt = CheckoutService::new(&pool)
        .checkout(&mut cart, customer.id)
        .await
        .expect("checkout");
    assert!(receipt.skipped.is_empty());
    assert_eq!(receipt.order.order.total_price, price("41.48"));
    assert!(cart.is_empty());

    // The order shows up in the customer's history.
    let orders = OrderService::new(&pool);
    let history = orders.list_for_customer(customer.id).await.expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].items.len(), 2);

    // An admin works the order through to delivery.
    let admin = register_admin(&pool, "chef@example.com", "super secret").await;
    let order_id = history[0].order.id;
    for status in ["paid", "delivered"] {
        let updated = orders
            .set_status(order_id, status, &as_current(&admin))
            .await
            .expect("status change");
        assert_eq!(updated.status.as_str(), status);
    }

    // The customer still sees the final state.
    let seen = orders
        .get(order_id, &as_current(&customer))
        .await
        .expect("detail");
    assert_eq!(seen.order.status.as_str(), "delivered");
}

#[tokio::test]
async fn checkout_skips_products_pulled_from_the_menu() {
    let pool = pool().await;
    let products = ProductRepository::new(&pool);

    let keep = products
        .create(&NewProduct {
            category_id: None,
            name: "Margherita".to_owned(),
            description: String::new(),
            price: price("12.99"),
            image_url: None,
            is_available: true,
        })
        .await
        .expect("product");
    let mut pulled_fields = NewProduct {
        category_id: None,
        name: "Calzone".to_owned(),
        description: String::new(),
        price: price("11.00"),
        image_url: None,
        is_available: true,
    };
    let pulled = products.create(&pulled_fields).await.expect("product");

    let customer = register(&pool, "mario@example.com", "super secret").await;

    let carts = CartService::new(&pool);
    let mut cart = Cart::new();
    carts.add(&mut cart, keep.id, 1).await.expect("add");
    carts.add(&mut cart, pulled.id, 1).await.expect("add");

    // The calzone goes off the menu between add and checkout.
    pulled_fields.is_available = false;
    products.update(pulled.id, &pulled_fields).await.expect("update");

    let receipt = CheckoutService::new(&pool)
        .checkout(&mut cart, customer.id)
        .await
        .expect("checkout");

    assert_eq!(receipt.skipped, vec![pulled.id]);
    assert_eq!(receipt.order.items.len(), 1);
    assert_eq!(receipt.order.order.total_price, price("12.99"));
    assert!(cart.is_empty());
}

#[tokio::test]
async fn customers_cannot_reach_each_others_orders() {
    let pool = pool().await;
    let products = ProductRepository::new(&pool);

    let pizza = products
        .create(&NewProduct {
            category_id: None,
            name: "Margherita".to_owned(),
            description: String::new(),
            price: price("12.99"),
            image_url: None,
            is_available: true,
        })
        .await
        .expect("product");

    let mario = register(&pool, "mario@example.com", "super secret").await;
    let luigi = register(&pool, "luigi@example.com", "super secret").await;

    let carts = CartService::new(&pool);
    let mut cart = Cart::new();
    carts.add(&mut cart, pizza.id, 1).await.expect("add");
    let receipt = CheckoutService::new(&pool)
        .checkout(&mut cart, mario.id)
        .await
        .expect("checkout");
    let order_id = receipt.order.order.id;

    let orders = OrderService::new(&pool);

    // Luigi sees nothing of Mario's order.
    assert!(orders.list_for_customer(luigi.id).await.expect("list").is_empty());
    let err = orders
        .get(order_id, &as_current(&luigi))
        .await
        .expect_err("should be denied");
    assert!(matches!(err, OrderError::PermissionDenied));

    // Nor can he touch its status.
    let err = orders
        .set_status(order_id, "cancelled", &as_current(&luigi))
        .await
        .expect_err("should be denied");
    assert!(matches!(err, OrderError::PermissionDenied));
}
