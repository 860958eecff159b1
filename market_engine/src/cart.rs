//! The buyer's shopping cart.
//!
//! The cart is buyer-local and fully synchronous. It holds a mapping from product (keyed by product id) to a
//! quantity of at least 1, together with a running total that is adjusted inline by every mutation. The total is
//! never recomputed lazily; after any operation it equals Σ(price × quantity) over the mapping.

use std::collections::HashMap;

use thiserror::Error;

use crate::db_types::{Money, NewOrder, OrderItem, Product};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("Quantity must be at least 1")]
    ZeroQuantity,
    #[error("Product {0} is not in the cart")]
    NotInCart(String),
}

#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: HashMap<Product, i64>,
    total: Money,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `qty` units of `product`, creating the entry or topping up an existing one.
    pub fn add(&mut self, product: Product, qty: i64) -> Result<(), CartError> {
        if qty < 1 {
            return Err(CartError::ZeroQuantity);
        }
        let price = product.price;
        *self.items.entry(product).or_insert(0) += qty;
        self.total = self.total + price * qty;
        Ok(())
    }

    /// Remove the product entirely. Removing an absent product is a no-op.
    pub fn remove(&mut self, product: &Product) {
        if let Some(qty) = self.items.remove(product) {
            self.total -= product.price * qty;
        }
    }

    /// Set the quantity of a product that is already in the cart. Setting 0 removes the entry; the cart never
    /// stores a zero-quantity line.
    pub fn set_quantity(&mut self, product: &Product, qty: i64) -> Result<(), CartError> {
        let current = match self.items.get(product) {
            Some(q) => *q,
            None => return Err(CartError::NotInCart(product.id.clone())),
        };
        if qty < 0 {
            return Err(CartError::ZeroQuantity);
        }
        if qty == 0 {
            self.remove(product);
            return Ok(());
        }
        self.items.insert(product.clone(), qty);
        self.total = self.total + product.price * (qty - current);
        Ok(())
    }

    /// Convenience +1. Inserts the product if it is not in the cart yet.
    pub fn increase(&mut self, product: Product) {
        // qty of 1 can never fail validation
        let _ = self.add(product, 1);
    }

    /// Convenience -1. At quantity 1 the entry is removed entirely rather than left at 0.
    pub fn decrease(&mut self, product: &Product) {
        match self.items.get(product).copied() {
            Some(qty) if qty > 1 => {
                self.items.insert(product.clone(), qty - 1);
                self.total -= product.price;
            },
            Some(_) => self.remove(product),
            None => {},
        }
    }

    /// The quantity of the given product, or 0 if it is not in the cart.
    pub fn quantity_of(&self, product: &Product) -> i64 {
        self.items.get(product).copied().unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.total = Money::default();
    }

    pub fn total_price(&self) -> Money {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> impl Iterator<Item = (&Product, i64)> {
        self.items.iter().map(|(p, q)| (p, *q))
    }

    /// Snapshot the cart as order line items, sorted by product id for a stable order.
    pub fn to_order_items(&self) -> Vec<OrderItem> {
        let mut items = self
            .items
            .iter()
            .map(|(p, qty)| OrderItem {
                product_id: p.id.clone(),
                name: p.name.clone(),
                price: p.price,
                quantity: *qty,
                image_url: p.image_url.clone(),
            })
            .collect::<Vec<OrderItem>>();
        items.sort_by(|a, b| a.product_id.cmp(&b.product_id));
        items
    }
}

impl NewOrder {
    /// Build an order submission from the cart contents. The total is taken over the snapshot line items, so it
    /// matches the cart's running total exactly.
    pub fn from_cart<S: Into<String>>(buyer_id: S, seller_id: S, seller_name: S, cart: &Cart, shipping_address: S) -> Self {
        NewOrder::new(buyer_id.into(), seller_id.into(), seller_name.into(), cart.to_order_items(), shipping_address.into())
    }
}

#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    fn carrots() -> Product {
        Product::new("p1", "Organic Carrots", Money::from_cents(299))
    }

    fn honey() -> Product {
        Product::new("p2", "Wildflower Honey", Money::from_cents(500))
    }

    fn recomputed_total(cart: &Cart) -> Money {
        cart.items().map(|(p, q)| p.price * q).sum()
    }

    #[test]
    fn add_and_total() {
        let mut cart = Cart::new();
        cart.add(carrots(), 2).unwrap();
        cart.add(honey(), 1).unwrap();
        assert_eq!(cart.total_price(), Money::from_cents(1098));
        assert_eq!(cart.quantity_of(&carrots()), 2);
        // adding the same product id again tops up the entry
        cart.add(carrots(), 1).unwrap();
        assert_eq!(cart.quantity_of(&carrots()), 3);
        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn add_rejects_non_positive_quantity() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(carrots(), 0), Err(CartError::ZeroQuantity));
        assert_eq!(cart.add(carrots(), -2), Err(CartError::ZeroQuantity));
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Money::default());
    }

    #[test]
    fn remove_absent_product_is_a_noop() {
        let mut cart = Cart::new();
        cart.add(carrots(), 1).unwrap();
        cart.remove(&honey());
        assert_eq!(cart.total_price(), Money::from_cents(299));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn set_quantity_adjusts_total() {
        let mut cart = Cart::new();
        cart.add(carrots(), 2).unwrap();
        cart.set_quantity(&carrots(), 5).unwrap();
        assert_eq!(cart.quantity_of(&carrots()), 5);
        assert_eq!(cart.total_price(), Money::from_cents(299 * 5));
        cart.set_quantity(&carrots(), 1).unwrap();
        assert_eq!(cart.total_price(), Money::from_cents(299));
    }

    #[test]
    fn set_quantity_on_absent_product_is_an_error() {
        let mut cart = Cart::new();
        cart.add(carrots(), 1).unwrap();
        assert_eq!(cart.set_quantity(&honey(), 3), Err(CartError::NotInCart("p2".to_string())));
        assert_eq!(cart.quantity_of(&honey()), 0);
        assert_eq!(cart.total_price(), Money::from_cents(299));
    }

    #[test]
    fn set_quantity_zero_removes_the_entry() {
        let mut cart = Cart::new();
        cart.add(carrots(), 3).unwrap();
        cart.set_quantity(&carrots(), 0).unwrap();
        assert_eq!(cart.quantity_of(&carrots()), 0);
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Money::default());
    }

    #[test]
    fn decrease_at_one_removes_the_entry() {
        let mut cart = Cart::new();
        cart.add(carrots(), 2).unwrap();
        cart.decrease(&carrots());
        assert_eq!(cart.quantity_of(&carrots()), 1);
        cart.decrease(&carrots());
        assert_eq!(cart.quantity_of(&carrots()), 0);
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Money::default());
        // decreasing an absent product does nothing
        cart.decrease(&carrots());
        assert!(cart.is_empty());
    }

    #[test]
    fn clear_empties_the_cart() {
        let mut cart = Cart::new();
        cart.add(carrots(), 4).unwrap();
        cart.add(honey(), 2).unwrap();
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Money::default());
    }

    #[test]
    fn running_total_matches_recomputation_over_random_mutations() {
        let products =
            ["p1", "p2", "p3", "p4"].map(|id| Product::new(id.to_string(), format!("product {id}"), Money::from_cents(199)));
        let mut rng = StdRng::seed_from_u64(42);
        let mut cart = Cart::new();
        for _ in 0..2_000 {
            let product = products[rng.gen_range(0..products.len())].clone();
            match rng.gen_range(0..6) {
                0 => {
                    let _ = cart.add(product, rng.gen_range(1..5));
                },
                1 => cart.remove(&product),
                2 => {
                    let _ = cart.set_quantity(&product, rng.gen_range(0..8));
                },
                3 => cart.increase(product),
                4 => cart.decrease(&product),
                _ => {
                    if rng.gen_range(0..20) == 0 {
                        cart.clear();
                    }
                },
            }
            assert_eq!(cart.total_price(), recomputed_total(&cart));
            assert!(cart.items().all(|(_, q)| q >= 1));
        }
    }

    #[test]
    fn order_snapshot_preserves_totals() {
        let mut cart = Cart::new();
        cart.add(carrots(), 2).unwrap();
        cart.add(honey(), 1).unwrap();
        let order = NewOrder::from_cart("buyer-1", "s1", "Green Valley Farm", &cart, "1 Farm Lane");
        assert_eq!(order.total_amount, cart.total_price());
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].product_id, "p1");
        assert_eq!(order.items[0].quantity, 2);
    }
}
