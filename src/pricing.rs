use crate::model::{Category, OrderItem};
use std::collections::HashSet;

/// Discount applied when an order spans all three menu categories.
pub const COMBO_DISCOUNT_RATE: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pricing {
    pub subtotal: f64,
    pub discount: f64,
    pub total: f64,
}

/// Round to 2 decimal places, half up.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Combo eligibility: the distinct categories among the items must cover
/// BURGER, FRIES and DRINK. Quantities are irrelevant, only presence.
pub fn is_combo(items: &[OrderItem]) -> bool {
    let categories: HashSet<Category> = items.iter().map(|item| item.category).collect();
    categories.contains(&Category::Burger)
        && categories.contains(&Category::Fries)
        && categories.contains(&Category::Drink)
}

/// Price an order: subtotal over price x qty, then the combo discount if
/// eligible. Rounding is applied once to the discount and once to the
/// total, never to the subtotal.
pub fn price_order(items: &[OrderItem]) -> Pricing {
    let subtotal: f64 = items.iter().map(|item| item.price * item.qty as f64).sum();
    let discount = if is_combo(items) {
        round2(subtotal * COMBO_DISCOUNT_RATE)
    } else {
        0.0
    };
    let total = round2(subtotal - discount);
    Pricing {
        subtotal,
        discount,
        total,
    }
}
