use crate::error::IntakeError;
use crate::model::{ModelId, OrderItem};
use crate::pricing::price_order;
use crate::scheduler::FulfillmentTimers;
use crate::storage::KioskStorage;
use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;

/// What the customer picked: selected menu ids plus the raw per-item
/// quantity fields. Quantities stay raw strings here; parsing (and the
/// coercion of malformed values) happens at order time.
#[derive(Debug, Clone, Default)]
pub struct OrderSelection {
    pub item_ids: Vec<ModelId>,
    pub quantities: HashMap<ModelId, String>,
}

impl OrderSelection {
    /// Build a selection from urlencoded form pairs: `menu` checkboxes
    /// carry selected ids, `qty_<id>` fields carry quantities. Keys that
    /// do not parse as ids are dropped.
    pub fn from_form(pairs: &[(String, String)]) -> Self {
        let mut selection = OrderSelection::default();
        for (key, value) in pairs {
            if key == "menu" {
                if let Ok(id) = value.trim().parse::<ModelId>() {
                    selection.item_ids.push(id);
                }
            } else if let Some(id) = key.strip_prefix("qty_") {
                if let Ok(id) = id.parse::<ModelId>() {
                    selection.quantities.insert(id, value.clone());
                }
            }
        }
        selection
    }

    /// Quantity for an item: absent, non-numeric or non-positive input all
    /// coerce to 1, never to an error.
    fn quantity_for(&self, id: ModelId) -> i64 {
        self.quantities
            .get(&id)
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|qty| *qty > 0)
            .unwrap_or(1)
    }
}

/// Outcome of `place_order`. An empty or fully unresolvable selection is a
/// benign no-op, not an error; callers redirect back to the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Placed(ModelId),
    NoSelection,
}

pub struct OrderIntake<S: KioskStorage> {
    storage: Arc<S>,
    timers: FulfillmentTimers<S>,
}

impl<S: KioskStorage> OrderIntake<S> {
    pub fn new(storage: Arc<S>, timers: FulfillmentTimers<S>) -> Self {
        info!("Initializing order intake");
        Self { storage, timers }
    }

    /// Validate a selection against the menu, price it, durably record a
    /// PENDING order and arm its fulfillment timer.
    pub async fn place_order(&self, selection: OrderSelection) -> Result<Placement, IntakeError> {
        if selection.item_ids.is_empty() {
            debug!("Order submitted with no items selected");
            return Ok(Placement::NoSelection);
        }

        // Unknown ids silently drop out of the resolved set.
        let menu_items = self
            .storage
            .menu_items_by_ids(&selection.item_ids)
            .await
            .map_err(IntakeError::Persistence)?;
        if menu_items.is_empty() {
            debug!("None of the selected ids resolved against the menu");
            return Ok(Placement::NoSelection);
        }

        // Snapshot of the menu rows as resolved right now; later menu
        // edits never touch this order.
        let items: Vec<OrderItem> = menu_items
            .into_iter()
            .map(|item| OrderItem {
                qty: selection.quantity_for(item.id),
                id: item.id,
                name: item.name,
                category: item.category,
                price: item.price,
            })
            .collect();

        let pricing = price_order(&items);
        let order_id = self
            .storage
            .create_order(&items, pricing.total, pricing.discount)
            .await
            .map_err(IntakeError::Persistence)?;

        // The timer is armed before the caller sees the id. If this
        // process dies before it fires, the sweep converges the order.
        self.timers.arm(order_id);

        info!(
            "Placed order {}: {} items, subtotal {:.2}, discount {:.2}, total {:.2}",
            order_id,
            items.len(),
            pricing.subtotal,
            pricing.discount,
            pricing.total
        );
        Ok(Placement::Placed(order_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn form_parsing_collects_ids_and_quantities() {
        let selection = OrderSelection::from_form(&pairs(&[
            ("customer", "Table 4"),
            ("menu", "1"),
            ("menu", "3"),
            ("qty_1", "2"),
            ("qty_3", "1"),
        ]));
        assert_eq!(selection.item_ids, vec![1, 3]);
        assert_eq!(selection.quantity_for(1), 2);
        assert_eq!(selection.quantity_for(3), 1);
    }

    #[test]
    fn form_parsing_drops_garbage_ids() {
        let selection = OrderSelection::from_form(&pairs(&[
            ("menu", "abc"),
            ("menu", "7"),
            ("qty_xyz", "2"),
        ]));
        assert_eq!(selection.item_ids, vec![7]);
        assert!(selection.quantities.is_empty());
    }

    #[test]
    fn malformed_quantities_coerce_to_one() {
        let selection = OrderSelection::from_form(&pairs(&[
            ("menu", "1"),
            ("menu", "2"),
            ("menu", "3"),
            ("qty_1", "abc"),
            ("qty_2", "0"),
            ("qty_3", "-4"),
        ]));
        assert_eq!(selection.quantity_for(1), 1);
        assert_eq!(selection.quantity_for(2), 1);
        assert_eq!(selection.quantity_for(3), 1);
        // Absent quantity field defaults too.
        assert_eq!(selection.quantity_for(4), 1);
    }
}
