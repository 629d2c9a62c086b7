use serde::{Deserialize, Serialize};

use crate::ports::cart_persistence::CartPersistence;

/// One `(product_id, size)` entry in the shopper's pre-purchase selection.
///
/// Color and quantity are mutable attributes, not identity: adding the same
/// product in the same size merges into the existing line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    /// Price snapshot taken at add-time, in the smallest currency unit.
    /// Never re-priced against the live catalog.
    pub unit_price: i64,
    pub image: String,
    pub size: String,
    pub color: String,
    pub quantity: u32,
    pub slug: String,
}

impl CartLine {
    fn same_key(&self, product_id: &str, size: &str) -> bool {
        self.product_id == product_id && self.size == size
    }
}

/// Session-local cart state. Mutations never fail; persistence is a
/// best-effort side effect and the in-memory lines stay authoritative
/// even when durability is lost.
pub struct CartStore {
    lines: Vec<CartLine>,
    persistence: Option<Box<dyn CartPersistence>>,
}

impl CartStore {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            persistence: None,
        }
    }

    /// Builds a store backed by a pluggable storage side effect. Previously
    /// saved lines are loaded up front; a load failure starts empty.
    pub fn with_persistence(persistence: Box<dyn CartPersistence>) -> Self {
        let lines = match persistence.load() {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!(error = %e, "cart load failed, starting empty");
                Vec::new()
            }
        };
        Self {
            lines,
            persistence: Some(persistence),
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Adds a line, merging with an existing `(product_id, size)` entry by
    /// summing quantities. Color on a merged line is updated in place.
    pub fn add_item(&mut self, line: CartLine) {
        match self
            .lines
            .iter_mut()
            .find(|l| l.same_key(&line.product_id, &line.size))
        {
            Some(existing) => {
                existing.quantity += line.quantity.max(1);
                existing.color = line.color;
            }
            None => {
                let mut line = line;
                line.quantity = line.quantity.max(1);
                self.lines.push(line);
            }
        }
        self.persist();
    }

    /// Sets the quantity of a line, clamped to a floor of 1. Decrementing
    /// past 1 never removes the line; removal is an explicit action.
    pub fn update_quantity(&mut self, product_id: &str, size: &str, quantity: i64) {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.same_key(product_id, size))
        {
            line.quantity = quantity.max(1) as u32;
            self.persist();
        }
    }

    /// Removes the matching line; no-op if absent.
    pub fn remove_item(&mut self, product_id: &str, size: &str) {
        let before = self.lines.len();
        self.lines.retain(|l| !l.same_key(product_id, size));
        if self.lines.len() != before {
            self.persist();
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.persist();
    }

    /// Sum of quantities, recomputed on every call.
    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of `unit_price * quantity`, recomputed on every call.
    pub fn total_price(&self) -> i64 {
        self.lines
            .iter()
            .map(|l| l.unit_price * i64::from(l.quantity))
            .sum()
    }

    fn persist(&self) {
        if let Some(p) = &self.persistence {
            if let Err(e) = p.save(&self.lines) {
                // In-memory state stays authoritative for the session.
                tracing::warn!(error = %e, "cart save failed");
            }
        }
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}
