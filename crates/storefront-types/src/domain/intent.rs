use serde::{Deserialize, Serialize};

use super::cart::CartLine;
use super::order::ItemSnapshot;

/// Threshold shipping: free above `free_over`, flat `flat_fee` at or below.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShippingRule {
    pub free_over: i64,
    pub flat_fee: i64,
}

impl ShippingRule {
    pub fn fee(&self, subtotal: i64) -> i64 {
        if subtotal > self.free_over {
            0
        } else {
            self.flat_fee
        }
    }
}

/// Contact details captured at checkout. Guest checkouts are common, so
/// incompleteness is explicit rather than a flat record of optionals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CustomerInfo {
    Complete {
        name: String,
        email: String,
        phone: String,
    },
    Partial {
        name: Option<String>,
        email: Option<String>,
        phone: Option<String>,
    },
}

impl CustomerInfo {
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Complete { name, .. } => Some(name),
            Self::Partial { name, .. } => name.as_deref(),
        }
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Complete { email, .. } => Some(email),
            Self::Partial { email, .. } => email.as_deref(),
        }
    }

    pub fn phone(&self) -> Option<&str> {
        match self {
            Self::Complete { phone, .. } => Some(phone),
            Self::Partial { phone, .. } => phone.as_deref(),
        }
    }
}

/// A priced, validated order request: what the cart looked like at the
/// moment of "place order", plus who is paying.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderIntent {
    /// Subtotal plus shipping fee, smallest currency unit.
    pub amount: i64,
    pub currency: String,
    pub items: Vec<ItemSnapshot>,
    pub customer: CustomerInfo,
}

impl OrderIntent {
    pub fn build(
        lines: &[CartLine],
        rule: &ShippingRule,
        customer: CustomerInfo,
    ) -> anyhow::Result<Self> {
        if lines.is_empty() {
            anyhow::bail!("cart is empty");
        }
        for line in lines {
            if line.quantity == 0 {
                anyhow::bail!("line quantity must be > 0");
            }
            if line.unit_price < 0 {
                anyhow::bail!("line unit price must be >= 0");
            }
        }
        let subtotal: i64 = lines
            .iter()
            .map(|l| l.unit_price * i64::from(l.quantity))
            .sum();
        let items = lines
            .iter()
            .map(|l| ItemSnapshot {
                name: l.name.clone(),
                unit_price: l.unit_price,
                qty: l.quantity,
            })
            .collect();
        Ok(Self {
            amount: subtotal + rule.fee(subtotal),
            currency: "INR".into(),
            items,
            customer,
        })
    }
}
