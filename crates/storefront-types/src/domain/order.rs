use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::intent::{CustomerInfo, OrderIntent};

/// Fulfillment/payment status of a placed order.
///
/// The payment callback may only drive `Created -> Paid` (idempotently) or
/// `Created -> Failed`. Operator updates via [`OrderRecord::set_status`] are
/// deliberately unrestricted: returns, cancellations and support overrides
/// are routine and a rigid machine would force workarounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Paid,
    Failed,
    Shipped,
    Delivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(Self::Created),
            "paid" => Some(Self::Paid),
            "failed" => Some(Self::Failed),
            "shipped" => Some(Self::Shipped),
            "delivered" => Some(Self::Delivered),
            _ => None,
        }
    }
}

/// Per-item copy of name/price/quantity taken at order-creation time,
/// decoupled from later catalog edits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemSnapshot {
    pub name: String,
    pub unit_price: i64,
    pub qty: u32,
}

/// The durable record of a placed order; a projection of the payment
/// provider's truth, not the truth itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: Uuid,
    /// The payment provider's id for the pending charge. Immutable once
    /// assigned; correlates the success/failure callback with this record.
    pub provider_order_id: String,
    pub amount: i64,
    pub currency: String,
    pub status: OrderStatus,
    pub customer: CustomerInfo,
    pub items: Vec<ItemSnapshot>,
    pub provider_payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRecord {
    /// Created synchronously with the provider payment order, before payment
    /// completes, so abandoned and failed payments stay auditable.
    pub fn from_intent(intent: OrderIntent, provider_order_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            provider_order_id,
            amount: intent.amount,
            currency: intent.currency,
            status: OrderStatus::Created,
            customer: intent.customer,
            items: intent.items,
            provider_payment_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The strict payment-driven transition. Returns whether state changed:
    /// `Created` moves to `Paid` and records the payment id; a redelivered
    /// callback for an already-paid order is a no-op, not an error.
    pub fn apply_payment(&mut self, payment_id: &str) -> bool {
        match self.status {
            OrderStatus::Created => {
                self.status = OrderStatus::Paid;
                self.provider_payment_id = Some(payment_id.to_string());
                self.updated_at = Utc::now();
                true
            }
            _ => false,
        }
    }

    /// `Created -> Failed` on a failure/cancellation signal; any other
    /// state is left untouched.
    pub fn apply_failure(&mut self) -> bool {
        match self.status {
            OrderStatus::Created => {
                self.status = OrderStatus::Failed;
                self.updated_at = Utc::now();
                true
            }
            _ => false,
        }
    }

    /// Unrestricted operator transition, including backward moves.
    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::intent::CustomerInfo;

    fn sample_intent() -> OrderIntent {
        OrderIntent {
            amount: 2499,
            currency: "INR".into(),
            items: vec![ItemSnapshot {
                name: "Linen Shirt".into(),
                unit_price: 2499,
                qty: 1,
            }],
            customer: CustomerInfo::Partial {
                name: Some("Asha".into()),
                email: None,
                phone: None,
            },
        }
    }

    #[test]
    fn from_intent_starts_created_without_payment_id() {
        let record = OrderRecord::from_intent(sample_intent(), "order_x1".into());
        assert_eq!(record.status, OrderStatus::Created);
        assert_eq!(record.provider_order_id, "order_x1");
        assert!(record.provider_payment_id.is_none());
    }

    #[test]
    fn apply_payment_is_idempotent() {
        let mut record = OrderRecord::from_intent(sample_intent(), "order_x1".into());
        assert!(record.apply_payment("pay_1"));
        assert_eq!(record.status, OrderStatus::Paid);
        assert_eq!(record.provider_payment_id.as_deref(), Some("pay_1"));

        // Redelivered callback: no state change, payment id untouched.
        assert!(!record.apply_payment("pay_1"));
        assert_eq!(record.status, OrderStatus::Paid);
        assert_eq!(record.provider_payment_id.as_deref(), Some("pay_1"));
    }

    #[test]
    fn apply_failure_only_from_created() {
        let mut record = OrderRecord::from_intent(sample_intent(), "order_x1".into());
        assert!(record.apply_failure());
        assert_eq!(record.status, OrderStatus::Failed);

        let mut paid = OrderRecord::from_intent(sample_intent(), "order_x2".into());
        paid.apply_payment("pay_1");
        assert!(!paid.apply_failure());
        assert_eq!(paid.status, OrderStatus::Paid);
    }

    #[test]
    fn operator_set_status_is_unrestricted() {
        let mut record = OrderRecord::from_intent(sample_intent(), "order_x1".into());
        record.apply_payment("pay_1");
        record.set_status(OrderStatus::Shipped);
        assert_eq!(record.status, OrderStatus::Shipped);
        // Backward override is allowed on the operator path.
        record.set_status(OrderStatus::Created);
        assert_eq!(record.status, OrderStatus::Created);
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            OrderStatus::Created,
            OrderStatus::Paid,
            OrderStatus::Failed,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("refunded"), None);
    }
}
