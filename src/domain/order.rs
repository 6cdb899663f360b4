use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;
use super::pincode::Pincode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    const SEQUENCE: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// The single forward step, if any.
    pub fn next(self) -> Option<OrderStatus> {
        let idx = Self::SEQUENCE.iter().position(|s| *s == self)?;
        Self::SEQUENCE.get(idx + 1).copied()
    }

    pub fn can_transition_to(self, target: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        target == OrderStatus::Cancelled || self.next() == Some(target)
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "preparing" => Ok(OrderStatus::Preparing),
            "ready" => Ok(OrderStatus::Ready),
            "out_for_delivery" => Ok(OrderStatus::OutForDelivery),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::invalid(format!("unknown order status '{other}'"))),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(DomainError::invalid(format!(
                        concat!("unknown ", stringify!($name), " '{}'"),
                        other
                    ))),
                }
            }
        }
    };
}

string_enum!(PaymentMethod { Cod => "cod", Online => "online" });
string_enum!(PaymentStatus { Pending => "pending", Paid => "paid", Failed => "failed" });
string_enum!(DeliveryOption { Standard => "standard", Express => "express" });

impl DeliveryOption {
    pub fn fee(self) -> BigDecimal {
        match self {
            DeliveryOption::Standard => BigDecimal::from(40),
            DeliveryOption::Express => BigDecimal::from(60),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryAddress {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub pincode: Pincode,
    pub city: String,
}

/// Requested line: what the customer asked for, before server-side pricing.
#[derive(Debug, Clone)]
pub struct CheckoutLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub user_id: String,
    pub lines: Vec<CheckoutLine>,
    pub address: DeliveryAddress,
    pub delivery_option: DeliveryOption,
    pub payment_method: PaymentMethod,
}

/// Snapshot of a product at order time.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub vendor_id: String,
    pub name: String,
    pub price: BigDecimal,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub subtotal: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub total: BigDecimal,
    pub address: DeliveryAddress,
    pub payment_method: PaymentMethod,
}

impl NewOrder {
    pub fn price(
        user_id: String,
        items: Vec<OrderItem>,
        address: DeliveryAddress,
        option: DeliveryOption,
        payment_method: PaymentMethod,
    ) -> Result<Self, DomainError> {
        if items.is_empty() {
            return Err(DomainError::invalid("order must contain at least one item"));
        }
        let subtotal = items
            .iter()
            .map(|i| i.price.clone() * BigDecimal::from(i.quantity))
            .fold(BigDecimal::from(0), |acc, x| acc + x);
        let delivery_fee = option.fee();
        let total = subtotal.clone() + delivery_fee.clone();
        Ok(NewOrder {
            user_id,
            items,
            subtotal,
            delivery_fee,
            total,
            address,
            payment_method,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: Uuid,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub subtotal: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub total: BigDecimal,
    pub address: DeliveryAddress,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub delivery_person_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn involves_vendor(&self, vendor_id: &str) -> bool {
        self.items.iter().any(|i| i.vendor_id == vendor_id)
    }

    pub fn ensure_transition(&self, target: OrderStatus) -> Result<(), DomainError> {
        if self.status.can_transition_to(target) {
            Ok(())
        } else {
            Err(DomainError::Conflict(format!(
                "order {} cannot move from {} to {}",
                self.id, self.status, target
            )))
        }
    }
}
