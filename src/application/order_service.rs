use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{CheckoutRequest, NewOrder, Order, OrderItem, OrderStatus};
use crate::domain::ports::{ListResult, OrderRepository, ProductRepository, VendorRepository};
use crate::domain::vendor::Vendor;

#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    products: Arc<dyn ProductRepository>,
    vendors: Arc<dyn VendorRepository>,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        products: Arc<dyn ProductRepository>,
        vendors: Arc<dyn VendorRepository>,
    ) -> Self {
        Self {
            orders,
            products,
            vendors,
        }
    }

    /// Price and place an order. Names and prices are read from the catalog,
    /// never from the request.
    pub fn checkout(&self, request: CheckoutRequest) -> Result<Order, DomainError> {
        if request.user_id.trim().is_empty() {
            return Err(DomainError::invalid("missing customer id"));
        }
        if request.lines.is_empty() {
            return Err(DomainError::invalid("cart is empty"));
        }
        let ids: Vec<Uuid> = request.lines.iter().map(|l| l.product_id).collect();
        let products: HashMap<Uuid, _> = self
            .products
            .find_many(&ids)?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        let mut vendors: HashMap<String, Option<Vendor>> = HashMap::new();
        let pincode = &request.address.pincode;

        let mut items = Vec::with_capacity(request.lines.len());
        for line in &request.lines {
            if line.quantity <= 0 {
                return Err(DomainError::invalid(format!(
                    "quantity for product {} must be positive",
                    line.product_id
                )));
            }
            let product = products
                .get(&line.product_id)
                .ok_or(DomainError::NotFound("Product"))?;
            if !product.is_visible_in(pincode) {
                return Err(DomainError::invalid(format!(
                    "{} is not available for delivery to {}",
                    product.name, pincode
                )));
            }
            if !vendors.contains_key(&product.vendor_id) {
                let vendor = self.vendors.find_by_id(&product.vendor_id)?;
                vendors.insert(product.vendor_id.clone(), vendor);
            }
            let open = vendors
                .get(&product.vendor_id)
                .and_then(|v| v.as_ref())
                .is_some_and(Vendor::accepts_orders);
            if !open {
                return Err(DomainError::invalid(format!(
                    "{} is not accepting orders right now",
                    product.name
                )));
            }
            items.push(OrderItem {
                product_id: product.id,
                vendor_id: product.vendor_id.clone(),
                name: product.name.clone(),
                price: product.price.clone(),
                quantity: line.quantity,
            });
        }

        let new_order = NewOrder::price(
            request.user_id,
            items,
            request.address,
            request.delivery_option,
            request.payment_method,
        )?;
        let order = self.orders.create(new_order)?;
        log::info!("order {} placed by {} total {}", order.id, order.user_id, order.total);
        Ok(order)
    }

    pub fn get(&self, id: Uuid) -> Result<Order, DomainError> {
        self.orders.find_by_id(id)?.ok_or(DomainError::NotFound("Order"))
    }

    pub fn list_for_user(&self, user_id: &str) -> Result<Vec<Order>, DomainError> {
        self.orders.list_by_user(user_id)
    }

    pub fn list_for_vendor(&self, vendor_id: &str) -> Result<Vec<Order>, DomainError> {
        self.orders.list_by_vendor(vendor_id)
    }

    pub fn list(&self, page: i64, limit: i64) -> Result<ListResult<Order>, DomainError> {
        self.orders.list(page, limit)
    }

    pub fn get_for_vendor(&self, vendor_id: &str, id: Uuid) -> Result<Order, DomainError> {
        let order = self.get(id)?;
        if order.involves_vendor(vendor_id) {
            Ok(order)
        } else {
            Err(DomainError::NotFound("Order"))
        }
    }

    /// One step forward along the fulfilment sequence.
    pub fn advance_for_vendor(&self, vendor_id: &str, id: Uuid) -> Result<Order, DomainError> {
        let order = self.get_for_vendor(vendor_id, id)?;
        let next = order.status.next().ok_or_else(|| {
            DomainError::Conflict(format!("order {} is already {}", order.id, order.status))
        })?;
        self.move_to(&order, next, None)
    }

    pub fn cancel_for_vendor(&self, vendor_id: &str, id: Uuid) -> Result<Order, DomainError> {
        let order = self.get_for_vendor(vendor_id, id)?;
        self.move_to(&order, OrderStatus::Cancelled, None)
    }

    /// Customers only ever see their own orders; anyone else's is not found.
    pub fn get_for_customer(&self, user_id: &str, id: Uuid) -> Result<Order, DomainError> {
        let order = self.get(id)?;
        if order.user_id != user_id {
            return Err(DomainError::NotFound("Order"));
        }
        Ok(order)
    }

    pub fn cancel_for_customer(&self, user_id: &str, id: Uuid) -> Result<Order, DomainError> {
        let order = self.get_for_customer(user_id, id)?;
        self.move_to(&order, OrderStatus::Cancelled, None)
    }

    /// Orders a delivery person can pick up or is carrying.
    pub fn delivery_queue(&self) -> Result<Vec<Order>, DomainError> {
        self.orders
            .list_by_status(&[OrderStatus::Ready, OrderStatus::OutForDelivery])
    }

    pub fn assign_delivery(&self, delivery_person_id: &str, id: Uuid) -> Result<Order, DomainError> {
        let order = self.get(id)?;
        self.move_to(&order, OrderStatus::OutForDelivery, Some(delivery_person_id))
    }

    pub fn mark_delivered(&self, delivery_person_id: &str, id: Uuid) -> Result<Order, DomainError> {
        let order = self.get(id)?;
        if order.delivery_person_id.as_deref() != Some(delivery_person_id) {
            return Err(DomainError::Conflict(format!(
                "order {} is not assigned to {}",
                order.id, delivery_person_id
            )));
        }
        self.move_to(&order, OrderStatus::Delivered, None)
    }

    fn move_to(
        &self,
        order: &Order,
        target: OrderStatus,
        delivery_person_id: Option<&str>,
    ) -> Result<Order, DomainError> {
        order.ensure_transition(target)?;
        let moved = self
            .orders
            .transition(order.id, order.status, target, delivery_person_id)?
            .ok_or_else(|| {
                DomainError::Conflict(format!("order {} was changed concurrently", order.id))
            })?;
        log::info!("order {} {} -> {}", order.id, order.status, target);
        Ok(moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{
        CheckoutLine, DeliveryAddress, DeliveryOption, PaymentMethod, PaymentStatus,
    };
    use crate::domain::product::fixtures::{pin, product};
    use crate::domain::product::{Product, ProductStatus};
    use crate::domain::vendor::fixtures::vendor;
    use crate::domain::vendor::VendorStatus;
    use crate::testing::{InMemoryOrders, InMemoryProducts, InMemoryVendors};
    use bigdecimal::BigDecimal;

    struct Fixture {
        svc: OrderService,
        milk: Product,
        bread: Product,
    }

    fn fixture(vendor_open: bool) -> Fixture {
        let milk = product("Milk", "dairy", &["110001"], ProductStatus::Active);
        let bread = product("Bread", "bakery", &["110002"], ProductStatus::Active);
        let mut v = vendor("vendor-1", VendorStatus::Active, &["110001", "110002"]);
        v.is_open = vendor_open;
        let svc = OrderService::new(
            Arc::new(InMemoryOrders::default()),
            Arc::new(InMemoryProducts::with(vec![milk.clone(), bread.clone()])),
            Arc::new(InMemoryVendors::with(vec![v])),
        );
        Fixture { svc, milk, bread }
    }

    fn request(lines: Vec<(Uuid, i32)>, pincode: &str) -> CheckoutRequest {
        CheckoutRequest {
            user_id: "customer-1".to_string(),
            lines: lines
                .into_iter()
                .map(|(product_id, quantity)| CheckoutLine {
                    product_id,
                    quantity,
                })
                .collect(),
            address: DeliveryAddress {
                name: "Asha".to_string(),
                phone: "9000000000".to_string(),
                address: "4 Lake View".to_string(),
                pincode: pin(pincode),
                city: "Delhi".to_string(),
            },
            delivery_option: DeliveryOption::Standard,
            payment_method: PaymentMethod::Cod,
        }
    }

    #[test]
    fn checkout_snapshots_catalog_prices() {
        let f = fixture(true);
        let order = f.svc.checkout(request(vec![(f.milk.id, 3)], "110001")).unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.items[0].name, "Milk");
        assert_eq!(order.subtotal, BigDecimal::from(135));
        assert_eq!(order.total, BigDecimal::from(175));
    }

    #[test]
    fn checkout_rejects_undeliverable_or_closed() {
        let f = fixture(true);
        assert!(matches!(
            f.svc.checkout(request(vec![(f.bread.id, 1)], "110001")),
            Err(DomainError::InvalidInput(_))
        ));
        assert!(matches!(
            f.svc.checkout(request(vec![(Uuid::new_v4(), 1)], "110001")),
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            f.svc.checkout(request(vec![(f.milk.id, 0)], "110001")),
            Err(DomainError::InvalidInput(_))
        ));

        let closed = fixture(false);
        assert!(matches!(
            closed.svc.checkout(request(vec![(closed.milk.id, 1)], "110001")),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn vendor_advances_one_step_at_a_time_until_delivered() {
        let f = fixture(true);
        let order = f.svc.checkout(request(vec![(f.milk.id, 1)], "110001")).unwrap();

        let mut seen = vec![];
        for _ in 0..5 {
            let o = f.svc.advance_for_vendor("vendor-1", order.id).unwrap();
            seen.push(o.status);
        }
        assert_eq!(
            seen,
            vec![
                OrderStatus::Confirmed,
                OrderStatus::Preparing,
                OrderStatus::Ready,
                OrderStatus::OutForDelivery,
                OrderStatus::Delivered
            ]
        );
        assert!(matches!(
            f.svc.advance_for_vendor("vendor-1", order.id),
            Err(DomainError::Conflict(_))
        ));
        assert!(matches!(
            f.svc.cancel_for_vendor("vendor-1", order.id),
            Err(DomainError::Conflict(_))
        ));
    }

    #[test]
    fn orders_are_scoped_to_their_vendor_and_customer() {
        let f = fixture(true);
        let order = f.svc.checkout(request(vec![(f.milk.id, 1)], "110001")).unwrap();

        assert!(matches!(
            f.svc.advance_for_vendor("vendor-2", order.id),
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            f.svc.cancel_for_customer("someone-else", order.id),
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            f.svc.get_for_customer("someone-else", order.id),
            Err(DomainError::NotFound(_))
        ));
        assert_eq!(f.svc.get_for_customer("customer-1", order.id).unwrap().id, order.id);
        let cancelled = f.svc.cancel_for_customer("customer-1", order.id).unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
    }

    #[test]
    fn delivery_flow_requires_ready_and_assignment() {
        let f = fixture(true);
        let order = f.svc.checkout(request(vec![(f.milk.id, 1)], "110001")).unwrap();

        assert!(f.svc.assign_delivery("rider-1", order.id).is_err());
        for _ in 0..3 {
            f.svc.advance_for_vendor("vendor-1", order.id).unwrap();
        }
        assert_eq!(f.svc.delivery_queue().unwrap().len(), 1);

        let out = f.svc.assign_delivery("rider-1", order.id).unwrap();
        assert_eq!(out.status, OrderStatus::OutForDelivery);
        assert_eq!(out.delivery_person_id.as_deref(), Some("rider-1"));

        assert!(f.svc.mark_delivered("rider-2", order.id).is_err());
        let done = f.svc.mark_delivered("rider-1", order.id).unwrap();
        assert_eq!(done.status, OrderStatus::Delivered);
        assert!(f.svc.delivery_queue().unwrap().is_empty());
    }
}
