use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderStatus};
use crate::domain::ports::{ListResult, OrderRepository};
use crate::schema::{order_items, orders};

use super::models::{NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow};

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Load the items for `rows` in one query and stitch them back on.
fn with_items(conn: &mut PgConnection, rows: Vec<OrderRow>) -> Result<Vec<Order>, DomainError> {
    let items = OrderItemRow::belonging_to(&rows)
        .select(OrderItemRow::as_select())
        .load(conn)?;
    items
        .grouped_by(&rows)
        .into_iter()
        .zip(rows)
        .map(|(items, order)| order.into_order(items))
        .collect()
}

fn load_one(conn: &mut PgConnection, id: Uuid) -> Result<Option<Order>, DomainError> {
    let row = orders::table
        .filter(orders::id.eq(id))
        .select(OrderRow::as_select())
        .first(conn)
        .optional()?;
    let Some(row) = row else {
        return Ok(None);
    };
    Ok(with_items(conn, vec![row])?.pop())
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let order_id = Uuid::new_v4();
            diesel::insert_into(orders::table)
                .values(&NewOrderRow::new(order_id, &order))
                .execute(conn)?;

            let items: Vec<NewOrderItemRow> = order
                .items
                .iter()
                .map(|i| NewOrderItemRow::new(order_id, i))
                .collect();
            diesel::insert_into(order_items::table)
                .values(&items)
                .execute(conn)?;

            load_one(conn, order_id)?
                .ok_or_else(|| DomainError::Internal(format!("order {order_id} vanished")))
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;
        load_one(&mut conn, id)
    }

    fn list_by_user(&self, user_id: &str) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = orders::table
            .filter(orders::user_id.eq(user_id))
            .order(orders::created_at.desc())
            .select(OrderRow::as_select())
            .load(&mut conn)?;
        with_items(&mut conn, rows)
    }

    fn list_by_vendor(&self, vendor_id: &str) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = orders::table
            .filter(
                orders::id.eq_any(
                    order_items::table
                        .filter(order_items::vendor_id.eq(vendor_id))
                        .select(order_items::order_id),
                ),
            )
            .order(orders::created_at.desc())
            .select(OrderRow::as_select())
            .load(&mut conn)?;
        with_items(&mut conn, rows)
    }

    fn list_by_status(&self, statuses: &[OrderStatus]) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;
        let wanted: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();
        let rows = orders::table
            .filter(orders::status.eq_any(wanted))
            .order(orders::created_at.asc())
            .select(OrderRow::as_select())
            .load(&mut conn)?;
        with_items(&mut conn, rows)
    }

    fn list(&self, page: i64, limit: i64) -> Result<ListResult<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let offset = (page - 1) * limit;
        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = orders::table.count().get_result(conn)?;

            let rows = orders::table
                .select(OrderRow::as_select())
                .order(orders::created_at.desc())
                .limit(limit)
                .offset(offset)
                .load(conn)?;

            Ok(ListResult {
                items: with_items(conn, rows)?,
                total,
            })
        })
    }

    fn transition(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
        delivery_person_id: Option<&str>,
    ) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let target = orders::table
                .filter(orders::id.eq(id))
                .filter(orders::status.eq(from.as_str()));
            let now = Utc::now();
            let changed = match delivery_person_id {
                Some(person) => diesel::update(target)
                    .set((
                        orders::status.eq(to.as_str()),
                        orders::delivery_person_id.eq(person),
                        orders::updated_at.eq(now),
                    ))
                    .execute(conn)?,
                None => diesel::update(target)
                    .set((orders::status.eq(to.as_str()), orders::updated_at.eq(now)))
                    .execute(conn)?,
            };
            if changed == 0 {
                return Ok(None);
            }
            load_one(conn, id)
        })
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;
    use uuid::Uuid;

    use super::DieselOrderRepository;
    use crate::domain::order::{
        DeliveryAddress, DeliveryOption, NewOrder, OrderItem, OrderStatus, PaymentMethod,
        PaymentStatus,
    };
    use crate::domain::ports::OrderRepository;
    use crate::domain::product::fixtures::pin;
    use crate::infrastructure::test_db::setup_db;

    fn make_order(user: &str, vendor: &str) -> NewOrder {
        NewOrder::price(
            user.to_string(),
            vec![OrderItem {
                product_id: Uuid::new_v4(),
                vendor_id: vendor.to_string(),
                name: "Milk".to_string(),
                price: BigDecimal::from(45),
                quantity: 2,
            }],
            DeliveryAddress {
                name: "Asha".to_string(),
                phone: "9000000000".to_string(),
                address: "4 Lake View".to_string(),
                pincode: pin("110001"),
                city: "Delhi".to_string(),
            },
            DeliveryOption::Express,
            PaymentMethod::Cod,
        )
        .expect("priced")
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn create_and_find_by_id_roundtrip() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool);

        let created = repo
            .create(make_order("customer-1", "vendor-1"))
            .expect("create failed");
        let order = repo
            .find_by_id(created.id)
            .expect("find failed")
            .expect("order should exist");

        assert_eq!(order.user_id, "customer-1");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.total, BigDecimal::from(150));
        assert_eq!(order.address.pincode, pin("110001"));
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn find_by_id_returns_none_for_unknown_id() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool);

        let result = repo
            .find_by_id(Uuid::new_v4())
            .expect("find should not error");

        assert!(result.is_none());
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn list_paginates_correctly() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool);

        for _ in 0..5 {
            repo.create(make_order("customer-1", "vendor-1"))
                .expect("create failed");
        }

        let page1 = repo.list(1, 3).expect("list page 1 failed");
        assert_eq!(page1.total, 5);
        assert_eq!(page1.items.len(), 3);

        let page2 = repo.list(2, 3).expect("list page 2 failed");
        assert_eq!(page2.total, 5);
        assert_eq!(page2.items.len(), 2);
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn vendor_listing_uses_item_ownership() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool);

        repo.create(make_order("customer-1", "vendor-1")).unwrap();
        repo.create(make_order("customer-2", "vendor-2")).unwrap();

        let mine = repo.list_by_vendor("vendor-1").unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].user_id, "customer-1");
        assert_eq!(repo.list_by_user("customer-2").unwrap().len(), 1);
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn transition_is_guarded_by_current_status() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool);
        let order = repo.create(make_order("customer-1", "vendor-1")).unwrap();

        let confirmed = repo
            .transition(order.id, OrderStatus::Pending, OrderStatus::Confirmed, None)
            .unwrap()
            .expect("moved");
        assert_eq!(confirmed.status, OrderStatus::Confirmed);

        let stale = repo
            .transition(order.id, OrderStatus::Pending, OrderStatus::Cancelled, None)
            .unwrap();
        assert!(stale.is_none());

        let queue = repo
            .list_by_status(&[OrderStatus::Confirmed])
            .unwrap();
        assert_eq!(queue.len(), 1);

        let assigned = repo
            .transition(
                order.id,
                OrderStatus::Confirmed,
                OrderStatus::Preparing,
                Some("rider-1"),
            )
            .unwrap()
            .expect("moved");
        assert_eq!(assigned.delivery_person_id.as_deref(), Some("rider-1"));
    }
}
