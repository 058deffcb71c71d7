use super::helpers::{ensure_reference, fetch_page};
use crate::db::Database;
use crate::models::{NewOrder, Order, OrderStatus, OrderUpdate};
use crate::pagination::{Page, PageRequest};
use crate::{MedicardError, MedicardResult};
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite};

#[derive(Clone, Debug)]
pub struct OrderService {
    db: Database,
}

impl OrderService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, new: NewOrder, now: DateTime<Utc>) -> MedicardResult<Order> {
        let new = new.normalised();
        ensure_reference(self.db.pool(), "admissions", "admission_id", Some(new.admission_id)).await?;
        ensure_reference(
            self.db.pool(),
            "users",
            "responsible_attending_id",
            new.responsible_attending_id,
        )
        .await?;

        let order = sqlx::query_as::<_, Order>(
            "INSERT INTO orders (admission_id, order_type, order_name, details, status, \
             responsible_attending_id, ordered_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(new.admission_id)
        .bind(new.order_type.as_str())
        .bind(new.order_name.as_str())
        .bind(&new.details)
        .bind(new.status.unwrap_or_default())
        .bind(new.responsible_attending_id)
        .bind(now)
        .fetch_one(self.db.pool())
        .await?;

        tracing::info!(
            "order {} ({}) placed for admission {}",
            order.id,
            order.status.as_str(),
            order.admission_id
        );
        Ok(order)
    }

    pub async fn get(&self, id: i64) -> MedicardResult<Order> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| MedicardError::not_found("order", id))
    }

    pub async fn list(
        &self,
        patient_id: Option<i64>,
        status: Option<OrderStatus>,
        request: PageRequest,
    ) -> MedicardResult<Page<Order>> {
        fetch_page(
            self.db.pool(),
            "o.*",
            "FROM orders o JOIN admissions a ON a.id = o.admission_id",
            "o.ordered_at DESC, o.id DESC",
            request,
            |qb: &mut QueryBuilder<'_, Sqlite>| {
                if let Some(patient_id) = patient_id {
                    qb.push(" AND a.patient_id = ").push_bind(patient_id);
                }
                if let Some(status) = status {
                    qb.push(" AND o.status = ").push_bind(status);
                }
            },
        )
        .await
    }

    pub async fn update(&self, id: i64, update: OrderUpdate) -> MedicardResult<Order> {
        let mut order = self.get(id).await?;
        if let Some(attending) = update.responsible_attending_id {
            ensure_reference(self.db.pool(), "users", "responsible_attending_id", attending).await?;
        }
        update.apply(&mut order);

        let order = sqlx::query_as::<_, Order>(
            "UPDATE orders SET status = ?, details = ?, responsible_attending_id = ? \
             WHERE id = ? RETURNING *",
        )
        .bind(order.status)
        .bind(&order.details)
        .bind(order.responsible_attending_id)
        .bind(order.id)
        .fetch_one(self.db.pool())
        .await?;
        Ok(order)
    }

    pub async fn delete(&self, id: i64) -> MedicardResult<()> {
        let done = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        if done.rows_affected() == 0 {
            return Err(MedicardError::not_found("order", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::Role;
    use crate::test_support::{memory_db, Seed};

    #[tokio::test]
    async fn create_defaults_to_pending_and_update_signs() {
        let db = memory_db().await;
        let seed = Seed::new(db.clone());
        let attending = seed.user("att", Role::Doctor).await;
        let patient = seed.patient("MRN-1", "A", "B", None).await;
        let admission = seed.admission(patient.id, Utc::now()).await;

        let svc = OrderService::new(db);
        let body: NewOrder = serde_json::from_value(serde_json::json!({
            "admission_id": admission.id,
            "order_type": "Medication",
            "order_name": "Heparin 5000u",
            "responsible_attending_id": attending.id
        }))
        .unwrap();
        let order = svc.create(body, Utc::now()).await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);

        let signed = svc
            .update(
                order.id,
                OrderUpdate {
                    status: Some(OrderStatus::Completed),
                    details: Some(Some("given".into())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(signed.status, OrderStatus::Completed);
        assert_eq!(signed.details.as_deref(), Some("given"));
        assert_eq!(signed.responsible_attending_id, Some(attending.id));
    }

    #[tokio::test]
    async fn list_by_status() {
        let db = memory_db().await;
        let seed = Seed::new(db.clone());
        let patient = seed.patient("MRN-1", "A", "B", None).await;
        let admission = seed.admission(patient.id, Utc::now()).await;
        seed.order(admission.id, OrderStatus::PendingSignature, None).await;
        seed.order(admission.id, OrderStatus::Completed, None).await;

        let page = OrderService::new(db)
            .list(None, Some(OrderStatus::PendingSignature), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total_items, 1);
        assert_eq!(page.items[0].status, OrderStatus::PendingSignature);
    }
}
