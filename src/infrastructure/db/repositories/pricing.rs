use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use std::str::FromStr;

use crate::domain::error::{AppError, Result};
use crate::domain::pricing::{PricingRule, PricingRuleInput};

#[derive(Clone)]
pub struct PricingRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct PricingRuleEntity {
    id: i64,
    account_id: i64,
    property_id: i64,
    label: String,
    starts_on: NaiveDate,
    ends_on: NaiveDate,
    nightly_rate: String,
    commission_bps: i64,
    min_nights: i64,
    created_at: DateTime<Utc>,
}

impl PricingRuleEntity {
    fn into_domain(self) -> Result<PricingRule> {
        let nightly_rate = BigDecimal::from_str(&self.nightly_rate).map_err(|e| {
            AppError::DatabaseError(format!(
                "Invalid nightly_rate on pricing rule {}: {}",
                self.id, e
            ))
        })?;
        Ok(PricingRule {
            id: self.id,
            account_id: self.account_id,
            property_id: self.property_id,
            label: self.label,
            starts_on: self.starts_on,
            ends_on: self.ends_on,
            nightly_rate,
            commission_bps: self.commission_bps,
            min_nights: self.min_nights,
            created_at: self.created_at,
        })
    }
}

impl PricingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, account_id: i64, input: &PricingRuleInput) -> Result<PricingRule> {
        let entity = sqlx::query_as::<_, PricingRuleEntity>(
            "INSERT INTO pricing_rules
                (account_id, property_id, label, starts_on, ends_on,
                 nightly_rate, commission_bps, min_nights)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(account_id)
        .bind(input.property_id)
        .bind(&input.label)
        .bind(input.starts_on)
        .bind(input.ends_on)
        .bind(input.nightly_rate.to_string())
        .bind(input.commission_bps)
        .bind(input.min_nights)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create pricing rule: {}", e)))?;

        entity.into_domain()
    }

    pub async fn get(&self, account_id: i64, id: i64) -> Result<PricingRule> {
        let entity = sqlx::query_as::<_, PricingRuleEntity>(
            "SELECT * FROM pricing_rules WHERE account_id = ? AND id = ?",
        )
        .bind(account_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch pricing rule: {}", e)))?;

        match entity {
            Some(entity) => entity.into_domain(),
            None => Err(AppError::NotFound(format!("Pricing rule not found: {}", id))),
        }
    }

    pub async fn list_for_property(
        &self,
        account_id: i64,
        property_id: i64,
    ) -> Result<Vec<PricingRule>> {
        let entities = sqlx::query_as::<_, PricingRuleEntity>(
            "SELECT * FROM pricing_rules
             WHERE account_id = ? AND property_id = ?
             ORDER BY starts_on",
        )
        .bind(account_id)
        .bind(property_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list pricing rules: {}", e)))?;

        entities.into_iter().map(|e| e.into_domain()).collect()
    }

    /// Rules whose window fully covers the stay, narrowest first.
    pub async fn rules_covering(
        &self,
        account_id: i64,
        property_id: i64,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Vec<PricingRule>> {
        let entities = sqlx::query_as::<_, PricingRuleEntity>(
            "SELECT * FROM pricing_rules
             WHERE account_id = ? AND property_id = ?
               AND starts_on <= ? AND ends_on >= ?
             ORDER BY julianday(ends_on) - julianday(starts_on), starts_on",
        )
        .bind(account_id)
        .bind(property_id)
        .bind(check_in)
        .bind(check_out)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to match pricing rules: {}", e)))?;

        entities.into_iter().map(|e| e.into_domain()).collect()
    }

    pub async fn update(
        &self,
        account_id: i64,
        id: i64,
        input: &PricingRuleInput,
    ) -> Result<PricingRule> {
        let entity = sqlx::query_as::<_, PricingRuleEntity>(
            "UPDATE pricing_rules SET
                property_id = ?, label = ?, starts_on = ?, ends_on = ?,
                nightly_rate = ?, commission_bps = ?, min_nights = ?
             WHERE account_id = ? AND id = ? RETURNING *",
        )
        .bind(input.property_id)
        .bind(&input.label)
        .bind(input.starts_on)
        .bind(input.ends_on)
        .bind(input.nightly_rate.to_string())
        .bind(input.commission_bps)
        .bind(input.min_nights)
        .bind(account_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update pricing rule: {}", e)))?;

        match entity {
            Some(entity) => entity.into_domain(),
            None => Err(AppError::NotFound(format!("Pricing rule not found: {}", id))),
        }
    }

    pub async fn delete(&self, account_id: i64, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM pricing_rules WHERE account_id = ? AND id = ?")
            .bind(account_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete pricing rule: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Pricing rule not found: {}", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::connection::init_test_db;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn rule_input(property_id: i64, label: &str, from: NaiveDate, to: NaiveDate) -> PricingRuleInput {
        PricingRuleInput {
            property_id,
            label: label.to_string(),
            starts_on: from,
            ends_on: to,
            nightly_rate: BigDecimal::from_str("120.00").unwrap(),
            commission_bps: 1500,
            min_nights: 1,
        }
    }

    #[tokio::test]
    async fn test_rules_covering_orders_narrowest_first() {
        let pool = init_test_db().await.unwrap();
        let account_id = sqlx::query("INSERT INTO accounts (name) VALUES ('Acme')")
            .execute(&pool)
            .await
            .unwrap()
            .last_insert_rowid();
        let destination_id = sqlx::query(
            "INSERT INTO destinations (account_id, name, slug, country) VALUES (?, 'Algarve', 'algarve', 'PT')",
        )
        .bind(account_id)
        .execute(&pool)
        .await
        .unwrap()
        .last_insert_rowid();
        let property_id = sqlx::query(
            "INSERT INTO properties (account_id, destination_id, name, slug, address, city, capacity, bedrooms, bathrooms)
             VALUES (?, ?, 'Villa', 'villa', 'Rua 1', 'Lagos', 4, 2, 1)",
        )
        .bind(account_id)
        .bind(destination_id)
        .execute(&pool)
        .await
        .unwrap()
        .last_insert_rowid();

        let repo = PricingRepository::new(pool);
        repo.create(
            account_id,
            &rule_input(property_id, "Whole year", d(2026, 1, 1), d(2026, 12, 31)),
        )
        .await
        .unwrap();
        repo.create(
            account_id,
            &rule_input(property_id, "August peak", d(2026, 8, 1), d(2026, 8, 31)),
        )
        .await
        .unwrap();

        let covering = repo
            .rules_covering(account_id, property_id, d(2026, 8, 10), d(2026, 8, 17))
            .await
            .unwrap();
        assert_eq!(covering.len(), 2);
        assert_eq!(covering[0].label, "August peak");

        let covering = repo
            .rules_covering(account_id, property_id, d(2026, 3, 1), d(2026, 3, 8))
            .await
            .unwrap();
        assert_eq!(covering.len(), 1);
        assert_eq!(covering[0].label, "Whole year");
    }
}
