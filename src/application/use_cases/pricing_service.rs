//! Pricing rule management and stay quoting.

use chrono::NaiveDate;
use std::sync::Arc;
use validator::Validate;

use crate::domain::auth::AuthContext;
use crate::domain::error::{AppError, Result};
use crate::domain::pricing::{PricingRule, PricingRuleInput, Quote};
use crate::infrastructure::db::repositories::{PricingRepository, PropertyRepository};

use super::audit_service::AuditService;
use super::permissions::{self, ops};

pub struct PricingService {
    pricing: Arc<PricingRepository>,
    properties: Arc<PropertyRepository>,
    audit: Arc<AuditService>,
}

impl PricingService {
    pub fn new(
        pricing: Arc<PricingRepository>,
        properties: Arc<PropertyRepository>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self {
            pricing,
            properties,
            audit,
        }
    }

    pub async fn create(&self, ctx: &AuthContext, input: PricingRuleInput) -> Result<PricingRule> {
        permissions::require(ctx, ops::PRICING_MANAGE)?;
        validate_rule(&input)?;

        self.properties.get(ctx.account_id, input.property_id).await?;

        let rule = self.pricing.create(ctx.account_id, &input).await?;
        self.audit
            .record(
                ctx,
                "pricing_rule",
                rule.id,
                "create",
                Some(&serde_json::json!({
                    "label": rule.label,
                    "nightly_rate": rule.nightly_rate.to_string(),
                })),
            )
            .await;
        Ok(rule)
    }

    pub async fn get(&self, ctx: &AuthContext, id: i64) -> Result<PricingRule> {
        permissions::require(ctx, ops::PRICING_VIEW)?;
        self.pricing.get(ctx.account_id, id).await
    }

    pub async fn list_for_property(
        &self,
        ctx: &AuthContext,
        property_id: i64,
    ) -> Result<Vec<PricingRule>> {
        permissions::require(ctx, ops::PRICING_VIEW)?;
        self.pricing.list_for_property(ctx.account_id, property_id).await
    }

    pub async fn update(
        &self,
        ctx: &AuthContext,
        id: i64,
        input: PricingRuleInput,
    ) -> Result<PricingRule> {
        permissions::require(ctx, ops::PRICING_MANAGE)?;
        validate_rule(&input)?;

        self.properties.get(ctx.account_id, input.property_id).await?;

        let rule = self.pricing.update(ctx.account_id, id, &input).await?;
        self.audit.record(ctx, "pricing_rule", id, "update", None).await;
        Ok(rule)
    }

    pub async fn delete(&self, ctx: &AuthContext, id: i64) -> Result<()> {
        permissions::require(ctx, ops::PRICING_MANAGE)?;
        self.pricing.delete(ctx.account_id, id).await?;
        self.audit.record(ctx, "pricing_rule", id, "delete", None).await;
        Ok(())
    }

    /// Quote a stay using the narrowest rule that covers the whole
    /// window. No covering rule means the stay cannot be priced.
    pub async fn quote(
        &self,
        ctx: &AuthContext,
        property_id: i64,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Quote> {
        permissions::require(ctx, ops::PRICING_VIEW)?;
        if check_out <= check_in {
            return Err(AppError::ValidationError(
                "Check-out must be after check-in".to_string(),
            ));
        }

        self.properties.get(ctx.account_id, property_id).await?;

        let rules = self
            .pricing
            .rules_covering(ctx.account_id, property_id, check_in, check_out)
            .await?;
        let rule = rules.first().ok_or_else(|| {
            AppError::NotFound(format!(
                "No pricing rule covers {} to {}",
                check_in, check_out
            ))
        })?;

        Quote::compute(rule, check_in, check_out)
    }
}

fn validate_rule(input: &PricingRuleInput) -> Result<()> {
    input
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;
    if input.ends_on < input.starts_on {
        return Err(AppError::ValidationError(
            "Rule end date is before its start date".to_string(),
        ));
    }
    if input.nightly_rate <= bigdecimal::BigDecimal::from(0) {
        return Err(AppError::ValidationError(
            "Nightly rate must be positive".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::Role;
    use crate::domain::destination::DestinationInput;
    use crate::domain::property::PropertyInput;
    use crate::infrastructure::db::connection::init_test_db;
    use crate::infrastructure::db::repositories::{
        AuditLogRepository, DestinationRepository, UserRepository,
    };
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    async fn setup() -> (PricingService, AuthContext, i64) {
        let pool = init_test_db().await.unwrap();
        let users = UserRepository::new(pool.clone());
        let account_id = users.create_account("Acme Rentals").await.unwrap();
        let manager = users
            .create_user(account_id, "ana@acme.test", "Ana", Role::Manager)
            .await
            .unwrap();

        let destination = DestinationRepository::new(pool.clone())
            .create(
                account_id,
                &DestinationInput {
                    name: "Lagos".to_string(),
                    country: "Portugal".to_string(),
                    region: None,
                },
            )
            .await
            .unwrap();
        let properties = Arc::new(PropertyRepository::new(pool.clone()));
        let property = properties
            .create(
                account_id,
                &PropertyInput {
                    destination_id: destination.id,
                    name: "Villa Azul".to_string(),
                    address: "Rua do Mar 1".to_string(),
                    city: "Lagos".to_string(),
                    capacity: 6,
                    bedrooms: 3,
                    bathrooms: 2,
                    description: None,
                },
            )
            .await
            .unwrap();

        let audit = Arc::new(AuditService::new(Arc::new(AuditLogRepository::new(
            pool.clone(),
        ))));
        let service = PricingService::new(
            Arc::new(PricingRepository::new(pool)),
            properties,
            audit,
        );
        (service, AuthContext::for_user(&manager), property.id)
    }

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, day).unwrap()
    }

    fn rule(
        property_id: i64,
        label: &str,
        starts: NaiveDate,
        ends: NaiveDate,
        rate: &str,
    ) -> PricingRuleInput {
        PricingRuleInput {
            property_id,
            label: label.to_string(),
            starts_on: starts,
            ends_on: ends,
            nightly_rate: BigDecimal::from_str(rate).unwrap(),
            commission_bps: 1500,
            min_nights: 1,
        }
    }

    #[tokio::test]
    async fn test_quote_prefers_narrowest_rule() {
        let (service, ctx, property_id) = setup().await;
        service
            .create(&ctx, rule(property_id, "Base", d(1, 1), d(12, 31), "100.00"))
            .await
            .unwrap();
        service
            .create(&ctx, rule(property_id, "August peak", d(8, 1), d(8, 31), "180.00"))
            .await
            .unwrap();

        let quote = service
            .quote(&ctx, property_id, d(8, 10), d(8, 15))
            .await
            .unwrap();
        assert_eq!(quote.rule_label, "August peak");
        assert_eq!(quote.nights, 5);
        assert_eq!(quote.total, BigDecimal::from_str("900.00").unwrap());
        assert_eq!(&quote.commission + &quote.owner_payout, quote.total);
    }

    #[tokio::test]
    async fn test_uncovered_stay_has_no_quote() {
        let (service, ctx, property_id) = setup().await;
        service
            .create(&ctx, rule(property_id, "Summer", d(6, 1), d(9, 30), "120.00"))
            .await
            .unwrap();

        // Stay starts inside the window but ends outside it.
        let err = service
            .quote(&ctx, property_id, d(9, 25), d(10, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rule_cannot_move_to_foreign_property() {
        let pool = init_test_db().await.unwrap();
        let users = UserRepository::new(pool.clone());
        let acme = users.create_account("Acme Rentals").await.unwrap();
        let rival = users.create_account("Rival Stays").await.unwrap();
        let manager = users
            .create_user(acme, "ana@acme.test", "Ana", Role::Manager)
            .await
            .unwrap();
        let ctx = AuthContext::for_user(&manager);

        let destinations = DestinationRepository::new(pool.clone());
        let properties = Arc::new(PropertyRepository::new(pool.clone()));
        let mut ids = Vec::new();
        for (account_id, name) in [(acme, "Villa Azul"), (rival, "Casa Branca")] {
            let destination = destinations
                .create(
                    account_id,
                    &DestinationInput {
                        name: "Lagos".to_string(),
                        country: "Portugal".to_string(),
                        region: None,
                    },
                )
                .await
                .unwrap();
            let property = properties
                .create(
                    account_id,
                    &PropertyInput {
                        destination_id: destination.id,
                        name: name.to_string(),
                        address: "Rua do Mar 1".to_string(),
                        city: "Lagos".to_string(),
                        capacity: 6,
                        bedrooms: 3,
                        bathrooms: 2,
                        description: None,
                    },
                )
                .await
                .unwrap();
            ids.push(property.id);
        }
        let (own, foreign) = (ids[0], ids[1]);

        let audit = Arc::new(AuditService::new(Arc::new(AuditLogRepository::new(
            pool.clone(),
        ))));
        let service = PricingService::new(
            Arc::new(PricingRepository::new(pool)),
            properties,
            audit,
        );

        let created = service
            .create(&ctx, rule(own, "Base", d(1, 1), d(12, 31), "100.00"))
            .await
            .unwrap();

        let err = service
            .update(&ctx, created.id, rule(foreign, "Base", d(1, 1), d(12, 31), "100.00"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let unchanged = service.get(&ctx, created.id).await.unwrap();
        assert_eq!(unchanged.property_id, own);
    }

    #[tokio::test]
    async fn test_invalid_rule_rejected() {
        let (service, ctx, property_id) = setup().await;
        let err = service
            .create(&ctx, rule(property_id, "Backwards", d(8, 31), d(8, 1), "100.00"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let err = service
            .create(&ctx, rule(property_id, "Free", d(8, 1), d(8, 31), "0"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
