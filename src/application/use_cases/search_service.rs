//! Fuzzy name search over properties and contacts.
//!
//! Names are ranked by trigram similarity (Jaccard over padded
//! 3-grams), so typos and partial words still find their target.

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::auth::AuthContext;
use crate::domain::error::Result;
use crate::infrastructure::db::repositories::{ContactRepository, PropertyRepository};

use super::permissions::{self, ops};

/// Matches below this similarity are dropped.
const SIMILARITY_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchEntity {
    Property,
    Contact,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub entity: SearchEntity,
    pub id: i64,
    pub name: String,
    pub similarity: f64,
}

pub struct SearchService {
    properties: Arc<PropertyRepository>,
    contacts: Arc<ContactRepository>,
}

impl SearchService {
    pub fn new(properties: Arc<PropertyRepository>, contacts: Arc<ContactRepository>) -> Self {
        Self {
            properties,
            contacts,
        }
    }

    /// Rank tenant-scoped property and contact names against the
    /// query. Results come back best first; equal scores order by
    /// name for stable output.
    pub async fn search(
        &self,
        ctx: &AuthContext,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        permissions::require(ctx, ops::PROPERTIES_VIEW)?;
        permissions::require(ctx, ops::CONTACTS_VIEW)?;

        let query_grams = trigrams(query);
        if query_grams.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits = Vec::new();
        for (id, name) in self.properties.list_names(ctx.account_id).await? {
            let similarity = jaccard(&query_grams, &trigrams(&name));
            if similarity >= SIMILARITY_THRESHOLD {
                hits.push(SearchHit {
                    entity: SearchEntity::Property,
                    id,
                    name,
                    similarity,
                });
            }
        }
        for (id, name) in self.contacts.list_names(ctx.account_id).await? {
            let similarity = jaccard(&query_grams, &trigrams(&name));
            if similarity >= SIMILARITY_THRESHOLD {
                hits.push(SearchHit {
                    entity: SearchEntity::Contact,
                    id,
                    name,
                    similarity,
                });
            }
        }

        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });
        hits.truncate(limit);
        Ok(hits)
    }
}

/// Padded trigram set of a string: lowercase, non-alphanumeric runs
/// collapse to a single space, each word padded with two leading and
/// one trailing space.
fn trigrams(text: &str) -> HashSet<[char; 3]> {
    let mut grams = HashSet::new();
    let normalized: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    for word in normalized.split_whitespace() {
        let padded: Vec<char> = "  "
            .chars()
            .chain(word.chars())
            .chain(" ".chars())
            .collect();
        for window in padded.windows(3) {
            grams.insert([window[0], window[1], window[2]]);
        }
    }
    grams
}

fn jaccard(a: &HashSet<[char; 3]>, b: &HashSet<[char; 3]>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::Role;
    use crate::domain::contact::{ContactInput, ContactKind};
    use crate::domain::destination::DestinationInput;
    use crate::domain::property::PropertyInput;
    use crate::infrastructure::db::connection::init_test_db;
    use crate::infrastructure::db::repositories::{DestinationRepository, UserRepository};

    #[test]
    fn test_identical_strings_score_one() {
        let a = trigrams("Villa Azul");
        assert!((jaccard(&a, &trigrams("villa azul")) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unrelated_strings_score_low() {
        let score = jaccard(&trigrams("Villa Azul"), &trigrams("Warehouse"));
        assert!(score < SIMILARITY_THRESHOLD);
    }

    #[test]
    fn test_typo_still_matches() {
        let score = jaccard(&trigrams("vila azul"), &trigrams("Villa Azul"));
        assert!(score >= SIMILARITY_THRESHOLD);
    }

    #[tokio::test]
    async fn test_search_ranks_best_first() {
        let pool = init_test_db().await.unwrap();
        let users = UserRepository::new(pool.clone());
        let account_id = users.create_account("Acme Rentals").await.unwrap();
        let viewer = users
            .create_user(account_id, "eva@acme.test", "Eva", Role::Viewer)
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
        for name in ["Villa Azul", "Villa Verde", "Quinta do Sol"] {
            properties
                .create(
                    account_id,
                    &PropertyInput {
                        destination_id: destination.id,
                        name: name.to_string(),
                        address: "Rua do Mar 1".to_string(),
                        city: "Lagos".to_string(),
                        capacity: 4,
                        bedrooms: 2,
                        bathrooms: 1,
                        description: None,
                    },
                )
                .await
                .unwrap();
        }
        let contacts = Arc::new(ContactRepository::new(pool));
        contacts
            .create(
                account_id,
                &ContactInput {
                    name: "Azul Cleaning".to_string(),
                    email: None,
                    phone: None,
                    kind: ContactKind::Cleaner,
                    notes: None,
                },
            )
            .await
            .unwrap();

        let service = SearchService::new(properties, contacts);
        let hits = service
            .search(&AuthContext::for_user(&viewer), "villa azul", 10)
            .await
            .unwrap();

        assert!(!hits.is_empty());
        assert_eq!(hits[0].name, "Villa Azul");
        assert_eq!(hits[0].entity, SearchEntity::Property);
        // The contact sharing a word still surfaces, below the exact hit.
        assert!(hits.iter().any(|h| h.entity == SearchEntity::Contact));
        assert!(!hits.iter().any(|h| h.name == "Quinta do Sol"));
    }

    #[tokio::test]
    async fn test_empty_query_returns_nothing() {
        let pool = init_test_db().await.unwrap();
        let users = UserRepository::new(pool.clone());
        let account_id = users.create_account("Acme Rentals").await.unwrap();
        let viewer = users
            .create_user(account_id, "eva@acme.test", "Eva", Role::Viewer)
            .await
            .unwrap();

        let service = SearchService::new(
            Arc::new(PropertyRepository::new(pool.clone())),
            Arc::new(ContactRepository::new(pool)),
        );
        let hits = service
            .search(&AuthContext::for_user(&viewer), "   ", 10)
            .await
            .unwrap();
        assert!(hits.is_empty());
    }
}
