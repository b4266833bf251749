//! Dumpster inventory and rental bookkeeping
//!
//! The in-memory collection is the source of truth. Every state change
//! rewrites the whole collection as one JSON array under a single store
//! key. Persistence is best effort: a failed write keeps the in-memory
//! change and is reported back through [`Saved::persisted`].

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;

use super::fleet::{default_fleet, new_item_id, DEFAULT_LOCATION};
use crate::{
    error::{InventoryError, PersistenceError},
    models::inventory::{
        Availability, InventoryItem, InventoryStatus, ItemPatch, ItemStatus, NewItem,
    },
    repository::KeyValueStore,
};

/// Result of a mutation: the value, plus whether the write reached the store.
///
/// Calls that end up changing nothing report `persisted: Ok(())`.
#[derive(Debug)]
pub struct Saved<T> {
    pub value: T,
    pub persisted: Result<(), PersistenceError>,
}

impl<T> Saved<T> {
    fn unchanged(value: T) -> Self {
        Self {
            value,
            persisted: Ok(()),
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted.is_ok()
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

type RentalFields = (String, NaiveDate, NaiveDate);

/// Rental fields must be all set for a rented item and all absent otherwise.
fn resolve_rental(
    status: ItemStatus,
    customer_id: Option<String>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Option<RentalFields>, InventoryError> {
    match (status, customer_id, start, end) {
        (ItemStatus::Rented, Some(customer), Some(start), Some(end)) => Ok(Some((customer, start, end))),
        (ItemStatus::Rented, _, _, _) => Err(InventoryError::IncompleteRental),
        (_, None, None, None) => Ok(None),
        (other, _, _, _) => Err(InventoryError::RentalFieldsWithoutRental(other)),
    }
}

/// Numeric sizes first in numeric order, anything else after in string order
fn compare_sizes(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn KeyValueStore>,
    key: Arc<str>,
    items: Arc<RwLock<Vec<InventoryItem>>>,
}

impl InventoryService {
    /// Load the persisted collection, seeding the default fleet when it is
    /// missing, unreadable or empty. Never fails.
    pub async fn open(store: Arc<dyn KeyValueStore>, key: &str) -> Self {
        let items = match store.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<InventoryItem>>(&raw) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!("Discarding unreadable inventory under '{}': {}", key, e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to load inventory from storage: {}", e);
                Vec::new()
            }
        };

        let service = Self {
            store,
            key: Arc::from(key),
            items: Arc::new(RwLock::new(items)),
        };

        let mut items = service.items.write().await;
        if items.is_empty() {
            *items = default_fleet(Utc::now());
            tracing::info!("Seeded default fleet with {} dumpsters", items.len());
            // Failure already logged by persist
            let _ = service.persist(&items).await;
        } else {
            tracing::info!("Loaded {} inventory items", items.len());
        }
        drop(items);

        service
    }

    async fn persist(&self, items: &[InventoryItem]) -> Result<(), PersistenceError> {
        let result = match serde_json::to_string(items) {
            Ok(json) => self.store.set(&self.key, &json).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = &result {
            tracing::warn!("Inventory change kept in memory but not persisted: {}", e);
        }
        result
    }

    /// Ping the underlying store
    pub async fn check_storage(&self) -> Result<(), PersistenceError> {
        self.store.ping().await
    }

    pub async fn get_all_items(&self) -> Vec<InventoryItem> {
        self.items.read().await.clone()
    }

    pub async fn get_item(&self, id: &str) -> Option<InventoryItem> {
        self.items.read().await.iter().find(|i| i.id == id).cloned()
    }

    /// Append a new item with a fresh id and timestamp
    pub async fn add_item(&self, data: NewItem) -> Result<Saved<InventoryItem>, InventoryError> {
        let status = data.status.unwrap_or(ItemStatus::Available);
        let rental = resolve_rental(
            status,
            data.customer_id,
            data.rental_start_date,
            data.rental_end_date,
        )?;

        let (customer_id, rental_start_date, rental_end_date) = match rental {
            Some((customer, start, end)) => (Some(customer), Some(start), Some(end)),
            None => (None, None, None),
        };

        let item = InventoryItem {
            id: new_item_id(),
            name: data.name,
            size: data.size,
            quantity: data.quantity.unwrap_or(1),
            location: data.location.unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            status,
            customer_id,
            rental_start_date,
            rental_end_date,
            last_updated: Utc::now(),
        };

        debug_assert!(item.has_consistent_rental());
        let mut items = self.items.write().await;
        items.push(item.clone());
        tracing::debug!("Added inventory item id={} size={}", item.id, item.size);
        let persisted = self.persist(&items).await;

        Ok(Saved {
            value: item,
            persisted,
        })
    }

    /// Merge `patch` into the item. `None` when the id is unknown.
    ///
    /// Status changes must follow [`ItemStatus::can_transition_to`]; leaving
    /// `rented` clears the rental fields. Rejected patches change nothing.
    pub async fn update_item(
        &self,
        id: &str,
        patch: ItemPatch,
    ) -> Result<Saved<Option<InventoryItem>>, InventoryError> {
        let mut items = self.items.write().await;
        let Some(item) = items.iter_mut().find(|i| i.id == id) else {
            return Ok(Saved::unchanged(None));
        };

        let next = patch.status.unwrap_or(item.status);
        if !item.status.can_transition_to(next) {
            return Err(InventoryError::InvalidTransition {
                from: item.status,
                to: next,
            });
        }

        let rental = if next == ItemStatus::Rented {
            resolve_rental(
                next,
                patch.customer_id.or_else(|| item.customer_id.clone()),
                patch.rental_start_date.or(item.rental_start_date),
                patch.rental_end_date.or(item.rental_end_date),
            )?
        } else {
            resolve_rental(
                next,
                patch.customer_id,
                patch.rental_start_date,
                patch.rental_end_date,
            )?
        };

        if let Some(name) = patch.name {
            item.name = name;
        }
        if let Some(size) = patch.size {
            item.size = size;
        }
        if let Some(quantity) = patch.quantity {
            item.quantity = quantity;
        }
        if let Some(location) = patch.location {
            item.location = location;
        }
        item.status = next;
        match rental {
            Some((customer, start, end)) => {
                item.customer_id = Some(customer);
                item.rental_start_date = Some(start);
                item.rental_end_date = Some(end);
            }
            None => item.clear_rental(),
        }
        item.touch();
        debug_assert!(item.has_consistent_rental());

        let updated = item.clone();
        tracing::debug!("Updated inventory item id={} status={}", updated.id, updated.status);
        let persisted = self.persist(&items).await;

        Ok(Saved {
            value: Some(updated),
            persisted,
        })
    }

    /// Remove the item; `false` when there was nothing to remove
    pub async fn delete_item(&self, id: &str) -> Saved<bool> {
        let mut items = self.items.write().await;
        let Some(pos) = items.iter().position(|i| i.id == id) else {
            return Saved::unchanged(false);
        };

        items.remove(pos);
        tracing::debug!("Deleted inventory item id={}", id);
        let persisted = self.persist(&items).await;

        Saved {
            value: true,
            persisted,
        }
    }

    /// Case-insensitive substring match on name or location
    pub async fn search_items(&self, query: &str) -> Vec<InventoryItem> {
        let needle = query.to_lowercase();
        self.items
            .read()
            .await
            .iter()
            .filter(|i| i.matches(&needle))
            .cloned()
            .collect()
    }

    /// Count free units of `size`, suggesting other sizes when there are none
    pub async fn check_availability(&self, size: &str) -> Availability {
        let items = self.items.read().await;
        let free = || items.iter().filter(|i| i.status == ItemStatus::Available);

        let count = free().filter(|i| i.size == size).count();
        if count > 0 {
            return Availability {
                available: true,
                count,
                alternative_sizes: None,
            };
        }

        let mut sizes: Vec<String> = free()
            .map(|i| i.size.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        sizes.sort_by(|a, b| compare_sizes(a, b));

        Availability {
            available: false,
            count: 0,
            alternative_sizes: Some(sizes),
        }
    }

    /// Rent the first available unit of `size`. `None` leaves everything untouched.
    pub async fn rent_dumpster(
        &self,
        size: &str,
        customer_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Saved<Option<InventoryItem>> {
        let mut items = self.items.write().await;
        let Some(item) = items
            .iter_mut()
            .find(|i| i.size == size && i.status == ItemStatus::Available)
        else {
            tracing::info!("No {} yard dumpster available for customer {}", size, customer_id);
            return Saved::unchanged(None);
        };

        item.status = ItemStatus::Rented;
        item.customer_id = Some(customer_id.to_string());
        item.rental_start_date = Some(start_date);
        item.rental_end_date = Some(end_date);
        item.touch();
        debug_assert!(item.has_consistent_rental());

        let rented = item.clone();
        tracing::info!(
            "Rented dumpster id={} size={} to customer {} ({} to {})",
            rented.id,
            size,
            customer_id,
            start_date,
            end_date
        );
        let persisted = self.persist(&items).await;

        Saved {
            value: Some(rented),
            persisted,
        }
    }

    /// Put a rented unit back into service and hand back the updated record.
    /// `None` if the id is unknown or the unit is not rented.
    pub async fn return_dumpster(&self, id: &str) -> Saved<Option<InventoryItem>> {
        let mut items = self.items.write().await;
        let Some(item) = items
            .iter_mut()
            .find(|i| i.id == id && i.status == ItemStatus::Rented)
        else {
            return Saved::unchanged(None);
        };

        item.status = ItemStatus::Available;
        item.clear_rental();
        item.touch();
        debug_assert!(item.has_consistent_rental());

        let returned = item.clone();
        tracing::info!("Returned dumpster id={}", id);
        let persisted = self.persist(&items).await;

        Saved {
            value: Some(returned),
            persisted,
        }
    }

    pub async fn inventory_status(&self) -> InventoryStatus {
        let items = self.items.read().await;
        let total = items.len();
        let available = items.iter().filter(|i| i.status == ItemStatus::Available).count();
        let rented = items.iter().filter(|i| i.status == ItemStatus::Rented).count();

        let utilization_rate = if total == 0 {
            0.0
        } else {
            rented as f64 / total as f64 * 100.0
        };

        InventoryStatus {
            total_dumpsters: total,
            available_dumpsters: available,
            active_rentals: rented,
            utilization_rate,
        }
    }

    pub async fn items_by_status(&self, status: ItemStatus) -> Vec<InventoryItem> {
        self.items
            .read()
            .await
            .iter()
            .filter(|i| i.status == status)
            .cloned()
            .collect()
    }

    pub async fn items_by_size(&self, size: &str) -> Vec<InventoryItem> {
        self.items
            .read()
            .await
            .iter()
            .filter(|i| i.size == size)
            .cloned()
            .collect()
    }
}
