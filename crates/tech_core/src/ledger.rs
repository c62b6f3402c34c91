//! Resource ledger for research costs.
//!
//! Quantities are unsigned so the "never negative" rule holds by
//! construction; deductions check every cost before touching any entry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TechError};

/// Normalize a resource or content name for ledger matching.
///
/// Lowercases and strips a leading `"raw "`, so `"Raw Copper"` and
/// `"copper"` refer to the same ledger entry.
#[must_use]
pub fn normalize_resource_name(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    match lower.strip_prefix("raw ") {
        Some(stripped) => stripped.trim_start().to_string(),
        None => lower,
    }
}

/// A named quantity held by the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceItem {
    /// Display name.
    pub name: String,
    /// Amount held.
    pub quantity: u32,
}

impl ResourceItem {
    /// Create a new ledger entry.
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }
}

/// One line of a research price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCost {
    /// Resource name.
    pub resource: String,
    /// Amount consumed.
    pub amount: u32,
}

impl ResourceCost {
    /// Create a new cost line.
    pub fn new(resource: impl Into<String>, amount: u32) -> Self {
        Self {
            resource: resource.into(),
            amount,
        }
    }
}

/// A resource the player is short of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    /// Resource name as written in the cost.
    pub resource: String,
    /// Total amount required.
    pub required: u32,
    /// Amount currently held.
    pub available: u32,
}

/// Mutable quantities of named resources, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLedger {
    entries: Vec<ResourceItem>,
}

impl ResourceLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from entries.
    ///
    /// # Errors
    ///
    /// Returns [`TechError::DuplicateResource`] if two entries normalize to the
    /// same name.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = ResourceItem>,
    {
        let mut ledger = Self::new();
        for entry in entries {
            ledger.declare(entry.name, entry.quantity)?;
        }
        Ok(ledger)
    }

    /// Add a new entry.
    ///
    /// # Errors
    ///
    /// Returns [`TechError::DuplicateResource`] if the name is already present.
    pub fn declare(&mut self, name: impl Into<String>, quantity: u32) -> Result<()> {
        let name = name.into();
        if self.position(&name).is_some() {
            return Err(TechError::DuplicateResource(name));
        }
        self.entries.push(ResourceItem::new(name, quantity));
        Ok(())
    }

    fn position(&self, name: &str) -> Option<usize> {
        let key = normalize_resource_name(name);
        self.entries
            .iter()
            .position(|e| normalize_resource_name(&e.name) == key)
    }

    /// True if the ledger tracks this resource.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Amount held. Untracked resources hold zero.
    #[must_use]
    pub fn quantity(&self, name: &str) -> u32 {
        self.position(name).map_or(0, |i| self.entries[i].quantity)
    }

    /// Overwrite the amount held, declaring the resource if needed.
    pub fn set_quantity(&mut self, name: &str, quantity: u32) {
        match self.position(name) {
            Some(i) => self.entries[i].quantity = quantity,
            None => self.entries.push(ResourceItem::new(name, quantity)),
        }
    }

    /// Add to a resource, declaring it if needed.
    ///
    /// Returns the new quantity.
    ///
    /// # Errors
    ///
    /// Returns [`TechError::ResourceOverflow`] if the counter would overflow;
    /// the ledger is unchanged in that case.
    pub fn credit(&mut self, name: &str, amount: u32) -> Result<u32> {
        let current = self.quantity(name);
        let updated = current
            .checked_add(amount)
            .ok_or_else(|| TechError::ResourceOverflow(name.to_string()))?;
        self.set_quantity(name, updated);
        Ok(updated)
    }

    /// Sum costs per resource so that repeated lines are checked together.
    fn totals(costs: &[ResourceCost]) -> BTreeMap<String, (String, u64)> {
        let mut totals: BTreeMap<String, (String, u64)> = BTreeMap::new();
        for cost in costs {
            totals
                .entry(normalize_resource_name(&cost.resource))
                .or_insert_with(|| (cost.resource.clone(), 0))
                .1 += u64::from(cost.amount);
        }
        totals
    }

    /// Every resource the player is short of for this price.
    #[must_use]
    pub fn shortfalls(&self, costs: &[ResourceCost]) -> Vec<Shortfall> {
        Self::totals(costs)
            .into_values()
            .filter_map(|(resource, required)| {
                let available = self.quantity(&resource);
                (u64::from(available) < required).then(|| Shortfall {
                    resource,
                    required: u32::try_from(required).unwrap_or(u32::MAX),
                    available,
                })
            })
            .collect()
    }

    /// Check if every cost can be paid at once.
    #[must_use]
    pub fn can_afford(&self, costs: &[ResourceCost]) -> bool {
        self.shortfalls(costs).is_empty()
    }

    /// Deduct every cost, or nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TechError::InsufficientResources`] for the first short
    /// resource; the ledger is unchanged in that case.
    pub fn spend_all(&mut self, costs: &[ResourceCost]) -> Result<()> {
        if let Some(short) = self.shortfalls(costs).into_iter().next() {
            return Err(TechError::InsufficientResources {
                resource: short.resource,
                required: short.required,
                available: short.available,
            });
        }

        for (resource, required) in Self::totals(costs).into_values() {
            if required == 0 {
                continue;
            }
            if let Some(i) = self.position(&resource) {
                // Affordability was checked above, so the total fits in u32.
                let amount = u32::try_from(required).unwrap_or(u32::MAX);
                self.entries[i].quantity = self.entries[i].quantity.saturating_sub(amount);
            }
        }
        Ok(())
    }

    /// Entries in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[ResourceItem] {
        &self.entries
    }

    /// Number of tracked resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no resources are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
