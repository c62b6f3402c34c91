//! Content registry: the static database of blocks, units, fluids and the
//! rest of the game's named things.
//!
//! Tech nodes are research wrappers around these items and refer to them by
//! name only.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TechError};

/// Buildable structure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockInfo {
    /// UI grouping (e.g. "distribution", "crafting").
    #[serde(default)]
    pub category: String,
    /// Footprint edge length in tiles.
    #[serde(default = "default_block_size")]
    pub size: u8,
    /// Hit points.
    #[serde(default)]
    pub health: u32,
}

const fn default_block_size() -> u8 {
    1
}

/// Mobile unit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnitInfo {
    /// Hit points.
    #[serde(default)]
    pub health: u32,
    /// Flat damage reduction.
    #[serde(default)]
    pub armor: u32,
    /// Air unit.
    #[serde(default)]
    pub flying: bool,
}

/// Liquid or gas.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FluidInfo {
    /// Flammability, 0-100.
    #[serde(default)]
    pub flammability: u8,
    /// Temperature, 0-100 (50 is ambient).
    #[serde(default)]
    pub temperature: u8,
}

/// Raw or refined material.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceInfo {
    /// Drill tier required to mine it; 0 for crafted materials.
    #[serde(default)]
    pub hardness: u8,
}

/// Campaign map sector.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SectorInfo {
    /// Planet the sector belongs to.
    #[serde(default)]
    pub planet: String,
    /// Enemy waves to survive before capture; 0 for attack maps.
    #[serde(default)]
    pub capture_wave: u32,
}

/// Temporary unit modifier.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusEffectInfo {
    /// Damage multiplier in percent (100 = unchanged).
    #[serde(default = "default_percent")]
    pub damage_percent: u32,
    /// Speed multiplier in percent (100 = unchanged).
    #[serde(default = "default_percent")]
    pub speed_percent: u32,
}

const fn default_percent() -> u32 {
    100
}

/// Kind-specific payload of a content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentKind {
    /// Buildable structure.
    Block(BlockInfo),
    /// Mobile unit.
    Unit(UnitInfo),
    /// Liquid.
    Fluid(FluidInfo),
    /// Gas.
    Gas(FluidInfo),
    /// Material.
    Resource(ResourceInfo),
    /// Campaign sector.
    Sector(SectorInfo),
    /// Status effect.
    StatusEffect(StatusEffectInfo),
}

impl ContentKind {
    /// Payload-free tag for this kind.
    #[must_use]
    pub const fn category(&self) -> ContentCategory {
        match self {
            Self::Block(_) => ContentCategory::Block,
            Self::Unit(_) => ContentCategory::Unit,
            Self::Fluid(_) => ContentCategory::Fluid,
            Self::Gas(_) => ContentCategory::Gas,
            Self::Resource(_) => ContentCategory::Resource,
            Self::Sector(_) => ContentCategory::Sector,
            Self::StatusEffect(_) => ContentCategory::StatusEffect,
        }
    }
}

/// Content kind without payload, for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentCategory {
    /// Buildable structure.
    Block,
    /// Mobile unit.
    Unit,
    /// Liquid.
    Fluid,
    /// Gas.
    Gas,
    /// Material.
    Resource,
    /// Campaign sector.
    Sector,
    /// Status effect.
    StatusEffect,
}

/// A named entry in the content database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Unique display name; tech nodes reference items by this.
    pub name: String,
    /// Flavour text.
    #[serde(default)]
    pub description: String,
    /// Kind and kind-specific data.
    pub kind: ContentKind,
}

impl ContentItem {
    /// Create a new item with an empty description.
    pub fn new(name: impl Into<String>, kind: ContentKind) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            kind,
        }
    }

    /// Payload-free kind tag.
    #[must_use]
    pub const fn category(&self) -> ContentCategory {
        self.kind.category()
    }
}

/// Name-indexed content database, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ContentRegistry {
    items: Vec<ContentItem>,
    by_name: HashMap<String, usize>,
}

impl ContentRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from items.
    ///
    /// # Errors
    ///
    /// Returns [`TechError::DataParseError`] if two items share a name.
    pub fn from_items<I>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = ContentItem>,
    {
        let mut registry = Self::new();
        for item in items {
            registry.register(item)?;
        }
        Ok(registry)
    }

    /// Add an item.
    ///
    /// # Errors
    ///
    /// Returns [`TechError::DataParseError`] if the name is already taken.
    pub fn register(&mut self, item: ContentItem) -> Result<()> {
        if self.by_name.contains_key(&item.name) {
            return Err(TechError::DataParseError {
                what: "content registry".into(),
                message: format!("duplicate content item '{}'", item.name),
            });
        }
        self.by_name.insert(item.name.clone(), self.items.len());
        self.items.push(item);
        Ok(())
    }

    /// Look up an item by exact name.
    #[must_use]
    pub fn find_item(&self, name: &str) -> Option<&ContentItem> {
        self.by_name.get(name).map(|&i| &self.items[i])
    }

    /// All items of one kind, in declaration order.
    pub fn items_of_kind(&self, category: ContentCategory) -> impl Iterator<Item = &ContentItem> {
        self.items.iter().filter(move |i| i.category() == category)
    }

    /// All blocks with their payloads.
    pub fn blocks(&self) -> impl Iterator<Item = (&ContentItem, &BlockInfo)> {
        self.items.iter().filter_map(|i| match &i.kind {
            ContentKind::Block(info) => Some((i, info)),
            _ => None,
        })
    }

    /// All units with their payloads.
    pub fn units(&self) -> impl Iterator<Item = (&ContentItem, &UnitInfo)> {
        self.items.iter().filter_map(|i| match &i.kind {
            ContentKind::Unit(info) => Some((i, info)),
            _ => None,
        })
    }

    /// All sectors with their payloads.
    pub fn sectors(&self) -> impl Iterator<Item = (&ContentItem, &SectorInfo)> {
        self.items.iter().filter_map(|i| match &i.kind {
            ContentKind::Sector(info) => Some((i, info)),
            _ => None,
        })
    }

    /// Names of all resource items.
    pub fn resource_names(&self) -> impl Iterator<Item = &str> {
        self.items_of_kind(ContentCategory::Resource)
            .map(|i| i.name.as_str())
    }

    /// True if the name is a registered sector.
    #[must_use]
    pub fn is_sector(&self, name: &str) -> bool {
        self.find_item(name)
            .is_some_and(|i| i.category() == ContentCategory::Sector)
    }

    /// Every item in declaration order.
    #[must_use]
    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if the registry holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
