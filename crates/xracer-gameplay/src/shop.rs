//! Shop items bought with banked credits.
//!
//! Owned counts live in the [`ProgressStore`] so they survive between runs.
//! At the start of each run every owned item contributes to a [`Loadout`],
//! and consumable items are used up.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::progress::ProgressStore;

/// Default item price in credits.
pub const DEFAULT_COST: u64 = 1000;

/// Default race credit multiplier granted by a multiplier item.
pub const DEFAULT_CREDIT_MULTIPLIER: f32 = 2.0;

/// Shop operation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShopError {
    /// Not enough banked credits.
    #[error("Item '{id}' costs {cost}, only {available} credits available")]
    CannotAfford {
        /// Item id.
        id: String,
        /// Item price.
        cost: u64,
        /// Banked credits.
        available: u64,
    },

    /// Owned count already at the limit.
    #[error("Inventory for '{id}' is full ({max})")]
    InventoryFull {
        /// Item id.
        id: String,
        /// Inventory limit.
        max: u32,
    },

    /// No item with this id.
    #[error("Unknown shop item '{0}'")]
    UnknownItem(String),

    /// Two items share an id.
    #[error("Duplicate shop item id '{0}'")]
    DuplicateItem(String),
}

/// Result type for shop operations.
pub type ShopResult<T> = Result<T, ShopError>;

/// What an owned item does to a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShopEffect {
    /// Multiplies race credits.
    CreditMultiplier {
        /// Multiplier applied to every award
        #[serde(default = "default_multiplier")]
        multiplier: f32,
    },
    /// Cosmetic ship model. Only the active skin is applied.
    ShipSkin {
        /// Model name
        model: String,
    },
}

fn default_multiplier() -> f32 {
    DEFAULT_CREDIT_MULTIPLIER
}

/// Run modifiers gathered from owned items.
#[derive(Debug, Clone, PartialEq)]
pub struct Loadout {
    /// Race credit multiplier
    pub credit_multiplier: f32,
    /// Ship model from the active skin
    pub ship_model: Option<String>,
}

impl Default for Loadout {
    fn default() -> Self {
        Self {
            credit_multiplier: 1.0,
            ship_model: None,
        }
    }
}

/// One item for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopItem {
    /// Unique id, also the inventory key
    pub id: String,
    /// Price in credits
    #[serde(default = "default_cost")]
    pub cost: u64,
    /// Most copies the player may hold
    #[serde(default = "default_max_inventory")]
    pub max_inventory: u32,
    /// Used up at the start of each run
    #[serde(default)]
    pub consumable: bool,
    /// Granted once for free if the player owns none
    #[serde(default)]
    pub own_by_default: bool,
    /// Effect while owned
    pub effect: ShopEffect,
}

fn default_cost() -> u64 {
    DEFAULT_COST
}

fn default_max_inventory() -> u32 {
    1
}

impl ShopItem {
    /// Owned count.
    pub fn count(&self, store: &impl ProgressStore) -> u32 {
        store.item_count(&self.id)
    }

    /// Whether at least one is owned.
    pub fn is_owned(&self, store: &impl ProgressStore) -> bool {
        self.count(store) > 0
    }

    /// Whether the banked credits cover the price.
    pub fn can_afford(&self, store: &impl ProgressStore) -> bool {
        store.total_credits() >= self.cost
    }

    /// Whether the owned count reached the limit.
    pub fn is_inventory_full(&self, store: &impl ProgressStore) -> bool {
        self.count(store) >= self.max_inventory
    }

    /// Buys one copy, debiting the banked credits.
    pub fn try_purchase(&self, store: &mut impl ProgressStore) -> ShopResult<()> {
        if !self.can_afford(&*store) {
            return Err(ShopError::CannotAfford {
                id: self.id.clone(),
                cost: self.cost,
                available: store.total_credits(),
            });
        }
        if self.is_inventory_full(&*store) {
            return Err(ShopError::InventoryFull {
                id: self.id.clone(),
                max: self.max_inventory,
            });
        }

        let remaining = store.total_credits() - self.cost;
        let count = self.count(&*store) + 1;
        store.set_total_credits(remaining);
        store.set_item_count(&self.id, count);
        if matches!(self.effect, ShopEffect::ShipSkin { .. }) {
            store.set_active_skin(&self.id);
        }
        info!("Purchased '{}' for {} credits", self.id, self.cost);
        Ok(())
    }

    /// Drops every owned copy.
    pub fn remove_from_inventory(&self, store: &mut impl ProgressStore) {
        store.set_item_count(&self.id, 0);
    }

    /// Applies the item to a starting run and uses up consumables.
    pub fn on_game_started(&self, store: &mut impl ProgressStore, loadout: &mut Loadout) {
        let mut count = self.count(&*store);
        if self.own_by_default && count == 0 {
            count = 1;
            store.set_item_count(&self.id, count);
        }
        if count == 0 {
            return;
        }

        match &self.effect {
            ShopEffect::CreditMultiplier { multiplier } => {
                loadout.credit_multiplier = *multiplier;
            }
            ShopEffect::ShipSkin { model } => {
                if store.active_skin() == Some(self.id.as_str()) {
                    loadout.ship_model = Some(model.clone());
                }
            }
        }
        debug!("Applied '{}'", self.id);

        if self.consumable {
            store.set_item_count(&self.id, count - 1);
        }
    }
}

/// The item catalog, ids unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ShopItem>", into = "Vec<ShopItem>")]
pub struct Shop {
    items: Vec<ShopItem>,
}

impl TryFrom<Vec<ShopItem>> for Shop {
    type Error = ShopError;

    fn try_from(items: Vec<ShopItem>) -> ShopResult<Self> {
        Self::new(items)
    }
}

impl From<Shop> for Vec<ShopItem> {
    fn from(shop: Shop) -> Self {
        shop.items
    }
}

impl Shop {
    /// Creates a shop, rejecting duplicate ids.
    pub fn new(items: Vec<ShopItem>) -> ShopResult<Self> {
        for (i, item) in items.iter().enumerate() {
            if items[..i].iter().any(|other| other.id == item.id) {
                return Err(ShopError::DuplicateItem(item.id.clone()));
            }
        }
        Ok(Self { items })
    }

    /// Item by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ShopItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// All items in catalog order.
    pub fn items(&self) -> impl Iterator<Item = &ShopItem> {
        self.items.iter()
    }

    /// Buys one copy of item `id`.
    pub fn purchase(&self, id: &str, store: &mut impl ProgressStore) -> ShopResult<()> {
        self.get(id)
            .ok_or_else(|| ShopError::UnknownItem(id.to_string()))?
            .try_purchase(store)
    }

    /// Applies every owned item to a starting run.
    pub fn apply_all(&self, store: &mut impl ProgressStore) -> Loadout {
        let mut loadout = Loadout::default();
        for item in &self.items {
            item.on_game_started(store, &mut loadout);
        }
        loadout
    }
}
