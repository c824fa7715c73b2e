//! Shared components, resources, events, and states for the island.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain's internals directly.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE: top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    /// Sailing the map; overlays and shops are opened from here.
    Playing,
    /// An arcade minigame owns the screen.
    Minigame,
}

/// Ordering of the one-shot session setup that runs when loading finishes.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionSet {
    /// Build services from the freshly loaded static tables.
    Build,
    /// Apply persisted records on top of the services.
    Restore,
    /// First-run policies and the initial reassignment pass.
    Prime,
}

// ═══════════════════════════════════════════════════════════════════════
// IDS
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for every item type in the catalog.
pub type ItemId = String;

/// Identifier of an interaction area on the map.
pub type AreaId = String;

/// Identifier of a minigame or fixed feature.
pub type GameElementId = String;

// ═══════════════════════════════════════════════════════════════════════
// CATALOG
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Fish,
    Rod,
    Sellable,
    NonSellable,
}

impl ItemKind {
    /// Whether a shop will buy this item from the player.
    pub fn is_sellable(self) -> bool {
        matches!(self, ItemKind::Fish | ItemKind::Sellable)
    }
}

/// Structured rod capabilities. Tables written before this field existed
/// encoded the class as a `classN` token inside `special_effect`; the data
/// loader migrates those (see `catalog::parse_legacy_rod_effect`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RodProfile {
    pub class: u32,
    #[serde(default)]
    pub abilities: BTreeSet<String>,
}

impl RodProfile {
    pub fn has_ability(&self, token: &str) -> bool {
        self.abilities.contains(token)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    /// Sell value; fish and sellables only.
    #[serde(default)]
    pub cost: Option<u32>,
    /// Free-text effect shown in the item card.
    #[serde(default)]
    pub special_effect: Option<String>,
    #[serde(default)]
    pub rod: Option<RodProfile>,
    #[serde(default)]
    pub durability: Option<u32>,
    #[serde(default)]
    pub collectible_set: Option<String>,
}

/// Who may fish an area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RodAccessRule {
    /// Active rod class must be at least this.
    MinClass(u32),
    /// Active rod must be one of these ids.
    AllowList(Vec<ItemId>),
    /// Active rod must carry this ability.
    Ability(String),
}

/// A contiguous cost range with its display color and access requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBand {
    pub min_cost: u32,
    pub max_cost: u32,
    /// Hex color, e.g. `#8BC34A`.
    pub color: String,
    pub required_class: u32,
    /// Overrides the default `MinClass(required_class)` rule.
    #[serde(default)]
    pub access: Option<RodAccessRule>,
}

impl CostBand {
    pub fn contains(&self, cost: u32) -> bool {
        cost >= self.min_cost && cost <= self.max_cost
    }

    pub fn rod_access(&self) -> RodAccessRule {
        self.access
            .clone()
            .unwrap_or(RodAccessRule::MinClass(self.required_class))
    }
}

/// Shown for items with no cost at all.
pub const NEUTRAL_COLOR: &str = "#FFFFFF";
/// Shown when no band matches. Well-formed tables never hit this.
pub const FALLBACK_COLOR: &str = "#9E9E9E";

// ═══════════════════════════════════════════════════════════════════════
// GAME ELEMENTS & AREAS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Fishing,
    Treasure,
    Safehouse,
    Shop,
}

impl ElementType {
    /// Playing this element puts items into the inventory.
    pub fn awards_items(self) -> bool {
        match self {
            ElementType::Fishing | ElementType::Treasure => true,
            ElementType::Safehouse | ElementType::Shop => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameElement {
    pub id: GameElementId,
    pub element_type: ElementType,
    /// Resource units per assignment; 0 for non-depletable elements.
    pub max_resource: u32,
    /// Selection weight in [0, 1]; higher is more likely.
    pub rarity: f64,
    /// Energy spent to play; 0 for non-gameplay elements.
    pub energy_cost: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResourceBehavior {
    Depletable,
    Shop,
    Static,
    /// Not managed by the engine at all.
    #[default]
    None,
}

/// Static description of an interaction area, supplied by map data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaDescriptor {
    pub id: AreaId,
    pub label: String,
    #[serde(default)]
    pub element_type: Option<ElementType>,
    #[serde(default)]
    pub behavior: ResourceBehavior,
    /// HTML overlay opened when the area is used for reading.
    #[serde(default)]
    pub overlay: Option<String>,
}

impl AreaDescriptor {
    pub fn is_managed(&self) -> bool {
        self.behavior != ResourceBehavior::None && self.element_type.is_some()
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct AreaRegistry {
    pub areas: Vec<AreaDescriptor>,
}

impl AreaRegistry {
    pub fn get(&self, id: &str) -> Option<&AreaDescriptor> {
        self.areas.iter().find(|a| a.id == id)
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct GameElementRegistry {
    pub elements: Vec<GameElement>,
}

/// The cost band copied onto a fishing assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedBand {
    pub min_cost: u32,
    pub max_cost: u32,
    pub color: String,
}

impl From<&CostBand> for AssignedBand {
    fn from(band: &CostBand) -> Self {
        Self {
            min_cost: band.min_cost,
            max_cost: band.max_cost,
            color: band.color.clone(),
        }
    }
}

/// Live per-area state owned by the island manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaAssignment {
    pub id: AreaId,
    pub area_element_type: Option<ElementType>,
    pub game_element_id: Option<GameElementId>,
    pub resource_left: u32,
    #[serde(default)]
    pub band: Option<AssignedBand>,
    #[serde(default)]
    pub rod_access: Option<RodAccessRule>,
}

impl AreaAssignment {
    pub fn empty(area: &AreaDescriptor) -> Self {
        Self {
            id: area.id.clone(),
            area_element_type: area.element_type,
            game_element_id: None,
            resource_left: 0,
            band: None,
            rod_access: None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// BLOCKERS
// ═══════════════════════════════════════════════════════════════════════

/// A reason the player cannot use an area right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Blocker {
    Depletion,
    InventoryFull,
    NoEnergy,
    InsufficientRod,
}

impl Blocker {
    pub fn message(self) -> &'static str {
        match self {
            Blocker::Depletion => "Nothing left here. Come back later.",
            Blocker::InventoryFull => "Your inventory is full.",
            Blocker::NoEnergy => "Not enough energy.",
            Blocker::InsufficientRod => "Your rod can't reach these waters.",
        }
    }
}

pub type BlockerSet = BTreeSet<Blocker>;

// ═══════════════════════════════════════════════════════════════════════
// PLAYER
// ═══════════════════════════════════════════════════════════════════════

pub const DEFAULT_INVENTORY_CAPACITY: u32 = 20;
pub const DEFAULT_ROD_SLOTS: u32 = 3;
pub const DEFAULT_MAX_ENERGY: u32 = 10;

#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct PlayerEnergy {
    pub current: u32,
    pub max: u32,
}

impl Default for PlayerEnergy {
    fn default() -> Self {
        Self {
            current: DEFAULT_MAX_ENERGY,
            max: DEFAULT_MAX_ENERGY,
        }
    }
}

impl PlayerEnergy {
    pub fn spend(&mut self, amount: u32) -> bool {
        if self.current < amount {
            return false;
        }
        self.current -= amount;
        true
    }

    pub fn restore(&mut self, amount: u32) {
        self.current = self.current.saturating_add(amount).min(self.max);
    }
}

/// The area the boat is currently inside, if any.
#[derive(Resource, Debug, Clone, Default)]
pub struct CurrentArea {
    pub area_id: Option<AreaId>,
}

// ═══════════════════════════════════════════════════════════════════════
// CONFIG
// ═══════════════════════════════════════════════════════════════════════

/// Engine tunables. Area bindings are filled in from the element table.
#[derive(Resource, Debug, Clone)]
pub struct IslandConfig {
    /// Width of a reassignment window in wall-clock minutes.
    pub bucket_minutes: u32,
    /// Chance a fishing area gets a minigame on each pass.
    pub fishing_chance: f64,
    /// Chance a treasure area gets a minigame on each pass.
    pub treasure_chance: f64,
    /// How often the reassignment check fires.
    pub check_interval_secs: f32,
    pub safehouse_element: GameElementId,
    pub shop_element: GameElementId,
    /// Per-area fixed elements, for maps with more than one shop.
    pub area_bindings: HashMap<AreaId, GameElementId>,
    pub starter_rod: ItemId,
    /// Seconds per regenerated energy point.
    pub energy_regen_secs: f32,
}

impl Default for IslandConfig {
    fn default() -> Self {
        Self {
            bucket_minutes: 5,
            fishing_chance: 0.7,
            treasure_chance: 0.7,
            check_interval_secs: 30.0,
            safehouse_element: "safehouse".to_string(),
            shop_element: "shop".to_string(),
            area_bindings: HashMap::new(),
            starter_rod: "rod-driftwood".to_string(),
            energy_regen_secs: 60.0,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS: cross-domain communication
// ═══════════════════════════════════════════════════════════════════════

/// Presentation → core: the boat entered an area's trigger zone.
#[derive(Event, Debug, Clone)]
pub struct AreaEnteredEvent {
    pub area_id: AreaId,
}

#[derive(Event, Debug, Clone)]
pub struct AreaExitedEvent {
    pub area_id: AreaId,
}

/// Presentation → core: the player pressed the area's button.
#[derive(Event, Debug, Clone)]
pub struct InteractRequestEvent {
    pub area_id: AreaId,
}

#[derive(Event, Debug, Clone)]
pub struct MinigameStartedEvent {
    pub area_id: AreaId,
    pub game_element_id: GameElementId,
}

/// Presentation → core: the arcade game ended.
#[derive(Event, Debug, Clone)]
pub struct MinigameFinishedEvent {
    pub area_id: AreaId,
    pub success: bool,
}

#[derive(Event, Debug, Clone)]
pub struct InteractionBlockedEvent {
    pub area_id: AreaId,
    pub blockers: BlockerSet,
}

#[derive(Event, Debug, Clone)]
pub struct OverlayOpenEvent {
    pub area_id: AreaId,
    pub overlay: String,
}

/// Sent after a reassignment pass actually ran.
#[derive(Event, Debug, Clone)]
pub struct AssignmentsChangedEvent {
    pub forced: bool,
}

#[derive(Event, Debug, Clone)]
pub struct BlockersChangedEvent {
    pub area_id: AreaId,
    pub blockers: BlockerSet,
}

#[derive(Event, Debug, Clone)]
pub struct ItemAwardedEvent {
    pub area_id: AreaId,
    pub item_id: ItemId,
    pub quantity: u32,
}

#[derive(Event, Debug, Clone)]
pub struct EquipRodRequestEvent {
    pub rod_id: ItemId,
}

#[derive(Event, Debug, Clone)]
pub struct UnequipRodRequestEvent {
    pub rod_id: ItemId,
}

#[derive(Event, Debug, Clone)]
pub struct SelectRodEvent {
    pub index: usize,
}

/// Sell from the inventory while moored at a shop.
#[derive(Event, Debug, Clone)]
pub struct SellRequestEvent {
    pub item_id: ItemId,
    pub quantity: u32,
}

/// Move items between inventory and the safehouse bank.
#[derive(Event, Debug, Clone)]
pub struct BankTransferEvent {
    pub item_id: ItemId,
    pub quantity: u32,
    /// true = inventory → bank, false = bank → inventory
    pub deposit: bool,
}

/// Toast notification for player feedback.
#[derive(Event, Debug, Clone)]
pub struct ToastEvent {
    pub message: String,
    pub duration_secs: f32,
}

/// Write every persisted record now.
#[derive(Event, Debug, Clone, Default)]
pub struct SaveRequestEvent;
