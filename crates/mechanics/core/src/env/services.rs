//! Collaborator services the mechanics call into.
//!
//! Queries take `&self`, commands take `&mut self`. Every service is
//! object-safe so the [`Env`](super::Env) can hold trait objects.

use crate::env::records::EquipmentSlot;
use crate::env::SpawnError;
use crate::magic::{EffectId, EffectKey};
use crate::state::{Actor, ActorId, CellId, GameTime, ItemHandle, ObjectHandle, Position, RefId};

// ============================================================================
// World
// ============================================================================

/// World object store, physics queries and scene placement.
pub trait WorldService {
    fn position(&self, handle: ObjectHandle) -> Position;
    fn cell(&self, handle: ObjectHandle) -> CellId;
    fn is_exterior(&self, handle: ObjectHandle) -> bool;
    /// Half of the collision box depth, used for reach checks.
    fn half_extent_y(&self, handle: ObjectHandle) -> f32;
    fn line_of_sight(&self, from: ObjectHandle, to: ObjectHandle) -> bool;
    /// Submerged to at least `level` of the object's height.
    fn is_underwater(&self, handle: ObjectHandle, level: f32) -> bool;
    fn is_swimming(&self, handle: ObjectHandle) -> bool;
    /// Standing in water shallow enough to walk.
    fn is_wading(&self, handle: ObjectHandle) -> bool;
    fn is_walking_on_water(&self, handle: ObjectHandle) -> bool;
    fn terrain_height(&self, position: Position) -> f32;
    /// Handle of a registered actor, `None` if its cell is not loaded.
    fn find_actor(&self, id: ActorId) -> Option<ObjectHandle>;
    fn time_stamp(&self) -> GameTime;
    fn is_levitation_enabled(&self) -> bool;
    /// Night or bad weather at the object's location.
    fn is_dark(&self, handle: ObjectHandle) -> bool;

    /// Places a new instance of `record` next to `anchor`.
    ///
    /// # Errors
    ///
    /// Returns [`SpawnError`] if the record is unknown or cannot be placed.
    fn spawn_near(&mut self, record: &RefId, anchor: ObjectHandle) -> Result<Actor, SpawnError>;
    fn delete_object(&mut self, handle: ObjectHandle);
    fn set_collision(&mut self, handle: ObjectHandle, enabled: bool);
    fn move_to(&mut self, handle: ObjectHandle, position: Position);
}

// ============================================================================
// Inventory
// ============================================================================

/// One stack in a container.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InventoryItem {
    pub handle: ItemHandle,
    pub record: RefId,
    pub count: u32,
    /// Current condition; `None` for items without condition.
    pub condition: Option<i32>,
    /// Remaining enchantment charge; `None` means full.
    pub charge: Option<f32>,
}

impl InventoryItem {
    pub fn new(handle: ItemHandle, record: impl Into<RefId>, count: u32) -> Self {
        Self {
            handle,
            record: record.into(),
            count,
            condition: None,
            charge: None,
        }
    }

    /// Charge is unlimited or at least `cost`.
    pub fn has_charge_for(&self, cost: f32) -> bool {
        self.charge.map_or(true, |charge| charge >= cost)
    }
}

/// A constant effect granted by an equipped item.
#[derive(Clone, Debug, PartialEq)]
pub struct EquippedEffect {
    /// Record id of the item carrying the enchantment.
    pub source: RefId,
    pub key: EffectKey,
    pub magnitude: f32,
}

/// Containers and equipment of actors.
pub trait InventoryService {
    fn items(&self, owner: ObjectHandle) -> Vec<InventoryItem>;
    fn slot(&self, owner: ObjectHandle, slot: EquipmentSlot) -> Option<InventoryItem>;
    fn is_equipped(&self, owner: ObjectHandle, item: ItemHandle) -> bool;
    fn find_by_record(&self, owner: ObjectHandle, record: &RefId) -> Option<InventoryItem>;
    fn encumbrance(&self, owner: ObjectHandle) -> f32;
    fn capacity(&self, owner: ObjectHandle) -> f32;
    fn armor_rating(&self, owner: ObjectHandle) -> f32;
    fn selected_enchant_item(&self, owner: ObjectHandle) -> Option<ItemHandle>;
    /// Constant effects of equipped items, excluding purged ones.
    fn equipped_effects(&self, owner: ObjectHandle) -> Vec<EquippedEffect>;

    fn add(&mut self, owner: ObjectHandle, record: &RefId) -> ItemHandle;
    /// Removes up to `count` items of `record`, returning how many were removed.
    fn remove(&mut self, owner: ObjectHandle, record: &RefId, count: u32) -> u32;
    fn equip(&mut self, owner: ObjectHandle, item: ItemHandle) -> bool;
    fn unequip_slot(&mut self, owner: ObjectHandle, slot: EquipmentSlot);
    fn auto_equip(&mut self, owner: ObjectHandle);
    fn set_selected_enchant_item(&mut self, owner: ObjectHandle, item: Option<ItemHandle>);
    /// Suppresses `effect` from equipped sources (all of them when `source` is `None`).
    fn purge_effect(&mut self, owner: ObjectHandle, effect: EffectId, source: Option<&RefId>);
}

// ============================================================================
// Presentation
// ============================================================================

/// Renderer, sound and UI notifications. Fire-and-forget.
pub trait PresentationService {
    fn spawn_effect(&mut self, model: &str, position: Position);
    fn play_voice(&mut self, speaker: ObjectHandle, line: &str);
    fn message_box(&mut self, text: &str);
    fn play_death_music(&mut self);
    fn request_load_recent_save(&mut self);
    fn set_sneak_indicator(&mut self, visible: bool);
}

// ============================================================================
// Mechanics manager
// ============================================================================

/// Higher-level mechanics the actor layer reports to and queries.
pub trait MechanicsService {
    /// Side effects of `attacker` starting combat with `target` (music, alarms, dialogue).
    fn start_combat(&mut self, attacker: ActorId, target: ActorId);
    fn stop_combat(&mut self, actor: ActorId);
    fn is_aggressive(&self, actor: ActorId, target: ActorId) -> bool;
    /// `observer` notices `target` this tick.
    fn awareness_check(&self, target: ActorId, observer: ActorId) -> bool;
    fn is_actor_detected(&self, actor: ActorId, observer: ActorId) -> bool;
    fn actor_killed(&mut self, victim: ActorId, killer: ActorId);
    fn commit_murder(&mut self, victim: ActorId, crime_id: u32);
    fn sneak_skill_used(&mut self, actor: ActorId);
}
