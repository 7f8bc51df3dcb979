//! In-memory service implementations.
//!
//! These back the integration tests and offline tools: every command is
//! recorded so callers can assert on exactly what the mechanics asked the
//! outside world to do.

use std::collections::{BTreeMap, BTreeSet};

use crate::env::{
    ContentOracle, ContentTables, EnchantmentKind, Env, EquipmentSlot, EquippedEffect,
    GameSettings, InventoryItem, InventoryService, ItemKind, MechanicsService, MechanicsTables,
    PresentationService, SettingsError, SpawnError, WorldService,
};
use crate::magic::EffectId;
use crate::state::{Actor, ActorId, CellId, GameTime, ItemHandle, ObjectHandle, Position, RefId};

// ============================================================================
// World
// ============================================================================

/// Physical state of one placed object.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldObject {
    pub position: Position,
    pub cell: CellId,
    pub exterior: bool,
    pub half_extent_y: f32,
    /// Fraction of the object's height below the water surface.
    pub submersion: f32,
    pub swimming: bool,
    pub wading: bool,
    pub walking_on_water: bool,
    pub dark: bool,
    pub collision: bool,
}

impl WorldObject {
    pub fn at(position: Position) -> Self {
        Self {
            position,
            cell: CellId(0),
            exterior: true,
            half_extent_y: 32.0,
            submersion: 0.0,
            swimming: false,
            wading: false,
            walking_on_water: false,
            dark: false,
            collision: true,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryWorld {
    objects: BTreeMap<ObjectHandle, WorldObject>,
    actors: BTreeMap<ActorId, ObjectHandle>,
    /// Actors whose cell is not loaded; `find_actor` does not see them.
    unloaded: BTreeSet<ActorId>,
    templates: BTreeMap<RefId, Actor>,
    failing_spawns: BTreeSet<RefId>,
    blocked_sight: BTreeSet<(ObjectHandle, ObjectHandle)>,
    pub terrain_height: f32,
    pub time: GameTime,
    pub levitation_enabled: bool,
    next_id: i32,
    next_handle: u64,

    pub spawned: Vec<(RefId, ActorId)>,
    pub deleted: Vec<ObjectHandle>,
    pub moved: Vec<(ObjectHandle, Position)>,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self {
            levitation_enabled: true,
            next_id: 1000,
            next_handle: 1000,
            ..Self::default()
        }
    }

    /// Places an actor's object at `position` and makes it findable.
    pub fn place_actor(&mut self, actor: &Actor, position: Position) -> &mut WorldObject {
        self.actors.insert(actor.id, actor.handle);
        self.objects
            .entry(actor.handle)
            .or_insert_with(|| WorldObject::at(position))
    }

    pub fn object(&self, handle: ObjectHandle) -> Option<&WorldObject> {
        self.objects.get(&handle)
    }

    pub fn object_mut(&mut self, handle: ObjectHandle) -> Option<&mut WorldObject> {
        self.objects.get_mut(&handle)
    }

    pub fn set_position(&mut self, handle: ObjectHandle, position: Position) {
        if let Some(object) = self.objects.get_mut(&handle) {
            object.position = position;
        }
    }

    pub fn unload(&mut self, id: ActorId) {
        self.unloaded.insert(id);
    }

    pub fn load(&mut self, id: ActorId) {
        self.unloaded.remove(&id);
    }

    pub fn block_sight(&mut self, from: ObjectHandle, to: ObjectHandle) {
        self.blocked_sight.insert((from, to));
    }

    /// Registers the actor cloned by `spawn_near(record, ..)`.
    pub fn add_template(&mut self, record: impl Into<RefId>, actor: Actor) {
        self.templates.insert(record.into(), actor);
    }

    /// Makes every spawn of `record` fail as if there were no room.
    pub fn fail_spawns_of(&mut self, record: impl Into<RefId>) {
        self.failing_spawns.insert(record.into());
    }

    fn with_object<T>(&self, handle: ObjectHandle, default: T, f: impl FnOnce(&WorldObject) -> T) -> T {
        self.objects.get(&handle).map_or(default, f)
    }
}

impl WorldService for MemoryWorld {
    fn position(&self, handle: ObjectHandle) -> Position {
        self.with_object(handle, Position::ORIGIN, |object| object.position)
    }

    fn cell(&self, handle: ObjectHandle) -> CellId {
        self.with_object(handle, CellId(0), |object| object.cell)
    }

    fn is_exterior(&self, handle: ObjectHandle) -> bool {
        self.with_object(handle, true, |object| object.exterior)
    }

    fn half_extent_y(&self, handle: ObjectHandle) -> f32 {
        self.with_object(handle, 0.0, |object| object.half_extent_y)
    }

    fn line_of_sight(&self, from: ObjectHandle, to: ObjectHandle) -> bool {
        !self.blocked_sight.contains(&(from, to))
    }

    fn is_underwater(&self, handle: ObjectHandle, level: f32) -> bool {
        self.with_object(handle, false, |object| {
            object.submersion > 0.0 && object.submersion >= level
        })
    }

    fn is_swimming(&self, handle: ObjectHandle) -> bool {
        self.with_object(handle, false, |object| object.swimming)
    }

    fn is_wading(&self, handle: ObjectHandle) -> bool {
        self.with_object(handle, false, |object| object.wading)
    }

    fn is_walking_on_water(&self, handle: ObjectHandle) -> bool {
        self.with_object(handle, false, |object| object.walking_on_water)
    }

    fn terrain_height(&self, _position: Position) -> f32 {
        self.terrain_height
    }

    fn find_actor(&self, id: ActorId) -> Option<ObjectHandle> {
        if self.unloaded.contains(&id) {
            return None;
        }
        self.actors.get(&id).copied()
    }

    fn time_stamp(&self) -> GameTime {
        self.time
    }

    fn is_levitation_enabled(&self) -> bool {
        self.levitation_enabled
    }

    fn is_dark(&self, handle: ObjectHandle) -> bool {
        self.with_object(handle, false, |object| object.dark)
    }

    fn spawn_near(&mut self, record: &RefId, anchor: ObjectHandle) -> Result<Actor, SpawnError> {
        if self.failing_spawns.contains(record) {
            return Err(SpawnError::NoRoom(record.clone()));
        }
        let mut actor = self
            .templates
            .get(record)
            .cloned()
            .ok_or_else(|| SpawnError::UnknownRecord(record.clone()))?;

        actor.id = ActorId(self.next_id);
        actor.handle = ObjectHandle(self.next_handle);
        self.next_id += 1;
        self.next_handle += 1;

        let mut object = self
            .objects
            .get(&anchor)
            .cloned()
            .unwrap_or_else(|| WorldObject::at(Position::ORIGIN));
        object.position.x += 64.0;
        object.collision = true;
        self.objects.insert(actor.handle, object);
        self.actors.insert(actor.id, actor.handle);
        self.spawned.push((record.clone(), actor.id));
        Ok(actor)
    }

    fn delete_object(&mut self, handle: ObjectHandle) {
        self.objects.remove(&handle);
        self.actors.retain(|_, placed| *placed != handle);
        self.deleted.push(handle);
    }

    fn set_collision(&mut self, handle: ObjectHandle, enabled: bool) {
        if let Some(object) = self.objects.get_mut(&handle) {
            object.collision = enabled;
        }
    }

    fn move_to(&mut self, handle: ObjectHandle, position: Position) {
        self.set_position(handle, position);
        self.moved.push((handle, position));
    }
}

// ============================================================================
// Inventory
// ============================================================================

#[derive(Clone, Debug, Default)]
struct Container {
    items: Vec<InventoryItem>,
    equipped: BTreeMap<EquipmentSlot, ItemHandle>,
    selected_enchant: Option<ItemHandle>,
    capacity: f32,
    armor_rating: f32,
    /// `(source, effect)` pairs suppressed by `purge_effect`; `None` matches every source.
    purged: BTreeSet<(Option<RefId>, EffectId)>,
}

impl Container {
    fn item(&self, handle: ItemHandle) -> Option<&InventoryItem> {
        self.items.iter().find(|item| item.handle == handle)
    }

    fn is_purged(&self, source: &RefId, effect: EffectId) -> bool {
        self.purged.contains(&(None, effect)) || self.purged.contains(&(Some(source.clone()), effect))
    }
}

/// Containers resolved against in-memory content records.
#[derive(Clone, Debug, Default)]
pub struct MemoryInventory {
    content: ContentTables,
    containers: BTreeMap<ObjectHandle, Container>,
    next_item: u64,

    pub equips: Vec<(ObjectHandle, RefId)>,
    pub unequips: Vec<(ObjectHandle, EquipmentSlot)>,
    pub auto_equips: Vec<ObjectHandle>,
    pub removed: Vec<(ObjectHandle, RefId, u32)>,
}

impl MemoryInventory {
    pub fn new(content: ContentTables) -> Self {
        Self {
            content,
            next_item: 1,
            ..Self::default()
        }
    }

    pub fn set_capacity(&mut self, owner: ObjectHandle, capacity: f32) {
        self.containers.entry(owner).or_default().capacity = capacity;
    }

    pub fn set_armor_rating(&mut self, owner: ObjectHandle, rating: f32) {
        self.containers.entry(owner).or_default().armor_rating = rating;
    }

    /// Adds an item and equips it in one step.
    pub fn give_equipped(&mut self, owner: ObjectHandle, record: impl Into<RefId>) -> ItemHandle {
        let record = record.into();
        let handle = self.add(owner, &record);
        self.equip(owner, handle);
        handle
    }

    /// Replaces the stored state of an item (condition, charge, count).
    pub fn update_item(&mut self, owner: ObjectHandle, item: InventoryItem) {
        if let Some(container) = self.containers.get_mut(&owner) {
            if let Some(slot) = container.items.iter_mut().find(|i| i.handle == item.handle) {
                *slot = item;
            }
        }
    }

    pub fn equipped_record(&self, owner: ObjectHandle, slot: EquipmentSlot) -> Option<RefId> {
        self.slot(owner, slot).map(|item| item.record)
    }
}

impl InventoryService for MemoryInventory {
    fn items(&self, owner: ObjectHandle) -> Vec<InventoryItem> {
        self.containers
            .get(&owner)
            .map(|container| container.items.clone())
            .unwrap_or_default()
    }

    fn slot(&self, owner: ObjectHandle, slot: EquipmentSlot) -> Option<InventoryItem> {
        let container = self.containers.get(&owner)?;
        let handle = container.equipped.get(&slot)?;
        container.item(*handle).cloned()
    }

    fn is_equipped(&self, owner: ObjectHandle, item: ItemHandle) -> bool {
        self.containers
            .get(&owner)
            .is_some_and(|container| container.equipped.values().any(|h| *h == item))
    }

    fn find_by_record(&self, owner: ObjectHandle, record: &RefId) -> Option<InventoryItem> {
        self.containers
            .get(&owner)?
            .items
            .iter()
            .find(|item| &item.record == record)
            .cloned()
    }

    fn encumbrance(&self, owner: ObjectHandle) -> f32 {
        self.containers.get(&owner).map_or(0.0, |container| {
            container
                .items
                .iter()
                .map(|item| {
                    let weight = self.content.item(&item.record).map_or(0.0, |r| r.weight);
                    weight * item.count as f32
                })
                .sum()
        })
    }

    fn capacity(&self, owner: ObjectHandle) -> f32 {
        self.containers.get(&owner).map_or(0.0, |c| c.capacity)
    }

    fn armor_rating(&self, owner: ObjectHandle) -> f32 {
        self.containers.get(&owner).map_or(0.0, |c| c.armor_rating)
    }

    fn selected_enchant_item(&self, owner: ObjectHandle) -> Option<ItemHandle> {
        self.containers.get(&owner)?.selected_enchant
    }

    fn equipped_effects(&self, owner: ObjectHandle) -> Vec<EquippedEffect> {
        let Some(container) = self.containers.get(&owner) else {
            return Vec::new();
        };
        let mut effects = Vec::new();
        for handle in container.equipped.values() {
            let Some(item) = container.item(*handle) else {
                continue;
            };
            let Some(enchantment) = self
                .content
                .item(&item.record)
                .and_then(|record| record.enchantment.as_ref())
                .and_then(|id| self.content.enchantment(id))
            else {
                continue;
            };
            if enchantment.kind != EnchantmentKind::ConstantEffect {
                continue;
            }
            for entry in &enchantment.effects {
                if container.is_purged(&item.record, entry.id()) {
                    continue;
                }
                effects.push(EquippedEffect {
                    source: item.record.clone(),
                    key: entry.key,
                    magnitude: entry.average_magnitude(),
                });
            }
        }
        effects
    }

    fn add(&mut self, owner: ObjectHandle, record: &RefId) -> ItemHandle {
        let handle = ItemHandle(self.next_item);
        self.next_item += 1;
        let container = self.containers.entry(owner).or_default();
        let mut item = InventoryItem::new(handle, record.clone(), 1);
        if let Some(ItemKind::Weapon(data)) = self.content.item(record).map(|r| &r.kind) {
            if data.has_health() {
                item.condition = Some(data.health);
            }
        }
        container.items.push(item);
        handle
    }

    fn remove(&mut self, owner: ObjectHandle, record: &RefId, count: u32) -> u32 {
        let Some(container) = self.containers.get_mut(&owner) else {
            return 0;
        };
        let mut removed = 0;
        while removed < count {
            let Some(index) = container.items.iter().position(|i| &i.record == record) else {
                break;
            };
            let item = &mut container.items[index];
            let take = item.count.min(count - removed);
            item.count -= take;
            removed += take;
            if item.count == 0 {
                let handle = item.handle;
                container.items.remove(index);
                container.equipped.retain(|_, equipped| *equipped != handle);
            }
        }
        if removed > 0 {
            self.removed.push((owner, record.clone(), removed));
        }
        removed
    }

    fn equip(&mut self, owner: ObjectHandle, item: ItemHandle) -> bool {
        let Some(container) = self.containers.get_mut(&owner) else {
            return false;
        };
        let Some(record) = container.item(item).map(|i| i.record.clone()) else {
            return false;
        };
        let Some(slot) = self
            .content
            .item(&record)
            .and_then(|r| r.equipment_slots().first().copied())
        else {
            return false;
        };
        container.equipped.insert(slot, item);
        self.equips.push((owner, record));
        true
    }

    fn unequip_slot(&mut self, owner: ObjectHandle, slot: EquipmentSlot) {
        if let Some(container) = self.containers.get_mut(&owner) {
            if container.equipped.remove(&slot).is_some() {
                self.unequips.push((owner, slot));
            }
        }
    }

    fn auto_equip(&mut self, owner: ObjectHandle) {
        self.auto_equips.push(owner);
    }

    fn set_selected_enchant_item(&mut self, owner: ObjectHandle, item: Option<ItemHandle>) {
        self.containers.entry(owner).or_default().selected_enchant = item;
    }

    fn purge_effect(&mut self, owner: ObjectHandle, effect: EffectId, source: Option<&RefId>) {
        self.containers
            .entry(owner)
            .or_default()
            .purged
            .insert((source.cloned(), effect));
    }
}

// ============================================================================
// Presentation
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordingPresentation {
    pub effects: Vec<(String, Position)>,
    pub voices: Vec<(ObjectHandle, String)>,
    pub messages: Vec<String>,
    pub death_music: u32,
    pub load_requests: u32,
    pub sneak_indicator: Option<bool>,
}

impl RecordingPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn effect_count(&self, model: &str) -> usize {
        self.effects.iter().filter(|(m, _)| m == model).count()
    }
}

impl PresentationService for RecordingPresentation {
    fn spawn_effect(&mut self, model: &str, position: Position) {
        self.effects.push((model.to_string(), position));
    }

    fn play_voice(&mut self, speaker: ObjectHandle, line: &str) {
        self.voices.push((speaker, line.to_string()));
    }

    fn message_box(&mut self, text: &str) {
        self.messages.push(text.to_string());
    }

    fn play_death_music(&mut self) {
        self.death_music += 1;
    }

    fn request_load_recent_save(&mut self) {
        self.load_requests += 1;
    }

    fn set_sneak_indicator(&mut self, visible: bool) {
        self.sneak_indicator = Some(visible);
    }
}

// ============================================================================
// Mechanics manager
// ============================================================================

/// Mechanics manager with scripted answers and a log of every command.
#[derive(Clone, Debug, Default)]
pub struct ScriptedMechanics {
    aggressive: BTreeSet<(ActorId, ActorId)>,
    /// `(target, observer)` pairs where the observer fails to notice the target.
    unaware: BTreeSet<(ActorId, ActorId)>,
    /// `(actor, observer)` pairs where the observer detects the actor.
    detected: BTreeSet<(ActorId, ActorId)>,

    pub combat_started: Vec<(ActorId, ActorId)>,
    pub combat_stopped: Vec<ActorId>,
    pub kills: Vec<(ActorId, ActorId)>,
    pub murders: Vec<(ActorId, u32)>,
    pub sneak_uses: Vec<ActorId>,
}

impl ScriptedMechanics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_aggressive(&mut self, actor: ActorId, target: ActorId) {
        self.aggressive.insert((actor, target));
    }

    pub fn set_unaware(&mut self, target: ActorId, observer: ActorId) {
        self.unaware.insert((target, observer));
    }

    pub fn set_detected(&mut self, actor: ActorId, observer: ActorId) {
        self.detected.insert((actor, observer));
    }
}

impl MechanicsService for ScriptedMechanics {
    fn start_combat(&mut self, attacker: ActorId, target: ActorId) {
        self.combat_started.push((attacker, target));
    }

    fn stop_combat(&mut self, actor: ActorId) {
        self.combat_stopped.push(actor);
    }

    fn is_aggressive(&self, actor: ActorId, target: ActorId) -> bool {
        self.aggressive.contains(&(actor, target))
    }

    fn awareness_check(&self, target: ActorId, observer: ActorId) -> bool {
        !self.unaware.contains(&(target, observer))
    }

    fn is_actor_detected(&self, actor: ActorId, observer: ActorId) -> bool {
        self.detected.contains(&(actor, observer))
    }

    fn actor_killed(&mut self, victim: ActorId, killer: ActorId) {
        self.kills.push((victim, killer));
    }

    fn commit_murder(&mut self, victim: ActorId, crime_id: u32) {
        self.murders.push((victim, crime_id));
    }

    fn sneak_skill_used(&mut self, actor: ActorId) {
        self.sneak_uses.push(actor);
    }
}

// ============================================================================
// Bundle
// ============================================================================

/// Owns one of every in-memory service and lends them out as an [`Env`].
pub struct MemoryServices {
    pub world: MemoryWorld,
    pub inventory: MemoryInventory,
    pub presentation: RecordingPresentation,
    pub mechanics: ScriptedMechanics,
    pub content: ContentTables,
    pub settings: GameSettings,
    pub tables: MechanicsTables,
}

impl MemoryServices {
    /// Services over `content` with vanilla game settings.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if the default settings lack a table entry.
    pub fn new(content: ContentTables) -> Result<Self, SettingsError> {
        Self::with_settings(content, GameSettings::with_defaults())
    }

    /// # Errors
    ///
    /// Returns [`SettingsError`] if `settings` lacks a bound-item or summon id.
    pub fn with_settings(content: ContentTables, settings: GameSettings) -> Result<Self, SettingsError> {
        let tables = MechanicsTables::from_settings(&settings)?;
        Ok(Self {
            world: MemoryWorld::new(),
            inventory: MemoryInventory::new(content.clone()),
            presentation: RecordingPresentation::new(),
            mechanics: ScriptedMechanics::new(),
            content,
            settings,
            tables,
        })
    }

    pub fn env(&mut self) -> Env<'_> {
        Env::new(
            &mut self.world,
            &mut self.inventory,
            &mut self.presentation,
            &mut self.mechanics,
            &self.content,
            &self.settings,
            &self.tables,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{EffectEntry, EnchantmentRecord, ItemRecord};
    use crate::magic::{EffectKey, RangeType};
    use crate::state::{CreatureData, CreatureStats};

    fn ring_content() -> ContentTables {
        let mut content = ContentTables::new();
        content
            .add_enchantment(EnchantmentRecord::new(
                "ring_shield_en",
                EnchantmentKind::ConstantEffect,
                0,
                0,
                vec![EffectEntry::new(EffectId::Shield, RangeType::Caster, 10, 0)],
            ))
            .add_item(
                ItemRecord::new(
                    "ring_shield",
                    ItemKind::Clothing {
                        slot: EquipmentSlot::LeftRing,
                    },
                    0.1,
                )
                .with_enchantment("ring_shield_en"),
            );
        content
    }

    #[test]
    fn equipped_constant_effects_respect_purges() {
        let mut inventory = MemoryInventory::new(ring_content());
        let owner = ObjectHandle(1);
        inventory.give_equipped(owner, "ring_shield");

        let effects = inventory.equipped_effects(owner);
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].key, EffectKey::new(EffectId::Shield));
        assert_eq!(effects[0].magnitude, 10.0);

        inventory.purge_effect(owner, EffectId::Shield, Some(&RefId::new("ring_shield")));
        assert!(inventory.equipped_effects(owner).is_empty());
    }

    #[test]
    fn removing_an_equipped_item_frees_its_slot() {
        let mut inventory = MemoryInventory::new(ring_content());
        let owner = ObjectHandle(1);
        inventory.give_equipped(owner, "ring_shield");

        assert_eq!(inventory.remove(owner, &RefId::new("ring_shield"), 5), 1);
        assert!(inventory.slot(owner, EquipmentSlot::LeftRing).is_none());
    }

    #[test]
    fn spawns_clone_templates_with_fresh_identity() {
        let mut world = MemoryWorld::new();
        let template = Actor::creature(
            ActorId::NONE,
            ObjectHandle(0),
            "scamp_summon",
            CreatureStats::default(),
            CreatureData::default(),
        );
        world.add_template("scamp_summon", template);

        let first = world.spawn_near(&RefId::new("scamp_summon"), ObjectHandle(1)).unwrap();
        let second = world.spawn_near(&RefId::new("scamp_summon"), ObjectHandle(1)).unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(world.find_actor(first.id), Some(first.handle));

        world.fail_spawns_of("scamp_summon");
        assert!(matches!(
            world.spawn_near(&RefId::new("scamp_summon"), ObjectHandle(1)),
            Err(SpawnError::NoRoom(_))
        ));
    }
}
