//! Blocker evaluation and the minigame start gate.
//!
//! Blockers are recomputed on every call; the caller replaces whatever set it
//! held before with the returned one.

use bevy::prelude::*;

use super::manager::IslandManager;
use crate::catalog::ItemCatalog;
use crate::inventory::{Inventory, RodStorage};
use crate::shared::*;

/// Everything outside the engine that gating reads.
#[derive(Debug, Clone, Copy)]
pub struct BlockerContext<'a> {
    pub catalog: &'a ItemCatalog,
    pub inventory: Option<&'a Inventory>,
    pub rods: Option<&'a RodStorage>,
    pub energy: u32,
}

/// Why a minigame did not start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartRejection {
    /// Area unknown, or nothing playable is live there.
    NotPlayable,
    Blocked(BlockerSet),
}

impl IslandManager {
    pub fn evaluate_blockers(&self, area_id: &str, ctx: &BlockerContext) -> BlockerSet {
        let mut blockers = BlockerSet::new();
        let Some(area) = self.descriptor(area_id) else {
            warn!("[Islands] Blockers requested for unknown area '{}'", area_id);
            return blockers;
        };
        let Some(element_type) = area.element_type else {
            return blockers;
        };

        if area.behavior == ResourceBehavior::Depletable && self.is_resource_depleted(area_id) {
            blockers.insert(Blocker::Depletion);
        }

        if element_type.awards_items() && ctx.inventory.is_some_and(Inventory::is_inventory_full) {
            blockers.insert(Blocker::InventoryFull);
        }

        if let Some(element) = self.live_element(area_id) {
            if ctx.energy < element.energy_cost {
                blockers.insert(Blocker::NoEnergy);
            }
        }

        match element_type {
            ElementType::Fishing => {
                let rule = self.assignment(area_id).and_then(|a| a.rod_access.as_ref());
                if let Some(rule) = rule {
                    if !rod_satisfies(rule, ctx) {
                        blockers.insert(Blocker::InsufficientRod);
                    }
                }
            }
            ElementType::Treasure | ElementType::Safehouse | ElementType::Shop => {}
        }

        blockers
    }

    /// Gate and pay for a minigame. Energy is only spent on success.
    pub fn start_minigame(
        &self,
        area_id: &str,
        ctx: &BlockerContext,
        energy: &mut PlayerEnergy,
    ) -> Result<GameElementId, StartRejection> {
        let Some(element) = self.live_element(area_id) else {
            return Err(StartRejection::NotPlayable);
        };
        if !element.element_type.awards_items() {
            return Err(StartRejection::NotPlayable);
        }

        let blockers = self.evaluate_blockers(area_id, ctx);
        if !blockers.is_empty() {
            return Err(StartRejection::Blocked(blockers));
        }
        if !energy.spend(element.energy_cost) {
            return Err(StartRejection::Blocked(BlockerSet::from([Blocker::NoEnergy])));
        }

        info!(
            "[Islands] Starting '{}' at '{}' (energy left {})",
            element.id, area_id, energy.current
        );
        Ok(element.id.clone())
    }
}

/// Whether the active rod passes an area's rule. Missing inventory or rod
/// storage fails closed, the same as having the wrong rod.
pub fn rod_satisfies(rule: &RodAccessRule, ctx: &BlockerContext) -> bool {
    let (Some(_inventory), Some(rods)) = (ctx.inventory, ctx.rods) else {
        return false;
    };
    let Some(rod_id) = rods.active_rod_id() else {
        return false;
    };

    match rule {
        RodAccessRule::AllowList(ids) => ids.iter().any(|id| id == rod_id),
        RodAccessRule::MinClass(required) => ctx.catalog.rod_class(rod_id) >= *required,
        RodAccessRule::Ability(token) => ctx.catalog.get(rod_id).is_some_and(|item| {
            item.rod.as_ref().is_some_and(|p| p.has_ability(token))
                || item
                    .special_effect
                    .as_deref()
                    .is_some_and(|effect| effect.contains(token.as_str()))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::islands::manager::tests::{fishing_area, test_catalog, test_elements};
    use crate::islands::manager::IslandSnapshot;
    use crate::islands::schedule::TimeBlock;
    use std::collections::BTreeSet;

    fn rod_item(id: &str, class: u32, abilities: &[&str]) -> ItemDef {
        ItemDef {
            id: id.to_string(),
            name: id.to_string(),
            kind: ItemKind::Rod,
            cost: None,
            special_effect: None,
            rod: Some(RodProfile {
                class,
                abilities: abilities.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            }),
            durability: None,
            collectible_set: None,
        }
    }

    fn setup(rule: RodAccessRule) -> (IslandManager, ItemCatalog) {
        let mut manager =
            IslandManager::new(IslandConfig::default(), test_elements(), vec![fishing_area("reef")]);
        manager.restore(IslandSnapshot {
            assignments: vec![AreaAssignment {
                id: "reef".into(),
                area_element_type: Some(ElementType::Fishing),
                game_element_id: Some("fishing-classic".into()),
                resource_left: 3,
                band: None,
                rod_access: Some(rule),
            }],
            last_assignment_block: TimeBlock(1),
        });

        let mut catalog = test_catalog();
        for item in [
            rod_item("rod-two", 2, &[]),
            rod_item("rod-three", 3, &[]),
            rod_item("rod-deep", 1, &["deepwater"]),
        ] {
            catalog.items.insert(item.id.clone(), item);
        }
        (manager, catalog)
    }

    fn rods_with(active: &str) -> RodStorage {
        let mut rods = RodStorage::default();
        assert!(rods.add_rod(active));
        rods
    }

    #[test]
    fn test_insufficient_rod_by_class() {
        let (manager, catalog) = setup(RodAccessRule::MinClass(3));
        let inventory = Inventory::default();

        let weak = rods_with("rod-two");
        let ctx = BlockerContext {
            catalog: &catalog,
            inventory: Some(&inventory),
            rods: Some(&weak),
            energy: 10,
        };
        assert!(manager.evaluate_blockers("reef", &ctx).contains(&Blocker::InsufficientRod));

        let strong = rods_with("rod-three");
        let ctx = BlockerContext {
            rods: Some(&strong),
            ..ctx
        };
        assert!(manager.evaluate_blockers("reef", &ctx).is_empty());
    }

    #[test]
    fn test_no_active_rod_always_blocks() {
        let (manager, catalog) = setup(RodAccessRule::MinClass(0));
        let inventory = Inventory::default();
        let rods = RodStorage::default();
        let ctx = BlockerContext {
            catalog: &catalog,
            inventory: Some(&inventory),
            rods: Some(&rods),
            energy: 10,
        };
        assert!(manager.evaluate_blockers("reef", &ctx).contains(&Blocker::InsufficientRod));
    }

    #[test]
    fn test_missing_inventory_fails_closed() {
        let (manager, catalog) = setup(RodAccessRule::MinClass(1));
        let rods = rods_with("rod-three");
        let ctx = BlockerContext {
            catalog: &catalog,
            inventory: None,
            rods: Some(&rods),
            energy: 10,
        };
        assert!(manager.evaluate_blockers("reef", &ctx).contains(&Blocker::InsufficientRod));
    }

    #[test]
    fn test_allow_list_and_ability_rules() {
        let inventory = Inventory::default();

        let (manager, catalog) = setup(RodAccessRule::AllowList(vec!["rod-two".into()]));
        let rods = rods_with("rod-two");
        let ctx = BlockerContext {
            catalog: &catalog,
            inventory: Some(&inventory),
            rods: Some(&rods),
            energy: 10,
        };
        assert!(manager.evaluate_blockers("reef", &ctx).is_empty());
        let other = rods_with("rod-three");
        let ctx = BlockerContext { rods: Some(&other), ..ctx };
        assert!(manager.evaluate_blockers("reef", &ctx).contains(&Blocker::InsufficientRod));

        let (manager, catalog) = setup(RodAccessRule::Ability("deepwater".into()));
        let deep = rods_with("rod-deep");
        let ctx = BlockerContext {
            catalog: &catalog,
            inventory: Some(&inventory),
            rods: Some(&deep),
            energy: 10,
        };
        assert!(manager.evaluate_blockers("reef", &ctx).is_empty());
    }

    #[test]
    fn test_depletion_full_inventory_and_energy() {
        let (mut manager, catalog) = setup(RodAccessRule::MinClass(1));
        let mut inventory = Inventory::with_capacity(2);
        inventory.add_item("pebble", 2);
        let rods = rods_with("rod-three");
        while manager.reduce_fish("reef") {}

        let ctx = BlockerContext {
            catalog: &catalog,
            inventory: Some(&inventory),
            rods: Some(&rods),
            energy: 0,
        };
        let blockers = manager.evaluate_blockers("reef", &ctx);
        assert_eq!(
            blockers,
            BlockerSet::from([Blocker::Depletion, Blocker::InventoryFull, Blocker::NoEnergy])
        );
    }

    #[test]
    fn test_start_minigame_spends_energy_only_when_clear() {
        let (manager, catalog) = setup(RodAccessRule::MinClass(3));
        let inventory = Inventory::default();
        let weak = rods_with("rod-two");
        let mut energy = PlayerEnergy::default();

        let ctx = BlockerContext {
            catalog: &catalog,
            inventory: Some(&inventory),
            rods: Some(&weak),
            energy: energy.current,
        };
        let result = manager.start_minigame("reef", &ctx, &mut energy);
        assert_eq!(
            result,
            Err(StartRejection::Blocked(BlockerSet::from([Blocker::InsufficientRod])))
        );
        assert_eq!(energy.current, DEFAULT_MAX_ENERGY);

        let strong = rods_with("rod-three");
        let ctx = BlockerContext { rods: Some(&strong), ..ctx };
        assert_eq!(
            manager.start_minigame("reef", &ctx, &mut energy),
            Ok("fishing-classic".to_string())
        );
        assert_eq!(energy.current, DEFAULT_MAX_ENERGY - 1);
    }

    #[test]
    fn test_start_minigame_without_live_element() {
        let manager =
            IslandManager::new(IslandConfig::default(), test_elements(), vec![fishing_area("empty")]);
        let catalog = test_catalog();
        let mut energy = PlayerEnergy::default();
        let ctx = BlockerContext {
            catalog: &catalog,
            inventory: None,
            rods: None,
            energy: energy.current,
        };
        assert_eq!(
            manager.start_minigame("empty", &ctx, &mut energy),
            Err(StartRejection::NotPlayable)
        );
    }
}
