//! The island manager: which game element is live in each area, how much of
//! its resource is left, and when the table gets rebuilt.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::schedule::TimeBlock;
use super::select::{pick_by_inverse_cost, pick_by_rarity};
use crate::catalog::ItemCatalog;
use crate::shared::*;

/// Persisted form of the assignment table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IslandSnapshot {
    pub assignments: Vec<AreaAssignment>,
    pub last_assignment_block: TimeBlock,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct IslandManager {
    config: IslandConfig,
    elements: Vec<GameElement>,
    areas: Vec<AreaDescriptor>,
    assignments: Vec<AreaAssignment>,
    last_assignment_block: TimeBlock,
}

impl IslandManager {
    pub fn new(config: IslandConfig, elements: Vec<GameElement>, areas: Vec<AreaDescriptor>) -> Self {
        let assignments = areas.iter().map(AreaAssignment::empty).collect();
        Self {
            config,
            elements,
            areas,
            assignments,
            last_assignment_block: TimeBlock::default(),
        }
    }

    pub fn config(&self) -> &IslandConfig {
        &self.config
    }

    pub fn get_game_element_by_id(&self, id: &str) -> Option<&GameElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn elements_of_type(&self, element_type: ElementType) -> Vec<&GameElement> {
        self.elements
            .iter()
            .filter(|e| e.element_type == element_type)
            .collect()
    }

    pub fn descriptor(&self, area_id: &str) -> Option<&AreaDescriptor> {
        self.areas.iter().find(|a| a.id == area_id)
    }

    pub fn areas(&self) -> &[AreaDescriptor] {
        &self.areas
    }

    pub fn get_assignments(&self) -> &[AreaAssignment] {
        &self.assignments
    }

    pub fn assignment(&self, area_id: &str) -> Option<&AreaAssignment> {
        self.assignments.iter().find(|a| a.id == area_id)
    }

    /// The element currently live in an area, if any.
    pub fn live_element(&self, area_id: &str) -> Option<&GameElement> {
        self.assignment(area_id)
            .and_then(|a| a.game_element_id.as_deref())
            .and_then(|id| self.get_game_element_by_id(id))
    }

    pub fn last_assignment_block(&self) -> TimeBlock {
        self.last_assignment_block
    }

    pub fn has_ever_assigned(&self) -> bool {
        !self.last_assignment_block.is_unset()
    }

    // ─── Reassignment ────────────────────────────────────────────────────

    /// Rebuild the whole table if `now` is a later window than the last pass,
    /// or unconditionally when `force_now` is set. Returns whether it ran.
    pub fn assign_island_game_elements<R: Rng + ?Sized>(
        &mut self,
        force_now: bool,
        now: TimeBlock,
        catalog: &ItemCatalog,
        rng: &mut R,
    ) -> bool {
        if !force_now && now <= self.last_assignment_block {
            return false;
        }

        let previous: HashMap<&str, &AreaAssignment> = self
            .assignments
            .iter()
            .map(|a| (a.id.as_str(), a))
            .collect();
        let table: Vec<AreaAssignment> = self
            .areas
            .iter()
            .map(|area| self.reassign_area(area, previous.get(area.id.as_str()).copied(), catalog, rng))
            .collect();

        let live = table.iter().filter(|a| a.game_element_id.is_some()).count();
        self.assignments = table;
        if now > self.last_assignment_block {
            self.last_assignment_block = now;
        }

        info!(
            "[Islands] Reassigned {} areas ({} live) for window {}{}",
            self.assignments.len(),
            live,
            now.0,
            if force_now { " [forced]" } else { "" }
        );
        true
    }

    fn reassign_area<R: Rng + ?Sized>(
        &self,
        area: &AreaDescriptor,
        previous: Option<&AreaAssignment>,
        catalog: &ItemCatalog,
        rng: &mut R,
    ) -> AreaAssignment {
        let untouched = || {
            previous
                .cloned()
                .unwrap_or_else(|| AreaAssignment::empty(area))
        };
        if !area.is_managed() {
            return untouched();
        }
        let Some(element_type) = area.element_type else {
            return untouched();
        };

        let mut next = AreaAssignment::empty(area);
        match element_type {
            ElementType::Fishing => {
                if !rng.gen_bool(self.config.fishing_chance.clamp(0.0, 1.0)) {
                    return next;
                }
                let pool = self.elements_of_type(ElementType::Fishing);
                let Some(element) = pick_by_rarity(&pool, rng) else {
                    warn!("[Islands] No fishing element can be chosen for '{}'", area.id);
                    return next;
                };
                let Some(band) = pick_by_inverse_cost(&catalog.bands, |b| b.max_cost, rng) else {
                    warn!("[Islands] No cost band available for '{}'", area.id);
                    return next;
                };
                next.game_element_id = Some(element.id.clone());
                next.resource_left = element.max_resource;
                next.band = Some(AssignedBand::from(band));
                next.rod_access = Some(band.rod_access());
            }
            ElementType::Treasure => {
                if !rng.gen_bool(self.config.treasure_chance.clamp(0.0, 1.0)) {
                    return next;
                }
                let pool = self.elements_of_type(ElementType::Treasure);
                if let Some(element) = pick_by_rarity(&pool, rng) {
                    next.game_element_id = Some(element.id.clone());
                    next.resource_left = element.max_resource;
                }
            }
            ElementType::Safehouse | ElementType::Shop => {
                next.game_element_id = self.fixed_binding(area, element_type);
                next.resource_left = 0;
            }
        }
        next
    }

    fn fixed_binding(&self, area: &AreaDescriptor, element_type: ElementType) -> Option<GameElementId> {
        let id = match self.config.area_bindings.get(&area.id) {
            Some(id) => id.clone(),
            None => match element_type {
                ElementType::Safehouse => self.config.safehouse_element.clone(),
                ElementType::Shop => self.config.shop_element.clone(),
                ElementType::Fishing | ElementType::Treasure => return None,
            },
        };
        if self.get_game_element_by_id(&id).is_none() {
            warn!("[Islands] Area '{}' is bound to unknown element '{}'", area.id, id);
            return None;
        }
        Some(id)
    }

    // ─── Depletion ───────────────────────────────────────────────────────

    /// Take one unit from an area's pool. False (and no change) when the area
    /// is unknown, has nothing live, or is already empty.
    pub fn reduce_fish(&mut self, area_id: &str) -> bool {
        let Some(assignment) = self.assignments.iter_mut().find(|a| a.id == area_id) else {
            warn!("[Islands] reduce_fish on unknown area '{}'", area_id);
            return false;
        };
        if assignment.game_element_id.is_none() || assignment.resource_left == 0 {
            return false;
        }
        assignment.resource_left -= 1;
        true
    }

    pub fn is_resource_depleted(&self, area_id: &str) -> bool {
        self.assignment(area_id)
            .map_or(true, |a| a.resource_left == 0)
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    pub fn snapshot(&self) -> IslandSnapshot {
        IslandSnapshot {
            assignments: self.assignments.clone(),
            last_assignment_block: self.last_assignment_block,
        }
    }

    /// Apply a persisted table. Assignments for areas that no longer exist are
    /// dropped; new areas start empty until the next pass fills them. Fixed
    /// safehouse and shop bindings are re-applied from config.
    pub fn restore(&mut self, snapshot: IslandSnapshot) {
        let mut saved: HashMap<AreaId, AreaAssignment> = snapshot
            .assignments
            .into_iter()
            .map(|a| (a.id.clone(), a))
            .collect();

        let mut synthesized = 0;
        let table: Vec<AreaAssignment> = self
            .areas
            .iter()
            .map(|area| match saved.remove(&area.id) {
                Some(mut assignment) => {
                    assignment.area_element_type = area.element_type;
                    if !area.is_managed() {
                        return AreaAssignment::empty(area);
                    }
                    if let Some(id) = &assignment.game_element_id {
                        match self.get_game_element_by_id(id) {
                            None => {
                                warn!("[Islands] Dropping unknown element '{}' from '{}'", id, area.id);
                                assignment = AreaAssignment::empty(area);
                            }
                            Some(element) if Some(element.element_type) != area.element_type => {
                                info!("[Islands] Area '{}' changed type; clearing '{}'", area.id, id);
                                assignment = AreaAssignment::empty(area);
                            }
                            Some(_) => {}
                        }
                    }
                    assignment
                }
                None => {
                    synthesized += 1;
                    AreaAssignment::empty(area)
                }
            })
            .map(|mut assignment| {
                if let Some(area) = self.descriptor(&assignment.id).filter(|a| a.is_managed()) {
                    if let Some(t @ (ElementType::Safehouse | ElementType::Shop)) = area.element_type {
                        assignment.game_element_id = self.fixed_binding(area, t);
                        assignment.resource_left = 0;
                    }
                }
                assignment
            })
            .collect();

        if !saved.is_empty() {
            info!("[Islands] Pruned {} stale area assignments", saved.len());
        }
        if synthesized > 0 {
            info!("[Islands] {} new areas start unassigned", synthesized);
        }
        self.assignments = table;
        self.last_assignment_block = snapshot.last_assignment_block;
    }
}
