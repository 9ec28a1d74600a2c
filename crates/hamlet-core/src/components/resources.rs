//! Resource nodes (food, wood, berry bushes) and houses.
//!
//! Quantities stay in `[0, capacity]`. A node whose quantity reaches zero
//! is depleted and gets removed or replaced by the resource upkeep system.
//! `collector` and `owner` are non-owning references, checked for liveness
//! before use.

use hamlet_logic::constants::resources::*;
use hecs::Entity;
use serde::{Deserialize, Serialize};

/// A single food item, eaten whole on contact.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Food {
    pub nutrition: f32,
    pub size: f32,
}

impl Food {
    pub fn new(nutrition: f32, size: f32) -> Self {
        Self { nutrition, size }
    }
}

/// A wood pile harvested in chunks by one collector at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wood {
    pub amount: f32,
    pub capacity: f32,
    /// Collection progress in `0..COLLECTION_COMPLETE`.
    pub progress: f32,
    pub collector: Option<Entity>,
}

impl Wood {
    pub fn new(amount: f32) -> Self {
        let amount = amount.max(0.0);
        Self {
            amount,
            capacity: amount,
            progress: 0.0,
            collector: None,
        }
    }

    /// Claim the pile for `agent`. Fails if someone else holds the claim.
    ///
    /// Re-claiming by the current collector keeps the progress made so far.
    pub fn try_claim(&mut self, agent: Entity) -> bool {
        match self.collector {
            Some(current) if current == agent => true,
            Some(_) => false,
            None => {
                self.collector = Some(agent);
                self.progress = 0.0;
                true
            }
        }
    }

    pub fn start_collection(&mut self, agent: Entity) -> bool {
        self.try_claim(agent)
    }

    pub fn is_claimed_by(&self, agent: Entity) -> bool {
        self.collector == Some(agent)
    }

    /// Advance collection and return the wood harvested this call.
    ///
    /// Progress only accumulates while claimed. On completion yields
    /// `min(amount, WOOD_HARVEST_CAP)` and releases the claim.
    pub fn update_collection(&mut self, delta: f32) -> f32 {
        if self.collector.is_none() || self.is_depleted() {
            return 0.0;
        }
        self.progress += delta.max(0.0);
        if self.progress < COLLECTION_COMPLETE {
            return 0.0;
        }
        let harvested = self.amount.min(WOOD_HARVEST_CAP);
        self.amount -= harvested;
        self.progress = 0.0;
        self.collector = None;
        harvested
    }

    pub fn cancel_collection(&mut self) {
        self.collector = None;
        self.progress = 0.0;
    }

    /// Put back wood that did not fit into a collector's inventory.
    pub fn return_wood(&mut self, amount: f32) {
        self.amount = (self.amount + amount.max(0.0)).min(self.capacity);
    }

    pub fn is_depleted(&self) -> bool {
        self.amount <= 0.0
    }
}

/// Slowly regrowing berry source used by organisms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BerryBush {
    /// Fraction of a full bush, `0.0..=1.0`.
    pub berries: f32,
    pub regrow_rate: f32,
}

impl Default for BerryBush {
    fn default() -> Self {
        Self::new(BERRY_REGROW_RATE)
    }
}

impl BerryBush {
    pub fn new(regrow_rate: f32) -> Self {
        Self {
            berries: 1.0,
            regrow_rate,
        }
    }

    /// Take up to `amount` berries and return what was taken.
    pub fn harvest(&mut self, amount: f32) -> f32 {
        let taken = amount.max(0.0).min(self.berries);
        self.berries -= taken;
        taken
    }

    /// Regrow a partially eaten bush. An empty bush stays empty.
    pub fn update(&mut self) {
        if self.berries > 0.0 && self.berries < 1.0 {
            self.berries = (self.berries + self.regrow_rate).min(1.0);
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.berries <= 0.0
    }
}

/// A house under construction or finished.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct House {
    pub wood_stored: f32,
    pub wood_required: f32,
    /// Percentage in `0..=100`, derived from stored wood.
    pub construction_progress: f32,
    pub is_complete: bool,
    pub is_construction_site: bool,
    pub owner: Option<Entity>,
    pub size: f32,
}

impl Default for House {
    fn default() -> Self {
        Self::new(HOUSE_WOOD_REQUIRED)
    }
}

impl House {
    pub fn new(wood_required: f32) -> Self {
        Self {
            wood_stored: 0.0,
            wood_required: wood_required.max(f32::EPSILON),
            construction_progress: 0.0,
            is_complete: false,
            is_construction_site: true,
            owner: None,
            size: HOUSE_SIZE,
        }
    }

    /// Store wood and return how much was accepted.
    pub fn add_wood(&mut self, amount: f32) -> f32 {
        let room = (self.wood_required - self.wood_stored).max(0.0);
        let accepted = amount.max(0.0).min(room);
        self.wood_stored += accepted;
        self.construction_progress =
            (self.wood_stored / self.wood_required * 100.0).min(100.0);
        if self.wood_stored >= HOUSE_SITE_WOOD {
            self.is_construction_site = false;
        }
        if self.construction_progress >= 100.0 {
            self.is_complete = true;
        }
        accepted
    }

    pub fn set_owner(&mut self, owner: Option<Entity>) {
        self.owner = owner;
    }

    pub fn is_owned_by(&self, agent: Entity) -> bool {
        self.owner == Some(agent)
    }

    pub fn wood_needed(&self) -> f32 {
        (self.wood_required - self.wood_stored).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hecs::World;

    fn two_agents() -> (Entity, Entity) {
        let mut world = World::new();
        (world.spawn(()), world.spawn(()))
    }

    #[test]
    fn test_wood_harvest_small_pile() {
        let (agent, _) = two_agents();
        let mut wood = Wood::new(5.0);
        assert!(wood.start_collection(agent));
        assert_eq!(wood.update_collection(100.0), 5.0);
        assert!(wood.is_depleted());
        assert_eq!(wood.collector, None);
        assert_eq!(wood.progress, 0.0);
    }

    #[test]
    fn test_wood_harvest_capped_once() {
        let (agent, _) = two_agents();
        let mut wood = Wood::new(12.0);
        wood.try_claim(agent);
        let mut total = 0.0;
        for _ in 0..49 {
            total += wood.update_collection(2.0);
        }
        assert_eq!(total, 0.0);
        assert_eq!(wood.update_collection(2.0), 5.0);
        assert_eq!(wood.amount, 7.0);
        // Claim released: no further progress until reclaimed.
        assert_eq!(wood.update_collection(100.0), 0.0);
    }

    #[test]
    fn test_wood_claim_is_exclusive() {
        let (a, b) = two_agents();
        let mut wood = Wood::new(10.0);
        assert!(wood.try_claim(a));
        wood.update_collection(30.0);
        assert!(!wood.try_claim(b));
        assert!(wood.try_claim(a));
        assert_eq!(wood.progress, 30.0);
        wood.cancel_collection();
        assert_eq!(wood.progress, 0.0);
        assert!(wood.try_claim(b));
    }

    #[test]
    fn test_wood_return_capped() {
        let mut wood = Wood::new(8.0);
        wood.amount = 3.0;
        wood.return_wood(2.0);
        assert_eq!(wood.amount, 5.0);
        wood.return_wood(50.0);
        assert_eq!(wood.amount, 8.0);
    }

    #[test]
    fn test_berry_bush_regrow() {
        let mut bush = BerryBush::new(0.001);
        assert_eq!(bush.harvest(0.3), 0.3);
        let before = bush.berries;
        bush.update();
        assert!((bush.berries - (before + 0.001)).abs() < 1e-6);
        bush.berries = 0.9995;
        bush.update();
        assert_eq!(bush.berries, 1.0);
        assert!((bush.harvest(5.0) - 1.0).abs() < 1e-6);
        assert!(bush.is_depleted());
        bush.update();
        assert!(bush.is_depleted());
    }

    #[test]
    fn test_house_completes_exactly() {
        let mut house = House::new(15.0);
        assert!(house.is_construction_site);
        assert_eq!(house.add_wood(15.0), 15.0);
        assert_eq!(house.construction_progress, 100.0);
        assert!(house.is_complete);
        assert!(!house.is_construction_site);
    }

    #[test]
    fn test_house_progress_monotonic() {
        let mut house = House::default();
        let mut last = 0.0;
        for _ in 0..20 {
            house.add_wood(1.0);
            assert!(house.construction_progress >= last);
            last = house.construction_progress;
        }
        assert_eq!(house.wood_stored, 15.0);
        assert!(house.is_complete);
        assert_eq!(house.add_wood(3.0), 0.0);
        assert!(house.is_complete);
    }

    #[test]
    fn test_house_site_flag() {
        let mut house = House::default();
        house.add_wood(4.0);
        assert!(house.is_construction_site);
        house.add_wood(1.0);
        assert!(!house.is_construction_site);
    }
}
