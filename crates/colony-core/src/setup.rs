//! World Setup
//!
//! Seeded random worlds for the `colony` binary and for tests. Every zone
//! gets owned harvesters and haulers, a hostile or two, harvestable nodes,
//! production facilities and scattered walls. The same seed and parameters
//! always produce the same snapshot.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;

use colony_world::{
    generate_agent_id, generate_facility_id, generate_node_id, generate_zone_id, AgentSnapshot,
    AgentSpec, BodyPart, FacilitySnapshot, NodeSnapshot, Position, WorldSnapshot, ZoneSnapshot,
};

/// Shape of a generated world.
#[derive(Debug, Clone)]
pub struct WorldGenParams {
    pub zones: usize,
    pub width: i32,
    pub height: i32,
    /// Owned agents per zone; every fourth one is a hauler
    pub agents_per_zone: usize,
    pub hostiles_per_zone: usize,
    pub nodes_per_zone: usize,
    pub facilities_per_zone: usize,
    /// Chance that a free tile becomes a wall
    pub wall_density: f64,
    pub agent_energy_capacity: u32,
    pub facility_energy_capacity: u32,
    pub tick: u64,
}

impl Default for WorldGenParams {
    fn default() -> Self {
        Self {
            zones: 2,
            width: 24,
            height: 24,
            agents_per_zone: 6,
            hostiles_per_zone: 1,
            nodes_per_zone: 2,
            facilities_per_zone: 1,
            wall_density: 0.08,
            agent_energy_capacity: 50,
            facility_energy_capacity: 300,
            tick: 0,
        }
    }
}

impl WorldGenParams {
    fn entities_per_zone(&self) -> usize {
        self.agents_per_zone + self.hostiles_per_zone + self.nodes_per_zone + self.facilities_per_zone
    }
}

/// Generates a world. Entities never sit on walls; reachability between
/// them is left to chance.
pub fn generate_world(rng: &mut SmallRng, params: &WorldGenParams) -> WorldSnapshot {
    let mut world = WorldSnapshot {
        tick: params.tick,
        ..Default::default()
    };
    let wall_density = if params.wall_density.is_finite() {
        params.wall_density.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mut agent_seq = 1;
    let mut node_seq = 1;
    let mut facility_seq = 1;

    for z in 0..params.zones {
        let zone_id = generate_zone_id(z as u64 + 1);

        let mut tiles: Vec<Position> = (0..params.height)
            .flat_map(|y| (0..params.width).map(move |x| Position::new(x, y)))
            .collect();
        tiles.shuffle(rng);
        let reserved = params.entities_per_zone().min(tiles.len());
        let (occupied, free) = tiles.split_at(reserved);
        let mut spots = occupied.iter().copied();

        let mut walls: Vec<Position> = free
            .iter()
            .copied()
            .filter(|_| rng.gen_bool(wall_density))
            .collect();
        walls.sort();

        for i in 0..params.agents_per_zone {
            let Some(position) = spots.next() else { break };
            let spec = if i % 4 == 3 {
                AgentSpec::Hauler
            } else {
                AgentSpec::Harvester
            };
            world.agents.push(AgentSnapshot {
                agent_id: generate_agent_id(agent_seq),
                zone: zone_id.clone(),
                position,
                body: spec.body().to_vec(),
                owned: true,
                energy: rng.gen_range(0..=params.agent_energy_capacity),
                energy_capacity: params.agent_energy_capacity,
            });
            agent_seq += 1;
        }

        for _ in 0..params.hostiles_per_zone {
            let Some(position) = spots.next() else { break };
            world.agents.push(AgentSnapshot {
                agent_id: generate_agent_id(agent_seq),
                zone: zone_id.clone(),
                position,
                body: vec![BodyPart::Tough, BodyPart::Attack, BodyPart::Move],
                owned: false,
                energy: 0,
                energy_capacity: 0,
            });
            agent_seq += 1;
        }

        for _ in 0..params.nodes_per_zone {
            let Some(position) = spots.next() else { break };
            world.nodes.push(NodeSnapshot {
                node_id: generate_node_id(node_seq),
                zone: zone_id.clone(),
                position,
                energy: rng.gen_range(1000..=3000),
            });
            node_seq += 1;
        }

        for _ in 0..params.facilities_per_zone {
            let Some(position) = spots.next() else { break };
            world.facilities.push(FacilitySnapshot {
                facility_id: generate_facility_id(facility_seq),
                zone: zone_id.clone(),
                position,
                owned: true,
                energy: rng.gen_range(0..=params.facility_energy_capacity),
                energy_capacity: params.facility_energy_capacity,
            });
            facility_seq += 1;
        }

        world.zones.push(ZoneSnapshot {
            zone_id,
            width: params.width,
            height: params.height,
            walls,
        });
    }

    world
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn generate(seed: u64, params: &WorldGenParams) -> WorldSnapshot {
        generate_world(&mut SmallRng::seed_from_u64(seed), params)
    }

    #[test]
    fn test_same_seed_same_world() {
        let params = WorldGenParams::default();
        let a = generate(42, &params).to_json().unwrap();
        let b = generate(42, &params).to_json().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let params = WorldGenParams::default();
        let a = generate(1, &params).to_json().unwrap();
        let b = generate(2, &params).to_json().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_entity_counts() {
        let params = WorldGenParams {
            zones: 3,
            agents_per_zone: 5,
            hostiles_per_zone: 2,
            nodes_per_zone: 3,
            facilities_per_zone: 1,
            ..Default::default()
        };
        let world = generate(7, &params);

        assert_eq!(world.zones.len(), 3);
        assert_eq!(world.agents.len(), 21);
        assert_eq!(world.agents.iter().filter(|a| !a.owned).count(), 6);
        assert_eq!(world.nodes.len(), 9);
        assert_eq!(world.facilities.len(), 3);
        assert_eq!(world.controlled_zones().len(), 3);
    }

    #[test]
    fn test_entities_never_on_walls() {
        let params = WorldGenParams {
            wall_density: 0.5,
            ..Default::default()
        };
        let world = generate(99, &params);

        for zone in &world.zones {
            let walkable = |p: &Position| zone.is_walkable(p);
            let in_zone = |z: &colony_world::ZoneId| z == &zone.zone_id;
            assert!(world.agents.iter().filter(|a| in_zone(&a.zone)).all(|a| walkable(&a.position)));
            assert!(world.nodes.iter().filter(|n| in_zone(&n.zone)).all(|n| walkable(&n.position)));
            assert!(world
                .facilities
                .iter()
                .filter(|f| in_zone(&f.zone))
                .all(|f| walkable(&f.position)));
        }
    }

    #[test]
    fn test_tiny_zone_places_what_fits() {
        let params = WorldGenParams {
            zones: 1,
            width: 2,
            height: 2,
            agents_per_zone: 6,
            ..Default::default()
        };
        let world = generate(3, &params);

        assert_eq!(world.agents.len(), 4);
        assert!(world.nodes.is_empty());
        assert!(world.zones[0].walls.is_empty());
    }

    #[test]
    fn test_nan_wall_density_means_no_walls() {
        let params = WorldGenParams {
            wall_density: f64::NAN,
            ..Default::default()
        };
        let world = generate(5, &params);

        assert!(world.zones.iter().all(|z| z.walls.is_empty()));
        assert_eq!(world.agents.len(), params.zones * (params.agents_per_zone + params.hostiles_per_zone));
    }
}
