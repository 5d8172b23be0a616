//! Zone resource catalog.

use colony_world::ZoneId;

use crate::resources::ResourceBundle;
use crate::world::WorldView;

/// Collects every resource the controller can hand out in a zone: owned
/// agents, nodes, owned facilities, and the energy stored in those
/// facilities.
pub fn snapshot<W: WorldView + ?Sized>(world: &W, zone: &ZoneId) -> ResourceBundle {
    let facilities = world.owned_facilities(zone);
    let energy = facilities.iter().map(|f| u64::from(f.energy)).sum();

    ResourceBundle::new(
        world
            .owned_agents(zone)
            .into_iter()
            .map(|a| a.agent_id.clone()),
        world.nodes(zone).into_iter().map(|n| n.node_id.clone()),
        facilities.into_iter().map(|f| f.facility_id.clone()),
        energy,
    )
}
