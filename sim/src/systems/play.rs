//! Play mode - per-tick behavior of placed deployables.

use bevy_ecs::prelude::*;

use crate::components::{AnchorCell, PlayTicks};
use crate::properties::DeployableProperties;

/// Global editor tick counter. Increments once per `ArenaWorld::update`.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct EditorTick(pub u64);

impl EditorTick {
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

/// Advances `PlayTicks` on every placed, active deployable.
pub fn play_tick_system(mut query: Query<(&DeployableProperties, &AnchorCell, &mut PlayTicks)>) {
    for (props, anchor, mut ticks) in query.iter_mut() {
        if props.active && anchor.is_placed() {
            ticks.0 += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellIndex;

    #[test]
    fn test_play_ticks_only_active_placed() {
        let mut world = World::new();

        let active = world
            .spawn((
                DeployableProperties::default(),
                AnchorCell(Some(CellIndex::new(0, 0))),
                PlayTicks::default(),
            ))
            .id();
        let inactive = world
            .spawn((
                DeployableProperties {
                    active: false,
                    ..Default::default()
                },
                AnchorCell(Some(CellIndex::new(1, 0))),
                PlayTicks::default(),
            ))
            .id();
        let lifted = world
            .spawn((DeployableProperties::default(), AnchorCell(None), PlayTicks::default()))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(play_tick_system);
        schedule.run(&mut world);
        schedule.run(&mut world);

        assert_eq!(world.get::<PlayTicks>(active).unwrap().0, 2);
        assert_eq!(world.get::<PlayTicks>(inactive).unwrap().0, 0);
        assert_eq!(world.get::<PlayTicks>(lifted).unwrap().0, 0);
    }
}
