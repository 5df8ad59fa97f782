//! Per-frame driver that runs the world and every system in a fixed order.

use std::time::Duration;

use mine_squad_core::{Command, Direction, Event, InputDevice, LevelStatus, TICKS_PER_SECOND};
use mine_squad_system_behavior::Behavior;
use mine_squad_system_lifecycle::Lifecycle;
use mine_squad_world::{self as world, query, World};

/// Player intents collected for a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct FrameInput {
    pub(crate) movement: Option<Direction>,
    pub(crate) beacon: bool,
    pub(crate) fire: bool,
}

impl FrameInput {
    /// Decodes one script symbol. `U`, `D`, `L` and `R` move, `B` places a
    /// beacon, `F` fires and `.` idles.
    pub(crate) fn from_symbol(symbol: char) -> Option<Self> {
        let movement = |direction| Self {
            movement: Some(direction),
            ..Self::default()
        };
        match symbol.to_ascii_uppercase() {
            'U' => Some(movement(Direction::Up)),
            'D' => Some(movement(Direction::Down)),
            'L' => Some(movement(Direction::Left)),
            'R' => Some(movement(Direction::Right)),
            'B' => Some(Self {
                beacon: true,
                ..Self::default()
            }),
            'F' => Some(Self {
                fire: true,
                ..Self::default()
            }),
            '.' => Some(Self::default()),
            _ => None,
        }
    }
}

/// Owns the world plus the systems and runs one frame at a time.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    behavior: Behavior,
    lifecycle: Lifecycle,
    device: InputDevice,
    frame_time: Duration,
}

impl Session {
    pub(crate) fn new(
        world: World,
        behavior: Behavior,
        lifecycle: Lifecycle,
        device: InputDevice,
    ) -> Self {
        Self {
            world,
            behavior,
            lifecycle,
            device,
            frame_time: Duration::from_secs(1) / TICKS_PER_SECOND,
        }
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn status(&self) -> LevelStatus {
        query::level_status(&self.world)
    }

    /// Runs one frame: player movement, beacon and fire intents, the tick,
    /// enemy decisions and finally respawns. Returns every event in order.
    pub(crate) fn frame(&mut self, input: FrameInput) -> Vec<Event> {
        let mut log = Vec::new();

        if let Some(direction) = input.movement {
            world::apply(
                &mut self.world,
                Command::MovePlayer {
                    direction,
                    device: self.device,
                },
                &mut log,
            );
        }
        if input.beacon {
            world::apply(&mut self.world, Command::PlaceBeacon, &mut log);
        }
        if input.fire {
            world::apply(&mut self.world, Command::Fire, &mut log);
        }

        let mut pending = Vec::new();
        world::apply(
            &mut self.world,
            Command::Tick {
                dt: self.frame_time,
            },
            &mut pending,
        );

        while !pending.is_empty() {
            let commands = self.react(&pending);
            log.append(&mut pending);
            for command in commands {
                world::apply(&mut self.world, command, &mut pending);
            }
        }

        log
    }

    /// Feeds events to the behaviour system, then to the lifecycle system.
    fn react(&mut self, events: &[Event]) -> Vec<Command> {
        let enemies = query::enemy_view(&self.world);
        let player = query::player(&self.world).tile;
        let mut commands = Vec::new();

        let world = &self.world;
        self.behavior.handle(
            events,
            &enemies,
            player,
            |from, direction| query::probe_move(world, from, direction),
            &mut commands,
        );
        self.lifecycle
            .handle(events, &enemies, player, &mut commands);
        commands
    }
}
