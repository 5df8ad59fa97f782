//! Player energy and invincibility, enemy health, death and respawn.

use std::time::Duration;

use mine_squad_core::{
    Direction, EnemyId, EnemySnapshot, EnemySpawn, Health, MovementKind, PickupKind,
    PlayerSnapshot, TileCoord,
};

use crate::motion::Motion;

/// Energy the player starts each level with.
pub(crate) const PLAYER_ENERGY: u32 = 10;
/// Ticks the player needs to cross one tile.
pub(crate) const PLAYER_MOVE_DURATION: u32 = 8;
/// How long damage is ignored after the player was hurt.
pub(crate) const INVINCIBILITY: Duration = Duration::from_millis(2_500);
/// Bullets added by an ammo pickup.
pub(crate) const AMMO_ROUND: u32 = 20;
/// Ammo pickups never raise the magazine above this.
pub(crate) const MAX_AMMO: u32 = 50;
const BLINK_WINDOW_MS: u128 = 100;

#[derive(Clone, Debug)]
pub(crate) struct Player {
    pub(crate) motion: Motion,
    energy: u32,
    ammo: u32,
    score: u32,
    invincible_since: Option<Duration>,
}

impl Player {
    pub(crate) fn new(spawn: TileCoord, ammo: u32) -> Self {
        Self {
            motion: Motion::new(spawn, Direction::Up, PLAYER_MOVE_DURATION),
            energy: PLAYER_ENERGY,
            ammo,
            score: 0,
            invincible_since: None,
        }
    }

    pub(crate) fn energy(&self) -> u32 {
        self.energy
    }

    pub(crate) fn is_invincible(&self) -> bool {
        self.invincible_since.is_some()
    }

    /// Removes energy unless the player is invincible. Returns the energy left
    /// when the damage landed.
    pub(crate) fn damage(&mut self, amount: u32, now: Duration) -> Option<u32> {
        if self.is_invincible() {
            return None;
        }
        Some(self.force_damage(amount, now))
    }

    /// Removes energy regardless of invincibility and restarts the window.
    pub(crate) fn force_damage(&mut self, amount: u32, now: Duration) -> u32 {
        self.energy = self.energy.saturating_sub(amount);
        self.invincible_since = Some(now);
        self.energy
    }

    /// Ends the invincibility window once it has run its course.
    pub(crate) fn expire_invincibility(&mut self, now: Duration) -> bool {
        match self.invincible_since {
            Some(since) if now.saturating_sub(since) >= INVINCIBILITY => {
                self.invincible_since = None;
                true
            }
            _ => false,
        }
    }

    /// Spends one bullet if any are left.
    pub(crate) fn take_ammo(&mut self) -> bool {
        if self.ammo == 0 {
            return false;
        }
        self.ammo -= 1;
        true
    }

    pub(crate) fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Applies the effect of a pickup the player walked over.
    pub(crate) fn collect(&mut self, kind: PickupKind, now: Duration) {
        match kind {
            PickupKind::Life => self.energy = PLAYER_ENERGY,
            PickupKind::Shield => self.invincible_since = Some(now),
            PickupKind::Ammo => {
                let refilled = self.ammo.saturating_add(AMMO_ROUND).min(MAX_AMMO);
                self.ammo = refilled.max(self.ammo);
            }
            PickupKind::Candy | PickupKind::Apple | PickupKind::Chocolate | PickupKind::Coin => {
                self.add_score(kind.points());
            }
        }
    }

    fn is_visible(&self, now: Duration) -> bool {
        match self.invincible_since {
            Some(since) => (now.saturating_sub(since).as_millis() / BLINK_WINDOW_MS) % 2 == 0,
            None => true,
        }
    }

    pub(crate) fn snapshot(&self, now: Duration) -> PlayerSnapshot {
        PlayerSnapshot {
            tile: self.motion.tile(),
            render_position: self.motion.render_position(),
            facing: self.motion.facing(),
            moving: self.motion.is_moving(),
            energy: self.energy,
            ammo: self.ammo,
            score: self.score,
            invincible: self.is_invincible(),
            visible: self.is_visible(now),
        }
    }
}

/// Result of a single hit on an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HitOutcome {
    Ignored,
    Wounded(Health),
    Died,
}

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    id: EnemyId,
    spawn: EnemySpawn,
    pub(crate) motion: Motion,
    health: Health,
    died_at: Option<Duration>,
}

impl Enemy {
    pub(crate) fn new(id: EnemyId, spawn: EnemySpawn) -> Self {
        Self {
            id,
            motion: Motion::new(spawn.spawn, Direction::Down, spawn.move_duration),
            health: spawn.health,
            spawn,
            died_at: None,
        }
    }

    pub(crate) fn id(&self) -> EnemyId {
        self.id
    }

    pub(crate) fn kind(&self) -> MovementKind {
        self.spawn.kind
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.died_at.is_some()
    }

    /// Applies one hit. Dead enemies ignore hits.
    pub(crate) fn hit(&mut self, now: Duration) -> HitOutcome {
        if self.is_dead() {
            return HitOutcome::Ignored;
        }
        self.health = self.health.decremented();
        if self.health.is_zero() {
            self.died_at = Some(now);
            HitOutcome::Died
        } else {
            HitOutcome::Wounded(self.health)
        }
    }

    /// Restores spawn tile, facing and health. Returns `false` for live enemies.
    pub(crate) fn respawn(&mut self) -> bool {
        if !self.is_dead() {
            return false;
        }
        self.motion.reset(self.spawn.spawn, Direction::Down);
        self.health = self.spawn.health;
        self.died_at = None;
        true
    }

    pub(crate) fn spawn_tile(&self) -> TileCoord {
        self.spawn.spawn
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.spawn.kind,
            tile: self.motion.tile(),
            spawn: self.spawn.spawn,
            render_position: self.motion.render_position(),
            facing: self.motion.facing(),
            moving: self.motion.is_moving(),
            health: self.health,
            is_dead: self.is_dead(),
            died_at: self.died_at,
        }
    }
}
