//! Arena gameplay built on the engine
//!
//! Holds the game-side components (roles and health), the wave spawner and
//! the event subscribers that turn raw collision events into damage, deaths
//! and pickups.

use arena_engine::events::DamageKind;
use arena_engine::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

/// Damage an enemy deals on contact
const CONTACT_DAMAGE: f32 = 10.0;
/// Health restored by a pickup
const PICKUP_HEAL: f32 = 25.0;
/// Wall thickness in world units
const WALL_THICKNESS: f32 = 20.0;

/// What an entity is in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The player ship
    Player,
    /// A hostile unit
    Enemy,
    /// Arena boundary
    Wall,
    /// Collectible
    Pickup,
}

impl Component for Role {}

/// Hit points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    /// Remaining hit points
    pub current: f32,
    /// Upper bound for healing
    pub max: f32,
}

impl Health {
    /// Full health
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }
}

impl Component for Health {}

/// Counters fed by event subscriptions
#[derive(Debug, Default, Clone)]
pub struct Stats {
    /// Collision events seen
    pub collisions: u64,
    /// Damage events seen
    pub damage_events: u64,
    /// Total damage dealt
    pub damage_dealt: f32,
    /// Deaths seen
    pub deaths: u64,
    /// Entities removed by the destruction flush
    pub destroyed: u64,
    /// Pickups collected
    pub pickups: u64,
    /// Waves spawned
    pub waves: u32,
}

/// Subscribe statistics handlers to the bus
pub fn track_stats(bus: &EventBus) -> Rc<RefCell<Stats>> {
    let stats = Rc::new(RefCell::new(Stats::default()));

    let sink = Rc::clone(&stats);
    bus.subscribe(
        move |_: &CollisionEvent, _: &mut EntityManager, _: &EventBus| {
            sink.borrow_mut().collisions += 1;
            Ok(())
        },
        100,
        false,
    );
    let sink = Rc::clone(&stats);
    bus.subscribe(
        move |event: &DamageEvent, _: &mut EntityManager, _: &EventBus| {
            let mut stats = sink.borrow_mut();
            stats.damage_events += 1;
            stats.damage_dealt += event.amount;
            Ok(())
        },
        100,
        false,
    );
    let sink = Rc::clone(&stats);
    bus.subscribe(
        move |event: &DeathEvent, _: &mut EntityManager, _: &EventBus| {
            log::info!("{} died (killer: {:?})", event.entity, event.killer);
            sink.borrow_mut().deaths += 1;
            Ok(())
        },
        100,
        false,
    );
    let sink = Rc::clone(&stats);
    bus.subscribe(
        move |_: &EntityDestroyedEvent, _: &mut EntityManager, _: &EventBus| {
            sink.borrow_mut().destroyed += 1;
            Ok(())
        },
        100,
        false,
    );

    stats
}

/// Spawn the four boundary walls as static boxes
pub fn spawn_walls(world: &mut World) {
    let width = world.arena.width();
    let height = world.arena.height();
    let half_w = width * 0.5 - WALL_THICKNESS * 0.5;
    let half_h = height * 0.5 - WALL_THICKNESS * 0.5;

    let walls = [
        (0.0, half_h, width, WALL_THICKNESS),
        (0.0, -half_h, width, WALL_THICKNESS),
        (half_w, 0.0, WALL_THICKNESS, height),
        (-half_w, 0.0, WALL_THICKNESS, height),
    ];
    for (x, y, w, h) in walls {
        let wall = world.spawn();
        world.entities.add_component(wall, Transform::new(x, y));
        world.entities.add_component(
            wall,
            Collider::aabb(w, h)
                .with_layers(CollisionMask::OBSTACLE, CollisionMask::ALL)
                .as_static(),
        );
        world.entities.add_component(wall, PhysicsBody::default().bouncy(1.0));
        world.entities.add_component(wall, Role::Wall);
    }
}

/// Spawn the player ship at the arena centre
pub fn spawn_player(world: &mut World) -> Entity {
    let player = world.spawn();
    world.entities.add_component(player, Transform::new(0.0, 0.0));
    world.entities.add_component(player, Velocity::new(60.0, 25.0));
    world
        .entities
        .add_component(player, PhysicsBody::with_max_speed(220.0).bouncy(0.8));
    world.entities.add_component(
        player,
        Collider::circle(15.0).with_layers(
            CollisionMask::PLAYER,
            CollisionMask::ENEMY | CollisionMask::OBSTACLE | CollisionMask::POWERUP,
        ),
    );
    world.entities.add_component(player, Health::new(100.0));
    world.entities.add_component(player, Role::Player);
    player
}

/// Spawn a healing pickup at `(x, y)`
pub fn spawn_pickup(world: &mut World, x: f32, y: f32) -> Entity {
    let pickup = world.spawn();
    world.entities.add_component(pickup, Transform::new(x, y));
    world.entities.add_component(
        pickup,
        Collider::circle(10.0)
            .with_layers(CollisionMask::POWERUP, CollisionMask::PLAYER)
            .as_trigger(),
    );
    world.entities.add_component(pickup, Role::Pickup);
    pickup
}

/// Spawns a new wave of enemies whenever the arena is clear
pub struct WaveSpawner {
    rng: StdRng,
    base_count: u32,
    wave: u32,
    stats: Rc<RefCell<Stats>>,
}

impl WaveSpawner {
    /// Spawner with a fixed seed so runs are reproducible
    pub fn new(seed: u64, base_count: u32, stats: Rc<RefCell<Stats>>) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            base_count,
            wave: 0,
            stats,
        }
    }

    fn spawn_wave(&mut self, world: &mut World) {
        self.wave += 1;
        let count = self.base_count + self.wave * 2;
        let inner = (world.arena.max - Vec2::new(WALL_THICKNESS * 2.0, WALL_THICKNESS * 2.0))
            .map(|extent| extent.max(1.0));

        for _ in 0..count {
            let x = self.rng.gen_range(-inner.x..inner.x);
            let y = self.rng.gen_range(-inner.y..inner.y);
            let heading = self.rng.gen_range(-180.0f32..180.0);
            let speed: f32 = self.rng.gen_range(40.0..120.0);

            let enemy = world.spawn();
            let transform = Transform::new(x, y).with_angle(heading);
            let drift = transform.forward() * speed;
            world.entities.add_component(enemy, transform);
            world
                .entities
                .add_component(enemy, Velocity::new(drift.x, drift.y));
            world
                .entities
                .add_component(enemy, PhysicsBody::with_max_speed(150.0).bouncy(1.0));
            world.entities.add_component(
                enemy,
                Collider::circle(12.0).with_layers(
                    CollisionMask::ENEMY,
                    CollisionMask::PLAYER | CollisionMask::ENEMY | CollisionMask::OBSTACLE,
                ),
            );
            world.entities.add_component(enemy, Health::new(30.0));
            world.entities.add_component(enemy, Role::Enemy);
        }

        let x = self.rng.gen_range(-inner.x..inner.x);
        let y = self.rng.gen_range(-inner.y..inner.y);
        spawn_pickup(world, x, y);

        self.stats.borrow_mut().waves = self.wave;
        log::info!("Wave {} spawned with {count} enemies", self.wave);
    }
}

impl System for WaveSpawner {
    fn name(&self) -> &'static str {
        "wave_spawner"
    }

    fn update(&mut self, world: &mut World, _delta_time: f32) {
        let enemies_left = world
            .entities
            .iter::<Role>()
            .any(|(entity, role)| *role == Role::Enemy && world.entities.is_alive(entity));
        if !enemies_left {
            self.spawn_wave(world);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Subscribe the contact and health rules
///
/// Collisions between the player and an enemy become a pair of
/// [`DamageEvent`]s, delivered immediately. Health handlers apply them and
/// queue a [`DeathEvent`] plus deferred destruction when hit points run out.
/// Touching a pickup heals the player and consumes the pickup.
pub fn install_rules(bus: &EventBus, stats: &Rc<RefCell<Stats>>) {
    let pickups = Rc::clone(stats);
    bus.subscribe(
        move |contact: &CollisionEvent, entities: &mut EntityManager, bus: &EventBus| {
            let role_of = |entity| entities.get_component::<Role>(entity).copied();
            let (Some(role_a), Some(role_b)) = (role_of(contact.entity_a), role_of(contact.entity_b))
            else {
                return Ok(());
            };

            match (role_a, role_b) {
                (Role::Player, Role::Enemy) | (Role::Enemy, Role::Player) => {
                    trade_blows(entities, bus, contact.entity_a, contact.entity_b);
                }
                (Role::Player, Role::Pickup) => {
                    collect(entities, &pickups, contact.entity_a, contact.entity_b);
                }
                (Role::Pickup, Role::Player) => {
                    collect(entities, &pickups, contact.entity_b, contact.entity_a);
                }
                _ => {}
            }
            Ok(())
        },
        0,
        false,
    );

    bus.subscribe(apply_damage, 0, false);
}

fn trade_blows(entities: &mut EntityManager, bus: &EventBus, a: Entity, b: Entity) {
    if !entities.is_alive(a) || !entities.is_alive(b) {
        return;
    }
    for (target, source) in [(a, b), (b, a)] {
        bus.emit(
            DamageEvent {
                target,
                source: Some(source),
                amount: CONTACT_DAMAGE,
                kind: DamageKind::Contact,
            },
            entities,
        );
    }
}

fn collect(entities: &mut EntityManager, stats: &RefCell<Stats>, player: Entity, pickup: Entity) {
    if !entities.is_alive(pickup) {
        return;
    }
    if let Some(health) = entities.get_component_mut::<Health>(player) {
        health.current = (health.current + PICKUP_HEAL).min(health.max);
    }
    entities.destroy_entity(pickup);
    stats.borrow_mut().pickups += 1;
}

/// Health subscriber: subtracts damage and schedules deaths
pub fn apply_damage(
    event: &DamageEvent,
    entities: &mut EntityManager,
    bus: &EventBus,
) -> Result<(), HandlerError> {
    if !entities.is_alive(event.target) {
        return Ok(());
    }
    let Some(health) = entities.get_component_mut::<Health>(event.target) else {
        return Ok(());
    };

    health.current -= event.amount;
    if health.current <= 0.0 {
        bus.emit_deferred(DeathEvent {
            entity: event.target,
            killer: event.source,
        });
        entities.destroy_entity(event.target);
    }
    Ok(())
}
