//! Platformer character: per-tick update and accessors.
//!
//! A [`Character`] owns its position (through its collision box), velocity,
//! timers and locomotion state. Everything else it touches is borrowed for
//! the length of one tick through a [`TickContext`].

use glam::{IVec2, Vec2};
use ledge_common::PixelCoord;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::animation::SpriteFrame;
use crate::collision_box::{CollisionBox, ProbeRow};
use crate::dash::emit_burst;
use crate::error::{ControllerError, ControllerResult};
use crate::grapple::{find_grapple, grapple_step, GrappleLink, GrapplePoint, GrappleStep};
use crate::input::{Action, Controls, InputSource};
use crate::particles::{
    roll_f32, roll_range, ParticleDescriptor, ParticleEmitter, ParticleKind, ParticleTag,
};
use crate::physics::{
    apply_gravity, apply_horizontal_input, ground_ahead, integrate, resolve_all, Contacts,
    VerticalLimits,
};
use crate::state::{HookContext, LocomotionKind, LocomotionState, StateMachine, Transition};
use crate::timers::InputTimers;
use crate::tuning::MovementTuning;
use crate::world::TileWorld;

/// Horizontal facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Facing {
    /// Facing left
    Left,
    /// Facing right (default)
    #[default]
    Right,
}

impl Facing {
    /// `-1` for left, `1` for right.
    #[must_use]
    pub fn sign(self) -> i32 {
        match self {
            Facing::Left => -1,
            Facing::Right => 1,
        }
    }

    /// Facing for a non-zero horizontal sign.
    #[must_use]
    pub fn from_sign(sign: i32) -> Option<Self> {
        match sign.signum() {
            -1 => Some(Facing::Left),
            1 => Some(Facing::Right),
            _ => None,
        }
    }
}

/// Side of the most recently touched wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallSide {
    /// Wall on the left
    Left,
    /// Wall on the right
    Right,
}

/// Collaborators borrowed for one tick.
pub struct TickContext<'a, I: ?Sized, W: ?Sized, P: ?Sized> {
    /// Keyboard state; the held-key list may be edited
    pub input: &'a mut I,
    /// Tile map
    pub world: &'a W,
    /// Effects sink
    pub particles: &'a mut P,
    /// Grapple points, indexed by [`ledge_common::GrappleId`]
    pub grapples: &'a [GrapplePoint],
}

impl<'a, I: ?Sized, W: ?Sized, P: ?Sized> TickContext<'a, I, W, P> {
    /// Context without grapple points.
    pub fn new(input: &'a mut I, world: &'a W, particles: &'a mut P) -> Self {
        Self {
            input,
            world,
            particles,
            grapples: &[],
        }
    }

    /// Adds grapple points.
    #[must_use]
    pub fn with_grapples(mut self, grapples: &'a [GrapplePoint]) -> Self {
        self.grapples = grapples;
        self
    }
}

/// A player-controlled platformer character.
#[derive(Debug, Clone)]
pub struct Character {
    /// Collision box; its anchor is the position
    collision: CollisionBox,
    /// Velocity in pixels per tick
    velocity: Vec2,
    /// Facing direction
    facing: Facing,
    /// Locomotion state machine
    machine: StateMachine,
    /// Bindings and settings
    controls: Controls,
    /// Tuning, validated at spawn
    tuning: MovementTuning,
    /// Buffers, coyote timers, jump hold
    timers: InputTimers,
    /// Wall used to pick the wall-jump direction
    last_wall: Option<WallSide>,
    /// Air dash available
    has_air_dash: bool,
    /// Active grapple
    grapple: Option<GrappleLink>,
    /// Contacts sampled after the last movement
    contacts: Contacts,
    /// Effect randomness
    rng: fastrand::Rng,
    /// Ticks simulated
    tick: u64,
    /// Tick on which a key was first held
    run_started_at: Option<u64>,
}

impl Character {
    /// Spawns a character with its anchor at `position`.
    ///
    /// Fails on invalid tuning, or when the spawn point is buried so deep in
    /// solid tiles that the resolver cannot step out within its cap.
    pub fn spawn<W: TileWorld + ?Sized>(
        position: Vec2,
        tuning: MovementTuning,
        controls: Controls,
        world: &W,
        seed: u64,
    ) -> ControllerResult<Self> {
        tuning.validate()?;
        let mut collision = CollisionBox::new(position, tuning.box_offsets)?;
        let timers = InputTimers::new(
            tuning.jump_buffer_ticks,
            tuning.dash_buffer_ticks,
            tuning.ground_coyote_ticks,
            tuning.wall_coyote_ticks,
            tuning.jump_hold_ticks,
        )?;

        let mut velocity = Vec2::ZERO;
        resolve_all(world, &mut collision, &mut velocity, tuning.max_step_out).map_err(|err| {
            ControllerError::EmbeddedSpawn {
                x: position.x,
                y: position.y,
                steps: err.steps,
            }
        })?;
        let contacts = Contacts::sample(world, &collision);
        debug!(x = position.x, y = position.y, on_ground = contacts.on_ground, "character spawned");

        Ok(Self {
            collision,
            velocity,
            facing: Facing::default(),
            machine: StateMachine::new(LocomotionKind::Idle),
            controls,
            tuning,
            timers,
            last_wall: None,
            has_air_dash: true,
            grapple: None,
            contacts,
            rng: fastrand::Rng::with_seed(seed),
            tick: 0,
            run_started_at: None,
        })
    }

    /// Position (sub-pixel precision).
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.collision.anchor()
    }

    /// Velocity in pixels per tick.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Facing direction.
    #[must_use]
    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Current locomotion state.
    #[must_use]
    pub fn state(&self) -> &LocomotionState {
        self.machine.current()
    }

    /// Current locomotion kind.
    #[must_use]
    pub fn kind(&self) -> LocomotionKind {
        self.machine.kind()
    }

    /// Locomotion kind at the end of the previous tick.
    #[must_use]
    pub fn previous_kind(&self) -> LocomotionKind {
        self.machine.previous()
    }

    /// Collision box.
    #[must_use]
    pub fn collision(&self) -> &CollisionBox {
        &self.collision
    }

    /// Contacts sampled after the last movement.
    #[must_use]
    pub fn contacts(&self) -> Contacts {
        self.contacts
    }

    /// Timing windows.
    #[must_use]
    pub fn timers(&self) -> &InputTimers {
        &self.timers
    }

    /// Whether an air dash is available.
    #[must_use]
    pub fn has_air_dash(&self) -> bool {
        self.has_air_dash
    }

    /// Active grapple, if any.
    #[must_use]
    pub fn grapple(&self) -> Option<GrappleLink> {
        self.grapple
    }

    /// Most recently touched wall.
    #[must_use]
    pub fn last_wall(&self) -> Option<WallSide> {
        self.last_wall
    }

    /// Bindings and settings.
    #[must_use]
    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    /// Mutable bindings and settings.
    pub fn controls_mut(&mut self) -> &mut Controls {
        &mut self.controls
    }

    /// Tuning.
    #[must_use]
    pub fn tuning(&self) -> &MovementTuning {
        &self.tuning
    }

    /// Ticks simulated so far.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Tick on which any key was first held.
    #[must_use]
    pub fn run_started_at(&self) -> Option<u64> {
        self.run_started_at
    }

    /// Draw descriptor for the renderer.
    #[must_use]
    pub fn sprite(&self) -> SpriteFrame {
        let clip = self.machine.clip();
        let anchor = self.collision.anchor().floor();
        SpriteFrame {
            clip,
            frame: self.machine.cursor().frame(&clip),
            flip_x: self.facing == Facing::Left,
            anchor: PixelCoord::new(anchor.x as i32, anchor.y as i32),
        }
    }

    fn log_transition(&self, transition: Option<Transition>) {
        if let Some(Transition { from, to }) = transition {
            debug!(tick = self.tick, %from, %to, "locomotion transition");
        }
    }

    /// Advances the character by one fixed tick.
    pub fn tick<I, W, P>(&mut self, ctx: TickContext<'_, I, W, P>)
    where
        I: InputSource + ?Sized,
        W: TileWorld + ?Sized,
        P: ParticleEmitter + ?Sized,
    {
        let TickContext {
            input,
            world,
            particles,
            grapples,
        } = ctx;

        self.controls.handle_toggle(&*input);

        let contacts = Contacts::sample(world, &self.collision);
        if contacts.on_left {
            self.last_wall = Some(WallSide::Left);
        }
        if contacts.on_right {
            self.last_wall = Some(WallSide::Right);
        }

        self.timers.update_buffers(
            self.controls.was_pressed(&*input, Action::Jump),
            self.controls.was_pressed(&*input, Action::Dash),
        );

        self.controls.scrub_debug_keys(&mut *input);
        if self.run_started_at.is_none() && !input.down_keys_mut().is_empty() {
            self.run_started_at = Some(self.tick);
            info!(tick = self.tick, "run timer started");
        }

        let wall_sliding =
            self.machine.current().can_wall_slide() && !contacts.on_ground && contacts.on_wall();
        self.timers.update_coyote(contacts.on_ground, wall_sliding);
        if contacts.on_ground {
            self.timers.jump_hold.consume();
            let mid_dash = self
                .machine
                .current()
                .dash()
                .is_some_and(|dash| dash.frame <= self.tuning.dash_refresh_frame);
            if !mid_dash {
                self.has_air_dash = true;
            }
        }

        if !contacts.on_ground && self.controls.was_pressed(&*input, Action::Jump) {
            let middle = self.collision.middle();
            let from = Vec2::new(middle.x as f32, middle.y as f32);
            if let Some(link) = find_grapple(grapples, from) {
                debug!(tick = self.tick, id = link.id.index(), range = link.range, "grapple attached");
                self.grapple = Some(link);
            }
        }

        if let Some(mut link) = self.grapple {
            let held = self.controls.is_held(&*input, Action::Jump);
            let step = grapple_step(
                world,
                &mut link,
                grapples,
                &mut self.collision,
                &mut self.velocity,
                held,
                &self.tuning,
            );
            self.grapple = match step {
                GrappleStep::Attached => Some(link),
                GrappleStep::Released => None,
            };
        } else {
            self.ground_air_movement(&*input, world, &mut *particles, &contacts, wall_sliding);
        }

        self.settle(world);
        self.kick_dust(world, &mut *particles);

        self.machine.end_tick();
        self.tick += 1;
    }

    fn ground_air_movement<I, W, P>(
        &mut self,
        input: &I,
        world: &W,
        particles: &mut P,
        contacts: &Contacts,
        wall_sliding: bool,
    ) where
        I: InputSource + ?Sized,
        W: TileWorld + ?Sized,
        P: ParticleEmitter + ?Sized,
    {
        let held = self.controls.direction(input);

        if self.timers.dash_buffer.is_active()
            && self.has_air_dash
            && self.machine.current().allows_dash_entry()
        {
            self.timers.dash_buffer.consume();
            self.has_air_dash = false;
            let transition = self.machine.request(LocomotionKind::DashAttack);
            self.log_transition(transition);
        }

        self.update_dash(held, particles);

        apply_horizontal_input(&mut self.velocity, held.x, contacts, &self.tuning);
        apply_gravity(&mut self.velocity, contacts.on_ground, wall_sliding, &self.tuning);
        self.jump(contacts, wall_sliding);

        let jump_held = self.controls.is_held(input, Action::Jump);
        if jump_held
            && !contacts.on_ground
            && !self.timers.ground_coyote.is_active()
            && self.timers.jump_hold.is_active()
        {
            self.timers.jump_hold.tick();
            self.velocity.y = -self.tuning.jump_force;
        }
        if !jump_held && !contacts.on_ground {
            self.timers.jump_hold.consume();
        }

        let limits = if self.machine.current().dash().is_some() {
            VerticalLimits::dash(&self.tuning)
        } else if contacts.on_ground {
            VerticalLimits::grounded(&self.tuning)
        } else {
            VerticalLimits::airborne(&self.tuning)
        };
        self.velocity.y = limits.clamp(self.velocity.y);

        let hanging = self.machine.current().dash().is_some_and(|dash| !dash.committed);
        if !hanging {
            let max_steps = self.tuning.max_step_out;
            let before = self.collision.anchor();
            if let Err(err) = integrate(world, &mut self.collision, &mut self.velocity, max_steps) {
                error!(tick = self.tick, %err, "collision resolver exceeded its step cap");
                self.collision.set_anchor(before);
                self.velocity = Vec2::ZERO;
            }
        }
    }

    fn update_dash<P: ParticleEmitter + ?Sized>(&mut self, held: IVec2, particles: &mut P) {
        let windup = self.tuning.dash_windup_frames;
        let Some(dash) = self.machine.current_mut().dash_mut() else {
            return;
        };
        dash.capture(held, windup);
        if !dash.ready_to_commit(windup) {
            return;
        }

        let commit = dash.commit(self.facing.sign(), self.velocity, &self.tuning.dash);
        if let Some(facing) = Facing::from_sign(commit.direction.x) {
            self.facing = facing;
        }
        self.velocity = commit.velocity;
        emit_burst(
            particles,
            &mut self.rng,
            self.collision.center(),
            &commit,
            &self.tuning.burst,
        );
    }

    fn jump(&mut self, contacts: &Contacts, wall_sliding: bool) {
        if !self.timers.jump_buffer.is_active() {
            return;
        }

        let rule = if contacts.on_ground {
            JumpRule::Ground
        } else if self.timers.ground_coyote.is_active() {
            JumpRule::Coyote
        } else if wall_sliding || self.timers.wall_coyote.is_active() {
            JumpRule::Wall
        } else {
            return;
        };

        match rule {
            JumpRule::Ground | JumpRule::Coyote => {
                self.timers.jump_hold.seed();
                self.timers.ground_coyote.consume();
                self.velocity.y = -self.tuning.jump_force;
            }
            JumpRule::Wall => {
                self.timers.wall_coyote.consume();
                let away = match self.last_wall {
                    Some(WallSide::Left) => 1,
                    Some(WallSide::Right) => -1,
                    None => -self.facing.sign(),
                };
                self.velocity = Vec2::new(
                    away as f32 * self.tuning.wall_jump_x,
                    -self.tuning.wall_jump_y,
                );
                if let Some(facing) = Facing::from_sign(away) {
                    self.facing = facing;
                }
            }
        }
        self.timers.jump_buffer.consume();
        debug!(tick = self.tick, ?rule, velocity = ?self.velocity, "jump");
    }

    /// Post-movement: state hooks, facing and locomotion transitions from a
    /// fresh contact sample.
    fn settle<W: TileWorld + ?Sized>(&mut self, world: &W) {
        let contacts = Contacts::sample(world, &self.collision);
        self.contacts = contacts;
        let falling = self.velocity.y >= 0.0;

        let hooked = self.machine.run_hooks(
            HookContext {
                on_ground: contacts.on_ground,
                falling,
            },
            &self.tuning,
        );
        self.log_transition(hooked);

        let wall_sliding =
            self.machine.current().can_wall_slide() && !contacts.on_ground && contacts.on_wall();
        let vx = self.velocity.x;

        if contacts.on_ground {
            let locked = self
                .machine
                .current()
                .dash()
                .is_some_and(|dash| dash.frame < self.tuning.dash_facing_lock_frames);
            if !locked {
                if vx > self.tuning.flip_margin {
                    self.facing = Facing::Right;
                } else if vx < -self.tuning.flip_margin {
                    self.facing = Facing::Left;
                }
            }
        } else if wall_sliding && falling {
            self.facing = if contacts.on_left {
                Facing::Right
            } else {
                Facing::Left
            };
        }

        let target = if wall_sliding && falling {
            Some(LocomotionKind::WallSlide)
        } else if !contacts.on_ground {
            if !falling {
                Some(LocomotionKind::Jump)
            } else if ground_ahead(
                world,
                &self.collision,
                self.facing.sign(),
                self.tuning.ledge_probe,
            ) {
                None
            } else {
                Some(LocomotionKind::Fall)
            }
        } else if vx.abs() > self.tuning.run_margin
            && !(vx > 0.0 && contacts.on_right)
            && !(vx < 0.0 && contacts.on_left)
        {
            Some(LocomotionKind::Running)
        } else {
            Some(LocomotionKind::Idle)
        };

        if let Some(kind) = target {
            let transition = self.machine.request(kind);
            self.log_transition(transition);
        }
    }

    fn kick_dust<W, P>(&mut self, world: &W, particles: &mut P)
    where
        W: TileWorld + ?Sized,
        P: ParticleEmitter + ?Sized,
    {
        if !self.contacts.on_ground || self.kind() != LocomotionKind::Running {
            return;
        }
        let x = self.collision.middle().x;
        let y = self.collision.probe_y(ProbeRow::OutsideBottom) + self.tuning.dust_probe_depth;
        let Some(palette) = world
            .material_at(x, y)
            .and_then(|material| self.tuning.dust_for(material).copied())
        else {
            return;
        };
        if self.rng.f32() >= self.tuning.dust_chance {
            return;
        }

        let (color, size) = if self.rng.f32() < palette.primary_chance {
            (palette.primary, palette.primary_size)
        } else {
            (palette.secondary, palette.secondary_size)
        };
        let width = self.collision.width().max(1) as u32;
        let position = Vec2::new(
            (self.collision.left() + roll_range(&mut self.rng, (0, width)) as i32) as f32,
            (self.collision.bottom() + self.rng.i32(-2..2) + 2) as f32,
        );
        let kick = -self.facing.sign() as f32 * 0.5;
        particles.emit(ParticleDescriptor {
            kind: ParticleKind::Chunk {
                size: roll_range(&mut self.rng, size),
            },
            position,
            velocity: Vec2::new(
                roll_f32(&mut self.rng, -1.0, 1.0) * 0.5 + kick,
                roll_f32(&mut self.rng, -1.0, -0.5),
            ),
            gravity: Vec2::new(0.0, 0.05),
            lifetime: roll_range(&mut self.rng, (10, 30)),
            color,
            alpha: 1.0,
            tag: ParticleTag::Dust,
        });
    }
}

/// Which jump rule fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JumpRule {
    Ground,
    Coyote,
    Wall,
}
