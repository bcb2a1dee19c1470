//! The settling engine.
//!
//! Owns a [`World`] with one body per class. `build` seeds bodies from the hierarchy planner and
//! warms the world up; afterwards the caller drives it with [`SettlingEngine::step`] once per
//! frame and reads the layout back with [`SettlingEngine::placed`].
//!
//! Stepping is demand-driven: resize animations, an active drag, or a pending settle countdown
//! keep the engine running. Once none of those remain, `step` is a no-op until something calls
//! [`SettlingEngine::request_settle`] again.

use crate::anim::ResizeAnimation;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::world::{BodyDef, BodyHandle, BodyKind, ColliderHandle, Vec2, World};
use indexmap::IndexMap;
use trellis_core::{
    BlockSizes, DiagramClass, ExpandedFlags, PlacedBlock, PlacedDiagram, Point, PositionMap, Rect,
    Size, point, size,
};
use trellis_hierarchy::{PlacementInput, place};

/// Caller-chosen identity of the diagram a build came from. Rebuilding with the same key keeps
/// every block where it currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagramKey(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyState {
    Free,
    Dragged,
    Resizing,
}

#[derive(Debug, Clone)]
struct SimBody {
    body: BodyHandle,
    collider: ColliderHandle,
    size: Size,
    margin: f64,
    expanded: bool,
    state: BodyState,
}

#[derive(Debug, Default)]
pub struct SettlingEngine {
    config: EngineConfig,
    world: Option<World>,
    key: Option<DiagramKey>,
    bodies: IndexMap<String, SimBody>,
    sizes: BlockSizes,
    animations: Vec<ResizeAnimation>,
    dragged: Option<String>,
    settle_steps: u32,
}

impl SettlingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_built(&self) -> bool {
        self.world.is_some()
    }

    pub fn diagram_key(&self) -> Option<DiagramKey> {
        self.key
    }

    /// Sizes as last recorded by `build` or `update_block_size`.
    pub fn block_sizes(&self) -> &BlockSizes {
        &self.sizes
    }

    /// Top-left position of every body.
    pub fn positions(&self) -> PositionMap {
        self.bodies
            .iter()
            .filter_map(|(id, b)| self.top_left(b).map(|p| (id.clone(), p)))
            .collect()
    }

    pub fn build(
        &mut self,
        key: DiagramKey,
        classes: &[DiagramClass],
        expanded: &ExpandedFlags,
        sizes: &BlockSizes,
    ) {
        let previous = (self.key == Some(key) && self.world.is_some()).then(|| self.positions());
        self.clear();
        self.key = Some(key);
        self.sizes = sizes.clone();

        if classes.is_empty() {
            tracing::debug!(key = key.0, "build with no classes; engine stays empty");
            return;
        }

        let mut input = PlacementInput::new(classes, expanded).with_sizes(sizes);
        if let Some(previous) = previous.as_ref() {
            input = input.with_previous(previous);
        }
        let planned = place(&input, &self.config.placement);

        let mut world = World::new(self.config.world.clone());
        for block in &planned.blocks {
            if self.bodies.contains_key(&block.class_id) {
                continue;
            }
            let center = block.rect.center();
            let body = world.create_body(
                BodyDef::dynamic(Vec2::new(center.x, center.y))
                    .linear_damping(self.config.linear_damping)
                    .angular_damping(self.config.angular_damping),
            );
            let half = self.half_extents(block.rect.size(), block.margin);
            let Some(collider) = world.create_box_collider(body, half) else {
                continue;
            };
            self.bodies.insert(
                block.class_id.clone(),
                SimBody {
                    body,
                    collider,
                    size: block.rect.size(),
                    margin: block.margin,
                    expanded: block.expanded,
                    state: BodyState::Free,
                },
            );
        }

        for _ in 0..self.config.warmup_steps {
            world.step(self.config.warmup_dt, self.config.warmup_substeps);
        }
        self.world = Some(world);
        self.request_settle();

        tracing::debug!(
            key = key.0,
            bodies = self.bodies.len(),
            reused_positions = previous.is_some(),
            "settling world built"
        );
    }

    /// Drops the world and every body (back to the empty state).
    pub fn clear(&mut self) {
        self.world = None;
        self.key = None;
        self.bodies.clear();
        self.sizes.clear();
        self.animations.clear();
        self.dragged = None;
        self.settle_steps = 0;
    }

    pub fn step(&mut self, dt: f64) {
        if self.world.is_none() || self.is_idle() {
            return;
        }
        let dt = dt.clamp(self.config.min_dt, self.config.max_dt);

        self.advance_animations(dt);

        if let Some(world) = self.world.as_mut() {
            world.step(dt, self.config.substeps);
        }

        if self.dragged.is_none() && self.animations.is_empty() && self.settle_steps > 0 {
            self.settle_steps -= 1;
            if self.is_settled() {
                self.settle_steps = 0;
                tracing::debug!("layout settled");
            }
        }
    }

    fn is_idle(&self) -> bool {
        self.animations.is_empty() && self.dragged.is_none() && self.settle_steps == 0
    }

    fn advance_animations(&mut self, dt: f64) {
        let delta = self.config.animation_speed * dt;
        let mut finished = Vec::new();
        for ix in 0..self.animations.len() {
            let done = self.animations[ix].advance(delta);
            let anim = self.animations[ix].clone();
            self.apply_size(&anim.block_id, anim.current(), anim.anchor);
            if done {
                finished.push(anim.block_id);
            }
        }
        if finished.is_empty() {
            return;
        }
        self.animations.retain(|a| !a.is_done());
        for id in finished {
            let dragged = self.dragged.as_deref() == Some(id.as_str());
            let Some(sim) = self.bodies.get_mut(&id) else {
                continue;
            };
            if dragged {
                continue;
            }
            sim.state = BodyState::Free;
            if let Some(world) = self.world.as_mut() {
                world.set_body_kind(sim.body, BodyKind::Dynamic);
                world.wake(sim.body);
            }
        }
    }

    /// Swaps the body's collider for one of `new_size` and keeps its top-left at `anchor`.
    fn apply_size(&mut self, id: &str, new_size: Size, anchor: Point) {
        let half = {
            let Some(sim) = self.bodies.get(id) else {
                return;
            };
            self.half_extents(new_size, sim.margin)
        };
        let (Some(world), Some(sim)) = (self.world.as_mut(), self.bodies.get_mut(id)) else {
            return;
        };
        world.destroy_collider(sim.collider);
        if let Some(collider) = world.create_box_collider(sim.body, half) {
            sim.collider = collider;
        }
        sim.size = new_size;
        let center = Vec2::new(
            anchor.x + new_size.width * 0.5,
            anchor.y + new_size.height * 0.5,
        );
        world.set_translation(sim.body, center);
        world.set_linvel(sim.body, Vec2::zeros());
    }

    fn half_extents(&self, block: Size, margin: f64) -> Vec2 {
        let inflation = self.config.inflation(margin);
        Vec2::new(
            block.width * 0.5 + inflation,
            block.height * 0.5 + inflation,
        )
    }

    fn top_left(&self, sim: &SimBody) -> Option<Point> {
        let t = self.world.as_ref()?.translation(sim.body)?;
        Some(point(
            t.x - sim.size.width * 0.5,
            t.y - sim.size.height * 0.5,
        ))
    }

    /// Current rectangles in diagram order. Classes without a body are skipped.
    pub fn placed(&self) -> PlacedDiagram {
        let blocks = self
            .bodies
            .iter()
            .filter_map(|(id, sim)| {
                Some(PlacedBlock {
                    class_id: id.clone(),
                    rect: Rect::from_origin_size(self.top_left(sim)?, sim.size),
                    margin: sim.margin,
                    expanded: sim.expanded,
                })
            })
            .collect();
        PlacedDiagram { blocks }
    }

    pub fn update_block_size(&mut self, id: &str, width: f64, height: f64, expanded: bool) {
        if self.world.is_none() {
            return;
        }
        let Some(sim) = self.bodies.get(id) else {
            return;
        };
        self.sizes.insert(id.to_string(), size(width, height));
        let Some(anchor) = self.top_left(sim) else {
            return;
        };
        let from = sim.size;
        let body = sim.body;

        self.animations.retain(|a| a.block_id != id);
        self.animations
            .push(ResizeAnimation::new(id, from, size(width, height), anchor));

        let dragged = self.dragged.as_deref() == Some(id);
        if let Some(sim) = self.bodies.get_mut(id) {
            sim.expanded = expanded;
            if !dragged {
                sim.state = BodyState::Resizing;
            }
        }
        if let Some(world) = self.world.as_mut() {
            world.set_body_kind(body, BodyKind::Kinematic);
            world.set_linvel(body, Vec2::zeros());
        }
        self.request_settle();
    }

    /// Makes `id` the dragged block. A different block that was being dragged is released first.
    pub fn begin_drag(&mut self, id: &str) {
        if self.world.is_none() || !self.bodies.contains_key(id) {
            return;
        }
        if let Some(current) = self.dragged.clone() {
            if current != id {
                self.end_drag(&current);
            }
        }
        let (Some(world), Some(sim)) = (self.world.as_mut(), self.bodies.get_mut(id)) else {
            return;
        };
        sim.state = BodyState::Dragged;
        world.set_body_kind(sim.body, BodyKind::Kinematic);
        world.set_linvel(sim.body, Vec2::zeros());
        world.wake(sim.body);
        self.dragged = Some(id.to_string());
    }

    /// Moves the dragged block so its top-left lands on `(x, y)`. Ignored unless `id` is the
    /// active drag.
    pub fn drag_to(&mut self, id: &str, x: f64, y: f64) {
        if self.dragged.as_deref() != Some(id) {
            return;
        }
        let (Some(world), Some(sim)) = (self.world.as_mut(), self.bodies.get_mut(id)) else {
            return;
        };
        let center = Vec2::new(x + sim.size.width * 0.5, y + sim.size.height * 0.5);
        world.set_translation(sim.body, center);
        world.set_linvel(sim.body, Vec2::zeros());
        for anim in self.animations.iter_mut().filter(|a| a.block_id == id) {
            anim.anchor = point(x, y);
        }
    }

    pub fn end_drag(&mut self, id: &str) {
        if self.dragged.as_deref() == Some(id) {
            self.dragged = None;
        }
        let resizing = self.animations.iter().any(|a| a.block_id == id);
        let (Some(world), Some(sim)) = (self.world.as_mut(), self.bodies.get_mut(id)) else {
            return;
        };
        if sim.state == BodyState::Dragged {
            if resizing {
                sim.state = BodyState::Resizing;
            } else {
                sim.state = BodyState::Free;
                world.set_body_kind(sim.body, BodyKind::Dynamic);
                world.wake(sim.body);
            }
        }
        self.request_settle();
    }

    pub fn is_settled(&self) -> bool {
        let Some(world) = self.world.as_ref() else {
            return true;
        };
        if !self.animations.is_empty() {
            return false;
        }
        self.bodies.values().all(|sim| {
            world
                .linvel(sim.body)
                .is_none_or(|v| v.norm() <= self.config.settle_speed)
        })
    }

    /// Re-arms the settle countdown and wakes every body.
    pub fn request_settle(&mut self) {
        let Some(world) = self.world.as_mut() else {
            return;
        };
        world.wake_all();
        self.settle_steps = self.config.settle_step_ceiling;
    }

    pub fn contains(&self, id: &str) -> bool {
        self.bodies.contains_key(id)
    }

    pub fn rect(&self, id: &str) -> Option<Rect> {
        let sim = self.bodies.get(id)?;
        Some(Rect::from_origin_size(self.top_left(sim)?, sim.size))
    }

    pub fn dragged_id(&self) -> Option<&str> {
        self.dragged.as_deref()
    }

    pub fn body_state(&self, id: &str) -> Option<BodyState> {
        self.bodies.get(id).map(|sim| sim.state)
    }

    pub fn active_animation_count(&self) -> usize {
        self.animations.len()
    }

    pub fn settle_steps_remaining(&self) -> u32 {
        self.settle_steps
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}
