//! Headless 2D relaxation world.
//!
//! Not a general physics engine: bodies only translate, there is no gravity, and every collider
//! is an axis-aligned box attached to one body. A step integrates damped velocities and resolves
//! box contacts at the velocity level, which is all a "keep these padded boxes apart" solver
//! needs.
//!
//! Bodies and colliders live in generational arenas; a handle whose slot was reused is stale and
//! every accessor rejects it instead of panicking.

use crate::config::WorldConfig;
use nalgebra::Vector2;

pub type Vec2 = Vector2<f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Moved by contacts and damping.
    Dynamic,
    /// Moved only by the caller (teleports and velocities); infinite mass in contacts.
    Kinematic,
}

#[derive(Debug, Clone)]
pub struct BodyDef {
    pub kind: BodyKind,
    pub translation: Vec2,
    pub linear_damping: f64,
    pub angular_damping: f64,
}

impl BodyDef {
    pub fn dynamic(translation: Vec2) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            translation,
            linear_damping: 0.0,
            angular_damping: 0.0,
        }
    }

    pub fn linear_damping(mut self, damping: f64) -> Self {
        self.linear_damping = damping;
        self
    }

    pub fn angular_damping(mut self, damping: f64) -> Self {
        self.angular_damping = damping;
        self
    }
}

#[derive(Debug, Clone)]
struct Body {
    kind: BodyKind,
    translation: Vec2,
    linvel: Vec2,
    linear_damping: f64,
    angular_damping: f64,
    sleeping: bool,
    low_speed_time: f64,
    collider: Option<ColliderHandle>,
}

impl Body {
    fn inv_mass(&self) -> f64 {
        match self.kind {
            BodyKind::Dynamic => 1.0,
            BodyKind::Kinematic => 0.0,
        }
    }

    fn wake(&mut self) {
        self.sleeping = false;
        self.low_speed_time = 0.0;
    }
}

#[derive(Debug, Clone)]
struct Collider {
    body: BodyHandle,
    half_extents: Vec2,
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

#[derive(Debug, Clone)]
struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<T> Arena<T> {
    fn insert(&mut self, value: T) -> (u32, u32) {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.value = Some(value);
            return (index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        (index, 0)
    }

    fn get(&self, index: u32, generation: u32) -> Option<&T> {
        let slot = self.slots.get(index as usize)?;
        if slot.generation != generation {
            return None;
        }
        slot.value.as_ref()
    }

    fn get_mut(&mut self, index: u32, generation: u32) -> Option<&mut T> {
        let slot = self.slots.get_mut(index as usize)?;
        if slot.generation != generation {
            return None;
        }
        slot.value.as_mut()
    }

    fn remove(&mut self, index: u32, generation: u32) -> Option<T> {
        let slot = self.slots.get_mut(index as usize)?;
        if slot.generation != generation {
            return None;
        }
        let value = slot.value.take()?;
        self.free.push(index);
        Some(value)
    }

    fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.value.is_some()).count()
    }

    fn iter(&self) -> impl Iterator<Item = (u32, u32, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(ix, s)| s.value.as_ref().map(|v| (ix as u32, s.generation, v)))
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter_map(|s| s.value.as_mut())
    }
}

/// One box-box contact found during a substep.
#[derive(Debug, Clone, Copy)]
struct Contact {
    a: BodyHandle,
    b: BodyHandle,
    /// Unit normal pointing from `a` to `b`.
    normal: Vec2,
    penetration: f64,
}

#[derive(Debug, Clone, Default)]
pub struct World {
    config: WorldConfig,
    bodies: Arena<Body>,
    colliders: Arena<Collider>,
}

impl World {
    pub fn new(config: WorldConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    pub fn create_body(&mut self, def: BodyDef) -> BodyHandle {
        let (index, generation) = self.bodies.insert(Body {
            kind: def.kind,
            translation: def.translation,
            linvel: Vec2::zeros(),
            linear_damping: def.linear_damping,
            angular_damping: def.angular_damping,
            sleeping: false,
            low_speed_time: 0.0,
            collider: None,
        });
        BodyHandle { index, generation }
    }

    /// Removes the body together with its collider.
    pub fn destroy_body(&mut self, handle: BodyHandle) -> bool {
        let Some(body) = self.bodies.remove(handle.index, handle.generation) else {
            return false;
        };
        if let Some(c) = body.collider {
            self.colliders.remove(c.index, c.generation);
        }
        true
    }

    /// Attaches a box collider centred on the body, replacing any collider it already had.
    pub fn create_box_collider(
        &mut self,
        body: BodyHandle,
        half_extents: Vec2,
    ) -> Option<ColliderHandle> {
        let previous = self.bodies.get(body.index, body.generation)?.collider;
        if let Some(c) = previous {
            self.colliders.remove(c.index, c.generation);
        }
        let (index, generation) = self.colliders.insert(Collider { body, half_extents });
        let handle = ColliderHandle { index, generation };
        if let Some(b) = self.bodies.get_mut(body.index, body.generation) {
            b.collider = Some(handle);
        }
        Some(handle)
    }

    pub fn destroy_collider(&mut self, handle: ColliderHandle) -> bool {
        let Some(collider) = self.colliders.remove(handle.index, handle.generation) else {
            return false;
        };
        if let Some(b) = self
            .bodies
            .get_mut(collider.body.index, collider.body.generation)
        {
            if b.collider == Some(handle) {
                b.collider = None;
            }
        }
        true
    }

    pub fn half_extents(&self, handle: ColliderHandle) -> Option<Vec2> {
        self.colliders
            .get(handle.index, handle.generation)
            .map(|c| c.half_extents)
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle.index, handle.generation)
    }

    pub fn set_body_kind(&mut self, handle: BodyHandle, kind: BodyKind) -> bool {
        let Some(body) = self.body_mut(handle) else {
            return false;
        };
        body.kind = kind;
        body.wake();
        true
    }

    pub fn body_kind(&self, handle: BodyHandle) -> Option<BodyKind> {
        self.bodies
            .get(handle.index, handle.generation)
            .map(|b| b.kind)
    }

    /// Teleports the body. Velocity is left alone.
    pub fn set_translation(&mut self, handle: BodyHandle, translation: Vec2) -> bool {
        let Some(body) = self.body_mut(handle) else {
            return false;
        };
        body.translation = translation;
        body.wake();
        true
    }

    pub fn set_linvel(&mut self, handle: BodyHandle, linvel: Vec2) -> bool {
        let Some(body) = self.body_mut(handle) else {
            return false;
        };
        body.linvel = linvel;
        if linvel != Vec2::zeros() {
            body.wake();
        }
        true
    }

    pub fn wake(&mut self, handle: BodyHandle) -> bool {
        let Some(body) = self.body_mut(handle) else {
            return false;
        };
        body.wake();
        true
    }

    pub fn wake_all(&mut self) {
        for body in self.bodies.iter_mut() {
            body.wake();
        }
    }

    pub fn damping(&self, handle: BodyHandle) -> Option<(f64, f64)> {
        self.bodies
            .get(handle.index, handle.generation)
            .map(|b| (b.linear_damping, b.angular_damping))
    }

    pub fn is_sleeping(&self, handle: BodyHandle) -> Option<bool> {
        self.bodies
            .get(handle.index, handle.generation)
            .map(|b| b.sleeping)
    }

    pub fn translation(&self, handle: BodyHandle) -> Option<Vec2> {
        self.bodies
            .get(handle.index, handle.generation)
            .map(|b| b.translation)
    }

    pub fn linvel(&self, handle: BodyHandle) -> Option<Vec2> {
        self.bodies
            .get(handle.index, handle.generation)
            .map(|b| b.linvel)
    }

    /// Advances the world by `dt`, split into `substeps` equal substeps.
    pub fn step(&mut self, dt: f64, substeps: usize) {
        if dt <= 0.0 {
            return;
        }
        let substeps = substeps.max(1);
        let h = dt / substeps as f64;
        for _ in 0..substeps {
            self.substep(h);
        }
        self.update_sleep(dt);
    }

    fn substep(&mut self, h: f64) {
        for body in self.bodies.iter_mut() {
            if body.kind == BodyKind::Dynamic && !body.sleeping {
                body.linvel *= 1.0 / (1.0 + h * body.linear_damping);
            }
        }

        let rate = self.config.contact_hertz.min(0.5 / h);
        for contact in self.find_contacts() {
            self.solve_contact(&contact, rate);
        }

        for body in self.bodies.iter_mut() {
            if !body.sleeping {
                body.translation += body.linvel * h;
            }
        }
    }

    fn find_contacts(&self) -> Vec<Contact> {
        let boxes: Vec<(BodyHandle, Vec2, Vec2, BodyKind)> = self
            .colliders
            .iter()
            .filter_map(|(_, _, c)| {
                let body = self.bodies.get(c.body.index, c.body.generation)?;
                Some((c.body, body.translation, c.half_extents, body.kind))
            })
            .collect();

        let mut contacts = Vec::new();
        for (i, &(ha, ta, ea, ka)) in boxes.iter().enumerate() {
            for &(hb, tb, eb, kb) in &boxes[i + 1..] {
                if ha == hb || (ka == BodyKind::Kinematic && kb == BodyKind::Kinematic) {
                    continue;
                }
                let d = tb - ta;
                // Coincident centres have no separating direction; they stay put.
                if d.x == 0.0 && d.y == 0.0 {
                    continue;
                }
                let pen_x = ea.x + eb.x - d.x.abs();
                let pen_y = ea.y + eb.y - d.y.abs();
                if pen_x <= 0.0 || pen_y <= 0.0 {
                    continue;
                }
                let use_x = if d.x == 0.0 {
                    false
                } else if d.y == 0.0 {
                    true
                } else {
                    pen_x <= pen_y
                };
                let (normal, penetration) = if use_x {
                    (Vec2::new(d.x.signum(), 0.0), pen_x)
                } else {
                    (Vec2::new(0.0, d.y.signum()), pen_y)
                };
                contacts.push(Contact {
                    a: ha,
                    b: hb,
                    normal,
                    penetration,
                });
            }
        }
        contacts
    }

    fn solve_contact(&mut self, contact: &Contact, rate: f64) {
        let (Some(a), Some(b)) = (
            self.bodies.get(contact.a.index, contact.a.generation),
            self.bodies.get(contact.b.index, contact.b.generation),
        ) else {
            return;
        };
        let (ia, ib) = (a.inv_mass(), b.inv_mass());
        let w = ia + ib;
        if w == 0.0 {
            return;
        }
        let target = (contact.penetration * rate).min(self.config.max_contact_push_speed);
        let vn = (b.linvel - a.linvel).dot(&contact.normal);
        if vn >= target {
            return;
        }
        let impulse = contact.normal * ((target - vn) / w);
        if let Some(a) = self.body_mut(contact.a) {
            a.linvel -= impulse * ia;
            a.wake();
        }
        if let Some(b) = self.body_mut(contact.b) {
            b.linvel += impulse * ib;
            b.wake();
        }
    }

    fn update_sleep(&mut self, dt: f64) {
        let sleep_speed = self.config.sleep_speed;
        let time_until_sleep = self.config.time_until_sleep;
        for body in self.bodies.iter_mut() {
            if body.kind != BodyKind::Dynamic || body.sleeping {
                continue;
            }
            if body.linvel.norm() < sleep_speed {
                body.low_speed_time += dt;
                if body.low_speed_time >= time_until_sleep {
                    body.sleeping = true;
                    body.linvel = Vec2::zeros();
                }
            } else {
                body.low_speed_time = 0.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reused_slots_reject_stale_handles() {
        let mut world = World::new(WorldConfig::default());
        let first = world.create_body(BodyDef::dynamic(Vec2::zeros()));
        assert!(world.destroy_body(first));
        let second = world.create_body(BodyDef::dynamic(Vec2::new(5.0, 0.0)));

        assert_eq!(first.index, second.index);
        assert!(world.translation(first).is_none());
        assert!(!world.set_translation(first, Vec2::new(1.0, 1.0)));
        assert!(!world.destroy_body(first));
        assert_eq!(world.translation(second), Some(Vec2::new(5.0, 0.0)));
    }

    #[test]
    fn replacing_a_collider_drops_the_old_one() {
        let mut world = World::new(WorldConfig::default());
        let body = world.create_body(BodyDef::dynamic(Vec2::zeros()));
        let c1 = world
            .create_box_collider(body, Vec2::new(1.0, 1.0))
            .unwrap();
        let c2 = world
            .create_box_collider(body, Vec2::new(2.0, 3.0))
            .unwrap();
        assert_eq!(world.collider_count(), 1);
        assert!(world.half_extents(c1).is_none());
        assert_eq!(world.half_extents(c2), Some(Vec2::new(2.0, 3.0)));
        assert!(world.destroy_body(body));
        assert_eq!(world.collider_count(), 0);
    }

    #[test]
    fn minimum_penetration_axis_wins() {
        let mut world = World::new(WorldConfig::default());
        let a = world.create_body(BodyDef::dynamic(Vec2::new(0.0, 0.0)));
        let b = world.create_body(BodyDef::dynamic(Vec2::new(3.0, 1.0)));
        world.create_box_collider(a, Vec2::new(10.0, 2.0));
        world.create_box_collider(b, Vec2::new(10.0, 2.0));

        let contacts = world.find_contacts();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].normal, Vec2::new(0.0, 1.0));
        assert_eq!(contacts[0].penetration, 3.0);
    }
}
