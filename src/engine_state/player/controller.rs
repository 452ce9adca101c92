//! # Player Controller
//!
//! Integrates one frame of input into the player's pose.
//!
//! Each tick runs in a fixed order: rotate, move vertically under gravity
//! (landing, ceilings and jumping), move horizontally and undo the move if it
//! ends inside terrain, then undo the whole tick if the collision box has
//! left the playable region.

use cgmath::{Deg, InnerSpace, Point3, Quaternion, Rotation3, Vector2, Vector3, Zero};

use super::collision::{
    block_pos_from_world, collision_min_pos, find_ceil_height, find_floor_height, foot_pos,
    is_overlapping_with_block, is_overlapping_with_terrain,
};
use crate::application_state::{InputSnapshot, Key};
use crate::core::Timer;
use crate::engine_state::camera_state::camera::FORWARD_BASIS;
use crate::engine_state::camera_state::Camera;
use crate::engine_state::rendering::MeshUploader;
use crate::engine_state::voxels::block::Block;
use crate::engine_state::voxels::chunk::{CHUNK_DIMENSION_Y, NO_CEIL};
use crate::engine_state::voxels::{chunk_index_of_block, ChunkIndex, ChunkSource, ChunksManager};
use crate::error::EditError;

/// Gravitational acceleration, m/s².
pub const GRAVITY: f32 = 9.8;

/// Orientations whose forward vector has a larger vertical component are rejected.
const MAX_FORWARD_Y: f32 = 0.999;

/// Fixed tuning of the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerConstants {
    /// Collision box size; x and z are centred on the feet
    pub collision_size: Vector3<f32>,
    /// Height of the eyes above the feet
    pub eye_height: f32,
    pub walk_speed: f32,
    pub dash_speed: f32,
    /// Degrees per second per unit of horizontal look input
    pub yaw_sensitivity: f32,
    /// Degrees per second per unit of vertical look input
    pub pitch_sensitivity: f32,
    pub jump_height: f32,
    /// Terminal falling speed (negative)
    pub min_vertical_velocity: f32,
    pub grounded_offset: f32,
    pub ceiling_offset: f32,
    pub reach_distance: f32,
    pub reach_detect_step: f32,
    pub mine_cooldown_seconds: f32,
    pub place_cooldown_seconds: f32,
    pub gravity_scale: f32,
}

impl Default for PlayerConstants {
    fn default() -> Self {
        Self {
            collision_size: Vector3::new(0.5, 1.8, 0.5),
            eye_height: 1.6,
            walk_speed: 3.0,
            dash_speed: 6.0,
            yaw_sensitivity: 180.0,
            pitch_sensitivity: 90.0,
            jump_height: 1.3,
            min_vertical_velocity: -100.0,
            grounded_offset: 0.01,
            ceiling_offset: 0.01,
            reach_distance: 5.0,
            reach_detect_step: 0.1,
            mine_cooldown_seconds: 0.25,
            place_cooldown_seconds: 0.25,
            gravity_scale: 1.0,
        }
    }
}

/// The input the controller consumes each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerInputs {
    /// `x` strafes right, `y` walks forward
    pub move_xz: Vector2<f32>,
    /// `x` turns right, `y` looks down
    pub look_dxdy: Vector2<f32>,
    pub dash_pressed: bool,
    /// Should be true only on the frame the jump key went down
    pub jump_pressed: bool,
}

impl Default for PlayerInputs {
    fn default() -> Self {
        Self {
            move_xz: Vector2::zero(),
            look_dxdy: Vector2::zero(),
            dash_pressed: false,
            jump_pressed: false,
        }
    }
}

impl PlayerInputs {
    /// WASD to move, mouse to look, Shift to dash, Space to jump.
    pub fn from_snapshot<I: InputSnapshot + ?Sized>(input: &I) -> Self {
        Self {
            move_xz: input.get_axis_2d(Key::W, Key::S, Key::D, Key::A),
            look_dxdy: input.mouse_delta(),
            dash_pressed: input.key_pressed(Key::Shift),
            jump_pressed: input.key_pressed_now(Key::Space),
        }
    }
}

/// A block found by [`PlayerController::pick_looking_block`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockHit {
    /// World position of the solid block
    pub block: Vector3<i32>,
    /// Outward normal of the face the ray entered through; zero when the
    /// ray started inside the block
    pub normal: Vector3<i32>,
    /// Distance marched from the eye
    pub distance: f32,
}

/// Dominant axis of `delta` as a unit vector, zero for a zero delta.
fn dominant_axis(delta: Vector3<i32>) -> Vector3<i32> {
    let abs = delta.map(i32::abs);
    if abs.x == 0 && abs.y == 0 && abs.z == 0 {
        Vector3::zero()
    } else if abs.x >= abs.y && abs.x >= abs.z {
        Vector3::new(delta.x.signum(), 0, 0)
    } else if abs.y >= abs.z {
        Vector3::new(0, delta.y.signum(), 0)
    } else {
        Vector3::new(0, 0, delta.z.signum())
    }
}

/// First-person kinematic player.
#[derive(Debug, Clone)]
pub struct PlayerController {
    constants: PlayerConstants,
    /// Eye position
    position: Point3<f32>,
    orientation: Quaternion<f32>,
    vertical_velocity: f32,
    grounded: bool,
    mine_cooldown: Timer,
    place_cooldown: Timer,
}

impl PlayerController {
    /// A player with its eyes at `position`, looking along -Z.
    pub fn new(position: Point3<f32>) -> Self {
        Self::with_constants(position, PlayerConstants::default())
    }

    pub fn with_constants(position: Point3<f32>, constants: PlayerConstants) -> Self {
        Self {
            constants,
            position,
            orientation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            vertical_velocity: 0.0,
            grounded: false,
            mine_cooldown: Timer::finished(constants.mine_cooldown_seconds),
            place_cooldown: Timer::finished(constants.place_cooldown_seconds),
        }
    }

    pub fn constants(&self) -> &PlayerConstants {
        &self.constants
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn set_position(&mut self, position: Point3<f32>) {
        self.position = position;
    }

    pub fn orientation(&self) -> Quaternion<f32> {
        self.orientation
    }

    /// Sets the view orientation directly, without the pitch limit.
    pub fn set_orientation(&mut self, orientation: Quaternion<f32>) {
        self.orientation = orientation.normalize();
    }

    pub fn vertical_velocity(&self) -> f32 {
        self.vertical_velocity
    }

    pub fn set_vertical_velocity(&mut self, vertical_velocity: f32) {
        self.vertical_velocity = vertical_velocity;
    }

    /// Whether the last tick ended standing on the ground.
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn foot(&self) -> Point3<f32> {
        foot_pos(self.position, self.constants.eye_height)
    }

    pub fn forward(&self) -> Vector3<f32> {
        (self.orientation * FORWARD_BASIS).normalize()
    }

    /// Chunk the player's feet are in.
    pub fn chunk_index(&self) -> ChunkIndex {
        chunk_index_of_block(block_pos_from_world(self.foot()))
    }

    pub fn camera(&self) -> Camera {
        Camera::new(self.position, self.orientation)
    }

    /// Advances the player by `dt` seconds.
    pub fn on_every_frame<C: ChunkSource>(&mut self, chunks: &C, inputs: &PlayerInputs, dt: f32) {
        self.mine_cooldown.tick(dt);
        self.place_cooldown.tick(dt);

        self.rotate(inputs.look_dxdy, dt);
        let start_position = self.position;
        self.move_vertically(chunks, inputs.jump_pressed, dt);
        self.move_horizontally(chunks, inputs, dt);

        if !self.is_box_inside_world_bounds(chunks) {
            self.position = start_position;
        }
    }

    fn rotate(&mut self, look_dxdy: Vector2<f32>, dt: f32) {
        let right = (self.orientation * Vector3::unit_x()).normalize();
        let yaw = Quaternion::from_axis_angle(
            Vector3::unit_y(),
            Deg(-look_dxdy.x * self.constants.yaw_sensitivity * dt),
        );
        let pitch = Quaternion::from_axis_angle(
            right,
            Deg(-look_dxdy.y * self.constants.pitch_sensitivity * dt),
        );
        let rotated = (yaw * pitch * self.orientation).normalize();
        if (rotated * FORWARD_BASIS).y.abs() < MAX_FORWARD_Y {
            self.orientation = rotated;
        }
    }

    fn move_vertically<C: ChunkSource>(&mut self, chunks: &C, jump_pressed: bool, dt: f32) {
        let c = self.constants;
        let size = c.collision_size;
        let floor_y = find_floor_height(chunks, self.foot(), size);
        let ceil_y = find_ceil_height(chunks, self.foot(), size);

        self.vertical_velocity =
            (self.vertical_velocity - GRAVITY * c.gravity_scale * dt).max(c.min_vertical_velocity);
        if self.vertical_velocity.abs() > 0.01 {
            self.position.y += self.vertical_velocity * dt;
        }

        let ground = floor_y as f32 + 0.5;
        self.grounded = floor_y >= 0 && self.foot().y <= ground + c.grounded_offset;
        if self.grounded {
            if self.foot().y < ground {
                self.position.y = ground + c.eye_height;
            }
            self.vertical_velocity = self.vertical_velocity.max(0.0);
            if jump_pressed {
                self.vertical_velocity += (2.0 * GRAVITY * c.jump_height).sqrt();
                self.position.y += self.vertical_velocity * dt;
            }
        }

        let ceiling = ceil_y as f32 - 0.5;
        let hits_ceiling =
            ceil_y < NO_CEIL && self.foot().y + size.y >= ceiling - c.ceiling_offset;
        if hits_ceiling {
            if self.foot().y + size.y > ceiling {
                self.position.y = ceiling - size.y + c.eye_height;
            }
            self.vertical_velocity = self.vertical_velocity.min(0.0);
        }
    }

    fn move_horizontally<C: ChunkSource>(&mut self, chunks: &C, inputs: &PlayerInputs, dt: f32) {
        let c = self.constants;
        let before = self.position;

        let mut move_dir =
            self.orientation * Vector3::new(inputs.move_xz.x, 0.0, -inputs.move_xz.y);
        move_dir.y = 0.0;
        let move_dir = if move_dir.magnitude2() > f32::EPSILON {
            move_dir.normalize()
        } else {
            Vector3::zero()
        };

        let dash = inputs.dash_pressed && inputs.move_xz.y > 0.5;
        let speed = if dash { c.dash_speed } else { c.walk_speed };
        self.position += move_dir * speed * dt;

        if is_overlapping_with_terrain(chunks, self.foot(), c.collision_size) {
            self.position.x = before.x;
            self.position.z = before.z;
        }
    }

    /// Whether every horizontal corner of the collision box is inside the playable region.
    fn is_box_inside_world_bounds<C: ChunkSource>(&self, chunks: &C) -> bool {
        let size = self.constants.collision_size;
        let foot = self.foot();
        let min = collision_min_pos(foot, size);
        [
            (min.x, min.z),
            (min.x + size.x, min.z),
            (min.x, min.z + size.z),
            (min.x + size.x, min.z + size.z),
        ]
        .iter()
        .all(|&(x, z)| chunks.is_inside_world_bounds(block_pos_from_world(Point3::new(x, foot.y, z))))
    }

    /// Marches from the eye along the view direction and returns the first
    /// solid block within reach.
    pub fn pick_looking_block<C: ChunkSource>(&self, chunks: &C) -> Option<BlockHit> {
        let c = &self.constants;
        let forward = self.forward();
        let steps = (c.reach_distance / c.reach_detect_step + 1e-3).floor() as u32;

        let mut previous = block_pos_from_world(self.position);
        for step in 0..=steps {
            let distance = step as f32 * c.reach_detect_step;
            let block = block_pos_from_world(self.position + forward * distance);
            if chunks.block_at(block).is_solid() {
                return Some(BlockHit {
                    block,
                    normal: dominant_axis(previous - block),
                    distance,
                });
            }
            previous = block;
        }
        None
    }

    /// Removes the block the player looks at.
    ///
    /// # Returns
    /// The world position of the removed block.
    pub fn try_mine_block(
        &mut self,
        chunks: &mut ChunksManager,
        mesh_uploader: &mut dyn MeshUploader,
    ) -> Result<Vector3<i32>, EditError> {
        if !self.mine_cooldown.is_finished() {
            return Err(EditError::CoolingDown);
        }
        let hit = self.pick_looking_block(&*chunks).ok_or(EditError::NoTarget)?;
        if !chunks.is_inside_world_bounds(hit.block) {
            return Err(EditError::OutOfWorld(hit.block));
        }
        chunks.set_block_at_world(hit.block, Block::Air, mesh_uploader)?;
        self.mine_cooldown.reset();
        Ok(hit.block)
    }

    /// Places `block` against the face the player looks at.
    ///
    /// # Returns
    /// The world position of the new block.
    pub fn try_place_block(
        &mut self,
        chunks: &mut ChunksManager,
        block: Block,
        mesh_uploader: &mut dyn MeshUploader,
    ) -> Result<Vector3<i32>, EditError> {
        if !self.place_cooldown.is_finished() {
            return Err(EditError::CoolingDown);
        }
        let hit = self.pick_looking_block(&*chunks).ok_or(EditError::NoTarget)?;
        if hit.normal == Vector3::zero() {
            return Err(EditError::NoFace);
        }
        let target = hit.block + hit.normal;
        if !chunks.is_inside_world_bounds(target) || !(0..CHUNK_DIMENSION_Y).contains(&target.y) {
            return Err(EditError::OutOfWorld(target));
        }
        if chunks.block_at(target).is_solid() {
            return Err(EditError::TargetOccupied(target));
        }
        if is_overlapping_with_block(self.foot(), self.constants.collision_size, target) {
            return Err(EditError::OverlapsPlayer(target));
        }
        chunks.set_block_at_world(target, block, mesh_uploader)?;
        self.place_cooldown.reset();
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_state::InputState;

    #[test]
    fn test_inputs_from_snapshot() {
        let input = InputState::new()
            .with_held(Key::W)
            .with_held(Key::Shift)
            .with_pressed(Key::Space)
            .with_mouse_delta(2.0, -1.0);
        let inputs = PlayerInputs::from_snapshot(&input);
        assert_eq!(inputs.move_xz, Vector2::new(0.0, 1.0));
        assert_eq!(inputs.look_dxdy, Vector2::new(2.0, -1.0));
        assert!(inputs.dash_pressed && inputs.jump_pressed);

        let held_jump = InputState::new().with_held(Key::Space);
        assert!(!PlayerInputs::from_snapshot(&held_jump).jump_pressed);
    }

    #[test]
    fn test_dominant_axis() {
        assert_eq!(dominant_axis(Vector3::new(0, 1, 0)), Vector3::new(0, 1, 0));
        assert_eq!(dominant_axis(Vector3::new(-2, 1, 0)), Vector3::new(-1, 0, 0));
        assert_eq!(dominant_axis(Vector3::new(0, 0, 0)), Vector3::new(0, 0, 0));
    }

    #[test]
    fn test_yaw_turns_right_with_positive_look() {
        let mut player = PlayerController::new(Point3::new(0.0, 0.0, 0.0));
        // 0.5 units for 1 s at 180°/s: a quarter turn to the right, facing +X.
        player.rotate(Vector2::new(0.5, 0.0), 1.0);
        assert!((player.forward() - Vector3::unit_x()).magnitude() < 1e-5);
    }

    #[test]
    fn test_pitch_is_soft_clamped() {
        let mut player = PlayerController::new(Point3::new(0.0, 0.0, 0.0));
        // Looking up 90° would make the forward vector vertical: rejected.
        player.rotate(Vector2::new(0.0, -1.0), 1.0);
        assert!((player.forward() - FORWARD_BASIS).magnitude() < 1e-5);

        player.rotate(Vector2::new(0.0, -0.5), 1.0);
        assert!(player.forward().y > 0.7);
    }
}
