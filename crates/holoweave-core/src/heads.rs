//! Head agents: small painters walking the torus under a behaviour machine.

use serde::{Deserialize, Serialize};

use crate::Tick;
use crate::buffer::PixelBuffer;
use crate::modes::MovementMode;
use crate::palette::{PaletteManager, Rgb};
use crate::rng::EngineRng;

/// Unit vectors for the eight compass directions, clockwise from east.
pub const DIR8: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

const CARDINALS: [u8; 4] = [0, 2, 4, 6];

const KNIGHT: [(i32, i32); 8] = [
    (2, 1),
    (1, 2),
    (-1, 2),
    (-2, 1),
    (-2, -1),
    (-1, -2),
    (1, -2),
    (2, -1),
];

const BEHAVIOR_WEIGHTS: [f64; 5] = [0.34, 0.22, 0.16, 0.20, 0.08];
const INITIAL_DIR_WEIGHTS: [f64; 8] = [1.15, 0.85, 1.15, 0.85, 1.15, 0.85, 1.15, 0.85];
const EARLY_REROLL: f64 = 0.18;
const TELEPORT_CHANCE: f64 = 0.0007;
const SEGMENT_CHANCE: f64 = 0.045;
const PAINT_OFFSET_CHANCE: f64 = 0.33;

/// Clockwise (`1`) or counter-clockwise (`-1`) with equal odds.
fn either_way(rng: &mut EngineRng) -> i32 {
    if rng.chance(0.5) { 1 } else { -1 }
}

/// One of the eight compass directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Direction(u8);

impl Direction {
    pub const EAST: Self = Self(0);
    pub const NORTH_WEST: Self = Self(5);

    /// Index modulo 8.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index % 8)
    }

    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn vector(self) -> (i32, i32) {
        DIR8[self.0 as usize]
    }

    /// Rotate clockwise by `steps` eighths of a turn (negative turns counter-clockwise).
    #[must_use]
    pub const fn rotate(self, steps: i32) -> Self {
        Self((self.0 as i32 + steps).rem_euclid(8) as u8)
    }

    fn random(rng: &mut EngineRng) -> Self {
        Self::new(rng.range_int(8) as u8)
    }

    fn random_cardinal(rng: &mut EngineRng) -> Self {
        Self(CARDINALS[rng.index(CARDINALS.len())])
    }

    /// Nearest direction to `(dx, dy)`; a zero vector picks at random.
    pub fn toward(dx: i32, dy: i32, rng: &mut EngineRng) -> Self {
        let (ax, ay) = (dx.unsigned_abs(), dy.unsigned_abs());
        if ax == 0 && ay == 0 {
            return Self::random(rng);
        }
        if ax > ay * 2 {
            return if dx > 0 { Self(0) } else { Self(4) };
        }
        if ay > ax * 2 {
            return if dy > 0 { Self(2) } else { Self(6) };
        }
        match (dx.signum(), dy.signum()) {
            (1, 1) => Self(1),
            (-1, 1) => Self(3),
            (-1, -1) => Self(5),
            _ => Self(7),
        }
    }
}

/// Deterministic 32-bit hash of a position, a coarse time and a head seed.
#[must_use]
pub fn spatial_hash(x: i32, y: i32, t: u64, seed: u32) -> u32 {
    let mut n = (x as u32)
        .wrapping_mul(374_761_393)
        .wrapping_add((y as u32).wrapping_mul(668_265_263))
        .wrapping_add((t as u32).wrapping_mul(1_442_695_041))
        .wrapping_add(seed.wrapping_mul(3_266_489_917));
    n ^= n >> 13;
    n = n.wrapping_mul(1_274_126_177);
    n ^ (n >> 16)
}

/// Behaviour a head is currently following.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Behavior {
    #[default]
    Grid,
    Zigzag,
    Orbit,
    Noise,
    Burst,
}

impl Behavior {
    pub const ALL: [Self; 5] = [Self::Grid, Self::Zigzag, Self::Orbit, Self::Noise, Self::Burst];

    fn pick(rng: &mut EngineRng) -> Self {
        Self::ALL[rng.weighted_index(&BEHAVIOR_WEIGHTS)]
    }
}

/// A single painting agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Head {
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
    pub step: i32,
    pub color: Rgb,
    pub seed: u32,
    pub behavior: Behavior,
    /// Frame at which the behaviour becomes eligible for reroll.
    pub until: u64,
    /// Frames between direction reconsiderations.
    pub turn_every: u64,
    pub center: (i32, i32),
    pub spin: i32,
    pub zig_pair: Option<(Direction, Direction)>,
    pub zig_flip: bool,
    pub burst: i32,
}

impl Head {
    /// Bare head with a fresh-looking default behaviour and no randomness.
    #[must_use]
    pub fn at(x: i32, y: i32, dir: Direction, step: i32) -> Self {
        Self {
            x,
            y,
            dir,
            step,
            color: Rgb::new(255, 255, 255),
            seed: 0,
            behavior: Behavior::Grid,
            until: 0,
            turn_every: 4,
            center: (0, 0),
            spin: 1,
            zig_pair: None,
            zig_flip: false,
            burst: 0,
        }
    }

    /// Re-draw behaviour, expiry, cadence, orbit centre and spin.
    pub fn reset_behavior(&mut self, frame: Tick, width: u32, height: u32, rng: &mut EngineRng) {
        self.behavior = Behavior::pick(rng);
        self.until = frame.0 + 90 + rng.range_int(240) as u64;
        self.turn_every = 2 + rng.range_int(9) as u64;
        self.center = (rng.range_int(width as i32), rng.range_int(height as i32));
        self.spin = rng.sign();
        self.zig_flip = false;
        self.zig_pair = None;
        self.burst = 0;
    }

    /// Advance by `direction * step` with wraparound.
    pub fn advance(&mut self, step: i32, width: u32, height: u32) {
        let (dx, dy) = self.dir.vector();
        self.x = (self.x + dx * step).rem_euclid(width as i32);
        self.y = (self.y + dy * step).rem_euclid(height as i32);
    }

    fn nudge(&mut self, dx: i32, dy: i32, width: u32, height: u32) {
        self.x = (self.x + dx).rem_euclid(width as i32);
        self.y = (self.y + dy).rem_euclid(height as i32);
    }

    fn reconsider(&mut self, frame: Tick, width: u32, height: u32, rng: &mut EngineRng) {
        let mut dir = self.dir;
        match self.behavior {
            Behavior::Grid => {
                let r = rng.next_f64();
                dir = if r < 0.62 {
                    dir.rotate(2 * either_way(rng))
                } else if r < 0.82 {
                    dir.rotate(either_way(rng))
                } else if r < 0.92 {
                    Direction::random_cardinal(rng)
                } else {
                    Direction::random(rng)
                };
            }
            Behavior::Zigzag => {
                let (a, b) = match self.zig_pair {
                    Some(pair) => pair,
                    None => {
                        let pair = (dir, dir.rotate(2 * either_way(rng)));
                        self.zig_pair = Some(pair);
                        pair
                    }
                };
                self.zig_flip = !self.zig_flip;
                dir = if self.zig_flip { a } else { b };
                if rng.chance(0.07) {
                    self.zig_pair = None;
                }
            }
            Behavior::Orbit => {
                let vx = self.x - self.center.0;
                let vy = self.y - self.center.1;
                dir = Direction::toward(vx, vy, rng).rotate(self.spin * 2);
                if rng.chance(0.07) {
                    self.center.0 = (self.center.0 - vx.signum()).rem_euclid(width as i32);
                    self.center.1 = (self.center.1 - vy.signum()).rem_euclid(height as i32);
                }
                if rng.chance(0.03) {
                    self.spin = -self.spin;
                }
            }
            Behavior::Noise => {
                let n = spatial_hash(self.x, self.y, frame.0 >> 2, self.seed);
                match ((n >> 3) & 3) as i32 - 1 {
                    -1 => dir = dir.rotate(-1),
                    1 => dir = dir.rotate(1),
                    2 => dir = dir.rotate(if (n >> 5) & 1 == 1 { 2 } else { -2 }),
                    _ => {}
                }
                if n & 31 == 0 {
                    dir = Direction(CARDINALS[((n >> 8) & 3) as usize]);
                }
                if n & 127 == 1 {
                    dir = Direction((n & 7) as u8);
                }
            }
            Behavior::Burst => {
                if self.burst <= 0 && rng.chance(0.09) {
                    self.burst = 8 + rng.range_int(22);
                }
                if self.burst > 0 {
                    self.burst -= 1;
                    if rng.chance(0.22) {
                        dir = dir.rotate(either_way(rng));
                    }
                    if rng.chance(0.05) {
                        dir = Direction::random(rng);
                    }
                } else if rng.chance(0.25) {
                    dir = dir.rotate(2 * either_way(rng));
                }
            }
        }
        self.dir = dir;
    }

    fn bursting(&self) -> bool {
        self.behavior == Behavior::Burst && self.burst > 0
    }
}

/// Round-robin pool of heads sharing one movement mode per tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadPool {
    heads: Vec<Head>,
}

impl HeadPool {
    /// Heads for a `width x height` buffer: one per 900 cells plus 60.
    #[must_use]
    pub const fn count_for(width: u32, height: u32) -> usize {
        (width as usize * height as usize) / 900 + 60
    }

    /// Spawn `count` heads at random positions with palette colours.
    pub fn spawn(
        count: usize,
        width: u32,
        height: u32,
        palette: &PaletteManager,
        frame: Tick,
        rng: &mut EngineRng,
    ) -> Self {
        let heads = (0..count)
            .map(|_| {
                let color = palette.weighted_color(rng);
                let dir = Direction::new(rng.weighted_index(&INITIAL_DIR_WEIGHTS) as u8);
                let x = rng.range_int(width as i32);
                let y = (rng.next_f64() * f64::from(height)) as i32;
                let seed = rng.range_int(1_000_000_000) as u32;
                let step = 1 + rng.range_int(3);
                let mut head = Head {
                    color,
                    seed,
                    ..Head::at(x, y, dir, step)
                };
                head.reset_behavior(frame, width, height, rng);
                head
            })
            .collect();
        Self { heads }
    }

    #[must_use]
    pub fn heads(&self) -> &[Head] {
        &self.heads
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heads.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heads.is_empty()
    }

    /// Painting steps for one tick.
    #[must_use]
    pub fn steps_for(width: u32, height: u32, mode: MovementMode) -> usize {
        let area = f64::from(width) * f64::from(height);
        ((area * mode.step_density()).floor() as usize).clamp(900, 4800)
    }

    /// Run one tick's worth of head steps, painting into `buffer`.
    pub fn step_all(
        &mut self,
        buffer: &mut PixelBuffer,
        palette: &PaletteManager,
        mode: MovementMode,
        frame: Tick,
        rng: &mut EngineRng,
    ) {
        if self.heads.is_empty() {
            return;
        }
        let (w, h) = (buffer.width(), buffer.height());
        let steps = Self::steps_for(w, h, mode);
        let count = self.heads.len();
        for i in 0..steps {
            let head = &mut self.heads[i % count];
            step_head(head, buffer, palette, mode, frame, rng);
        }
    }
}

fn step_head(
    head: &mut Head,
    buffer: &mut PixelBuffer,
    palette: &PaletteManager,
    mode: MovementMode,
    frame: Tick,
    rng: &mut EngineRng,
) {
    let (w, h) = (buffer.width(), buffer.height());

    if frame.0 >= head.until && rng.chance(EARLY_REROLL) {
        head.reset_behavior(frame, w, h, rng);
    }

    if (frame.0 + u64::from(head.seed)).is_multiple_of(head.turn_every.max(1)) {
        head.reconsider(frame, w, h, rng);
    }

    if rng.chance(mode.turn_chance()) {
        head.dir = if rng.chance(0.62) {
            head.dir.rotate(2 * either_way(rng))
        } else if rng.chance(0.86) {
            head.dir.rotate(either_way(rng))
        } else {
            Direction::random(rng)
        };
    }

    if rng.chance(mode.irregular_chance()) {
        let r = rng.next_f64();
        if r < 0.35 {
            head.dir = head.dir.rotate(rng.range_int(5) - 2);
        } else if r < 0.62 && !mode.is_pixel() {
            let (kx, ky) = KNIGHT[rng.index(KNIGHT.len())];
            head.nudge(kx, ky, w, h);
        } else if r < 0.84 {
            let dx = rng.range_int(25) - 12;
            let dy = rng.range_int(25) - 12;
            head.nudge(dx, dy, w, h);
        } else {
            head.reset_behavior(frame, w, h, rng);
        }
    }

    if !mode.is_pixel() && rng.chance(TELEPORT_CHANCE) {
        head.x = (rng.next_f64() * f64::from(w)) as i32;
        head.y = (rng.next_f64() * f64::from(h)) as i32;
    }

    let mut step = head.step;
    if head.bursting() {
        step += mode.burst_boost();
    }
    head.advance(step, w, h);

    let (mut x, mut y) = (head.x, head.y);
    if !mode.is_pixel() && rng.chance(PAINT_OFFSET_CHANCE) {
        x += rng.range_int(5) - 2;
        y += rng.range_int(5) - 2;
    }

    let (dx, dy) = head.dir.vector();
    let color = head.color;
    let t = mode.paint_strength();
    buffer.paint_blend(x, y, color, t);

    if rng.chance(0.52) {
        buffer.paint_blend(x + dx, y + dy, color, t * 0.52);
    }
    if rng.chance(0.36) {
        buffer.paint_blend(x - dy, y + dx, color, t * 0.42);
    }
    if rng.chance(0.22) {
        buffer.paint_blend(x + dy, y - dx, color, t * 0.36);
    }

    if mode.is_pixel() && rng.chance(SEGMENT_CHANCE) {
        let len = 3 + rng.range_int(7);
        let (mut sx, mut sy) = (x, y);
        for _ in 0..len {
            sx += dx;
            sy += dy;
            buffer.paint_blend(sx, sy, color, t * 0.35);
            if rng.chance(0.25) {
                buffer.paint_blend(sx - dy, sy + dx, color, t * 0.25);
            }
        }
    }

    if rng.chance(mode.spark_chance()) {
        let spark = palette.weighted_color(rng);
        let strength = 0.22 + rng.next_f64() * 0.28;
        buffer.paint_blend(x, y, spark, strength);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ExternalSource;

    /// Stream replaying `values`, then a constant that clears every small chance.
    fn scripted(values: &[f64]) -> EngineRng {
        let mut values = values.to_vec().into_iter();
        EngineRng::from_source(ExternalSource::new(move || values.next().unwrap_or(0.85)))
    }

    fn step(head: &mut Head, frame: u64, rng: &mut EngineRng) {
        let palette = PaletteManager::new();
        let mut buffer = PixelBuffer::new(64, 64).expect("buffer");
        step_head(head, &mut buffer, &palette, MovementMode::Glitch, Tick(frame), rng);
    }

    fn with_behavior(behavior: Behavior) -> Head {
        Head {
            behavior,
            until: 1_000,
            ..Head::at(10, 10, Direction::EAST, 1)
        }
    }

    #[test]
    fn rotation_wraps_both_ways() {
        assert_eq!(Direction::EAST.rotate(-1), Direction::new(7));
        assert_eq!(Direction::new(7).rotate(2), Direction::new(1));
        assert_eq!(Direction::EAST.rotate(-17), Direction::new(7));
    }

    #[test]
    fn toward_snaps_to_dominant_axis() {
        let mut rng = EngineRng::seeded("toward");
        assert_eq!(Direction::toward(10, 1, &mut rng), Direction::new(0));
        assert_eq!(Direction::toward(-10, 1, &mut rng), Direction::new(4));
        assert_eq!(Direction::toward(1, 10, &mut rng), Direction::new(2));
        assert_eq!(Direction::toward(1, -10, &mut rng), Direction::new(6));
        assert_eq!(Direction::toward(3, 3, &mut rng), Direction::new(1));
        assert_eq!(Direction::toward(-3, 3, &mut rng), Direction::new(3));
        assert_eq!(Direction::toward(-3, -3, &mut rng), Direction::new(5));
        assert_eq!(Direction::toward(3, -3, &mut rng), Direction::new(7));
        let before = rng.draws();
        let _ = Direction::toward(0, 0, &mut rng);
        assert_eq!(rng.draws(), before + 1);
    }

    #[test]
    fn heads_move_with_wraparound() {
        let mut east = Head::at(0, 0, Direction::EAST, 2);
        east.advance(east.step, 10, 10);
        assert_eq!((east.x, east.y), (2, 0));

        let mut north_west = Head::at(0, 0, Direction::NORTH_WEST, 2);
        north_west.advance(north_west.step, 10, 10);
        assert_eq!((north_west.x, north_west.y), (8, 8));
    }

    #[test]
    fn spatial_hash_is_stable_and_position_sensitive() {
        assert_eq!(spatial_hash(3, 4, 5, 6), spatial_hash(3, 4, 5, 6));
        assert_ne!(spatial_hash(3, 4, 5, 6), spatial_hash(4, 4, 5, 6));
        assert_eq!(spatial_hash(0, 0, 0, 0), 0);
    }

    #[test]
    fn reset_behavior_draws_bounded_values() {
        let mut rng = EngineRng::seeded("reset");
        let mut head = Head::at(1, 1, Direction::EAST, 1);
        for frame in 0..300 {
            head.zig_pair = Some((Direction::EAST, Direction::new(2)));
            head.burst = 5;
            head.reset_behavior(Tick(frame), 64, 48, &mut rng);
            assert!((frame + 90..frame + 330).contains(&head.until));
            assert!((2..=10).contains(&head.turn_every));
            assert!((0..64).contains(&head.center.0));
            assert!((0..48).contains(&head.center.1));
            assert!(head.spin == 1 || head.spin == -1);
            assert_eq!(head.zig_pair, None);
            assert_eq!(head.burst, 0);
        }
    }

    #[test]
    fn spawn_creates_heads_inside_buffer() {
        let mut rng = EngineRng::seeded("spawn");
        let palette = PaletteManager::new();
        let pool = HeadPool::spawn(HeadPool::count_for(64, 64), 64, 64, &palette, Tick::zero(), &mut rng);
        assert_eq!(pool.len(), 64);
        for head in pool.heads() {
            assert!((0..64).contains(&head.x) && (0..64).contains(&head.y));
            assert!((1..=3).contains(&head.step));
            assert!(palette.current().colors.contains(&head.color));
        }
    }

    #[test]
    fn step_budget_is_clamped() {
        assert_eq!(HeadPool::steps_for(64, 64, MovementMode::Pixel), 900);
        assert_eq!(HeadPool::steps_for(1000, 1000, MovementMode::Datamosh), 4800);
        assert_eq!(HeadPool::steps_for(200, 200, MovementMode::Glitch), 1040);
    }

    #[test]
    fn stepping_keeps_heads_on_the_torus() {
        let mut rng = EngineRng::seeded("walk");
        let palette = PaletteManager::new();
        let mut buffer = PixelBuffer::new(64, 64).expect("buffer");
        for mode in MovementMode::ALL {
            let mut pool = HeadPool::spawn(20, 64, 64, &palette, Tick::zero(), &mut rng);
            for frame in 1..40 {
                pool.step_all(&mut buffer, &palette, *mode, Tick(frame), &mut rng);
            }
            for head in pool.heads() {
                assert!((0..64).contains(&head.x) && (0..64).contains(&head.y));
                assert!(head.dir.index() < 8);
            }
        }
        assert!(buffer.data().chunks_exact(4).any(|px| px[..3] != [0, 0, 0]));
    }

    #[test]
    fn grid_turns_by_quarters_or_snaps_to_cardinals() {
        let mut head = with_behavior(Behavior::Grid);
        head.reconsider(Tick(1), 64, 64, &mut scripted(&[0.1, 0.9]));
        assert_eq!(head.dir, Direction::new(6));

        head.dir = Direction::new(1);
        head.reconsider(Tick(1), 64, 64, &mut scripted(&[0.85, 0.6]));
        assert_eq!(head.dir, Direction::new(4));
    }

    #[test]
    fn grid_reconsiders_only_on_its_cadence() {
        let mut head = Head {
            turn_every: 4,
            dir: Direction::new(1),
            ..with_behavior(Behavior::Grid)
        };
        let mut rng = scripted(&[]);
        for frame in 1..4 {
            step(&mut head, frame, &mut rng);
            assert_eq!(head.dir, Direction::new(1), "frame {frame}");
        }
        step(&mut head, 4, &mut rng);
        assert_eq!(head.dir, Direction::new(6));
        let (dx, dy) = head.dir.vector();
        assert!(dx == 0 || dy == 0);
    }

    #[test]
    fn zigzag_alternates_between_its_pair() {
        let mut head = with_behavior(Behavior::Zigzag);
        let mut rng = scripted(&[0.1, 0.9, 0.9, 0.9, 0.01]);
        let mut dirs = Vec::new();
        for _ in 0..3 {
            head.reconsider(Tick(1), 64, 64, &mut rng);
            dirs.push(head.dir.index());
        }
        assert_eq!(dirs, vec![0, 2, 0]);
        assert_eq!(head.zig_pair, Some((Direction::new(0), Direction::new(2))));

        head.reconsider(Tick(1), 64, 64, &mut rng);
        assert_eq!(head.dir, Direction::new(2));
        assert_eq!(head.zig_pair, None);
    }

    #[test]
    fn orbit_heads_tangent_to_its_centre() {
        let mut head = Head {
            center: (20, 10),
            spin: 1,
            ..with_behavior(Behavior::Orbit)
        };
        head.reconsider(Tick(1), 64, 64, &mut scripted(&[0.9, 0.9]));
        assert_eq!(head.dir, Direction::new(6));
        let (dx, dy) = head.dir.vector();
        assert_eq!(dx * (head.x - 20) + dy * (head.y - 10), 0);

        head.x = 20;
        head.y = 30;
        head.reconsider(Tick(1), 64, 64, &mut scripted(&[0.9, 0.9]));
        assert_eq!(head.dir, Direction::new(4));

        head.x = 10;
        head.y = 10;
        head.spin = -1;
        head.reconsider(Tick(1), 64, 64, &mut scripted(&[0.01, 0.01]));
        assert_eq!(head.dir, Direction::new(2));
        assert_eq!(head.center, (21, 10));
        assert_eq!(head.spin, 1);
    }

    #[test]
    fn noise_turns_follow_the_spatial_hash() {
        let cases = [
            ((0, 3), 7),
            ((0, 4), 0),
            ((0, 0), 1),
            ((0, 12), 6),
            ((0, 1), 2),
            ((0, 6), 4),
            ((8, 13), 1),
        ];
        let mut rng = EngineRng::seeded("noise");
        for ((x, y), expected) in cases {
            let mut head = Head {
                x,
                y,
                seed: 7,
                ..with_behavior(Behavior::Noise)
            };
            head.reconsider(Tick(3), 64, 64, &mut rng);
            assert_eq!(head.dir, Direction::new(expected), "at ({x}, {y})");
        }
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn burst_boosts_the_step_for_its_window() {
        let mut head = Head {
            x: 0,
            y: 0,
            burst: 2,
            turn_every: 1,
            ..with_behavior(Behavior::Burst)
        };
        let boost = MovementMode::Glitch.burst_boost();
        let mut rng = scripted(&[]);
        let mut xs = Vec::new();
        for frame in 1..=3 {
            step(&mut head, frame, &mut rng);
            xs.push(head.x);
        }
        assert_eq!(xs, vec![1 + boost, 2 + boost, 3 + boost]);
        assert_eq!(head.burst, 0);
        assert_eq!(head.y, 0);
    }

    #[test]
    fn reroll_needs_expiry_and_the_early_chance() {
        let fresh = || Head {
            until: 10,
            turn_every: 4,
            ..with_behavior(Behavior::Grid)
        };

        let mut early = fresh();
        step(&mut early, 5, &mut scripted(&[0.0]));
        assert_eq!((early.behavior, early.until), (Behavior::Grid, 10));

        let mut unlucky = fresh();
        step(&mut unlucky, 10, &mut scripted(&[0.5]));
        assert_eq!((unlucky.behavior, unlucky.until), (Behavior::Grid, 10));

        let mut rerolled = fresh();
        step(&mut rerolled, 10, &mut scripted(&[0.1]));
        assert_eq!(rerolled.behavior, Behavior::Noise);
        assert!((100..330).contains(&rerolled.until));
        assert_eq!(rerolled.turn_every, 9);
    }
}
