//! Rubik's cube state and layer-turn animation.
//!
//! The cube is 27 cubies on the integer lattice `[-1, 1]³`. A turn rotates one outer layer
//! by a multiple of 90°. Turns are animated one at a time from a queue; the logical state
//! only changes once a turn has finished.

use std::{collections::VecDeque, f32::consts::FRAC_PI_2, fmt, str::FromStr};

use glam::{IVec3, Mat3, Mat4, Quat, Vec3};
use rand::Rng;

use crate::geometry::CUBE_FACE_NORMALS;

/// Sticker colours in [`CUBE_FACE_NORMALS`] order: R, L, U, D, F, B.
pub const STICKER_COLORS: [Vec3; 6] = [
    Vec3::new(0.80, 0.05, 0.05),
    Vec3::new(1.00, 0.45, 0.00),
    Vec3::new(0.95, 0.95, 0.95),
    Vec3::new(1.00, 0.85, 0.00),
    Vec3::new(0.00, 0.60, 0.20),
    Vec3::new(0.00, 0.25, 0.80),
];

/// Colour of the plastic between stickers.
pub const BODY_COLOR: Vec3 = Vec3::new(0.04, 0.04, 0.04);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    R,
    L,
    U,
    D,
    F,
    B,
}

impl Face {
    pub const ALL: [Face; 6] = [Face::R, Face::L, Face::U, Face::D, Face::F, Face::B];

    /// Outward normal of the layer this face turns.
    pub fn normal(self) -> IVec3 {
        match self {
            Face::R => IVec3::X,
            Face::L => IVec3::NEG_X,
            Face::U => IVec3::Y,
            Face::D => IVec3::NEG_Y,
            Face::F => IVec3::Z,
            Face::B => IVec3::NEG_Z,
        }
    }

    fn letter(self) -> char {
        match self {
            Face::R => 'R',
            Face::L => 'L',
            Face::U => 'U',
            Face::D => 'D',
            Face::F => 'F',
            Face::B => 'B',
        }
    }
}

/// A turn of one face: 1 = clockwise quarter turn seen from outside, -1 = counter-clockwise,
/// 2 = half turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub face: Face,
    pub turns: i8,
}

impl Move {
    pub fn new(face: Face, turns: i8) -> Self {
        Self { face, turns }
    }

    pub fn inverse(self) -> Self {
        Self {
            face: self.face,
            turns: if self.turns == 2 { 2 } else { -self.turns },
        }
    }

    /// Total rotation angle about the face normal, in radians.
    pub fn angle(self) -> f32 {
        -FRAC_PI_2 * self.turns as f32
    }

    pub fn rotation(self, fraction: f32) -> Quat {
        Quat::from_axis_angle(self.face.normal().as_vec3(), self.angle() * fraction)
    }

    /// Parses a space-separated sequence such as `"R U' F2"`.
    pub fn parse_sequence(s: &str) -> Result<Vec<Move>, String> {
        s.split_whitespace().map(str::parse).collect()
    }
}

impl FromStr for Move {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let face = match chars.next() {
            Some('R') => Face::R,
            Some('L') => Face::L,
            Some('U') => Face::U,
            Some('D') => Face::D,
            Some('F') => Face::F,
            Some('B') => Face::B,
            _ => return Err(format!("Invalid face in move '{s}'")),
        };
        let turns = match chars.as_str() {
            "" => 1,
            "'" => -1,
            "2" | "2'" => 2,
            rest => return Err(format!("Invalid suffix '{rest}' in move '{s}'")),
        };
        Ok(Self { face, turns })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.turns {
            1 => "",
            -1 => "'",
            _ => "2",
        };
        write!(f, "{}{}", self.face.letter(), suffix)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cubie {
    /// Position in the solved cube; decides the sticker colours.
    pub home: IVec3,
    pub position: IVec3,
    pub orientation: Quat,
}

impl Cubie {
    /// Sticker colours in [`CUBE_FACE_NORMALS`] order, in the cubie's own frame.
    pub fn face_colors(&self) -> [Vec3; 6] {
        std::array::from_fn(|i| {
            let normal = CUBE_FACE_NORMALS[i].as_ivec3();
            if self.home.dot(normal) == 1 {
                STICKER_COLORS[i]
            } else {
                BODY_COLOR
            }
        })
    }
}

struct Turn {
    mv: Move,
    progress: f32,
}

pub struct RubiksCube {
    cubies: Vec<Cubie>,
    queue: VecDeque<Move>,
    current: Option<Turn>,
    history: Vec<Move>,
    /// Quarter turns per second.
    pub speed: f32,
    /// Distance between neighbouring cubie centres.
    pub spacing: f32,
}

impl Default for RubiksCube {
    fn default() -> Self {
        Self::new()
    }
}

impl RubiksCube {
    pub fn new() -> Self {
        let mut cubies = Vec::with_capacity(27);
        for x in -1..=1 {
            for y in -1..=1 {
                for z in -1..=1 {
                    let home = IVec3::new(x, y, z);
                    cubies.push(Cubie {
                        home,
                        position: home,
                        orientation: Quat::IDENTITY,
                    });
                }
            }
        }
        Self {
            cubies,
            queue: VecDeque::new(),
            current: None,
            history: Vec::new(),
            speed: 4.0,
            spacing: 1.02,
        }
    }

    pub fn cubies(&self) -> &[Cubie] {
        &self.cubies
    }

    /// Applies a turn immediately, bypassing the animation queue.
    pub fn apply(&mut self, mv: Move) {
        let normal = mv.face.normal();
        let rotation = Mat3::from_quat(mv.rotation(1.0));
        for cubie in self.cubies.iter_mut().filter(|c| c.position.dot(normal) == 1) {
            cubie.position = (rotation * cubie.position.as_vec3()).round().as_ivec3();
            cubie.orientation = snap(mv.rotation(1.0) * cubie.orientation);
        }
        push_reduced(&mut self.history, mv);
    }

    /// Starts animating a turn, or queues it behind the turns already in flight.
    pub fn begin(&mut self, mv: Move) {
        self.queue.push_back(mv);
    }

    pub fn is_animating(&self) -> bool {
        self.current.is_some() || !self.queue.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.queue.len() + usize::from(self.current.is_some())
    }

    /// Committed turns with consecutive turns of the same face merged; empty once the cube is
    /// back in the state it started from by undoing them.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Advances the animation; finished turns are committed to the logical state.
    pub fn update(&mut self, dt: f32) {
        let mut remaining = dt * self.speed;
        while remaining > 0.0 {
            if self.current.is_none() {
                match self.queue.pop_front() {
                    Some(mv) => self.current = Some(Turn { mv, progress: 0.0 }),
                    None => return,
                }
            }
            let Some(turn) = self.current.as_mut() else {
                return;
            };
            let quarter_turns = turn.mv.turns.unsigned_abs() as f32;
            let needed = (1.0 - turn.progress) * quarter_turns;
            if remaining >= needed {
                remaining -= needed;
                let mv = turn.mv;
                self.current = None;
                self.apply(mv);
            } else {
                turn.progress += remaining / quarter_turns;
                remaining = 0.0;
            }
        }
    }

    /// Model transform of cubie `index`, including any in-flight layer rotation.
    pub fn cubie_transform(&self, index: usize) -> Mat4 {
        let Some(cubie) = self.cubies.get(index) else {
            return Mat4::IDENTITY;
        };
        let base = Mat4::from_rotation_translation(
            cubie.orientation,
            cubie.position.as_vec3() * self.spacing,
        );
        match &self.current {
            Some(turn) if cubie.position.dot(turn.mv.face.normal()) == 1 => {
                Mat4::from_quat(turn.mv.rotation(ease(turn.progress))) * base
            }
            _ => base,
        }
    }

    pub fn is_solved(&self) -> bool {
        self.cubies.iter().all(|c| {
            c.position == c.home && c.orientation.dot(Quat::IDENTITY).abs() > 1.0 - 1e-4
        })
    }

    /// Queues `count` random turns, never turning the same face twice in a row.
    pub fn scramble<R: Rng>(&mut self, rng: &mut R, count: usize) -> Vec<Move> {
        let mut last: Option<Face> = self
            .queue
            .back()
            .or(self.current.as_ref().map(|turn| &turn.mv))
            .map(|m| m.face);
        let mut moves = Vec::with_capacity(count);
        while moves.len() < count {
            let face = Face::ALL[rng.random_range(0..Face::ALL.len())];
            if Some(face) == last {
                continue;
            }
            let turns = [1, -1, 2][rng.random_range(0..3)];
            let mv = Move::new(face, turns);
            self.begin(mv);
            moves.push(mv);
            last = Some(face);
        }
        moves
    }

    /// Replaces the queued turns with the inverse of every committed turn and the one in
    /// flight, returning to the solved state. Calling it again before or after the undo has
    /// played out queues nothing new.
    pub fn unwind(&mut self) {
        let mut undo = self.history.clone();
        if let Some(turn) = &self.current {
            push_reduced(&mut undo, turn.mv);
        }
        self.queue.clear();
        self.queue.extend(undo.into_iter().rev().map(Move::inverse));
    }

    /// Drops pending turns and commits the one in flight.
    pub fn finish(&mut self) {
        self.queue.clear();
        if let Some(turn) = self.current.take() {
            self.apply(turn.mv);
        }
    }
}

/// Appends `mv`, merging it into the last move when both turn the same face.
fn push_reduced(moves: &mut Vec<Move>, mv: Move) {
    let Some(last) = moves.last_mut().filter(|last| last.face == mv.face) else {
        moves.push(mv);
        return;
    };
    match (last.turns + mv.turns).rem_euclid(4) {
        0 => {
            moves.pop();
        }
        1 => last.turns = 1,
        2 => last.turns = 2,
        _ => last.turns = -1,
    }
}

fn ease(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Rounds a rotation made of right angles back onto the exact lattice.
fn snap(q: Quat) -> Quat {
    let m = Mat3::from_quat(q.normalize());
    let rounded = Mat3::from_cols(m.x_axis.round(), m.y_axis.round(), m.z_axis.round());
    Quat::from_mat3(&rounded).normalize()
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn parses_notation() {
        let moves = Move::parse_sequence("R U' F2 B2'").unwrap();
        assert_eq!(
            moves,
            vec![
                Move::new(Face::R, 1),
                Move::new(Face::U, -1),
                Move::new(Face::F, 2),
                Move::new(Face::B, 2),
            ]
        );
        assert!("X".parse::<Move>().is_err());
        assert!("R3".parse::<Move>().is_err());
        assert_eq!(Move::new(Face::L, -1).to_string(), "L'");
    }

    #[test]
    fn four_quarter_turns_restore() {
        for face in Face::ALL {
            let mut cube = RubiksCube::new();
            for _ in 0..4 {
                assert!(!cube.is_solved() || cube.history().is_empty());
                cube.apply(Move::new(face, 1));
            }
            assert!(cube.is_solved(), "{face:?}");
            assert!(cube.history().is_empty());
        }
    }

    #[test]
    fn sequence_then_inverse_restores() {
        let mut cube = RubiksCube::new();
        let moves = Move::parse_sequence("R U R' U' F2 L D' B").unwrap();
        for mv in &moves {
            cube.apply(*mv);
        }
        assert!(!cube.is_solved());
        for mv in moves.iter().rev() {
            cube.apply(mv.inverse());
        }
        assert!(cube.is_solved());
    }

    #[test]
    fn clockwise_right_moves_front_to_up() {
        let mut cube = RubiksCube::new();
        let index = cube
            .cubies()
            .iter()
            .position(|c| c.home == IVec3::new(1, 0, 1))
            .unwrap();
        cube.apply(Move::new(Face::R, 1));
        assert_eq!(cube.cubies()[index].position, IVec3::new(1, 1, 0));
    }

    #[test]
    fn animation_commits_after_full_turn() {
        let mut cube = RubiksCube::new();
        cube.begin(Move::new(Face::U, 1));
        cube.update(0.1);
        assert!(cube.is_animating());
        assert!(cube.is_solved());

        cube.update(1.0);
        assert!(!cube.is_animating());
        assert!(!cube.is_solved());
    }

    #[test]
    fn half_turn_takes_twice_as_long() {
        let mut cube = RubiksCube::new();
        cube.speed = 1.0;
        cube.begin(Move::new(Face::F, 2));
        cube.update(1.5);
        assert!(cube.is_animating());
        cube.update(0.6);
        assert!(!cube.is_animating());
    }

    #[test]
    fn scramble_then_unwind_solves() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut cube = RubiksCube::new();
        let moves = cube.scramble(&mut rng, 25);
        assert_eq!(moves.len(), 25);
        assert!(moves.windows(2).all(|w| w[0].face != w[1].face));

        cube.update(3.0);
        cube.unwind();
        while cube.is_animating() {
            cube.update(0.25);
        }
        assert!(cube.is_solved());
    }

    #[test]
    fn stickers_face_outwards() {
        let cube = RubiksCube::new();
        let corner = cube
            .cubies()
            .iter()
            .find(|c| c.home == IVec3::new(1, 1, 1))
            .unwrap();
        let stickers = corner
            .face_colors()
            .iter()
            .filter(|&&c| c != BODY_COLOR)
            .count();
        assert_eq!(stickers, 3);

        let core = cube.cubies().iter().find(|c| c.home == IVec3::ZERO).unwrap();
        assert!(core.face_colors().iter().all(|&c| c == BODY_COLOR));
    }

    #[test]
    fn in_flight_layer_is_partially_rotated() {
        let mut cube = RubiksCube::new();
        cube.speed = 1.0;
        cube.begin(Move::new(Face::R, 1));
        cube.update(0.5);
        let index = cube
            .cubies()
            .iter()
            .position(|c| c.home == IVec3::new(1, 0, 1))
            .unwrap();
        let p = cube.cubie_transform(index).transform_point3(Vec3::ZERO);
        // Half way between +Z and +Y on the right layer.
        assert!(p.y > 0.1 && p.z > 0.1);
        assert!((p.x - cube.spacing).abs() < 1e-5);
    }

    #[test]
    fn unwinding_twice_queues_nothing() {
        let mut cube = RubiksCube::new();
        cube.apply(Move::new(Face::R, 1));
        cube.apply(Move::new(Face::U, 1));
        cube.unwind();
        assert_eq!(cube.pending(), 2);
        // Calling again before anything commits does not double the work.
        cube.unwind();
        assert_eq!(cube.pending(), 2);
        while cube.is_animating() {
            cube.update(0.25);
        }
        assert!(cube.is_solved());
        assert!(cube.history().is_empty());

        cube.unwind();
        assert_eq!(cube.pending(), 0);
    }

    #[test]
    fn same_face_turns_merge_in_history() {
        let mut cube = RubiksCube::new();
        cube.apply(Move::new(Face::F, 1));
        cube.apply(Move::new(Face::F, 1));
        assert_eq!(cube.history(), [Move::new(Face::F, 2)]);
        cube.apply(Move::new(Face::F, 1));
        assert_eq!(cube.history(), [Move::new(Face::F, -1)]);
        cube.apply(Move::new(Face::F, 1));
        assert!(cube.history().is_empty());
    }

    #[test]
    fn scramble_avoids_the_face_in_flight() {
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut cube = RubiksCube::new();
            cube.speed = 1.0;
            cube.begin(Move::new(Face::D, 1));
            cube.update(0.3);
            assert_eq!(cube.pending(), 1);
            let moves = cube.scramble(&mut rng, 3);
            assert_ne!(moves[0].face, Face::D, "seed {seed}");
        }
    }
}
