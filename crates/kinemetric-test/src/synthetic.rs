//! Synthetic landmark captures
//!
//! Generators produce noise-free frame sequences whose geometry is known
//! exactly (knee angle, arm elevation, ankle sway, hip rise), so the
//! calculators' outputs can be checked against closed-form values.
//! `jitter` and `occlude` degrade a capture afterwards.
//!
//! Coordinates follow the pose convention: normalized, y grows downward,
//! one pose unit is 100 cm at the default calibration.

use kinemetric_core::{Landmark, LandmarkFrame, LandmarkName, Side};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Capture frame rate
pub const FRAME_RATE: f64 = 30.0;

/// Visibility given to every generated landmark
pub const VISIBLE: f64 = 0.95;

const HIP_Y: f64 = 0.52;
const THIGH: f64 = 0.20;
const SHIN: f64 = 0.18;
const ELBOW_REACH: f64 = 0.15;

fn lateral(side: Side) -> f64 {
    match side {
        Side::Left => -1.0,
        Side::Right => 1.0,
    }
}

fn put(frame: &mut LandmarkFrame, name: LandmarkName, x: f64, y: f64, z: f64) {
    frame.insert(name, Landmark::new(x, y, z, VISIBLE));
}

/// Upright body with arms hanging, shifted down by `dy`
fn upper_body(frame: &mut LandmarkFrame, dy: f64) {
    put(frame, LandmarkName::Nose, 0.5, 0.05 + dy, -0.05);
    put(frame, LandmarkName::LeftEye, 0.49, 0.04 + dy, -0.04);
    put(frame, LandmarkName::RightEye, 0.51, 0.04 + dy, -0.04);
    put(frame, LandmarkName::LeftEar, 0.47, 0.05 + dy, 0.0);
    put(frame, LandmarkName::RightEar, 0.53, 0.05 + dy, 0.0);
    for side in [Side::Left, Side::Right] {
        let s = lateral(side);
        put(frame, LandmarkName::shoulder(side), 0.5 + 0.08 * s, 0.22 + dy, 0.0);
        put(frame, LandmarkName::elbow(side), 0.5 + 0.09 * s, 0.37 + dy, 0.0);
        put(frame, LandmarkName::wrist(side), 0.5 + 0.09 * s, 0.50 + dy, 0.0);
    }
}

/// One straight leg with the foot flat, shifted down by `dy`
fn straight_leg(frame: &mut LandmarkFrame, side: Side, dy: f64, ankle_dx: f64) {
    let x = 0.5 + 0.05 * lateral(side);
    put(frame, LandmarkName::hip(side), x, HIP_Y + dy, 0.0);
    put(frame, LandmarkName::knee(side), x, HIP_Y + THIGH + dy, 0.0);
    let ankle_y = HIP_Y + THIGH + SHIN + dy;
    put(frame, LandmarkName::ankle(side), x + ankle_dx, ankle_y, 0.0);
    put(frame, LandmarkName::heel(side), x + ankle_dx, ankle_y + 0.03, 0.02);
    put(frame, LandmarkName::foot_index(side), x + ankle_dx, ankle_y + 0.04, -0.06);
}

/// Neutral standing frame
pub fn standing_frame(index: usize) -> LandmarkFrame {
    shifted_standing(index, 0.0)
}

fn shifted_standing(index: usize, dy: f64) -> LandmarkFrame {
    let mut frame = LandmarkFrame::new(index);
    frame.timestamp_ms = Some((index as f64 * 1000.0 / FRAME_RATE) as u64);
    upper_body(&mut frame, dy);
    for side in [Side::Left, Side::Right] {
        straight_leg(&mut frame, side, dy, 0.0);
    }
    frame
}

/// Motionless standing capture
pub fn standing(frames: usize) -> Vec<LandmarkFrame> {
    (0..frames).map(standing_frame).collect()
}

/// Squat frame with both knees at exactly `knee_angle` degrees.
///
/// The shin swings forward in the sagittal (z) plane so the frontal view
/// stays aligned.
pub fn squat_frame(index: usize, knee_angle: f64) -> LandmarkFrame {
    let mut frame = standing_frame(index);
    let theta = knee_angle.to_radians();
    for side in [Side::Left, Side::Right] {
        let x = 0.5 + 0.05 * lateral(side);
        let knee_y = HIP_Y + THIGH;
        let ankle_y = knee_y - SHIN * theta.cos();
        let ankle_z = SHIN * theta.sin();
        put(&mut frame, LandmarkName::ankle(side), x, ankle_y, ankle_z);
        put(&mut frame, LandmarkName::heel(side), x, ankle_y + 0.03, ankle_z + 0.02);
        put(&mut frame, LandmarkName::foot_index(side), x, ankle_y + 0.04, ankle_z - 0.06);
    }
    frame
}

/// Capture held at a constant knee angle
pub fn squat_hold(knee_angle: f64, frames: usize) -> Vec<LandmarkFrame> {
    (0..frames).map(|i| squat_frame(i, knee_angle)).collect()
}

/// Descent from standing to `bottom_angle` and back up.
///
/// With an odd frame count the middle frame sits exactly at the bottom.
pub fn squat_rep(bottom_angle: f64, frames: usize) -> Vec<LandmarkFrame> {
    let top = 178.0;
    (0..frames)
        .map(|i| {
            let phase = triangle(i, frames);
            squat_frame(i, top - (top - bottom_angle) * phase)
        })
        .collect()
}

/// Tent profile 0 → 1 → 0 over `frames` samples
fn triangle(i: usize, frames: usize) -> f64 {
    if frames < 2 {
        return 1.0;
    }
    let t = i as f64 / (frames - 1) as f64;
    1.0 - (2.0 * t - 1.0).abs()
}

/// Standing frame with both arms elevated by the given angles
pub fn arms_frame(index: usize, left_deg: f64, right_deg: f64) -> LandmarkFrame {
    let mut frame = standing_frame(index);
    for (side, raise) in [(Side::Left, left_deg), (Side::Right, right_deg)] {
        let s = lateral(side);
        let (sx, sy) = (0.5 + 0.08 * s, 0.22);
        let r = raise.to_radians();
        let (dx, dy) = (s * r.sin(), r.cos());
        put(&mut frame, LandmarkName::elbow(side), sx + ELBOW_REACH * dx, sy + ELBOW_REACH * dy, 0.0);
        put(&mut frame, LandmarkName::wrist(side), sx + 2.0 * ELBOW_REACH * dx, sy + 2.0 * ELBOW_REACH * dy, 0.0);
    }
    frame
}

/// Both arms sweep from hanging to `peak_deg` and back.
///
/// `right_deficit` reduces the right arm's peak; with an odd frame count
/// the middle frame holds the peak.
pub fn shoulder_sweep(peak_deg: f64, right_deficit: f64, frames: usize) -> Vec<LandmarkFrame> {
    (0..frames)
        .map(|i| {
            let phase = triangle(i, frames);
            arms_frame(i, peak_deg * phase, (peak_deg - right_deficit).max(0.0) * phase)
        })
        .collect()
}

/// Single-leg stance capture parameters
#[derive(Clone, Debug)]
pub struct StanceCapture {
    /// Stance leg
    pub side: Side,
    /// Standard deviation of the stance ankle's x position, in cm
    pub sway_cm: f64,
    /// Constant drop of the free-leg hip, in degrees
    pub pelvic_drop_deg: f64,
    pub frames: usize,
}

impl Default for StanceCapture {
    fn default() -> Self {
        StanceCapture {
            side: Side::Left,
            sway_cm: 1.0,
            pelvic_drop_deg: 0.0,
            frames: 300,
        }
    }
}

impl StanceCapture {
    pub fn side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub fn sway(mut self, sway_cm: f64) -> Self {
        self.sway_cm = sway_cm;
        self
    }

    pub fn pelvic_drop(mut self, degrees: f64) -> Self {
        self.pelvic_drop_deg = degrees;
        self
    }

    pub fn frames(mut self, frames: usize) -> Self {
        self.frames = frames;
        self
    }

    /// Generate the capture.
    ///
    /// The stance ankle alternates between ±sway around its neutral x, so
    /// its population standard deviation is exactly `sway_cm` for an even
    /// frame count.
    pub fn generate(&self) -> Vec<LandmarkFrame> {
        let stance = self.side;
        let free = stance.opposite();
        let amplitude = self.sway_cm / 100.0;
        let hip_width = 0.10;
        let drop = hip_width * self.pelvic_drop_deg.to_radians().tan();

        (0..self.frames)
            .map(|i| {
                let mut frame = LandmarkFrame::new(i);
                frame.timestamp_ms = Some((i as f64 * 1000.0 / FRAME_RATE) as u64);
                upper_body(&mut frame, 0.0);
                let offset = if i % 2 == 0 { amplitude } else { -amplitude };
                straight_leg(&mut frame, stance, 0.0, offset);

                let x = 0.5 + 0.05 * lateral(free);
                let hip_y = HIP_Y + drop;
                put(&mut frame, LandmarkName::hip(free), x, hip_y, 0.0);
                put(&mut frame, LandmarkName::knee(free), x, hip_y + 0.12, -0.16);
                put(&mut frame, LandmarkName::ankle(free), x, hip_y + 0.28, -0.08);
                put(&mut frame, LandmarkName::heel(free), x, hip_y + 0.30, -0.06);
                put(&mut frame, LandmarkName::foot_index(free), x, hip_y + 0.30, -0.14);
                frame
            })
            .collect()
    }
}

/// Countermovement jump capture parameters
#[derive(Clone, Debug)]
pub struct JumpCapture {
    /// Peak hip rise above standing, in cm
    pub rise_cm: f64,
    /// Standing frames before the countermovement
    pub baseline_frames: usize,
    pub dip_frames: usize,
    /// Maximum hip lowering during the countermovement, in pose units
    pub dip_depth: f64,
    /// Airborne frames; odd counts put the peak on a frame
    pub flight_frames: usize,
    pub landing_frames: usize,
    /// Lateral hip oscillation after touchdown, in cm
    pub landing_sway_cm: f64,
}

impl Default for JumpCapture {
    fn default() -> Self {
        JumpCapture {
            rise_cm: 40.0,
            baseline_frames: 10,
            dip_frames: 9,
            dip_depth: 0.08,
            flight_frames: 17,
            landing_frames: 20,
            landing_sway_cm: 0.0,
        }
    }
}

impl JumpCapture {
    pub fn rise(mut self, rise_cm: f64) -> Self {
        self.rise_cm = rise_cm;
        self
    }

    pub fn landing_sway(mut self, sway_cm: f64) -> Self {
        self.landing_sway_cm = sway_cm;
        self
    }

    /// Index of the frame at peak height
    pub fn peak_frame(&self) -> usize {
        self.baseline_frames + self.dip_frames + (self.flight_frames + 1) / 2 - 1
    }

    pub fn total_frames(&self) -> usize {
        self.baseline_frames + self.dip_frames + self.flight_frames + self.landing_frames
    }

    pub fn generate(&self) -> Vec<LandmarkFrame> {
        let mut frames = Vec::with_capacity(self.total_frames());
        let mut index = 0;

        for _ in 0..self.baseline_frames {
            frames.push(standing_frame(index));
            index += 1;
        }
        for j in 1..=self.dip_frames {
            let phase = (std::f64::consts::PI * j as f64 / (self.dip_frames + 1) as f64).sin();
            frames.push(crouch_frame(index, self.dip_depth * phase));
            index += 1;
        }
        let span = (self.flight_frames + 1) as f64;
        for k in 1..=self.flight_frames {
            let t = k as f64 / span;
            let rise = self.rise_cm / 100.0 * 4.0 * t * (1.0 - t);
            frames.push(shifted_standing(index, -rise));
            index += 1;
        }
        let sway = self.landing_sway_cm / 100.0;
        for j in 0..self.landing_frames {
            let mut frame = standing_frame(index);
            if sway > 0.0 {
                let dx = if j % 2 == 0 { sway } else { -sway };
                shift_x(&mut frame, dx);
            }
            frames.push(frame);
            index += 1;
        }
        frames
    }
}

/// Standing frame with hips lowered by `depth` and feet planted; knees
/// travel forward to keep thigh and shin lengths.
fn crouch_frame(index: usize, depth: f64) -> LandmarkFrame {
    let mut frame = shifted_standing(index, depth);
    let reach = THIGH + SHIN - depth;
    // knee position on the circle intersection of thigh and shin
    let along = (THIGH * THIGH - SHIN * SHIN + reach * reach) / (2.0 * reach);
    let forward = (THIGH * THIGH - along * along).max(0.0).sqrt();
    for side in [Side::Left, Side::Right] {
        let x = 0.5 + 0.05 * lateral(side);
        let hip_y = HIP_Y + depth;
        put(&mut frame, LandmarkName::knee(side), x, hip_y + along, -forward);
        let ankle_y = HIP_Y + THIGH + SHIN;
        put(&mut frame, LandmarkName::ankle(side), x, ankle_y, 0.0);
        put(&mut frame, LandmarkName::heel(side), x, ankle_y + 0.03, 0.02);
        put(&mut frame, LandmarkName::foot_index(side), x, ankle_y + 0.04, -0.06);
    }
    frame
}

fn shift_x(frame: &mut LandmarkFrame, dx: f64) {
    for landmark in frame.landmarks.values_mut() {
        landmark.position.x += dx;
    }
}

/// Add uniform noise of `amplitude` pose units to every coordinate
pub fn jitter(frames: &[LandmarkFrame], amplitude: f64, seed: u64) -> Vec<LandmarkFrame> {
    let mut rng = StdRng::seed_from_u64(seed);
    frames
        .iter()
        .map(|frame| {
            let mut frame = frame.clone();
            for landmark in frame.landmarks.values_mut() {
                landmark.position.x += rng.gen_range(-amplitude..=amplitude);
                landmark.position.y += rng.gen_range(-amplitude..=amplitude);
                landmark.position.z += rng.gen_range(-amplitude..=amplitude);
            }
            frame
        })
        .collect()
}

/// Drop the named landmarks' visibility below the usable threshold
pub fn occlude(frames: &[LandmarkFrame], names: &[LandmarkName]) -> Vec<LandmarkFrame> {
    frames
        .iter()
        .map(|frame| {
            let mut frame = frame.clone();
            for name in names {
                if let Some(landmark) = frame.landmarks.get_mut(name) {
                    landmark.visibility = 0.1;
                }
            }
            frame
        })
        .collect()
}

/// Same frames with every landmark occluded
pub fn blackout(frames: &[LandmarkFrame]) -> Vec<LandmarkFrame> {
    occlude(frames, LandmarkName::all())
}
