//! Rubric constants
//!
//! Every weight, tolerance and feedback threshold used by the calculators
//! lives here, one table per assessment.

use serde::{Deserialize, Serialize};

/// Squat rubric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SquatRubric {
    /// Knee angle at optimal depth
    pub optimal_knee_angle: f64,
    /// Distance from optimal at which ROM reaches 0
    pub knee_angle_tolerance: f64,
    /// Trunk lean allowed without penalty
    pub lean_tolerance: f64,
    /// Points lost per degree of lean beyond tolerance
    pub lean_penalty: f64,
    /// Control placeholder
    pub control_score: f64,
    pub rom_weight: f64,
    pub trunk_weight: f64,
    pub control_weight: f64,
    /// Minimum knee angle above which depth feedback is given
    pub shallow_depth_angle: f64,
    /// Trunk lean above which lean feedback is given
    pub excessive_lean: f64,
    pub good_band: f64,
    pub fair_band: f64,
}

impl Default for SquatRubric {
    fn default() -> Self {
        Self {
            optimal_knee_angle: 100.0,
            knee_angle_tolerance: 80.0,
            lean_tolerance: 10.0,
            lean_penalty: 4.0,
            control_score: 100.0,
            rom_weight: 0.4,
            trunk_weight: 0.4,
            control_weight: 0.2,
            shallow_depth_angle: 110.0,
            excessive_lean: 40.0,
            good_band: 85.0,
            fair_band: 70.0,
        }
    }
}

/// Posture rubric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostureRubric {
    /// Points lost per degree of mean absolute tilt
    pub tilt_penalty: f64,
    pub shoulder_tilt_feedback: f64,
    pub hip_tilt_feedback: f64,
    pub ap_significant: f64,
    pub ap_mild: f64,
    pub shift_significant: f64,
    pub shift_moderate: f64,
    pub good_band: f64,
    pub fair_band: f64,
}

impl Default for PostureRubric {
    fn default() -> Self {
        Self {
            tilt_penalty: 5.0,
            shoulder_tilt_feedback: 5.0,
            hip_tilt_feedback: 5.0,
            ap_significant: 0.4,
            ap_mild: 0.2,
            shift_significant: 0.05,
            shift_moderate: 0.02,
            good_band: 85.0,
            fair_band: 70.0,
        }
    }
}

/// Shoulder circumduction rubric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShoulderRubric {
    pub rom_points: f64,
    /// Elevation earning zero ROM points
    pub rom_floor_angle: f64,
    /// Elevation earning full ROM points
    pub rom_optimal_angle: f64,
    /// Scapular control placeholder
    pub scapular_points: f64,
    pub symmetry_points: f64,
    /// Left/right gap at which symmetry reaches 0
    pub symmetry_gap_cap: f64,
    pub trunk_points: f64,
    /// Mean tilt allowed without penalty
    pub trunk_tilt_tolerance: f64,
    /// Tilt beyond tolerance at which trunk points reach 0
    pub trunk_tilt_range: f64,
    /// Generic control placeholder
    pub control_points: f64,
    pub limited_elevation: f64,
    pub asymmetry_feedback: f64,
    pub tilt_feedback: f64,
    pub good_band: f64,
    pub fair_band: f64,
}

impl Default for ShoulderRubric {
    fn default() -> Self {
        Self {
            rom_points: 35.0,
            rom_floor_angle: 135.0,
            rom_optimal_angle: 175.0,
            scapular_points: 30.0,
            symmetry_points: 15.0,
            symmetry_gap_cap: 20.0,
            trunk_points: 10.0,
            trunk_tilt_tolerance: 5.0,
            trunk_tilt_range: 10.0,
            control_points: 10.0,
            limited_elevation: 160.0,
            asymmetry_feedback: 10.0,
            tilt_feedback: 5.0,
            good_band: 85.0,
            fair_band: 70.0,
        }
    }
}

/// Single-leg stance rubric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StanceRubric {
    /// Video frame rate used to convert frame counts to seconds
    pub frame_rate: f64,
    /// Sway (cm) at or below which stability is full
    pub sway_excellent: f64,
    /// Sway (cm) at or below which stability is partial
    pub sway_fair: f64,
    pub stability_full: f64,
    pub stability_partial: f64,
    pub stability_low: f64,
    pub pelvic_excellent: f64,
    pub pelvic_fair: f64,
    pub pelvic_full: f64,
    pub pelvic_partial: f64,
    pub pelvic_low: f64,
    pub valgus_limit: f64,
    pub knee_full: f64,
    pub knee_low: f64,
    /// Fixed symmetry credit (half of the available points)
    pub symmetry_score: f64,
    pub symmetry_points: f64,
    /// Hold time earning full duration points
    pub duration_cap_secs: f64,
    pub duration_points: f64,
    pub pelvic_feedback_drop: f64,
    pub pelvic_feedback_score: f64,
    pub valgus_feedback: f64,
    pub knee_feedback_score: f64,
    pub sway_feedback: f64,
    pub stability_feedback_score: f64,
    pub core_feedback_score: f64,
    pub duration_feedback_score: f64,
    pub excellent_band: f64,
    pub good_band: f64,
    pub fair_band: f64,
}

impl Default for StanceRubric {
    fn default() -> Self {
        Self {
            frame_rate: 30.0,
            sway_excellent: 1.5,
            sway_fair: 3.0,
            stability_full: 40.0,
            stability_partial: 24.0,
            stability_low: 12.0,
            pelvic_excellent: 5.0,
            pelvic_fair: 10.0,
            pelvic_full: 20.0,
            pelvic_partial: 15.0,
            pelvic_low: 5.0,
            valgus_limit: 5.0,
            knee_full: 20.0,
            knee_low: 10.0,
            symmetry_score: 5.0,
            symmetry_points: 10.0,
            duration_cap_secs: 20.0,
            duration_points: 10.0,
            pelvic_feedback_drop: 7.0,
            pelvic_feedback_score: 15.0,
            valgus_feedback: 5.0,
            knee_feedback_score: 15.0,
            sway_feedback: 3.0,
            stability_feedback_score: 20.0,
            core_feedback_score: 25.0,
            duration_feedback_score: 5.0,
            excellent_band: 85.0,
            good_band: 70.0,
            fair_band: 50.0,
        }
    }
}

/// Vertical jump rubric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpRubric {
    pub frame_rate: f64,
    /// Leading frames averaged for the standing hip height
    pub baseline_frames: usize,
    /// Hip rise (cm) above baseline that counts as airborne
    pub flight_threshold_cm: f64,
    /// Gravitational acceleration in cm/s²
    pub gravity_cm_s2: f64,
    /// Jump height earning zero power
    pub power_floor_cm: f64,
    /// Jump height earning full power
    pub power_optimal_cm: f64,
    pub valgus_tolerance: f64,
    /// Valgus points lost per degree beyond tolerance
    pub valgus_penalty: f64,
    pub valgus_points: f64,
    /// Frames after touchdown used for landing control
    pub landing_window: usize,
    /// Hip sway (cm) tolerated on landing
    pub landing_sway_tolerance_cm: f64,
    /// Landing points lost per cm of sway beyond tolerance
    pub landing_penalty_per_cm: f64,
    /// Symmetry points lost per degree of left/right knee gap
    pub symmetry_penalty: f64,
    pub power_weight: f64,
    pub landing_weight: f64,
    pub valgus_weight: f64,
    pub symmetry_weight: f64,
    pub low_height_feedback: f64,
    pub valgus_feedback: f64,
    pub landing_feedback: f64,
    pub good_band: f64,
    pub fair_band: f64,
}

impl Default for JumpRubric {
    fn default() -> Self {
        Self {
            frame_rate: 30.0,
            baseline_frames: 5,
            flight_threshold_cm: 2.0,
            gravity_cm_s2: 981.0,
            power_floor_cm: 20.0,
            power_optimal_cm: 40.0,
            valgus_tolerance: 5.0,
            valgus_penalty: 2.0,
            valgus_points: 20.0,
            landing_window: 15,
            landing_sway_tolerance_cm: 1.0,
            landing_penalty_per_cm: 10.0,
            symmetry_penalty: 5.0,
            power_weight: 0.4,
            landing_weight: 0.3,
            valgus_weight: 0.2,
            symmetry_weight: 0.1,
            low_height_feedback: 30.0,
            valgus_feedback: 12.0,
            landing_feedback: 75.0,
            good_band: 85.0,
            fair_band: 70.0,
        }
    }
}

/// All rubric tables
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RubricConfig {
    pub squat: SquatRubric,
    pub posture: PostureRubric,
    pub shoulder: ShoulderRubric,
    pub stance: StanceRubric,
    pub jump: JumpRubric,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_one() {
        let squat = SquatRubric::default();
        assert!((squat.rom_weight + squat.trunk_weight + squat.control_weight - 1.0).abs() < 1e-12);
        let jump = JumpRubric::default();
        let sum = jump.power_weight + jump.landing_weight + jump.valgus_weight + jump.symmetry_weight;
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_additive_rubrics_max_100() {
        let s = ShoulderRubric::default();
        let total =
            s.rom_points + s.scapular_points + s.symmetry_points + s.trunk_points + s.control_points;
        assert_eq!(total, 100.0);
        let st = StanceRubric::default();
        let total = st.stability_full
            + st.pelvic_full
            + st.knee_full
            + st.symmetry_points
            + st.duration_points;
        assert_eq!(total, 100.0);
    }
}
