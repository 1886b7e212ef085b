//! Abstract graphics state.

use crate::{math, value_stack::Value};

/// Direction of a projection or freedom vector.
///
/// Vectors set from points or stack values are only tracked as `Custom`.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    #[default]
    X,
    Y,
    Custom,
}

impl Axis {
    /// Returns the 2.14 components of the unit vector, if known.
    pub fn components(self) -> [Value; 2] {
        match self {
            Self::X => [Value::Known(0x4000), Value::Known(0)],
            Self::Y => [Value::Known(0), Value::Known(0x4000)],
            Self::Custom => [Value::Unknown; 2],
        }
    }

    /// Returns the axis for the given 2.14 components.
    pub fn from_components(x: Value, y: Value) -> Self {
        match (x.known(), y.known()) {
            (Some(0x4000), Some(0)) => Self::X,
            (Some(0), Some(0x4000)) => Self::Y,
            _ => Self::Custom,
        }
    }
}

/// Rounding strategies.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoundMode {
    /// Set by `RTG` instruction.
    #[default]
    Grid,
    /// Set by `RTHG` instruction.
    HalfGrid,
    /// Set by `RTDG` instruction.
    DoubleGrid,
    /// Set by `RDTG` instruction.
    DownToGrid,
    /// Set by `RUTG` instruction.
    UpToGrid,
    /// Set by `ROFF` instruction.
    Off,
    /// Set by `SROUND` instruction.
    Super,
    /// Set by `S45ROUND` instruction.
    Super45,
}

/// Graphics state that controls rounding.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundState {
    pub mode: RoundMode,
    /// Period, phase and threshold selector of the super rounding modes.
    pub selector: Value,
}

impl RoundState {
    /// Rounds a 26.6 distance according to the current mode.
    ///
    /// The super rounding modes depend on a selector that is rarely known
    /// precisely, so their results are unknown.
    pub fn round(&self, distance: i32) -> Value {
        use RoundMode::*;
        // Rounds the magnitude and keeps the sign, clamping to zero.
        let symmetric = |f: fn(i32) -> i32| {
            if distance >= 0 {
                f(distance).max(0)
            } else {
                f(distance.wrapping_neg()).wrapping_neg().min(0)
            }
        };
        match self.mode {
            Grid => Value::Known(symmetric(math::round)),
            HalfGrid => Value::Known(symmetric(|d| math::floor(d).wrapping_add(32))),
            DoubleGrid => Value::Known(symmetric(|d| math::round_pad(d, 32))),
            DownToGrid => Value::Known(symmetric(math::floor)),
            UpToGrid => Value::Known(symmetric(math::ceil)),
            Off => Value::Known(distance),
            Super | Super45 => Value::Unknown,
        }
    }
}

/// Context in which instructions are executed, tracked abstractly.
///
/// Numeric fields hold [`Value::Unknown`] once they have been set from a
/// value that could not be resolved.
///
/// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_graphics_state>
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphicsState {
    pub proj_vector: Axis,
    pub dual_proj_vector: Axis,
    pub freedom_vector: Axis,
    pub round_state: RoundState,
    pub rp0: Value,
    pub rp1: Value,
    pub rp2: Value,
    pub zp0: Value,
    pub zp1: Value,
    pub zp2: Value,
    pub loop_counter: Value,
    pub min_distance: Value,
    pub control_value_cutin: Value,
    pub single_width_cutin: Value,
    pub single_width: Value,
    pub delta_base: Value,
    pub delta_shift: Value,
    pub auto_flip: bool,
    pub instruct_control: Value,
    pub scan_control: Value,
    pub scan_type: Value,
}

impl Default for GraphicsState {
    fn default() -> Self {
        let known = Value::Known;
        Self {
            proj_vector: Axis::X,
            dual_proj_vector: Axis::X,
            freedom_vector: Axis::X,
            round_state: RoundState::default(),
            rp0: known(0),
            rp1: known(0),
            rp2: known(0),
            zp0: known(1),
            zp1: known(1),
            zp2: known(1),
            loop_counter: known(1),
            // 1 pixel in 26.6
            min_distance: known(64),
            // 17/16 pixels in 26.6
            control_value_cutin: known(68),
            single_width_cutin: known(0),
            single_width: known(0),
            delta_base: known(9),
            delta_shift: known(3),
            auto_flip: true,
            instruct_control: known(0),
            scan_control: known(0),
            scan_type: known(0),
        }
    }
}

impl GraphicsState {
    /// Sets the projection and freedom vectors to the same axis.
    pub fn set_vectors(&mut self, axis: Axis) {
        self.proj_vector = axis;
        self.dual_proj_vector = axis;
        self.freedom_vector = axis;
    }

    /// Sets the projection vector (and dual projection vector).
    pub fn set_proj_vector(&mut self, axis: Axis) {
        self.proj_vector = axis;
        self.dual_proj_vector = axis;
    }
}

impl core::fmt::Display for GraphicsState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "projection vector: {:?}", self.proj_vector)?;
        writeln!(f, "dual projection vector: {:?}", self.dual_proj_vector)?;
        writeln!(f, "freedom vector: {:?}", self.freedom_vector)?;
        write!(f, "round state: {:?}", self.round_state.mode)?;
        if matches!(self.round_state.mode, RoundMode::Super | RoundMode::Super45) {
            write!(f, " ({})", self.round_state.selector)?;
        }
        writeln!(f)?;
        writeln!(f, "rp0: {}, rp1: {}, rp2: {}", self.rp0, self.rp1, self.rp2)?;
        writeln!(f, "zp0: {}, zp1: {}, zp2: {}", self.zp0, self.zp1, self.zp2)?;
        writeln!(f, "loop: {}", self.loop_counter)?;
        writeln!(f, "minimum distance: {}", self.min_distance)?;
        writeln!(f, "control value cut-in: {}", self.control_value_cutin)?;
        writeln!(
            f,
            "single width: {} (cut-in {})",
            self.single_width, self.single_width_cutin
        )?;
        writeln!(
            f,
            "delta base: {}, delta shift: {}",
            self.delta_base, self.delta_shift
        )?;
        writeln!(f, "auto flip: {}", self.auto_flip)?;
        writeln!(f, "instruct control: {}", self.instruct_control)?;
        write!(
            f,
            "scan control: {}, scan type: {}",
            self.scan_control, self.scan_type
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_components() {
        for axis in [Axis::X, Axis::Y] {
            let [x, y] = axis.components();
            assert_eq!(Axis::from_components(x, y), axis);
        }
        assert_eq!(
            Axis::from_components(Value::Known(0x2d41), Value::Known(0x2d41)),
            Axis::Custom
        );
    }

    #[test]
    fn round_modes() {
        let round = |mode, distance| {
            RoundState {
                mode,
                selector: Value::Unknown,
            }
            .round(distance)
        };
        assert_eq!(round(RoundMode::Grid, 32), Value::Known(64));
        assert_eq!(round(RoundMode::Grid, -32), Value::Known(-64));
        assert_eq!(round(RoundMode::HalfGrid, 64), Value::Known(96));
        assert_eq!(round(RoundMode::DoubleGrid, 50), Value::Known(64));
        assert_eq!(round(RoundMode::DownToGrid, 127), Value::Known(64));
        assert_eq!(round(RoundMode::UpToGrid, 1), Value::Known(64));
        assert_eq!(round(RoundMode::Off, 13), Value::Known(13));
        assert_eq!(round(RoundMode::Super, 13), Value::Unknown);
        // magnitude of the most negative distance does not fit
        assert_eq!(round(RoundMode::Grid, i32::MIN), Value::Known(i32::MIN));
        assert_eq!(round(RoundMode::UpToGrid, i32::MIN), Value::Known(i32::MIN));
    }

    #[test]
    fn dump_mentions_super_round_selector() {
        let mut state = GraphicsState::default();
        assert!(state.to_string().contains("round state: Grid\n"));
        state.round_state = RoundState {
            mode: RoundMode::Super45,
            selector: Value::Known(0x48),
        };
        assert!(state.to_string().contains("round state: Super45 (72)"));
    }
}
