use log::debug;

use crate::vertex::Vertex;

/// Transition progress gained per second (0.05 per 1/30 s step).
pub const TRANSITION_RATE: f32 = 0.05 * 30.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from a `0xRRGGBB` value.
    pub fn from_rgb(rgb: u32) -> Self {
        Self {
            r: ((rgb & 0xFF0000) >> 16) as f32 / 255.0,
            g: ((rgb & 0x00FF00) >> 8) as f32 / 255.0,
            b: (rgb & 0x0000FF) as f32 / 255.0,
            a: 1.0,
        }
    }

    pub fn interpolated(&self, to: &Color, progress: f32) -> Color {
        Color {
            r: self.r + progress * (to.r - self.r),
            g: self.g + progress * (to.g - self.g),
            b: self.b + progress * (to.b - self.b),
            a: self.a + progress * (to.a - self.a),
        }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// One color per corner of the backdrop quad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientColors {
    pub left_up: Color,
    pub left_down: Color,
    pub right_up: Color,
    pub right_down: Color,
}

impl GradientColors {
    pub fn interpolated(&self, to: &GradientColors, progress: f32) -> GradientColors {
        GradientColors {
            left_up: self.left_up.interpolated(&to.left_up, progress),
            left_down: self.left_down.interpolated(&to.left_down, progress),
            right_up: self.right_up.interpolated(&to.right_up, progress),
            right_down: self.right_down.interpolated(&to.right_down, progress),
        }
    }

    /// Full-screen quad in triangle strip order: LU, LD, RU, RD.
    pub fn quad(&self) -> [Vertex; 4] {
        [
            Vertex::new([-1.0, 1.0, 0.0], self.left_up.to_array()),
            Vertex::new([-1.0, -1.0, 0.0], self.left_down.to_array()),
            Vertex::new([1.0, 1.0, 0.0], self.right_up.to_array()),
            Vertex::new([1.0, -1.0, 0.0], self.right_down.to_array()),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallState {
    InitiatingCall,
    CallEstablished,
    WeakSignal,
}

impl CallState {
    pub fn colors(self) -> GradientColors {
        match self {
            CallState::InitiatingCall => GradientColors {
                left_up: Color::from_rgb(0x5295D6),
                left_down: Color::from_rgb(0xAC65D4),
                right_up: Color::from_rgb(0x616AD5),
                right_down: Color::from_rgb(0xAC65D4),
            },
            CallState::CallEstablished => GradientColors {
                left_up: Color::from_rgb(0xBAC05D),
                left_down: Color::from_rgb(0x398D6F),
                right_up: Color::from_rgb(0x3C9C8F),
                right_down: Color::from_rgb(0x53A6DE),
            },
            CallState::WeakSignal => GradientColors {
                left_up: Color::from_rgb(0xB84498),
                left_down: Color::from_rgb(0xFF7E46),
                right_up: Color::from_rgb(0xF4992E),
                right_down: Color::from_rgb(0xC94986),
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    from: GradientColors,
    to: GradientColors,
    progress: f32,
}

/// Current backdrop colors plus any running cross-fade between call states.
#[derive(Debug, Clone)]
pub struct Gradient {
    state: CallState,
    colors: GradientColors,
    transition: Option<Transition>,
}

impl Gradient {
    pub fn new(state: CallState) -> Self {
        Self {
            state,
            colors: state.colors(),
            transition: None,
        }
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    pub fn colors(&self) -> &GradientColors {
        &self.colors
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Starts a cross-fade towards `state`; does nothing if it is already the target.
    pub fn set_state(&mut self, state: CallState) {
        if self.state == state {
            return;
        }
        debug!("gradient transition {:?} -> {:?}", self.state, state);

        self.state = state;
        self.transition = Some(Transition {
            from: self.colors,
            to: state.colors(),
            progress: 0.0,
        });
    }

    /// Moves the running transition forward. Returns true when the colors changed.
    pub fn tick(&mut self, delta_time: f32) -> bool {
        let Some(transition) = self.transition.as_mut() else {
            return false;
        };

        transition.progress += delta_time * TRANSITION_RATE;
        if transition.progress > 1.0 {
            self.colors = transition.to;
            self.transition = None;
        } else {
            self.colors = transition.from.interpolated(&transition.to, transition.progress);
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_channels() {
        let color = Color::from_rgb(0x5295D6);
        assert_eq!(color.r, 0x52 as f32 / 255.0);
        assert_eq!(color.g, 0x95 as f32 / 255.0);
        assert_eq!(color.b, 0xD6 as f32 / 255.0);
        assert_eq!(color.a, 1.0);

        assert_eq!(Color::from_rgb(0xFFFFFF).to_array(), [1.0; 4]);
    }

    #[test]
    fn test_interpolation_endpoints() {
        let from = Color::new(0.0, 0.25, 0.5, 1.0);
        let to = Color::new(1.0, 0.75, 0.0, 0.0);

        assert_eq!(from.interpolated(&to, 0.0), from);
        assert_eq!(from.interpolated(&to, 1.0), to);

        let half = from.interpolated(&to, 0.5);
        assert!((half.r - 0.5).abs() < 1e-6);
        assert!((half.a - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_quad_corners() {
        let colors = CallState::WeakSignal.colors();
        let quad = colors.quad();

        assert_eq!(quad[0].position, [-1.0, 1.0, 0.0]);
        assert_eq!(quad[0].color, colors.left_up.to_array());
        assert_eq!(quad[3].position, [1.0, -1.0, 0.0]);
        assert_eq!(quad[3].color, colors.right_down.to_array());
    }

    #[test]
    fn test_same_state_is_noop() {
        let mut gradient = Gradient::new(CallState::InitiatingCall);
        gradient.set_state(CallState::InitiatingCall);

        assert!(!gradient.is_transitioning());
        assert!(!gradient.tick(1.0));
    }

    #[test]
    fn test_transition_runs_to_target() {
        let mut gradient = Gradient::new(CallState::InitiatingCall);
        gradient.set_state(CallState::CallEstablished);
        assert!(gradient.is_transitioning());

        // ten 1/30 s steps are half way
        for _ in 0..10 {
            assert!(gradient.tick(1.0 / 30.0));
        }
        let halfway = CallState::InitiatingCall
            .colors()
            .interpolated(&CallState::CallEstablished.colors(), 0.5);
        assert!((gradient.colors().left_up.g - halfway.left_up.g).abs() < 1e-4);

        for _ in 0..20 {
            gradient.tick(1.0 / 30.0);
        }
        assert!(!gradient.is_transitioning());
        assert_eq!(*gradient.colors(), CallState::CallEstablished.colors());
    }

    #[test]
    fn test_retarget_mid_transition() {
        let mut gradient = Gradient::new(CallState::InitiatingCall);
        gradient.set_state(CallState::CallEstablished);
        gradient.tick(0.2);
        let mid = *gradient.colors();

        gradient.set_state(CallState::WeakSignal);
        gradient.tick(0.0);
        assert_eq!(*gradient.colors(), mid);

        gradient.tick(1.0);
        assert_eq!(*gradient.colors(), CallState::WeakSignal.colors());
    }
}
