/// Tone of the symbol's marks relative to its background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    /// Dark modules on a light label (the usual print)
    DarkOnLight,
    /// Light modules on a dark label (inverted print, laser-marked metal)
    LightOnDark,
}

impl Polarity {
    /// The other orientation
    pub fn opposite(self) -> Self {
        match self {
            Polarity::DarkOnLight => Polarity::LightOnDark,
            Polarity::LightOnDark => Polarity::DarkOnLight,
        }
    }

    /// Target value of the rolling hint for this orientation
    pub(crate) fn hint_target(self) -> f32 {
        match self {
            Polarity::DarkOnLight => 1.0,
            Polarity::LightOnDark => -1.0,
        }
    }
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Polarity::DarkOnLight => f.write_str("dark-on-light"),
            Polarity::LightOnDark => f.write_str("light-on-dark"),
        }
    }
}

/// Rolling estimate of which polarity has recently decoded.
///
/// Lives in `[-1, 1]`: positive favours [`Polarity::DarkOnLight`], negative
/// [`Polarity::LightOnDark`], zero is undecided. One per scan session; only
/// the polarity resolver moves it, and only after a successful decode.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolarityHint {
    value: f32,
}

impl PolarityHint {
    /// Undecided hint
    pub fn new() -> Self {
        Self::default()
    }

    /// Hint starting at a given bias (clamped to `[-1, 1]`)
    pub fn with_bias(value: f32) -> Self {
        Self {
            value: value.clamp(-1.0, 1.0),
        }
    }

    /// Current bias
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Orientation currently favoured; ties go to dark-on-light
    pub fn favoured(&self) -> Polarity {
        if self.value < 0.0 {
            Polarity::LightOnDark
        } else {
            Polarity::DarkOnLight
        }
    }

    /// Exponential step toward `polarity`: `h = d * h + (1 - d) * target`
    pub(crate) fn decay_toward(&mut self, polarity: Polarity, decay: f32) {
        let decay = decay.clamp(0.0, 1.0);
        self.value = (decay * self.value + (1.0 - decay) * polarity.hint_target()).clamp(-1.0, 1.0);
    }
}
