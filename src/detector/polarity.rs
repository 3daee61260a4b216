//! Polarity resolver: which orientations to try on a frame, and in what order

use tracing::trace;

use crate::config::{PolarityMode, ScanConfig};
use crate::models::{Polarity, PolarityHint};

/// Ordered orientations to attempt on one frame (one or two entries)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptPlan {
    orientations: Vec<Polarity>,
    fallback: bool,
}

impl AttemptPlan {
    fn single(polarity: Polarity) -> Self {
        Self {
            orientations: vec![polarity],
            fallback: false,
        }
    }

    fn both(first: Polarity) -> Self {
        Self {
            orientations: vec![first, first.opposite()],
            fallback: false,
        }
    }

    fn with_fallback(first: Polarity) -> Self {
        Self {
            orientations: vec![first, first.opposite()],
            fallback: true,
        }
    }

    /// Orientations in attempt order
    pub fn orientations(&self) -> &[Polarity] {
        &self.orientations
    }

    /// First orientation to try
    pub fn first(&self) -> Polarity {
        self.orientations[0]
    }

    /// Whether both orientations are planned
    pub fn is_dual(&self) -> bool {
        self.orientations.len() == 2
    }

    /// Whether the second orientation may only run after the first failed
    pub fn second_is_fallback(&self) -> bool {
        self.fallback
    }
}

/// Plans attempts from the background tone and the session hint, and moves
/// the hint after a successful decode
#[derive(Debug, Clone)]
pub struct PolarityResolver {
    mode: PolarityMode,
    dark_background: u8,
    light_background: u8,
    decay: f32,
}

impl PolarityResolver {
    /// Resolver using the policy and thresholds of `config`
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            mode: config.polarity_mode,
            dark_background: config.dark_background_threshold,
            light_background: config.light_background_threshold,
            decay: config.hint_decay_factor,
        }
    }

    /// Orientations to attempt for a frame with this border tone.
    ///
    /// A strongly light border points at dark-on-light and a strongly dark
    /// one at light-on-dark: that orientation goes first and the other is
    /// kept as a fallback, since a label need not share the tone of its
    /// surroundings. In between both are tried, the hint-favoured one first.
    pub fn plan(&self, background_level: u8, hint: &PolarityHint) -> AttemptPlan {
        let plan = match self.mode {
            PolarityMode::ForceDarkOnLight => AttemptPlan::single(Polarity::DarkOnLight),
            PolarityMode::ForceLightOnDark => AttemptPlan::single(Polarity::LightOnDark),
            PolarityMode::AutoDetect if background_level >= self.light_background => {
                AttemptPlan::with_fallback(Polarity::DarkOnLight)
            }
            PolarityMode::AutoDetect if background_level <= self.dark_background => {
                AttemptPlan::with_fallback(Polarity::LightOnDark)
            }
            PolarityMode::AutoDetect => AttemptPlan::both(hint.favoured()),
        };
        trace!(
            background_level,
            hint = hint.value(),
            plan = ?plan.orientations(),
            fallback = plan.second_is_fallback(),
            "planned polarity attempts"
        );
        plan
    }

    /// Move the hint toward the orientation that just decoded
    pub fn record_success(&self, hint: &mut PolarityHint, polarity: Polarity) {
        hint.decay_toward(polarity, self.decay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(mode: PolarityMode) -> PolarityResolver {
        PolarityResolver::new(&ScanConfig::default().with_polarity_mode(mode))
    }

    #[test]
    fn test_strong_backgrounds_lead_with_indicated_orientation() {
        let auto = resolver(PolarityMode::AutoDetect);
        let hint = PolarityHint::new();

        let light = auto.plan(250, &hint);
        assert_eq!(
            light.orientations(),
            &[Polarity::DarkOnLight, Polarity::LightOnDark]
        );
        assert!(light.second_is_fallback());

        let dark = auto.plan(20, &hint);
        assert_eq!(
            dark.orientations(),
            &[Polarity::LightOnDark, Polarity::DarkOnLight]
        );
        assert!(dark.second_is_fallback());

        // Even a hint that strongly favours the other side does not reorder
        let biased = PolarityHint::with_bias(1.0);
        assert_eq!(auto.plan(20, &biased).first(), Polarity::LightOnDark);
    }

    #[test]
    fn test_ambiguous_background_follows_hint() {
        let auto = resolver(PolarityMode::AutoDetect);
        let plan = auto.plan(128, &PolarityHint::new());
        assert!(plan.is_dual());
        assert!(!plan.second_is_fallback());
        assert_eq!(plan.first(), Polarity::DarkOnLight);

        let plan = auto.plan(128, &PolarityHint::with_bias(-0.3));
        assert_eq!(
            plan.orientations(),
            &[Polarity::LightOnDark, Polarity::DarkOnLight]
        );
    }

    #[test]
    fn test_forced_modes_ignore_background() {
        let hint = PolarityHint::new();
        assert_eq!(
            resolver(PolarityMode::ForceLightOnDark).plan(255, &hint).orientations(),
            &[Polarity::LightOnDark]
        );
        assert_eq!(
            resolver(PolarityMode::ForceDarkOnLight).plan(0, &hint).orientations(),
            &[Polarity::DarkOnLight]
        );
    }

    #[test]
    fn test_record_success_decays() {
        let auto = resolver(PolarityMode::AutoDetect);
        let mut hint = PolarityHint::new();
        auto.record_success(&mut hint, Polarity::LightOnDark);
        assert!((hint.value() + 0.3).abs() < 1e-6);
        auto.record_success(&mut hint, Polarity::DarkOnLight);
        // 0.7 * -0.3 + 0.3 = 0.09
        assert!((hint.value() - 0.09).abs() < 1e-6);
    }
}
