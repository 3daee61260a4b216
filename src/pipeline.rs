use tracing::{debug, debug_span};

use crate::config::ScanConfig;
use crate::decoder::MatrixDecoder;
use crate::detector::locator::locate;
use crate::detector::normalizer::normalize;
use crate::detector::polarity::PolarityResolver;
use crate::detector::sampler::sample;
use crate::error::{ConfigError, ScanError};
use crate::models::{
    DecodedPayload, FailureKind, Frame, FrameReport, IntensityGrid, Polarity, PolarityHint,
    ScanOutcome,
};

/// What one polarity pass produced
#[derive(Debug)]
enum PassOutcome {
    Decoded(DecodedPayload),
    NotFound,
    Failed(ScanError),
}

/// Stateless frame pipeline: normalize, plan, locate, sample, decode.
///
/// Holds only configuration, so one instance can serve any number of
/// frames; the polarity hint is passed in by the caller.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: ScanConfig,
    resolver: PolarityResolver,
}

impl Pipeline {
    /// Pipeline using `config` as given.
    ///
    /// The values are not range-checked; use [`Pipeline::try_new`] (or
    /// [`ScanConfig::validate`]) for configurations built by hand.
    pub fn new(config: ScanConfig) -> Self {
        let resolver = PolarityResolver::new(&config);
        Self { config, resolver }
    }

    /// Pipeline from a validated configuration
    pub fn try_new(config: ScanConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Active configuration
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Polarity resolver built from the configuration
    pub fn resolver(&self) -> &PolarityResolver {
        &self.resolver
    }

    /// Run every stage on one frame.
    ///
    /// When both orientations are planned the first-ordered one that
    /// decodes wins, whether the passes ran in parallel or not. A fallback
    /// orientation only runs after the first pass failed to decode. Without
    /// a decode the first stage failure is reported, or `NoSymbolFound` when
    /// no pass found a finder pattern at all.
    pub fn run(&self, frame: &Frame, hint: &PolarityHint) -> FrameReport {
        let span = debug_span!(
            "frame",
            timestamp_ms = frame.timestamp().as_millis() as u64,
            width = frame.width(),
            height = frame.height()
        );
        let _enter = span.enter();

        let normalized = match normalize(frame) {
            Ok(normalized) => normalized,
            Err(err) => {
                debug!(%err, "frame rejected");
                return FrameReport {
                    timestamp: frame.timestamp(),
                    attempted: Vec::new(),
                    outcome: ScanOutcome::Failed(FailureKind::from(&err)),
                };
            }
        };

        let plan = self
            .resolver
            .plan(normalized.estimated_background_level, hint);
        let parallel =
            plan.is_dual() && !plan.second_is_fallback() && self.config.parallel_passes;
        let passes = if parallel {
            let (first, second) = (plan.orientations()[0], plan.orientations()[1]);
            let (a, b) = rayon::join(
                || self.attempt(&normalized.grid, first),
                || self.attempt(&normalized.grid, second),
            );
            vec![(first, a), (second, b)]
        } else {
            let mut passes = Vec::with_capacity(plan.orientations().len());
            for &polarity in plan.orientations() {
                let outcome = self.attempt(&normalized.grid, polarity);
                let decoded = matches!(outcome, PassOutcome::Decoded(_));
                passes.push((polarity, outcome));
                if decoded {
                    break;
                }
            }
            passes
        };

        let attempted: Vec<Polarity> = passes.iter().map(|(polarity, _)| *polarity).collect();
        let outcome = Self::resolve(passes);
        debug!(?attempted, ?outcome, "frame done");

        FrameReport {
            timestamp: frame.timestamp(),
            attempted,
            outcome,
        }
    }

    /// Locate, sample and decode under one polarity, top candidate only
    fn attempt(&self, grid: &IntensityGrid, polarity: Polarity) -> PassOutcome {
        let ink = grid.ink(polarity);
        let candidates = locate(&ink, &self.config);
        let Some(candidate) = candidates.first() else {
            return PassOutcome::NotFound;
        };

        let sampled = match sample(&ink, candidate, &self.config) {
            Ok(sampled) => sampled,
            Err(err) => {
                debug!(%polarity, %err, "sampling failed");
                return PassOutcome::Failed(err);
            }
        };

        match MatrixDecoder::decode(&sampled.matrix) {
            Ok(mut payload) => {
                payload.polarity = Some(polarity);
                PassOutcome::Decoded(payload)
            }
            Err(err) => {
                debug!(%polarity, %err, "decode failed");
                PassOutcome::Failed(err.into())
            }
        }
    }

    fn resolve(passes: Vec<(Polarity, PassOutcome)>) -> ScanOutcome {
        let mut failure: Option<FailureKind> = None;
        for (_, outcome) in passes {
            match outcome {
                PassOutcome::Decoded(payload) => return ScanOutcome::Decoded(payload),
                PassOutcome::Failed(err) => {
                    failure.get_or_insert(FailureKind::from(&err));
                }
                PassOutcome::NotFound => {}
            }
        }
        match failure {
            Some(kind) => ScanOutcome::Failed(kind),
            None => ScanOutcome::NoSymbolFound,
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(ScanConfig::default())
    }
}

/// A stream of frames sharing one polarity hint.
///
/// The hint only moves after a successful decode, toward the polarity that
/// decoded; failures and empty frames leave it untouched.
#[derive(Debug, Clone, Default)]
pub struct ScanSession {
    pipeline: Pipeline,
    hint: PolarityHint,
}

impl ScanSession {
    /// Session with an undecided hint; `config` is not range-checked
    pub fn new(config: ScanConfig) -> Self {
        Self {
            pipeline: Pipeline::new(config),
            hint: PolarityHint::new(),
        }
    }

    /// Session from a validated configuration
    pub fn try_new(config: ScanConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            pipeline: Pipeline::try_new(config)?,
            hint: PolarityHint::new(),
        })
    }

    /// Session starting from an existing hint
    pub fn with_hint(config: ScanConfig, hint: PolarityHint) -> Self {
        Self {
            pipeline: Pipeline::new(config),
            hint,
        }
    }

    /// Scan one frame and update the hint on success
    pub fn scan(&mut self, frame: &Frame) -> FrameReport {
        let report = self.pipeline.run(frame, &self.hint);
        if let Some(polarity) = report.outcome.payload().and_then(|p| p.polarity) {
            self.pipeline.resolver().record_success(&mut self.hint, polarity);
        }
        report
    }

    /// Current polarity hint
    pub fn hint(&self) -> PolarityHint {
        self.hint
    }

    /// Underlying stateless pipeline
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolarityMode;
    use crate::encoder::{encode, render, RenderOptions};
    use crate::models::{PixelFormat, SymbolShape};
    use std::time::Duration;

    fn label(text: &[u8], polarity: Polarity) -> Frame {
        let matrix = encode(text, SymbolShape::Square).unwrap();
        render(&matrix, &RenderOptions::default().with_polarity(polarity)).unwrap()
    }

    #[test]
    fn test_decodes_both_polarities() {
        let pipeline = Pipeline::default();
        for polarity in [Polarity::DarkOnLight, Polarity::LightOnDark] {
            let report = pipeline.run(&label(b"12345", polarity), &PolarityHint::new());
            let payload = report.outcome.payload().expect("decoded");
            assert_eq!(payload.bytes, b"12345");
            assert_eq!(payload.polarity, Some(polarity));
        }
    }

    #[test]
    fn test_try_new_rejects_out_of_range_config() {
        let config = ScanConfig::default().with_min_confidence(1.5);
        assert!(matches!(
            Pipeline::try_new(config.clone()),
            Err(ConfigError::OutOfRange {
                field: "min_confidence_threshold",
                ..
            })
        ));
        assert!(ScanSession::try_new(config).is_err());
        assert!(ScanSession::try_new(ScanConfig::default()).is_ok());
    }

    #[test]
    fn test_unsupported_format_attempts_nothing() {
        let frame = Frame::new(4, 4, PixelFormat::Other(0x3231_5659), vec![0; 24], Duration::ZERO);
        let report = Pipeline::default().run(&frame, &PolarityHint::new());
        assert!(report.attempted.is_empty());
        assert_eq!(report.outcome, ScanOutcome::Failed(FailureKind::UnsupportedFormat));
    }

    #[test]
    fn test_blank_frame_is_no_symbol() {
        let frame = Frame::gray(64, 64, vec![128; 64 * 64], Duration::from_millis(40));
        let report = Pipeline::default().run(&frame, &PolarityHint::new());
        assert_eq!(report.outcome, ScanOutcome::NoSymbolFound);
        assert_eq!(report.timestamp, Duration::from_millis(40));
        // Mid-gray border: both orientations are tried
        assert_eq!(report.attempted.len(), 2);
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let frame = label(b"PARALLEL", Polarity::LightOnDark);
        let hint = PolarityHint::with_bias(0.5);
        let sequential =
            Pipeline::new(ScanConfig::default().with_parallel_passes(false)).run(&frame, &hint);
        let parallel = Pipeline::default().run(&frame, &hint);
        assert_eq!(sequential.outcome, parallel.outcome);
    }

    #[test]
    fn test_session_hint_follows_successes() {
        let mut session = ScanSession::new(ScanConfig::default());
        session.scan(&label(b"1", Polarity::LightOnDark));
        assert!(session.hint().value() < 0.0);

        let before = session.hint();
        let blank = Frame::gray(32, 32, vec![128; 32 * 32], Duration::ZERO);
        session.scan(&blank);
        assert_eq!(session.hint(), before);
    }

    #[test]
    fn test_fallback_pass_skipped_after_decode() {
        // Strongly dark border: the fallback never runs once light-on-dark decodes
        let report = Pipeline::default().run(&label(b"42", Polarity::LightOnDark), &PolarityHint::new());
        assert_eq!(report.attempted, vec![Polarity::LightOnDark]);
        assert!(report.outcome.is_decoded());
    }

    #[test]
    fn test_forced_wrong_polarity_finds_nothing() {
        let config = ScanConfig::default().with_polarity_mode(PolarityMode::ForceDarkOnLight);
        let report = Pipeline::new(config).run(&label(b"42", Polarity::LightOnDark), &PolarityHint::new());
        assert_eq!(report.attempted, vec![Polarity::DarkOnLight]);
        assert!(!report.outcome.is_decoded());
    }
}
