//! Duration resolution for generators that only know when they are done.

use crate::config::Config;
use crate::generators::Generator;

/// Sample `generator` every `cfg.duration_step_ms` until it reports `done`.
///
/// Returns the first sampled elapsed time at which it was done, or
/// `f64::INFINITY` if it had not settled by `cfg.max_generator_duration_ms`.
/// Does not cache the result; callers store it with
/// [`Generator::set_calculated_duration`].
pub fn calc_generator_duration<V, G>(generator: &mut G, cfg: &Config) -> f64
where
    G: Generator<V> + ?Sized,
{
    let step = if cfg.duration_step_ms > 0.0 {
        cfg.duration_step_ms
    } else {
        Config::default().duration_step_ms
    };
    let mut duration = 0.0;
    let mut state = generator.next(duration);
    while !state.done && duration < cfg.max_generator_duration_ms {
        duration += step;
        state = generator.next(duration);
    }

    if duration >= cfg.max_generator_duration_ms {
        log::debug!(
            "generator did not settle within {}ms; treating as infinite",
            cfg.max_generator_duration_ms
        );
        f64::INFINITY
    } else {
        log::debug!("resolved generator duration: {duration}ms");
        duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{
        AnimationState, KeyframesGenerator, KeyframesParams, SpringGenerator, SpringParams,
    };

    struct Endless;

    impl Generator<f64> for Endless {
        fn next(&mut self, elapsed_ms: f64) -> AnimationState<f64> {
            AnimationState::new(elapsed_ms, false)
        }
        fn calculated_duration(&self) -> Option<f64> {
            None
        }
        fn set_calculated_duration(&mut self, _duration_ms: f64) {}
    }

    #[test]
    fn keyframes_resolve_to_their_duration() {
        let mut gen = KeyframesGenerator::new(vec![0.0, 1.0], &KeyframesParams::linear(1000.0)).unwrap();
        assert_eq!(calc_generator_duration(&mut gen, &Config::default()), 1000.0);
    }

    #[test]
    fn spring_resolves_to_settle_step() {
        let mut gen = SpringGenerator::new(&[0.0, 100.0], &SpringParams::default()).unwrap();
        assert_eq!(calc_generator_duration(&mut gen, &Config::default()), 1100.0);
        let mut gen = SpringGenerator::new(&[0.0, 300.0], &SpringParams::default()).unwrap();
        assert_eq!(calc_generator_duration(&mut gen, &Config::default()), 1400.0);
    }

    #[test]
    fn never_settling_is_infinite() {
        assert_eq!(calc_generator_duration(&mut Endless, &Config::default()), f64::INFINITY);
    }

    #[test]
    fn honours_config_step() {
        let cfg = Config {
            duration_step_ms: 300.0,
            ..Config::default()
        };
        let mut gen = KeyframesGenerator::new(vec![0.0, 1.0], &KeyframesParams::linear(1000.0)).unwrap();
        assert_eq!(calc_generator_duration(&mut gen, &cfg), 1200.0);
    }
}
