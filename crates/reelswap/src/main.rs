mod sim;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};

use reelswap::config::EngineConfig;
use reelswap::feed::types::BucketResolver;
use reelswap::session::{FeedSession, SessionEvent};

use sim::{SYNTHETIC_BASE_URL, SimDecoders, SyntheticFetcher};

/// Scroll frames emitted between two rest positions.
const FRAMES_PER_SWIPE: u32 = 4;
const TICK: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq)]
struct SimArgs {
    items: usize,
    page: usize,
    screen_height: f64,
    /// Momentum-end offsets, in order.
    script: Option<Vec<f64>>,
    start: Option<usize>,
    config: Option<PathBuf>,
}

impl Default for SimArgs {
    fn default() -> Self {
        Self {
            items: 24,
            page: 8,
            screen_height: 800.0,
            script: None,
            start: None,
            config: None,
        }
    }
}

impl SimArgs {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut out = Self::default();
        let mut args = args.into_iter();
        while let Some(flag) = args.next() {
            let mut value = || {
                args.next()
                    .with_context(|| format!("{flag} needs a value"))
            };
            match flag.as_str() {
                "--items" => out.items = value()?.parse().context("--items")?,
                "--page" => out.page = value()?.parse().context("--page")?,
                "--screen-height" => {
                    out.screen_height = value()?.parse().context("--screen-height")?;
                }
                "--start" => out.start = Some(value()?.parse().context("--start")?),
                "--config" => out.config = Some(PathBuf::from(value()?)),
                "--script" => {
                    let offsets = value()?
                        .split(',')
                        .map(|s| s.trim().parse::<f64>())
                        .collect::<Result<Vec<_>, _>>()
                        .context("--script expects comma-separated offsets")?;
                    out.script = Some(offsets);
                }
                other => bail!("unknown argument '{other}'"),
            }
        }
        if out.page == 0 {
            bail!("--page must be at least 1");
        }
        if !out.screen_height.is_finite() || out.screen_height <= 0.0 {
            bail!("--screen-height must be positive");
        }
        Ok(out)
    }

    /// Walk down one item at a time, flick back up, then jump to the top.
    fn default_script(&self) -> Vec<f64> {
        let h = self.screen_height;
        let mut offsets: Vec<f64> = (1..self.items).map(|i| i as f64 * h).collect();
        if self.items > 3 {
            offsets.push((self.items - 2) as f64 * h);
            offsets.push((self.items - 3) as f64 * h);
        }
        offsets.push(0.0);
        offsets
    }
}

fn log_event(event: &SessionEvent) {
    match event {
        SessionEvent::InitialReady { start_index, count } => {
            log::info!("Feed ready: {count} items, start at {start_index}");
        }
        SessionEvent::Appended { added } => log::info!("Feed grew by {added} items"),
        SessionEvent::LoadFailed { initial, error } => {
            log::warn!("Feed load failed (initial: {initial}): {error}");
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = SimArgs::parse(std::env::args().skip(1))?;

    let mut config = match &args.config {
        Some(path) => EngineConfig::load_from(path),
        None => EngineConfig::load(),
    };
    if config.media_base_url.is_none() {
        config.media_base_url = Some(SYNTHETIC_BASE_URL.to_string());
    }

    let resolver = BucketResolver::new(config.media_base_url.clone());
    let fetcher = SyntheticFetcher::new(args.items, args.page).with_missing_media(11);
    let mut session = FeedSession::new(resolver, fetcher, args.screen_height, &config);

    session.load_initial(args.start.map(|s| s.to_string()));
    match session.wait() {
        Some(event @ SessionEvent::InitialReady { .. }) => log_event(&event),
        Some(SessionEvent::LoadFailed { error, .. }) => bail!("initial feed load failed: {error}"),
        other => bail!("unexpected first feed event: {other:?}"),
    }
    let Some(start) = session.on_content_ready() else {
        bail!("feed is empty");
    };

    let h = args.screen_height;
    let mut decoders = SimDecoders::new(12.0, TICK.as_secs_f64());
    let clock = Instant::now();
    let mut ticks = 0u32;

    let mut offset = start as f64 * h;
    session.on_scroll(offset);
    decoders.step(session.engine_mut(), clock);

    let script = args.script.clone().unwrap_or_else(|| args.default_script());
    for target in script {
        for frame in 1..=FRAMES_PER_SWIPE {
            let t = f64::from(frame) / f64::from(FRAMES_PER_SWIPE);
            session.on_scroll(offset + (target - offset) * t);
        }
        offset = target;

        if let Some(settlement) = session.on_momentum_scroll_end(target) {
            log::info!(
                "-> {} at item {} (preload {:?})",
                settlement.transition,
                settlement.index,
                settlement.preload
            );
        }

        for event in session.poll() {
            log_event(&event);
        }
        while session.has_pending_fetch() {
            let Some(event) = session.wait() else {
                break;
            };
            log_event(&event);
        }

        ticks += 1;
        decoders.step(session.engine_mut(), clock + TICK * ticks);

        let engine = session.engine();
        let overlay = engine.item_overlay(engine.settled_index());
        log::info!(
            "   item {} slot {} | {:.1}/{:.1}s buffering={} poster={} error={:?}",
            engine.settled_index(),
            engine.active_slot(),
            overlay.elapsed_secs,
            overlay.duration_secs,
            overlay.buffering,
            overlay.thumbnail_opacity,
            overlay.error
        );
    }

    log::info!(
        "Done: {} items loaded, settled at {}",
        session.feed().len(),
        session.engine().settled_index()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<SimArgs> {
        SimArgs::parse(args.iter().map(|s| (*s).to_string()))
    }

    #[test]
    fn defaults_without_flags() {
        assert_eq!(parse(&[]).unwrap(), SimArgs::default());
    }

    #[test]
    fn parses_all_flags() {
        let a = parse(&[
            "--items", "10", "--page", "4", "--screen-height", "640", "--script", "640, 1280,0",
            "--start", "3", "--config", "/tmp/engine.json",
        ])
        .unwrap();
        assert_eq!(a.items, 10);
        assert_eq!(a.page, 4);
        assert_eq!(a.screen_height, 640.0);
        assert_eq!(a.script, Some(vec![640.0, 1280.0, 0.0]));
        assert_eq!(a.start, Some(3));
        assert_eq!(a.config, Some(PathBuf::from("/tmp/engine.json")));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&["--items"]).is_err());
        assert!(parse(&["--page", "0"]).is_err());
        assert!(parse(&["--screen-height", "-1"]).is_err());
        assert!(parse(&["--script", "1,x"]).is_err());
        assert!(parse(&["--verbose"]).is_err());
    }

    #[test]
    fn default_script_ends_at_top() {
        let a = SimArgs {
            items: 5,
            ..SimArgs::default()
        };
        assert_eq!(
            a.default_script(),
            vec![800.0, 1600.0, 2400.0, 3200.0, 2400.0, 1600.0, 0.0]
        );
    }
}
