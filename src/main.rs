use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use clap::Parser;
use log::{debug, error, info, warn};
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

use sonosdisplay::display::{
    Backlight, DisplaySettings, DisplayStateMachine, HeadlessSurface, NullBacklight, SysfsBacklight,
    TokioTimerScheduler,
};
use sonosdisplay::helpers::{HttpImageFetcher, SystemClock};
use sonosdisplay::slideshow::SlideshowCycler;
use sonosdisplay::sonos::{PlaybackStateTracker, SonosApiClient};
use sonosdisplay::webhook;
use sonosdisplay::{App, DisplayConfig};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to the JSON configuration file
    #[clap(long, default_value = "/etc/sonosdisplay.json")]
    config: PathBuf,

    /// Room to monitor, overrides the configuration
    #[clap(long)]
    room: Option<String>,

    #[clap(short, long, help = "Enable debug logging")]
    debug: bool,

    #[clap(short, long, help = "Log at least at info level")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let loaded = DisplayConfig::load_optional(&args.config)?;
    let found = loaded.is_some();
    let mut config = loaded.unwrap_or_default();
    config.logging.apply_cli_flags(args.debug, args.verbose);
    config.logging.initialize_logger()?;

    if found {
        info!("Loaded configuration from {}", args.config.display());
    } else {
        warn!("Config file {} not found, using defaults", args.config.display());
    }

    if let Some(room) = args.room {
        config.room = room;
    }

    info!("Sonos display {} starting", env!("CARGO_PKG_VERSION"));

    let client = SonosApiClient::new(&config.api_host, config.api_port)?
        .with_timeout(config.http_timeout_secs);
    info!("Using node-sonos-http-api at {}", client.base_url());

    let tracker = PlaybackStateTracker::new(&config.room, Box::new(client), Arc::new(SystemClock));
    info!("Monitoring room: {}", tracker.room());

    let slideshow = SlideshowCycler::new(&config.slideshow);

    let backlight: Box<dyn Backlight> = match &config.backlight_device {
        Some(device) => Box::new(SysfsBacklight::new(device)),
        None => {
            debug!("No backlight device configured");
            Box::new(NullBacklight::new())
        }
    };

    let (scheduler, mut timer_rx) = TokioTimerScheduler::channel();
    let display = DisplayStateMachine::new(
        backlight,
        Box::new(HeadlessSurface::new()),
        Box::new(scheduler),
        DisplaySettings::from_config(&config),
    );

    let fetcher = HttpImageFetcher::new(config.http_timeout_secs);
    let mut app = App::new(tracker, slideshow, display, Box::new(fetcher));

    let (webhook_tx, mut webhook_rx) = mpsc::unbounded_channel();
    if config.webhook.enable {
        let webhook_config = config.webhook.clone();
        let room = config.room.clone();
        tokio::spawn(async move {
            if let Err(e) = webhook::start_webhook_server(webhook_config, room, webhook_tx).await {
                error!("Webhook receiver failed: {}", e);
            }
        });
    } else {
        drop(webhook_tx);
    }

    let mut poll_tick = time::interval(Duration::from_secs(config.poll_interval_secs.max(1)));
    poll_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let slide_period = Duration::from_secs(config.slideshow.interval_secs.max(1));
    let mut slide_tick = time::interval_at(time::Instant::now() + slide_period, slide_period);
    slide_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut webhook_open = config.webhook.enable;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        let result = tokio::select! {
            _ = poll_tick.tick() => {
                if app.needs_poll() {
                    app.refresh(None).await
                } else {
                    Ok(())
                }
            }
            payload = webhook_rx.recv(), if webhook_open => match payload {
                Some(payload) => app.refresh(Some(payload)).await,
                None => {
                    warn!("Webhook channel closed, relying on polling");
                    webhook_open = false;
                    Ok(())
                }
            },
            Some(token) = timer_rx.recv() => app.on_timer(token).map(|_| ()),
            _ = slide_tick.tick() => app.advance_slideshow().await,
            _ = &mut shutdown => {
                info!("Received Ctrl+C, shutting down");
                break;
            }
        };

        if let Err(e) = result {
            error!("Display error: {}", e);
        }
    }

    app.cleanup()?;
    info!("Sonos display stopped");
    Ok(())
}
