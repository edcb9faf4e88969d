//! Car configurator control panel.
//!
//! Demonstrates:
//! - Starting a session against the mock transport
//! - Registering lifecycle and response listeners before any event is seen
//! - Driving the remote side through the whole connection lifecycle
//! - Paint, rim, level and console commands from the control panel
//! - Recovering from an autoplay rejection
//! - The newest-first event log feed
//! - Asking the host shell to exit
//!
//! Usage:
//!   cargo run --example configurator
//!   cargo run --example configurator -- --debug

// ============================================================================
// Imports
// ============================================================================

use anyhow::Context;
use pixelstream_control::protocol::descriptor::{MAIN_MAP, PAINT_COLORS, RIM_STYLES, STAT_FPS, STAT_UNIT};
use pixelstream_control::{
    Descriptor, EventLog, ExitOutcome, LifecycleEvent, MockTransportFactory, NoHostBridge, Session,
    SessionConfig, VideoSurface, request_exit,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Constants
// ============================================================================

const PLAYER_CONFIG: &str = r#"{
    "AutoConnect": true,
    "ss": "ws://127.0.0.1:80",
    "AutoPlayVideo": true,
    "StartVideoMuted": true,
    "HoveringMouse": true
}"#;

// ============================================================================
// Main
// ============================================================================

fn main() -> anyhow::Result<()> {
    let debug = std::env::args().any(|a| a == "--debug");
    init_logging(debug);

    println!("=== Car Configurator ===\n");

    let config = SessionConfig::from_json(PLAYER_CONFIG).context("player config")?;
    let surface = VideoSurface::new("streamingVideo").with_size(1920, 1080);
    let log = EventLog::new();
    let factory = MockTransportFactory::new(log.clone());

    // ========================================================================
    // Start
    // ========================================================================

    let panel = log.clone();
    let errors = log.clone();
    let mut session = Session::start(config, &surface, &factory, |session| {
        session.add_response_event_listener("logListener", move |data| {
            panel.record("UE5", data.clone());
        });
        session.add_event_listener(LifecycleEvent::WebRtcFailed, move |_| {
            errors.record("Error", "WebRTC connection failed");
        });
    })
    .context("session start")?;

    println!("[Session] {} ({})", session.id(), session.state());

    let remote = factory.remote().context("mock remote")?;
    remote.fire(LifecycleEvent::VideoInitialized);
    remote.fire(LifecycleEvent::PlayStreamRejected);
    session.pump_events();
    println!(
        "[Stream] state={} autoplay_blocked={}",
        session.state(),
        session.autoplay_blocked()
    );

    // Click-to-play overlay
    if session.autoplay_blocked() {
        println!("[Stream] Click to play");
        let _ = session.play();
    }

    remote.fire(LifecycleEvent::WebRtcConnected);
    session.pump_events();
    println!(
        "[Stream] state={} active={}\n",
        session.state(),
        session.status().is_active()
    );

    // ========================================================================
    // Control Panel
    // ========================================================================

    for color in PAINT_COLORS {
        let _ = session.emit_ui_interaction(Descriptor::body_paint(*color));
    }
    for style in RIM_STYLES {
        let _ = session.emit_ui_interaction(Descriptor::rims(*style));
    }
    let _ = session.emit_command(Descriptor::load_level(MAIN_MAP));
    let _ = session.emit_console_command(STAT_FPS);
    let _ = session.emit_console_command(STAT_UNIT);

    remote.respond("logListener", json!("Level /Game/Maps/MainMap loaded"));
    session.pump_events();

    // ========================================================================
    // Exit
    // ========================================================================

    match request_exit(&NoHostBridge) {
        ExitOutcome::Posted => log.record("System", "Exit requested"),
        ExitOutcome::Unavailable => log.record("System", "Exit not available in this environment"),
    }

    session.stop();

    println!("[Log] {} entries, newest first:", log.len());
    for line in log.lines() {
        println!("        {line}");
    }

    Ok(())
}

/// Initialize tracing/logging.
fn init_logging(debug: bool) {
    let filter = if debug {
        "pixelstream_control=debug"
    } else {
        "pixelstream_control=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}
