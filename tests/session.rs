//! End-to-end session behavior against the mock and relay transports.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use pixelstream_control::{
    ConnectionState, Descriptor, DropReason, Emission, EventLog, ExitOutcome, LifecycleEvent,
    LogPayload, MockTransportFactory, NoHostBridge, RecordingSink, RelayTransportFactory, Session,
    SessionConfig, VideoSurface, request_exit,
};
use proptest::prelude::*;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

// ============================================================================
// Helpers
// ============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("pixelstream_control=debug"))
        .with_test_writer()
        .try_init();
}

fn mock() -> (MockTransportFactory, RecordingSink) {
    let sink = RecordingSink::new();
    (MockTransportFactory::new(sink.clone()), sink)
}

// ============================================================================
// Scenario
// ============================================================================

#[test]
fn test_configurator_scenario() {
    init_tracing();

    let config = SessionConfig::from_json(r#"{ "AutoConnect": true, "ss": "ws://127.0.0.1:80" }"#)
        .expect("config");
    let surface = VideoSurface::new("streamingVideo");
    let (factory, sink) = mock();

    let mut session = Session::start(config, &surface, &factory, |_| {}).expect("start");
    let remote = factory.remote().expect("remote");

    remote.fire(LifecycleEvent::VideoInitialized);
    remote.fire(LifecycleEvent::WebRtcConnected);
    assert_eq!(session.pump_events(), 2);

    assert_eq!(session.state(), ConnectionState::Connected);
    assert!(!session.autoplay_blocked());
    assert!(session.status().is_active());

    let descriptor = Descriptor::from_value(json!({
        "CarConfig": { "Part": "BodyPaint", "Value": "Red" }
    }));
    assert_eq!(session.emit_ui_interaction(descriptor), Emission::Sent);

    let records = sink.records_for("emitUIInteraction");
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].payload,
        LogPayload::Structured(json!({ "CarConfig": { "Part": "BodyPaint", "Value": "Red" } }))
    );

    session.stop();
    assert_eq!(session.state(), ConnectionState::Disposed);
}

// ============================================================================
// Emission
// ============================================================================

#[test]
fn test_console_command_wrapped_text() {
    let surface = VideoSurface::new("video");
    let (factory, sink) = mock();
    let mut session =
        Session::start(SessionConfig::new(), &surface, &factory, |_| {}).expect("start");

    assert!(session.emit_console_command("stat fps").is_sent());

    let payload = sink
        .records_for("emitConsoleCommand")
        .pop()
        .expect("console record")
        .payload;
    let wrapped = payload
        .as_structured()
        .and_then(|value| value.get("ConsoleCommand"))
        .and_then(Value::as_str);
    assert_eq!(wrapped, Some("stat fps"));
}

#[test]
fn test_emit_without_session_makes_no_transport_call() {
    let surface = VideoSurface::new("video");
    let (factory, sink) = mock();

    let mut idle = Session::idle(SessionConfig::new());
    assert_eq!(
        idle.emit_ui_interaction(Descriptor::body_paint("Red")),
        Emission::Dropped(DropReason::NotReady)
    );
    assert_eq!(
        idle.emit_console_command("stat fps"),
        Emission::Dropped(DropReason::NotReady)
    );

    let mut session =
        Session::start(SessionConfig::new(), &surface, &factory, |_| {}).expect("start");
    session.stop();
    let before = sink.len();

    assert_eq!(
        session.emit_ui_interaction(Descriptor::rims("Sport")),
        Emission::Dropped(DropReason::Disposed)
    );
    assert_eq!(session.play(), Emission::Dropped(DropReason::Disposed));
    assert_eq!(sink.len(), before);
}

proptest! {
    #[test]
    fn prop_structured_descriptor_forwarded_unmodified(
        part in "[A-Za-z]{1,12}",
        value in "[A-Za-z0-9 ]{0,16}",
        extra in proptest::option::of("[a-z]{1,8}"),
    ) {
        let mut object = json!({ "CarConfig": { "Part": part, "Value": value } });
        if let Some(key) = extra {
            object["CarConfig"][key] = json!(1);
        }

        let surface = VideoSurface::new("video");
        let (factory, sink) = mock();
        let mut session =
            Session::start(SessionConfig::new(), &surface, &factory, |_| {}).expect("start");

        prop_assert!(session.emit_ui_interaction(Descriptor::from_value(object.clone())).is_sent());
        let record = sink.last().expect("record");
        prop_assert_eq!(record.operation, "emitUIInteraction");
        prop_assert_eq!(record.payload, LogPayload::Structured(object));
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_stop_twice_leaves_disposed() {
    let surface = VideoSurface::new("video");
    let (factory, sink) = mock();
    let mut session =
        Session::start(SessionConfig::new(), &surface, &factory, |_| {}).expect("start");

    session.stop();
    session.stop();

    assert_eq!(session.state(), ConnectionState::Disposed);
    assert_eq!(sink.records_for("disconnect").len(), 1);
}

#[test]
fn test_listeners_fire_in_order() {
    let surface = VideoSurface::new("video");
    let (factory, _) = mock();
    let order = Arc::new(Mutex::new(Vec::new()));

    let first = Arc::clone(&order);
    let second = Arc::clone(&order);
    let mut session = Session::start(SessionConfig::new(), &surface, &factory, |session| {
        session.add_event_listener(LifecycleEvent::WebRtcConnected, move |_| {
            first.lock().push(1);
        });
        session.add_event_listener(LifecycleEvent::WebRtcConnected, move |_| {
            second.lock().push(2);
        });
    })
    .expect("start");

    factory
        .remote()
        .expect("remote")
        .fire(LifecycleEvent::WebRtcConnected);
    session.pump_events();

    assert_eq!(order.lock().as_slice(), [1, 2]);
}

#[test]
fn test_autoplay_rejection_in_every_live_state() {
    let setups: [&[LifecycleEvent]; 4] = [
        &[],
        &[LifecycleEvent::VideoInitialized],
        &[LifecycleEvent::VideoInitialized, LifecycleEvent::WebRtcConnected],
        &[LifecycleEvent::WebRtcFailed],
    ];

    for setup in setups {
        let surface = VideoSurface::new("video");
        let (factory, _) = mock();
        let mut session =
            Session::start(SessionConfig::new(), &surface, &factory, |_| {}).expect("start");
        let remote = factory.remote().expect("remote");

        for event in setup {
            remote.fire(event.clone());
        }
        session.pump_events();
        let state = session.state();

        remote.fire(LifecycleEvent::PlayStreamRejected);
        session.pump_events();
        assert!(session.autoplay_blocked(), "blocked after {setup:?}");
        assert_eq!(session.state(), state);

        let _ = session.play();
        assert!(!session.autoplay_blocked());
        assert_eq!(session.state(), state, "state kept after {setup:?}");
    }
}

#[test]
fn test_early_events_reach_listeners_registered_in_on_ready() {
    let surface = VideoSurface::new("video");
    let sink = RecordingSink::new();
    let factory = MockTransportFactory::new(sink).with_startup_events([
        LifecycleEvent::VideoInitialized,
        LifecycleEvent::WebRtcConnected,
    ]);
    let seen = Arc::new(Mutex::new(Vec::new()));

    let journal = Arc::clone(&seen);
    let mut session = Session::start(SessionConfig::new(), &surface, &factory, |session| {
        session.add_event_listener(LifecycleEvent::WebRtcConnected, move |event| {
            journal.lock().push(event.clone());
        });
    })
    .expect("start");

    session.pump_events();
    assert_eq!(seen.lock().as_slice(), [LifecycleEvent::WebRtcConnected]);
    assert_eq!(session.state(), ConnectionState::Connected);
}

#[test]
fn test_response_channel_feeds_event_log() {
    let surface = VideoSurface::new("video");
    let log = EventLog::new();
    let factory = MockTransportFactory::new(log.clone());

    let panel = log.clone();
    let mut session = Session::start(SessionConfig::new(), &surface, &factory, |session| {
        session.add_response_event_listener("logListener", move |data| {
            panel.record("UE5", data.clone());
        });
    })
    .expect("start");

    factory
        .remote()
        .expect("remote")
        .respond("logListener", json!("Level loaded"));
    session.pump_events();

    let entries = log.entries();
    assert_eq!(entries[0].kind, "UE5");
    assert_eq!(entries[0].message, "Level loaded");
    assert_eq!(entries.last().map(|e| e.kind.as_str()), Some("System"));
}

#[test]
fn test_exit_without_host_shell() {
    assert_eq!(request_exit(&NoHostBridge), ExitOutcome::Unavailable);
}

// ============================================================================
// Relay
// ============================================================================

#[tokio::test]
async fn test_relay_session_end_to_end() {
    init_tracing();

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    let (frame_tx, mut frame_rx) = tokio::sync::mpsc::unbounded_channel::<Value>();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut ws = accept_async(stream).await.expect("handshake");
        for frame in [
            r#"{"type":"event","event":"videoInitialized"}"#,
            r#"{"type":"event","event":"webRtcConnected"}"#,
        ] {
            ws.send(Message::Text(frame.to_string().into()))
                .await
                .expect("send");
        }
        while let Some(Ok(message)) = ws.next().await {
            if let Message::Text(text) = message {
                let _ = frame_tx.send(serde_json::from_str(&text).expect("json"));
            }
        }
    });

    let surface = VideoSurface::new("streamingVideo");
    let factory = RelayTransportFactory::new().expect("runtime");
    let config = SessionConfig::new()
        .with_auto_connect(true)
        .with_signaling_server(format!("ws://127.0.0.1:{port}"));

    let mut session = Session::start(config, &surface, &factory, |_| {}).expect("start");

    let wait = Duration::from_secs(5);
    while session.state() != ConnectionState::Connected {
        let delivered = timeout(wait, session.process_next_event())
            .await
            .expect("event in time");
        assert!(delivered);
    }

    let settings = timeout(wait, frame_rx.recv())
        .await
        .expect("settings in time")
        .expect("settings");
    assert_eq!(settings["type"], json!("settings"));
    assert_eq!(settings["settings"]["AutoConnect"], json!(true));
    assert_eq!(settings["settings"]["AutoPlayVideo"], json!(true));

    assert!(session.emit_console_command("stat unit").is_sent());
    let frame = timeout(wait, frame_rx.recv())
        .await
        .expect("frame in time")
        .expect("frame");
    assert_eq!(
        frame,
        json!({ "type": "command", "descriptor": { "ConsoleCommand": "stat unit" } })
    );

    session.stop();
    assert_eq!(session.state(), ConnectionState::Disposed);
}

#[tokio::test]
async fn test_relay_unreachable_fails_session() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);

    let surface = VideoSurface::new("video");
    let factory = RelayTransportFactory::new().expect("runtime");
    let failures = Arc::new(Mutex::new(0));

    let counter = Arc::clone(&failures);
    let mut session = Session::start(
        SessionConfig::new()
            .with_auto_connect(true)
            .with_signaling_server(format!("ws://127.0.0.1:{port}")),
        &surface,
        &factory,
        |session| {
            session.add_event_listener(LifecycleEvent::WebRtcFailed, move |_| {
                *counter.lock() += 1;
            });
        },
    )
    .expect("start");

    timeout(Duration::from_secs(5), session.process_next_event())
        .await
        .expect("event in time");

    assert_eq!(session.state(), ConnectionState::Failed);
    assert_eq!(*failures.lock(), 1);
    assert_eq!(
        session.emit_ui_interaction("late"),
        Emission::Dropped(DropReason::Rejected)
    );
}

#[tokio::test]
async fn test_relay_session_without_auto_connect_dials_on_connect() {
    init_tracing();

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();

    let surface = VideoSurface::new("streamingVideo");
    let factory = RelayTransportFactory::new().expect("runtime");
    let config = SessionConfig::new()
        .with_auto_connect(false)
        .with_signaling_server(format!("ws://127.0.0.1:{port}"));

    let mut session = Session::start(config, &surface, &factory, |_| {}).expect("start");
    assert_eq!(session.state(), ConnectionState::Connecting);

    assert!(
        timeout(Duration::from_secs(1), listener.accept()).await.is_err(),
        "relay dialed before connect"
    );
    assert_eq!(
        session.emit_ui_interaction(Descriptor::body_paint("Red")),
        Emission::Dropped(DropReason::Rejected)
    );

    assert!(session.connect().is_sent());
    let (stream, _) = timeout(Duration::from_secs(5), listener.accept())
        .await
        .expect("dial in time")
        .expect("accept");
    let mut ws = accept_async(stream).await.expect("handshake");
    ws.send(Message::Text(
        r#"{"type":"event","event":"webRtcConnected"}"#.to_string().into(),
    ))
    .await
    .expect("send");

    let first = timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("settings in time");
    let Some(Ok(Message::Text(text))) = first else {
        panic!("expected a settings frame");
    };
    let settings: Value = serde_json::from_str(&text).expect("json");
    assert_eq!(settings["type"], json!("settings"));
    assert_eq!(settings["settings"]["AutoConnect"], json!(false));

    let delivered = timeout(Duration::from_secs(5), session.process_next_event())
        .await
        .expect("event in time");
    assert!(delivered);
    assert_eq!(session.state(), ConnectionState::Connected);

    session.stop();
}
