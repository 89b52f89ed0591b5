use emberbox_bridge::{
    Decision, DriveError, DriveTable, HookDispatcher, HookOutcome, HookRegistry, LifecycleState,
    ScalingMode, ShellEvent, SurfaceDescriptor, SurfaceFlags, SurfaceRequest, TitleInfo,
    WindowEvent, filter_listing,
};
use emberbox_types::DriveId;
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

fn drive(letter: char) -> DriveId {
    DriveId::from_letter(letter).unwrap()
}

// ================================================================
// Pure default-catalogue behavior: no handlers at all
// ================================================================

#[test]
fn handler_free_emulator_runs_autonomously() {
    init_logging();
    let hooks = HookDispatcher::autonomous();
    let mut table = DriveTable::new();

    // Mounting and writing proceed freely.
    table.mount(drive('C'), "/games/keen", &hooks).unwrap();
    table
        .check_write_access(drive('C'), Path::new("C:\\KEEN\\SAVE.DAT"), &hooks)
        .unwrap();

    // Nothing is hidden from listings.
    let listing = filter_listing(
        &hooks,
        vec![".DS_Store".to_string(), "KEEN.EXE".to_string()],
    );
    assert_eq!(listing, vec![".DS_Store", "KEEN.EXE"]);

    // Nothing is registered: the whole catalogue falls through to defaults.
    assert!(hooks.registry().registered_points().is_empty());

    // A few "iterations" of the main loop: never paused, never cancelled,
    // every event left to the core's default handling.
    for _ in 0..5 {
        assert!(!hooks.is_paused());
        assert!(!hooks.is_cancelled());
        assert_eq!(hooks.event_loop_tick(), HookOutcome::Unhandled);
    }

    table.unmount(drive('C'), &hooks).unwrap();
}

// ================================================================
// Write denial scenario
// ================================================================

#[test]
fn denied_write_fails_visibly_while_reads_still_succeed() {
    let mut registry = HookRegistry::new();
    registry.on_write_authorization(|path, d| {
        Decision::allow_if(!(d == DriveId::from_letter('C').unwrap()
            && path == Path::new("C:\\GAME\\SAVE.DAT")))
    });
    let hooks = HookDispatcher::new(registry, Arc::new(LifecycleState::new()));

    let mut table = DriveTable::new();
    table.mount(drive('C'), "/games", &hooks).unwrap();

    // The guest-visible write attempt fails with a permission error.
    let err = table
        .check_write_access(drive('C'), Path::new("C:\\GAME\\SAVE.DAT"), &hooks)
        .unwrap_err();
    assert!(matches!(err, DriveError::WriteDenied { .. }));

    // The same path stays readable: it is not hidden from listings and the
    // drive itself is untouched.
    let listing = filter_listing(&hooks, vec!["SAVE.DAT".to_string()]);
    assert_eq!(listing, vec!["SAVE.DAT"]);
    assert_eq!(table.mounted_path(drive('C')), Some(Path::new("/games")));

    // Writes elsewhere on the drive are unaffected.
    table
        .check_write_access(drive('C'), Path::new("C:\\GAME\\CONFIG.CFG"), &hooks)
        .unwrap();
}

// ================================================================
// Shell command interception
// ================================================================

#[test]
fn host_handled_dir_suppresses_the_builtin() {
    let builtin_ran = Arc::new(Mutex::new(false));

    let mut registry = HookRegistry::new();
    registry.on_shell_command(|name, _| {
        if name.eq_ignore_ascii_case("dir") {
            HookOutcome::Handled
        } else {
            HookOutcome::Unhandled
        }
    });
    let hooks = HookDispatcher::new(registry, Arc::new(LifecycleState::new()));

    // Core-side command processing: only run the built-in when unhandled.
    let mut run_command = |name: &str, args: &str| {
        if hooks.shell_command(name, args) == HookOutcome::Unhandled {
            *builtin_ran.lock().unwrap() = true;
        }
    };

    run_command("DIR", "");
    assert!(!*builtin_ran.lock().unwrap());

    run_command("COPY", "A.TXT B.TXT");
    assert!(*builtin_ran.lock().unwrap());
}

#[test]
fn shell_lifecycle_notifications_arrive_in_order() {
    let events: Arc<Mutex<Vec<ShellEvent>>> = Arc::new(Mutex::new(Vec::new()));

    let mut registry = HookRegistry::new();
    let sink = Arc::clone(&events);
    registry.on_autoexec_start(move || sink.lock().unwrap().push(ShellEvent::AutoexecStart));
    let sink = Arc::clone(&events);
    registry.on_autoexec_end(move || sink.lock().unwrap().push(ShellEvent::AutoexecEnd));
    let sink = Arc::clone(&events);
    registry.on_return_to_prompt(move || sink.lock().unwrap().push(ShellEvent::ReturnToPrompt));
    let sink = Arc::clone(&events);
    registry.on_shell_command(move |name, args| {
        sink.lock().unwrap().push(ShellEvent::CommandIssued {
            name: name.to_string(),
            args: args.to_string(),
        });
        HookOutcome::Unhandled
    });

    let hooks = HookDispatcher::new(registry, Arc::new(LifecycleState::new()));

    hooks.autoexec_started();
    hooks.autoexec_ended();
    hooks.shell_command("VER", "");
    hooks.returned_to_prompt();

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            ShellEvent::AutoexecStart,
            ShellEvent::AutoexecEnd,
            ShellEvent::CommandIssued {
                name: "VER".to_string(),
                args: String::new(),
            },
            ShellEvent::ReturnToPrompt,
        ]
    );
}

// ================================================================
// Window event interception
// ================================================================

#[test]
fn consumed_window_event_skips_core_handling() {
    let mut registry = HookRegistry::new();
    registry.on_window_event(|event| match event {
        WindowEvent::CloseRequested => HookOutcome::Handled,
        _ => HookOutcome::Unhandled,
    });
    let hooks = HookDispatcher::new(registry, Arc::new(LifecycleState::new()));

    assert_eq!(
        hooks.window_event(&WindowEvent::CloseRequested),
        HookOutcome::Handled
    );
    assert_eq!(
        hooks.window_event(&WindowEvent::KeyDown { scancode: 0x1c }),
        HookOutcome::Unhandled
    );
}

// ================================================================
// Surface negotiation scenario
// ================================================================

#[test]
fn layout_math_uses_negotiated_size_not_the_request() {
    init_logging();
    let mut registry = HookRegistry::new();
    registry.on_setup_surface(|request| SurfaceDescriptor {
        width: request.width * 2,
        height: request.height * 2,
        bits_per_pixel: request.bits_per_pixel,
        scaling: ScalingMode::Normal2x,
    });
    let hooks = HookDispatcher::new(registry, Arc::new(LifecycleState::new()));

    hooks.setup_surface(&SurfaceRequest {
        width: 320,
        height: 200,
        flags: SurfaceFlags::FULLSCREEN,
        bits_per_pixel: 8,
    });

    assert_eq!(hooks.surface_size(), (640, 400));
    assert_eq!(hooks.color_depth(), 8);

    // Reconfiguration starts a new generation.
    hooks.setup_surface(&SurfaceRequest {
        width: 640,
        height: 480,
        flags: SurfaceFlags::empty(),
        bits_per_pixel: 32,
    });
    assert_eq!(hooks.surface_size(), (1280, 960));
    assert_eq!(hooks.surface_generation(), 2);
}

// ================================================================
// Title and string overrides
// ================================================================

#[test]
fn host_owned_title_presentation_suppresses_core_updates() {
    let titles: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&titles);

    let mut registry = HookRegistry::new();
    registry.on_title_change(move |info| {
        sink.lock()
            .unwrap()
            .push(format!("{} cycles{}", info.cycles, if info.paused { " (paused)" } else { "" }));
        HookOutcome::Handled
    });
    let hooks = HookDispatcher::new(registry, Arc::new(LifecycleState::new()));

    let outcome = hooks.title_change(&TitleInfo {
        cycles: 3000,
        frameskip: 0,
        paused: true,
    });
    assert_eq!(outcome, HookOutcome::Handled);
    assert_eq!(*titles.lock().unwrap(), vec!["3000 cycles (paused)"]);
}

#[test]
fn string_overrides_win_and_absence_falls_back() {
    let mut registry = HookRegistry::new();
    registry.on_localized_string(|key| {
        (key == "quit_prompt").then(|| "Really quit?".to_string())
    });
    registry.on_keyboard_layout(|| Some("uk".to_string()));
    registry.on_recording_path(|extension| {
        Some(PathBuf::from(format!("/captures/session.{extension}")))
    });
    let hooks = HookDispatcher::new(registry, Arc::new(LifecycleState::new()));

    assert_eq!(
        hooks.localized_string("quit_prompt").as_deref(),
        Some("Really quit?")
    );
    // Unknown key: handler declines, core falls back to its own tables.
    assert_eq!(hooks.localized_string("unknown_key"), None);

    assert_eq!(hooks.keyboard_layout().as_deref(), Some("uk"));
    assert_eq!(
        hooks.recording_path("avi"),
        Some(PathBuf::from("/captures/session.avi"))
    );
}

// ================================================================
// Cooperative pause and cancellation
// ================================================================

#[test]
fn polled_cancellation_stops_a_simulated_main_loop() {
    let lifecycle = Arc::new(LifecycleState::new());
    let hooks = HookDispatcher::new(HookRegistry::new(), Arc::clone(&lifecycle));

    let mut completed_iterations = 0;
    for iteration in 0..100 {
        if hooks.is_cancelled() {
            break;
        }
        if !hooks.is_paused() {
            completed_iterations += 1;
        }
        hooks.event_loop_tick();

        if iteration == 9 {
            lifecycle.cancel();
        }
    }

    // The flag was polled with at most one iteration of latency.
    assert_eq!(completed_iterations, 10);
    assert!(hooks.is_cancelled());
}

#[test]
fn pause_suspends_progress_without_exiting_the_loop() {
    let lifecycle = Arc::new(LifecycleState::new());
    let hooks = HookDispatcher::new(HookRegistry::new(), Arc::clone(&lifecycle));

    let mut emulated_ticks = 0;
    let mut pump_ticks = 0;
    for iteration in 0..6 {
        if !hooks.is_paused() {
            emulated_ticks += 1;
        }
        // The event pump stays alive even while paused.
        hooks.event_loop_tick();
        pump_ticks += 1;

        match iteration {
            1 => lifecycle.pause(),
            3 => lifecycle.resume(),
            _ => {}
        }
    }

    assert_eq!(emulated_ticks, 4);
    assert_eq!(pump_ticks, 6);
}
