use minitray::{
    ItemFlags, MenuItem, SimulatedBackend, SimulatedShell, Tray, TrayConfig, TrayError, TrayHandle,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

type Log = Rc<RefCell<Vec<String>>>;

fn recording_item(label: &str, log: &Log) -> MenuItem {
    let log = log.clone();
    MenuItem::new(label).on_activate(move |item| log.borrow_mut().push(item.text.clone()))
}

fn start(tray: Tray) -> (TrayHandle<SimulatedBackend>, SimulatedShell) {
    let shell = SimulatedShell::new();
    let handle = TrayHandle::initialize(
        tray,
        TrayConfig::default(),
        SimulatedBackend::new(shell.clone()),
    )
    .expect("simulated backend always starts");
    (handle, shell)
}

#[test]
fn empty_menu_is_active_with_nothing_to_select() {
    let (mut handle, shell) = start(Tray::new("icon", "empty"));

    assert!(shell.is_visible());
    assert!(shell.entries().is_empty());
    assert!(!shell.click(0));
    assert!(!handle.run_once(false));
}

#[test]
fn menu_starting_with_terminator_renders_nothing() {
    let log = Log::default();
    let tray = Tray::default().with_menu([MenuItem::terminator(), recording_item("after", &log)]);
    let (mut handle, shell) = start(tray);

    assert!(shell.labels().is_empty());
    assert!(!handle.run_once(false));
    assert!(log.borrow().is_empty());
}

#[test]
fn click_runs_exactly_that_callback_once() {
    let log = Log::default();
    let tray = Tray::new("icon", "tip").with_menu([
        recording_item("first", &log),
        recording_item("second", &log),
        recording_item("third", &log),
    ]);
    let (mut handle, shell) = start(tray);

    assert!(shell.click(1));
    assert!(!handle.run_once(true));
    assert!(!handle.run_once(false));

    assert_eq!(*log.borrow(), ["second"]);
}

#[test]
fn callback_sees_its_own_context() {
    let seen = Rc::new(RefCell::new(None));
    let sink = seen.clone();
    let tray = Tray::default().with_item(
        MenuItem::new("ctx")
            .with_context(42u8)
            .on_activate(move |item| *sink.borrow_mut() = item.context::<u8>().copied()),
    );
    let (mut handle, shell) = start(tray);

    shell.click(0);
    handle.run_once(true);

    assert_eq!(*seen.borrow(), Some(42));
}

#[test]
fn redraw_shows_new_sequence_in_order() {
    let log = Log::default();
    let tray = Tray::default().with_menu([recording_item("a", &log), recording_item("b", &log)]);
    let (mut handle, shell) = start(tray);
    assert_eq!(shell.labels(), ["a", "b"]);

    {
        let menu = &mut handle.tray_mut().menu;
        menu.remove(0);
        menu[0].text = "B".into();
        menu.push(recording_item("c", &log));
        menu.insert(0, recording_item("z", &log));
    }
    handle.redraw();

    assert_eq!(shell.labels(), ["z", "B", "c"]);
    assert_eq!(shell.redraw_count(), 1);

    shell.click(2);
    handle.run_once(true);
    assert_eq!(*log.borrow(), ["c"]);
}

#[test]
fn clicks_from_before_a_redraw_are_dropped() {
    let log = Log::default();
    let tray = Tray::default().with_menu([recording_item("old", &log)]);
    let (mut handle, shell) = start(tray);

    shell.click(0);
    handle.tray_mut().menu[0] = recording_item("new", &log);
    handle.redraw();

    assert!(!handle.run_once(false));
    assert!(log.borrow().is_empty());
    assert_eq!(shell.pending(), 0);
}

#[test]
fn queued_clicks_survive_the_redraw_loop() {
    let log = Log::default();
    let tray = Tray::default().with_menu([recording_item("again", &log), recording_item("other", &log)]);
    let (mut handle, shell) = start(tray);

    assert!(shell.click(0));
    assert!(shell.click(0));
    assert!(!handle.run_once(true));
    handle.redraw();
    assert!(!handle.run_once(false));

    assert_eq!(*log.borrow(), ["again", "again"]);
}

#[test]
fn tooltip_only_redraw_keeps_pending_click() {
    let log = Log::default();
    let tray = Tray::new("icon", "before").with_item(recording_item("item", &log));
    let (mut handle, shell) = start(tray);

    shell.click(0);
    handle.tray_mut().tooltip = "after".into();
    handle.redraw();

    assert!(!handle.run_once(false));
    assert_eq!(*log.borrow(), ["item"]);
    assert_eq!(handle.generation(), 1);
    assert_eq!(shell.tooltip().as_deref(), Some("after"));
}

#[test]
fn click_on_unchanged_entry_survives_menu_growth() {
    let log = Log::default();
    let tray = Tray::default().with_item(recording_item("keep", &log));
    let (mut handle, shell) = start(tray);

    shell.click(0);
    handle.tray_mut().menu.push(recording_item("new", &log));
    handle.redraw();
    handle.tray_mut().menu.push(recording_item("newer", &log));
    handle.redraw();

    assert!(!handle.run_once(false));
    assert_eq!(*log.borrow(), ["keep"]);
    assert_eq!(handle.generation(), 3);
}

#[test]
fn click_on_removed_position_is_dropped() {
    let log = Log::default();
    let tray = Tray::default().with_menu([recording_item("a", &log), recording_item("b", &log)]);
    let (mut handle, shell) = start(tray);

    shell.click(1);
    handle.tray_mut().menu.pop();
    handle.redraw();

    assert!(!handle.run_once(false));
    assert!(log.borrow().is_empty());
}

#[test]
fn callback_mutations_survive_until_redraw() {
    let tray = Tray::default().with_item(
        MenuItem::new("Notify")
            .with_flags(ItemFlags::CHECKED)
            .on_activate(|item| item.flags.toggle(ItemFlags::CHECKED)),
    );
    let (mut handle, shell) = start(tray);

    shell.click(0);
    handle.run_once(true);
    assert!(!handle.tray().menu[0].is_checked());

    handle.redraw();
    assert_eq!(shell.entries()[0].kind, minitray::tray::EntryKind::Standard);
}

#[test]
fn request_exit_makes_next_run_once_return_without_blocking() {
    let (mut handle, _shell) = start(Tray::default());

    handle.request_exit();
    // Blocking would hang the test if the exit sentinel were not honored.
    assert!(handle.run_once(true));
    assert!(handle.run_once(true));
}

#[test]
fn exit_from_callback_ends_the_loop() {
    let (mut handle, shell) = start(Tray::default());
    let exit = handle.exit_signal();
    handle
        .tray_mut()
        .menu
        .push(MenuItem::new("Quit").on_activate(move |_| exit.request()));
    handle.redraw();

    shell.click_label("Quit");
    let mut iterations = 0;
    while !handle.run_once(true) {
        iterations += 1;
    }
    assert_eq!(iterations, 0);
}

#[test]
fn exit_from_another_thread_wakes_blocked_loop() {
    let (mut handle, _shell) = start(Tray::default());
    let exit = handle.exit_signal();

    let requester = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        exit.request();
    });

    while !handle.run_once(true) {}
    requester.join().unwrap();
}

#[test]
fn shutdown_removes_icon_and_returns_model() {
    let tray = Tray::new("icon", "tip").with_menu([MenuItem::new("a"), MenuItem::new("b")]);
    let (handle, shell) = start(tray);
    assert_eq!(shell.icon().as_deref(), Some("icon"));

    let tray = handle.shutdown();

    assert!(!shell.is_visible());
    assert!(shell.icon().is_none());
    assert_eq!(tray.menu.len(), 2);
    assert_eq!(tray.tooltip, "tip");
}

#[test]
fn dropping_the_handle_also_removes_icon() {
    let (handle, shell) = start(Tray::new("icon", "tip"));
    drop(handle);
    assert!(!shell.is_visible());
}

#[test]
fn terminator_never_rendered_for_any_length() {
    for len in 0..8 {
        let mut tray = Tray::default();
        for i in 0..len {
            tray.menu.push(MenuItem::new(format!("item {i}")));
        }
        tray.menu.push(MenuItem::terminator());
        tray.menu.push(MenuItem::new("beyond"));

        let (mut handle, shell) = start(tray);
        assert_eq!(shell.entries().len(), len);
        assert!(!shell.click(len));
        assert!(!handle.run_once(false));
    }
}

#[test]
fn disabled_and_separator_entries_do_not_dispatch() {
    let log = Log::default();
    let tray = Tray::default().with_menu([
        recording_item("off", &log).with_flags(ItemFlags::DISABLED),
        MenuItem::separator(),
        recording_item("on", &log),
    ]);
    let (mut handle, shell) = start(tray);

    assert!(!shell.click(0));
    assert!(!shell.click(1));
    assert!(shell.click(2));
    handle.run_once(true);

    assert_eq!(*log.borrow(), ["on"]);
}

#[test]
fn unavailable_toolkit_fails_initialization() {
    let result = TrayHandle::initialize(
        Tray::default(),
        TrayConfig::default(),
        SimulatedBackend::unavailable("no display server"),
    );
    assert!(matches!(result, Err(TrayError::Unavailable(_))));
}

#[test]
fn config_reaches_the_shell() {
    let shell = SimulatedShell::new();
    let handle = TrayHandle::initialize(
        Tray::default(),
        TrayConfig::default().with_id("com.example.test").with_title("Test"),
        SimulatedBackend::new(shell.clone()),
    )
    .unwrap();

    assert_eq!(shell.config().map(|c| c.id), Some("com.example.test".to_string()));
    assert_eq!(handle.config().title, "Test");
    assert_eq!(handle.generation(), 1);
}
