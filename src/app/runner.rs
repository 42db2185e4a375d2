//! Win32 message loop
//!
//! Everything runs on one thread. A thread timer posts `WM_TIMER` at the
//! tick interval; each tick finishes before the next message is taken off
//! the queue, so ticks never overlap. Hotkeys arrive as `WM_HOTKEY` on the
//! same queue and Ctrl+C on the console posts `WM_QUIT`.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use log::{debug, error, info, warn};
use windows::Win32::Foundation::{BOOL, FALSE, HWND, LPARAM, TRUE, WPARAM};
use windows::Win32::System::Console::SetConsoleCtrlHandler;
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::HiDpi::{DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2, SetProcessDpiAwarenessContext};
use windows::Win32::UI::WindowsAndMessaging::{
    DispatchMessageW, GetMessageW, KillTimer, MSG, PostQuitMessage, PostThreadMessageW, SetTimer, TranslateMessage,
    WM_HOTKEY, WM_QUIT, WM_TIMER,
};

use crate::app::controller::SnapController;
use crate::app::registry::{MonitorArea, OverlayRegistry};
use crate::app::state::GestureState;
use crate::config::AppSettings;
use crate::input::{AsyncKeyStateSource, DEFAULT_BINDINGS, HotkeyAction, InputSource, ThreadHotkeys, action_for};
use crate::platform::{MonitorError, ShellWindowLocator, SingleInstance, monitor_areas};
use crate::ui::OverlayWindow;

/// Ticks between two monitor-set checks
const MONITOR_POLL_TICKS: u32 = 12;

/// Thread that owns the message loop, for the console control handler
static LOOP_THREAD: AtomicU32 = AtomicU32::new(0);

/// Fatal errors of the application loop
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("monitor enumeration failed: {0}")]
    Monitors(#[from] MonitorError),
    #[error("another instance is already running")]
    AlreadyRunning,
    #[error("instance check failed: {0}")]
    InstanceCheck(windows::core::Error),
    #[error("failed to start the {0} ms tick timer")]
    Timer(u32),
    #[error("message loop failed: {0}")]
    MessageLoop(windows::core::Error),
}

/// Startup options resolved from the command line
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub settings_path: Option<PathBuf>,
    /// Start with overlays hidden
    pub silent: bool,
    pub interval_ms: u32,
}

/// Everything the loop mutates between messages
struct App {
    settings: AppSettings,
    settings_path: Option<PathBuf>,
    registry: OverlayRegistry<OverlayWindow>,
    controller: SnapController<ShellWindowLocator>,
    state: GestureState,
    input: AsyncKeyStateSource,
    ticks: u32,
}

impl App {
    fn new(options: &RunOptions) -> Self {
        let settings = match &options.settings_path {
            Some(path) => AppSettings::load_or_default(path),
            None => {
                warn!("No configuration directory; using default settings");
                AppSettings::default()
            }
        };

        Self {
            settings,
            settings_path: options.settings_path.clone(),
            registry: OverlayRegistry::new(!options.silent),
            controller: SnapController::new(ShellWindowLocator::new()),
            state: GestureState::new(),
            input: AsyncKeyStateSource::new(),
            ticks: 0,
        }
    }

    fn apply(&mut self, monitors: &[MonitorArea]) {
        let report = self.registry.apply(monitors, &self.settings, OverlayWindow::create);
        debug!("Applied grid: {report:?}");
    }

    /// Re-applies the grid when monitors were added, removed or resized
    fn refresh_monitors(&mut self) {
        match monitor_areas() {
            Ok(monitors) if !self.registry.matches(&monitors) => {
                info!("Monitor configuration changed");
                self.apply(&monitors);
            }
            Ok(_) => {}
            Err(e) => debug!("Skipping monitor check: {e}"),
        }
    }

    fn on_tick(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
        if self.ticks % MONITOR_POLL_TICKS == 0 {
            self.refresh_monitors();
        }

        let input = self.input.sample();
        let report = self.controller.tick(&mut self.state, &input, &self.registry);
        if report.moved > 0 {
            debug!("{:?} moved {} icon(s)", report.gesture, report.moved);
        }
    }

    /// Returns false when the loop should stop
    fn on_hotkey(&mut self, id: i32) -> bool {
        match action_for(DEFAULT_BINDINGS, id) {
            Some(HotkeyAction::ToggleGrid) => {
                let visible = self.registry.toggle_visible();
                info!("Grid {}", if visible { "shown" } else { "hidden" });
                true
            }
            Some(HotkeyAction::ReloadSettings) => {
                if let Some(path) = &self.settings_path {
                    self.settings = AppSettings::load_or_default(path);
                }
                match monitor_areas() {
                    Ok(monitors) => self.apply(&monitors),
                    Err(e) => warn!("Settings reloaded but not applied: {e}"),
                }
                true
            }
            Some(HotkeyAction::Quit) => false,
            None => {
                debug!("Unknown hotkey id {id}");
                true
            }
        }
    }

    fn save_settings(&self) {
        let Some(path) = &self.settings_path else {
            return;
        };
        match self.settings.save(path) {
            Ok(()) => info!("Settings saved to {}", path.display()),
            Err(e) => warn!("{e}"),
        }
    }
}

unsafe extern "system" fn console_ctrl_handler(_ctrl_type: u32) -> BOOL {
    let thread = LOOP_THREAD.load(Ordering::Acquire);
    if thread == 0 {
        return FALSE;
    }
    match unsafe { PostThreadMessageW(thread, WM_QUIT, WPARAM(0), LPARAM(0)) } {
        Ok(()) => TRUE,
        Err(_) => FALSE,
    }
}

/// Runs until Ctrl+Alt+Q, Ctrl+C or `WM_QUIT`
pub fn run(options: RunOptions) -> Result<(), AppError> {
    // Must happen before any window or monitor call
    if let Err(e) = unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) } {
        warn!("Per-monitor DPI awareness unavailable: {e}");
    }

    let _instance = SingleInstance::acquire()
        .map_err(AppError::InstanceCheck)?
        .ok_or(AppError::AlreadyRunning)?;

    let mut app = App::new(&options);
    let monitors = monitor_areas()?;
    app.apply(&monitors);
    info!(
        "Grid ready on {} monitor(s), overlays {}",
        app.registry.len(),
        if app.registry.is_visible() { "shown" } else { "hidden" }
    );

    LOOP_THREAD.store(unsafe { GetCurrentThreadId() }, Ordering::Release);
    if let Err(e) = unsafe { SetConsoleCtrlHandler(Some(console_ctrl_handler), true) } {
        debug!("No console control handler: {e}");
    }

    let hotkeys = ThreadHotkeys::register(DEFAULT_BINDINGS);
    info!("{} of {} hotkeys registered", hotkeys.count(), DEFAULT_BINDINGS.len());

    let timer = unsafe { SetTimer(HWND(0), 0, options.interval_ms, None) };
    if timer == 0 {
        return Err(AppError::Timer(options.interval_ms));
    }

    let result = message_loop(&mut app, timer);

    unsafe {
        let _ = KillTimer(HWND(0), timer);
    }
    drop(hotkeys);
    app.save_settings();
    result
}

fn message_loop(app: &mut App, timer: usize) -> Result<(), AppError> {
    let mut msg = MSG::default();

    loop {
        let result = unsafe { GetMessageW(&mut msg, HWND(0), 0, 0) };
        match result.0 {
            0 => {
                info!("Quit requested");
                return Ok(());
            }
            -1 => {
                let e = windows::core::Error::from_win32();
                error!("GetMessageW failed: {e}");
                return Err(AppError::MessageLoop(e));
            }
            _ => {}
        }

        match msg.message {
            WM_TIMER if msg.hwnd.0 == 0 && msg.wParam.0 == timer => app.on_tick(),
            WM_HOTKEY if msg.hwnd.0 == 0 => {
                if !app.on_hotkey(msg.wParam.0 as i32) {
                    unsafe { PostQuitMessage(0) };
                }
            }
            _ => unsafe {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            },
        }
    }
}
