//! Desktop shell - Tauri commands over a single game session

use std::sync::Mutex;

use tauri::{Manager, State};

use crate::game::{
    FootSide, GameConfig, GameEvent, GameSession, JsonFileStore, SessionSnapshot, StrideEvent,
    SystemClock, TopTimes,
};

/// Optional config in the app config dir
const CONFIG_FILE: &str = "fingerdash.json";
/// Leaderboard file in the app data dir
const RECORDS_FILE: &str = "records.json";

type DesktopSession = GameSession<SystemClock, JsonFileStore>;

/// Start dragging a foot
#[tauri::command]
fn begin_stride(session: State<'_, Mutex<DesktopSession>>, foot: FootSide) -> Result<bool, String> {
    let mut session = session.lock().map_err(|e| e.to_string())?;
    Ok(session.begin_stride(foot))
}

/// Report the downward drag of the active foot
#[tauri::command]
fn update_stride_offset(
    session: State<'_, Mutex<DesktopSession>>,
    foot: FootSide,
    downward_delta: f64,
) -> Result<bool, String> {
    let mut session = session.lock().map_err(|e| e.to_string())?;
    Ok(session.update_stride_offset(foot, downward_delta))
}

/// Release the dragged foot
#[tauri::command]
fn complete_stride(
    session: State<'_, Mutex<DesktopSession>>,
    foot: FootSide,
) -> Result<Option<StrideEvent>, String> {
    let mut session = session.lock().map_err(|e| e.to_string())?;
    Ok(session.complete_stride(foot))
}

/// Run due ticks and return the current state
#[tauri::command]
fn tick(session: State<'_, Mutex<DesktopSession>>) -> Result<SessionSnapshot, String> {
    let mut session = session.lock().map_err(|e| e.to_string())?;
    Ok(session.pump())
}

/// Get current snapshot without running ticks
#[tauri::command]
fn get_snapshot(session: State<'_, Mutex<DesktopSession>>) -> Result<SessionSnapshot, String> {
    let session = session.lock().map_err(|e| e.to_string())?;
    Ok(session.snapshot())
}

#[tauri::command]
fn get_leaderboard(session: State<'_, Mutex<DesktopSession>>) -> Result<TopTimes, String> {
    let session = session.lock().map_err(|e| e.to_string())?;
    Ok(session.leaderboard())
}

/// Notifications since the last call
#[tauri::command]
fn drain_events(session: State<'_, Mutex<DesktopSession>>) -> Result<Vec<GameEvent>, String> {
    let mut session = session.lock().map_err(|e| e.to_string())?;
    Ok(session.drain_events())
}

#[tauri::command]
fn restart(session: State<'_, Mutex<DesktopSession>>) -> Result<(), String> {
    let mut session = session.lock().map_err(|e| e.to_string())?;
    session.restart();
    Ok(())
}

fn load_config(app: &tauri::App) -> GameConfig {
    let path = match app.path().app_config_dir() {
        Ok(dir) => dir.join(CONFIG_FILE),
        Err(_) => return GameConfig::default(),
    };
    if !path.exists() {
        return GameConfig::default();
    }
    GameConfig::load(&path).unwrap_or_else(|e| {
        log::warn!("ignoring {}: {}", path.display(), e);
        GameConfig::default()
    })
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .setup(|app| {
            if cfg!(debug_assertions) {
                app.handle().plugin(
                    tauri_plugin_log::Builder::default()
                        .level(log::LevelFilter::Info)
                        .build(),
                )?;
            }
            let config = load_config(app);
            let store = JsonFileStore::new(app.path().app_data_dir()?.join(RECORDS_FILE));
            app.manage(Mutex::new(GameSession::new(config, SystemClock::new(), store)));
            log::info!("Fingerdash session initialized");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            begin_stride,
            update_stride_offset,
            complete_stride,
            tick,
            get_snapshot,
            get_leaderboard,
            drain_events,
            restart,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
