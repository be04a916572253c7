pub mod chat_view;
pub mod main_window;
pub mod sidebar;
pub mod suggestion_panel;

use tokio::sync::mpsc::UnboundedReceiver;
use wechat_copilot::api::AppEvent;

/// Drain background events on the GTK main loop.
pub fn attach_events<F>(mut rx: UnboundedReceiver<AppEvent>, mut on_event: F)
where
    F: FnMut(AppEvent) + 'static,
{
    let _ = glib::MainContext::default().spawn_local(async move {
        while let Some(event) = rx.recv().await {
            on_event(event);
        }
    });
}
