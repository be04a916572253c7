mod ui;

use adw::prelude::*;
use adw::Application;

use wechat_copilot::Settings;

fn main() -> glib::ExitCode {
    let loaded = Settings::load();
    let settings = loaded.as_ref().cloned().unwrap_or_default();
    wechat_copilot::utils::init_logging(&settings.log_level);
    if let Err(err) = &loaded {
        log::warn!("Using default settings: {err}");
    }
    log::info!("Backend at {}", settings.base_url);

    let app = Application::builder()
        .application_id("com.example.WeChatCopilot")
        .build();
    app.connect_activate(move |app| {
        crate::ui::main_window::show_main_window(app, &settings);
    });
    app.run()
}
