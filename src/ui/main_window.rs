use adw::prelude::*;
use adw::Application;
use std::cell::RefCell;
use std::rc::Rc;

use wechat_copilot::{ConversationStore, Session, Settings};

use crate::ui::chat_view::ChatView;
use crate::ui::sidebar::Sidebar;
use crate::ui::suggestion_panel::SuggestionPanel;

struct Views {
    sidebar: Sidebar,
    chat: ChatView,
    panel: SuggestionPanel,
}

impl Views {
    fn render(&self, session: &Session) {
        self.chat.render(session.state());
        self.panel.render(session.state().suggestions());
    }
}

pub fn show_main_window(app: &Application, settings: &Settings) {
    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("WeChat Copilot")
        .default_width(1200)
        .default_height(720)
        .build();

    let overlay = adw::ToastOverlay::new();
    overlay.set_vexpand(true);

    let container = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    let header = adw::HeaderBar::new();
    let title = gtk4::Label::new(Some("WeChat Copilot"));
    header.set_title_widget(Some(&title));
    container.append(&header);
    container.append(&overlay);
    window.set_content(Some(&container));

    let runtime = wechat_copilot::utils::runtime_handle();
    let (session, rx) = match Session::new(settings, ConversationStore::demo(), runtime) {
        Ok(pair) => pair,
        Err(err) => {
            log::error!("Cannot start session for {}: {err}", settings.base_url);
            let page = adw::StatusPage::builder()
                .icon_name("network-error-symbolic")
                .title("Backend unavailable")
                .description(err.to_string())
                .build();
            overlay.set_child(Some(&page));
            window.present();
            return;
        }
    };
    let session = Rc::new(RefCell::new(session));
    let views = Rc::new(Views {
        sidebar: Sidebar::new(),
        chat: ChatView::new(),
        panel: SuggestionPanel::new(settings.ai_mode),
    });

    let body = gtk4::Box::new(gtk4::Orientation::Horizontal, 0);
    body.append(&views.sidebar.widget());
    body.append(&gtk4::Separator::new(gtk4::Orientation::Vertical));
    body.append(&views.chat.widget());
    body.append(&gtk4::Separator::new(gtk4::Orientation::Vertical));
    body.append(&views.panel.widget());
    overlay.set_child(Some(&body));

    {
        let s = session.borrow();
        views.sidebar.set_items(s.state().conversations().all(), s.state().active());
        views.render(&s);
    }

    // Conversation switch
    {
        let session = session.clone();
        let views_for_select = views.clone();
        views.sidebar.connect_selected(move |id| {
            if session.borrow_mut().select_conversation(id) {
                views_for_select.render(&session.borrow());
            }
        });
    }

    // Compose
    {
        let session = session.clone();
        views.chat.connect_compose_changed(move |text| session.borrow_mut().set_compose(text));
    }

    // Send (local echo)
    {
        let session = session.clone();
        let views_for_send = views.clone();
        views.chat.connect_send(move || {
            let sent = session.borrow_mut().send();
            if sent.is_some() {
                views_for_send.chat.set_compose("");
                views_for_send.render(&session.borrow());
            }
        });
    }

    // Suggestion picked into the compose box
    {
        let session = session.clone();
        let views_for_pick = views.clone();
        views.panel.connect_pick(move |index| {
            let text = {
                let mut s = session.borrow_mut();
                s.pick_suggestion(index).then(|| s.state().compose().to_string())
            };
            if let Some(text) = text {
                views_for_pick.chat.set_compose(&text);
            }
        });
    }

    // Manual refresh
    {
        let session = session.clone();
        let overlay = overlay.clone();
        views.panel.connect_refresh(move || {
            if !session.borrow_mut().refresh_suggestions() {
                overlay.add_toast(adw::Toast::new("No messages to analyze yet."));
            }
        });
    }

    // AI mode, persisted as the default for the next start
    {
        let session = session.clone();
        let overlay = overlay.clone();
        let settings = RefCell::new(settings.clone());
        views.panel.connect_mode(move |mode| {
            session.borrow_mut().set_mode(mode);
            let mut settings = settings.borrow_mut();
            settings.ai_mode = mode;
            if let Err(err) = settings.save() {
                log::warn!("Failed to save settings: {err}");
                overlay.add_toast(adw::Toast::new(&format!("Failed to save settings: {}", err)));
            }
        });
    }

    // Background results
    {
        let session = session.clone();
        let views = views.clone();
        crate::ui::attach_events(rx, move |event| {
            session.borrow_mut().handle_event(event);
            views.render(&session.borrow());
        });
    }

    {
        let session = session.clone();
        window.connect_close_request(move |_| {
            session.borrow_mut().shutdown();
            glib::Propagation::Proceed
        });
    }

    session.borrow_mut().start();
    window.present();
}
