use gtk4::prelude::*;
use gtk4 as gtk;
use std::cell::RefCell;
use std::rc::Rc;

use wechat_copilot::AiMode;
use wechat_copilot::store::SuggestionSet;

type PickHandler = Rc<RefCell<Option<Rc<dyn Fn(usize)>>>>;

/// AI sidebar: mode switch, refresh button and the clickable suggestions.
pub struct SuggestionPanel {
    root: gtk::Box,
    list: gtk::Box,
    copilot_btn: gtk::ToggleButton,
    auto_btn: gtk::ToggleButton,
    refresh_btn: gtk::Button,
    on_pick: PickHandler,
}

impl SuggestionPanel {
    pub fn new(mode: AiMode) -> Self {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(12);
        root.set_margin_end(12);
        root.set_size_request(300, -1);

        let title = gtk::Label::new(Some("AI Copilot"));
        title.add_css_class("heading");
        title.set_halign(gtk::Align::Start);
        root.append(&title);

        let modes = gtk::Box::new(gtk::Orientation::Horizontal, 0);
        modes.add_css_class("linked");
        let copilot_btn = gtk::ToggleButton::with_label("Copilot");
        let auto_btn = gtk::ToggleButton::with_label("Auto reply");
        copilot_btn.set_hexpand(true);
        auto_btn.set_hexpand(true);
        auto_btn.set_group(Some(&copilot_btn));
        match mode {
            AiMode::Copilot => copilot_btn.set_active(true),
            AiMode::Auto => auto_btn.set_active(true),
        }
        modes.append(&copilot_btn);
        modes.append(&auto_btn);
        root.append(&modes);

        let heading = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        let label = gtk::Label::new(Some("Reply suggestions"));
        label.add_css_class("caption-heading");
        label.set_hexpand(true);
        label.set_xalign(0.0);
        let refresh_btn = gtk::Button::from_icon_name("view-refresh-symbolic");
        refresh_btn.add_css_class("flat");
        refresh_btn.set_tooltip_text(Some("Analyze the latest message again"));
        heading.append(&label);
        heading.append(&refresh_btn);
        root.append(&heading);

        let list = gtk::Box::new(gtk::Orientation::Vertical, 6);
        list.set_vexpand(true);
        root.append(&list);

        Self { root, list, copilot_btn, auto_btn, refresh_btn, on_pick: Rc::new(RefCell::new(None)) }
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn connect_mode<F: Fn(AiMode) + 'static>(&self, on_mode: F) {
        let on_mode: Rc<dyn Fn(AiMode)> = Rc::new(on_mode);
        for (button, mode) in [(&self.copilot_btn, AiMode::Copilot), (&self.auto_btn, AiMode::Auto)] {
            let on_mode = on_mode.clone();
            button.connect_toggled(move |btn| {
                if btn.is_active() {
                    (on_mode)(mode);
                }
            });
        }
    }

    pub fn connect_refresh<F: Fn() + 'static>(&self, on_refresh: F) {
        self.refresh_btn.connect_clicked(move |_| on_refresh());
    }

    pub fn connect_pick<F: Fn(usize) + 'static>(&self, on_pick: F) {
        *self.on_pick.borrow_mut() = Some(Rc::new(on_pick));
    }

    pub fn render(&self, suggestions: &SuggestionSet) {
        while let Some(child) = self.list.first_child() {
            self.list.remove(&child);
        }
        for (index, suggestion) in suggestions.as_slice().iter().enumerate() {
            let label = gtk::Label::new(Some(suggestion));
            label.set_wrap(true);
            label.set_xalign(0.0);
            let button = gtk::Button::builder().child(&label).build();
            let on_pick = self.on_pick.clone();
            button.connect_clicked(move |_| {
                let handler = on_pick.borrow().clone();
                if let Some(handler) = handler {
                    handler(index);
                }
            });
            self.list.append(&button);
        }
    }
}
