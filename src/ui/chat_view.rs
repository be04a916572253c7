use gtk4::prelude::*;
use gtk4 as gtk;

use wechat_copilot::api::{Message, Sender};
use wechat_copilot::{AppState, SyncStatus};

pub struct ChatView {
    root: gtk::Box,
    title: gtk::Label,
    status: gtk::Label,
    scroller: gtk::ScrolledWindow,
    messages_box: gtk::Box,
    entry: gtk::Entry,
    send_btn: gtk::Button,
}

impl ChatView {
    pub fn new() -> Self {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
        root.set_hexpand(true);

        let header = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        header.set_margin_top(8);
        header.set_margin_start(12);
        header.set_margin_end(12);
        let title = gtk::Label::new(Some("Chat"));
        title.add_css_class("heading");
        title.set_hexpand(true);
        title.set_xalign(0.0);
        let status = gtk::Label::new(None);
        status.add_css_class("caption");
        header.append(&title);
        header.append(&status);
        root.append(&header);

        let scroller = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .hexpand(true)
            .hscrollbar_policy(gtk::PolicyType::Never)
            .build();
        let messages_box = gtk::Box::new(gtk::Orientation::Vertical, 8);
        messages_box.set_margin_top(8);
        messages_box.set_margin_bottom(8);
        messages_box.set_margin_start(12);
        messages_box.set_margin_end(12);
        scroller.set_child(Some(&messages_box));
        root.append(&scroller);

        let input_row = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        input_row.set_margin_bottom(8);
        input_row.set_margin_start(8);
        input_row.set_margin_end(8);
        let entry = gtk::Entry::new();
        entry.set_hexpand(true);
        entry.set_placeholder_text(Some("Type a message…"));
        let send_btn = gtk::Button::with_label("Send");
        send_btn.add_css_class("suggested-action");
        send_btn.set_sensitive(false);
        input_row.append(&entry);
        input_row.append(&send_btn);
        root.append(&input_row);

        Self { root, title, status, scroller, messages_box, entry, send_btn }
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    /// Fires on the Send button and on Enter in the entry.
    pub fn connect_send<F: Fn() + 'static>(&self, on_send: F) {
        use std::rc::Rc;
        let on_send: Rc<dyn Fn()> = Rc::new(on_send);
        {
            let on_send = on_send.clone();
            self.send_btn.connect_clicked(move |_| (on_send)());
        }
        self.entry.connect_activate(move |_| (on_send)());
    }

    pub fn connect_compose_changed<F: Fn(String) + 'static>(&self, on_change: F) {
        let send_btn = self.send_btn.clone();
        self.entry.connect_changed(move |entry| {
            let text = entry.text().to_string();
            send_btn.set_sensitive(!text.trim().is_empty());
            on_change(text);
        });
    }

    /// Only touches the entry when the text differs, so the changed
    /// handler is not re-entered for no-op updates.
    pub fn set_compose(&self, text: &str) {
        if self.entry.text().as_str() != text {
            self.entry.set_text(text);
            self.entry.set_position(-1);
        }
    }

    pub fn render(&self, state: &AppState) {
        let name = state.active_conversation().map(|c| c.name.as_str()).unwrap_or("Chat");
        self.title.set_label(name);
        self.render_status(state.status());

        while let Some(child) = self.messages_box.first_child() {
            self.messages_box.remove(&child);
        }
        for message in state.active_messages() {
            self.messages_box.append(&bubble(message, name));
        }
        let adj = self.scroller.vadjustment();
        glib::idle_add_local_once(move || adj.set_value(adj.upper()));
    }

    fn render_status(&self, status: SyncStatus) {
        for class in ["dim-label", "success", "error"] {
            self.status.remove_css_class(class);
        }
        match status {
            SyncStatus::Connecting => {
                self.status.set_label(status.label());
                self.status.add_css_class("dim-label");
            }
            SyncStatus::Ok => {
                self.status.set_label("●");
                self.status.add_css_class("success");
            }
            SyncStatus::Error => {
                self.status.set_label(status.label());
                self.status.add_css_class("error");
            }
        }
        self.status.set_tooltip_text(Some(status.label()));
    }
}

fn bubble(message: &Message, peer: &str) -> gtk::Box {
    let row = gtk::Box::new(gtk::Orientation::Horizontal, 8);
    let text = gtk::Label::new(Some(&message.content));
    text.set_wrap(true);
    text.set_max_width_chars(48);
    text.set_selectable(true);
    text.set_xalign(0.0);
    text.set_tooltip_text(Some(&message.time));
    text.add_css_class("card");
    text.set_margin_top(2);
    text.set_margin_bottom(2);

    match message.sender {
        Sender::Them => {
            row.set_halign(gtk::Align::Start);
            row.append(&adw::Avatar::new(32, Some(peer), true));
            row.append(&text);
        }
        Sender::Me => {
            row.set_halign(gtk::Align::End);
            text.add_css_class("accent");
            row.append(&text);
            row.append(&adw::Avatar::new(32, Some("Me"), true));
        }
    }
    row
}
