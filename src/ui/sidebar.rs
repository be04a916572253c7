use gtk4::prelude::*;
use gtk4 as gtk;
use std::cell::RefCell;
use std::rc::Rc;

use wechat_copilot::api::{Conversation, ConversationId};

pub struct Sidebar {
    root: gtk::Box,
    list: gtk::ListBox,
    ids: Rc<RefCell<Vec<ConversationId>>>,
}

impl Sidebar {
    pub fn new() -> Self {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);
        root.set_size_request(256, -1);

        let title = gtk::Label::new(Some("Conversations"));
        title.add_css_class("heading");
        title.set_halign(gtk::Align::Start);
        root.append(&title);

        let list = gtk::ListBox::new();
        list.add_css_class("navigation-sidebar");
        let scroller = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .hscrollbar_policy(gtk::PolicyType::Never)
            .child(&list)
            .build();
        root.append(&scroller);

        Self { root, list, ids: Rc::new(RefCell::new(Vec::new())) }
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn set_items(&self, items: &[Conversation], active: Option<ConversationId>) {
        while let Some(child) = self.list.first_child() {
            self.list.remove(&child);
        }
        *self.ids.borrow_mut() = items.iter().map(|c| c.id).collect();
        let mut selected = None;
        for conv in items {
            let row = gtk::ListBoxRow::new();
            row.set_child(Some(&conversation_row(conv)));
            self.list.append(&row);
            if active == Some(conv.id) {
                selected = Some(row);
            }
        }
        self.list.select_row(selected.as_ref());
    }

    pub fn connect_selected<F: Fn(ConversationId) + 'static>(&self, on_select: F) {
        let ids = self.ids.clone();
        self.list.connect_row_selected(move |_, row| {
            let Some(row) = row else { return };
            let picked = usize::try_from(row.index()).ok().and_then(|i| ids.borrow().get(i).copied());
            if let Some(id) = picked {
                on_select(id);
            }
        });
    }
}

fn conversation_row(conv: &Conversation) -> gtk::Box {
    let row = gtk::Box::new(gtk::Orientation::Horizontal, 10);
    row.set_margin_top(6);
    row.set_margin_bottom(6);
    row.set_margin_start(4);
    row.set_margin_end(4);

    // Avatars are remote URIs; initials keep the list offline-friendly.
    let avatar = adw::Avatar::new(40, Some(&conv.name), true);
    avatar.set_tooltip_text(Some(&conv.avatar));
    row.append(&avatar);

    let text = gtk::Box::new(gtk::Orientation::Vertical, 2);
    text.set_hexpand(true);

    let top = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    let name = gtk::Label::new(Some(&conv.name));
    name.set_hexpand(true);
    name.set_xalign(0.0);
    name.set_ellipsize(gtk::pango::EllipsizeMode::End);
    top.append(&name);
    let time = gtk::Label::new(Some(&conv.time));
    time.add_css_class("dim-label");
    time.add_css_class("caption");
    top.append(&time);
    text.append(&top);

    let bottom = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    let preview = gtk::Label::new(Some(&conv.last_message));
    preview.set_hexpand(true);
    preview.set_xalign(0.0);
    preview.set_ellipsize(gtk::pango::EllipsizeMode::End);
    preview.add_css_class("dim-label");
    preview.add_css_class("caption");
    bottom.append(&preview);
    if conv.unread > 0 {
        let badge = gtk::Label::new(Some(&conv.unread.to_string()));
        badge.add_css_class("error");
        badge.add_css_class("caption-heading");
        bottom.append(&badge);
    }
    text.append(&bottom);

    row.append(&text);
    row
}
