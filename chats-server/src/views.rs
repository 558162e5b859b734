//! Server-side page rendering.
//!
//! Templates live in `templates/` and are compiled into the binary, so the
//! server has no runtime dependency on the working directory for its pages.
//! minijinja auto-escapes every `.html` template.

use minijinja::{context, Environment};
use serde::Serialize;

use crate::db::ChatRecord;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../templates/layout.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("new.html", include_str!("../templates/new.html")),
    ("edit.html", include_str!("../templates/edit.html")),
];

/// Display shape of a [`ChatRecord`].
#[derive(Debug, Serialize)]
struct ChatView<'a> {
    id: String,
    from: &'a str,
    to: &'a str,
    msg: &'a str,
    date: String,
}

impl<'a> From<&'a ChatRecord> for ChatView<'a> {
    fn from(chat: &'a ChatRecord) -> Self {
        Self {
            id: chat.id.to_string(),
            from: &chat.from,
            to: &chat.to,
            msg: &chat.msg,
            date: chat.date.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        }
    }
}

/// The compiled template set.
#[derive(Debug)]
pub struct Views {
    env: Environment<'static>,
}

impl Views {
    /// Compile every page template.
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    /// List view: one entry per record with edit and delete affordances.
    pub fn list(&self, chats: &[ChatRecord]) -> Result<String, minijinja::Error> {
        let chats: Vec<ChatView<'_>> = chats.iter().map(ChatView::from).collect();
        self.env
            .get_template("index.html")?
            .render(context! { chats })
    }

    /// Empty create form.
    pub fn new_form(&self) -> Result<String, minijinja::Error> {
        self.env.get_template("new.html")?.render(context! {})
    }

    /// Edit form pre-filled with `chat`; `None` renders the not-found notice.
    pub fn edit_form(&self, chat: Option<&ChatRecord>) -> Result<String, minijinja::Error> {
        let chat = chat.map(ChatView::from);
        self.env
            .get_template("edit.html")?
            .render(context! { chat })
    }
}
