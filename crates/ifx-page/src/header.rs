//! Greeting and logout control injected into the page header.

use crate::navigation::Navigator;
use crate::navigation::View;
use crate::notice::NoticeLog;
use ifx_dom::Document;
use ifx_dom::NodeId;
use ifx_resolve::Role;
use ifx_store::AccountStore;
use ifx_store::KeyValueStore;

/// Fixed identities of the injected elements; looked up before creation so
/// repeated binds never duplicate them.
pub const GREETING_ID: &str = "user-greeting";
pub const LOGOUT_ID: &str = "logout-button";

pub const MSG_LOGGED_OUT: &str = "Logged out.";

/// Header container with its injected greeting and logout control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderSync {
    header: NodeId,
    greeting: NodeId,
    logout: NodeId,
}

pub fn bind_header(doc: &mut Document) -> Option<HeaderSync> {
    let header = ifx_resolve::resolve(doc, Role::Header)?;

    let greeting = match doc.element_by_id(GREETING_ID) {
        Some(existing) => existing,
        None => {
            let created = doc.create_element("span");
            doc.set_attribute(created, "id", GREETING_ID);
            doc.append_child(header, created);
            created
        }
    };

    let logout = match doc.element_by_id(LOGOUT_ID) {
        Some(existing) => existing,
        None => {
            let created = doc.create_element("button");
            doc.set_attribute(created, "id", LOGOUT_ID);
            doc.set_text_content(created, "Logout");
            doc.set_style_property(created, "display", "none");
            doc.append_child(header, created);
            created
        }
    };

    Some(HeaderSync {
        header,
        greeting,
        logout,
    })
}

impl HeaderSync {
    pub fn greeting(&self) -> NodeId {
        self.greeting
    }

    pub fn logout(&self) -> NodeId {
        self.logout
    }

    pub fn header(&self) -> NodeId {
        self.header
    }

    /// Reconciles greeting text and logout visibility with session state.
    /// Safe to call any number of times.
    pub fn sync<S: KeyValueStore>(&self, doc: &mut Document, accounts: &AccountStore<S>) {
        match accounts.get_session() {
            Some(user) => {
                let who = if user.name.is_empty() {
                    user.email.as_str()
                } else {
                    user.name.as_str()
                };
                doc.set_text_content(self.greeting, &format!("Welcome, {who}!"));
                doc.set_style_property(self.logout, "display", "inline-block");
            }
            None => {
                doc.set_text_content(self.greeting, "");
                doc.set_style_property(self.logout, "display", "none");
            }
        }
    }

    /// Logout click: clear the session and go straight to the login view.
    pub fn click_logout<S: KeyValueStore>(
        &self,
        doc: &mut Document,
        accounts: &mut AccountStore<S>,
        notices: &mut NoticeLog,
        navigator: &mut Navigator,
    ) {
        if let Err(error) = accounts.clear_session() {
            tracing::warn!(%error, "failed to clear the session marker");
        }

        self.sync(doc, accounts);
        notices.info(MSG_LOGGED_OUT);
        navigator.request(View::Login, 0);
    }
}
