//! Signup and login submit handling.

use crate::navigation::Navigator;
use crate::navigation::REDIRECT_DELAY_MS;
use crate::navigation::View;
use crate::notice::NoticeLog;
use ifx_dom::Document;
use ifx_dom::NodeId;
use ifx_resolve::FieldRole;
use ifx_resolve::Role;
use ifx_store::AccountStore;
use ifx_store::KeyValueStore;
use ifx_store::UserRecord;

pub const MIN_PASSWORD_CHARS: usize = 6;

pub const MSG_MISSING_FIELDS: &str = "Please fill in the required fields.";
pub const MSG_PASSWORD_MISMATCH: &str = "Passwords do not match.";
pub const MSG_PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters.";
pub const MSG_ALREADY_REGISTERED: &str = "This email is already registered.";
pub const MSG_SIGNUP_OK: &str = "Account created. Redirecting to login...";
pub const MSG_INVALID_CREDENTIALS: &str = "Invalid email or password.";
pub const MSG_STORE_FAILED: &str = "Something went wrong saving your account.";

/// Resolved signup form and its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupBinding {
    pub form: NodeId,
    name_field: Option<NodeId>,
    email_field: Option<NodeId>,
    password_field: Option<NodeId>,
    confirm_field: Option<NodeId>,
}

/// Resolved login form and its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginBinding {
    pub form: NodeId,
    email_field: Option<NodeId>,
    password_field: Option<NodeId>,
}

pub fn bind_signup(doc: &Document) -> Option<SignupBinding> {
    let form = ifx_resolve::resolve(doc, Role::SignupForm)?;
    Some(SignupBinding {
        form,
        name_field: ifx_resolve::resolve_field(doc, form, FieldRole::Name),
        email_field: ifx_resolve::resolve_field(doc, form, FieldRole::Email),
        password_field: ifx_resolve::resolve_field(doc, form, FieldRole::Password),
        confirm_field: ifx_resolve::resolve_field(doc, form, FieldRole::Confirm),
    })
}

pub fn bind_login(doc: &Document) -> Option<LoginBinding> {
    let form = ifx_resolve::resolve(doc, Role::LoginForm)?;
    Some(LoginBinding {
        form,
        email_field: ifx_resolve::resolve_field(doc, form, FieldRole::Email),
        password_field: ifx_resolve::resolve_field(doc, form, FieldRole::Password),
    })
}

impl SignupBinding {
    /// Runs the signup submit sequence: validate, append to the directory,
    /// then schedule the redirect to the login view. Every rejection is a
    /// distinct notice; nothing is persisted on rejection.
    pub fn submit<S: KeyValueStore>(
        &self,
        doc: &Document,
        accounts: &mut AccountStore<S>,
        notices: &mut NoticeLog,
        navigator: &mut Navigator,
    ) {
        let name = trimmed_value(doc, self.name_field);
        let email = trimmed_value(doc, self.email_field);
        // Passwords are compared and stored exactly as typed.
        let password = raw_value(doc, self.password_field);

        if email.is_empty() || password.is_empty() {
            notices.error(MSG_MISSING_FIELDS);
            return;
        }

        if self.confirm_field.is_some() {
            let confirm = raw_value(doc, self.confirm_field);
            if password != confirm {
                notices.error(MSG_PASSWORD_MISMATCH);
                return;
            }
        }

        if password.chars().count() < MIN_PASSWORD_CHARS {
            notices.error(MSG_PASSWORD_TOO_SHORT);
            return;
        }

        let mut users = accounts.list_users();
        if users
            .iter()
            .any(|user| user.email.eq_ignore_ascii_case(&email))
        {
            notices.error(MSG_ALREADY_REGISTERED);
            return;
        }

        let name = if name.is_empty() {
            email_local_part(&email)
        } else {
            name
        };
        users.push(UserRecord {
            name,
            email,
            password,
            score: 0,
        });

        if let Err(error) = accounts.save_users(&users) {
            tracing::warn!(%error, "signup could not persist the user directory");
            notices.error(MSG_STORE_FAILED);
            return;
        }

        notices.success(MSG_SIGNUP_OK);
        navigator.request(View::Login, REDIRECT_DELAY_MS);
    }
}

impl LoginBinding {
    /// Runs the login submit sequence: match against the directory, set the
    /// session marker, then schedule the redirect to the main view.
    pub fn submit<S: KeyValueStore>(
        &self,
        doc: &Document,
        accounts: &mut AccountStore<S>,
        notices: &mut NoticeLog,
        navigator: &mut Navigator,
    ) {
        let email = trimmed_value(doc, self.email_field);
        let password = raw_value(doc, self.password_field);

        if email.is_empty() || password.is_empty() {
            notices.error(MSG_MISSING_FIELDS);
            return;
        }

        let matched = accounts
            .list_users()
            .into_iter()
            .find(|user| user.email.eq_ignore_ascii_case(&email) && user.password == password);

        let Some(user) = matched else {
            notices.error(MSG_INVALID_CREDENTIALS);
            return;
        };

        if let Err(error) = accounts.set_session(&user) {
            tracing::warn!(%error, "login could not persist the session marker");
            notices.error(MSG_STORE_FAILED);
            return;
        }

        notices.success(format!("Welcome back, {}!", user.name));
        navigator.request(View::Main, REDIRECT_DELAY_MS);
    }
}

fn raw_value(doc: &Document, field: Option<NodeId>) -> String {
    field
        .and_then(|id| doc.attribute(id, "value"))
        .unwrap_or_default()
        .to_owned()
}

fn trimmed_value(doc: &Document, field: Option<NodeId>) -> String {
    raw_value(doc, field).trim().to_owned()
}

fn email_local_part(email: &str) -> String {
    email
        .split_once('@')
        .map(|(local, _)| local)
        .unwrap_or(email)
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::MSG_ALREADY_REGISTERED;
    use super::MSG_MISSING_FIELDS;
    use super::MSG_PASSWORD_MISMATCH;
    use super::MSG_PASSWORD_TOO_SHORT;
    use super::bind_signup;
    use crate::navigation::Navigator;
    use crate::notice::NoticeLog;
    use ifx_dom::Document;
    use ifx_html::HtmlParser;
    use ifx_store::AccountStore;
    use ifx_store::MemoryStore;
    use ifx_store::UserRecord;

    const SIGNUP_HTML: &str = r#"
        <form id="signup-form">
          <input name="name">
          <input type="email" name="email">
          <input type="password" name="password">
          <input type="password" name="confirm">
        </form>"#;

    fn set_by_name(doc: &mut Document, name: &str, value: &str) {
        let Some(input) = doc
            .elements()
            .into_iter()
            .find(|id| doc.attribute(*id, "name") == Some(name))
        else {
            panic!("fixture input `{name}` missing");
        };
        doc.set_attribute(input, "value", value);
    }

    fn submit(doc: &Document, accounts: &mut AccountStore<MemoryStore>) -> (NoticeLog, Navigator) {
        let Some(binding) = bind_signup(doc) else {
            panic!("signup form should bind");
        };
        let mut notices = NoticeLog::new();
        let mut navigator = Navigator::new();
        binding.submit(doc, accounts, &mut notices, &mut navigator);
        (notices, navigator)
    }

    #[test]
    fn rejects_in_documented_order() {
        let mut doc = HtmlParser.parse(SIGNUP_HTML);
        let mut accounts = AccountStore::new(MemoryStore::new());

        let (notices, _) = submit(&doc, &mut accounts);
        assert_eq!(notices.last_message(), Some(MSG_MISSING_FIELDS));

        set_by_name(&mut doc, "email", "a@x.com");
        set_by_name(&mut doc, "password", "secret1");
        set_by_name(&mut doc, "confirm", "other");
        let (notices, _) = submit(&doc, &mut accounts);
        assert_eq!(notices.last_message(), Some(MSG_PASSWORD_MISMATCH));

        set_by_name(&mut doc, "password", "abc");
        set_by_name(&mut doc, "confirm", "abc");
        let (notices, _) = submit(&doc, &mut accounts);
        assert_eq!(notices.last_message(), Some(MSG_PASSWORD_TOO_SHORT));

        assert!(accounts.list_users().is_empty());
    }

    #[test]
    fn name_defaults_to_email_local_part() {
        let mut doc = HtmlParser.parse(SIGNUP_HTML);
        let mut accounts = AccountStore::new(MemoryStore::new());
        set_by_name(&mut doc, "email", "sam@example.com");
        set_by_name(&mut doc, "password", "secret1");
        set_by_name(&mut doc, "confirm", "secret1");

        let (_, navigator) = submit(&doc, &mut accounts);
        assert_eq!(accounts.list_users()[0].name, "sam");
        assert_eq!(navigator.requests().len(), 1);
    }

    #[test]
    fn duplicate_email_leaves_directory_unchanged() {
        let mut doc = HtmlParser.parse(SIGNUP_HTML);
        let mut accounts = AccountStore::new(MemoryStore::new());
        let existing = UserRecord {
            name: "Sam".to_owned(),
            email: "SAM@example.com".to_owned(),
            password: "elsewhere".to_owned(),
            score: 0,
        };
        assert_eq!(accounts.save_users(std::slice::from_ref(&existing)), Ok(()));

        set_by_name(&mut doc, "email", "sam@example.com");
        set_by_name(&mut doc, "password", "secret1");
        set_by_name(&mut doc, "confirm", "secret1");

        let (notices, navigator) = submit(&doc, &mut accounts);
        assert_eq!(notices.last_message(), Some(MSG_ALREADY_REGISTERED));
        assert!(navigator.requests().is_empty());
        assert_eq!(accounts.list_users(), vec![existing]);
    }

    #[test]
    fn password_without_confirm_field_skips_mismatch_check() {
        let mut doc = HtmlParser.parse(
            r#"<form id="signup-form">
                 <input type="email" name="email">
                 <input name="fullname">
                 <input type="password" name="password">
               </form>"#,
        );
        let mut accounts = AccountStore::new(MemoryStore::new());
        set_by_name(&mut doc, "email", "a@x.com");
        set_by_name(&mut doc, "password", "secret1");

        let (notices, _) = submit(&doc, &mut accounts);
        assert_ne!(notices.last_message(), Some(MSG_PASSWORD_MISMATCH));
        assert_eq!(accounts.list_users().len(), 1);
    }
}
