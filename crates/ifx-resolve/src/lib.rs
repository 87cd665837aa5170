//! Ranked-fallback element resolution.
//!
//! Every logical role carries an ordered list of candidate descriptors: a
//! selector plus the form shape the matched element must satisfy. Descriptors
//! are evaluated in sequence with first-match-wins semantics, so a page that
//! renames its IDs still resolves through structural signals. Resolution
//! failure is a definite absence, never an error.

use ifx_dom::Document;
use ifx_dom::NodeId;

/// Single-element logical roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    SignupForm,
    LoginForm,
    Header,
    NavToggle,
    NavMenu,
    FileInput,
    UploadTrigger,
    LocalPreview,
    RemotePreview,
    Modal,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SignupForm => "signup-form",
            Self::LoginForm => "login-form",
            Self::Header => "header",
            Self::NavToggle => "nav-toggle",
            Self::NavMenu => "nav-menu",
            Self::FileInput => "file-input",
            Self::UploadTrigger => "upload-trigger",
            Self::LocalPreview => "local-preview",
            Self::RemotePreview => "remote-preview",
            Self::Modal => "modal",
        }
    }
}

/// Roles that resolve to every matching element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupRole {
    VoteSection,
    ModalOpenTrigger,
    ModalCloseTrigger,
}

/// Fields resolved inside an already-resolved form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    Name,
    Email,
    Password,
    Confirm,
}

/// Controls resolved inside a vote section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionPart {
    UpControl,
    DownControl,
    CountDisplay,
}

/// Closed set of selector forms a candidate may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Id(&'static str),
    Tag(&'static str),
    Class(&'static str),
    TagWithAttr {
        tag: &'static str,
        name: &'static str,
        value: Option<&'static str>,
    },
}

/// Child shape a candidate requires of the matched element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormShape {
    Any,
    Signup,
    Login,
}

/// Selector plus required shape, evaluated in rank order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub selector: Selector,
    pub shape: FormShape,
}

const fn by_id(id: &'static str) -> Candidate {
    Candidate {
        selector: Selector::Id(id),
        shape: FormShape::Any,
    }
}

const fn by_class(class: &'static str) -> Candidate {
    Candidate {
        selector: Selector::Class(class),
        shape: FormShape::Any,
    }
}

const fn by_attr(tag: &'static str, name: &'static str, value: Option<&'static str>) -> Candidate {
    Candidate {
        selector: Selector::TagWithAttr { tag, name, value },
        shape: FormShape::Any,
    }
}

const SIGNUP_FORM_CANDIDATES: &[Candidate] = &[
    by_id("signup-form"),
    by_id("signupForm"),
    by_id("register-form"),
    by_attr("form", "data-role", Some("signup")),
    Candidate {
        selector: Selector::Tag("form"),
        shape: FormShape::Signup,
    },
];

const LOGIN_FORM_CANDIDATES: &[Candidate] = &[
    by_id("login-form"),
    by_id("loginForm"),
    by_attr("form", "data-role", Some("login")),
    Candidate {
        selector: Selector::Tag("form"),
        shape: FormShape::Login,
    },
];

const HEADER_CANDIDATES: &[Candidate] = &[
    by_id("site-header"),
    by_attr("header", "", None),
    by_class("navbar"),
    by_class("header"),
];

const NAV_TOGGLE_CANDIDATES: &[Candidate] = &[
    by_id("nav-toggle"),
    by_class("nav-toggle"),
    by_class("hamburger"),
];

const NAV_MENU_CANDIDATES: &[Candidate] = &[
    by_id("nav-menu"),
    by_class("nav-menu"),
    by_class("nav-links"),
    by_attr("nav", "", None),
];

const FILE_INPUT_CANDIDATES: &[Candidate] = &[
    by_id("image-input"),
    by_id("imageInput"),
    by_id("file-input"),
    by_attr("input", "type", Some("file")),
];

// The trigger is a dedicated control addressed by fixed identity only; no
// structural fallback exists for it.
const UPLOAD_TRIGGER_CANDIDATES: &[Candidate] = &[
    by_id("preview-btn"),
    by_id("previewBtn"),
    by_id("process-btn"),
    by_id("upload-btn"),
];

const LOCAL_PREVIEW_CANDIDATES: &[Candidate] = &[
    by_id("before-img"),
    by_id("beforeImg"),
    by_attr("img", "data-preview", Some("before")),
];

const REMOTE_PREVIEW_CANDIDATES: &[Candidate] = &[
    by_id("after-img"),
    by_id("afterImg"),
    by_attr("img", "data-preview", Some("after")),
];

const MODAL_CANDIDATES: &[Candidate] = &[
    by_id("modal"),
    by_class("modal"),
    by_attr("div", "role", Some("dialog")),
];

const VOTE_SECTION_CANDIDATES: &[Candidate] =
    &[by_class("vote-section"), by_attr("section", "data-vote-section", None)];

const MODAL_OPEN_CANDIDATES: &[Candidate] =
    &[by_attr("button", "data-modal-open", None), by_class("open-modal")];

const MODAL_CLOSE_CANDIDATES: &[Candidate] = &[
    by_attr("button", "data-modal-close", None),
    by_class("close-modal"),
    by_class("modal-close"),
];

const VOTE_UP_CANDIDATES: &[Candidate] =
    &[by_class("upvote"), by_attr("button", "data-vote", Some("up"))];

const VOTE_DOWN_CANDIDATES: &[Candidate] =
    &[by_class("downvote"), by_attr("button", "data-vote", Some("down"))];

const VOTE_COUNT_CANDIDATES: &[Candidate] = &[by_class("vote-count"), by_class("count")];

/// Resolves a single-element role, or reports a definite absence.
pub fn resolve(doc: &Document, role: Role) -> Option<NodeId> {
    let candidates = match role {
        Role::SignupForm => SIGNUP_FORM_CANDIDATES,
        Role::LoginForm => LOGIN_FORM_CANDIDATES,
        Role::Header => HEADER_CANDIDATES,
        Role::NavToggle => NAV_TOGGLE_CANDIDATES,
        Role::NavMenu => NAV_MENU_CANDIDATES,
        Role::FileInput => FILE_INPUT_CANDIDATES,
        Role::UploadTrigger => UPLOAD_TRIGGER_CANDIDATES,
        Role::LocalPreview => LOCAL_PREVIEW_CANDIDATES,
        Role::RemotePreview => REMOTE_PREVIEW_CANDIDATES,
        Role::Modal => MODAL_CANDIDATES,
    };

    let resolved = first_match(doc, doc.elements(), candidates);
    if resolved.is_none() {
        tracing::debug!(role = role.as_str(), "element role did not resolve");
    }

    resolved
}

/// Resolves every element matching a group role, in document order.
pub fn resolve_all(doc: &Document, role: GroupRole) -> Vec<NodeId> {
    let candidates = match role {
        GroupRole::VoteSection => VOTE_SECTION_CANDIDATES,
        GroupRole::ModalOpenTrigger => MODAL_OPEN_CANDIDATES,
        GroupRole::ModalCloseTrigger => MODAL_CLOSE_CANDIDATES,
    };

    let mut out = Vec::new();
    for id in doc.elements() {
        if candidates
            .iter()
            .any(|candidate| candidate_matches(doc, id, candidate))
            && !out.contains(&id)
        {
            out.push(id);
        }
    }

    out
}

/// Resolves one control inside a vote section subtree.
pub fn resolve_section_part(doc: &Document, section: NodeId, part: SectionPart) -> Option<NodeId> {
    let candidates = match part {
        SectionPart::UpControl => VOTE_UP_CANDIDATES,
        SectionPart::DownControl => VOTE_DOWN_CANDIDATES,
        SectionPart::CountDisplay => VOTE_COUNT_CANDIDATES,
    };

    first_match(doc, doc.descendant_elements(section), candidates)
}

fn first_match(doc: &Document, scope: Vec<NodeId>, candidates: &[Candidate]) -> Option<NodeId> {
    for candidate in candidates {
        if let Some(id) = scope
            .iter()
            .copied()
            .find(|id| candidate_matches(doc, *id, candidate))
        {
            return Some(id);
        }
    }

    None
}

fn candidate_matches(doc: &Document, id: NodeId, candidate: &Candidate) -> bool {
    selector_matches(doc, id, candidate.selector) && shape_matches(doc, id, candidate.shape)
}

fn selector_matches(doc: &Document, id: NodeId, selector: Selector) -> bool {
    match selector {
        Selector::Id(value) => doc.element_id(id) == Some(value),
        Selector::Tag(tag) => doc.tag(id) == Some(tag),
        Selector::Class(class) => doc.has_class(id, class),
        Selector::TagWithAttr { tag, name, value } => {
            if !tag.is_empty() && doc.tag(id) != Some(tag) {
                return false;
            }
            if name.is_empty() {
                return doc.tag(id) == Some(tag);
            }
            match value {
                Some(expected) => doc.attribute(id, name) == Some(expected),
                None => doc.attribute(id, name).is_some(),
            }
        }
    }
}

fn shape_matches(doc: &Document, id: NodeId, shape: FormShape) -> bool {
    match shape {
        FormShape::Any => true,
        // A signup form carries an email-like input and either a second
        // password input or a name-like input.
        FormShape::Signup => {
            has_email_like_input(doc, id)
                && (password_inputs(doc, id).len() >= 2 || has_name_like_input(doc, id))
        }
        // A login form carries at most one password input plus something
        // identifying the user. Checking the password count first keeps a
        // two-password signup form from qualifying.
        FormShape::Login => {
            password_inputs(doc, id).len() <= 1 && has_user_identifying_input(doc, id)
        }
    }
}

/// Resolves a field inside a form: specific selectors first, then the
/// structural heuristics for that field.
pub fn resolve_field(doc: &Document, form: NodeId, field: FieldRole) -> Option<NodeId> {
    let inputs = form_inputs(doc, form);

    let resolved = match field {
        FieldRole::Name => inputs
            .iter()
            .copied()
            .find(|id| has_name_or_id(doc, *id, &["name", "fullname", "full-name"]))
            .or_else(|| inputs.iter().copied().find(|id| is_name_like(doc, *id))),
        FieldRole::Email => inputs
            .iter()
            .copied()
            .find(|id| doc.attribute(*id, "type") == Some("email"))
            .or_else(|| {
                inputs
                    .iter()
                    .copied()
                    .find(|id| has_name_or_id(doc, *id, &["email"]))
            })
            .or_else(|| inputs.iter().copied().find(|id| is_email_like(doc, *id))),
        FieldRole::Password => {
            let passwords = password_inputs(doc, form);
            passwords.first().copied().or_else(|| {
                inputs
                    .iter()
                    .copied()
                    .find(|id| has_name_or_id(doc, *id, &["password", "pass"]))
            })
        }
        FieldRole::Confirm => {
            let passwords = password_inputs(doc, form);
            if passwords.len() >= 2 {
                // Document order decides: second password input is confirm.
                passwords.get(1).copied()
            } else {
                inputs
                    .iter()
                    .copied()
                    .find(|id| has_name_or_id(doc, *id, &["confirm", "confirm-password", "repeat"]))
            }
        }
    };

    if resolved.is_none() {
        tracing::debug!(field = ?field, "form field did not resolve");
    }

    resolved
}

fn form_inputs(doc: &Document, form: NodeId) -> Vec<NodeId> {
    doc.descendant_elements(form)
        .into_iter()
        .filter(|id| doc.tag(*id) == Some("input"))
        .collect()
}

/// Password inputs inside `form`, in document order.
pub fn password_inputs(doc: &Document, form: NodeId) -> Vec<NodeId> {
    form_inputs(doc, form)
        .into_iter()
        .filter(|id| doc.attribute(*id, "type") == Some("password"))
        .collect()
}

fn has_email_like_input(doc: &Document, form: NodeId) -> bool {
    form_inputs(doc, form)
        .into_iter()
        .any(|id| is_email_like(doc, id))
}

fn has_name_like_input(doc: &Document, form: NodeId) -> bool {
    form_inputs(doc, form)
        .into_iter()
        .any(|id| is_name_like(doc, id))
}

fn has_user_identifying_input(doc: &Document, form: NodeId) -> bool {
    form_inputs(doc, form).into_iter().any(|id| {
        is_email_like(doc, id) || has_name_or_id(doc, id, &["user", "username", "login"])
    })
}

fn is_email_like(doc: &Document, id: NodeId) -> bool {
    doc.attribute(id, "type") == Some("email")
        || hint_contains(doc, id, "email")
}

fn is_name_like(doc: &Document, id: NodeId) -> bool {
    let text_like = matches!(doc.attribute(id, "type"), None | Some("text"));
    text_like && hint_contains(doc, id, "name") && !hint_contains(doc, id, "user")
}

fn has_name_or_id(doc: &Document, id: NodeId, needles: &[&str]) -> bool {
    needles.iter().any(|needle| {
        attr_eq_ignore_case(doc, id, "name", needle) || attr_eq_ignore_case(doc, id, "id", needle)
    })
}

fn attr_eq_ignore_case(doc: &Document, id: NodeId, attr: &str, expected: &str) -> bool {
    doc.attribute(id, attr)
        .map(|value| value.eq_ignore_ascii_case(expected))
        .unwrap_or(false)
}

fn hint_contains(doc: &Document, id: NodeId, needle: &str) -> bool {
    ["name", "id", "placeholder"].iter().any(|attr| {
        doc.attribute(id, attr)
            .map(|value| value.to_ascii_lowercase().contains(needle))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::FieldRole;
    use super::GroupRole;
    use super::Role;
    use super::SectionPart;
    use super::resolve;
    use super::resolve_all;
    use super::resolve_field;
    use super::resolve_section_part;
    use ifx_html::HtmlParser;

    fn parse(html: &str) -> ifx_dom::Document {
        HtmlParser.parse(html)
    }

    #[test]
    fn explicit_ids_win_over_heuristics() {
        let doc = parse(
            r#"<form><input type="email"><input type="password"><input type="password"></form>
               <form id="signup-form"><input name="email"></form>"#,
        );
        let resolved = resolve(&doc, Role::SignupForm);
        assert_eq!(resolved.and_then(|id| doc.element_id(id)), Some("signup-form"));
    }

    #[test]
    fn signup_and_login_forms_distinguished_by_shape() {
        let doc = parse(
            r#"<form class="a"><input type="email"><input type="password"><input type="password"></form>
               <form class="b"><input type="email"><input type="password"></form>"#,
        );

        let signup = resolve(&doc, Role::SignupForm);
        let login = resolve(&doc, Role::LoginForm);
        assert!(signup.is_some());
        assert!(login.is_some());
        assert_ne!(signup, login);
        assert!(signup.map(|id| doc.has_class(id, "a")).unwrap_or(false));
        assert!(login.map(|id| doc.has_class(id, "b")).unwrap_or(false));
    }

    #[test]
    fn single_password_form_with_name_field_is_signup_not_login_when_named() {
        // One password + a name-like input still qualifies as a signup form.
        let doc = parse(r#"<form><input type="email"><input name="fullName"><input type="password"></form>"#);
        assert!(resolve(&doc, Role::SignupForm).is_some());
    }

    #[test]
    fn unresolvable_roles_return_none() {
        let doc = parse("<div>nothing here</div>");
        assert!(resolve(&doc, Role::SignupForm).is_none());
        assert!(resolve(&doc, Role::UploadTrigger).is_none());
        assert!(resolve(&doc, Role::Modal).is_none());
    }

    #[test]
    fn upload_trigger_has_no_structural_fallback() {
        let doc = parse(r#"<button class="preview">Preview</button>"#);
        assert!(resolve(&doc, Role::UploadTrigger).is_none());

        let doc = parse(r#"<button id="preview-btn">Preview</button>"#);
        assert!(resolve(&doc, Role::UploadTrigger).is_some());
    }

    #[test]
    fn password_and_confirm_follow_document_order() {
        let doc = parse(
            r#"<form id="signup-form">
                 <input type="email" name="email">
                 <input type="password" name="second-looking">
                 <input type="password" name="whatever">
               </form>"#,
        );
        let Some(form) = resolve(&doc, Role::SignupForm) else {
            panic!("form should resolve");
        };

        let password = resolve_field(&doc, form, FieldRole::Password);
        let confirm = resolve_field(&doc, form, FieldRole::Confirm);
        assert!(password.is_some());
        assert!(confirm.is_some());
        assert_eq!(
            password.and_then(|id| doc.attribute(id, "name")),
            Some("second-looking")
        );
        assert_eq!(
            confirm.and_then(|id| doc.attribute(id, "name")),
            Some("whatever")
        );
    }

    #[test]
    fn confirm_falls_back_to_naming_when_single_password() {
        let doc = parse(
            r#"<form id="signup-form">
                 <input name="email">
                 <input type="password">
                 <input name="confirm">
               </form>"#,
        );
        let Some(form) = resolve(&doc, Role::SignupForm) else {
            panic!("form should resolve");
        };

        let confirm = resolve_field(&doc, form, FieldRole::Confirm);
        assert_eq!(confirm.and_then(|id| doc.attribute(id, "name")), Some("confirm"));
    }

    #[test]
    fn email_field_prefers_typed_input() {
        let doc = parse(
            r#"<form id="login-form">
                 <input name="email-ish" placeholder="email or phone">
                 <input type="email" name="actual">
                 <input type="password">
               </form>"#,
        );
        let Some(form) = resolve(&doc, Role::LoginForm) else {
            panic!("form should resolve");
        };

        let email = resolve_field(&doc, form, FieldRole::Email);
        assert_eq!(email.and_then(|id| doc.attribute(id, "name")), Some("actual"));
    }

    #[test]
    fn vote_sections_resolve_independently() {
        let doc = parse(
            r#"<div class="vote-section"><button class="upvote">+</button><span class="vote-count">3</span></div>
               <div class="vote-section"><button class="downvote">-</button></div>"#,
        );

        let sections = resolve_all(&doc, GroupRole::VoteSection);
        assert_eq!(sections.len(), 2);
        assert!(resolve_section_part(&doc, sections[0], SectionPart::UpControl).is_some());
        assert!(resolve_section_part(&doc, sections[0], SectionPart::CountDisplay).is_some());
        assert!(resolve_section_part(&doc, sections[1], SectionPart::DownControl).is_some());
        assert!(resolve_section_part(&doc, sections[1], SectionPart::CountDisplay).is_none());
    }

    #[test]
    fn modal_triggers_resolve_as_groups() {
        let doc = parse(
            r#"<div id="modal" style="display:none"></div>
               <button data-modal-open>About</button>
               <a class="open-modal">More</a>
               <button class="modal-close">x</button>"#,
        );

        assert!(resolve(&doc, Role::Modal).is_some());
        assert_eq!(resolve_all(&doc, GroupRole::ModalOpenTrigger).len(), 2);
        assert_eq!(resolve_all(&doc, GroupRole::ModalCloseTrigger).len(), 1);
    }
}
