//! Page runtime for the InfraFix views: binds page behaviors against a
//! parsed document and routes user events through them.
//!
//! Every behavior binds best-effort. A page missing a section simply skips
//! that binding; events aimed at it become no-ops.

pub mod forms;
pub mod header;
pub mod modal;
pub mod nav_toggle;
pub mod navigation;
pub mod notice;
pub mod upload;
pub mod vote;

pub use forms::LoginBinding;
pub use forms::SignupBinding;
pub use header::HeaderSync;
pub use modal::ModalController;
pub use nav_toggle::NavToggle;
pub use navigation::Navigation;
pub use navigation::Navigator;
pub use navigation::View;
pub use notice::Notice;
pub use notice::NoticeKind;
pub use notice::NoticeLog;
pub use upload::UploadPhase;
pub use upload::UploadWorkflow;
pub use vote::VoteDirection;
pub use vote::VoteSection;

use ifx_dom::Document;
use ifx_dom::NodeId;
use ifx_html::HtmlParser;
use ifx_net::UploadClient;
use ifx_net::transport::Transport;
use ifx_store::AccountStore;
use ifx_store::KeyValueStore;

/// One loaded page: the document, the persistent stores behind it, and
/// every behavior that managed to bind.
pub struct Page<S: KeyValueStore, T: Transport> {
    doc: Document,
    accounts: AccountStore<S>,
    client: UploadClient<T>,
    notices: NoticeLog,
    navigator: Navigator,
    signup: Option<SignupBinding>,
    login: Option<LoginBinding>,
    header: Option<HeaderSync>,
    nav_toggle: Option<NavToggle>,
    upload: Option<UploadWorkflow>,
    votes: Vec<VoteSection>,
    modal: Option<ModalController>,
}

impl<S: KeyValueStore, T: Transport> Page<S, T> {
    /// Parses the markup and binds everything in one pass.
    pub fn initialize(html: &str, store: S, transport: T) -> Self {
        Self::from_document(HtmlParser.parse(html), store, transport)
    }

    /// Binds against an already parsed document. Bind order is fixed:
    /// forms, header, nav toggle, upload, votes, modal.
    pub fn from_document(mut doc: Document, store: S, transport: T) -> Self {
        let accounts = AccountStore::new(store);

        let signup = forms::bind_signup(&doc);
        let login = forms::bind_login(&doc);
        let header = header::bind_header(&mut doc);
        if let Some(sync) = header {
            sync.sync(&mut doc, &accounts);
        }
        let nav_toggle = nav_toggle::bind_nav_toggle(&doc);
        let upload = upload::bind_upload(&mut doc);
        let votes = vote::bind_votes(&mut doc);
        let modal = modal::bind_modal(&mut doc);

        Self {
            doc,
            accounts,
            client: UploadClient::new(transport),
            notices: NoticeLog::new(),
            navigator: Navigator::new(),
            signup,
            login,
            header,
            nav_toggle,
            upload,
            votes,
            modal,
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn accounts(&self) -> &AccountStore<S> {
        &self.accounts
    }

    pub fn notices(&self) -> &NoticeLog {
        &self.notices
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn signup(&self) -> Option<&SignupBinding> {
        self.signup.as_ref()
    }

    pub fn login(&self) -> Option<&LoginBinding> {
        self.login.as_ref()
    }

    pub fn header(&self) -> Option<&HeaderSync> {
        self.header.as_ref()
    }

    pub fn upload_phase(&self) -> Option<UploadPhase> {
        self.upload.as_ref().map(UploadWorkflow::phase)
    }

    pub fn votes(&self) -> &[VoteSection] {
        &self.votes
    }

    /// Writes an input's value the way typing does.
    pub fn type_into(&mut self, field: NodeId, value: &str) {
        self.doc.set_attribute(field, "value", value);
    }

    pub fn submit_signup(&mut self) {
        if let Some(binding) = self.signup.clone() {
            binding.submit(
                &self.doc,
                &mut self.accounts,
                &mut self.notices,
                &mut self.navigator,
            );
        }
    }

    pub fn submit_login(&mut self) {
        if let Some(binding) = self.login.clone() {
            binding.submit(
                &self.doc,
                &mut self.accounts,
                &mut self.notices,
                &mut self.navigator,
            );
        }
        self.sync_header();
    }

    pub fn click_logout(&mut self) {
        if let Some(sync) = self.header {
            sync.click_logout(
                &mut self.doc,
                &mut self.accounts,
                &mut self.notices,
                &mut self.navigator,
            );
        }
    }

    pub fn click_nav_toggle(&mut self) {
        if let Some(toggle) = self.nav_toggle {
            toggle.click(&mut self.doc);
        }
    }

    pub fn nav_menu_open(&self) -> bool {
        self.nav_toggle
            .map(|toggle| toggle.is_open(&self.doc))
            .unwrap_or(false)
    }

    pub fn select_upload_file(&mut self, filename: &str, bytes: Vec<u8>) {
        if let Some(workflow) = self.upload.as_mut() {
            workflow.select_file(filename, bytes);
        }
    }

    pub fn click_upload_trigger(&mut self) {
        if let Some(workflow) = self.upload.as_mut() {
            workflow.trigger_click(&mut self.doc, &mut self.client, &mut self.notices);
        }
    }

    pub fn click_vote(&mut self, section: usize, direction: VoteDirection) {
        if let Some(vote) = self.votes.get_mut(section) {
            vote.vote(&mut self.doc, direction, &mut self.notices);
        }
    }

    pub fn open_modal(&mut self) {
        if let Some(modal) = self.modal.as_mut() {
            modal.open(&mut self.doc);
        }
    }

    pub fn close_modal(&mut self) {
        if let Some(modal) = self.modal.as_mut() {
            modal.close(&mut self.doc);
        }
    }

    pub fn press_escape(&mut self) {
        if let Some(modal) = self.modal.as_mut() {
            modal.press_escape(&mut self.doc);
        }
    }

    pub fn modal_is_open(&self) -> bool {
        self.modal
            .as_ref()
            .map(|modal| modal.is_open(&self.doc))
            .unwrap_or(false)
    }

    fn sync_header(&mut self) {
        if let Some(sync) = self.header {
            sync.sync(&mut self.doc, &self.accounts);
        }
    }
}
