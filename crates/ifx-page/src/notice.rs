//! User-visible notices raised by event handlers.

/// How a notice should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

/// One message surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// Ordered log of notices for the current page load.
#[derive(Debug, Clone, Default)]
pub struct NoticeLog {
    entries: Vec<Notice>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(NoticeKind::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(NoticeKind::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(NoticeKind::Error, message);
    }

    fn push(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.entries.push(Notice {
            kind,
            message: message.into(),
        });
    }

    pub fn entries(&self) -> &[Notice] {
        &self.entries
    }

    pub fn last(&self) -> Option<&Notice> {
        self.entries.last()
    }

    pub fn last_message(&self) -> Option<&str> {
        self.entries.last().map(|notice| notice.message.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::NoticeKind;
    use super::NoticeLog;

    #[test]
    fn records_notices_in_order() {
        let mut log = NoticeLog::new();
        log.error("bad input");
        log.success("done");

        assert_eq!(log.entries().len(), 2);
        assert_eq!(log.last_message(), Some("done"));
        assert_eq!(log.entries()[0].kind, NoticeKind::Error);
    }
}
