//! Per-section vote controls with a one-vote lock.

use crate::notice::NoticeLog;
use ifx_dom::Document;
use ifx_dom::NodeId;
use ifx_resolve::GroupRole;
use ifx_resolve::SectionPart;

pub const MSG_ALREADY_VOTED: &str = "You have already voted in this section.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Up,
    Down,
}

/// One vote section: its controls, the count display, and the lock. Counts
/// live only in the page; a reload starts every section over.
#[derive(Debug)]
pub struct VoteSection {
    section: NodeId,
    up: Option<NodeId>,
    down: Option<NodeId>,
    count: NodeId,
    value: i64,
    voted: bool,
}

/// Binds every vote section on the page, in document order. A section
/// without its own count display gets one appended.
pub fn bind_votes(doc: &mut Document) -> Vec<VoteSection> {
    let sections = ifx_resolve::resolve_all(doc, GroupRole::VoteSection);

    let mut out = Vec::with_capacity(sections.len());
    for section in sections {
        let up = ifx_resolve::resolve_section_part(doc, section, SectionPart::UpControl);
        let down = ifx_resolve::resolve_section_part(doc, section, SectionPart::DownControl);
        let count = match ifx_resolve::resolve_section_part(doc, section, SectionPart::CountDisplay)
        {
            Some(existing) => existing,
            None => {
                let span = doc.create_element("span");
                doc.add_class(span, "vote-count");
                doc.set_text_content(span, "0");
                doc.append_child(section, span);
                span
            }
        };

        let value = doc.text_content(count).trim().parse::<i64>().unwrap_or(0);
        out.push(VoteSection {
            section,
            up,
            down,
            count,
            value,
            voted: false,
        });
    }

    out
}

impl VoteSection {
    pub fn section(&self) -> NodeId {
        self.section
    }

    pub fn up(&self) -> Option<NodeId> {
        self.up
    }

    pub fn down(&self) -> Option<NodeId> {
        self.down
    }

    pub fn count(&self) -> NodeId {
        self.count
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn has_voted(&self) -> bool {
        self.voted
    }

    /// Registers a vote. The first vote in either direction locks the
    /// section; later attempts only raise a notice.
    pub fn vote(&mut self, doc: &mut Document, direction: VoteDirection, notices: &mut NoticeLog) {
        if self.voted {
            notices.info(MSG_ALREADY_VOTED);
            return;
        }

        self.value = match direction {
            VoteDirection::Up => self.value.saturating_add(1),
            VoteDirection::Down => self.value.saturating_sub(1),
        };
        self.voted = true;
        doc.set_text_content(self.count, &self.value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::MSG_ALREADY_VOTED;
    use super::VoteDirection;
    use super::bind_votes;
    use crate::notice::NoticeLog;
    use ifx_html::HtmlParser;

    const PAGE: &str = "<section class=\"vote-section\">\
         <button class=\"upvote\">+</button>\
         <button class=\"downvote\">-</button>\
         <span class=\"vote-count\">3</span>\
         </section>\
         <section class=\"vote-section\">\
         <button class=\"upvote\">+</button>\
         </section>";

    #[test]
    fn first_vote_counts_and_locks_the_section() {
        let mut doc = HtmlParser.parse(PAGE);
        let mut sections = bind_votes(&mut doc);
        assert_eq!(sections.len(), 2);

        let mut notices = NoticeLog::new();
        sections[0].vote(&mut doc, VoteDirection::Up, &mut notices);
        assert_eq!(sections[0].value(), 4);
        assert_eq!(doc.text_content(sections[0].count()), "4");
        assert!(notices.entries().is_empty());

        sections[0].vote(&mut doc, VoteDirection::Down, &mut notices);
        assert_eq!(sections[0].value(), 4);
        assert_eq!(notices.last_message(), Some(MSG_ALREADY_VOTED));
    }

    #[test]
    fn sections_lock_independently() {
        let mut doc = HtmlParser.parse(PAGE);
        let mut sections = bind_votes(&mut doc);

        let mut notices = NoticeLog::new();
        sections[0].vote(&mut doc, VoteDirection::Down, &mut notices);
        sections[1].vote(&mut doc, VoteDirection::Up, &mut notices);

        assert_eq!(sections[0].value(), 2);
        assert_eq!(sections[1].value(), 1);
        assert!(notices.entries().is_empty());
    }

    #[test]
    fn missing_count_display_is_created_at_zero() {
        let mut doc = HtmlParser.parse(PAGE);
        let sections = bind_votes(&mut doc);
        assert_eq!(sections[1].value(), 0);
        assert_eq!(doc.text_content(sections[1].count()), "0");
    }
}
