use crate::conversation::Conversation;
use crate::message::MessageGroup;

use super::ArchiveWindow;

#[derive(Clone, Debug)]
pub struct ConversationArchive {
    pub conversation: Conversation,
    pub window: ArchiveWindow,
    pub groups: Vec<MessageGroup>,
}

impl ConversationArchive {
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.messages().is_empty())
    }

    pub fn message_count(&self) -> usize {
        self.groups.iter().map(|g| g.messages().len()).sum()
    }
}
