/// Issues request ids and filters out responses superseded by newer frames.
///
/// Ids increase monotonically. A response is accepted only if its id is not
/// older than the newest response already accepted, so a slow render of an
/// old frame can never overwrite a newer one on screen.
#[derive(Debug, Default, Clone)]
pub struct FrameSequencer {
    next: u64,
    newest_accepted: Option<u64>,
}

impl FrameSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Most recently issued id, if any.
    pub fn latest_issued(&self) -> Option<u64> {
        self.next.checked_sub(1)
    }

    pub fn newest_accepted(&self) -> Option<u64> {
        self.newest_accepted
    }

    /// Records `id` as displayed unless a newer response already was.
    pub fn accept(&mut self, id: u64) -> bool {
        if self.newest_accepted.is_some_and(|newest| id < newest) {
            return false;
        }
        self.newest_accepted = Some(id);
        true
    }
}
