use crate::model::Case;

pub mod jsonl;

pub use jsonl::JsonlSource;

/// Iterator of pending cases. Items may fail individually (unreadable
/// source, malformed record); the runner treats such failures as fatal.
pub type CaseIter<'a> = Box<dyn Iterator<Item = anyhow::Result<Case>> + 'a>;

/// Where cases come from. Pull-based and finite; the runner drains it once
/// per run. Whether `cases` can be called a second time is the source's
/// business: in-memory lists restart, consumed streams may not.
pub trait CaseSource {
    fn cases(&mut self) -> CaseIter<'_>;
}

/// In-memory case list. Restartable: every `cases` call yields fresh
/// clones in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ListSource {
    cases: Vec<Case>,
}

impl ListSource {
    pub fn new(cases: Vec<Case>) -> Self {
        Self { cases }
    }

    pub fn push(&mut self, case: Case) {
        self.cases.push(case);
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

impl CaseSource for ListSource {
    fn cases(&mut self) -> CaseIter<'_> {
        Box::new(self.cases.iter().cloned().map(Ok))
    }
}
