//! Match counters, comparison flags and sort orders over a corpus.

use std::cmp::Ordering;

use super::Corpus;

/// Which trigrams count as shared when comparing two documents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompareFlags {
    /// Only trigrams held by exactly the two compared documents.
    pub unique: bool,
    /// Skip trigrams that also occur in template material.
    pub ignore_template: bool,
}

impl CompareFlags {
    /// Count every shared trigram.
    pub const ALL: Self = Self {
        unique: false,
        ignore_template: false,
    };
}

/// Shared-trigram counters for one document pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchCounts {
    /// Trigrams held by both documents.
    pub common: usize,
    /// Trigrams held by these two documents and no other.
    pub unique: usize,
    /// `common`, excluding template-flagged trigrams.
    pub common_ignore: usize,
    /// `unique`, excluding template-flagged trigrams.
    pub unique_ignore: usize,
}

impl MatchCounts {
    /// The counter selected by `flags`.
    #[must_use]
    pub fn get(&self, flags: CompareFlags) -> usize {
        match (flags.unique, flags.ignore_template) {
            (false, false) => self.common,
            (true, false) => self.unique,
            (false, true) => self.common_ignore,
            (true, true) => self.unique_ignore,
        }
    }

    pub(super) fn record(&mut self, holders: usize, is_template: bool) {
        let unique = holders == 2;
        self.common += 1;
        self.unique += usize::from(unique);
        if !is_template {
            self.common_ignore += 1;
            self.unique_ignore += usize::from(unique);
        }
    }
}

/// Orders document pairs by descending resemblance under `flags`.
pub fn by_resemblance(
    corpus: &Corpus,
    flags: CompareFlags,
) -> impl Fn(&(usize, usize), &(usize, usize)) -> Ordering + '_ {
    move |a, b| {
        let ra = corpus.resemblance(a.0, a.1, flags);
        let rb = corpus.resemblance(b.0, b.1, flags);
        rb.total_cmp(&ra)
    }
}

/// Orders group (or document) indices by ascending display name.
pub fn by_name(corpus: &Corpus) -> impl Fn(&usize, &usize) -> Ordering + '_ {
    move |a, b| corpus.group_name(*a).cmp(corpus.group_name(*b))
}

/// Orders group (or document) indices by descending unique-trigram count.
pub fn by_unique_count(corpus: &Corpus) -> impl Fn(&usize, &usize) -> Ordering + '_ {
    move |a, b| corpus.unique_count(*b).cmp(&corpus.unique_count(*a))
}

/// Orders group (or document) indices by descending engagement count.
pub fn by_engagement_count(corpus: &Corpus) -> impl Fn(&usize, &usize) -> Ordering + '_ {
    move |a, b| corpus.engagement_count(*b).cmp(&corpus.engagement_count(*a))
}
