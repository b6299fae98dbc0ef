//! Note-reading progress and the assessment unlock latch.
//!
//! Progress is recomputed from the page currently shown, so paging
//! backwards lowers it. The unlock latch is stored separately and, once
//! set, stays set for the rest of the course session.

/// Progress (in percent) at which the assessment unlocks.
pub const UNLOCK_THRESHOLD: f64 = 70.0;

/// Compute `min(100, current / total * 100)`, or `0` when there are no pages.
pub fn progress_percent(current_page: u32, total_pages: u32) -> f64 {
    if total_pages == 0 {
        return 0.0;
    }
    (current_page as f64 / total_pages as f64 * 100.0).min(100.0)
}

/// Events raised by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Progress reached the threshold for the first time this session.
    AssessmentUnlocked,
}

/// Outcome of a request to turn the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMove {
    /// Moved to the given page.
    Moved(u32),
    /// Already on the first page; nothing changed.
    AtFirstPage,
    /// Already on the last page; nothing changed.
    AtLastPage,
    /// No page has been shown yet; nothing changed.
    NotStarted,
}

/// Result of a page turn: where we went, and whether it unlocked anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTurn {
    pub movement: PageMove,
    pub event: Option<ProgressEvent>,
}

impl PageTurn {
    fn still(movement: PageMove) -> Self {
        Self {
            movement,
            event: None,
        }
    }
}

/// Tracks the learner's position in a course's notes.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total_pages: u32,
    /// `None` until the first page is shown.
    current_page: Option<u32>,
    unlocked: bool,
}

impl ProgressTracker {
    pub fn new(total_pages: u32) -> Self {
        Self {
            total_pages,
            current_page: None,
            unlocked: false,
        }
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Whether the course has any notes to paginate.
    pub fn has_notes(&self) -> bool {
        self.total_pages > 0
    }

    pub fn current_page(&self) -> Option<u32> {
        self.current_page
    }

    /// Current progress in percent, `0` before any page is shown.
    pub fn progress(&self) -> f64 {
        self.current_page
            .map(|page| progress_percent(page, self.total_pages))
            .unwrap_or(0.0)
    }

    /// Whether the assessment has been unlocked this session.
    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Record that `page` is now shown and recompute progress.
    ///
    /// Returns `AssessmentUnlocked` the first time progress reaches the
    /// threshold; later calls never return it again.
    pub fn view(&mut self, page: u32) -> Option<ProgressEvent> {
        self.current_page = Some(page);
        if self.unlocked || !self.has_notes() {
            return None;
        }
        if self.progress() >= UNLOCK_THRESHOLD {
            self.unlocked = true;
            tracing::info!(page, total = self.total_pages, "assessment unlocked");
            return Some(ProgressEvent::AssessmentUnlocked);
        }
        None
    }

    /// Show the first page.
    pub fn start(&mut self) -> Option<ProgressEvent> {
        self.view(1)
    }

    pub fn next_page(&mut self) -> PageTurn {
        let Some(current) = self.current_page else {
            return PageTurn::still(PageMove::NotStarted);
        };
        if current >= self.total_pages {
            return PageTurn::still(PageMove::AtLastPage);
        }
        let target = current + 1;
        PageTurn {
            movement: PageMove::Moved(target),
            event: self.view(target),
        }
    }

    pub fn previous_page(&mut self) -> PageTurn {
        let Some(current) = self.current_page else {
            return PageTurn::still(PageMove::NotStarted);
        };
        if current <= 1 {
            return PageTurn::still(PageMove::AtFirstPage);
        }
        let target = current - 1;
        PageTurn {
            movement: PageMove::Moved(target),
            event: self.view(target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_formula() {
        assert_eq!(progress_percent(1, 4), 25.0);
        assert_eq!(progress_percent(4, 4), 100.0);
        assert_eq!(progress_percent(7, 10), 70.0);
        assert!((progress_percent(1, 3) - 33.333).abs() < 0.01);
    }

    #[test]
    fn progress_is_capped_at_100() {
        assert_eq!(progress_percent(12, 10), 100.0);
    }

    #[test]
    fn zero_pages_means_zero_progress() {
        assert_eq!(progress_percent(1, 0), 0.0);
        assert_eq!(progress_percent(5, 0), 0.0);
    }

    #[test]
    fn progress_is_zero_before_first_view() {
        let tracker = ProgressTracker::new(10);
        assert_eq!(tracker.progress(), 0.0);
        assert_eq!(tracker.current_page(), None);
        assert!(!tracker.is_unlocked());
    }

    #[test]
    fn unlock_fires_exactly_once_on_monotonic_advance() {
        let mut tracker = ProgressTracker::new(10);
        let mut events = Vec::new();
        events.extend(tracker.start());
        for _ in 0..12 {
            events.extend(tracker.next_page().event);
        }
        // Re-viewing pages above the threshold must not re-fire.
        events.extend(tracker.view(8));
        events.extend(tracker.view(10));
        assert_eq!(events, vec![ProgressEvent::AssessmentUnlocked]);
        assert_eq!(tracker.progress(), 100.0);
    }

    #[test]
    fn unlock_fires_on_the_page_that_crosses_threshold() {
        let mut tracker = ProgressTracker::new(10);
        tracker.start();
        for page in 2..=6 {
            assert_eq!(tracker.view(page), None, "page {page} is below 70%");
        }
        assert_eq!(tracker.view(7), Some(ProgressEvent::AssessmentUnlocked));
    }

    #[test]
    fn going_back_lowers_progress_but_keeps_unlock() {
        let mut tracker = ProgressTracker::new(4);
        tracker.view(4);
        assert!(tracker.is_unlocked());
        tracker.view(1);
        assert_eq!(tracker.progress(), 25.0);
        assert!(tracker.is_unlocked());
        // Crossing the line again does not re-emit.
        assert_eq!(tracker.view(3), None);
    }

    #[test]
    fn paging_before_start_goes_nowhere() {
        let mut tracker = ProgressTracker::new(3);
        assert_eq!(tracker.next_page().movement, PageMove::NotStarted);
        assert_eq!(tracker.previous_page().movement, PageMove::NotStarted);
        assert_eq!(tracker.current_page(), None);
        assert_eq!(tracker.progress(), 0.0);
        assert!(!tracker.is_unlocked());
    }

    #[test]
    fn empty_course_never_unlocks() {
        let mut tracker = ProgressTracker::new(0);
        assert!(!tracker.has_notes());
        assert_eq!(tracker.start(), None);
        assert_eq!(tracker.next_page().movement, PageMove::AtLastPage);
        assert_eq!(tracker.progress(), 0.0);
        assert!(!tracker.is_unlocked());
    }

    #[test]
    fn page_turns_respect_bounds() {
        let mut tracker = ProgressTracker::new(2);
        tracker.start();
        assert_eq!(tracker.previous_page().movement, PageMove::AtFirstPage);
        assert_eq!(tracker.next_page().movement, PageMove::Moved(2));
        assert_eq!(tracker.next_page().movement, PageMove::AtLastPage);
        assert_eq!(tracker.previous_page().movement, PageMove::Moved(1));
        assert_eq!(tracker.current_page(), Some(1));
    }

    #[test]
    fn single_page_course_unlocks_on_start() {
        let mut tracker = ProgressTracker::new(1);
        assert_eq!(tracker.start(), Some(ProgressEvent::AssessmentUnlocked));
    }
}
