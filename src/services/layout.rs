use crate::config::LayoutSettings;
use serde::{Deserialize, Serialize};

/// Title widths applied to the tab strip.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TabWidths {
    /// Width of every tab but the last one.
    pub each: u32,
    /// Width of the last tab (or of the tab about to be added).
    pub last: u32,
}

/// Width and count arithmetic for the tab strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabLayout {
    settings: LayoutSettings,
}

impl TabLayout {
    pub fn new(settings: LayoutSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    /// How many tabs fit in `available_width`, capped at the ceiling.
    pub fn max_tabs(&self, available_width: u32) -> usize {
        if self.settings.min_tab_width == 0 {
            return self.settings.max_tab_number;
        }
        let fitting = (available_width / self.settings.min_tab_width) as usize;
        fitting.min(self.settings.max_tab_number)
    }

    /// Recomputes title widths for `tab_count` tabs.
    ///
    /// With `include_pending` the count includes a tab about to be added,
    /// and `last` is the width that new tab should take. Returns `None`
    /// when there is nothing to lay out or tabs would drop under the
    /// minimum width, in which case current widths are kept.
    pub fn resize_tabs(
        &self,
        available_width: u32,
        tab_count: usize,
        include_pending: bool,
    ) -> Option<TabWidths> {
        let count = (if include_pending { tab_count + 1 } else { tab_count }) as u32;
        if count == 0 {
            return None;
        }
        let rest = available_width % count;
        let mut average = (available_width - rest) / count;
        if average <= self.settings.min_tab_width {
            return None;
        }

        average = average.saturating_sub(self.settings.tab_extra_width);
        let mut last = average + rest;
        if average > self.settings.max_title_width {
            average = self.settings.max_title_width;
            last = average;
        }
        Some(TabWidths { each: average, last })
    }
}

impl Default for TabLayout {
    fn default() -> Self {
        Self::new(LayoutSettings::default())
    }
}
