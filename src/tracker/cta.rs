//! Call-to-action visibility and click tracking.

use std::collections::HashMap;

use crate::config::CTA_ATTR;

use super::events::{ElementInfo, Viewport};
use super::observations::CtaObservation;

#[derive(Debug, Default)]
struct CtaState {
    seen: bool,
}

/// Reports a CTA once when it first becomes visible, and on every click.
#[derive(Debug)]
pub struct CtaTracker {
    threshold: f64,
    ctas: HashMap<String, CtaState>,
}

impl CtaTracker {
    pub fn new(threshold: f64) -> Self {
        CtaTracker {
            threshold,
            ctas: HashMap::new(),
        }
    }

    /// Starts observing CTAs; ids already observed are skipped.
    pub fn observe<I>(&mut self, ids: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut added = Vec::new();
        for id in ids {
            if !self.ctas.contains_key(&id) {
                self.ctas.insert(id.clone(), CtaState::default());
                added.push(id);
            }
        }
        added
    }

    pub fn observed_count(&self) -> usize {
        self.ctas.len()
    }

    pub fn on_intersection(&mut self, id: &str, ratio: f64, viewport: Viewport) -> Option<CtaObservation> {
        let state = self.ctas.get_mut(id)?;
        if state.seen || ratio < self.threshold {
            return None;
        }
        state.seen = true;
        Some(CtaObservation {
            cta_id: id.to_string(),
            was_seen: true,
            was_clicked: false,
            viewport,
        })
    }

    /// Reports a click on an observed CTA anywhere on the click path.
    pub fn on_click(&mut self, path: &[ElementInfo], viewport: Viewport) -> Option<CtaObservation> {
        let id = path.iter().find_map(|element| {
            element
                .attr(CTA_ATTR)
                .filter(|id| self.ctas.contains_key(*id))
        })?;
        if let Some(state) = self.ctas.get_mut(id) {
            state.seen = true;
        }
        Some(CtaObservation {
            cta_id: id.to_string(),
            was_seen: true,
            was_clicked: true,
            viewport,
        })
    }
}
