use std::collections::VecDeque;

use crate::config::DiagnosticsCfg;
use crate::error::BindingError;

/// Ring buffer of recent binding errors.
#[derive(Debug)]
pub struct Diagnostics {
    cfg: DiagnosticsCfg,
    entries: VecDeque<BindingError>,
    total: u64,
}

impl Diagnostics {
    pub fn new(cfg: DiagnosticsCfg) -> Self {
        Self {
            entries: VecDeque::with_capacity(cfg.capacity.min(64)),
            cfg,
            total: 0,
        }
    }

    /// Log `err` and keep it if recording is enabled.
    pub fn record(&mut self, err: BindingError) {
        if err.is_quiet() {
            log::debug!("binding: {err}");
        } else {
            log::warn!("binding: {err}");
        }
        self.total += 1;
        if !self.cfg.enabled || self.cfg.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.cfg.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(err);
    }

    pub fn iter(&self) -> impl Iterator<Item = &BindingError> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&BindingError> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of errors seen, including ones evicted or not recorded.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn drain(&mut self) -> Vec<BindingError> {
        self.entries.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
