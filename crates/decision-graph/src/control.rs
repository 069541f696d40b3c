use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative, out-of-band kill switch for the investment and risk debate
/// loops (§5 "Cancellation / timeouts", §8 P8). An operator holding an
/// `Arc<RunControl>` can stop further Bear/Bull or risk-analyst cycles
/// before the next loop predicate check, without waiting for the round
/// counter to trip.
#[derive(Debug)]
pub struct RunControl {
    invest_continue: AtomicBool,
    risk_continue: AtomicBool,
}

impl Default for RunControl {
    fn default() -> Self {
        Self::new()
    }
}

impl RunControl {
    pub fn new() -> Self {
        Self {
            invest_continue: AtomicBool::new(true),
            risk_continue: AtomicBool::new(true),
        }
    }

    pub fn stop_investment_debate(&self) {
        self.invest_continue.store(false, Ordering::Relaxed);
    }

    pub fn stop_risk_debate(&self) {
        self.risk_continue.store(false, Ordering::Relaxed);
    }

    pub(crate) fn investment_allowed(&self) -> bool {
        self.invest_continue.load(Ordering::Relaxed)
    }

    pub(crate) fn risk_allowed(&self) -> bool {
        self.risk_continue.load(Ordering::Relaxed)
    }
}
