//! Scheduled valve actuation.

use sn_core::Real;
use sn_network::{Network, NodeKind};

/// Advance every scheduled valve over `[t, t + dt]`: the state moves by
/// `rate · Δperiod` where Δperiod is the window overlap with the step; a
/// non-finite rate snaps the state once the window is entered. The event
/// latches after the window closes.
pub(crate) fn handle_events(network: &mut Network, time: Real, dt: Real) {
    for node in network.nodes_mut() {
        let Some(event) = node.event else { continue };
        if event.handled {
            continue;
        }
        let NodeKind::Valve { state, rate } = node.kind else {
            continue;
        };
        let intersects = event.start < time + dt && event.end >= time;
        if intersects {
            let next = if rate.is_finite() {
                (state + rate * event.overlap(time, dt)).clamp(0.0, 1.0)
            } else if rate > 0.0 {
                1.0
            } else {
                0.0
            };
            node.kind = NodeKind::Valve { state: next, rate };
        }
        if time + dt > event.end
            && let Some(e) = &mut node.event
        {
            e.handled = true;
        }
    }
}
