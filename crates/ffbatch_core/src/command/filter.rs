//! Filter-graph synthesis for masked regions.
//!
//! Each region becomes one `delogo` filter. In trailer mode the last region
//! carries an `enable` expression limiting it to the final seconds.

use crate::models::{RegionList, RegionSpec};

/// Time interval `[start, end]` in seconds during which a filter is enabled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    /// The last `window` seconds of a clip lasting `duration` seconds.
    pub fn trailing(duration: f64, window: f64) -> Self {
        Self {
            start: window_start(duration, window),
            end: duration,
        }
    }

    /// `enable` expression with three decimals.
    pub fn enable_expr(&self) -> String {
        format!("between(t,{:.3},{:.3})", self.start, self.end)
    }
}

/// Start of the trailing window, never negative.
pub fn window_start(duration: f64, window: f64) -> f64 {
    (duration - window).max(0.0)
}

/// One `delogo` fragment for a region.
pub fn delogo(region: &RegionSpec) -> String {
    format!(
        "delogo=x={}:y={}:w={}:h={}",
        region.x, region.y, region.w, region.h
    )
}

/// Complete `-vf` argument for a region list.
///
/// Without a window every region is masked for the whole clip. With one,
/// all but the last region stay unconditional and the last region is only
/// enabled inside the window.
pub fn mask_filter(regions: &RegionList, window: Option<TimeWindow>) -> String {
    let Some(window) = window else {
        return regions.iter().map(delogo).collect::<Vec<_>>().join(",");
    };

    let Some((last, rest)) = regions.split_last() else {
        return String::new();
    };

    rest.iter()
        .map(delogo)
        .chain(std::iter::once(format!(
            "{}:enable='{}'",
            delogo(last),
            window.enable_expr()
        )))
        .collect::<Vec<_>>()
        .join(",")
}
