//! rTorrent method names.
//!
//! rTorrent 0.9 renamed most of its XML-RPC commands; older daemons only answer to
//! the `get_*` spellings. A client speaks exactly one [`Dialect`].

/// Method used by every list accessor, in both dialects.
pub(crate) const DOWNLOAD_LIST: &str = "download_list";

/// Method used to fetch per-tracker attributes of a download.
pub(crate) const TRACKER_MULTICALL: &str = "t.multicall";

/// The set of method names a given rTorrent release answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// rTorrent before 0.9 (`get_down_rate`, `d.get_base_filename`, ...).
    Legacy,
    /// rTorrent 0.9 and later (`throttle.global_down.rate`, `d.base_filename`, ...).
    #[default]
    Modern,
}

#[derive(Debug)]
pub(crate) struct Methods {
    pub(crate) global_down_rate: &'static str,
    pub(crate) global_up_rate: &'static str,
    pub(crate) global_down_total: &'static str,
    pub(crate) global_up_total: &'static str,
    pub(crate) base_filename: &'static str,
    pub(crate) down_rate: &'static str,
    pub(crate) down_total: &'static str,
    pub(crate) up_rate: &'static str,
    pub(crate) up_total: &'static str,
    /// Command passed to [`TRACKER_MULTICALL`] to read each tracker's URL.
    pub(crate) tracker_url: &'static str,
}

const LEGACY: Methods = Methods {
    global_down_rate: "get_down_rate",
    global_up_rate: "get_up_rate",
    global_down_total: "get_down_total",
    global_up_total: "get_up_total",
    base_filename: "d.get_base_filename",
    down_rate: "d.get_down_rate",
    down_total: "d.get_down_total",
    up_rate: "d.get_up_rate",
    up_total: "d.get_up_total",
    tracker_url: "t.get_url=",
};

const MODERN: Methods = Methods {
    global_down_rate: "throttle.global_down.rate",
    global_up_rate: "throttle.global_up.rate",
    global_down_total: "throttle.global_down.total",
    global_up_total: "throttle.global_up.total",
    base_filename: "d.base_filename",
    down_rate: "d.down.rate",
    down_total: "d.down.total",
    up_rate: "d.up.rate",
    up_total: "d.up.total",
    tracker_url: "t.url=",
};

impl Dialect {
    pub(crate) fn methods(self) -> &'static Methods {
        match self {
            Dialect::Legacy => &LEGACY,
            Dialect::Modern => &MODERN,
        }
    }
}
