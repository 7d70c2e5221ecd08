use thiserror::Error;

/// Errors surfaced by dock, undock, and persistence operations.
///
/// Stale sibling references during a dock are recovered internally (the
/// panel is docked at the right edge of the layout) and never reach this
/// type. Missing panels during a load are reported per key in the
/// [`LoadReport`](crate::persist::LoadReport) rather than failing the load.
#[derive(Debug, Error)]
pub enum DockError {
    #[error("layout storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("layout codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("unknown panel key: {0}")]
    UnknownPanel(String),

    #[error("transfer rejected by an exclusive dock surface")]
    ExclusiveSurface,
}
