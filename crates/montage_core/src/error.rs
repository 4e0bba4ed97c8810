use thiserror::Error;

/// Why a model mutation was refused.
///
/// The engine never surfaces these to the caller: every rejected operation is
/// a silent no-op at the public boundary. The variants exist so the model
/// layer can say precisely what went wrong and the engine can log it.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("asset not found: {0}")]
    AssetNotFound(uuid::Uuid),

    #[error("track not found: {0}")]
    TrackNotFound(uuid::Uuid),

    #[error("clip not found: {0}")]
    ClipNotFound(uuid::Uuid),

    #[error("asset kind {asset:?} not accepted by {track:?} track")]
    IncompatibleAsset {
        asset: crate::types::AssetKind,
        track: crate::types::TrackKind,
    },

    #[error("asset duration not resolved: {0}")]
    UnresolvedAsset(uuid::Uuid),

    #[error("clip would fall below minimum duration")]
    BelowMinDuration,

    #[error("position outside clip bounds")]
    OutsideClipBounds,
}

pub type Result<T> = std::result::Result<T, EditError>;
