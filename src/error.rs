use thiserror::Error;

#[derive(Error, Debug)]
pub enum AstroError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    #[error("Invalid angle: {0}")]
    InvalidAngle(String),

    #[error("Unsupported planet: {0}")]
    UnsupportedPlanet(String),

    #[error("Positions do not include the ascendant")]
    MissingAscendant,

    #[error("Unsupported dasha system: {0}")]
    UnsupportedDashaSystem(String),

    #[error("Planets period data is missing in dasha details")]
    MissingPlanetsPeriod,

    #[error("Unable to determine the running dasha")]
    UnableToDetermineDasha,

    #[error("Search error: {0}")]
    Search(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, AstroError>;
