use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("no entity factory registered as `{0}`")]
    UnknownFactory(String),

    #[error("no glyph registered as `{0}`")]
    UnknownGlyph(String),

    #[error("no open tile for {name} after {rounds} placement rounds")]
    NoOpenTile { name: String, rounds: usize },

    #[error("a {width}x{height} map exceeds the tile limit")]
    MapTooLarge { width: i32, height: i32 },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
