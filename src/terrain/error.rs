/// Terrain Error Handling
///
/// Converts missing terrain state and foreign errors into `DemoError`.

use crate::error::{DemoError, DemoResult};

pub type TerrainResult<T> = DemoResult<T>;

/// Error context for terrain operations
pub trait TerrainErrorContext<T> {
    fn terrain_context(self, context: &str) -> TerrainResult<T>;
}

impl<T> TerrainErrorContext<T> for Option<T> {
    fn terrain_context(self, context: &str) -> TerrainResult<T> {
        self.ok_or_else(|| DemoError::ResourceNotFound {
            resource_type: "terrain".to_string(),
            id: context.to_string(),
        })
    }
}

impl<T, E> TerrainErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn terrain_context(self, context: &str) -> TerrainResult<T> {
        self.map_err(|e| DemoError::SystemError {
            component: "terrain".to_string(),
            error: format!("{}: {}", context, e),
        })
    }
}
