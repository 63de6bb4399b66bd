//! Physics subsystem error helpers

use crate::error::{DemoError, DemoResult};

use super::BodyId;

pub type PhysicsResult<T> = DemoResult<T>;

/// Attach a physics context to a missing value or foreign error
pub trait PhysicsErrorContext<T> {
    fn physics_context(self, context: &str) -> PhysicsResult<T>;
}

impl<T> PhysicsErrorContext<T> for Option<T> {
    fn physics_context(self, context: &str) -> PhysicsResult<T> {
        self.ok_or_else(|| DemoError::ResourceNotFound {
            resource_type: "physics body".to_string(),
            id: context.to_string(),
        })
    }
}

/// Create a body not found error
pub fn body_not_found(id: BodyId) -> DemoError {
    DemoError::ResourceNotFound {
        resource_type: "physics body".to_string(),
        id: id.to_string(),
    }
}

/// Create an invalid step error
pub fn invalid_step(reason: impl std::fmt::Display) -> DemoError {
    DemoError::Physics(format!("Invalid physics step: {}", reason))
}
