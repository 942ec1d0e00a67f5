pub mod elf;
pub mod mock_artifact_store;
pub mod mock_health_server;

pub use mock_artifact_store::MockArtifactStore;
pub use mock_health_server::{unused_port, HealthBehavior, MockHealthServer};
