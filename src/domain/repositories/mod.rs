// Repository interfaces (ports)
// Implemented by adapters in the infrastructure layer

pub mod artifact_repository;
pub mod task_repository;

pub use artifact_repository::ArtifactRepository;
pub use task_repository::TaskRepository;
