// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod in_memory_artifact_repository;
pub mod in_memory_task_repository;

pub use in_memory_artifact_repository::InMemoryArtifactRepository;
pub use in_memory_task_repository::InMemoryTaskRepository;
