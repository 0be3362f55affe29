//! Integration tests for the workflow sequencer
//!
//! Stages run in declaration order, each stage's aggregated responses land
//! in the shared context before the next stage starts, and a missing
//! workflow definition is fatal without dispatching anything.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crew_coordinator::agents::events::CoordinatorEvent;
use crew_coordinator::agents::{
    AgentError, AgentResponse, AgentResult, Coordinator, FnWorker, Role, Sequencer, Worker,
    WorkerEnv, WorkerProfile,
};
use crew_coordinator::config::CoordinatorConfig;
use crew_coordinator::domain::task::{Priority, Task, TaskStatus};
use crew_coordinator::domain::workflow::WorkflowStatus;

fn coordinator() -> Arc<Coordinator> {
    Arc::new(Coordinator::new(CoordinatorConfig::new("workflow")))
}

/// Reports whether the first stage's results were visible when it ran
struct ProbeWorker {
    profile: WorkerProfile,
}

#[async_trait]
impl Worker for ProbeWorker {
    fn identify(&self) -> &WorkerProfile {
        &self.profile
    }

    async fn execute(&self, task: &Task, env: &WorkerEnv) -> AgentResult<AgentResponse> {
        let earlier: Option<Vec<AgentResponse>> = env.context.get_as("stage:S1:results").await;
        let seen = earlier.map(|responses| responses.len()).unwrap_or(0);
        Ok(AgentResponse::new(
            self.profile.id,
            self.profile.role,
            format!("{} saw {}", task.title(), seen),
            0.9,
        ))
    }
}

/// Takes `delay` to answer, so a caller can give up mid-dispatch
struct SlowWorker {
    profile: WorkerProfile,
    delay: Duration,
}

#[async_trait]
impl Worker for SlowWorker {
    fn identify(&self) -> &WorkerProfile {
        &self.profile
    }

    async fn execute(&self, task: &Task, _env: &WorkerEnv) -> AgentResult<AgentResponse> {
        tokio::time::sleep(self.delay).await;
        Ok(AgentResponse::new(self.profile.id, self.profile.role, task.title(), 0.6))
    }
}

fn counting(role: Role, calls: Arc<AtomicUsize>) -> Arc<dyn Worker> {
    Arc::new(FnWorker::new(WorkerProfile::new("counter", role), move |p, task| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(AgentResponse::new(p.id, p.role, task.title(), 0.7))
    }))
}

fn task(title: &str, roles: Vec<Role>) -> Task {
    Task::new(title, "", roles, Priority::Medium)
}

#[tokio::test]
async fn test_stage_results_follow_declaration_order() {
    let coordinator = coordinator();
    let calls = Arc::new(AtomicUsize::new(0));
    coordinator.register_worker(counting(Role::Planner, Arc::clone(&calls))).await;
    coordinator
        .register_worker(Arc::new(ProbeWorker {
            profile: WorkerProfile::new("probe", Role::Verifier),
        }))
        .await;

    let mut sequencer = Sequencer::new(Arc::clone(&coordinator));
    sequencer.define_workflow(
        "Two stages",
        "",
        "Build it",
        vec![
            Sequencer::create_stage(
                "S1",
                "Plan",
                Role::Planner,
                vec![task("a", vec![Role::Planner]), task("b", vec![Role::Planner])],
                vec!["Plan written".to_string()],
                None,
            ),
            Sequencer::create_stage(
                "S2",
                "Verify",
                Role::Verifier,
                vec![task("check", vec![Role::Verifier])],
                vec!["Verified".to_string()],
                None,
            ),
        ],
    );

    let results = sequencer.execute_workflow().await.unwrap();

    assert_eq!(results.stage_ids(), vec!["S1", "S2"]);
    let s1: Vec<_> = results.get("S1").unwrap().iter().map(|r| r.response.as_str()).collect();
    assert_eq!(s1, vec!["a", "b"]);
    // stage 2 observed both stage 1 responses in the shared context
    assert_eq!(results.get("S2").unwrap()[0].response, "check saw 2");
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let stored = coordinator.get_shared_context_value("stage:S1:results").await.unwrap();
    assert_eq!(stored, serde_json::to_value(results.get("S1").unwrap()).unwrap());
    assert!(coordinator.get_shared_context_value("stage:S2:results").await.is_some());
    assert_eq!(sequencer.status(), WorkflowStatus::Completed);
}

#[tokio::test]
async fn test_execute_without_definition_dispatches_nothing() {
    let coordinator = coordinator();
    let calls = Arc::new(AtomicUsize::new(0));
    coordinator.register_worker(counting(Role::Planner, Arc::clone(&calls))).await;
    let mut events = coordinator.subscribe();

    let mut sequencer = Sequencer::new(Arc::clone(&coordinator));
    let result = sequencer.execute_workflow().await;

    assert!(matches!(result, Err(AgentError::NoWorkflowDefined)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(coordinator.completed_tasks().await.unwrap().is_empty());
    assert_eq!(sequencer.status(), WorkflowStatus::Failed);
    assert!(matches!(
        events.recv().await.unwrap(),
        CoordinatorEvent::WorkflowFailed { workflow_id: None, .. }
    ));
}

#[tokio::test]
async fn test_worker_failure_does_not_stop_workflow() {
    let coordinator = coordinator();
    coordinator
        .register_worker(Arc::new(FnWorker::new(
            WorkerProfile::new("flaky", Role::BackendBuilder),
            |_, _| Err(AgentError::execution("compile error")),
        )))
        .await;
    coordinator
        .register_worker(counting(Role::Verifier, Arc::new(AtomicUsize::new(0))))
        .await;

    let mut sequencer = Sequencer::new(Arc::clone(&coordinator));
    sequencer.define_workflow(
        "Build",
        "",
        "",
        vec![
            Sequencer::create_stage(
                "build",
                "Build",
                Role::BackendBuilder,
                vec![task("api", vec![Role::BackendBuilder])],
                vec!["Compiles".to_string()],
                None,
            ),
            Sequencer::create_stage(
                "verify",
                "Verify",
                Role::Verifier,
                vec![task("tests", vec![Role::Verifier])],
                vec!["Tests pass".to_string()],
                None,
            ),
        ],
    );

    let results = sequencer.execute_workflow().await.unwrap();

    let build = results.get("build").unwrap();
    assert_eq!(build[0].errors, Some(vec!["compile error".to_string()]));
    assert_eq!(results.get("verify").unwrap()[0].response, "tests");
    assert_eq!(sequencer.status(), WorkflowStatus::Completed);

    let workflow = sequencer.current_workflow().unwrap();
    assert!(workflow
        .stages
        .iter()
        .flat_map(|s| s.tasks.iter())
        .all(|t| t.status() == TaskStatus::Completed));
}

#[tokio::test]
async fn test_workflow_events_in_order() {
    let coordinator = coordinator();
    coordinator
        .register_worker(counting(Role::Planner, Arc::new(AtomicUsize::new(0))))
        .await;

    let mut sequencer = Sequencer::new(Arc::clone(&coordinator));
    let workflow_id = sequencer
        .define_workflow(
            "Events",
            "",
            "",
            vec![Sequencer::create_stage(
                "S1",
                "Plan",
                Role::Planner,
                vec![task("a", vec![Role::Planner])],
                vec![],
                None,
            )],
        )
        .id;
    let mut events = coordinator.subscribe();

    sequencer.execute_workflow().await.unwrap();

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }

    assert!(matches!(received.first(), Some(CoordinatorEvent::WorkflowStarted { stages: 1, .. })));
    assert!(received.iter().any(|e| matches!(
        e,
        CoordinatorEvent::StageCompleted { stage_id, success: false, .. } if stage_id == "S1"
    )));
    assert_eq!(
        received.last(),
        Some(&CoordinatorEvent::WorkflowCompleted { workflow_id })
    );
}

#[tokio::test]
async fn test_two_sequencers_share_one_coordinator() {
    let coordinator = coordinator();
    coordinator
        .register_worker(counting(Role::Planner, Arc::new(AtomicUsize::new(0))))
        .await;

    let mut first = Sequencer::new(Arc::clone(&coordinator));
    let mut second = Sequencer::new(Arc::clone(&coordinator));
    first.define_workflow(
        "first",
        "",
        "",
        vec![Sequencer::create_stage("A", "A", Role::Planner, vec![task("a", vec![Role::Planner])], vec![], None)],
    );
    second.define_workflow(
        "second",
        "",
        "",
        vec![Sequencer::create_stage("B", "B", Role::Planner, vec![task("b", vec![Role::Planner])], vec![], None)],
    );

    first.execute_workflow().await.unwrap();
    second.execute_workflow().await.unwrap();

    assert!(coordinator.get_shared_context_value("stage:A:results").await.is_some());
    assert!(coordinator.get_shared_context_value("stage:B:results").await.is_some());
    assert_eq!(coordinator.completed_tasks().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_workflow_survives_dropped_execution() {
    let coordinator = coordinator();
    coordinator
        .register_worker(Arc::new(SlowWorker {
            profile: WorkerProfile::new("slow", Role::Architect),
            delay: Duration::from_millis(200),
        }))
        .await;

    let mut sequencer = Sequencer::new(Arc::clone(&coordinator));
    let workflow_id = sequencer
        .define_workflow(
            "Slow",
            "",
            "",
            vec![Sequencer::create_stage(
                "design",
                "Design",
                Role::Architect,
                vec![task("schema", vec![Role::Architect])],
                vec!["Schema drafted".to_string()],
                None,
            )],
        )
        .id;

    let timed_out =
        tokio::time::timeout(Duration::from_millis(20), sequencer.execute_workflow()).await;
    assert!(timed_out.is_err());

    let workflow = sequencer.current_workflow().expect("definition kept after drop");
    assert_eq!(workflow.id, workflow_id);
    assert_eq!(workflow.stages[0].tasks[0].status(), TaskStatus::Pending);

    let results = sequencer.execute_workflow().await.unwrap();

    assert_eq!(results.get("design").unwrap()[0].response, "schema");
    assert_eq!(sequencer.status(), WorkflowStatus::Completed);
    assert_eq!(
        sequencer.current_workflow().unwrap().stages[0].tasks[0].status(),
        TaskStatus::Completed
    );
}
