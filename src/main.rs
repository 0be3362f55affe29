use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use crew_coordinator::agents::{
    AgentError, AgentResponse, AgentResult, Coordinator, Message, Role, Sequencer, Worker,
    WorkerEnv, WorkerProfile,
};
use crew_coordinator::config::CoordinatorConfig;
use crew_coordinator::domain::task::{Priority, Task};

/// Demo worker that answers with a summary of what it could see
struct DemoWorker {
    profile: WorkerProfile,
}

impl DemoWorker {
    fn new(name: &str, role: Role, capabilities: &[&str]) -> Arc<dyn Worker> {
        Arc::new(Self {
            profile: WorkerProfile::new(name, role).with_capabilities(capabilities.iter().copied()),
        })
    }
}

#[async_trait]
impl Worker for DemoWorker {
    fn identify(&self) -> &WorkerProfile {
        &self.profile
    }

    async fn execute(&self, task: &Task, env: &WorkerEnv) -> AgentResult<AgentResponse> {
        let inbox = env.mailbox.drain().await;
        let requirements = env
            .context
            .get_as::<Vec<String>>("requirements")
            .await
            .ok_or_else(|| AgentError::execution("requirements missing from shared context"))?;

        let runs = env
            .memory
            .recall("runs")
            .await
            .and_then(|v| v.as_u64())
            .unwrap_or(0)
            + 1;
        env.memory.remember("runs", json!(runs)).await;

        Ok(AgentResponse::new(
            self.profile.id,
            self.profile.role,
            format!(
                "{} handled '{}' against {} requirement(s), {} new message(s)",
                self.profile.display_name,
                task.title(),
                requirements.len(),
                inbox.len()
            ),
            0.8,
        )
        .for_task(task.id()))
    }
}

async fn run(config: CoordinatorConfig) -> AgentResult<()> {
    let coordinator = Arc::new(Coordinator::new(config));

    coordinator
        .register_worker(DemoWorker::new("Pat", Role::Planner, &["planning", "estimation"]))
        .await;
    coordinator
        .register_worker(DemoWorker::new("Ada", Role::Architect, &["system design"]))
        .await;
    coordinator
        .register_worker(DemoWorker::new("Vic", Role::Verifier, &["testing", "review"]))
        .await;

    coordinator
        .update_shared_context("requirements", json!(["user accounts", "task lists"]))
        .await;

    coordinator
        .route_message(Message::new(
            Role::Planner,
            vec![Role::Architect, Role::Verifier],
            "Kickoff",
            "Plan drafted, design next",
        ))
        .await;

    let plan = coordinator
        .create_task("Plan", "Break the goal into milestones", vec![Role::Planner], Priority::High)
        .await?;
    let design = coordinator
        .create_task(
            "Design",
            "Describe the architecture",
            vec![Role::Architect, Role::Verifier],
            Priority::Medium,
        )
        .await?;

    let mut sequencer = Sequencer::new(Arc::clone(&coordinator));
    sequencer.define_workflow(
        "Todo app",
        "Plan and design a small todo application",
        "Build a todo app",
        vec![
            Sequencer::create_stage(
                "planning",
                "Planning",
                Role::Planner,
                vec![plan],
                vec!["Milestones listed".to_string()],
                None,
            ),
            Sequencer::create_stage(
                "design",
                "Design",
                Role::Architect,
                vec![design],
                vec!["Architecture reviewed".to_string()],
                Some(vec![Role::Verifier]),
            ),
        ],
    );

    let results = sequencer.execute_workflow().await?;
    for (stage_id, responses) in results.iter() {
        for response in responses {
            tracing::info!(stage = %stage_id, role = %response.role, "{}", response.response);
        }
    }

    if let Some(design) = results.get("design") {
        coordinator
            .store_artifact("design-notes", serde_json::to_value(design)?)
            .await?;
    }

    println!("{}", coordinator.generate_status_report().await?);
    Ok(())
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = match CoordinatorConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("{}", err);
            std::process::exit(2);
        }
    };

    tracing::info!(name = %config.name, "Starting coordinator");

    if let Err(err) = run(config).await {
        tracing::error!("Coordinator run failed: {}", err);
        std::process::exit(1);
    }
}
