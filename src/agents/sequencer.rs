use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::cancel::CancelSignal;
use super::coordinator::Coordinator;
use super::errors::{AgentError, AgentResult};
use super::events::CoordinatorEvent;
use super::types::{AgentResponse, Role};
use crate::domain::task::Task;
use crate::domain::workflow::{WorkflowDefinition, WorkflowStage, WorkflowStatus};

/// Judges whether a finished stage met its criteria
pub trait StageVerifier: Send + Sync {
    fn verify(&self, stage: &WorkflowStage, responses: &[AgentResponse]) -> bool;
}

impl<F> StageVerifier for F
where
    F: Fn(&WorkflowStage, &[AgentResponse]) -> bool + Send + Sync,
{
    fn verify(&self, stage: &WorkflowStage, responses: &[AgentResponse]) -> bool {
        self(stage, responses)
    }
}

/// Default verifier: a stage succeeds when it declares any criteria at all
///
/// Responses are not inspected.
#[derive(Debug, Clone, Copy, Default)]
pub struct CriteriaDeclared;

impl StageVerifier for CriteriaDeclared {
    fn verify(&self, stage: &WorkflowStage, _responses: &[AgentResponse]) -> bool {
        !stage.success_criteria.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageVerdict {
    pub stage_id: String,
    pub success: bool,
}

/// Responses of each stage, in stage declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowResults {
    stages: Vec<(String, Vec<AgentResponse>)>,
}

impl WorkflowResults {
    /// Inserts a stage's responses; a repeated stage id keeps its first position
    fn insert(&mut self, stage_id: String, responses: Vec<AgentResponse>) {
        match self.stages.iter_mut().find(|(id, _)| *id == stage_id) {
            Some((_, existing)) => *existing = responses,
            None => self.stages.push((stage_id, responses)),
        }
    }

    pub fn get(&self, stage_id: &str) -> Option<&[AgentResponse]> {
        self.stages
            .iter()
            .find(|(id, _)| id == stage_id)
            .map(|(_, responses)| responses.as_slice())
    }

    pub fn stage_ids(&self) -> Vec<&str> {
        self.stages.iter().map(|(id, _)| id.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[AgentResponse])> {
        self.stages
            .iter()
            .map(|(id, responses)| (id.as_str(), responses.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Drives one workflow definition through a coordinator, stage by stage
///
/// Each sequencer holds at most one current workflow. Running several
/// workflows at once takes several sequencers, which may share a coordinator.
pub struct Sequencer {
    coordinator: Arc<Coordinator>,
    current: Option<WorkflowDefinition>,
    status: WorkflowStatus,
    verdicts: Vec<StageVerdict>,
    verifier: Box<dyn StageVerifier>,
}

impl Sequencer {
    pub fn new(coordinator: Arc<Coordinator>) -> Self {
        Self {
            coordinator,
            current: None,
            status: WorkflowStatus::NotStarted,
            verdicts: Vec::new(),
            verifier: Box::new(CriteriaDeclared),
        }
    }

    /// Replace the stage success check
    pub fn with_verifier(mut self, verifier: impl StageVerifier + 'static) -> Self {
        self.verifier = Box::new(verifier);
        self
    }

    /// Pure builder for a stage
    pub fn create_stage(
        id: impl Into<String>,
        name: impl Into<String>,
        primary_role: Role,
        tasks: Vec<Task>,
        success_criteria: Vec<String>,
        supporting_roles: Option<Vec<Role>>,
    ) -> WorkflowStage {
        WorkflowStage::new(id, name, primary_role, tasks, success_criteria)
            .with_supporting_roles(supporting_roles.unwrap_or_default())
    }

    /// Store a new current workflow, replacing any previous one
    pub fn define_workflow(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        initial_prompt: impl Into<String>,
        stages: Vec<WorkflowStage>,
    ) -> &WorkflowDefinition {
        let definition = WorkflowDefinition::new(name, description, initial_prompt, stages);
        info!(
            workflow_id = %definition.id,
            name = %definition.name,
            stages = definition.stages.len(),
            "Workflow defined"
        );

        self.status = WorkflowStatus::NotStarted;
        self.verdicts.clear();
        self.current.insert(definition)
    }

    pub fn current_workflow(&self) -> Option<&WorkflowDefinition> {
        self.current.as_ref()
    }

    pub fn status(&self) -> WorkflowStatus {
        self.status
    }

    /// Verdicts of the stages run by the latest execution
    pub fn verdicts(&self) -> &[StageVerdict] {
        &self.verdicts
    }

    pub fn coordinator(&self) -> &Arc<Coordinator> {
        &self.coordinator
    }

    /// Run every stage in order, and every task of a stage in order
    pub async fn execute_workflow(&mut self) -> AgentResult<WorkflowResults> {
        self.execute_workflow_with_cancel(&CancelSignal::new()).await
    }

    /// [`Sequencer::execute_workflow`] that checks `cancel` before every stage and task
    ///
    /// The definition stays in place while it runs. Each task is dispatched
    /// from a copy and written back once its dispatch returns, so dropping the
    /// returned future leaves the definition intact and re-executable.
    pub async fn execute_workflow_with_cancel(
        &mut self,
        cancel: &CancelSignal,
    ) -> AgentResult<WorkflowResults> {
        let Some(workflow) = self.current.as_ref() else {
            warn!("execute_workflow called with no workflow defined");
            self.move_to(WorkflowStatus::Failed);
            self.coordinator.publish(CoordinatorEvent::WorkflowFailed {
                workflow_id: None,
                reason: AgentError::NoWorkflowDefined.to_string(),
            });
            return Err(AgentError::NoWorkflowDefined);
        };

        let workflow_id = workflow.id;
        let name = workflow.name.clone();
        let stages = workflow.stages.clone();

        self.move_to(WorkflowStatus::Running);
        self.verdicts.clear();
        info!(workflow_id = %workflow_id, name = %name, "Workflow started");
        self.coordinator.publish(CoordinatorEvent::WorkflowStarted {
            workflow_id,
            stages: stages.len(),
        });

        let mut results = WorkflowResults::default();

        for (stage_index, mut stage) in stages.into_iter().enumerate() {
            match self.run_stage(workflow_id, stage_index, &mut stage, cancel).await {
                Ok(responses) => results.insert(stage.id.clone(), responses),
                Err(err) => {
                    self.move_to(if matches!(err, AgentError::Cancelled) {
                        WorkflowStatus::Cancelled
                    } else {
                        WorkflowStatus::Failed
                    });
                    warn!(
                        workflow_id = %workflow_id,
                        stage_id = %stage.id,
                        error = %err,
                        status = %self.status,
                        "Workflow stopped"
                    );
                    self.coordinator.publish(CoordinatorEvent::WorkflowFailed {
                        workflow_id: Some(workflow_id),
                        reason: err.to_string(),
                    });
                    return Err(err);
                }
            }
        }

        self.move_to(WorkflowStatus::Completed);
        info!(workflow_id = %workflow_id, stages = results.len(), "Workflow completed");
        self.coordinator.publish(CoordinatorEvent::WorkflowCompleted { workflow_id });

        Ok(results)
    }

    fn move_to(&mut self, next: WorkflowStatus) {
        if !self.status.can_transition_to(next) {
            debug!(from = %self.status, to = %next, "Unusual workflow status transition");
        }
        self.status = next;
    }

    /// Copy a dispatched task's state back into the current definition
    fn record_task(&mut self, stage_index: usize, task_index: usize, task: &Task) {
        let slot = self
            .current
            .as_mut()
            .and_then(|workflow| workflow.stages.get_mut(stage_index))
            .and_then(|stage| stage.tasks.get_mut(task_index));
        if let Some(slot) = slot {
            *slot = task.clone();
        }
    }

    async fn run_stage(
        &mut self,
        workflow_id: uuid::Uuid,
        stage_index: usize,
        stage: &mut WorkflowStage,
        cancel: &CancelSignal,
    ) -> AgentResult<Vec<AgentResponse>> {
        if cancel.is_cancelled() {
            return Err(AgentError::Cancelled);
        }
        debug!(stage_id = %stage.id, tasks = stage.tasks.len(), "Stage started");

        let mut responses = Vec::new();
        for (task_index, task) in stage.tasks.iter_mut().enumerate() {
            let dispatched = self.coordinator.execute_task_with_cancel(task, cancel).await;
            self.record_task(stage_index, task_index, task);
            responses.extend(dispatched?);
        }

        self.coordinator
            .update_shared_context(stage.results_key(), serde_json::to_value(&responses)?)
            .await;

        let success = self.verifier.verify(stage, &responses);
        info!(
            stage_id = %stage.id,
            name = %stage.name,
            responses = responses.len(),
            success,
            "Stage completed"
        );
        self.verdicts.push(StageVerdict {
            stage_id: stage.id.clone(),
            success,
        });
        self.coordinator.publish(CoordinatorEvent::StageCompleted {
            workflow_id,
            stage_id: stage.id.clone(),
            success,
        });

        Ok(responses)
    }
}
