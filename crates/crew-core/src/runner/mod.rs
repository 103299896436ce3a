//! Orchestrator
//!
//! The [`Runner`] owns every configured agent and runs them one at a time,
//! concurrently, or as a context-chaining sequence.

mod task;


pub use task::{
    AgentTask, ExecutionMode, OrchestratedResult, OrchestratedTask, SUMMARY_PREVIEW_CHARS,
    truncate,
};

use crate::agent::{AgentInfo, AgentResult, AgentSpec, EmbeddedAgent};
use crate::config::{Config, DEFAULT_MAX_ITERATIONS, TimeoutConfig};
use crate::error::{CrewError, CrewResult};
use crate::llm::LlmClient;
use crate::sandbox::Workspace;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Name-keyed registry of agents plus the execution modes over them
pub struct Runner {
    agents: RwLock<HashMap<String, Arc<EmbeddedAgent>>>,
    workspace: Arc<Workspace>,
    llm: Arc<dyn LlmClient>,
    timeouts: TimeoutConfig,
    default_max_iterations: usize,
}

impl Runner {
    /// Build the sandbox from a validated configuration and register every
    /// configured agent.
    pub fn new(config: &Config, llm: Arc<dyn LlmClient>) -> CrewResult<Self> {
        let workspace = Workspace::new(&config.workspace)?
            .with_max_file_size(config.limits.max_file_size)
            .with_read_timeout(config.timeouts.file_read)
            .with_shell_timeout(config.timeouts.shell_command);

        let runner = Self {
            agents: RwLock::new(HashMap::new()),
            workspace: Arc::new(workspace),
            llm,
            timeouts: config.timeouts.clone(),
            default_max_iterations: config.limits.max_iterations,
        };

        for agent_config in &config.agents {
            let spec = AgentSpec::from_config(
                agent_config,
                runner.workspace.root(),
                runner.default_max_iterations,
            )
            .map_err(|e| {
                CrewError::config(format!("failed to create agent {}: {}", agent_config.name, e))
            })?;
            runner.register(spec)?;
        }

        Ok(runner)
    }

    /// Runner over an existing workspace with no agents registered
    pub fn with_workspace(workspace: Arc<Workspace>, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            agents: RwLock::new(HashMap::new()),
            workspace,
            llm,
            timeouts: TimeoutConfig::default(),
            default_max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Register an agent; names must be unique
    pub fn register(&self, spec: AgentSpec) -> CrewResult<()> {
        let name = spec.name.clone();
        let agent = EmbeddedAgent::new(spec, Arc::clone(&self.workspace), Arc::clone(&self.llm))?;

        let mut agents = self.agents.write();
        if agents.contains_key(&name) {
            return Err(CrewError::config(format!("duplicate agent name: {}", name)));
        }
        agents.insert(name.clone(), Arc::new(agent));
        info!(agent = %name, "registered agent");
        Ok(())
    }

    pub fn workspace(&self) -> &Arc<Workspace> {
        &self.workspace
    }

    fn get(&self, name: &str) -> Option<Arc<EmbeddedAgent>> {
        self.agents.read().get(name).cloned()
    }

    /// Run a single agent.
    ///
    /// Only an unknown agent name is an error; every other failure is
    /// reported in the returned [`AgentResult`].
    #[instrument(skip(self, input, cancel))]
    pub async fn invoke(
        &self,
        agent: &str,
        input: &str,
        cancel: &CancellationToken,
    ) -> CrewResult<AgentResult> {
        let handle = self
            .get(agent)
            .ok_or_else(|| CrewError::AgentNotFound(agent.to_string()))?;

        info!("invoking agent");
        let result =
            run_with_deadline(handle, input.to_string(), self.timeouts.agent_invoke, cancel.clone())
                .await;
        info!(success = result.success, "agent finished");
        Ok(result)
    }

    /// Run every task concurrently.
    ///
    /// Results are ordered like `tasks`. A failing task fills its own slot
    /// with a failed result. When the batch deadline passes or `cancel`
    /// fires, in-flight tasks are aborted and their slots report why.
    pub async fn invoke_parallel(
        &self,
        tasks: Vec<AgentTask>,
        cancel: &CancellationToken,
    ) -> Vec<AgentResult> {
        if tasks.is_empty() {
            return Vec::new();
        }
        info!(count = tasks.len(), "starting parallel execution");

        let mut slots: Vec<Option<AgentResult>> = vec![None; tasks.len()];
        let mut set = JoinSet::new();
        let batch_cancel = cancel.child_token();

        for (index, task) in tasks.iter().enumerate() {
            match self.get(&task.agent) {
                Some(agent) => {
                    let input = task.input.clone();
                    let limit = self.timeouts.agent_invoke;
                    let token = batch_cancel.clone();
                    set.spawn(async move {
                        (index, run_with_deadline(agent, input, limit, token).await)
                    });
                }
                None => {
                    slots[index] = Some(AgentResult::failure(
                        &task.agent,
                        &task.input,
                        CrewError::AgentNotFound(task.agent.clone()).to_string(),
                    ));
                }
            }
        }

        let deadline = tokio::time::sleep(self.timeouts.parallel_total);
        tokio::pin!(deadline);

        let interrupted = loop {
            tokio::select! {
                joined = set.join_next() => match joined {
                    Some(Ok((index, result))) => slots[index] = Some(result),
                    Some(Err(error)) => warn!(%error, "agent task did not complete"),
                    None => break None,
                },
                _ = &mut deadline => {
                    break Some(CrewError::timeout(self.timeouts.parallel_total).to_string());
                }
                _ = cancel.cancelled() => break Some(CrewError::Cancelled.to_string()),
            }
        };

        if let Some(reason) = &interrupted {
            warn!(%reason, "parallel batch interrupted");
            batch_cancel.cancel();
            set.abort_all();
        }

        // Slots still empty were aborted or panicked
        let results: Vec<AgentResult> = slots
            .into_iter()
            .zip(&tasks)
            .map(|(slot, task)| {
                slot.unwrap_or_else(|| {
                    AgentResult::failure(
                        &task.agent,
                        &task.input,
                        interrupted.as_deref().unwrap_or("agent task did not complete"),
                    )
                })
            })
            .collect();

        let succeeded = results.iter().filter(|r| r.success).count();
        info!(succeeded, total = results.len(), "parallel execution completed");
        results
    }

    /// Run tasks one at a time, chaining successful outputs into later inputs.
    ///
    /// After the first success, each input becomes
    /// `Previous context:\n<outputs>\n\nCurrent task:\n<input>`. Failures are
    /// recorded and never added to the context.
    pub async fn invoke_sequential(
        &self,
        tasks: Vec<AgentTask>,
        cancel: &CancellationToken,
    ) -> Vec<AgentResult> {
        info!(count = tasks.len(), "starting sequential execution");

        let mut results = Vec::with_capacity(tasks.len());
        let mut context = String::new();

        for (index, task) in tasks.into_iter().enumerate() {
            if cancel.is_cancelled() {
                results.push(AgentResult::failure(
                    &task.agent,
                    &task.input,
                    CrewError::Cancelled.to_string(),
                ));
                continue;
            }

            let input = if index > 0 && !context.is_empty() {
                format!(
                    "Previous context:\n{}\n\nCurrent task:\n{}",
                    context, task.input
                )
            } else {
                task.input.clone()
            };

            let result = match self.invoke(&task.agent, &input, cancel).await {
                Ok(result) => result,
                Err(error) => AgentResult::failure(&task.agent, &task.input, error.to_string()),
            };

            if result.success {
                context.push_str(&format!("\n[{}]: {}\n", task.agent, result.output));
            }
            results.push(result);
        }

        results
    }

    /// Run a named batch in the requested mode
    #[instrument(skip(self, task, cancel), fields(task = %task.name, mode = %task.mode))]
    pub async fn execute_orchestrated(
        &self,
        task: OrchestratedTask,
        cancel: &CancellationToken,
    ) -> OrchestratedResult {
        info!(agents = ?task.agents, "executing orchestrated task");
        let tasks = task.agent_tasks();
        let results = match task.mode {
            ExecutionMode::Parallel => self.invoke_parallel(tasks, cancel).await,
            ExecutionMode::Sequential => self.invoke_sequential(tasks, cancel).await,
        };

        OrchestratedResult {
            task: task.name,
            mode: task.mode,
            results,
        }
    }

    /// Registered agent names, sorted
    pub fn list_agents(&self) -> Vec<String> {
        let mut names: Vec<String> = self.agents.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn agent_info(&self, name: &str) -> CrewResult<AgentInfo> {
        self.get(name)
            .map(|agent| agent.spec().info())
            .ok_or_else(|| CrewError::AgentNotFound(name.to_string()))
    }

    /// Name and description of every agent, sorted by name
    pub fn list_agent_info(&self) -> Vec<AgentInfo> {
        let mut infos: Vec<AgentInfo> = self
            .agents
            .read()
            .values()
            .map(|agent| agent.spec().info())
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }
}

/// Invoke `agent`, turning an expired deadline into a failed result
async fn run_with_deadline(
    agent: Arc<EmbeddedAgent>,
    input: String,
    limit: Duration,
    cancel: CancellationToken,
) -> AgentResult {
    match tokio::time::timeout(limit, agent.invoke(&input, &cancel)).await {
        Ok(result) => result,
        Err(_) => {
            warn!(agent = %agent.name(), ?limit, "agent invocation timed out");
            AgentResult::failure(
                agent.name(),
                &input,
                CrewError::timeout(limit).to_string(),
            )
        }
    }
}
