//! Prompt chains: a fixed sequence of model calls feeding each other.
//!
//! Each step renders its template with `{{name}}` placeholders, filled from
//! the chain's inputs and from the outputs of earlier steps (keyed by step
//! id), and runs at its own temperature.

use std::collections::HashMap;

use tracing::debug;

use crate::error::AgentError;
use crate::gateway::ModelGateway;

/// One call in a prompt chain.
#[derive(Debug, Clone)]
pub struct ChainStep {
    /// Key the step's output is stored under
    pub id: String,
    /// System instruction for this call
    pub system: String,
    /// User prompt with `{{variable}}` placeholders
    pub template: String,
    pub temperature: f32,
}

impl ChainStep {
    pub fn new(id: impl Into<String>, system: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            system: system.into(),
            template: template.into(),
            temperature: 0.0,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Runs steps strictly in order through one gateway.
pub struct PromptChain {
    gateway: ModelGateway,
    steps: Vec<ChainStep>,
}

impl PromptChain {
    pub fn new(gateway: ModelGateway) -> Self {
        Self {
            gateway,
            steps: Vec::new(),
        }
    }

    pub fn step(mut self, step: ChainStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(&self) -> &[ChainStep] {
        &self.steps
    }

    /// Run every step. Returns the inputs plus each step's output under its id.
    pub async fn run(&self, inputs: HashMap<String, String>) -> Result<HashMap<String, String>, AgentError> {
        let mut memory = inputs;

        for step in &self.steps {
            let prompt = render(&step.template, &memory, &step.id)?;
            let gateway = self.gateway.clone().with_temperature(step.temperature);

            debug!(step = %step.id, temperature = step.temperature, "Running chain step");
            let output = gateway
                .complete_prompt(&prompt, &step.system)
                .await?
                .ok_or_else(|| AgentError::EmptyStep(step.id.clone()))?;

            memory.insert(step.id.clone(), output);
        }

        Ok(memory)
    }
}

/// Fill `{{name}}` placeholders from `vars`. Whitespace inside the braces is
/// ignored; an unknown name is an error.
pub fn render(template: &str, vars: &HashMap<String, String>, step_id: &str) -> Result<String, AgentError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };
        let name = rest[start + 2..start + 2 + len].trim();
        let value = vars.get(name).ok_or_else(|| AgentError::MissingVariable {
            step: step_id.to_string(),
            name: name.to_string(),
        })?;

        out.push_str(&rest[..start]);
        out.push_str(value);
        rest = &rest[start + 2 + len + 2..];
    }

    out.push_str(rest);
    Ok(out)
}
