//! Name-keyed table of tools available to a run.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use regex::Regex;

use super::tool::{AgentTool, ToolExecutor};
use super::types::ToolDescriptor;
use crate::error::FerryError;
use crate::types::{ToolError, ToolErrorKind};

fn tool_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("static pattern"))
}

/// A resolved registry entry.
#[derive(Clone, Copy)]
pub struct ResolvedTool<'a> {
    pub descriptor: &'a ToolDescriptor,
    pub executor: &'a Arc<dyn ToolExecutor>,
}

impl std::fmt::Debug for ResolvedTool<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedTool")
            .field("descriptor", self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Lookup table from tool name to descriptor and executor.
///
/// Registration needs `&mut self`; share the finished registry behind an
/// `Arc` so nothing can change the tool surface while a run is in flight.
#[derive(Default)]
pub struct ToolRegistry {
    descriptors: Vec<ToolDescriptor>,
    executors: Vec<Arc<dyn ToolExecutor>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under `descriptor.name`.
    pub fn register(
        &mut self,
        descriptor: ToolDescriptor,
        executor: Arc<dyn ToolExecutor>,
    ) -> Result<(), FerryError> {
        if !tool_name_pattern().is_match(&descriptor.name) {
            return Err(FerryError::InvalidToolName(descriptor.name));
        }
        if self.index.contains_key(&descriptor.name) {
            return Err(FerryError::DuplicateTool(descriptor.name));
        }
        tracing::debug!(tool = %descriptor.name, "tool registered");
        self.index.insert(descriptor.name.clone(), self.descriptors.len());
        self.descriptors.push(descriptor);
        self.executors.push(executor);
        Ok(())
    }

    pub fn register_tool(&mut self, tool: AgentTool) -> Result<(), FerryError> {
        let (descriptor, executor) = tool.into_parts();
        self.register(descriptor, executor)
    }

    /// Builder-style registration.
    pub fn with_tool(mut self, tool: AgentTool) -> Result<Self, FerryError> {
        self.register_tool(tool)?;
        Ok(self)
    }

    /// Look up a tool. A miss is an `UnknownTool` error value the caller
    /// can hand back to the model.
    pub fn resolve(&self, name: &str) -> Result<ResolvedTool<'_>, ToolError> {
        self.index
            .get(name)
            .map(|&slot| ResolvedTool {
                descriptor: &self.descriptors[slot],
                executor: &self.executors[slot],
            })
            .ok_or_else(|| {
                ToolError::new(
                    ToolErrorKind::UnknownTool,
                    format!("Tool '{name}' not found"),
                )
            })
    }

    /// Every descriptor, in registration order.
    pub fn descriptors(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|d| d.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names().collect::<Vec<_>>())
            .finish()
    }
}
