//! Command interceptors.
//!
//! Listeners hook into the life cycle of commands at seven points:
//!
//! ```text
//! canExecute → preExecute → execute → executed → postExecute
//!                                      revert  → reverted
//! ```
//!
//! A listener is scoped to a set of commands or global (all commands).
//! When a hook fires, scoped listeners run before global ones; within each
//! group higher priorities run first and equal priorities keep their
//! registration order.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use bpmn_core::ElementIndex;

use crate::command::{CommandContext, CommandKind};
use crate::error::ModelingError;
use crate::modeler::Modeler;

// ─── Hooks ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    CanExecute,
    PreExecute,
    Execute,
    Executed,
    PostExecute,
    Revert,
    Reverted,
}

impl Hook {
    pub const ALL: [Hook; 7] = [
        Hook::CanExecute,
        Hook::PreExecute,
        Hook::Execute,
        Hook::Executed,
        Hook::PostExecute,
        Hook::Revert,
        Hook::Reverted,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Hook::CanExecute => "canExecute",
            Hook::PreExecute => "preExecute",
            Hook::Execute => "execute",
            Hook::Executed => "executed",
            Hook::PostExecute => "postExecute",
            Hook::Revert => "revert",
            Hook::Reverted => "reverted",
        }
    }
}

impl FromStr for Hook {
    type Err = ModelingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hook::ALL
            .into_iter()
            .find(|h| h.name() == s)
            .ok_or_else(|| ModelingError::InvalidArgument(format!("unknown hook <{s}>")))
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Events ──────────────────────────────────────────────────────────────

/// What a listener sees when its hook fires.
pub struct CommandEvent<'a> {
    pub command: CommandKind,
    pub hook: Hook,
    pub context: &'a mut CommandContext,
    /// `canExecute` listeners decide by setting this. The first listener
    /// that decides wins; an undecided event falls back to the handler.
    pub allowed: Option<bool>,
}

pub type Listener = Rc<dyn Fn(&mut Modeler, &mut CommandEvent<'_>) -> Result<(), ModelingError>>;

/// The shapes of an interactive move, before the move command is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveStart {
    /// Everything that moves.
    pub shapes: Vec<ElementIndex>,
    /// The subset whose drop target must be validated.
    pub validated_shapes: Vec<ElementIndex>,
}

pub type MoveStartListener = Rc<dyn Fn(&Modeler, &mut MoveStart)>;

/// Which commands a listener is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    All,
    Only(Vec<CommandKind>),
}

impl From<CommandKind> for Commands {
    fn from(kind: CommandKind) -> Self {
        Commands::Only(vec![kind])
    }
}

impl<const N: usize> From<[CommandKind; N]> for Commands {
    fn from(kinds: [CommandKind; N]) -> Self {
        Commands::Only(kinds.to_vec())
    }
}

impl From<&[CommandKind]> for Commands {
    fn from(kinds: &[CommandKind]) -> Self {
        Commands::Only(kinds.to_vec())
    }
}

impl From<Vec<CommandKind>> for Commands {
    fn from(kinds: Vec<CommandKind>) -> Self {
        Commands::Only(kinds)
    }
}

// ─── Registry ────────────────────────────────────────────────────────────

#[derive(Clone)]
struct Registration {
    priority: i32,
    listener: Listener,
}

/// Registry of command listeners, owned by the [`Modeler`].
#[derive(Clone)]
pub struct CommandInterceptor {
    default_priority: i32,
    listeners: HashMap<(Option<CommandKind>, Hook), Vec<Registration>>,
    move_start: Vec<(i32, MoveStartListener)>,
}

impl CommandInterceptor {
    pub fn new(default_priority: i32) -> Self {
        Self {
            default_priority,
            listeners: HashMap::new(),
            move_start: Vec::new(),
        }
    }

    /// Register a listener that receives the full [`CommandEvent`].
    ///
    /// # Errors
    /// Returns [`ModelingError::InvalidArgument`] for an empty command list.
    pub fn on<F>(
        &mut self,
        commands: impl Into<Commands>,
        hook: Hook,
        priority: Option<i32>,
        listener: F,
    ) -> Result<(), ModelingError>
    where
        F: Fn(&mut Modeler, &mut CommandEvent<'_>) -> Result<(), ModelingError> + 'static,
    {
        let priority = priority.unwrap_or(self.default_priority);
        let listener: Listener = Rc::new(listener);
        match commands.into() {
            Commands::All => self.insert(None, hook, priority, listener),
            Commands::Only(kinds) if kinds.is_empty() => {
                return Err(ModelingError::InvalidArgument(
                    "no commands to listen to".into(),
                ));
            }
            Commands::Only(kinds) => {
                for kind in kinds {
                    self.insert(Some(kind), hook, priority, listener.clone());
                }
            }
        }
        Ok(())
    }

    /// Register by command and hook names, e.g. `["shape.create"]`, `"postExecute"`.
    /// An empty name list registers a global listener.
    ///
    /// # Errors
    /// Returns [`ModelingError::InvalidArgument`] for unknown names.
    pub fn on_named<F>(
        &mut self,
        commands: &[&str],
        hook: &str,
        priority: Option<i32>,
        listener: F,
    ) -> Result<(), ModelingError>
    where
        F: Fn(&mut Modeler, &mut CommandEvent<'_>) -> Result<(), ModelingError> + 'static,
    {
        let hook: Hook = hook.parse()?;
        let commands = if commands.is_empty() {
            Commands::All
        } else {
            Commands::Only(
                commands
                    .iter()
                    .map(|name| name.parse())
                    .collect::<Result<Vec<CommandKind>, _>>()?,
            )
        };
        self.on(commands, hook, priority, listener)
    }

    /// Register a listener that only receives the context and command name.
    ///
    /// # Errors
    /// Returns [`ModelingError::InvalidArgument`] for an empty command list.
    pub fn on_context<F>(
        &mut self,
        commands: impl Into<Commands>,
        hook: Hook,
        priority: Option<i32>,
        listener: F,
    ) -> Result<(), ModelingError>
    where
        F: Fn(&mut Modeler, &mut CommandContext, CommandKind) -> Result<(), ModelingError>
            + 'static,
    {
        self.on(commands, hook, priority, move |modeler, event| {
            listener(modeler, event.context, event.command)
        })
    }

    /// Register a `canExecute` predicate. Returning `Some(allowed)` decides.
    ///
    /// # Errors
    /// Returns [`ModelingError::InvalidArgument`] for an empty command list.
    pub fn can_execute<F>(
        &mut self,
        commands: impl Into<Commands>,
        priority: Option<i32>,
        predicate: F,
    ) -> Result<(), ModelingError>
    where
        F: Fn(&Modeler, &CommandContext) -> Option<bool> + 'static,
    {
        self.on(commands, Hook::CanExecute, priority, move |modeler, event| {
            if event.allowed.is_none() {
                event.allowed = predicate(modeler, event.context);
            }
            Ok(())
        })
    }

    /// Register a listener for interactive move starts.
    pub fn on_move_start<F>(&mut self, priority: Option<i32>, listener: F)
    where
        F: Fn(&Modeler, &mut MoveStart) + 'static,
    {
        let priority = priority.unwrap_or(self.default_priority);
        let at = self
            .move_start
            .iter()
            .position(|(p, _)| *p < priority)
            .unwrap_or(self.move_start.len());
        self.move_start.insert(at, (priority, Rc::new(listener)));
    }

    fn insert(&mut self, kind: Option<CommandKind>, hook: Hook, priority: i32, listener: Listener) {
        let list = self.listeners.entry((kind, hook)).or_default();
        // after every registration of equal or higher priority
        let at = list
            .iter()
            .position(|r| r.priority < priority)
            .unwrap_or(list.len());
        list.insert(at, Registration { priority, listener });
    }

    /// Listeners to run for `command` at `hook`: scoped first, then global.
    pub(crate) fn listeners(&self, command: CommandKind, hook: Hook) -> Vec<Listener> {
        let scoped = self.listeners.get(&(Some(command), hook));
        let global = self.listeners.get(&(None, hook));
        scoped
            .into_iter()
            .chain(global)
            .flatten()
            .map(|r| r.listener.clone())
            .collect()
    }

    pub(crate) fn move_start_listeners(&self) -> Vec<MoveStartListener> {
        self.move_start.iter().map(|(_, l)| l.clone()).collect()
    }
}

impl fmt::Debug for CommandInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count: usize = self.listeners.values().map(Vec::len).sum();
        f.debug_struct("CommandInterceptor")
            .field("default_priority", &self.default_priority)
            .field("listeners", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut Modeler, _: &mut CommandEvent<'_>) -> Result<(), ModelingError> {
        Ok(())
    }

    #[test]
    fn hook_names_parse() {
        for hook in Hook::ALL {
            assert_eq!(hook.name().parse::<Hook>().unwrap(), hook);
        }
        assert!("afterExecute".parse::<Hook>().is_err());
    }

    #[test]
    fn empty_command_list_is_rejected() {
        let mut interceptor = CommandInterceptor::new(1000);
        let result = interceptor.on(Vec::<CommandKind>::new(), Hook::Execute, None, noop);
        assert!(matches!(result, Err(ModelingError::InvalidArgument(_))));
    }

    #[test]
    fn unknown_names_are_rejected() {
        let mut interceptor = CommandInterceptor::new(1000);
        assert!(
            interceptor
                .on_named(&["shape.teleport"], "execute", None, noop)
                .is_err()
        );
        assert!(
            interceptor
                .on_named(&["shape.create"], "beforeExecute", None, noop)
                .is_err()
        );
        assert!(
            interceptor
                .on_named(&["shape.create"], "execute", None, noop)
                .is_ok()
        );
    }

    #[test]
    fn scoped_listeners_precede_global_ones() {
        let mut interceptor = CommandInterceptor::new(1000);
        interceptor.on(Commands::All, Hook::Execute, Some(5000), noop).unwrap();
        interceptor
            .on(CommandKind::ShapeCreate, Hook::Execute, Some(1), noop)
            .unwrap();
        let listeners = interceptor.listeners(CommandKind::ShapeCreate, Hook::Execute);
        assert_eq!(listeners.len(), 2);
        assert!(interceptor.listeners(CommandKind::ShapeMove, Hook::Execute).len() == 1);
    }
}
