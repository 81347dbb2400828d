//! The modeler: diagram state plus the command pipeline that mutates it.
//!
//! ```text
//!   execute(ctx)
//!     canExecute listeners ──(veto)──► None
//!     handler.pre_execute   (may run nested commands)
//!     preExecute listeners
//!     ┌ execute listeners
//!     │ handler.execute      → logged
//!     └ executed listeners
//!     handler.post_execute  (may run nested commands)
//!     postExecute listeners
//! ```
//!
//! The boxed part is atomic: starting another command from inside it is an
//! error. Nested commands join the transaction of the top-level command and
//! are undone together with it.

use std::rc::Rc;

use bpmn_core::{
    BpmnType, Canvas, Element, ElementIndex, Moddle, ObjectIndex, props,
};

use crate::behaviors;
use crate::command::{CommandContext, CommandKind};
use crate::command_stack::{Action, CommandStack};
use crate::config::ModelerConfig;
use crate::element_factory::ElementFactory;
use crate::error::ModelingError;
use crate::handlers;
use crate::interceptor::{CommandEvent, CommandInterceptor, Hook, MoveStart};
use crate::modeling::Modeling;
use crate::rules::{BpmnRules, Rules};
use crate::updater::BpmnUpdater;

pub struct Modeler {
    pub canvas: Canvas,
    pub moddle: Moddle,
    pub config: ModelerConfig,
    rules: Rc<dyn Rules>,
    interceptor: CommandInterceptor,
    stack: CommandStack,
}

impl Modeler {
    /// A modeler with an empty process diagram and all behaviors installed.
    ///
    /// # Panics
    ///
    /// Never in practice: the built-in listeners always name at least one
    /// command, the only way registration can fail.
    pub fn new() -> Self {
        Self::with_config(ModelerConfig::default())
            .expect("built-in listeners register on non-empty command lists")
    }

    pub fn with_config(config: ModelerConfig) -> Result<Self, ModelingError> {
        let mut modeler = Self::bare(config);
        BpmnUpdater::install(&mut modeler.interceptor)?;
        behaviors::install(&mut modeler.interceptor)?;
        Ok(modeler)
    }

    /// A modeler without the updater or any behavior: commands only touch
    /// the graphical model.
    pub fn bare(config: ModelerConfig) -> Self {
        let mut canvas = Canvas::new();
        let mut moddle = Moddle::new();

        let process_id = moddle.ids.next_prefixed(BpmnType::Process.id_prefix(), None);
        let process = moddle.create(BpmnType::Process, process_id);
        let definitions = moddle.definitions;
        moddle.add_to(definitions, props::ROOT_ELEMENTS, process, None);
        moddle.get_mut(process).parent = Some(definitions);
        let plane = moddle.plane;
        moddle.link_di(process, plane);

        let root = canvas.create(Element {
            business_object: Some(process),
            ..Element::root(process_id)
        });
        canvas.set_root_element(root);

        Self {
            canvas,
            moddle,
            interceptor: CommandInterceptor::new(config.default_priority),
            stack: CommandStack::new(config.max_undo_depth),
            rules: Rc::new(BpmnRules),
            config,
        }
    }

    /// Replace the rule set.
    pub fn with_rules(mut self, rules: impl Rules + 'static) -> Self {
        self.rules = Rc::new(rules);
        self
    }

    pub fn rules(&self) -> Rc<dyn Rules> {
        self.rules.clone()
    }

    pub fn interceptor(&mut self) -> &mut CommandInterceptor {
        &mut self.interceptor
    }

    pub fn command_stack(&self) -> &CommandStack {
        &self.stack
    }

    pub fn modeling(&mut self) -> Modeling<'_> {
        Modeling::new(self)
    }

    pub fn element_factory(&mut self) -> ElementFactory<'_> {
        ElementFactory::new(self)
    }

    // ─── Lookups ─────────────────────────────────────────────────────────

    pub fn element(&self, idx: ElementIndex) -> &Element {
        self.canvas.get(idx)
    }

    /// Look up a registered element by id.
    ///
    /// # Errors
    /// Returns [`ModelingError::ElementNotFound`] for unknown ids.
    pub fn element_by_id(&self, id: &str) -> Result<ElementIndex, ModelingError> {
        self.canvas
            .find(id)
            .ok_or_else(|| ModelingError::ElementNotFound(id.to_string()))
    }

    pub fn root(&self) -> ElementIndex {
        self.canvas.root()
    }

    pub fn bo(&self, idx: ElementIndex) -> Option<ObjectIndex> {
        self.canvas.get(idx).business_object
    }

    pub fn bpmn_type(&self, idx: ElementIndex) -> Option<BpmnType> {
        self.bo(idx).map(|bo| self.moddle.type_of(bo))
    }

    /// Whether the element's business object type satisfies `pred`.
    pub fn is(&self, idx: ElementIndex, pred: impl Fn(BpmnType) -> bool) -> bool {
        self.bpmn_type(idx).is_some_and(pred)
    }

    /// Whether the element's business object is exactly `bpmn_type`.
    pub fn is_type(&self, idx: ElementIndex, bpmn_type: BpmnType) -> bool {
        self.bpmn_type(idx) == Some(bpmn_type)
    }

    /// Collect the shapes of an interactive move: listeners add attachers
    /// and labels that travel along.
    pub fn start_move(&self, shapes: &[ElementIndex]) -> MoveStart {
        let mut event = MoveStart {
            shapes: shapes.to_vec(),
            validated_shapes: shapes.to_vec(),
        };
        for listener in self.interceptor.move_start_listeners() {
            listener(self, &mut event);
        }
        event
    }

    // ─── Execution ───────────────────────────────────────────────────────

    pub fn can_undo(&self) -> bool {
        self.stack.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.stack.can_redo()
    }

    /// Drop the undo and redo history.
    ///
    /// # Errors
    /// Fails while a command is executing.
    pub fn clear(&mut self) -> Result<(), ModelingError> {
        if self.stack.is_executing() {
            return Err(ModelingError::InvalidOperation(
                "cannot clear while executing".into(),
            ));
        }
        self.stack.clear();
        Ok(())
    }

    pub(crate) fn transaction(&self) -> u64 {
        self.stack.transaction()
    }

    /// Ask the `canExecute` listeners (and the handler) about a command.
    ///
    /// # Errors
    /// Propagates listener errors.
    pub fn can_execute(&mut self, context: &CommandContext) -> Result<bool, ModelingError> {
        let mut context = context.clone();
        self.fire_can_execute(&mut context)
    }

    /// Execute a command. Returns the final context, or `None` when a
    /// `canExecute` listener vetoed it.
    ///
    /// # Errors
    /// Returns [`ModelingError::InvalidOperation`] when called from inside an
    /// execute or revert phase, and propagates handler and listener errors.
    /// A failing top-level command is rolled back first (see
    /// [`ModelerConfig::rollback_on_error`]).
    pub fn execute(
        &mut self,
        context: impl Into<CommandContext>,
    ) -> Result<Option<CommandContext>, ModelingError> {
        let mut context = context.into();
        let command = context.kind();
        if self.stack.is_atomic() {
            return Err(ModelingError::InvalidOperation(format!(
                "illegal invocation of <{command}> in execute or revert phase"
            )));
        }

        let top_level = self.stack.begin();
        if top_level {
            log::debug!("execute {command}");
        } else {
            log::trace!("execute nested {command}");
        }

        let result = self.internal_execute(&mut context);
        let transaction = self.stack.end();

        match result {
            Ok(true) => {
                if top_level {
                    self.stack.clear_redo();
                    self.stack.trim();
                }
                Ok(Some(context))
            }
            Ok(false) => {
                log::debug!("{command} vetoed");
                Ok(None)
            }
            Err(err) => {
                if top_level {
                    self.rollback(transaction, &err);
                }
                Err(err)
            }
        }
    }

    fn internal_execute(&mut self, context: &mut CommandContext) -> Result<bool, ModelingError> {
        let command = context.kind();
        if !self.fire_can_execute(context)? {
            return Ok(false);
        }

        handlers::pre_execute(self, context)?;
        self.fire(Hook::PreExecute, context)?;

        self.stack.enter_atomic();
        let slot = self.execute_phase(context);
        self.stack.leave_atomic();
        let slot = slot?;

        handlers::post_execute(self, context)?;
        self.fire(Hook::PostExecute, context)?;

        self.stack.update(slot, context);
        log::trace!("{command} done");
        Ok(true)
    }

    fn execute_phase(&mut self, context: &mut CommandContext) -> Result<usize, ModelingError> {
        self.fire(Hook::Execute, context)?;
        handlers::execute(self, context)?;
        let slot = self.stack.push(context.kind(), context.clone());
        self.fire(Hook::Executed, context)?;
        self.stack.update(slot, context);
        Ok(slot)
    }

    fn revert_phase(&mut self, context: &mut CommandContext) -> Result<(), ModelingError> {
        self.fire(Hook::Revert, context)?;
        handlers::revert(self, context)?;
        self.fire(Hook::Reverted, context)
    }

    fn rollback(&mut self, transaction: u64, err: &ModelingError) {
        if !self.config.rollback_on_error {
            // the partial transaction stays undoable
            if self.stack.has_transaction(transaction) {
                self.stack.clear_redo();
            }
            return;
        }
        let actions = self.stack.take_transaction(transaction);
        log::warn!("rolling back {} action(s): {err}", actions.len());
        self.stack.enter_atomic();
        for mut action in actions {
            if let Err(revert_err) = self.revert_phase(&mut action.context) {
                log::warn!("rollback of {} failed: {revert_err}", action.command);
            }
        }
        self.stack.leave_atomic();
    }

    /// Undo the newest transaction. Returns its top-level command.
    ///
    /// # Errors
    /// Fails while a command is executing, and propagates revert errors.
    pub fn undo(&mut self) -> Result<Option<CommandKind>, ModelingError> {
        if self.stack.is_executing() {
            return Err(ModelingError::InvalidOperation(
                "cannot undo while executing".into(),
            ));
        }
        let actions = self.stack.pop_undo();
        let top = top_level_command(&actions);
        if let Some(command) = top {
            log::debug!("undo {command}");
        }

        self.stack.enter_atomic();
        let mut result = Ok(());
        for mut action in actions {
            result = self.revert_phase(&mut action.context);
            self.stack.push_undone(action);
            if result.is_err() {
                break;
            }
        }
        self.stack.leave_atomic();
        result.map(|()| top)
    }

    /// Redo the most recently undone transaction. Returns its top-level command.
    ///
    /// # Errors
    /// Fails while a command is executing, and propagates execute errors.
    pub fn redo(&mut self) -> Result<Option<CommandKind>, ModelingError> {
        if self.stack.is_executing() {
            return Err(ModelingError::InvalidOperation(
                "cannot redo while executing".into(),
            ));
        }
        let actions = self.stack.pop_redo();
        let top = top_level_command(&actions);
        if let Some(command) = top {
            log::debug!("redo {command}");
        }

        self.stack.enter_atomic();
        let mut result = Ok(());
        for mut action in actions {
            result = self.redo_action(&mut action.context);
            self.stack.push_redone(action);
            if result.is_err() {
                break;
            }
        }
        self.stack.leave_atomic();
        result.map(|()| top)
    }

    fn redo_action(&mut self, context: &mut CommandContext) -> Result<(), ModelingError> {
        self.fire(Hook::Execute, context)?;
        handlers::execute(self, context)?;
        self.fire(Hook::Executed, context)
    }

    // ─── Firing ──────────────────────────────────────────────────────────

    fn fire(&mut self, hook: Hook, context: &mut CommandContext) -> Result<(), ModelingError> {
        let command = context.kind();
        let listeners = self.interceptor.listeners(command, hook);
        if listeners.is_empty() {
            return Ok(());
        }
        log::trace!("{command}.{hook}: {} listener(s)", listeners.len());
        let mut event = CommandEvent {
            command,
            hook,
            context,
            allowed: None,
        };
        for listener in listeners {
            listener(self, &mut event)?;
        }
        Ok(())
    }

    fn fire_can_execute(&mut self, context: &mut CommandContext) -> Result<bool, ModelingError> {
        let command = context.kind();
        let listeners = self.interceptor.listeners(command, Hook::CanExecute);
        let mut event = CommandEvent {
            command,
            hook: Hook::CanExecute,
            context,
            allowed: None,
        };
        for listener in listeners {
            listener(self, &mut event)?;
            if let Some(allowed) = event.allowed {
                return Ok(allowed);
            }
        }
        Ok(handlers::can_execute(self, event.context))
    }
}

impl Default for Modeler {
    fn default() -> Self {
        Self::new()
    }
}

fn top_level_command(actions: &[Action]) -> Option<CommandKind> {
    actions
        .iter()
        .find(|a| a.top_level)
        .or(actions.first())
        .map(|a| a.command)
}
