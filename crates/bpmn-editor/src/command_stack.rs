//! Undo/Redo log.
//!
//! Every executed command, nested ones included, is logged as an
//! [`Action`] tagged with the id of the top-level transaction it ran in.
//! Undo reverts all actions of the newest transaction in reverse order;
//! redo replays them in their original order.
//!
//! The stack only stores actions. Running them (firing interceptors and
//! calling handlers) is the job of the [`Modeler`](crate::Modeler).

use crate::command::{CommandContext, CommandKind};

/// One executed command with its final context.
#[derive(Debug, Clone)]
pub struct Action {
    pub command: CommandKind,
    pub context: CommandContext,
    pub transaction: u64,
    /// Whether this is the command that opened the transaction.
    pub top_level: bool,
}

/// Manages undo/redo stacks with transaction grouping for nested commands.
#[derive(Debug)]
pub struct CommandStack {
    undo_stack: Vec<Action>,
    redo_stack: Vec<Action>,
    /// Maximum undo depth, in transactions.
    max_depth: usize,
    /// Nesting depth of the running execution (0 = idle).
    depth: usize,
    /// Transaction of the running execution.
    transaction: u64,
    next_transaction: u64,
    /// Nesting of execute/revert phases, during which new commands are illegal.
    atomic: usize,
}

impl CommandStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth,
            depth: 0,
            transaction: 0,
            next_transaction: 1,
            atomic: 0,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undoable transactions.
    pub fn undo_depth(&self) -> usize {
        count_transactions(&self.undo_stack)
    }

    pub fn redo_depth(&self) -> usize {
        count_transactions(&self.redo_stack)
    }

    /// The logged actions, oldest first.
    pub fn actions(&self) -> &[Action] {
        &self.undo_stack
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    // ─── Transactions ────────────────────────────────────────────────────

    pub(crate) fn is_executing(&self) -> bool {
        self.depth > 0
    }

    pub(crate) fn is_atomic(&self) -> bool {
        self.atomic > 0
    }

    pub(crate) fn enter_atomic(&mut self) {
        self.atomic += 1;
    }

    pub(crate) fn leave_atomic(&mut self) {
        self.atomic = self.atomic.saturating_sub(1);
    }

    /// Transaction of the running (or last) execution.
    pub(crate) fn transaction(&self) -> u64 {
        self.transaction
    }

    /// Whether `transaction` logged any action.
    pub(crate) fn has_transaction(&self, transaction: u64) -> bool {
        self.undo_stack.iter().any(|a| a.transaction == transaction)
    }

    /// Forget undone transactions once a new one has been logged.
    pub(crate) fn clear_redo(&mut self) {
        self.redo_stack.clear();
    }

    /// Enter a command. Returns `true` when it opens a new transaction.
    pub(crate) fn begin(&mut self) -> bool {
        self.depth += 1;
        if self.depth == 1 {
            self.transaction = self.next_transaction;
            self.next_transaction += 1;
            return true;
        }
        false
    }

    /// Leave a command, returning the transaction id.
    pub(crate) fn end(&mut self) -> u64 {
        self.depth = self.depth.saturating_sub(1);
        self.transaction
    }

    // ─── Log ─────────────────────────────────────────────────────────────

    /// Reserve a log slot for a freshly executed command.
    pub(crate) fn push(&mut self, command: CommandKind, context: CommandContext) -> usize {
        self.undo_stack.push(Action {
            command,
            context,
            transaction: self.transaction,
            top_level: self.depth == 1,
        });
        self.undo_stack.len() - 1
    }

    /// Store the final context of a logged command.
    pub(crate) fn update(&mut self, slot: usize, context: &CommandContext) {
        if let Some(action) = self.undo_stack.get_mut(slot) {
            action.context = context.clone();
        }
    }

    /// Drop the oldest transactions beyond the maximum depth.
    pub(crate) fn trim(&mut self) {
        while count_transactions(&self.undo_stack) > self.max_depth {
            let oldest = self.undo_stack[0].transaction;
            self.undo_stack.retain(|a| a.transaction != oldest);
        }
    }

    /// Remove the newest transaction from the undo stack, newest action first.
    pub(crate) fn pop_undo(&mut self) -> Vec<Action> {
        let Some(transaction) = self.undo_stack.last().map(|a| a.transaction) else {
            return Vec::new();
        };
        let mut actions = Vec::new();
        while self
            .undo_stack
            .last()
            .is_some_and(|a| a.transaction == transaction)
        {
            actions.extend(self.undo_stack.pop());
        }
        actions
    }

    /// Remove the most recently undone transaction, oldest action first.
    pub(crate) fn pop_redo(&mut self) -> Vec<Action> {
        let Some(transaction) = self.redo_stack.last().map(|a| a.transaction) else {
            return Vec::new();
        };
        let mut actions = Vec::new();
        while self
            .redo_stack
            .last()
            .is_some_and(|a| a.transaction == transaction)
        {
            actions.extend(self.redo_stack.pop());
        }
        actions
    }

    pub(crate) fn push_undone(&mut self, action: Action) {
        self.redo_stack.push(action);
    }

    pub(crate) fn push_redone(&mut self, action: Action) {
        self.undo_stack.push(action);
    }

    /// Remove every action of `transaction`, newest first (rollback).
    pub(crate) fn take_transaction(&mut self, transaction: u64) -> Vec<Action> {
        let mut taken = Vec::new();
        self.undo_stack.retain(|a| {
            if a.transaction == transaction {
                taken.push(a.clone());
                false
            } else {
                true
            }
        });
        taken.reverse();
        taken
    }
}

fn count_transactions(actions: &[Action]) -> usize {
    let mut count = 0;
    let mut last = None;
    for action in actions {
        if last != Some(action.transaction) {
            count += 1;
            last = Some(action.transaction);
        }
    }
    count
}
