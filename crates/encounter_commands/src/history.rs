//! Undo/Redo history with transaction support.
//!
//! The history owns executed commands and drives their undo and redo in
//! stack order. Commands can be grouped into transactions so a multi-step
//! user action becomes a single entry.

use async_trait::async_trait;

use crate::command::{Command, CommandResult};
use crate::config::EditorConfig;

/// A group of commands undone and redone as one unit.
pub struct Transaction {
    pub name: String,
    pub commands: Vec<Box<dyn Command>>,
}

impl Transaction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, cmd: Box<dyn Command>) {
        self.commands.push(cmd);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Undo/redo history stack.
pub struct UndoHistory {
    /// Commands that can be undone
    undo_stack: Vec<Box<dyn Command>>,
    /// Commands that can be redone
    redo_stack: Vec<Box<dyn Command>>,
    max_size: usize,
    current_transaction: Option<Transaction>,
    /// Whether history has changed since last save
    dirty: bool,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoHistory {
    /// Default maximum history size.
    pub const DEFAULT_MAX_SIZE: usize = 100;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_MAX_SIZE)
    }

    pub fn with_capacity(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size,
            current_transaction: None,
            dirty: false,
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::with_capacity(config.history_limit)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Description of the next command to undo.
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|c| c.description())
    }

    /// Description of the next command to redo.
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|c| c.description())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark as saved (clears dirty flag).
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Begin a new transaction.
    /// Commands executed or pushed until commit are grouped as one entry.
    pub fn begin_transaction(&mut self, name: impl Into<String>) {
        if self.current_transaction.is_some() {
            log::warn!("Beginning transaction while one is already open");
        }
        self.current_transaction = Some(Transaction::new(name));
    }

    pub fn commit_transaction(&mut self) {
        if let Some(transaction) = self.current_transaction.take() {
            if !transaction.is_empty() {
                self.push_command(Box::new(TransactionCommand {
                    transaction,
                    undone: 0,
                }));
            }
        }
    }

    /// Drop the open transaction.
    ///
    /// Its commands have already reached the store; they are forgotten, not
    /// reverted.
    pub fn rollback_transaction(&mut self) {
        if let Some(transaction) = self.current_transaction.take() {
            log::warn!(
                "Rolled back transaction '{}' with {} executed command(s)",
                transaction.name,
                transaction.commands.len()
            );
        }
    }

    pub fn in_transaction(&self) -> bool {
        self.current_transaction.is_some()
    }

    /// Execute a command and record it.
    ///
    /// A command whose execute fails is not recorded.
    pub async fn execute(&mut self, mut cmd: Box<dyn Command>) -> CommandResult {
        if let Err(err) = cmd.execute().await {
            log::error!("'{}' failed: {}", cmd.description(), err);
            return Err(err);
        }
        log::info!("Executed '{}'", cmd.description());
        self.push(cmd);
        Ok(())
    }

    /// Push a command that has already been executed.
    pub fn push(&mut self, cmd: Box<dyn Command>) {
        if let Some(ref mut transaction) = self.current_transaction {
            transaction.push(cmd);
        } else {
            self.push_command(cmd);
        }
    }

    fn push_command(&mut self, cmd: Box<dyn Command>) {
        self.undo_stack.push(cmd);
        self.redo_stack.clear();
        self.dirty = true;

        while self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
    }

    /// Undo the latest command. Returns `false` when there is nothing to undo.
    ///
    /// On failure the command stays on the undo stack.
    pub async fn undo(&mut self) -> CommandResult<bool> {
        let Some(mut cmd) = self.undo_stack.pop() else {
            return Ok(false);
        };
        match cmd.undo().await {
            Ok(()) => {
                log::info!("Undid '{}'", cmd.description());
                self.redo_stack.push(cmd);
                self.dirty = true;
                Ok(true)
            }
            Err(err) => {
                log::error!("Undo of '{}' failed: {}", cmd.description(), err);
                self.undo_stack.push(cmd);
                Err(err)
            }
        }
    }

    /// Redo the latest undone command. Returns `false` when there is nothing to redo.
    ///
    /// On failure the command stays on the redo stack.
    pub async fn redo(&mut self) -> CommandResult<bool> {
        let Some(mut cmd) = self.redo_stack.pop() else {
            return Ok(false);
        };
        match cmd.redo().await {
            Ok(()) => {
                log::info!("Redid '{}'", cmd.description());
                self.undo_stack.push(cmd);
                self.dirty = true;
                Ok(true)
            }
            Err(err) => {
                log::error!("Redo of '{}' failed: {}", cmd.description(), err);
                self.redo_stack.push(cmd);
                Err(err)
            }
        }
    }

    /// Clear all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_transaction = None;
        self.dirty = false;
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

/// A command that wraps a transaction.
///
/// Progress survives a failed child, so retrying an undo or redo resumes at
/// the child that failed instead of replaying the ones already done.
struct TransactionCommand {
    transaction: Transaction,
    // Trailing children currently undone
    undone: usize,
}

#[async_trait]
impl Command for TransactionCommand {
    fn description(&self) -> &str {
        &self.transaction.name
    }

    async fn execute(&mut self) -> CommandResult {
        for cmd in &mut self.transaction.commands {
            cmd.execute().await?;
        }
        Ok(())
    }

    async fn undo(&mut self) -> CommandResult {
        // Undo in reverse order
        let len = self.transaction.commands.len();
        while self.undone < len {
            self.transaction.commands[len - 1 - self.undone].undo().await?;
            self.undone += 1;
        }
        Ok(())
    }

    async fn redo(&mut self) -> CommandResult {
        let len = self.transaction.commands.len();
        while self.undone > 0 {
            self.transaction.commands[len - self.undone].redo().await?;
            self.undone -= 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parking_lot::Mutex;

    use crate::error::{CommandError, StoreError};

    struct TestCommand {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        // Number of upcoming undo/redo calls that fail
        fail_undos: usize,
        fail_redos: usize,
    }

    impl TestCommand {
        fn boxed(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Box<dyn Command> {
            Box::new(Self {
                name,
                log: log.clone(),
                fail_undos: 0,
                fail_redos: 0,
            })
        }

        fn failing(
            name: &'static str,
            log: &Arc<Mutex<Vec<String>>>,
            fail_undos: usize,
            fail_redos: usize,
        ) -> Box<dyn Command> {
            Box::new(Self {
                name,
                log: log.clone(),
                fail_undos,
                fail_redos,
            })
        }
    }

    #[async_trait]
    impl Command for TestCommand {
        fn description(&self) -> &str {
            self.name
        }

        async fn execute(&mut self) -> CommandResult {
            self.log.lock().push(format!("execute {}", self.name));
            Ok(())
        }

        async fn undo(&mut self) -> CommandResult {
            if self.fail_undos > 0 {
                self.fail_undos -= 1;
                return Err(StoreError::Unavailable.into());
            }
            self.log.lock().push(format!("undo {}", self.name));
            Ok(())
        }

        async fn redo(&mut self) -> CommandResult {
            if self.fail_redos > 0 {
                self.fail_redos -= 1;
                return Err(StoreError::Network("blip".into()).into());
            }
            self.log.lock().push(format!("redo {}", self.name));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_history_basic() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut history = UndoHistory::new();

        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(!history.undo().await.unwrap());

        history.execute(TestCommand::boxed("A", &log)).await.unwrap();

        assert!(history.can_undo());
        assert!(!history.can_redo());
        assert!(history.is_dirty());
        assert_eq!(history.undo_description(), Some("A"));
    }

    #[tokio::test]
    async fn test_history_undo_redo() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut history = UndoHistory::new();

        history.execute(TestCommand::boxed("A", &log)).await.unwrap();
        history.execute(TestCommand::boxed("B", &log)).await.unwrap();
        assert_eq!(history.undo_count(), 2);

        assert!(history.undo().await.unwrap());
        assert_eq!(history.undo_count(), 1);
        assert_eq!(history.redo_count(), 1);
        assert_eq!(history.redo_description(), Some("B"));

        assert!(history.redo().await.unwrap());
        assert_eq!(history.undo_count(), 2);
        assert_eq!(history.redo_count(), 0);

        assert_eq!(
            *log.lock(),
            vec!["execute A", "execute B", "undo B", "redo B"]
        );
    }

    #[tokio::test]
    async fn test_new_command_clears_redo() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut history = UndoHistory::new();

        history.execute(TestCommand::boxed("A", &log)).await.unwrap();
        history.undo().await.unwrap();
        history.execute(TestCommand::boxed("B", &log)).await.unwrap();
        assert!(!history.can_redo());
    }

    #[tokio::test]
    async fn test_history_limit() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut history = UndoHistory::from_config(&EditorConfig {
            history_limit: 2,
            ..EditorConfig::default()
        });

        for name in ["A", "B", "C"] {
            history.execute(TestCommand::boxed(name, &log)).await.unwrap();
        }
        assert_eq!(history.undo_count(), 2);
        assert_eq!(history.undo_description(), Some("C"));
    }

    #[tokio::test]
    async fn test_failed_undo_stays_on_undo_stack() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut history = UndoHistory::new();
        history
            .execute(TestCommand::failing("A", &log, 1, 0))
            .await
            .unwrap();

        let err = history.undo().await.unwrap_err();
        assert_eq!(err, CommandError::Store(StoreError::Unavailable));
        assert_eq!(history.undo_count(), 1);
        assert_eq!(history.redo_count(), 0);
    }

    #[tokio::test]
    async fn test_transaction_undoes_in_reverse() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut history = UndoHistory::new();

        history.begin_transaction("Group");
        history.execute(TestCommand::boxed("A", &log)).await.unwrap();
        history.execute(TestCommand::boxed("B", &log)).await.unwrap();
        assert!(history.in_transaction());
        assert_eq!(history.undo_count(), 0);
        history.commit_transaction();

        assert_eq!(history.undo_count(), 1);
        assert_eq!(history.undo_description(), Some("Group"));

        history.undo().await.unwrap();
        history.redo().await.unwrap();
        assert_eq!(
            *log.lock(),
            vec!["execute A", "execute B", "undo B", "undo A", "redo A", "redo B"]
        );
    }

    #[tokio::test]
    async fn test_transaction_undo_resumes_after_failed_child() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut history = UndoHistory::new();

        history.begin_transaction("Group");
        history.execute(TestCommand::failing("A", &log, 1, 0)).await.unwrap();
        history.execute(TestCommand::boxed("B", &log)).await.unwrap();
        history.commit_transaction();

        assert!(history.undo().await.is_err());
        assert_eq!(history.undo_count(), 1);

        assert!(history.undo().await.unwrap());
        assert_eq!(history.redo_count(), 1);
        assert_eq!(*log.lock(), vec!["execute A", "execute B", "undo B", "undo A"]);
    }

    #[tokio::test]
    async fn test_transaction_redo_resumes_after_failed_child() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut history = UndoHistory::new();

        history.begin_transaction("Group");
        history.execute(TestCommand::boxed("A", &log)).await.unwrap();
        history.execute(TestCommand::failing("B", &log, 0, 1)).await.unwrap();
        history.commit_transaction();
        history.undo().await.unwrap();

        let err = history.redo().await.unwrap_err();
        assert_eq!(err, CommandError::Store(StoreError::Network("blip".into())));
        assert_eq!(history.redo_count(), 1);

        assert!(history.redo().await.unwrap());
        assert_eq!(history.undo_count(), 1);
        assert_eq!(
            *log.lock(),
            vec!["execute A", "execute B", "undo B", "undo A", "redo A", "redo B"]
        );
    }

    #[tokio::test]
    async fn test_rollback_discards_open_transaction() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut history = UndoHistory::new();

        history.begin_transaction("Group");
        history.execute(TestCommand::boxed("A", &log)).await.unwrap();
        history.rollback_transaction();
        history.commit_transaction();

        assert!(!history.in_transaction());
        assert!(!history.can_undo());
    }
}
