//! Command trait and result types.

use async_trait::async_trait;

use crate::error::CommandError;

/// Result type for command execution.
pub type CommandResult<T = ()> = Result<T, CommandError>;

/// How a command's `execute` relates to the network work it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStyle {
    /// `execute` returns once every store call it issued has settled.
    #[default]
    Awaited,
    /// `execute` starts the store call and returns at once; `undo` waits for
    /// the in-flight call before inverting it.
    FireAndForget,
}

/// A reversible edit of encounter structure.
///
/// Commands are the only way structural entities are mutated. Each one keeps
/// what it needs to invert itself, in particular the index the store assigned
/// on the command's latest creation.
///
/// # Example
///
/// ```ignore
/// struct RenameWall {
///     collab: Collaborators<Wall>,
///     index: EntityIndex,
///     old: WallData,
///     new: WallData,
/// }
///
/// #[async_trait]
/// impl Command for RenameWall {
///     fn description(&self) -> &str { "Rename Wall" }
///
///     async fn execute(&mut self) -> CommandResult {
///         self.collab.update(self.index, self.new.clone()).await?;
///         self.collab.refetch().await
///     }
///
///     async fn undo(&mut self) -> CommandResult {
///         self.collab.update(self.index, self.old.clone()).await?;
///         self.collab.refetch().await
///     }
/// }
/// ```
#[async_trait]
pub trait Command: Send + Sync {
    /// Human-readable description for the undo/redo menu.
    fn description(&self) -> &str;

    /// Apply the command for the first time.
    async fn execute(&mut self) -> CommandResult;

    /// Revert the command.
    async fn undo(&mut self) -> CommandResult;

    /// Re-apply the command after an undo.
    async fn redo(&mut self) -> CommandResult {
        self.execute().await
    }

    fn style(&self) -> ExecutionStyle {
        ExecutionStyle::Awaited
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        applied: i32,
    }

    #[async_trait]
    impl Command for Counter {
        fn description(&self) -> &str {
            "Count"
        }

        async fn execute(&mut self) -> CommandResult {
            self.applied += 1;
            Ok(())
        }

        async fn undo(&mut self) -> CommandResult {
            self.applied -= 1;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_redo_defaults_to_execute() {
        let mut cmd = Counter { applied: 0 };
        cmd.execute().await.unwrap();
        cmd.undo().await.unwrap();
        cmd.redo().await.unwrap();
        assert_eq!(cmd.applied, 1);
        assert_eq!(cmd.style(), ExecutionStyle::Awaited);
    }
}
