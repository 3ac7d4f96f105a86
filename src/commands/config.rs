use crate::context::Context;
use crate::settings::Settings;
use anyhow::{Result, bail};
use std::path::Path;

const FALLBACK_EDITOR: &str = "vim";

pub struct ConfigCommand;

impl ConfigCommand {
    /// Open the settings dotfile in the user's editor, creating it first if needed
    pub fn execute(ctx: &Context, path: &Path) -> Result<()> {
        Self::execute_with_editor(ctx, path, &editor())
    }

    fn execute_with_editor(ctx: &Context, path: &Path, editor: &str) -> Result<()> {
        if !ctx.fs.exists(path) {
            Settings::create_dot_file(ctx.fs.as_ref(), path)?;
            ctx.output
                .info(&format!("Created settings file at {}", path.display()));
        }

        let mut parts = editor.split_whitespace();
        let program = parts.next().unwrap_or(FALLBACK_EDITOR);
        let path_arg = path.to_string_lossy();
        let args: Vec<&str> = parts.chain(std::iter::once(&*path_arg)).collect();

        let code = ctx.command.execute_interactive(program, &args)?;
        if code != 0 {
            bail!("Editor '{}' exited with status {}", program, code);
        }

        Ok(())
    }
}

/// `$VISUAL`, then `$EDITOR`, then vim
fn editor() -> String {
    ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_EDITOR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloudbuild::{MockConnector, MockHttpClient};
    use crate::traits::{
        FileSystem, MockCommandExecutor, MockFileSystem, MockOutput, MockUserInput, OutputMessage,
    };
    use std::path::PathBuf;
    use std::sync::Arc;

    struct Harness {
        ctx: Context,
        fs: Arc<MockFileSystem>,
        output: Arc<MockOutput>,
        command: Arc<MockCommandExecutor>,
    }

    fn harness(exit_code: i32) -> Harness {
        let fs = Arc::new(MockFileSystem::new());
        let output = Arc::new(MockOutput::new());
        let command = Arc::new(MockCommandExecutor::with_exit_code(exit_code));
        let ctx = Context::test_with(
            fs.clone(),
            Arc::new(MockUserInput::new()),
            output.clone(),
            command.clone(),
            Arc::new(MockConnector::new(MockHttpClient::new())),
        );
        Harness {
            ctx,
            fs,
            output,
            command,
        }
    }

    #[test]
    fn test_config_creates_missing_file_and_opens_editor() {
        let h = harness(0);
        let path = PathBuf::from("/home/user/.ucb.yaml");

        ConfigCommand::execute_with_editor(&h.ctx, &path, "vim").unwrap();

        assert!(h.fs.get_file_contents(&path).unwrap().contains("apiKey"));
        assert_eq!(
            h.output.get_messages(),
            vec![OutputMessage::Info(
                "Created settings file at /home/user/.ucb.yaml".to_string()
            )]
        );
        assert_eq!(
            h.command.invocations(),
            vec![("vim".to_string(), vec!["/home/user/.ucb.yaml".to_string()])]
        );
    }

    #[test]
    fn test_config_keeps_existing_file() {
        let h = harness(0);
        let path = PathBuf::from("/home/user/.ucb.yaml");
        h.fs.write(&path, "orgId: org1\n").unwrap();

        ConfigCommand::execute_with_editor(&h.ctx, &path, "code --wait").unwrap();

        assert_eq!(h.fs.get_file_contents(&path).as_deref(), Some("orgId: org1\n"));
        assert!(h.output.get_messages().is_empty());
        assert_eq!(
            h.command.invocations(),
            vec![(
                "code".to_string(),
                vec!["--wait".to_string(), "/home/user/.ucb.yaml".to_string()]
            )]
        );
    }

    #[test]
    fn test_config_editor_failure() {
        let h = harness(1);
        let err = ConfigCommand::execute_with_editor(&h.ctx, &PathBuf::from("/tmp/ucb.yaml"), "vim")
            .unwrap_err();
        assert!(err.to_string().contains("exited with status 1"));
    }
}
