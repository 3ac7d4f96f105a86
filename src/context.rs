use crate::cloudbuild::{ApiConnector, ReqwestConnector};
use crate::traits::{
    CommandExecutor, FileSystem, InquireUserInput, Output, RealCommandExecutor, RealFileSystem,
    TerminalOutput, UserInput,
};
#[cfg(test)]
use crate::traits::{MockCommandExecutor, MockFileSystem, MockOutput, MockUserInput};
use std::sync::Arc;

/// Application context that holds all dependencies for dependency injection
pub struct Context {
    pub fs: Arc<dyn FileSystem>,
    pub input: Arc<dyn UserInput>,
    pub output: Arc<dyn Output>,
    pub command: Arc<dyn CommandExecutor>,
    pub api: Arc<dyn ApiConnector>,
}

impl Context {
    /// Create a new context with real implementations (for production use)
    pub fn new(api_url: &str) -> Self {
        Self {
            fs: Arc::new(RealFileSystem),
            input: Arc::new(InquireUserInput),
            output: Arc::new(TerminalOutput),
            command: Arc::new(RealCommandExecutor),
            api: Arc::new(ReqwestConnector::new(api_url)),
        }
    }

    /// Create a test context with specific mock implementations
    #[cfg(test)]
    pub fn test_with(
        fs: Arc<MockFileSystem>,
        input: Arc<MockUserInput>,
        output: Arc<MockOutput>,
        command: Arc<MockCommandExecutor>,
        api: Arc<dyn ApiConnector>,
    ) -> Self {
        Self {
            fs,
            input,
            output,
            command,
            api,
        }
    }
}

impl Clone for Context {
    fn clone(&self) -> Self {
        Self {
            fs: Arc::clone(&self.fs),
            input: Arc::clone(&self.input),
            output: Arc::clone(&self.output),
            command: Arc::clone(&self.command),
            api: Arc::clone(&self.api),
        }
    }
}
